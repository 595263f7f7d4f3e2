#![warn(missing_docs)]
//! Resampling of frames onto a different grid.
//!
//! The bivariate interpolation is the tensor product of natural cubic splines: every source row is
//! interpolated along x onto the target x coordinates, then every resulting column is interpolated
//! along y onto the target y coordinates. The procedure contains no randomness and no
//! order-dependent accumulation, so identical inputs always yield bit-identical results.
use crate::{
    error::{AccumResult, AccumulatorError},
    frame::Frame,
    grid::Grid,
};
use log::{debug, warn};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Treatment of target coordinates outside the source grid.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumIter)]
pub enum EdgePolicy {
    /// continue the polynomial of the outermost spline segment. May produce negative intensities.
    #[default]
    Extrapolate,
    /// evaluate at the nearest coordinate inside the source grid
    Clamp,
    /// set all values outside the source grid to zero
    Zero,
}

/// One-dimensional natural cubic spline.
#[derive(Clone, Debug, PartialEq)]
pub struct CubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    second_derivatives: Vec<f64>,
}
impl CubicSpline {
    /// Creates a new natural [`CubicSpline`] through the given support points.
    ///
    /// A single support point yields a constant, two support points a straight line.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - `x` and `y` have different lengths or are empty.
    ///   - `x` is not strictly increasing.
    pub fn new(x: &[f64], y: &[f64]) -> AccumResult<Self> {
        if x.len() != y.len() {
            return Err(AccumulatorError::Interpolation(format!(
                "number of coordinates ({}) and values ({}) differ",
                x.len(),
                y.len()
            )));
        }
        if x.is_empty() {
            return Err(AccumulatorError::Interpolation(
                "spline needs at least one support point".into(),
            ));
        }
        if x.windows(2).any(|w| w[1] <= w[0]) {
            return Err(AccumulatorError::Interpolation(
                "spline coordinates must be strictly increasing".into(),
            ));
        }
        let second_derivatives = natural_second_derivatives(x, y);
        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            second_derivatives,
        })
    }
    /// Evaluates the spline at `t`.
    ///
    /// Outside of the support range the polynomial of the outermost segment is continued.
    #[must_use]
    pub fn eval(&self, t: f64) -> f64 {
        let n = self.x.len();
        if n == 1 {
            return self.y[0];
        }
        let segment = self.x.partition_point(|v| *v <= t).saturating_sub(1).min(n - 2);
        let (x0, x1) = (self.x[segment], self.x[segment + 1]);
        let (y0, y1) = (self.y[segment], self.y[segment + 1]);
        let (m0, m1) = (
            self.second_derivatives[segment],
            self.second_derivatives[segment + 1],
        );
        let h = x1 - x0;
        let a = (x1 - t) / h;
        let b = (t - x0) / h;
        a.mul_add(y0, b * y1) + ((a.powi(3) - a) * m0 + (b.powi(3) - b) * m1) * h * h / 6.0
    }
    /// Evaluates the spline at `t` applying the given [`EdgePolicy`] outside the support range.
    #[must_use]
    pub fn eval_with_policy(&self, t: f64, edge_policy: EdgePolicy) -> f64 {
        let (first, last) = (self.x[0], self.x[self.x.len() - 1]);
        match edge_policy {
            EdgePolicy::Extrapolate => self.eval(t),
            EdgePolicy::Clamp => self.eval(t.clamp(first, last)),
            EdgePolicy::Zero => {
                if t < first || t > last {
                    0.0
                } else {
                    self.eval(t)
                }
            }
        }
    }
}

/// Solves the tridiagonal system of a natural cubic spline (Thomas algorithm).
fn natural_second_derivatives(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();
    let mut m = vec![0.0; n];
    if n < 3 {
        return m;
    }
    let mut diag = vec![0.0; n];
    let mut rhs = vec![0.0; n];
    let mut upper = vec![0.0; n];
    for i in 1..n - 1 {
        let h_lo = x[i] - x[i - 1];
        let h_hi = x[i + 1] - x[i];
        diag[i] = 2.0 * (h_lo + h_hi);
        upper[i] = h_hi;
        rhs[i] = 6.0 * ((y[i + 1] - y[i]) / h_hi - (y[i] - y[i - 1]) / h_lo);
    }
    // forward sweep, the first row is the trivial boundary equation m[0] = 0
    for i in 2..n - 1 {
        let lower = x[i] - x[i - 1];
        let factor = lower / diag[i - 1];
        diag[i] -= factor * upper[i - 1];
        rhs[i] -= factor * rhs[i - 1];
    }
    for i in (1..n - 1).rev() {
        m[i] = (rhs[i] - upper[i] * m[i + 1]) / diag[i];
    }
    m
}

/// Resamples a [`Frame`] onto the given target [`Grid`] by bicubic spline interpolation.
///
/// If the frame already lives on the target grid, it is returned unchanged.
///
/// # Errors
///
/// This function will return an error if the target coordinates cannot be generated or the
/// resampled frame is invalid.
pub fn resample(frame: &Frame, target: &Grid, edge_policy: EdgePolicy) -> AccumResult<Frame> {
    let target_x = target.horizontal().coordinates()?;
    let target_y = target.vertical().coordinates()?;
    if frame.x_axis() == &target_x && frame.y_axis() == &target_y {
        debug!("frame already on target grid. No resampling necessary.");
        return Ok(frame.clone());
    }
    if edge_policy == EdgePolicy::Extrapolate {
        debug!(
            "extrapolating {} x and {} y target coordinates",
            outside_count(&target_x, frame.x_axis()),
            outside_count(&target_y, frame.y_axis())
        );
    }
    let source = frame.intensity();
    let (src_rows, _) = source.shape();
    let mut along_x = DMatrix::<f64>::zeros(src_rows, target_x.len());
    for (row_idx, row) in source.row_iter().enumerate() {
        let values: Vec<f64> = row.iter().copied().collect();
        let spline = CubicSpline::new(frame.x_axis().as_slice(), &values)?;
        for (col_idx, tx) in target_x.iter().enumerate() {
            along_x[(row_idx, col_idx)] = spline.eval_with_policy(*tx, edge_policy);
        }
    }
    let mut resampled = DMatrix::<f64>::zeros(target_y.len(), target_x.len());
    for (col_idx, column) in along_x.column_iter().enumerate() {
        let values: Vec<f64> = column.iter().copied().collect();
        let spline = CubicSpline::new(frame.y_axis().as_slice(), &values)?;
        for (row_idx, ty) in target_y.iter().enumerate() {
            resampled[(row_idx, col_idx)] = spline.eval_with_policy(*ty, edge_policy);
        }
    }
    let negatives = resampled.iter().filter(|v| **v < 0.0).count();
    if negatives > 0 && source.iter().all(|v| *v >= 0.0) {
        warn!("resampling produced {negatives} negative intensity values at the grid margins");
    }
    Frame::new(resampled, target_x, target_y)
}

/// Returns the number of coordinates of `axis` lying outside the interval spanned by `reference`.
#[must_use]
pub fn outside_count(axis: &DVector<f64>, reference: &DVector<f64>) -> usize {
    let (Some(first), Some(last)) = (reference.iter().next(), reference.iter().last()) else {
        return axis.len();
    };
    axis.iter().filter(|v| **v < *first || **v > *last).count()
}
