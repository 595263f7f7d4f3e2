#![warn(missing_docs)]
//! Rectilinear grid definitions.
//!
//! A [`Grid`] describes the sample positions of a frame by a pair of [`AxisDef`]s. In native mode
//! the grid of the first accumulated frame is adopted, in merged mode a user configured grid is used
//! and all frames are resampled onto it.
use crate::{
    error::{AccumResult, AccumulatorError},
    utils::griddata::{is_strictly_increasing, is_uniformly_spaced, linspace},
    utils::usize_to_f64,
};
use log::warn;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Relative spacing tolerance above which an axis is reported as non-uniform.
const SPACING_TOLERANCE: f64 = 1.0e-6;

/// Definition of a single, linearly spaced axis.
///
/// Deserialized axes pass the same validation as [`AxisDef::new`].
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(try_from = "UncheckedAxisDef")]
pub struct AxisDef {
    start: f64,
    end: f64,
    points: usize,
}
#[derive(Deserialize)]
struct UncheckedAxisDef {
    start: f64,
    end: f64,
    points: usize,
}
impl TryFrom<UncheckedAxisDef> for AxisDef {
    type Error = AccumulatorError;

    fn try_from(axis: UncheckedAxisDef) -> AccumResult<Self> {
        Self::new(axis.start, axis.end, axis.points)
    }
}
impl AxisDef {
    /// Creates a new [`AxisDef`].
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - `start` or `end` are not finite.
    ///   - `points` is zero.
    ///   - `start >= end` for an axis with more than one point.
    pub fn new(start: f64, end: f64, points: usize) -> AccumResult<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(AccumulatorError::Grid(
                "axis limits must be finite".into(),
            ));
        }
        if points == 0 {
            return Err(AccumulatorError::Grid(
                "axis must contain at least one point".into(),
            ));
        }
        if points > 1 && start >= end {
            return Err(AccumulatorError::Grid(format!(
                "axis start ({start}) must be smaller than end ({end})"
            )));
        }
        Ok(Self { start, end, points })
    }
    /// Derives an [`AxisDef`] from a vector of sample coordinates.
    ///
    /// Only the first and last coordinate as well as the number of points are kept. The samples are
    /// assumed to be equally spaced. A non-uniform spacing is accepted but logged as a warning.
    ///
    /// # Errors
    ///
    /// This function will return an error if the coordinates are empty, not finite or not strictly increasing.
    pub fn from_coordinates(coordinates: &DVector<f64>) -> AccumResult<Self> {
        let values = coordinates.as_slice();
        if values.is_empty() {
            return Err(AccumulatorError::Grid(
                "cannot derive axis from empty coordinates".into(),
            ));
        }
        if !is_strictly_increasing(values) {
            return Err(AccumulatorError::Grid(
                "axis coordinates must be finite and strictly increasing".into(),
            ));
        }
        if !is_uniformly_spaced(values, SPACING_TOLERANCE) {
            warn!("axis coordinates are not equally spaced. Using first and last coordinate only.");
        }
        Self::new(values[0], values[values.len() - 1], values.len())
    }
    /// Returns the start coordinate of this [`AxisDef`].
    #[must_use]
    pub const fn start(&self) -> f64 {
        self.start
    }
    /// Returns the end coordinate of this [`AxisDef`].
    #[must_use]
    pub const fn end(&self) -> f64 {
        self.end
    }
    /// Returns the number of points of this [`AxisDef`].
    #[must_use]
    pub const fn points(&self) -> usize {
        self.points
    }
    /// Returns the distance between neighbouring points.
    ///
    /// An axis with a single point has a step of `1.0` so that integrals over it reduce to plain sums.
    #[must_use]
    pub fn step(&self) -> f64 {
        if self.points > 1 {
            (self.end - self.start) / usize_to_f64(self.points - 1)
        } else {
            1.0
        }
    }
    /// Returns the sample coordinates of this [`AxisDef`].
    ///
    /// # Errors
    ///
    /// This function will return an error if the linearly spaced vector could not be generated.
    pub fn coordinates(&self) -> AccumResult<DVector<f64>> {
        linspace(self.start, self.end, self.points)
    }
}
impl Display for AxisDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}] ({} pts)", self.start, self.end, self.points)
    }
}

/// Horizontal and vertical axis definition of a frame.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Grid {
    horizontal: AxisDef,
    vertical: AxisDef,
}
impl Grid {
    /// Creates a new [`Grid`] from a horizontal (x) and a vertical (y) axis.
    #[must_use]
    pub const fn new(horizontal: AxisDef, vertical: AxisDef) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }
    /// Returns the horizontal axis of this [`Grid`].
    #[must_use]
    pub const fn horizontal(&self) -> &AxisDef {
        &self.horizontal
    }
    /// Returns the vertical axis of this [`Grid`].
    #[must_use]
    pub const fn vertical(&self) -> &AxisDef {
        &self.vertical
    }
    /// Returns the shape of a frame on this [`Grid`].
    ///
    /// The order of the returned tuple is `(rows, columns)`, i.e. `(vertical points, horizontal points)`.
    #[must_use]
    pub const fn shape(&self) -> (usize, usize) {
        (self.vertical.points, self.horizontal.points)
    }
    /// Returns the area of a single grid cell.
    #[must_use]
    pub fn cell_area(&self) -> f64 {
        self.horizontal.step() * self.vertical.step()
    }
}
impl Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x: {}, y: {}", self.horizontal, self.vertical)
    }
}
