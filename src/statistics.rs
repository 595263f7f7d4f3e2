#![warn(missing_docs)]
//! Derived figures of an intensity frame used for display.
use crate::{frame::Frame, utils::math_utils::compensated_sum, utils::usize_to_f64};
use nalgebra::{DVector, Point2};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Full width at half maximum of a one dimensional profile.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Fwhm {
    /// distance between the two half maximum crossings
    pub width: f64,
    /// half of the profile maximum
    pub half_maximum: f64,
    /// coordinate of the left half maximum crossing
    pub left: f64,
    /// coordinate of the right half maximum crossing
    pub right: f64,
}

/// Calculates the full width at half maximum of a profile.
///
/// The outermost samples at or above the half maximum are searched. The crossing positions are refined
/// by linear interpolation towards the adjacent sample below the half maximum. If the profile is still
/// above the half maximum at a border, the border coordinate is used.
///
/// Returns `None` if the profile is empty, the lengths of `axis` and `profile` differ or the maximum is
/// not positive.
#[must_use]
pub fn fwhm(axis: &DVector<f64>, profile: &DVector<f64>) -> Option<Fwhm> {
    if profile.is_empty() || axis.len() != profile.len() {
        return None;
    }
    let max = profile.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() || max <= 0.0 {
        return None;
    }
    let half_maximum = max / 2.0;
    let first = profile.iter().position(|v| *v >= half_maximum)?;
    let last = profile.iter().rposition(|v| *v >= half_maximum)?;
    let left = if first == 0 {
        axis[0]
    } else {
        let (x0, x1) = (axis[first - 1], axis[first]);
        let (p0, p1) = (profile[first - 1], profile[first]);
        x0 + (half_maximum - p0) * (x1 - x0) / (p1 - p0)
    };
    let right = if last + 1 == profile.len() {
        axis[last]
    } else {
        let (x0, x1) = (axis[last], axis[last + 1]);
        let (p0, p1) = (profile[last], profile[last + 1]);
        x0 + (p0 - half_maximum) * (x1 - x0) / (p0 - p1)
    };
    Some(Fwhm {
        width: right - left,
        half_maximum,
        left,
        right,
    })
}

/// Statistics of an (averaged) intensity frame.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FrameStatistics {
    peak: f64,
    peak_position: Point2<f64>,
    fwhm_x: Option<Fwhm>,
    fwhm_y: Option<Fwhm>,
    total: f64,
}
impl FrameStatistics {
    /// Calculates the [`FrameStatistics`] of a frame using the given marginal histograms for the FWHM.
    ///
    /// The profiles are tracked separately during accumulation, so they are passed in instead of being
    /// recomputed from the frame.
    #[must_use]
    pub fn from_profiles(
        frame: &Frame,
        horizontal_profile: &DVector<f64>,
        vertical_profile: &DVector<f64>,
    ) -> Self {
        let intensity = frame.intensity();
        let mut peak = f64::NEG_INFINITY;
        let mut peak_idx = (0, 0);
        for col in 0..intensity.ncols() {
            for row in 0..intensity.nrows() {
                if intensity[(row, col)] > peak {
                    peak = intensity[(row, col)];
                    peak_idx = (row, col);
                }
            }
        }
        let cell_area = axis_step(frame.x_axis()) * axis_step(frame.y_axis());
        Self {
            peak,
            peak_position: Point2::new(frame.x_axis()[peak_idx.1], frame.y_axis()[peak_idx.0]),
            fwhm_x: fwhm(frame.x_axis(), horizontal_profile),
            fwhm_y: fwhm(frame.y_axis(), vertical_profile),
            total: compensated_sum(intensity.iter()) * cell_area,
        }
    }
    /// Calculates the [`FrameStatistics`] of a frame.
    #[must_use]
    pub fn from_frame(frame: &Frame) -> Self {
        Self::from_profiles(
            frame,
            &frame.horizontal_profile(),
            &frame.vertical_profile(),
        )
    }
    /// Returns the peak intensity.
    #[must_use]
    pub const fn peak(&self) -> f64 {
        self.peak
    }
    /// Returns the (x, y) position of the peak intensity.
    #[must_use]
    pub const fn peak_position(&self) -> Point2<f64> {
        self.peak_position
    }
    /// Returns the horizontal FWHM.
    #[must_use]
    pub const fn fwhm_x(&self) -> Option<Fwhm> {
        self.fwhm_x
    }
    /// Returns the vertical FWHM.
    #[must_use]
    pub const fn fwhm_y(&self) -> Option<Fwhm> {
        self.fwhm_y
    }
    /// Returns the integrated intensity (sum of all pixels times the pixel area).
    #[must_use]
    pub const fn total(&self) -> f64 {
        self.total
    }
}
impl Display for FrameStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = |w: Option<Fwhm>| w.map_or_else(|| "n/a".to_string(), |w| format!("{:.6e}", w.width));
        writeln!(
            f,
            "peak:      {:.6e} at ({:.6e}, {:.6e})",
            self.peak, self.peak_position.x, self.peak_position.y
        )?;
        writeln!(f, "fwhm x:    {}", width(self.fwhm_x))?;
        writeln!(f, "fwhm y:    {}", width(self.fwhm_y))?;
        write!(f, "total:     {:.6e}", self.total)
    }
}

fn axis_step(axis: &DVector<f64>) -> f64 {
    if axis.len() > 1 {
        (axis[axis.len() - 1] - axis[0]) / usize_to_f64(axis.len() - 1)
    } else {
        1.0
    }
}
