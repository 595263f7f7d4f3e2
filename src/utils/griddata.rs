//! Helpers for regular one-dimensional grids
#![warn(missing_docs)]
use crate::{
    error::{AccumResult, AccumulatorError},
    utils::usize_to_f64,
};
use itertools::Itertools;
use log::warn;
use nalgebra::{DVector, Scalar};
use num::{Float, NumCast};

/// Creates a linearly spaced Vector (Matrix with 1 column and `num` rows) from `start` to `end`
///
/// The last element is set to `end` exactly so that axes built from the same limits always
/// compare equal at the boundaries.
/// # Attributes
/// - `start`:  Start value of the array
/// - `end`:    end value of the array
/// - `num`:    number of elements
///
/// # Errors
/// This function will return an error if
/// - `start` or `end` are not finite
/// - `num` cannot be represented by the float type
pub fn linspace<T: Float + Scalar>(start: T, end: T, num: usize) -> AccumResult<DVector<T>> {
    if !start.is_finite() || !end.is_finite() {
        return Err(AccumulatorError::Grid(
            "start and end values must be finite!".into(),
        ));
    };
    if num < 2 {
        if num == 0 {
            warn!("Using linspace with zero elements results in an empty Vector");
        }
        return Ok(DVector::<T>::from_element(num, start));
    }
    let intervals: T = NumCast::from(num - 1)
        .ok_or_else(|| AccumulatorError::Grid("Cannot cast usize to float type!".into()))?;
    let step = (end - start) / intervals;
    let mut values = Vec::with_capacity(num);
    for i in 0..num - 1 {
        let i_t: T = NumCast::from(i)
            .ok_or_else(|| AccumulatorError::Grid("Cannot cast usize to float type!".into()))?;
        values.push(start + i_t * step);
    }
    values.push(end);
    Ok(DVector::from_vec(values))
}

/// Returns `true` if all values are finite and strictly increasing.
#[must_use]
pub fn is_strictly_increasing(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite()) && values.iter().tuple_windows().all(|(a, b)| b > a)
}

/// Returns `true` if the spacing of the given coordinates deviates from the mean spacing by less
/// than `rel_tolerance` (relative to the mean spacing).
///
/// Vectors with less than three elements are always uniform.
#[must_use]
pub fn is_uniformly_spaced(values: &[f64], rel_tolerance: f64) -> bool {
    if values.len() < 3 {
        return true;
    }
    let mean_step = (values[values.len() - 1] - values[0]) / usize_to_f64(values.len() - 1);
    values
        .iter()
        .tuple_windows()
        .all(|(a, b)| ((b - a) - mean_step).abs() <= rel_tolerance * mean_step.abs())
}
