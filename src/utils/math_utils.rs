//! Lossy numeric conversions with the corresponding clippy lints silenced in one place.
use kahan::KahanSum;

#[must_use]
pub const fn usize_to_f64(value: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let newval = value as f64;
    newval
}

#[must_use]
pub const fn f64_to_usize(value: f64) -> usize {
    #[allow(clippy::cast_possible_truncation)]
    #[allow(clippy::cast_sign_loss)]
    let newval = value as usize;
    newval
}

/// Sum of all values using compensated (Kahan) summation.
///
/// Used for integrated quantities of large frames where naive summation loses precision.
#[must_use]
pub fn compensated_sum<'a>(values: impl IntoIterator<Item = &'a f64>) -> f64 {
    let mut sum = KahanSum::<f64>::new_with_value(0.0);
    for v in values {
        sum += *v;
    }
    sum.sum()
}
