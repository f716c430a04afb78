/// Magnitude of `i64::MIN` as an `f32` (`2^63`).
const I64_BOUND: f32 = 9_223_372_036_854_775_808.0;

/// Widens an `i64` to the nearest `f32`.
///
/// Integers above `2^24` in magnitude round to the nearest representable
/// float; the conversion itself never fails.
///
/// ## Example
/// ```
/// use commentpp::util::num::i64_to_f32;
///
/// assert_eq!(i64_to_f32(42), 42.0);
/// assert_eq!(i64_to_f32(16_777_217), 16_777_216.0);
/// ```
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub const fn i64_to_f32(value: i64) -> f32 {
    value as f32
}

/// Converts an `f32` to `i64` by dropping the fractional part.
///
/// ## Errors
/// Returns `Err(error)` for non-finite values and values outside the `i64`
/// range.
///
/// ## Example
/// ```
/// use commentpp::util::num::f32_to_i64_truncated;
///
/// assert_eq!(f32_to_i64_truncated(-2.75, ()), Ok(-2));
/// assert!(f32_to_i64_truncated(f32::NAN, ()).is_err());
/// assert!(f32_to_i64_truncated(1.0e19, ()).is_err());
/// ```
#[allow(clippy::cast_possible_truncation)]
pub fn f32_to_i64_truncated<E>(value: f32, error: E) -> Result<i64, E> {
    if !value.is_finite() || value < -I64_BOUND || value >= I64_BOUND {
        return Err(error);
    }
    Ok(value.trunc() as i64)
}

/// Converts a `usize` count to `i64`.
///
/// ## Errors
/// Returns `Err(error)` if the count does not fit.
pub fn usize_to_i64_checked<E>(value: usize, error: E) -> Result<i64, E> {
    i64::try_from(value).map_err(|_| error)
}
