/// Numeric conversion helpers.
///
/// This module converts between the integer and floating-point types of the
/// value model. The expression language stores floats as `f32`, so integer
/// promotion widens to the nearest float.
///
/// The narrowing conversions return a `Result`, which is `Ok` if the
/// conversion is valid, or the caller supplied error otherwise.
pub mod num;
