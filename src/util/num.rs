use crate::error::{EvalResult, RuntimeError};

/// Largest integer magnitude exactly representable as an `f64` (`2^53 - 1`).
pub const MAX_SAFE_INT: u64 = 9_007_199_254_740_991;

/// Converts an `Int` to a `Float` if and only if it is exactly representable.
///
/// ## Errors
/// Returns [`RuntimeError::Overflow`] if the magnitude exceeds
/// [`MAX_SAFE_INT`].
///
/// ## Example
/// ```
/// use kvantum::{
///     error::RuntimeError,
///     util::num::{MAX_SAFE_INT, i64_to_f64_checked},
/// };
///
/// assert_eq!(i64_to_f64_checked(42, 1), Ok(42.0));
///
/// let big = i64::try_from(MAX_SAFE_INT).unwrap() + 1;
/// assert_eq!(i64_to_f64_checked(big, 7), Err(RuntimeError::Overflow { line: 7 }));
/// ```
#[allow(clippy::cast_precision_loss)]
pub fn i64_to_f64_checked(value: i64, line: usize) -> EvalResult<f64> {
    if value.unsigned_abs() > MAX_SAFE_INT {
        return Err(RuntimeError::Overflow { line });
    }
    Ok(value as f64)
}

/// Converts a `Float` to an `Int`, truncating toward zero.
///
/// ## Errors
/// Returns [`RuntimeError::Overflow`] for NaN, infinities and values outside
/// the `i64` range.
///
/// ## Example
/// ```
/// use kvantum::util::num::f64_to_i64_checked;
///
/// assert_eq!(f64_to_i64_checked(2.9, 1), Ok(2));
/// assert_eq!(f64_to_i64_checked(-2.9, 1), Ok(-2));
/// assert!(f64_to_i64_checked(f64::NAN, 1).is_err());
/// assert!(f64_to_i64_checked(1e300, 1).is_err());
/// ```
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn f64_to_i64_checked(value: f64, line: usize) -> EvalResult<i64> {
    let value = value.trunc();
    if !value.is_finite() || value < i64::MIN as f64 || value >= i64::MAX as f64 {
        return Err(RuntimeError::Overflow { line });
    }
    Ok(value as i64)
}

/// Turns an `Int` index into a position inside a sequence of length `len`.
///
/// ## Errors
/// Returns [`RuntimeError::IndexOutOfBounds`] for negative indices and
/// indices at or past `len`.
///
/// ## Example
/// ```
/// use kvantum::{error::RuntimeError, util::num::index_checked};
///
/// assert_eq!(index_checked(2, 3, 1), Ok(2));
/// assert_eq!(index_checked(3, 3, 4),
///            Err(RuntimeError::IndexOutOfBounds { len: 3, found: 3, line: 4 }));
/// assert!(index_checked(-1, 3, 1).is_err());
/// ```
pub fn index_checked(index: i64, len: usize, line: usize) -> EvalResult<usize> {
    usize::try_from(index).ok()
                          .filter(|position| *position < len)
                          .ok_or(RuntimeError::IndexOutOfBounds { len,
                                                                  found: index,
                                                                  line })
}

/// Turns an `Int` element count into a `usize`.
///
/// ## Errors
/// Returns [`RuntimeError::NegativeSize`] if `size` is below zero.
pub fn size_checked(size: i64, line: usize) -> EvalResult<usize> {
    usize::try_from(size).map_err(|_| RuntimeError::NegativeSize { size, line })
}
