/// Numeric conversion helpers.
///
/// Checked conversions between `Int`, `Float` and host sizes. Every helper
/// returns an [`EvalResult`](crate::error::EvalResult) carrying the source
/// line, so the interpreter can propagate a failed conversion with `?`.
pub mod num;
