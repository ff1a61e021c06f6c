/// The checker state and the per-function driver.
///
/// Holds the symbol table, the set of functions already checked and the
/// stack of functions being checked, and records every failed statement in
/// the diagnostics sink.
pub mod core;
/// Typing rules for expressions.
pub mod expression;
/// Typing rules for statements, including return type inference.
pub mod statement;
/// Call resolution: overload lookup, static and method calls, receiver
/// injection and argument validation.
pub mod call;

pub use self::core::{Symbol, TypeChecker};
