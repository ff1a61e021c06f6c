/// The interpreter state and its [`CodeExecutor`](crate::compiler::CodeExecutor)
/// implementation.
///
/// Holds the call frames, the return slot of the running function and the
/// tables built while modules are generated: native bindings and object
/// layouts.
pub mod core;
/// Expression evaluation.
///
/// Implements [`ExpressionVisitor`](crate::ast::visitor::ExpressionVisitor)
/// and the call protocol, including virtual dispatch on the runtime type of
/// a method receiver.
pub mod expression;
/// Native functions.
///
/// The builtin module declares `printf`, `scanf`, `malloc`, `memcpy` and
/// `panic` as `@native`; this module implements them over the program's
/// standard streams.
pub mod native;
/// Statement execution.
pub mod statement;
/// Runtime values.
pub mod value;

pub use self::{
    core::Interpreter,
    native::{Streams, NATIVE_FUNCTIONS},
    value::{ObjectValue, Value},
};
