/// Expression nodes and their static typing.
///
/// Every expression variant is its own struct so visitors can take exactly
/// the node they handle. `FunctionCall` lives here and is reused as a
/// statement.
pub mod expression;
/// Function nodes, traits, overload identifiers and the function arena.
pub mod function;
/// Statement nodes.
pub mod statement;
/// Visitor traits and the traversal context used for statement splicing.
pub mod visitor;

pub use expression::Expr;
pub use function::{FunctionId, FunctionNode};
pub use statement::Statement;
