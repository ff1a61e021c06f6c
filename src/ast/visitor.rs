use crate::{
    ast::{
        expression::{
            ArrayAllocation, ArrayExpression, ArrayIndex, BinaryOperation, Cast, DynamicAllocation,
            FieldAccess, FunctionCall, Literal, TakeReference, Variable,
        },
        statement::{Assignment, For, IfElse, Return, Statement, StatementBlock, While},
    },
    error::{CheckError, CheckResult},
};

/// Read-only visit of every expression variant.
///
/// [`Expr::accept`](crate::ast::expression::Expr::accept) picks the method.
pub trait ExpressionVisitor {
    /// What a visit produces, e.g. a runtime value.
    type Output;

    fn visit_binary_operation(&mut self, node: &BinaryOperation) -> Self::Output;
    fn visit_literal(&mut self, node: &Literal) -> Self::Output;
    fn visit_variable(&mut self, node: &Variable) -> Self::Output;
    fn visit_field_access(&mut self, node: &FieldAccess) -> Self::Output;
    fn visit_dynamic_allocation(&mut self, node: &DynamicAllocation) -> Self::Output;
    fn visit_array_allocation(&mut self, node: &ArrayAllocation) -> Self::Output;
    fn visit_array_expression(&mut self, node: &ArrayExpression) -> Self::Output;
    fn visit_array_index(&mut self, node: &ArrayIndex) -> Self::Output;
    fn visit_take_reference(&mut self, node: &TakeReference) -> Self::Output;
    fn visit_cast(&mut self, node: &Cast) -> Self::Output;
    fn visit_call(&mut self, node: &FunctionCall) -> Self::Output;
}

/// Read-only visit of every statement variant.
///
/// Statements run by side effect, so `Output` is usually a unit result. A
/// call in statement position goes through
/// [`visit_call_statement`](Self::visit_call_statement) and discards the
/// value.
pub trait StatementVisitor {
    /// What a visit produces.
    type Output;

    fn visit_block(&mut self, node: &StatementBlock) -> Self::Output;
    fn visit_assignment(&mut self, node: &Assignment) -> Self::Output;
    fn visit_return(&mut self, node: &Return) -> Self::Output;
    fn visit_if_else(&mut self, node: &IfElse) -> Self::Output;
    fn visit_while(&mut self, node: &While) -> Self::Output;
    fn visit_for(&mut self, node: &For) -> Self::Output;
    fn visit_call_statement(&mut self, node: &FunctionCall) -> Self::Output;
}

/// A visitor over whole trees.
pub trait TreeVisitor: ExpressionVisitor + StatementVisitor {}

impl<T: ExpressionVisitor + StatementVisitor> TreeVisitor for T {}

/// Visit of every expression variant that may rewrite the node.
///
/// The type checker stores resolved types and call targets in place.
pub trait ExpressionVisitorMut {
    /// What a visit produces, e.g. the resolved type.
    type Output;

    fn visit_binary_operation(&mut self, node: &mut BinaryOperation) -> Self::Output;
    fn visit_literal(&mut self, node: &mut Literal) -> Self::Output;
    fn visit_variable(&mut self, node: &mut Variable) -> Self::Output;
    fn visit_field_access(&mut self, node: &mut FieldAccess) -> Self::Output;
    fn visit_dynamic_allocation(&mut self, node: &mut DynamicAllocation) -> Self::Output;
    fn visit_array_allocation(&mut self, node: &mut ArrayAllocation) -> Self::Output;
    fn visit_array_expression(&mut self, node: &mut ArrayExpression) -> Self::Output;
    fn visit_array_index(&mut self, node: &mut ArrayIndex) -> Self::Output;
    fn visit_take_reference(&mut self, node: &mut TakeReference) -> Self::Output;
    fn visit_cast(&mut self, node: &mut Cast) -> Self::Output;
    fn visit_call(&mut self, node: &mut FunctionCall) -> Self::Output;
}

/// Visit of every statement variant that may rewrite the node.
pub trait StatementVisitorMut {
    /// What a visit produces.
    type Output;

    fn visit_block(&mut self, node: &mut StatementBlock) -> Self::Output;
    fn visit_assignment(&mut self, node: &mut Assignment) -> Self::Output;
    fn visit_return(&mut self, node: &mut Return) -> Self::Output;
    fn visit_if_else(&mut self, node: &mut IfElse) -> Self::Output;
    fn visit_while(&mut self, node: &mut While) -> Self::Output;
    fn visit_for(&mut self, node: &mut For) -> Self::Output;
    fn visit_call_statement(&mut self, node: &mut FunctionCall) -> Self::Output;
}

#[derive(Debug, Default)]
struct BlockFrame {
    current: usize,
    pending: Vec<Statement>,
}

/// Tracks which statement of which block a traversal is at.
///
/// A visitor walks a statement list through [`TraversalContext::walk_block`]
/// and may call [`TraversalContext::insert_before_current`] from anywhere
/// below it. Spliced statements land directly in front of the statement being
/// visited once that visit returns; they are not visited themselves.
///
/// # Example
/// ```
/// use kvantum::ast::{
///     expression::{Expr, Literal, Variable},
///     statement::{Assignment, Statement},
///     visitor::TraversalContext,
/// };
///
/// let declare = |name: &str| {
///     Statement::Assignment(Assignment::declare(Expr::Variable(Variable::new(name, 1)),
///                                               Expr::Literal(Literal::new(0, 1)),
///                                               1))
/// };
///
/// let mut block = vec![declare("a"), declare("b")];
/// let mut traversal = TraversalContext::default();
/// traversal.walk_block(&mut block, |traversal, statement| {
///              if matches!(statement, Statement::Assignment(a) if a.target == Expr::Variable(Variable::new("b", 1))) {
///                  traversal.insert_before_current(declare("hoisted"))?;
///              }
///              Ok::<(), kvantum::error::CheckError>(())
///          })
///          .unwrap();
///
/// assert_eq!(block.len(), 3);
/// assert_eq!(block[1], declare("hoisted"));
/// ```
#[derive(Debug, Default)]
pub struct TraversalContext {
    frames: Vec<BlockFrame>,
}

impl TraversalContext {
    /// Nesting depth of the blocks being walked.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Position of the current statement in the innermost block.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.frames.last().map(|frame| frame.current)
    }

    /// Queues `statement` for insertion in front of the current statement
    /// of the innermost block.
    ///
    /// # Errors
    /// [`CheckError::NoOwningBlock`] when no block is being walked.
    pub fn insert_before_current(&mut self, statement: Statement) -> CheckResult<()> {
        let frame = self.frames.last_mut().ok_or(CheckError::NoOwningBlock)?;
        frame.pending.push(statement);
        Ok(())
    }

    /// Visits every statement of `statements` with `visit`, splicing queued
    /// statements in as it goes.
    ///
    /// The walk stops at the first error; statements queued so far are still
    /// spliced in.
    pub fn walk_block<E>(&mut self,
                         statements: &mut Vec<Statement>,
                         mut visit: impl FnMut(&mut Self, &mut Statement) -> Result<(), E>)
                         -> Result<(), E> {
        self.frames.push(BlockFrame::default());

        let mut index = 0;
        let mut result = Ok(());
        while index < statements.len() {
            if let Some(frame) = self.frames.last_mut() {
                frame.current = index;
            }

            result = visit(self, &mut statements[index]);

            let pending = self.frames
                              .last_mut()
                              .map(|frame| std::mem::take(&mut frame.pending))
                              .unwrap_or_default();
            let inserted = pending.len();
            statements.splice(index..index, pending);
            index += inserted + 1;

            if result.is_err() {
                break;
            }
        }

        self.frames.pop();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::expression::{Expr, Literal, Variable};

    fn declare(name: &str, line: usize) -> Statement {
        Statement::Assignment(Assignment::declare(Expr::Variable(Variable::new(name, line)),
                                                  Expr::Literal(Literal::new(1, line)),
                                                  line))
    }

    #[test]
    fn insertion_without_block_fails() {
        let mut traversal = TraversalContext::default();
        assert_eq!(traversal.insert_before_current(declare("x", 1)),
                   Err(CheckError::NoOwningBlock));
    }

    #[test]
    fn insertions_keep_their_order_and_skip_visiting() {
        let mut block = vec![declare("a", 1), declare("b", 2)];
        let mut traversal = TraversalContext::default();
        let mut visited = Vec::new();

        traversal.walk_block(&mut block, |traversal, statement| {
                     visited.push(statement.line());
                     if statement.line() == 2 {
                         traversal.insert_before_current(declare("c", 10))?;
                         traversal.insert_before_current(declare("d", 11))?;
                     }
                     Ok::<(), CheckError>(())
                 })
                 .unwrap();

        assert_eq!(visited, vec![1, 2]);
        let lines: Vec<_> = block.iter().map(Statement::line).collect();
        assert_eq!(lines, vec![1, 10, 11, 2]);
    }

    #[test]
    fn nested_blocks_splice_into_the_innermost() {
        let mut outer = vec![declare("a", 1)];
        let mut inner = vec![declare("b", 2)];
        let mut traversal = TraversalContext::default();

        traversal.walk_block(&mut outer, |traversal, _| {
                     assert_eq!(traversal.depth(), 1);
                     traversal.walk_block(&mut inner, |traversal, _| {
                                  assert_eq!(traversal.depth(), 2);
                                  traversal.insert_before_current(declare("c", 3))
                              })
                 })
                 .unwrap();

        assert_eq!(outer.len(), 1);
        assert_eq!(inner.len(), 2);
        assert_eq!(traversal.depth(), 0);
    }
}
