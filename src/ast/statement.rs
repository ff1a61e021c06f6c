use crate::{
    ast::{
        expression::{Expr, FunctionCall},
        visitor::{StatementVisitor, StatementVisitorMut},
    },
    types::TypeId,
};

/// `{ statements }`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementBlock {
    /// The statements, in execution order.
    pub statements: Vec<Statement>,
    /// Line of the opening brace.
    pub line:       usize,
}

/// `[let] target [: Type] = value;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// A variable, field access or array index.
    pub target:      Expr,
    /// The assigned value.
    pub value:       Expr,
    /// Whether this introduces a new variable with `let`.
    pub declaration: bool,
    /// The explicitly written type of a declaration.
    pub annotation:  Option<TypeId>,
    /// Line number in the source code.
    pub line:        usize,
}

impl Assignment {
    /// Creates a `let` declaration whose type is inferred from `value`.
    #[must_use]
    pub const fn declare(target: Expr, value: Expr, line: usize) -> Self {
        Self { target,
               value,
               declaration: true,
               annotation: None,
               line }
    }

    /// Creates an assignment to an existing place.
    #[must_use]
    pub const fn assign(target: Expr, value: Expr, line: usize) -> Self {
        Self { target,
               value,
               declaration: false,
               annotation: None,
               line }
    }
}

/// `ret value;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Return {
    /// The returned expression.
    pub value: Expr,
    /// Line number in the source code.
    pub line:  usize,
}

/// `if condition: then [else: otherwise]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfElse {
    /// Must be `Bool`.
    pub condition: Expr,
    /// Executed when the condition holds.
    pub then:      Box<Statement>,
    /// Executed otherwise.
    pub otherwise: Option<Box<Statement>>,
    /// Line number in the source code.
    pub line:      usize,
}

/// `while condition: body`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct While {
    /// Must be `Bool`.
    pub condition: Expr,
    /// The loop body.
    pub body:      Box<Statement>,
    /// Line number in the source code.
    pub line:      usize,
}

/// `for init condition; step: body`
///
/// The initializer is scoped to the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct For {
    /// Runs once before the first condition check.
    pub init:      Box<Statement>,
    /// Must be `Bool`.
    pub condition: Expr,
    /// Runs after every iteration.
    pub step:      Box<Statement>,
    /// The loop body.
    pub body:      Box<Statement>,
    /// Line number in the source code.
    pub line:      usize,
}

/// A statement node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `{ ... }`
    Block(StatementBlock),
    /// `[let] target = value;`
    Assignment(Assignment),
    /// `ret value;`
    Return(Return),
    /// `if ...: ... else: ...`
    IfElse(IfElse),
    /// `while ...: ...`
    While(While),
    /// `for ...: ...`
    For(For),
    /// A call whose result is discarded.
    Call(FunctionCall),
}

impl Statement {
    /// Line number in the source code.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::Block(StatementBlock { line, .. })
            | Self::Assignment(Assignment { line, .. })
            | Self::Return(Return { line, .. })
            | Self::IfElse(IfElse { line, .. })
            | Self::While(While { line, .. })
            | Self::For(For { line, .. })
            | Self::Call(FunctionCall { line, .. }) => *line,
        }
    }

    /// Dispatches to the matching method of `visitor`.
    pub fn accept<V: StatementVisitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            Self::Block(node) => visitor.visit_block(node),
            Self::Assignment(node) => visitor.visit_assignment(node),
            Self::Return(node) => visitor.visit_return(node),
            Self::IfElse(node) => visitor.visit_if_else(node),
            Self::While(node) => visitor.visit_while(node),
            Self::For(node) => visitor.visit_for(node),
            Self::Call(node) => visitor.visit_call_statement(node),
        }
    }

    /// Dispatches to the matching method of a mutating `visitor`.
    pub fn accept_mut<V: StatementVisitorMut + ?Sized>(&mut self, visitor: &mut V) -> V::Output {
        match self {
            Self::Block(node) => visitor.visit_block(node),
            Self::Assignment(node) => visitor.visit_assignment(node),
            Self::Return(node) => visitor.visit_return(node),
            Self::IfElse(node) => visitor.visit_if_else(node),
            Self::While(node) => visitor.visit_while(node),
            Self::For(node) => visitor.visit_for(node),
            Self::Call(node) => visitor.visit_call_statement(node),
        }
    }
}
