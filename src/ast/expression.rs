use std::fmt;

use ordered_float::OrderedFloat;

use crate::{
    ast::{
        function::FunctionId,
        visitor::{ExpressionVisitor, ExpressionVisitorMut},
    },
    context::CompilationContext,
    types::TypeId,
};

/// A constant written directly in the source.
///
/// Floats are wrapped in [`OrderedFloat`] so literals, and with them whole
/// expression trees, can be compared and hashed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    /// An `Int` literal.
    Integer(i64),
    /// A `Float` literal.
    Float(OrderedFloat<f64>),
    /// `True` or `False`.
    Boolean(bool),
    /// A string literal, typed `Char`.
    Char(String),
    /// `None`, typed as the `Object` base.
    None,
}

impl LiteralValue {
    /// The declared type of the literal.
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        match self {
            Self::Integer(_) => TypeId::INT,
            Self::Float(_) => TypeId::FLOAT,
            Self::Boolean(_) => TypeId::BOOL,
            Self::Char(_) => TypeId::CHAR,
            Self::None => TypeId::OBJECT,
        }
    }
}

impl From<i64> for LiteralValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for LiteralValue {
    fn from(value: f64) -> Self {
        Self::Float(OrderedFloat(value))
    }
}

impl From<bool> for LiteralValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        Self::Char(value.to_string())
    }
}

/// Binary operators, in the order the grammar lists them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessOrEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterOrEqual,
    /// `and`
    And,
    /// `or`
    Or,
}

impl BinaryOperator {
    /// Returns `true` for operators that always produce a `Bool`.
    #[must_use]
    pub const fn is_boolean(self) -> bool {
        !matches!(self, Self::Add | Self::Subtract | Self::Multiply | Self::Divide)
    }

    /// The source spelling of the operator.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// `lhs op rhs`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryOperation {
    /// The operator.
    pub op:   BinaryOperator,
    /// Left operand.
    pub lhs:  Box<Expr>,
    /// Right operand.
    pub rhs:  Box<Expr>,
    /// Line number in the source code.
    pub line: usize,
}

/// A literal expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    /// The constant.
    pub value: LiteralValue,
    /// Line number in the source code.
    pub line:  usize,
}

impl Literal {
    /// Creates a literal.
    pub fn new(value: impl Into<LiteralValue>, line: usize) -> Self {
        Self { value: value.into(),
               line }
    }
}

/// A use of a named variable.
///
/// `ty` is unset after parsing and filled in by the type checker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    /// The variable name.
    pub name: String,
    /// The resolved type.
    pub ty:   Option<TypeId>,
    /// Line number in the source code.
    pub line: usize,
}

impl Variable {
    /// Creates an unresolved variable.
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self { name: name.into(),
               ty: None,
               line }
    }

    /// Creates a variable whose type is already known.
    pub fn typed(name: impl Into<String>, ty: TypeId, line: usize) -> Self {
        Self { name: name.into(),
               ty: Some(ty),
               line }
    }
}

/// `base.field`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAccess {
    /// The object expression.
    pub base:  Box<Expr>,
    /// The field or method name.
    pub field: String,
    /// The resolved field type.
    pub ty:    Option<TypeId>,
    /// Line number in the source code.
    pub line:  usize,
}

impl FieldAccess {
    /// Creates an unresolved field access.
    pub fn new(base: Expr, field: impl Into<String>, line: usize) -> Self {
        Self { base: Box::new(base),
               field: field.into(),
               ty: None,
               line }
    }
}

/// Allocation of a fresh object of `ty` with default field values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicAllocation {
    /// The allocated object type.
    pub ty:   TypeId,
    /// Line number in the source code.
    pub line: usize,
}

/// Allocation of an array of `size` default elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayAllocation {
    /// The element type.
    pub element: TypeId,
    /// The number of elements.
    pub size:    Box<Expr>,
    /// Line number in the source code.
    pub line:    usize,
}

/// `<a, b, c>`, an array initialized from its elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayExpression {
    /// The element type.
    pub element: TypeId,
    /// The elements, in order.
    pub items:   Vec<Expr>,
    /// Line number in the source code.
    pub line:    usize,
}

/// `array[index]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayIndex {
    /// The indexed expression.
    pub array: Box<Expr>,
    /// The index.
    pub index: Box<Expr>,
    /// Line number in the source code.
    pub line:  usize,
}

/// `&expr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TakeReference {
    /// The referenced expression.
    pub expr: Box<Expr>,
    /// Line number in the source code.
    pub line: usize,
}

/// `expr as Type`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cast {
    /// The converted expression.
    pub expr: Box<Expr>,
    /// The target type.
    pub to:   TypeId,
    /// Line number in the source code.
    pub line: usize,
}

/// A call, usable both as an expression and as a statement.
///
/// `target` is the handle of the called function in the function arena. It is
/// unset after parsing and bound by the type checker. When the call goes
/// through a receiver (`p.sum()`), the checker moves a copy of the receiver in
/// front of the arguments and sets `receiver_injected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    /// The called name as written: a variable or a field access.
    pub callee:            Box<Expr>,
    /// The arguments, in order.
    pub arguments:         Vec<Expr>,
    /// The resolved function.
    pub target:            Option<FunctionId>,
    /// Whether the receiver was prepended to `arguments`.
    pub receiver_injected: bool,
    /// Line number in the source code.
    pub line:              usize,
}

impl FunctionCall {
    /// Creates an unresolved call.
    pub fn new(callee: Expr, arguments: Vec<Expr>, line: usize) -> Self {
        Self { callee: Box::new(callee),
               arguments,
               target: None,
               receiver_injected: false,
               line }
    }

    /// The name of the called function, without any receiver.
    #[must_use]
    pub fn name(&self) -> &str {
        match self.callee.as_ref() {
            Expr::Variable(variable) => &variable.name,
            Expr::FieldAccess(access) => &access.field,
            _ => "<expression>",
        }
    }
}

impl From<FieldAccess> for Expr {
    fn from(access: FieldAccess) -> Self {
        Self::FieldAccess(access)
    }
}

impl From<Variable> for Expr {
    fn from(variable: Variable) -> Self {
        Self::Variable(variable)
    }
}

/// An expression node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// `lhs op rhs`
    BinaryOperation(BinaryOperation),
    /// A constant.
    Literal(Literal),
    /// A named variable.
    Variable(Variable),
    /// `base.field`
    FieldAccess(FieldAccess),
    /// A fresh object.
    DynamicAllocation(DynamicAllocation),
    /// A fresh array of default elements.
    ArrayAllocation(ArrayAllocation),
    /// `<a, b, c>`
    ArrayExpression(ArrayExpression),
    /// `array[index]`
    ArrayIndex(ArrayIndex),
    /// `&expr`
    TakeReference(TakeReference),
    /// `expr as Type`
    Cast(Cast),
    /// `callee(arguments)`
    Call(FunctionCall),
}

impl Expr {
    /// Line number in the source code.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::BinaryOperation(BinaryOperation { line, .. })
            | Self::Literal(Literal { line, .. })
            | Self::Variable(Variable { line, .. })
            | Self::FieldAccess(FieldAccess { line, .. })
            | Self::DynamicAllocation(DynamicAllocation { line, .. })
            | Self::ArrayAllocation(ArrayAllocation { line, .. })
            | Self::ArrayExpression(ArrayExpression { line, .. })
            | Self::ArrayIndex(ArrayIndex { line, .. })
            | Self::TakeReference(TakeReference { line, .. })
            | Self::Cast(Cast { line, .. })
            | Self::Call(FunctionCall { line, .. }) => *line,
        }
    }

    /// The type of the expression as far as it is known.
    ///
    /// This never mutates the tree: variables and fields report the type the
    /// checker stored on them, calls the return type of their bound target.
    /// `None` means the type is not resolved yet.
    #[must_use]
    pub fn ty(&self, ctx: &CompilationContext) -> Option<TypeId> {
        match self {
            Self::BinaryOperation(operation) => {
                if operation.op.is_boolean() {
                    Some(TypeId::BOOL)
                } else {
                    operation.lhs.ty(ctx)
                }
            },
            Self::Literal(literal) => Some(literal.value.type_id()),
            Self::Variable(variable) => variable.ty,
            Self::FieldAccess(access) => access.ty,
            Self::DynamicAllocation(allocation) => Some(allocation.ty),
            Self::ArrayAllocation(ArrayAllocation { element, .. })
            | Self::ArrayExpression(ArrayExpression { element, .. }) => {
                ctx.types.find_array(*element)
            },
            Self::ArrayIndex(index) => {
                index.array
                     .ty(ctx)
                     .and_then(|array| ctx.types.element_of(array))
            },
            Self::TakeReference(reference) => {
                reference.expr
                         .ty(ctx)
                         .and_then(|referent| ctx.types.find_reference(referent))
            },
            Self::Cast(cast) => Some(cast.to),
            Self::Call(call) => call.target.map(|id| ctx.functions.get(id).return_type),
        }
    }

    /// Returns `true` for expressions that denote a storage location.
    #[must_use]
    pub const fn is_place(&self) -> bool {
        matches!(self, Self::Variable(_) | Self::FieldAccess(_) | Self::ArrayIndex(_))
    }

    /// Dispatches to the matching method of `visitor`.
    pub fn accept<V: ExpressionVisitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            Self::BinaryOperation(node) => visitor.visit_binary_operation(node),
            Self::Literal(node) => visitor.visit_literal(node),
            Self::Variable(node) => visitor.visit_variable(node),
            Self::FieldAccess(node) => visitor.visit_field_access(node),
            Self::DynamicAllocation(node) => visitor.visit_dynamic_allocation(node),
            Self::ArrayAllocation(node) => visitor.visit_array_allocation(node),
            Self::ArrayExpression(node) => visitor.visit_array_expression(node),
            Self::ArrayIndex(node) => visitor.visit_array_index(node),
            Self::TakeReference(node) => visitor.visit_take_reference(node),
            Self::Cast(node) => visitor.visit_cast(node),
            Self::Call(node) => visitor.visit_call(node),
        }
    }

    /// Dispatches to the matching method of a mutating `visitor`.
    pub fn accept_mut<V: ExpressionVisitorMut + ?Sized>(&mut self, visitor: &mut V) -> V::Output {
        match self {
            Self::BinaryOperation(node) => visitor.visit_binary_operation(node),
            Self::Literal(node) => visitor.visit_literal(node),
            Self::Variable(node) => visitor.visit_variable(node),
            Self::FieldAccess(node) => visitor.visit_field_access(node),
            Self::DynamicAllocation(node) => visitor.visit_dynamic_allocation(node),
            Self::ArrayAllocation(node) => visitor.visit_array_allocation(node),
            Self::ArrayExpression(node) => visitor.visit_array_expression(node),
            Self::ArrayIndex(node) => visitor.visit_array_index(node),
            Self::TakeReference(node) => visitor.visit_take_reference(node),
            Self::Cast(node) => visitor.visit_cast(node),
            Self::Call(node) => visitor.visit_call(node),
        }
    }
}
