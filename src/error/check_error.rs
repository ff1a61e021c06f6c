/// Result of resolving the type of a node.
pub type CheckResult<T> = Result<T, CheckError>;

/// Semantic errors found by the type checker.
///
/// Types are carried as their display names so an error can outlive the
/// registry it was produced from.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    /// A primitive type name that does not exist.
    #[error("no primitive type named {name}")]
    UnknownType {
        /// The rejected name.
        name: String,
    },
    /// Operands of a binary operation have different types.
    #[error("binary operand types mismatch: {lhs} and {rhs}")]
    OperandMismatch {
        /// Type of the left operand.
        lhs: String,
        /// Type of the right operand.
        rhs: String,
    },
    /// A field access on something that is not an object.
    #[error("cannot access a field of a non-object type {ty}")]
    FieldOfNonObject {
        /// Type of the accessed expression.
        ty: String,
    },
    /// A field that the object type does not declare.
    #[error("{ty} has no field named {field}")]
    UnknownField {
        /// The object type.
        ty:    String,
        /// The missing field.
        field: String,
    },
    /// Use of a variable that was never declared.
    #[error("variable not declared {name}")]
    UndeclaredVariable {
        /// The variable name.
        name: String,
    },
    /// A type name used where a value is expected.
    #[error("{name} is a type, not a value")]
    TypeUsedAsValue {
        /// The type name.
        name: String,
    },
    /// A `let` that redeclares a name live in the current segment.
    #[error("redeclaration of local variable {name}")]
    Redeclaration {
        /// The variable name.
        name: String,
    },
    /// An assigned value whose type differs from the target's type.
    #[error("expression type {found} does not equal specified type {expected}")]
    AssignmentMismatch {
        /// Type of the assigned value.
        found:    String,
        /// Type of the target.
        expected: String,
    },
    /// A `Void` value stored in a variable.
    #[error("cannot assign a Void value to {name}")]
    VoidAssignment {
        /// The variable name.
        name: String,
    },
    /// Indexing into something that is not an array.
    #[error("cannot index non array type {ty}")]
    NotAnArray {
        /// Type of the indexed expression.
        ty: String,
    },
    /// An index expression that is not an `Int`.
    #[error("cannot index with non integer type {ty}")]
    NonIntegerIndex {
        /// Type of the index expression.
        ty: String,
    },
    /// An array allocation whose size is not an `Int`.
    #[error("array size must be Int, found {ty}")]
    NonIntegerSize {
        /// Type of the size expression.
        ty: String,
    },
    /// An array element whose type differs from the array's element type.
    #[error("array element of type {found} does not equal element type {expected}")]
    ArrayElementMismatch {
        /// Type of the element.
        found:    String,
        /// Declared element type.
        expected: String,
    },
    /// A `let` whose target is not a plain name.
    #[error("only variables can be declared")]
    InvalidDeclaration,
    /// `&` applied to something that is not a variable or field.
    #[error("cannot take reference from non-variable")]
    ReferenceOfNonVariable,
    /// A condition of `if`, `while` or `for` that is not a `Bool`.
    #[error("condition must be Bool, found {ty}")]
    ConditionNotBool {
        /// Type of the condition.
        ty: String,
    },
    /// A `ret` whose value has no type.
    #[error("cannot return void")]
    ReturnVoid,
    /// A `ret` whose value differs from the function's return type.
    #[error("{found} is not same as {expected}")]
    ReturnMismatch {
        /// Type of the returned value.
        found:    String,
        /// Return type of the function.
        expected: String,
    },
    /// A call that matches no function of the module.
    #[error("no function named {name} with arguments: {arguments}")]
    UnknownFunction {
        /// The called name.
        name:      String,
        /// Argument types, comma separated.
        arguments: String,
    },
    /// A method call that matches no method of the receiver type.
    #[error("{ty} has no method named {name}")]
    UnknownMethod {
        /// The receiver type.
        ty:   String,
        /// The method name.
        name: String,
    },
    /// A call with the wrong number of arguments.
    #[error("function {name} expects {expected} arguments, but {found} were provided")]
    ArityMismatch {
        /// The function name.
        name:     String,
        /// Number of formal parameters.
        expected: usize,
        /// Number of supplied arguments.
        found:    usize,
    },
    /// An argument whose type differs from the formal parameter.
    #[error("{found} does not equal expected {expected}")]
    ArgumentMismatch {
        /// Type of the argument.
        found:    String,
        /// Type of the parameter.
        expected: String,
    },
    /// A call through something that is neither a variable nor a field.
    #[error("expression is not callable")]
    NotCallable,
    /// A statement splice was requested outside of any statement block.
    #[error("cannot insert a statement without an owning block")]
    NoOwningBlock,
}
