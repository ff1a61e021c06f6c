/// Result type used throughout the parser family.
pub type ParseResult<T> = Result<T, ParseError>;

/// Represents all errors that can occur during lexing or parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A character sequence matched no token pattern.
    #[error("could not tokenize '{text}'")]
    InvalidToken {
        /// The offending source text.
        text: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// The token queue ran dry in the middle of a construct.
    #[error("unexpected end of tokens")]
    UnexpectedEndOfTokens {
        /// The line of the last token that was consumed.
        line: usize,
    },
    /// The token queue ran dry while a specific construct was being parsed.
    #[error("Unexpected end of {construct}")]
    UnexpectedEndOf {
        /// Human readable name of the construct.
        construct: &'static str,
        /// The source line where the error occurred.
        line:      usize,
    },
    /// A token of a different kind was required.
    #[error("{found} does not equal expected {expected}")]
    UnexpectedToken {
        /// Description of the token that was found.
        found:    String,
        /// Description of the token that was expected.
        expected: String,
        /// The source line where the error occurred.
        line:     usize,
    },
    /// A bracket was opened but never closed.
    #[error("expected end of scope operator '{closing}'")]
    UnclosedScope {
        /// The closing bracket that was never found.
        closing: String,
        /// The line of the opening bracket.
        line:    usize,
    },
    /// Tokens that cannot start a statement.
    #[error("{tokens} is not a valid statement")]
    InvalidStatement {
        /// The rejected tokens, joined by spaces.
        tokens: String,
        /// The source line where the error occurred.
        line:   usize,
    },
    /// A token that cannot start an expression.
    #[error("{token} is not a valid expression")]
    InvalidExpression {
        /// The rejected token text.
        token: String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// A binary operator appeared where an operand was required.
    #[error("missing left hand side of binary operation")]
    MissingLeftOperand {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A statement that starts with a variable is neither a call nor an
    /// assignment.
    #[error("missing assignment operator or brackets")]
    MissingAssignment {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A `;` terminator was missing.
    #[error("no semi colon at the end of {construct}")]
    MissingSemicolon {
        /// Human readable name of the construct.
        construct: &'static str,
        /// The source line where the error occurred.
        line:      usize,
    },
    /// Only variables and fields can be called.
    #[error("only variables and fields can be called")]
    InvalidCallee {
        /// The source line where the error occurred.
        line: usize,
    },
    /// The left side of `=` is not a variable, field or array element.
    #[error("cannot assign to this expression")]
    InvalidAssignmentTarget {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A `for` loop initializer that is not an assignment.
    #[error("for loop initializer must be an assignment")]
    InvalidForInitializer {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A type name that is not declared in the current module.
    #[error("no type named {name}")]
    UnknownType {
        /// The unknown type name.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A type declared twice in the same module.
    #[error("redeclaration of type {name}")]
    DuplicateType {
        /// The type name.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// An unknown entry in a function's trait list.
    #[error("unknown trait {name}")]
    UnknownTrait {
        /// The unknown trait.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// Junk between a function's signature and its body.
    #[error("{token} is not a valid function signature")]
    InvalidSignature {
        /// The unexpected token text.
        token: String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// A formal parameter declared as `Void`.
    #[error("parameter {name} cannot be of type Void")]
    VoidParameter {
        /// The parameter name.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A field declared as `Void`.
    #[error("field {name} cannot be of type Void")]
    VoidField {
        /// The field name.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A list or array whose elements would be `Void`.
    #[error("elements cannot be of type Void")]
    VoidElement {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A cast whose target type is `Void`.
    #[error("cannot cast to Void")]
    CastToVoid {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A list literal without elements.
    #[error("cannot infer the element type of an empty list literal")]
    EmptyListLiteral {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A list literal whose first element has no type before checking.
    #[error("the first element of a list literal must be a literal value")]
    UntypedListLiteral {
        /// The source line where the error occurred.
        line: usize,
    },
    /// An array initializer without elements.
    #[error("array initializer cannot be empty")]
    EmptyArrayInitializer {
        /// The source line where the error occurred.
        line: usize,
    },
    /// An array initializer element that is not a literal.
    #[error("array initializer can only be literal value")]
    ArrayInitializerNotLiteral {
        /// The source line where the error occurred.
        line: usize,
    },
    /// An integer literal outside of the `Int` range.
    #[error("literal {text} is too large")]
    LiteralTooLarge {
        /// The literal text.
        text: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A field declared twice in the same type.
    #[error("{owner} already has a field named {field}")]
    DuplicateField {
        /// The declaring type.
        owner: String,
        /// The duplicated field.
        field: String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// A function identifier declared twice in the same module.
    #[error("redeclaration of function {name}")]
    DuplicateFunction {
        /// The mangled function name.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A method declared twice in the same type.
    #[error("{owner} already has method named {name}")]
    DuplicateMethod {
        /// The declaring type.
        owner: String,
        /// The method name.
        name:  String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// An `override` method without a matching virtual method in the parent
    /// chain.
    #[error("{owner}.{name} does not override a virtual method with a matching signature")]
    InvalidOverride {
        /// The declaring type.
        owner: String,
        /// The method name.
        name:  String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// Inheritance from something that is not an object type.
    #[error("Cannot derive from non-object type {name}")]
    NonObjectParent {
        /// The rejected parent type.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// An unknown `@annotation`.
    #[error("no valid annotation named {name}")]
    UnknownAnnotation {
        /// The annotation text.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// `use` of a module that was not compiled before this one.
    #[error("no module named {name}")]
    UnknownModule {
        /// The module name.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// `use` of an item that the module does not declare.
    #[error("no function or object named {item} in module {module}")]
    UnknownImport {
        /// The requested item.
        item:   String,
        /// The module searched.
        module: String,
        /// The source line where the error occurred.
        line:   usize,
    },
    /// `use` of a function that is not public.
    #[error("cannot use function {name} because it is private")]
    PrivateImport {
        /// The function name.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
}

impl ParseError {
    /// Returns the line the error is attributed to.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::InvalidToken { line, .. }
            | Self::UnexpectedEndOfTokens { line }
            | Self::UnexpectedEndOf { line, .. }
            | Self::UnexpectedToken { line, .. }
            | Self::UnclosedScope { line, .. }
            | Self::InvalidStatement { line, .. }
            | Self::InvalidExpression { line, .. }
            | Self::MissingLeftOperand { line }
            | Self::MissingAssignment { line }
            | Self::MissingSemicolon { line, .. }
            | Self::InvalidCallee { line }
            | Self::InvalidAssignmentTarget { line }
            | Self::InvalidForInitializer { line }
            | Self::UnknownType { line, .. }
            | Self::DuplicateType { line, .. }
            | Self::UnknownTrait { line, .. }
            | Self::InvalidSignature { line, .. }
            | Self::VoidParameter { line, .. }
            | Self::VoidField { line, .. }
            | Self::VoidElement { line }
            | Self::CastToVoid { line }
            | Self::EmptyListLiteral { line }
            | Self::UntypedListLiteral { line }
            | Self::EmptyArrayInitializer { line }
            | Self::ArrayInitializerNotLiteral { line }
            | Self::LiteralTooLarge { line, .. }
            | Self::DuplicateField { line, .. }
            | Self::DuplicateFunction { line, .. }
            | Self::DuplicateMethod { line, .. }
            | Self::InvalidOverride { line, .. }
            | Self::NonObjectParent { line, .. }
            | Self::UnknownAnnotation { line, .. }
            | Self::UnknownModule { line, .. }
            | Self::UnknownImport { line, .. }
            | Self::PrivateImport { line, .. } => *line,
        }
    }

    /// Names the construct that was cut short when the token queue ran out.
    ///
    /// Any other error is returned unchanged.
    #[must_use]
    pub fn in_construct(self, construct: &'static str) -> Self {
        match self {
            Self::UnexpectedEndOfTokens { line } => Self::UnexpectedEndOf { construct, line },
            other => other,
        }
    }

    /// Returns `true` if the error means the token queue is exhausted.
    #[must_use]
    pub const fn is_end_of_tokens(&self) -> bool {
        matches!(self, Self::UnexpectedEndOfTokens { .. } | Self::UnexpectedEndOf { .. })
    }

    /// Returns `true` if producing the error already skipped the rejected
    /// tokens, so the parser must not skip ahead again.
    #[must_use]
    pub const fn has_recovered(&self) -> bool {
        matches!(self, Self::InvalidStatement { .. })
    }
}
