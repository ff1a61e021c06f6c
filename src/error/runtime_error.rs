/// Result type used throughout the interpreter.
pub type EvalResult<T> = Result<T, RuntimeError>;

/// Errors raised while a checked program runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    /// A variable that is not bound in the current frame.
    #[error("Error on line {line}: Unknown variable '{name}'.")]
    UnknownVariable {
        /// The variable name.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A field that the object value does not carry.
    #[error("Error on line {line}: Unknown field '{name}'.")]
    UnknownField {
        /// The field name.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A call that was never bound to a function by the type checker.
    #[error("Error on line {line}: Call to '{name}' was never resolved.")]
    UnresolvedCall {
        /// The called name.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A native function without an implementation.
    #[error("Error on line {line}: No native implementation for '{name}'.")]
    MissingNative {
        /// The function name.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// An operation applied to values of incompatible kinds.
    #[error("Error on line {line}: Type violation: cannot apply '{operation}' to {lhs} and {rhs}.")]
    TypeViolation {
        /// The operator or operation.
        operation: String,
        /// Kind of the left value.
        lhs:       &'static str,
        /// Kind of the right value.
        rhs:       &'static str,
        /// The source line where the error occurred.
        line:      usize,
    },
    /// A condition that did not evaluate to a boolean.
    #[error("Error on line {line}: Expected boolean.")]
    ExpectedBoolean {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A value that should have been an integer.
    #[error("Error on line {line}: Expected integer.")]
    ExpectedInteger {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A value that should have been an array.
    #[error("Error on line {line}: Expected array.")]
    ExpectedArray {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A value that should have been an object.
    #[error("Error on line {line}: Expected object.")]
    ExpectedObject {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A call with the wrong number of arguments.
    #[error("Error on line {line}: '{name}' expects {expected} arguments, but {found} were provided.")]
    ArgumentCountMismatch {
        /// The function name.
        name:     String,
        /// Number of formal parameters.
        expected: usize,
        /// Number of supplied arguments.
        found:    usize,
        /// The source line where the error occurred.
        line:     usize,
    },
    /// Tried to access an array element outside the allowed bounds.
    #[error("Error on line {line}: index out of range for array. Length is {len}, but found {found}.")]
    IndexOutOfBounds {
        /// The length of the array.
        len:   usize,
        /// The index that was actually requested.
        found: i64,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// An allocation or copy with a negative element count.
    #[error("Error on line {line}: Size must not be negative, found {size}.")]
    NegativeSize {
        /// The requested size.
        size: i64,
        /// The source line where the error occurred.
        line: usize,
    },
    /// An array allocation larger than the host can provide.
    #[error("Error on line {line}: Could not allocate an array of {size} elements.")]
    AllocationFailed {
        /// The requested element count.
        size: usize,
        /// The source line where the error occurred.
        line: usize,
    },
    /// Attempted integer division by zero.
    #[error("Error on line {line}: Division by zero.")]
    DivisionByZero {
        /// The source line where the error occurred.
        line: usize,
    },
    /// Integer arithmetic or a conversion overflowed.
    #[error("Error on line {line}: Integer overflow while trying to compute result.")]
    Overflow {
        /// The source line where the error occurred.
        line: usize,
    },
    /// The program called `panic`.
    #[error("Error on line {line}: panic: {message}")]
    Panic {
        /// The message passed to `panic`.
        message: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// Reading from or writing to the program's standard streams failed.
    #[error("Error on line {line}: I/O failure: {details}.")]
    Io {
        /// Description of the failure.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// `exec` was called before any module was generated.
    #[error("no module was generated for execution")]
    NoEntryModule,
}
