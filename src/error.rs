use std::path::PathBuf;

/// Parsing errors.
///
/// Defines all error types that can occur while turning a token stream into a
/// module. Parse errors are recorded into the diagnostics sink at the nearest
/// recovery point (statement, declaration or scope boundary) and never stop
/// the parser on their own.
pub mod parse_error;
/// Type checking errors.
///
/// Every type resolution step returns a [`CheckResult`], so a failed node is
/// reported once and the checker moves on to the next statement instead of
/// carrying an error marker through the tree.
pub mod check_error;
/// Runtime errors.
///
/// Contains all error types that can be raised while the interpreter executes
/// a checked program, such as division by zero, type violations between
/// runtime values or out of range indexing.
pub mod runtime_error;

pub use check_error::{CheckError, CheckResult};
pub use parse_error::{ParseError, ParseResult};
pub use runtime_error::{EvalResult, RuntimeError};

/// Errors that stop a compilation before anything is executed.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// A source file could not be read.
    #[error("could not read source file '{}': {source}", path.display())]
    Io {
        /// Path of the unreadable file.
        path:   PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// One or more diagnostics were recorded during a compilation phase.
    #[error("compilation failed with {count} error(s)\n{report}")]
    Diagnostics {
        /// Number of recorded errors.
        count:  usize,
        /// The rendered report, one entry per error with its source line.
        report: String,
    },
}

/// Any failure produced while compiling or running a program.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The program did not compile.
    #[error(transparent)]
    Compile(#[from] CompileError),
    /// The program compiled but failed while running.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}
