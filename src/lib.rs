//! # kvantum
//!
//! kvantum is a small statically typed language with objects, single
//! inheritance, virtual methods, arrays and generic lists. This crate holds
//! its front end (lexer, parser and type checker) and a tree-walking
//! interpreter that runs the checked program.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

use std::{
    io::{BufRead, Write},
    path::Path,
};

use crate::{
    compiler::Compiler,
    error::Error,
    interpreter::{Interpreter, Value},
    lexer::SourceFile,
};

/// Defines the structure of parsed code.
///
/// Expressions and statements are plain enums owned by the function that
/// contains them; functions live in an arena and are referred to by id.
///
/// # Responsibilities
/// - Expression, statement and function node types.
/// - Read-only and mutating visitor traits.
/// - The traversal context that lets a visitor splice statements into the
///   block being walked.
pub mod ast;
/// The type checker.
///
/// Walks every function of the compiled modules, resolves the type of each
/// expression, binds calls to their target function and fills in inferred
/// return types.
pub mod checker;
/// The compilation driver.
///
/// # Responsibilities
/// - Owns the builtin module and every compiled module.
/// - Runs lexing, parsing and checking, stopping at the first phase that
///   recorded an error.
/// - Hands the checked modules to a [`CodeExecutor`](compiler::CodeExecutor).
pub mod compiler;
/// State shared by all phases of one compilation.
pub mod context;
/// The sink every phase records warnings and errors in.
pub mod diagnostics;
/// Provides unified error types for every phase.
///
/// This module defines the errors raised while parsing, checking and
/// running a program. Every variant carries the source line it belongs to
/// where one is known.
pub mod error;
/// Runs checked programs.
///
/// # Responsibilities
/// - Runtime values with shared objects and arrays.
/// - Statement execution and expression evaluation over the checked tree.
/// - The native functions of the builtin module.
pub mod interpreter;
/// Turns source text into tokens.
///
/// Built on a `logos` lexer. Each file keeps its own diagnostics, so several
/// files can be lexed at once.
pub mod lexer;
/// One compiled source file: its types and functions.
pub mod module;
/// The recursive descent parser family.
pub mod parser;
/// Expands `import` lines into the ordered list of files to compile.
pub mod preprocessor;
/// A stack of scoped name bindings.
pub mod symbol_stack;
/// The type system: primitive, object, array, reference and list types.
pub mod types;
/// General utilities for safe numeric conversion.
///
/// These helpers are used by the interpreter whenever a runtime value turns
/// into an index, a size or a number of another kind.
pub mod util;

/// Compiles `source` as a single module and runs it on the process's
/// standard streams.
///
/// # Errors
/// Returns an error if compilation fails or the program raises a runtime
/// error.
///
/// # Examples
/// ```
/// use kvantum::{interpreter::Value, run_source};
///
/// let source = "fn fact(n: Int) -> Int { if n < 2: ret 1; ret n * fact(n - 1); }\nfn main() => fact(5);";
/// assert_eq!(run_source(source).unwrap(), Value::Int(120));
///
/// // `x` is not defined
/// assert!(run_source("let y = x + 1;").is_err());
/// ```
pub fn run_source(source: &str) -> Result<Value, Error> {
    run_source_with_io(source, std::io::stdin().lock(), std::io::stdout())
}

/// Like [`run_source`], but the program reads from `input` and writes to
/// `output`.
///
/// # Errors
/// Returns an error if compilation fails or the program raises a runtime
/// error.
pub fn run_source_with_io(source: &str, input: impl BufRead, output: impl Write) -> Result<Value, Error> {
    run_sources(&[SourceFile::new("main.kv", source)], input, output)
}

/// Compiles the entry file at `path` together with everything it imports
/// and runs it on the process's standard streams.
///
/// # Errors
/// Returns an error if a file cannot be read, compilation fails or the
/// program raises a runtime error.
pub fn run_file(path: impl AsRef<Path>) -> Result<Value, Error> {
    let sources = preprocessor::preprocess(path)?;
    run_sources(&sources, std::io::stdin().lock(), std::io::stdout())
}

fn run_sources(sources: &[SourceFile], input: impl BufRead, output: impl Write) -> Result<Value, Error> {
    let mut compiler = Compiler::new();
    compiler.compile(sources)?;

    let mut interpreter = Interpreter::with_io(compiler.context(), input, output);
    Ok(compiler.execute(&mut interpreter)?)
}
