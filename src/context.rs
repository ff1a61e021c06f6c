use crate::{ast::function::FunctionArena, diagnostics::Diagnostics, types::TypeRegistry};

/// State shared by every phase of one compilation.
///
/// The parser, checker and interpreter receive the context explicitly instead
/// of reaching for process-wide registries, so two compilations never observe
/// each other's types, functions or diagnostics.
#[derive(Debug, Default)]
pub struct CompilationContext {
    /// Errors and warnings recorded so far.
    pub diagnostics: Diagnostics,
    /// Every type known to the compilation.
    pub types:       TypeRegistry,
    /// Every function known to the compilation.
    pub functions:   FunctionArena,
}

impl CompilationContext {
    /// Creates a context with only the builtin types.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
