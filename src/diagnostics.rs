use std::{
    collections::{BTreeMap, HashMap},
    fmt::{self, Display},
    fs,
};

use crate::error::CompileError;

/// How much the sink records and logs.
///
/// Errors are always recorded. Warnings are recorded from `Warning` upwards
/// and log messages are emitted from `Log` upwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Record errors only and emit nothing else.
    Quiet,
    /// Record errors, drop warnings.
    Error,
    /// Record errors and warnings.
    #[default]
    Warning,
    /// Record errors and warnings and emit log messages.
    Log,
}

/// Severity of a recorded diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Does not prevent execution.
    Warning,
    /// Gates the next compilation phase.
    Error,
}

/// One recorded message with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Whether this is a warning or an error.
    pub severity: Severity,
    /// The rendered message.
    pub message:  String,
    /// Source file the message belongs to.
    pub module:   String,
    /// 1-based line number.
    pub line:     usize,
}

impl Diagnostic {
    /// Creates an error diagnostic.
    pub fn error(module: impl Into<String>, line: usize, message: impl Display) -> Self {
        Self { severity: Severity::Error,
               message: message.to_string(),
               module: module.into(),
               line }
    }

    /// Creates a warning diagnostic.
    pub fn warning(module: impl Into<String>, line: usize, message: impl Display) -> Self {
        Self { severity: Severity::Warning,
               message: message.to_string(),
               module: module.into(),
               line }
    }
}

/// Accumulating error and warning sink.
///
/// Messages are grouped per source file and stay in the sink until
/// [`Diagnostics::fail`] drains them into a report. The sink also tracks the
/// "current" module and line so callers that do not know their location can
/// still be attributed correctly.
///
/// # Example
/// ```
/// use kvantum::diagnostics::Diagnostics;
///
/// let mut diagnostics = Diagnostics::default();
/// diagnostics.register_source("demo.kv", "let x = 1;\nlet x = 2;\n");
/// diagnostics.set_working_module("demo.kv");
/// diagnostics.error_at(2, "redeclaration of local variable x");
///
/// assert!(diagnostics.has_error());
/// let report = diagnostics.report();
/// assert!(report.contains("at line 2 file: demo.kv"));
/// assert!(report.contains("let x = 2;"));
/// ```
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries:   BTreeMap<String, Vec<Diagnostic>>,
    sources:   HashMap<String, String>,
    module:    String,
    line:      usize,
    verbosity: Verbosity,
}

impl Diagnostics {
    /// Sets how much is recorded from now on.
    pub fn set_verbosity(&mut self, verbosity: Verbosity) {
        self.verbosity = verbosity;
    }

    /// Returns the current verbosity.
    #[must_use]
    pub const fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Makes the text of a source file available to the report without
    /// reading it back from disk.
    pub fn register_source(&mut self, module: impl Into<String>, text: impl Into<String>) {
        self.sources.insert(module.into(), text.into());
    }

    /// Sets the module new messages are attributed to.
    pub fn set_working_module(&mut self, module: impl Into<String>) {
        self.module = module.into();
    }

    /// Returns the module new messages are attributed to.
    #[must_use]
    pub fn working_module(&self) -> &str {
        &self.module
    }

    /// Sets the line new messages are attributed to.
    pub fn set_line_index(&mut self, line: usize) {
        self.line = line;
    }

    /// Returns the line new messages are attributed to.
    #[must_use]
    pub const fn line_index(&self) -> usize {
        self.line
    }

    /// Records an error at the current module and line.
    pub fn error(&mut self, message: impl Display) {
        let diagnostic = Diagnostic::error(self.module.clone(), self.line, message);
        self.push(diagnostic);
    }

    /// Records an error at `line` of the current module.
    pub fn error_at(&mut self, line: usize, message: impl Display) {
        self.line = line;
        self.error(message);
    }

    /// Records a warning at the current module and line.
    pub fn warn(&mut self, message: impl Display) {
        let diagnostic = Diagnostic::warning(self.module.clone(), self.line, message);
        self.push(diagnostic);
    }

    /// Emits a log message at the current location.
    pub fn log(&self, message: impl Display) {
        if self.verbosity >= Verbosity::Log {
            tracing::debug!(module = %self.module, line = self.line, "{message}");
        }
    }

    /// Records an already located diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => {
                if self.verbosity > Verbosity::Quiet {
                    tracing::warn!(module = %diagnostic.module,
                                   line = diagnostic.line,
                                   "{}",
                                   diagnostic.message);
                }
                if self.verbosity < Verbosity::Warning {
                    return;
                }
            },
            Severity::Error => {
                tracing::debug!(module = %diagnostic.module,
                                line = diagnostic.line,
                                "{}",
                                diagnostic.message);
            },
        }

        self.entries
            .entry(diagnostic.module.clone())
            .or_default()
            .push(diagnostic);
    }

    /// Records a batch of diagnostics, typically produced off-thread.
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.push(diagnostic);
        }
    }

    /// Returns `true` if at least one error is recorded.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error_count() > 0
    }

    /// Returns the number of recorded errors.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    /// Iterates over every recorded diagnostic, grouped by module.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.values().flatten()
    }

    /// Iterates over the recorded error messages.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.iter().filter(|d| d.severity == Severity::Error)
    }

    /// Iterates over the recorded warning messages.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.iter().filter(|d| d.severity == Severity::Warning)
    }

    /// Renders every recorded error followed by the offending source line.
    ///
    /// Source text comes from [`Diagnostics::register_source`] when present
    /// and is read from disk otherwise.
    #[must_use]
    pub fn report(&self) -> String {
        self.to_string()
    }

    /// Drains the sink into a [`CompileError`] carrying the rendered report.
    pub fn fail(&mut self) -> CompileError {
        let count = self.error_count();
        let report = self.report();
        self.entries.clear();

        CompileError::Diagnostics { count, report }
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (module, diagnostics) in &self.entries {
            let source = self.sources
                             .get(module)
                             .cloned()
                             .or_else(|| fs::read_to_string(module).ok());

            for diagnostic in diagnostics.iter()
                                         .filter(|d| d.severity == Severity::Error)
            {
                writeln!(f, "{} at line {} file: {}", diagnostic.message, diagnostic.line, module)?;

                let line = source.as_deref()
                                 .and_then(|text| text.lines().nth(diagnostic.line.saturating_sub(1)));
                if let Some(line) = line {
                    writeln!(f, "    {}", line.trim())?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_do_not_count_as_errors() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.set_working_module("a.kv");
        diagnostics.warn("Unexpected token");

        assert!(!diagnostics.has_error());
        assert_eq!(diagnostics.warnings().count(), 1);
    }

    #[test]
    fn error_verbosity_drops_warnings() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.set_verbosity(Verbosity::Error);
        diagnostics.warn("dropped");
        diagnostics.error_at(3, "kept");

        assert_eq!(diagnostics.iter().count(), 1);
        assert_eq!(diagnostics.errors().next().map(|d| d.line), Some(3));
    }

    #[test]
    fn fail_drains_the_sink() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.set_working_module("b.kv");
        diagnostics.error("first");
        diagnostics.error("second");

        match diagnostics.fail() {
            CompileError::Diagnostics { count, report } => {
                assert_eq!(count, 2);
                assert!(report.contains("first at line 0 file: b.kv"));
            },
            other => panic!("unexpected error {other:?}"),
        }
        assert!(!diagnostics.has_error());
    }

    #[test]
    fn report_quotes_the_offending_line() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.register_source("c.kv", "let a = 1;\n  let b = c;\n");
        diagnostics.set_working_module("c.kv");
        diagnostics.warn("ignored");
        diagnostics.error_at(2, "variable not declared c");

        assert_eq!(diagnostics.to_string(), "variable not declared c at line 2 file: c.kv\n    let b = c;\n");
        assert_eq!(diagnostics.report(), diagnostics.to_string());
    }
}
