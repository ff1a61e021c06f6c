use std::{sync::Arc, thread};

use logos::Logos;

use crate::{
    diagnostics::Diagnostic,
    error::ParseError,
    lexer::{
        stream::TokenStream,
        token::{LexerExtras, Token, TokenKind},
    },
};

/// Bracket balanced sub-streams.
///
/// A [`Scope`](scope::Scope) cuts a `{}`, `()`, `[]` or `<>` run out of a
/// stream so the parser can recurse into it with its own cursor.
pub mod scope;
/// The token queue cursor used by the parser.
pub mod stream;
/// Token kinds, tokens and literal helpers.
pub mod token;

/// A source file's text together with the name it is known by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path or label of the file. Diagnostics are keyed by it.
    pub path: String,
    /// The file contents.
    pub text: String,
}

impl SourceFile {
    /// Creates a source file from a label and its text.
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self { path: path.into(),
               text: text.into() }
    }

    /// The module name derived from the path: the file stem.
    ///
    /// # Example
    /// ```
    /// use kvantum::lexer::SourceFile;
    ///
    /// assert_eq!(SourceFile::new("lib/math.kv", "").module_name(), "math");
    /// assert_eq!(SourceFile::new("main", "").module_name(), "main");
    /// ```
    #[must_use]
    pub fn module_name(&self) -> String {
        let file = self.path.rsplit(['/', '\\']).next().unwrap_or(&self.path);
        file.split('.').next().unwrap_or(file).to_string()
    }
}

/// The outcome of lexing one file.
///
/// Diagnostics are kept with the file instead of going to a shared sink, so
/// files can be lexed concurrently and merged afterwards in order.
#[derive(Debug)]
pub struct LexedFile {
    /// The file label.
    pub file:        String,
    /// The token queue, terminated by an end-of-file sentinel.
    pub tokens:      TokenStream,
    /// Tokenization errors.
    pub diagnostics: Vec<Diagnostic>,
}

impl LexedFile {
    /// Returns `true` if the file could not be tokenized completely.
    #[must_use]
    pub fn has_error(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Converts source text into a token queue.
///
/// Characters that match no pattern are reported and skipped, so lexing
/// always reaches the end of the file.
///
/// # Example
/// ```
/// use kvantum::lexer::{token::TokenKind, tokenize};
///
/// let lexed = tokenize("main.kv", "let x = 1 + 2;");
/// let kinds: Vec<TokenKind> = lexed.tokens.iter().map(|t| t.kind).collect();
///
/// assert_eq!(kinds,
///            vec![TokenKind::Let,
///                 TokenKind::Identifier,
///                 TokenKind::Equals,
///                 TokenKind::Integer,
///                 TokenKind::Plus,
///                 TokenKind::Integer,
///                 TokenKind::SemiColon,
///                 TokenKind::EndOfFile]);
/// ```
#[must_use]
pub fn tokenize(file: &str, source: &str) -> LexedFile {
    let name: Arc<str> = Arc::from(file);
    let mut tokens = Vec::new();
    let mut diagnostics = Vec::new();

    let mut lexer = TokenKind::lexer_with_extras(source, LexerExtras { line: 1 });
    while let Some(result) = lexer.next() {
        match result {
            Ok(kind) => tokens.push(Token::new(kind, lexer.slice(), &name, lexer.extras.line)),
            Err(()) => {
                let error = ParseError::InvalidToken { text: lexer.slice().to_string(),
                                                       line: lexer.extras.line, };
                diagnostics.push(Diagnostic::error(file, error.line(), error));
            },
        }
    }
    tokens.push(Token::end_of_file(&name, lexer.extras.line));

    tracing::trace!(file, tokens = tokens.len(), "file tokenized");

    LexedFile { file: file.to_string(),
                tokens: TokenStream::new(name, tokens),
                diagnostics }
}

/// Lexes every file on its own thread and returns the results in input order.
#[must_use]
pub fn tokenize_all(sources: &[SourceFile]) -> Vec<LexedFile> {
    if sources.len() < 2 {
        return sources.iter()
                      .map(|source| tokenize(&source.path, &source.text))
                      .collect();
    }

    thread::scope(|scope| {
        let handles: Vec<_> =
            sources.iter()
                   .map(|source| scope.spawn(move || tokenize(&source.path, &source.text)))
                   .collect();

        handles.into_iter()
               .zip(sources)
               .map(|(handle, source)| {
                   handle.join()
                         .unwrap_or_else(|_| tokenize(&source.path, &source.text))
               })
               .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize("t.kv", source).tokens.iter().map(|token| token.kind).collect()
    }

    #[test]
    fn simple_assignment() {
        use TokenKind::*;
        assert_eq!(kinds("let x = 1 + 2;"),
                   vec![Let, Identifier, Equals, Integer, Plus, Integer, SemiColon, EndOfFile]);
    }

    #[test]
    fn longest_match_wins() {
        use TokenKind::*;
        assert_eq!(kinds("a <= b <- c -> d => e == f :: g"),
                   vec![Identifier, LessOrEqual, Identifier, BackArrow, Identifier, Arrow, Identifier, DualArrow,
                        Identifier, LogEqual, Identifier, NamespaceScope, Identifier, EndOfFile]);
        assert_eq!(kinds("letter returned"), vec![Identifier, Identifier, EndOfFile]);
    }

    #[test]
    fn lines_and_comments() {
        let lexed = tokenize("t.kv", "let a = 1; // one\n\nret a;");
        let lines: Vec<usize> = lexed.tokens.iter().map(|token| token.line).collect();
        assert_eq!(lines, vec![1, 1, 1, 1, 1, 3, 3, 3, 3]);
        assert!(lexed.diagnostics.is_empty());
    }

    #[test]
    fn literals() {
        use TokenKind::*;
        assert_eq!(kinds("42 3.5 2. True None \"hi there\""),
                   vec![Integer, Rational, Rational, Boolean, None, String, EndOfFile]);
    }

    #[test]
    fn unknown_characters_are_reported() {
        let lexed = tokenize("t.kv", "let a = 1 $ 2;");
        assert_eq!(lexed.diagnostics.len(), 1);
        assert_eq!(lexed.diagnostics[0].message, "could not tokenize '$'");
    }

    #[test]
    fn files_keep_their_order_when_lexed_together() {
        let sources = [SourceFile::new("a.kv", "let a = 1;"),
                       SourceFile::new("b.kv", "fn f() => 2;"),
                       SourceFile::new("c.kv", "ret 3;")];
        let files: Vec<String> = tokenize_all(&sources).into_iter().map(|lexed| lexed.file).collect();
        assert_eq!(files, ["a.kv", "b.kv", "c.kv"]);
    }
}
