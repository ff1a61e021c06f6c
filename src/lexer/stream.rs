use std::{collections::VecDeque, sync::Arc};

use crate::{
    error::{ParseError, ParseResult},
    lexer::token::{Token, TokenKind},
};

/// A cursor over a queue of tokens.
///
/// File level streams end with an [`TokenKind::EndOfFile`] sentinel; streams
/// cut out by [`Scope`](crate::lexer::scope::Scope) do not, so running off
/// their end yields [`ParseError::UnexpectedEndOfTokens`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStream {
    tokens:    VecDeque<Token>,
    file:      Arc<str>,
    last_line: usize,
}

impl TokenStream {
    /// Creates a stream over `tokens` read from `file`.
    pub fn new(file: Arc<str>, tokens: impl IntoIterator<Item = Token>) -> Self {
        let tokens: VecDeque<Token> = tokens.into_iter().collect();
        let last_line = tokens.front().map_or(1, |t| t.line);

        Self { tokens,
               file,
               last_line }
    }

    /// The file the tokens were read from.
    #[must_use]
    pub fn file(&self) -> &Arc<str> {
        &self.file
    }

    /// Removes and returns the front token.
    pub fn next_token(&mut self) -> ParseResult<Token> {
        let token = self.tokens
                        .pop_front()
                        .ok_or(ParseError::UnexpectedEndOfTokens { line: self.last_line })?;
        self.last_line = token.line;
        Ok(token)
    }

    /// Returns the front token without removing it.
    pub fn look_ahead(&self) -> ParseResult<&Token> {
        self.tokens
            .front()
            .ok_or(ParseError::UnexpectedEndOfTokens { line: self.last_line })
    }

    /// Returns the kind of the front token, if any.
    #[must_use]
    pub fn peek(&self) -> Option<TokenKind> {
        self.tokens.front().map(|t| t.kind)
    }

    /// Returns `true` if the front token is of `kind`.
    #[must_use]
    pub fn check(&self, kind: TokenKind) -> bool {
        self.peek() == Some(kind)
    }

    /// Consumes the front token if it is of `kind`.
    pub fn consume_if(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            if let Some(token) = self.tokens.pop_front() {
                self.last_line = token.line;
            }
            return true;
        }
        false
    }

    /// Drops tokens until the front token is one of `kinds` or the stream is
    /// exhausted. The matching token itself is kept.
    pub fn skip_until(&mut self, kinds: &[TokenKind]) {
        while let Some(kind) = self.peek() {
            if kinds.contains(&kind) || kind == TokenKind::EndOfFile {
                break;
            }
            if let Some(token) = self.tokens.pop_front() {
                self.last_line = token.line;
            }
        }
    }

    /// Returns `true` if nothing but the end-of-file sentinel is left.
    #[must_use]
    pub fn end(&self) -> bool {
        !matches!(self.peek(), Some(kind) if kind != TokenKind::EndOfFile)
    }

    /// Number of queued tokens, including a trailing sentinel.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if no token is queued at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The line of the most recently consumed token.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.last_line
    }

    /// Iterates over the queued tokens without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    pub(crate) fn pop_back(&mut self) -> Option<Token> {
        self.tokens.pop_back()
    }

    pub(crate) fn pop_front_raw(&mut self) -> Option<Token> {
        self.tokens.pop_front()
    }

    pub(crate) fn set_line(&mut self, line: usize) {
        self.last_line = line;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    #[test]
    fn consume_if_only_takes_matching_tokens() {
        let mut stream = tokenize("t.kv", "let x;").tokens;

        assert!(!stream.consume_if(TokenKind::Identifier));
        assert!(stream.consume_if(TokenKind::Let));
        assert!(stream.consume_if(TokenKind::Identifier));
        assert!(stream.consume_if(TokenKind::SemiColon));
        assert!(stream.end());
    }

    #[test]
    fn skip_until_stops_before_the_delimiter() {
        let mut stream = tokenize("t.kv", "a b c ; d").tokens;
        stream.skip_until(&[TokenKind::SemiColon]);

        assert_eq!(stream.peek(), Some(TokenKind::SemiColon));
    }

    #[test]
    fn empty_stream_reports_end_of_tokens() {
        let mut stream = TokenStream::new(Arc::from("t.kv"), Vec::new());

        assert!(stream.end());
        assert!(matches!(stream.next_token(),
                         Err(ParseError::UnexpectedEndOfTokens { .. })));
    }
}
