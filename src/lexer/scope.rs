use crate::{
    error::{ParseError, ParseResult},
    lexer::{
        stream::TokenStream,
        token::{Token, TokenKind},
    },
};

/// A bracket balanced run of tokens cut out of a larger stream.
///
/// The scope owns its tokens, delimiters included, and can be parsed with
/// its own cursor independently of the stream it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    stream: TokenStream,
}

impl Scope {
    /// Extracts the scope that starts at the front of `stream`.
    ///
    /// The front token must be `begin`. Tokens are moved out of `stream` up
    /// to and including the `end` token that balances it; nested `begin`
    /// tokens are counted.
    ///
    /// # Errors
    /// - [`ParseError::UnexpectedToken`] if the stream does not start with
    ///   `begin`.
    /// - [`ParseError::UnclosedScope`] if the stream runs out first.
    ///
    /// # Example
    /// ```
    /// use kvantum::lexer::{scope::Scope, token::TokenKind, tokenize};
    ///
    /// let mut stream = tokenize("main.kv", "(a, (b)) c").tokens;
    /// let scope = Scope::extract(&mut stream, TokenKind::LParen, TokenKind::RParen).unwrap();
    ///
    /// assert_eq!(scope.len(), 7);
    /// assert_eq!(stream.peek(), Some(TokenKind::Identifier));
    /// ```
    pub fn extract(stream: &mut TokenStream,
                   begin: TokenKind,
                   end: TokenKind)
                   -> ParseResult<Self> {
        let first = stream.look_ahead()?;
        first.expect(begin)?;
        let opening_line = first.line;

        let mut tokens: Vec<Token> = Vec::new();
        let mut depth = 0usize;

        while let Some(token) = stream.pop_front_raw() {
            if token.kind == TokenKind::EndOfFile {
                break;
            }
            if token.kind == begin {
                depth += 1;
            } else if token.kind == end {
                depth -= 1;
            }

            tokens.push(token);

            if depth == 0 {
                return Ok(Self { stream: TokenStream::new(stream.file().clone(), tokens) });
            }
        }

        Err(ParseError::UnclosedScope { closing: end.describe().to_string(),
                                        line:    opening_line, })
    }

    /// Removes the opening and closing delimiters.
    pub fn drop_delimiters(&mut self) {
        if let Some(opening) = self.stream.pop_front_raw() {
            self.stream.set_line(opening.line);
        }
        self.stream.pop_back();
    }

    /// Number of tokens in the scope, delimiters included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stream.len()
    }

    /// Returns `true` if the scope holds no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stream.is_empty()
    }

    /// Turns the scope into a stream for parsing.
    #[must_use]
    pub fn into_stream(self) -> TokenStream {
        self.stream
    }

    /// Extracts a scope and strips its delimiters in one step.
    pub fn inner(stream: &mut TokenStream, begin: TokenKind, end: TokenKind) -> ParseResult<TokenStream> {
        let mut scope = Self::extract(stream, begin, end)?;
        scope.drop_delimiters();
        Ok(scope.into_stream())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    #[test]
    fn nested_brackets_are_balanced() {
        let mut stream = tokenize("t.kv", "{ { a; } b; } c").tokens;
        let mut scope = Scope::extract(&mut stream, TokenKind::LBrace, TokenKind::RBrace).unwrap();

        assert_eq!(scope.len(), 8);
        scope.drop_delimiters();
        assert_eq!(scope.len(), 6);
        assert_eq!(stream.peek(), Some(TokenKind::Identifier));
    }

    #[test]
    fn unterminated_scope_is_an_error() {
        let mut stream = tokenize("t.kv", "( a, b").tokens;
        let result = Scope::extract(&mut stream, TokenKind::LParen, TokenKind::RParen);

        assert!(matches!(result, Err(ParseError::UnclosedScope { line: 1, .. })));
    }

    #[test]
    fn scope_must_start_with_the_opening_bracket() {
        let mut stream = tokenize("t.kv", "a ( )").tokens;

        assert!(Scope::extract(&mut stream, TokenKind::LParen, TokenKind::RParen).is_err());
    }
}
