use crate::{
    ast::function::Annotation,
    context::CompilationContext,
    error::{ParseError, ParseResult},
    lexer::{
        scope::Scope,
        stream::TokenStream,
        token::{Token, TokenKind},
    },
    module::Module,
};

/// Recursive descent parser for one module.
///
/// Brackets are handled by cutting the bracketed tokens out into their own
/// stream with [`Scope`] and parsing that stream to its end with
/// [`Parser::within`]; the innermost pushed stream is the one every token
/// operation works on.
pub struct Parser<'a> {
    /// Types, functions and diagnostics of the compilation.
    pub(crate) ctx:        &'a mut CompilationContext,
    /// Modules compiled earlier, builtin module first.
    pub(crate) deps:       &'a [Module],
    /// The module being built.
    pub(crate) module:     Module,
    /// Annotation waiting for the next function declaration.
    pub(crate) annotation: Option<Annotation>,
    base:                  TokenStream,
    scopes:                Vec<TokenStream>,
}

impl<'a> Parser<'a> {
    /// Creates a parser for `module` over the tokens of its file.
    pub fn new(ctx: &'a mut CompilationContext,
               deps: &'a [Module],
               module: Module,
               tokens: TokenStream)
               -> Self {
        Self { ctx,
               deps,
               module,
               annotation: None,
               base: tokens,
               scopes: Vec::new() }
    }

    /// Returns the finished module.
    #[must_use]
    pub fn into_module(self) -> Module {
        self.module
    }

    pub(crate) fn stream(&mut self) -> &mut TokenStream {
        self.scopes.last_mut().unwrap_or(&mut self.base)
    }

    pub(crate) fn current(&self) -> &TokenStream {
        self.scopes.last().unwrap_or(&self.base)
    }

    /// Consumes the next token and makes its line the current diagnostic
    /// location.
    pub(crate) fn next_token(&mut self) -> ParseResult<Token> {
        let token = self.stream().next_token()?;
        self.ctx.diagnostics.set_line_index(token.line);
        Ok(token)
    }

    /// Returns a copy of the next token without consuming it.
    pub(crate) fn look_ahead(&mut self) -> ParseResult<Token> {
        let token = self.current().look_ahead()?.clone();
        self.ctx.diagnostics.set_line_index(token.line);
        Ok(token)
    }

    /// Kind of the next token, if any.
    pub(crate) fn peek(&self) -> Option<TokenKind> {
        self.current().peek()
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.current().check(kind)
    }

    pub(crate) fn consume_if(&mut self, kind: TokenKind) -> bool {
        self.stream().consume_if(kind)
    }

    /// Consumes the next token, which must be of `kind`.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        let token = self.next_token()?;
        token.expect(kind)?;
        Ok(token)
    }

    /// Returns `true` once the current stream holds nothing but the
    /// end-of-file sentinel.
    pub(crate) fn at_end(&self) -> bool {
        self.current().end()
    }

    /// Line of the most recently consumed token.
    pub(crate) fn line(&self) -> usize {
        self.current().line()
    }

    /// Cuts the bracketed scope at the front of the current stream out,
    /// without its delimiters.
    pub(crate) fn scope(&mut self, begin: TokenKind, end: TokenKind) -> ParseResult<TokenStream> {
        Scope::inner(self.stream(), begin, end)
    }

    /// Runs `parse` with `scope` as the current stream.
    ///
    /// Whatever `parse` leaves unconsumed in the scope is discarded.
    pub(crate) fn within<T>(&mut self,
                            scope: TokenStream,
                            parse: impl FnOnce(&mut Self) -> ParseResult<T>)
                            -> ParseResult<T> {
        self.scopes.push(scope);
        let result = parse(self);
        self.scopes.pop();
        result
    }

    /// Records a recoverable error in the diagnostics sink.
    pub(crate) fn record(&mut self, error: &ParseError) {
        self.ctx.diagnostics.error_at(error.line(), error);
    }

    /// Consumes the `;` that ends `construct`, recording its absence without
    /// failing.
    pub(crate) fn expect_semicolon(&mut self, construct: &'static str) {
        if !self.consume_if(TokenKind::SemiColon) {
            let error = ParseError::MissingSemicolon { construct,
                                                       line: self.line() };
            self.record(&error);
        }
    }

    /// Skips the rest of a broken statement, including its `;`.
    pub(crate) fn recover_statement(&mut self) {
        self.stream()
            .skip_until(&[TokenKind::SemiColon, TokenKind::RBrace]);
        self.consume_if(TokenKind::SemiColon);
    }
}
