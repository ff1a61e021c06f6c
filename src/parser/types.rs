use crate::{
    error::{ParseError, ParseResult},
    lexer::token::TokenKind,
    parser::Parser,
    types::TypeId,
};

impl Parser<'_> {
    /// Parses a type name.
    ///
    /// Grammar:
    /// ```text
    /// type := "[" type "]" | "<" type ">" | "&"+ identifier | identifier
    /// ```
    ///
    /// Identifiers resolve against the types visible in the module being
    /// parsed, so an object type has to be declared or imported before its
    /// first use. Repeated `&` collapse into a single reference with a
    /// warning.
    ///
    /// # Errors
    /// - `UnknownType` for an identifier that names no visible type.
    /// - `VoidElement` for `[Void]`.
    pub fn parse_type(&mut self) -> ParseResult<TypeId> {
        let token = self.look_ahead()?;

        match token.kind {
            TokenKind::LBracket => {
                self.next_token()?;
                let element = self.parse_type()?;
                self.expect(TokenKind::RBracket)?;

                if element == TypeId::VOID {
                    return Err(ParseError::VoidElement { line: token.line });
                }
                let list = self.ctx.list_of(element);
                self.module.add_type(list);
                Ok(list)
            },
            TokenKind::Less => {
                self.next_token()?;
                let element = self.parse_type()?;
                self.expect(TokenKind::Greater)?;
                Ok(self.ctx.types.array_of(element))
            },
            TokenKind::Ampersand => {
                self.next_token()?;
                while self.consume_if(TokenKind::Ampersand) {
                    self.ctx.diagnostics.warn("multiple references");
                }
                let referent = self.parse_named_type()?;
                Ok(self.ctx.types.reference_to(referent))
            },
            _ => self.parse_named_type(),
        }
    }

    fn parse_named_type(&mut self) -> ParseResult<TypeId> {
        let name = self.expect(TokenKind::Identifier)?;
        self.module
            .find_type(&self.ctx.types, &name.text)
            .ok_or(ParseError::UnknownType { name: name.text,
                                             line: name.line })
    }
}
