use crate::{
    ast::{
        function::{FunctionNode, Parameter, Traits},
        statement::{Return, Statement},
    },
    error::{ParseError, ParseResult},
    lexer::token::TokenKind,
    parser::Parser,
    types::TypeId,
};

impl Parser<'_> {
    /// Parses a function or method declaration and adds it to the module.
    ///
    /// Grammar:
    /// ```text
    /// function   := "fn" name "(" params ")" ["[" traits "]"] body
    /// name       := identifier | type_name "." identifier
    /// params     := (identifier ":" type ("," identifier ":" type)*)?
    /// body       := ["->" type] ("=>" expression ";" | "{" statement* "}")
    ///             | ["->" type] ";"          (only after @native)
    /// ```
    ///
    /// A dotted name declares a method of a type declared in this module. A
    /// method called `new` is static and becomes the constructor of its type.
    ///
    /// # Errors
    /// Signature errors abort the declaration. Errors inside the body are
    /// recorded by the statement parser and do not.
    pub fn parse_function_definition(&mut self) -> ParseResult<()> {
        let line = self.expect(TokenKind::Function)?.line;
        let name = self.expect(TokenKind::Identifier)?;

        let (owner, name) = if self.consume_if(TokenKind::Dot) {
            let method = self.expect(TokenKind::Identifier)?;
            let owner = self.module
                            .find_type(&self.ctx.types, &name.text)
                            .filter(|ty| self.module.has_internal_type(&self.ctx.types, &name.text)
                                         && self.ctx.types.is_object(*ty))
                            .ok_or_else(|| ParseError::UnknownType { name: name.text.clone(),
                                                                     line: name.line })?;
            (Some(owner), method.text)
        } else {
            (None, name.text)
        };

        let mut function = FunctionNode::new(name, self.module.index(), line);
        function.annotation = self.annotation.take();
        if owner.is_some() && function.name == "new" {
            function.traits |= Traits::STATIC;
        }

        function.params = self.parse_formal_params()?;
        function.traits |= self.parse_traits()?;
        self.parse_function_body(&mut function)?;

        self.register_function(owner, function)
    }

    fn parse_formal_params(&mut self) -> ParseResult<Vec<Parameter>> {
        let scope = self.scope(TokenKind::LParen, TokenKind::RParen)?;
        self.within(scope, |parser| {
                let mut params = Vec::new();
                while parser.peek().is_some() {
                    let name = parser.expect(TokenKind::Identifier)?;
                    parser.expect(TokenKind::Colon)?;
                    let ty = parser.parse_type()?;

                    if ty == TypeId::VOID {
                        parser.record(&ParseError::VoidParameter { name: name.text.clone(),
                                                                   line: name.line });
                    } else {
                        params.push(Parameter::new(name.text, ty, name.line));
                    }

                    if parser.peek().is_some() {
                        parser.expect(TokenKind::Comma)?;
                    }
                }
                Ok(params)
            })
            .map_err(|error| error.in_construct("function definition"))
    }

    /// Parses an optional `[trait, ...]` list.
    ///
    /// Unknown trait names are recorded and ignored.
    fn parse_traits(&mut self) -> ParseResult<Traits> {
        let mut traits = Traits::NONE;
        if !self.check(TokenKind::LBracket) {
            return Ok(traits);
        }

        let scope = self.scope(TokenKind::LBracket, TokenKind::RBracket)?;
        self.within(scope, |parser| {
                while parser.peek().is_some() {
                    let name = parser.expect(TokenKind::Identifier)?;
                    match Traits::from_name(&name.text) {
                        Some(found) => traits |= found,
                        None => parser.record(&ParseError::UnknownTrait { name: name.text,
                                                                          line: name.line }),
                    }
                    if parser.peek().is_some() {
                        parser.expect(TokenKind::Comma)?;
                    }
                }
                Ok(traits)
            })
            .map_err(|error| error.in_construct("trait list"))
    }

    fn parse_function_body(&mut self, function: &mut FunctionNode) -> ParseResult<()> {
        if self.consume_if(TokenKind::Arrow) {
            function.return_type = self.parse_type()?;
            function.traits |= Traits::EXPLICIT_TYPE;
        }

        if self.check(TokenKind::DualArrow) {
            let line = self.next_token()?.line;
            let value = self.parse_expression()?;
            self.expect_semicolon("function definition");
            function.body.push(Statement::Return(Return { value, line }));
            return Ok(());
        }

        if function.is_native() && self.consume_if(TokenKind::SemiColon) {
            return Ok(());
        }

        if !self.check(TokenKind::LBrace) {
            let token = self.next_token()?;
            return Err(ParseError::InvalidSignature { token: token.text,
                                                      line:  token.line });
        }

        function.body = self.parse_block()?;
        Ok(())
    }

    fn register_function(&mut self, owner: Option<TypeId>, function: FunctionNode) -> ParseResult<()> {
        let line = function.line;

        match owner {
            Some(owner) => {
                let id = self.ctx.functions.alloc(function);
                self.ctx.add_method(owner, id)?;
                self.module.add_function(id);
            },
            None => {
                if self.module.declares(&self.ctx.functions, &function.identifier()) {
                    return Err(ParseError::DuplicateFunction { name: function.name,
                                                               line });
                }
                let id = self.ctx.functions.alloc(function);
                self.module.add_function(id);
            },
        }

        Ok(())
    }
}
