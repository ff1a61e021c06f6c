use crate::{
    ast::{
        function::{Annotation, FunctionNode, Traits},
        statement::Statement,
    },
    context::CompilationContext,
    error::{ParseError, ParseResult},
    lexer::{stream::TokenStream, token::TokenKind},
    module::{Module, BUILTIN_MODULE},
    parser::Parser,
    types::TypeId,
};

/// Name of the function that holds a module's top-level statements.
pub const MODULE_BODY: &str = "<module>";

/// Parses one source file into a module.
///
/// `deps` are the modules compiled before this one, the builtin module first;
/// `use` declarations resolve against them and every builtin function is
/// visible without one. Errors are recorded in `ctx.diagnostics` and the
/// returned module holds whatever parsed.
///
/// # Example
/// ```
/// use kvantum::{context::CompilationContext, lexer::tokenize, module::Module, parser::parse_module};
///
/// let mut ctx = CompilationContext::new();
/// let lexed = tokenize("demo.kv", "fn twice(x: Int) => x * 2;");
/// let module = parse_module(&mut ctx, &[], "demo", 1, lexed.tokens);
///
/// assert!(!ctx.diagnostics.has_error());
/// assert!(module.has_internal_function(&ctx.functions, "twice"));
/// ```
pub fn parse_module(ctx: &mut CompilationContext,
                    deps: &[Module],
                    name: &str,
                    index: usize,
                    tokens: TokenStream)
                    -> Module {
    let mut module = Module::new(name, index);
    module.set_file(tokens.file().to_string());
    if let Some(builtin) = deps.get(BUILTIN_MODULE) {
        for &id in builtin.functions().iter().rev() {
            module.add_external_function(id);
        }
    }

    let body = ctx.functions.alloc(FunctionNode::new(MODULE_BODY, index, 1));
    module.add_function(body);
    module.set_body(body);

    ctx.diagnostics.set_working_module(tokens.file().to_string());

    let mut parser = Parser::new(ctx, deps, module, tokens);
    let statements = parser.parse_top_level();
    parser.ctx.functions.get_mut(body).body = statements;

    tracing::debug!(module = name, "code parsed");
    parser.into_module()
}

impl Parser<'_> {
    /// Parses declarations until the end of the file and returns the
    /// top-level statements in between them.
    fn parse_top_level(&mut self) -> Vec<Statement> {
        let mut statements = Vec::new();

        while !self.at_end() {
            let Some(kind) = self.peek() else { break };

            let result = match kind {
                TokenKind::Function => self.parse_function_definition(),
                TokenKind::Type => self.parse_type_definition(),
                TokenKind::Use => self.parse_external_dependency(),
                TokenKind::Annotation => self.parse_annotation(),
                TokenKind::Identifier if self.is_import() => {
                    self.skip_import();
                    Ok(())
                },
                _ => {
                    match self.parse_statement() {
                        Ok(statement) => {
                            statements.push(statement);
                            continue;
                        },
                        Err(error) => {
                            self.record(&error);
                            if !error.has_recovered() {
                                self.recover_statement();
                            }
                            continue;
                        },
                    }
                },
            };

            if let Err(error) = result {
                self.record(&error);
                self.recover_declaration();
            }
        }

        statements
    }

    fn is_import(&self) -> bool {
        self.current()
            .look_ahead()
            .is_ok_and(|token| token.text == "import")
    }

    /// `import` lines are resolved by the preprocessor; the parser drops
    /// every token on the line.
    fn skip_import(&mut self) {
        let Ok(import) = self.next_token() else { return };
        while let Ok(token) = self.look_ahead() {
            if token.line != import.line || token.is(TokenKind::EndOfFile) {
                break;
            }
            if self.next_token().is_err() {
                break;
            }
        }
    }

    fn recover_declaration(&mut self) {
        loop {
            match self.peek() {
                None | Some(TokenKind::EndOfFile) => break,
                Some(kind) if kind.starts_declaration() => break,
                Some(_) => {
                    if self.next_token().is_err() {
                        break;
                    }
                },
            }
        }
    }

    fn parse_annotation(&mut self) -> ParseResult<()> {
        let token = self.expect(TokenKind::Annotation)?;
        let annotation =
            Annotation::from_token(&token.text).ok_or_else(|| ParseError::UnknownAnnotation { name: token.text.clone(),
                                                                                                line: token.line })?;
        self.annotation = Some(annotation);
        Ok(())
    }

    /// Parses `type Name [<- Parent] { field: Type; ... }`.
    ///
    /// A parent that is not an object type is recorded and dropped; broken
    /// fields are recorded and skipped.
    pub fn parse_type_definition(&mut self) -> ParseResult<()> {
        self.expect(TokenKind::Type)?;
        let name = self.expect(TokenKind::Identifier)?;

        if self.module.has_internal_type(&self.ctx.types, &name.text) {
            return Err(ParseError::DuplicateType { name: name.text,
                                                   line: name.line });
        }

        let mut parent = None;
        if self.consume_if(TokenKind::BackArrow) {
            let line = self.line();
            let ty = self.parse_type()?;
            if self.ctx.types.is_object(ty) {
                parent = Some(ty);
            } else {
                let error = ParseError::NonObjectParent { name: self.ctx.types.name(ty),
                                                          line };
                self.record(&error);
            }
        }

        let id = self.ctx.types.declare_object(name.text.clone(), parent);
        self.module.add_type(id);

        let scope = self.scope(TokenKind::LBrace, TokenKind::RBrace)?;
        self.within(scope, |parser| {
                while parser.peek().is_some() {
                    if let Err(error) = parser.parse_field(id, &name.text) {
                        parser.record(&error);
                        if error.is_end_of_tokens() {
                            break;
                        }
                        parser.recover_statement();
                    }
                }
                Ok(())
            })
    }

    fn parse_field(&mut self, owner: TypeId, owner_name: &str) -> ParseResult<()> {
        let field = self.expect(TokenKind::Identifier)?;
        self.expect(TokenKind::Colon)?;
        let ty = self.parse_type()?;
        self.expect_semicolon("field definition");

        let Some(object) = self.ctx.types.get_mut(owner).as_object_mut() else {
            return Ok(());
        };
        if object.node.fields.contains_key(&field.text) {
            return Err(ParseError::DuplicateField { owner: owner_name.to_string(),
                                                    field: field.text,
                                                    line:  field.line });
        }
        if ty == TypeId::VOID {
            return Err(ParseError::VoidField { name: field.text,
                                               line: field.line });
        }
        object.node.fields.insert(field.text, ty);
        Ok(())
    }

    /// Parses `use module::item;`.
    ///
    /// Importing a function imports every overload of it; each must be
    /// public. Importing an object type imports its public methods too.
    pub fn parse_external_dependency(&mut self) -> ParseResult<()> {
        self.expect(TokenKind::Use)?;
        let module_name = self.expect(TokenKind::Identifier)?;
        self.expect(TokenKind::NamespaceScope)?;
        let item = self.expect(TokenKind::Identifier)?;
        self.expect_semicolon("use directive");

        let deps = self.deps;
        let dep = deps.iter()
                      .find(|dep| dep.name() == module_name.text)
                      .ok_or_else(|| ParseError::UnknownModule { name: module_name.text.clone(),
                                                                 line: module_name.line })?;

        let group = dep.function_group(&self.ctx.functions, &item.text);
        if !group.is_empty() {
            for id in group {
                if self.ctx.functions.get(id).traits.contains(Traits::PUBLIC) {
                    self.module.add_external_function(id);
                } else {
                    let error = ParseError::PrivateImport { name: item.text.clone(),
                                                            line: item.line };
                    self.record(&error);
                }
            }
            return Ok(());
        }

        let object = dep.object_types(&self.ctx.types)
                        .into_iter()
                        .find(|ty| self.ctx.types.name(*ty) == item.text);
        let Some(object) = object else {
            return Err(ParseError::UnknownImport { item:   item.text,
                                                   module: module_name.text,
                                                   line:   item.line, });
        };

        self.module.add_external_type(object);
        for id in self.ctx.types.methods(object) {
            if self.ctx.functions.get(id).traits.contains(Traits::PUBLIC) {
                self.module.add_external_function(id);
            }
        }
        Ok(())
    }
}
