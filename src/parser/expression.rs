use crate::{
    ast::expression::{
        ArrayExpression, ArrayIndex, BinaryOperation, BinaryOperator, Cast, Expr, FieldAccess,
        FunctionCall, Literal, LiteralValue, TakeReference, Variable,
    },
    error::{ParseError, ParseResult},
    lexer::token::{unquote, Token, TokenKind},
    parser::Parser,
    types::TypeId,
};

impl BinaryOperator {
    /// Maps an operator token to its operator.
    #[must_use]
    pub const fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Plus => Some(Self::Add),
            TokenKind::Minus => Some(Self::Subtract),
            TokenKind::Multiply => Some(Self::Multiply),
            TokenKind::Divide => Some(Self::Divide),
            TokenKind::LogEqual => Some(Self::Equal),
            TokenKind::LogNotEqual => Some(Self::NotEqual),
            TokenKind::Less => Some(Self::Less),
            TokenKind::LessOrEqual => Some(Self::LessOrEqual),
            TokenKind::Greater => Some(Self::Greater),
            TokenKind::GreaterOrEqual => Some(Self::GreaterOrEqual),
            TokenKind::And => Some(Self::And),
            TokenKind::Or => Some(Self::Or),
            _ => None,
        }
    }
}

impl Parser<'_> {
    /// Parses an expression.
    ///
    /// Grammar:
    /// ```text
    /// expression := primary suffix* (bop expression)?
    /// primary    := literal | identifier | "None" | list | array | "&" expression
    ///             | "not" primary suffix* | "(" expression ")"
    /// suffix     := "." identifier | "(" arguments ")" | "[" expression "]" | "as" type
    /// ```
    ///
    /// There is no operator precedence: the right operand of a binary
    /// operator is a whole expression. `not x` is read as `x == False` and
    /// binds to its operand only.
    ///
    /// # Errors
    /// - `MissingLeftOperand` if the expression starts with a binary operator.
    /// - `InvalidExpression` for any other token that cannot start one.
    pub fn parse_expression(&mut self) -> ParseResult<Expr> {
        let primary = self.parse_primary()?;
        let expr = self.parse_suffixes(primary, true)?;

        match self.peek().and_then(BinaryOperator::from_token) {
            Some(op) => {
                let token = self.next_token()?;
                let rhs = self.parse_expression()?;
                Ok(Expr::BinaryOperation(BinaryOperation { op,
                                                           lhs: Box::new(expr),
                                                           rhs: Box::new(rhs),
                                                           line: token.line }))
            },
            None => Ok(expr),
        }
    }

    /// Parses an identifier followed by field accesses, calls and indexing.
    ///
    /// This is the left hand side of assignments and call statements.
    pub(crate) fn parse_access_chain(&mut self) -> ParseResult<Expr> {
        let name = self.expect(TokenKind::Identifier)?;
        let variable = Expr::Variable(Variable::new(name.text, name.line));
        self.parse_suffixes(variable, false)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let token = self.look_ahead()?;

        match token.kind {
            kind if kind.is_literal() => {
                let token = self.next_token()?;
                Ok(Expr::Literal(literal(&token)?))
            },
            TokenKind::None => {
                self.next_token()?;
                Ok(Expr::Literal(Literal::new(LiteralValue::None, token.line)))
            },
            TokenKind::Identifier => {
                self.next_token()?;
                Ok(Expr::Variable(Variable::new(token.text, token.line)))
            },
            TokenKind::LBracket => self.parse_list_expression(),
            TokenKind::Less => self.parse_array_expression(),
            TokenKind::Ampersand => {
                self.next_token()?;
                let expr = self.parse_expression()?;
                Ok(Expr::TakeReference(TakeReference { expr: Box::new(expr),
                                                       line: token.line }))
            },
            TokenKind::LParen => {
                let scope = self.scope(TokenKind::LParen, TokenKind::RParen)?;
                self.within(scope, |parser| {
                        let expr = parser.parse_expression()?;
                        parser.expect_scope_end()?;
                        Ok(expr)
                    })
                    .map_err(|error| error.in_construct("parenthesized expression"))
            },
            TokenKind::Not => {
                self.next_token()?;
                let operand = self.parse_primary()?;
                let operand = self.parse_suffixes(operand, true)?;
                let falsity = Literal::new(LiteralValue::Boolean(false), token.line);
                Ok(Expr::BinaryOperation(BinaryOperation { op:   BinaryOperator::Equal,
                                                           lhs:  Box::new(operand),
                                                           rhs:  Box::new(Expr::Literal(falsity)),
                                                           line: token.line }))
            },
            kind if kind.is_binary_operator() => {
                self.next_token()?;
                Err(ParseError::MissingLeftOperand { line: token.line })
            },
            TokenKind::SemiColon | TokenKind::RBrace => Err(ParseError::InvalidExpression { token: token.text,
                                                                                           line:  token.line }),
            _ => {
                self.next_token()?;
                Err(ParseError::InvalidExpression { token: token.text,
                                                    line:  token.line })
            },
        }
    }

    fn parse_suffixes(&mut self, mut expr: Expr, allow_cast: bool) -> ParseResult<Expr> {
        loop {
            match self.peek() {
                Some(TokenKind::Dot) => {
                    self.next_token()?;
                    let field = self.expect(TokenKind::Identifier)?;
                    expr = Expr::FieldAccess(FieldAccess::new(expr, field.text, field.line));
                },
                Some(TokenKind::LParen) => {
                    let line = self.look_ahead()?.line;
                    if !matches!(expr, Expr::Variable(_) | Expr::FieldAccess(_)) {
                        return Err(ParseError::InvalidCallee { line });
                    }
                    let arguments = self.parse_arguments()?;
                    expr = Expr::Call(FunctionCall::new(expr, arguments, line));
                },
                Some(TokenKind::LBracket) => {
                    let line = self.look_ahead()?.line;
                    let scope = self.scope(TokenKind::LBracket, TokenKind::RBracket)?;
                    let index = self.within(scope, |parser| {
                                        let index = parser.parse_expression()?;
                                        parser.expect_scope_end()?;
                                        Ok(index)
                                    })
                                    .map_err(|error| error.in_construct("array index"))?;
                    expr = Expr::ArrayIndex(ArrayIndex { array: Box::new(expr),
                                                         index: Box::new(index),
                                                         line });
                },
                Some(TokenKind::As) if allow_cast => {
                    let line = self.next_token()?.line;
                    let to = self.parse_type()?;
                    if to == TypeId::VOID {
                        return Err(ParseError::CastToVoid { line });
                    }
                    expr = Expr::Cast(Cast { expr: Box::new(expr),
                                             to,
                                             line });
                },
                _ => return Ok(expr),
            }
        }
    }

    /// Fails unless the current scope is fully consumed.
    fn expect_scope_end(&mut self) -> ParseResult<()> {
        match self.peek() {
            None => Ok(()),
            Some(_) => {
                let token = self.next_token()?;
                Err(ParseError::UnexpectedToken { found:    token.to_string(),
                                                  expected: "end of scope".to_string(),
                                                  line:     token.line, })
            },
        }
    }

    /// Parses `( expression, ... )`.
    fn parse_arguments(&mut self) -> ParseResult<Vec<Expr>> {
        let scope = self.scope(TokenKind::LParen, TokenKind::RParen)?;
        self.within(scope, |parser| parser.parse_comma_separated())
            .map_err(|error| error.in_construct("argument list"))
    }

    fn parse_comma_separated(&mut self) -> ParseResult<Vec<Expr>> {
        let mut items = Vec::new();
        while self.peek().is_some() {
            items.push(self.parse_expression()?);
            if self.peek().is_some() {
                self.expect(TokenKind::Comma)?;
            }
        }
        Ok(items)
    }

    /// Parses the elements of `<...>` or `[...]`.
    ///
    /// Only literal elements are kept. Any other element is recorded as an
    /// error and skipped so parsing can go on.
    ///
    /// # Returns
    /// The literal elements and the number of elements written.
    fn parse_initializer(&mut self,
                         begin: TokenKind,
                         end: TokenKind)
                         -> ParseResult<(Vec<Expr>, usize)> {
        let scope = self.scope(begin, end)?;
        let items = self.within(scope, |parser| parser.parse_comma_separated())
                        .map_err(|error| error.in_construct("array initializer"))?;

        let written = items.len();
        let mut literals = Vec::with_capacity(written);
        for item in items {
            if matches!(item, Expr::Literal(_)) {
                literals.push(item);
            } else {
                let error = ParseError::ArrayInitializerNotLiteral { line: item.line() };
                self.record(&error);
            }
        }
        Ok((literals, written))
    }

    /// Parses `<a, b, c>`; the element type is the type of the first element.
    fn parse_array_expression(&mut self) -> ParseResult<Expr> {
        let line = self.look_ahead()?.line;
        let (items, written) = self.parse_initializer(TokenKind::Less, TokenKind::Greater)?;

        if written == 0 {
            return Err(ParseError::EmptyArrayInitializer { line });
        }
        let element = element_type(&items).unwrap_or(TypeId::OBJECT);
        self.ctx.types.array_of(element);

        Ok(Expr::ArrayExpression(ArrayExpression { element,
                                                   items,
                                                   line }))
    }

    /// Parses `[a, b, c]` into `[T].new(<a, b, c>, 3)`.
    ///
    /// The first list literal of an element type brings the list type into
    /// the module.
    fn parse_list_expression(&mut self) -> ParseResult<Expr> {
        let line = self.look_ahead()?.line;
        let (items, written) = self.parse_initializer(TokenKind::LBracket, TokenKind::RBracket)?;

        let element = match element_type(&items) {
            Some(element) => element,
            None if written == 0 => return Err(ParseError::EmptyListLiteral { line }),
            None => return Err(ParseError::UntypedListLiteral { line }),
        };
        let list = self.ctx.list_of(element);
        self.module.add_type(list);

        let count = i64::try_from(items.len()).map_err(|_| {
                                                  ParseError::LiteralTooLarge { text: items.len().to_string(),
                                                                                line }
                                              })?;
        let name = self.ctx.types.name(list);
        let callee = FieldAccess::new(Expr::Variable(Variable::typed(name, list, line)), "new", line);

        let mut call = FunctionCall::new(callee.into(),
                                         vec![Expr::ArrayExpression(ArrayExpression { element,
                                                                                      items,
                                                                                      line }),
                                              Expr::Literal(Literal::new(count, line))],
                                         line);
        call.target = self.ctx.types.find_method(list, "new");
        Ok(Expr::Call(call))
    }
}

fn element_type(items: &[Expr]) -> Option<TypeId> {
    match items.first() {
        Some(Expr::Literal(literal)) => Some(literal.value.type_id()),
        _ => None,
    }
}

/// Converts a literal token into its value.
fn literal(token: &Token) -> ParseResult<Literal> {
    let too_large = || ParseError::LiteralTooLarge { text: token.text.clone(),
                                                     line: token.line };

    let value = match token.kind {
        TokenKind::Integer => LiteralValue::Integer(token.text.parse().map_err(|_| too_large())?),
        TokenKind::Rational => LiteralValue::from(token.text.parse::<f64>().map_err(|_| too_large())?),
        TokenKind::Boolean => LiteralValue::Boolean(token.text == "True"),
        _ => LiteralValue::Char(unquote(&token.text)),
    };

    Ok(Literal { value,
                 line: token.line })
}
