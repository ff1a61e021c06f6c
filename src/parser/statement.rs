use crate::{
    ast::{
        expression::{Expr, Variable},
        statement::{Assignment, For, IfElse, Return, Statement, StatementBlock, While},
    },
    error::{ParseError, ParseResult},
    lexer::token::TokenKind,
    parser::Parser,
};

impl Parser<'_> {
    /// Parses statements until the current stream ends.
    ///
    /// A statement that fails to parse is recorded and skipped up to the next
    /// `;` or `}`, so one run reports every broken statement of a block.
    ///
    /// # Returns
    /// The statements that parsed.
    pub fn parse_statements(&mut self) -> Vec<Statement> {
        let mut statements = Vec::new();

        while !self.at_end() {
            match self.parse_statement() {
                Ok(statement) => statements.push(statement),
                Err(error) => {
                    self.record(&error);
                    if error.is_end_of_tokens() {
                        break;
                    }
                    if !error.has_recovered() {
                        self.recover_statement();
                    }
                },
            }
        }

        statements
    }

    /// Parses a single statement.
    ///
    /// Grammar:
    /// ```text
    /// statement  := assignment | return | call ";" | if_else | while | for | block
    /// assignment := ["let"] place [":" type] "=" expression ";"
    /// return     := "ret" expression ";"
    /// if_else    := "if" expression ":" statement ["else" ":" statement]
    /// while      := "while" expression ":" statement
    /// for        := "for" assignment expression ";" place "=" expression ":" statement
    /// block      := "{" statement* "}"
    /// ```
    ///
    /// # Errors
    /// - `InvalidStatement` for tokens that cannot start a statement; they are
    ///   consumed up to the next statement start.
    /// - Any error of the nested expression or type parsers.
    pub fn parse_statement(&mut self) -> ParseResult<Statement> {
        let token = self.look_ahead()?;

        match token.kind {
            TokenKind::Return => {
                self.next_token()?;
                let value = self.parse_expression()?;
                self.expect_semicolon("return");
                Ok(Statement::Return(Return { value,
                                              line: token.line }))
            },
            TokenKind::Let => {
                self.next_token()?;
                let name = self.expect(TokenKind::Identifier)?;
                let target = Expr::Variable(Variable::new(name.text, name.line));
                let mut assignment = self.parse_assignment(target)?;
                assignment.declaration = true;
                self.expect_semicolon("assignment");
                Ok(Statement::Assignment(assignment))
            },
            TokenKind::Identifier => self.parse_assignment_or_call(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::LBrace => {
                let statements = self.parse_block()?;
                Ok(Statement::Block(StatementBlock { statements,
                                                     line: token.line }))
            },
            _ => Err(self.invalid_statement(token.line)),
        }
    }

    /// Parses `{ ... }` and returns its statements.
    pub(crate) fn parse_block(&mut self) -> ParseResult<Vec<Statement>> {
        let scope = self.scope(TokenKind::LBrace, TokenKind::RBrace)?;
        self.within(scope, |parser| Ok(parser.parse_statements()))
    }

    fn invalid_statement(&mut self, line: usize) -> ParseError {
        let mut rejected = Vec::new();

        while let Some(kind) = self.peek() {
            if kind == TokenKind::EndOfFile || (!rejected.is_empty() && kind.starts_statement()) {
                break;
            }
            match self.next_token() {
                Ok(token) if token.is(TokenKind::SemiColon) => break,
                Ok(token) => rejected.push(token.text),
                Err(_) => break,
            }
        }

        ParseError::InvalidStatement { tokens: rejected.join(" "),
                                       line }
    }

    /// Parses `: Type = value` after an assignment target, without the `;`.
    fn parse_assignment(&mut self, target: Expr) -> ParseResult<Assignment> {
        let line = target.line();

        let annotation = if self.consume_if(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };

        self.expect(TokenKind::Equals)?;
        let value = self.parse_expression()?;

        Ok(Assignment { target,
                        value,
                        declaration: false,
                        annotation,
                        line })
    }

    fn parse_assignment_or_call(&mut self) -> ParseResult<Statement> {
        let line = self.look_ahead()?.line;
        let target = self.parse_access_chain()?;

        if self.check(TokenKind::Equals) {
            if !target.is_place() {
                return Err(ParseError::InvalidAssignmentTarget { line });
            }
            let assignment = self.parse_assignment(target)?;
            self.expect_semicolon("assignment");
            return Ok(Statement::Assignment(assignment));
        }

        match target {
            Expr::Call(call) => {
                self.expect_semicolon("function call");
                Ok(Statement::Call(call))
            },
            _ => Err(ParseError::MissingAssignment { line }),
        }
    }

    fn parse_condition(&mut self) -> ParseResult<Expr> {
        let condition = self.parse_expression()?;
        self.expect(TokenKind::Colon)?;
        Ok(condition)
    }

    fn parse_if(&mut self) -> ParseResult<Statement> {
        let line = self.expect(TokenKind::If)?.line;
        let condition = self.parse_condition()?;
        let then = Box::new(self.parse_statement()?);

        let otherwise = if self.consume_if(TokenKind::Else) {
            self.expect(TokenKind::Colon)?;
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Statement::IfElse(IfElse { condition,
                                      then,
                                      otherwise,
                                      line }))
    }

    fn parse_while(&mut self) -> ParseResult<Statement> {
        let line = self.expect(TokenKind::While)?.line;
        let condition = self.parse_condition()?;
        let body = Box::new(self.parse_statement()?);

        Ok(Statement::While(While { condition,
                                    body,
                                    line }))
    }

    fn parse_for(&mut self) -> ParseResult<Statement> {
        let line = self.expect(TokenKind::For)?.line;

        let init = self.parse_statement()?;
        if !matches!(init, Statement::Assignment(_)) {
            return Err(ParseError::InvalidForInitializer { line });
        }

        let condition = self.parse_expression()?;
        self.expect(TokenKind::SemiColon)?;

        let step_line = self.look_ahead()?.line;
        let target = self.parse_access_chain()?;
        if !target.is_place() {
            return Err(ParseError::InvalidAssignmentTarget { line: step_line });
        }
        let step = self.parse_assignment(target)?;

        self.expect(TokenKind::Colon)?;
        let body = self.parse_statement()?;

        Ok(Statement::For(For { init: Box::new(init),
                                condition,
                                step: Box::new(Statement::Assignment(step)),
                                body: Box::new(body),
                                line }))
    }
}
