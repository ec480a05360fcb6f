//! Recursive-descent parser.
//!
//! Each precedence level has its own method, from `assignment` (loosest) down to `primary`
//! (tightest).  A syntax error unwinds to the top-level declaration loop, which records it,
//! skips to the next statement boundary and carries on so that later errors are reported too.

use tracing::{debug, trace};

use crate::ast::{Expr, LiteralValue, Stmt};
use crate::diag::{Diagnostics, ParseError};
use crate::token::{Literal, Token, TokenKind};

/// Calls accept at most this many arguments.
const MAX_ARGS: usize = 255;

/// Aborts the declaration being parsed.
#[derive(Debug)]
struct SyntaxError {
    token: Token,
    error: ParseError,
}

type ParseResult<T> = Result<T, SyntaxError>;

#[derive(Debug)]
pub struct Parser<'d> {
    tokens: Vec<Token>,
    current: usize,
    diags: &'d mut Diagnostics,
    had_error: bool,
}

impl<'d> Parser<'d> {
    /// `tokens` must end with an `Eof` token, as produced by `Scanner::scan`.
    pub fn new(tokens: Vec<Token>, diags: &'d mut Diagnostics) -> Parser<'d> {
        debug_assert!(matches!(tokens.last(), Some(t) if t.kind == TokenKind::Eof));
        Parser {
            tokens,
            current: 0,
            diags,
            had_error: false,
        }
    }

    /// Parses a whole program.
    ///
    /// Returns `None` if any syntax error was recorded, in which case the program must not be
    /// evaluated.
    pub fn parse(mut self) -> Option<Vec<Stmt>> {
        let mut prg = vec![];
        while !self.is_at_end() {
            match self.declaration() {
                Ok(stmt) => prg.push(stmt),
                Err(SyntaxError { token, error }) => {
                    self.report(&token, error);
                    self.synchronize();
                }
            }
        }
        debug!(
            statements = prg.len(),
            failed = self.had_error,
            "parse finished"
        );

        if self.had_error {
            None
        } else {
            Some(prg)
        }
    }

    #[cfg(test)]
    fn parse_expression(mut self) -> Option<Expr> {
        match self.expression() {
            Ok(expr) if !self.had_error => Some(expr),
            Ok(_) => None,
            Err(SyntaxError { token, error }) => {
                self.report(&token, error);
                None
            }
        }
    }

    fn declaration(&mut self) -> ParseResult<Stmt> {
        if self.matches(&[TokenKind::Var]) {
            self.var_decl()
        } else {
            self.statement()
        }
    }

    /// Parses a variable declaration.  `var` has been consumed.
    fn var_decl(&mut self) -> ParseResult<Stmt> {
        if !self.check(TokenKind::Identifier) {
            return Err(self.error(ParseError::ExpectedVariableName));
        }
        self.advance();
        let name = self.previous().clone();

        let init = if self.matches(&[TokenKind::Equal]) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::Semicolon, "after variable declaration")?;
        Ok(Stmt::Var { name, init })
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        if self.matches(&[TokenKind::Print]) {
            let expr = self.expression()?;
            self.consume(TokenKind::Semicolon, "after value")?;
            Ok(Stmt::Print(expr))
        } else if self.matches(&[TokenKind::LeftBrace]) {
            Ok(Stmt::Block(self.block()?))
        } else if self.matches(&[TokenKind::If]) {
            self.if_stmt()
        } else if self.matches(&[TokenKind::While]) {
            self.while_stmt()
        } else if self.matches(&[TokenKind::For]) {
            self.for_stmt()
        } else {
            self.expression_stmt()
        }
    }

    fn expression_stmt(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, "after expression")?;
        Ok(Stmt::Expression(expr))
    }

    /// Parses the statements of a block.  `{` has been consumed.
    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut stmts = vec![];
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            stmts.push(self.declaration()?);
        }
        self.consume(TokenKind::RightBrace, "after block")?;
        Ok(stmts)
    }

    fn if_stmt(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "after 'if'")?;
        let cond = self.expression()?;
        self.consume(TokenKind::RightParen, "after if condition")?;

        // A dangling else binds to the nearest if.
        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.matches(&[TokenKind::Else]) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Stmt::If {
            cond,
            then_branch,
            else_branch,
        })
    }

    fn while_stmt(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "after 'while'")?;
        let cond = self.expression()?;
        self.consume(TokenKind::RightParen, "after condition")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While { cond, body })
    }

    /// `for` has no node of its own: it is rewritten into a block holding the initializer and a
    /// `while` loop whose body runs the increment after the loop body.
    fn for_stmt(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "after 'for'")?;

        let init = if self.matches(&[TokenKind::Semicolon]) {
            None
        } else if self.matches(&[TokenKind::Var]) {
            Some(self.var_decl()?)
        } else {
            Some(self.expression_stmt()?)
        };

        let cond = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::Semicolon, "after loop condition")?;

        let increment = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::RightParen, "after for clauses")?;

        let mut body = self.statement()?;
        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::Expression(increment)]);
        }
        body = Stmt::While {
            cond: cond.unwrap_or(Expr::Literal(LiteralValue::Bool(true))),
            body: Box::new(body),
        };
        if let Some(init) = init {
            body = Stmt::Block(vec![init, body]);
        }
        Ok(body)
    }

    fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.logic_or()?;

        if self.matches(&[TokenKind::Equal]) {
            let equals = self.previous().clone();
            let value = self.assignment()?;

            if let Expr::Variable(name) = expr {
                return Ok(Expr::Assign {
                    name,
                    value: Box::new(value),
                });
            }
            // Reported but not raised: the parser is not confused about where it is.
            self.report(&equals, ParseError::InvalidAssignmentTarget);
        }

        Ok(expr)
    }

    fn logic_or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.logic_and()?;
        while self.matches(&[TokenKind::Or]) {
            let op = self.previous().clone();
            let right = self.logic_and()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn logic_and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;
        while self.matches(&[TokenKind::And]) {
            let op = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        self.left_assoc(
            &[TokenKind::EqualEqual, TokenKind::BangEqual],
            Self::comparison,
        )
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        self.left_assoc(
            &[
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
            ],
            Self::term,
        )
    }

    fn term(&mut self) -> ParseResult<Expr> {
        self.left_assoc(&[TokenKind::Plus, TokenKind::Minus], Self::factor)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        self.left_assoc(&[TokenKind::Star, TokenKind::Slash], Self::unary)
    }

    /// Parses `operand (op operand)*` into a left-leaning chain of binary nodes.
    fn left_assoc(
        &mut self,
        ops: &[TokenKind],
        operand: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let mut expr = operand(self)?;
        while self.matches(ops) {
            let op = self.previous().clone();
            let right = operand(self)?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.matches(&[TokenKind::Bang, TokenKind::Minus]) {
            let op = self.previous().clone();
            let right = self.unary()?;
            Ok(Expr::Unary {
                op,
                right: Box::new(right),
            })
        } else {
            self.call()
        }
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;
        while self.matches(&[TokenKind::LeftParen]) {
            expr = self.finish_call(expr)?;
        }
        Ok(expr)
    }

    /// Parses the argument list of a call.  `(` has been consumed.
    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut args = vec![];
        if !self.check(TokenKind::RightParen) {
            loop {
                if args.len() >= MAX_ARGS {
                    let token = self.peek().clone();
                    self.report(&token, ParseError::TooManyArguments);
                }
                args.push(self.expression()?);
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        let paren = self.consume(TokenKind::RightParen, "after arguments")?;
        Ok(Expr::Call {
            callee: Box::new(callee),
            paren,
            args,
        })
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        let expr = match self.peek().kind {
            TokenKind::False => Expr::Literal(LiteralValue::Bool(false)),
            TokenKind::True => Expr::Literal(LiteralValue::Bool(true)),
            TokenKind::Nil => Expr::Literal(LiteralValue::Nil),
            TokenKind::Number | TokenKind::String => match &self.peek().literal {
                Some(Literal::Number(n)) => Expr::Literal(LiteralValue::Number(*n)),
                Some(Literal::Str(s)) => Expr::Literal(LiteralValue::Str(s.clone())),
                None => return Err(self.error(ParseError::ExpectedExpression)),
            },
            TokenKind::Identifier => Expr::Variable(self.peek().clone()),
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume(TokenKind::RightParen, "after expression")?;
                return Ok(Expr::Grouping(Box::new(expr)));
            }
            _ => return Err(self.error(ParseError::ExpectedExpression)),
        };
        self.advance();
        Ok(expr)
    }

    /// Skips tokens until a likely statement boundary: just past a `;` or right before a
    /// statement keyword.
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon || self.peek().kind.starts_statement()
            {
                break;
            }
            self.advance();
        }
        trace!(line = self.peek().line, "resynchronized");
    }

    /// Records an error that does not abort the current declaration.
    fn report(&mut self, token: &Token, error: ParseError) {
        self.had_error = true;
        self.diags.syntax(token, error);
    }

    /// Builds an error located at the current token.
    fn error(&self, error: ParseError) -> SyntaxError {
        SyntaxError {
            token: self.peek().clone(),
            error,
        }
    }

    fn consume(&mut self, expected: TokenKind, context: &'static str) -> ParseResult<Token> {
        if self.check(expected) {
            self.advance();
            Ok(self.previous().clone())
        } else {
            Err(self.error(ParseError::ExpectedToken { expected, context }))
        }
    }

    /// Consumes the current token if it has one of the `kinds`.
    fn matches(&mut self, kinds: &[TokenKind]) -> bool {
        if kinds.contains(&self.peek().kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    /// Moves to the next token.  Sticks on `Eof`.
    fn advance(&mut self) {
        if !self.is_at_end() {
            self.current += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }
}
