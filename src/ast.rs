//! Syntax tree produced by the parser and walked by the evaluator.

use std::rc::Rc;

use crate::token::Token;

#[derive(Debug, PartialEq, Clone)]
pub enum Stmt {
    Expression(Expr),
    Print(Expr),
    Var {
        name: Token,
        init: Option<Expr>,
    },
    Block(Vec<Stmt>),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
}

/// Operators keep their token so runtime errors can report the line.
#[derive(Debug, PartialEq, Clone)]
pub enum Expr {
    Literal(LiteralValue),
    Grouping(Box<Expr>),
    Unary {
        op: Token,
        right: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: Token,
        right: Box<Expr>,
    },
    /// `and` / `or`, kept apart from `Binary` because they short-circuit.
    Logical {
        left: Box<Expr>,
        op: Token,
        right: Box<Expr>,
    },
    Variable(Token),
    Assign {
        name: Token,
        value: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        /// Closing parenthesis.
        paren: Token,
        args: Vec<Expr>,
    },
}

#[derive(Debug, PartialEq, Clone)]
pub enum LiteralValue {
    Nil,
    Bool(bool),
    Number(f64),
    Str(Rc<str>),
}
