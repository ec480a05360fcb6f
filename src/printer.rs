//! Parenthesized, Lisp-like rendering of syntax trees.
//!
//! Only used for debugging (`walox --dump-ast`).  The output is not meant to be parsed back.

use std::fmt;

use crate::ast::{Expr, LiteralValue, Stmt};
use crate::value::format_number;

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Nil => write!(f, "nil"),
            LiteralValue::Bool(b) => write!(f, "{}", b),
            LiteralValue::Number(n) => write!(f, "{}", format_number(*n)),
            LiteralValue::Str(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(lit) => write!(f, "{}", lit),
            Expr::Grouping(inner) => write!(f, "(group {})", inner),
            Expr::Unary { op, right } => write!(f, "({} {})", op.lexeme, right),
            Expr::Binary { left, op, right } | Expr::Logical { left, op, right } => {
                write!(f, "({} {} {})", op.lexeme, left, right)
            }
            Expr::Variable(name) => write!(f, "{}", name.lexeme),
            Expr::Assign { name, value } => write!(f, "(= {} {})", name.lexeme, value),
            Expr::Call { callee, args, .. } => {
                write!(f, "(call {}", callee)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Expression(e) => write!(f, "(; {})", e),
            Stmt::Print(e) => write!(f, "(print {})", e),
            Stmt::Var { name, init: None } => write!(f, "(var {})", name.lexeme),
            Stmt::Var {
                name,
                init: Some(init),
            } => write!(f, "(var {} {})", name.lexeme, init),
            Stmt::Block(stmts) => {
                write!(f, "(block")?;
                for s in stmts {
                    write!(f, " {}", s)?;
                }
                write!(f, ")")
            }
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                write!(f, "(if {} {}", cond, then_branch)?;
                if let Some(else_branch) = else_branch {
                    write!(f, " {}", else_branch)?;
                }
                write!(f, ")")
            }
            Stmt::While { cond, body } => write!(f, "(while {} {})", cond, body),
        }
    }
}
