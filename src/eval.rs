use std::error::Error;
use std::fmt;
use std::io;
use std::io::prelude::*;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::ast::{Expr, Stmt};
use crate::ctx::Context;
use crate::diag::Position;
use crate::env::{Environments, FrameId};
use crate::token::{Token, TokenKind};
use crate::value::{native_clock, NativeFunction, Value};

/// Errors aborting evaluation.  All but `Io` carry the line of the offending token.
#[derive(Debug)]
pub enum RuntimeError {
    OperandMustBeNumber {
        line: Position,
    },
    OperandsMustBeNumbers {
        line: Position,
    },
    OperandsMustBeNumbersOrStrings {
        line: Position,
    },
    DivisionByZero {
        line: Position,
    },
    UndefinedVariable {
        name: String,
        line: Position,
    },
    DuplicateBinding {
        name: String,
        line: Position,
    },
    NotCallable {
        found: &'static str,
        line: Position,
    },
    BadNumberOfArguments {
        expected: usize,
        found: usize,
        line: Position,
    },
    Io(io::Error),
}

impl RuntimeError {
    /// Source line the error was raised at, if it comes from the script.
    pub fn line(&self) -> Option<Position> {
        match self {
            RuntimeError::OperandMustBeNumber { line }
            | RuntimeError::OperandsMustBeNumbers { line }
            | RuntimeError::OperandsMustBeNumbersOrStrings { line }
            | RuntimeError::DivisionByZero { line }
            | RuntimeError::UndefinedVariable { line, .. }
            | RuntimeError::DuplicateBinding { line, .. }
            | RuntimeError::NotCallable { line, .. }
            | RuntimeError::BadNumberOfArguments { line, .. } => Some(*line),
            RuntimeError::Io(_) => None,
        }
    }
}

impl Error for RuntimeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RuntimeError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(line) = self.line() {
            write!(f, "line {}: ", line)?;
        }
        match self {
            RuntimeError::OperandMustBeNumber { .. } => write!(f, "operand must be a number"),
            RuntimeError::OperandsMustBeNumbers { .. } => write!(f, "operands must be numbers"),
            RuntimeError::OperandsMustBeNumbersOrStrings { .. } => {
                write!(f, "operands must be two numbers or two strings")
            }
            RuntimeError::DivisionByZero { .. } => write!(f, "division by zero"),
            RuntimeError::UndefinedVariable { name, .. } => {
                write!(f, "undefined variable '{}'", name)
            }
            RuntimeError::DuplicateBinding { name, .. } => {
                write!(f, "variable '{}' is already defined in this scope", name)
            }
            RuntimeError::NotCallable { found, .. } => write!(f, "can't call a {}", found),
            RuntimeError::BadNumberOfArguments {
                expected, found, ..
            } => write!(f, "expected {} arguments but got {}", expected, found),
            RuntimeError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl From<io::Error> for RuntimeError {
    fn from(e: io::Error) -> RuntimeError {
        RuntimeError::Io(e)
    }
}

/// Walks syntax trees, writing `print` output to `output`.
///
/// The global frame outlives individual calls to `interpret`, so definitions made by one
/// program are visible to the next.
#[derive(Debug)]
pub struct Evaluator<'t, W: Write> {
    output: &'t mut W,
    envs: Environments,
}

impl<'a, W: Write> Evaluator<'a, W> {
    pub fn new(output: &'a mut W, ctx: Rc<Context>) -> Evaluator<'a, W> {
        let mut envs = Environments::new();
        let clock = ctx.symbol("clock");
        envs.define_global(
            clock.clone(),
            Value::Native(NativeFunction::new(clock, 0, native_clock)),
        );
        Evaluator { output, envs }
    }

    /// Runs `stmts` in the global frame, stopping at the first runtime error.
    ///
    /// With `echo` set and a trailing expression statement, that statement's value is written
    /// to the output the way `print` would.
    pub fn interpret(&mut self, stmts: &[Stmt], echo: bool) -> Result<(), RuntimeError> {
        debug!(statements = stmts.len(), echo, "interpret");
        let (last, init) = match stmts.split_last() {
            Some(split) => split,
            None => return Ok(()),
        };
        for stmt in init {
            self.execute(stmt, FrameId::GLOBAL)?;
        }
        match last {
            Stmt::Expression(expr) if echo => {
                let value = self.evaluate(expr, FrameId::GLOBAL)?;
                writeln!(self.output, "{}", value)?;
            }
            _ => self.execute(last, FrameId::GLOBAL)?,
        }
        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt, env: FrameId) -> Result<(), RuntimeError> {
        match stmt {
            Stmt::Expression(e) => {
                self.evaluate(e, env)?;
            }
            Stmt::Print(e) => {
                let v = self.evaluate(e, env)?;
                writeln!(self.output, "{}", v)?;
            }
            Stmt::Var { name, init } => {
                let value = match init {
                    Some(e) => self.evaluate(e, env)?,
                    None => Value::Nil,
                };
                self.envs.define(env, name, value)?;
            }
            Stmt::Block(stmts) => self.execute_block(stmts, env)?,
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(cond, env)?.is_truthy() {
                    self.execute(then_branch, env)?;
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch, env)?;
                }
            }
            Stmt::While { cond, body } => {
                while self.evaluate(cond, env)?.is_truthy() {
                    self.execute(body, env)?;
                }
            }
        };
        Ok(())
    }

    /// Runs `stmts` in a fresh frame enclosed by `parent`.  The frame is released whether or
    /// not a statement fails.
    fn execute_block(&mut self, stmts: &[Stmt], parent: FrameId) -> Result<(), RuntimeError> {
        let frame = self.envs.push(parent);
        let result = stmts.iter().try_for_each(|s| self.execute(s, frame));
        self.envs.pop(frame);
        result
    }

    fn evaluate(&mut self, expr: &Expr, env: FrameId) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(lit) => Ok(Value::from(lit)),
            Expr::Grouping(e) => self.evaluate(e, env),
            Expr::Unary { op, right } => {
                let right = self.evaluate(right, env)?;
                match op.kind {
                    TokenKind::Minus => match right {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(RuntimeError::OperandMustBeNumber { line: op.line }),
                    },
                    _ => Ok(Value::Bool(!right.is_truthy())),
                }
            }
            Expr::Binary { left, op, right } => {
                let l = self.evaluate(left, env)?;
                let r = self.evaluate(right, env)?;
                binary(op, l, r)
            }
            Expr::Logical { left, op, right } => {
                let l = self.evaluate(left, env)?;
                let short_circuits = match op.kind {
                    TokenKind::Or => l.is_truthy(),
                    _ => !l.is_truthy(),
                };
                if short_circuits {
                    Ok(l)
                } else {
                    self.evaluate(right, env)
                }
            }
            Expr::Variable(name) => self.envs.get(env, name),
            Expr::Assign { name, value } => {
                let value = self.evaluate(value, env)?;
                self.envs.assign(env, name, value.clone())?;
                Ok(value)
            }
            Expr::Call {
                callee,
                paren,
                args,
            } => {
                let callee = self.evaluate(callee, env)?;
                let args = args
                    .iter()
                    .map(|a| self.evaluate(a, env))
                    .collect::<Result<Vec<Value>, RuntimeError>>()?;
                match callee {
                    Value::Native(func) => {
                        if args.len() != func.arity {
                            return Err(RuntimeError::BadNumberOfArguments {
                                expected: func.arity,
                                found: args.len(),
                                line: paren.line,
                            });
                        }
                        trace!(name = %func.name, "calling native");
                        Ok(func.call(&args))
                    }
                    other => Err(RuntimeError::NotCallable {
                        found: other.type_name(),
                        line: paren.line,
                    }),
                }
            }
        }
    }
}

/// Applies a binary operator to already evaluated operands.
fn binary(op: &Token, l: Value, r: Value) -> Result<Value, RuntimeError> {
    let line = op.line;
    match op.kind {
        TokenKind::Plus => match (l, r) {
            (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
            (Value::Str(l), Value::Str(r)) => {
                let mut s = String::with_capacity(l.len() + r.len());
                s.push_str(&l);
                s.push_str(&r);
                Ok(Value::Str(Rc::from(s)))
            }
            _ => Err(RuntimeError::OperandsMustBeNumbersOrStrings { line }),
        },
        TokenKind::EqualEqual => Ok(Value::Bool(l == r)),
        TokenKind::BangEqual => Ok(Value::Bool(l != r)),
        _ => {
            let (l, r) = match (l, r) {
                (Value::Number(l), Value::Number(r)) => (l, r),
                _ => return Err(RuntimeError::OperandsMustBeNumbers { line }),
            };
            match op.kind {
                TokenKind::Minus => Ok(Value::Number(l - r)),
                TokenKind::Star => Ok(Value::Number(l * r)),
                TokenKind::Slash if r == 0.0 => Err(RuntimeError::DivisionByZero { line }),
                TokenKind::Slash => Ok(Value::Number(l / r)),
                TokenKind::Greater => Ok(Value::Bool(l > r)),
                TokenKind::GreaterEqual => Ok(Value::Bool(l >= r)),
                TokenKind::Less => Ok(Value::Bool(l < r)),
                TokenKind::LessEqual => Ok(Value::Bool(l <= r)),
                _ => unreachable!("parser produced binary operator {}", op.kind),
            }
        }
    }
}
