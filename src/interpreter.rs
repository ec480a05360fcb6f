//! API to control the interpreter.

use std::error::Error;
use std::fmt;
use std::io::prelude::*;
use std::rc::Rc;

use tracing::debug;

use crate::ast::Stmt;
use crate::ctx::Context;
use crate::diag::Diagnostics;
use crate::eval::{Evaluator, RuntimeError};
use crate::parser::Parser;
use crate::scanner::Scanner;

/// Tree-walk interpreter.
///
/// Scans, parses and evaluates source text.  Variables defined by one call to `run` remain
/// visible to later calls, which is what the REPL relies on.
///
/// # Example
///
/// ```
/// # use walox::interpreter::{Interpreter, LoxError};
///
/// let mut output: Vec<u8> = Vec::new();
/// let mut interp = Interpreter::new(&mut output);
///
/// interp.run("var greeting = \"hello\";")?;
/// interp.run("{ var greeting = \"shadowed\"; } print greeting + \" world\";")?;
///
/// drop(interp);
/// assert_eq!(output, b"hello world\n");
/// # Ok::<(), LoxError>(())
/// ```
#[derive(Debug)]
pub struct Interpreter<'t, W: Write> {
    ctx: Rc<Context>,
    evaluator: Evaluator<'t, W>,
    interactive: bool,
}

/// Errors the interpreter can raise.
#[derive(Debug)]
pub enum LoxError {
    /// Lexical or syntax errors.  Nothing was evaluated.
    Static(Diagnostics),

    /// Error occurring during evaluation.  Output printed before the error stays printed.
    Runtime(RuntimeError),
}

impl LoxError {
    /// Process exit status for the error, following the BSD `sysexits` convention.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoxError::Static(_) => 65,
            LoxError::Runtime(_) => 70,
        }
    }
}

impl fmt::Display for LoxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoxError::Static(diags) => write!(f, "{}", diags),
            LoxError::Runtime(e) => write!(f, "runtime error: {}", e),
        }
    }
}

impl Error for LoxError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LoxError::Static(diags) => Some(diags),
            LoxError::Runtime(e) => Some(e),
        }
    }
}

impl From<RuntimeError> for LoxError {
    fn from(e: RuntimeError) -> LoxError {
        LoxError::Runtime(e)
    }
}

impl From<Diagnostics> for LoxError {
    fn from(diags: Diagnostics) -> LoxError {
        LoxError::Static(diags)
    }
}

impl<W: Write> Interpreter<'_, W> {
    pub fn new(output: &mut W) -> Interpreter<'_, W> {
        let ctx = Context::new();
        Interpreter {
            ctx: ctx.clone(),
            evaluator: Evaluator::new(output, ctx),
            interactive: false,
        }
    }

    /// In interactive mode the value of a trailing expression statement is echoed to the output.
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Scans and parses `source` without running it.
    pub fn parse(&self, source: &str) -> Result<Vec<Stmt>, LoxError> {
        let mut diags = Diagnostics::new();
        let tokens = Scanner::new(source, self.ctx.clone()).scan(&mut diags);
        if diags.has_errors() {
            return Err(LoxError::Static(diags));
        }
        match Parser::new(tokens, &mut diags).parse() {
            Some(prg) => Ok(prg),
            None => Err(LoxError::Static(diags)),
        }
    }

    /// Evaluates statements previously returned by `parse`.
    pub fn execute(&mut self, prg: &[Stmt]) -> Result<(), LoxError> {
        self.evaluator.interpret(prg, self.interactive)?;
        Ok(())
    }

    /// Scans, parses and evaluates `source`.
    pub fn run(&mut self, source: &str) -> Result<(), LoxError> {
        debug!(bytes = source.len(), "run");
        let prg = self.parse(source)?;
        self.execute(&prg)
    }
}
