//! A tree-walking interpreter for a subset of the Lox language.
//!
//! See [Crafting Interpreters](https://craftinginterpreters.com/).
//!
//! Source text goes through three stages, each run to completion before the next starts:
//! the scanner produces tokens, the parser builds a syntax tree and the evaluator walks it.
//! Lexical and syntax errors are collected rather than raised, so one run reports all of them;
//! any such error prevents evaluation.
//!
//! # Examples
//!
//! See [`crate::interpreter::Interpreter`].
//!
//! # Limitations
//!
//! - No user-defined functions, closures or classes.  `fun`, `return`, `class`, `this` and
//! `super` are reserved but rejected by the parser.
//! - The only callable is the native `clock()`.
//! - Nothing bounds loops: `while (true) {}` runs forever.
//! - Parsing and evaluation recurse on the native stack, so very deeply nested expressions
//! (thousands of `(` or unary `-`) overflow it and abort the process.

#![warn(rust_2018_idioms)]
#![warn(missing_debug_implementations)]

pub mod ast;
pub mod diag;
pub mod interpreter;
pub mod value;

mod ctx;
mod env;
mod eval;
mod interner;
mod parser;
mod printer;
mod scanner;
mod token;

pub use eval::RuntimeError;
pub use interner::Symbol;
pub use token::{Literal, Token, TokenKind};
