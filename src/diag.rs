//! Lexical and syntax error reporting.
//!
//! The scanner and parser never abort on these errors.  They record them into a `Diagnostics`
//! collector owned by the caller, which checks `has_errors()` before moving on to the next stage.

use std::error::Error;
use std::fmt;

use tracing::debug;

use crate::token::{Token, TokenKind};

/// Line number (starting at one).
pub type Position = u32;

#[derive(Debug, PartialEq, Clone)]
pub enum LexError {
    UnexpectedChar(char),
    UnterminatedString,
    BadNumberLiteral(String),
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnexpectedChar(ch) => write!(f, "unexpected character '{}'", ch),
            LexError::UnterminatedString => write!(f, "unterminated string"),
            LexError::BadNumberLiteral(lit) => {
                write!(f, "cannot parse number literal: {}", lit)
            }
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum ParseError {
    /// A specific token was required, e.g. `;` after a statement.
    ExpectedToken {
        expected: TokenKind,
        context: &'static str,
    },
    ExpectedExpression,
    ExpectedVariableName,
    InvalidAssignmentTarget,
    TooManyArguments,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::ExpectedToken { expected, context } => {
                write!(f, "expected '{}' {}", expected, context)
            }
            ParseError::ExpectedExpression => write!(f, "expected expression"),
            ParseError::ExpectedVariableName => write!(f, "expected variable name"),
            ParseError::InvalidAssignmentTarget => write!(f, "invalid assignment target"),
            ParseError::TooManyArguments => write!(f, "can't have more than 255 arguments"),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum DiagnosticKind {
    Lexical(LexError),
    Syntax(ParseError),
}

/// One reported error with its source position.
#[derive(Debug, PartialEq, Clone)]
pub struct Diagnostic {
    pub line: Position,
    /// Where on the line the error sits: empty, `" at end"` or `" at 'lexeme'"`.
    pub location: String,
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::Lexical(e) => {
                write!(f, "lexical error: line {}{}: {}", self.line, self.location, e)
            }
            DiagnosticKind::Syntax(e) => {
                write!(f, "syntax error: line {}{}: {}", self.line, self.location, e)
            }
        }
    }
}

impl Error for Diagnostic {}

/// Collects the diagnostics of one scan/parse run.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Diagnostics {
        Diagnostics::default()
    }

    /// Records a diagnostic with an explicit location string.
    pub fn report(&mut self, line: Position, location: impl Into<String>, kind: DiagnosticKind) {
        let diagnostic = Diagnostic {
            line,
            location: location.into(),
            kind,
        };
        debug!("recorded diagnostic: {}", diagnostic);
        self.entries.push(diagnostic);
    }

    pub fn lexical(&mut self, line: Position, error: LexError) {
        self.report(line, "", DiagnosticKind::Lexical(error));
    }

    /// Records a syntax error located at `token`.
    pub fn syntax(&mut self, token: &Token, error: ParseError) {
        let location = if token.kind == TokenKind::Eof {
            " at end".to_string()
        } else {
            format!(" at '{}'", token.lexeme)
        };
        self.report(token.line, location, DiagnosticKind::Syntax(error));
    }

    pub fn has_errors(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", d)?;
        }
        Ok(())
    }
}

impl Error for Diagnostics {}
