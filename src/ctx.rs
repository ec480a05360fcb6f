use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::interner::{Interner, Symbol};
use crate::token::TokenKind;

/// State shared by the scanner, parser and evaluator of one interpreter session.
///
/// Symbols are only comparable when they come from the same interner, so every stage of a
/// session must be handed the same `Context`.
#[derive(Debug)]
pub struct Context {
    interner: RefCell<Interner>,
    keywords: HashMap<Symbol, TokenKind>,
}

impl Context {
    /// Creates a new context.
    ///
    /// Returns a Rc because the context is shared between various data structures.
    pub fn new() -> Rc<Self> {
        let mut interner = Interner::new();
        let keywords = KEYWORDS
            .iter()
            .map(|&(name, kind)| (interner.intern(name), kind))
            .collect();

        Rc::new(Context {
            interner: RefCell::new(interner),
            keywords,
        })
    }

    /// Interns `name` if needed and returns its symbol.
    pub fn symbol(&self, name: &str) -> Symbol {
        self.interner.borrow_mut().intern(name)
    }

    /// Returns the keyword kind spelled by `sym`, if any.
    pub fn keyword(&self, sym: &Symbol) -> Option<TokenKind> {
        self.keywords.get(sym).copied()
    }
}

const KEYWORDS: [(&str, TokenKind); 16] = [
    ("and", TokenKind::And),
    ("class", TokenKind::Class),
    ("else", TokenKind::Else),
    ("false", TokenKind::False),
    ("for", TokenKind::For),
    ("fun", TokenKind::Fun),
    ("if", TokenKind::If),
    ("nil", TokenKind::Nil),
    ("or", TokenKind::Or),
    ("print", TokenKind::Print),
    ("return", TokenKind::Return),
    ("super", TokenKind::Super),
    ("this", TokenKind::This),
    ("true", TokenKind::True),
    ("var", TokenKind::Var),
    ("while", TokenKind::While),
];
