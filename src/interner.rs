//! String interner.
//!
//! Every lexeme produced by the scanner goes through here, so identifiers with the same spelling
//! share one allocation and can be compared by address.

use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Owns the set of known symbols.
#[derive(Debug, Default)]
pub struct Interner {
    symbols: HashSet<Symbol>,
}

impl Interner {
    pub fn new() -> Interner {
        Interner::default()
    }

    /// Returns the symbol spelled `name`, creating it on first use.
    pub fn intern(&mut self, name: &str) -> Symbol {
        if let Some(sym) = self.symbols.get(name) {
            return sym.clone();
        }
        let sym = Symbol(Rc::from(name));
        self.symbols.insert(sym.clone());
        sym
    }
}

/// An immutable interned string.
///
/// Two symbols from the same `Interner` are equal if and only if they share storage, so equality
/// is a pointer comparison.  Symbols from different interners never compare equal.
#[derive(Debug, Clone)]
pub struct Symbol(Rc<str>);

impl Symbol {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Must agree with `str`'s hash for the `Borrow<str>` lookup in `Interner::intern`.
impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Symbol {}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_keeps_spelling() {
        let mut interner = Interner::new();
        assert_eq!(interner.intern("answer").as_str(), "answer");
    }

    #[test]
    fn same_spelling_is_shared() {
        let mut interner = Interner::new();
        let a = interner.intern("x");
        let b = interner.intern("x");
        assert_eq!(a, b);
    }

    #[test]
    fn different_spellings_differ() {
        let mut interner = Interner::new();
        assert_ne!(interner.intern("x"), interner.intern("y"));
    }

    #[test]
    fn interners_do_not_share_symbols() {
        let mut first = Interner::new();
        let mut second = Interner::new();
        assert_ne!(first.intern("x"), second.intern("x"));
    }
}
