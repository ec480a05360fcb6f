//! Lexical scopes.
//!
//! Frames live in an arena and point to their enclosing frame by index.  Blocks strictly nest,
//! so frames are opened and released in stack order; released binding maps are kept in a pool
//! and handed to the next block.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::trace;

use crate::eval::RuntimeError;
use crate::interner::Symbol;
use crate::token::Token;
use crate::value::Value;

/// Index of a frame in `Environments`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameId(usize);

impl FrameId {
    /// The global frame, alive for the whole session.
    pub const GLOBAL: FrameId = FrameId(0);
}

#[derive(Debug)]
struct Frame {
    parent: Option<FrameId>,
    bindings: HashMap<Symbol, Value>,
}

#[derive(Debug)]
pub struct Environments {
    frames: Vec<Frame>,
    pool: Vec<HashMap<Symbol, Value>>,
}

impl Default for Environments {
    fn default() -> Self {
        Environments::new()
    }
}

impl Environments {
    /// Creates the arena holding only the global frame.
    pub fn new() -> Environments {
        Environments {
            frames: vec![Frame {
                parent: None,
                bindings: HashMap::new(),
            }],
            pool: vec![],
        }
    }

    /// Opens a frame enclosed by `parent`.
    pub fn push(&mut self, parent: FrameId) -> FrameId {
        let bindings = self.pool.pop().unwrap_or_default();
        self.frames.push(Frame {
            parent: Some(parent),
            bindings,
        });
        let id = FrameId(self.frames.len() - 1);
        trace!(frame = id.0, "frame opened");
        id
    }

    /// Releases `frame`, which must be the innermost open frame other than the global one.
    pub fn pop(&mut self, frame: FrameId) {
        debug_assert_eq!(frame.0, self.frames.len() - 1);
        debug_assert_ne!(frame, FrameId::GLOBAL);
        if let Some(mut released) = self.frames.pop() {
            released.bindings.clear();
            self.pool.push(released.bindings);
        }
        trace!(frame = frame.0, "frame released");
    }

    /// Number of open frames, global included.
    #[cfg(test)]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Binds `name` in `frame`.  Fails if `frame` already binds it; enclosing frames are not
    /// consulted, so shadowing is allowed.
    pub fn define(&mut self, frame: FrameId, name: &Token, value: Value) -> Result<(), RuntimeError> {
        match self.frames[frame.0].bindings.entry(name.lexeme.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(value);
                Ok(())
            }
            Entry::Occupied(_) => Err(RuntimeError::DuplicateBinding {
                name: name.lexeme.to_string(),
                line: name.line,
            }),
        }
    }

    /// Binds a name in the global frame, replacing any previous binding.  Used to install
    /// natives before any script runs.
    pub fn define_global(&mut self, name: Symbol, value: Value) {
        self.frames[FrameId::GLOBAL.0].bindings.insert(name, value);
    }

    /// Looks `name` up from `frame` outwards.
    pub fn get(&self, frame: FrameId, name: &Token) -> Result<Value, RuntimeError> {
        let mut id = Some(frame);
        while let Some(FrameId(i)) = id {
            let frame = &self.frames[i];
            if let Some(value) = frame.bindings.get(&name.lexeme) {
                return Ok(value.clone());
            }
            id = frame.parent;
        }
        Err(undefined(name))
    }

    /// Overwrites the innermost existing binding of `name`.  Never creates a binding.
    pub fn assign(&mut self, frame: FrameId, name: &Token, value: Value) -> Result<(), RuntimeError> {
        let mut id = Some(frame);
        while let Some(FrameId(i)) = id {
            let frame = &mut self.frames[i];
            if let Some(slot) = frame.bindings.get_mut(&name.lexeme) {
                *slot = value;
                return Ok(());
            }
            id = frame.parent;
        }
        Err(undefined(name))
    }
}

fn undefined(name: &Token) -> RuntimeError {
    RuntimeError::UndefinedVariable {
        name: name.lexeme.to_string(),
        line: name.line,
    }
}
