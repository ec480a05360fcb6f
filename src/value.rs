use std::fmt;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::ast::LiteralValue;
use crate::interner::Symbol;

/// Runtime value.
///
/// Equality is structural and never converts between types: `1 == "1"` is false.
#[derive(Debug, PartialEq, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    Str(Rc<str>),
    Native(NativeFunction),
}

impl Value {
    /// `nil` and `false` are falsy, everything else (`0` and `""` included) is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            Value::Number(_) | Value::Str(_) | Value::Native(_) => true,
        }
    }

    /// Name of the value's type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Native(_) => "native function",
        }
    }
}

impl From<&LiteralValue> for Value {
    fn from(lit: &LiteralValue) -> Value {
        match lit {
            LiteralValue::Nil => Value::Nil,
            LiteralValue::Bool(b) => Value::Bool(*b),
            LiteralValue::Number(n) => Value::Number(*n),
            LiteralValue::Str(s) => Value::Str(s.clone()),
        }
    }
}

/// Renders values the way `print` shows them.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Str(s) => f.write_str(s),
            Value::Native(func) => write!(f, "<native fn {}>", func.name),
        }
    }
}

/// Integral numbers print without a fractional part (`3`, not `3.0`).  Negative zero prints
/// as `0`.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 {
        format!("{:.0}", n + 0.0)
    } else {
        format!("{}", n)
    }
}

/// A function implemented by the interpreter and exposed to scripts.
#[derive(Clone)]
pub struct NativeFunction {
    pub name: Symbol,
    pub arity: usize,
    body: fn(&[Value]) -> Value,
}

impl NativeFunction {
    pub fn new(name: Symbol, arity: usize, body: fn(&[Value]) -> Value) -> NativeFunction {
        NativeFunction { name, arity, body }
    }

    /// Calls the function.  The caller has already checked `args.len() == self.arity`.
    pub fn call(&self, args: &[Value]) -> Value {
        debug_assert_eq!(args.len(), self.arity);
        (self.body)(args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

impl PartialEq for NativeFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// `clock()`: seconds since the Unix epoch.
pub fn native_clock(_args: &[Value]) -> Value {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);
    Value::Number(secs)
}
