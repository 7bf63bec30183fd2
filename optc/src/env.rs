use crate::{error::Error, expr::Expr, parser::parse_expr, value::Value};
use fxhash::FxHashMap;
use std::fmt;


/// An integer quantity of the problem document: a literal, or the text of an expression over
/// inputs, parameters and enclosing loop variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Bound {
    Literal(i64),
    Expr(String),
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Bound::Literal(val) => write!(f, "{val}"),
            Bound::Expr(src) => write!(f, "{src}"),
        }
    }
}

/// The mapping from symbolic names to values that terms are evaluated against. Loop variables
/// are pushed and popped in strict stack order; binding a name that is already bound is an
/// error rather than shadowing.
#[derive(Clone, Debug, Default)]
pub struct Env {
    values: FxHashMap<String, Value>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, which must not be bound yet.
    pub fn bind(&mut self, name: &str, value: Value) -> Result<(), Error> {
        if self.values.contains_key(name) {
            return Err(Error::DuplicateBinding {
                name: name.to_string(),
            });
        }
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Rebind `name`, whether or not it is already bound.
    pub fn set(&mut self, name: &str, value: Value) {
        match self.values.get_mut(name) {
            Some(slot) => *slot = value,
            None => {
                self.values.insert(name.to_string(), value);
            }
        }
    }

    pub fn unbind(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Resolve `bound` to an integer. A literal resolves to itself and a name to the integer it
    /// is bound to. Any other expression is only accepted when `arithmetic` is set.
    pub fn resolve_number(&self, bound: &Bound, arithmetic: bool) -> Result<i64, Error> {
        let src = match bound {
            Bound::Literal(val) => return Ok(*val),
            Bound::Expr(src) => src,
        };
        let unresolved = || Error::UnresolvedBound {
            bound: src.to_string(),
        };

        let expr = parse_expr(src).map_err(|_| unresolved())?;
        if !arithmetic && !matches!(expr, Expr::Path(..)) {
            return Err(unresolved());
        }
        match expr.evaluate(self) {
            Ok(Value::Int(val)) => Ok(val),
            _ => Err(unresolved()),
        }
    }
}
