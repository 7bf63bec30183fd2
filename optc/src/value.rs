use opt_solve::flatopt;
use std::fmt;

/// Everything a name can be bound to, and everything a term can evaluate to.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Real(f64),
    Bool(bool),
    /// The values of an array input.
    Array(Vec<Value>),
    /// The decision vector `x`. Indexing it yields the element terms.
    Decision { len: usize },
    /// An arithmetic expression over the decision vector and objective handle.
    Term(flatopt::Expr),
    /// A Boolean expression over the decision vector and objective handle.
    Predicate(flatopt::Expr),
    Builtin(Builtin),
}

/// The logical combinators made available to terms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Builtin {
    And,
    Or,
    If,
}

impl Builtin {
    pub const ALL: [Builtin; 3] = [Builtin::And, Builtin::Or, Builtin::If];

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::And => "And",
            Builtin::Or => "Or",
            Builtin::If => "If",
        }
    }
}

impl Value {
    /// The objective handle `y`.
    pub fn objective() -> Self {
        Value::Term(flatopt::Expr::Var(flatopt::Var::Objective))
    }

    /// A short description used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "an integer",
            Value::Real(_) => "a real",
            Value::Bool(_) => "a Boolean",
            Value::Array(_) => "an array",
            Value::Decision { .. } => "the decision vector",
            Value::Term(_) => "a solver term",
            Value::Predicate(_) => "a solver predicate",
            Value::Builtin(_) => "a builtin function",
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Real(_) | Value::Bool(_))
    }

    /// This value as an arithmetic solver expression, if it is one.
    pub fn to_term(&self) -> Option<flatopt::Expr> {
        match self {
            Value::Int(val) => Some(flatopt::Expr::int(*val)),
            Value::Real(val) => Some(flatopt::Expr::Immediate(flatopt::Immediate::Real(*val))),
            Value::Term(expr) => Some(expr.clone()),
            _ => None,
        }
    }

    /// This value as a Boolean solver expression, if it is one.
    pub fn to_predicate(&self) -> Option<flatopt::Expr> {
        match self {
            Value::Bool(val) => Some(flatopt::Expr::bool(*val)),
            Value::Predicate(expr) => Some(expr.clone()),
            _ => None,
        }
    }
}

impl From<flatopt::Immediate> for Value {
    fn from(imm: flatopt::Immediate) -> Self {
        match imm {
            flatopt::Immediate::Bool(val) => Value::Bool(val),
            flatopt::Immediate::Int(val) => Value::Int(val),
            flatopt::Immediate::Real(val) => Value::Real(val),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Int(val) => write!(f, "{val}"),
            Value::Real(val) => write!(f, "{val:?}"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Array(elements) => {
                write!(f, "[")?;
                for (idx, element) in elements.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{element}")?;
                }
                write!(f, "]")
            }
            Value::Decision { len } => write!(f, "x[0..{len}]"),
            Value::Term(expr) | Value::Predicate(expr) => write!(f, "{expr}"),
            Value::Builtin(builtin) => write!(f, "{}", builtin.name()),
        }
    }
}
