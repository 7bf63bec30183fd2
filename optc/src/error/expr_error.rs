use crate::span::{Span, Spanned};
use thiserror::Error;

/// A failure to parse or evaluate a term expression, located at the offending sub-expression.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind}")]
pub struct ExprError {
    pub kind: ExprErrorKind,
    pub span: Span,
}

#[derive(Error, Debug, Clone, PartialEq, Default)]
pub enum ExprErrorKind {
    #[default]
    #[error("invalid token")]
    InvalidToken,
    #[error("expected {expected}, found `{found}`")]
    UnexpectedToken { expected: &'static str, found: String },
    #[error("unexpected end of expression, expected {expected}")]
    UnexpectedEnd { expected: &'static str },
    #[error("comparison operators cannot be chained")]
    ChainedComparison,
    #[error("literal `{literal}` is out of range")]
    LiteralOutOfRange { literal: String },
    #[error("cannot find value `{name}` in this scope")]
    Unbound { name: String },
    #[error("operator `{op}` cannot be applied to {lhs} and {rhs}")]
    BinaryTypeMismatch {
        op: &'static str,
        lhs: &'static str,
        rhs: &'static str,
    },
    #[error("operator `{op}` cannot be applied to {operand}")]
    UnaryTypeMismatch {
        op: &'static str,
        operand: &'static str,
    },
    #[error("cannot index into {kind}")]
    NotIndexable { kind: &'static str },
    #[error("index must be an integer, found {kind}")]
    NonIntegerIndex { kind: &'static str },
    #[error("index {index} is out of bounds for length {len}")]
    IndexOutOfBounds { index: i64, len: usize },
    #[error("{kind} is not callable")]
    NotCallable { kind: &'static str },
    #[error("`{name}` expects {expected} argument(s), found {found}")]
    Arity {
        name: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("`{name}` expects Boolean arguments, found {kind}")]
    NonBooleanArgument {
        name: &'static str,
        kind: &'static str,
    },
    #[error("attempt to divide by zero")]
    DivisionByZero,
    #[error("arithmetic overflow")]
    Overflow,
    #[error("exponent of a solver term must be a non-negative integer constant")]
    UnsupportedPower,
    #[error("exponent {exp} of a solver term is larger than {max}")]
    ExponentTooLarge { exp: i64, max: i64 },
    #[error("constraint must evaluate to a Boolean, found {kind}")]
    NotAPredicate { kind: &'static str },
    #[error("aggregated term must be numeric, found {kind}")]
    NotAScalar { kind: &'static str },
}

impl ExprError {
    /// The short message attached to the span when rendering this error.
    pub(crate) fn label(&self) -> String {
        use ExprErrorKind::*;
        match &self.kind {
            InvalidToken => "invalid token".into(),
            UnexpectedToken { expected, .. } => format!("expected {expected}"),
            UnexpectedEnd { .. } => "expression ends here".into(),
            ChainedComparison => "second comparison here".into(),
            LiteralOutOfRange { .. } => "literal out of range".into(),
            Unbound { .. } => "not found in this scope".into(),
            BinaryTypeMismatch { .. } | UnaryTypeMismatch { .. } => "type mismatch".into(),
            NotIndexable { kind } => format!("this is {kind}"),
            NonIntegerIndex { .. } | IndexOutOfBounds { .. } => "invalid index".into(),
            NotCallable { .. } => "called here".into(),
            Arity { .. } | NonBooleanArgument { .. } => "in this call".into(),
            DivisionByZero => "division by zero".into(),
            Overflow => "overflow".into(),
            UnsupportedPower | ExponentTooLarge { .. } => "exponent".into(),
            NotAPredicate { .. } => "not a constraint".into(),
            NotAScalar { .. } => "not a number".into(),
        }
    }

    pub(crate) fn help(&self) -> Option<String> {
        match &self.kind {
            ExprErrorKind::ChainedComparison => {
                Some("combine comparisons with `And(...)` instead".into())
            }
            ExprErrorKind::NotAPredicate { .. } => {
                Some("add `comp` and `rval` to compare this term with a value".into())
            }
            ExprErrorKind::UnsupportedPower => {
                Some("solver terms can only be raised to constant powers".into())
            }
            _ => None,
        }
    }
}

impl Spanned for ExprError {
    fn span(&self) -> &Span {
        &self.span
    }
}
