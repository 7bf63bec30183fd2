use crate::{
    env::Env,
    error::ExprError,
    parser::parse_expr,
    span::{Span, Spanned},
    value::Value,
};
use std::fmt;

mod display;
pub(crate) mod evaluate;

/// The typed syntax tree of a term expression such as `c[i] * x[i] + 1`.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Immediate {
        value: Immediate,
        span: Span,
    },
    Path(String, Span),
    UnaryOp {
        op: UnaryOp,
        expr: Box<Expr>,
        span: Span,
    },
    BinaryOp {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
    },
    Index {
        expr: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },
    Call {
        name: String,
        name_span: Span,
        args: Vec<Expr>,
        span: Span,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Immediate {
    Bool(bool),
    Int(i64),
    Real(f64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,

    // Comparison
    Equal,
    NotEqual,
    LessThanOrEqual,
    LessThan,
    GreaterThanOrEqual,
    GreaterThan,
}

impl BinaryOp {
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::LessThanOrEqual
                | BinaryOp::LessThan
                | BinaryOp::GreaterThanOrEqual
                | BinaryOp::GreaterThan
        )
    }

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::LessThanOrEqual => "<=",
            BinaryOp::LessThan => "<",
            BinaryOp::GreaterThanOrEqual => ">=",
            BinaryOp::GreaterThan => ">",
        }
    }
}

impl UnaryOp {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Pos => "+",
        }
    }
}

impl Spanned for Expr {
    fn span(&self) -> &Span {
        match self {
            Expr::Immediate { span, .. }
            | Expr::Path(_, span)
            | Expr::UnaryOp { span, .. }
            | Expr::BinaryOp { span, .. }
            | Expr::Index { span, .. }
            | Expr::Call { span, .. } => span,
        }
    }
}

/// A term field of the problem document: the source text together with its parsed form. Terms
/// are parsed once, when the document is loaded, and evaluated many times.
#[derive(Clone, Debug, PartialEq)]
pub struct Term {
    expr: Expr,
}

impl Term {
    pub fn parse(src: &str) -> Result<Self, ExprError> {
        Ok(Term {
            expr: parse_expr(src)?,
        })
    }

    /// The text this term was parsed from.
    pub fn source(&self) -> &str {
        self.expr.span().source()
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn evaluate(&self, env: &Env) -> Result<Value, ExprError> {
        self.expr.evaluate(env)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.source())
    }
}
