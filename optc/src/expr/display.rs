use super::{Expr, Immediate};
use itertools::Itertools;
use std::fmt::{Display, Formatter, Result};

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            Expr::Immediate { value, .. } => write!(f, "{value}"),
            Expr::Path(name, _) => write!(f, "{name}"),
            Expr::UnaryOp { op, expr, .. } => write!(f, "{}{expr}", op.as_str()),
            Expr::BinaryOp { op, lhs, rhs, .. } => write!(f, "({lhs} {} {rhs})", op.as_str()),
            Expr::Index { expr, index, .. } => write!(f, "{expr}[{index}]"),
            Expr::Call { name, args, .. } => write!(f, "{name}({})", args.iter().join(", ")),
        }
    }
}

impl Display for Immediate {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            Immediate::Bool(true) => write!(f, "True"),
            Immediate::Bool(false) => write!(f, "False"),
            Immediate::Int(val) => write!(f, "{val}"),
            Immediate::Real(val) => write!(f, "{val:?}"),
        }
    }
}
