use super::{BinaryOp, Expr, Immediate, LogicalOp, Type, UnaryOp, Var};
use std::fmt::{Display, Formatter, Result};

impl Display for Var {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            Var::Decision(idx) => write!(f, "x[{idx}]"),
            Var::Objective => write!(f, "y"),
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            Expr::Immediate(imm) => write!(f, "{imm}"),
            Expr::Var(var) => write!(f, "{var}"),
            Expr::UnaryOp { op, expr } => write!(f, "{op}{expr}"),
            Expr::BinaryOp { op, lhs, rhs } => write!(f, "({lhs} {op} {rhs})"),
            Expr::Logical { op, args } => {
                write!(f, "{op}(")?;
                for (idx, arg) in args.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            Expr::Select {
                condition,
                then_expr,
                else_expr,
            } => write!(f, "If({condition}, {then_expr}, {else_expr})"),
        }
    }
}

impl Display for Immediate {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            Immediate::Bool(b) => write!(f, "{b}"),
            Immediate::Int(i) => write!(f, "{i}"),
            Immediate::Real(r) => write!(f, "{r:?}"),
        }
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
            BinaryOp::Mod => write!(f, "%"),
            BinaryOp::Equal => write!(f, "=="),
            BinaryOp::NotEqual => write!(f, "!="),
            BinaryOp::LessThanOrEqual => write!(f, "<="),
            BinaryOp::LessThan => write!(f, "<"),
            BinaryOp::GreaterThanOrEqual => write!(f, ">="),
            BinaryOp::GreaterThan => write!(f, ">"),
        }
    }
}

impl Display for LogicalOp {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            LogicalOp::And => write!(f, "And"),
            LogicalOp::Or => write!(f, "Or"),
        }
    }
}

impl Display for UnaryOp {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Not => write!(f, "!"),
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Real => write!(f, "real"),
        }
    }
}
