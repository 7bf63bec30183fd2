//! The flat, solver-facing expression language. Every predicate handed to a [`Backend`] is an
//! [`Expr`] over the decision vector `x` and the objective handle `y`.
//!
//! [`Backend`]: crate::Backend

mod display;
pub mod evaluate;
#[cfg(test)]
mod tests;

/// A reference to one of the unknowns the solver searches over.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub enum Var {
    /// Element `i` of the decision vector `x`.
    Decision(usize),
    /// The objective handle `y`.
    Objective,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Immediate(Immediate),
    Var(Var),
    UnaryOp {
        op: UnaryOp,
        expr: Box<Self>,
    },
    BinaryOp {
        op: BinaryOp,
        lhs: Box<Self>,
        rhs: Box<Self>,
    },
    /// N-ary conjunction or disjunction.
    Logical {
        op: LogicalOp,
        args: Vec<Self>,
    },
    Select {
        condition: Box<Self>,
        then_expr: Box<Self>,
        else_expr: Box<Self>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Immediate {
    Bool(bool),
    Int(i64),
    Real(f64),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Equal,
    NotEqual,
    LessThanOrEqual,
    LessThan,
    GreaterThanOrEqual,
    GreaterThan,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Real,
}

impl BinaryOp {
    pub fn is_comparison(&self) -> bool {
        !matches!(self, Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Mod)
    }
}

impl Expr {
    pub fn int(value: i64) -> Self {
        Expr::Immediate(Immediate::Int(value))
    }

    pub fn bool(value: bool) -> Self {
        Expr::Immediate(Immediate::Bool(value))
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::BinaryOp {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn unary(op: UnaryOp, expr: Expr) -> Self {
        Expr::UnaryOp {
            op,
            expr: Box::new(expr),
        }
    }

    /// Combine `args` with `op`. A single argument is returned as is rather than being wrapped
    /// in a unary combinator.
    pub fn logical(op: LogicalOp, args: Vec<Expr>) -> Self {
        match <[Expr; 1]>::try_from(args) {
            Ok([arg]) => arg,
            Err(args) => Expr::Logical { op, args },
        }
    }

    pub fn select(condition: Expr, then_expr: Expr, else_expr: Expr) -> Self {
        Expr::Select {
            condition: Box::new(condition),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        }
    }

    /// Visit every variable referenced by this expression.
    pub fn for_each_var(&self, f: &mut impl FnMut(Var)) {
        match self {
            Expr::Immediate(_) => {}
            Expr::Var(var) => f(*var),
            Expr::UnaryOp { expr, .. } => expr.for_each_var(f),
            Expr::BinaryOp { lhs, rhs, .. } => {
                lhs.for_each_var(f);
                rhs.for_each_var(f);
            }
            Expr::Logical { args, .. } => args.iter().for_each(|arg| arg.for_each_var(f)),
            Expr::Select {
                condition,
                then_expr,
                else_expr,
            } => {
                condition.for_each_var(f);
                then_expr.for_each_var(f);
                else_expr.for_each_var(f);
            }
        }
    }
}

impl Immediate {
    pub fn as_f64(&self) -> f64 {
        match self {
            Immediate::Bool(val) => f64::from(u8::from(*val)),
            Immediate::Int(val) => *val as f64,
            Immediate::Real(val) => *val,
        }
    }
}
