use super::Scip;
use crate::{
    error::SolveError,
    flatopt::{BinaryOp, Expr, Immediate, LogicalOp, UnaryOp},
};
use russcip::prelude::*;

impl Scip {
    /// Enforce `constraint` on the model. Conjunctions are split into separate constraints and
    /// comparisons become plain linear constraints; everything else is reified and its binary
    /// variable is fixed to 1.
    pub(super) fn convert_constraint(&mut self, constraint: &Expr) -> Result<(), SolveError> {
        match constraint {
            Expr::Immediate(Immediate::Bool(value)) => {
                if !value {
                    // 0 == 1
                    self.linear(vec![], &[], 1., 1.)?;
                }
            }
            Expr::Immediate(_) => {
                return Err(SolveError::Internal {
                    msg: "(scip) attempting to convert a non-Boolean immediate into a constraint",
                })
            }

            Expr::UnaryOp {
                op: UnaryOp::Not,
                expr,
            } => self.convert_constraint(&Self::invert(expr)?)?,

            Expr::Logical {
                op: LogicalOp::And,
                args,
            } => {
                for arg in args {
                    self.convert_constraint(arg)?;
                }
            }

            Expr::BinaryOp { op, lhs, rhs }
                if matches!(
                    op,
                    BinaryOp::Equal | BinaryOp::LessThanOrEqual | BinaryOp::GreaterThanOrEqual
                ) =>
            {
                let lhs = self.expr_to_var(lhs)?;
                let rhs = self.expr_to_var(rhs)?;
                // lower <= lhs - rhs <= upper
                let (lower, upper) = match op {
                    BinaryOp::Equal => (0., 0.),
                    BinaryOp::LessThanOrEqual => (-f64::INFINITY, 0.),
                    _ => (0., f64::INFINITY),
                };
                self.linear(vec![lhs, rhs], &[1., -1.], lower, upper)?;
            }

            Expr::UnaryOp { .. }
            | Expr::BinaryOp { .. }
            | Expr::Logical { .. }
            | Expr::Var(_)
            | Expr::Select { .. } => {
                let var = self.expr_to_var(constraint)?;
                if var.var_type() != VarType::Binary {
                    return Err(SolveError::Internal {
                        msg: "(scip) non-Boolean expressions cannot be constraints",
                    });
                }
                self.linear(vec![var], &[1.], 1., 1.)?;
            }
        }
        Ok(())
    }

    /// Push a negation down to the comparisons of a Boolean expression. For example, a `>=`
    /// comparison becomes a `<` comparison and `And` becomes `Or` over the inverted arguments.
    pub(super) fn invert(expr: &Expr) -> Result<Expr, SolveError> {
        match expr {
            Expr::Immediate(Immediate::Bool(value)) => Ok(Expr::bool(!value)),

            Expr::UnaryOp {
                op: UnaryOp::Not,
                expr,
            } => Ok(*expr.clone()),

            Expr::BinaryOp { op, lhs, rhs } => {
                let op = match op {
                    BinaryOp::Equal => BinaryOp::NotEqual,
                    BinaryOp::NotEqual => BinaryOp::Equal,
                    BinaryOp::LessThanOrEqual => BinaryOp::GreaterThan,
                    BinaryOp::LessThan => BinaryOp::GreaterThanOrEqual,
                    BinaryOp::GreaterThanOrEqual => BinaryOp::LessThan,
                    BinaryOp::GreaterThan => BinaryOp::LessThanOrEqual,
                    _ => {
                        return Err(SolveError::Internal {
                            msg: "(scip) attempting to invert a non-Boolean expression",
                        })
                    }
                };
                Ok(Expr::BinaryOp {
                    op,
                    lhs: lhs.clone(),
                    rhs: rhs.clone(),
                })
            }

            Expr::Logical { op, args } => Ok(Expr::Logical {
                op: match op {
                    LogicalOp::And => LogicalOp::Or,
                    LogicalOp::Or => LogicalOp::And,
                },
                args: args.iter().map(Self::invert).collect::<Result<_, _>>()?,
            }),

            Expr::Immediate(_) | Expr::Var(_) | Expr::UnaryOp { .. } | Expr::Select { .. } => {
                Err(SolveError::Internal {
                    msg: "(scip) attempting to invert a non-Boolean expression",
                })
            }
        }
    }
}
