use crate::{
    error::SolveError,
    flatopt::{BinaryOp, Expr, Immediate, LogicalOp, UnaryOp},
    Solution,
};

/// Given an `Expr` and a solution, plug in the solution into the `Expr` and evaluate it to an
/// `Immediate`.
pub fn evaluate_expr(expr: &Expr, solution: &Solution) -> Result<Immediate, SolveError> {
    /// Compares two floats using a threshold
    fn approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6 // This threshold is arbitrarily selected for now
    }

    let error = |msg: &'static str| SolveError::Evaluation {
        expr: expr.to_string(),
        msg,
    };

    use BinaryOp::*;
    use UnaryOp::*;
    match expr {
        Expr::Immediate(imm) => Ok(*imm),
        Expr::Var(var) => solution
            .value(*var)
            .ok_or_else(|| error("variable is missing from the solution")),
        Expr::UnaryOp { op, expr } => match (evaluate_expr(expr, solution)?, op) {
            (Immediate::Bool(val), Not) => Ok(Immediate::Bool(!val)),
            (Immediate::Int(0), Not) => Ok(Immediate::Bool(true)),
            (Immediate::Int(1), Not) => Ok(Immediate::Bool(false)),
            (Immediate::Int(val), Neg) => val
                .checked_neg()
                .map(Immediate::Int)
                .ok_or_else(|| error("integer overflow")),
            (Immediate::Real(val), Neg) => Ok(Immediate::Real(-val)),
            _ => Err(error("type error: invalid unary op for expression")),
        },
        Expr::BinaryOp { op, lhs, rhs } => {
            let lhs = evaluate_expr(lhs, solution)?;
            let rhs = evaluate_expr(rhs, solution)?;
            match (lhs, rhs) {
                (Immediate::Bool(lhs), Immediate::Bool(rhs)) => match op {
                    Equal => Ok(Immediate::Bool(lhs == rhs)),
                    NotEqual => Ok(Immediate::Bool(lhs != rhs)),
                    _ => Err(error("type error: invalid binary op for bools")),
                },
                (Immediate::Bool(_), _) | (_, Immediate::Bool(_)) => {
                    Err(error("type error: types of lhs and rhs don't match"))
                }
                (Immediate::Int(lhs), Immediate::Int(rhs)) => {
                    let checked = |val: Option<i64>| {
                        val.map(Immediate::Int)
                            .ok_or_else(|| error("integer overflow or division by zero"))
                    };
                    match op {
                        // Arithmetic
                        Add => checked(lhs.checked_add(rhs)),
                        Sub => checked(lhs.checked_sub(rhs)),
                        Mul => checked(lhs.checked_mul(rhs)),
                        Div => checked(lhs.checked_div_euclid(rhs)),
                        Mod => checked(lhs.checked_rem_euclid(rhs)),

                        // Comparison
                        Equal => Ok(Immediate::Bool(lhs == rhs)),
                        NotEqual => Ok(Immediate::Bool(lhs != rhs)),
                        LessThan => Ok(Immediate::Bool(lhs < rhs)),
                        LessThanOrEqual => Ok(Immediate::Bool(lhs <= rhs)),
                        GreaterThan => Ok(Immediate::Bool(lhs > rhs)),
                        GreaterThanOrEqual => Ok(Immediate::Bool(lhs >= rhs)),
                    }
                }
                (lhs, rhs) => {
                    // At least one side is real, so the other one gets promoted.
                    let (lhs, rhs) = (lhs.as_f64(), rhs.as_f64());
                    match op {
                        // Arithmetic
                        Add => Ok(Immediate::Real(lhs + rhs)),
                        Sub => Ok(Immediate::Real(lhs - rhs)),
                        Mul => Ok(Immediate::Real(lhs * rhs)),
                        Div if rhs == 0. => Err(error("division by zero")),
                        Div => Ok(Immediate::Real(lhs / rhs)),
                        Mod => Err(error("type error: modulo is only defined for ints")),

                        // Comparison
                        Equal => Ok(Immediate::Bool(approx_equal(lhs, rhs))),
                        NotEqual => Ok(Immediate::Bool(!approx_equal(lhs, rhs))),
                        LessThan => Ok(Immediate::Bool(lhs < rhs && !approx_equal(lhs, rhs))),
                        LessThanOrEqual => Ok(Immediate::Bool(lhs <= rhs || approx_equal(lhs, rhs))),
                        GreaterThan => Ok(Immediate::Bool(lhs > rhs && !approx_equal(lhs, rhs))),
                        GreaterThanOrEqual => {
                            Ok(Immediate::Bool(lhs >= rhs || approx_equal(lhs, rhs)))
                        }
                    }
                }
            }
        }
        Expr::Logical { op, args } => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                match evaluate_expr(arg, solution)? {
                    Immediate::Bool(val) => values.push(val),
                    _ => return Err(error("type error: logical operands must be bools")),
                }
            }
            Ok(Immediate::Bool(match op {
                LogicalOp::And => values.into_iter().all(|val| val),
                LogicalOp::Or => values.into_iter().any(|val| val),
            }))
        }
        Expr::Select {
            condition,
            then_expr,
            else_expr,
        } => match evaluate_expr(condition, solution)? {
            Immediate::Bool(true) => evaluate_expr(then_expr, solution),
            Immediate::Bool(false) => evaluate_expr(else_expr, solution),
            _ => Err(error("type error: select condition must be a bool")),
        },
    }
}

/// Evaluate a constraint under `solution`. Integers `0` and `1` are accepted as Booleans.
pub fn holds(constraint: &Expr, solution: &Solution) -> Result<bool, SolveError> {
    match evaluate_expr(constraint, solution)? {
        Immediate::Bool(val) => Ok(val),
        Immediate::Int(1) => Ok(true),
        Immediate::Int(0) => Ok(false),
        _ => Err(SolveError::Evaluation {
            expr: constraint.to_string(),
            msg: "constraint expression cannot evaluate to non-bool",
        }),
    }
}
