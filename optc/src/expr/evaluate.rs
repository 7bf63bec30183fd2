use super::{BinaryOp, Expr, Immediate, UnaryOp};
use crate::{
    env::Env,
    error::{ExprError, ExprErrorKind},
    span::Spanned,
    value::{Builtin, Value},
};
use opt_solve::flatopt;


/// Largest constant power a solver term may be raised to. `term ** n` expands into `n - 1`
/// products.
pub(crate) const MAX_TERM_EXPONENT: i64 = 64;

impl Expr {
    /// Evaluate this expression against `env`. Numbers are folded eagerly; as soon as the
    /// decision vector or the objective handle is involved the result is a solver term or
    /// predicate instead.
    pub(crate) fn evaluate(&self, env: &Env) -> Result<Value, ExprError> {
        let at_self = |kind| ExprError {
            kind,
            span: self.span().clone(),
        };

        match self {
            Expr::Immediate { value, .. } => Ok(match value {
                Immediate::Bool(val) => Value::Bool(*val),
                Immediate::Int(val) => Value::Int(*val),
                Immediate::Real(val) => Value::Real(*val),
            }),

            Expr::Path(name, span) => env.get(name).cloned().ok_or_else(|| ExprError {
                kind: ExprErrorKind::Unbound { name: name.clone() },
                span: span.clone(),
            }),

            Expr::UnaryOp { op, expr, .. } => {
                let operand = expr.evaluate(env)?;
                unary(*op, &operand).map_err(at_self)
            }

            Expr::BinaryOp { op, lhs, rhs, .. } => {
                let lhs = lhs.evaluate(env)?;
                let rhs = rhs.evaluate(env)?;
                binary(*op, &lhs, &rhs).map_err(at_self)
            }

            Expr::Index { expr, index, .. } => {
                let index = index.evaluate(env)?;
                // Look arrays up in place rather than copying them for every access.
                if let Expr::Path(name, span) = &**expr {
                    let base = env.get(name).ok_or_else(|| ExprError {
                        kind: ExprErrorKind::Unbound { name: name.clone() },
                        span: span.clone(),
                    })?;
                    index_into(base, &index).map_err(at_self)
                } else {
                    let base = expr.evaluate(env)?;
                    index_into(&base, &index).map_err(at_self)
                }
            }

            Expr::Call {
                name,
                name_span,
                args,
                ..
            } => {
                let at_name = |kind| ExprError {
                    kind,
                    span: name_span.clone(),
                };
                let builtin = match env.get(name) {
                    Some(Value::Builtin(builtin)) => *builtin,
                    Some(other) => {
                        return Err(at_name(ExprErrorKind::NotCallable { kind: other.kind() }))
                    }
                    None => return Err(at_name(ExprErrorKind::Unbound { name: name.clone() })),
                };
                let args = args
                    .iter()
                    .map(|arg| arg.evaluate(env))
                    .collect::<Result<Vec<_>, _>>()?;
                call(builtin, args).map_err(at_self)
            }
        }
    }
}

/// A constant operand of an arithmetic or comparison operator. Booleans count as 0 and 1.
#[derive(Clone, Copy)]
enum Number {
    Int(i64),
    Real(f64),
}

impl Number {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Int(val) => Some(Number::Int(*val)),
            Value::Real(val) => Some(Number::Real(*val)),
            Value::Bool(val) => Some(Number::Int(i64::from(*val))),
            _ => None,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Int(val) => val as f64,
            Number::Real(val) => val,
        }
    }
}

fn unary(op: UnaryOp, operand: &Value) -> Result<Value, ExprErrorKind> {
    match (op, Number::of(operand), operand) {
        (UnaryOp::Pos, Some(Number::Int(val)), _) => Ok(Value::Int(val)),
        (UnaryOp::Pos, Some(Number::Real(val)), _) => Ok(Value::Real(val)),
        (UnaryOp::Pos, None, Value::Term(_)) => Ok(operand.clone()),

        (UnaryOp::Neg, Some(Number::Int(val)), _) => {
            val.checked_neg().map(Value::Int).ok_or(ExprErrorKind::Overflow)
        }
        (UnaryOp::Neg, Some(Number::Real(val)), _) => Ok(Value::Real(-val)),
        (UnaryOp::Neg, None, Value::Term(expr)) => Ok(Value::Term(flatopt::Expr::unary(
            flatopt::UnaryOp::Neg,
            expr.clone(),
        ))),

        _ => Err(ExprErrorKind::UnaryTypeMismatch {
            op: op.as_str(),
            operand: operand.kind(),
        }),
    }
}

/// Python's floor division.
fn floor_div(lhs: i64, rhs: i64) -> Option<i64> {
    let quotient = lhs.checked_div(rhs)?;
    if lhs % rhs != 0 && ((lhs < 0) != (rhs < 0)) {
        quotient.checked_sub(1)
    } else {
        Some(quotient)
    }
}

fn fold(op: BinaryOp, lhs: Number, rhs: Number) -> Result<Value, ExprErrorKind> {
    use BinaryOp::*;

    if let (Number::Int(lhs), Number::Int(rhs)) = (lhs, rhs) {
        let overflow = ExprErrorKind::Overflow;
        return match op {
            Add => lhs.checked_add(rhs).map(Value::Int).ok_or(overflow),
            Sub => lhs.checked_sub(rhs).map(Value::Int).ok_or(overflow),
            Mul => lhs.checked_mul(rhs).map(Value::Int).ok_or(overflow),
            Div | FloorDiv | Mod if rhs == 0 => Err(ExprErrorKind::DivisionByZero),
            Div => Ok(Value::Real(lhs as f64 / rhs as f64)),
            FloorDiv => floor_div(lhs, rhs).map(Value::Int).ok_or(overflow),
            Mod => floor_div(lhs, rhs)
                .and_then(|quotient| lhs.checked_sub(quotient.checked_mul(rhs)?))
                .map(Value::Int)
                .ok_or(overflow),
            Pow if rhs >= 0 => u32::try_from(rhs)
                .ok()
                .and_then(|exp| lhs.checked_pow(exp))
                .map(Value::Int)
                .ok_or(overflow),
            Pow if lhs == 0 => Err(ExprErrorKind::DivisionByZero),
            Pow => Ok(Value::Real((lhs as f64).powf(rhs as f64))),
            Equal => Ok(Value::Bool(lhs == rhs)),
            NotEqual => Ok(Value::Bool(lhs != rhs)),
            LessThanOrEqual => Ok(Value::Bool(lhs <= rhs)),
            LessThan => Ok(Value::Bool(lhs < rhs)),
            GreaterThanOrEqual => Ok(Value::Bool(lhs >= rhs)),
            GreaterThan => Ok(Value::Bool(lhs > rhs)),
        };
    }

    let (lhs, rhs) = (lhs.as_f64(), rhs.as_f64());
    let result = match op {
        Add => lhs + rhs,
        Sub => lhs - rhs,
        Mul => lhs * rhs,
        Div | FloorDiv | Mod if rhs == 0. => return Err(ExprErrorKind::DivisionByZero),
        Div => lhs / rhs,
        FloorDiv => (lhs / rhs).floor(),
        Mod => lhs - rhs * (lhs / rhs).floor(),
        Pow => lhs.powf(rhs),
        Equal => return Ok(Value::Bool(lhs == rhs)),
        NotEqual => return Ok(Value::Bool(lhs != rhs)),
        LessThanOrEqual => return Ok(Value::Bool(lhs <= rhs)),
        LessThan => return Ok(Value::Bool(lhs < rhs)),
        GreaterThanOrEqual => return Ok(Value::Bool(lhs >= rhs)),
        GreaterThan => return Ok(Value::Bool(lhs > rhs)),
    };
    if result.is_finite() {
        Ok(Value::Real(result))
    } else {
        Err(ExprErrorKind::Overflow)
    }
}

fn flat_op(op: BinaryOp) -> flatopt::BinaryOp {
    match op {
        BinaryOp::Add => flatopt::BinaryOp::Add,
        BinaryOp::Sub => flatopt::BinaryOp::Sub,
        BinaryOp::Mul | BinaryOp::Pow => flatopt::BinaryOp::Mul,
        BinaryOp::Div | BinaryOp::FloorDiv => flatopt::BinaryOp::Div,
        BinaryOp::Mod => flatopt::BinaryOp::Mod,
        BinaryOp::Equal => flatopt::BinaryOp::Equal,
        BinaryOp::NotEqual => flatopt::BinaryOp::NotEqual,
        BinaryOp::LessThanOrEqual => flatopt::BinaryOp::LessThanOrEqual,
        BinaryOp::LessThan => flatopt::BinaryOp::LessThan,
        BinaryOp::GreaterThanOrEqual => flatopt::BinaryOp::GreaterThanOrEqual,
        BinaryOp::GreaterThan => flatopt::BinaryOp::GreaterThan,
    }
}

/// Apply a binary operator to two evaluated operands.
pub(crate) fn binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, ExprErrorKind> {
    if let (Some(lhs), Some(rhs)) = (Number::of(lhs), Number::of(rhs)) {
        return fold(op, lhs, rhs);
    }

    let mismatch = || ExprErrorKind::BinaryTypeMismatch {
        op: op.as_str(),
        lhs: lhs.kind(),
        rhs: rhs.kind(),
    };
    let (Some(lhs_term), Some(rhs_term)) = (lhs.to_term(), rhs.to_term()) else {
        return Err(mismatch());
    };

    if op.is_comparison() {
        return Ok(Value::Predicate(flatopt::Expr::binary(
            flat_op(op),
            lhs_term,
            rhs_term,
        )));
    }

    if op == BinaryOp::Pow {
        // Only `term ** n` for a constant `n >= 0`, expanded into repeated products.
        return match (lhs, rhs) {
            (Value::Term(_), Value::Int(0)) => Ok(Value::Int(1)),
            (Value::Term(_), Value::Int(exp)) if *exp > MAX_TERM_EXPONENT => {
                Err(ExprErrorKind::ExponentTooLarge {
                    exp: *exp,
                    max: MAX_TERM_EXPONENT,
                })
            }
            (Value::Term(_), Value::Int(exp)) if *exp > 0 => Ok(Value::Term(
                (1..*exp).fold(lhs_term.clone(), |acc, _| {
                    flatopt::Expr::binary(flatopt::BinaryOp::Mul, acc, lhs_term.clone())
                }),
            )),
            _ => Err(ExprErrorKind::UnsupportedPower),
        };
    }

    Ok(Value::Term(flatopt::Expr::binary(
        flat_op(op),
        lhs_term,
        rhs_term,
    )))
}

fn index_into(base: &Value, index: &Value) -> Result<Value, ExprErrorKind> {
    let len = match base {
        Value::Array(elements) => elements.len(),
        Value::Decision { len } => *len,
        _ => return Err(ExprErrorKind::NotIndexable { kind: base.kind() }),
    };
    let Value::Int(index) = *index else {
        return Err(ExprErrorKind::NonIntegerIndex { kind: index.kind() });
    };

    // Negative indices count from the end.
    let position = if index < 0 {
        i64::try_from(len).ok().and_then(|len| len.checked_add(index))
    } else {
        Some(index)
    }
    .and_then(|position| usize::try_from(position).ok())
    .filter(|position| *position < len)
    .ok_or(ExprErrorKind::IndexOutOfBounds { index, len })?;

    Ok(match base {
        Value::Array(elements) => elements[position].clone(),
        _ => Value::Term(flatopt::Expr::Var(flatopt::Var::Decision(position))),
    })
}

fn call(builtin: Builtin, args: Vec<Value>) -> Result<Value, ExprErrorKind> {
    let name = builtin.name();
    match builtin {
        Builtin::And | Builtin::Or => {
            // `And` is decided by any `False`, `Or` by any `True`. The neutral constants are
            // dropped.
            let deciding = builtin == Builtin::Or;
            let mut operands = Vec::with_capacity(args.len());
            for arg in args {
                match arg {
                    Value::Bool(val) if val == deciding => return Ok(Value::Bool(deciding)),
                    Value::Bool(_) => {}
                    Value::Predicate(expr) => operands.push(expr),
                    other => {
                        return Err(ExprErrorKind::NonBooleanArgument {
                            name,
                            kind: other.kind(),
                        })
                    }
                }
            }
            if operands.is_empty() {
                return Ok(Value::Bool(!deciding));
            }
            let op = if builtin == Builtin::And {
                flatopt::LogicalOp::And
            } else {
                flatopt::LogicalOp::Or
            };
            Ok(Value::Predicate(flatopt::Expr::logical(op, operands)))
        }

        Builtin::If => {
            let [condition, then_value, else_value] = match <[Value; 3]>::try_from(args) {
                Ok(args) => args,
                Err(args) => {
                    return Err(ExprErrorKind::Arity {
                        name,
                        expected: 3,
                        found: args.len(),
                    })
                }
            };
            let condition = match condition {
                Value::Bool(true) => return Ok(then_value),
                Value::Bool(false) => return Ok(else_value),
                Value::Predicate(condition) => condition,
                other => {
                    return Err(ExprErrorKind::NonBooleanArgument {
                        name,
                        kind: other.kind(),
                    })
                }
            };

            if let (Some(then_expr), Some(else_expr)) = (then_value.to_term(), else_value.to_term())
            {
                Ok(Value::Term(flatopt::Expr::select(condition, then_expr, else_expr)))
            } else if let (Some(then_expr), Some(else_expr)) =
                (then_value.to_predicate(), else_value.to_predicate())
            {
                Ok(Value::Predicate(flatopt::Expr::select(
                    condition, then_expr, else_expr,
                )))
            } else {
                Err(ExprErrorKind::BinaryTypeMismatch {
                    op: name,
                    lhs: then_value.kind(),
                    rhs: else_value.kind(),
                })
            }
        }
    }
}
