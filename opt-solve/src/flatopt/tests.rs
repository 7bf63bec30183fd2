use super::{
    evaluate::{evaluate_expr, holds},
    BinaryOp, Expr, Immediate, LogicalOp, UnaryOp, Var,
};
use crate::Solution;

#[cfg(test)]
fn check(actual: &str, expect: expect_test::Expect) {
    expect.assert_eq(actual);
}

fn x(idx: usize) -> Expr {
    Expr::Var(Var::Decision(idx))
}

fn solution(decision: &[i64], objective: i64) -> Solution {
    Solution {
        decision: decision.iter().copied().map(Immediate::Int).collect(),
        objective: Immediate::Int(objective),
    }
}

#[test]
fn display() {
    let sum = Expr::binary(
        BinaryOp::Add,
        Expr::binary(BinaryOp::Add, x(0), x(1)),
        Expr::int(2),
    );
    let expr = Expr::logical(
        LogicalOp::Or,
        vec![
            Expr::binary(BinaryOp::LessThanOrEqual, sum, Expr::Var(Var::Objective)),
            Expr::unary(UnaryOp::Not, Expr::binary(BinaryOp::Equal, x(2), Expr::int(0))),
            Expr::select(Expr::bool(true), x(0), Expr::Immediate(Immediate::Real(1.5))),
        ],
    );
    check(
        &expr.to_string(),
        expect_test::expect!["Or((((x[0] + x[1]) + 2) <= y), !(x[2] == 0), If(true, x[0], 1.5))"],
    );
}

#[test]
fn single_argument_logical_is_unwrapped() {
    let pred = Expr::binary(BinaryOp::GreaterThan, x(0), Expr::int(1));
    assert_eq!(Expr::logical(LogicalOp::And, vec![pred.clone()]), pred);
    assert!(matches!(
        Expr::logical(LogicalOp::And, vec![pred.clone(), pred]),
        Expr::Logical { .. }
    ));
}

#[test]
fn evaluate_arithmetic() {
    let sol = solution(&[7, -3], 0);
    let eval = |expr: Expr| evaluate_expr(&expr, &sol).unwrap();

    assert_eq!(eval(Expr::binary(BinaryOp::Div, x(0), Expr::int(2))), Immediate::Int(3));
    assert_eq!(eval(Expr::binary(BinaryOp::Div, x(1), Expr::int(2))), Immediate::Int(-2));
    assert_eq!(eval(Expr::binary(BinaryOp::Mod, x(1), Expr::int(2))), Immediate::Int(1));
    assert_eq!(
        eval(Expr::binary(
            BinaryOp::Mul,
            x(0),
            Expr::Immediate(Immediate::Real(0.5))
        )),
        Immediate::Real(3.5)
    );
    assert_eq!(eval(Expr::unary(UnaryOp::Neg, x(1))), Immediate::Int(3));
    assert!(evaluate_expr(&Expr::binary(BinaryOp::Div, x(0), Expr::int(0)), &sol).is_err());
}

#[test]
fn evaluate_logic() {
    let sol = solution(&[1, 2], 5);
    let lt = Expr::binary(BinaryOp::LessThan, x(0), x(1));
    let gt = Expr::binary(BinaryOp::GreaterThan, x(0), x(1));

    assert!(holds(&Expr::logical(LogicalOp::Or, vec![lt.clone(), gt.clone()]), &sol).unwrap());
    assert!(!holds(&Expr::logical(LogicalOp::And, vec![lt.clone(), gt.clone()]), &sol).unwrap());
    assert!(holds(&Expr::Logical { op: LogicalOp::And, args: vec![] }, &sol).unwrap());
    assert!(!holds(&Expr::Logical { op: LogicalOp::Or, args: vec![] }, &sol).unwrap());

    let select = Expr::select(gt, Expr::int(10), Expr::Var(Var::Objective));
    assert_eq!(evaluate_expr(&select, &sol).unwrap(), Immediate::Int(5));

    // Arithmetic is not a constraint.
    assert!(holds(&Expr::binary(BinaryOp::Add, x(0), x(1)), &sol).is_err());
}
