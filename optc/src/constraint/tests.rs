use super::*;
use crate::{
    env::Env,
    value::{Builtin, Value},
};

#[cfg(test)]
fn check(actual: &str, expect: expect_test::Expect) {
    expect.assert_eq(actual);
}

fn env() -> Env {
    let mut env = Env::new();
    env.bind("x", Value::Decision { len: 3 }).unwrap();
    env.bind("y", Value::objective()).unwrap();
    for builtin in Builtin::ALL {
        env.bind(builtin.name(), Value::Builtin(builtin)).unwrap();
    }
    env.bind("n", Value::Int(3)).unwrap();
    env
}

fn term(src: &str) -> Term {
    Term::parse(src).unwrap()
}

fn compare(comparator: &str, rval: &str) -> Option<Comparison> {
    Some(Comparison {
        comparator: comparator.parse().unwrap(),
        rval: term(rval),
    })
}

fn range(low: i64, high: &str) -> IndexRange {
    IndexRange {
        low: Bound::Literal(low),
        high: match high.parse() {
            Ok(high) => Bound::Literal(high),
            Err(_) => Bound::Expr(high.to_string()),
        },
    }
}

fn constraint(node: ConstraintNode) -> Constraint {
    Constraint { node, index: None }
}

fn single(src: &str, comparison: Option<Comparison>) -> Constraint {
    constraint(ConstraintNode::Single {
        term: term(src),
        comparison,
    })
}

fn repeat(low: i64, high: &str, loop_var: &str, src: &str) -> Constraint {
    constraint(ConstraintNode::Loop {
        range: range(low, high),
        loop_var: loop_var.to_string(),
        body: LoopBody::Term {
            term: term(src),
            comparison: None,
        },
    })
}

fn repeat_nested(low: i64, high: &str, loop_var: &str, nested: Vec<Constraint>) -> Constraint {
    constraint(ConstraintNode::Loop {
        range: range(low, high),
        loop_var: loop_var.to_string(),
        body: LoopBody::Nested(nested),
    })
}

fn aggregation(low: i64, high: &str, src: &str, comparison: Option<Comparison>) -> Aggregation {
    Aggregation {
        range: range(low, high),
        loop_var: "i".to_string(),
        term: term(src),
        comparison,
    }
}

/// Compile `constraints` in order, returning the staged predicates and statistics.
#[cfg(test)]
fn run_compiler(
    constraints: &[Constraint],
    env: &mut Env,
) -> Result<(String, CompileStats), Error> {
    let mut compiler = Compiler::new(env, true);
    for constraint in constraints {
        compiler.compile(constraint)?;
    }
    let (predicates, stats) = compiler.finish();
    let predicates = predicates
        .iter()
        .map(|predicate| predicate.to_string())
        .collect::<Vec<_>>()
        .join("\n");
    Ok((predicates, stats))
}

fn stats(unit_count: usize, constraint_count: usize) -> CompileStats {
    CompileStats {
        unit_count,
        constraint_count,
    }
}

#[test]
fn singles() {
    let (predicates, stats_) = run_compiler(
        &[
            single("x[0] + x[1]", compare("<=", "n * 2")),
            single("y", compare("=", "x[2]")),
            single("x[0] != x[1]", None),
            single("n", compare(">", "2")),
        ],
        &mut env(),
    )
    .unwrap();
    check(
        &predicates,
        expect_test::expect![[r#"
            ((x[0] + x[1]) <= 6)
            (y == x[2])
            (x[0] != x[1])
            true"#]],
    );
    assert_eq!(stats_, stats(4, 4));
}

#[test]
fn loops() {
    let (predicates, stats_) =
        run_compiler(&[repeat(0, "n-1", "i", "x[i] == i + 1")], &mut env()).unwrap();
    check(
        &predicates,
        expect_test::expect![[r#"
            (x[0] == 1)
            (x[1] == 2)
            (x[2] == 3)"#]],
    );
    assert_eq!(stats_, stats(3, 3));

    // An empty range produces nothing.
    let (predicates, stats_) =
        run_compiler(&[repeat(3, "2", "i", "x[i] == 0")], &mut env()).unwrap();
    assert!(predicates.is_empty());
    assert_eq!(stats_, stats(0, 0));

    // Loop bodies may be lists of constraints, evaluated once per iteration.
    let (predicates, stats_) = run_compiler(
        &[repeat_nested(
            1,
            "2",
            "i",
            vec![
                single("x[i - 1]", compare("<=", "x[i]")),
                repeat(0, "i - 1", "j", "x[j] >= j"),
            ],
        )],
        &mut env(),
    )
    .unwrap();
    check(
        &predicates,
        expect_test::expect![[r#"
            (x[0] <= x[1])
            (x[0] >= 0)
            (x[1] <= x[2])
            (x[0] >= 0)
            (x[1] >= 1)"#]],
    );
    assert_eq!(stats_, stats(5, 5));
}

#[test]
fn loop_scopes() {
    let mut env = env();

    // Sibling loops may reuse the same name.
    let siblings = [
        repeat(0, "1", "i", "x[i] >= 0"),
        repeat(0, "1", "i", "x[i] <= 9"),
    ];
    assert_eq!(run_compiler(&siblings, &mut env).unwrap().1, stats(4, 4));
    assert!(!env.contains("i"));

    // Nested loops may not.
    let nested = [repeat_nested(
        0,
        "1",
        "i",
        vec![repeat(0, "1", "i", "x[i] >= 0")],
    )];
    assert!(matches!(
        run_compiler(&nested, &mut env),
        Err(Error::DuplicateBinding { name }) if name == "i"
    ));
    assert!(!env.contains("i"));

    // Neither may inputs be shadowed, even by an empty loop.
    assert!(matches!(
        run_compiler(&[repeat(1, "0", "n", "x[0] >= 0")], &mut env),
        Err(Error::DuplicateBinding { name }) if name == "n"
    ));
    assert_eq!(env.get("n"), Some(&Value::Int(3)));

    // The loop variable is released when the body fails.
    assert!(matches!(
        run_compiler(&[repeat(0, "5", "i", "x[i] >= 0")], &mut env),
        Err(Error::Expression { .. })
    ));
    assert!(!env.contains("i"));
}

#[test]
fn aggregations() {
    let (predicates, stats_) = run_compiler(
        &[
            constraint(ConstraintNode::Sum(aggregation(
                0,
                "2",
                "x[i]",
                compare("<=", "10"),
            ))),
            constraint(ConstraintNode::Product(aggregation(
                1,
                "2",
                "x[i] + i",
                compare(">=", "y"),
            ))),
        ],
        &mut env(),
    )
    .unwrap();
    check(
        &predicates,
        expect_test::expect![[r#"
            (((x[0] + x[1]) + x[2]) <= 10)
            (((x[1] + 1) * (x[2] + 2)) >= y)"#]],
    );
    assert_eq!(stats_, stats(5, 2));
}

#[test]
fn constant_aggregations() {
    let mut env = env();
    env.bind("k", Value::Int(3)).unwrap();

    // The sum of `k` over `n` indices is `k * n`, the product `k ** n`.
    let cases = [
        ConstraintNode::Sum(aggregation(1, "4", "k", compare("==", "k * 4"))),
        ConstraintNode::Product(aggregation(1, "4", "k", compare("==", "k ** 4"))),
        ConstraintNode::Sum(aggregation(1, "0", "k", compare("==", "0"))),
        ConstraintNode::Product(aggregation(1, "0", "k", compare("==", "1"))),
        ConstraintNode::Sum(aggregation(1, "4", "i * k", compare("==", "30"))),
    ]
    .map(constraint);
    let (predicates, stats_) = run_compiler(&cases, &mut env).unwrap();
    check(
        &predicates,
        expect_test::expect![[r#"
            true
            true
            true
            true
            true"#]],
    );
    assert_eq!(stats_, stats(12, 5));
}

#[test]
fn logical() {
    let (predicates, stats_) = run_compiler(
        &[
            constraint(ConstraintNode::Or(vec![single("x[0]", compare(">", "1"))])),
            constraint(ConstraintNode::Or(vec![
                single("x[0]", compare("<", "1")),
                repeat(1, "2", "i", "x[i] == 0"),
            ])),
            repeat_nested(
                0,
                "1",
                "i",
                vec![constraint(ConstraintNode::And(vec![
                    single("x[i]", compare(">=", "0")),
                    single("x[i]", compare("<=", "5")),
                ]))],
            ),
        ],
        &mut env(),
    )
    .unwrap();
    check(
        &predicates,
        expect_test::expect![[r#"
            (x[0] > 1)
            Or((x[0] < 1), (x[1] == 0), (x[2] == 0))
            And((x[0] >= 0), (x[0] <= 5))
            And((x[1] >= 0), (x[1] <= 5))"#]],
    );
    assert_eq!(stats_, stats(8, 4));
}

#[test]
fn errors() {
    let mut env = env();
    let failure = |constraint: Constraint, env: &mut Env| {
        run_compiler(&[constraint], env).unwrap_err().to_string()
    };

    check(
        &failure(single("x[0] + 1", None), &mut env),
        expect_test::expect!["in `x[0] + 1`: constraint must evaluate to a Boolean, found a solver term"],
    );
    check(
        &failure(
            constraint(ConstraintNode::Sum(aggregation(0, "2", "x[i] > 0", None))),
            &mut env,
        ),
        expect_test::expect!["in `x[i] > 0`: aggregated term must be numeric, found a solver predicate"],
    );
    check(
        &failure(
            constraint(ConstraintNode::Sum(aggregation(0, "2", "x[i]", None))),
            &mut env,
        ),
        expect_test::expect!["in `x[i]`: constraint must evaluate to a Boolean, found a solver term"],
    );
    check(
        &failure(repeat(0, "m", "i", "x[i] > 0"), &mut env),
        expect_test::expect!["cannot resolve `m` to an integer"],
    );
    check(
        &failure(single("x[0]", compare("<", "z")), &mut env),
        expect_test::expect!["in `z`: cannot find value `z` in this scope"],
    );

    // Without arithmetic bounds only names and literals are accepted.
    let mut compiler = Compiler::new(&mut env, false);
    assert!(matches!(
        compiler.compile(&repeat(0, "n-1", "i", "x[i] > 0")),
        Err(Error::UnresolvedBound { bound }) if bound == "n-1"
    ));
    assert!(compiler.compile(&repeat(0, "n", "i", "x[0] > i")).is_ok());

    assert!(matches!(
        "=>".parse::<Comparator>(),
        Err(Error::IllegalOperator { op }) if op == "=>"
    ));
    assert!(matches!(
        "xor".parse::<ConstraintKind>(),
        Err(Error::IllegalConstraintType { kind }) if kind == "xor"
    ));
}

#[test]
fn display() {
    let tree = [
        single("x[0] + x[1]", compare("<=", "10")),
        repeat_nested(
            0,
            "n-1",
            "i",
            vec![
                single("x[i]", compare(">=", "0")),
                constraint(ConstraintNode::Or(vec![
                    single("x[i] == 1", None),
                    repeat(0, "1", "j", "x[j] > i"),
                ])),
            ],
        ),
        constraint(ConstraintNode::Product(aggregation(1, "2", "x[i]", compare("=", "y")))),
    ];
    check(
        &tree.iter().map(|constraint| constraint.to_string()).collect::<String>(),
        expect_test::expect![[r#"
            This is a constraint of type single:
            	x[0] + x[1] <= 10
            This is a constraint of type loop:
            	For value i in range [0,n-1]: the following constraints holds:
            	This is a constraint of type single:
            		x[i] >= 0
            	This is a constraint of type or:
            		the logical or of the following constraints holds:
            		This is a constraint of type single:
            			x[i] == 1
            		This is a constraint of type loop:
            			For value j in range [0,1]: x[j] > i
            This is a constraint of type product:
            	product([x[i] for i in [1,2]]) = y
        "#]],
    );
}
