use super::{input::prompt, *};
use crate::{error::Error, value::Value};
use opt_solve::{flatopt::Immediate, Search, SearchConfig, SolveError};

#[cfg(test)]
fn check(actual: &str, expect: expect_test::Expect) {
    expect.assert_eq(actual);
}

fn load(src: &str) -> Problem {
    Problem::from_str(src, Capabilities::default()).unwrap()
}

fn load_err(src: &str, capabilities: Capabilities) -> String {
    Problem::from_str(src, capabilities).unwrap_err().to_string()
}

fn search(lower: i64, upper: i64) -> Search {
    Search::new(SearchConfig {
        lower,
        upper,
        ..Default::default()
    })
}

const SUM_AT_MOST_TEN: &str = r#"{
    "language": "en",
    "text": "Maximize the total of three numbers that add up to at most 10.",
    "objective": { "goal": "max", "index": [1, 8] },
    "variable": { "length": 3 },
    "constraint": { "type": "sum", "term": "x[i]", "comp": "<=", "rval": 10, "loopvar": "i" }
}"#;

const DEFAULTS: &str = r#"{
    "text": "最大化",
    "objective": { "index": [1, 2] },
    "variable": { "length": "n" },
    "input": [
        { "name": "n" },
        { "name": "w", "type": "realarray", "length": "n", "comment": "the weights" }
    ],
    "constraint": [
        { "type": "loop", "term": [{ "type": "loop", "term": "x[i_1] >= x[i_2]" }] },
        {
            "type": "or",
            "term": [
                { "type": "sum", "term": "x[i_2]", "comp": "<=", "rval": 10 },
                { "term": "x[0] == 0" }
            ]
        }
    ],
    "parameter": { "name": "cap", "range": [0, 20], "value": 10, "index": [3, 3] }
}"#;

#[test]
fn defaults() {
    let problem = load(DEFAULTS);
    assert_eq!(problem.language, "zh");
    assert_eq!(problem.objective.goal, Goal::Max);
    assert_eq!(problem.objective.ty, NumberType::Int);
    assert_eq!(problem.variable.count, Bound::Expr("n".to_string()));
    assert_eq!(problem.inputs[0].ty, InputType::Int);

    // Loops range up to the variable count, loops nested in loops up to the enclosing loop
    // variable. Nodes nested in `and` and `or` keep the bound of their parent.
    check(
        &problem.to_string(),
        expect_test::expect![[r#"
            This problem is to maximize an objective of type int.
            This problem has n variables of type int.
            This problem has 2 constraints:
            Constraint 1:
            This is a constraint of type loop:
            	For value i_1 in range [0,n-1]: the following constraints holds:
            	This is a constraint of type loop:
            		For value i_2 in range [0,i_1-1]: x[i_1] >= x[i_2]
            Constraint 2:
            This is a constraint of type or:
            	the logical or of the following constraints holds:
            	This is a constraint of type sum:
            		sum([x[i_2] for i_2 in [0,n-1]]) <= 10
            	This is a constraint of type single:
            		x[0] == 0
            This problem has 2 inputs:
            Input 1:
            	Name: n
            	Type: int
            Input 2:
            	Name: w
            	Type: realarray
            	Length: n
            This problem has 1 parameters:
            Parameter 1:
            	Name: cap
            	Type: int
            	Default value: 10
            	Bound: [0, 20]
        "#]],
    );
}

#[test]
fn load_errors() {
    let all = Capabilities::default();
    check(
        &load_err(r#"{ "objective": {}, "variable": { "length": 1 } }"#, all),
        expect_test::expect!["missing `text` in the problem"],
    );
    check(
        &load_err(r#"{ "text": "abc", "objective": { "index": [1, 1] } }"#, all),
        expect_test::expect!["missing `variable` in the problem"],
    );
    check(
        &load_err(
            r#"{ "text": "abc", "objective": { "goal": "best", "index": [1, 1] }, "variable": { "length": 1 } }"#,
            all,
        ),
        expect_test::expect!["illegal goal `best`: expected `exist`, `min` or `max`"],
    );
    check(
        &load_err(
            r#"{ "text": "abc", "objective": { "index": [2, 9] }, "variable": { "length": 1 } }"#,
            all,
        ),
        expect_test::expect!["text span [2, 9] of objective lies outside the problem text of 3 characters"],
    );
    check(
        &load_err(
            r#"{ "text": "abc", "objective": { "index": [1, 1] }, "variable": { "length": 1 },
                 "input": [{ "name": "y" }] }"#,
            all,
        ),
        expect_test::expect!["illegal name: `y` is reserved"],
    );
    check(
        &load_err(
            r#"{ "text": "abc", "objective": { "index": [1, 1] }, "variable": { "length": 1 },
                 "input": [{ "name": "w", "type": "intarray" }] }"#,
            all,
        ),
        expect_test::expect!["missing `length` in input `w`"],
    );
    check(
        &load_err(
            r#"{ "text": "abc", "objective": { "index": [1, 1] }, "variable": { "length": 1 },
                 "parameter": { "name": "p", "range": [0, 5], "value": 9, "index": [1, 1] } }"#,
            all,
        ),
        expect_test::expect!["value 9 of parameter `p` lies outside its range [0, 5]"],
    );
    check(
        &load_err(
            r#"{ "text": "abc", "objective": { "index": [1, 1] }, "variable": { "length": 1 },
                 "constraint": { "term": "x[0]", "comp": "=>", "rval": 1 } }"#,
            all,
        ),
        expect_test::expect!["illegal comparison operator `=>`"],
    );
    check(
        &load_err(
            r#"{ "text": "abc", "objective": { "index": [1, 1] }, "variable": { "length": 1 },
                 "constraint": { "type": "and", "term": [] } }"#,
            all,
        ),
        expect_test::expect!["`and` constraint needs at least one nested constraint"],
    );
    check(
        &load_err(
            r#"{ "text": "abc", "objective": { "index": [1, 1] }, "variable": { "length": 1 },
                 "constraint": { "type": "single", "term": [{ "term": "x[0] > 0" }] } }"#,
            all,
        ),
        expect_test::expect!["the term of `single` constraint must be an expression"],
    );
    check(
        &load_err(
            r#"{ "text": "abc", "objective": { "index": [1, 1] },
                 "variable": { "length": -9223372036854775808 },
                 "constraint": { "type": "sum", "term": "x[i]", "comp": "<=", "rval": 1 } }"#,
            all,
        ),
        expect_test::expect!["variable length must not be negative, found -9223372036854775808"],
    );
    assert!(matches!(
        Problem::from_str("{ \"text\": ", all),
        Err(Error::Json(_))
    ));

    // An unknown field is only warned about.
    let problem = load(
        r#"{ "text": "abc", "objective": { "index": [1, 1] }, "variable": { "length": 1 },
             "author": "someone" }"#,
    );
    assert!(problem.constraints.is_empty());
}

#[test]
fn capabilities() {
    let basic = Capabilities::basic();
    check(
        &load_err(
            r#"{ "text": "abc", "objective": { "goal": "exist", "index": [1, 1] }, "variable": { "length": 1 } }"#,
            basic,
        ),
        expect_test::expect!["the `exist` goal is not supported"],
    );
    check(
        &load_err(DEFAULTS, basic),
        expect_test::expect!["illegal constraint type `or`"],
    );
    check(
        &load_err(
            r#"{ "text": "abc", "objective": { "index": [1, 1] }, "variable": { "length": 1 },
                 "parameter": { "name": "p", "range": [0, 5], "value": 1, "index": [1, 1] } }"#,
            basic,
        ),
        expect_test::expect!["parameters are not supported"],
    );

    // Without logical combinators their functions are not bound either.
    let problem = Problem::from_str(
        r#"{ "text": "abc", "objective": { "index": [1, 1] }, "variable": { "length": 2 },
             "constraint": { "term": "Or(x[0] > 1, x[1] > 1)" } }"#,
        basic,
    )
    .unwrap();
    let err = problem
        .solve(&mut LineSource::default(), &mut search(0, 2), SolveOptions::default())
        .unwrap_err();
    check(
        &err.to_string(),
        expect_test::expect!["in `Or(x[0] > 1, x[1] > 1)`: cannot find value `Or` in this scope"],
    );

    // Nor are arithmetic lengths.
    let problem = Problem::from_str(
        r#"{ "text": "abc", "objective": { "index": [1, 1] }, "variable": { "length": "n + 1" },
             "input": [{ "name": "n" }] }"#,
        basic,
    )
    .unwrap();
    assert!(matches!(
        problem.solve(&mut LineSource::new("2"), &mut search(0, 2), SolveOptions::default()),
        Err(Error::UnresolvedBound { bound }) if bound == "n + 1"
    ));
}

#[test]
fn round_trip() {
    let src = r#"{
        "language": "en",
        "text": "Minimize the cost of 4 items.",
        "objective": { "goal": "min", "type": "int", "index": [1, 8] },
        "variable": { "length": 4, "type": "int" },
        "constraint": [
            { "type": "loop", "term": [{ "term": "x[i] >= 1", "index": [22, 22] }], "loopvar": "i" }
        ],
        "parameter": [{ "name": "items", "range": [1, 9], "value": 4, "index": [22, 22] }],
        "source": "unknown fields survive"
    }"#;
    let problem = load(src);
    let document: serde_json::Value = serde_json::from_str(src).unwrap();
    assert_eq!(problem.to_json(), document);
}

#[test]
fn solving() {
    let problem = load(SUM_AT_MOST_TEN);
    let mut backend = search(-10, 10);
    let outcome = problem
        .solve(&mut LineSource::default(), &mut backend, SolveOptions::default())
        .unwrap();

    // `y` is not tied to anything, so it can grow without limit.
    assert_eq!(outcome.result, SolveResult::Unbounded);
    assert!(outcome.model.is_none());
    assert_eq!(outcome.statistics.constraint_count, 1);
    assert_eq!(outcome.statistics.unit_count, 3);
    assert!(outcome.statistics.solve_time.is_some());
    check(
        &backend.constraints()[0].to_string(),
        expect_test::expect!["(((x[0] + x[1]) + x[2]) <= 10)"],
    );

    // Tie the objective to the total.
    let problem = load(
        r#"{
            "text": "最大化三个数之和",
            "objective": { "index": [1, 2] },
            "variable": { "length": 3 },
            "constraint": [
                { "type": "sum", "term": "x[i]", "comp": "<=", "rval": "cap", "loopvar": "i" },
                { "type": "sum", "term": "x[i]", "comp": "=", "rval": "y", "loopvar": "i" }
            ],
            "parameter": { "name": "cap", "range": [0, 20], "value": 10, "index": [3, 3] }
        }"#,
    );
    let mut backend = search(0, 10);
    let outcome = problem
        .solve(&mut LineSource::default(), &mut backend, SolveOptions::default())
        .unwrap();
    assert_eq!(outcome.result, SolveResult::Optimum(Immediate::Int(10)));
    let model = outcome.model.unwrap();
    assert_eq!(model.objective, Immediate::Int(10));
    assert!(backend.verify(&model));

    // An optimum beyond the end of the domain is not reported as the edge of the domain.
    let problem = load(
        r#"{ "text": "abc", "objective": { "goal": "max", "index": [1, 1] },
             "variable": { "length": 1 }, "constraint": { "term": "y <= 100" } }"#,
    );
    let err = problem
        .solve(&mut LineSource::default(), &mut search(-10, 10), SolveOptions::default())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Solve(SolveError::OptimumOutsideDomain {
            value: Immediate::Int(10),
            ..
        })
    ));
    check(
        &err.to_string(),
        expect_test::expect![
            "no optimum within the search domain -10..=10: the objective improves beyond 10"
        ],
    );

    // A wider domain finds it.
    let outcome = problem
        .solve(&mut LineSource::default(), &mut search(0, 200), SolveOptions::default())
        .unwrap();
    assert_eq!(outcome.result, SolveResult::Optimum(Immediate::Int(100)));
}

#[test]
fn satisfiability() {
    let exist = |constraint: &str| {
        load(&format!(
            r#"{{ "text": "abc", "objective": {{ "goal": "exist", "index": [1, 1] }},
                  "variable": {{ "length": 2 }}, "constraint": {constraint} }}"#
        ))
    };

    let mut backend = search(-10, 10);
    let outcome = exist(r#"{ "term": "x[0] + x[1]", "comp": "==", "rval": 7 }"#)
        .solve(&mut LineSource::default(), &mut backend, SolveOptions::default())
        .unwrap();
    assert_eq!(outcome.result, SolveResult::Satisfiable);
    assert!(backend.verify(outcome.model.as_ref().unwrap()));

    let outcome = exist(r#"{ "term": "x[0] > x[0]" }"#)
        .solve(&mut LineSource::default(), &mut search(-10, 10), SolveOptions::default())
        .unwrap();
    assert_eq!(outcome.result, SolveResult::Unsatisfiable);
    assert!(outcome.model.is_none());
}

#[test]
fn compile_only() {
    let problem = load(DEFAULTS);
    let mut backend = search(0, 1);
    let outcome = problem
        .solve(
            &mut LineSource::new("3\n0.5 1.5 2\n"),
            &mut backend,
            SolveOptions { compile_only: true },
        )
        .unwrap();
    assert_eq!(outcome.result, SolveResult::NotSolved);
    assert!(outcome.model.is_none());
    assert_eq!(outcome.statistics.solve_time, None);
    assert_eq!(outcome.statistics.constraint_count, 4);
    assert_eq!(outcome.statistics.unit_count, 7);
    check(
        &backend
            .constraints()
            .iter()
            .map(|constraint| constraint.to_string())
            .collect::<Vec<_>>()
            .join("\n"),
        expect_test::expect![[r#"
            (x[1] >= x[0])
            (x[2] >= x[0])
            (x[2] >= x[1])
            Or((((x[0] + x[1]) + x[2]) <= 10), (x[0] == 0))"#]],
    );

    // A real valued problem compiles, though the search backend cannot solve it.
    let problem = load(
        r#"{ "text": "abc", "objective": { "type": "real", "index": [1, 1] },
             "variable": { "length": 1, "type": "real" }, "constraint": { "term": "x[0] <= 0.5" } }"#,
    );
    let options = SolveOptions { compile_only: true };
    assert!(problem
        .solve(&mut LineSource::default(), &mut search(0, 1), options)
        .is_ok());
    assert!(matches!(
        problem.solve(&mut LineSource::default(), &mut search(0, 1), SolveOptions::default()),
        Err(Error::Solve(_))
    ));
}

#[test]
fn failures_submit_nothing() {
    let problem = load(
        r#"{ "text": "abc", "objective": { "index": [1, 1] }, "variable": { "length": 2 },
             "constraint": [{ "term": "x[0] >= 0" }, { "term": "x[1] + 1" }] }"#,
    );
    let mut backend = search(0, 1);
    let err = problem
        .solve(&mut LineSource::default(), &mut backend, SolveOptions::default())
        .unwrap_err();
    check(
        &err.to_string(),
        expect_test::expect!["in `x[1] + 1`: constraint must evaluate to a Boolean, found a solver term"],
    );
    assert!(backend.constraints().is_empty());
}

#[test]
fn inputs() {
    let problem = load(DEFAULTS);

    let mut prompts = Vec::new();
    let env = problem
        .resolve_inputs(&mut Interactive::new(&b"3\n0.5 1.5 2\n"[..], &mut prompts))
        .unwrap();
    assert_eq!(env.get("n"), Some(&Value::Int(3)));
    assert_eq!(
        env.get("w"),
        Some(&Value::Array(vec![
            Value::Real(0.5),
            Value::Real(1.5),
            Value::Real(2.)
        ]))
    );
    check(
        &String::from_utf8(prompts).unwrap(),
        expect_test::expect![
            "Input n, an int number: Input w, a realarray of length 3, the weights: "
        ],
    );
    assert_eq!(
        prompt(&problem.inputs[0], None),
        "Input n, an int number: "
    );

    for (src, expected) in [
        ("3\n1 2\n", "input `w` expects 3 values, found 2"),
        ("3\n", "no value provided for input `w`"),
        ("three\n", "illegal value `three` for input `n`"),
        ("2\n1 two\n", "illegal value `two` for input `w`"),
        ("-1\n\n", "cannot resolve `n` to an integer"),
    ] {
        let err = problem.resolve_inputs(&mut LineSource::new(src)).unwrap_err();
        assert_eq!(err.to_string(), expected);
    }

    // End of input when prompting is a missing input too.
    assert!(matches!(
        problem.resolve_inputs(&mut Interactive::new(&b""[..], Vec::new())),
        Err(Error::MissingInput { name }) if name == "n"
    ));
}

#[test]
fn environment_errors() {
    // Parameters share the namespace of inputs.
    let problem = load(
        r#"{ "text": "abc", "objective": { "index": [1, 1] }, "variable": { "length": 1 },
             "input": [{ "name": "k" }],
             "parameter": { "name": "k", "range": [0, 5], "value": 1, "index": [1, 1] } }"#,
    );
    assert!(matches!(
        problem.solve(&mut LineSource::new("1"), &mut search(0, 1), SolveOptions::default()),
        Err(Error::DuplicateBinding { name }) if name == "k"
    ));

    let problem = load(
        r#"{ "text": "abc", "objective": { "index": [1, 1] }, "variable": { "length": "n" },
             "input": [{ "name": "n" }] }"#,
    );
    check(
        &problem
            .solve(&mut LineSource::new("-2"), &mut search(0, 1), SolveOptions::default())
            .unwrap_err()
            .to_string(),
        expect_test::expect!["variable length `n` must not be negative, found -2"],
    );
}

#[test]
fn outcomes() {
    let statistics = Statistics {
        unit_count: 3,
        constraint_count: 1,
        compile_time: std::time::Duration::from_millis(2),
        solve_time: None,
    };
    check(
        &statistics.to_string(),
        expect_test::expect![[r#"
            constraints: 1
            units: 3
            compile time: 2ms
            solve time: -"#]],
    );
    assert_eq!(
        SolveResult::Optimum(Immediate::Int(10)).to_string(),
        "optimum: 10"
    );
    assert_eq!(SolveResult::Unsatisfiable.to_string(), "unsatisfiable");
}
