use std::{
    io::Write,
    path::PathBuf,
    process::Stdio,
};

fn remove_ansi_codes(input: &str) -> String {
    let re = regex::Regex::new(r"\x1B\[([0-9;]*[A-Za-z])").unwrap();
    re.replace_all(input, "").to_string()
}

#[cfg(test)]
fn check(actual: &str, expect: expect_test::Expect) {
    expect.assert_eq(actual);
}

struct Output {
    stdout: String,
    stderr: String,
}

fn problem_path(name: &str) -> String {
    let path: PathBuf = [env!("CARGO_MANIFEST_DIR"), "tests", "problems", name]
        .iter()
        .collect();
    path.display().to_string()
}

#[cfg(test)]
fn optc_command(args: &str, stdin: &str) -> Output {
    let mut child = test_bin::get_test_bin("optc")
        .args(args.split_ascii_whitespace().collect::<Vec<_>>())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start optc");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    let output = child.wait_with_output().expect("failed to run optc");

    Output {
        stdout: remove_ansi_codes(&String::from_utf8_lossy(&output.stdout)),
        stderr: remove_ansi_codes(&String::from_utf8_lossy(&output.stderr)),
    }
}

/// The statistics printed last contain timings, so only compare what comes before them.
fn without_timings(stdout: &str) -> String {
    stdout
        .lines()
        .filter(|line| !line.contains(" time: "))
        .map(|line| format!("{line}\n"))
        .collect()
}

#[test]
fn err() {
    // Missing input file
    check(
        &optc_command("", "").stderr,
        expect_test::expect![[r#"
            error: the following required arguments were not provided:
              <FILEPATH>

            Usage: optc <FILEPATH>

            For more information, try '--help'.
        "#]],
    );

    // Input file not found
    check(
        &optc_command("missing.json", "").stderr,
        expect_test::expect![[r#"
            Error: couldn't read missing.json: No such file or directory (os error 2)
            Error: could not load `missing.json` due to previous error
        "#]],
    );

    // Empty domain
    let input_file = tempfile::NamedTempFile::new().unwrap();
    let output = optc_command(
        &format!("{} --domain 3..1", input_file.path().to_str().unwrap()),
        "",
    );
    check(
        &output.stderr,
        expect_test::expect![[r#"
            error: invalid value '3..1' for '--domain <DOMAIN>': the domain `3..1` is empty

            For more information, try '--help'.
        "#]],
    );

    // Unknown mutation mode
    let output = optc_command(
        &format!("{} --mutate text", input_file.path().to_str().unwrap()),
        "",
    );
    check(
        &output.stderr,
        expect_test::expect![[r#"
            error: invalid value 'text' for '--mutate <MUTATE>': illegal mutation mode `text`: expected `objective`, `constraint` or `parameter`

            For more information, try '--help'.
        "#]],
    );
}

#[test]
fn malformed_problem() {
    let mut input_file = tempfile::NamedTempFile::new().unwrap();
    write!(input_file.as_file_mut(), r#"{{ "text": "abc", "objective": {{}} }}"#).unwrap();
    let path = input_file.path().to_str().unwrap();

    let output = optc_command(path, "");
    assert_eq!(
        output.stderr,
        format!(
            "Error: missing `index` in objective\n\
             Error: could not load `{path}` due to previous error\n"
        )
    );
    assert!(output.stdout.is_empty());
}

#[test]
fn solve() {
    let mut inputs = tempfile::NamedTempFile::new().unwrap();
    write!(inputs.as_file_mut(), "3\n2 3 4\n3 4 5\n").unwrap();

    let output = optc_command(
        &format!(
            "{} --input {}",
            problem_path("knapsack.json"),
            inputs.path().to_str().unwrap()
        ),
        "",
    );
    check(
        &without_timings(&output.stdout),
        expect_test::expect![[r#"
            optimum: 7
            x[0]: 1
            x[1]: 1
            x[2]: 0
            y: 7
            constraints: 8
            units: 12
        "#]],
    );

    // Without `--input` every input is prompted for.
    let output = optc_command(&problem_path("knapsack.json"), "3\n2 3 4\n3 4 5\n");
    check(
        &without_timings(&output.stdout),
        expect_test::expect![[r#"
            Input n, an int number: Input w, an intarray of length 3, the weights: Input v, an intarray of length 3, the values: optimum: 7
            x[0]: 1
            x[1]: 1
            x[2]: 0
            y: 7
            constraints: 8
            units: 12
        "#]],
    );
}

#[test]
fn compile_only() {
    let output = optc_command(
        &format!("{} --compile-only", problem_path("product.json")),
        "",
    );
    check(
        &without_timings(&output.stdout),
        expect_test::expect![[r#"
            not solved
            constraints: 8
            units: 12
        "#]],
    );
    assert!(output.stdout.ends_with("solve time: -\n"));

    // `--parse-only` is an alias.
    let output = optc_command(
        &format!("{} --parse-only", problem_path("product.json")),
        "",
    );
    assert!(output.stdout.starts_with("not solved\n"));
}

#[test]
fn compile_errors() {
    let path = problem_path("out_of_bounds.json");
    let output = optc_command(&path, "");
    assert!(output.stdout.is_empty());
    assert!(output
        .stderr
        .contains("index 4 is out of bounds for length 4"));
    assert!(output
        .stderr
        .ends_with(&format!("Error: could not solve `{path}` due to previous error\n")));
}

#[test]
fn mutate() {
    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("mutated").join("knapsack.json");
    let output = optc_command(
        &format!(
            "{} --mutate objective --seed 7 -o {}",
            problem_path("knapsack.json"),
            output_path.display()
        ),
        "",
    );
    assert!(output.stdout.is_empty());
    assert!(output.stderr.is_empty());

    let mutated: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output_path).unwrap()).unwrap();
    assert_eq!(mutated["objective"]["goal"], "min");
    assert_eq!(
        mutated["text"],
        "Choose items of minimum total value while the total weight stays within 5."
    );

    // The mutated problem is a problem in its own right.
    let output = optc_command(
        &format!("{} --compile-only", output_path.display()),
        "3\n2 3 4\n3 4 5\n",
    );
    assert!(output.stdout.contains("not solved\n"));

    // Without `-o` the problem is written to standard output.
    let output = optc_command(
        &format!(
            "{} --mutate parameter --seed 1",
            problem_path("knapsack.json")
        ),
        "",
    );
    let mutated: serde_json::Value = serde_json::from_str(&output.stdout).unwrap();
    let value = mutated["parameter"][0]["value"].as_i64().unwrap();
    assert!((1..=20).contains(&value) && value != 5);

    // Problems that cannot be mutated are reported.
    let path = problem_path("neighbours.json");
    let output = optc_command(&format!("{path} --mutate objective"), "");
    assert_eq!(
        output.stderr,
        format!(
            "Error: no objective eligible for mutation\n\
             Error: could not mutate `{path}` due to previous error\n"
        )
    );
}
