use std::{
    fs::{File, OpenOptions},
    io::{BufRead, BufReader, Write},
    path::Path,
};

/// Given a `Result`, unwrap it or emit the error and `continue;`. Will fail if used outside a
/// loop due to `continue;`.
#[macro_export]
macro_rules! unwrap_or_continue {
    ($step: expr, $step_name: expr, $failed: expr, $path: expr) => {{
        match $step {
            Ok(output) => output,
            Err(errs) => {
                $failed.push($path.clone());
                eprintln!(
                    "{}",
                    format!("Failed to {} {}: \n{}", $step_name, $path.display(), errs,).red()
                );
                continue;
            }
        }
    }};
}

#[derive(Default, Debug)]
pub struct TestData {
    pub parsed: Option<String>,
    pub load_failure: Option<String>,
    pub compiled: Option<String>,
    pub compile_failure: Option<String>,
    pub solution: Option<String>,
    pub mutated: Option<String>,
}

// Search for sections within an expectation file which contain the expected output from the
// different stages of handling a problem. Each section has a tag and is delimited by `<<<` and
// `>>>`, with every line inside commented out. The tags are
//   * parsed
//   * load_failure
//   * compiled
//   * compile_failure
//   * solution
//   * mutated
//
// e.g. the expectations for a problem maximizing the sum of `x` may be:
// | // compiled <<<
// | // (((x[0] + x[1]) + x[2]) <= 10)
// | // >>>
// |
// | // solution <<<
// | // optimum: 10
// | // >>>
//
// Lines outside of any section are ignored and dropped when expectations are updated.
pub fn parse_test_data(path: &Path) -> anyhow::Result<TestData> {
    let mut test_data = TestData::default();

    #[derive(PartialEq)]
    enum Section {
        None,
        Parsed,
        LoadFailure,
        Compiled,
        CompileFailure,
        Solution,
        Mutated,
    }
    let mut cur_section = Section::None;
    let mut section_lines = Vec::<String>::new();

    let open_sect_re = regex::Regex::new(
        r"^\s*//\s*(parsed|load_failure|compiled|compile_failure|solution|mutated)\s*<<<",
    )?;
    let close_sect_re = regex::Regex::new(r"^\s*//\s*>>>")?;

    let handle = File::open(path)?;
    for line in BufReader::new(handle).lines() {
        let line = line?;

        // Match an open tag.
        if let Some(tag) = open_sect_re.captures(&line) {
            // We shouldn't already be in a section.
            assert!(cur_section == Section::None && section_lines.is_empty());

            cur_section = match &tag[1] {
                "parsed" => Section::Parsed,
                "load_failure" => Section::LoadFailure,
                "compiled" => Section::Compiled,
                "compile_failure" => Section::CompileFailure,
                "solution" => Section::Solution,
                "mutated" => Section::Mutated,
                _ => unreachable!("We can't capture strings not in the regex."),
            };
            continue;
        }

        // Match a close tag.
        if close_sect_re.is_match(&line) {
            assert!(
                cur_section != Section::None,
                "Unmatched section closing tag found. \
                    There's probably a typo in the section open tag."
            );

            let section_str = Some(section_lines.join("\n"));
            match cur_section {
                Section::Parsed => test_data.parsed = section_str,
                Section::LoadFailure => test_data.load_failure = section_str,
                Section::Compiled => test_data.compiled = section_str,
                Section::CompileFailure => test_data.compile_failure = section_str,
                Section::Solution => test_data.solution = section_str,
                Section::Mutated => test_data.mutated = section_str,
                Section::None => unreachable!("Can't be none, already checked."),
            }

            cur_section = Section::None;
            section_lines.clear();
            continue;
        }

        if cur_section != Section::None {
            // Strip exactly `// `, or keep an empty line for a bare `//`.
            section_lines.push(line.get(3..).unwrap_or_default().to_owned());
        }
    }

    if update_expect() {
        // Start over; the test re-appends every section it checks.
        OpenOptions::new().write(true).truncate(true).open(path)?;
    }

    Ok(test_data)
}

/// Is the env variable UPDATE_EXPECT set?
pub fn update_expect() -> bool {
    std::env::var("UPDATE_EXPECT").is_ok()
}

/// Append a test check with section name `section_name` and expected string `new_expected` to a
/// test file with path `test_path`
pub fn update_expected(test_path: &Path, section_name: &str, new_expected: &str) {
    let mut file = OpenOptions::new().append(true).open(test_path).unwrap();
    writeln!(file, "// {section_name} <<<").unwrap();
    for line in new_expected.lines() {
        if line.is_empty() {
            writeln!(file, "//").unwrap();
        } else {
            writeln!(file, "// {line}").unwrap();
        }
    }
    writeln!(file, "// >>>\n").unwrap();
}
