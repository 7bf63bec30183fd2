use crate::mutate::MutationMode;
use clap::Parser;
use std::ops::RangeInclusive;

/// Compile, solve and mutate optimization problems described in JSON.
#[derive(Debug, Parser)]
pub struct Args {
    #[arg(value_parser)]
    pub filepath: String,

    /// Read input values from this file, one line per input, rather than prompting for them.
    #[arg(long = "input", short = 'i')]
    pub input: Option<String>,

    /// Compile the constraints but do not solve the problem.
    #[arg(long = "compile-only", alias = "parse-only")]
    pub compile_only: bool,

    /// Print the problem as it was loaded.
    #[arg(long = "print-parsed")]
    pub print_parsed: bool,

    /// Only accept the basic grammar: no `exist` goal, parameters, logical combinators or
    /// arithmetic bounds.
    #[arg(long = "basic")]
    pub basic: bool,

    /// Write a mutated copy of the problem instead of solving it: `objective`, `constraint`,
    /// `parameter`, or `random` to pick one.
    #[arg(long = "mutate", value_parser = parse_mutation)]
    pub mutate: Option<Mutation>,

    /// Seed for the random choices made when mutating.
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Where to write the mutated problem. Defaults to standard output.
    #[arg(long = "output", short = 'o')]
    pub output: Option<String>,

    /// The range of values every variable may take in the search backend, as `LOW..HIGH`.
    #[arg(
        long = "domain",
        value_parser = parse_domain,
        default_value = "-10..10",
        allow_hyphen_values = true
    )]
    pub domain: RangeInclusive<i64>,

    /// Maximum number of partial assignments the search backend tries.
    #[arg(long = "node-limit", default_value_t = 10_000_000)]
    pub node_limit: u64,

    /// Solve with SCIP rather than the search backend.
    #[cfg(feature = "solver-scip")]
    #[arg(long = "scip")]
    pub scip: bool,

    /// Log every constraint as it is handed to the solver.
    #[arg(long = "verbose", short = 'v')]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutation {
    Random,
    Mode(MutationMode),
}

impl Mutation {
    /// The mode to mutate in, or `None` to pick one at random.
    pub fn mode(self) -> Option<MutationMode> {
        match self {
            Mutation::Random => None,
            Mutation::Mode(mode) => Some(mode),
        }
    }
}

fn parse_mutation(value: &str) -> Result<Mutation, String> {
    match value {
        "random" => Ok(Mutation::Random),
        _ => value
            .parse()
            .map(Mutation::Mode)
            .map_err(|err| format!("{err}")),
    }
}

/// Parses `LOW..HIGH` into an inclusive range. Either end may be negative.
fn parse_domain(value: &str) -> Result<RangeInclusive<i64>, String> {
    let (low, high) = value
        .split_once("..")
        .ok_or_else(|| format!("expected `LOW..HIGH`, found `{value}`"))?;
    let parse = |bound: &str| {
        bound
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("`{bound}` is not an integer"))
    };
    let (low, high) = (parse(low)?, parse(high)?);
    if low > high {
        return Err(format!("the domain `{value}` is empty"));
    }
    Ok(low..=high)
}

#[test]
fn domains() {
    assert_eq!(parse_domain("-10..10"), Ok(-10..=10));
    assert_eq!(parse_domain("0..0"), Ok(0..=0));
    assert_eq!(
        parse_domain("5"),
        Err("expected `LOW..HIGH`, found `5`".to_string())
    );
    assert_eq!(
        parse_domain("1..a"),
        Err("`a` is not an integer".to_string())
    );
    assert_eq!(
        parse_domain("3..1"),
        Err("the domain `3..1` is empty".to_string())
    );

    assert_eq!(parse_mutation("random"), Ok(Mutation::Random));
    assert_eq!(
        parse_mutation("parameter"),
        Ok(Mutation::Mode(MutationMode::Parameter))
    );
    assert!(parse_mutation("text").is_err());
}
