use anyhow::Context;
use clap::Parser;
use optc::{
    cli::Args,
    problem::{Capabilities, InputSource, Interactive, LineSource, Problem, SolveOptions},
};
use opt_solve::{Backend, Search, SearchConfig};
use rand::{rngs::StdRng, SeedableRng};
use std::{
    fs::{create_dir_all, File},
    io::{self, Write},
    path::Path,
};
use tracing::Level;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let filepath = Path::new(&args.filepath);

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::WARN
        })
        .with_writer(io::stderr)
        .without_time()
        .init();

    let capabilities = if args.basic {
        Capabilities::basic()
    } else {
        Capabilities::default()
    };
    let problem = match Problem::from_path(filepath, capabilities) {
        Ok(problem) => problem,
        Err(err) => {
            if !cfg!(test) {
                err.print();
            }
            optc::optc_bail!("load", filepath)
        }
    };
    if args.print_parsed {
        println!("{problem}");
    }

    if let Some(mutation) = args.mutate {
        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mutated = match problem.mutate(mutation.mode(), &mut rng) {
            Ok(mutated) => mutated,
            Err(err) => {
                if !cfg!(test) {
                    err.print();
                }
                optc::optc_bail!("mutate", filepath)
            }
        };
        return write_problem(&mutated, args.output.as_deref());
    }

    let mut source: Box<dyn InputSource> = match &args.input {
        Some(path) => match LineSource::from_path(Path::new(path)) {
            Ok(source) => Box::new(source),
            Err(err) => {
                err.print();
                optc::optc_bail!("read inputs for", filepath)
            }
        },
        None => Box::new(Interactive::new(io::stdin().lock(), io::stdout())),
    };

    let mut backend = backend(&args);
    let options = SolveOptions {
        compile_only: args.compile_only,
    };
    let outcome = match problem.solve(source.as_mut(), backend.as_mut(), options) {
        Ok(outcome) => outcome,
        Err(err) => {
            if !cfg!(test) {
                err.print();
            }
            optc::optc_bail!("solve", filepath)
        }
    };

    println!("{}", outcome.result);
    if let Some(model) = &outcome.model {
        println!("{model}");
    }
    println!("{}", outcome.statistics);

    Ok(())
}

#[cfg(feature = "solver-scip")]
fn backend(args: &Args) -> Box<dyn Backend> {
    if args.scip {
        return Box::new(opt_solve::scip::Scip::new());
    }
    search_backend(args)
}

#[cfg(not(feature = "solver-scip"))]
fn backend(args: &Args) -> Box<dyn Backend> {
    search_backend(args)
}

fn search_backend(args: &Args) -> Box<dyn Backend> {
    Box::new(Search::new(SearchConfig {
        lower: *args.domain.start(),
        upper: *args.domain.end(),
        node_limit: args.node_limit,
    }))
}

/// Write `problem` as pretty printed JSON to `output`, or to standard output.
fn write_problem(problem: &Problem, output: Option<&str>) -> anyhow::Result<()> {
    let document = problem.to_json();
    match output {
        Some(output) => {
            let output = Path::new(output);
            if let Some(parent) = output.parent().filter(|parent| !parent.exists()) {
                create_dir_all(parent)?;
            }
            let file = File::create(output)
                .with_context(|| format!("couldn't create {}", output.display()))?;
            serde_json::to_writer_pretty(file, &document)?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &document)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}
