mod expr_error;

use crate::{problem::Number, span::Spanned};
use ariadne::{Config, FnCache, IndexType, Label, Report, ReportKind, Source};
use opt_solve::SolveError;
use std::path::PathBuf;
use thiserror::Error;
use yansi::{Color, Paint, Style};

pub use expr_error::{ExprError, ExprErrorKind};

/// Every way loading, solving or mutating a problem can fail. Unsatisfiability is a result, not
/// an error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("couldn't read {}: {error}", file.display())]
    FileIO {
        error: std::io::Error,
        file: PathBuf,
    },
    #[error("malformed problem document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{msg}")]
    Schema { msg: String },
    #[error("illegal constraint type `{kind}`")]
    IllegalConstraintType { kind: String },
    #[error("illegal comparison operator `{op}`")]
    IllegalOperator { op: String },
    #[error("`{name}` is already bound")]
    DuplicateBinding { name: String },
    #[error("cannot resolve `{bound}` to an integer")]
    UnresolvedBound { bound: String },
    #[error("in `{}`: {error}", error.span.source())]
    Expression { error: ExprError },
    #[error("input `{name}` expects {expected} values, found {found}")]
    InputLengthMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("illegal value `{value}` for input `{name}`")]
    IllegalInputValue { name: String, value: String },
    #[error("no value provided for input `{name}`")]
    MissingInput { name: String },
    #[error("range [{low}, {high}] of parameter `{name}` is too narrow to mutate")]
    DegenerateRange {
        name: String,
        low: Number,
        high: Number,
    },
    #[error("no {target} eligible for mutation")]
    NoEligibleTarget { target: &'static str },
    #[error("no vocabulary for language `{language}`")]
    UnsupportedLanguage { language: String },
    #[error("illegal mutation mode `{mode}`: expected `objective`, `constraint` or `parameter`")]
    IllegalMutationMode { mode: String },
    #[error("{0}")]
    Solve(#[from] SolveError),
}

impl From<ExprError> for Error {
    fn from(error: ExprError) -> Self {
        Error::Expression { error }
    }
}

impl Error {
    pub(crate) fn schema(msg: impl Into<String>) -> Self {
        Error::Schema { msg: msg.into() }
    }

    /// Pretty print this error to the terminal. Expression errors are rendered against the term
    /// they come from using `ariadne`.
    pub fn print(&self) {
        let Error::Expression { error } = self else {
            eprintln!("{}: {self}", "Error".red().bold());
            return;
        };

        let source = error.span().source();
        let id: &str = "term";
        let mut style = Style::new().bold();
        style.foreground = Some(Color::Red);

        let mut report_builder = Report::build(ReportKind::Error, (id, error.span().range.clone()))
            .with_config(Config::default().with_index_type(IndexType::Byte))
            .with_message(format!("{}", error.bold()))
            .with_label(
                Label::new((id, error.span().range.clone()))
                    .with_message(error.label().paint(style))
                    .with_color(Color::Red),
            );

        if let Some(help) = error.help() {
            report_builder = report_builder.with_help(help);
        }

        let _ = report_builder.finish().eprint(
            FnCache::new(|id: &&str| Err(Box::new(format!("Failed to fetch source '{id}'")) as Box<dyn std::fmt::Debug>))
                .with_sources([(id, Source::from(source.to_string()))].into_iter().collect()),
        );
    }
}

/// A simple wrapper around `anyhow::bail!` that reports which step failed for which problem file.
#[macro_export]
macro_rules! optc_bail {
    ($step: expr, $filepath: expr) => {
        anyhow::bail!(
            "could not {} `{}` due to previous error",
            $step,
            $filepath.display()
        )
    };
}
