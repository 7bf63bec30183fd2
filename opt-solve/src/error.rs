use crate::flatopt::{Immediate, Type};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SolveError {
    #[error("solver internal error: {msg}")]
    Internal { msg: &'static str },
    #[error("cannot evaluate `{expr}`: {msg}")]
    Evaluation { expr: String, msg: &'static str },
    #[error("variables must be declared before {action}")]
    Undeclared { action: &'static str },
    #[error("the search backend cannot enumerate `{ty}` variables")]
    UnsupportedType { ty: Type },
    #[error("empty search domain {lower}..={upper}")]
    EmptyDomain { lower: i64, upper: i64 },
    #[error(
        "no optimum within the search domain {lower}..={upper}: the objective improves beyond {value}"
    )]
    OptimumOutsideDomain {
        value: Immediate,
        lower: i64,
        upper: i64,
    },
    #[error("search gave up after visiting {limit} nodes")]
    NodeLimit { limit: u64 },
}
