mod backend;
mod error;
pub mod flatopt;
#[cfg(feature = "solver-scip")]
pub mod scip;
pub mod search;

pub use crate::backend::{Backend, Sense, Solution, Status};
pub use crate::error::SolveError;
pub use crate::search::{Search, SearchConfig};
