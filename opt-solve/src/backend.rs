use crate::{
    error::SolveError,
    flatopt::{Expr, Immediate, Type, Var},
};
use std::fmt;

/// The narrow set of capabilities the compiler needs from a solving engine.
///
/// A session is used in this order: [`Backend::declare`] once, optionally [`Backend::optimize`],
/// any number of [`Backend::add_constraint`] calls, then [`Backend::check`] and, if that reported
/// a solution, [`Backend::model`].
pub trait Backend {
    /// Declare the decision vector `x` of `len` elements of type `decision`, and the objective
    /// handle `y` of type `objective`.
    fn declare(&mut self, decision: Type, len: usize, objective: Type) -> Result<(), SolveError>;

    /// Require `constraint` to hold in every solution.
    fn add_constraint(&mut self, constraint: Expr) -> Result<(), SolveError>;

    /// Turn the session into an optimization of the objective handle. Without this call,
    /// [`Backend::check`] only decides satisfiability.
    fn optimize(&mut self, sense: Sense);

    fn check(&mut self) -> Result<Status, SolveError>;

    /// The solution found by the last successful [`Backend::check`].
    fn model(&self) -> Option<&Solution>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sense {
    Minimize,
    Maximize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// A solution exists (and is optimal when optimizing).
    Sat,
    Unsat,
    /// The objective can be improved without limit.
    Unbounded,
}

/// A full assignment to the decision vector and the objective handle.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    pub decision: Vec<Immediate>,
    pub objective: Immediate,
}

impl Solution {
    pub fn value(&self, var: Var) -> Option<Immediate> {
        match var {
            Var::Decision(idx) => self.decision.get(idx).copied(),
            Var::Objective => Some(self.objective),
        }
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (idx, value) in self.decision.iter().enumerate() {
            writeln!(f, "{}: {value}", Var::Decision(idx))?;
        }
        write!(f, "{}: {}", Var::Objective, self.objective)
    }
}
