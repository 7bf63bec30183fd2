//! The problem model: declarations, the constraint tree and the natural language statement they
//! were extracted from.

use crate::{constraint::Constraint, env::Bound, text::TextSpan};
use opt_solve::flatopt;
use std::fmt;

mod display;
mod input;
mod schema;
mod solve;
#[cfg(test)]
mod tests;

pub use input::{InputSource, Interactive, LineSource};
pub use solve::{SolveOptions, SolveOutcome, SolveResult, Statistics};

/// The names every problem binds itself. Inputs and parameters may not use them.
pub const RESERVED_NAMES: [&str; 5] = ["x", "y", "And", "Or", "If"];

#[derive(Clone, Debug, PartialEq)]
pub struct Problem {
    /// Language of the statement, selecting the vocabulary used when mutating it.
    pub language: String,
    /// The natural language problem statement.
    pub text: String,
    pub objective: Objective,
    pub variable: Variable,
    pub constraints: Vec<Constraint>,
    pub inputs: Vec<Input>,
    pub parameters: Vec<Parameter>,
    pub capabilities: Capabilities,
    /// The document this problem was loaded from, so that fields this crate does not model
    /// survive serialization.
    document: serde_json::Value,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Objective {
    pub goal: Goal,
    pub ty: NumberType,
    /// Where the goal word appears in the statement.
    pub index: TextSpan,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Goal {
    Min,
    Max,
    /// Only decide whether the constraints are satisfiable.
    Exist,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumberType {
    Int,
    Real,
}

/// The decision vector `x`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variable {
    pub count: Bound,
    pub ty: NumberType,
}

/// A value supplied by the user when the problem is solved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Input {
    pub name: String,
    pub ty: InputType,
    /// Required for array inputs. May refer to earlier inputs.
    pub length: Option<Bound>,
    pub comment: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputType {
    Int,
    Real,
    IntArray,
    RealArray,
}

/// A number appearing in the statement that may be changed to produce a new problem.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub ty: NumberType,
    pub low: Number,
    pub high: Number,
    pub value: Number,
    /// Where the value appears in the statement.
    pub index: TextSpan,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Int(i64),
    Real(f64),
}

/// Grammar features a problem may use. Problems using a disabled feature are rejected when they
/// are loaded, except for `arithmetic_bounds` which is checked as bounds are resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// The `exist` goal.
    pub exist_goal: bool,
    /// The `parameter` section.
    pub parameters: bool,
    /// `and` and `or` constraints, and the `And`, `Or` and `If` functions.
    pub logical_combinators: bool,
    /// Arbitrary expressions as loop bounds and lengths, rather than just literals and names.
    pub arithmetic_bounds: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Capabilities {
            exist_goal: true,
            parameters: true,
            logical_combinators: true,
            arithmetic_bounds: true,
        }
    }
}

impl Capabilities {
    /// Optimization over plain single, loop and aggregation constraints only.
    pub fn basic() -> Self {
        Capabilities {
            exist_goal: false,
            parameters: false,
            logical_combinators: false,
            arithmetic_bounds: false,
        }
    }
}

impl Problem {
    /// Apply `f` to every text span tracked by this problem.
    pub(crate) fn for_each_index_mut(&mut self, mut f: impl FnMut(&mut TextSpan)) {
        f(&mut self.objective.index);
        for parameter in &mut self.parameters {
            f(&mut parameter.index);
        }
        for constraint in &mut self.constraints {
            constraint.for_each_index_mut(&mut f);
        }
    }
}

impl Goal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::Min => "min",
            Goal::Max => "max",
            Goal::Exist => "exist",
        }
    }
}

impl NumberType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NumberType::Int => "int",
            NumberType::Real => "real",
        }
    }

    pub(crate) fn to_flat(self) -> flatopt::Type {
        match self {
            NumberType::Int => flatopt::Type::Int,
            NumberType::Real => flatopt::Type::Real,
        }
    }
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Int => "int",
            InputType::Real => "real",
            InputType::IntArray => "intarray",
            InputType::RealArray => "realarray",
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, InputType::IntArray | InputType::RealArray)
    }

    /// The type of the input, or of its elements for arrays.
    pub fn element_type(&self) -> NumberType {
        match self {
            InputType::Int | InputType::IntArray => NumberType::Int,
            InputType::Real | InputType::RealArray => NumberType::Real,
        }
    }
}

impl Number {
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Int(val) => *val as f64,
            Number::Real(val) => *val,
        }
    }
}

impl From<Number> for serde_json::Value {
    fn from(number: Number) -> Self {
        match number {
            Number::Int(val) => val.into(),
            Number::Real(val) => val.into(),
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for NumberType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Number::Int(val) => write!(f, "{val}"),
            Number::Real(val) => write!(f, "{val:?}"),
        }
    }
}
