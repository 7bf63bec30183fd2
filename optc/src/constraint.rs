//! The constraint tree of a problem and its lowering into solver predicates.
//!
//! A constraint is one of six node kinds. `single` is a term, optionally compared with a right
//! hand side. `loop` repeats a term, or a list of nested constraints, for every value of a loop
//! variable. `sum` and `product` fold a term over a range before comparing the result. `and` and
//! `or` combine the predicates of their nested constraints.

use crate::{
    env::Bound,
    error::Error,
    expr::{BinaryOp, Term},
    text::TextSpan,
};
use std::{fmt, str::FromStr};

mod compile;
mod display;
#[cfg(test)]
mod tests;

pub use compile::{CompileStats, Compiler};

#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    pub node: ConstraintNode,
    /// Where the right hand side of this constraint appears in the problem statement, if it
    /// appears there at all.
    pub index: Option<TextSpan>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConstraintNode {
    Single {
        term: Term,
        comparison: Option<Comparison>,
    },
    Loop {
        range: IndexRange,
        loop_var: String,
        body: LoopBody,
    },
    Sum(Aggregation),
    Product(Aggregation),
    And(Vec<Constraint>),
    Or(Vec<Constraint>),
}

/// What a loop repeats on every iteration.
#[derive(Clone, Debug, PartialEq)]
pub enum LoopBody {
    Term {
        term: Term,
        comparison: Option<Comparison>,
    },
    Nested(Vec<Constraint>),
}

/// The term of a `sum` or `product`, evaluated once for every value of `loop_var` in `range`.
#[derive(Clone, Debug, PartialEq)]
pub struct Aggregation {
    pub range: IndexRange,
    pub loop_var: String,
    pub term: Term,
    pub comparison: Option<Comparison>,
}

/// An inclusive integer range `[low, high]`. Empty when `high < low`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexRange {
    pub low: Bound,
    pub high: Bound,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Comparison {
    pub comparator: Comparator,
    pub rval: Term,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparator {
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Equal,
    NotEqual,
}

/// The kind of a constraint node, as named by the `type` field of the problem document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstraintKind {
    Single,
    Loop,
    Sum,
    Product,
    And,
    Or,
}

impl Comparator {
    pub(crate) fn op(&self) -> BinaryOp {
        match self {
            Comparator::LessThan => BinaryOp::LessThan,
            Comparator::LessThanOrEqual => BinaryOp::LessThanOrEqual,
            Comparator::GreaterThan => BinaryOp::GreaterThan,
            Comparator::GreaterThanOrEqual => BinaryOp::GreaterThanOrEqual,
            Comparator::Equal => BinaryOp::Equal,
            Comparator::NotEqual => BinaryOp::NotEqual,
        }
    }
}

impl FromStr for Comparator {
    type Err = Error;

    fn from_str(op: &str) -> Result<Self, Self::Err> {
        Ok(match op.trim() {
            "<" => Comparator::LessThan,
            "<=" => Comparator::LessThanOrEqual,
            ">" => Comparator::GreaterThan,
            ">=" => Comparator::GreaterThanOrEqual,
            "=" | "==" => Comparator::Equal,
            "!=" => Comparator::NotEqual,
            _ => return Err(Error::IllegalOperator { op: op.to_string() }),
        })
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Comparator::Equal => write!(f, "="),
            _ => write!(f, "{}", self.op().as_str()),
        }
    }
}

impl ConstraintKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintKind::Single => "single",
            ConstraintKind::Loop => "loop",
            ConstraintKind::Sum => "sum",
            ConstraintKind::Product => "product",
            ConstraintKind::And => "and",
            ConstraintKind::Or => "or",
        }
    }

    /// Kinds whose `term` is a list of nested constraints.
    pub fn has_nested(&self) -> bool {
        matches!(
            self,
            ConstraintKind::Loop | ConstraintKind::And | ConstraintKind::Or
        )
    }

    /// Kinds that bind a loop variable over a range.
    pub fn is_ranged(&self) -> bool {
        matches!(
            self,
            ConstraintKind::Loop | ConstraintKind::Sum | ConstraintKind::Product
        )
    }
}

impl FromStr for ConstraintKind {
    type Err = Error;

    fn from_str(kind: &str) -> Result<Self, Self::Err> {
        Ok(match kind {
            "single" => ConstraintKind::Single,
            "loop" => ConstraintKind::Loop,
            "sum" => ConstraintKind::Sum,
            "product" => ConstraintKind::Product,
            "and" => ConstraintKind::And,
            "or" => ConstraintKind::Or,
            _ => {
                return Err(Error::IllegalConstraintType {
                    kind: kind.to_string(),
                })
            }
        })
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Constraint {
    pub fn kind(&self) -> ConstraintKind {
        match &self.node {
            ConstraintNode::Single { .. } => ConstraintKind::Single,
            ConstraintNode::Loop { .. } => ConstraintKind::Loop,
            ConstraintNode::Sum(_) => ConstraintKind::Sum,
            ConstraintNode::Product(_) => ConstraintKind::Product,
            ConstraintNode::And(_) => ConstraintKind::And,
            ConstraintNode::Or(_) => ConstraintKind::Or,
        }
    }

    /// The constraints nested directly inside this one.
    pub fn nested(&self) -> &[Constraint] {
        match &self.node {
            ConstraintNode::Loop {
                body: LoopBody::Nested(nested),
                ..
            }
            | ConstraintNode::And(nested)
            | ConstraintNode::Or(nested) => nested,
            _ => &[],
        }
    }

    pub(crate) fn nested_mut(&mut self) -> &mut [Constraint] {
        match &mut self.node {
            ConstraintNode::Loop {
                body: LoopBody::Nested(nested),
                ..
            }
            | ConstraintNode::And(nested)
            | ConstraintNode::Or(nested) => nested,
            _ => &mut [],
        }
    }

    /// Apply `f` to the text span of this constraint and of every constraint nested inside it.
    pub(crate) fn for_each_index_mut(&mut self, f: &mut impl FnMut(&mut TextSpan)) {
        if let Some(index) = &mut self.index {
            f(index);
        }
        for nested in self.nested_mut() {
            nested.for_each_index_mut(f);
        }
    }
}

