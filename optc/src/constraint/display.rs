use super::{Aggregation, Comparison, Constraint, ConstraintNode, IndexRange, LoopBody};
use crate::expr::Term;
use std::fmt::{Display, Formatter, Result};

impl Display for Constraint {
    fn fmt(&self, f: &mut Formatter) -> Result {
        self.fmt_at(f, 0)
    }
}

impl Display for Comparison {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "{} {}", self.comparator, self.rval)
    }
}

impl Display for IndexRange {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "[{},{}]", self.low, self.high)
    }
}

fn fmt_term(f: &mut Formatter, term: &Term, comparison: Option<&Comparison>) -> Result {
    match comparison {
        Some(comparison) => writeln!(f, "{term} {comparison}"),
        None => writeln!(f, "{term}"),
    }
}

impl Constraint {
    /// Write this constraint indented by `level` tabs, nested constraints one level deeper.
    fn fmt_at(&self, f: &mut Formatter, level: usize) -> Result {
        let padding = "\t".repeat(level);
        writeln!(f, "{padding}This is a constraint of type {}:", self.kind())?;

        match &self.node {
            ConstraintNode::Single { term, comparison } => {
                write!(f, "{padding}\t")?;
                fmt_term(f, term, comparison.as_ref())
            }

            ConstraintNode::Loop {
                range,
                loop_var,
                body,
            } => {
                write!(f, "{padding}\tFor value {loop_var} in range {range}: ")?;
                match body {
                    LoopBody::Term { term, comparison } => fmt_term(f, term, comparison.as_ref()),
                    LoopBody::Nested(nested) => {
                        writeln!(f, "the following constraints holds:")?;
                        nested
                            .iter()
                            .try_for_each(|constraint| constraint.fmt_at(f, level + 1))
                    }
                }
            }

            ConstraintNode::Sum(aggregation) | ConstraintNode::Product(aggregation) => {
                let Aggregation {
                    range,
                    loop_var,
                    term,
                    comparison,
                } = aggregation;
                write!(
                    f,
                    "{padding}\t{}([{term} for {loop_var} in {range}])",
                    self.kind()
                )?;
                match comparison {
                    Some(comparison) => writeln!(f, " {comparison}"),
                    None => writeln!(f),
                }
            }

            ConstraintNode::And(nested) | ConstraintNode::Or(nested) => {
                writeln!(
                    f,
                    "{padding}\tthe logical {} of the following constraints holds:",
                    self.kind()
                )?;
                nested
                    .iter()
                    .try_for_each(|constraint| constraint.fmt_at(f, level + 1))
            }
        }
    }
}
