//! Producing new problems from old ones by changing their statement in place.
//!
//! Every mutation returns an independent copy. The statement is patched at the span the mutated
//! item tracks, that span is recomputed and every span after it is shifted by the change in
//! length, so all spans keep pointing at the text they name.

use crate::{
    error::Error,
    problem::{Goal, Number, NumberType, Problem},
    text::{self, TextSpan},
};
use rand::{seq::SliceRandom, Rng};
use std::{fmt, str::FromStr};
use tracing::warn;


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationMode {
    /// Swap a `min` goal for `max` and vice versa.
    Objective,
    /// Rewrite a constraint with a text span.
    Constraint,
    /// Draw a new value for a parameter.
    Parameter,
}

impl MutationMode {
    pub const ALL: [MutationMode; 3] = [
        MutationMode::Objective,
        MutationMode::Constraint,
        MutationMode::Parameter,
    ];
}

impl FromStr for MutationMode {
    type Err = Error;

    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        match mode {
            "objective" => Ok(MutationMode::Objective),
            "constraint" => Ok(MutationMode::Constraint),
            "parameter" => Ok(MutationMode::Parameter),
            _ => Err(Error::IllegalMutationMode {
                mode: mode.to_string(),
            }),
        }
    }
}

impl fmt::Display for MutationMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MutationMode::Objective => write!(f, "objective"),
            MutationMode::Constraint => write!(f, "constraint"),
            MutationMode::Parameter => write!(f, "parameter"),
        }
    }
}

/// The words for `max` and `min` goals in each supported language.
const LEXICON: [(&str, &str, &str); 2] = [("en", "maximum", "minimum"), ("zh", "最大", "最小")];

fn goal_word(language: &str, goal: Goal) -> Result<&'static str, Error> {
    let (_, max, min) = LEXICON
        .iter()
        .find(|(lang, ..)| *lang == language)
        .ok_or_else(|| Error::UnsupportedLanguage {
            language: language.to_string(),
        })?;
    Ok(if goal == Goal::Max { max } else { min })
}

/// The integers `low..=high` of a parameter's range other than its current value, counted rather
/// than listed so that wide ranges cost nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Candidates {
    low: i128,
    count: u128,
    /// The current value, when it is one of the integers in range.
    skip: Option<i128>,
}

impl Candidates {
    /// `None` when no integer in range differs from `value`.
    fn new(low: Number, high: Number, value: Number) -> Option<Self> {
        let (low, high) = (low.as_f64().ceil(), high.as_f64().floor());
        if !(low.is_finite() && high.is_finite()) || high < low {
            return None;
        }
        let (low, high) = (i128::from(low as i64), i128::from(high as i64));
        let value = value.as_f64();
        let skip = (value.fract() == 0.)
            .then_some(value as i128)
            .filter(|skip| (low..=high).contains(skip));
        let count = (high - low + 1).unsigned_abs() - u128::from(skip.is_some());
        (count > 0).then_some(Candidates { low, count, skip })
    }

    /// Uniformly pick one of the candidates: the integers from `low` upwards, stepping over
    /// `skip`.
    fn draw(&self, rng: &mut impl Rng) -> i64 {
        let mut value = self.low.saturating_add_unsigned(rng.gen_range(0..self.count));
        if self.skip.is_some_and(|skip| value >= skip) {
            value += 1;
        }
        i64::try_from(value).unwrap_or(i64::MAX)
    }
}

impl Problem {
    /// A copy of this problem mutated in `mode`, or in a mode chosen at random.
    pub fn mutate(&self, mode: Option<MutationMode>, rng: &mut impl Rng) -> Result<Problem, Error> {
        let mode = match mode {
            Some(mode) => mode,
            None => *MutationMode::ALL
                .choose(rng)
                .unwrap_or(&MutationMode::Objective),
        };
        match mode {
            MutationMode::Objective => self.mutate_objective(),
            MutationMode::Constraint => self.mutate_constraint(rng),
            MutationMode::Parameter => self.mutate_random_parameter(rng),
        }
    }

    /// A copy of this problem with the opposite goal, and the goal word of the statement
    /// replaced to match.
    pub fn mutate_objective(&self) -> Result<Problem, Error> {
        let goal = match self.objective.goal {
            Goal::Max => Goal::Min,
            Goal::Min => Goal::Max,
            Goal::Exist => return Err(Error::NoEligibleTarget { target: "objective" }),
        };
        let word = goal_word(&self.language, goal)?;

        let mut mutated = self.clone();
        mutated.objective.index = mutated.splice(self.objective.index, word)?;
        mutated.objective.goal = goal;
        Ok(mutated)
    }

    /// A copy of this problem with a new value for the parameter `name`, drawn uniformly from the
    /// integers in its range other than the current value.
    pub fn mutate_parameter(&self, name: &str, rng: &mut impl Rng) -> Result<Problem, Error> {
        let position = self
            .parameters
            .iter()
            .position(|parameter| parameter.name == name)
            .ok_or(Error::NoEligibleTarget {
                target: "parameter",
            })?;
        self.mutate_parameter_at(position, rng)
    }

    fn mutate_random_parameter(&self, rng: &mut impl Rng) -> Result<Problem, Error> {
        let eligible = self
            .parameters
            .iter()
            .enumerate()
            .filter(|(_, parameter)| {
                Candidates::new(parameter.low, parameter.high, parameter.value).is_some()
            })
            .map(|(position, _)| position)
            .collect::<Vec<_>>();

        match (eligible.choose(rng), self.parameters.first()) {
            (Some(position), _) => self.mutate_parameter_at(*position, rng),
            (None, Some(parameter)) => Err(Error::DegenerateRange {
                name: parameter.name.clone(),
                low: parameter.low,
                high: parameter.high,
            }),
            (None, None) => Err(Error::NoEligibleTarget {
                target: "parameter",
            }),
        }
    }

    fn mutate_parameter_at(&self, position: usize, rng: &mut impl Rng) -> Result<Problem, Error> {
        let parameter = &self.parameters[position];
        let value = Candidates::new(parameter.low, parameter.high, parameter.value)
            .ok_or_else(|| Error::DegenerateRange {
                name: parameter.name.clone(),
                low: parameter.low,
                high: parameter.high,
            })?
            .draw(rng);

        let mut mutated = self.clone();
        let index = mutated.splice(parameter.index, &value.to_string())?;
        let mutated_parameter = &mut mutated.parameters[position];
        mutated_parameter.index = index;
        mutated_parameter.value = match parameter.ty {
            NumberType::Int => Number::Int(value),
            NumberType::Real => Number::Real(value as f64),
        };
        Ok(mutated)
    }

    /// Constraints are not rewritten yet: a constraint with a text span is picked, but the copy
    /// returned is unchanged.
    fn mutate_constraint(&self, rng: &mut impl Rng) -> Result<Problem, Error> {
        let eligible = self
            .constraints
            .iter()
            .enumerate()
            .filter(|(_, constraint)| constraint.index.is_some())
            .collect::<Vec<_>>();
        let (position, constraint) = eligible.choose(rng).ok_or(Error::NoEligibleTarget {
            target: "constraint",
        })?;
        warn!(
            "rewriting {} constraint {} is not supported, the problem is left unchanged",
            constraint.kind(),
            position + 1
        );
        Ok(self.clone())
    }

    /// Replace the text at `span` with `replacement`, shifting every tracked span that follows
    /// it. Returns where the replacement now lies.
    fn splice(&mut self, span: TextSpan, replacement: &str) -> Result<TextSpan, Error> {
        let patch = text::patch(&self.text, span, replacement)?;
        self.text = patch.text;
        self.for_each_index_mut(|index| index.shift(span, patch.delta));
        Ok(patch.span)
    }
}
