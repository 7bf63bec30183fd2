//! Loading problems from, and saving them to, their JSON documents.

use super::{
    Capabilities, Goal, Input, InputType, Number, NumberType, Objective, Parameter, Problem,
    Variable, RESERVED_NAMES,
};
use crate::{
    constraint::{
        Aggregation, Comparator, Comparison, Constraint, ConstraintKind, ConstraintNode,
        IndexRange, LoopBody,
    },
    env::Bound,
    error::Error,
    expr::Term,
    text::TextSpan,
};
use serde::Deserialize;
use std::{fs, path::Path};
use tracing::{debug, warn};

/// A field that may hold a single item or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

/// A number or the text of an expression.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Real(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTerm {
    Scalar(Scalar),
    Many(Vec<RawConstraint>),
    One(Box<RawConstraint>),
}

#[derive(Debug, Deserialize)]
struct RawProblem {
    language: Option<String>,
    text: Option<String>,
    objective: Option<RawObjective>,
    variable: Option<RawVariable>,
    constraint: Option<OneOrMany<RawConstraint>>,
    #[serde(default)]
    input: Vec<RawInput>,
    parameter: Option<OneOrMany<RawParameter>>,
}

#[derive(Debug, Deserialize)]
struct RawObjective {
    goal: Option<String>,
    #[serde(rename = "type")]
    ty: Option<String>,
    index: Option<(usize, usize)>,
}

#[derive(Debug, Deserialize)]
struct RawVariable {
    #[serde(alias = "count")]
    length: Option<Scalar>,
    #[serde(rename = "type")]
    ty: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawConstraint {
    #[serde(rename = "type")]
    kind: Option<String>,
    term: Option<RawTerm>,
    comp: Option<String>,
    rval: Option<Scalar>,
    range: Option<(Scalar, Scalar)>,
    loopvar: Option<String>,
    index: Option<(usize, usize)>,
}

#[derive(Debug, Deserialize)]
struct RawInput {
    name: Option<String>,
    #[serde(rename = "type")]
    ty: Option<String>,
    length: Option<Scalar>,
    comment: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawParameter {
    name: Option<String>,
    #[serde(rename = "type")]
    ty: Option<String>,
    range: Option<(Scalar, Scalar)>,
    value: Option<Scalar>,
    index: Option<(usize, usize)>,
}

impl Problem {
    /// Load a problem from the JSON document `src`.
    pub fn from_str(src: &str, capabilities: Capabilities) -> Result<Self, Error> {
        let document: serde_json::Value = serde_json::from_str(src)?;

        let mut ignored_paths = vec![];
        let raw: RawProblem = serde_ignored::deserialize(&document, |path| {
            ignored_paths.push(path.to_string());
        })?;
        for path in ignored_paths {
            warn!("ignoring unknown field `{path}`");
        }

        Loader {
            capabilities,
            text: String::new(),
        }
        .problem(raw, document)
    }

    /// Load a problem from the JSON document at `path`.
    pub fn from_path(path: &Path, capabilities: Capabilities) -> Result<Self, Error> {
        let src = fs::read_to_string(path).map_err(|error| Error::FileIO {
            error,
            file: path.to_path_buf(),
        })?;
        Self::from_str(&src, capabilities)
    }

    /// This problem as a JSON document. The statement, the objective and the parameters reflect
    /// any mutation applied since it was loaded; everything else is written back as it was read.
    pub fn to_json(&self) -> serde_json::Value {
        let mut document = self.document.clone();
        let Some(fields) = document.as_object_mut() else {
            return document;
        };

        fields.insert("text".into(), self.text.clone().into());
        let objective = fields
            .get_mut("objective")
            .and_then(|objective| objective.as_object_mut());
        if let Some(objective) = objective {
            objective.insert("goal".into(), self.objective.goal.as_str().into());
            objective.insert("index".into(), span_to_json(self.objective.index));
        }

        if let Some(parameters) = fields.get_mut("parameter") {
            for (raw, parameter) in items_mut(parameters).zip(&self.parameters) {
                if let Some(raw) = raw.as_object_mut() {
                    raw.insert("value".into(), parameter.value.into());
                    raw.insert("index".into(), span_to_json(parameter.index));
                }
            }
        }

        if let Some(constraints) = fields.get_mut("constraint") {
            for (raw, constraint) in items_mut(constraints).zip(&self.constraints) {
                constraint_to_json(raw, constraint);
            }
        }

        document
    }
}

fn span_to_json(span: TextSpan) -> serde_json::Value {
    serde_json::json!([span.start, span.end])
}

/// The items of a field holding one object or a list of them.
fn items_mut(
    value: &mut serde_json::Value,
) -> Box<dyn Iterator<Item = &mut serde_json::Value> + '_> {
    match value {
        serde_json::Value::Array(items) => Box::new(items.iter_mut()),
        item => Box::new(std::iter::once(item)),
    }
}

fn constraint_to_json(raw: &mut serde_json::Value, constraint: &Constraint) {
    let Some(fields) = raw.as_object_mut() else {
        return;
    };
    if let Some(index) = constraint.index {
        fields.insert("index".into(), span_to_json(index));
    }
    if let Some(term) = fields.get_mut("term").filter(|term| !term.is_string()) {
        for (raw, nested) in items_mut(term).zip(constraint.nested()) {
            constraint_to_json(raw, nested);
        }
    }
}

/// Validates raw documents and turns them into problems.
struct Loader {
    capabilities: Capabilities,
    /// The statement, once loaded, for validating text spans.
    text: String,
}

impl Loader {
    fn problem(mut self, raw: RawProblem, document: serde_json::Value) -> Result<Problem, Error> {
        let language = raw.language.unwrap_or_else(|| {
            debug!("no `language` given, using `zh`");
            "zh".to_string()
        });
        self.text = raw.text.ok_or_else(|| missing("text", "the problem"))?;

        let objective = raw
            .objective
            .ok_or_else(|| missing("objective", "the problem"))?;
        let objective = self.objective(objective)?;
        let variable = raw
            .variable
            .ok_or_else(|| missing("variable", "the problem"))?;
        let variable = self.variable(variable)?;

        let constraints = raw
            .constraint
            .map(OneOrMany::into_vec)
            .unwrap_or_default()
            .into_iter()
            .map(|raw| self.constraint(raw, &variable.count, 1))
            .collect::<Result<Vec<_>, _>>()?;

        let inputs = raw
            .input
            .into_iter()
            .map(|raw| self.input(raw))
            .collect::<Result<Vec<_>, _>>()?;

        let raw_parameters = raw.parameter.map(OneOrMany::into_vec).unwrap_or_default();
        if !raw_parameters.is_empty() && !self.capabilities.parameters {
            return Err(Error::schema("parameters are not supported"));
        }
        let parameters = raw_parameters
            .into_iter()
            .map(|raw| self.parameter(raw))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Problem {
            language,
            text: self.text,
            objective,
            variable,
            constraints,
            inputs,
            parameters,
            capabilities: self.capabilities,
            document,
        })
    }

    fn objective(&self, raw: RawObjective) -> Result<Objective, Error> {
        let goal = match raw.goal.as_deref() {
            None => {
                debug!("no `goal` given in objective, using `max`");
                Goal::Max
            }
            Some("max") => Goal::Max,
            Some("min") => Goal::Min,
            Some("exist") if self.capabilities.exist_goal => Goal::Exist,
            Some("exist") => return Err(Error::schema("the `exist` goal is not supported")),
            Some(goal) => {
                return Err(Error::schema(format!(
                    "illegal goal `{goal}`: expected `exist`, `min` or `max`"
                )))
            }
        };
        let ty = number_type(raw.ty.as_deref(), "objective")?;
        let index = self
            .span(raw.index, "objective")?
            .ok_or_else(|| missing("index", "objective"))?;
        Ok(Objective { goal, ty, index })
    }

    fn variable(&self, raw: RawVariable) -> Result<Variable, Error> {
        let count = bound(
            raw.length.ok_or_else(|| missing("length", "variable"))?,
            "variable length",
        )?;
        if let Bound::Literal(count @ ..=-1) = count {
            return Err(Error::schema(format!(
                "variable length must not be negative, found {count}"
            )));
        }
        Ok(Variable {
            count,
            ty: number_type(raw.ty.as_deref(), "variable")?,
        })
    }

    /// `upper` is the default exclusive upper bound of ranges and `depth` the nesting depth, used
    /// to name default loop variables.
    fn constraint(
        &self,
        raw: RawConstraint,
        upper: &Bound,
        depth: usize,
    ) -> Result<Constraint, Error> {
        let kind = match raw.kind.as_deref() {
            None => {
                debug!("no `type` given in constraint, using `single`");
                ConstraintKind::Single
            }
            Some(kind) => kind.parse()?,
        };
        if !self.capabilities.logical_combinators
            && matches!(kind, ConstraintKind::And | ConstraintKind::Or)
        {
            return Err(Error::IllegalConstraintType {
                kind: kind.to_string(),
            });
        }

        let comparison = match (raw.comp, raw.rval) {
            (Some(comp), Some(rval)) => Some(Comparison {
                comparator: comp.parse()?,
                rval: term(rval, "rval")?,
            }),
            (Some(comp), None) => {
                comp.parse::<Comparator>()?;
                None
            }
            _ => None,
        };

        let (range, loop_var) = if kind.is_ranged() {
            let range = match raw.range {
                Some((low, high)) => IndexRange {
                    low: bound(low, "range")?,
                    high: bound(high, "range")?,
                },
                None => {
                    let range = IndexRange {
                        low: Bound::Literal(0),
                        high: match upper {
                            Bound::Literal(upper) => Bound::Literal(upper.saturating_sub(1)),
                            Bound::Expr(upper) => Bound::Expr(format!("{upper}-1")),
                        },
                    };
                    debug!("no `range` given in {kind} constraint, using {range}");
                    range
                }
            };
            let loop_var = raw.loopvar.unwrap_or_else(|| {
                let loop_var = format!("i_{depth}");
                debug!("no `loopvar` given in {kind} constraint, using `{loop_var}`");
                loop_var
            });
            (range, loop_var)
        } else {
            (
                IndexRange {
                    low: Bound::Literal(0),
                    high: Bound::Literal(-1),
                },
                String::new(),
            )
        };

        let raw_term = raw.term.ok_or_else(|| missing("term", "constraint"))?;
        // Nested constraints range up to the enclosing loop variable by default.
        let nested_upper = match kind {
            ConstraintKind::Loop => Bound::Expr(loop_var.clone()),
            _ => upper.clone(),
        };
        let nested = |raw: Vec<RawConstraint>| {
            raw.into_iter()
                .map(|raw| self.constraint(raw, &nested_upper, depth + 1))
                .collect::<Result<Vec<_>, _>>()
        };

        let node = match (kind, raw_term) {
            (ConstraintKind::Single, RawTerm::Scalar(src)) => ConstraintNode::Single {
                term: term(src, "term")?,
                comparison,
            },
            (ConstraintKind::Loop, RawTerm::Scalar(src)) => ConstraintNode::Loop {
                range,
                loop_var,
                body: LoopBody::Term {
                    term: term(src, "term")?,
                    comparison,
                },
            },
            (ConstraintKind::Loop, RawTerm::Many(raw)) => ConstraintNode::Loop {
                range,
                loop_var,
                body: LoopBody::Nested(nested(raw)?),
            },
            (ConstraintKind::Loop, RawTerm::One(raw)) => ConstraintNode::Loop {
                range,
                loop_var,
                body: LoopBody::Nested(nested(vec![*raw])?),
            },
            (ConstraintKind::Sum | ConstraintKind::Product, RawTerm::Scalar(src)) => {
                let aggregation = Aggregation {
                    range,
                    loop_var,
                    term: term(src, "term")?,
                    comparison,
                };
                if kind == ConstraintKind::Sum {
                    ConstraintNode::Sum(aggregation)
                } else {
                    ConstraintNode::Product(aggregation)
                }
            }
            (ConstraintKind::And | ConstraintKind::Or, RawTerm::Many(raw)) if raw.is_empty() => {
                return Err(Error::schema(format!(
                    "`{kind}` constraint needs at least one nested constraint"
                )))
            }
            (ConstraintKind::And | ConstraintKind::Or, RawTerm::Many(raw)) => {
                let nested = nested(raw)?;
                if kind == ConstraintKind::And {
                    ConstraintNode::And(nested)
                } else {
                    ConstraintNode::Or(nested)
                }
            }
            (ConstraintKind::And | ConstraintKind::Or, RawTerm::One(raw)) => {
                let nested = nested(vec![*raw])?;
                if kind == ConstraintKind::And {
                    ConstraintNode::And(nested)
                } else {
                    ConstraintNode::Or(nested)
                }
            }
            (_, RawTerm::Scalar(_)) => {
                return Err(Error::schema(format!(
                    "the term of `{kind}` constraint must be a list of constraints"
                )))
            }
            (_, _) => {
                return Err(Error::schema(format!(
                    "the term of `{kind}` constraint must be an expression"
                )))
            }
        };

        Ok(Constraint {
            node,
            index: self.span(raw.index, "constraint")?,
        })
    }

    fn input(&self, raw: RawInput) -> Result<Input, Error> {
        let name = raw.name.ok_or_else(|| missing("name", "input"))?;
        check_name(&name)?;
        let ty = match raw.ty.as_deref() {
            None => {
                debug!("no `type` given for input `{name}`, using `int`");
                InputType::Int
            }
            Some("int") => InputType::Int,
            Some("real") => InputType::Real,
            Some("intarray") => InputType::IntArray,
            Some("realarray") => InputType::RealArray,
            Some(ty) => {
                return Err(Error::schema(format!(
                    "illegal type `{ty}` for input `{name}`: \
                     expected `int`, `real`, `intarray` or `realarray`"
                )))
            }
        };
        let length = match raw.length {
            Some(length) if ty.is_array() => Some(bound(length, "input length")?),
            None if ty.is_array() => return Err(missing("length", &format!("input `{name}`"))),
            _ => None,
        };
        Ok(Input {
            name,
            ty,
            length,
            comment: raw.comment,
        })
    }

    fn parameter(&self, raw: RawParameter) -> Result<Parameter, Error> {
        let name = raw.name.ok_or_else(|| missing("name", "parameter"))?;
        check_name(&name)?;
        let owner = format!("parameter `{name}`");
        let ty = number_type(raw.ty.as_deref(), &owner)?;
        let (low, high) = raw.range.ok_or_else(|| missing("range", &owner))?;
        let (low, high) = (number(low, &owner)?, number(high, &owner)?);
        let value = number(raw.value.ok_or_else(|| missing("value", &owner))?, &owner)?;
        if !(low.as_f64() <= value.as_f64() && value.as_f64() <= high.as_f64()) {
            return Err(Error::schema(format!(
                "value {value} of {owner} lies outside its range [{low}, {high}]"
            )));
        }
        let index = self
            .span(raw.index, &owner)?
            .ok_or_else(|| missing("index", &owner))?;
        Ok(Parameter {
            name,
            ty,
            low,
            high,
            value,
            index,
        })
    }

    fn span(&self, raw: Option<(usize, usize)>, owner: &str) -> Result<Option<TextSpan>, Error> {
        raw.map(|(start, end)| {
            let span = TextSpan::new(start, end);
            span.validate(&self.text, owner).map(|_| span)
        })
        .transpose()
    }
}

fn missing(field: &str, owner: &str) -> Error {
    Error::schema(format!("missing `{field}` in {owner}"))
}

fn check_name(name: &str) -> Result<(), Error> {
    if RESERVED_NAMES.contains(&name) {
        return Err(Error::schema(format!("illegal name: `{name}` is reserved")));
    }
    Ok(())
}

fn number_type(raw: Option<&str>, owner: &str) -> Result<NumberType, Error> {
    match raw {
        None => {
            debug!("no `type` given in {owner}, using `int`");
            Ok(NumberType::Int)
        }
        Some("int") => Ok(NumberType::Int),
        Some("real") => Ok(NumberType::Real),
        Some(ty) => Err(Error::schema(format!(
            "illegal type `{ty}` in {owner}: expected `int` or `real`"
        ))),
    }
}

fn bound(raw: Scalar, owner: &str) -> Result<Bound, Error> {
    match raw {
        Scalar::Int(val) => Ok(Bound::Literal(val)),
        Scalar::Text(src) => Ok(Bound::Expr(src)),
        Scalar::Real(val) => Err(Error::schema(format!(
            "{owner} must be an integer or an expression, found {val:?}"
        ))),
    }
}

fn number(raw: Scalar, owner: &str) -> Result<Number, Error> {
    match raw {
        Scalar::Int(val) => Ok(Number::Int(val)),
        Scalar::Real(val) => Ok(Number::Real(val)),
        Scalar::Text(src) => Err(Error::schema(format!(
            "{owner} must be a number, found `{src}`"
        ))),
    }
}

fn term(raw: Scalar, field: &str) -> Result<Term, Error> {
    let src = match raw {
        Scalar::Int(val) => val.to_string(),
        Scalar::Real(val) => format!("{val:?}"),
        Scalar::Text(src) => src,
    };
    debug!("parsing {field} `{src}`");
    Ok(Term::parse(&src)?)
}
