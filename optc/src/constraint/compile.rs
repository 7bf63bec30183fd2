use super::{Aggregation, Comparison, Constraint, ConstraintNode, IndexRange, LoopBody};
use crate::{
    env::Env,
    error::{Error, ExprError, ExprErrorKind},
    expr::{evaluate::binary, BinaryOp, Term},
    span::Spanned,
    value::Value,
};
use opt_solve::flatopt;
use std::mem;

/// Counters describing how much work lowering the constraint tree took.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompileStats {
    /// Number of term evaluations: one per `single` or loop iteration, one per aggregated
    /// element.
    pub unit_count: usize,
    /// Number of predicates handed to the backend.
    pub constraint_count: usize,
}

/// Lowers constraint trees into solver predicates against an environment.
///
/// Predicates of top level constraints are staged rather than handed out immediately, so that a
/// failure in any constraint leaves nothing half-submitted. Call [`Compiler::finish`] once every
/// constraint compiled to collect them.
pub struct Compiler<'a> {
    env: &'a mut Env,
    arithmetic_bounds: bool,
    unit_count: usize,
    staged: Vec<flatopt::Expr>,
}

impl<'a> Compiler<'a> {
    /// Compile against `env`. With `arithmetic_bounds` unset, range bounds must be literals or
    /// names.
    pub fn new(env: &'a mut Env, arithmetic_bounds: bool) -> Self {
        Compiler {
            env,
            arithmetic_bounds,
            unit_count: 0,
            staged: Vec::new(),
        }
    }

    /// Compile a top level constraint.
    pub fn compile(&mut self, constraint: &Constraint) -> Result<(), Error> {
        let mut staged = mem::take(&mut self.staged);
        let result = self.lower(constraint, &mut staged);
        self.staged = staged;
        result
    }

    /// The predicates to submit, in order, and the statistics of the whole compilation.
    pub fn finish(self) -> (Vec<flatopt::Expr>, CompileStats) {
        let stats = CompileStats {
            unit_count: self.unit_count,
            constraint_count: self.staged.len(),
        };
        (self.staged, stats)
    }

    fn lower(
        &mut self,
        constraint: &Constraint,
        out: &mut Vec<flatopt::Expr>,
    ) -> Result<(), Error> {
        match &constraint.node {
            ConstraintNode::Single { term, comparison } => {
                out.push(self.lower_term(term, comparison.as_ref())?);
                Ok(())
            }

            ConstraintNode::Loop {
                range,
                loop_var,
                body,
            } => self.for_each_index(range, loop_var, |compiler| match body {
                LoopBody::Term { term, comparison } => {
                    out.push(compiler.lower_term(term, comparison.as_ref())?);
                    Ok(())
                }
                LoopBody::Nested(nested) => nested
                    .iter()
                    .try_for_each(|constraint| compiler.lower(constraint, out)),
            }),

            ConstraintNode::Sum(aggregation) => {
                out.push(self.lower_aggregation(aggregation, BinaryOp::Add)?);
                Ok(())
            }

            ConstraintNode::Product(aggregation) => {
                out.push(self.lower_aggregation(aggregation, BinaryOp::Mul)?);
                Ok(())
            }

            ConstraintNode::And(nested) => self.lower_logical(nested, flatopt::LogicalOp::And, out),
            ConstraintNode::Or(nested) => self.lower_logical(nested, flatopt::LogicalOp::Or, out),
        }
    }

    fn lower_logical(
        &mut self,
        nested: &[Constraint],
        op: flatopt::LogicalOp,
        out: &mut Vec<flatopt::Expr>,
    ) -> Result<(), Error> {
        let mut operands = Vec::with_capacity(nested.len());
        for constraint in nested {
            self.lower(constraint, &mut operands)?;
        }
        out.push(flatopt::Expr::logical(op, operands));
        Ok(())
    }

    /// Evaluate `term` once, counting it as a single unit.
    fn lower_term(
        &mut self,
        term: &Term,
        comparison: Option<&Comparison>,
    ) -> Result<flatopt::Expr, Error> {
        let value = term.evaluate(self.env)?;
        self.unit_count += 1;
        self.to_predicate(term, value, comparison)
    }

    fn lower_aggregation(
        &mut self,
        aggregation: &Aggregation,
        op: BinaryOp,
    ) -> Result<flatopt::Expr, Error> {
        let Aggregation {
            range,
            loop_var,
            term,
            comparison,
        } = aggregation;

        let mut acc: Option<Value> = None;
        self.for_each_index(range, loop_var, |compiler| {
            let element = term.evaluate(compiler.env)?;
            if element.to_term().is_none() {
                return Err(at_term(term, ExprErrorKind::NotAScalar {
                    kind: element.kind(),
                }));
            }
            compiler.unit_count += 1;
            acc = Some(match acc.take() {
                None => element,
                Some(acc) => binary(op, &acc, &element).map_err(|kind| at_term(term, kind))?,
            });
            Ok(())
        })?;

        let total = acc.unwrap_or(match op {
            BinaryOp::Mul => Value::Int(1),
            _ => Value::Int(0),
        });
        self.to_predicate(term, total, comparison.as_ref())
    }

    /// Apply the optional comparison to `value`, which must then be a predicate.
    fn to_predicate(
        &self,
        term: &Term,
        value: Value,
        comparison: Option<&Comparison>,
    ) -> Result<flatopt::Expr, Error> {
        let value = match comparison {
            Some(Comparison { comparator, rval }) => {
                let rhs = rval.evaluate(self.env)?;
                binary(comparator.op(), &value, &rhs).map_err(|kind| at_term(rval, kind))?
            }
            None => value,
        };
        value.to_predicate().ok_or_else(|| {
            at_term(term, ExprErrorKind::NotAPredicate {
                kind: value.kind(),
            })
        })
    }

    /// Run `f` once for every value of `loop_var` in `range`, in ascending order. The loop
    /// variable must not be bound on entry and is unbound again on exit, whatever `f` returns.
    fn for_each_index(
        &mut self,
        range: &IndexRange,
        loop_var: &str,
        mut f: impl FnMut(&mut Self) -> Result<(), Error>,
    ) -> Result<(), Error> {
        let low = self.env.resolve_number(&range.low, self.arithmetic_bounds)?;
        let high = self.env.resolve_number(&range.high, self.arithmetic_bounds)?;

        self.env.bind(loop_var, Value::Int(low))?;
        let result = (low..=high).try_for_each(|idx| {
            self.env.set(loop_var, Value::Int(idx));
            f(self)
        });
        self.env.unbind(loop_var);
        result
    }
}

fn at_term(term: &Term, kind: ExprErrorKind) -> Error {
    Error::from(ExprError {
        kind,
        span: term.expr().span().clone(),
    })
}
