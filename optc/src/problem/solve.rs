use super::{Goal, InputSource, Number, Problem};
use crate::{
    constraint::{CompileStats, Compiler},
    env::Env,
    error::Error,
    value::{Builtin, Value},
};
use opt_solve::{flatopt::Immediate, Backend, Sense, Solution, SolveError, Status};
use std::{
    fmt,
    time::{Duration, Instant},
};
use tracing::debug;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SolveOptions {
    /// Compile the constraints and hand them to the backend, but do not solve.
    pub compile_only: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SolveResult {
    /// An `exist` problem has a solution.
    Satisfiable,
    /// No assignment satisfies the constraints.
    Unsatisfiable,
    /// The optimal value of the objective.
    Optimum(Immediate),
    /// The objective can be improved without limit.
    Unbounded,
    /// Nothing was solved because only compilation was requested.
    NotSolved,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Statistics {
    pub unit_count: usize,
    pub constraint_count: usize,
    pub compile_time: Duration,
    /// `None` when only compiling.
    pub solve_time: Option<Duration>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SolveOutcome {
    pub result: SolveResult,
    /// The solution found, for satisfiable and optimal results.
    pub model: Option<Solution>,
    pub statistics: Statistics,
}

impl Problem {
    /// The environment terms are evaluated against: the inputs read from `source`, the parameter
    /// values, the decision vector `x` of `len` elements, the objective handle `y` and, if
    /// enabled, the `And`, `Or` and `If` functions.
    fn environment(&self, source: &mut dyn InputSource) -> Result<(Env, usize), Error> {
        let mut env = self.resolve_inputs(source)?;
        for parameter in &self.parameters {
            let value = match parameter.value {
                Number::Int(val) => Value::Int(val),
                Number::Real(val) => Value::Real(val),
            };
            env.bind(&parameter.name, value)?;
        }

        let count =
            env.resolve_number(&self.variable.count, self.capabilities.arithmetic_bounds)?;
        let len = usize::try_from(count).map_err(|_| {
            Error::schema(format!(
                "variable length `{}` must not be negative, found {count}",
                self.variable.count
            ))
        })?;

        env.bind("x", Value::Decision { len })?;
        env.bind("y", Value::objective())?;
        if self.capabilities.logical_combinators {
            for builtin in Builtin::ALL {
                env.bind(builtin.name(), Value::Builtin(builtin))?;
            }
        }
        Ok((env, len))
    }

    /// Compile this problem into `backend` and, unless `options` say otherwise, solve it.
    ///
    /// Either every constraint reaches the backend or, when any of them fails to compile, none
    /// does.
    pub fn solve(
        &self,
        source: &mut dyn InputSource,
        backend: &mut dyn Backend,
        options: SolveOptions,
    ) -> Result<SolveOutcome, Error> {
        let (mut env, len) = self.environment(source)?;

        backend.declare(self.variable.ty.to_flat(), len, self.objective.ty.to_flat())?;
        if !options.compile_only {
            match self.objective.goal {
                Goal::Max => backend.optimize(Sense::Maximize),
                Goal::Min => backend.optimize(Sense::Minimize),
                Goal::Exist => {}
            }
        }

        let start = Instant::now();
        let mut compiler = Compiler::new(&mut env, self.capabilities.arithmetic_bounds);
        for constraint in &self.constraints {
            compiler.compile(constraint)?;
        }
        let (predicates, CompileStats {
            unit_count,
            constraint_count,
        }) = compiler.finish();
        for predicate in predicates {
            debug!("adding constraint: {predicate}");
            backend.add_constraint(predicate)?;
        }
        let compile_time = start.elapsed();

        let mut statistics = Statistics {
            unit_count,
            constraint_count,
            compile_time,
            solve_time: None,
        };
        if options.compile_only {
            return Ok(SolveOutcome {
                result: SolveResult::NotSolved,
                model: None,
                statistics,
            });
        }

        let start = Instant::now();
        let status = backend.check()?;
        statistics.solve_time = Some(start.elapsed());

        let (result, model) = match status {
            Status::Unsat => (SolveResult::Unsatisfiable, None),
            Status::Unbounded => (SolveResult::Unbounded, None),
            Status::Sat => {
                let model = backend.model().cloned().ok_or(SolveError::Internal {
                    msg: "backend reported a solution without a model",
                })?;
                let result = match self.objective.goal {
                    Goal::Exist => SolveResult::Satisfiable,
                    Goal::Min | Goal::Max => SolveResult::Optimum(model.objective),
                };
                (result, Some(model))
            }
        };
        Ok(SolveOutcome {
            result,
            model,
            statistics,
        })
    }
}

impl fmt::Display for SolveResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SolveResult::Satisfiable => write!(f, "satisfiable"),
            SolveResult::Unsatisfiable => write!(f, "unsatisfiable"),
            SolveResult::Optimum(value) => write!(f, "optimum: {value}"),
            SolveResult::Unbounded => write!(f, "unbounded"),
            SolveResult::NotSolved => write!(f, "not solved"),
        }
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "constraints: {}", self.constraint_count)?;
        writeln!(f, "units: {}", self.unit_count)?;
        writeln!(f, "compile time: {:?}", self.compile_time)?;
        match self.solve_time {
            Some(solve_time) => write!(f, "solve time: {solve_time:?}"),
            None => write!(f, "solve time: -"),
        }
    }
}
