//! A dependency-free reference backend: depth-first backtracking over a bounded integer domain.
//!
//! Variables are assigned in the order `x[0], x[1], ..., x[n-1], y`. Every constraint is
//! checked as soon as the last variable it mentions has been assigned, so infeasible prefixes
//! are cut early. The objective handle is enumerated from the preferred end of the domain, so
//! the first feasible value found for a prefix is the best one for that prefix, and only values
//! improving on the incumbent are tried afterwards.
//!
//! The search is complete with respect to the configured domain: `Unsat` means "no solution with
//! every variable inside `lower..=upper`". An optimum is only reported when it is not an artifact
//! of the domain: an objective that no constraint mentions is `Unbounded`, and when the incumbent
//! touches either end of the domain the search is repeated over a domain one wider on each side.
//! Finding a strictly better objective there is a [`SolveError::OptimumOutsideDomain`].


use crate::{
    backend::{Backend, Sense, Solution, Status},
    error::SolveError,
    flatopt::{evaluate::holds, Expr, Immediate, Type, Var},
};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    /// Smallest value any variable may take.
    pub lower: i64,
    /// Largest value any variable may take.
    pub upper: i64,
    /// Maximum number of partial assignments tried before giving up.
    pub node_limit: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            lower: -10,
            upper: 10,
            node_limit: 10_000_000,
        }
    }
}

#[derive(Debug)]
struct Declaration {
    len: usize,
    decision: Type,
    objective: Type,
}

#[derive(Debug, Default)]
pub struct Search {
    config: SearchConfig,
    declaration: Option<Declaration>,
    constraints: Vec<Expr>,
    sense: Option<Sense>,
    solution: Option<Solution>,
}

struct SearchState {
    nodes: u64,
    lower: i64,
    upper: i64,
    assignment: Solution,
    best: Option<Solution>,
    /// Stop at the first solution improving on `best`, even when optimizing.
    first_improvement: bool,
}

impl Search {
    pub fn new(config: SearchConfig) -> Self {
        Search {
            config,
            ..Default::default()
        }
    }

    /// All constraints added so far, in the order they were added.
    pub fn constraints(&self) -> &[Expr] {
        &self.constraints
    }

    /// Verify that `solution` satisfies every constraint added to this backend. This is mostly
    /// useful for testing purposes.
    pub fn verify(&self, solution: &Solution) -> bool {
        self.constraints
            .iter()
            .all(|constraint| holds(constraint, solution).unwrap_or(false))
    }

    /// The position of `var` in the assignment order.
    fn position(len: usize, var: Var) -> usize {
        match var {
            Var::Decision(idx) => idx,
            Var::Objective => len,
        }
    }

    fn descend(
        &self,
        pos: usize,
        by_position: &[Vec<&Expr>],
        state: &mut SearchState,
    ) -> Result<bool, SolveError> {
        let len = by_position.len() - 1;
        let is_objective = pos == len;

        let (mut lower, mut upper) = (state.lower, state.upper);
        let descending = is_objective && self.sense == Some(Sense::Maximize);
        if is_objective {
            // Only values that improve on the incumbent are worth trying.
            match (self.sense, state.best.as_ref().map(|best| best.objective)) {
                (Some(Sense::Maximize), Some(Immediate::Int(best))) => {
                    lower = lower.max(best.saturating_add(1))
                }
                (Some(Sense::Minimize), Some(Immediate::Int(best))) => {
                    upper = upper.min(best.saturating_sub(1))
                }
                _ => {}
            }
        }

        if lower > upper {
            return Ok(false);
        }

        for step in 0..=upper.saturating_sub(lower) {
            let value = if descending {
                upper - step
            } else {
                lower + step
            };

            state.nodes += 1;
            if state.nodes > self.config.node_limit {
                return Err(SolveError::NodeLimit {
                    limit: self.config.node_limit,
                });
            }

            if is_objective {
                state.assignment.objective = Immediate::Int(value);
            } else {
                state.assignment.decision[pos] = Immediate::Int(value);
            }

            // Constraints that fail to evaluate (e.g. a division by zero under this assignment)
            // are treated as violated.
            if !by_position[pos]
                .iter()
                .all(|constraint| holds(constraint, &state.assignment).unwrap_or(false))
            {
                continue;
            }

            if is_objective {
                state.best = Some(state.assignment.clone());
                // The first feasible objective value is the best one for this prefix. When only
                // checking satisfiability, any solution will do.
                return Ok(self.sense.is_none() || state.first_improvement);
            }

            if self.descend(pos + 1, by_position, state)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Whether any value of `solution` sits at either end of the domain.
    fn touches_edge(&self, solution: &Solution) -> bool {
        let SearchConfig { lower, upper, .. } = self.config;
        solution
            .decision
            .iter()
            .chain([&solution.objective])
            .any(|value| matches!(value, Immediate::Int(v) if *v == lower || *v == upper))
    }

    /// Search a domain one wider on each side for an objective strictly better than the one of
    /// `incumbent`. Returns the better objective value, if any.
    fn improve_beyond_domain(
        &self,
        by_position: &[Vec<&Expr>],
        incumbent: &Solution,
        nodes: u64,
    ) -> Result<Option<Immediate>, SolveError> {
        let mut state = SearchState {
            nodes,
            lower: self.config.lower.saturating_sub(1),
            upper: self.config.upper.saturating_add(1),
            assignment: incumbent.clone(),
            best: Some(incumbent.clone()),
            first_improvement: true,
        };
        if !self.descend(0, by_position, &mut state)? {
            return Ok(None);
        }
        Ok(state.best.map(|best| best.objective))
    }
}

impl Backend for Search {
    fn declare(&mut self, decision: Type, len: usize, objective: Type) -> Result<(), SolveError> {
        self.declaration = Some(Declaration {
            len,
            decision,
            objective,
        });
        Ok(())
    }

    fn add_constraint(&mut self, constraint: Expr) -> Result<(), SolveError> {
        let Some(declaration) = &self.declaration else {
            return Err(SolveError::Undeclared {
                action: "adding constraints",
            });
        };

        let mut out_of_range = false;
        constraint.for_each_var(&mut |var| {
            out_of_range |= matches!(var, Var::Decision(idx) if idx >= declaration.len)
        });
        if out_of_range {
            return Err(SolveError::Internal {
                msg: "constraint refers to an element outside the decision vector",
            });
        }

        self.constraints.push(constraint);
        Ok(())
    }

    fn optimize(&mut self, sense: Sense) {
        self.sense = Some(sense);
    }

    fn check(&mut self) -> Result<Status, SolveError> {
        let Some(declaration) = &self.declaration else {
            return Err(SolveError::Undeclared { action: "checking" });
        };
        for ty in [declaration.decision, declaration.objective] {
            if ty != Type::Int {
                return Err(SolveError::UnsupportedType { ty });
            }
        }
        let SearchConfig { lower, upper, .. } = self.config;
        if lower > upper {
            return Err(SolveError::EmptyDomain { lower, upper });
        }

        let len = declaration.len;
        let mut state = SearchState {
            nodes: 0,
            lower,
            upper,
            assignment: Solution {
                decision: vec![Immediate::Int(lower); len],
                objective: Immediate::Int(lower),
            },
            best: None,
            first_improvement: false,
        };

        // Bucket every constraint by the last variable it mentions. Constraints without
        // variables are decided right away.
        let mut by_position: Vec<Vec<&Expr>> = vec![Vec::new(); len + 1];
        let mut objective_free = true;
        for constraint in &self.constraints {
            let mut last = None;
            constraint.for_each_var(&mut |var| {
                objective_free &= var != Var::Objective;
                let pos = Self::position(len, var);
                last = Some(last.map_or(pos, |last: usize| last.max(pos)));
            });
            match last {
                Some(pos) => by_position[pos].push(constraint),
                None => {
                    if !holds(constraint, &state.assignment).unwrap_or(false) {
                        debug!("constant constraint `{constraint}` is false");
                        self.solution = None;
                        return Ok(Status::Unsat);
                    }
                }
            }
        }

        self.descend(0, &by_position, &mut state)?;
        debug!("search visited {} nodes", state.nodes);

        self.solution = None;
        let Some(best) = state.best else {
            return Ok(Status::Unsat);
        };
        if self.sense.is_some() {
            if objective_free {
                return Ok(Status::Unbounded);
            }
            let better = if self.touches_edge(&best) {
                self.improve_beyond_domain(&by_position, &best, state.nodes)?
            } else {
                None
            };
            if let Some(better) = better {
                debug!("objective {better} improves on {} outside the domain", best.objective);
                return Err(SolveError::OptimumOutsideDomain {
                    value: best.objective,
                    lower,
                    upper,
                });
            }
        }
        self.solution = Some(best);
        Ok(Status::Sat)
    }

    fn model(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }
}
