//! A [`Backend`] on top of SCIP. Every sub-expression is lowered to an auxiliary SCIP variable
//! tied to its operands with linear, quadratic or indicator constraints. Boolean
//! sub-expressions become binary variables that *imply* the relation they stand for, which is
//! sound because negations are pushed down to comparisons before lowering.

mod constraint;
mod variable;

use crate::{
    backend::{Backend, Sense, Solution},
    error::SolveError,
    flatopt::{Expr, Immediate, Type},
};
use russcip::{prelude::*, ProblemCreated, Variable};
use std::rc::Rc;

pub struct Scip {
    model: Option<Model<ProblemCreated>>,
    decision: Vec<Rc<Variable>>,
    decision_ty: Type,
    objective: Option<Rc<Variable>>,
    objective_ty: Type,
    sense: Option<Sense>,
    solution: Option<Solution>,
    unique_var_suffix: usize, // unique suffix for variables introduced by the solver
    unique_cons_suffix: usize, // unique suffix for names of constraints
}

impl Default for Scip {
    fn default() -> Self {
        Self::new()
    }
}

impl Scip {
    pub fn new() -> Self {
        Scip {
            model: Some(
                Model::new()
                    .hide_output()
                    .include_default_plugins()
                    .create_prob("optc"),
            ),
            decision: Vec::new(),
            decision_ty: Type::Int,
            objective: None,
            objective_ty: Type::Int,
            sense: None,
            solution: None,
            unique_var_suffix: 0,
            unique_cons_suffix: 0,
        }
    }

    fn problem(&mut self) -> Result<&mut Model<ProblemCreated>, SolveError> {
        self.model.as_mut().ok_or(SolveError::Internal {
            msg: "(scip) the problem has already been solved",
        })
    }

    fn new_var_name(&mut self) -> String {
        let new_name = format!("INTRODUCED{}", self.unique_var_suffix);
        self.unique_var_suffix += 1;
        new_name
    }

    fn new_cons_name(&mut self) -> String {
        let new_name = format!("CONS{}", self.unique_cons_suffix);
        self.unique_cons_suffix += 1;
        new_name
    }

    fn var_type(ty: Type) -> VarType {
        match ty {
            Type::Int => VarType::Integer,
            Type::Real => VarType::Continuous,
        }
    }

    /// The objective handle is created on first use so that its objective coefficient reflects
    /// whether the session optimizes at all.
    fn objective_var(&mut self) -> Result<Rc<Variable>, SolveError> {
        if let Some(var) = &self.objective {
            return Ok(var.clone());
        }
        let coefficient = if self.sense.is_some() { 1. } else { 0. };
        let ty = Self::var_type(self.objective_ty);
        let var = self
            .problem()?
            .add_var(-f64::INFINITY, f64::INFINITY, coefficient, "y", ty);
        self.objective = Some(var.clone());
        Ok(var)
    }

    fn immediate(value: f64, ty: Type) -> Immediate {
        match ty {
            Type::Int => Immediate::Int(value.round() as i64),
            Type::Real => Immediate::Real(value),
        }
    }
}

impl Backend for Scip {
    fn declare(&mut self, decision: Type, len: usize, objective: Type) -> Result<(), SolveError> {
        self.decision_ty = decision;
        self.objective_ty = objective;
        let ty = Self::var_type(decision);
        let mut vars = Vec::with_capacity(len);
        for idx in 0..len {
            let name = format!("x{idx}");
            vars.push(
                self.problem()?
                    .add_var(-f64::INFINITY, f64::INFINITY, 0., &name, ty),
            );
        }
        self.decision = vars;
        Ok(())
    }

    fn add_constraint(&mut self, constraint: Expr) -> Result<(), SolveError> {
        self.convert_constraint(&constraint)
    }

    fn optimize(&mut self, sense: Sense) {
        self.sense = Some(sense);
        self.model = self.model.take().map(|model| {
            model.set_obj_sense(match sense {
                Sense::Minimize => ObjSense::Minimize,
                Sense::Maximize => ObjSense::Maximize,
            })
        });
    }

    fn check(&mut self) -> Result<crate::Status, SolveError> {
        let objective = self.objective_var()?;
        let model = self.model.take().ok_or(SolveError::Internal {
            msg: "(scip) the problem has already been solved",
        })?;
        let solved = model.solve();

        match solved.status() {
            Status::Optimal => {
                let sol = solved.best_sol().ok_or(SolveError::Internal {
                    msg: "(scip) optimal status without a solution",
                })?;
                self.solution = Some(Solution {
                    decision: self
                        .decision
                        .iter()
                        .map(|var| Self::immediate(sol.val(var.clone()), self.decision_ty))
                        .collect(),
                    objective: Self::immediate(sol.val(objective), self.objective_ty),
                });
                Ok(crate::Status::Sat)
            }
            Status::Infeasible => Ok(crate::Status::Unsat),
            Status::Unbounded => Ok(crate::Status::Unbounded),
            _ => Err(SolveError::Internal {
                msg: "(scip) solving stopped without a conclusive status",
            }),
        }
    }

    fn model(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }
}
