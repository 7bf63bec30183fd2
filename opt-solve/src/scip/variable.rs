use super::Scip;
use crate::{
    error::SolveError,
    flatopt::{BinaryOp, Expr, Immediate, LogicalOp, UnaryOp, Var},
};
use russcip::{prelude::*, Variable};
use std::rc::Rc;

/// Gap used to turn strict comparisons over continuous values into non-strict ones.
const STRICT_GAP: f64 = 1e-4;

fn is_integral(var: &Rc<Variable>) -> bool {
    var.var_type() != VarType::Continuous
}

impl Scip {
    pub(super) fn new_binary(&mut self) -> Result<Rc<Variable>, SolveError> {
        let name = self.new_var_name();
        Ok(self.problem()?.add_var(0., 1., 0., &name, VarType::Binary))
    }

    fn new_free(&mut self, ty: VarType) -> Result<Rc<Variable>, SolveError> {
        let name = self.new_var_name();
        Ok(self
            .problem()?
            .add_var(-f64::INFINITY, f64::INFINITY, 0., &name, ty))
    }

    /// Require `sum(coefs[i] * vars[i]) <= rhs` whenever `bin` is 1.
    pub(super) fn imply(
        &mut self,
        bin: &Rc<Variable>,
        vars: Vec<Rc<Variable>>,
        mut coefs: Vec<f64>,
        rhs: f64,
    ) -> Result<(), SolveError> {
        let name = self.new_cons_name();
        self.problem()?
            .add_cons_indicator(bin.clone(), vars, &mut coefs, rhs, &name);
        Ok(())
    }

    /// Require `lhs <= sum(coefs[i] * vars[i]) <= rhs`.
    pub(super) fn linear(
        &mut self,
        vars: Vec<Rc<Variable>>,
        coefs: &[f64],
        lhs: f64,
        rhs: f64,
    ) -> Result<(), SolveError> {
        let name = self.new_cons_name();
        self.problem()?.add_cons(vars, coefs, lhs, rhs, &name);
        Ok(())
    }

    /// A binary variable that, when 1, forces `lhs op rhs` to hold.
    pub(super) fn reify_comparison(
        &mut self,
        op: BinaryOp,
        lhs: Rc<Variable>,
        rhs: Rc<Variable>,
    ) -> Result<Rc<Variable>, SolveError> {
        let bin = self.new_binary()?;
        let gap = if is_integral(&lhs) && is_integral(&rhs) {
            1.
        } else {
            STRICT_GAP
        };
        let both = || vec![lhs.clone(), rhs.clone()];
        match op {
            BinaryOp::Equal => {
                self.imply(&bin, both(), vec![1., -1.], 0.)?;
                self.imply(&bin, both(), vec![-1., 1.], 0.)?;
            }
            BinaryOp::LessThanOrEqual => self.imply(&bin, both(), vec![1., -1.], 0.)?,
            BinaryOp::GreaterThanOrEqual => self.imply(&bin, both(), vec![-1., 1.], 0.)?,
            BinaryOp::LessThan => self.imply(&bin, both(), vec![1., -1.], -gap)?,
            BinaryOp::GreaterThan => self.imply(&bin, both(), vec![-1., 1.], -gap)?,
            BinaryOp::NotEqual => {
                // Either side is strictly smaller than the other.
                let below = self.reify_comparison(BinaryOp::LessThan, lhs.clone(), rhs.clone())?;
                let above = self.reify_comparison(BinaryOp::GreaterThan, lhs, rhs)?;
                self.imply(&bin, vec![below, above], vec![-1., -1.], -1.)?;
            }
            _ => {
                return Err(SolveError::Internal {
                    msg: "(scip) arithmetic operator used as a comparison",
                })
            }
        }
        Ok(bin)
    }

    /// A binary variable that, when 1, forces all (`And`) or at least one (`Or`) of `args` to
    /// hold.
    pub(super) fn reify_logical(
        &mut self,
        op: LogicalOp,
        args: &[Expr],
    ) -> Result<Rc<Variable>, SolveError> {
        let vars = args
            .iter()
            .map(|arg| self.expr_to_var(arg))
            .collect::<Result<Vec<_>, _>>()?;
        let bin = self.new_binary()?;
        let needed = match op {
            LogicalOp::And => vars.len() as f64,
            LogicalOp::Or => 1.,
        };
        let coefs = vec![-1.; vars.len()];
        self.imply(&bin, vars, coefs, -needed)?;
        Ok(bin)
    }

    /// Lower `expr` to a single SCIP variable, introducing auxiliary variables and constraints
    /// as needed.
    pub(super) fn expr_to_var(&mut self, expr: &Expr) -> Result<Rc<Variable>, SolveError> {
        match expr {
            Expr::Immediate(imm) => {
                let value = imm.as_f64();
                let name = self.new_var_name();
                let ty = match imm {
                    Immediate::Bool(_) => VarType::Binary,
                    Immediate::Int(_) => VarType::Integer,
                    Immediate::Real(_) => VarType::Continuous,
                };
                Ok(self.problem()?.add_var(value, value, 0., &name, ty))
            }

            Expr::Var(Var::Decision(idx)) => {
                self.decision
                    .get(*idx)
                    .cloned()
                    .ok_or(SolveError::Internal {
                        msg: "(scip) constraint refers to an element outside the decision vector",
                    })
            }
            Expr::Var(Var::Objective) => self.objective_var(),

            Expr::UnaryOp {
                op: UnaryOp::Neg,
                expr,
            } => {
                let operand = self.expr_to_var(expr)?;
                let ty = operand.var_type();
                let negated = self.new_free(if ty == VarType::Binary {
                    VarType::Integer
                } else {
                    ty
                })?;
                self.linear(vec![negated.clone(), operand], &[1., 1.], 0., 0.)?;
                Ok(negated)
            }
            Expr::UnaryOp {
                op: UnaryOp::Not,
                expr,
            } => {
                let inverted = Self::invert(expr)?;
                self.expr_to_var(&inverted)
            }

            Expr::BinaryOp { op, lhs, rhs } => {
                let lhs = self.expr_to_var(lhs)?;
                let rhs = self.expr_to_var(rhs)?;
                if op.is_comparison() {
                    return self.reify_comparison(*op, lhs, rhs);
                }

                let ty = if *op != BinaryOp::Div && is_integral(&lhs) && is_integral(&rhs) {
                    VarType::Integer
                } else {
                    VarType::Continuous
                };
                let result = self.new_free(ty)?;
                let name = self.new_cons_name();
                match op {
                    // result - lhs - rhs == 0
                    BinaryOp::Add => self.linear(
                        vec![result.clone(), lhs, rhs],
                        &[1., -1., -1.],
                        0.,
                        0.,
                    )?,
                    // result - lhs + rhs == 0
                    BinaryOp::Sub => self.linear(
                        vec![result.clone(), lhs, rhs],
                        &[1., -1., 1.],
                        0.,
                        0.,
                    )?,
                    // result - lhs * rhs == 0
                    BinaryOp::Mul => {
                        self.problem()?.add_cons_quadratic(
                            vec![result.clone()],
                            &mut [1.],
                            vec![lhs],
                            vec![rhs],
                            &mut [-1.],
                            0.,
                            0.,
                            &name,
                        );
                    }
                    // lhs - result * rhs == 0
                    BinaryOp::Div => {
                        self.problem()?.add_cons_quadratic(
                            vec![lhs],
                            &mut [1.],
                            vec![result.clone()],
                            vec![rhs],
                            &mut [-1.],
                            0.,
                            0.,
                            &name,
                        );
                    }
                    _ => {
                        return Err(SolveError::Internal {
                            msg: "(scip) unsupported arithmetic operator",
                        })
                    }
                }
                Ok(result)
            }

            Expr::Logical { op, args } => self.reify_logical(*op, args),

            Expr::Select { .. } => Err(SolveError::Internal {
                msg: "(scip) conditional expressions are not supported",
            }),
        }
    }
}
