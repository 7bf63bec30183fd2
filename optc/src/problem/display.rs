use super::{Goal, Problem};
use std::fmt::{Display, Formatter, Result};

impl Display for Problem {
    fn fmt(&self, f: &mut Formatter) -> Result {
        writeln!(
            f,
            "This problem is to {} an objective of type {}.",
            match self.objective.goal {
                Goal::Max => "maximize",
                Goal::Min => "minimize",
                Goal::Exist => "satisfy",
            },
            self.objective.ty
        )?;
        writeln!(
            f,
            "This problem has {} variables of type {}.",
            self.variable.count, self.variable.ty
        )?;

        writeln!(f, "This problem has {} constraints:", self.constraints.len())?;
        for (idx, constraint) in self.constraints.iter().enumerate() {
            writeln!(f, "Constraint {}:", idx + 1)?;
            write!(f, "{constraint}")?;
        }

        writeln!(f, "This problem has {} inputs:", self.inputs.len())?;
        for (idx, input) in self.inputs.iter().enumerate() {
            writeln!(f, "Input {}:", idx + 1)?;
            writeln!(f, "\tName: {}", input.name)?;
            writeln!(f, "\tType: {}", input.ty)?;
            if let Some(length) = &input.length {
                writeln!(f, "\tLength: {length}")?;
            }
        }

        writeln!(f, "This problem has {} parameters:", self.parameters.len())?;
        for (idx, parameter) in self.parameters.iter().enumerate() {
            writeln!(f, "Parameter {}:", idx + 1)?;
            writeln!(f, "\tName: {}", parameter.name)?;
            writeln!(f, "\tType: {}", parameter.ty)?;
            writeln!(f, "\tDefault value: {}", parameter.value)?;
            writeln!(f, "\tBound: [{}, {}]", parameter.low, parameter.high)?;
        }
        Ok(())
    }
}
