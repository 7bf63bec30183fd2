#[macro_use]
pub mod error;

pub mod cli;
pub mod constraint;
pub mod env;
pub mod expr;
mod lexer;
pub mod mutate;
mod parser;
pub mod problem;
mod span;
pub mod text;
pub mod value;
