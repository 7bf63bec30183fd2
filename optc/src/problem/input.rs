use super::{Input, InputType, NumberType, Problem};
use crate::{env::Env, error::Error, value::Value};
use std::{
    fs,
    io::{BufRead, Write},
    path::{Path, PathBuf},
};

/// Where the values of a problem's inputs come from.
pub trait InputSource {
    /// The raw text for `input`, the `position`th declared input, or `None` if there is none.
    /// `length` is the resolved length of array inputs.
    fn read(
        &mut self,
        input: &Input,
        position: usize,
        length: Option<usize>,
    ) -> Result<Option<String>, Error>;
}

/// Prompts for every input on `writer` and reads the answer as a line from `reader`.
pub struct Interactive<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> Interactive<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Interactive { reader, writer }
    }
}

fn article(word: &str) -> &'static str {
    match word.chars().next() {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    }
}

/// The text shown when asking for `input`.
pub(crate) fn prompt(input: &Input, length: Option<usize>) -> String {
    let ty = input.ty.as_str();
    let comment = input
        .comment
        .as_ref()
        .map(|comment| format!(", {comment}"))
        .unwrap_or_default();
    match length {
        Some(length) => format!(
            "Input {}, {} {ty} of length {length}{comment}: ",
            input.name,
            article(ty)
        ),
        None => format!("Input {}, {} {ty} number{comment}: ", input.name, article(ty)),
    }
}

impl<R: BufRead, W: Write> InputSource for Interactive<R, W> {
    fn read(
        &mut self,
        input: &Input,
        _position: usize,
        length: Option<usize>,
    ) -> Result<Option<String>, Error> {
        let io_error = |error| Error::FileIO {
            error,
            file: PathBuf::from("<stdin>"),
        };

        write!(self.writer, "{}", prompt(input, length)).map_err(io_error)?;
        self.writer.flush().map_err(io_error)?;

        let mut line = String::new();
        match self.reader.read_line(&mut line).map_err(io_error)? {
            0 => Ok(None),
            _ => Ok(Some(line)),
        }
    }
}

/// Newline separated values, one line per input in declaration order.
#[derive(Clone, Debug, Default)]
pub struct LineSource {
    lines: Vec<String>,
}

impl LineSource {
    pub fn new(src: &str) -> Self {
        LineSource {
            lines: src.lines().map(str::to_string).collect(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let src = fs::read_to_string(path).map_err(|error| Error::FileIO {
            error,
            file: path.to_path_buf(),
        })?;
        Ok(Self::new(&src))
    }
}

impl InputSource for LineSource {
    fn read(
        &mut self,
        _input: &Input,
        position: usize,
        _length: Option<usize>,
    ) -> Result<Option<String>, Error> {
        Ok(self.lines.get(position).cloned())
    }
}

fn parse_number(input: &Input, ty: NumberType, src: &str) -> Result<Value, Error> {
    let illegal = || Error::IllegalInputValue {
        name: input.name.clone(),
        value: src.to_string(),
    };
    match ty {
        NumberType::Int => src.parse().map(Value::Int).map_err(|_| illegal()),
        NumberType::Real => src.parse().map(Value::Real).map_err(|_| illegal()),
    }
}

impl Problem {
    /// Read every input from `source`, in declaration order, into a fresh environment. Array
    /// lengths may refer to inputs read before them.
    pub fn resolve_inputs(&self, source: &mut dyn InputSource) -> Result<Env, Error> {
        let mut env = Env::new();
        for (position, input) in self.inputs.iter().enumerate() {
            let length = match &input.length {
                Some(length) if input.ty.is_array() => {
                    let resolved =
                        env.resolve_number(length, self.capabilities.arithmetic_bounds)?;
                    let resolved =
                        usize::try_from(resolved).map_err(|_| Error::UnresolvedBound {
                            bound: length.to_string(),
                        })?;
                    Some(resolved)
                }
                _ => None,
            };

            let line = source
                .read(input, position, length)?
                .ok_or_else(|| Error::MissingInput {
                    name: input.name.clone(),
                })?;

            let ty = input.ty.element_type();
            let value = match (input.ty, length) {
                (InputType::IntArray | InputType::RealArray, Some(length)) => {
                    let elements = line
                        .split_whitespace()
                        .map(|src| parse_number(input, ty, src))
                        .collect::<Result<Vec<_>, _>>()?;
                    if elements.len() != length {
                        return Err(Error::InputLengthMismatch {
                            name: input.name.clone(),
                            expected: length,
                            found: elements.len(),
                        });
                    }
                    Value::Array(elements)
                }
                _ => parse_number(input, ty, line.trim())?,
            };
            env.bind(&input.name, value)?;
        }
        Ok(env)
    }
}
