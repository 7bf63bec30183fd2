//! A precedence-climbing parser for term expressions. From loosest to tightest binding:
//!
//! | level          | operators                      |
//! |----------------|--------------------------------|
//! | comparison     | `<` `<=` `>` `>=` `==` `!=`    |
//! | additive       | `+` `-`                        |
//! | multiplicative | `*` `/` `//` `%`               |
//! | unary          | `-` `+`                        |
//! | power          | `**` (right associative)       |
//! | postfix        | indexing `e[i]`, calls `f(..)` |
//!
//! Comparisons do not chain: `a < b < c` is rejected.

use crate::{
    error::{ExprError, ExprErrorKind},
    expr::{BinaryOp, Expr, Immediate, UnaryOp},
    lexer::{lex, Token},
    span::{Span, Spanned},
};
use std::sync::Arc;


pub(crate) fn parse_expr(src: &str) -> Result<Expr, ExprError> {
    let source: Arc<str> = Arc::from(src);
    let mut parser = Parser {
        tokens: lex(&source)?,
        pos: 0,
        source,
    };

    let expr = parser.comparison()?;
    match parser.next() {
        None => Ok(expr),
        Some((tok, span)) => Err(ExprError {
            kind: ExprErrorKind::UnexpectedToken {
                expected: "end of expression",
                found: tok.to_string(),
            },
            span,
        }),
    }
}

struct Parser {
    tokens: Vec<(Token, Span)>,
    pos: usize,
    source: Arc<str>,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(tok, _)| tok)
    }

    fn next(&mut self) -> Option<(Token, Span)> {
        let next = self.tokens.get(self.pos).cloned();
        if next.is_some() {
            self.pos += 1;
        }
        next
    }

    fn end_span(&self) -> Span {
        let len = self.source.len();
        Span::new(Arc::clone(&self.source), len..len)
    }

    /// Consume the next token, which must be `expected`.
    fn expect(&mut self, expected: Token, description: &'static str) -> Result<Span, ExprError> {
        match self.next() {
            Some((tok, span)) if tok == expected => Ok(span),
            Some((tok, span)) => Err(ExprError {
                kind: ExprErrorKind::UnexpectedToken {
                    expected: description,
                    found: tok.to_string(),
                },
                span,
            }),
            None => Err(ExprError {
                kind: ExprErrorKind::UnexpectedEnd {
                    expected: description,
                },
                span: self.end_span(),
            }),
        }
    }

    fn comparison_op(tok: &Token) -> Option<BinaryOp> {
        match tok {
            Token::Lt => Some(BinaryOp::LessThan),
            Token::LtEq => Some(BinaryOp::LessThanOrEqual),
            Token::Gt => Some(BinaryOp::GreaterThan),
            Token::GtEq => Some(BinaryOp::GreaterThanOrEqual),
            Token::EqEq => Some(BinaryOp::Equal),
            Token::NotEq => Some(BinaryOp::NotEqual),
            _ => None,
        }
    }

    fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        let span = lhs.span().to(rhs.span());
        Expr::BinaryOp {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            span,
        }
    }

    fn comparison(&mut self) -> Result<Expr, ExprError> {
        let lhs = self.additive()?;
        let Some(op) = self.peek().and_then(Self::comparison_op) else {
            return Ok(lhs);
        };
        self.pos += 1;
        let rhs = self.additive()?;

        if let Some((tok, span)) = self.tokens.get(self.pos) {
            if Self::comparison_op(tok).is_some() {
                return Err(ExprError {
                    kind: ExprErrorKind::ChainedComparison,
                    span: span.clone(),
                });
            }
        }
        Ok(Self::binary(op, lhs, rhs))
    }

    fn additive(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.multiplicative()?;
            lhs = Self::binary(op, lhs, rhs);
        }
    }

    fn multiplicative(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Div) => BinaryOp::Div,
                Some(Token::DoubleDiv) => BinaryOp::FloorDiv,
                Some(Token::Mod) => BinaryOp::Mod,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Self::binary(op, lhs, rhs);
        }
    }

    fn unary(&mut self) -> Result<Expr, ExprError> {
        let (op, op_span) = match self.tokens.get(self.pos) {
            Some((Token::Minus, span)) => (UnaryOp::Neg, span.clone()),
            Some((Token::Plus, span)) => (UnaryOp::Pos, span.clone()),
            _ => return self.power(),
        };
        self.pos += 1;
        let expr = self.unary()?;
        let span = op_span.to(expr.span());
        Ok(Expr::UnaryOp {
            op,
            expr: Box::new(expr),
            span,
        })
    }

    fn power(&mut self) -> Result<Expr, ExprError> {
        let base = self.postfix()?;
        if self.peek() != Some(&Token::DoubleStar) {
            return Ok(base);
        }
        self.pos += 1;
        // The exponent may itself be signed: `2 ** -1`.
        let exponent = self.unary()?;
        Ok(Self::binary(BinaryOp::Pow, base, exponent))
    }

    fn postfix(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.primary()?;
        while self.peek() == Some(&Token::BracketOpen) {
            self.pos += 1;
            let index = self.comparison()?;
            let close = self.expect(Token::BracketClose, "`]`")?;
            let span = expr.span().to(&close);
            expr = Expr::Index {
                expr: Box::new(expr),
                index: Box::new(index),
                span,
            };
        }
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr, ExprError> {
        let Some((tok, span)) = self.next() else {
            return Err(ExprError {
                kind: ExprErrorKind::UnexpectedEnd {
                    expected: "an expression",
                },
                span: self.end_span(),
            });
        };

        let immediate = |value| -> Result<Expr, ExprError> {
            Ok(Expr::Immediate {
                value,
                span: span.clone(),
            })
        };
        match tok {
            Token::IntLiteral(literal) => match literal.parse::<i64>() {
                Ok(value) => immediate(Immediate::Int(value)),
                Err(_) => Err(ExprError {
                    kind: ExprErrorKind::LiteralOutOfRange { literal },
                    span,
                }),
            },
            Token::RealLiteral(literal) => match literal.parse::<f64>() {
                Ok(value) if value.is_finite() => immediate(Immediate::Real(value)),
                _ => Err(ExprError {
                    kind: ExprErrorKind::LiteralOutOfRange { literal },
                    span,
                }),
            },
            Token::True => immediate(Immediate::Bool(true)),
            Token::False => immediate(Immediate::Bool(false)),

            Token::Ident(name) if self.peek() == Some(&Token::ParenOpen) => {
                self.pos += 1;
                let mut args = Vec::new();
                while self.peek() != Some(&Token::ParenClose) {
                    args.push(self.comparison()?);
                    if self.peek() == Some(&Token::Comma) {
                        self.pos += 1;
                    } else {
                        break;
                    }
                }
                let close = self.expect(Token::ParenClose, "`,` or `)`")?;
                Ok(Expr::Call {
                    name,
                    name_span: span.clone(),
                    args,
                    span: span.to(&close),
                })
            }
            Token::Ident(name) => Ok(Expr::Path(name, span)),

            Token::ParenOpen => {
                let expr = self.comparison()?;
                self.expect(Token::ParenClose, "`)`")?;
                Ok(expr)
            }

            tok => Err(ExprError {
                kind: ExprErrorKind::UnexpectedToken {
                    expected: "an expression",
                    found: tok.to_string(),
                },
                span,
            }),
        }
    }
}
