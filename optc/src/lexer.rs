use crate::{
    error::{ExprError, ExprErrorKind},
    span::Span,
};
use logos::Logos;
use std::{fmt, sync::Arc};


#[derive(Clone, Debug, Logos, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
#[logos(error = ExprErrorKind)]
pub(super) enum Token {
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("**")]
    DoubleStar,
    #[token("/")]
    Div,
    #[token("//")]
    DoubleDiv,
    #[token("%")]
    Mod,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,

    #[token(",")]
    Comma,
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,

    #[token("True")]
    True,
    #[token("False")]
    False,

    #[regex(r"[A-Za-z_][A-Za-z_0-9]*", |lex| lex.slice().to_string())]
    Ident(String),
    #[regex(r"[0-9]+\.[0-9]*([Ee][-+]?[0-9]+)?|\.[0-9]+([Ee][-+]?[0-9]+)?|[0-9]+[Ee][-+]?[0-9]+", |lex| lex.slice().to_string())]
    RealLiteral(String),
    #[regex(r"[0-9]+", |lex| lex.slice().to_string())]
    IntLiteral(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::DoubleStar => write!(f, "**"),
            Token::Div => write!(f, "/"),
            Token::DoubleDiv => write!(f, "//"),
            Token::Mod => write!(f, "%"),
            Token::Lt => write!(f, "<"),
            Token::LtEq => write!(f, "<="),
            Token::Gt => write!(f, ">"),
            Token::GtEq => write!(f, ">="),
            Token::EqEq => write!(f, "=="),
            Token::NotEq => write!(f, "!="),
            Token::Comma => write!(f, ","),
            Token::ParenOpen => write!(f, "("),
            Token::ParenClose => write!(f, ")"),
            Token::BracketOpen => write!(f, "["),
            Token::BracketClose => write!(f, "]"),
            Token::True => write!(f, "True"),
            Token::False => write!(f, "False"),
            Token::Ident(ident) => write!(f, "{ident}"),
            Token::RealLiteral(literal) | Token::IntLiteral(literal) => write!(f, "{literal}"),
        }
    }
}

/// Tokenise `src`, stopping at the first invalid token.
pub(super) fn lex(src: &Arc<str>) -> Result<Vec<(Token, Span)>, ExprError> {
    Token::lexer(&src[..])
        .spanned()
        .map(|(res, range)| {
            let span = Span::new(Arc::clone(src), range);
            match res {
                Ok(tok) => Ok((tok, span)),
                Err(kind) => Err(ExprError { kind, span }),
            }
        })
        .collect()
}
