use tern_foundation::source::Position;
use tern_lexer::{Token, TokenKind, TokenStream};

use crate::{Parse, ParseError, Parser, PredictiveParse};

/// A literal: the raw lexeme together with its parsed value.
#[derive(Debug, Clone)]
pub struct Literal {
    pub position: Position,
    pub kind: LitKind,
}

#[derive(Debug, Clone)]
pub enum LitKind {
    Int { rep: String, value: i64 },
    Float { rep: String, value: f64 },
    Str { rep: String, value: String },
    Bool { rep: String, value: bool },
    Char { rep: String, value: char },
}

impl Literal {
    pub fn from_token(token: &Token) -> Result<Self, ParseError> {
        let kind = match token.kind {
            TokenKind::IntLit => LitKind::Int {
                value: token.parsed_int().ok_or_else(|| {
                    ParseError::new(
                        token.position,
                        format!("out-of-range integer literal `{}`", token.rep),
                        None,
                    )
                })?,
                rep: token.rep.clone(),
            },
            TokenKind::FloatLit => LitKind::Float {
                value: token.parsed_float().ok_or_else(|| {
                    ParseError::new(
                        token.position,
                        format!("malformed float literal `{}`", token.rep),
                        None,
                    )
                })?,
                rep: token.rep.clone(),
            },
            TokenKind::StrLit => LitKind::Str {
                value: token.parsed_str(),
                rep: token.rep.clone(),
            },
            TokenKind::BoolLit => LitKind::Bool {
                value: token.parsed_bool(),
                rep: token.rep.clone(),
            },
            TokenKind::CharLit => LitKind::Char {
                value: token.parsed_char(),
                rep: token.rep.clone(),
            },
            _ => {
                return Err(ParseError::new(
                    token.position,
                    token.describe(),
                    Some("a literal".to_string()),
                ))
            }
        };
        Ok(Self {
            position: token.position,
            kind,
        })
    }
}

impl Parse for Literal {
    fn parse(parser: &mut Parser<impl TokenStream>) -> Result<Self, ParseError> {
        let token = parser.next_token()?;
        Self::from_token(&token)
    }
}

impl PredictiveParse for Literal {
    fn started_by(token: &Token) -> bool {
        matches!(
            token.kind,
            TokenKind::IntLit
                | TokenKind::FloatLit
                | TokenKind::StrLit
                | TokenKind::BoolLit
                | TokenKind::CharLit
        )
    }
}
