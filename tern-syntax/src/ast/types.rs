use tern_foundation::source::Position;
use tern_lexer::{Token, TokenKind, TokenStream};

use crate::{Parse, ParseError, Parser, PredictiveParse};

/// A type annotation.
///
/// Equality compares structure only; the position a type was written at
/// never matters to comparisons.
#[derive(Debug, Clone)]
pub struct Type {
    pub position: Position,
    pub kind: TypeKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Int,
    Float,
    Str,
    Bool,
    Char,
    Void,
    List(Box<Type>),
    /// May be empty: `()` is the empty tuple type.
    Tuple(Vec<Type>),
    /// `->` is right-associative: `int -> int -> int` is
    /// `int -> (int -> int)`.
    Func { param: Box<Type>, ret: Box<Type> },
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Type {
    pub fn new(position: Position, kind: TypeKind) -> Self {
        Self { position, kind }
    }

    fn atom(parser: &mut Parser<impl TokenStream>) -> Result<Self, ParseError> {
        let token = parser.next_token()?;
        match token.kind {
            TokenKind::Punctuation if token.rep == "[" => {
                let element = parser.parse::<Type>()?;
                parser.expect_exact(TokenKind::Punctuation, "]")?;
                Ok(Self::new(token.position, TypeKind::List(Box::new(element))))
            }
            TokenKind::Punctuation if token.rep == "(" => {
                let items = if parser.peek_is_exactly(TokenKind::Punctuation, ")") {
                    vec![]
                } else {
                    parser.comma_separated(|parser| parser.parse::<Type>())?
                };
                parser.expect_exact(TokenKind::Punctuation, ")")?;
                Ok(Self::new(token.position, TypeKind::Tuple(items)))
            }
            TokenKind::Ident => {
                let kind = match token.rep.as_str() {
                    "int" => TypeKind::Int,
                    "float" => TypeKind::Float,
                    "string" => TypeKind::Str,
                    "boolean" => TypeKind::Bool,
                    "char" => TypeKind::Char,
                    "void" => TypeKind::Void,
                    _ => {
                        return Err(ParseError::new(
                            token.position,
                            format!("unknown type `{}`", token.rep),
                            Some("a type".to_string()),
                        ))
                    }
                };
                Ok(Self::new(token.position, kind))
            }
            _ => Err(ParseError::new(
                token.position,
                token.describe(),
                Some("a type".to_string()),
            )),
        }
    }
}

impl Parse for Type {
    fn parse(parser: &mut Parser<impl TokenStream>) -> Result<Self, ParseError> {
        let param = Self::atom(parser)?;
        if parser.eat_exact(TokenKind::Punctuation, "->") {
            let ret = parser.parse::<Type>()?;
            Ok(Self {
                position: param.position,
                kind: TypeKind::Func {
                    param: Box::new(param),
                    ret: Box::new(ret),
                },
            })
        } else {
            Ok(param)
        }
    }
}

impl PredictiveParse for Type {
    fn started_by(token: &Token) -> bool {
        token.is(TokenKind::Ident)
            || token.is_exactly(TokenKind::Punctuation, "[")
            || token.is_exactly(TokenKind::Punctuation, "(")
    }
}
