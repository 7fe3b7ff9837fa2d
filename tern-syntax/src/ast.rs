mod expr;
mod lit;
mod types;

use tern_foundation::source::Position;
use tern_lexer::{TokenKind, TokenStream};

use crate::{Parse, ParseError, Parser, PredictiveParse};

pub use expr::*;
pub use lit::*;
pub use types::*;

/// A source identifier.
#[derive(Debug, Clone)]
pub struct Ident {
    pub position: Position,
    pub name: String,
}

impl Parse for Ident {
    fn parse(parser: &mut Parser<impl TokenStream>) -> Result<Self, ParseError> {
        let token = parser.expect(TokenKind::Ident)?;
        Ok(Self {
            position: token.position,
            name: token.rep,
        })
    }
}

impl PredictiveParse for Ident {
    fn started_by(token: &tern_lexer::Token) -> bool {
        token.is(TokenKind::Ident)
    }
}

/// A whole module: imports first, then declarations, to the end of the
/// token stream.
#[derive(Debug, Clone)]
pub struct Program {
    pub position: Position,
    pub imports: Vec<Import>,
    pub decls: Vec<Decl>,
}

impl Parse for Program {
    fn parse(parser: &mut Parser<impl TokenStream>) -> Result<Self, ParseError> {
        let position = parser.position();
        let imports = parser.parse_greedy::<Import>()?;
        let decls = parser.parse_greedy::<Decl>()?;
        let end = parser.peek_token()?;
        if !end.is(TokenKind::Eof) {
            return Err(ParseError::new(
                end.position,
                end.describe(),
                Some("a declaration or end of file".to_string()),
            ));
        }
        Ok(Self {
            position,
            imports,
            decls,
        })
    }
}

/// `import "path" (elem, elem as alias, …)`
#[derive(Debug, Clone)]
pub struct Import {
    pub position: Position,
    pub path: Literal,
    pub elems: Vec<ImportElem>,
}

impl Parse for Import {
    fn parse(parser: &mut Parser<impl TokenStream>) -> Result<Self, ParseError> {
        let position = parser.position();
        parser.expect_exact(TokenKind::Keyword, "import")?;
        let path_token = parser.expect(TokenKind::StrLit)?;
        let path = Literal::from_token(&path_token)?;
        parser.expect_exact(TokenKind::Punctuation, "(")?;
        let elems = parser.comma_separated(|parser| parser.parse::<ImportElem>())?;
        parser.expect_exact(TokenKind::Punctuation, ")")?;
        Ok(Self {
            position,
            path,
            elems,
        })
    }
}

impl PredictiveParse for Import {
    fn started_by(token: &tern_lexer::Token) -> bool {
        token.is_exactly(TokenKind::Keyword, "import")
    }
}

#[derive(Debug, Clone)]
pub struct ImportElem {
    pub position: Position,
    pub name: Ident,
    pub alias: Option<Ident>,
}

impl Parse for ImportElem {
    fn parse(parser: &mut Parser<impl TokenStream>) -> Result<Self, ParseError> {
        let position = parser.position();
        let name = parser.parse::<Ident>()?;
        let alias = if parser.eat_exact(TokenKind::Keyword, "as") {
            Some(parser.parse::<Ident>()?)
        } else {
            None
        };
        Ok(Self {
            position,
            name,
            alias,
        })
    }
}

/// `let name (: type)? = expr`
#[derive(Debug, Clone)]
pub struct Decl {
    pub position: Position,
    pub name: Ident,
    pub ty: Option<Type>,
    pub expr: Expr,
}

impl Parse for Decl {
    fn parse(parser: &mut Parser<impl TokenStream>) -> Result<Self, ParseError> {
        let position = parser.position();
        parser.expect_exact(TokenKind::Keyword, "let")?;
        let name = parser.parse::<Ident>()?;
        let ty = if parser.eat_exact(TokenKind::Punctuation, ":") {
            Some(parser.parse::<Type>()?)
        } else {
            None
        };
        parser.expect_exact(TokenKind::Punctuation, "=")?;
        let expr = parser.parse::<Expr>()?;
        Ok(Self {
            position,
            name,
            ty,
            expr,
        })
    }
}

impl PredictiveParse for Decl {
    fn started_by(token: &tern_lexer::Token) -> bool {
        token.is_exactly(TokenKind::Keyword, "let")
    }
}
