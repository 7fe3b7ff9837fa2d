use tern_foundation::source::Position;
use tern_lexer::{Token, TokenKind, TokenStream};

use crate::{Decl, Ident, Literal, Parse, ParseError, Parser, PredictiveParse, Type};

/// An expression, with the type the attachment pass resolves for it.
///
/// The parser always leaves `ty` empty; it is filled in before code
/// generation reads it.
#[derive(Debug, Clone)]
pub struct Expr {
    pub position: Position,
    pub kind: ExprKind,
    pub ty: Option<Type>,
}

impl Expr {
    pub fn new(position: Position, kind: ExprKind) -> Self {
        Self {
            position,
            kind,
            ty: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Lit(Literal),
    Ident(Ident),
    /// May be empty; a single element is a parenthesized expression that
    /// stays a 1-tuple in the tree.
    Tuple(Vec<Expr>),
    List(Vec<Expr>),
    Func(FuncLit),
    /// `args` is a tuple for the usual `f(a, b)` shape.
    Call { func: Box<Expr>, args: Box<Expr> },
    Unary { op: UnaryOp, right: Box<Expr> },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

/// `fn (params) return_type body`
#[derive(Debug, Clone)]
pub struct FuncLit {
    pub params: Vec<Param>,
    pub ret: Type,
    pub body: FuncBody,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub position: Position,
    pub name: Ident,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub enum FuncBody {
    Block(Block),
    Expr(Box<Expr>),
}

/// `{ (decl | expr)* }`
///
/// `return_void` is true when the block produces no value: it is empty or
/// its last item is a declaration.
#[derive(Debug, Clone)]
pub struct Block {
    pub position: Position,
    pub bodies: Vec<BlockItem>,
    pub return_void: bool,
}

#[derive(Debug, Clone)]
pub enum BlockItem {
    Decl(Decl),
    Expr(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Pos,
    Neg,
    Not,
}

impl UnaryOp {
    pub fn from_rep(rep: &str) -> Option<Self> {
        match rep {
            "+" => Some(Self::Pos),
            "-" => Some(Self::Neg),
            "!" => Some(Self::Not),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    BitOr,
    BitXor,
    Mul,
    Div,
    Rem,
    BitAnd,
}

impl BinaryOp {
    pub fn from_rep(rep: &str) -> Option<Self> {
        match rep {
            "||" => Some(Self::Or),
            "&&" => Some(Self::And),
            "==" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Le),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Ge),
            "+" => Some(Self::Add),
            "-" => Some(Self::Sub),
            "|" => Some(Self::BitOr),
            "^" => Some(Self::BitXor),
            "*" => Some(Self::Mul),
            "/" => Some(Self::Div),
            "%" => Some(Self::Rem),
            "&" => Some(Self::BitAnd),
            _ => None,
        }
    }

    /// The operator's precedence class; higher binds tighter. All operators
    /// are left-associative within a class.
    pub fn precedence(self) -> i8 {
        match self {
            Self::Or | Self::And => 1,
            Self::Eq | Self::Ne => 2,
            Self::Lt | Self::Le | Self::Gt | Self::Ge => 3,
            Self::Add | Self::Sub | Self::BitOr | Self::BitXor => 4,
            Self::Mul | Self::Div | Self::Rem | Self::BitAnd => 5,
        }
    }
}

// Expression parsing is precedence climbing rather than one rule per
// precedence level: the level table lives in `BinaryOp::precedence` and the
// climber below is the only loop.
impl Expr {
    pub fn precedence_parse(
        parser: &mut Parser<impl TokenStream>,
        min_prec: i8,
    ) -> Result<Self, ParseError> {
        let mut chain = Self::parse_non_binary(parser)?;

        loop {
            let token = parser.peek_token()?;
            if !token.is(TokenKind::Operator) {
                break;
            }
            let Some(op) = BinaryOp::from_rep(&token.rep) else {
                // `!` is the only operator with no binary reading.
                return Err(ParseError::new(
                    token.position,
                    format!("non-binary operator `{}`", token.rep),
                    Some("a binary operator".to_string()),
                ));
            };
            if op.precedence() <= min_prec {
                break;
            }
            let op_token = parser.next_token()?;
            // A dangling operator is reported at the operator itself, not at
            // whatever happens to follow it.
            if !Self::starts_non_binary(parser.peek_token()?) {
                return Err(ParseError::new(
                    op_token.position,
                    format!("non-unary operator `{}`", op_token.rep),
                    Some("an expression".to_string()),
                ));
            }
            let right = Self::precedence_parse(parser, op.precedence())?;
            chain = Self::new(
                chain.position,
                ExprKind::Binary {
                    op,
                    left: Box::new(chain),
                    right: Box::new(right),
                },
            );
        }

        Ok(chain)
    }

    fn starts_non_binary(token: &Token) -> bool {
        match token.kind {
            TokenKind::Operator => true,
            TokenKind::Keyword => token.rep == "fn",
            TokenKind::Ident
            | TokenKind::IntLit
            | TokenKind::FloatLit
            | TokenKind::StrLit
            | TokenKind::BoolLit
            | TokenKind::CharLit => true,
            TokenKind::Punctuation => token.rep == "(" || token.rep == "[",
            _ => false,
        }
    }

    fn parse_non_binary(parser: &mut Parser<impl TokenStream>) -> Result<Self, ParseError> {
        let token = parser.peek_token()?;
        match token.kind {
            TokenKind::Operator => Self::unary(parser),
            TokenKind::Keyword if token.rep == "fn" => Self::func(parser),
            _ => Self::prim(parser),
        }
    }

    fn unary(parser: &mut Parser<impl TokenStream>) -> Result<Self, ParseError> {
        let token = parser.next_token()?;
        let Some(op) = UnaryOp::from_rep(&token.rep) else {
            return Err(ParseError::new(
                token.position,
                format!("non-unary operator `{}`", token.rep),
                Some("an expression".to_string()),
            ));
        };
        let right = Self::parse_non_binary(parser)?;
        Ok(Self::new(
            token.position,
            ExprKind::Unary {
                op,
                right: Box::new(right),
            },
        ))
    }

    fn prim(parser: &mut Parser<impl TokenStream>) -> Result<Self, ParseError> {
        let token = parser.peek_token()?;
        let mut expr = match token.kind {
            TokenKind::IntLit
            | TokenKind::FloatLit
            | TokenKind::StrLit
            | TokenKind::BoolLit
            | TokenKind::CharLit => {
                let lit = parser.parse::<Literal>()?;
                Self::new(lit.position, ExprKind::Lit(lit))
            }
            TokenKind::Ident => {
                let ident = parser.parse::<Ident>()?;
                Self::new(ident.position, ExprKind::Ident(ident))
            }
            TokenKind::Punctuation if token.rep == "(" => Self::tuple(parser)?,
            TokenKind::Punctuation if token.rep == "[" => Self::list(parser)?,
            _ => {
                return Err(ParseError::new(
                    token.position,
                    token.describe(),
                    Some("an expression".to_string()),
                ))
            }
        };
        // Call suffixes chain: `f(1)(2)` calls the result of `f(1)`.
        while parser.peek_is_exactly(TokenKind::Punctuation, "(") {
            let args = Self::tuple(parser)?;
            expr = Self::new(
                expr.position,
                ExprKind::Call {
                    func: Box::new(expr),
                    args: Box::new(args),
                },
            );
        }
        Ok(expr)
    }

    fn tuple(parser: &mut Parser<impl TokenStream>) -> Result<Self, ParseError> {
        let position = parser.position();
        parser.expect_exact(TokenKind::Punctuation, "(")?;
        let items = if parser.peek_is_exactly(TokenKind::Punctuation, ")") {
            vec![]
        } else {
            parser.comma_separated(|parser| parser.parse::<Expr>())?
        };
        parser.expect_exact(TokenKind::Punctuation, ")")?;
        Ok(Self::new(position, ExprKind::Tuple(items)))
    }

    fn list(parser: &mut Parser<impl TokenStream>) -> Result<Self, ParseError> {
        let position = parser.position();
        parser.expect_exact(TokenKind::Punctuation, "[")?;
        let elems = if parser.peek_is_exactly(TokenKind::Punctuation, "]") {
            vec![]
        } else {
            parser.comma_separated(|parser| parser.parse::<Expr>())?
        };
        parser.expect_exact(TokenKind::Punctuation, "]")?;
        Ok(Self::new(position, ExprKind::List(elems)))
    }

    fn func(parser: &mut Parser<impl TokenStream>) -> Result<Self, ParseError> {
        let position = parser.position();
        parser.expect_exact(TokenKind::Keyword, "fn")?;
        parser.expect_exact(TokenKind::Punctuation, "(")?;
        let params = if parser.peek_is_exactly(TokenKind::Punctuation, ")") {
            vec![]
        } else {
            parser.comma_separated(|parser| parser.parse::<Param>())?
        };
        parser.expect_exact(TokenKind::Punctuation, ")")?;
        let ret = parser.parse::<Type>()?;
        let body = if parser.peek_is_exactly(TokenKind::Punctuation, "{") {
            FuncBody::Block(parser.parse::<Block>()?)
        } else {
            FuncBody::Expr(Box::new(parser.parse::<Expr>()?))
        };
        Ok(Self::new(
            position,
            ExprKind::Func(FuncLit { params, ret, body }),
        ))
    }
}

impl Parse for Expr {
    fn parse(parser: &mut Parser<impl TokenStream>) -> Result<Self, ParseError> {
        Self::precedence_parse(parser, -1)
    }
}

impl PredictiveParse for Expr {
    fn started_by(token: &Token) -> bool {
        Self::starts_non_binary(token)
    }
}

impl Parse for Param {
    fn parse(parser: &mut Parser<impl TokenStream>) -> Result<Self, ParseError> {
        let position = parser.position();
        let name = parser.parse::<Ident>()?;
        let ty = parser.parse::<Type>()?;
        Ok(Self { position, name, ty })
    }
}

impl Parse for Block {
    fn parse(parser: &mut Parser<impl TokenStream>) -> Result<Self, ParseError> {
        let position = parser.position();
        parser.expect_exact(TokenKind::Punctuation, "{")?;
        let mut bodies = vec![];
        while !parser.peek_is_exactly(TokenKind::Punctuation, "}") {
            if parser.peek_is(TokenKind::Eof) {
                let end = parser.peek_token()?;
                return Err(ParseError::new(
                    end.position,
                    end.describe(),
                    Some("`}`".to_string()),
                ));
            }
            if parser.next_matches::<Decl>() {
                bodies.push(BlockItem::Decl(parser.parse()?));
            } else {
                bodies.push(BlockItem::Expr(parser.parse()?));
            }
        }
        parser.expect_exact(TokenKind::Punctuation, "}")?;
        let return_void = !matches!(bodies.last(), Some(BlockItem::Expr(_)));
        Ok(Self {
            position,
            bodies,
            return_void,
        })
    }
}
