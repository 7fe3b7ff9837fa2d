use std::fmt;

use tern_foundation::{
    errors::{Diagnostic, Label},
    source::Position,
};
use tern_lexer::{Token, TokenKind, TokenStream};

/// The AST node could not be parsed.
///
/// Parse errors are fatal: the first one terminates parsing and carries the
/// position of the offending token together with what was found and, when
/// the grammar knows, what was expected instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub position: Position,
    /// Description of the offending token, e.g. `` `+` `` or `end of file`.
    pub unexpected: String,
    /// Description of what the grammar wanted here.
    pub expected: Option<String>,
}

impl ParseError {
    pub fn new(position: Position, unexpected: String, expected: Option<String>) -> Self {
        Self {
            position,
            unexpected,
            expected,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let range = self.position.offset..self.position.offset + 1;
        match &self.expected {
            Some(expected) => Diagnostic::error(format!("{expected} expected")).with_label(
                Label::primary(
                    range,
                    format!("{expected} expected here, found {}", self.unexpected),
                ),
            ),
            None => Diagnostic::error(format!("unexpected {}", self.unexpected))
                .with_label(Label::primary(range, "this was not expected")),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.expected {
            Some(expected) => write!(
                f,
                "{}: {expected} expected, found {}",
                self.position, self.unexpected
            ),
            None => write!(f, "{}: unexpected {}", self.position, self.unexpected),
        }
    }
}

impl std::error::Error for ParseError {}

/// Predictive recursive-descent parser over a previewable token stream.
pub struct Parser<T> {
    tokens: T,
    last_position: Position,
}

impl<T> Parser<T> {
    pub fn new(tokens: T) -> Self {
        Self {
            tokens,
            last_position: Position::START,
        }
    }
}

impl<T> Parser<T>
where
    T: TokenStream,
{
    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.next();
        if let Some(token) = &token {
            self.last_position = token.position;
        }
        token
    }

    fn end_of_stream(&self) -> ParseError {
        ParseError::new(self.last_position, "end of token stream".to_string(), None)
    }

    /// Consumes and returns the next token.
    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        let error = self.end_of_stream();
        self.bump().ok_or(error)
    }

    /// Returns the next token without consuming it.
    pub fn peek_token(&mut self) -> Result<&Token, ParseError> {
        let error = self.end_of_stream();
        self.tokens.peek().ok_or(error)
    }

    /// The position of the next token; where a node about to be parsed
    /// starts.
    pub fn position(&mut self) -> Position {
        self.tokens
            .peek()
            .map(|token| token.position)
            .unwrap_or(self.last_position)
    }

    pub fn peek_is(&mut self, kind: TokenKind) -> bool {
        self.tokens.peek().map(|token| token.is(kind)).unwrap_or(false)
    }

    pub fn peek_is_exactly(&mut self, kind: TokenKind, rep: &str) -> bool {
        self.tokens
            .peek()
            .map(|token| token.is_exactly(kind, rep))
            .unwrap_or(false)
    }

    /// Consumes the next token if it matches; returns whether it did.
    pub fn eat_exact(&mut self, kind: TokenKind, rep: &str) -> bool {
        if self.peek_is_exactly(kind, rep) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Demands a token of the given kind.
    pub fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        let token = self.next_token()?;
        if !token.is(kind) {
            return Err(ParseError::new(
                token.position,
                token.describe(),
                Some(kind_name(kind).to_string()),
            ));
        }
        Ok(token)
    }

    /// Demands a token of the given kind with a specific lexeme.
    pub fn expect_exact(&mut self, kind: TokenKind, rep: &str) -> Result<Token, ParseError> {
        let token = self.next_token()?;
        if !token.is_exactly(kind, rep) {
            return Err(ParseError::new(
                token.position,
                token.describe(),
                Some(format!("`{rep}`")),
            ));
        }
        Ok(token)
    }

    /// Returns whether the next token starts `N` without advancing the
    /// token stream.
    pub fn next_matches<N>(&mut self) -> bool
    where
        N: PredictiveParse,
    {
        self.tokens.peek().map(N::started_by).unwrap_or(false)
    }

    pub fn parse<N>(&mut self) -> Result<N, ParseError>
    where
        N: Parse,
    {
        N::parse(self)
    }

    /// Applies `N`'s rule for as long as the next token starts `N`. The
    /// result may be empty.
    pub fn parse_greedy<N>(&mut self) -> Result<Vec<N>, ParseError>
    where
        N: PredictiveParse,
    {
        let mut nodes = vec![];
        while self.next_matches::<N>() {
            nodes.push(self.parse()?);
        }
        Ok(nodes)
    }

    /// One element, then zero or more `, element` pairs. Trailing commas are
    /// not part of the grammar.
    pub fn comma_separated<N>(
        &mut self,
        mut element: impl FnMut(&mut Self) -> Result<N, ParseError>,
    ) -> Result<Vec<N>, ParseError> {
        let mut elements = vec![element(self)?];
        while self.eat_exact(TokenKind::Punctuation, ",") {
            elements.push(element(self)?);
        }
        Ok(elements)
    }
}

fn kind_name(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Keyword => "a keyword",
        TokenKind::Ident => "an identifier",
        TokenKind::IntLit => "an integer literal",
        TokenKind::FloatLit => "a float literal",
        TokenKind::StrLit => "a string literal",
        TokenKind::BoolLit => "a boolean literal",
        TokenKind::CharLit => "a character literal",
        TokenKind::Operator => "an operator",
        TokenKind::Punctuation => "punctuation",
        TokenKind::Eof => "end of file",
    }
}

pub trait Parse: Sized {
    fn parse(parser: &mut Parser<impl TokenStream>) -> Result<Self, ParseError>;
}

impl<N> Parse for Box<N>
where
    N: Parse,
{
    fn parse(parser: &mut Parser<impl TokenStream>) -> Result<Self, ParseError> {
        Ok(Box::new(parser.parse()?))
    }
}

pub trait PredictiveParse: Parse {
    /// Returns `true` if this rule starts with the given token.
    fn started_by(token: &Token) -> bool;
}

impl<N> Parse for Option<N>
where
    N: PredictiveParse,
{
    fn parse(parser: &mut Parser<impl TokenStream>) -> Result<Self, ParseError> {
        if parser.next_matches::<N>() {
            Ok(Some(parser.parse()?))
        } else {
            Ok(None)
        }
    }
}
