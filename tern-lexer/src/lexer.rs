use thiserror::Error;

use tern_foundation::{
    errors::{Diagnostic, Label},
    source::Position,
};

use crate::token::{Token, TokenKind, KEYWORDS};

/// Turns source text into the token stream the parser consumes, ending with
/// a single `Eof` token.
pub fn lex(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(input).run()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{position}: {kind}")]
pub struct LexError {
    pub position: Position,
    pub kind: LexErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated character literal")]
    UnterminatedChar,
    #[error("empty character literal")]
    EmptyChar,
    #[error("block comment does not have a matching `*/` terminator")]
    UnterminatedComment,
    #[error("invalid escape sequence `\\{0}`")]
    InvalidEscape(char),
    #[error("`0x` must be followed by hexadecimal digits")]
    MissingHexDigits,
    #[error("`e` in a float literal must be followed by an exponent number")]
    MissingExponent,
    #[error("unexpected character `{0}`")]
    UnexpectedCharacter(char),
}

impl LexError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.kind.to_string()).with_label(Label::primary(
            self.position.offset..self.position.offset + 1,
            "the offending input starts here",
        ))
    }
}

#[derive(Debug)]
struct Lexer<'a> {
    input: &'a str,
    position: Position,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            position: Position::START,
            tokens: vec![],
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input
            .get(self.position.offset..)
            .and_then(|rest| rest.chars().next())
    }

    /// One character of lookahead past the current one.
    fn next_char(&self) -> Option<char> {
        self.input
            .get(self.position.offset..)
            .and_then(|rest| rest.chars().nth(1))
    }

    fn advance_char(&mut self) {
        if let Some(c) = self.current_char() {
            self.position.offset += c.len_utf8();
            if c == '\n' {
                self.position.line += 1;
                self.position.column = 1;
            } else {
                self.position.column += 1;
            }
        }
    }

    fn error(&self, position: Position, kind: LexErrorKind) -> LexError {
        LexError { position, kind }
    }

    fn one_or_more(&mut self, test: impl Fn(char) -> bool) -> Result<(), ()> {
        if !self.current_char().map(&test).unwrap_or(false) {
            return Err(());
        }
        while self.current_char().map(&test).unwrap_or(false) {
            self.advance_char();
        }
        Ok(())
    }

    fn push(&mut self, kind: TokenKind, start: Position) {
        self.tokens.push(Token {
            kind,
            rep: self.input[start.offset..self.position.offset].to_string(),
            position: start,
        });
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        loop {
            self.skip_trivia()?;
            let start = self.position;
            let Some(c) = self.current_char() else {
                self.tokens.push(Token {
                    kind: TokenKind::Eof,
                    rep: String::new(),
                    position: start,
                });
                break;
            };
            match c {
                'a'..='z' | 'A'..='Z' | '_' => self.identifier(start),
                '0'..='9' => self.number(start)?,
                '"' => self.string(start)?,
                '\'' => self.character(start)?,
                _ => self.operator_or_punctuation(start, c)?,
            }
        }
        Ok(self.tokens)
    }

    /// Skips whitespace, `//` line comments, and nestable `/* */` block
    /// comments.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            while let Some(' ' | '\t' | '\r' | '\n') = self.current_char() {
                self.advance_char();
            }
            if self.current_char() != Some('/') {
                return Ok(());
            }
            match self.next_char() {
                Some('/') => {
                    while !matches!(self.current_char(), None | Some('\n')) {
                        self.advance_char();
                    }
                }
                Some('*') => self.block_comment()?,
                _ => return Ok(()),
            }
        }
    }

    fn block_comment(&mut self) -> Result<(), LexError> {
        let start = self.position;
        self.advance_char();
        self.advance_char();
        let mut nesting = 1;
        while nesting > 0 {
            match self.current_char() {
                Some('*') => {
                    self.advance_char();
                    if self.current_char() == Some('/') {
                        nesting -= 1;
                        self.advance_char();
                    }
                }
                Some('/') => {
                    self.advance_char();
                    if self.current_char() == Some('*') {
                        nesting += 1;
                        self.advance_char();
                    }
                }
                None => return Err(self.error(start, LexErrorKind::UnterminatedComment)),
                _ => self.advance_char(),
            }
        }
        Ok(())
    }

    fn identifier(&mut self, start: Position) {
        while let Some('a'..='z' | 'A'..='Z' | '0'..='9' | '_') = self.current_char() {
            self.advance_char();
        }
        let rep = &self.input[start.offset..self.position.offset];
        let kind = if rep == "true" || rep == "false" {
            TokenKind::BoolLit
        } else if KEYWORDS.contains(&rep) {
            TokenKind::Keyword
        } else {
            TokenKind::Ident
        };
        self.push(kind, start);
    }

    fn number(&mut self, start: Position) -> Result<(), LexError> {
        if self.current_char() == Some('0') && matches!(self.next_char(), Some('x' | 'X')) {
            self.advance_char();
            self.advance_char();
            let here = self.position;
            self.one_or_more(|c| c.is_ascii_hexdigit())
                .map_err(|_| self.error(here, LexErrorKind::MissingHexDigits))?;
            self.push(TokenKind::IntLit, start);
            return Ok(());
        }

        while let Some('0'..='9') = self.current_char() {
            self.advance_char();
        }
        let mut is_float = false;
        if self.current_char() == Some('.')
            && self.next_char().map(|c| c.is_ascii_digit()).unwrap_or(false)
        {
            is_float = true;
            self.advance_char();
            while let Some('0'..='9') = self.current_char() {
                self.advance_char();
            }
        }
        if let Some('e' | 'E') = self.current_char() {
            is_float = true;
            let exponent_start = self.position;
            self.advance_char();
            if let Some('+' | '-') = self.current_char() {
                self.advance_char();
            }
            self.one_or_more(|c| c.is_ascii_digit())
                .map_err(|_| self.error(exponent_start, LexErrorKind::MissingExponent))?;
        }
        self.push(
            if is_float {
                TokenKind::FloatLit
            } else {
                TokenKind::IntLit
            },
            start,
        );
        Ok(())
    }

    fn string(&mut self, start: Position) -> Result<(), LexError> {
        self.advance_char();
        loop {
            match self.current_char() {
                None | Some('\n') => {
                    return Err(self.error(start, LexErrorKind::UnterminatedString))
                }
                Some('\\') => {
                    self.advance_char();
                    self.escape()?;
                }
                Some('"') => {
                    self.advance_char();
                    break;
                }
                Some(_) => self.advance_char(),
            }
        }
        self.push(TokenKind::StrLit, start);
        Ok(())
    }

    fn character(&mut self, start: Position) -> Result<(), LexError> {
        self.advance_char();
        match self.current_char() {
            None | Some('\n') => return Err(self.error(start, LexErrorKind::UnterminatedChar)),
            Some('\'') => return Err(self.error(start, LexErrorKind::EmptyChar)),
            Some('\\') => {
                self.advance_char();
                self.escape()?;
            }
            Some(_) => self.advance_char(),
        }
        if self.current_char() != Some('\'') {
            return Err(self.error(start, LexErrorKind::UnterminatedChar));
        }
        self.advance_char();
        self.push(TokenKind::CharLit, start);
        Ok(())
    }

    fn escape(&mut self) -> Result<(), LexError> {
        match self.current_char() {
            Some('n' | 'r' | 't' | '0' | '\\' | '\'' | '"') => {
                self.advance_char();
                Ok(())
            }
            Some(other) => Err(self.error(self.position, LexErrorKind::InvalidEscape(other))),
            // The enclosing literal reports this as unterminated.
            None => Ok(()),
        }
    }

    fn operator_or_punctuation(&mut self, start: Position, c: char) -> Result<(), LexError> {
        // Two-character lexemes take priority over their one-character
        // prefixes.
        let (kind, len) = match (c, self.next_char()) {
            ('-', Some('>')) => (TokenKind::Punctuation, 2),
            ('|', Some('|'))
            | ('&', Some('&'))
            | ('=', Some('='))
            | ('!', Some('='))
            | ('<', Some('='))
            | ('>', Some('=')) => (TokenKind::Operator, 2),
            ('+' | '-' | '*' | '/' | '%' | '&' | '|' | '^' | '<' | '>' | '!', _) => {
                (TokenKind::Operator, 1)
            }
            ('=' | '(' | ')' | '[' | ']' | '{' | '}' | ',' | ':' | ';', _) => {
                (TokenKind::Punctuation, 1)
            }
            _ => return Err(self.error(start, LexErrorKind::UnexpectedCharacter(c))),
        };
        self.advance_char();
        if len == 2 {
            self.advance_char();
        }
        self.push(kind, start);
        Ok(())
    }
}
