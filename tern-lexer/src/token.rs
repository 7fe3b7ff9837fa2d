use tern_foundation::source::Position;

/// Reserved words of the language. The parser only dispatches on the first
/// four; the rest are reserved so they can never be identifiers.
pub const KEYWORDS: &[&str] = &[
    "import", "let", "as", "fn", "if", "else", "while", "for", "break",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TokenKind {
    Keyword,
    Ident,
    IntLit,
    FloatLit,
    StrLit,
    BoolLit,
    CharLit,
    Operator,
    Punctuation,
    Eof,
}

/// A tagged token: a kind, the original lexeme, and where it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub rep: String,
    pub position: Position,
}

impl Token {
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Kind test constrained to a specific lexeme.
    pub fn is_exactly(&self, kind: TokenKind, rep: &str) -> bool {
        self.kind == kind && self.rep == rep
    }

    /// How the token reads in an error message.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of file".to_string(),
            _ => format!("`{}`", self.rep),
        }
    }

    /// The byte range the token occupies in the source text.
    pub fn source_range(&self) -> std::ops::Range<usize> {
        self.position.offset..self.position.offset + self.rep.len()
    }

    /// Parsed value of an `IntLit`. `None` on other kinds, or when the
    /// literal does not fit an `i64`.
    pub fn parsed_int(&self) -> Option<i64> {
        if self.kind != TokenKind::IntLit {
            return None;
        }
        if let Some(hex) = self.rep.strip_prefix("0x").or_else(|| self.rep.strip_prefix("0X")) {
            i64::from_str_radix(hex, 16).ok()
        } else {
            self.rep.parse().ok()
        }
    }

    /// Parsed value of a `FloatLit`.
    pub fn parsed_float(&self) -> Option<f64> {
        if self.kind != TokenKind::FloatLit {
            return None;
        }
        self.rep.parse().ok()
    }

    /// Parsed value of a `BoolLit`.
    pub fn parsed_bool(&self) -> bool {
        self.rep == "true"
    }

    /// Parsed value of a `CharLit`, with escapes resolved.
    pub fn parsed_char(&self) -> char {
        unescape(strip_quotes(&self.rep)).chars().next().unwrap_or('\0')
    }

    /// Parsed value of a `StrLit`, with the quotes removed and escapes
    /// resolved.
    pub fn parsed_str(&self) -> String {
        unescape(strip_quotes(&self.rep))
    }
}

fn strip_quotes(rep: &str) -> &str {
    let rep = rep
        .strip_prefix('"')
        .or_else(|| rep.strip_prefix('\''))
        .unwrap_or(rep);
    rep.strip_suffix('"')
        .or_else(|| rep.strip_suffix('\''))
        .unwrap_or(rep)
}

/// Resolves the escape sequences the lexer accepts. The lexer has already
/// rejected anything else, so unknown escapes pass through verbatim.
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => (),
        }
    }
    out
}
