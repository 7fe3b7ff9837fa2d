use crate::token::Token;

/// A previewable token stream: one token of lookahead without consumption.
pub trait TokenStream {
    fn next(&mut self) -> Option<Token>;

    fn peek(&mut self) -> Option<&Token>;
}

impl<T> TokenStream for &mut T
where
    T: TokenStream,
{
    fn next(&mut self) -> Option<Token> {
        <T as TokenStream>::next(self)
    }

    fn peek(&mut self) -> Option<&Token> {
        <T as TokenStream>::peek(self)
    }
}

/// [`std::io::Cursor`] but for a lexed token buffer.
#[derive(Debug, Clone)]
pub struct TokenCursor {
    tokens: Vec<Token>,
    index: usize,
}

impl TokenCursor {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, index: 0 }
    }
}

impl TokenStream for TokenCursor {
    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    fn peek(&mut self) -> Option<&Token> {
        self.tokens.get(self.index)
    }
}
