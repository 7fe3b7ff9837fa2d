mod lexer;
mod token;
mod token_stream;

pub use lexer::*;
pub use token::*;
pub use token_stream::*;
