mod token_stream;
mod token;
mod buffer;

pub use token_stream::{TokenStream, MAX_LEXEME_LEN};
pub use token::{
    Token,
    TokenKind,
    Keyword,
    Literal,
};
pub use buffer::{Buffer, SimpleBuffer};
