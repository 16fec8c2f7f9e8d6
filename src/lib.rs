mod parsing;
mod tokenization;
mod position;
mod error;

pub use parsing::{Analyzer, Report};
pub use error::{CompilationError, CompilationErrorKind, Found};
pub use position::FilePosition;
pub use tokenization::{
    Buffer,
    SimpleBuffer,
    Token,
    TokenKind,
    TokenStream,
    Keyword,
    Literal,
    MAX_LEXEME_LEN,
};

/// Checks an in-memory LPD program.
pub fn analyze(source: &str) -> Result<Report, CompilationError> {
    let buffer = SimpleBuffer::new(source.as_bytes());
    Analyzer::new(TokenStream::new(buffer)).check()
}
