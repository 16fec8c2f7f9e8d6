use std::fmt::{Display, Formatter};
use std::error::Error;
use crate::position::FilePosition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilationErrorKind {
    LexicalError,
    SyntaxError,
}

/// The token the parser was looking at when it gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Found {
    pub kind: String,
    pub lexeme: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationError {
    kind: CompilationErrorKind,
    pos: FilePosition,
    msg: String,
    expected: Option<String>,
    found: Option<Found>,
}

impl CompilationError {
    pub fn new(
        kind: CompilationErrorKind,
        pos: FilePosition,
        msg: &str
    ) -> Self {
        CompilationError {
            kind,
            pos,
            msg: String::from(msg),
            expected: None,
            found: None,
        }
    }

    pub fn lexical(pos: FilePosition, msg: &str) -> Self {
        Self::new(CompilationErrorKind::LexicalError, pos, msg)
    }

    pub fn syntax(pos: FilePosition, msg: &str) -> Self {
        Self::new(CompilationErrorKind::SyntaxError, pos, msg)
    }

    pub fn with_expected(mut self, expected: &str) -> Self {
        self.expected = Some(expected.to_string());
        self
    }

    pub fn with_found(mut self, kind: &str, lexeme: &str) -> Self {
        self.found = Some(Found {
            kind: kind.to_string(),
            lexeme: lexeme.to_string(),
        });
        self
    }

    pub fn kind(&self) -> CompilationErrorKind {
        self.kind
    }

    pub fn msg(&self) -> &str {
        &self.msg
    }

    pub fn pos(&self) -> FilePosition {
        self.pos
    }

    pub fn line(&self) -> usize {
        self.pos.line
    }

    pub fn expected(&self) -> Option<&str> {
        self.expected.as_deref()
    }

    pub fn found(&self) -> Option<&Found> {
        self.found.as_ref()
    }
}

impl Error for CompilationError {}

impl Display for CompilationError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.kind {
            CompilationErrorKind::LexicalError => write!(
                f, "[LEXICAL ERROR] Line {}: invalid token [lexical: {}]",
                self.pos.line, self.msg
            ),
            CompilationErrorKind::SyntaxError => {
                write!(f, "[SYNTAX ERROR] Line {}: {}", self.pos.line, self.msg)?;
                if let Some(expected) = &self.expected {
                    write!(f, " (expected: {})", expected)?;
                }
                if let Some(found) = &self.found {
                    write!(
                        f, " [found: kind={} lex=\"{}\"]",
                        found.kind, found.lexeme
                    )?;
                }
                Ok(())
            }
        }
    }
}
