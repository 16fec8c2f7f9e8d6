use std::fmt::{Display, Formatter};

pub const START_POSITION: FilePosition = FilePosition { line: 1, col: 1 };

/// 1-based location of a character in the source.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct FilePosition {
    pub line: usize,
    pub col: usize,
}

impl FilePosition {
    pub fn new(line: usize, col: usize) -> Self {
        FilePosition { line, col }
    }
}

impl Display for FilePosition {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
