use std::{fs::File, io::Read, path::Path};
use crate::position::{START_POSITION, FilePosition};

/// Character source of the scanner. Owns the cursor and the
/// line/column counter.
pub trait Buffer {
    fn next(&mut self) -> Option<char>;
    fn peek(&self) -> Option<char>;
    fn peek_second(&self) -> Option<char>;
    fn pos(&self) -> FilePosition;
}

pub struct SimpleBuffer {
    storage: Vec<char>,
    pos: usize,
    file_pos: FilePosition,
}

impl SimpleBuffer {
    pub fn new(data: &[u8]) -> Self {
        Self {
            storage: String::from_utf8_lossy(data).chars().collect(),
            pos: 0,
            file_pos: START_POSITION,
        }
    }

    /// Reads the whole file up front; the handle is closed on return.
    pub fn from_file<P: AsRef<Path>>(filepath: P) -> Result<Self, std::io::Error> {
        let mut data = Vec::new();
        let mut file = File::open(filepath)?;
        file.read_to_end(&mut data)?;
        Ok(Self::new(&data))
    }
}

impl Buffer for SimpleBuffer {
    fn next(&mut self) -> Option<char> {
        let c = *self.storage.get(self.pos)?;
        self.pos += 1;

        if c == '\n' {
            self.file_pos.line += 1;
            self.file_pos.col = 1;
        } else {
            self.file_pos.col += 1;
        }

        Some(c)
    }

    fn peek(&self) -> Option<char> {
        self.storage.get(self.pos).copied()
    }

    fn peek_second(&self) -> Option<char> {
        self.storage.get(self.pos + 1).copied()
    }

    fn pos(&self) -> FilePosition {
        self.file_pos
    }
}
