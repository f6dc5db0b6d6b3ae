use derive_more::Display;

/// A location in the source text. Lines and columns start at 1.
#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq)]
#[display("[{line}:{column}]")]
pub struct Position {
    pub line: usize,
    pub column: usize,
    /// Bytes read before this position.
    pub offset: usize,
}

impl Position {
    pub const START: Self = Self::new(1, 1, 0);

    pub const fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    /// The position right after `c`, if `c` was read at this position.
    pub const fn after(self, c: char) -> Self {
        if c == '\n' {
            Self::new(self.line + 1, 1, self.offset + 1)
        } else {
            Self::new(self.line, self.column + 1, self.offset + 1)
        }
    }
}
