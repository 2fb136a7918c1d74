//! Screen geometry primitives

/// Visible terminal size in character cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dimensions {
    /// Number of rows (lines)
    pub rows: usize,
    /// Number of columns (characters per line)
    pub cols: usize,
}

impl Dimensions {
    /// Create a new size
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Check if either dimension is zero
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }
}

/// A column/row pair
///
/// Used both for the on-screen cursor and for the scroll offset. `y` is a
/// document row index, not a screen row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Column (0-indexed)
    pub x: usize,
    /// Document row (0-indexed)
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}
