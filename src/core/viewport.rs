//! Viewport state
//!
//! The viewport maps a fixed-size visible screen area onto a band of
//! document rows. It tracks the cursor (document-relative), the scroll
//! offset and the visible size, and keeps the cursor inside the visible
//! band after every change:
//!
//! ```text
//! offset.y <= cursor.y < offset.y + size.rows    (whenever size.rows > 0)
//! ```
//!
//! All operations are pure state transforms; no I/O happens here.

use super::geometry::{Dimensions, Position};

/// Single-step cursor motion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Up,
    Down,
    Left,
    Right,
    /// Jump to the first column
    LineStart,
    /// Jump to the last visible column
    LineEnd,
}

/// Direction of a page jump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
    Up,
    Down,
}

/// Cursor, scroll offset and visible size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    cursor: Position,
    offset: Position,
    size: Dimensions,
}

impl Viewport {
    /// Create a viewport with the cursor at the origin
    pub fn new(size: Dimensions) -> Self {
        Self {
            cursor: Position::default(),
            offset: Position::default(),
            size,
        }
    }

    /// Cursor position (x is a screen column, y a document row)
    pub fn cursor(&self) -> Position {
        self.cursor
    }

    /// Scroll offset; `offset().y` is the first visible document row
    pub fn offset(&self) -> Position {
        self.offset
    }

    /// Visible size
    pub fn size(&self) -> Dimensions {
        self.size
    }

    /// Cursor position relative to the top-left of the screen
    pub fn screen_cursor(&self) -> Position {
        Position::new(
            self.cursor.x.saturating_sub(self.offset.x),
            self.cursor.y.saturating_sub(self.offset.y),
        )
    }

    /// Change the visible size
    ///
    /// The cursor row is kept; the column is pulled back inside the new
    /// width. Scroll is reconciled against the new row count.
    pub fn resize(&mut self, size: Dimensions) {
        self.size = size;
        self.cursor.x = self.cursor.x.min(self.last_col());
        self.reconcile_scroll();
    }

    /// Move the cursor one step, clamped to the screen width and to
    /// `document_len`
    ///
    /// The cursor may rest on row `document_len`, one past the last line.
    /// That row renders as blank.
    pub fn move_cursor(&mut self, motion: Motion, document_len: usize) {
        match motion {
            Motion::Up => self.cursor.y = self.cursor.y.saturating_sub(1),
            Motion::Down => {
                if self.cursor.y < document_len {
                    self.cursor.y += 1;
                }
            }
            Motion::Left => self.cursor.x = self.cursor.x.saturating_sub(1),
            Motion::Right => {
                if self.cursor.x < self.last_col() {
                    self.cursor.x += 1;
                }
            }
            Motion::LineStart => self.cursor.x = 0,
            Motion::LineEnd => self.cursor.x = self.last_col(),
        }
        self.reconcile_scroll();
    }

    /// Move the cursor a full screen height up or down
    ///
    /// Implemented as `size.rows` single steps so clamping matches repeated
    /// arrow presses exactly.
    pub fn page(&mut self, direction: PageDirection, document_len: usize) {
        let motion = match direction {
            PageDirection::Up => Motion::Up,
            PageDirection::Down => Motion::Down,
        };
        for _ in 0..self.size.rows {
            self.move_cursor(motion, document_len);
        }
    }

    /// Adjust the scroll offset so the cursor row is visible
    pub fn reconcile_scroll(&mut self) {
        if self.size.rows == 0 {
            self.offset.y = self.cursor.y;
            return;
        }
        if self.cursor.y < self.offset.y {
            self.offset.y = self.cursor.y;
        }
        if self.cursor.y >= self.offset.y + self.size.rows {
            self.offset.y = self.cursor.y - self.size.rows + 1;
        }
    }

    fn last_col(&self) -> usize {
        self.size.cols.saturating_sub(1)
    }
}
