//! Frame composition
//!
//! Each frame is composed completely in memory and written to the terminal
//! in one piece. A frame is:
//!
//! ```text
//! CSI ?25l                      hide cursor
//! CSI H                         home
//! row 0 CSI K CR LF             one entry per screen row; the last row
//! ...                           has no CR LF so the screen never scrolls
//! row n-1 CSI K
//! CSI <row> ; <col> H           place the cursor (1-indexed)
//! CSI ?25h                      show cursor
//! ```
//!
//! Rows are terminated with an explicit CR LF because output post-processing
//! is off in raw mode.

use std::io::Write;

use unicode_width::UnicodeWidthChar;

use crate::core::{Document, Viewport};
use crate::error::{PagerError, PagerResult};

const HIDE_CURSOR: &[u8] = b"\x1b[?25l";
const SHOW_CURSOR: &[u8] = b"\x1b[?25h";
const CURSOR_HOME: &[u8] = b"\x1b[H";
const ERASE_LINE: &[u8] = b"\x1b[K";
const CRLF: &[u8] = b"\r\n";

/// Configuration for the renderer
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Message shown a third of the way down when the document is empty
    pub placeholder: String,
    /// Glyph marking rows past the end of the document
    pub filler: char,
    /// Cut lines at the terminal width
    ///
    /// Lines wider than the screen would otherwise wrap and push every row
    /// below them down, breaking the cursor position math.
    pub truncate_lines: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            placeholder: "page: empty document".to_string(),
            filler: '~',
            truncate_lines: true,
        }
    }
}

/// Output bytes for one frame
#[derive(Debug, Default, Clone)]
pub struct FrameBuffer {
    bytes: Vec<u8>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// Append raw bytes
    pub fn push(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    pub fn push_str(&mut self, text: &str) {
        self.push(text.as_bytes());
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Write the whole frame in one operation, then clear it
    pub fn flush_to<W: Write>(&mut self, out: &mut W) -> PagerResult<()> {
        let result = out
            .write_all(&self.bytes)
            .and_then(|()| out.flush())
            .map_err(PagerError::Write);
        self.clear();
        result
    }
}

/// Composes frames from a document and a viewport
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Compose a frame into a fresh buffer
    pub fn render(&self, document: &Document, viewport: &Viewport) -> FrameBuffer {
        let mut frame = FrameBuffer::new();
        self.render_into(document, viewport, &mut frame);
        frame
    }

    /// Compose a frame, appending to `frame`
    pub fn render_into(&self, document: &Document, viewport: &Viewport, frame: &mut FrameBuffer) {
        let size = viewport.size();
        let offset = viewport.offset();

        frame.push(HIDE_CURSOR);
        frame.push(CURSOR_HOME);

        for row in 0..size.rows {
            let index = row + offset.y;
            if document.is_empty() && row == size.rows / 3 {
                self.draw_placeholder(frame, size.cols);
            } else if let Some(line) = document.line(index) {
                self.draw_line(frame, line, size.cols);
            } else {
                let mut glyph = [0u8; 4];
                frame.push_str(self.config.filler.encode_utf8(&mut glyph));
            }

            frame.push(ERASE_LINE);
            if row + 1 < size.rows {
                frame.push(CRLF);
            }
        }

        let cursor = viewport.screen_cursor();
        frame.push_str(&format!("\x1b[{};{}H", cursor.y + 1, cursor.x + 1));
        frame.push(SHOW_CURSOR);
    }

    fn draw_placeholder(&self, frame: &mut FrameBuffer, cols: usize) {
        let (message, width) = clip(&self.config.placeholder, cols);
        let padding = cols.saturating_sub(width) / 2;
        frame.push_str(&" ".repeat(padding));
        frame.push_str(message);
    }

    fn draw_line(&self, frame: &mut FrameBuffer, line: &str, cols: usize) {
        if self.config.truncate_lines {
            frame.push_str(clip(line, cols).0);
        } else {
            frame.push_str(line);
        }
    }
}

/// Longest prefix of `text` that fits in `cols` display columns, and its width
fn clip(text: &str, cols: usize) -> (&str, usize) {
    let mut width = 0;
    for (i, c) in text.char_indices() {
        let w = c.width().unwrap_or(0);
        if width + w > cols {
            return (&text[..i], width);
        }
        width += w;
    }
    (text, width)
}
