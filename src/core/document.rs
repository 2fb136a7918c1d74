//! Document line store
//!
//! A document is an ordered, read-only list of display-ready lines. All
//! load-time preprocessing (control character escaping, tab expansion, line
//! spacing, line numbering) happens here so the pager core can treat each line as an opaque
//! printable string.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthChar;

use crate::error::{PagerError, PagerResult};

/// Preprocessing applied while loading a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Tab stop interval in columns
    pub tab_width: usize,
    /// Prefix every source line with its line number
    pub line_numbers: bool,
    /// Spaces between the line number field and the text
    pub number_margin: usize,
    /// Rows occupied by each source line (1 = single spaced)
    pub line_spacing: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            tab_width: 4,
            line_numbers: false,
            number_margin: 1,
            line_spacing: 1,
        }
    }
}

/// Ordered sequence of text lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    lines: Vec<String>,
}

impl Document {
    /// Create a document from already-prepared lines
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Load and preprocess a document from a file
    pub fn load(path: impl AsRef<Path>, options: &LoadOptions) -> PagerResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => PagerError::DocumentUnavailable {
                path: path.to_path_buf(),
            },
            _ => PagerError::DocumentRead {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let document =
            Self::from_reader(BufReader::new(file), options).map_err(|source| {
                PagerError::DocumentRead {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
        tracing::debug!(path = %path.display(), lines = document.len(), "loaded document");
        Ok(document)
    }

    /// Read and preprocess a document from any buffered reader
    ///
    /// Lines are split on `\n`; a trailing `\r` is dropped and invalid UTF-8
    /// is replaced.
    pub fn from_reader<R: BufRead>(reader: R, options: &LoadOptions) -> io::Result<Self> {
        let mut raw = Vec::new();
        for chunk in reader.split(b'\n') {
            let mut bytes = chunk?;
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
            raw.push(String::from_utf8_lossy(&bytes).into_owned());
        }
        Ok(Self::prepare(raw, options))
    }

    fn prepare(raw: Vec<String>, options: &LoadOptions) -> Self {
        let gutter = options
            .line_numbers
            .then(|| Gutter::for_count(raw.len(), options));
        let spacing = options.line_spacing.max(1);

        let mut lines = Vec::with_capacity(raw.len() * spacing);
        for (index, text) in raw.iter().enumerate() {
            let text = expand_tabs(&escape_controls(text), options.tab_width);
            let line = match &gutter {
                Some(gutter) => gutter.prefix(index + 1, &text),
                None => text,
            };
            lines.push(line);
            lines.extend(std::iter::repeat(String::new()).take(spacing - 1));
        }
        Self { lines }
    }

    /// Number of lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get a line by index
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Iterate over all lines
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }
}

/// Line number field layout
///
/// The number field starts one tab stop wide and doubles, gaining one
/// extra margin column each time, until the widest number fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Gutter {
    field: usize,
    margin: usize,
}

impl Gutter {
    fn for_count(count: usize, options: &LoadOptions) -> Self {
        let digits = count.max(1).to_string().len();
        let mut field = options.tab_width.max(1);
        let mut margin = options.number_margin;
        while field < digits {
            field *= 2;
            margin += 1;
        }
        Self { field, margin }
    }

    fn prefix(&self, number: usize, text: &str) -> String {
        format!(
            "{:<width$}{}",
            number,
            text,
            width = self.field + self.margin
        )
    }
}

/// Make control characters other than tab visible
///
/// C0 controls and DEL become caret notation (`^[`, `^M`, `^?`); C1
/// controls become U+FFFD. Nothing that reaches the terminal can move the
/// cursor or start an escape sequence.
fn escape_controls(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\t' => out.push(c),
            '\x00'..='\x1f' => {
                out.push('^');
                out.push(char::from(c as u8 + 0x40));
            }
            '\x7f' => out.push_str("^?"),
            '\u{80}'..='\u{9f}' => out.push(char::REPLACEMENT_CHARACTER),
            _ => out.push(c),
        }
    }
    out
}

/// Replace tabs with spaces up to the next tab stop
fn expand_tabs(text: &str, tab_width: usize) -> String {
    if !text.contains('\t') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + tab_width);
    let mut col = 0;
    for c in text.chars() {
        if c == '\t' {
            if tab_width == 0 {
                continue;
            }
            let pad = tab_width - col % tab_width;
            out.extend(std::iter::repeat(' ').take(pad));
            col += pad;
        } else {
            out.push(c);
            col += c.width().unwrap_or(0);
        }
    }
    out
}
