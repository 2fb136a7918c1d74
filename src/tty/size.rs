//! Terminal size discovery
//!
//! The size normally comes from `TIOCGWINSZ`. When that is unavailable the
//! cursor is pushed to the bottom-right corner and the terminal is asked to
//! report its position (`CSI 6 n`); the reply `ESC [ row ; col R` is the size.

use std::io::{self, Read, Write};

use crate::core::Dimensions;
use crate::error::{PagerError, PagerResult};

/// Move far right, far down, then request a cursor position report
pub const CURSOR_PROBE: &[u8] = b"\x1b[999C\x1b[999B\x1b[6n";

/// Upper bound on the length of a position report
const MAX_REPORT_LEN: usize = 32;

/// Parse a cursor position report of the form `ESC [ row ; col R`
///
/// Returns `None` if the reply has no `;` separator or either field is not
/// a number.
pub fn parse_cursor_report(reply: &[u8]) -> Option<Dimensions> {
    let start = reply.windows(2).position(|w| w == b"\x1b[")? + 2;
    let body = &reply[start..];
    let body = body.strip_suffix(b"R").unwrap_or(body);
    let text = std::str::from_utf8(body).ok()?;
    let (rows, cols) = text.split_once(';')?;
    Some(Dimensions::new(rows.parse().ok()?, cols.parse().ok()?))
}

/// Determine the size with a cursor position probe
///
/// `input` must be a raw-mode terminal so the reply can be read without a
/// newline and the read times out if the terminal never answers.
pub fn probe_size<R: Read, W: Write>(input: &mut R, output: &mut W) -> PagerResult<Dimensions> {
    output.write_all(CURSOR_PROBE).map_err(PagerError::Write)?;
    output.flush().map_err(PagerError::Write)?;

    let mut reply = Vec::with_capacity(MAX_REPORT_LEN);
    let mut byte = [0u8; 1];
    while reply.len() < MAX_REPORT_LEN {
        match input.read(&mut byte) {
            Ok(0) => break,
            Ok(_) => {
                reply.push(byte[0]);
                if byte[0] == b'R' {
                    break;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(PagerError::Read(e)),
        }
    }

    let size = parse_cursor_report(&reply).ok_or(PagerError::WindowSize)?;
    tracing::debug!(rows = size.rows, cols = size.cols, "size from cursor probe");
    Ok(size)
}
