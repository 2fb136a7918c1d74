//! Key Decoding Module
//!
//! Turns the raw byte stream of a terminal in raw mode into logical keys.
//!
//! # Wire format
//!
//! Most keys arrive as a single byte. Navigation keys arrive as escape
//! sequences that all start with ESC (0x1b):
//!
//! - `ESC [ A` / `B` / `C` / `D`: arrow keys
//! - `ESC [ H` / `F`, `ESC O H` / `F`: Home / End
//! - `ESC [ n ~`: Home (1, 7), End (4, 8), Page Up (5), Page Down (6)
//!
//! A lone Escape press and the start of a sequence look identical on the
//! wire. Every read uses the raw-mode timeout, so an ESC followed by
//! silence decodes as [`LogicalKey::Unrecognized`] rather than blocking.
//! At most four bytes are consumed for one key.

use std::io::{self, Read};

use crate::error::{PagerError, PagerResult};

const ESC: u8 = 0x1b;

/// A decoded, application-level key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalKey {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    Quit,
    /// Any other single byte
    Plain(u8),
    /// Lone Escape, or an escape sequence that is not understood
    Unrecognized,
}

/// Control code produced by holding Ctrl with `key`
pub fn ctrl_key(key: u8) -> u8 {
    key.to_ascii_uppercase().wrapping_sub(b'@') & 0x1f
}

/// Decodes logical keys from a timed byte source
///
/// The source must behave like a raw-mode terminal: `read` returns `Ok(0)`
/// when the read timeout expires with no input.
#[derive(Debug)]
pub struct KeyDecoder<R> {
    input: R,
    quit_code: u8,
}

impl<R: Read> KeyDecoder<R> {
    /// Create a decoder that maps Ctrl+`quit_key` to [`LogicalKey::Quit`]
    pub fn new(input: R, quit_key: u8) -> Self {
        Self {
            input,
            quit_code: ctrl_key(quit_key),
        }
    }

    /// Get a mutable reference to the underlying input
    pub fn input_mut(&mut self) -> &mut R {
        &mut self.input
    }

    /// Read the next key
    ///
    /// Returns `Ok(None)` if the read timed out before any byte arrived.
    pub fn next_key(&mut self) -> PagerResult<Option<LogicalKey>> {
        let Some(byte) = self.read_byte()? else {
            return Ok(None);
        };

        let key = if byte == ESC {
            self.decode_escape()?
        } else if byte == self.quit_code || byte == b'\n' {
            LogicalKey::Quit
        } else {
            LogicalKey::Plain(byte)
        };
        tracing::trace!(?key, "decoded key");
        Ok(Some(key))
    }

    /// Decode the remainder of a sequence after ESC
    ///
    /// The third byte is only read once the second byte has introduced a
    /// known sequence, so an `ESC <other>` pair never takes the next key.
    fn decode_escape(&mut self) -> PagerResult<LogicalKey> {
        let Some(second) = self.read_byte()? else {
            return Ok(LogicalKey::Unrecognized);
        };
        if second != b'[' && second != b'O' {
            tracing::debug!(second, "unrecognized escape sequence");
            return Ok(LogicalKey::Unrecognized);
        }
        let Some(third) = self.read_byte()? else {
            return Ok(LogicalKey::Unrecognized);
        };

        let key = match (second, third) {
            (b'[', b'1'..=b'8') => match self.read_byte()? {
                Some(b'~') => tilde_key(third),
                _ => LogicalKey::Unrecognized,
            },
            (b'[', b'A') => LogicalKey::ArrowUp,
            (b'[', b'B') => LogicalKey::ArrowDown,
            (b'[', b'C') => LogicalKey::ArrowRight,
            (b'[', b'D') => LogicalKey::ArrowLeft,
            (_, b'H') => LogicalKey::Home,
            (_, b'F') => LogicalKey::End,
            _ => LogicalKey::Unrecognized,
        };
        if key == LogicalKey::Unrecognized {
            tracing::debug!(second, third, "unrecognized escape sequence");
        }
        Ok(key)
    }

    /// Read a single byte, `None` on timeout
    fn read_byte(&mut self) -> PagerResult<Option<u8>> {
        let mut buf = [0u8; 1];
        match self.input.read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(e) if matches!(e.kind(), io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock) => {
                Ok(None)
            }
            Err(e) => Err(PagerError::Read(e)),
        }
    }
}

/// Map the digit of `ESC [ n ~`
fn tilde_key(digit: u8) -> LogicalKey {
    match digit {
        b'1' | b'7' => LogicalKey::Home,
        b'4' | b'8' => LogicalKey::End,
        b'5' => LogicalKey::PageUp,
        b'6' => LogicalKey::PageDown,
        _ => LogicalKey::Unrecognized,
    }
}
