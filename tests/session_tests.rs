//! End-to-end tests for the pager session
//!
//! These drive a full session against an in-memory terminal: a mock
//! attribute store, scripted input bytes (with simulated read timeouts) and a
//! captured output buffer.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use page::app::Config;
use page::core::{Dimensions, Document, LoadOptions, Position};
use page::tty::TerminalBackend;
use page::{ErrorKind, PagerError, PagerResult, PagerSession};

// ============================================================================
// Test doubles
// ============================================================================

/// Flags a real termios would carry, reduced to what raw mode touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Attrs {
    echo: bool,
    icanon: bool,
    isig: bool,
    iexten: bool,
    opost: bool,
    cs8: bool,
    vmin: u8,
    vtime: u8,
}

const COOKED: Attrs = Attrs {
    echo: true,
    icanon: true,
    isig: true,
    iexten: true,
    opost: true,
    cs8: true,
    vmin: 1,
    vtime: 0,
};

#[derive(Debug)]
struct FakeTerminal {
    attrs: Attrs,
    sizes: VecDeque<Dimensions>,
    size: Dimensions,
    history: Vec<Attrs>,
    fail_size: bool,
}

impl FakeTerminal {
    fn new(rows: usize, cols: usize) -> Self {
        Self {
            attrs: COOKED,
            sizes: VecDeque::new(),
            size: Dimensions::new(rows, cols),
            history: Vec::new(),
            fail_size: false,
        }
    }
}

impl TerminalBackend for FakeTerminal {
    type Attributes = Attrs;

    fn attributes(&mut self) -> PagerResult<Attrs> {
        Ok(self.attrs)
    }

    fn set_attributes(&mut self, attributes: &Attrs) -> PagerResult<()> {
        self.history.push(*attributes);
        self.attrs = *attributes;
        Ok(())
    }

    fn make_raw(&self, _cooked: &Attrs) -> Attrs {
        Attrs {
            echo: false,
            icanon: false,
            isig: false,
            iexten: false,
            opost: false,
            cs8: true,
            vmin: 0,
            vtime: 1,
        }
    }

    fn dimensions(&mut self) -> PagerResult<Dimensions> {
        if self.fail_size {
            return Err(PagerError::WindowSize);
        }
        if let Some(size) = self.sizes.pop_front() {
            self.size = size;
        }
        Ok(self.size)
    }
}

/// Input script: `Some(bytes)` delivers bytes one read at a time, `None`
/// is one read that times out
struct ScriptedInput {
    steps: VecDeque<Option<u8>>,
}

impl ScriptedInput {
    fn new(script: &[Option<&[u8]>]) -> Self {
        let mut steps = VecDeque::new();
        for step in script {
            match step {
                Some(bytes) => steps.extend(bytes.iter().copied().map(Some)),
                None => steps.push_back(None),
            }
        }
        Self { steps }
    }

    fn keys(bytes: &[u8]) -> Self {
        Self::new(&[Some(bytes)])
    }
}

impl Read for ScriptedInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.steps.pop_front() {
            Some(Some(byte)) => {
                buf[0] = byte;
                Ok(1)
            }
            Some(None) => Ok(0),
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input script exhausted",
            )),
        }
    }
}

/// Output that remembers each write call separately
#[derive(Debug, Default)]
struct RecordingOutput {
    writes: Vec<Vec<u8>>,
}

impl RecordingOutput {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.writes.concat()).into_owned()
    }
}

impl Write for RecordingOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes.push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

type TestSession = PagerSession<FakeTerminal, ScriptedInput, RecordingOutput>;

fn session(terminal: FakeTerminal, input: ScriptedInput) -> TestSession {
    PagerSession::new(terminal, input, RecordingOutput::default(), &Config::default())
}

/// Screen rows of one frame
fn frame_rows(frame: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(frame);
    let body = text.trim_start_matches("\x1b[?25l\x1b[H");
    let end = body.rfind("\x1b[K").map_or(0, |i| i + 3);
    body[..end]
        .split("\r\n")
        .map(|row| row.trim_end_matches("\x1b[K").to_string())
        .collect()
}

// ============================================================================
// Navigation
// ============================================================================

#[test]
fn test_short_document_never_scrolls() {
    let document = Document::from_lines(["first", "second"]);
    let mut session = session(
        FakeTerminal::new(5, 20),
        ScriptedInput::keys(b"\x1b[B\x1b[B\x1b[B\x1b[B\x11"),
    );
    session.run(&document).unwrap();

    assert_eq!(session.viewport().cursor().y, 2);
    assert_eq!(session.viewport().offset().y, 0);
}

#[test]
fn test_scrolling_through_long_document() {
    let document = Document::from_lines((1..=100).map(|i| format!("line {}", i)));
    let mut session = session(
        FakeTerminal::new(10, 40),
        ScriptedInput::keys(b"\x1b[6~\x1b[6~\x1b[A\x1b[4~q"),
    );
    session.run(&document).unwrap();

    let viewport = session.viewport();
    assert_eq!(viewport.cursor(), Position::new(39, 19));
    assert_eq!(viewport.offset().y, 11);

    // The frame drawn before the final key shows lines 12..=21
    let writes = &session.output().writes;
    let last_frame = &writes[writes.len() - 2];
    let rows = frame_rows(last_frame);
    assert_eq!(rows.first().map(String::as_str), Some("line 12"));
    assert_eq!(rows.last().map(String::as_str), Some("line 21"));
}

#[test]
fn test_page_up_from_top_stays_put() {
    let document = Document::from_lines((0..30).map(|i| i.to_string()));
    let mut session = session(
        FakeTerminal::new(10, 40),
        ScriptedInput::keys(b"\x1b[5~\x1b[D\x1b[1~\n"),
    );
    session.run(&document).unwrap();
    assert_eq!(session.viewport().cursor(), Position::new(0, 0));
    assert_eq!(session.viewport().offset(), Position::new(0, 0));
}

#[test]
fn test_home_and_end_variants() {
    let document = Document::from_lines(["text"]);
    let mut session = session(
        FakeTerminal::new(4, 12),
        ScriptedInput::keys(b"\x1bOF\x1b[H\x1b[8~\x11"),
    );
    session.run(&document).unwrap();
    assert_eq!(session.viewport().cursor().x, 11);
}

// ============================================================================
// Timeouts and input errors
// ============================================================================

#[test]
fn test_timeouts_rerender_and_continue() {
    let document = Document::from_lines(["only"]);
    let input = ScriptedInput::new(&[None, None, Some(&b"\x1b[C"[..]), None, Some(&b"\x11"[..])]);
    let mut session = session(FakeTerminal::new(3, 10), input);
    session.run(&document).unwrap();

    // Frames: initial, after two timeouts, after the key, after a timeout
    let frames = session
        .output()
        .writes
        .iter()
        .filter(|w| w.starts_with(b"\x1b[?25l"))
        .count();
    assert_eq!(frames, 5);
    assert_eq!(session.viewport().cursor().x, 1);
}

#[test]
fn test_lone_escape_is_ignored() {
    let document = Document::from_lines(["a", "b"]);
    let input = ScriptedInput::new(&[Some(&b"\x1b"[..]), None, Some(&b"\x1b[B\x11"[..])]);
    let mut session = session(FakeTerminal::new(3, 10), input);
    session.run(&document).unwrap();
    assert_eq!(session.viewport().cursor().y, 1);
}

#[test]
fn test_read_error_restores_terminal() {
    let document = Document::from_lines(["a"]);
    let mut session = session(FakeTerminal::new(3, 10), ScriptedInput::keys(b"\x1b[B"));

    let err = session.run(&document).unwrap_err();
    assert!(matches!(err, PagerError::Read(_)));
    assert_eq!(err.kind(), ErrorKind::TerminalIo);
    assert!(!session.mode().is_raw());
    assert_eq!(session.mode().backend().attrs, COOKED);
}

// ============================================================================
// Terminal lifecycle
// ============================================================================

#[test]
fn test_raw_mode_round_trip() {
    let document = Document::from_lines(["a"]);
    let mut session = session(FakeTerminal::new(3, 10), ScriptedInput::keys(b"q"));
    session.run(&document).unwrap();

    let history = &session.mode().backend().history;
    assert_eq!(history.len(), 2);
    let raw = history[0];
    assert!(!raw.echo && !raw.icanon && !raw.isig && !raw.iexten && !raw.opost);
    assert_eq!((raw.vmin, raw.vtime), (0, 1));
    assert_eq!(history[1], COOKED);
    assert_eq!(session.mode().backend().attrs, COOKED);
}

#[test]
fn test_size_failure_restores_terminal() {
    let mut terminal = FakeTerminal::new(3, 10);
    terminal.fail_size = true;
    let mut session = session(terminal, ScriptedInput::keys(b"q"));

    let err = session.run(&Document::default()).unwrap_err();
    assert!(matches!(err, PagerError::WindowSize));
    assert_eq!(session.mode().backend().attrs, COOKED);
}

#[test]
fn test_exit_clears_screen() {
    let mut session = session(FakeTerminal::new(3, 10), ScriptedInput::keys(b"q"));
    session.run(&Document::from_lines(["a"])).unwrap();
    assert!(session.output().text().ends_with("\x1b[2J\x1b[H"));
}

// ============================================================================
// Frames
// ============================================================================

#[test]
fn test_each_frame_is_a_single_write() {
    let document = Document::from_lines((0..50).map(|i| format!("row {}", i)));
    let mut session = session(
        FakeTerminal::new(8, 30),
        ScriptedInput::keys(b"\x1b[B\x1b[6~\x11"),
    );
    session.run(&document).unwrap();

    let writes = &session.output().writes;
    // Three frames plus the exit clear
    assert_eq!(writes.len(), 4);
    for frame in &writes[..3] {
        assert!(frame.starts_with(b"\x1b[?25l\x1b[H"));
        assert!(frame.ends_with(b"\x1b[?25h"));
        assert_eq!(frame_rows(frame).len(), 8);
    }
}

#[test]
fn test_empty_document_frame() {
    let mut session = session(FakeTerminal::new(9, 40), ScriptedInput::keys(b"q"));
    session.run(&Document::default()).unwrap();

    let rows = frame_rows(&session.output().writes[0]);
    assert_eq!(rows.len(), 9);
    assert!(rows[3].trim_start().starts_with("page: empty document"));
    assert!(rows[3].starts_with(' '));
    assert!(rows
        .iter()
        .enumerate()
        .all(|(i, row)| i == 3 || row == "~"));
}

#[test]
fn test_resize_before_next_frame() {
    let document = Document::from_lines((0..40).map(|i| i.to_string()));
    let mut terminal = FakeTerminal::new(20, 40);
    terminal.sizes.extend([Dimensions::new(20, 40), Dimensions::new(5, 10)]);

    let flag = Arc::new(AtomicBool::new(true));
    let mut session = session(terminal, ScriptedInput::keys(b"\x1b[6~\x11"))
        .with_resize_flag(Arc::clone(&flag));
    session.run(&document).unwrap();

    assert!(!flag.load(Ordering::Relaxed));
    assert_eq!(session.viewport().size(), Dimensions::new(5, 10));
    // Page Down moved by the new height
    assert_eq!(session.viewport().cursor().y, 5);
    assert_eq!(session.viewport().offset().y, 1);
    assert_eq!(frame_rows(&session.output().writes[0]).len(), 5);
}

// ============================================================================
// Loaded documents
// ============================================================================

#[test]
fn test_paging_a_loaded_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "a\tb\nsecond\n").unwrap();

    let options = LoadOptions {
        line_numbers: true,
        ..LoadOptions::default()
    };
    let document = Document::load(file.path(), &options).unwrap();
    let mut session = session(FakeTerminal::new(4, 30), ScriptedInput::keys(b"q"));
    session.run(&document).unwrap();

    let rows = frame_rows(&session.output().writes[0]);
    assert_eq!(rows, vec!["1    a   b", "2    second", "~", "~"]);
}

#[test]
fn test_missing_file_is_document_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Document::load(dir.path().join("absent"), &LoadOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Document);
}

#[test]
fn test_control_bytes_in_file_stay_inert() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"ab\x1b[2Jcd\rxy\n").unwrap();

    let document = Document::load(file.path(), &LoadOptions::default()).unwrap();
    let mut session = session(FakeTerminal::new(2, 20), ScriptedInput::keys(b"q"));
    session.run(&document).unwrap();

    let frame = &session.output().writes[0];
    assert_eq!(frame_rows(frame), vec!["ab^[[2Jcd^Mxy", "~"]);
    assert!(!frame.windows(4).any(|w| w == b"\x1b[2J"));
    assert_eq!(frame.iter().filter(|&&b| b == b'\r').count(), 1);
}
