//! Pager Session
//!
//! Ties together terminal mode, key decoding, the viewport and the renderer
//! into the pager's read-decode-move-render loop. Each turn:
//!
//! 1. pick up a pending resize, if any
//! 2. reconcile scroll and render one frame
//! 3. block (with the raw-mode timeout) for one key
//! 4. move the viewport or leave the loop
//!
//! Raw mode is held by a scoped guard for the whole loop, so the terminal is
//! restored however the loop ends.

use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::app::Config;
use crate::core::{Document, Motion, PageDirection, Viewport};
use crate::error::{PagerError, PagerResult};
use crate::frontend::{FrameBuffer, Renderer};
use crate::input::{KeyDecoder, LogicalKey};
use crate::tty::{RawModeGuard, TerminalBackend, TerminalMode};

/// Clear the screen and home the cursor
const CLEAR_SCREEN: &[u8] = b"\x1b[2J\x1b[H";

/// A full-screen pager bound to one terminal
pub struct PagerSession<B: TerminalBackend, R, W> {
    mode: TerminalMode<B>,
    pager: Pager<R, W>,
}

/// Everything the loop touches apart from the terminal mode
struct Pager<R, W> {
    decoder: KeyDecoder<R>,
    output: W,
    renderer: Renderer,
    viewport: Viewport,
    frame: FrameBuffer,
    quit_key: u8,
    resize_pending: Option<Arc<AtomicBool>>,
}

impl<B, R, W> PagerSession<B, R, W>
where
    B: TerminalBackend,
    R: Read,
    W: Write,
{
    /// Create a session on a terminal backend and its input/output streams
    pub fn new(backend: B, input: R, output: W, config: &Config) -> Self {
        let quit_key = config.quit_byte();
        Self {
            mode: TerminalMode::new(backend),
            pager: Pager {
                decoder: KeyDecoder::new(input, quit_key),
                output,
                renderer: Renderer::new(config.renderer_config()),
                viewport: Viewport::default(),
                frame: FrameBuffer::new(),
                quit_key,
                resize_pending: None,
            },
        }
    }

    /// Re-query the terminal size before the next frame whenever `flag` is set
    pub fn with_resize_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.pager.resize_pending = Some(flag);
        self
    }

    pub fn viewport(&self) -> &Viewport {
        &self.pager.viewport
    }

    pub fn mode(&self) -> &TerminalMode<B> {
        &self.mode
    }

    pub fn output(&self) -> &W {
        &self.pager.output
    }

    /// Page through `document` until the quit key is pressed
    ///
    /// Raw mode is entered first and reverted before this returns, on
    /// success and on error alike.
    pub fn run(&mut self, document: &Document) -> PagerResult<()> {
        tracing::info!(lines = document.len(), "starting pager session");

        let mut guard = self.mode.raw()?;
        let result = self.pager.event_loop(&mut guard, document);

        if let Err(e) = self.pager.clear_screen() {
            tracing::warn!("failed to clear screen on exit: {}", e);
        }
        let reverted = guard.release();

        match &result {
            Ok(()) => tracing::info!("pager session ended"),
            Err(e) => tracing::error!("pager session failed: {}", e),
        }
        result.and(reverted)
    }
}

impl<R: Read, W: Write> Pager<R, W> {
    fn event_loop<B: TerminalBackend>(
        &mut self,
        guard: &mut RawModeGuard<'_, B>,
        document: &Document,
    ) -> PagerResult<()> {
        self.viewport.resize(guard.backend_mut().dimensions()?);

        loop {
            if self.take_resize() {
                let size = guard.backend_mut().dimensions()?;
                tracing::debug!(rows = size.rows, cols = size.cols, "terminal resized");
                self.viewport.resize(size);
            }

            self.viewport.reconcile_scroll();
            self.renderer
                .render_into(document, &self.viewport, &mut self.frame);
            self.frame.flush_to(&mut self.output)?;

            let Some(key) = self.decoder.next_key()? else {
                continue;
            };
            if !self.dispatch(key, document.len()) {
                return Ok(());
            }
        }
    }

    /// Apply a key to the viewport; returns `false` when the loop should end
    fn dispatch(&mut self, key: LogicalKey, document_len: usize) -> bool {
        let viewport = &mut self.viewport;
        match key {
            LogicalKey::Quit => return false,
            LogicalKey::Plain(byte) if byte == self.quit_key => return false,
            LogicalKey::ArrowUp => viewport.move_cursor(Motion::Up, document_len),
            LogicalKey::ArrowDown => viewport.move_cursor(Motion::Down, document_len),
            LogicalKey::ArrowLeft => viewport.move_cursor(Motion::Left, document_len),
            LogicalKey::ArrowRight => viewport.move_cursor(Motion::Right, document_len),
            LogicalKey::Home => viewport.move_cursor(Motion::LineStart, document_len),
            LogicalKey::End => viewport.move_cursor(Motion::LineEnd, document_len),
            LogicalKey::PageUp => viewport.page(PageDirection::Up, document_len),
            LogicalKey::PageDown => viewport.page(PageDirection::Down, document_len),
            LogicalKey::Plain(_) | LogicalKey::Unrecognized => {}
        }
        true
    }

    fn take_resize(&self) -> bool {
        self.resize_pending
            .as_ref()
            .is_some_and(|flag| flag.swap(false, Ordering::Relaxed))
    }

    fn clear_screen(&mut self) -> PagerResult<()> {
        self.output
            .write_all(CLEAR_SCREEN)
            .and_then(|()| self.output.flush())
            .map_err(PagerError::Write)
    }
}
