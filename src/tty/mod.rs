//! Terminal mode handling
//!
//! [`TerminalMode`] owns the switch between cooked and raw mode. It captures
//! the device attributes once on [`enter`](TerminalMode::enter), applies a raw
//! configuration derived from that snapshot, and puts the snapshot back on
//! [`revert`](TerminalMode::revert).
//!
//! The device itself sits behind [`TerminalBackend`] so the lifecycle can be
//! exercised against an in-memory attribute store. [`Tty`] is the real
//! implementation on top of `termios`.

mod size;
#[cfg(unix)]
mod unix;

pub use size::{parse_cursor_report, probe_size, CURSOR_PROBE};
#[cfg(unix)]
pub use unix::{install_cleanup_handlers, restore_saved, SignalGuard, Tty, TtyInput, TtyOutput};

use crate::core::Dimensions;
use crate::error::PagerResult;

/// Access to a terminal device's mode and size
pub trait TerminalBackend {
    /// Opaque snapshot of the device's control configuration
    type Attributes: Clone;

    /// Read the current attributes
    fn attributes(&mut self) -> PagerResult<Self::Attributes>;

    /// Apply attributes to the device
    fn set_attributes(&mut self, attributes: &Self::Attributes) -> PagerResult<()>;

    /// Derive the raw configuration from a cooked snapshot
    fn make_raw(&self, cooked: &Self::Attributes) -> Self::Attributes;

    /// Query the visible size of the device
    fn dimensions(&mut self) -> PagerResult<Dimensions>;
}

/// Cooked/raw mode state machine for one terminal device
pub struct TerminalMode<B: TerminalBackend> {
    backend: B,
    /// Attributes captured on entering raw mode; `Some` while raw
    saved: Option<B::Attributes>,
}

impl<B: TerminalBackend> TerminalMode<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            saved: None,
        }
    }

    /// Check if raw mode is active
    pub fn is_raw(&self) -> bool {
        self.saved.is_some()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Switch the device into raw mode
    ///
    /// Does nothing if raw mode is already active. If applying the raw
    /// attributes fails, the captured snapshot is reapplied before the error
    /// is returned.
    pub fn enter(&mut self) -> PagerResult<()> {
        if self.is_raw() {
            return Ok(());
        }

        let cooked = self.backend.attributes()?;
        let raw = self.backend.make_raw(&cooked);
        self.saved = Some(cooked);

        if let Err(e) = self.backend.set_attributes(&raw) {
            if let Err(revert_err) = self.revert() {
                tracing::warn!("failed to revert after raw mode error: {}", revert_err);
            }
            return Err(e);
        }
        tracing::debug!("entered raw mode");
        Ok(())
    }

    /// Reapply the attributes captured by [`enter`](Self::enter)
    ///
    /// The snapshot is dropped only once it has been applied, so a failed
    /// revert can be retried. Calling this while not in raw mode is a no-op.
    pub fn revert(&mut self) -> PagerResult<()> {
        let Some(cooked) = &self.saved else {
            return Ok(());
        };
        self.backend.set_attributes(cooked)?;
        self.saved = None;
        tracing::debug!("restored terminal attributes");
        Ok(())
    }

    /// Enter raw mode for the lifetime of the returned guard
    pub fn raw(&mut self) -> PagerResult<RawModeGuard<'_, B>> {
        self.enter()?;
        Ok(RawModeGuard { mode: self })
    }
}

/// Scoped raw mode
///
/// Dropping the guard reverts the terminal, which covers early returns,
/// `?` propagation and unwinding. Use [`release`](Self::release) to observe
/// the revert result.
pub struct RawModeGuard<'a, B: TerminalBackend> {
    mode: &'a mut TerminalMode<B>,
}

impl<B: TerminalBackend> RawModeGuard<'_, B> {
    pub fn backend_mut(&mut self) -> &mut B {
        self.mode.backend_mut()
    }

    /// Revert now and report the outcome
    pub fn release(self) -> PagerResult<()> {
        self.mode.revert()
    }
}

impl<B: TerminalBackend> Drop for RawModeGuard<'_, B> {
    fn drop(&mut self) {
        if let Err(e) = self.mode.revert() {
            tracing::warn!("failed to restore terminal: {}", e);
        }
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! In-memory attribute store

    use super::*;
    use crate::error::PagerError;

    /// Attribute snapshot of the mock device
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MockAttributes {
        pub echo: bool,
        pub canonical: bool,
        pub signals: bool,
        pub extended: bool,
        pub post_process: bool,
        pub char_size_8: bool,
        pub vmin: u8,
        pub vtime: u8,
    }

    impl Default for MockAttributes {
        fn default() -> Self {
            Self {
                echo: true,
                canonical: true,
                signals: true,
                extended: true,
                post_process: true,
                char_size_8: false,
                vmin: 1,
                vtime: 0,
            }
        }
    }

    #[derive(Debug, Default)]
    pub struct MockBackend {
        pub current: MockAttributes,
        pub size: Dimensions,
        pub set_calls: usize,
        pub fail_get: bool,
        pub fail_set_raw: bool,
        /// Number of upcoming cooked-mode sets that fail
        pub fail_restore: usize,
    }

    impl TerminalBackend for MockBackend {
        type Attributes = MockAttributes;

        fn attributes(&mut self) -> PagerResult<MockAttributes> {
            if self.fail_get {
                return Err(PagerError::GetAttributes(nix::Error::ENOTTY));
            }
            Ok(self.current)
        }

        fn set_attributes(&mut self, attributes: &MockAttributes) -> PagerResult<()> {
            if self.fail_set_raw && !attributes.canonical {
                return Err(PagerError::SetAttributes(nix::Error::EIO));
            }
            if self.fail_restore > 0 && attributes.canonical {
                self.fail_restore -= 1;
                return Err(PagerError::SetAttributes(nix::Error::EIO));
            }
            self.set_calls += 1;
            self.current = *attributes;
            Ok(())
        }

        fn make_raw(&self, _cooked: &MockAttributes) -> MockAttributes {
            MockAttributes {
                echo: false,
                canonical: false,
                signals: false,
                extended: false,
                post_process: false,
                char_size_8: true,
                vmin: 0,
                vtime: 1,
            }
        }

        fn dimensions(&mut self) -> PagerResult<Dimensions> {
            Ok(self.size)
        }
    }
}
