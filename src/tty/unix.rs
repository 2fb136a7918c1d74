//! Unix terminal device
//!
//! Raw mode on top of `termios(3)`, reading and writing the controlling
//! terminal through stdin/stdout file descriptors.
//!
//! # References
//!
//! - termios(3): https://man7.org/linux/man-pages/man3/termios.3.html
//! - tty_ioctl(4): https://man7.org/linux/man-pages/man4/tty_ioctl.4.html

use std::io::{self, Read, Write};
use std::os::unix::io::RawFd;
use std::sync::{Mutex, OnceLock, PoisonError};
use std::thread::JoinHandle;

use nix::libc::{self, STDIN_FILENO, STDOUT_FILENO};
use nix::sys::termios::{
    self, ControlFlags, LocalFlags, OutputFlags, SetArg, SpecialCharacterIndices, Termios,
};
use nix::unistd::{read, write};
use signal_hook::consts::signal::{SIGHUP, SIGQUIT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};

use super::size::probe_size;
use super::TerminalBackend;
use crate::core::Dimensions;
use crate::error::{PagerError, PagerResult};

/// Cooked attributes of the controlling terminal, for restoring from a
/// panic hook or signal handler thread
static SAVED: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Show cursor
const SHOW_CURSOR: &[u8] = b"\x1b[?25h";

/// The controlling terminal on stdin/stdout
#[derive(Debug, Clone, Copy)]
pub struct Tty {
    /// Raw-mode read timeout in tenths of a second (VTIME)
    read_timeout_ds: u8,
}

impl Tty {
    pub fn new(read_timeout_ds: u8) -> Self {
        Self { read_timeout_ds }
    }

    /// Check if stdout is attached to a terminal
    pub fn is_terminal() -> bool {
        nix::unistd::isatty(STDOUT_FILENO).unwrap_or(false)
    }
}

impl Default for Tty {
    fn default() -> Self {
        Self::new(1)
    }
}

impl TerminalBackend for Tty {
    type Attributes = Termios;

    fn attributes(&mut self) -> PagerResult<Termios> {
        let attributes = termios::tcgetattr(io::stdin()).map_err(PagerError::GetAttributes)?;
        let mut saved = SAVED.lock().unwrap_or_else(PoisonError::into_inner);
        if saved.is_none() {
            *saved = Some(attributes.clone().into());
        }
        Ok(attributes)
    }

    fn set_attributes(&mut self, attributes: &Termios) -> PagerResult<()> {
        termios::tcsetattr(io::stdin(), SetArg::TCSAFLUSH, attributes)
            .map_err(PagerError::SetAttributes)
    }

    fn make_raw(&self, cooked: &Termios) -> Termios {
        let mut raw = cooked.clone();
        raw.output_flags.remove(OutputFlags::OPOST);
        raw.control_flags.insert(ControlFlags::CS8);
        raw.local_flags
            .remove(LocalFlags::ECHO | LocalFlags::ICANON | LocalFlags::IEXTEN | LocalFlags::ISIG);
        // Return after 0 bytes or one read timeout, whichever comes first
        raw.control_chars[SpecialCharacterIndices::VMIN as usize] = 0;
        raw.control_chars[SpecialCharacterIndices::VTIME as usize] = self.read_timeout_ds;
        raw
    }

    fn dimensions(&mut self) -> PagerResult<Dimensions> {
        match window_size(STDOUT_FILENO) {
            Some(size) => Ok(size),
            None => {
                tracing::debug!("TIOCGWINSZ unavailable, probing cursor position");
                probe_size(&mut TtyInput, &mut TtyOutput)
            }
        }
    }
}

/// Get the window size of a terminal file descriptor
///
/// Returns `None` if the ioctl fails or reports a zero width.
fn window_size(fd: RawFd) -> Option<Dimensions> {
    let mut winsize = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };

    // SAFETY: TIOCGWINSZ is a valid ioctl for getting window size
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut winsize) };

    if result < 0 || winsize.ws_col == 0 {
        None
    } else {
        Some(Dimensions::new(
            winsize.ws_row as usize,
            winsize.ws_col as usize,
        ))
    }
}

/// Unbuffered reads from stdin
///
/// In raw mode a read returns `Ok(0)` once the VTIME timeout expires.
#[derive(Debug, Default, Clone, Copy)]
pub struct TtyInput;

impl Read for TtyInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match read(STDIN_FILENO, buf) {
            Ok(n) => Ok(n),
            // EAGAIN and EWOULDBLOCK are the same value on Linux
            Err(nix::errno::Errno::EAGAIN) => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}

/// Unbuffered writes to stdout
///
/// Each `write` is one `write(2)` call, so a composed frame reaches the
/// terminal without being split at newlines the way `io::Stdout` would.
#[derive(Debug, Default, Clone, Copy)]
pub struct TtyOutput;

impl Write for TtyOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        write(STDOUT_FILENO, buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Put back the attributes captured when raw mode was first entered
///
/// Safe to call from any thread and more than once; does nothing if raw
/// mode was never entered.
pub fn restore_saved() {
    let saved = *SAVED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(cooked) = saved {
        let _ = TtyOutput.write_all(SHOW_CURSOR);
        let _ = termios::tcsetattr(io::stdin(), SetArg::TCSAFLUSH, &Termios::from(cooked));
    }
}

/// Install a panic hook and termination signal handlers that restore the
/// terminal before the process goes away
///
/// The handlers stay active until the returned guard is dropped.
pub fn install_cleanup_handlers() -> PagerResult<SignalGuard> {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore_saved();
            previous(info);
        }));
    });
    SignalGuard::new()
}

/// Background thread turning SIGTERM/SIGHUP/SIGQUIT into a terminal
/// restore followed by exit
#[derive(Debug)]
pub struct SignalGuard {
    handle: Handle,
    thread: Option<JoinHandle<()>>,
}

impl SignalGuard {
    fn new() -> PagerResult<Self> {
        let mut signals =
            Signals::new([SIGTERM, SIGHUP, SIGQUIT]).map_err(PagerError::Signals)?;
        let handle = signals.handle();
        let thread = std::thread::spawn(move || {
            if let Some(signal) = signals.forever().next() {
                tracing::warn!(signal, "termination signal received, restoring terminal");
                restore_saved();
                std::process::exit(128 + signal);
            }
        });
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
