//! Page: a full-screen terminal pager
//!
//! This crate provides the pager engine:
//!
//! - `tty`: raw mode entry/exit, terminal size discovery
//! - `input`: decoding raw input bytes into logical keys
//! - `core`: documents, geometry and the scrolling viewport
//! - `frontend`: composing flicker-free frames
//! - `session`: the read-decode-move-render loop
//! - `app`: configuration

pub mod app;
pub mod core;
pub mod error;
pub mod frontend;
pub mod input;
pub mod session;
pub mod tty;

pub use error::{ErrorKind, PagerError, PagerResult};
pub use session::PagerSession;
