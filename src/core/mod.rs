//! Pager Core Module
//!
//! Platform-independent pager state. This module contains:
//! - Screen geometry (positions and dimensions)
//! - The viewport: cursor, scroll offset and scroll reconciliation
//! - The document line store and its load-time preprocessing
//!
//! Nothing in here performs terminal I/O; the same sequence of operations
//! always produces the same state.

mod document;
mod geometry;
mod viewport;

pub use document::{Document, LoadOptions};
pub use geometry::{Dimensions, Position};
pub use viewport::{Motion, PageDirection, Viewport};
