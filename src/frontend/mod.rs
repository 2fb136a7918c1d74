//! Frontend module for terminal output
//!
//! Turns the pager state into the bytes written to the terminal each frame.

mod renderer;

pub use renderer::{FrameBuffer, Renderer, RendererConfig};
