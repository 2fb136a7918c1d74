//! Pager error types

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Broad category of a [`PagerError`], used by callers to pick an exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The terminal device could not be queried, configured, read or written
    TerminalIo,
    /// No document could be supplied to the pager
    Document,
}

/// Errors produced by the pager core
#[derive(Error, Debug)]
pub enum PagerError {
    #[error("Failed to read terminal attributes: {0}")]
    GetAttributes(#[source] nix::Error),

    #[error("Failed to set terminal attributes: {0}")]
    SetAttributes(#[source] nix::Error),

    #[error("Failed to determine terminal size")]
    WindowSize,

    #[error("Failed to read from terminal: {0}")]
    Read(#[source] io::Error),

    #[error("Failed to write to terminal: {0}")]
    Write(#[source] io::Error),

    #[error("Failed to install signal handlers: {0}")]
    Signals(#[source] io::Error),

    #[error("No such document: {}", path.display())]
    DocumentUnavailable { path: PathBuf },

    #[error("Failed to read document {}: {source}", path.display())]
    DocumentRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PagerError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PagerError::DocumentUnavailable { .. } | PagerError::DocumentRead { .. } => {
                ErrorKind::Document
            }
            _ => ErrorKind::TerminalIo,
        }
    }
}

/// Result type for pager operations
pub type PagerResult<T> = Result<T, PagerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind() {
        assert_eq!(
            PagerError::GetAttributes(nix::Error::ENOTTY).kind(),
            ErrorKind::TerminalIo
        );
        assert_eq!(PagerError::WindowSize.kind(), ErrorKind::TerminalIo);
        assert_eq!(
            PagerError::Signals(io::Error::from(io::ErrorKind::PermissionDenied)).kind(),
            ErrorKind::TerminalIo
        );
        assert_eq!(
            PagerError::DocumentUnavailable {
                path: PathBuf::from("missing.txt")
            }
            .kind(),
            ErrorKind::Document
        );
    }

    #[test]
    fn test_error_display() {
        let err = PagerError::DocumentUnavailable {
            path: PathBuf::from("missing.txt"),
        };
        assert_eq!(err.to_string(), "No such document: missing.txt");

        let err = PagerError::Signals(io::Error::new(io::ErrorKind::Other, "no thread"));
        assert_eq!(err.to_string(), "Failed to install signal handlers: no thread");
    }
}
