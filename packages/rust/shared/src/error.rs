//! Error types for guidebook.
//!
//! Library crates use [`GuidebookError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all guidebook operations.
///
/// Only [`GuidebookError::Discovery`] aborts a run. A `Fetch` error is
/// recorded in the run metadata and the page is skipped; an `Extraction`
/// error downgrades the page to empty content; a `Render` error skips that
/// output format.
#[derive(Debug, thiserror::Error)]
pub enum GuidebookError {
    /// No guide pages could be discovered from the root page.
    #[error("discovery failed: {reason}")]
    Discovery { reason: String },

    /// A single page could not be fetched after all attempts and fallbacks.
    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// Page structure could not be mapped to content blocks.
    #[error("extraction failed: {reason}")]
    Extraction { reason: String },

    /// An output format could not be rendered.
    #[error("render error: {0}")]
    Render(String),

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, GuidebookError>;

impl GuidebookError {
    /// Create a discovery error from any displayable message.
    pub fn discovery(reason: impl Into<String>) -> Self {
        Self::Discovery {
            reason: reason.into(),
        }
    }

    /// Create a per-page fetch error.
    pub fn fetch(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create an extraction error from any displayable message.
    pub fn extraction(reason: impl Into<String>) -> Self {
        Self::Extraction {
            reason: reason.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
