//! # Error Types Module
//!
//! All error types raised by tinicly.
//!
//! ## Categories:
//! - **Top-level** (`MissingToken`, `Validation`, `PathNotFound`): abort the run
//!   before any file is touched.
//! - **Per-file** (everything else): local to one file task, recorded in the
//!   run tally with the offending path.
//!
//! The binary wraps these in `anyhow` for setup failures; the library always
//! returns the typed `TinifyError`.

use std::path::PathBuf;

/// Custom error types for tinifying runs
#[derive(thiserror::Error, Debug)]
pub enum TinifyError {
    #[error("No token provided, and TINIFY_KEY not set")]
    MissingToken,

    #[error("Invalid configuration: {0}")]
    Validation(String),

    #[error("{} does not exist", .0.display())]
    PathNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("PNG decoding error: {0}")]
    Png(#[from] png::DecodingError),

    #[error("Unsupported image format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Tinify API returned {status} for {url}: {message}")]
    RemoteService {
        status: reqwest::StatusCode,
        url: String,
        message: String,
    },

    #[error("Tinify API response has no Location header")]
    MissingLocation,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Worker pool task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("Worker pool is closed")]
    PoolClosed,
}

impl TinifyError {
    /// Whether the error aborts the whole run rather than a single file
    pub fn is_top_level(&self) -> bool {
        matches!(
            self,
            Self::MissingToken | Self::Validation(_) | Self::PathNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TinifyError>;
