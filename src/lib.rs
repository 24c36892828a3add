//! # Tinicly Library
//!
//! Checks and optimizes PNG/JPEG images through the Tinify API.
//!
//! An image counts as already tinified when it is palette-indexed and carries
//! no EXIF metadata: exactly what Tinify produces. Everything else is uploaded,
//! and the file is replaced in place with the compressed result.
//!
//! ## Module architecture:
//! - `config`: run configuration, settings file and validation
//! - `error`: typed errors for top-level and per-file failures
//! - `classifier`: pixel mode and EXIF inspection, tinified verdict
//! - `file_manager`: image discovery and atomic file replacement
//! - `remote`: Tinify shrink API client
//! - `optimizer`: concurrent orchestration of a run
//! - `report`: per-file notices and run summary
//!
//! ## Usage:
//! ```rust,no_run
//! use tinicly::{Config, TinifyClient, TinifyRunner};
//!
//! # async fn example() -> tinicly::Result<()> {
//! let config = Config {
//!     root: "assets/".into(),
//!     token: "my-api-key".to_string(),
//!     ..Default::default()
//! };
//! config.validate()?;
//!
//! let client = TinifyClient::with_endpoint(&config.endpoint)?;
//! let summary = TinifyRunner::new(config, client).run().await?;
//! summary.emit();
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod config;
pub mod error;
pub mod file_manager;
pub mod optimizer;
pub mod remote;
pub mod report;

#[cfg(test)]
mod fixtures;

pub use classifier::{classify, Verdict};
pub use config::Config;
pub use error::{Result, TinifyError};
pub use optimizer::TinifyRunner;
pub use remote::{RemoteOptimizer, TinifyClient};
pub use report::RunSummary;
