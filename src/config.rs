//! # Configuration Management Module
//!
//! Holds the immutable configuration of one run.
//!
//! ## Parameters:
//! - `root`: file or directory to process
//! - `token`: Tinify API credential (empty in check mode)
//! - `check`: report only, never upload or rewrite files
//! - `workers`: size of the blocking worker pool (decode, walk, file reads and writes)
//! - `max_uploads`: concurrent requests against the Tinify API
//! - `endpoint`: URL of the shrink endpoint
//! - `fail_on_error`: whether a single failed file fails the whole run
//!
//! `workers`, `max_uploads`, `endpoint` and `fail_on_error` can be loaded from
//! a JSON settings file. The credential and the root path never are.
//!
//! ## Example:
//! ```rust,no_run
//! # use tinicly::Config;
//! let config = Config {
//!     root: "assets/".into(),
//!     check: true,
//!     ..Default::default()
//! };
//! config.validate()?;
//! # Ok::<(), tinicly::TinifyError>(())
//! ```

use crate::error::{Result, TinifyError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Production shrink endpoint of the Tinify API
pub const SHRINK_ENDPOINT: &str = "https://api.tinify.com/shrink";

/// Environment variable holding the fallback credential
pub const TOKEN_ENV: &str = "TINIFY_KEY";

/// Configuration for a tinify run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File or directory to process
    #[serde(skip)]
    pub root: PathBuf,
    /// Tinify API token
    #[serde(skip)]
    pub token: String,
    /// Check-only mode
    #[serde(skip)]
    pub check: bool,
    /// Number of blocking workers
    pub workers: usize,
    /// Maximum number of concurrent uploads
    pub max_uploads: usize,
    /// Shrink endpoint URL
    pub endpoint: String,
    /// Treat any per-file failure as a failed run
    pub fail_on_error: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            token: String::new(),
            check: false,
            workers: default_workers(),
            max_uploads: 8,
            endpoint: SHRINK_ENDPOINT.to_string(),
            fail_on_error: true,
        }
    }
}

fn default_workers() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4);
    (cpus + 4).min(32)
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !self.check && self.token.is_empty() {
            return Err(TinifyError::MissingToken);
        }

        if self.workers == 0 {
            return Err(TinifyError::Validation(
                "number of workers must be greater than 0".to_string(),
            ));
        }

        if self.max_uploads == 0 {
            return Err(TinifyError::Validation(
                "maximum uploads must be greater than 0".to_string(),
            ));
        }

        let endpoint = reqwest::Url::parse(&self.endpoint).map_err(|e| {
            TinifyError::Validation(format!("invalid endpoint {}: {}", self.endpoint, e))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(TinifyError::Validation(format!(
                "endpoint must be an http(s) URL: {}",
                self.endpoint
            )));
        }

        Ok(())
    }

    /// Load settings from a JSON file, using defaults for missing keys
    pub async fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save settings to a JSON file
    pub async fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

/// Pick the credential: the CLI value first, then the environment.
/// Empty strings count as absent.
pub fn resolve_token(cli: Option<String>, env: Option<String>) -> Option<String> {
    cli.filter(|t| !t.is_empty())
        .or_else(|| env.filter(|t| !t.is_empty()))
}
