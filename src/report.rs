//! # Report Module
//!
//! User-facing console output: one notice per finished file, then one
//! summary line per run. Notices are printed as soon as a file finishes, in
//! completion order. Diagnostics go through `tracing` instead.
//!
//! ## Example output:
//! ```text
//! ✅ already tiny: assets/logo.png
//! ✅  tinified ok: assets/hero.jpg
//! ❌ failed: assets/broken.png: PNG decoding error: ...
//! ❎ 1 files already tiny, 1 tinified, 1 failed
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Completion notice for a single file
#[derive(Debug)]
pub enum Notice<'a> {
    AlreadyTiny(&'a Path),
    NotTinified(&'a Path),
    Tinified(&'a Path),
    Failed(&'a Path, &'a str),
}

impl Notice<'_> {
    pub fn message(&self) -> String {
        match self {
            Notice::AlreadyTiny(path) => format!("✅ already tiny: {}", path.display()),
            Notice::NotTinified(path) => format!("❎ not tinified: {}", path.display()),
            Notice::Tinified(path) => format!("✅  tinified ok: {}", path.display()),
            Notice::Failed(path, error) => format!("❌ failed: {}: {}", path.display(), error),
        }
    }

    /// Print the notice on stdout
    pub fn emit(&self) {
        println!("{}", self.message());
    }
}

/// A file whose task raised an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Final state of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Files already tinified
    pub already: usize,
    /// Files tinified in this run, or flagged in check mode
    pub not_tiny: usize,
    pub failures: Vec<FileFailure>,
    pub check: bool,
    pub fail_on_error: bool,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        if self.check && self.not_tiny > 0 {
            return false;
        }
        !(self.fail_on_error && !self.failures.is_empty())
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }

    pub fn message(&self) -> String {
        let glyph = if self.is_success() { "✅" } else { "❎" };

        let mut message = if !self.check {
            format!("{} {} files already tiny, {} tinified", glyph, self.already, self.not_tiny)
        } else if self.not_tiny > 0 {
            format!(
                "{} {} files already tiny, {} are not tiny",
                glyph, self.already, self.not_tiny
            )
        } else {
            format!("{} {} files already tiny, no files to tinify", glyph, self.already)
        };

        if !self.failures.is_empty() {
            message.push_str(&format!(", {} failed", self.failures.len()));
        }
        message
    }

    /// Print the summary line on stdout
    pub fn emit(&self) {
        println!("{}", self.message());
    }
}
