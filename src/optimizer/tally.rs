//! # Run Tally Module
//!
//! Counters shared by every file task of one run. The two counters only move
//! on successful completion; failures are kept apart with their path so they
//! never distort `already + not_tiny`.

use crate::error::TinifyError;
use crate::report::{FileFailure, RunSummary};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
pub struct RunTally {
    already: AtomicUsize,
    not_tiny: AtomicUsize,
    failures: Mutex<Vec<FileFailure>>,
}

impl RunTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// File was already tinified
    pub fn add_already(&self) {
        self.already.fetch_add(1, Ordering::Relaxed);
    }

    /// File was tinified, or flagged in check mode
    pub fn add_not_tiny(&self) {
        self.not_tiny.fetch_add(1, Ordering::Relaxed);
    }

    pub async fn add_failure(&self, path: &Path, error: &TinifyError) {
        self.failures.lock().await.push(FileFailure {
            path: path.to_path_buf(),
            error: error.to_string(),
        });
    }

    pub fn already(&self) -> usize {
        self.already.load(Ordering::Relaxed)
    }

    pub fn not_tiny(&self) -> usize {
        self.not_tiny.load(Ordering::Relaxed)
    }

    /// Tasks that completed successfully
    pub fn completed(&self) -> usize {
        self.already() + self.not_tiny()
    }

    /// Close the tally into the run summary
    pub fn into_summary(self, check: bool, fail_on_error: bool) -> RunSummary {
        let mut failures = self.failures.into_inner();
        failures.sort_by(|a, b| a.path.cmp(&b.path));

        RunSummary {
            already: self.already.into_inner(),
            not_tiny: self.not_tiny.into_inner(),
            failures,
            check,
            fail_on_error,
        }
    }
}
