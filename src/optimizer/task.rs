//! # File Task Module
//!
//! Unit of work for a single image:
//!
//! ```text
//! classify ─┬─ already optimized ─────────────────────────────► AlreadyTiny
//!           ├─ needs optimization, check mode ────────────────► Flagged
//!           └─ needs optimization ─ read ─ upload ─ replace ──► Tinified
//! ```
//!
//! Any error aborts the task before the tally is touched. The file itself is
//! only rewritten once the optimized bytes are fully downloaded. A file is
//! only read once its upload slot is granted, so at most `max_uploads`
//! originals are held in memory.

use crate::classifier::{self, Verdict};
use crate::config::Config;
use crate::error::{Result, TinifyError};
use crate::file_manager::FileManager;
use crate::optimizer::pool::WorkerPool;
use crate::optimizer::tally::RunTally;
use crate::remote::RemoteOptimizer;
use crate::report::Notice;
use std::path::Path;
use tokio::sync::Semaphore;
use tracing::debug;

/// How a file task ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    AlreadyTiny,
    /// Needs optimization, reported only (check mode)
    Flagged,
    Tinified {
        original_size: u64,
        optimized_size: u64,
    },
}

/// Per-file worker borrowing the run's shared resources
pub struct FileTask<'a, O> {
    pub config: &'a Config,
    pub optimizer: &'a O,
    pub pool: &'a WorkerPool,
    pub uploads: &'a Semaphore,
    pub tally: &'a RunTally,
}

impl<O: RemoteOptimizer> FileTask<'_, O> {
    /// Process one image
    pub async fn process(&self, path: &Path) -> Result<TaskOutcome> {
        let verdict = {
            let path = path.to_path_buf();
            self.pool.run(move || classifier::classify(&path)).await??
        };

        match verdict {
            Verdict::AlreadyOptimized => {
                self.tally.add_already();
                Notice::AlreadyTiny(path).emit();
                Ok(TaskOutcome::AlreadyTiny)
            }
            Verdict::NeedsOptimization if self.config.check => {
                self.tally.add_not_tiny();
                Notice::NotTinified(path).emit();
                Ok(TaskOutcome::Flagged)
            }
            Verdict::NeedsOptimization => self.tinify(path).await,
        }
    }

    async fn tinify(&self, path: &Path) -> Result<TaskOutcome> {
        let (original_size, optimized) = {
            let _permit = self
                .uploads
                .acquire()
                .await
                .map_err(|_| TinifyError::PoolClosed)?;

            let original = {
                let path = path.to_path_buf();
                self.pool.run(move || std::fs::read(path)).await??
            };
            let original_size = original.len() as u64;
            let optimized = self.optimizer.optimize(original, &self.config.token).await?;
            (original_size, optimized)
        };
        let optimized_size = optimized.bytes.len() as u64;

        {
            let path = path.to_path_buf();
            let bytes = optimized.bytes;
            self.pool
                .run(move || FileManager::replace_contents(&path, &bytes))
                .await??;
        }

        debug!(
            "{}: {} -> {} bytes",
            path.display(),
            original_size,
            optimized_size
        );

        self.tally.add_not_tiny();
        Notice::Tinified(path).emit();
        Ok(TaskOutcome::Tinified {
            original_size,
            optimized_size,
        })
    }
}
