//! # Tinify Runner
//!
//! Orchestrates one run: discovers the images, drives every file task
//! concurrently from a single coordinating future, and folds the results into
//! a `RunSummary`.
//!
//! ## Resources:
//! - `WorkerPool`: blocking work (decode, walk, file reads and replacement)
//! - upload semaphore: caps concurrent requests to the Tinify API
//! - `RunTally`: the only state shared between tasks
//!
//! All tasks are awaited before `run` returns, so no work outlives it.

use crate::config::Config;
use crate::error::Result;
use crate::file_manager::FileManager;
use crate::optimizer::pool::WorkerPool;
use crate::optimizer::tally::RunTally;
use crate::optimizer::task::FileTask;
use crate::remote::RemoteOptimizer;
use crate::report::{Notice, RunSummary};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Drives a tinify run over the configured root
pub struct TinifyRunner<O> {
    config: Config,
    optimizer: O,
    pool: WorkerPool,
    uploads: Semaphore,
}

impl<O: RemoteOptimizer> TinifyRunner<O> {
    pub fn new(config: Config, optimizer: O) -> Self {
        let pool = WorkerPool::new(config.workers);
        let uploads = Semaphore::new(config.max_uploads);

        Self {
            config,
            optimizer,
            pool,
            uploads,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Process every image under the root.
    ///
    /// Fails only on top-level errors (root does not exist). Per-file errors
    /// are reported as they happen and collected in the summary.
    pub async fn run(&self) -> Result<RunSummary> {
        let root = self.config.root.clone();
        let files = self
            .pool
            .run(move || FileManager::discover(&root))
            .await??;

        info!(
            "Found {} images under {} ({} mode)",
            files.len(),
            self.config.root.display(),
            if self.config.check { "check" } else { "tinify" }
        );

        let tally = RunTally::new();
        let task = FileTask {
            config: &self.config,
            optimizer: &self.optimizer,
            pool: &self.pool,
            uploads: &self.uploads,
            tally: &tally,
        };

        let mut pending: FuturesUnordered<_> = files
            .iter()
            .map(|path| {
                let task = &task;
                async move { (path, task.process(path).await) }
            })
            .collect();

        while let Some((path, result)) = pending.next().await {
            match result {
                Ok(outcome) => debug!("{}: {:?}", path.display(), outcome),
                Err(e) => {
                    warn!("Failed to process {}: {}", path.display(), e);
                    let error = e.to_string();
                    Notice::Failed(path, &error).emit();
                    tally.add_failure(path, &e).await;
                }
            }
        }
        drop(pending);

        Ok(tally.into_summary(self.config.check, self.config.fail_on_error))
    }
}
