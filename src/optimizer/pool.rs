//! # Worker Pool Module
//!
//! Bounded pool for blocking work (image decoding, directory walks, file
//! writes). Jobs run on tokio's blocking threads; a semaphore caps how many
//! run at once so a large tree cannot saturate the disk.

use crate::error::{Result, TinifyError};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::debug;

#[derive(Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        debug!("Worker pool with {} blocking workers", size);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Run a blocking job once a worker is free
    pub async fn run<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| TinifyError::PoolClosed)?;
        Ok(tokio::task::spawn_blocking(job).await?)
    }
}
