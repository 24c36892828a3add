//! # Optimizer Module
//!
//! Concurrent tinify pipeline, split into submodules:
//! - `runner`: top-level orchestrator of a run
//! - `task`: worker for a single file
//! - `tally`: counters shared between tasks
//! - `pool`: bounded pool for blocking work

pub mod pool;
pub mod runner;
pub mod tally;
pub mod task;

pub use pool::WorkerPool;
pub use runner::TinifyRunner;
pub use tally::RunTally;
pub use task::{FileTask, TaskOutcome};
