//! Fixed-size worker pool draining a FIFO task queue.
//!
//! Tasks are dequeued in submission order by whichever worker is free, so
//! completion order across workers is not guaranteed. Pools must be shut down
//! explicitly with [`WorkerPool::shutdown`] or used through
//! [`WorkerPool::scope`].

pub mod pool;
pub mod queue;
mod worker;

pub use pool::{PoolConfig, PoolStats, ShutdownReport, WorkerPool};
pub use queue::{QueuedTask, TaskId, TaskQueue};
