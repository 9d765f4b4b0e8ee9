use crate::queue::{TaskId, TaskQueue};
use crate::worker::{Counters, Worker};
use roomcalc_core::{AppConfig, RoomResult, Task};
use serde::Serialize;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub workers: usize,
    /// `None` for an unbounded queue.
    pub queue_capacity: Option<usize>,
}

impl PoolConfig {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            queue_capacity: None,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }
}

impl From<&AppConfig> for PoolConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            workers: config.effective_workers(),
            queue_capacity: config.effective_queue_capacity(),
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub workers: usize,
    pub submitted: u64,
    pub completed: u64,
    pub failed: u64,
    pub pending: usize,
}

/// What happened during [`WorkerPool::shutdown`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ShutdownReport {
    /// Workers that finished and were joined within the grace period.
    pub joined: usize,
    /// Workers still running a task at the deadline, left detached.
    pub abandoned: Vec<usize>,
    /// Queued tasks dropped because the deadline passed before they started.
    pub discarded_tasks: usize,
    pub elapsed_ms: u64,
}

impl ShutdownReport {
    pub fn is_clean(&self) -> bool {
        self.abandoned.is_empty() && self.discarded_tasks == 0
    }
}

/// Fixed set of worker threads draining a shared [`TaskQueue`].
///
/// The pool is not shut down by `Drop`: dropping a running pool only closes
/// the queue and detaches the workers. Call [`WorkerPool::shutdown`] or use
/// [`WorkerPool::scope`].
pub struct WorkerPool {
    queue: Arc<TaskQueue>,
    workers: Vec<Worker>,
    exited_rx: mpsc::Receiver<usize>,
    counters: Arc<Counters>,
    shut_down: bool,
}

impl WorkerPool {
    pub fn start(config: PoolConfig) -> RoomResult<Self> {
        let queue = Arc::new(TaskQueue::new(config.queue_capacity));
        let counters = Arc::new(Counters::default());
        let (exited_tx, exited_rx) = mpsc::channel();

        let mut workers = Vec::with_capacity(config.workers);
        for id in 0..config.workers.max(1) {
            match Worker::spawn(id, queue.clone(), counters.clone(), exited_tx.clone()) {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    queue.close();
                    workers.iter_mut().for_each(Worker::join);
                    return Err(e);
                }
            }
        }

        tracing::info!(
            workers = workers.len(),
            capacity = ?config.queue_capacity,
            "Worker pool started"
        );

        Ok(Self {
            queue,
            workers,
            exited_rx,
            counters,
            shut_down: false,
        })
    }

    /// Run `f` with a started pool and shut the pool down afterwards, even if
    /// `f` panics.
    pub fn scope<R>(
        config: PoolConfig,
        grace: Duration,
        f: impl FnOnce(&WorkerPool) -> R,
    ) -> RoomResult<(R, ShutdownReport)> {
        let mut pool = Self::start(config)?;
        let result = catch_unwind(AssertUnwindSafe(|| f(&pool)));
        let report = pool.shutdown(grace);
        match result {
            Ok(value) => Ok((value, report)),
            Err(panic) => resume_unwind(panic),
        }
    }

    /// Enqueue a task. Blocks while a bounded queue is full.
    ///
    /// Fails with `RoomError::QueueClosed` once shutdown has begun.
    pub fn submit<T: Task + 'static>(&self, task: T) -> RoomResult<TaskId> {
        self.submit_boxed(Box::new(task))
    }

    pub fn submit_boxed(&self, task: Box<dyn Task>) -> RoomResult<TaskId> {
        let name = task.name();
        let id = self.queue.push(task)?;
        tracing::debug!(task_id = id, "Submitted task '{}'", name);
        Ok(id)
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            workers: self.workers.len(),
            submitted: self.queue.submitted(),
            completed: self.counters.completed.load(Ordering::SeqCst),
            failed: self.counters.failed.load(Ordering::SeqCst),
            pending: self.queue.len(),
        }
    }

    /// Stop accepting tasks, let the workers drain the queue, and wait up to
    /// `grace` for them to exit.
    ///
    /// At the deadline any tasks still queued are discarded and workers still
    /// running are abandoned; both are listed in the report. Calling this
    /// again returns an empty report.
    pub fn shutdown(&mut self, grace: Duration) -> ShutdownReport {
        if self.shut_down {
            return ShutdownReport::default();
        }
        self.shut_down = true;

        let started = Instant::now();
        // `None` when the grace is too large to represent: wait without a deadline.
        let deadline = started.checked_add(grace);
        self.queue.close();
        tracing::info!(
            pending = self.queue.len(),
            grace_ms = grace.as_millis() as u64,
            "Shutting down worker pool"
        );

        let mut joined = 0;
        while joined < self.workers.len() {
            let exited = match deadline {
                Some(deadline) => self
                    .exited_rx
                    .recv_timeout(deadline.saturating_duration_since(Instant::now())),
                None => self
                    .exited_rx
                    .recv()
                    .map_err(|_| RecvTimeoutError::Disconnected),
            };
            match exited {
                Ok(id) => {
                    if let Some(worker) = self.workers.iter_mut().find(|w| w.id == id) {
                        worker.join();
                    }
                    joined += 1;
                }
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => {
                    // Every worker thread is gone, some without reporting.
                    self.workers.iter_mut().for_each(Worker::join);
                    joined = self.workers.len();
                    break;
                }
            }
        }

        let mut report = ShutdownReport {
            joined,
            ..ShutdownReport::default()
        };

        // Workers only exit normally once the closed queue is empty, so
        // anything left here was never started.
        report.discarded_tasks = self.queue.cancel();

        if joined < self.workers.len() {
            for worker in self.workers.iter_mut().filter(|w| w.is_running()) {
                worker.abandon();
                report.abandoned.push(worker.id);
            }
            tracing::warn!(
                abandoned = ?report.abandoned,
                discarded = report.discarded_tasks,
                "Grace period expired, abandoning workers"
            );
        } else if report.discarded_tasks > 0 {
            tracing::warn!(
                discarded = report.discarded_tasks,
                "Workers exited with tasks still queued"
            );
        }

        report.elapsed_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            joined = report.joined,
            elapsed_ms = report.elapsed_ms,
            "Worker pool shut down"
        );
        report
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if !self.shut_down {
            tracing::warn!("WorkerPool dropped without shutdown, detaching workers");
            self.queue.close();
        }
    }
}
