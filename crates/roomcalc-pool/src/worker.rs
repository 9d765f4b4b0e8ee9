use crate::queue::{QueuedTask, TaskQueue};
use roomcalc_core::{RoomError, RoomResult};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub(crate) completed: AtomicU64,
    pub(crate) failed: AtomicU64,
}

pub(crate) struct Worker {
    pub(crate) id: usize,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawn a worker thread that drains `queue` until it is closed and empty
    /// (or cancelled), then reports its id on `exited`.
    pub(crate) fn spawn(
        id: usize,
        queue: Arc<TaskQueue>,
        counters: Arc<Counters>,
        exited: mpsc::Sender<usize>,
    ) -> RoomResult<Self> {
        let handle = thread::Builder::new()
            .name(format!("roomcalc-worker-{}", id))
            .spawn(move || {
                tracing::debug!(worker = id, "Worker started");
                while let Some(job) = queue.pop() {
                    run_job(id, job, &counters);
                }
                tracing::debug!(worker = id, "Worker exiting");
                let _ = exited.send(id);
            })?;

        Ok(Self {
            id,
            handle: Some(handle),
        })
    }

    pub(crate) fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub(crate) fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!(worker = self.id, "Worker thread panicked");
            }
        }
    }

    /// Give up on the thread; it keeps running detached until its current
    /// task returns.
    pub(crate) fn abandon(&mut self) {
        self.handle.take();
    }
}

fn run_job(worker: usize, job: QueuedTask, counters: &Counters) {
    let task_id = job.id;
    let name = job.task.name();
    tracing::debug!(worker, task_id, "Running task '{}'", name);

    // The task is dropped inside the guard too, so a panicking `Drop` is
    // contained like a panicking `run`.
    let result = catch_unwind(AssertUnwindSafe(move || {
        let QueuedTask { task, .. } = job;
        task.run()
    }));

    match result {
        Ok(Ok(())) => {
            counters.completed.fetch_add(1, Ordering::SeqCst);
            tracing::debug!(worker, task_id, "Task '{}' completed", name);
        }
        Ok(Err(e)) => {
            counters.failed.fetch_add(1, Ordering::SeqCst);
            if e.is_recoverable() {
                tracing::warn!(worker, task_id, "Task '{}' failed: {}", name, e);
            } else {
                tracing::error!(worker, task_id, "Task '{}' failed: {}", name, e);
            }
        }
        Err(panic) => {
            counters.failed.fetch_add(1, Ordering::SeqCst);
            let err = RoomError::TaskFailed {
                task: name,
                message: panic_message(panic.as_ref()),
            };
            tracing::error!(worker, task_id, "{}", err);
        }
    }
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_extraction() {
        let caught = catch_unwind(|| panic!("static message")).unwrap_err();
        assert_eq!(panic_message(caught.as_ref()), "static message");

        let caught = catch_unwind(|| panic!("formatted {}", 7)).unwrap_err();
        assert_eq!(panic_message(caught.as_ref()), "formatted 7");

        let caught = catch_unwind(|| std::panic::panic_any(42u8)).unwrap_err();
        assert_eq!(panic_message(caught.as_ref()), "Unknown panic");
    }
}
