use parking_lot::{Condvar, Mutex};
use roomcalc_core::{RoomError, RoomResult, Task};
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Sequence number assigned at submission; dequeue order follows it.
pub type TaskId = u64;

pub struct QueuedTask {
    pub id: TaskId,
    pub task: Box<dyn Task>,
}

struct QueueState {
    pending: VecDeque<QueuedTask>,
    next_id: TaskId,
    /// No new submissions; pending work may still be drained.
    closed: bool,
    /// Pending work discarded; workers stop dequeuing.
    cancelled: bool,
}

/// Blocking FIFO of pending tasks, optionally bounded.
///
/// `push` blocks while a bounded queue is full, `pop` blocks while it is empty
/// and open. Once closed, `push` fails with [`RoomError::QueueClosed`] and
/// `pop` keeps returning tasks until the queue is drained.
pub struct TaskQueue {
    state: Mutex<QueueState>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: Option<usize>,
}

impl TaskQueue {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            state: Mutex::new(QueueState {
                pending: VecDeque::new(),
                next_id: 0,
                closed: false,
                cancelled: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity: capacity.map(|c| c.max(1)),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn push(&self, task: Box<dyn Task>) -> RoomResult<TaskId> {
        let mut state = self.state.lock();
        while !state.closed && self.is_full(&state) {
            self.not_full.wait(&mut state);
        }
        if state.closed {
            return Err(RoomError::QueueClosed);
        }

        let id = state.next_id;
        state.next_id += 1;
        state.pending.push_back(QueuedTask { id, task });
        self.not_empty.notify_one();
        Ok(id)
    }

    /// Take the oldest pending task, waiting for one if necessary.
    ///
    /// Returns `None` once the queue is closed and drained, or cancelled.
    pub fn pop(&self) -> Option<QueuedTask> {
        let mut state = self.state.lock();
        loop {
            if state.cancelled {
                return None;
            }
            if let Some(job) = state.pending.pop_front() {
                self.not_full.notify_one();
                return Some(job);
            }
            if state.closed {
                return None;
            }
            self.not_empty.wait(&mut state);
        }
    }

    /// Stop accepting new tasks. Blocked submitters are woken and rejected.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    /// Close the queue and discard every pending task.
    ///
    /// Returns how many tasks were discarded.
    pub fn cancel(&self) -> usize {
        let discarded: Vec<QueuedTask> = {
            let mut state = self.state.lock();
            state.closed = true;
            state.cancelled = true;
            self.not_empty.notify_all();
            self.not_full.notify_all();
            state.pending.drain(..).collect()
        };

        let count = discarded.len();
        // Dropped outside the lock; a panicking `Drop` must not escape.
        for job in discarded {
            let id = job.id;
            if catch_unwind(AssertUnwindSafe(move || drop(job))).is_err() {
                tracing::warn!(task_id = id, "Discarded task panicked while dropping");
            }
        }
        count
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn len(&self) -> usize {
        self.state.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().pending.is_empty()
    }

    /// Total number of tasks ever accepted.
    pub fn submitted(&self) -> u64 {
        self.state.lock().next_id
    }

    fn is_full(&self, state: &QueueState) -> bool {
        self.capacity
            .is_some_and(|capacity| state.pending.len() >= capacity)
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn noop() -> Box<dyn Task> {
        Box::new(|| -> RoomResult<()> { Ok(()) })
    }

    #[test]
    fn test_fifo_dequeue() {
        let queue = TaskQueue::unbounded();
        let ids: Vec<TaskId> = (0..5).map(|_| queue.push(noop()).unwrap()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);

        queue.close();
        let popped: Vec<TaskId> = std::iter::from_fn(|| queue.pop().map(|job| job.id)).collect();
        assert_eq!(popped, ids);
    }

    #[test]
    fn test_push_after_close_rejected() {
        let queue = TaskQueue::unbounded();
        queue.close();
        let err = queue.push(noop()).unwrap_err();
        assert!(matches!(err, RoomError::QueueClosed));
        assert_eq!(queue.submitted(), 0);
    }

    #[test]
    fn test_closed_queue_still_drains() {
        let queue = TaskQueue::unbounded();
        queue.push(noop()).unwrap();
        queue.push(noop()).unwrap();
        queue.close();

        assert!(queue.pop().is_some());
        assert!(queue.pop().is_some());
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_cancel_discards_pending() {
        let queue = TaskQueue::unbounded();
        for _ in 0..3 {
            queue.push(noop()).unwrap();
        }
        assert_eq!(queue.cancel(), 3);
        assert!(queue.pop().is_none());
        assert!(queue.is_closed());
    }

    #[test]
    fn test_bounded_push_blocks_until_space() {
        let queue = Arc::new(TaskQueue::new(Some(1)));
        queue.push(noop()).unwrap();

        let (tx, rx) = mpsc::channel();
        let producer = {
            let queue = queue.clone();
            thread::spawn(move || {
                let id = queue.push(noop()).unwrap();
                tx.send(id).unwrap();
            })
        };

        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
        assert_eq!(queue.pop().unwrap().id, 0);
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 1);
        producer.join().unwrap();
    }

    #[test]
    fn test_close_wakes_blocked_producer() {
        let queue = Arc::new(TaskQueue::new(Some(1)));
        queue.push(noop()).unwrap();

        let producer = {
            let queue = queue.clone();
            thread::spawn(move || queue.push(noop()))
        };

        thread::sleep(Duration::from_millis(50));
        queue.close();
        let result = producer.join().unwrap();
        assert!(matches!(result, Err(RoomError::QueueClosed)));
    }

    #[test]
    fn test_pop_wakes_on_push() {
        let queue = Arc::new(TaskQueue::unbounded());
        let consumer = {
            let queue = queue.clone();
            thread::spawn(move || queue.pop().map(|job| job.id))
        };

        thread::sleep(Duration::from_millis(20));
        queue.push(noop()).unwrap();
        assert_eq!(consumer.join().unwrap(), Some(0));
    }

    #[test]
    fn test_zero_capacity_treated_as_one() {
        let queue = TaskQueue::new(Some(0));
        assert_eq!(queue.capacity(), Some(1));
    }
}
