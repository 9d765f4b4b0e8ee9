use crate::RoomResult;

/// A read-only unit of asynchronous work run by a worker pool.
///
/// Tasks are run exactly once, on whichever worker dequeues them, and must
/// never mutate shared room state.
pub trait Task: Send {
    /// Short label used in logs and failure reports.
    fn name(&self) -> String;

    fn run(&self) -> RoomResult<()>;
}

impl<F> Task for F
where
    F: Fn() -> RoomResult<()> + Send,
{
    fn name(&self) -> String {
        "closure".to_string()
    }

    fn run(&self) -> RoomResult<()> {
        self()
    }
}
