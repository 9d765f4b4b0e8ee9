use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoomError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Task queue is closed")]
    QueueClosed,

    #[error("Task '{task}' failed: {message}")]
    TaskFailed { task: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RoomError {
    /// True for conditions the caller is expected to handle and carry on from.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::QueueClosed)
    }
}
