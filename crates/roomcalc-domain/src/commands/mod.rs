use crate::RoomCollection;
use roomcalc_core::RoomResult;

pub mod macro_command;
pub mod room_commands;

pub use macro_command::*;
pub use room_commands::*;

/// Trait for reversible commands that mutate the shared room collection.
///
/// `undo` after `execute` must restore the collection to its prior state for
/// this command's own effect, whatever other commands did in between.
#[cfg_attr(test, mockall::automock)]
pub trait Command: Send + Sync {
    /// Apply this command to the collection.
    fn execute(&self, rooms: &RoomCollection) -> RoomResult<()>;

    /// Reverse the effect of a previous `execute`.
    fn undo(&self, rooms: &RoomCollection) -> RoomResult<()>;

    /// Human-readable description of what this command does
    fn description(&self) -> String;
}
