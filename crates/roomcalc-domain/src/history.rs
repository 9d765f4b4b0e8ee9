//! Undo history management.
//!
//! Keeps executed commands on a LIFO stack so the most recent one can be
//! reversed. The history is owned by a single controller and takes `&mut self`
//! for every mutation; callers on several threads must serialize access
//! themselves (for example behind a `Mutex`).

use crate::commands::Command;
use crate::RoomCollection;
use roomcalc_core::RoomResult;
use serde::Serialize;
use std::fmt;

/// Result of asking the history to undo its latest command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UndoOutcome {
    Undone { description: String },
    NothingToUndo,
}

impl UndoOutcome {
    pub fn is_undone(&self) -> bool {
        matches!(self, UndoOutcome::Undone { .. })
    }
}

/// Stack of executed commands (most recent = back of vec).
#[derive(Default)]
pub struct CommandHistory {
    undo_stack: Vec<Box<dyn Command>>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute a command on the calling thread and record it.
    ///
    /// A command whose `execute` fails is not recorded.
    pub fn execute_command(
        &mut self,
        command: Box<dyn Command>,
        rooms: &RoomCollection,
    ) -> RoomResult<()> {
        let description = command.description();
        tracing::debug!("Executing: {}", description);

        command.execute(rooms)?;
        self.undo_stack.push(command);

        tracing::debug!(depth = self.undo_stack.len(), "Recorded: {}", description);
        Ok(())
    }

    /// Pop the most recent command and reverse it.
    ///
    /// An empty history is an expected condition and yields
    /// [`UndoOutcome::NothingToUndo`] without touching the collection.
    pub fn undo_last_command(&mut self, rooms: &RoomCollection) -> RoomResult<UndoOutcome> {
        let Some(command) = self.undo_stack.pop() else {
            tracing::info!("Nothing to undo");
            return Ok(UndoOutcome::NothingToUndo);
        };

        let description = command.description();
        command.undo(rooms)?;
        tracing::info!("Undone: {}", description);

        Ok(UndoOutcome::Undone { description })
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Get undo stack depth (for status display).
    pub fn depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Descriptions of recorded commands, most recent first.
    pub fn descriptions(&self) -> Vec<String> {
        self.undo_stack
            .iter()
            .rev()
            .map(|c| c.description())
            .collect()
    }

    /// Forget all recorded commands without undoing them.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
    }
}

impl fmt::Debug for CommandHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandHistory")
            .field("depth", &self.undo_stack.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MockCommand;
    use crate::commands::{AddRoom, MacroCommand};
    use crate::Room;
    use roomcalc_core::RoomError;

    fn add(l: u32, w: u32) -> Box<dyn Command> {
        Box::new(AddRoom::new(Room::new(l, w, 1).unwrap()))
    }

    #[test]
    fn test_basic_undo() {
        let rooms = RoomCollection::new();
        let mut history = CommandHistory::new();
        let before = rooms.snapshot();

        history.execute_command(add(3, 4), &rooms).unwrap();
        assert!(history.can_undo());
        assert_eq!(rooms.len(), 1);

        let outcome = history.undo_last_command(&rooms).unwrap();
        assert!(outcome.is_undone());
        assert!(!history.can_undo());
        assert!(rooms.snapshot().same_rooms(&before));
    }

    #[test]
    fn test_empty_undo_is_not_an_error() {
        let rooms = RoomCollection::new();
        rooms.add(std::sync::Arc::new(Room::new(1, 1, 1).unwrap()));
        let before = rooms.snapshot();
        let mut history = CommandHistory::new();

        let outcome = history.undo_last_command(&rooms).unwrap();
        assert_eq!(outcome, UndoOutcome::NothingToUndo);
        assert!(rooms.snapshot().same_rooms(&before));
    }

    #[test]
    fn test_lifo_order() {
        let rooms = RoomCollection::new();
        let mut history = CommandHistory::new();
        history.execute_command(add(1, 1), &rooms).unwrap();
        history.execute_command(add(2, 2), &rooms).unwrap();

        let outcome = history.undo_last_command(&rooms).unwrap();
        match outcome {
            UndoOutcome::Undone { description } => assert!(description.contains("2x2x1")),
            other => panic!("unexpected outcome: {:?}", other),
        }
        let remaining = rooms.snapshot();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining.rooms()[0].area(), 1);
    }

    #[test]
    fn test_failed_execute_not_recorded() {
        let rooms = RoomCollection::new();
        let mut history = CommandHistory::new();

        let mut cmd = MockCommand::new();
        cmd.expect_description().return_const("bad".to_string());
        cmd.expect_execute()
            .times(1)
            .returning(|_| Err(RoomError::Validation("rejected".to_string())));
        cmd.expect_undo().never();

        assert!(history.execute_command(Box::new(cmd), &rooms).is_err());
        assert_eq!(history.depth(), 0);
    }

    #[test]
    fn test_each_command_undone_once() {
        let rooms = RoomCollection::new();
        let mut history = CommandHistory::new();

        let mut cmd = MockCommand::new();
        cmd.expect_description().return_const("once".to_string());
        cmd.expect_execute().times(1).returning(|_| Ok(()));
        cmd.expect_undo().times(1).returning(|_| Ok(()));

        history.execute_command(Box::new(cmd), &rooms).unwrap();
        assert!(history.undo_last_command(&rooms).unwrap().is_undone());
        assert_eq!(
            history.undo_last_command(&rooms).unwrap(),
            UndoOutcome::NothingToUndo
        );
    }

    #[test]
    fn test_macro_is_single_entry() {
        let rooms = RoomCollection::new();
        let mut history = CommandHistory::new();

        let group = MacroCommand::new().with(add(1, 1)).with(add(2, 2)).with(add(3, 3));
        history.execute_command(Box::new(group), &rooms).unwrap();
        assert_eq!(history.depth(), 1);
        assert_eq!(rooms.len(), 3);

        history.undo_last_command(&rooms).unwrap();
        assert!(rooms.is_empty());
        assert_eq!(history.depth(), 0);
    }

    #[test]
    fn test_descriptions_and_clear() {
        let rooms = RoomCollection::new();
        let mut history = CommandHistory::new();
        history.execute_command(add(1, 1), &rooms).unwrap();
        history.execute_command(add(2, 2), &rooms).unwrap();

        let descriptions = history.descriptions();
        assert_eq!(descriptions.len(), 2);
        assert!(descriptions[0].contains("2x2x1"));

        history.clear();
        assert_eq!(history.depth(), 0);
        assert_eq!(rooms.len(), 2);
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(UndoOutcome::NothingToUndo).unwrap();
        assert_eq!(json["outcome"], "nothing_to_undo");
    }
}
