use super::Command;
use crate::RoomCollection;
use roomcalc_core::RoomResult;

/// A group of commands executed and undone as one history entry.
///
/// Sub-commands execute in insertion order and are undone in strict reverse
/// order. Execution is all-or-nothing: if a sub-command fails, the ones that
/// already ran are undone before the error is returned.
#[derive(Default)]
pub struct MacroCommand {
    label: Option<String>,
    commands: Vec<Box<dyn Command>>,
}

impl MacroCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            commands: Vec::new(),
        }
    }

    pub fn push(&mut self, command: Box<dyn Command>) {
        self.commands.push(command);
    }

    pub fn with(mut self, command: Box<dyn Command>) -> Self {
        self.push(command);
        self
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn rollback(&self, executed: usize, rooms: &RoomCollection) {
        for command in self.commands[..executed].iter().rev() {
            if let Err(e) = command.undo(rooms) {
                tracing::warn!("Rollback of '{}' failed: {}", command.description(), e);
            }
        }
    }
}

impl Command for MacroCommand {
    fn execute(&self, rooms: &RoomCollection) -> RoomResult<()> {
        for (index, command) in self.commands.iter().enumerate() {
            if let Err(e) = command.execute(rooms) {
                tracing::warn!(
                    "Macro step {} ('{}') failed, rolling back {} step(s)",
                    index,
                    command.description(),
                    index
                );
                self.rollback(index, rooms);
                return Err(e);
            }
        }
        Ok(())
    }

    fn undo(&self, rooms: &RoomCollection) -> RoomResult<()> {
        let mut first_error = None;
        for command in self.commands.iter().rev() {
            if let Err(e) = command.undo(rooms) {
                tracing::warn!("Undo of '{}' failed: {}", command.description(), e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn description(&self) -> String {
        match &self.label {
            Some(label) => format!("{} ({} commands)", label, self.commands.len()),
            None => format!("Macro ({} commands)", self.commands.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MockCommand;
    use crate::commands::AddRoom;
    use crate::Room;
    use mockall::Sequence;
    use roomcalc_core::RoomError;
    use std::sync::{Arc, Mutex};

    /// Records every execute/undo into a shared log.
    struct Recording {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Command for Recording {
        fn execute(&self, _rooms: &RoomCollection) -> RoomResult<()> {
            self.log.lock().unwrap().push(format!("exec {}", self.name));
            Ok(())
        }

        fn undo(&self, _rooms: &RoomCollection) -> RoomResult<()> {
            self.log.lock().unwrap().push(format!("undo {}", self.name));
            Ok(())
        }

        fn description(&self) -> String {
            self.name.to_string()
        }
    }

    #[test]
    fn test_undo_runs_in_reverse_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut macro_cmd = MacroCommand::new();
        for name in ["C1", "C2", "C3"] {
            macro_cmd.push(Box::new(Recording {
                name,
                log: log.clone(),
            }));
        }

        let rooms = RoomCollection::new();
        macro_cmd.execute(&rooms).unwrap();
        macro_cmd.undo(&rooms).unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["exec C1", "exec C2", "exec C3", "undo C3", "undo C2", "undo C1"]
        );
    }

    #[test]
    fn test_failed_step_rolls_back_executed_steps() {
        let mut seq = Sequence::new();

        let mut first = MockCommand::new();
        first
            .expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        first.expect_description().return_const("first".to_string());

        let mut failing = MockCommand::new();
        failing
            .expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(RoomError::Validation("nope".to_string())));
        failing.expect_undo().never();
        failing
            .expect_description()
            .return_const("failing".to_string());

        first
            .expect_undo()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let mut never_run = MockCommand::new();
        never_run.expect_execute().never();
        never_run.expect_undo().never();

        let macro_cmd = MacroCommand::new()
            .with(Box::new(first))
            .with(Box::new(failing))
            .with(Box::new(never_run));

        let rooms = RoomCollection::new();
        let err = macro_cmd.execute(&rooms).unwrap_err();
        assert!(matches!(err, RoomError::Validation(_)));
    }

    #[test]
    fn test_macro_of_rooms_is_one_unit() {
        let rooms = RoomCollection::new();
        let macro_cmd = MacroCommand::labeled("Add rooms")
            .with(Box::new(AddRoom::new(Room::new(3, 4, 1).unwrap())))
            .with(Box::new(AddRoom::new(Room::new(5, 6, 1).unwrap())));

        macro_cmd.execute(&rooms).unwrap();
        assert_eq!(rooms.len(), 2);

        macro_cmd.undo(&rooms).unwrap();
        assert!(rooms.is_empty());
        assert_eq!(macro_cmd.description(), "Add rooms (2 commands)");
    }

    #[test]
    fn test_undo_continues_past_failures() {
        let mut broken = MockCommand::new();
        broken
            .expect_undo()
            .times(1)
            .returning(|_| Err(RoomError::Internal("stuck".to_string())));
        broken.expect_description().return_const("broken".to_string());

        let mut fine = MockCommand::new();
        fine.expect_undo().times(1).returning(|_| Ok(()));

        // `fine` is last, so it is undone first; `broken` still gets its turn.
        let macro_cmd = MacroCommand::new()
            .with(Box::new(broken))
            .with(Box::new(fine));

        let err = macro_cmd.undo(&RoomCollection::new()).unwrap_err();
        assert!(matches!(err, RoomError::Internal(_)));
    }
}
