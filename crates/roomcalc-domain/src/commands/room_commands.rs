use super::Command;
use crate::{Room, RoomCollection};
use roomcalc_core::RoomResult;
use std::sync::Arc;

/// Add a single computed room to the collection.
///
/// Undo removes exactly this room handle, wherever it now sits in the
/// collection.
pub struct AddRoom {
    room: Arc<Room>,
}

impl AddRoom {
    pub fn new(room: Room) -> Self {
        Self {
            room: Arc::new(room),
        }
    }

    pub fn from_shared(room: Arc<Room>) -> Self {
        Self { room }
    }

    pub fn room(&self) -> &Arc<Room> {
        &self.room
    }
}

impl Command for AddRoom {
    fn execute(&self, rooms: &RoomCollection) -> RoomResult<()> {
        rooms.add(Arc::clone(&self.room));
        Ok(())
    }

    fn undo(&self, rooms: &RoomCollection) -> RoomResult<()> {
        if !rooms.remove(&self.room) {
            tracing::debug!(room_id = %self.room.id(), "Room already gone on undo");
        }
        Ok(())
    }

    fn description(&self) -> String {
        format!("Add room {}", self.room)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_then_undo_restores_collection() {
        let rooms = RoomCollection::new();
        rooms.add(Arc::new(Room::new(1, 1, 1).unwrap()));
        let before = rooms.snapshot();

        let cmd = AddRoom::new(Room::new(3, 4, 5).unwrap());
        cmd.execute(&rooms).unwrap();
        assert_eq!(rooms.len(), 2);
        assert!(rooms.contains(cmd.room()));

        cmd.undo(&rooms).unwrap();
        assert!(rooms.snapshot().same_rooms(&before));
    }

    #[test]
    fn test_undo_removes_own_room_not_tail() {
        let rooms = RoomCollection::new();
        let cmd = AddRoom::new(Room::new(2, 2, 2).unwrap());
        cmd.execute(&rooms).unwrap();

        let later = Arc::new(Room::new(9, 9, 9).unwrap());
        rooms.add(later.clone());

        cmd.undo(&rooms).unwrap();
        let snapshot = rooms.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert!(Arc::ptr_eq(&snapshot.rooms()[0], &later));
    }

    #[test]
    fn test_description_mentions_dimensions() {
        let cmd = AddRoom::new(Room::new(3, 4, 5).unwrap());
        assert!(cmd.description().starts_with("Add room 3x4x5"));
    }
}
