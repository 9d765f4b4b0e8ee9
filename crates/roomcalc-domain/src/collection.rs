use crate::{Room, RoomSnapshot};
use parking_lot::RwLock;
use std::sync::Arc;

/// Thread-safe, ordered, duplicate-tolerant collection of rooms.
///
/// Writers take the lock exclusively for a single push or remove; snapshot
/// readers share it and copy out the room handles, so no reader ever sees a
/// half-applied mutation and nobody iterates while holding the lock.
#[derive(Debug, Default)]
pub struct RoomCollection {
    rooms: RwLock<Vec<Arc<Room>>>,
}

impl RoomCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, room: Arc<Room>) {
        tracing::trace!(room_id = %room.id(), "Adding room");
        self.rooms.write().push(room);
    }

    /// Remove the first entry that is the very same room handle.
    ///
    /// Returns `false` if the room is not present. Value-equal rooms held
    /// through other handles are left alone.
    pub fn remove(&self, room: &Arc<Room>) -> bool {
        let mut rooms = self.rooms.write();
        match rooms.iter().position(|r| Arc::ptr_eq(r, room)) {
            Some(pos) => {
                rooms.remove(pos);
                tracing::trace!(room_id = %room.id(), "Removed room");
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, room: &Arc<Room>) -> bool {
        self.rooms.read().iter().any(|r| Arc::ptr_eq(r, room))
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        let rooms = self.rooms.read().clone();
        RoomSnapshot::new(rooms)
    }

    pub fn len(&self) -> usize {
        self.rooms.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.read().is_empty()
    }
}
