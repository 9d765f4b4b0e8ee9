//! Point-in-time capture of the shared room collection.
//!
//! A `RoomSnapshot` owns its own list of room handles, so it can be iterated,
//! serialized or handed to another thread without holding the collection lock.

use crate::{Metric, Room, RoomId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct RoomSnapshot {
    rooms: Vec<Arc<Room>>,
    taken_at: DateTime<Utc>,
}

impl RoomSnapshot {
    pub(crate) fn new(rooms: Vec<Arc<Room>>) -> Self {
        Self {
            rooms,
            taken_at: Utc::now(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn rooms(&self) -> &[Arc<Room>] {
        &self.rooms
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Room>> {
        self.rooms.iter()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    pub fn ids(&self) -> Vec<RoomId> {
        self.rooms.iter().map(|r| r.id()).collect()
    }

    pub fn values(&self, metric: Metric) -> Vec<u64> {
        self.rooms.iter().map(|r| r.metric(metric)).collect()
    }

    /// True when both snapshots hold the same room handles in the same order.
    pub fn same_rooms(&self, other: &RoomSnapshot) -> bool {
        self.rooms.len() == other.rooms.len()
            && self
                .rooms
                .iter()
                .zip(other.rooms.iter())
                .all(|(a, b)| Arc::ptr_eq(a, b))
    }
}

impl<'a> IntoIterator for &'a RoomSnapshot {
    type Item = &'a Arc<Room>;
    type IntoIter = std::slice::Iter<'a, Arc<Room>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rooms.iter()
    }
}
