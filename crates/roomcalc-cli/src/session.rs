use roomcalc_core::{AppConfig, RoomResult, Task};
use roomcalc_domain::{
    AddRoom, Command, CommandHistory, MacroCommand, Metric, RadixRoomFactory, Room,
    RoomCollection, RoomFactory, RoomSnapshot, StatsReport, StatsTask, UndoOutcome,
};
use roomcalc_pool::{PoolConfig, PoolStats, ShutdownReport, TaskId, WorkerPool};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

/// Controller that owns the shared room collection, the undo history and the
/// worker pool.
///
/// Commands run synchronously on the caller's thread; tasks run on the pool
/// concurrently with them. The history is only reachable through `&mut self`,
/// so concurrent undo calls are ruled out by ownership.
pub struct RoomSession {
    rooms: Arc<RoomCollection>,
    history: CommandHistory,
    pool: WorkerPool,
    factory: Box<dyn RoomFactory>,
    grace: Duration,
}

impl RoomSession {
    pub fn new(config: &AppConfig) -> RoomResult<Self> {
        Self::with_pool_config(PoolConfig::from(config), config.effective_shutdown_grace())
    }

    pub fn with_pool_config(pool: PoolConfig, grace: Duration) -> RoomResult<Self> {
        Ok(Self {
            rooms: Arc::new(RoomCollection::new()),
            history: CommandHistory::new(),
            pool: WorkerPool::start(pool)?,
            factory: Box::new(RadixRoomFactory::binary()),
            grace,
        })
    }

    /// Replace the factory used by [`RoomSession::create_room_from_input`].
    pub fn with_factory(mut self, factory: impl RoomFactory + 'static) -> Self {
        self.factory = Box::new(factory);
        self
    }

    pub fn create_room(&self, length: u32, width: u32, height: u32) -> RoomResult<Room> {
        Room::new(length, width, height)
    }

    pub fn create_room_from_input(
        &self,
        length: &str,
        width: &str,
        height: &str,
    ) -> RoomResult<Room> {
        self.factory.create_room(length, width, height)
    }

    pub fn execute_command(&mut self, command: Box<dyn Command>) -> RoomResult<()> {
        self.history.execute_command(command, &self.rooms)
    }

    /// Add one room as its own undoable step and return the stored handle.
    pub fn add_room(&mut self, room: Room) -> RoomResult<Arc<Room>> {
        let room = Arc::new(room);
        self.execute_command(Box::new(AddRoom::from_shared(room.clone())))?;
        Ok(room)
    }

    /// Add several rooms as a single undoable step.
    pub fn add_rooms(&mut self, rooms: Vec<Room>) -> RoomResult<()> {
        let group = rooms
            .into_iter()
            .fold(MacroCommand::labeled("Add rooms"), |group, room| {
                group.with(Box::new(AddRoom::new(room)))
            });
        self.execute_command(Box::new(group))
    }

    pub fn undo_last_command(&mut self) -> RoomResult<UndoOutcome> {
        self.history.undo_last_command(&self.rooms)
    }

    pub fn history_depth(&self) -> usize {
        self.history.depth()
    }

    pub fn history_descriptions(&self) -> Vec<String> {
        self.history.descriptions()
    }

    pub fn submit_task(&self, task: Box<dyn Task>) -> RoomResult<TaskId> {
        self.pool.submit_boxed(task)
    }

    pub fn submit_stats(
        &self,
        metric: Metric,
        reporter: Option<Sender<StatsReport>>,
    ) -> RoomResult<TaskId> {
        let task = StatsTask::new(self.rooms.clone(), metric);
        let task = match reporter {
            Some(tx) => task.with_reporter(tx),
            None => task,
        };
        self.pool.submit(task)
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        self.rooms.snapshot()
    }

    pub fn rooms(&self) -> Arc<RoomCollection> {
        self.rooms.clone()
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Grace period configured for [`RoomSession::shutdown_default`].
    pub fn grace(&self) -> Duration {
        self.grace
    }

    pub fn shutdown(&mut self, grace: Duration) -> ShutdownReport {
        self.pool.shutdown(grace)
    }

    pub fn shutdown_default(&mut self) -> ShutdownReport {
        self.pool.shutdown(self.grace)
    }
}
