pub mod collection;
pub mod commands;
pub mod geometry;
pub mod history;
pub mod room;
pub mod snapshot;
pub mod stats;

pub use collection::RoomCollection;
pub use commands::{AddRoom, Command, MacroCommand};
pub use geometry::{Dimensions, Metrics, RadixRoomFactory, RoomFactory};
pub use history::{CommandHistory, UndoOutcome};
pub use room::{Metric, Room, RoomId};
pub use snapshot::RoomSnapshot;
pub use stats::{StatsReport, StatsSummary, StatsTask};
