pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use config::AppConfig;
pub use error::RoomError;
pub use result::RoomResult;
pub use traits::Task;
