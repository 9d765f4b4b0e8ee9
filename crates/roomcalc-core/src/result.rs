use crate::error::RoomError;

pub type RoomResult<T> = Result<T, RoomError>;
