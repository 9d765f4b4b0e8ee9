//! Geometry calculator and room factories.
//!
//! Turns raw dimension input into validated [`Dimensions`] and derives the
//! [`Metrics`] every [`Room`] carries. Nothing here is shared between threads.

use crate::Room;
use roomcalc_core::{RoomError, RoomResult};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub length: u32,
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Validate that every dimension is strictly positive.
    pub fn new(length: u32, width: u32, height: u32) -> RoomResult<Self> {
        for (name, value) in [("length", length), ("width", width), ("height", height)] {
            if value == 0 {
                return Err(RoomError::Validation(format!("{} must be positive", name)));
            }
        }
        Ok(Self {
            length,
            width,
            height,
        })
    }

    /// Parse three dimension strings written in the given radix.
    pub fn parse(length: &str, width: &str, height: &str, radix: u32) -> RoomResult<Self> {
        Self::new(
            parse_dimension("length", length, radix)?,
            parse_dimension("width", width, radix)?,
            parse_dimension("height", height, radix)?,
        )
    }
}

fn parse_dimension(name: &str, raw: &str, radix: u32) -> RoomResult<u32> {
    let trimmed = raw.trim();
    u32::from_str_radix(trimmed, radix).map_err(|e| {
        RoomError::Validation(format!(
            "invalid {} '{}' (base {}): {}",
            name, trimmed, radix, e
        ))
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub perimeter: u64,
    pub area: u64,
    pub volume: u64,
}

impl Metrics {
    pub fn compute(dims: &Dimensions) -> RoomResult<Self> {
        let length = u64::from(dims.length);
        let width = u64::from(dims.width);
        let height = u64::from(dims.height);

        let overflow = || RoomError::Validation("room dimensions overflow".to_string());

        // l + w and l * w cannot overflow u64 for u32 inputs; the volume can.
        let perimeter = 2 * (length + width);
        let area = length * width;
        let volume = area.checked_mul(height).ok_or_else(overflow)?;

        Ok(Self {
            perimeter,
            area,
            volume,
        })
    }
}

/// Builds rooms from textual dimension input.
pub trait RoomFactory: Send + Sync {
    fn create_room(&self, length: &str, width: &str, height: &str) -> RoomResult<Room>;
}

/// Factory that reads dimensions written in a fixed radix.
#[derive(Debug, Clone, Copy)]
pub struct RadixRoomFactory {
    radix: u32,
}

impl RadixRoomFactory {
    pub fn binary() -> Self {
        Self { radix: 2 }
    }

    pub fn decimal() -> Self {
        Self { radix: 10 }
    }

    pub fn radix(&self) -> u32 {
        self.radix
    }
}

impl RoomFactory for RadixRoomFactory {
    fn create_room(&self, length: &str, width: &str, height: &str) -> RoomResult<Room> {
        let dims = Dimensions::parse(length, width, height, self.radix)?;
        Room::from_dimensions(dims)
    }
}
