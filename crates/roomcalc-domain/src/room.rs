use chrono::{DateTime, Utc};
use roomcalc_core::{RoomError, RoomResult};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::geometry::{Dimensions, Metrics};

pub type RoomId = Uuid;

/// Numeric attribute of a room that statistics can be computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Length,
    Width,
    Height,
    Perimeter,
    Area,
    Volume,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Length,
        Metric::Width,
        Metric::Height,
        Metric::Perimeter,
        Metric::Area,
        Metric::Volume,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Length => "length",
            Metric::Width => "width",
            Metric::Height => "height",
            Metric::Perimeter => "perimeter",
            Metric::Area => "area",
            Metric::Volume => "volume",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = RoomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RoomError::Validation(format!("unknown metric '{}'", s)))
    }
}

/// A computed room record.
///
/// Metrics are derived once in the constructor and the fields are private, so
/// a `Room` can never be observed with metrics that disagree with its
/// dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Room {
    id: RoomId,
    length: u32,
    width: u32,
    height: u32,
    perimeter: u64,
    area: u64,
    volume: u64,
    created_at: DateTime<Utc>,
}

impl Room {
    pub fn new(length: u32, width: u32, height: u32) -> RoomResult<Self> {
        Self::from_dimensions(Dimensions::new(length, width, height)?)
    }

    pub fn from_dimensions(dims: Dimensions) -> RoomResult<Self> {
        let metrics = Metrics::compute(&dims)?;
        Ok(Self {
            id: Uuid::new_v4(),
            length: dims.length,
            width: dims.width,
            height: dims.height,
            perimeter: metrics.perimeter,
            area: metrics.area,
            volume: metrics.volume,
            created_at: Utc::now(),
        })
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn perimeter(&self) -> u64 {
        self.perimeter
    }

    pub fn area(&self) -> u64 {
        self.area
    }

    pub fn volume(&self) -> u64 {
        self.volume
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            length: self.length,
            width: self.width,
            height: self.height,
        }
    }

    pub fn metric(&self, metric: Metric) -> u64 {
        match metric {
            Metric::Length => u64::from(self.length),
            Metric::Width => u64::from(self.width),
            Metric::Height => u64::from(self.height),
            Metric::Perimeter => self.perimeter,
            Metric::Area => self.area,
            Metric::Volume => self.volume,
        }
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}x{} (perimeter {}, area {}, volume {})",
            self.length, self.width, self.height, self.perimeter, self.area, self.volume
        )
    }
}
