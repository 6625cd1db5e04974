//! Shared primitive types used across the game core.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A grid cell coordinate. `i` runs along latitude, `j` along longitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub i: i32,
    pub j: i32,
}

impl Cell {
    pub const fn new(i: i32, j: i32) -> Self {
        Self { i, j }
    }

    /// Registry / snapshot key: `"i,j"`.
    pub fn key(&self) -> String {
        format!("{},{}", self.i, self.j)
    }

    /// Inverse of [`Cell::key`]. Returns `None` for anything that is not
    /// exactly two comma-separated integers.
    pub fn parse_key(key: &str) -> Option<Self> {
        let (i, j) = key.split_once(',')?;
        Some(Self {
            i: i.trim().parse().ok()?,
            j: j.trim().parse().ok()?,
        })
    }

    /// Neighbouring cell. Saturates at the edge of the grid.
    pub fn offset(&self, di: i32, dj: i32) -> Self {
        Self { i: self.i.saturating_add(di), j: self.j.saturating_add(dj) }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.i, self.j)
    }
}

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// One of the four movement buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North, // lat +
    South, // lat -
    East,  // lng +
    West,  // lng -
}

impl Direction {
    /// Unit step as (lat sign, lng sign).
    pub fn delta(&self) -> (f64, f64) {
        match self {
            Self::North => ( 1.0,  0.0),
            Self::South => (-1.0,  0.0),
            Self::East  => ( 0.0,  1.0),
            Self::West  => ( 0.0, -1.0),
        }
    }
}
