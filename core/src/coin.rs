//! Coin tokens — the collectible unit of the game.
//!
//! A token is minted exactly once, when its home cell is generated (or
//! regrown), and is never mutated afterwards. It only ever moves between a
//! cache record and the player's inventory.

use crate::{error::GameError, types::Cell};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CoinToken {
    pub i:      i32,
    pub j:      i32,
    pub serial: u32,
}

impl CoinToken {
    pub const fn new(i: i32, j: i32, serial: u32) -> Self {
        Self { i, j, serial }
    }

    pub fn minted_at(cell: Cell, serial: u32) -> Self {
        Self::new(cell.i, cell.j, serial)
    }

    /// The cell this token was minted in.
    pub fn origin(&self) -> Cell {
        Cell::new(self.i, self.j)
    }

    /// Stable identity: `"i:j#serial"`.
    pub fn id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CoinToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}#{}", self.i, self.j, self.serial)
    }
}

impl FromStr for CoinToken {
    type Err = GameError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        let bad = || GameError::InvalidCoinId { id: id.to_string() };
        let (cell, serial) = id.split_once('#').ok_or_else(bad)?;
        let (i, j) = cell.split_once(':').ok_or_else(bad)?;
        Ok(Self {
            i:      i.parse().map_err(|_| bad())?,
            j:      j.parse().map_err(|_| bad())?,
            serial: serial.parse().map_err(|_| bad())?,
        })
    }
}
