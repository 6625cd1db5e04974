//! World snapshot (memento) — full game state to/from a JSON string.
//!
//! The string is the only persistence surface, so its shape is fixed:
//!
//! ```json
//! {
//!   "playerPosition": { "lat": 36.9894, "lng": -122.0627 },
//!   "playerCoins": 1,
//!   "cacheStates": [["2,-3", "[{\"i\":2,\"j\":-3,\"serial\":0}]"]],
//!   "inventory": [{ "i": 2, "j": -3, "serial": 1 }]
//! }
//! ```
//!
//! Each `cacheStates` entry holds a cell key and that cell's own encoded
//! token list. `inventory` may be absent in older strings, in which case
//! `playerCoins` must be 0.
//!
//! RULE: Restoring is all-or-nothing. The whole string is parsed and
//! validated into a `DecodedWorld` before the registry is touched.

use crate::{
    coin::CoinToken,
    error::{GameError, GameResult},
    inventory::Inventory,
    registry::{decode_coins, encode_coins, CacheRegistry},
    types::{Cell, LatLng},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldSnapshot {
    pub player_position: LatLng,
    pub player_coins:    u64,
    pub cache_states:    Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory:       Option<Vec<CoinToken>>,
}

impl WorldSnapshot {
    /// Capture the player and every record the registry holds.
    pub fn capture(
        position:  LatLng,
        inventory: &Inventory,
        registry:  &CacheRegistry,
    ) -> GameResult<Self> {
        let cache_states = registry
            .iter()
            .map(|record| -> GameResult<(String, String)> {
                Ok((record.cell.key(), encode_coins(&record.coins)?))
            })
            .collect::<GameResult<Vec<_>>>()?;
        Ok(Self {
            player_position: position,
            player_coins:    inventory.len() as u64,
            cache_states,
            inventory:       Some(inventory.as_slice().to_vec()),
        })
    }

    pub fn encode(&self) -> GameResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn parse(data: &str) -> GameResult<Self> {
        Ok(serde_json::from_str(data)?)
    }

    /// Validate everything and decode every per-cell string.
    pub fn decode(&self) -> GameResult<DecodedWorld> {
        let LatLng { lat, lng } = self.player_position;
        if !lat.is_finite() || !lng.is_finite() {
            return Err(GameError::MalformedSnapshot {
                reason: format!("player position {lat},{lng} is not finite"),
            });
        }

        let inventory = self.inventory.clone().unwrap_or_default();
        if inventory.len() as u64 != self.player_coins {
            return Err(GameError::InventoryMismatch {
                player_coins: self.player_coins,
                inventory:    inventory.len(),
            });
        }

        let mut seen_cells = BTreeSet::new();
        let mut caches = Vec::with_capacity(self.cache_states.len());
        for (key, data) in &self.cache_states {
            let cell = Cell::parse_key(key)
                .ok_or_else(|| GameError::InvalidCellKey { key: key.clone() })?;
            if !seen_cells.insert(cell) {
                return Err(GameError::MalformedSnapshot {
                    reason: format!("cell {cell} recorded twice"),
                });
            }
            caches.push((cell, decode_coins(data)?));
        }

        // Single ownership: a token lives in exactly one place. The last
        // serial is reserved so every cell can still name a fresh one.
        let mut seen_coins = BTreeSet::new();
        let all_coins = caches.iter().flat_map(|(_, coins)| coins).chain(&inventory);
        for coin in all_coins {
            if coin.serial == u32::MAX {
                return Err(GameError::MalformedSnapshot {
                    reason: format!("coin {coin} uses the reserved serial"),
                });
            }
            if !seen_coins.insert(*coin) {
                return Err(GameError::MalformedSnapshot {
                    reason: format!("coin {coin} held twice"),
                });
            }
        }

        Ok(DecodedWorld {
            position: self.player_position,
            caches,
            inventory: Inventory::from_coins(inventory),
        })
    }

    /// Parse, validate and apply `data` to `registry` in one step.
    /// On error the registry is untouched.
    pub fn restore(data: &str, registry: &mut CacheRegistry) -> GameResult<(LatLng, Inventory)> {
        let decoded = Self::parse(data)?.decode()?;
        Ok(decoded.apply(registry))
    }
}

/// A fully validated snapshot, ready to be written back.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedWorld {
    pub position:  LatLng,
    pub caches:    Vec<(Cell, Vec<CoinToken>)>,
    pub inventory: Inventory,
}

impl DecodedWorld {
    /// Write every recorded cell into `registry`, creating records as
    /// needed. Cells absent from the snapshot are left alone.
    pub fn apply(self, registry: &mut CacheRegistry) -> (LatLng, Inventory) {
        for (cell, coins) in &self.caches {
            registry.save(*cell, coins.clone());
        }
        // Home records may have been written after the cells now holding
        // their coins, so observe everything once all records exist.
        let all_coins = self.caches.iter().flat_map(|(_, coins)| coins).chain(self.inventory.iter());
        for coin in all_coins {
            registry.observe(coin);
        }
        (self.position, self.inventory)
    }
}
