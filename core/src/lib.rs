//! Core state model for a location-based coin collecting game.
//!
//! The player walks a latitude/longitude grid. Some cells hold caches of
//! uniquely identified coins, which the player collects and deposits. The
//! whole world can be saved to, and restored from, a single string.

pub mod coin;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod inventory;
pub mod luck;
pub mod registry;
pub mod snapshot;
pub mod types;

pub use coin::CoinToken;
pub use config::GameConfig;
pub use controller::{CacheView, GameController};
pub use error::{GameError, GameResult};
pub use event::GameEvent;
pub use inventory::Inventory;
pub use luck::{HashedLuck, LuckOracle};
pub use registry::{CacheRecord, CacheRegistry};
pub use snapshot::{DecodedWorld, WorldSnapshot};
pub use types::{Cell, Direction, LatLng};
