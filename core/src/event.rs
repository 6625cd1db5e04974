//! Game events — the display-refresh signals handed to the UI layer.
//!
//! Every state-changing controller call returns the events it caused.
//! A call that was rejected (empty cache, empty inventory) returns none.

use crate::{
    coin::CoinToken,
    types::{Cell, LatLng},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    // ── Movement ───────────────────────────────────
    PlayerMoved {
        position: LatLng,
        cell:     Cell,
    },
    PlayerReset {
        position: LatLng,
    },

    // ── Cache lifecycle ────────────────────────────
    CacheSpawned {
        cell:  Cell,
        coins: usize,
    },
    CacheRegrown {
        cell:  Cell,
        coins: usize,
    },
    CachesRefreshed {
        visible: usize,
    },

    // ── Transactions ───────────────────────────────
    CoinCollected {
        cell: Cell,
        coin: CoinToken,
    },
    CoinDeposited {
        cell: Cell,
        coin: CoinToken,
    },
    CacheUpdated {
        cell:  Cell,
        coins: usize,
    },
    InventoryChanged {
        coins: usize,
    },

    // ── Memento ────────────────────────────────────
    WorldRestored {
        position: LatLng,
        caches:   usize,
    },
}
