//! The game controller — owns one session's world and player.
//!
//! RULES:
//!   - The registry is owned here and only here. Nothing else keeps a
//!     handle to it between calls.
//!   - Every call runs to completion before the next one starts.
//!   - All randomness flows through the luck oracle.
//!   - The player's coin count is the inventory size. There is no
//!     separate counter to drift out of sync.
//!
//! REFRESH ORDER (per cell, row-major over the neighbourhood):
//!   1. Cell holds coins            -> shown.
//!   2. Cell has no record          -> generated and shown iff the spawn roll passes.
//!   3. Cell has an empty record    -> hidden, unless regrowth is enabled
//!                                     and the spawn roll passes, then regrown.

use crate::{
    coin::CoinToken,
    config::GameConfig,
    error::{GameError, GameResult},
    event::GameEvent,
    inventory::Inventory,
    luck::{spawn_key, LuckOracle},
    registry::CacheRegistry,
    snapshot::{DecodedWorld, WorldSnapshot},
    types::{Cell, Direction, LatLng},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What the UI shows for one cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheView {
    pub cell:  Cell,
    pub coins: Vec<CoinToken>,
}

impl CacheView {
    pub fn count(&self) -> usize {
        self.coins.len()
    }

    pub fn describe(&self) -> String {
        format!("There is a cache here at \"{}\". It has {} coins.", self.cell, self.count())
    }
}

pub struct GameController {
    config:    GameConfig,
    luck:      Box<dyn LuckOracle>,
    registry:  CacheRegistry,
    inventory: Inventory,
    position:  LatLng,
    visible:   BTreeSet<Cell>,
}

impl GameController {
    /// A controller at the origin with nothing generated yet.
    pub fn new(config: GameConfig, luck: Box<dyn LuckOracle>) -> Self {
        Self {
            position:  config.origin,
            config,
            luck,
            registry:  CacheRegistry::new(),
            inventory: Inventory::new(),
            visible:   BTreeSet::new(),
        }
    }

    /// A controller with the starting neighbourhood already populated.
    /// Call this instead of new() + refresh().
    pub fn build(config: GameConfig, luck: Box<dyn LuckOracle>) -> GameResult<Self> {
        let mut controller = Self::new(config, luck);
        controller.refresh()?;
        Ok(controller)
    }

    /// Like build(), but starting from an existing registry. The
    /// controller takes sole ownership of it.
    pub fn with_registry(
        config:   GameConfig,
        luck:     Box<dyn LuckOracle>,
        registry: CacheRegistry,
    ) -> GameResult<Self> {
        let mut controller = Self { registry, ..Self::new(config, luck) };
        controller.refresh()?;
        Ok(controller)
    }

    // ── Accessors ──────────────────────────────────────────────

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn registry(&self) -> &CacheRegistry {
        &self.registry
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn coin_count(&self) -> usize {
        self.inventory.len()
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    pub fn player_cell(&self) -> Cell {
        self.config.cell_of(self.position)
    }

    pub fn visible_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.visible.iter().copied()
    }

    pub fn is_visible(&self, cell: Cell) -> bool {
        self.visible.contains(&cell)
    }

    pub fn cache_view(&self, cell: Cell) -> CacheView {
        CacheView { cell, coins: self.registry.coins(cell).to_vec() }
    }

    // ── Movement ───────────────────────────────────────────────

    /// Step one cell in `direction` and refresh the neighbourhood.
    pub fn move_player(&mut self, direction: Direction) -> GameResult<Vec<GameEvent>> {
        let (dlat, dlng) = direction.delta();
        self.position = LatLng::new(
            self.position.lat + dlat * self.config.tile_degrees,
            self.position.lng + dlng * self.config.tile_degrees,
        );
        log::debug!("player moved {direction:?} to {}", self.player_cell());

        let mut events = vec![GameEvent::PlayerMoved {
            position: self.position,
            cell:     self.player_cell(),
        }];
        events.extend(self.refresh()?);
        Ok(events)
    }

    /// Back to the origin with an empty inventory. Held coins are
    /// returned to no cache.
    pub fn reset(&mut self) -> GameResult<Vec<GameEvent>> {
        let dropped = self.inventory.len();
        self.position = self.config.origin;
        self.inventory.clear();
        log::info!("player reset, {dropped} held coins dropped");

        let mut events = vec![
            GameEvent::PlayerReset { position: self.position },
            GameEvent::InventoryChanged { coins: 0 },
        ];
        events.extend(self.refresh()?);
        Ok(events)
    }

    /// Recompute which caches around the player are shown, generating
    /// unseen cells as needed.
    pub fn refresh(&mut self) -> GameResult<Vec<GameEvent>> {
        let center = self.player_cell();
        let cells: Vec<Cell> = self.config.neighborhood(center).collect();
        let mut events = Vec::new();
        let mut visible = BTreeSet::new();

        for cell in cells {
            let depleted = self.registry.get(cell).map(|record| record.is_empty());
            let shown = match depleted {
                Some(false) => true,
                Some(true) => {
                    if self.config.allow_cache_regrowth && self.spawn_roll_passes(cell) {
                        match self.registry.regrow(cell, self.luck.as_ref()) {
                            Ok(coins) => {
                                events.push(GameEvent::CacheRegrown { cell, coins: coins.len() });
                                true
                            }
                            Err(e) => {
                                log::warn!("cache at {cell} stays depleted: {e}");
                                false
                            }
                        }
                    } else {
                        false
                    }
                }
                None => {
                    if self.spawn_roll_passes(cell) {
                        let coins = self.registry.generate(cell, self.luck.as_ref())?.len();
                        events.push(GameEvent::CacheSpawned { cell, coins });
                        true
                    } else {
                        false
                    }
                }
            };
            if shown {
                visible.insert(cell);
            }
        }

        log::debug!("refresh around {center}: {} caches visible", visible.len());
        events.push(GameEvent::CachesRefreshed { visible: visible.len() });
        self.visible = visible;
        Ok(events)
    }

    fn spawn_roll_passes(&self, cell: Cell) -> bool {
        self.luck.luck(&spawn_key(cell)) < self.config.cache_spawn_probability
    }

    // ── Transactions ───────────────────────────────────────────

    /// Move the cache's last coin into the inventory.
    /// An empty cache is a silent no-op. Any cell is accepted; offering
    /// the action only on caches in view is up to the UI.
    pub fn collect(&mut self, cell: Cell) -> Vec<GameEvent> {
        let mut coins = self.registry.coins(cell).to_vec();
        let Some(coin) = coins.pop() else {
            log::trace!("collect at {cell} ignored: cache empty");
            return Vec::new();
        };
        let remaining = coins.len();
        self.registry.save(cell, coins);
        self.inventory.add(coin);
        log::debug!("collected {coin} from {cell}");

        vec![
            GameEvent::CoinCollected { cell, coin },
            GameEvent::CacheUpdated { cell, coins: remaining },
            GameEvent::InventoryChanged { coins: self.inventory.len() },
        ]
    }

    /// Move the most recently collected coin onto the cache's tail.
    /// An empty inventory is a silent no-op.
    pub fn deposit(&mut self, cell: Cell) -> Vec<GameEvent> {
        let Some(coin) = self.inventory.remove_last() else {
            log::trace!("deposit at {cell} ignored: inventory empty");
            return Vec::new();
        };
        let mut coins = self.registry.coins(cell).to_vec();
        coins.push(coin);
        let resident = coins.len();
        self.registry.save(cell, coins);
        log::debug!("deposited {coin} at {cell}");

        vec![
            GameEvent::CoinDeposited { cell, coin },
            GameEvent::CacheUpdated { cell, coins: resident },
            GameEvent::InventoryChanged { coins: self.inventory.len() },
        ]
    }

    // ── Memento ────────────────────────────────────────────────

    pub fn snapshot(&self) -> GameResult<WorldSnapshot> {
        WorldSnapshot::capture(self.position, &self.inventory, &self.registry)
    }

    /// The whole world as an opaque string.
    pub fn save(&self) -> GameResult<String> {
        let data = self.snapshot()?.encode()?;
        log::info!(
            "saved world: {} caches, {} coins held",
            self.registry.len(),
            self.inventory.len()
        );
        Ok(data)
    }

    /// Replace the whole world with the one in `data`.
    ///
    /// The registry is rebuilt from the snapshot alone, so records created
    /// after the save do not survive. Malformed input, including a position
    /// off the edge of the grid, leaves every piece of state as it was.
    pub fn restore(&mut self, data: &str) -> GameResult<Vec<GameEvent>> {
        let checked = WorldSnapshot::parse(data)
            .and_then(|s| s.decode())
            .and_then(|decoded| self.check_addressable(decoded));
        let decoded = match checked {
            Ok(decoded) => decoded,
            Err(e) => {
                log::warn!("restore rejected: {e}");
                return Err(e);
            }
        };

        let mut registry = CacheRegistry::new();
        let (position, inventory) = decoded.apply(&mut registry);
        self.registry = registry;
        self.inventory = inventory;
        self.position = position;
        log::info!(
            "restored world: {} caches, {} coins held",
            self.registry.len(),
            self.inventory.len()
        );

        let mut events = vec![
            GameEvent::WorldRestored { position, caches: self.registry.len() },
            GameEvent::InventoryChanged { coins: self.inventory.len() },
        ];
        events.extend(self.refresh()?);
        Ok(events)
    }

    fn check_addressable(&self, decoded: DecodedWorld) -> GameResult<DecodedWorld> {
        if !self.config.is_addressable(decoded.position) {
            let LatLng { lat, lng } = decoded.position;
            return Err(GameError::MalformedSnapshot {
                reason: format!("player position {lat},{lng} is off the grid"),
            });
        }
        Ok(decoded)
    }
}
