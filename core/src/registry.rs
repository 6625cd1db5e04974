//! Cache registry — one record per grid cell, owned by the game session.
//!
//! RULE: The registry never holds two records for the same cell.
//! Records are created lazily on first lookup and never removed.
//!
//! RULE: A serial is never minted twice for the same cell. Each record
//! tracks a high-water mark of every serial it has minted or seen, and
//! `generate()` refuses to run on a cell that already has a record.

use crate::{
    coin::CoinToken,
    error::{GameError, GameResult},
    luck::{initial_coins_key, LuckOracle},
    types::Cell,
};
use std::collections::BTreeMap;

/// Initial coins are `floor(luck * MAX_INITIAL_COINS)`, so 0..=9.
pub const MAX_INITIAL_COINS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRecord {
    pub cell:    Cell,
    pub coins:   Vec<CoinToken>,
    /// Lowest serial this cell has never issued.
    next_serial: u32,
}

impl CacheRecord {
    fn empty(cell: Cell) -> Self {
        Self { cell, coins: Vec::new(), next_serial: 0 }
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    pub fn next_serial(&self) -> u32 {
        self.next_serial
    }

    fn observe_serial(&mut self, serial: u32) {
        self.next_serial = self.next_serial.max(serial.saturating_add(1));
    }
}

/// Number of coins a freshly generated cache at `cell` starts with.
pub fn initial_coin_count(cell: Cell, luck: &dyn LuckOracle) -> u32 {
    let roll = luck.luck(&initial_coins_key(cell));
    ((roll * MAX_INITIAL_COINS as f64).floor() as u32).min(MAX_INITIAL_COINS - 1)
}

#[derive(Debug, Clone, Default)]
pub struct CacheRegistry {
    records: BTreeMap<Cell, CacheRecord>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Lookup ─────────────────────────────────────────────────

    /// The unique record for `cell`, created empty if absent.
    pub fn get_or_create(&mut self, cell: Cell) -> &mut CacheRecord {
        self.records.entry(cell).or_insert_with(|| {
            log::trace!("registry: new record at {cell}");
            CacheRecord::empty(cell)
        })
    }

    pub fn get(&self, cell: Cell) -> Option<&CacheRecord> {
        self.records.get(&cell)
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.records.contains_key(&cell)
    }

    /// Tokens resident at `cell`; empty if the cell has no record.
    pub fn coins(&self, cell: Cell) -> &[CoinToken] {
        self.records.get(&cell).map(|r| r.coins.as_slice()).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in cell order.
    pub fn iter(&self) -> impl Iterator<Item = &CacheRecord> {
        self.records.values()
    }

    pub fn total_coins(&self) -> usize {
        self.records.values().map(CacheRecord::len).sum()
    }

    // ── Mutation ───────────────────────────────────────────────

    /// Replace the tokens resident at `cell`. Provenance is not checked;
    /// callers keep single ownership by construction.
    pub fn save(&mut self, cell: Cell, coins: Vec<CoinToken>) {
        self.get_or_create(cell);
        for coin in &coins {
            self.observe(coin);
        }
        self.get_or_create(cell).coins = coins;
    }

    /// Raise the home cell's serial high-water mark for `coin`. A no-op
    /// when the home cell has no record.
    pub fn observe(&mut self, coin: &CoinToken) {
        if let Some(home) = self.records.get_mut(&coin.origin()) {
            home.observe_serial(coin.serial);
        }
    }

    /// Populate a never-seen cell with serials `0..initial_coin_count`.
    ///
    /// Fails if the cell already has a record, even an empty one:
    /// regenerating would reissue serials that may now live elsewhere.
    pub fn generate(&mut self, cell: Cell, luck: &dyn LuckOracle) -> GameResult<&[CoinToken]> {
        if self.contains(cell) {
            return Err(GameError::CacheAlreadyGenerated { cell });
        }
        let count = initial_coin_count(cell, luck);
        let record = self.get_or_create(cell);
        record.coins = (0..count).map(|serial| CoinToken::minted_at(cell, serial)).collect();
        record.next_serial = count;
        log::debug!("registry: generated {count} coins at {cell}");
        Ok(record.coins.as_slice())
    }

    /// Refill a depleted cache with fresh serials. Serials continue from
    /// the record's high-water mark and never drop below the initial
    /// generation range.
    pub fn regrow(&mut self, cell: Cell, luck: &dyn LuckOracle) -> GameResult<&[CoinToken]> {
        let count = initial_coin_count(cell, luck);
        let record = self.records.get_mut(&cell).ok_or(GameError::CacheNotRegrowable {
            cell,
            reason: "never generated",
        })?;
        if !record.is_empty() {
            return Err(GameError::CacheNotRegrowable { cell, reason: "not depleted" });
        }
        let start = record.next_serial.max(count);
        let end = start.checked_add(count).ok_or(GameError::CacheNotRegrowable {
            cell,
            reason: "serials exhausted",
        })?;
        record.coins = (start..end).map(|serial| CoinToken::minted_at(cell, serial)).collect();
        record.next_serial = end;
        log::debug!("registry: regrew {count} coins at {cell} from serial {start}");
        Ok(record.coins.as_slice())
    }

    // ── Per-cell encoding ──────────────────────────────────────

    /// JSON array of `{i, j, serial}` records, in cache order.
    /// A cell with no record encodes as `[]`.
    pub fn serialize(&self, cell: Cell) -> GameResult<String> {
        encode_coins(self.coins(cell))
    }

    /// Decode `data` and write it to `cell`, creating the record if needed.
    /// Nothing is written when `data` is malformed.
    pub fn deserialize(&mut self, cell: Cell, data: &str) -> GameResult<()> {
        let coins = decode_coins(data)?;
        self.save(cell, coins);
        Ok(())
    }
}

pub fn encode_coins(coins: &[CoinToken]) -> GameResult<String> {
    Ok(serde_json::to_string(coins)?)
}

pub fn decode_coins(data: &str) -> GameResult<Vec<CoinToken>> {
    Ok(serde_json::from_str(data)?)
}
