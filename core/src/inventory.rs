//! The player's coin inventory — a LIFO stack of tokens.

use crate::coin::CoinToken;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    coins: Vec<CoinToken>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_coins(coins: Vec<CoinToken>) -> Self {
        Self { coins }
    }

    pub fn add(&mut self, coin: CoinToken) {
        self.coins.push(coin);
    }

    /// Most recently added token first.
    pub fn remove_last(&mut self) -> Option<CoinToken> {
        self.coins.pop()
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &CoinToken> {
        self.coins.iter()
    }

    pub fn as_slice(&self) -> &[CoinToken] {
        &self.coins
    }

    pub fn clear(&mut self) {
        self.coins.clear();
    }

    /// Status line shown in the inventory panel.
    pub fn summary(&self) -> String {
        format!("Inventory: {} coins", self.coins.len())
    }
}
