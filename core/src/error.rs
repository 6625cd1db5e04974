use crate::types::Cell;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache at {cell} was already generated")]
    CacheAlreadyGenerated { cell: Cell },

    #[error("Cache at {cell} cannot regrow: {reason}")]
    CacheNotRegrowable { cell: Cell, reason: &'static str },

    #[error("Invalid cell key '{key}'")]
    InvalidCellKey { key: String },

    #[error("Invalid coin id '{id}'")]
    InvalidCoinId { id: String },

    #[error("Malformed snapshot: {reason}")]
    MalformedSnapshot { reason: String },

    #[error("Snapshot coin count {player_coins} does not match {inventory} inventory tokens")]
    InventoryMismatch { player_coins: u64, inventory: usize },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type GameResult<T> = Result<T, GameError>;
