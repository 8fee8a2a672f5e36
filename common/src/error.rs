//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No current item: the walk-through is complete")]
    NoCurrentItem,

    #[error("Item index {index} is out of range ({len} items)")]
    ItemOutOfRange { index: usize, len: usize },

    #[error("Nothing to report: no packed items and no discrepancies")]
    EmptyReport,

    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
