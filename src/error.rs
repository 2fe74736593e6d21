// Error types for the caseworth application.
// Handles market lookup errors, cache/snapshot IO errors, and general application errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaseworthError {
    #[error("market request error: {0}")]
    Market(#[from] reqwest::Error),

    #[error("market returned HTTP {status} for {item}")]
    MarketStatus {
        item: String,
        status: reqwest::StatusCode,
    },

    #[error("no price in market response for {0}")]
    MissingPrice(String),

    #[error("unparsable price {raw:?} for {item}")]
    UnparsablePrice { item: String, raw: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CaseworthError>;
