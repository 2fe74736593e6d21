// Steam Community Market module.
// Provides the client and types for single-item price lookups.

pub mod client;
pub mod types;

pub use client::MarketClient;
pub use types::{PriceOverview, parse_price};
