// Price cache store for reading and writing cached market prices.
// Whole-file JSON load/save, TTL checking, and atomic writes via temp file + rename.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

/// Maximum age before a cached price must be refreshed: 1 hour.
pub const CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// One cached price with the epoch second it was fetched at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub fetched_at: i64,
}

impl CacheEntry {
    /// Create an entry stamped with the current time.
    pub fn new(price: Decimal) -> Self {
        Self {
            price,
            fetched_at: Utc::now().timestamp(),
        }
    }

    /// Check whether this entry is still within the TTL.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        let age = Utc::now().timestamp().saturating_sub(self.fetched_at);
        age >= 0 && (age as u64) < ttl.as_secs()
    }
}

/// In-memory view of the on-disk cache file, keyed by item name.
///
/// Loaded in full at the start of a valuation pass and written back in full at
/// the end. Concurrent processes racing on the file can lose each other's
/// updates; acceptable for a single-user tool.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceCache {
    entries: HashMap<String, CacheEntry>,
}

impl PriceCache {
    /// Load the cache file. A missing, unreadable, or corrupt file yields an
    /// empty cache rather than an error.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                warn!("cache file {} unreadable, starting empty: {err}", path.display());
                return Self::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(cache) => cache,
            Err(err) => {
                warn!("cache file {} corrupt, starting empty: {err}", path.display());
                Self::default()
            }
        }
    }

    /// Write the full cache back to disk atomically via temp file + rename.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;

        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Return the cached price for an item while its entry is fresher than the TTL.
    pub fn fresh_price(&self, name: &str, ttl: Duration) -> Option<Decimal> {
        self.entries
            .get(name)
            .filter(|entry| entry.is_fresh(ttl))
            .map(|entry| entry.price)
    }

    /// Store a just-fetched price stamped with the current time.
    pub fn insert(&mut self, name: &str, price: Decimal) {
        self.entries.insert(name.to_string(), CacheEntry::new(price));
    }
}
