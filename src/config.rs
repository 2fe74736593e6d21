// Runtime configuration.
// Inventory, file locations, and listen port are fixed at startup; nothing mutates them afterwards.

use std::path::PathBuf;
use std::time::Duration;

use crate::cache::CACHE_TTL;

/// Default listen port when PORT is unset or unparsable.
pub const DEFAULT_PORT: u16 = 5000;

/// One owned item: a market hash name and how many are held.
#[derive(Debug, Clone)]
pub struct InventoryEntry {
    pub name: String,
    pub count: u64,
}

impl InventoryEntry {
    fn new(name: &str, count: u64) -> Self {
        Self {
            name: name.to_string(),
            count,
        }
    }
}

/// Immutable application configuration, built once in main.
#[derive(Debug, Clone)]
pub struct Config {
    /// Items to value, in the fixed order they appear in responses.
    pub inventory: Vec<InventoryEntry>,
    /// Whole-file JSON price cache location.
    pub cache_file: PathBuf,
    /// Directory holding timestamped valuation snapshots.
    pub snapshot_dir: PathBuf,
    /// Maximum age before a cached price must be refreshed.
    pub cache_ttl: Duration,
    /// HTTP listen port.
    pub port: u16,
}

impl Config {
    /// Build the configuration from compiled defaults plus the PORT environment variable.
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Self {
            inventory: default_inventory(),
            cache_file: PathBuf::from("price_cache.json"),
            snapshot_dir: PathBuf::from("snapshots"),
            cache_ttl: CACHE_TTL,
            port,
        }
    }
}

/// The tracked case inventory.
fn default_inventory() -> Vec<InventoryEntry> {
    vec![
        InventoryEntry::new("Horizon Case", 1000),
        InventoryEntry::new("Danger Zone Case", 1000),
        InventoryEntry::new("Prisma Case", 1000),
        InventoryEntry::new("Spectrum 2 Case", 150),
        InventoryEntry::new("Clutch Case", 649),
        InventoryEntry::new("Falchion Case", 142),
        InventoryEntry::new("Operation Breakout Weapon Case", 100),
    ]
}
