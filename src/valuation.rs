// Valuation engine.
// Resolves each inventory entry through the price cache, totals the lines, and
// writes the cache back at the end of the pass.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::PriceCache;
use crate::config::{Config, InventoryEntry};
use crate::error::Result;

/// Seam between the engine and the market client, so tests can stand in a
/// source that records its calls.
pub trait PriceSource {
    fn fetch(&self, item_name: &str) -> impl Future<Output = Result<Decimal>> + Send;
}

/// One valued inventory line. Price and total are absent when the lookup
/// failed; an absent line is excluded from the grand total, not zeroed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub count: u64,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub total: Option<Decimal>,
}

/// A full valuation pass over the inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Valuation {
    pub items: Vec<LineItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub grand_total: Decimal,
}

/// Values the fixed inventory against a price source, caching prices on disk.
pub struct ValuationEngine<S> {
    source: S,
    inventory: Vec<InventoryEntry>,
    cache_file: PathBuf,
    cache_ttl: Duration,
}

impl<S: PriceSource> ValuationEngine<S> {
    pub fn new(source: S, config: &Config) -> Self {
        Self {
            source,
            inventory: config.inventory.clone(),
            cache_file: config.cache_file.clone(),
            cache_ttl: config.cache_ttl,
        }
    }

    /// Run one valuation pass.
    ///
    /// The cache file is loaded once up front and saved once at the end
    /// (whole-file read-modify-write). Each line total is rounded to two
    /// decimals before summation; the grand total is the rounded sum of those
    /// rounded lines. Only the final cache save can fail.
    pub async fn compute(&self) -> Result<Valuation> {
        let mut cache = PriceCache::load(&self.cache_file);

        let mut items = Vec::with_capacity(self.inventory.len());
        let mut grand_total = Decimal::ZERO;

        for entry in &self.inventory {
            let price = self.resolve_price(&mut cache, &entry.name).await;
            let total = price.map(|p| (p * Decimal::from(entry.count)).round_dp(2));
            if let Some(total) = total {
                grand_total += total;
            }

            items.push(LineItem {
                name: entry.name.clone(),
                count: entry.count,
                price,
                total,
            });
        }

        cache.save(&self.cache_file)?;

        Ok(Valuation {
            items,
            grand_total: grand_total.round_dp(2),
        })
    }

    /// Resolve one item's price: fresh cache hit wins, otherwise a single
    /// upstream lookup. A failed lookup is recovered as None and never cached,
    /// so the next pass retries immediately.
    async fn resolve_price(&self, cache: &mut PriceCache, name: &str) -> Option<Decimal> {
        if let Some(price) = cache.fresh_price(name, self.cache_ttl) {
            return Some(price);
        }

        match self.source.fetch(name).await {
            Ok(price) => {
                cache.insert(name, price);
                Some(price)
            }
            Err(err) => {
                warn!("price lookup failed for {name}: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CACHE_TTL;
    use crate::error::CaseworthError;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Price source that serves a fixed table and records every call.
    struct StubSource {
        prices: HashMap<String, Decimal>,
        calls: Mutex<Vec<String>>,
    }

    impl StubSource {
        fn new(prices: &[(&str, &str)]) -> Self {
            Self {
                prices: prices
                    .iter()
                    .map(|(name, price)| (name.to_string(), price.parse().unwrap()))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl PriceSource for StubSource {
        async fn fetch(&self, item_name: &str) -> Result<Decimal> {
            self.calls.lock().unwrap().push(item_name.to_string());
            self.prices
                .get(item_name)
                .copied()
                .ok_or_else(|| CaseworthError::MissingPrice(item_name.to_string()))
        }
    }

    fn test_config(dir: &TempDir, inventory: &[(&str, u64)]) -> Config {
        Config {
            inventory: inventory
                .iter()
                .map(|(name, count)| InventoryEntry {
                    name: name.to_string(),
                    count: *count,
                })
                .collect(),
            cache_file: dir.path().join("price_cache.json"),
            snapshot_dir: dir.path().join("snapshots"),
            cache_ttl: CACHE_TTL,
            port: 0,
        }
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_per_line_rounding_and_absent_lines() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir, &[("A", 2), ("B", 3)]);
        // B has no price; its line must be absent, not zero.
        let source = StubSource::new(&[("A", "2.005")]);
        let engine = ValuationEngine::new(source, &config);

        let valuation = engine.compute().await.unwrap();

        assert_eq!(valuation.items[0].total, Some(dec("4.01")));
        assert_eq!(valuation.items[1].price, None);
        assert_eq!(valuation.items[1].total, None);
        assert_eq!(valuation.grand_total, dec("4.01"));
    }

    #[tokio::test]
    async fn test_fresh_cache_suppresses_upstream_calls() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir, &[("A", 10)]);
        let source = StubSource::new(&[("A", "1.50")]);
        let engine = ValuationEngine::new(source, &config);

        let first = engine.compute().await.unwrap();
        assert_eq!(first.grand_total, dec("15.00"));
        assert_eq!(engine.source.calls(), vec!["A"]);

        // Second pass inside the TTL: served from the cache file.
        let second = engine.compute().await.unwrap();
        assert_eq!(second.grand_total, dec("15.00"));
        assert_eq!(engine.source.calls(), vec!["A"]);
    }

    #[tokio::test]
    async fn test_miss_and_stale_fetch_exactly_once_per_pass() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(&dir, &[("A", 1), ("B", 1)]);
        config.cache_ttl = Duration::ZERO;
        let source = StubSource::new(&[("A", "1.00"), ("B", "2.00")]);
        let engine = ValuationEngine::new(source, &config);

        engine.compute().await.unwrap();
        engine.compute().await.unwrap();

        // Zero TTL means every entry is stale: one call per item per pass.
        assert_eq!(engine.source.calls(), vec!["A", "B", "A", "B"]);
    }

    #[tokio::test]
    async fn test_failed_lookup_is_not_cached() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir, &[("A", 1)]);
        let source = StubSource::new(&[]);
        let engine = ValuationEngine::new(source, &config);

        let valuation = engine.compute().await.unwrap();
        assert_eq!(valuation.grand_total, Decimal::ZERO);

        // The failure was not cached, so the next pass retries immediately.
        engine.compute().await.unwrap();
        assert_eq!(engine.source.calls(), vec!["A", "A"]);
    }

    #[tokio::test]
    async fn test_corrupt_cache_recovers_and_repopulates() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir, &[("A", 2)]);
        std::fs::write(&config.cache_file, "not json at all").unwrap();

        let source = StubSource::new(&[("A", "3.00")]);
        let engine = ValuationEngine::new(source, &config);

        let valuation = engine.compute().await.unwrap();
        assert_eq!(valuation.grand_total, dec("6.00"));

        let cache = PriceCache::load(&config.cache_file);
        assert_eq!(cache.fresh_price("A", CACHE_TTL), Some(dec("3.00")));
    }

    #[test]
    fn test_valuation_serializes_prices_as_json_numbers() {
        let valuation = Valuation {
            items: vec![
                LineItem {
                    name: "A".to_string(),
                    count: 2,
                    price: Some(dec("2.005")),
                    total: Some(dec("4.01")),
                },
                LineItem {
                    name: "B".to_string(),
                    count: 3,
                    price: None,
                    total: None,
                },
            ],
            grand_total: dec("4.01"),
        };

        let json = serde_json::to_value(&valuation).unwrap();
        assert!(json["items"][0]["price"].is_number());
        assert!(json["items"][1]["price"].is_null());
        assert_eq!(json["grand_total"], serde_json::json!(4.01));
    }
}
