// Cache module for the on-disk price cache.
// Absorbs repeated market lookups for the same item within the TTL window.

pub mod store;

pub use store::{CACHE_TTL, CacheEntry, PriceCache};
