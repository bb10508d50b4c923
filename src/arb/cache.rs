//! Rate cache keyed by direction.
//!
//! `A -> B` and `B -> A` are separate entries. They come from separate reserve
//! reads and pool fees make them differ from exact reciprocals, so one is never
//! derived from the other.

use std::collections::HashMap;
use std::time::Duration;

use alloy::primitives::Address;
use parking_lot::Mutex;
use tokio::time::Instant;

/// Ordered `(from, to, venue)` triple
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateKey {
    /// Token sold
    pub from: Address,
    /// Token bought
    pub to: Address,
    /// Venue name
    pub venue: String,
}

impl RateKey {
    /// Create a new key
    #[must_use]
    pub fn new(from: Address, to: Address, venue: &str) -> Self {
        Self {
            from,
            to,
            venue: venue.to_string(),
        }
    }
}

/// A cached rate and when it was read
#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    /// Units of `to` per unit of `from`
    rate: f64,
    /// Read time
    fetched_at: Instant,
}

/// Expiring map of rates.
///
/// Expiry is checked on read; stale entries stay until overwritten. The map
/// sits behind a mutex so reads and writes of a key never interleave, and the
/// lock is only held for the map operation itself, never across a network read.
#[derive(Debug)]
pub struct RateCache {
    /// Freshness window
    ttl: Duration,
    /// Entries by key
    entries: Mutex<HashMap<RateKey, CacheEntry>>,
}

impl RateCache {
    /// Create an empty cache
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The fresh rate for a key, if any
    #[must_use]
    pub fn get(&self, key: &RateKey) -> Option<f64> {
        self.get_at(key, Instant::now())
    }

    /// The rate for a key if it was fetched less than one TTL before `now`
    #[must_use]
    pub fn get_at(&self, key: &RateKey, now: Instant) -> Option<f64> {
        let entries = self.entries.lock();
        let entry = entries.get(key)?;
        (now.saturating_duration_since(entry.fetched_at) < self.ttl).then_some(entry.rate)
    }

    /// Store a rate read now
    pub fn insert(&self, key: RateKey, rate: f64) {
        self.insert_at(key, rate, Instant::now());
    }

    /// Store a rate read at `fetched_at`, replacing any previous entry
    pub fn insert_at(&self, key: RateKey, rate: f64, fetched_at: Instant) {
        self.entries
            .lock()
            .insert(key, CacheEntry { rate, fetched_at });
    }

    /// Number of entries, fresh or stale
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
