//! Short-TTL caching shared by the orderbook cache (one entry per venue+instrument,
//! refreshed from push streams) and the detector's per-pair memoization.
//!
//! Staleness here is judged the same way [`algo_trade_core::market::OrderbookSnapshot`]
//! judges it: an entry's age is computed at read time from when it was inserted, not
//! carried as a field that something has to remember to update.

use algo_trade_core::market::{OrderbookSnapshot, Venue};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A plain TTL-expiring map keyed by `K`, one [`parking_lot::RwLock`] guarding the whole
/// table. Fits low-write-rate memoization (the arbitrage detector's per-pair cache);
/// for per-instrument orderbooks under independent, frequent writes see [`OrderbookCache`].
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, (V, Instant)>>,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: RwLock::new(HashMap::new()) }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read();
        entries.get(key).and_then(|(value, inserted_at)| {
            if inserted_at.elapsed() < self.ttl { Some(value.clone()) } else { None }
        })
    }

    pub fn insert(&self, key: K, value: V) {
        self.entries.write().insert(key, (value, Instant::now()));
    }

    /// Drops entries past their TTL. `get` already treats them as absent; this just
    /// bounds memory for callers that poll many distinct keys over time.
    pub fn evict_expired(&self) {
        let ttl = self.ttl;
        self.entries.write().retain(|_, (_, inserted_at)| inserted_at.elapsed() < ttl);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

struct CachedBook {
    snapshot: OrderbookSnapshot,
    inserted_at: Instant,
}

/// Live orderbook cache: one [`parking_lot::RwLock`] per venue+instrument key, so a
/// refresh on one instrument never blocks a read of another. The outer map's lock is
/// only ever held long enough to fetch or create a per-key entry.
pub struct OrderbookCache {
    ttl: Duration,
    shards: RwLock<HashMap<(Venue, String), Arc<RwLock<CachedBook>>>>,
}

impl OrderbookCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, shards: RwLock::new(HashMap::new()) }
    }

    /// Returns the cached snapshot for `(venue, instrument_id)` if present and fresher
    /// than the configured TTL (500ms by default, per the live-feed refresh cadence).
    #[must_use]
    pub fn get(&self, venue: Venue, instrument_id: &str) -> Option<OrderbookSnapshot> {
        let shard = {
            let shards = self.shards.read();
            shards.get(&(venue, instrument_id.to_string()))?.clone()
        };
        let guard = shard.read();
        if guard.inserted_at.elapsed() < self.ttl {
            Some(guard.snapshot.clone())
        } else {
            None
        }
    }

    /// True when no fresh entry exists for `(venue, instrument_id)` — either never
    /// populated or past the TTL. Callers use this to decide whether a cached price
    /// can back an arbitrage decision or a fresh pull is required first.
    #[must_use]
    pub fn is_stale(&self, venue: Venue, instrument_id: &str) -> bool {
        self.get(venue, instrument_id).is_none()
    }

    pub fn put(&self, snapshot: OrderbookSnapshot) {
        let key = (snapshot.venue, snapshot.instrument_id.clone());
        let shard = {
            let mut shards = self.shards.write();
            shards
                .entry(key)
                .or_insert_with(|| {
                    Arc::new(RwLock::new(CachedBook { snapshot: snapshot.clone(), inserted_at: Instant::now() }))
                })
                .clone()
        };
        let mut guard = shard.write();
        guard.snapshot = snapshot;
        guard.inserted_at = Instant::now();
    }

    #[must_use]
    pub fn instrument_count(&self) -> usize {
        self.shards.read().len()
    }
}

impl Default for OrderbookCache {
    /// 500ms default TTL, matching the live push-feed refresh cadence.
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}
