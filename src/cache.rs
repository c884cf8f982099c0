use anyhow::{Context, Result};
use log::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::model::storage::CacheEntry;
use crate::storage::Storage;

/// How long an entry is served after it was written, in milliseconds.
pub const TTL_MILLIS: i64 = 5 * 60 * 1000;

pub const TOURNAMENTS_KEY: &str = "cachedTournaments";
pub const MATCHES_KEY: &str = "cachedMatches";
pub const NEWS_KEY: &str = "cachedNewsItems";
pub const MEMBER_STATS_KEY: &str = "cachedMemberStats";

pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        jiff::Timestamp::now().as_millisecond()
    }
}

/// Expiring JSON values on top of a [`Storage`].
///
/// Callers read with [`TtlCache::get`], fetch on a miss and store the result
/// with [`TtlCache::put`]; the cache itself never talks to the network.
/// Entries are only removed lazily, when a read finds them expired or
/// unreadable.
pub struct TtlCache<S, C = SystemClock> {
    storage: S,
    clock: C,
}

impl<S: Storage> TtlCache<S> {
    pub fn new(storage: S) -> Self {
        TtlCache {
            storage,
            clock: SystemClock,
        }
    }
}

impl<S: Storage, C: Clock> TtlCache<S, C> {
    pub fn with_clock(storage: S, clock: C) -> Self {
        TtlCache { storage, clock }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        let raw = match self.storage.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Cache read of {} failed: {:#}", key, e);
                return None;
            }
        };
        let entry = match serde_json::from_str::<CacheEntry>(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Dropping unreadable cache entry {}: {}", key, e);
                self.evict(key);
                return None;
            }
        };
        match self.clock.now_millis().checked_sub(entry.timestamp) {
            Some(age) if age < TTL_MILLIS => Some(entry.data),
            Some(_) => {
                debug!("Cache entry {} expired", key);
                self.evict(key);
                None
            }
            None => {
                debug!("Dropping cache entry {} with timestamp {}", key, entry.timestamp);
                self.evict(key);
                None
            }
        }
    }

    /// Like [`TtlCache::get`], with entries that don't decode as `T` treated as unreadable.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let data = self.get(key)?;
        match serde_json::from_value(data) {
            Ok(data) => Some(data),
            Err(e) => {
                debug!("Dropping cache entry {} of unexpected shape: {}", key, e);
                self.evict(key);
                None
            }
        }
    }

    pub fn put<T: Serialize + ?Sized>(&self, key: &str, data: &T) -> Result<()> {
        let entry = CacheEntry {
            data: serde_json::to_value(data)
                .with_context(|| format!("Error serialising cache entry {}", key))?,
            timestamp: self.clock.now_millis(),
        };
        let entry = serde_json::to_string(&entry)?;
        self.storage
            .set_item(key, &entry)
            .with_context(|| format!("Error writing cache entry {}", key))
    }

    fn evict(&self, key: &str) {
        if let Err(e) = self.storage.remove_item(key) {
            warn!("Could not remove cache entry {}: {:#}", key, e);
        }
    }
}
