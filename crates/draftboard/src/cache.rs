// Short-lived read-through cache of annotated ranking tables, keyed by
// platform.
//
// Entries expire after a fixed TTL and are recomputed by whichever caller
// next misses; concurrent misses are not de-duplicated. Readers always get
// their own copy of the table.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::player::{Platform, RankingTable};

struct CacheEntry {
    table: RankingTable,
    stored_at: DateTime<Utc>,
}

pub struct AdpCache {
    ttl: Duration,
    entries: Mutex<HashMap<Platform, CacheEntry>>,
}

impl AdpCache {
    pub fn new(ttl: Duration) -> Self {
        AdpCache {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<Platform, CacheEntry>> {
        self.entries.lock().expect("cache mutex poisoned")
    }

    /// A copy of the cached table for `platform` if it is younger than the
    /// TTL at `now`. Expired entries are evicted.
    pub fn get(&self, platform: Platform, now: DateTime<Utc>) -> Option<RankingTable> {
        let mut entries = self.entries();
        let entry = entries.get(&platform)?;
        if now - entry.stored_at < self.ttl {
            return Some(entry.table.clone());
        }
        debug!("{} rankings cache entry expired", platform);
        entries.remove(&platform);
        None
    }

    pub fn insert(&self, platform: Platform, table: RankingTable, now: DateTime<Utc>) {
        self.entries().insert(
            platform,
            CacheEntry {
                table,
                stored_at: now,
            },
        );
    }

    pub fn invalidate(&self, platform: Platform) {
        self.entries().remove(&platform);
    }

    pub fn invalidate_all(&self) {
        self.entries().clear();
    }
}
