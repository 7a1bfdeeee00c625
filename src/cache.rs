// Hotel availability cache. Sits between the search orchestrator and
// the supplier availability calls so that repeated searches over the
// same hotel and dates do not refetch.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use dashmap::DashMap;

use crate::inventory::RoomAvailability;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub max_entries: usize,
    pub default_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            default_ttl: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Default)]
struct CacheCounters {
    hits: AtomicUsize,
    misses: AtomicUsize,
    evictions: AtomicUsize,
    expirations: AtomicUsize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStatsReport {
    pub entries: usize,
    pub hits: usize,
    pub misses: usize,
    pub evictions: usize,
    pub expirations: usize,
}

struct CacheEntry {
    rooms: Vec<RoomAvailability>,
    stored_at: Instant,
    ttl: Duration,
    last_accessed: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.stored_at.elapsed() > self.ttl
    }
}

fn cache_key(hotel_id: &str, check_in: NaiveDate, check_out: NaiveDate) -> String {
    format!("{}:{}:{}", hotel_id, check_in, check_out)
}

/// TTL cache of per-hotel room availability, keyed by hotel and date
/// range. Safe for concurrent use; reads and writes on different keys
/// do not contend.
pub struct AvailabilityCache {
    entries: DashMap<String, CacheEntry>,
    config: CacheConfig,
    counters: CacheCounters,
}

impl AvailabilityCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            config,
            counters: CacheCounters::default(),
        }
    }

    /// Stores availability for a hotel and date range. `ttl` of `None`
    /// uses the configured default. Inserting at capacity evicts the
    /// least recently accessed entry.
    pub fn store(
        &self,
        hotel_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
        rooms: Vec<RoomAvailability>,
        ttl: Option<Duration>,
    ) {
        let key = cache_key(hotel_id, check_in, check_out);
        if !self.entries.contains_key(&key) && self.entries.len() >= self.config.max_entries {
            self.evict_least_recently_accessed();
        }

        let now = Instant::now();
        self.entries.insert(
            key,
            CacheEntry {
                rooms,
                stored_at: now,
                ttl: ttl.unwrap_or(self.config.default_ttl),
                last_accessed: now,
            },
        );
    }

    /// Fetches availability if present and not expired. An expired
    /// entry is removed on read and counts as a miss.
    pub fn get(
        &self,
        hotel_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Option<Vec<RoomAvailability>> {
        let key = cache_key(hotel_id, check_in, check_out);

        let expired = match self.entries.get_mut(&key) {
            Some(mut entry) => {
                if !entry.is_expired() {
                    entry.last_accessed = Instant::now();
                    self.counters.hits.fetch_add(1, Ordering::Relaxed);
                    return Some(entry.rooms.clone());
                }
                true
            }
            None => false,
        };

        if expired {
            // Drop the entry outside the map guard.
            self.entries.remove(&key);
            self.counters.expirations.fetch_add(1, Ordering::Relaxed);
        }
        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Bulk-invalidates entries matching the given key parts; `None`
    /// matches anything. Returns the number of removed entries.
    pub fn invalidate(
        &self,
        hotel_id: Option<&str>,
        check_in: Option<NaiveDate>,
        check_out: Option<NaiveDate>,
    ) -> usize {
        let check_in = check_in.map(|d| d.to_string());
        let check_out = check_out.map(|d| d.to_string());

        let keys: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| {
                let mut parts = entry.key().splitn(3, ':');
                let (Some(hotel), Some(ci), Some(co)) =
                    (parts.next(), parts.next(), parts.next())
                else {
                    return false;
                };
                hotel_id.map_or(true, |h| hotel == h)
                    && check_in.as_deref().map_or(true, |c| ci == c)
                    && check_out.as_deref().map_or(true, |c| co == c)
            })
            .map(|entry| entry.key().clone())
            .collect();

        let mut removed = 0;
        for key in keys {
            if self.entries.remove(&key).is_some() {
                removed += 1;
            }
        }
        removed
    }

    pub fn stats(&self) -> CacheStatsReport {
        CacheStatsReport {
            entries: self.entries.len(),
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
            expirations: self.counters.expirations.load(Ordering::Relaxed),
        }
    }

    fn evict_least_recently_accessed(&self) {
        let coldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.last_accessed)
            .map(|entry| entry.key().clone());

        if let Some(key) = coldest {
            if self.entries.remove(&key).is_some() {
                self.counters.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

impl Default for AvailabilityCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
