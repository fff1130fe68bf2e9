//! Time-bounded, size-bounded cache of resolved postcodes.
//!
//! Shared by every in-flight request. Time comes from an injected [`Clock`]
//! so expiry can be tested without sleeping.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use crate::domain::Coordinate;

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }
}

impl ManualClock {
    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.lock().map_or_else(|e| *e.into_inner(), |now| *now)
    }
}

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    coordinate: Coordinate,
    inserted_at: Instant,
    expires_at: Instant,
}

pub struct GeocodeCache {
    ttl: Duration,
    capacity: usize,
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl GeocodeCache {
    #[must_use]
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self::with_clock(ttl, capacity, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(ttl: Duration, capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            clock,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Live entry for `key`, if any. Expired entries read as absent.
    pub fn get(&self, key: &str) -> Option<Coordinate> {
        let now = self.clock.now();
        let guard = self.entries.read().ok()?;
        guard
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.coordinate)
    }

    /// Stores `coordinate` with a fresh expiry. Last write wins.
    ///
    /// When full, expired entries go first, then the oldest insertion.
    pub fn insert(&self, key: impl Into<String>, coordinate: Coordinate) {
        let now = self.clock.now();
        let Ok(mut guard) = self.entries.write() else {
            return;
        };
        let key = key.into();

        if !guard.contains_key(&key) && guard.len() >= self.capacity {
            guard.retain(|_, entry| entry.expires_at > now);

            while guard.len() >= self.capacity {
                let oldest = guard
                    .iter()
                    .min_by_key(|(_, entry)| entry.inserted_at)
                    .map(|(k, _)| k.clone());
                match oldest {
                    Some(k) => guard.remove(&k),
                    None => break,
                };
            }
        }

        guard.insert(
            key,
            CacheEntry {
                coordinate,
                inserted_at: now,
                expires_at: now + self.ttl,
            },
        );
    }

    /// Number of stored entries, expired ones included until evicted.
    pub fn len(&self) -> usize {
        self.entries.read().map_or(0, |guard| guard.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
