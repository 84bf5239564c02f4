//! Time-windowed response cache.
//!
//! Stores the rendered body bytes of cacheable routes keyed by request
//! path and query. Expiry is lazy: a stale entry is dropped by the read
//! that finds it, and a periodic sweep clears entries no one asks for.
//! A poisoned lock degrades to cache misses rather than failing the
//! request.

use bytes::Bytes;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::warn;

/// Default bound on distinct cached responses.
pub const DEFAULT_MAX_ENTRIES: usize = 4096;

#[derive(Debug, Clone)]
struct Entry {
    body: Bytes,
    /// `None` never expires; a zero window means cache-forever.
    expires_at: Option<Instant>,
}

impl Entry {
    fn expired(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(at) => now >= at,
            None => false,
        }
    }
}

/// Bounded in-memory response store shared across connections.
pub struct ResponseCache {
    entries: RwLock<HashMap<String, Entry>>,
    max_entries: usize,
}

impl ResponseCache {
    pub fn new(max_entries: usize) -> Self {
        Self { entries: RwLock::new(HashMap::new()), max_entries }
    }

    /// Look up a live entry. Expired entries are removed on the way out.
    pub fn get(&self, key: &str) -> Option<Bytes> {
        let now = Instant::now();
        {
            let entries = match self.entries.read() {
                Ok(entries) => entries,
                Err(_) => {
                    warn!("response cache lock poisoned, serving uncached");
                    return None;
                }
            };
            match entries.get(key) {
                Some(entry) if !entry.expired(now) => return Some(entry.body.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Stale: take the write lock and re-check, a writer may have
        // refreshed the entry in between.
        if let Ok(mut entries) = self.entries.write() {
            if entries.get(key).map(|entry| entry.expired(now)).unwrap_or(false) {
                entries.remove(key);
            }
        }
        None
    }

    /// Store a response body, overwriting any previous entry for the
    /// key. A zero `ttl` stores the entry without an expiry.
    pub fn set(&self, key: String, body: Bytes, ttl: Duration) {
        let expires_at = if ttl.is_zero() { None } else { Some(Instant::now() + ttl) };
        let mut entries = match self.entries.write() {
            Ok(entries) => entries,
            Err(_) => {
                warn!("response cache lock poisoned, dropping entry for {key}");
                return;
            }
        };
        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            Self::evict_one(&mut entries);
        }
        entries.insert(key, Entry { body, expires_at });
    }

    /// Drop one entry to make room: an expired one if any exist,
    /// otherwise the one closest to expiry. Never-expiring entries are
    /// evicted last.
    fn evict_one(entries: &mut HashMap<String, Entry>) {
        let now = Instant::now();
        let victim = entries
            .iter()
            .find(|(_, entry)| entry.expired(now))
            .or_else(|| {
                entries
                    .iter()
                    .min_by_key(|(_, entry)| (entry.expires_at.is_none(), entry.expires_at))
            })
            .map(|(key, _)| key.clone());
        if let Some(key) = victim {
            entries.remove(&key);
        }
    }

    /// Drop every expired entry; returns how many were removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        match self.entries.write() {
            Ok(mut entries) => {
                let before = entries.len();
                entries.retain(|_, entry| !entry.expired(now));
                before - entries.len()
            }
            Err(_) => 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}
