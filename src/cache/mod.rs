//! Render cache for rendered object sets.
//!
//! Rendering a source (expanding every template and decoding the output) is
//! the expensive part of a render call. This module caches the per-source
//! result under a key derived from the source selector and the merged values,
//! so repeated renders with identical inputs skip template execution entirely.
//! Renderers prefix every key with their own scope and the source index, so
//! one store can back several renderers without them seeing each other's
//! entries.
//!
//! # Architecture
//!
//! - [`Cache`] - the trait a renderer talks to; any thread-safe store works
//! - [`TtlCache`] - the provided `DashMap`-backed store with per-entry expiry
//! - [`CacheOptions`] - TTL and key strategy used when a renderer builds its own cache
//! - [`key`] - cache key strategies ([`default_key`], [`path_key`])
//!
//! # Copy Semantics
//!
//! Entries are never handed out by reference. [`Cache::get`] returns a clone
//! of the stored objects and [`Cache::set`] takes ownership of an already
//! independent copy, so callers mutating returned objects can never corrupt
//! what a later caller reads.
//!
//! # Expiry
//!
//! Eviction is time-based only. Expired entries are dropped lazily on read,
//! or eagerly through [`TtlCache::purge_expired`].

pub mod key;

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::trace;

use crate::constants::DEFAULT_CACHE_TTL;
use crate::core::Object;

pub use key::{KeyFn, TemplateSpec, default_key, default_key_fn, path_key, path_key_fn};

/// A thread-safe store of rendered object sets.
pub trait Cache: Send + Sync + fmt::Debug {
    /// A copy of the objects stored under `key`, if present and not expired.
    fn get(&self, key: &str) -> Option<Vec<Object>>;

    /// Store `objects` under `key` for `ttl`.
    fn set(&self, key: String, objects: Vec<Object>, ttl: Duration);
}

/// Settings for a renderer-owned cache.
#[derive(Clone)]
pub struct CacheOptions {
    /// How long rendered results stay valid
    pub ttl: Duration,
    /// Key strategy; [`default_key`] when `None`
    pub key_fn: Option<KeyFn>,
}

impl CacheOptions {
    /// Options with the given TTL and the default key strategy.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            key_fn: None,
        }
    }

    /// Replace the key strategy.
    pub fn key_fn(mut self, key_fn: KeyFn) -> Self {
        self.key_fn = Some(key_fn);
        self
    }
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL)
    }
}

impl fmt::Debug for CacheOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheOptions")
            .field("ttl", &self.ttl)
            .field("key_fn", &self.key_fn.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

#[derive(Debug)]
struct CacheEntry {
    objects: Vec<Object>,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-memory cache with per-entry time-to-live.
///
/// Backed by [`DashMap`] so concurrent readers and writers on different keys
/// never block each other. Hit and miss counters are kept for diagnostics.
#[derive(Debug, Default)]
pub struct TtlCache {
    entries: DashMap<String, CacheEntry>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl TtlCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    /// Clear all cached content and statistics.
    pub fn clear(&self) {
        self.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Get cache statistics as `(hits, misses)`.
    pub fn stats(&self) -> (usize, usize) {
        (self.hits.load(Ordering::Relaxed), self.misses.load(Ordering::Relaxed))
    }

    /// Calculate hit rate as a percentage.
    pub fn hit_rate(&self) -> f64 {
        let (hits, misses) = self.stats();
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }
}

impl Cache for TtlCache {
    fn get(&self, key: &str) -> Option<Vec<Object>> {
        let now = Instant::now();
        let found = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(entry.objects.clone()),
            Some(_) => {
                trace!("Cache entry expired: {}", key);
                None
            }
            None => None,
        };

        match found {
            Some(objects) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(objects)
            }
            None => {
                // A concurrent set may have refreshed the entry in between.
                self.entries.remove_if(key, |_, entry| entry.is_expired(now));
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    fn set(&self, key: String, objects: Vec<Object>, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.entries.insert(
            key,
            CacheEntry {
                objects,
                expires_at,
            },
        );
    }
}
