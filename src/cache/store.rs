//! Compute-once query storage.

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use metrics::{counter, histogram};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::keys::QueryKey;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

type Entry = Arc<dyn Any + Send + Sync>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("cached value for `{query}` does not have the requested type")]
    TypeMismatch { query: &'static str },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Process-lifetime memo table for prepared queries.
///
/// A value is computed the first time its key is requested and returned
/// unchanged (same `Arc`) on every later request.
pub struct QueryCache {
    entries: RwLock<HashMap<QueryKey, Entry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl QueryCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the value stored under `key`, running `compute` only when absent.
    ///
    /// `compute` runs without holding the cache lock, so it may look up other
    /// keys. It must not request `key` itself. If two callers race on the same
    /// key, the first stored value wins and both receive it.
    pub fn get_or_compute<T, F>(&self, key: QueryKey, compute: F) -> Result<Arc<T>, CacheError>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        let query = key.name();
        let cached = rw_read(&self.entries, SOURCE, "get_or_compute.lookup")
            .get(&key)
            .cloned();

        if let Some(entry) = cached {
            self.hits.fetch_add(1, Ordering::Relaxed);
            counter!("sitequery_query_cache_hit_total", "query" => query).increment(1);
            return downcast(query, entry);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!("sitequery_query_cache_miss_total", "query" => query).increment(1);

        let started = Instant::now();
        let value: Entry = Arc::new(compute());
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        histogram!("sitequery_query_compute_ms", "query" => query).record(elapsed_ms);
        debug!(query, %key, elapsed_ms, "computed prepared query");

        let stored = rw_write(&self.entries, SOURCE, "get_or_compute.store")
            .entry(key)
            .or_insert(value)
            .clone();
        downcast(query, stored)
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        rw_read(&self.entries, SOURCE, "contains").contains_key(key)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

fn downcast<T: Any + Send + Sync>(query: &'static str, entry: Entry) -> Result<Arc<T>, CacheError> {
    entry
        .downcast::<T>()
        .map_err(|_| CacheError::TypeMismatch { query })
}
