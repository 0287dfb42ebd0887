//! Response cache boundary.
//!
//! Values are stored as JSON so any backend that can hold text can implement
//! [`Cache`]. Keys are colon-separated paths such as
//! `platform:meituan:api:list:<md5>`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use log::debug;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::errors::{Error, Result};

/// Key/value store with per-entry expiry.
#[async_trait]
pub trait Cache: Send + Sync {
    /// The value under `key`, or `None` when missing or expired.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// Removes every key matching `pattern`, where `*` matches any substring
    /// and the rest is literal. Returns the number of keys removed.
    async fn invalidate_by_pattern(&self, pattern: &str) -> Result<usize>;
}

struct CacheEntry {
    value: Value,
    /// `None` when the TTL reaches past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }

    fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }
}

/// In-process [`Cache`] backed by a concurrent map.
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included until the next write
    /// or read of their key.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        match self.entries.get(key) {
            None => return Ok(None),
            Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
            Some(_) => {}
        }
        self.entries.remove(key);
        debug!("Cache entry expired: {}", key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<()> {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        let swept = before.saturating_sub(self.entries.len());
        if swept > 0 {
            debug!("Evicted {} expired cache entries", swept);
        }

        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: now.checked_add(ttl),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn invalidate_by_pattern(&self, pattern: &str) -> Result<usize> {
        let matcher = compile_pattern(pattern)?;
        let before = self.entries.len();
        self.entries.retain(|key, _| !matcher.is_match(key));
        let removed = before.saturating_sub(self.entries.len());
        debug!("Invalidated {} cache entries matching {}", removed, pattern);
        Ok(removed)
    }
}

/// Anchored regex for a `*` glob.
fn compile_pattern(pattern: &str) -> Result<Regex> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^{}$", body))
        .map_err(|e| Error::configuration(format!("Invalid cache pattern: {}", e), "pattern"))
}

/// Joins key parts with `:`, collapsing repeated separators.
pub fn build_cache_key<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(":")
        .split(':')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(":")
}

/// Lowercase hex md5 of the JSON encoding of `params`.
pub fn hash_params<T: Serialize + ?Sized>(params: &T) -> String {
    let encoded = serde_json::to_string(params).unwrap_or_default();
    format!("{:x}", md5::compute(encoded.as_bytes()))
}
