//! Phonetic backends: deterministic text → phonetic-key conversion with
//! amortised cost.
//!
//! A backend wraps a grapheme-to-phonetic engine and memoises its results
//! in a bounded cache. Initialisation can be expensive (for engines that
//! shell out, hundreds of milliseconds); backends are therefore process-wide
//! singletons, constructed lazily and shared by every engine of their
//! language.
//!
//! # Concurrency
//!
//! The cache is guarded by a mutex; hit/miss counters are atomic, so
//! [`CacheStats`] is exact, not approximate. Nothing here suspends: the
//! only blocking operation is the one-time external engine start-up.

use crate::config::Language;
use crate::error::Result;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "english")]
pub mod english;
#[cfg(feature = "japanese")]
pub mod japanese;
#[cfg(feature = "mandarin")]
pub mod mandarin;

/// An opaque string in the phonetic domain.
///
/// Mandarin keys are space-separated toneless Pinyin syllables, English
/// keys are IPA-ish symbol strings, Japanese keys are normalised Hepburn
/// Romaji. Equality and edit distance are the only operations the matcher
/// consumes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhoneticKey(String);

impl PhoneticKey {
    /// Wraps a phonetic string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The underlying phonetic string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the key carries no phonetic content.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of symbols (Unicode scalar values) in the key, ignoring
    /// syllable separators.
    pub fn symbol_len(&self) -> usize {
        self.0.chars().filter(|c| *c != ' ').count()
    }

    /// The key with syllable separators removed, for edit-distance work.
    pub fn compact(&self) -> String {
        self.0.chars().filter(|c| *c != ' ').collect()
    }
}

impl fmt::Display for PhoneticKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PhoneticKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PhoneticKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Exact cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Lookups served from the cache.
    pub hits: u64,
    /// Lookups that required a conversion.
    pub misses: u64,
    /// Entries currently cached.
    pub size: usize,
}

impl CacheStats {
    /// Hit rate in `[0, 1]`; zero when nothing was looked up.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Deterministic text → phonetic conversion.
pub trait PhoneticBackend: Send + Sync {
    /// Language this backend converts for.
    fn language(&self) -> Language;

    /// Converts `text` into its phonetic key.
    ///
    /// Results are memoised. A transient engine failure surfaces as
    /// [`PhonofixError::Fuzzy`](crate::error::PhonofixError::Fuzzy); the
    /// corrector recovers it per window.
    fn to_phonetic(&self, text: &str) -> Result<PhoneticKey>;

    /// Batch conversion; the default loops over [`to_phonetic`](Self::to_phonetic).
    fn to_phonetic_batch(&self, texts: &[&str]) -> Vec<Result<PhoneticKey>> {
        texts.iter().map(|t| self.to_phonetic(t)).collect()
    }

    /// Whether the underlying engine has been initialised.
    fn is_initialized(&self) -> bool;

    /// Exact cache statistics.
    fn cache_stats(&self) -> CacheStats;

    /// Forces engine initialisation by converting a sample. Optional; the
    /// first real conversion initialises lazily anyway.
    fn warm_up(&self) -> Result<()>;
}

const DEFAULT_CACHE_CAPACITY: usize = 10_000;

struct Slot {
    value: String,
    last_used: u64,
}

struct MemoInner {
    map: FxHashMap<String, Slot>,
    tick: u64,
}

/// Bounded memoisation cache shared by the concrete backends.
///
/// Eviction is least-recently-used, found by scanning the metadata when the
/// cache overflows; a tenth of the capacity is dropped per eviction pass so
/// the scan amortises.
pub(crate) struct MemoCache {
    inner: Mutex<MemoInner>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoCache {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(MemoInner {
                map: FxHashMap::default(),
                tick: 0,
            }),
            capacity: capacity.max(16),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub(crate) fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }

    /// Returns the cached value for `key`, or computes, stores, and returns
    /// it. Failed computations are not cached.
    pub(crate) fn get_or_try_insert<F>(&self, key: &str, compute: F) -> Result<String>
    where
        F: FnOnce() -> Result<String>,
    {
        {
            let mut inner = self.inner.lock();
            inner.tick += 1;
            let tick = inner.tick;
            if let Some(slot) = inner.map.get_mut(key) {
                slot.last_used = tick;
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(slot.value.clone());
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = compute()?;

        let mut inner = self.inner.lock();
        if inner.map.len() >= self.capacity {
            Self::evict(&mut inner, self.capacity / 10 + 1);
        }
        inner.tick += 1;
        let tick = inner.tick;
        inner.map.insert(
            key.to_string(),
            Slot {
                value: value.clone(),
                last_used: tick,
            },
        );
        Ok(value)
    }

    fn evict(inner: &mut MemoInner, count: usize) {
        let mut ticks: Vec<u64> = inner.map.values().map(|s| s.last_used).collect();
        ticks.sort_unstable();
        let threshold = ticks[count.min(ticks.len()) - 1];
        inner.map.retain(|_, slot| slot.last_used > threshold);
    }

    pub(crate) fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: self.inner.lock().map.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_compact_and_symbol_len() {
        let key = PhoneticKey::new("tai bei che zhan");
        assert_eq!(key.compact(), "taibeichezhan");
        assert_eq!(key.symbol_len(), 13);
        assert!(!key.is_empty());
    }

    #[test]
    fn test_cache_hit_miss_counting() {
        let cache = MemoCache::new(16);
        let v = cache.get_or_try_insert("a", || Ok("1".into())).unwrap();
        assert_eq!(v, "1");
        let v = cache.get_or_try_insert("a", || panic!("must hit")).unwrap();
        assert_eq!(v, "1");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
        assert!((stats.hit_rate() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_cache_failure_not_cached() {
        let cache = MemoCache::new(16);
        let err = cache.get_or_try_insert("x", || {
            Err(crate::error::PhonofixError::Fuzzy {
                detail: "boom".into(),
            })
        });
        assert!(err.is_err());
        let ok = cache.get_or_try_insert("x", || Ok("y".into())).unwrap();
        assert_eq!(ok, "y");
    }

    #[test]
    fn test_cache_eviction_keeps_recent() {
        let cache = MemoCache::new(16);
        for i in 0..16 {
            cache
                .get_or_try_insert(&format!("k{i}"), || Ok(format!("v{i}")))
                .unwrap();
        }
        // Touch one entry so it survives the eviction pass.
        cache.get_or_try_insert("k15", || panic!("must hit")).unwrap();
        cache.get_or_try_insert("new", || Ok("v".into())).unwrap();

        let stats = cache.stats();
        assert!(stats.size <= 16);
        cache.get_or_try_insert("k15", || panic!("must hit")).unwrap();
    }
}
