//! Mandarin backend: hanzi → toneless Pinyin.
//!
//! Conversion is table-driven via the `pinyin` crate, so this backend has
//! no external engine and never reports itself uninitialised. Keys are
//! space-separated toneless syllables; ASCII alphanumerics inside mixed
//! terms (`C語言`, `1kg`) pass through lowercased as their own syllables,
//! everything else contributes nothing to the key.

use super::{MemoCache, PhoneticBackend, PhoneticKey};
use crate::config::Language;
use crate::error::Result;
use once_cell::sync::Lazy;
use pinyin::ToPinyin;
use std::sync::Arc;

static GLOBAL: Lazy<Arc<MandarinBackend>> = Lazy::new(|| Arc::new(MandarinBackend::new()));

/// Process-wide shared instance.
pub fn global() -> Arc<MandarinBackend> {
    GLOBAL.clone()
}

/// Hanzi → toneless Pinyin backend.
pub struct MandarinBackend {
    cache: MemoCache,
}

impl MandarinBackend {
    /// Creates a backend with the default cache capacity.
    pub fn new() -> Self {
        Self {
            cache: MemoCache::with_default_capacity(),
        }
    }

    fn syllables_uncached(text: &str) -> Vec<String> {
        let mut syllables = Vec::new();
        for (ch, py) in text.chars().zip(text.to_pinyin()) {
            match py {
                Some(p) => syllables.push(p.plain().to_string()),
                None => {
                    if ch.is_ascii_alphanumeric() {
                        syllables.push(ch.to_ascii_lowercase().to_string());
                    }
                    // Punctuation and whitespace carry no phonetic content.
                }
            }
        }
        syllables
    }
}

impl Default for MandarinBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PhoneticBackend for MandarinBackend {
    fn language(&self) -> Language {
        Language::Mandarin
    }

    fn to_phonetic(&self, text: &str) -> Result<PhoneticKey> {
        let key = self
            .cache
            .get_or_try_insert(text, || Ok(Self::syllables_uncached(text).join(" ")))?;
        Ok(PhoneticKey::new(key))
    }

    fn is_initialized(&self) -> bool {
        true
    }

    fn cache_stats(&self) -> super::CacheStats {
        self.cache.stats()
    }

    fn warm_up(&self) -> Result<()> {
        self.to_phonetic("你好").map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_pinyin() {
        let backend = MandarinBackend::new();
        let key = backend.to_phonetic("台北").unwrap();
        assert_eq!(key.as_str(), "tai bei");
    }

    #[test]
    fn test_four_char_term() {
        let backend = MandarinBackend::new();
        let key = backend.to_phonetic("台北車站").unwrap();
        assert_eq!(key.as_str(), "tai bei che zhan");
        assert_eq!(key.compact(), "taibeichezhan");
    }

    #[test]
    fn test_ascii_passthrough() {
        let backend = MandarinBackend::new();
        assert_eq!(backend.to_phonetic("1kg").unwrap().as_str(), "1 k g");
        assert_eq!(backend.to_phonetic("EKG").unwrap().as_str(), "e k g");
        assert_eq!(backend.to_phonetic("C語言").unwrap().as_str(), "c yu yan");
    }

    #[test]
    fn test_punctuation_dropped() {
        let backend = MandarinBackend::new();
        assert_eq!(backend.to_phonetic("牛奶,").unwrap().as_str(), "niu nai");
    }

    #[test]
    fn test_caching_and_stats() {
        let backend = MandarinBackend::new();
        backend.to_phonetic("牛奶").unwrap();
        backend.to_phonetic("牛奶").unwrap();
        let stats = backend.cache_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!(backend.is_initialized());
    }

    #[test]
    fn test_global_is_shared() {
        let a = global();
        let b = global();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
