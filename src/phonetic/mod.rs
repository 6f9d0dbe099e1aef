//! Per-language phonetic systems: rule tables and similarity scoring.
//!
//! A [`PhoneticSystem`] owns its language's immutable rule tables (loaded
//! at engine construction, extensible through
//! [`PhoneticOverrides`](crate::config::PhoneticOverrides)) and exposes the
//! handful of operations the matcher needs: key computation, similarity
//! with a built-in per-length tolerance, and the cheap pruning helpers
//! (lead-phoneme buckets, key-length limits, window slack).
//!
//! Matching happens in one and only one phonetic domain per language; a
//! system never scores keys produced by another language's backend.

use crate::backend::PhoneticKey;
use crate::config::Language;
use crate::error::Result;

#[cfg(feature = "english")]
pub mod english;
#[cfg(feature = "japanese")]
pub mod japanese;
#[cfg(feature = "mandarin")]
pub mod mandarin;

/// Language-specific phonetic operations consumed by the corrector.
pub trait PhoneticSystem: Send + Sync {
    /// Language this system scores in.
    fn language(&self) -> Language;

    /// Phonetic key of a surface string (delegates to the backend).
    fn key(&self, text: &str) -> Result<PhoneticKey>;

    /// Joins per-token keys into one window key.
    fn join_keys(&self, keys: &[PhoneticKey]) -> PhoneticKey {
        let mut joined = String::new();
        for key in keys {
            joined.push_str(&key.compact());
        }
        PhoneticKey::new(joined)
    }

    /// Scores a window against a search target.
    ///
    /// Returns `(error_ratio, is_match)`: the normalised phonetic distance
    /// (lower is closer) and whether it clears the per-length tolerance.
    fn similarity(
        &self,
        window_surface: &str,
        window_key: &PhoneticKey,
        target_surface: &str,
        target_key: &PhoneticKey,
    ) -> (f64, bool);

    /// Bucket id of the key's first phoneme, `-1` when unknown. Windows
    /// with an unknown lead scan every bucket.
    fn lead_group(&self, key: &PhoneticKey) -> i16;

    /// `(below, above)` window-length slack around a target's token count.
    fn window_slack(&self) -> (usize, usize);

    /// Context window `W` (in characters) for the distance-weighted
    /// keyword bonus.
    fn context_window(&self) -> usize;

    /// Whether a window surface is even a plausible match (e.g. the
    /// Mandarin matcher refuses spans containing punctuation).
    fn is_valid_surface(&self, _surface: &str) -> bool {
        true
    }

    /// Maximum allowed symbol-length difference between a window key and a
    /// target key of the given length, for cheap pruning.
    fn max_key_len_diff(&self, _target_key_len: usize) -> f64 {
        f64::INFINITY
    }
}
