//! Japanese similarity over normalised Hepburn Romaji.
//!
//! Keys arrive already normalised (long vowels collapsed, geminates
//! reduced, Kunrei folded to Hepburn), so similarity is a plain edit
//! distance with a short absolute allowance: zero edits for short keys,
//! one for medium, two for long. Romaji is compact enough that a single
//! stray edit on a three-symbol key is usually a different word.

use super::PhoneticSystem;
use crate::backend::japanese::JapaneseBackend;
use crate::backend::{PhoneticBackend, PhoneticKey};
use crate::config::{Language, PhoneticOverrides};
use crate::distance;
use crate::error::Result;
use crate::tokenizer::{is_hanzi, is_kana};
use std::sync::Arc;

/// Immutable Japanese matching parameters.
pub struct JapaneseRules {
    tolerance_override: Option<f64>,
}

impl JapaneseRules {
    /// Builds the tables, folding in caller overrides.
    pub fn new(overrides: &PhoneticOverrides) -> Self {
        Self {
            tolerance_override: overrides.tolerance_override,
        }
    }

    /// Allowed absolute edit distance for a key of the given length.
    pub fn allowed_edits(&self, key_len: usize) -> usize {
        match key_len {
            0..=3 => 0,
            4..=6 => 1,
            _ => 2,
        }
    }
}

/// The Japanese [`PhoneticSystem`].
pub struct JapaneseSystem {
    backend: Arc<JapaneseBackend>,
    rules: Arc<JapaneseRules>,
}

impl JapaneseSystem {
    /// Creates a system over a backend and rule tables.
    pub fn new(backend: Arc<JapaneseBackend>, rules: Arc<JapaneseRules>) -> Self {
        Self { backend, rules }
    }
}

fn lead_group_of(first: char) -> i16 {
    match first {
        'a' | 'e' | 'i' | 'o' | 'u' => 0,
        'p' | 'b' => 1,
        't' | 'd' => 2,
        'k' | 'g' => 3,
        's' | 'z' => 4,
        'h' | 'f' => 5,
        'm' | 'n' => 6,
        'r' | 'l' => 7,
        'w' | 'y' => 8,
        'j' | 'c' => 9,
        _ => -1,
    }
}

impl PhoneticSystem for JapaneseSystem {
    fn language(&self) -> Language {
        Language::Japanese
    }

    fn key(&self, text: &str) -> Result<PhoneticKey> {
        self.backend.to_phonetic(text)
    }

    fn similarity(
        &self,
        _window_surface: &str,
        window_key: &PhoneticKey,
        _target_surface: &str,
        target_key: &PhoneticKey,
    ) -> (f64, bool) {
        // Window keys are concatenations of token keys; re-normalise so
        // boundary effects (to + okyo) collapse the same way.
        let w = JapaneseBackend::normalize_romaji(window_key.as_str());
        let t = JapaneseBackend::normalize_romaji(target_key.as_str());

        let max_len = w.chars().count().max(t.chars().count());
        if max_len == 0 {
            return (0.0, true);
        }

        let dist = distance::standard_distance(&w, &t);
        let ratio = dist as f64 / max_len as f64;

        let is_match = match self.rules.tolerance_override {
            Some(tolerance) => ratio <= tolerance,
            None => dist <= self.rules.allowed_edits(max_len),
        };

        (ratio, is_match)
    }

    fn lead_group(&self, key: &PhoneticKey) -> i16 {
        key.as_str()
            .chars()
            .find(|c| *c != ' ')
            .map(|c| lead_group_of(c.to_ascii_lowercase()))
            .unwrap_or(-1)
    }

    fn window_slack(&self) -> (usize, usize) {
        (2, 2)
    }

    fn context_window(&self) -> usize {
        50
    }

    fn is_valid_surface(&self, surface: &str) -> bool {
        !surface.is_empty()
            && surface
                .chars()
                .all(|c| is_kana(c) || is_hanzi(c) || c.is_ascii_alphanumeric() || c == 'ー')
    }

    fn max_key_len_diff(&self, target_key_len: usize) -> f64 {
        target_key_len.max(5) as f64 * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::japanese;

    fn system() -> JapaneseSystem {
        JapaneseSystem::new(
            japanese::global(),
            Arc::new(JapaneseRules::new(&PhoneticOverrides::new())),
        )
    }

    fn score(sys: &JapaneseSystem, a: &str, b: &str) -> (f64, bool) {
        let ka = sys.key(a).unwrap();
        let kb = sys.key(b).unwrap();
        sys.similarity(a, &ka, b, &kb)
    }

    #[test]
    fn test_identical_reading() {
        let sys = system();
        let (ratio, ok) = score(&sys, "asupirin", "アスピリン");
        assert_eq!(ratio, 0.0);
        assert!(ok);
    }

    #[test]
    fn test_long_vowel_variants_match() {
        let sys = system();
        let (_, ok) = score(&sys, "toukyou", "東京");
        assert!(ok);
    }

    #[test]
    fn test_short_keys_are_strict() {
        let rules = JapaneseRules::new(&PhoneticOverrides::new());
        assert_eq!(rules.allowed_edits(3), 0);
        assert_eq!(rules.allowed_edits(5), 1);
        assert_eq!(rules.allowed_edits(9), 2);
    }

    #[test]
    fn test_single_edit_on_long_key_matches() {
        let sys = system();
        let (_, ok) = score(&sys, "asupilin", "アスピリン");
        assert!(ok, "l/r folding plus edit allowance should match");
    }

    #[test]
    fn test_unrelated_rejected() {
        let sys = system();
        let (_, ok) = score(&sys, "konbini", "アスピリン");
        assert!(!ok);
    }

    #[test]
    fn test_lead_groups() {
        let sys = system();
        assert_eq!(
            sys.lead_group(&PhoneticKey::new("asupirin")),
            sys.lead_group(&PhoneticKey::new("end"))
        );
        assert_eq!(
            sys.lead_group(&PhoneticKey::new("ramen")),
            sys.lead_group(&PhoneticKey::new("lamen"))
        );
    }
}
