//! English rule tables and IPA similarity.
//!
//! The error ratio of a window against a target is the minimum of three
//! normalised distances: raw IPA, phoneme-group-mapped IPA (so b/p or i/ɛ
//! differences stop inflating the distance), and the consonant skeleton
//! (so vowel-heavy mishearings like "post grass sequel" still land near
//! "postgresql"). Dissimilar first phonemes clamp the tolerance hard.

use super::PhoneticSystem;
use crate::backend::english::EnglishBackend;
use crate::backend::{PhoneticBackend, PhoneticKey};
use crate::config::{Language, PhoneticOverrides};
use crate::distance;
use crate::error::Result;
use std::sync::Arc;

// Similar-phoneme groups; one letter of distance inside a group is free at
// the group-mapped level.
const BASE_PHONEME_GROUPS: &[&[char]] = &[
    &['p', 'b'],
    &['t', 'd'],
    &['k', 'g'],
    &['f', 'v'],
    &['s', 'z'],
    &['θ', 'ð'],
    &['ʃ', 'ʒ'],
    &['ʧ', 'ʤ'],
    &['m', 'n', 'ŋ'],
    &['l', 'r', 'ɹ'],
    &['w', 'ʍ'],
    &['i', 'ɪ', 'e', 'ɛ'],
    &['u', 'ʊ', 'o', 'ɔ'],
    &['a', 'ɑ', 'æ', 'ʌ'],
];

const VOWELS: &[char] = &[
    'a', 'e', 'i', 'o', 'u', 'ɪ', 'ɛ', 'æ', 'ɑ', 'ɔ', 'ʌ', 'ə', 'ɐ', 'ʊ', 'ɚ', 'ɝ',
];

// Glides are unstable in ASR output; the skeleton drops them too.
const WEAK: &[char] = &['j', 'w'];

/// Immutable English rule tables.
pub struct EnglishRules {
    phoneme_groups: Vec<Vec<char>>,
    tolerance_override: Option<f64>,
}

impl EnglishRules {
    /// Builds the tables, folding in caller overrides.
    pub fn new(overrides: &PhoneticOverrides) -> Self {
        let mut groups: Vec<Vec<char>> = BASE_PHONEME_GROUPS
            .iter()
            .map(|g| g.to_vec())
            .collect();

        for (a, b) in &overrides.extra_phoneme_pairs {
            let (Some(ca), Some(cb)) = (a.chars().next(), b.chars().next()) else {
                continue;
            };
            match groups.iter().position(|g| g.contains(&ca) || g.contains(&cb)) {
                Some(idx) => {
                    for c in [ca, cb] {
                        if !groups[idx].contains(&c) {
                            groups[idx].push(c);
                        }
                    }
                }
                None => groups.push(vec![ca, cb]),
            }
        }

        Self {
            phoneme_groups: groups,
            tolerance_override: overrides.tolerance_override,
        }
    }

    /// Group index of a phoneme symbol.
    pub fn group_of(&self, ch: char) -> Option<usize> {
        self.phoneme_groups.iter().position(|g| g.contains(&ch))
    }

    /// Strips separators and folds notation variants so distance sees
    /// phonemes, not transcription noise.
    pub fn normalize_for_distance(&self, ipa: &str) -> String {
        ipa.chars()
            .filter(|c| *c != ' ' && *c != 'ː' && *c != 'ˈ' && *c != 'ˌ')
            .map(|c| match c {
                'ɚ' | 'ɝ' => 'ə',
                'ɡ' => 'g',
                'ɹ' => 'r',
                other => other,
            })
            .collect()
    }

    fn map_to_groups(&self, ipa: &str) -> String {
        ipa.chars()
            .map(|c| match self.group_of(c) {
                Some(idx) => (b'A' + idx as u8) as char,
                None => c,
            })
            .collect()
    }

    fn consonant_skeleton(&self, ipa: &str) -> String {
        ipa.chars()
            .filter(|c| !VOWELS.contains(c) && !WEAK.contains(c))
            .collect()
    }

    fn first_phonemes_similar(&self, a: &str, b: &str) -> bool {
        let (Some(ca), Some(cb)) = (a.chars().next(), b.chars().next()) else {
            return true;
        };
        if ca == cb {
            return true;
        }
        matches!((self.group_of(ca), self.group_of(cb)), (Some(x), Some(y)) if x == y)
    }

    fn tolerance(&self, key_len: usize) -> f64 {
        if let Some(t) = self.tolerance_override {
            return t;
        }
        if key_len <= 8 {
            0.35
        } else {
            0.45
        }
    }
}

/// The English [`PhoneticSystem`].
pub struct EnglishSystem {
    backend: Arc<EnglishBackend>,
    rules: Arc<EnglishRules>,
}

impl EnglishSystem {
    /// Creates a system over a backend and rule tables.
    pub fn new(backend: Arc<EnglishBackend>, rules: Arc<EnglishRules>) -> Self {
        Self { backend, rules }
    }

    /// The shared rule tables.
    pub fn rules(&self) -> &Arc<EnglishRules> {
        &self.rules
    }
}

impl PhoneticSystem for EnglishSystem {
    fn language(&self) -> Language {
        Language::English
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
        let raw_w = self.rules.normalize_for_distance(window_key.as_str());
        let raw_t = self.rules.normalize_for_distance(target_key.as_str());

        let len_w = raw_w.chars().count();
        let len_t = raw_t.chars().count();
        let max_len = len_w.max(len_t);
        let min_len = len_w.min(len_t);
        if max_len == 0 {
            return (0.0, true);
        }
        // Extreme length mismatch: not worth scoring.
        if min_len > 0 && (max_len - min_len) as f64 / min_len as f64 > 0.8 {
            return (1.0, false);
        }

        let ratio_raw = distance::normalized_distance(&raw_w, &raw_t);

        let g_w = self.rules.map_to_groups(&raw_w);
        let g_t = self.rules.map_to_groups(&raw_t);
        let ratio_group = distance::normalized_distance(&g_w, &g_t);

        let c_w = self.rules.consonant_skeleton(&raw_w);
        let c_t = self.rules.consonant_skeleton(&raw_t);
        let c_max = c_w.chars().count().max(c_t.chars().count());
        let ratio_cons = if c_max >= 4 {
            distance::normalized_distance(&c_w, &c_t)
        } else {
            1.0
        };

        let ratio = ratio_raw.min(ratio_group).min(ratio_cons);

        let mut tolerance = self.rules.tolerance(max_len);
        if !self.rules.first_phonemes_similar(&raw_w, &raw_t) {
            tolerance = tolerance.min(0.15);
        }

        (ratio, ratio <= tolerance)
    }

    fn lead_group(&self, key: &PhoneticKey) -> i16 {
        let normalized = self.rules.normalize_for_distance(key.as_str());
        match normalized.chars().next() {
            Some(ch) => self.rules.group_of(ch).map(|g| g as i16).unwrap_or(-1),
            None => -1,
        }
    }

    fn window_slack(&self) -> (usize, usize) {
        (2, 3)
    }

    fn context_window(&self) -> usize {
        50
    }

    fn max_key_len_diff(&self, target_key_len: usize) -> f64 {
        target_key_len.max(5) as f64 * 0.6
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::english::EnglishBackend;

    fn system() -> EnglishSystem {
        EnglishSystem::new(
            Arc::new(EnglishBackend::with_rules()),
            Arc::new(EnglishRules::new(&PhoneticOverrides::new())),
        )
    }

    fn score(sys: &EnglishSystem, a: &str, b: &str) -> (f64, bool) {
        let ka = sys.key(a).unwrap();
        let kb = sys.key(b).unwrap();
        sys.similarity(a, &ka, b, &kb)
    }

    #[test]
    fn test_identical_words() {
        let sys = system();
        let (ratio, ok) = score(&sys, "python", "python");
        assert_eq!(ratio, 0.0);
        assert!(ok);
    }

    #[test]
    fn test_near_spelling_matches() {
        let sys = system();
        let (ratio, ok) = score(&sys, "pyton", "python");
        assert!(ok, "pyton should match python, ratio {ratio}");
    }

    #[test]
    fn test_unrelated_words_rejected() {
        let sys = system();
        let (_, ok) = score(&sys, "banana", "python");
        assert!(!ok);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let sys = system();
        let (ratio, ok) = score(&sys, "a", "tensorflow");
        assert_eq!(ratio, 1.0);
        assert!(!ok);
    }

    #[test]
    fn test_group_mapping_forgives_voicing() {
        let rules = EnglishRules::new(&PhoneticOverrides::new());
        assert_eq!(rules.map_to_groups("pat"), rules.map_to_groups("bad"));
    }

    #[test]
    fn test_consonant_skeleton() {
        let rules = EnglishRules::new(&PhoneticOverrides::new());
        assert_eq!(rules.consonant_skeleton("pæθɑn"), "pθn");
    }

    #[test]
    fn test_first_phoneme_clamp() {
        let rules = EnglishRules::new(&PhoneticOverrides::new());
        assert!(rules.first_phonemes_similar("bɪt", "pɪt"));
        assert!(!rules.first_phonemes_similar("kɪt", "sɪt"));
    }

    #[test]
    fn test_tolerance_ladder() {
        let rules = EnglishRules::new(&PhoneticOverrides::new());
        assert_eq!(rules.tolerance(6), 0.35);
        assert_eq!(rules.tolerance(12), 0.45);
    }
}
