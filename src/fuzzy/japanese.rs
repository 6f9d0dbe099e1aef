//! Japanese variant generation: kana confusion combos and romaji rules.
//!
//! The canonical's hiragana reading expands through per-kana confusion
//! sets (dakuten/handakuten, particles, similar sounds), bounded at fifty
//! combinations per step. Kana-level phrase rules then cover the long
//! vowel and small-tsu alternations, and the first few kana variants
//! project to romaji where the romanisation-variant rules (si↔shi, L/R
//! rows) apply. Variants that normalise to the same key collapse through
//! the homophone filter, keeping the shortest spelling of each sound.

use super::{finalize_variants, score_keys, FuzzyGenerator, Variant, VariantSource};
use crate::backend::japanese::JapaneseBackend;
use crate::backend::{PhoneticBackend, PhoneticKey};
use crate::config::PhoneticOverrides;
use crate::error::Result;
use crate::tokenizer::is_hanzi;
use std::sync::Arc;
use wana_kana::ConvertJapanese;

// Dakuten pairs: voiceless ↔ voiced.
const VOICED_PAIRS: &[(char, char)] = &[
    ('か', 'が'),
    ('き', 'ぎ'),
    ('く', 'ぐ'),
    ('け', 'げ'),
    ('こ', 'ご'),
    ('さ', 'ざ'),
    ('し', 'じ'),
    ('す', 'ず'),
    ('せ', 'ぜ'),
    ('そ', 'ぞ'),
    ('た', 'だ'),
    ('ち', 'ぢ'),
    ('つ', 'づ'),
    ('て', 'で'),
    ('と', 'ど'),
    ('は', 'ば'),
    ('ひ', 'び'),
    ('ふ', 'ぶ'),
    ('へ', 'べ'),
    ('ほ', 'ぼ'),
];

// Handakuten pairs.
const SEMI_VOICED_PAIRS: &[(char, char)] = &[
    ('は', 'ぱ'),
    ('ひ', 'ぴ'),
    ('ふ', 'ぷ'),
    ('へ', 'ぺ'),
    ('ほ', 'ぽ'),
];

// Particles written one way, pronounced another.
const PARTICLE_PAIRS: &[(char, char)] = &[('は', 'わ'), ('を', 'お'), ('へ', 'え')];

// Near-identical sounds in modern Japanese.
const SIMILAR_PAIRS: &[(char, char)] = &[('じ', 'ぢ'), ('ず', 'づ')];

const MAX_KANA_COMBOS: usize = 50;
const MAX_ROMAJI_SEEDS: usize = 10;

/// Kana-confusion generator for Japanese.
pub struct JapaneseFuzzyGenerator {
    backend: Arc<JapaneseBackend>,
    overrides: PhoneticOverrides,
}

impl JapaneseFuzzyGenerator {
    /// Creates a generator sharing the engine's backend.
    pub fn new(backend: Arc<JapaneseBackend>, overrides: PhoneticOverrides) -> Self {
        Self { backend, overrides }
    }

    fn kana_variations(ch: char) -> Vec<char> {
        let mut out = vec![ch];
        let mut push = |c: char| {
            if !out.contains(&c) {
                out.push(c);
            }
        };

        for (a, b) in PARTICLE_PAIRS {
            if ch == *a {
                push(*b);
            }
            if ch == *b {
                push(*a);
            }
        }
        for (a, b) in VOICED_PAIRS.iter().chain(SEMI_VOICED_PAIRS).chain(SIMILAR_PAIRS) {
            if ch == *a {
                push(*b);
            }
            if ch == *b {
                push(*a);
            }
        }

        out
    }

    /// Whole-word kana alternations: long vowels and the small tsu.
    fn kana_phrase_rules(hira: &str) -> Vec<String> {
        let mut variants = vec![hira.to_string()];
        let mut push = |s: String| {
            if !variants.contains(&s) {
                variants.push(s);
            }
        };

        if hira.contains("おう") {
            push(hira.replace("おう", "おお"));
            push(hira.replace("おう", "お"));
        }
        if hira.contains("えい") {
            push(hira.replace("えい", "ええ"));
            push(hira.replace("えい", "え"));
        }
        if hira.contains('っ') {
            push(hira.replace('っ', ""));
        }

        variants
    }

    fn kana_combinations(hira: &str) -> Vec<String> {
        let options: Vec<Vec<char>> = hira.chars().map(Self::kana_variations).collect();
        let n = options.len();
        if n == 0 {
            return Vec::new();
        }

        let mut combos = Vec::new();
        let mut counter = vec![0usize; n];
        loop {
            if combos.len() >= MAX_KANA_COMBOS {
                break;
            }
            let combo: String = counter
                .iter()
                .enumerate()
                .map(|(i, &c)| options[i][c])
                .collect();
            combos.push(combo);

            let mut i = 0;
            loop {
                if i == n {
                    return combos;
                }
                counter[i] += 1;
                if counter[i] < options[i].len() {
                    break;
                }
                counter[i] = 0;
                i += 1;
            }
        }
        combos
    }

    fn romaji_rule_variants(romaji: &str) -> Vec<String> {
        use crate::backend::japanese::{GEMINATION, LONG_VOWELS, NASALS, ROMANIZATION_VARIANTS};

        let mut out = vec![romaji.to_string()];
        let mut push = |s: String| {
            if !s.is_empty() && !out.contains(&s) {
                out.push(s);
            }
        };

        for (wrong, standard) in ROMANIZATION_VARIANTS {
            if romaji.contains(standard) {
                push(romaji.replace(standard, wrong));
            }
            if romaji.contains(wrong) {
                push(romaji.replace(wrong, standard));
            }
        }
        for (long, short) in LONG_VOWELS {
            if romaji.contains(long) {
                push(romaji.replace(long, short));
            }
        }
        for (geminated, single) in GEMINATION {
            if romaji.contains(geminated) {
                push(romaji.replace(geminated, single));
            }
        }
        for (m_form, n_form) in NASALS {
            if romaji.contains(m_form) {
                push(romaji.replace(m_form, n_form));
            }
            if romaji.contains(n_form) {
                push(romaji.replace(n_form, m_form));
            }
        }

        out
    }

    /// Same-reading kanji surfaces from the bundled table, for canonicals
    /// that contain ideographs.
    fn kanji_homophones(&self, term: &str) -> Vec<String> {
        use crate::backend::japanese::KANJI_READINGS;

        if !term.chars().any(is_hanzi) {
            return Vec::new();
        }

        let reading = self.backend.reading_hiragana(term);
        KANJI_READINGS
            .iter()
            .filter(|(surface, surface_reading)| {
                *surface != term && *surface_reading == reading
            })
            .map(|(surface, _)| surface.to_string())
            .collect()
    }

    /// Collapses homophones: keeps the first surface of each normalised
    /// key. Returns `(kept, filtered)`.
    pub fn filter_homophones(&self, terms: &[String]) -> (Vec<String>, Vec<String>) {
        let mut kept = Vec::new();
        let mut filtered = Vec::new();
        let mut seen: Vec<String> = Vec::new();

        for term in terms {
            let key = self
                .backend
                .to_phonetic(term)
                .map(|k| k.compact())
                .unwrap_or_else(|_| term.to_lowercase());
            if seen.contains(&key) {
                filtered.push(term.clone());
            } else {
                seen.push(key);
                kept.push(term.clone());
            }
        }

        (kept, filtered)
    }
}

impl FuzzyGenerator for JapaneseFuzzyGenerator {
    fn phonetic_transform(&self, term: &str) -> Result<PhoneticKey> {
        self.backend.to_phonetic(term)
    }

    fn phonetic_variants(&self, key: &PhoneticKey) -> Vec<PhoneticKey> {
        Self::romaji_rule_variants(key.as_str())
            .into_iter()
            .skip(1)
            .map(PhoneticKey::new)
            .collect()
    }

    fn phonetic_to_text(&self, key: &PhoneticKey) -> Option<String> {
        Some(key.as_str().to_string())
    }

    fn generate_variants(&self, term: &str, max_variants: usize) -> Vec<Variant> {
        let Ok(base_key) = self.phonetic_transform(term) else {
            return finalize_variants(term, Vec::new(), max_variants);
        };

        let reading = self.backend.reading_hiragana(term);

        let mut kana_variants: Vec<String> = Vec::new();
        for combo in Self::kana_combinations(&reading) {
            for phrased in Self::kana_phrase_rules(&combo) {
                if !kana_variants.contains(&phrased) {
                    kana_variants.push(phrased);
                }
            }
        }

        let mut romaji_variants: Vec<String> = Vec::new();
        for kana in kana_variants.iter().take(MAX_ROMAJI_SEEDS) {
            let romaji: String = kana.to_romaji()
                .to_lowercase()
                .chars()
                .filter(|c| !c.is_whitespace() && *c != '\'')
                .collect();
            if romaji.is_empty() {
                continue;
            }
            for variant in Self::romaji_rule_variants(&romaji) {
                if !romaji_variants.contains(&variant) {
                    romaji_variants.push(variant);
                }
            }
        }

        let mut variants: Vec<Variant> = Vec::new();
        let push_surface = |text: String, source: VariantSource, variants: &mut Vec<Variant>| {
            if text == term {
                return;
            }
            let Ok(key) = self.backend.to_phonetic(&text) else {
                return;
            };
            let score = score_keys(&base_key, &key);
            variants.push(Variant {
                text,
                key,
                score,
                source,
            });
        };

        for kana in kana_variants {
            push_surface(kana, VariantSource::PhoneticFuzzy, &mut variants);
        }
        for romaji in romaji_variants {
            push_surface(romaji, VariantSource::Romanization, &mut variants);
        }
        for kanji in self.kanji_homophones(term) {
            push_surface(kanji, VariantSource::Hardcoded, &mut variants);
        }
        if let Some(extra) = self.overrides.hardcoded_for(term) {
            for v in extra.to_vec() {
                push_surface(v, VariantSource::Hardcoded, &mut variants);
            }
        }

        // Collapse spellings of the same sound before ranking: shortest
        // spelling first, so the kept representative is the tightest one.
        variants.sort_by(|a, b| {
            a.text
                .chars()
                .count()
                .cmp(&b.text.chars().count())
                .then_with(|| a.text.cmp(&b.text))
        });

        finalize_variants(term, variants, max_variants)
    }
}
