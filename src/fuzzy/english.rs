//! English variant generation: IPA confusion rules plus surface rules.
//!
//! The phonetic half mutates the IPA key through confusion pairs (voicing,
//! similar phones, vowel length, reductions) and back-projects each mutant
//! to a spelling through a phoneme→grapheme table with greedy
//! longest-phoneme segmentation. The surface half covers what phoneme
//! edits cannot express: CamelCase splits, separator variants, acronym
//! spacing, and letter/digit sound-alikes. Variants whose IPA drifts more
//! than `max(2, ⌊0.35 × |base|⌋)` edits from the base are discarded.

use super::{FuzzyGenerator, VariantSource};
use crate::backend::english::EnglishBackend;
use crate::backend::{PhoneticBackend, PhoneticKey};
use crate::config::PhoneticOverrides;
use crate::distance::standard_distance;
use crate::error::Result;
use crate::phonetic::english::EnglishRules;
use std::sync::Arc;

// Voiced/voiceless pairs; confusable in both directions.
const VOICING_PAIRS: &[(&str, &str)] = &[
    ("p", "b"),
    ("t", "d"),
    ("k", "g"),
    ("f", "v"),
    ("s", "z"),
    ("θ", "ð"),
    ("ʃ", "ʒ"),
    ("tʃ", "dʒ"),
];

// Similar place/manner of articulation.
const SIMILAR_PAIRS: &[(&str, &str)] = &[
    ("θ", "f"),
    ("θ", "s"),
    ("θ", "t"),
    ("ð", "v"),
    ("ð", "z"),
    ("ð", "d"),
    ("r", "l"),
    ("n", "m"),
    ("ŋ", "n"),
    ("w", "v"),
    ("b", "v"),
    ("ʃ", "s"),
    ("ʒ", "z"),
    ("tʃ", "ʃ"),
    ("dʒ", "ʒ"),
];

// Long/short vowel confusions.
const VOWEL_PAIRS: &[(&str, &str)] = &[
    ("iː", "ɪ"),
    ("uː", "ʊ"),
    ("ɔː", "ɒ"),
    ("ɑː", "ʌ"),
    ("ɜː", "ə"),
    ("eɪ", "ɛ"),
    ("oʊ", "ɔ"),
    ("aɪ", "æ"),
    ("aʊ", "æ"),
];

// Fast-speech reductions; one-directional.
const REDUCTIONS: &[(&str, &str)] = &[
    ("ɪŋ", "ɪn"),
    ("ər", "ə"),
    ("nt", "n"),
    ("nd", "n"),
    ("ld", "l"),
    ("kw", "k"),
    ("str", "sr"),
];

// Phoneme → spellings, most common first. Longest phonemes first so the
// greedy segmenter never splits a digraph.
const IPA_TO_GRAPHEME: &[(&str, &[&str])] = &[
    ("tʃ", &["ch", "tch"]),
    ("dʒ", &["j", "g", "dge"]),
    ("iː", &["ee", "ea", "ie"]),
    ("uː", &["oo", "u", "ew"]),
    ("ɔː", &["aw", "au", "or"]),
    ("ɑː", &["a", "ar"]),
    ("ɜː", &["er", "ir", "ur"]),
    ("eɪ", &["ay", "ai", "a"]),
    ("aɪ", &["y", "i", "igh"]),
    ("ɔɪ", &["oy", "oi"]),
    ("oʊ", &["o", "ow", "oa"]),
    ("aʊ", &["ou", "ow"]),
    ("θ", &["th"]),
    ("ð", &["th"]),
    ("ʃ", &["sh", "ti", "ci"]),
    ("ʒ", &["s", "si"]),
    ("ŋ", &["ng", "n"]),
    ("j", &["y"]),
    ("æ", &["a"]),
    ("ɛ", &["e", "ea"]),
    ("ɪ", &["i", "y"]),
    ("ɑ", &["o", "a"]),
    ("ɒ", &["o"]),
    ("ɔ", &["o", "aw"]),
    ("ʊ", &["oo", "u"]),
    ("ʌ", &["u", "o"]),
    ("ə", &["a", "e", "u"]),
    ("k", &["k", "c", "ck"]),
    ("g", &["g"]),
    ("s", &["s", "c"]),
    ("z", &["z", "s"]),
    ("f", &["f", "ph"]),
    ("v", &["v"]),
    ("p", &["p"]),
    ("b", &["b"]),
    ("t", &["t"]),
    ("d", &["d"]),
    ("m", &["m"]),
    ("n", &["n"]),
    ("l", &["l"]),
    ("r", &["r"]),
    ("h", &["h"]),
    ("w", &["w"]),
];

// How ASR output splits common technical word roots. Replacements carry a
// trailing space so chained roots stay word-separated (tensorflow →
// "ten so flow" → "ten so floor").
const ASR_SPLIT_ROOTS: &[(&str, &[&str])] = &[
    ("tensor", &["ten so", "ten sor"]),
    ("flow", &["floor", "flo"]),
    ("python", &["pie thon", "pyton"]),
    ("script", &["scrip"]),
    ("docker", &["dock er"]),
    ("kube", &["cube"]),
    ("json", &["jay son", "jason"]),
    ("sql", &["sequel"]),
    ("node", &["nod"]),
    ("vue", &["view"]),
    ("java", &["jawa"]),
    ("react", &["re act"]),
    ("azure", &["a sure"]),
    ("numpy", &["num pie"]),
];

const MAX_SPLIT_SEEDS: usize = 24;

// Letters and digits that sound alike in dictation.
const LETTER_NUMBER_CONFUSIONS: &[(char, &[&str])] = &[
    ('e', &["1"]),
    ('o', &["0", "oh"]),
    ('b', &["be"]),
    ('c', &["see", "sea"]),
    ('i', &["eye"]),
    ('q', &["queue", "cue"]),
    ('r', &["are"]),
    ('t', &["tea", "tee"]),
    ('u', &["you"]),
    ('y', &["why"]),
    ('2', &["two", "to", "too"]),
    ('4', &["four", "for"]),
    ('8', &["eight", "ate"]),
];

const MAX_PHONETIC_VARIANTS: usize = 120;

/// IPA-confusion generator for English.
pub struct EnglishFuzzyGenerator {
    backend: Arc<EnglishBackend>,
    rules: Arc<EnglishRules>,
    overrides: PhoneticOverrides,
}

impl EnglishFuzzyGenerator {
    /// Creates a generator sharing the engine's backend and rule tables.
    pub fn new(
        backend: Arc<EnglishBackend>,
        rules: Arc<EnglishRules>,
        overrides: PhoneticOverrides,
    ) -> Self {
        Self {
            backend,
            rules,
            overrides,
        }
    }

    /// The rule tables (shared with the phonetic system).
    pub fn rules(&self) -> &Arc<EnglishRules> {
        &self.rules
    }

    fn push_replacements(key: &str, a: &str, b: &str, out: &mut Vec<String>) {
        if let Some(pos) = key.find(a) {
            let mut v = String::with_capacity(key.len());
            v.push_str(&key[..pos]);
            v.push_str(b);
            v.push_str(&key[pos + a.len()..]);
            out.push(v);
        }
    }

    fn segment_ipa<'a>(ipa: &'a str) -> Vec<&'a str> {
        let mut phonemes = Vec::new();
        let mut rest = ipa;
        'outer: while !rest.is_empty() {
            for (phoneme, _) in IPA_TO_GRAPHEME {
                if let Some(tail) = rest.strip_prefix(phoneme) {
                    phonemes.push(*phoneme);
                    rest = tail;
                    continue 'outer;
                }
            }
            let ch_len = rest.chars().next().map(|c| c.len_utf8()).unwrap_or(1);
            phonemes.push(&rest[..ch_len]);
            rest = &rest[ch_len..];
        }
        phonemes
    }

    fn camel_parts(term: &str) -> Vec<String> {
        let mut parts: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut prev_lower = false;

        for ch in term.chars() {
            let boundary = (ch.is_ascii_uppercase() && prev_lower)
                || (ch.is_ascii_digit() && !current.is_empty() && !prev_digit(&current));
            if boundary && !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
            current.push(ch);
            prev_lower = ch.is_ascii_lowercase();
        }
        if !current.is_empty() {
            parts.push(current);
        }

        fn prev_digit(s: &str) -> bool {
            s.chars().last().map(|c| c.is_ascii_digit()).unwrap_or(false)
        }

        parts
    }
}

impl FuzzyGenerator for EnglishFuzzyGenerator {
    fn phonetic_transform(&self, term: &str) -> Result<PhoneticKey> {
        self.backend.to_phonetic(term)
    }

    fn phonetic_variants(&self, key: &PhoneticKey) -> Vec<PhoneticKey> {
        let base = key.compact();
        let mut raw: Vec<String> = Vec::new();

        for (a, b) in VOICING_PAIRS.iter().chain(SIMILAR_PAIRS).chain(VOWEL_PAIRS) {
            Self::push_replacements(&base, a, b, &mut raw);
            Self::push_replacements(&base, b, a, &mut raw);
        }
        for (a, b) in REDUCTIONS {
            Self::push_replacements(&base, a, b, &mut raw);
        }
        for (a, b) in &self.overrides.extra_phoneme_pairs {
            Self::push_replacements(&base, a, b, &mut raw);
            Self::push_replacements(&base, b, a, &mut raw);
        }

        let mut out: Vec<PhoneticKey> = Vec::new();
        for v in raw {
            if v == base {
                continue;
            }
            let key = PhoneticKey::new(v);
            if !out.contains(&key) {
                out.push(key);
            }
            if out.len() >= MAX_PHONETIC_VARIANTS {
                break;
            }
        }
        out
    }

    fn phonetic_to_text(&self, key: &PhoneticKey) -> Option<String> {
        let compact = key.compact();
        let mut spelling = String::new();
        for phoneme in Self::segment_ipa(&compact) {
            match IPA_TO_GRAPHEME.iter().find(|(p, _)| *p == phoneme) {
                Some((_, graphemes)) => spelling.push_str(graphemes[0]),
                None if phoneme.is_ascii() => spelling.push_str(phoneme),
                None => return None,
            }
        }
        Some(spelling)
    }

    fn hardcoded_variants(&self, term: &str) -> Vec<(String, VariantSource)> {
        let mut out: Vec<(String, VariantSource)> = Vec::new();
        let mut push = |text: String, source: VariantSource| {
            if !text.is_empty() && text != term && !out.iter().any(|(t, _)| *t == text) {
                out.push((text, source));
            }
        };

        push(term.to_lowercase(), VariantSource::Hardcoded);

        // Separator variants: Vue.js → "vue js" / "vuejs".
        if term.contains(['.', '_', '-']) {
            let spaced: String = term
                .chars()
                .map(|c| if matches!(c, '.' | '_' | '-') { ' ' } else { c })
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            let compact: String = term.chars().filter(|c| !matches!(c, '.' | '_' | '-')).collect();
            push(spaced.clone(), VariantSource::Hardcoded);
            push(spaced.to_lowercase(), VariantSource::Hardcoded);
            push(compact.clone(), VariantSource::Hardcoded);
            push(compact.to_lowercase(), VariantSource::Hardcoded);
        }

        // CamelCase split: TensorFlow → "Tensor Flow".
        let parts = Self::camel_parts(term);
        if parts.len() >= 2 {
            let spaced = parts.join(" ");
            push(spaced.clone(), VariantSource::Hardcoded);
            push(spaced.to_lowercase(), VariantSource::Hardcoded);
        }

        // Short acronyms: API → "a p i" / "A.P.I.".
        if term.len() <= 6 && term.chars().all(|c| c.is_ascii_uppercase()) && !term.is_empty() {
            let letters: Vec<String> = term.chars().map(|c| c.to_ascii_lowercase().to_string()).collect();
            push(letters.join(" "), VariantSource::Hardcoded);
            let dotted: String = term.chars().map(|c| format!("{c}.")).collect();
            push(dotted, VariantSource::Hardcoded);
        }

        // ASR-style root splits, chained so multi-root names split fully.
        let lower = term.to_lowercase();
        let mut seeds = vec![lower.clone()];
        for (root, replacements) in ASR_SPLIT_ROOTS {
            if !lower.contains(root) {
                continue;
            }
            let mut next = seeds.clone();
            for seed in &seeds {
                if !seed.contains(root) {
                    continue;
                }
                for replacement in *replacements {
                    next.push(seed.replace(root, &format!("{replacement} ")));
                    if next.len() >= MAX_SPLIT_SEEDS {
                        break;
                    }
                }
            }
            next.truncate(MAX_SPLIT_SEEDS);
            seeds = next;
        }
        for seed in seeds {
            let cleaned = seed.split_whitespace().collect::<Vec<_>>().join(" ");
            if cleaned != lower {
                push(cleaned, VariantSource::Hardcoded);
            }
        }

        // Letter/digit sound-alikes, one position at a time.
        let chars: Vec<char> = term.chars().collect();
        for (i, ch) in chars.iter().enumerate() {
            let lower = ch.to_ascii_lowercase();
            if let Some((_, repls)) = LETTER_NUMBER_CONFUSIONS.iter().find(|(c, _)| *c == lower) {
                for repl in *repls {
                    let mut v: String = chars[..i].iter().collect();
                    v.push_str(repl);
                    v.extend(&chars[i + 1..]);
                    push(v.clone(), VariantSource::Hardcoded);
                    push(v.to_lowercase(), VariantSource::Hardcoded);
                }
            }
        }

        if let Some(extra) = self.overrides.hardcoded_for(term) {
            for v in extra {
                push(v.clone(), VariantSource::Hardcoded);
            }
        }

        out
    }

    fn accept_variant(&self, base: &PhoneticKey, variant: &PhoneticKey) -> bool {
        let base_compact = base.compact();
        let limit = 2.max((0.35 * base_compact.chars().count() as f64).floor() as usize);
        standard_distance(&base_compact, &variant.compact()) <= limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> EnglishFuzzyGenerator {
        EnglishFuzzyGenerator::new(
            Arc::new(EnglishBackend::with_rules()),
            Arc::new(EnglishRules::new(&PhoneticOverrides::new())),
            PhoneticOverrides::new(),
        )
    }

    #[test]
    fn test_segment_ipa_greedy() {
        assert_eq!(
            EnglishFuzzyGenerator::segment_ipa("tʃiːz"),
            vec!["tʃ", "iː", "z"]
        );
    }

    #[test]
    fn test_phonetic_variants_cover_voicing() {
        let gen = generator();
        let variants = gen.phonetic_variants(&PhoneticKey::new("pæt"));
        assert!(variants.iter().any(|v| v.as_str() == "bæt"));
        assert!(variants.iter().any(|v| v.as_str() == "pæd"));
    }

    #[test]
    fn test_back_projection() {
        let gen = generator();
        let spelling = gen.phonetic_to_text(&PhoneticKey::new("θɪŋk")).unwrap();
        assert_eq!(spelling, "thingk");
    }

    #[test]
    fn test_camel_split() {
        assert_eq!(
            EnglishFuzzyGenerator::camel_parts("TensorFlow"),
            vec!["Tensor", "Flow"]
        );
        assert_eq!(EnglishFuzzyGenerator::camel_parts("python"), vec!["python"]);
    }

    #[test]
    fn test_hardcoded_acronym_spacing() {
        let gen = generator();
        let variants = gen.hardcoded_variants("API");
        assert!(variants.iter().any(|(t, _)| t == "a p i"));
        assert!(variants.iter().any(|(t, _)| t == "A.P.I."));
    }

    #[test]
    fn test_asr_split_roots_chain() {
        let gen = generator();
        let variants = gen.hardcoded_variants("TensorFlow");
        assert!(
            variants.iter().any(|(t, _)| t == "ten so floor"),
            "expected 'ten so floor' among {:?}",
            variants.iter().map(|(t, _)| t).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_hardcoded_letter_number() {
        let gen = generator();
        let variants = gen.hardcoded_variants("EKG");
        assert!(variants.iter().any(|(t, _)| t == "1kg"));
    }

    #[test]
    fn test_distance_filter() {
        let gen = generator();
        let base = PhoneticKey::new("paɪθɑn");
        assert!(gen.accept_variant(&base, &PhoneticKey::new("paɪtɑn")));
        assert!(!gen.accept_variant(&base, &PhoneticKey::new("zzzzzzzz")));
    }

    #[test]
    fn test_generate_excludes_term() {
        let gen = generator();
        let variants = gen.generate_variants("Python", 20);
        assert!(variants.iter().all(|v| v.text.to_lowercase() != "python"));
        assert!(!variants.is_empty());
    }

    #[test]
    fn test_variant_budget_respected() {
        let gen = generator();
        assert!(gen.generate_variants("TensorFlow", 5).len() <= 5);
    }
}
