//! Fuzzy variant generation.
//!
//! A generator expands one canonical term into the set of phonetically
//! plausible surfaces an ASR system (or a hurried human) might produce for
//! it. The shared pipeline is a template: transform the term to its
//! phonetic key, mutate the key through the language's confusion rules,
//! back-project each mutated key to a representative surface, mix in
//! hardcoded surface rules, then score, dedup by key, drop the original
//! term, and truncate deterministically.
//!
//! Mandarin replaces the key-mutation steps with per-character homophone
//! combination (see [`mandarin`]); the contract — scored, key-deduped,
//! canonical-free output — is the same.

use crate::backend::PhoneticKey;
use crate::distance;
use crate::error::Result;

#[cfg(feature = "english")]
pub mod english;
#[cfg(feature = "japanese")]
pub mod japanese;
#[cfg(feature = "mandarin")]
pub mod mandarin;

/// Where a variant came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantSource {
    /// Produced by phoneme-level confusion rules.
    PhoneticFuzzy,
    /// Produced by a hardcoded surface rule (splits, acronyms, contractions).
    Hardcoded,
    /// Produced by a whole-phrase rule (slurred-speech table).
    PhraseRule,
    /// Produced by romanisation-system differences.
    Romanization,
}

/// A phonetically related surface string for a canonical term.
#[derive(Debug, Clone)]
pub struct Variant {
    /// The variant surface.
    pub text: String,
    /// Its phonetic key, used for dedup and matching.
    pub key: PhoneticKey,
    /// Confidence in `[0, 1]`; higher means phonetically closer.
    pub score: f64,
    /// Rule class that produced it.
    pub source: VariantSource,
}

/// Per-language variant generator.
pub trait FuzzyGenerator: Send + Sync {
    /// Term → phonetic key.
    fn phonetic_transform(&self, term: &str) -> Result<PhoneticKey>;

    /// Key → phonetically confusable keys (excluding the input).
    fn phonetic_variants(&self, key: &PhoneticKey) -> Vec<PhoneticKey>;

    /// Key → a representative surface, when one can be constructed.
    fn phonetic_to_text(&self, key: &PhoneticKey) -> Option<String>;

    /// Surface-level rules that do not decompose into single-phoneme edits.
    fn hardcoded_variants(&self, _term: &str) -> Vec<(String, VariantSource)> {
        Vec::new()
    }

    /// Per-variant admission filter, applied before back-projection.
    fn accept_variant(&self, _base: &PhoneticKey, _variant: &PhoneticKey) -> bool {
        true
    }

    /// Runs the full pipeline. The output never contains the term itself
    /// and is truncated to `max_variants` in `(−score, len, text)` order.
    fn generate_variants(&self, term: &str, max_variants: usize) -> Vec<Variant> {
        let mut variants = Vec::new();

        match self.phonetic_transform(term) {
            Ok(base) => {
                for key in self.phonetic_variants(&base) {
                    if key == base || !self.accept_variant(&base, &key) {
                        continue;
                    }
                    let Some(text) = self.phonetic_to_text(&key) else {
                        continue;
                    };
                    let score = score_keys(&base, &key);
                    variants.push(Variant {
                        text,
                        key,
                        score,
                        source: VariantSource::PhoneticFuzzy,
                    });
                }

                append_hardcoded(self, term, &mut variants);
            }
            Err(err) => {
                tracing::warn!(term, error = %err, "phonetic generation failed, hardcoded rules only");
                append_hardcoded(self, term, &mut variants);
            }
        }

        finalize_variants(term, variants, max_variants)
    }
}

fn append_hardcoded<G: FuzzyGenerator + ?Sized>(
    generator: &G,
    term: &str,
    variants: &mut Vec<Variant>,
) {
    for (text, source) in generator.hardcoded_variants(term) {
        match generator.phonetic_transform(&text) {
            Ok(key) => variants.push(Variant {
                text,
                key,
                score: 0.8,
                source,
            }),
            Err(_) => {
                let key = PhoneticKey::new(text.to_lowercase());
                variants.push(Variant {
                    text,
                    key,
                    score: 0.7,
                    source,
                });
            }
        }
    }
}

/// Score a variant key against its base: `1 − normalised edit distance`.
pub(crate) fn score_keys(base: &PhoneticKey, variant: &PhoneticKey) -> f64 {
    (1.0 - distance::normalized_distance(&base.compact(), &variant.compact())).clamp(0.0, 1.0)
}

/// Shared tail of the pipeline: dedup by phonetic key (keeping the highest
/// score), drop the original term (case-folded), sort by
/// `(−score, len(text), text)`, truncate.
pub(crate) fn finalize_variants(
    term: &str,
    variants: Vec<Variant>,
    max_variants: usize,
) -> Vec<Variant> {
    let term_folded = term.to_lowercase();

    let mut by_key: Vec<Variant> = Vec::new();
    for variant in variants {
        if variant.text.is_empty() || variant.text.to_lowercase() == term_folded {
            continue;
        }
        match by_key.iter_mut().find(|v| v.key == variant.key) {
            Some(existing) => {
                if variant.score > existing.score {
                    *existing = variant;
                }
            }
            None => by_key.push(variant),
        }
    }

    by_key.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.text.chars().count().cmp(&b.text.chars().count()))
            .then_with(|| a.text.cmp(&b.text))
    });
    by_key.truncate(max_variants);
    by_key
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubGenerator;

    impl FuzzyGenerator for StubGenerator {
        fn phonetic_transform(&self, term: &str) -> Result<PhoneticKey> {
            Ok(PhoneticKey::new(term.to_lowercase()))
        }

        fn phonetic_variants(&self, key: &PhoneticKey) -> Vec<PhoneticKey> {
            vec![
                PhoneticKey::new(format!("{}s", key.as_str())),
                PhoneticKey::new(format!("{}z", key.as_str())),
                key.clone(),
            ]
        }

        fn phonetic_to_text(&self, key: &PhoneticKey) -> Option<String> {
            Some(key.as_str().to_string())
        }

        fn hardcoded_variants(&self, term: &str) -> Vec<(String, VariantSource)> {
            vec![(format!("{term} x"), VariantSource::Hardcoded)]
        }
    }

    #[test]
    fn test_template_excludes_term_itself() {
        let variants = StubGenerator.generate_variants("Test", 10);
        assert!(variants.iter().all(|v| v.text.to_lowercase() != "test"));
    }

    #[test]
    fn test_template_orders_by_score_then_length() {
        let variants = StubGenerator.generate_variants("ab", 10);
        for pair in variants.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_truncation() {
        let variants = StubGenerator.generate_variants("ab", 1);
        assert_eq!(variants.len(), 1);
    }

    #[test]
    fn test_dedup_keeps_best_score() {
        let variants = vec![
            Variant {
                text: "a".into(),
                key: PhoneticKey::new("k"),
                score: 0.5,
                source: VariantSource::PhoneticFuzzy,
            },
            Variant {
                text: "b".into(),
                key: PhoneticKey::new("k"),
                score: 0.9,
                source: VariantSource::Hardcoded,
            },
        ];
        let out = finalize_variants("term", variants, 10);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "b");
    }
}
