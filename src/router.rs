//! Language routing for mixed-script input.
//!
//! Matching happens in one phonetic domain per language, so a Mandarin
//! corrector must never score an English window. The router cuts a mixed
//! string into single-language segments by script: ASCII runs are English,
//! kana runs are Japanese, remaining non-ASCII is Mandarin (CJK ideographs
//! included — a kanji-only span is indistinguishable from Chinese without
//! context, and the Pinyin matcher handles it acceptably).
//!
//! Two refinements keep real text from shredding: digit-only "English"
//! islands sandwiched between Mandarin segments merge into their
//! neighbours (so `11位` stays whole), and caller-registered short
//! alphanumeric codes route to a configured language. A cross-lingual map
//! can rewrite known mixed-script surfaces to their canonical before
//! segmentation so they are never split at all.
//!
//! Composition is the caller's business: run each segment through its
//! corrector (passing the whole input as `full_context`), or pipeline
//! correctors over the entire string.

use crate::config::Language;
use crate::tokenizer::is_kana;

/// One single-language span of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Detected language.
    pub language: Language,
    /// Segment text.
    pub text: String,
}

/// Script-based language router.
#[derive(Debug, Default)]
pub struct LanguageRouter {
    code_overrides: Vec<(String, Language)>,
    cross_lingual: Vec<(String, String)>,
}

impl LanguageRouter {
    /// Router with no overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes an exact surface (typically a short alphanumeric code) to a
    /// fixed language, overriding script detection.
    pub fn route_code(mut self, code: impl Into<String>, language: Language) -> Self {
        self.code_overrides.push((code.into(), language));
        self
    }

    /// Registers a cross-lingual pre-match: occurrences of `surface` are
    /// rewritten to `canonical` before segmentation, keeping mixed-script
    /// names unsplit.
    pub fn cross_lingual(mut self, surface: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.cross_lingual.push((surface.into(), canonical.into()));
        self
    }

    /// Applies the cross-lingual map (longest surface first).
    pub fn apply_cross_lingual(&self, text: &str) -> String {
        let mut entries: Vec<&(String, String)> = self.cross_lingual.iter().collect();
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        let mut out = text.to_string();
        for (surface, canonical) in entries {
            if out.contains(surface.as_str()) {
                out = out.replace(surface.as_str(), canonical);
            }
        }
        out
    }

    /// Splits `text` into single-language segments covering the input.
    pub fn segment(&self, text: &str) -> Vec<Segment> {
        let text = self.apply_cross_lingual(text);

        let mut segments: Vec<Segment> = Vec::new();
        let mut current_lang: Option<Language> = None;
        let mut buffer = String::new();

        for ch in text.chars() {
            let lang = classify(ch);
            if Some(lang) != current_lang {
                if let Some(language) = current_lang.take() {
                    segments.push(Segment {
                        language,
                        text: std::mem::take(&mut buffer),
                    });
                }
                current_lang = Some(lang);
            }
            buffer.push(ch);
        }
        if let Some(language) = current_lang {
            segments.push(Segment {
                language,
                text: buffer,
            });
        }

        let segments = merge_numeric_islands(segments);
        self.apply_code_overrides(segments)
    }

    fn apply_code_overrides(&self, mut segments: Vec<Segment>) -> Vec<Segment> {
        if self.code_overrides.is_empty() {
            return segments;
        }
        for segment in segments.iter_mut() {
            let trimmed = segment.text.trim();
            if let Some((_, language)) = self
                .code_overrides
                .iter()
                .find(|(code, _)| code == trimmed)
            {
                segment.language = *language;
            }
        }
        segments
    }
}

fn classify(ch: char) -> Language {
    if ch.is_ascii() {
        Language::English
    } else if is_kana(ch) {
        Language::Japanese
    } else {
        Language::Mandarin
    }
}

/// Digit-only English islands between Mandarin segments belong to the
/// surrounding sentence; merge them so `11位` survives as one span.
fn merge_numeric_islands(segments: Vec<Segment>) -> Vec<Segment> {
    let mut merged: Vec<Segment> = Vec::new();
    let mut iter = segments.into_iter().peekable();

    while let Some(segment) = iter.next() {
        let is_numeric_island = segment.language == Language::English
            && segment.text.chars().any(|c| c.is_ascii_digit())
            && !segment.text.chars().any(|c| c.is_ascii_alphabetic());

        if is_numeric_island {
            let prev_mandarin = merged
                .last()
                .map(|s: &Segment| s.language == Language::Mandarin)
                .unwrap_or(false);
            let next_mandarin = iter
                .peek()
                .map(|s| s.language == Language::Mandarin)
                .unwrap_or(false);

            if prev_mandarin && next_mandarin {
                let mut text = merged.pop().map(|s| s.text).unwrap_or_default();
                text.push_str(&segment.text);
                text.push_str(&iter.next().map(|s| s.text).unwrap_or_default());
                merged.push(Segment {
                    language: Language::Mandarin,
                    text,
                });
                continue;
            }
            if prev_mandarin {
                let mut prev = merged.pop().expect("prev segment exists");
                prev.text.push_str(&segment.text);
                merged.push(prev);
                continue;
            }
            if next_mandarin {
                let next = iter.next().expect("next segment exists");
                merged.push(Segment {
                    language: Language::Mandarin,
                    text: format!("{}{}", segment.text, next.text),
                });
                continue;
            }
        }

        merged.push(segment);
    }

    merged
}
