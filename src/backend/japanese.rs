//! Japanese backend: kana/kanji → normalised Hepburn Romaji.
//!
//! Kana conversion is table-driven via `wana_kana`. Kanji are resolved
//! through a bundled same-reading table (longest match wins); ideographs
//! the table does not know pass through as opaque symbols. Keys are
//! normalised at key time — long vowels collapsed, geminates reduced,
//! romanisation variants folded to Hepburn — so two spellings of the same
//! pronunciation (`toukyou`, `tokyo`, `トーキョー`) share one key.

use super::{MemoCache, PhoneticBackend, PhoneticKey};
use crate::config::Language;
use crate::error::Result;
use once_cell::sync::Lazy;
use std::sync::Arc;
use wana_kana::ConvertJapanese;

/// Kunrei-shiki and input-method spellings folded to Hepburn.
pub(crate) const ROMANIZATION_VARIANTS: &[(&str, &str)] = &[
    ("sya", "sha"),
    ("syu", "shu"),
    ("syo", "sho"),
    ("tya", "cha"),
    ("tyu", "chu"),
    ("tyo", "cho"),
    ("zya", "ja"),
    ("zyu", "ju"),
    ("zyo", "jo"),
    ("cya", "cha"),
    ("cyu", "chu"),
    ("cyo", "cho"),
    ("jya", "ja"),
    ("jyu", "ju"),
    ("jyo", "jo"),
    ("si", "shi"),
    ("ti", "chi"),
    ("tu", "tsu"),
    ("hu", "fu"),
    ("zi", "ji"),
    ("di", "ji"),
    ("du", "zu"),
    // Japanese has no L/R distinction; ASR output may use either.
    ("la", "ra"),
    ("li", "ri"),
    ("lu", "ru"),
    ("le", "re"),
    ("lo", "ro"),
];

/// Long vowels collapse to their short forms (先生: sensei → sense).
pub(crate) const LONG_VOWELS: &[(&str, &str)] = &[
    ("aa", "a"),
    ("ii", "i"),
    ("uu", "u"),
    ("ee", "e"),
    ("ei", "e"),
    ("oo", "o"),
    ("ou", "o"),
];

/// Geminates reduce to single consonants (gakkou → gakou).
pub(crate) const GEMINATION: &[(&str, &str)] = &[
    ("shsh", "sh"),
    ("tch", "ch"),
    ("kk", "k"),
    ("tt", "t"),
    ("pp", "p"),
    ("ss", "s"),
    ("dd", "d"),
    ("gg", "g"),
    ("bb", "b"),
];

/// ん assimilates to m before b/p/m; fold back to n.
pub(crate) const NASALS: &[(&str, &str)] = &[("mb", "nb"), ("mp", "np"), ("mm", "nm")];

/// Bundled same-reading table for common kanji words. Longest match wins;
/// unknown ideographs pass through unchanged.
pub(crate) const KANJI_READINGS: &[(&str, &str)] = &[
    ("東京駅", "とうきょうえき"),
    ("東京", "とうきょう"),
    ("京都", "きょうと"),
    ("大阪", "おおさか"),
    ("先生", "せんせい"),
    ("新聞", "しんぶん"),
    ("病院", "びょういん"),
    ("頭痛", "ずつう"),
    ("会社", "かいしゃ"),
    ("電話", "でんわ"),
    ("時間", "じかん"),
    ("学校", "がっこう"),
    ("銀行", "ぎんこう"),
    ("映画", "えいが"),
    ("料理", "りょうり"),
    ("旅行", "りょこう"),
    ("写真", "しゃしん"),
    ("音楽", "おんがく"),
    ("天気", "てんき"),
    ("駅", "えき"),
    ("薬", "くすり"),
    ("水", "みず"),
    ("頭", "あたま"),
];

static GLOBAL: Lazy<Arc<JapaneseBackend>> = Lazy::new(|| Arc::new(JapaneseBackend::new()));

/// Process-wide shared instance.
pub fn global() -> Arc<JapaneseBackend> {
    GLOBAL.clone()
}

/// Kana/kanji → normalised Hepburn Romaji backend.
pub struct JapaneseBackend {
    cache: MemoCache,
}

impl JapaneseBackend {
    /// Creates a backend with the default cache capacity.
    pub fn new() -> Self {
        Self {
            cache: MemoCache::with_default_capacity(),
        }
    }

    /// Replaces known kanji words by their kana readings, longest match
    /// first.
    pub(crate) fn fold_kanji(text: &str) -> String {
        let mut out = String::new();
        let chars: Vec<char> = text.chars().collect();
        let mut i = 0;

        'outer: while i < chars.len() {
            if crate::tokenizer::is_hanzi(chars[i]) {
                let rest: String = chars[i..].iter().collect();
                let mut best: Option<(&str, &str)> = None;
                for (surface, reading) in KANJI_READINGS {
                    if rest.starts_with(surface) {
                        match best {
                            Some((b, _)) if b.chars().count() >= surface.chars().count() => {}
                            _ => best = Some((surface, reading)),
                        }
                    }
                }
                if let Some((surface, reading)) = best {
                    out.push_str(reading);
                    i += surface.chars().count();
                    continue 'outer;
                }
            }
            out.push(chars[i]);
            i += 1;
        }

        out
    }

    /// The hiragana reading of `text` (kanji folded, katakana and romaji
    /// converted). Used by the fuzzy generator.
    pub(crate) fn reading_hiragana(&self, text: &str) -> String {
        let folded = Self::fold_kanji(text);
        let folded: String = folded.chars().filter(|c| *c != 'ー').collect();
        folded.to_hiragana()
    }

    /// Applies the Hepburn normalisation rules to a raw romaji string.
    pub(crate) fn normalize_romaji(romaji: &str) -> String {
        let mut s: String = romaji
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '\'' && *c != '-' && *c != 'ー')
            .collect();

        for (variant, standard) in ROMANIZATION_VARIANTS {
            if s.contains(variant) {
                s = s.replace(variant, standard);
            }
        }
        for (long, short) in LONG_VOWELS {
            if s.contains(long) {
                s = s.replace(long, short);
            }
        }
        for (geminated, single) in GEMINATION {
            if s.contains(geminated) {
                s = s.replace(geminated, single);
            }
        }
        for (m_form, n_form) in NASALS {
            if s.contains(m_form) {
                s = s.replace(m_form, n_form);
            }
        }
        s
    }

    fn convert_uncached(text: &str) -> String {
        let folded = Self::fold_kanji(text);
        let folded: String = folded.chars().filter(|c| *c != 'ー').collect();
        Self::normalize_romaji(&folded.to_romaji())
    }
}

impl Default for JapaneseBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PhoneticBackend for JapaneseBackend {
    fn language(&self) -> Language {
        Language::Japanese
    }

    fn to_phonetic(&self, text: &str) -> Result<PhoneticKey> {
        let key = self
            .cache
            .get_or_try_insert(text, || Ok(Self::convert_uncached(text)))?;
        Ok(PhoneticKey::new(key))
    }

    fn is_initialized(&self) -> bool {
        true
    }

    fn cache_stats(&self) -> super::CacheStats {
        self.cache.stats()
    }

    fn warm_up(&self) -> Result<()> {
        self.to_phonetic("こんにちは").map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_katakana_to_romaji() {
        let backend = JapaneseBackend::new();
        let key = backend.to_phonetic("アスピリン").unwrap();
        assert_eq!(key.as_str(), "asupirin");
    }

    #[test]
    fn test_romaji_passthrough_normalised() {
        let backend = JapaneseBackend::new();
        let key = backend.to_phonetic("asupirin").unwrap();
        assert_eq!(key.as_str(), "asupirin");
    }

    #[test]
    fn test_long_vowels_collapse_at_key_time() {
        let backend = JapaneseBackend::new();
        let a = backend.to_phonetic("toukyou").unwrap();
        let b = backend.to_phonetic("tokyo").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_kanji_reading_table() {
        let backend = JapaneseBackend::new();
        let a = backend.to_phonetic("東京").unwrap();
        assert_eq!(a.as_str(), "tokyo");
    }

    #[test]
    fn test_kunrei_folds_to_hepburn() {
        assert_eq!(JapaneseBackend::normalize_romaji("susi"), "sushi");
        assert_eq!(JapaneseBackend::normalize_romaji("tukue"), "tsukue");
    }

    #[test]
    fn test_gemination_reduced() {
        assert_eq!(JapaneseBackend::normalize_romaji("gakkou"), "gako");
    }

    #[test]
    fn test_nasal_assimilation_folded() {
        assert_eq!(
            JapaneseBackend::normalize_romaji("shimbun"),
            JapaneseBackend::normalize_romaji("shinbun"),
        );
    }

    #[test]
    fn test_reading_hiragana() {
        let backend = JapaneseBackend::new();
        assert_eq!(backend.reading_hiragana("アスピリン"), "あすぴりん");
        assert_eq!(backend.reading_hiragana("東京"), "とうきょう");
    }
}
