//! English backend: text → (approximate) IPA.
//!
//! Two engines are available behind one interface:
//!
//! - **Espeak** shells out to the external `espeak-ng` binary, located via
//!   the `PHONOFIX_ESPEAK_PATH` environment variable or `PATH`. This is the
//!   high-fidelity option; installing the binary is the caller's problem
//!   and a missing binary surfaces as `BackendUnavailable` with an install
//!   hint.
//! - **GraphemeRules** applies an ordered sequence of rewrite rules to the
//!   spelling, producing a deterministic approximate IPA key in-process.
//!   Rule application is sequential and order-dependent: each rule rewrites
//!   every occurrence before the next rule runs, so later rules see earlier
//!   rules' output (e.g. `c → k` must follow `c → s` before front vowels).
//!
//! Both sides of the matcher use the same engine, so approximation error
//! cancels: a window and a dictionary key disagree only where they truly
//! sound different under the engine's model.

use super::{MemoCache, PhoneticBackend, PhoneticKey};
use crate::config::Language;
use crate::error::{PhonofixError, Result};
use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;

/// Environment variable naming the `espeak-ng` executable.
pub const ESPEAK_ENV: &str = "PHONOFIX_ESPEAK_PATH";

const INSTALL_HINT: &str = "install espeak-ng (https://github.com/espeak-ng/espeak-ng) \
and make sure the binary is on PATH, or point PHONOFIX_ESPEAK_PATH at it";

/// Which conversion engine to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnglishEngineKind {
    /// Prefer espeak-ng, fall back to the rewrite rules when missing.
    #[default]
    Auto,
    /// Require espeak-ng; fail construction when it cannot be found.
    Espeak,
    /// Always use the built-in rewrite rules.
    GraphemeRules,
}

enum EngineImpl {
    Espeak { program: PathBuf },
    Rules,
}

static GLOBAL: Lazy<Arc<EnglishBackend>> =
    Lazy::new(|| Arc::new(EnglishBackend::with_kind_or_rules(EnglishEngineKind::Auto)));

/// Process-wide shared instance (Auto engine).
pub fn global() -> Arc<EnglishBackend> {
    GLOBAL.clone()
}

/// Text → approximate IPA backend.
pub struct EnglishBackend {
    engine: EngineImpl,
    cache: MemoCache,
}

impl EnglishBackend {
    /// Creates a backend with the requested engine.
    ///
    /// `Espeak` fails with `BackendUnavailable` when the binary cannot be
    /// located; `Auto` silently falls back to the rewrite rules.
    pub fn new(kind: EnglishEngineKind) -> Result<Self> {
        let engine = match kind {
            EnglishEngineKind::GraphemeRules => EngineImpl::Rules,
            EnglishEngineKind::Espeak => match resolve_espeak() {
                Some(program) => EngineImpl::Espeak { program },
                None => {
                    return Err(PhonofixError::BackendUnavailable {
                        language: Language::English,
                        hint: INSTALL_HINT.into(),
                    })
                }
            },
            EnglishEngineKind::Auto => match resolve_espeak() {
                Some(program) => EngineImpl::Espeak { program },
                None => {
                    tracing::warn!("espeak-ng not found, using built-in grapheme rules");
                    EngineImpl::Rules
                }
            },
        };

        Ok(Self {
            engine,
            cache: MemoCache::with_default_capacity(),
        })
    }

    /// Backend over the built-in rewrite rules; never fails.
    pub fn with_rules() -> Self {
        Self {
            engine: EngineImpl::Rules,
            cache: MemoCache::with_default_capacity(),
        }
    }

    fn with_kind_or_rules(kind: EnglishEngineKind) -> Self {
        Self::new(kind).unwrap_or_else(|_| Self::with_rules())
    }

    fn convert_uncached(&self, text: &str) -> Result<String> {
        let mut out = String::new();
        for word in text.split_whitespace() {
            let normalized = normalize_word(word);
            for piece in normalized.split_whitespace() {
                match &self.engine {
                    EngineImpl::Espeak { program } => out.push_str(&espeak_ipa(program, piece)?),
                    EngineImpl::Rules => out.push_str(&grapheme_rules_ipa(piece)),
                }
            }
        }
        Ok(out)
    }
}

impl PhoneticBackend for EnglishBackend {
    fn language(&self) -> Language {
        Language::English
    }

    fn to_phonetic(&self, text: &str) -> Result<PhoneticKey> {
        let key = self
            .cache
            .get_or_try_insert(text, || self.convert_uncached(text))?;
        Ok(PhoneticKey::new(key))
    }

    fn is_initialized(&self) -> bool {
        true
    }

    fn cache_stats(&self) -> super::CacheStats {
        self.cache.stats()
    }

    fn warm_up(&self) -> Result<()> {
        self.to_phonetic("hello").map(|_| ())
    }
}

fn resolve_espeak() -> Option<PathBuf> {
    if let Ok(path) = env::var(ESPEAK_ENV) {
        let path = PathBuf::from(path);
        if path.is_file() {
            return Some(path);
        }
    }

    let path_var = env::var_os("PATH")?;
    for dir in env::split_paths(&path_var) {
        for name in ["espeak-ng", "espeak-ng.exe", "espeak", "espeak.exe"] {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

fn espeak_ipa(program: &PathBuf, word: &str) -> Result<String> {
    let output = Command::new(program)
        .args(["-q", "--ipa", "-v", "en-us"])
        .arg("--")
        .arg(word)
        .output()
        .map_err(|e| PhonofixError::Fuzzy {
            detail: format!("espeak-ng invocation failed: {e}"),
        })?;

    if !output.status.success() {
        return Err(PhonofixError::Fuzzy {
            detail: format!("espeak-ng exited with {}", output.status),
        });
    }

    let ipa = String::from_utf8_lossy(&output.stdout);
    Ok(ipa
        .chars()
        .filter(|c| !c.is_whitespace() && *c != 'ˈ' && *c != 'ˌ')
        .collect())
}

// Common lowercase initialisms that should be spelled letter by letter.
const COMMON_ABBREVIATIONS: &[&str] = &[
    "js", "ts", "py", "rb", "go", "rs", "cs", "db", "ml", "ai", "ui", "ux", "api", "sql", "css",
    "xml", "sdk",
];

const DIGIT_WORDS: [&str; 10] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
];

/// Pre-conversion normalisation: short all-caps words and known lowercase
/// initialisms are spelled out letter by letter, digits become words.
fn normalize_word(word: &str) -> String {
    let spell_out = (word.len() <= 5
        && !word.is_empty()
        && word.chars().all(|c| c.is_ascii_uppercase()))
        || COMMON_ABBREVIATIONS.contains(&word.to_ascii_lowercase().as_str());

    if spell_out && word.chars().all(|c| c.is_ascii_alphabetic()) {
        let letters: Vec<String> = word
            .chars()
            .map(|c| c.to_ascii_lowercase().to_string())
            .collect();
        return letters.join(" ");
    }

    let mut out = String::new();
    for ch in word.chars() {
        if let Some(d) = ch.to_digit(10) {
            out.push_str(DIGIT_WORDS[d as usize]);
            out.push(' ');
        } else {
            out.push(ch);
        }
    }
    out
}

// Names of single letters, for spelled-out acronyms.
fn letter_name_ipa(ch: char) -> Option<&'static str> {
    Some(match ch {
        'a' => "eɪ",
        'b' => "biː",
        'c' => "siː",
        'd' => "diː",
        'e' => "iː",
        'f' => "ɛf",
        'g' => "dʒiː",
        'h' => "eɪtʃ",
        'i' => "aɪ",
        'j' => "dʒeɪ",
        'k' => "keɪ",
        'l' => "ɛl",
        'm' => "ɛm",
        'n' => "ɛn",
        'o' => "oʊ",
        'p' => "piː",
        'q' => "kjuː",
        'r' => "ɑr",
        's' => "ɛs",
        't' => "tiː",
        'u' => "juː",
        'v' => "viː",
        'w' => "dʌbəljuː",
        'x' => "ɛks",
        'y' => "waɪ",
        'z' => "ziː",
        _ => return None,
    })
}

// Ordered string rewrites, applied sequentially (each rewrites every
// occurrence before the next runs). Digraphs first so single-letter rules
// never see their pieces.
const STRING_RULES: &[(&str, &str)] = &[
    ("tch", "tʃ"),
    ("ch", "tʃ"),
    ("sh", "ʃ"),
    ("ph", "f"),
    ("th", "θ"),
    ("wh", "w"),
    ("qu", "kw"),
    ("ck", "k"),
    ("dge", "dʒ"),
    ("igh", "aɪ"),
    ("gh", ""),
    ("tion", "ʃən"),
    ("sion", "ʒən"),
    ("oo", "uː"),
    ("ee", "iː"),
    ("ea", "iː"),
    ("ai", "eɪ"),
    ("ay", "eɪ"),
    ("oa", "oʊ"),
    ("ou", "aʊ"),
    ("ow", "oʊ"),
    ("aw", "ɔː"),
    ("au", "ɔː"),
    ("oi", "ɔɪ"),
    ("oy", "ɔɪ"),
    ("ng", "ŋ"),
    ("x", "ks"),
    ("j", "dʒ"),
];

fn is_vowel_symbol(ch: char) -> bool {
    matches!(
        ch,
        'a' | 'e' | 'i' | 'o' | 'u' | 'æ' | 'ɛ' | 'ɪ' | 'ɑ' | 'ʌ' | 'ə' | 'ɔ' | 'ʊ' | 'ː'
    )
}

/// Built-in grapheme → approximate-IPA conversion for one word.
fn grapheme_rules_ipa(word: &str) -> String {
    let lower = word.to_lowercase();

    if !lower.chars().all(|c| c.is_ascii_alphabetic()) {
        // Mixed or non-Latin content: the spelling is the key.
        return lower;
    }

    if lower.chars().count() == 1 {
        if let Some(name) = letter_name_ipa(lower.chars().next().unwrap()) {
            return name.to_string();
        }
    }

    let mut s = lower;
    for (pattern, replacement) in STRING_RULES {
        if s.contains(pattern) {
            s = s.replace(pattern, replacement);
        }
    }

    let chars: Vec<char> = s.chars().collect();
    let n = chars.len();
    let mut out: Vec<char> = Vec::with_capacity(n + 4);

    for (i, &ch) in chars.iter().enumerate() {
        let next = chars.get(i + 1).copied();
        let prev = out.last().copied();

        match ch {
            // Velar softening: c → s before front vowels, k elsewhere.
            'c' => {
                if matches!(next, Some('e') | Some('i') | Some('y')) {
                    out.push('s');
                } else {
                    out.push('k');
                }
            }
            'y' => {
                if i == 0 {
                    out.push('j');
                } else if i + 1 == n {
                    out.push('i');
                } else {
                    let prev_cons = prev.map(|p| !is_vowel_symbol(p)).unwrap_or(false);
                    let next_cons = next.map(|c| !is_vowel_symbol(c)).unwrap_or(true);
                    if prev_cons && next_cons {
                        out.push('a');
                        out.push('ɪ');
                    } else {
                        out.push('i');
                    }
                }
            }
            // Silent final e after a consonant.
            'e' if i + 1 == n && n > 3 => {
                if prev.map(|p| !is_vowel_symbol(p)).unwrap_or(false) {
                    continue;
                }
                out.push('ɛ');
            }
            // Plain vowels take their lax IPA values.
            'a' => out.push('æ'),
            'e' => out.push('ɛ'),
            'i' => out.push('ɪ'),
            'o' => out.push('ɑ'),
            'u' => out.push('ʌ'),
            _ => {
                // Collapse doubled consonants (tt → t, ss → s).
                if prev == Some(ch) && !is_vowel_symbol(ch) {
                    continue;
                }
                out.push(ch);
            }
        }
    }

    out.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_python_like() {
        assert_eq!(grapheme_rules_ipa("python"), "paɪθɑn");
        assert_eq!(grapheme_rules_ipa("pyton"), "paɪtɑn");
    }

    #[test]
    fn test_rules_digraphs() {
        assert_eq!(grapheme_rules_ipa("ship"), "ʃɪp");
        assert_eq!(grapheme_rules_ipa("phone"), "fɑn");
        assert_eq!(grapheme_rules_ipa("think"), "θɪnk");
    }

    #[test]
    fn test_velar_softening_order() {
        // c → s before front vowels must run before c → k elsewhere.
        assert_eq!(grapheme_rules_ipa("city"), "sɪti");
        assert_eq!(grapheme_rules_ipa("cat"), "kæt");
    }

    #[test]
    fn test_double_consonants_collapse() {
        assert_eq!(grapheme_rules_ipa("butter"), "bʌtɛr");
    }

    #[test]
    fn test_letter_names() {
        assert_eq!(grapheme_rules_ipa("a"), "eɪ");
        assert_eq!(grapheme_rules_ipa("k"), "keɪ");
    }

    #[test]
    fn test_normalize_acronym() {
        assert_eq!(normalize_word("API"), "a p i");
        assert_eq!(normalize_word("js"), "j s");
        assert_eq!(normalize_word("1kg"), "one kg");
    }

    #[test]
    fn test_backend_key_is_spaceless() {
        let backend = EnglishBackend::with_rules();
        let key = backend.to_phonetic("ten so floor").unwrap();
        assert!(!key.as_str().contains(' '));
    }

    #[test]
    fn test_same_transform_both_sides() {
        // The invariant the matcher relies on: a surface and its dictionary
        // twin produce identical keys.
        let backend = EnglishBackend::with_rules();
        let a = backend.to_phonetic("TensorFlow").unwrap();
        let b = backend.to_phonetic("tensorflow").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_phonetically_close_spellings_have_close_keys() {
        use crate::distance::normalized_distance;
        let backend = EnglishBackend::with_rules();
        let a = backend.to_phonetic("python").unwrap();
        let b = backend.to_phonetic("pyton").unwrap();
        assert!(normalized_distance(a.as_str(), b.as_str()) < 0.35);
    }
}
