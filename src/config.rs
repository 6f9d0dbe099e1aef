//! Engine configuration: languages, fail policies, modes, and rule-table
//! overrides.

use std::fmt;

/// Languages this crate can correct. Each language matches in exactly one
/// phonetic domain; mixed input should be segmented by the
/// [`LanguageRouter`](crate::router::LanguageRouter) first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    /// Mandarin Chinese, matched in toneless Pinyin.
    Mandarin,
    /// English, matched in (approximate) IPA.
    English,
    /// Japanese, matched in normalised Hepburn Romaji.
    Japanese,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Mandarin => write!(f, "mandarin"),
            Language::English => write!(f, "english"),
            Language::Japanese => write!(f, "japanese"),
        }
    }
}

/// What to do when the phonetic pipeline fails at build or call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailPolicy {
    /// Propagate build errors; fail loudly. Preferred for CI/evaluation.
    Raise,
    /// Keep serving: build a pass-through corrector on backend failure and
    /// degrade single windows to "no match" at call time. Every degradation
    /// emits an event; nothing degrades silently.
    #[default]
    Degrade,
}

/// Diagnostic verbosity of a corrector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Emit only final corrections and errors.
    #[default]
    Production,
    /// Additionally emit [`Warning`](crate::events::CorrectionEvent::Warning)
    /// events for candidates that passed phonetic similarity but were
    /// rejected by keyword/exclusion gates.
    Evaluation,
}

/// Caller-provided additions to the per-language rule tables.
///
/// The built-in tables are immutable data loaded at engine construction;
/// overrides extend them without replacing them. Pairs are symmetric unless
/// the language's table says otherwise.
#[derive(Debug, Clone, Default)]
pub struct PhoneticOverrides {
    /// Extra fuzzy initial pairs for Mandarin (e.g. `("b", "p")`).
    pub extra_fuzzy_initial_pairs: Vec<(String, String)>,
    /// Extra fuzzy final pairs for Mandarin (e.g. `("ai", "ei")`).
    pub extra_fuzzy_final_pairs: Vec<(String, String)>,
    /// Extra phoneme confusion pairs for English IPA.
    pub extra_phoneme_pairs: Vec<(String, String)>,
    /// Extra hardcoded surface variants, keyed by canonical term.
    pub extra_hardcoded_variants: Vec<(String, Vec<String>)>,
    /// Default variant budget for terms that do not set `max_variants`.
    pub max_variants_default: usize,
    /// Replace the length-dependent tolerance with a fixed value.
    pub tolerance_override: Option<f64>,
}

impl PhoneticOverrides {
    /// Overrides with the stock defaults (no extra rules, budget 30).
    pub fn new() -> Self {
        Self {
            max_variants_default: 30,
            ..Self::default()
        }
    }

    pub(crate) fn effective_max_variants(&self) -> usize {
        if self.max_variants_default == 0 {
            30
        } else {
            self.max_variants_default
        }
    }

    /// Hardcoded variants registered for `term`, if any.
    pub fn hardcoded_for(&self, term: &str) -> Option<&[String]> {
        self.extra_hardcoded_variants
            .iter()
            .find(|(t, _)| t == term)
            .map(|(_, v)| v.as_slice())
    }
}

/// Options shared by every engine.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Build/call failure policy.
    pub fail_policy: FailPolicy,
    /// Diagnostic mode for correctors created by this engine.
    pub mode: Mode,
    /// Rule-table overrides.
    pub overrides: PhoneticOverrides,
    /// Upper bound on the protected-term set per corrector.
    pub max_protected_terms: usize,
    /// Upper bound on the total search-target count per corrector.
    pub max_search_targets: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            fail_policy: FailPolicy::default(),
            mode: Mode::default(),
            overrides: PhoneticOverrides::new(),
            max_protected_terms: 10_000,
            max_search_targets: 200_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_display() {
        assert_eq!(Language::Mandarin.to_string(), "mandarin");
        assert_eq!(Language::English.to_string(), "english");
        assert_eq!(Language::Japanese.to_string(), "japanese");
    }

    #[test]
    fn test_default_policy_is_degrade() {
        assert_eq!(FailPolicy::default(), FailPolicy::Degrade);
        assert_eq!(Mode::default(), Mode::Production);
    }

    #[test]
    fn test_overrides_defaults() {
        let overrides = PhoneticOverrides::new();
        assert_eq!(overrides.effective_max_variants(), 30);
        assert!(overrides.tolerance_override.is_none());
    }

    #[test]
    fn test_hardcoded_lookup() {
        let mut overrides = PhoneticOverrides::new();
        overrides
            .extra_hardcoded_variants
            .push(("kube".into(), vec!["cube".into()]));
        assert_eq!(overrides.hardcoded_for("kube"), Some(&["cube".to_string()][..]));
        assert!(overrides.hardcoded_for("other").is_none());
    }
}
