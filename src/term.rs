//! Term dictionary input shapes and normalisation.
//!
//! Three input shapes are accepted, all normalised to the same internal
//! representation before index construction:
//!
//! - a list of canonicals (no aliases, no metadata),
//! - a map `canonical → aliases`,
//! - a map `canonical → full per-term configuration`.
//!
//! Validation happens here, at build time; `correct()` never sees a
//! malformed dictionary.

use crate::error::{PhonofixError, Result};

/// Per-canonical configuration.
#[derive(Debug, Clone)]
pub struct TermConfig {
    /// Known misspellings that should rewrite to the canonical.
    pub aliases: Vec<String>,
    /// If non-empty, at least one keyword must appear in the context for
    /// the canonical to be eligible.
    pub keywords: Vec<String>,
    /// If any of these appears in the context, the canonical is rejected,
    /// regardless of keywords.
    pub exclude_when: Vec<String>,
    /// Preference shift in `[0, 1]`; higher weight wins ties.
    pub weight: f64,
    /// Cap on generated fuzzy variants. `None` uses the engine default.
    pub max_variants: Option<usize>,
}

impl Default for TermConfig {
    fn default() -> Self {
        Self {
            aliases: Vec::new(),
            keywords: Vec::new(),
            exclude_when: Vec::new(),
            weight: 0.0,
            max_variants: None,
        }
    }
}

impl TermConfig {
    /// Configuration with the given aliases and defaults elsewhere.
    pub fn with_aliases<I, S>(aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            aliases: aliases.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// An ordered term dictionary.
///
/// Entry order is preserved so that index construction, and therefore the
/// whole pipeline, is deterministic for a given input.
#[derive(Debug, Clone, Default)]
pub struct TermDict {
    entries: Vec<(String, TermConfig)>,
}

impl TermDict {
    /// Creates an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dictionary from bare canonicals (auto-fuzzy only, no metadata).
    pub fn from_canonicals<I, S>(canonicals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: canonicals
                .into_iter()
                .map(|c| (c.into(), TermConfig::default()))
                .collect(),
        }
    }

    /// Dictionary from `canonical → aliases` pairs.
    pub fn from_aliases<I, S, A>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<A>)>,
        S: Into<String>,
        A: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(c, aliases)| (c.into(), TermConfig::with_aliases(aliases)))
                .collect(),
        }
    }

    /// Adds an entry, replacing any previous entry for the same canonical.
    pub fn insert(&mut self, canonical: impl Into<String>, config: TermConfig) -> &mut Self {
        let canonical = canonical.into();
        self.entries.retain(|(c, _)| *c != canonical);
        self.entries.push((canonical, config));
        self
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, canonical: impl Into<String>, config: TermConfig) -> Self {
        self.insert(canonical, config);
        self
    }

    /// Number of canonical entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the dictionary has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TermConfig)> {
        self.entries.iter().map(|(c, cfg)| (c.as_str(), cfg))
    }
}

impl<S: Into<String>> FromIterator<S> for TermDict {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_canonicals(iter)
    }
}

/// Validated, normalised form of one dictionary entry.
#[derive(Debug, Clone)]
pub(crate) struct NormalizedTerm {
    pub canonical: String,
    pub aliases: Vec<String>,
    pub keywords: Vec<String>,
    pub exclude_when: Vec<String>,
    pub weight: f64,
    pub max_variants: usize,
}

/// Validates a dictionary and normalises each entry.
///
/// - the canonical must be non-empty;
/// - `weight` must lie in `[0, 1]`;
/// - an explicit `max_variants` must be at least 1;
/// - the canonical is removed from its own alias list, empty aliases are
///   dropped, and duplicates collapse while preserving first-seen order.
pub(crate) fn normalize_term_dict(
    dict: &TermDict,
    default_max_variants: usize,
) -> Result<Vec<NormalizedTerm>> {
    let mut normalized = Vec::with_capacity(dict.len());

    for (canonical, config) in dict.iter() {
        if canonical.trim().is_empty() {
            return Err(PhonofixError::InvalidInput {
                reason: "canonical term must be non-empty".into(),
            });
        }
        if !(0.0..=1.0).contains(&config.weight) {
            return Err(PhonofixError::InvalidInput {
                reason: format!(
                    "weight for '{}' must be in [0, 1], got {}",
                    canonical, config.weight
                ),
            });
        }
        if config.max_variants == Some(0) {
            return Err(PhonofixError::InvalidInput {
                reason: format!("max_variants for '{}' must be at least 1", canonical),
            });
        }

        let mut seen = Vec::new();
        let mut aliases = Vec::new();
        for alias in &config.aliases {
            if alias.is_empty() || alias == canonical {
                continue;
            }
            if !seen.contains(alias) {
                seen.push(alias.clone());
                aliases.push(alias.clone());
            }
        }

        normalized.push(NormalizedTerm {
            canonical: canonical.to_string(),
            aliases,
            keywords: config.keywords.clone(),
            exclude_when: config.exclude_when.clone(),
            weight: config.weight,
            max_variants: config.max_variants.unwrap_or(default_max_variants).max(1),
        });
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_canonicals() {
        let dict = TermDict::from_canonicals(["台北車站", "牛奶"]);
        assert_eq!(dict.len(), 2);
        let (c, cfg) = dict.iter().next().unwrap();
        assert_eq!(c, "台北車站");
        assert!(cfg.aliases.is_empty());
    }

    #[test]
    fn test_insert_replaces() {
        let mut dict = TermDict::new();
        dict.insert("Python", TermConfig::with_aliases(["Pyton"]));
        dict.insert("Python", TermConfig::with_aliases(["Pyson"]));
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.iter().next().unwrap().1.aliases, vec!["Pyson"]);
    }

    #[test]
    fn test_normalize_strips_canonical_from_aliases() {
        let dict = TermDict::from_aliases([("台北車站", vec!["北車", "台北車站", "北車"])]);
        let normalized = normalize_term_dict(&dict, 30).unwrap();
        assert_eq!(normalized[0].aliases, vec!["北車"]);
        assert_eq!(normalized[0].max_variants, 30);
    }

    #[test]
    fn test_normalize_rejects_empty_canonical() {
        let dict = TermDict::from_canonicals([""]);
        assert!(matches!(
            normalize_term_dict(&dict, 30),
            Err(PhonofixError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_normalize_rejects_bad_weight() {
        let mut config = TermConfig::default();
        config.weight = 1.5;
        let dict = TermDict::new().with("EKG", config);
        assert!(matches!(
            normalize_term_dict(&dict, 30),
            Err(PhonofixError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_normalize_rejects_zero_variants() {
        let mut config = TermConfig::default();
        config.max_variants = Some(0);
        let dict = TermDict::new().with("EKG", config);
        assert!(matches!(
            normalize_term_dict(&dict, 30),
            Err(PhonofixError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_default_variant_budget_applied() {
        let dict = TermDict::from_canonicals(["牛奶"]);
        let normalized = normalize_term_dict(&dict, 12).unwrap();
        assert_eq!(normalized[0].max_variants, 12);
    }
}
