//! Mandarin rule tables and Pinyin similarity.
//!
//! Matching combines four strategies, cheapest first: exact key equality,
//! syllable-aligned special-syllable substitution (hua↔fa families),
//! per-syllable fuzzy initials/finals (z/zh, in/ing), and plain Levenshtein
//! over the compacted key. Short targets are gated hard on their initials
//! so that a two-character window cannot drift onto an unrelated term.

use super::PhoneticSystem;
use crate::backend::mandarin::MandarinBackend;
use crate::backend::{PhoneticBackend, PhoneticKey};
use crate::config::{Language, PhoneticOverrides};
use crate::distance;
use crate::error::Result;
use crate::tokenizer::is_hanzi;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::sync::Arc;

/// All possible Pinyin initials, longest first so `zh` wins over `z`.
const INITIALS: &[&str] = &[
    "zh", "ch", "sh", "b", "p", "m", "f", "d", "t", "n", "l", "g", "k", "h", "j", "q", "x", "z",
    "c", "s", "r", "y", "w",
];

// Retroflex merging, n/l/r confusion, f/h confusion. l sits in one group
// with both n and r: the three are mutually confusable in the accents this
// targets.
const BASE_INITIAL_GROUPS: &[&[&str]] = &[
    &["z", "zh"],
    &["c", "ch"],
    &["s", "sh"],
    &["n", "l", "r"],
    &["f", "h"],
];

const BASE_FINALS_PAIRS: &[(&str, &str)] = &[
    ("in", "ing"),
    ("en", "eng"),
    ("an", "ang"),
    ("ian", "iang"),
    ("uan", "uang"),
    ("uan", "an"),
    ("ong", "eng"),
    ("ong", "on"),
    ("uo", "o"),
    ("uo", "ou"),
    ("ue", "ie"),
];

// One-directional: common misreading → correct reading. Keys are observed
// window syllables, values the dictionary syllables they may stand for.
const SPECIAL_SYLLABLES: &[(&str, &[&str])] = &[
    ("hua", &["fa"]),
    ("hui", &["fei", "wei"]),
    ("huan", &["fan", "wan"]),
    ("hong", &["feng"]),
    ("fu", &["hu"]),
    ("xie", &["xue"]),
    ("jie", &["jue"]),
    ("qie", &["que"]),
    ("nie", &["nue"]),
    ("lie", &["lue"]),
    ("lan", &["ran"]),
    ("yan", &["ran"]),
    ("lou", &["rou"]),
    ("e", &["er"]),
    ("wen", &["weng"]),
    ("iong", &["yong"]),
];

/// Slurred-phrase map: canonical phrase → commonly heard contractions.
pub(crate) const STICKY_PHRASES: &[(&str, &[&str])] = &[
    ("歡迎光臨", &["緩光您", "歡光您"]),
    ("不好意思", &["報意思", "不意思"]),
    ("對不起", &["對不擠", "對七"]),
    ("不知道", &["不道", "不造"]),
    ("為什麼", &["為什", "位什"]),
    ("這樣", &["醬"]),
    ("那樣", &["釀"]),
    ("然後", &["那後", "腦後"]),
    ("可以", &["科以", "可一"]),
    ("就是", &["救世", "糾是"]),
    ("真的", &["珍的", "貞的"]),
];

/// Immutable Mandarin rule tables, shared by the system and the generator.
pub struct MandarinRules {
    initial_groups: Vec<Vec<String>>,
    initial_group_of: FxHashMap<String, usize>,
    finals_pairs: Vec<(String, String)>,
    special_map: FxHashMap<String, Vec<String>>,
    tolerance_override: Option<f64>,
}

impl MandarinRules {
    /// Builds the tables, folding in caller overrides.
    pub fn new(overrides: &PhoneticOverrides) -> Self {
        let mut groups: Vec<Vec<String>> = BASE_INITIAL_GROUPS
            .iter()
            .map(|g| g.iter().map(|s| s.to_string()).collect())
            .collect();

        for (a, b) in &overrides.extra_fuzzy_initial_pairs {
            let pos = groups
                .iter()
                .position(|g| g.contains(a) || g.contains(b));
            match pos {
                Some(idx) => {
                    for m in [a, b] {
                        if !groups[idx].contains(m) {
                            groups[idx].push(m.clone());
                        }
                    }
                }
                None => groups.push(vec![a.clone(), b.clone()]),
            }
        }

        let mut initial_group_of = FxHashMap::default();
        for (idx, group) in groups.iter().enumerate() {
            for member in group {
                initial_group_of.insert(member.clone(), idx);
            }
        }

        let mut finals_pairs: Vec<(String, String)> = BASE_FINALS_PAIRS
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect();
        finals_pairs.extend(overrides.extra_fuzzy_final_pairs.iter().cloned());

        let mut special_map: FxHashMap<String, Vec<String>> = FxHashMap::default();
        for (observed, targets) in SPECIAL_SYLLABLES {
            special_map.insert(
                observed.to_string(),
                targets.iter().map(|s| s.to_string()).collect(),
            );
        }

        Self {
            initial_groups: groups,
            initial_group_of,
            finals_pairs,
            special_map,
            tolerance_override: overrides.tolerance_override,
        }
    }

    /// Splits a syllable into `(initial, final)`.
    pub fn split_syllable<'a>(&self, syllable: &'a str) -> (&'a str, &'a str) {
        for initial in INITIALS {
            if let Some(rest) = syllable.strip_prefix(initial) {
                return (initial, rest);
            }
        }
        ("", syllable)
    }

    /// Group index of an initial, if it belongs to a fuzzy group.
    pub fn initial_group(&self, initial: &str) -> Option<usize> {
        self.initial_group_of.get(initial).copied()
    }

    fn initials_fuzzy_eq(&self, a: &str, b: &str) -> bool {
        if a == b {
            return true;
        }
        matches!(
            (self.initial_group(a), self.initial_group(b)),
            (Some(x), Some(y)) if x == y
        )
    }

    /// Whether the observed syllable may stand for the target syllable
    /// through the special-syllable map.
    pub fn special_syllable_match(&self, observed: &str, target: &str) -> bool {
        observed == target
            || self
                .special_map
                .get(observed)
                .map(|t| t.iter().any(|s| s == target))
                .unwrap_or(false)
    }

    fn finals_fuzzy_eq(&self, a: &str, b: &str) -> bool {
        let (ia, fa) = self.split_syllable(a);
        let (ib, fb) = self.split_syllable(b);
        if !self.initials_fuzzy_eq(ia, ib) {
            return false;
        }
        if fa == fb {
            return true;
        }
        for (p, q) in &self.finals_pairs {
            let forward = fa.strip_suffix(p.as_str()).zip(fb.strip_suffix(q.as_str()));
            let backward = fa.strip_suffix(q.as_str()).zip(fb.strip_suffix(p.as_str()));
            if let Some((sa, sb)) = forward.or(backward) {
                if sa == sb {
                    return true;
                }
            }
        }
        false
    }

    /// All fuzzy spellings of one syllable: special-syllable targets,
    /// same-group initial swaps, and fuzzy-final swaps.
    pub fn syllable_variants(&self, syllable: &str) -> Vec<String> {
        let mut variants: Vec<String> = vec![syllable.to_string()];

        if let Some(targets) = self.special_map.get(syllable) {
            for t in targets {
                if !variants.contains(t) {
                    variants.push(t.clone());
                }
            }
        }

        let (initial, final_part) = self.split_syllable(syllable);
        if let Some(group) = self.initial_group(initial) {
            for member in &self.initial_groups[group] {
                let candidate = format!("{member}{final_part}");
                if !variants.contains(&candidate) {
                    variants.push(candidate);
                }
            }
        }

        let snapshot = variants.clone();
        for variant in &snapshot {
            let (init, fin) = self.split_syllable(variant);
            for (p, q) in &self.finals_pairs {
                if let Some(stem) = fin.strip_suffix(p.as_str()) {
                    let candidate = format!("{init}{stem}{q}");
                    if !variants.contains(&candidate) {
                        variants.push(candidate);
                    }
                } else if let Some(stem) = fin.strip_suffix(q.as_str()) {
                    let candidate = format!("{init}{stem}{p}");
                    if !variants.contains(&candidate) {
                        variants.push(candidate);
                    }
                }
            }
        }

        variants
    }

    fn tolerance(&self, word_len: usize, is_mixed: bool) -> f64 {
        if let Some(t) = self.tolerance_override {
            return t;
        }
        if is_mixed {
            return 0.45;
        }
        match word_len {
            0..=2 => 0.20,
            3 => 0.30,
            _ => 0.40,
        }
    }
}

/// The Mandarin [`PhoneticSystem`].
pub struct MandarinSystem {
    backend: Arc<MandarinBackend>,
    rules: Arc<MandarinRules>,
}

impl MandarinSystem {
    /// Creates a system over a backend and rule tables.
    pub fn new(backend: Arc<MandarinBackend>, rules: Arc<MandarinRules>) -> Self {
        Self { backend, rules }
    }

    /// The shared rule tables.
    pub fn rules(&self) -> &Arc<MandarinRules> {
        &self.rules
    }

    fn is_mixed(surface: &str) -> bool {
        surface.chars().any(|c| c.is_ascii_alphabetic())
    }
}

fn syllables(key: &PhoneticKey) -> SmallVec<[&str; 8]> {
    key.as_str().split(' ').filter(|s| !s.is_empty()).collect()
}

impl PhoneticSystem for MandarinSystem {
    fn language(&self) -> Language {
        Language::Mandarin
    }

    fn key(&self, text: &str) -> Result<PhoneticKey> {
        self.backend.to_phonetic(text)
    }

    fn join_keys(&self, keys: &[PhoneticKey]) -> PhoneticKey {
        let parts: Vec<&str> = keys
            .iter()
            .map(|k| k.as_str())
            .filter(|s| !s.is_empty())
            .collect();
        PhoneticKey::new(parts.join(" "))
    }

    fn similarity(
        &self,
        window_surface: &str,
        window_key: &PhoneticKey,
        target_surface: &str,
        target_key: &PhoneticKey,
    ) -> (f64, bool) {
        let syls_w = syllables(window_key);
        let syls_t = syllables(target_key);
        let compact_w = window_key.compact();
        let compact_t = target_key.compact();

        if compact_w == compact_t {
            return (0.0, true);
        }

        let is_mixed = Self::is_mixed(target_surface) || Self::is_mixed(window_surface);
        let word_len = target_surface.chars().count();
        let mut tolerance = self.rules.tolerance(word_len, is_mixed);

        // Initials gate: short targets need every initial to fuzzy-match,
        // longer targets at least the first one. This keeps windows like
        // 在北車用 off 台北車站.
        if !is_mixed {
            if word_len <= 3 {
                if syls_w.len() != syls_t.len() {
                    return (1.0, false);
                }
                for (w, t) in syls_w.iter().zip(syls_t.iter()) {
                    let (iw, _) = self.rules.split_syllable(w);
                    let (it, _) = self.rules.split_syllable(t);
                    if !self.rules.initials_fuzzy_eq(iw, it) {
                        return (1.0, false);
                    }
                }
            } else if let (Some(w0), Some(t0)) = (syls_w.first(), syls_t.first()) {
                let (iw, _) = self.rules.split_syllable(w0);
                let (it, _) = self.rules.split_syllable(t0);
                if !self.rules.initials_fuzzy_eq(iw, it) {
                    return (1.0, false);
                }
            }
        }

        if syls_w.len() == syls_t.len() && syls_w.len() <= 4 {
            let all_special = syls_w
                .iter()
                .zip(syls_t.iter())
                .all(|(w, t)| self.rules.special_syllable_match(w, t));
            if all_special {
                return (0.0, true);
            }
        }

        if syls_w.len() == syls_t.len() {
            let all_fuzzy = syls_w.iter().zip(syls_t.iter()).all(|(w, t)| {
                self.rules.special_syllable_match(w, t) || self.rules.finals_fuzzy_eq(w, t)
            });
            if all_fuzzy {
                tolerance = tolerance.max(0.15);
                return (0.1, 0.1 <= tolerance);
            }
        }

        let ratio = distance::normalized_distance(&compact_w, &compact_t);
        (ratio, ratio <= tolerance)
    }

    fn lead_group(&self, key: &PhoneticKey) -> i16 {
        let syls = syllables(key);
        let Some(first) = syls.first() else {
            return -1;
        };
        let (initial, _) = self.rules.split_syllable(first);
        if initial.is_empty() {
            return -1;
        }
        match self.rules.initial_group(initial) {
            Some(idx) => idx as i16,
            None => 100 + initial.as_bytes()[0] as i16,
        }
    }

    fn window_slack(&self) -> (usize, usize) {
        (0, 0)
    }

    fn context_window(&self) -> usize {
        10
    }

    fn is_valid_surface(&self, surface: &str) -> bool {
        !surface.is_empty()
            && surface
                .chars()
                .all(|c| is_hanzi(c) || c.is_ascii_alphanumeric())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mandarin;

    fn system() -> MandarinSystem {
        MandarinSystem::new(
            mandarin::global(),
            Arc::new(MandarinRules::new(&PhoneticOverrides::new())),
        )
    }

    fn score(sys: &MandarinSystem, window: &str, target: &str) -> (f64, bool) {
        let wk = sys.key(window).unwrap();
        let tk = sys.key(target).unwrap();
        sys.similarity(window, &wk, target, &tk)
    }

    #[test]
    fn test_split_syllable() {
        let rules = MandarinRules::new(&PhoneticOverrides::new());
        assert_eq!(rules.split_syllable("zhan"), ("zh", "an"));
        assert_eq!(rules.split_syllable("an"), ("", "an"));
        assert_eq!(rules.split_syllable("lan"), ("l", "an"));
    }

    #[test]
    fn test_exact_key_match() {
        let sys = system();
        let (ratio, ok) = score(&sys, "台北", "臺北");
        assert_eq!(ratio, 0.0);
        assert!(ok);
    }

    #[test]
    fn test_n_l_confusion_matches() {
        let sys = system();
        let (ratio, ok) = score(&sys, "流奶", "牛奶");
        assert!(ok, "liu/niu should fuzzy-match, got ratio {ratio}");
        assert!(ratio <= 0.2);
    }

    #[test]
    fn test_special_syllable_lan_ran() {
        let sys = system();
        let (ratio, ok) = score(&sys, "蘭後", "然後");
        assert_eq!(ratio, 0.0);
        assert!(ok);
    }

    #[test]
    fn test_initials_gate_rejects_distant() {
        let sys = system();
        let (_, ok) = score(&sys, "在買", "北車");
        assert!(!ok);
    }

    #[test]
    fn test_retroflex_finals_fuzzy() {
        let sys = system();
        // beice vs beiche: c/ch initials, identical finals.
        let (ratio, ok) = score(&sys, "北側", "北車");
        assert!(ok);
        assert!(ratio <= 0.15);
    }

    #[test]
    fn test_tolerance_ladder() {
        let rules = MandarinRules::new(&PhoneticOverrides::new());
        assert_eq!(rules.tolerance(2, false), 0.20);
        assert_eq!(rules.tolerance(3, false), 0.30);
        assert_eq!(rules.tolerance(5, false), 0.40);
        assert_eq!(rules.tolerance(3, true), 0.45);
    }

    #[test]
    fn test_tolerance_override() {
        let mut overrides = PhoneticOverrides::new();
        overrides.tolerance_override = Some(0.05);
        let rules = MandarinRules::new(&overrides);
        assert_eq!(rules.tolerance(5, false), 0.05);
    }

    #[test]
    fn test_syllable_variants_cover_groups_and_finals() {
        let rules = MandarinRules::new(&PhoneticOverrides::new());
        let variants = rules.syllable_variants("zhong");
        assert!(variants.contains(&"zong".to_string()));
        let variants = rules.syllable_variants("xin");
        assert!(variants.contains(&"xing".to_string()));
    }

    #[test]
    fn test_extra_initial_pair_override() {
        let mut overrides = PhoneticOverrides::new();
        overrides
            .extra_fuzzy_initial_pairs
            .push(("b".into(), "p".into()));
        let rules = MandarinRules::new(&overrides);
        assert!(rules.initials_fuzzy_eq("b", "p"));
    }

    #[test]
    fn test_valid_surface() {
        let sys = system();
        assert!(sys.is_valid_surface("北車"));
        assert!(sys.is_valid_surface("1kg"));
        assert!(!sys.is_valid_surface("北,車"));
        assert!(!sys.is_valid_surface(" 1kg"));
    }

    #[test]
    fn test_lead_group_merges_liquids() {
        let sys = system();
        let lan = sys.key("蘭").unwrap();
        let ran = sys.key("然").unwrap();
        assert_eq!(sys.lead_group(&lan), sys.lead_group(&ran));
    }
}
