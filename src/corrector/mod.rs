//! The corrector: per-dictionary matcher, conflict resolver, and rewriter.
//!
//! A corrector is built once per dictionary by an engine and is immutable
//! afterwards; `correct()` takes `&self`, holds no state across calls, and
//! is safe to run concurrently (the only shared mutable state is the
//! backend's cache, which serialises internally).
//!
//! One `correct()` call runs the pipeline:
//!
//! 1. protection mask from the protected-term automaton (overlaps merged);
//! 2. exact candidate drafts from the alias automaton;
//! 3. fuzzy candidate drafts from a sliding token window, pruned by lead
//!    phoneme and key length, scored by the language's phonetic system;
//! 4. per-candidate gates, exclusion before inclusion, against the full
//!    context;
//! 5. scoring (`error_ratio − weight − context_bonus`), keeping the best
//!    candidate per span and replacement;
//! 6. greedy conflict resolution over ascending scores;
//! 7. right-to-left rewriting, with events emitted left-to-right.

use crate::backend::PhoneticKey;
use crate::config::{FailPolicy, Language, Mode};
use crate::events::{CorrectionEvent, EventSink, Stage};
use crate::index::AhoCorasick;
use crate::phonetic::PhoneticSystem;
use crate::tokenizer::Tokenizer;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Per-corrector construction options.
#[derive(Default)]
pub struct CorrectorOptions {
    /// Surface substrings that must never be rewritten. Overlapping
    /// occurrences merge into one protected interval.
    pub protected_terms: Vec<String>,
    /// Cross-lingual pre-matching: surface span → canonical surface.
    /// Applied with top priority so mixed-script names survive intact.
    pub cross_lingual: Vec<(String, String)>,
    /// Event observer, called synchronously from `correct()`.
    pub observer: Option<Arc<dyn EventSink>>,
    /// Inputs longer than this (in characters) are returned unchanged with
    /// a `Degraded` event.
    pub max_input_chars: Option<usize>,
}

const DEFAULT_MAX_INPUT_CHARS: usize = 50_000;

/// One searchable surface: a canonical, a user alias, or a generated
/// variant.
#[derive(Debug, Clone)]
pub(crate) struct SearchTarget {
    pub surface: String,
    pub canonical: String,
    pub key: PhoneticKey,
    pub key_len: usize,
    pub token_count: usize,
    pub weight: f64,
    pub keywords: Vec<String>,
    pub exclude_when: Vec<String>,
    pub is_alias: bool,
    pub priority: bool,
}

#[derive(Debug, Clone)]
struct Candidate {
    start: usize,
    end: usize,
    original: String,
    replacement: String,
    canonical: String,
    alias: String,
    score: f64,
    error_ratio: f64,
    weight: f64,
    has_context: bool,
}

/// A built corrector. Create through an engine's `create_corrector`.
pub struct Corrector {
    language: Language,
    system: Option<Arc<dyn PhoneticSystem>>,
    tokenizer: Option<Arc<dyn Tokenizer>>,
    mode: Mode,
    targets: Vec<SearchTarget>,
    exact: Option<AhoCorasick>,
    exact_pattern_targets: Vec<Vec<usize>>,
    protected: Option<AhoCorasick>,
    protected_terms: Vec<String>,
    canonical_guard: Option<AhoCorasick>,
    context_matcher: Option<AhoCorasick>,
    context_patterns: Vec<String>,
    target_keyword_ids: Vec<Vec<u32>>,
    target_exclude_ids: Vec<Vec<u32>>,
    buckets: FxHashMap<(usize, i16), Vec<usize>>,
    window_lengths: Vec<usize>,
    observer: Option<Arc<dyn EventSink>>,
    max_input_chars: usize,
    degraded_reason: Option<String>,
}

impl std::fmt::Debug for Corrector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Corrector")
            .field("language", &self.language)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl Corrector {
    pub(crate) fn build(
        language: Language,
        system: Arc<dyn PhoneticSystem>,
        tokenizer: Arc<dyn Tokenizer>,
        mode: Mode,
        _fail_policy: FailPolicy,
        mut targets: Vec<SearchTarget>,
        options: CorrectorOptions,
    ) -> Self {
        // Longer targets first; deterministic order for equal lengths.
        targets.sort_by(|a, b| {
            b.token_count
                .cmp(&a.token_count)
                .then_with(|| a.canonical.cmp(&b.canonical))
                .then_with(|| a.surface.cmp(&b.surface))
        });

        let mut protected_terms: Vec<String> = options
            .protected_terms
            .into_iter()
            .filter(|t| !t.is_empty())
            .collect();
        protected_terms.sort();
        protected_terms.dedup();

        let protected = if protected_terms.is_empty() {
            None
        } else {
            let mut matcher = AhoCorasick::new();
            for term in &protected_terms {
                matcher.add(term);
            }
            matcher.build();
            Some(matcher)
        };

        // Canonical occurrences in the input are never rewritten, not even
        // partially: an alias that is a substring of its own canonical
        // (北車 inside 台北車站) must not fire inside it. This is what makes
        // correction idempotent on canonicals.
        let mut canonical_surfaces: Vec<&str> =
            targets.iter().map(|t| t.canonical.as_str()).collect();
        canonical_surfaces.sort_unstable();
        canonical_surfaces.dedup();
        let canonical_guard = if canonical_surfaces.is_empty() {
            None
        } else {
            let mut guard = AhoCorasick::new();
            for surface in canonical_surfaces {
                guard.add(surface);
            }
            guard.build();
            Some(guard)
        };

        let (exact, exact_pattern_targets) = {
            let mut exact = AhoCorasick::new();
            let mut exact_pattern_targets: Vec<Vec<usize>> = Vec::new();
            let mut surface_patterns: FxHashMap<&str, usize> = FxHashMap::default();
            for (idx, target) in targets.iter().enumerate() {
                if !target.is_alias || target.surface.is_empty() {
                    continue;
                }
                match surface_patterns.get(target.surface.as_str()) {
                    Some(&pattern) => exact_pattern_targets[pattern].push(idx),
                    None => {
                        let pattern = exact.add(&target.surface) as usize;
                        surface_patterns.insert(target.surface.as_str(), pattern);
                        exact_pattern_targets.push(vec![idx]);
                    }
                }
            }
            if exact.pattern_count() == 0 {
                (None, exact_pattern_targets)
            } else {
                exact.build();
                (Some(exact), exact_pattern_targets)
            }
        };

        // One automaton over every keyword and exclusion term: context
        // gating and the distance-weighted bonus then cost one scan per
        // call instead of one substring search per candidate.
        let mut context_patterns: Vec<String> = Vec::new();
        let pattern_id = |patterns: &mut Vec<String>, term: &str| -> u32 {
            match patterns.iter().position(|p| p == term) {
                Some(idx) => idx as u32,
                None => {
                    patterns.push(term.to_string());
                    (patterns.len() - 1) as u32
                }
            }
        };
        let mut target_keyword_ids: Vec<Vec<u32>> = Vec::with_capacity(targets.len());
        let mut target_exclude_ids: Vec<Vec<u32>> = Vec::with_capacity(targets.len());
        for target in &targets {
            target_keyword_ids.push(
                target
                    .keywords
                    .iter()
                    .map(|k| pattern_id(&mut context_patterns, k))
                    .collect(),
            );
            target_exclude_ids.push(
                target
                    .exclude_when
                    .iter()
                    .map(|k| pattern_id(&mut context_patterns, k))
                    .collect(),
            );
        }
        let context_matcher = if context_patterns.is_empty() {
            None
        } else {
            let mut matcher = AhoCorasick::new();
            for pattern in &context_patterns {
                matcher.add(pattern);
            }
            matcher.build();
            Some(matcher)
        };

        let mut buckets: FxHashMap<(usize, i16), Vec<usize>> = FxHashMap::default();
        let (below, above) = system.window_slack();
        for (idx, target) in targets.iter().enumerate() {
            let group = system.lead_group(&target.key);
            let min_len = target.token_count.saturating_sub(below).max(1);
            let max_len = target.token_count + above;
            for len in min_len..=max_len {
                buckets.entry((len, group)).or_default().push(idx);
            }
        }
        let mut window_lengths: Vec<usize> = buckets.keys().map(|(len, _)| *len).collect();
        window_lengths.sort_unstable();
        window_lengths.dedup();

        Self {
            language,
            system: Some(system),
            tokenizer: Some(tokenizer),
            mode,
            targets,
            exact,
            exact_pattern_targets,
            protected,
            protected_terms,
            canonical_guard,
            context_matcher,
            context_patterns,
            target_keyword_ids,
            target_exclude_ids,
            buckets,
            window_lengths,
            observer: options.observer,
            max_input_chars: options.max_input_chars.unwrap_or(DEFAULT_MAX_INPUT_CHARS),
            degraded_reason: None,
        }
    }

    /// A pass-through corrector for `FailPolicy::Degrade`: every call
    /// returns its input unchanged and emits a `Degraded` event.
    pub(crate) fn degraded(
        language: Language,
        reason: String,
        observer: Option<Arc<dyn EventSink>>,
    ) -> Self {
        Self {
            language,
            system: None,
            tokenizer: None,
            mode: Mode::Production,
            targets: Vec::new(),
            exact: None,
            exact_pattern_targets: Vec::new(),
            protected: None,
            protected_terms: Vec::new(),
            canonical_guard: None,
            context_matcher: None,
            context_patterns: Vec::new(),
            target_keyword_ids: Vec::new(),
            target_exclude_ids: Vec::new(),
            buckets: FxHashMap::default(),
            window_lengths: Vec::new(),
            observer,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            degraded_reason: Some(reason),
        }
    }

    /// Language this corrector matches in.
    pub fn language(&self) -> Language {
        self.language
    }

    /// True when the corrector was degraded to a pass-through at build.
    pub fn is_degraded(&self) -> bool {
        self.degraded_reason.is_some()
    }

    /// Number of search targets (canonicals + aliases + variants).
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Registers the event observer, replacing any previous one.
    pub fn set_observer(&mut self, observer: Arc<dyn EventSink>) {
        self.observer = Some(observer);
    }

    /// Corrects `text` with default options (context = text, not silent).
    pub fn correct(&self, text: &str) -> String {
        self.correct_with(text, None, false)
    }

    /// Corrects `text`.
    ///
    /// `full_context` widens keyword/exclusion gating beyond the text
    /// being rewritten (useful when correcting one segment of a longer
    /// input). `silent` suppresses log output; events still reach the
    /// observer.
    pub fn correct_with(&self, text: &str, full_context: Option<&str>, silent: bool) -> String {
        if text.is_empty() {
            return String::new();
        }

        let trace_id = uuid::Uuid::new_v4().simple().to_string();

        if let Some(reason) = &self.degraded_reason {
            self.emit(
                silent,
                CorrectionEvent::Degraded {
                    trace_id,
                    stage: Stage::CandidateGen,
                    reason: reason.clone(),
                },
            );
            return text.to_string();
        }

        if text.chars().count() > self.max_input_chars {
            self.emit(
                silent,
                CorrectionEvent::Degraded {
                    trace_id,
                    stage: Stage::CandidateGen,
                    reason: format!("input exceeds {} characters", self.max_input_chars),
                },
            );
            return text.to_string();
        }

        let text_folded = text.to_ascii_lowercase();

        // Keyword/exclusion occurrences: one automaton scan per string.
        let text_hits = self.term_occurrences(&text_folded);
        let context_present: Vec<bool> = match full_context {
            Some(context) => {
                let context_folded = context.to_ascii_lowercase();
                self.term_occurrences(&context_folded)
                    .iter()
                    .map(|hits| !hits.is_empty())
                    .collect()
            }
            None => text_hits.iter().map(|hits| !hits.is_empty()).collect(),
        };

        let protection = self.protection_intervals(text);

        let mut drafts = Vec::new();
        self.exact_candidates(
            text,
            &context_present,
            &text_hits,
            &protection,
            &trace_id,
            silent,
            &mut drafts,
        );
        self.fuzzy_candidates(
            text,
            &context_present,
            &text_hits,
            &protection,
            &trace_id,
            silent,
            &mut drafts,
        );

        let candidates = self.score_candidates(drafts);
        let accepted = resolve_conflicts(candidates);
        self.apply_replacements(text, accepted, &trace_id, silent)
    }

    fn emit(&self, silent: bool, event: CorrectionEvent) {
        if let Some(observer) = &self.observer {
            observer.on_event(&event);
        }
        if silent {
            return;
        }
        match &event {
            CorrectionEvent::Replacement {
                original,
                replacement,
                score,
                has_context,
                ..
            } => {
                let tag = if *has_context { "context" } else { "phonetic" };
                tracing::info!(%original, %replacement, score, tag, "correction applied");
            }
            CorrectionEvent::FuzzyError { detail, .. } => {
                tracing::warn!(%detail, "phonetic conversion failed");
            }
            CorrectionEvent::Degraded { reason, .. } => {
                tracing::warn!(%reason, "correction degraded");
            }
            CorrectionEvent::Warning { reason, original, .. } => {
                tracing::debug!(%original, %reason, "candidate rejected");
            }
        }
    }

    fn protection_intervals(&self, text: &str) -> Vec<(usize, usize)> {
        let mut intervals: Vec<(usize, usize)> = Vec::new();
        if let Some(matcher) = &self.protected {
            intervals.extend(matcher.find_all(text).into_iter().map(|m| (m.start, m.end)));
        }
        if let Some(guard) = &self.canonical_guard {
            intervals.extend(guard.find_all(text).into_iter().map(|m| (m.start, m.end)));
        }
        intervals.sort_unstable();

        // Merge overlapping protections into their union.
        let mut merged: Vec<(usize, usize)> = Vec::new();
        for (start, end) in intervals {
            match merged.last_mut() {
                Some((_, last_end)) if start <= *last_end => *last_end = (*last_end).max(end),
                _ => merged.push((start, end)),
            }
        }
        merged
    }

    fn span_protected(protection: &[(usize, usize)], start: usize, end: usize) -> bool {
        protection.iter().any(|&(s, e)| start < e && s < end)
    }

    /// Occurrence byte-starts of every keyword/exclusion pattern in the
    /// folded string, indexed by pattern id.
    fn term_occurrences(&self, folded: &str) -> Vec<Vec<usize>> {
        let mut hits: Vec<Vec<usize>> = vec![Vec::new(); self.context_patterns.len()];
        if let Some(matcher) = &self.context_matcher {
            for m in matcher.find_all(folded) {
                hits[m.pattern as usize].push(m.start);
            }
        }
        hits
    }

    #[allow(clippy::too_many_arguments)]
    fn exact_candidates(
        &self,
        text: &str,
        context_present: &[bool],
        text_hits: &[Vec<usize>],
        protection: &[(usize, usize)],
        trace_id: &str,
        silent: bool,
        drafts: &mut Vec<Candidate>,
    ) {
        let (Some(matcher), Some(system)) = (&self.exact, &self.system) else {
            return;
        };

        for m in matcher.find_all(text) {
            if Self::span_protected(protection, m.start, m.end) {
                continue;
            }
            let original = &text[m.start..m.end];
            if !system.is_valid_surface(original) {
                continue;
            }
            if self.protected_terms.iter().any(|p| p == original) {
                continue;
            }

            for &idx in &self.exact_pattern_targets[m.pattern as usize] {
                let target = &self.targets[idx];
                if original == target.canonical {
                    continue;
                }
                if !self.passes_gates(idx, context_present, trace_id, silent, m.start, m.end, original)
                {
                    continue;
                }

                let (has_context, distance) =
                    self.context_bonus_distance(text, idx, text_hits, m.start, m.end);
                drafts.push(self.make_candidate(
                    target,
                    m.start,
                    m.end,
                    original,
                    0.0,
                    has_context,
                    distance,
                ));
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn fuzzy_candidates(
        &self,
        text: &str,
        context_present: &[bool],
        text_hits: &[Vec<usize>],
        protection: &[(usize, usize)],
        trace_id: &str,
        silent: bool,
        drafts: &mut Vec<Candidate>,
    ) {
        let (Some(system), Some(tokenizer)) = (&self.system, &self.tokenizer) else {
            return;
        };

        let tokens = tokenizer.tokenize(text);
        if tokens.is_empty() {
            return;
        }

        let token_keys: Vec<PhoneticKey> = tokens
            .iter()
            .map(|token| match system.key(&token.text) {
                Ok(key) => key,
                Err(err) => {
                    // The offending token matches nothing but the call
                    // carries on: the window degrades, not the text.
                    self.emit(
                        silent,
                        CorrectionEvent::FuzzyError {
                            trace_id: trace_id.to_string(),
                            stage: Stage::Normalize,
                            detail: format!("token '{}': {err}", token.text),
                        },
                    );
                    PhoneticKey::new(token.text.to_lowercase())
                }
            })
            .collect();

        let n = tokens.len();
        for &len in self.window_lengths.iter().filter(|&&l| l <= n) {
            for i in 0..=n - len {
                let start = tokens[i].start;
                let end = tokens[i + len - 1].end;
                if Self::span_protected(protection, start, end) {
                    continue;
                }

                let original = &text[start..end];
                if !system.is_valid_surface(original) {
                    continue;
                }
                if self.protected_terms.iter().any(|p| p == original) {
                    continue;
                }

                let window_key = system.join_keys(&token_keys[i..i + len]);
                if window_key.symbol_len() == 0 {
                    continue;
                }

                let group = system.lead_group(&window_key);
                let mut indices: Vec<usize> = Vec::new();
                if group == -1 {
                    // Unknown lead phoneme: be conservative, scan all
                    // groups of this window length.
                    for ((l, _), bucket) in &self.buckets {
                        if *l == len {
                            indices.extend_from_slice(bucket);
                        }
                    }
                    indices.sort_unstable();
                    indices.dedup();
                } else {
                    if let Some(bucket) = self.buckets.get(&(len, group)) {
                        indices.extend_from_slice(bucket);
                    }
                    if let Some(bucket) = self.buckets.get(&(len, -1)) {
                        indices.extend_from_slice(bucket);
                    }
                }

                for idx in indices {
                    let target = &self.targets[idx];

                    let len_diff = (window_key.symbol_len() as f64) - (target.key_len as f64);
                    if len_diff.abs() > system.max_key_len_diff(target.key_len) {
                        continue;
                    }

                    let (error_ratio, is_match) =
                        system.similarity(original, &window_key, &target.surface, &target.key);
                    if !is_match {
                        continue;
                    }
                    if original == target.canonical {
                        continue;
                    }
                    if !self.passes_gates(
                        idx, context_present, trace_id, silent, start, end, original,
                    ) {
                        continue;
                    }

                    let (has_context, distance) =
                        self.context_bonus_distance(text, idx, text_hits, start, end);
                    drafts.push(self.make_candidate(
                        target,
                        start,
                        end,
                        original,
                        error_ratio,
                        has_context,
                        distance,
                    ));
                }
            }
        }
    }

    /// Exclusion first, inclusion second; exclusion always wins.
    #[allow(clippy::too_many_arguments)]
    fn passes_gates(
        &self,
        idx: usize,
        context_present: &[bool],
        trace_id: &str,
        silent: bool,
        start: usize,
        end: usize,
        original: &str,
    ) -> bool {
        let target = &self.targets[idx];

        if self.target_exclude_ids[idx]
            .iter()
            .any(|&id| context_present[id as usize])
        {
            if self.mode == Mode::Evaluation {
                self.emit(
                    silent,
                    CorrectionEvent::Warning {
                        trace_id: trace_id.to_string(),
                        start,
                        end,
                        original: original.to_string(),
                        canonical: target.canonical.clone(),
                        reason: "excluded by context".into(),
                    },
                );
            }
            return false;
        }

        let keyword_ids = &self.target_keyword_ids[idx];
        if !keyword_ids.is_empty() && !keyword_ids.iter().any(|&id| context_present[id as usize]) {
            if self.mode == Mode::Evaluation {
                self.emit(
                    silent,
                    CorrectionEvent::Warning {
                        trace_id: trace_id.to_string(),
                        start,
                        end,
                        original: original.to_string(),
                        canonical: target.canonical.clone(),
                        reason: "required keyword not in context".into(),
                    },
                );
            }
            return false;
        }

        true
    }

    /// Distance (in characters) from the span to the nearest keyword
    /// occurrence, when one lies within the language's context window.
    fn context_bonus_distance(
        &self,
        text: &str,
        idx: usize,
        text_hits: &[Vec<usize>],
        start: usize,
        end: usize,
    ) -> (bool, Option<usize>) {
        let keyword_ids = &self.target_keyword_ids[idx];
        if keyword_ids.is_empty() {
            return (false, None);
        }
        let Some(system) = &self.system else {
            return (false, None);
        };
        let window = system.context_window();

        let char_at = |byte: usize| text[..byte].chars().count();
        let span_start = char_at(start);
        let span_end = char_at(end);

        let mut min_distance: Option<usize> = None;
        for &id in keyword_ids {
            let kw_chars = self.context_patterns[id as usize].chars().count();
            for &pos in &text_hits[id as usize] {
                let kw_start = char_at(pos);
                let distance = if kw_start + kw_chars <= span_start {
                    span_start - (kw_start + kw_chars)
                } else if kw_start >= span_end {
                    kw_start - span_end
                } else {
                    0
                };
                if min_distance.map(|d| distance < d).unwrap_or(true) {
                    min_distance = Some(distance);
                }
            }
        }

        match min_distance {
            Some(d) if d <= window => (true, Some(d)),
            _ => (false, None),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn make_candidate(
        &self,
        target: &SearchTarget,
        start: usize,
        end: usize,
        original: &str,
        error_ratio: f64,
        has_context: bool,
        distance: Option<usize>,
    ) -> Candidate {
        let window = self
            .system
            .as_ref()
            .map(|s| s.context_window())
            .unwrap_or(10);

        let mut score = error_ratio - target.weight;
        if has_context {
            if let Some(d) = distance {
                let factor = 1.0 - (d.min(window) as f64 / window as f64) * 0.6;
                score -= 0.8 * factor;
            }
        }
        if target.priority {
            score -= 2.0;
        }

        Candidate {
            start,
            end,
            original: original.to_string(),
            replacement: target.canonical.clone(),
            canonical: target.canonical.clone(),
            alias: target.surface.clone(),
            score,
            error_ratio,
            weight: target.weight,
            has_context,
        }
    }

    /// Keeps the best candidate per `(start, end, replacement)`.
    fn score_candidates(&self, drafts: Vec<Candidate>) -> Vec<Candidate> {
        let mut best: FxHashMap<(usize, usize, String), Candidate> = FxHashMap::default();

        for candidate in drafts {
            if candidate.replacement.is_empty() || candidate.original == candidate.replacement {
                continue;
            }
            let key = (
                candidate.start,
                candidate.end,
                candidate.replacement.clone(),
            );
            let improves = match best.get(&key) {
                Some(existing) => candidate.score < existing.score,
                None => true,
            };
            if improves {
                best.insert(key, candidate);
            }
        }

        best.into_values().collect()
    }

    fn apply_replacements(
        &self,
        text: &str,
        mut accepted: Vec<Candidate>,
        trace_id: &str,
        silent: bool,
    ) -> String {
        accepted.sort_by_key(|c| c.start);

        // Rewrite right-to-left so earlier byte offsets stay valid.
        let mut out = text.to_string();
        for candidate in accepted.iter().rev() {
            out.replace_range(candidate.start..candidate.end, &candidate.replacement);
        }

        // Events go out in left-to-right span order regardless.
        for candidate in &accepted {
            self.emit(
                silent,
                CorrectionEvent::Replacement {
                    trace_id: trace_id.to_string(),
                    start: candidate.start,
                    end: candidate.end,
                    original: candidate.original.clone(),
                    replacement: candidate.replacement.clone(),
                    canonical: candidate.canonical.clone(),
                    alias: candidate.alias.clone(),
                    score: candidate.score,
                    has_context: candidate.has_context,
                },
            );
        }

        out
    }
}

/// Greedy selection over ascending scores; a candidate is accepted only if
/// its span is disjoint from every already-accepted span. Ties break by
/// smaller start, then smaller end, then higher weight, closer match, and
/// lexicographically smaller canonical.
fn resolve_conflicts(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| {
        a.score
            .total_cmp(&b.score)
            .then_with(|| a.start.cmp(&b.start))
            .then_with(|| a.end.cmp(&b.end))
            .then_with(|| b.weight.total_cmp(&a.weight))
            .then_with(|| a.error_ratio.total_cmp(&b.error_ratio))
            .then_with(|| a.canonical.cmp(&b.canonical))
    });

    let mut accepted: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        let overlaps = accepted
            .iter()
            .any(|a| candidate.start < a.end && a.start < candidate.end);
        if !overlaps {
            accepted.push(candidate);
        }
    }
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(start: usize, end: usize, score: f64, canonical: &str) -> Candidate {
        Candidate {
            start,
            end,
            original: "x".into(),
            replacement: canonical.into(),
            canonical: canonical.into(),
            alias: "x".into(),
            score,
            error_ratio: score,
            weight: 0.0,
            has_context: false,
        }
    }

    #[test]
    fn test_resolve_conflicts_prefers_lower_score() {
        let accepted = resolve_conflicts(vec![
            candidate(0, 4, 0.3, "worse"),
            candidate(2, 6, 0.1, "better"),
        ]);
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].canonical, "better");
    }

    #[test]
    fn test_resolve_conflicts_keeps_disjoint() {
        let accepted = resolve_conflicts(vec![
            candidate(0, 4, 0.3, "a"),
            candidate(4, 8, 0.1, "b"),
        ]);
        assert_eq!(accepted.len(), 2);
    }

    #[test]
    fn test_resolve_conflicts_tie_breaks_by_start() {
        let accepted = resolve_conflicts(vec![
            candidate(4, 8, 0.2, "late"),
            candidate(0, 4, 0.2, "early"),
        ]);
        assert_eq!(accepted[0].canonical, "early");
    }

    #[test]
    fn test_same_span_prefers_higher_weight() {
        let mut a = candidate(0, 4, -0.5, "alpha");
        a.weight = 0.1;
        let mut b = candidate(0, 4, -0.5, "beta");
        b.weight = 0.3;
        let accepted = resolve_conflicts(vec![a, b]);
        assert_eq!(accepted[0].canonical, "beta");
    }

    #[test]
    fn test_same_span_same_weight_prefers_lexicographic() {
        let accepted = resolve_conflicts(vec![
            candidate(0, 4, 0.1, "zeta"),
            candidate(0, 4, 0.1, "alpha"),
        ]);
        assert_eq!(accepted[0].canonical, "alpha");
    }
}
