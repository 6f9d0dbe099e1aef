//! Engines: long-lived per-language corrector factories.
//!
//! An engine owns the expensive pieces — the backend reference, tokenizer,
//! rule tables, and fuzzy generator — and stamps out lightweight
//! [`Corrector`]s from term dictionaries. Auto-fuzzy is mandatory: every
//! canonical is expanded through the language's generator regardless of
//! input shape, merged with user aliases (deduplicated by phonetic key,
//! user aliases first), and the canonical itself always joins the search
//! set.

use crate::backend::CacheStats;
use crate::config::{EngineOptions, FailPolicy, Language};
use crate::corrector::{Corrector, CorrectorOptions, SearchTarget};
use crate::error::{PhonofixError, Result};
use crate::events::EventSink;
use crate::fuzzy::FuzzyGenerator;
use crate::phonetic::PhoneticSystem;
use crate::term::{normalize_term_dict, TermDict};
use crate::tokenizer::Tokenizer;
use std::sync::Arc;

#[cfg(feature = "english")]
pub mod english;
#[cfg(feature = "japanese")]
pub mod japanese;
#[cfg(feature = "mandarin")]
pub mod mandarin;

/// Common factory interface over the per-language engines.
pub trait CorrectorEngine: Send + Sync {
    /// Language this engine corrects.
    fn language(&self) -> Language;

    /// Builds a corrector for the given dictionary.
    fn create_corrector(&self, dict: &TermDict, options: CorrectorOptions) -> Result<Corrector>;

    /// Whether the underlying backend is ready.
    fn is_initialized(&self) -> bool;

    /// Backend cache statistics.
    fn backend_stats(&self) -> CacheStats;
}

/// Shared `create_corrector` implementation: validate, expand, merge,
/// index — or degrade per the engine's fail policy.
pub(crate) fn create_corrector_impl(
    language: Language,
    system: Arc<dyn PhoneticSystem>,
    tokenizer: Arc<dyn Tokenizer>,
    generator: &dyn FuzzyGenerator,
    dict: &TermDict,
    engine_options: &EngineOptions,
    options: CorrectorOptions,
) -> Result<Corrector> {
    let _span = tracing::debug_span!("create_corrector", language = %language).entered();

    if options.protected_terms.len() > engine_options.max_protected_terms {
        return Err(PhonofixError::ResourceLimit {
            what: "protected terms",
            limit: engine_options.max_protected_terms,
            actual: options.protected_terms.len(),
        });
    }

    match build_targets(
        &system,
        &tokenizer,
        generator,
        dict,
        engine_options,
        &options.cross_lingual,
    ) {
        Ok(targets) => {
            tracing::debug!(targets = targets.len(), "search index assembled");
            Ok(Corrector::build(
                language,
                system,
                tokenizer,
                engine_options.mode,
                engine_options.fail_policy,
                targets,
                options,
            ))
        }
        // Malformed input and blown limits are caller bugs; degrading
        // would hide them.
        Err(err @ PhonofixError::InvalidInput { .. })
        | Err(err @ PhonofixError::ResourceLimit { .. }) => Err(err),
        Err(err) => match engine_options.fail_policy {
            FailPolicy::Raise => Err(err),
            FailPolicy::Degrade => {
                tracing::warn!(error = %err, "corrector degraded to pass-through");
                Ok(Corrector::degraded(language, err.to_string(), options.observer))
            }
        },
    }
}

fn fold(words: &[String]) -> Vec<String> {
    words
        .iter()
        .filter(|w| !w.is_empty())
        .map(|w| w.to_ascii_lowercase())
        .collect()
}

fn build_targets(
    system: &Arc<dyn PhoneticSystem>,
    tokenizer: &Arc<dyn Tokenizer>,
    generator: &dyn FuzzyGenerator,
    dict: &TermDict,
    engine_options: &EngineOptions,
    cross_lingual: &[(String, String)],
) -> Result<Vec<SearchTarget>> {
    let default_max_variants = engine_options.overrides.effective_max_variants();
    let normalized = normalize_term_dict(dict, default_max_variants)?;

    let mut targets: Vec<SearchTarget> = Vec::new();

    let mut push_target = |targets: &mut Vec<SearchTarget>, target: SearchTarget| -> Result<()> {
        targets.push(target);
        if targets.len() > engine_options.max_search_targets {
            return Err(PhonofixError::ResourceLimit {
                what: "search targets",
                limit: engine_options.max_search_targets,
                actual: targets.len(),
            });
        }
        Ok(())
    };

    for term in &normalized {
        let keywords = fold(&term.keywords);
        let exclude_when = fold(&term.exclude_when);

        let canonical_key = system.key(&term.canonical)?;
        push_target(
            &mut targets,
            SearchTarget {
                surface: term.canonical.clone(),
                canonical: term.canonical.clone(),
                key_len: canonical_key.symbol_len(),
                key: canonical_key,
                token_count: tokenizer.tokenize(&term.canonical).len(),
                weight: term.weight,
                keywords: keywords.clone(),
                exclude_when: exclude_when.clone(),
                is_alias: false,
                priority: false,
            },
        )?;

        // User aliases first: they win key-level dedup against generated
        // variants.
        let mut seen_keys: Vec<crate::backend::PhoneticKey> = Vec::new();
        for alias in &term.aliases {
            let key = match system.key(alias) {
                Ok(key) => key,
                Err(err) => {
                    if engine_options.fail_policy == FailPolicy::Raise {
                        return Err(err);
                    }
                    tracing::warn!(%alias, error = %err, "alias skipped");
                    continue;
                }
            };
            if seen_keys.contains(&key) {
                continue;
            }
            seen_keys.push(key.clone());
            push_target(
                &mut targets,
                SearchTarget {
                    surface: alias.clone(),
                    canonical: term.canonical.clone(),
                    key_len: key.symbol_len(),
                    key,
                    token_count: tokenizer.tokenize(alias).len(),
                    weight: term.weight,
                    keywords: keywords.clone(),
                    exclude_when: exclude_when.clone(),
                    is_alias: true,
                    priority: false,
                },
            )?;
        }

        // Auto-fuzzy applies to every input shape.
        for variant in generator.generate_variants(&term.canonical, term.max_variants) {
            if seen_keys.contains(&variant.key) {
                continue;
            }
            seen_keys.push(variant.key.clone());
            push_target(
                &mut targets,
                SearchTarget {
                    surface: variant.text,
                    canonical: term.canonical.clone(),
                    key_len: variant.key.symbol_len(),
                    key: variant.key,
                    token_count: 0,
                    weight: term.weight,
                    keywords: keywords.clone(),
                    exclude_when: exclude_when.clone(),
                    is_alias: true,
                    priority: false,
                },
            )?;
        }
    }

    // Token counts for generated variants, computed in one pass.
    for target in targets.iter_mut() {
        if target.token_count == 0 {
            target.token_count = tokenizer.tokenize(&target.surface).len().max(1);
        }
    }

    for (surface, canonical) in cross_lingual {
        if surface.is_empty() || canonical.is_empty() {
            continue;
        }
        let key = system
            .key(surface)
            .unwrap_or_else(|_| crate::backend::PhoneticKey::new(surface.to_lowercase()));
        push_target(
            &mut targets,
            SearchTarget {
                surface: surface.clone(),
                canonical: canonical.clone(),
                key_len: key.symbol_len(),
                key,
                token_count: tokenizer.tokenize(surface).len().max(1),
                weight: 0.0,
                keywords: Vec::new(),
                exclude_when: Vec::new(),
                is_alias: true,
                priority: true,
            },
        )?;
    }

    Ok(targets)
}

/// Builds a degraded pass-through corrector directly (used by engines whose
/// backend failed at construction under `FailPolicy::Degrade`).
pub(crate) fn degraded_corrector(
    language: Language,
    reason: String,
    observer: Option<Arc<dyn EventSink>>,
) -> Corrector {
    Corrector::degraded(language, reason, observer)
}
