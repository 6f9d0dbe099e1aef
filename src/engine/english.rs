//! The English engine.

use super::{create_corrector_impl, degraded_corrector, CorrectorEngine};
use crate::backend::english::{EnglishBackend, EnglishEngineKind};
use crate::backend::{CacheStats, PhoneticBackend};
use crate::config::{EngineOptions, FailPolicy, Language};
use crate::corrector::{Corrector, CorrectorOptions};
use crate::error::Result;
use crate::fuzzy::english::EnglishFuzzyGenerator;
use crate::phonetic::english::{EnglishRules, EnglishSystem};
use crate::term::TermDict;
use crate::tokenizer::WordTokenizer;
use std::sync::Arc;

struct EngineInner {
    backend: Arc<EnglishBackend>,
    system: Arc<EnglishSystem>,
    generator: EnglishFuzzyGenerator,
}

/// Long-lived English corrector factory.
///
/// With [`EnglishEngineKind::Auto`] the engine prefers an installed
/// `espeak-ng` and falls back to the built-in grapheme rules, so
/// construction never fails. Requesting [`EnglishEngineKind::Espeak`]
/// explicitly surfaces a missing binary: as an error under
/// `FailPolicy::Raise`, or as an engine whose correctors pass text through
/// unchanged (with `Degraded` events) under `FailPolicy::Degrade`.
pub struct EnglishEngine {
    inner: Option<EngineInner>,
    unavailable_reason: Option<String>,
    tokenizer: Arc<WordTokenizer>,
    options: EngineOptions,
}

impl std::fmt::Debug for EnglishEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnglishEngine")
            .field("unavailable_reason", &self.unavailable_reason)
            .finish_non_exhaustive()
    }
}

impl EnglishEngine {
    /// Engine with the `Auto` backend and default options.
    pub fn new() -> Self {
        Self::with_engine(EnglishEngineKind::Auto, EngineOptions::default())
            .expect("Auto engine construction is infallible")
    }

    /// Engine over the built-in grapheme rules only (no external binary).
    pub fn with_rules() -> Self {
        Self::with_engine(EnglishEngineKind::GraphemeRules, EngineOptions::default())
            .expect("rule engine construction is infallible")
    }

    /// Engine with an explicit backend choice and options.
    pub fn with_engine(kind: EnglishEngineKind, options: EngineOptions) -> Result<Self> {
        let tokenizer = Arc::new(WordTokenizer);
        match EnglishBackend::new(kind) {
            Ok(backend) => {
                let backend = Arc::new(backend);
                let rules = Arc::new(EnglishRules::new(&options.overrides));
                let system = Arc::new(EnglishSystem::new(backend.clone(), rules.clone()));
                let generator = EnglishFuzzyGenerator::new(
                    backend.clone(),
                    rules,
                    options.overrides.clone(),
                );
                Ok(Self {
                    inner: Some(EngineInner {
                        backend,
                        system,
                        generator,
                    }),
                    unavailable_reason: None,
                    tokenizer,
                    options,
                })
            }
            Err(err) => match options.fail_policy {
                FailPolicy::Raise => Err(err),
                FailPolicy::Degrade => {
                    tracing::warn!(error = %err, "english engine degraded");
                    Ok(Self {
                        inner: None,
                        unavailable_reason: Some(err.to_string()),
                        tokenizer,
                        options,
                    })
                }
            },
        }
    }
}

impl Default for EnglishEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CorrectorEngine for EnglishEngine {
    fn language(&self) -> Language {
        Language::English
    }

    fn create_corrector(&self, dict: &TermDict, options: CorrectorOptions) -> Result<Corrector> {
        match &self.inner {
            Some(inner) => create_corrector_impl(
                Language::English,
                inner.system.clone(),
                self.tokenizer.clone(),
                &inner.generator,
                dict,
                &self.options,
                options,
            ),
            None => {
                let reason = self
                    .unavailable_reason
                    .clone()
                    .unwrap_or_else(|| "backend unavailable".into());
                Ok(degraded_corrector(
                    Language::English,
                    reason,
                    options.observer,
                ))
            }
        }
    }

    fn is_initialized(&self) -> bool {
        self.inner
            .as_ref()
            .map(|i| i.backend.is_initialized())
            .unwrap_or(false)
    }

    fn backend_stats(&self) -> CacheStats {
        self.inner
            .as_ref()
            .map(|i| i.backend.cache_stats())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_engine_builds_correctors() {
        let engine = EnglishEngine::with_rules();
        assert!(engine.is_initialized());
        let corrector = engine
            .create_corrector(
                &TermDict::from_aliases([("Python", vec!["Pyton"])]),
                CorrectorOptions::default(),
            )
            .unwrap();
        assert!(!corrector.is_degraded());
        assert!(corrector.target_count() >= 2);
    }

    #[test]
    fn test_missing_espeak_honours_fail_policy() {
        // One test for both policies: PATH mutation must not race itself.
        std::env::set_var(crate::backend::english::ESPEAK_ENV, "/nonexistent/espeak-ng");
        let saved_path = std::env::var_os("PATH");
        std::env::set_var("PATH", "/nonexistent-dir");

        let mut options = EngineOptions::default();
        options.fail_policy = FailPolicy::Raise;
        let err = EnglishEngine::with_engine(EnglishEngineKind::Espeak, options).unwrap_err();
        assert!(matches!(
            err,
            crate::error::PhonofixError::BackendUnavailable { .. }
        ));

        let mut options = EngineOptions::default();
        options.fail_policy = FailPolicy::Degrade;
        let engine = EnglishEngine::with_engine(EnglishEngineKind::Espeak, options).unwrap();
        assert!(!engine.is_initialized());

        let corrector = engine
            .create_corrector(
                &TermDict::from_canonicals(["Python"]),
                CorrectorOptions::default(),
            )
            .unwrap();
        assert!(corrector.is_degraded());
        assert_eq!(corrector.correct("Pyton"), "Pyton");

        if let Some(path) = saved_path {
            std::env::set_var("PATH", path);
        }
        std::env::remove_var(crate::backend::english::ESPEAK_ENV);
    }
}
