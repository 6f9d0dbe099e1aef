//! The Mandarin engine.

use super::{create_corrector_impl, CorrectorEngine};
use crate::backend::mandarin::{self, MandarinBackend};
use crate::backend::{CacheStats, PhoneticBackend};
use crate::config::{EngineOptions, Language};
use crate::corrector::{Corrector, CorrectorOptions};
use crate::error::Result;
use crate::fuzzy::mandarin::MandarinFuzzyGenerator;
use crate::phonetic::mandarin::{MandarinRules, MandarinSystem};
use crate::term::TermDict;
use crate::tokenizer::CharTokenizer;
use std::sync::Arc;

/// Long-lived Mandarin corrector factory.
///
/// Construction is cheap (the backend is table-driven and shared
/// process-wide); correctors built from a warm engine cost only their
/// index assembly.
///
/// ```rust,ignore
/// use phonofix::prelude::*;
///
/// let engine = MandarinEngine::new();
/// let corrector = engine
///     .create_corrector(&TermDict::from_canonicals(["台北車站"]), CorrectorOptions::default())
///     .unwrap();
/// ```
pub struct MandarinEngine {
    backend: Arc<MandarinBackend>,
    system: Arc<MandarinSystem>,
    tokenizer: Arc<CharTokenizer>,
    generator: MandarinFuzzyGenerator,
    options: EngineOptions,
}

impl MandarinEngine {
    /// Engine with default options.
    pub fn new() -> Self {
        Self::with_options(EngineOptions::default())
    }

    /// Engine with explicit options (fail policy, mode, rule overrides).
    pub fn with_options(options: EngineOptions) -> Self {
        let backend = mandarin::global();
        let rules = Arc::new(MandarinRules::new(&options.overrides));
        let system = Arc::new(MandarinSystem::new(backend.clone(), rules.clone()));
        let generator =
            MandarinFuzzyGenerator::new(backend.clone(), rules, options.overrides.clone());

        Self {
            backend,
            system,
            tokenizer: Arc::new(CharTokenizer::mandarin()),
            generator,
            options,
        }
    }

    /// The fuzzy generator, for direct variant inspection.
    pub fn fuzzy_generator(&self) -> &MandarinFuzzyGenerator {
        &self.generator
    }
}

impl Default for MandarinEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CorrectorEngine for MandarinEngine {
    fn language(&self) -> Language {
        Language::Mandarin
    }

    fn create_corrector(&self, dict: &TermDict, options: CorrectorOptions) -> Result<Corrector> {
        create_corrector_impl(
            Language::Mandarin,
            self.system.clone(),
            self.tokenizer.clone(),
            &self.generator,
            dict,
            &self.options,
            options,
        )
    }

    fn is_initialized(&self) -> bool {
        self.backend.is_initialized()
    }

    fn backend_stats(&self) -> CacheStats {
        self.backend.cache_stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_reports_initialized() {
        let engine = MandarinEngine::new();
        assert!(engine.is_initialized());
        assert_eq!(engine.language(), Language::Mandarin);
    }

    #[test]
    fn test_create_corrector_from_canonicals() {
        let engine = MandarinEngine::new();
        let corrector = engine
            .create_corrector(
                &TermDict::from_canonicals(["牛奶"]),
                CorrectorOptions::default(),
            )
            .unwrap();
        assert!(!corrector.is_degraded());
        // Canonical plus at least one generated variant.
        assert!(corrector.target_count() > 1);
    }

    #[test]
    fn test_invalid_input_propagates_even_when_degrading() {
        let engine = MandarinEngine::new();
        let err = engine
            .create_corrector(
                &TermDict::from_canonicals([""]),
                CorrectorOptions::default(),
            )
            .unwrap_err();
        assert!(matches!(err, crate::error::PhonofixError::InvalidInput { .. }));
    }

    #[test]
    fn test_protected_terms_limit() {
        let mut engine_options = EngineOptions::default();
        engine_options.max_protected_terms = 2;
        let engine = MandarinEngine::with_options(engine_options);
        let options = CorrectorOptions {
            protected_terms: vec!["一".into(), "二".into(), "三".into()],
            ..Default::default()
        };
        let err = engine
            .create_corrector(&TermDict::from_canonicals(["牛奶"]), options)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::PhonofixError::ResourceLimit { .. }
        ));
    }
}
