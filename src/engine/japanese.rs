//! The Japanese engine.

use super::{create_corrector_impl, CorrectorEngine};
use crate::backend::japanese::{self, JapaneseBackend};
use crate::backend::{CacheStats, PhoneticBackend};
use crate::config::{EngineOptions, Language};
use crate::corrector::{Corrector, CorrectorOptions};
use crate::error::Result;
use crate::fuzzy::japanese::JapaneseFuzzyGenerator;
use crate::phonetic::japanese::{JapaneseRules, JapaneseSystem};
use crate::term::TermDict;
use crate::tokenizer::CharTokenizer;
use std::sync::Arc;

/// Long-lived Japanese corrector factory.
pub struct JapaneseEngine {
    backend: Arc<JapaneseBackend>,
    system: Arc<JapaneseSystem>,
    tokenizer: Arc<CharTokenizer>,
    generator: JapaneseFuzzyGenerator,
    options: EngineOptions,
}

impl JapaneseEngine {
    /// Engine with default options.
    pub fn new() -> Self {
        Self::with_options(EngineOptions::default())
    }

    /// Engine with explicit options.
    pub fn with_options(options: EngineOptions) -> Self {
        let backend = japanese::global();
        let rules = Arc::new(JapaneseRules::new(&options.overrides));
        let system = Arc::new(JapaneseSystem::new(backend.clone(), rules));
        let generator = JapaneseFuzzyGenerator::new(backend.clone(), options.overrides.clone());

        Self {
            backend,
            system,
            tokenizer: Arc::new(CharTokenizer::japanese()),
            generator,
            options,
        }
    }

    /// The fuzzy generator, for direct variant inspection.
    pub fn fuzzy_generator(&self) -> &JapaneseFuzzyGenerator {
        &self.generator
    }
}

impl Default for JapaneseEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CorrectorEngine for JapaneseEngine {
    fn language(&self) -> Language {
        Language::Japanese
    }

    fn create_corrector(&self, dict: &TermDict, options: CorrectorOptions) -> Result<Corrector> {
        create_corrector_impl(
            Language::Japanese,
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
    fn test_create_corrector() {
        let engine = JapaneseEngine::new();
        let corrector = engine
            .create_corrector(
                &TermDict::from_aliases([("アスピリン", vec!["asupirin"])]),
                CorrectorOptions::default(),
            )
            .unwrap();
        assert!(!corrector.is_degraded());
        assert!(corrector.target_count() >= 2);
        assert_eq!(engine.language(), Language::Japanese);
    }
}
