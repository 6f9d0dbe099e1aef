//! # phonofix
//!
//! Phonetic proper-noun substitution for noisy text.
//!
//! Speech recognisers, LLMs, and fast typists all misspell proper nouns in a
//! characteristic way: the output *sounds* right but is written wrong.
//! This crate corrects such errors by matching candidate spans in a
//! **phonetic domain** (Mandarin Pinyin, approximate English IPA, Japanese
//! Hepburn Romaji) instead of the surface-orthographic one.
//!
//! Callers supply a dictionary of canonical terms, optionally with aliases,
//! context keywords, exclusion keywords, and per-term weights. An [`engine`]
//! expands every canonical into phonetically plausible variants, and the
//! resulting [`corrector::Corrector`] scans input text with a sliding
//! window, scores candidates by phonetic edit distance, resolves a
//! non-overlapping rewrite plan, and rewrites accepted spans back to the
//! canonical surface.
//!
//! ## Example
//!
//! ```rust,ignore
//! use phonofix::prelude::*;
//!
//! let engine = MandarinEngine::new();
//! let corrector = engine
//!     .create_corrector(TermDict::from_canonicals(["台北車站", "牛奶"]), CorrectorOptions::default())
//!     .unwrap();
//!
//! assert_eq!(corrector.correct("我在北車買了流奶"), "我在台北車站買了牛奶");
//! ```
//!
//! ## Layering
//!
//! - [`backend`] — per-language grapheme-to-phonetic conversion with a
//!   bounded memo cache. Expensive to initialise, one per process per
//!   language.
//! - [`engine`] — long-lived per-language factories that own a backend,
//!   tokenizer, rule tables, and fuzzy generator, and stamp out lightweight
//!   correctors.
//! - [`corrector`] — per-dictionary, cheap to build, immutable, and safe to
//!   share across threads.
//!
//! A [`router::LanguageRouter`] can segment mixed-script input so each
//! corrector only ever sees text it can match.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod corrector;
pub mod distance;
pub mod engine;
pub mod error;
pub mod events;
pub mod fuzzy;
pub mod index;
pub mod phonetic;
pub mod router;
pub mod term;
pub mod tokenizer;

pub mod backend;

#[cfg(feature = "serialization")]
pub mod serialization;

/// Common imports for convenient usage.
pub mod prelude {
    pub use crate::backend::{CacheStats, PhoneticBackend, PhoneticKey};
    pub use crate::config::{EngineOptions, FailPolicy, Language, Mode, PhoneticOverrides};
    pub use crate::corrector::{Corrector, CorrectorOptions};
    pub use crate::engine::CorrectorEngine;
    pub use crate::error::{PhonofixError, Result};
    pub use crate::events::{CorrectionEvent, EventBuffer, EventSink};
    pub use crate::router::LanguageRouter;
    pub use crate::term::{TermConfig, TermDict};

    #[cfg(feature = "mandarin")]
    pub use crate::engine::mandarin::MandarinEngine;

    #[cfg(feature = "english")]
    pub use crate::engine::english::EnglishEngine;

    #[cfg(feature = "japanese")]
    pub use crate::engine::japanese::JapaneseEngine;

    #[cfg(feature = "serialization")]
    pub use crate::serialization::term_dict_from_json;
}
