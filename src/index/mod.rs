//! Search indices used by the corrector.
//!
//! The exact-surface side of candidate generation is a multi-pattern
//! Aho–Corasick scan; the phonetic side lives in the corrector's fuzzy
//! buckets. Protected terms use a second, independent automaton.

pub mod aho_corasick;

pub use aho_corasick::{AhoCorasick, AhoMatch};
