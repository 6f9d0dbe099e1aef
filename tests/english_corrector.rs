//! End-to-end English correction scenarios (built-in grapheme rules, so
//! the tests never depend on an installed espeak-ng).

#![cfg(feature = "english")]

use phonofix::engine::english::EnglishEngine;
use phonofix::engine::CorrectorEngine;
use phonofix::events::{CorrectionEvent, EventBuffer};
use phonofix::prelude::*;
use std::sync::Arc;

fn corrector(dict: TermDict) -> phonofix::corrector::Corrector {
    EnglishEngine::with_rules()
        .create_corrector(&dict, CorrectorOptions::default())
        .unwrap()
}

#[test]
fn scenario_phoneme_similar_and_syllable_split() {
    let dict = TermDict::from_aliases([
        ("TensorFlow", vec!["ten so floor"]),
        ("Python", vec!["Pyton"]),
    ]);
    let corrector = corrector(dict);

    assert_eq!(
        corrector.correct("I use Pyton to write ten so floor code"),
        "I use Python to write TensorFlow code"
    );
}

#[test]
fn canonical_is_left_alone() {
    let dict = TermDict::from_aliases([("Python", vec!["Pyton"])]);
    let corrector = corrector(dict);
    assert_eq!(
        corrector.correct("I use Python every day"),
        "I use Python every day"
    );
}

#[test]
fn fuzzy_spelling_without_explicit_alias() {
    // No alias supplied: the generated variants plus the phonetic window
    // matcher must still catch the near-spelling.
    let dict = TermDict::from_canonicals(["Python"]);
    let corrector = corrector(dict);
    assert_eq!(corrector.correct("I use pyton daily"), "I use Python daily");
}

#[test]
fn keyword_gate_requires_context() {
    let dict = TermDict::new().with(
        "SQL",
        TermConfig {
            aliases: vec!["sequel".into()],
            keywords: vec!["database".into(), "query".into()],
            ..Default::default()
        },
    );
    let corrector = corrector(dict);

    assert_eq!(
        corrector.correct("the sequel was better than the original movie"),
        "the sequel was better than the original movie"
    );
    assert_eq!(
        corrector.correct("query the database with sequel"),
        "query the database with SQL"
    );
}

#[test]
fn exclusion_beats_keywords() {
    let dict = TermDict::new().with(
        "SQL",
        TermConfig {
            aliases: vec!["sequel".into()],
            keywords: vec!["database".into()],
            exclude_when: vec!["movie".into()],
            ..Default::default()
        },
    );
    let corrector = corrector(dict);

    assert_eq!(
        corrector.correct("a database movie sequel"),
        "a database movie sequel"
    );
}

#[test]
fn whitespace_is_reconstructed_exactly() {
    let dict = TermDict::from_aliases([("TensorFlow", vec!["ten so floor"])]);
    let corrector = corrector(dict);
    assert_eq!(
        corrector.correct("before ten so floor after"),
        "before TensorFlow after"
    );
}

#[test]
fn full_context_gates_beyond_segment() {
    let dict = TermDict::new().with(
        "SQL",
        TermConfig {
            aliases: vec!["sequel".into()],
            keywords: vec!["database".into()],
            ..Default::default()
        },
    );
    let corrector = corrector(dict);

    // The segment alone has no keyword; the surrounding context does.
    assert_eq!(
        corrector.correct_with("use sequel", Some("我的database註記 use sequel"), false),
        "use SQL"
    );
}

#[test]
fn events_carry_alias_and_canonical() {
    let dict = TermDict::from_aliases([("Python", vec!["Pyton"])]);
    let engine = EnglishEngine::with_rules();
    let buffer = Arc::new(EventBuffer::new());
    let corrector = engine
        .create_corrector(
            &dict,
            CorrectorOptions {
                observer: Some(buffer.clone() as Arc<dyn EventSink>),
                ..Default::default()
            },
        )
        .unwrap();

    corrector.correct("Pyton rocks");
    let events = buffer.snapshot();
    assert_eq!(events.len(), 1);
    match &events[0] {
        CorrectionEvent::Replacement {
            original,
            replacement,
            alias,
            canonical,
            ..
        } => {
            assert_eq!(original, "Pyton");
            assert_eq!(replacement, "Python");
            assert_eq!(canonical, "Python");
            assert_eq!(alias, "Pyton");
        }
        other => panic!("expected a replacement event, got {other:?}"),
    }
}

#[test]
fn near_miss_beyond_tolerance_is_rejected(){
    let dict = TermDict::from_canonicals(["Python"]);
    let corrector = corrector(dict);
    // Shares letters but not sounds.
    assert_eq!(corrector.correct("a phantom appears"), "a phantom appears");
}
