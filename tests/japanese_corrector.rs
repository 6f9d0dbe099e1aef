//! End-to-end Japanese correction scenarios.

#![cfg(feature = "japanese")]

use phonofix::engine::japanese::JapaneseEngine;
use phonofix::engine::CorrectorEngine;
use phonofix::events::{CorrectionEvent, EventBuffer};
use phonofix::prelude::*;
use std::sync::Arc;

fn corrector(dict: TermDict) -> phonofix::corrector::Corrector {
    JapaneseEngine::new()
        .create_corrector(&dict, CorrectorOptions::default())
        .unwrap()
}

#[test]
fn scenario_romaji_asr_to_katakana() {
    let dict = TermDict::from_aliases([("アスピリン", vec!["asupirin"])]);
    let corrector = corrector(dict);

    assert_eq!(
        corrector.correct("頭が痛いのでasupirinを飲みました"),
        "頭が痛いのでアスピリンを飲みました"
    );
}

#[test]
fn romanisation_variants_collapse() {
    // Kunrei-shiki input spelling matches the Hepburn-keyed target.
    let dict = TermDict::from_aliases([("アスピリン", vec!["asupirin"])]);
    let corrector = corrector(dict);
    assert_eq!(corrector.correct("asupilinを飲む"), "アスピリンを飲む");
}

#[test]
fn long_vowel_alternation_matches() {
    let dict = TermDict::from_canonicals(["東京"]);
    let corrector = corrector(dict);
    assert_eq!(corrector.correct("toukyouに行く"), "東京に行く");
}

#[test]
fn canonical_is_idempotent() {
    let dict = TermDict::from_aliases([("アスピリン", vec!["asupirin"])]);
    let corrector = corrector(dict);
    assert_eq!(
        corrector.correct("アスピリンを飲みました"),
        "アスピリンを飲みました"
    );
}

#[test]
fn protected_term_survives() {
    let dict = TermDict::from_aliases([("アスピリン", vec!["asupirin"])]);
    let engine = JapaneseEngine::new();
    let buffer = Arc::new(EventBuffer::new());
    let corrector = engine
        .create_corrector(
            &dict,
            CorrectorOptions {
                protected_terms: vec!["asupirin".into()],
                observer: Some(buffer.clone() as Arc<dyn EventSink>),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(corrector.correct("asupirinを飲む"), "asupirinを飲む");
    assert!(buffer
        .snapshot()
        .iter()
        .all(|e| !matches!(e, CorrectionEvent::Replacement { .. })));
}

#[test]
fn unrelated_text_untouched() {
    let dict = TermDict::from_aliases([("アスピリン", vec!["asupirin"])]);
    let corrector = corrector(dict);
    assert_eq!(corrector.correct("今日は天気がいい"), "今日は天気がいい");
}
