//! Corrector build and correction throughput.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use phonofix::engine::CorrectorEngine;
use phonofix::prelude::*;

fn bench_create_corrector(c: &mut Criterion) {
    let engine = MandarinEngine::new();
    // Warm the backend so the bench measures index assembly, not cache
    // misses.
    let _ = engine.create_corrector(
        &TermDict::from_canonicals(["台北車站", "牛奶", "然後"]),
        CorrectorOptions::default(),
    );

    c.bench_function("create_corrector/3_terms", |b| {
        b.iter(|| {
            let corrector = engine
                .create_corrector(
                    &TermDict::from_canonicals(["台北車站", "牛奶", "然後"]),
                    CorrectorOptions::default(),
                )
                .unwrap();
            black_box(corrector.target_count())
        })
    });
}

fn bench_correct(c: &mut Criterion) {
    let engine = MandarinEngine::new();
    let corrector = engine
        .create_corrector(
            &TermDict::from_canonicals(["台北車站", "牛奶", "然後"]),
            CorrectorOptions::default(),
        )
        .unwrap();

    c.bench_function("correct/short_sentence", |b| {
        b.iter(|| black_box(corrector.correct("我在北車買了流奶,蘭後回家")))
    });

    let long_input = "我在北車買了流奶,蘭後回家。".repeat(50);
    c.bench_function("correct/long_input", |b| {
        b.iter(|| black_box(corrector.correct(&long_input)))
    });
}

criterion_group!(benches, bench_create_corrector, bench_correct);
criterion_main!(benches);
