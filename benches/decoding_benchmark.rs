#[macro_use]
extern crate criterion;

use criterion::{black_box, Criterion};
use ltp::pipelines::decoding::{eisner, get_entities, viterbi_decode_postprocess};
use std::time::{Duration, Instant};

static BATCH_SIZE: usize = 8;
static NODES: usize = 48;
static LABELS: usize = 32;

fn arc_scores(batch: usize, nodes: usize) -> Vec<f32> {
    // deterministic pseudo-random scores
    (0..batch * nodes * nodes)
        .map(|index| ((index * 7919) % 1009) as f32 / 1009.0)
        .collect()
}

fn eisner_decode(iters: u64, scores: &[f32], lengths: &[usize]) -> Duration {
    let mut duration = Duration::new(0, 0);
    for _i in 0..iters {
        let start = Instant::now();
        let _ = black_box(eisner(scores, lengths, true));
        duration = duration.saturating_add(start.elapsed());
    }
    duration
}

fn viterbi_decode(iters: u64, history: &[i64], last_tags: &[i64], lengths: &[usize]) -> Duration {
    let mut duration = Duration::new(0, 0);
    for _i in 0..iters {
        let start = Instant::now();
        let _ = black_box(viterbi_decode_postprocess(
            history, last_tags, lengths, LABELS,
        ));
        duration = duration.saturating_add(start.elapsed());
    }
    duration
}

fn bench_decoding(c: &mut Criterion) {
    //    Define input
    let lengths = (0..BATCH_SIZE)
        .map(|b| NODES - 4 * b)
        .collect::<Vec<usize>>();
    let scores = arc_scores(BATCH_SIZE, NODES);

    let words = lengths.iter().map(|length| length - 1).collect::<Vec<usize>>();
    let max_words = NODES - 1;
    let sequences = words.iter().sum::<usize>();
    let history = (0..(max_words - 1) * sequences * LABELS)
        .map(|index| (index % LABELS) as i64)
        .collect::<Vec<i64>>();
    let last_tags = (0..sequences)
        .map(|index| (index % LABELS) as i64)
        .collect::<Vec<i64>>();

    let tags = (0..512)
        .map(|index| match index % 5 {
            0 => "B-Ni",
            1 | 2 => "I-Ni",
            3 => "E-Ni",
            _ => "O",
        })
        .collect::<Vec<&str>>();

    c.bench_function("Eisner", |b| {
        b.iter_custom(|iters| eisner_decode(iters, &scores, &lengths))
    });
    c.bench_function("Viterbi back-tracking", |b| {
        b.iter_custom(|iters| viterbi_decode(iters, &history, &last_tags, &words))
    });
    c.bench_function("Entities", |b| b.iter(|| get_entities(black_box(tags.as_slice()))));
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(20);
    targets = bench_decoding
}

criterion_main!(benches);
