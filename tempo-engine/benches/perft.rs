use std::thread::available_parallelism;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use tempo_engine::perft::*;
use tempo_engine::*;

pub fn criterion_perft_small_benchmark(c: &mut Criterion) {
    // Setup
    let starting_game = Game::new();
    let num_threads = available_parallelism()
        .map(|inner| inner.get())
        .unwrap_or(1);

    // Benchmarks
    for (ply, expected) in [(1, 20), (2, 400), (3, 8_902)] {
        c.bench_function(&format!("start_position: perft({ply}) threads: 1"), |b| {
            b.iter(|| {
                let info = perft(black_box(&starting_game), black_box(ply), black_box(1));
                assert_eq!(info.nodes, expected);
            })
        });
        c.bench_function(
            &format!("start_position: perft({ply}) threads: {num_threads}"),
            |b| {
                b.iter(|| {
                    let info = perft(
                        black_box(&starting_game),
                        black_box(ply),
                        black_box(num_threads),
                    );
                    assert_eq!(info.nodes, expected);
                })
            },
        );
    }
}

/// Large number of positions to search, > 100,000
pub fn criterion_perft_large_benchmark(c: &mut Criterion) {
    // Setup
    let starting_game = Game::new();
    let num_threads = available_parallelism()
        .map(|inner| inner.get())
        .unwrap_or(1);

    c.bench_function(
        &format!("start_position: perft(4) threads: {num_threads}"),
        |b| {
            b.iter(|| {
                let info = perft(
                    black_box(&starting_game),
                    black_box(4),
                    black_box(num_threads),
                );
                assert_eq!(info.nodes, 197_281);
            })
        },
    );
}

criterion_group! {
    name = small_benches;
    config = Criterion::default().without_plots().sample_size(30);
    targets = criterion_perft_small_benchmark
}
criterion_group! {
    name = large_benches;
    config = Criterion::default().without_plots().sample_size(10);
    targets = criterion_perft_large_benchmark
}
criterion_main!(small_benches, large_benches);
