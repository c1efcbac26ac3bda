use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tile_match::core::generator::{self, TileSource};
use tile_match::core::{find_matches, find_special_matches};
use tile_match::engine::{has_valid_moves, GameRun, LevelConfig};
use tile_match::types::TileKind;

fn bench_generate_board(c: &mut Criterion) {
    let kinds = &TileKind::ALL[..5];

    c.bench_function("generate_8x8", |b| {
        let mut source = TileSource::new(12345);
        b.iter(|| {
            generator::generate(black_box(8), black_box(8), kinds, &mut source);
        })
    });
}

fn bench_find_matches(c: &mut Criterion) {
    let kinds = &TileKind::ALL[..5];
    let mut source = TileSource::new(12345);
    let board = generator::generate(8, 8, kinds, &mut source);

    c.bench_function("find_matches_8x8", |b| {
        b.iter(|| {
            find_matches(black_box(&board));
        })
    });
}

fn bench_find_special_matches(c: &mut Criterion) {
    let kinds = &TileKind::ALL[..5];
    let mut source = TileSource::new(12345);
    let board = generator::generate(8, 8, kinds, &mut source);

    c.bench_function("find_special_matches_8x8", |b| {
        b.iter(|| {
            find_special_matches(black_box(&board));
        })
    });
}

fn bench_has_valid_moves(c: &mut Criterion) {
    let kinds = &TileKind::ALL[..5];
    let mut source = TileSource::new(12345);
    let board = generator::generate(8, 8, kinds, &mut source);

    c.bench_function("has_valid_moves_8x8", |b| {
        b.iter(|| {
            has_valid_moves(black_box(&board));
        })
    });
}

fn bench_start_run(c: &mut Criterion) {
    c.bench_function("start_run", |b| {
        let mut seed = 1u32;
        b.iter(|| {
            seed = seed.wrapping_add(1);
            GameRun::start(LevelConfig::practice(), black_box(seed));
        })
    });
}

criterion_group!(
    benches,
    bench_generate_board,
    bench_find_matches,
    bench_find_special_matches,
    bench_has_valid_moves,
    bench_start_run
);
criterion_main!(benches);
