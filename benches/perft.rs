use criterion::{criterion_group, criterion_main, Criterion};
use tessera::move_generator::legal_moves;
use tessera::position::Position;
use tessera::search::{search, SearchOptions};

// A pure perft function, with no node counting, simply apply and
// move generation
fn perft(position: &Position, depth: u64) {
    if depth == 0 {
        return;
    }
    for m in &legal_moves(position) {
        perft(&position.apply(*m), depth - 1);
    }
}

fn perft_bench(c: &mut Criterion) {
    // The positions are taken from the chess programming wiki
    // https://www.chessprogramming.org/Perft_Results
    let mut position = Position::startpos();
    c.bench_function("perft initial 4", |b| b.iter(|| perft(&position, 4)));
    position = Position::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1").unwrap();
    c.bench_function("perft kiwipete 3", |b| b.iter(|| perft(&position, 3)));
    position = Position::from_fen("r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10").unwrap();
    c.bench_function("perft alternative 3", |b| b.iter(|| perft(&position, 3)));
}

fn search_bench(c: &mut Criterion) {
    let position = Position::startpos();
    let mut options = SearchOptions::default();
    options.set_depth(3);
    c.bench_function("search initial 3", |b| b.iter(|| search(&position, &options)));
    options.set_threads(num_cpus::get());
    c.bench_function("search initial 3 parallel", |b| b.iter(|| search(&position, &options)));
}

criterion_group!(benches, perft_bench, search_bench);
criterion_main!(benches);
