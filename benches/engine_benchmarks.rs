//! Benchmarks for the engine core: make/unmake throughput, move generation,
//! and NNUE forward-pass evaluation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use chess_core::board::eval::evaluate;
use chess_core::board::nnue::NnueNetwork;
use chess_core::board::{Board, GenMode, MoveList};

fn positions() -> [(&'static str, &'static str); 3] {
    [
        (
            "startpos",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        ),
        (
            "middlegame",
            "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
        ),
        (
            "kiwipete",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        ),
    ]
}

fn bench_movegen(c: &mut Criterion) {
    chess_core::initialize();
    let mut group = c.benchmark_group("movegen");
    for (name, fen) in positions() {
        let board = Board::from_fen(fen).unwrap();
        group.bench_with_input(BenchmarkId::new("legal", name), &board, |b, board| {
            b.iter(|| {
                let mut list = MoveList::new();
                board.generate(GenMode::Legal, &mut list);
                black_box(list.len())
            })
        });
    }
    group.finish();
}

fn bench_make_unmake(c: &mut Criterion) {
    chess_core::initialize();
    let mut group = c.benchmark_group("make_unmake");
    for (name, fen) in positions() {
        group.bench_with_input(BenchmarkId::new("roundtrip", name), &fen, |b, &fen| {
            let mut board = Board::from_fen(fen).unwrap();
            let mut list = MoveList::new();
            board.generate(GenMode::Legal, &mut list);
            let mv = *list.first().expect("position has at least one legal move");
            b.iter(|| {
                board.make_move(mv);
                board.undo_move();
            })
        });
    }
    group.finish();
}

fn bench_nnue_forward(c: &mut Criterion) {
    chess_core::initialize();
    let network = NnueNetwork::from_embedded();
    let mut group = c.benchmark_group("nnue_forward");
    for (name, fen) in positions() {
        let board = Board::from_fen(fen).unwrap();
        group.bench_with_input(BenchmarkId::new("evaluate", name), &board, |b, board| {
            b.iter(|| black_box(evaluate(board, &network)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_movegen, bench_make_unmake, bench_nnue_forward);
criterion_main!(benches);
