use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Bencher, Criterion};
use eval_lib::{
    evaluation::{eval_board, trace_eval},
    tables::{material::Material, pawn_table::PawnTable},
};
use pleco::Board;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

fn bench_eval_fresh_tables(b: &mut Bencher, boards: &[Board]) {
    b.iter_batched(
        || {
            let tp: PawnTable = black_box(PawnTable::new());
            let tm: Material = black_box(Material::new());
            (tp, tm)
        },
        |(mut pawn_table, mut material)| {
            for board in boards.iter() {
                black_box(eval_board(board, &mut pawn_table, &mut material));
            }
        },
        BatchSize::PerIteration,
    );
}

fn bench_eval_warm_tables(b: &mut Bencher, boards: &[Board]) {
    let mut pawn_table = PawnTable::new();
    let mut material = Material::new();
    b.iter(|| {
        for board in boards.iter() {
            black_box(eval_board(board, &mut pawn_table, &mut material));
        }
    });
}

/// Positions reached by random play from the start, skipping any in check.
fn random_boards(count: usize, seed: u64) -> Vec<Board> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut boards = Vec::with_capacity(count);
    let mut board = Board::start_pos();
    while boards.len() < count {
        let moves = board.generate_moves();
        match moves.choose(&mut rng) {
            Some(mv) if board.moves_played() < 120 => board.apply_move(*mv),
            _ => board = Board::start_pos(),
        }
        if !board.in_check() {
            boards.push(board.shallow_clone());
        }
    }
    boards
}

fn bench_evaluations(c: &mut Criterion) {
    let boards: Vec<Board> = NON_CHECK_FENS
        .iter()
        .map(|b| Board::from_fen(b).unwrap())
        .collect();

    c.bench_function("Classical Evaluation", |b| bench_eval_fresh_tables(b, &boards));
    c.bench_function("Classical Evaluation Warm Tables", |b| bench_eval_warm_tables(b, &boards));

    let random = random_boards(100, 0xC0FFEE);
    c.bench_function("Random Playout Evaluation", |b| bench_eval_warm_tables(b, &random));

    c.bench_function("Trace Report", |b| {
        b.iter(|| black_box(trace_eval(&boards[1])))
    });
}

criterion_group!(name = eval_benches;
    config = Criterion::default()
       .sample_size(250)
       .warm_up_time(Duration::from_millis(40));
   targets = bench_evaluations
);

criterion_main!(eval_benches);

static NON_CHECK_FENS: [&str; 8] = [
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "3qkb1r/3ppp2/3r1np1/2Q4p/5P2/1P3B2/P1P1PP1P/R2NK2R b k - 0 22",
    "r1bqkbnr/ppppppp1/n7/3P2p1/Q4P2/2P5/PP2P1PP/RN2KBNR b KQkq - 2 6",
    "r2qkb2/1ppbpp2/p6r/3p4/6P1/1PP1P1QP/P2N1P2/RN2KB1R b KQq - 4 20",
    "r3k1nr/pp1n1pbp/1qp1p1p1/6B1/P2PP1P1/1Pp2N2/2P2P2/R2QKB1R b KQkq - 0 13",
    "r2qkbnr/pp2p1pp/2p1b3/3pNpB1/3P4/8/PP1NPPPP/R2QKB1R w KQkq - 2 8",
    "r1bqk2r/pppp3p/5b2/1P6/5p2/P5P1/1QP1P2P/RN2KB1R b KQkq - 2 16",
    "8/1R6/8/P3k3/1R6/P7/1KP2p2/6r1 b - - 5 43",
];
