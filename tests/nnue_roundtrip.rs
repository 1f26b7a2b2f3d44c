//! The Evaluator's incremental accumulator must agree with itself across a
//! push/make then unmake/undo round trip: playing a move and taking it back
//! has to land on exactly the forward-pass value it started from.

use chess_core::board::nnue::Evaluator;
use chess_core::board::{Board, Move, Square};

fn sample_bytes() -> Vec<u8> {
    use chess_core::board::nnue::{HIDDEN_SIZE, NUM_BUCKETS};
    let input_size = 768usize;
    let output_width = 2 * HIDDEN_SIZE;
    let mut bytes = Vec::new();
    for i in 0..(input_size * HIDDEN_SIZE) {
        bytes.extend_from_slice(&((i % 37) as i16 - 18).to_le_bytes());
    }
    for i in 0..HIDDEN_SIZE {
        bytes.extend_from_slice(&((i % 11) as i16).to_le_bytes());
    }
    for i in 0..(NUM_BUCKETS * output_width) {
        bytes.extend_from_slice(&((i % 23) as i16 - 11).to_le_bytes());
    }
    for i in 0..NUM_BUCKETS {
        bytes.extend_from_slice(&(i as i16).to_le_bytes());
    }
    bytes
}

#[test]
#[cfg(feature = "embedded_nnue")]
fn set_update_undo_round_trip_matches_forward() {
    chess_core::initialize();
    let bytes = sample_bytes();
    let mut evaluator = Evaluator::from_bytes(&bytes).unwrap();

    let mut board = Board::starting_position();
    evaluator.set(&board);
    let root_value = evaluator.forward(&board);

    let e2 = Square::new(1, 4);
    let e4 = Square::new(3, 4);
    let white_push = Move::double_pawn_push(e2, e4);
    evaluator.update(&board, white_push);
    board.make_move(white_push);
    evaluator.forward(&board);

    let e7 = Square::new(6, 4);
    let e5 = Square::new(4, 4);
    let black_push = Move::double_pawn_push(e7, e5);
    evaluator.update(&board, black_push);
    board.make_move(black_push);
    evaluator.forward(&board);

    board.undo_move();
    evaluator.undo_state();
    board.undo_move();
    evaluator.undo_state();

    assert_eq!(evaluator.forward(&board), root_value);
}

#[test]
#[cfg(feature = "embedded_nnue")]
fn embedded_default_network_loads_and_evaluates() {
    chess_core::initialize();
    let mut evaluator = Evaluator::load_embedded();
    let board = Board::starting_position();
    evaluator.set(&board);
    let score = evaluator.evaluate(&board);
    assert!(score.abs() < 10_000);
}
