//! The position hash must be maintained incrementally across make/unmake,
//! agree for transposing move orders, and restore exactly on undo.

use chess_core::board::{Board, Move, Square};

#[test]
fn undo_restores_the_exact_hash() {
    chess_core::initialize();
    let mut board = Board::starting_position();
    let before = board.hash();

    let e2 = Square::new(1, 4);
    let e4 = Square::new(3, 4);
    board.make_move(Move::double_pawn_push(e2, e4));
    assert_ne!(board.hash(), before);

    board.undo_move();
    assert_eq!(board.hash(), before);
}

#[test]
fn transposing_move_orders_reach_the_same_hash() {
    chess_core::initialize();
    let mut via_knights_first = Board::starting_position();
    let mut via_knights_second = Board::starting_position();

    let g1 = Square::new(0, 6);
    let f3 = Square::new(2, 5);
    let g8 = Square::new(7, 6);
    let f6 = Square::new(5, 5);
    let b1 = Square::new(0, 1);
    let c3 = Square::new(2, 2);
    let b8 = Square::new(7, 1);
    let c6 = Square::new(5, 2);

    via_knights_first.make_move(Move::quiet(g1, f3));
    via_knights_first.make_move(Move::quiet(g8, f6));
    via_knights_first.make_move(Move::quiet(b1, c3));
    via_knights_first.make_move(Move::quiet(b8, c6));

    via_knights_second.make_move(Move::quiet(b1, c3));
    via_knights_second.make_move(Move::quiet(b8, c6));
    via_knights_second.make_move(Move::quiet(g1, f3));
    via_knights_second.make_move(Move::quiet(g8, f6));

    assert_eq!(via_knights_first.hash(), via_knights_second.hash());
}

#[test]
fn full_game_round_trip_restores_starting_hash() {
    chess_core::initialize();
    let mut board = Board::starting_position();
    let start_hash = board.hash();

    let moves = [
        Move::double_pawn_push(Square::new(1, 4), Square::new(3, 4)), // e4
        Move::double_pawn_push(Square::new(6, 4), Square::new(4, 4)), // e5
        Move::quiet(Square::new(0, 6), Square::new(2, 5)),            // Nf3
        Move::quiet(Square::new(7, 1), Square::new(5, 2)),            // Nc6
    ];

    for mv in moves {
        board.make_move(mv);
    }
    for _ in moves {
        board.undo_move();
    }

    assert_eq!(board.hash(), start_hash);
}
