//! Static Exchange Evaluation scenarios exercised at the crate boundary
//! (the unit tests alongside `see.rs` cover the algorithm's internals; these
//! confirm the public `see` API reproduces the three binding fixture
//! positions, move, and exchange-value outcome exactly).

use chess_core::board::{Board, Move, Square};

#[test]
fn pawn_takes_undefended_pawn_wins_exactly_a_pawn() {
    chess_core::initialize();
    let board = Board::from_fen("1k1r4/1pp4p/p7/4p3/8/P5P1/1PP4P/2K1R3 w - - 0 1").unwrap();
    let mv = Move::capture(Square::new(0, 4), Square::new(4, 4));
    assert_eq!(board.see(mv), 125);
}

#[test]
fn knight_recaptures_a_pawn_grab_at_a_net_loss() {
    chess_core::initialize();
    let board = Board::from_fen("1k1r3q/1ppn3p/p4b2/4p3/8/P2N2P1/1PP1R1BP/2K1Q3 w - - 0 1").unwrap();
    let mv = Move::capture(Square::new(2, 3), Square::new(4, 4));
    assert_eq!(board.see(mv), -313);
}

#[test]
fn rook_takes_rook_on_an_open_file_wins_a_rook() {
    chess_core::initialize();
    let board = Board::from_fen("4r1k1/pp3ppp/2pb1B2/3p1b2/3P4/1BN4P/PPP2PP1/4R1K1 b - - 0 17").unwrap();
    let mv = Move::capture(Square::new(7, 4), Square::new(0, 4));
    assert_eq!(board.see(mv), 619);
}
