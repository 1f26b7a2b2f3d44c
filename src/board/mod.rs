//! Chess board representation and game logic.
//!
//! Uses bitboards for efficient move generation, Static Exchange Evaluation,
//! and NNUE-based position evaluation. Supports full chess rules including
//! castling, en passant, and promotions.
//!
//! # Example
//! ```
//! use chess_core::board::{Board, GenMode, MoveList};
//!
//! let board = Board::starting_position();
//! let mut moves = MoveList::new();
//! board.generate(GenMode::Legal, &mut moves);
//! println!("Starting position has {} legal moves", moves.len());
//! ```

mod attack_tables;
mod error;
pub mod eval;
mod fen;
mod geometry;
mod make_unmake;
mod movegen;
pub mod nnue;
mod see;
mod select;
mod state;
mod types;

// Public API - types users need
pub use error::{FenError, MoveParseError, NnueError, SquareError};
pub use movegen::GenMode;
pub use select::{CascadeMode, Selector};
pub use state::Board;
pub use types::{
    Bitboard, CastlingRights, Color, Move, MoveList, MoveListIntoIter, Piece, PieceType, ScoredMove,
    Square,
};

pub(crate) use types::{
    bit_for_square, castle_bit, file_to_index, rank_to_index, CASTLE_BLACK_K, CASTLE_BLACK_Q,
    CASTLE_WHITE_K, CASTLE_WHITE_Q, EMPTY_MOVE, MAX_PLY, PROMOTION_PIECES,
};

/// Force construction of every lazily-built table this module owns:
/// attack tables and board-space geometry. Called once from
/// [`crate::initialize`].
pub(crate) fn force_init() {
    attack_tables::force_init();
    geometry::force_init();
}
