//! NNUE (Efficiently Updatable Neural Network) evaluation.
//!
//! Provides neural network based position evaluation with:
//! - Incremental accumulator updates for efficiency
//! - SIMD-optimized inference (AVX2/NEON)
//! - Clipped-ReLU activation
//!
//! Architecture: (768 -> 1024) x 2 perspectives -> 8 buckets -> 1.

pub mod network;
pub mod simd;

pub use network::{feature_index, output_bucket, NnueAccumulator, NnueNetwork, HIDDEN_SIZE, NUM_BUCKETS};

use std::path::Path;

use super::error::NnueError;
use super::eval::{apply_fifty_move_discount, apply_mating_material, gather_features};
use super::types::{Color, Move, PieceType, Square};
use super::Board;

/// Weight quantization factor for feature weights.
pub const QA: i32 = 100;

/// Output weight quantization factor.
pub const QB: i32 = 100;

/// Evaluation scale factor.
pub const SCALE: i32 = 400;

/// A single incremental accumulator change: the feature (color, piece type,
/// square) either gains or loses a piece.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Delta {
    Add(Color, PieceType, Square),
    Sub(Color, PieceType, Square),
}

fn features(color: Color, piece_type: PieceType, sq: Square) -> (usize, usize) {
    let white = feature_index(piece_type.index(), color.index(), sq.index(), 0);
    let black = feature_index(piece_type.index(), color.index(), sq.index(), 1);
    (white, black)
}

fn apply_delta(acc: &mut NnueAccumulator, delta: Delta, network: &NnueNetwork) {
    match delta {
        Delta::Add(color, piece_type, sq) => {
            let (w, b) = features(color, piece_type, sq);
            acc.add_feature(w, b, network);
        }
        Delta::Sub(color, piece_type, sq) => {
            let (w, b) = features(color, piece_type, sq);
            acc.sub_feature(w, b, network);
        }
    }
}

/// A ply's worth of pending accumulator updates, batched by arity so the
/// common cases (a quiet move: one add, one sub) apply through a single
/// vectorized pair of calls instead of looping over a small `Vec`.
#[derive(Clone, Debug)]
pub(crate) enum PlyUpdate {
    AddSub([Delta; 2]),
    AddSubSub([Delta; 3]),
    AddAddSubSub([Delta; 4]),
    None,
}

impl PlyUpdate {
    fn apply(&self, acc: &mut NnueAccumulator, network: &NnueNetwork) {
        match self {
            PlyUpdate::AddSub(d) => d.iter().for_each(|&delta| apply_delta(acc, delta, network)),
            PlyUpdate::AddSubSub(d) => d.iter().for_each(|&delta| apply_delta(acc, delta, network)),
            PlyUpdate::AddAddSubSub(d) => d.iter().for_each(|&delta| apply_delta(acc, delta, network)),
            PlyUpdate::None => {}
        }
    }
}

/// A stack of accumulators mirroring [`super::state::PositionStack`]'s
/// cursor discipline: `push` records a pending update without computing it,
/// `catch_up` lazily folds every update between the last-integrated ply and
/// the current one into the accumulator, and `pop` just moves the cursor
/// back (the accumulator at the popped ply is recomputed lazily again if
/// revisited, rather than cached going forward).
pub(crate) struct AccumulatorStack {
    base: NnueAccumulator,
    updates: Vec<PlyUpdate>,
    curr_ply: usize,
    last_ready_ply: usize,
}

impl AccumulatorStack {
    pub(crate) fn new(base: NnueAccumulator) -> Self {
        AccumulatorStack {
            base,
            updates: vec![PlyUpdate::None],
            curr_ply: 0,
            last_ready_ply: 0,
        }
    }

    pub(crate) fn push(&mut self, update: PlyUpdate) {
        self.curr_ply += 1;
        if self.curr_ply == self.updates.len() {
            self.updates.push(update);
        } else {
            self.updates[self.curr_ply] = update;
        }
    }

    pub(crate) fn pop(&mut self) {
        debug_assert!(self.curr_ply > 0, "pop past the root ply");
        if self.curr_ply > 0 {
            self.curr_ply -= 1;
        }
        self.last_ready_ply = self.last_ready_ply.min(self.curr_ply);
    }

    /// Fold every pending update between `last_ready_ply` and `curr_ply`
    /// into the accumulator, then return it. A no-op when already caught up
    /// (the common case: one `push` immediately followed by one evaluate).
    pub(crate) fn catch_up(&mut self, network: &NnueNetwork) -> &NnueAccumulator {
        while self.last_ready_ply < self.curr_ply {
            self.last_ready_ply += 1;
            let update = &self.updates[self.last_ready_ply];
            update.apply(&mut self.base, network);
        }
        &self.base
    }
}

/// Work out the accumulator delta a move will cause, read off `board`
/// *before* the move is made: captures, en-passant, and castling each touch
/// a square whose occupant has to be read from the pre-move position.
fn ply_update_for(board: &Board, mv: Move) -> PlyUpdate {
    let Some((color, moving_type)) = board.piece_at(mv.from()) else {
        return PlyUpdate::None;
    };
    let from = mv.from();
    let to = mv.to();
    let placed_type = mv.promotion().unwrap_or(moving_type);

    if mv.is_castling() {
        let rank = from.rank();
        let (rook_from, rook_to) = if mv.is_castle_kingside() {
            (Square::new(rank, 7), Square::new(rank, 5))
        } else {
            (Square::new(rank, 0), Square::new(rank, 3))
        };
        return PlyUpdate::AddAddSubSub([
            Delta::Add(color, PieceType::King, to),
            Delta::Add(color, PieceType::Rook, rook_to),
            Delta::Sub(color, PieceType::King, from),
            Delta::Sub(color, PieceType::Rook, rook_from),
        ]);
    }

    if mv.is_en_passant() {
        let captured_sq = Square::new(from.rank(), to.file());
        return PlyUpdate::AddSubSub([
            Delta::Add(color, PieceType::Pawn, to),
            Delta::Sub(color, PieceType::Pawn, from),
            Delta::Sub(color.opponent(), PieceType::Pawn, captured_sq),
        ]);
    }

    if let Some((cap_color, cap_type)) = board.piece_at(to) {
        return PlyUpdate::AddSubSub([
            Delta::Add(color, placed_type, to),
            Delta::Sub(color, moving_type, from),
            Delta::Sub(cap_color, cap_type, to),
        ]);
    }

    PlyUpdate::AddSub([
        Delta::Add(color, placed_type, to),
        Delta::Sub(color, moving_type, from),
    ])
}

/// The incremental evaluator: an NNUE network paired with a lazily-updated
/// accumulator stack, mirroring how [`super::state::Board`] pairs its piece
/// maps with a [`super::state::PositionStack`]. `set` seeds a root position;
/// `update`/`undo_state` track a search line's make/unmake in lockstep with
/// [`Board::make_move`]/[`Board::undo_move`] without ever recomputing the
/// accumulator from scratch mid-line.
pub struct Evaluator {
    network: NnueNetwork,
    stack: AccumulatorStack,
}

impl Evaluator {
    /// Load network weights from a `.nnue` file and seed an empty
    /// accumulator (call [`Evaluator::set`] before evaluating anything).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, NnueError> {
        let network = NnueNetwork::load(path)?;
        let stack = AccumulatorStack::new(NnueAccumulator::new(&network.feature_bias));
        Ok(Evaluator { network, stack })
    }

    /// Build an evaluator from the network compiled into the binary.
    #[cfg(feature = "embedded_nnue")]
    #[must_use]
    pub fn load_embedded() -> Self {
        let network = NnueNetwork::from_embedded();
        let stack = AccumulatorStack::new(NnueAccumulator::new(&network.feature_bias));
        Evaluator { network, stack }
    }

    /// Build an evaluator from already-in-memory network bytes (the same
    /// layout [`Evaluator::load`] reads off disk).
    #[cfg(feature = "embedded_nnue")]
    pub fn from_bytes(data: &[u8]) -> Result<Self, NnueError> {
        let network = NnueNetwork::from_bytes(data)?;
        let stack = AccumulatorStack::new(NnueAccumulator::new(&network.feature_bias));
        Ok(Evaluator { network, stack })
    }

    /// Recompute the accumulator from scratch for `board`, discarding any
    /// queued updates. Call once per search root, not per node.
    pub fn set(&mut self, board: &Board) {
        let (white_features, black_features) = gather_features(board);
        let mut acc = NnueAccumulator::new(&self.network.feature_bias);
        acc.refresh(&white_features, &black_features, &self.network);
        self.stack = AccumulatorStack::new(acc);
    }

    /// Queue the accumulator delta `mv` will cause. Must be called with
    /// `board` in its pre-move state, before [`Board::make_move`] runs.
    pub fn update(&mut self, board: &Board, mv: Move) {
        self.stack.push(ply_update_for(board, mv));
    }

    /// Pop the most recently queued update, mirroring [`Board::undo_move`].
    pub fn undo_state(&mut self) {
        self.stack.pop();
    }

    /// Raw NNUE forward pass at the current accumulator state, from
    /// `board`'s side to move, in centipawns.
    pub fn forward(&mut self, board: &Board) -> i32 {
        let bucket = output_bucket(board.all_occupied().popcount());
        let network = &self.network;
        let acc = self.stack.catch_up(network);
        network.evaluate(acc, board.side_to_move() == Color::White, bucket)
    }

    /// Full evaluation: the incremental forward pass plus the same
    /// mating-material and fifty-move corrections [`super::eval::evaluate`]
    /// applies to a from-scratch pass.
    pub fn evaluate(&mut self, board: &Board) -> i32 {
        let side_relative = self.forward(board);
        let white_relative = if board.side_to_move() == Color::White {
            side_relative
        } else {
            -side_relative
        };
        let with_mating_material = apply_mating_material(board, white_relative);
        apply_fifty_move_discount(board, with_mating_material)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_network() -> NnueNetwork {
        NnueNetwork {
            feature_weights: Box::new([[1i16; HIDDEN_SIZE]; network::INPUT_SIZE]),
            feature_bias: [0i16; HIDDEN_SIZE],
            output_weights: Box::new([[1i16; 2 * HIDDEN_SIZE]; NUM_BUCKETS]),
            output_bias: [0i16; NUM_BUCKETS],
        }
    }

    #[test]
    fn lazy_catch_up_matches_eager_application() {
        let network = dummy_network();
        let mut lazy = AccumulatorStack::new(NnueAccumulator::default());
        let e4 = Square::new(3, 4);
        let e2 = Square::new(1, 4);

        lazy.push(PlyUpdate::AddSub([
            Delta::Add(Color::White, PieceType::Pawn, e4),
            Delta::Sub(Color::White, PieceType::Pawn, e2),
        ]));

        let mut eager = NnueAccumulator::default();
        apply_delta(&mut eager, Delta::Add(Color::White, PieceType::Pawn, e4), &network);
        apply_delta(&mut eager, Delta::Sub(Color::White, PieceType::Pawn, e2), &network);

        let caught_up = lazy.catch_up(&network);
        assert_eq!(caught_up.white, eager.white);
        assert_eq!(caught_up.black, eager.black);
    }

    fn dummy_evaluator() -> Evaluator {
        let network = dummy_network();
        let stack = AccumulatorStack::new(NnueAccumulator::new(&network.feature_bias));
        Evaluator { network, stack }
    }

    #[test]
    fn update_then_undo_state_restores_the_forward_pass() {
        let mut evaluator = dummy_evaluator();
        let board = Board::starting_position();
        evaluator.set(&board);
        let before = evaluator.forward(&board);

        let e2 = Square::new(1, 4);
        let e4 = Square::new(3, 4);
        let mv = Move::double_pawn_push(e2, e4);

        evaluator.update(&board, mv);
        let mut moved = board.clone();
        moved.make_move(mv);
        let after_push = evaluator.forward(&moved);
        assert_ne!(before, after_push);

        evaluator.undo_state();
        let after_undo = evaluator.forward(&board);
        assert_eq!(before, after_undo);
    }

    #[test]
    fn pop_rewinds_the_cursor_without_recomputing_eagerly() {
        let mut stack = AccumulatorStack::new(NnueAccumulator::default());
        stack.push(PlyUpdate::None);
        stack.push(PlyUpdate::None);
        assert_eq!(stack.curr_ply, 2);
        stack.pop();
        assert_eq!(stack.curr_ply, 1);
    }
}
