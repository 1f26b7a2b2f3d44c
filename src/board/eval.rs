//! Evaluator glue: turns the raw NNUE forward pass into a final centipawn
//! score, layering on two corrections the network itself knows nothing
//! about — a corner-squeeze bonus for two-sided mating material, and a
//! fifty-move-clock discount that pulls drawish positions toward zero.

use super::nnue::{feature_index, output_bucket, NnueAccumulator, NnueNetwork};
use super::types::{Color, PieceType};
use super::Board;

/// Centipawn push applied at the tightest corner confinement (king pinned
/// into a corner square) for an otherwise-winning material advantage that
/// the network alone tends to underweight. Scaled down linearly as the
/// weaker king gets further from a corner.
const CORNER_SQUEEZE_BONUS: i32 = 200;

pub(crate) fn gather_features(board: &Board) -> (Vec<usize>, Vec<usize>) {
    let mut white_features = Vec::with_capacity(32);
    let mut black_features = Vec::with_capacity(32);
    for color in [Color::White, Color::Black] {
        for piece_type in PieceType::ALL {
            for sq in board.bitboard(color, piece_type).iter() {
                white_features.push(feature_index(piece_type.index(), color.index(), sq.index(), 0));
                black_features.push(feature_index(piece_type.index(), color.index(), sq.index(), 1));
            }
        }
    }
    (white_features, black_features)
}

/// Raw NNUE forward pass on the current position, from the side to move's
/// perspective, in centipawns. Recomputes the accumulator from scratch —
/// callers making many evaluations along a search line should prefer an
/// [`super::nnue::AccumulatorStack`] instead.
#[must_use]
pub fn nnue_forward(board: &Board, network: &NnueNetwork) -> i32 {
    let (white_features, black_features) = gather_features(board);
    let mut acc = NnueAccumulator::new(&network.feature_bias);
    acc.refresh(&white_features, &black_features, network);

    let bucket = output_bucket(board.all_occupied().popcount());
    network.evaluate(&acc, board.side_to_move() == Color::White, bucket)
}

/// True if `color` has enough material to force mate against a lone king:
/// a rook or queen, two minors with at least one bishop, or three knights.
fn has_mating_material(board: &Board, color: Color) -> bool {
    if !board.bitboard(color, PieceType::Rook).is_empty()
        || !board.bitboard(color, PieceType::Queen).is_empty()
    {
        return true;
    }
    let knights = board.bitboard(color, PieceType::Knight).popcount();
    let bishops = board.bitboard(color, PieceType::Bishop).popcount();
    if knights >= 3 {
        return true;
    }
    knights + bishops >= 2 && bishops >= 1
}

fn is_lone_king(board: &Board, color: Color) -> bool {
    board.occupied_by(color).popcount() == 1
}

/// Scale the mate-distance bonus down as the weaker king gets further from
/// a corner: full weight at distance 0, down to a quarter at the furthest
/// reachable distance (3, the board's center squares).
fn corner_weight(distance: i32) -> i32 {
    (3 - distance).max(0) + 1
}

/// Nudge `score` (from white's perspective) toward a mating advantage when
/// one side is a lone king facing mating material, proportional to how
/// confined that king already is.
pub(crate) fn apply_mating_material(board: &Board, score: i32) -> i32 {
    let (attacker, defender) = if is_lone_king(board, Color::Black) && has_mating_material(board, Color::White) {
        (Color::White, Color::Black)
    } else if is_lone_king(board, Color::White) && has_mating_material(board, Color::Black) {
        (Color::Black, Color::White)
    } else {
        return score;
    };

    let defender_king = board.king_square(defender);
    let weight = corner_weight(defender_king.distance_from_nearest_corner());
    let bonus = CORNER_SQUEEZE_BONUS * weight / 4;
    if attacker == Color::White {
        score + bonus
    } else {
        score - bonus
    }
}

/// Discount the evaluation toward zero as the fifty-move clock advances,
/// reflecting the draw that's approaching regardless of material.
pub(crate) fn apply_fifty_move_discount(board: &Board, score: i32) -> i32 {
    let clock = board.halfmove_clock().min(100) as i32;
    score * (100 - clock) / 100
}

/// Full position evaluation: NNUE forward pass, mating-material correction,
/// and fifty-move discount, all from white's perspective in centipawns.
#[must_use]
pub fn evaluate(board: &Board, network: &NnueNetwork) -> i32 {
    let side_relative = nnue_forward(board, network);
    let white_relative = if board.side_to_move() == Color::White {
        side_relative
    } else {
        -side_relative
    };
    let with_mating_material = apply_mating_material(board, white_relative);
    apply_fifty_move_discount(board, with_mating_material)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_network() -> NnueNetwork {
        use super::super::nnue::{network::NUM_BUCKETS, HIDDEN_SIZE};
        NnueNetwork {
            feature_weights: Box::new([[0i16; HIDDEN_SIZE]; super::super::nnue::network::INPUT_SIZE]),
            feature_bias: [0i16; HIDDEN_SIZE],
            output_weights: Box::new([[0i16; 2 * HIDDEN_SIZE]; NUM_BUCKETS]),
            output_bias: [0i16; NUM_BUCKETS],
        }
    }

    #[test]
    fn zero_network_evaluates_to_zero() {
        let board = Board::starting_position();
        let network = zero_network();
        assert_eq!(nnue_forward(&board, &network), 0);
    }

    #[test]
    fn lone_king_against_rook_is_detected_as_mating_material() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        assert!(has_mating_material(&board, Color::White));
        assert!(is_lone_king(&board, Color::Black));
    }

    #[test]
    fn two_bare_kings_have_no_mating_material() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(!has_mating_material(&board, Color::White));
        assert!(!has_mating_material(&board, Color::Black));
    }

    #[test]
    fn fifty_move_discount_shrinks_toward_zero() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 80 1").unwrap();
        assert_eq!(apply_fifty_move_discount(&board, 1000), 200);
    }

    #[test]
    fn mating_material_pushes_white_score_upward() {
        let board = Board::from_fen("k7/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        assert!(apply_mating_material(&board, 0) > 0);
    }
}
