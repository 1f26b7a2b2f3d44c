//! Mode-parameterized move generation.
//!
//! Every mode shares the same per-piece-type skeleton: compute a
//! target-square bitboard for the mode, then let each piece kind intersect
//! its own attack set against it. Only [`GenMode::Legal`] filters the result
//! by full legality; every other mode guarantees pseudo-legality only.

mod kings;
mod knights;
mod legality;
mod pawns;
mod sliders;

pub(crate) use legality::is_legal_given_pseudo_legal;

use super::geometry;
use super::types::{Bitboard, Color, Move, MoveList, PieceType, Square};
use super::Board;

/// Which subset of moves [`Board::generate`] produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenMode {
    Quiet,
    Capture,
    QuietCheck,
    CheckEvasion,
    PseudoLegal,
    Legal,
}

impl Board {
    /// Generate moves for `mode` into `list`. Pseudo-legal for every mode;
    /// fully legal only for [`GenMode::Legal`]. Does not clear `list` first.
    pub fn generate(&self, mode: GenMode, list: &mut MoveList) {
        let side = self.side_to_move();
        let evading = mode == GenMode::CheckEvasion || (mode == GenMode::Legal && self.is_check());

        if evading && self.checkers().popcount() >= 2 {
            // Double check: only the king can move.
            self.generate_king_moves(side, GenMode::CheckEvasion, list);
        } else {
            let effective = if evading { GenMode::CheckEvasion } else { mode };

            let target = self.target_squares(side, PieceType::Pawn, effective);
            self.generate_pawn_moves(side, effective, target, list);

            let target = self.target_squares(side, PieceType::Knight, effective);
            self.generate_knight_moves(side, target, list);

            let target = self.target_squares(side, PieceType::Bishop, effective);
            self.generate_slider_moves(side, PieceType::Bishop, target, list);

            let target = self.target_squares(side, PieceType::Rook, effective);
            self.generate_slider_moves(side, PieceType::Rook, target, list);

            let target = self.target_squares(side, PieceType::Queen, effective);
            self.generate_slider_moves(side, PieceType::Queen, target, list);

            self.generate_king_moves(side, effective, list);
        }

        if mode == GenMode::Legal {
            self.filter_legal(list);
        }
    }

    /// True if the side to move has no legal moves.
    #[must_use]
    pub fn has_no_legal_moves(&self) -> bool {
        let mut list = MoveList::new();
        self.generate(GenMode::Legal, &mut list);
        list.is_empty()
    }

    #[must_use]
    pub fn is_checkmate(&self) -> bool {
        self.is_check() && self.has_no_legal_moves()
    }

    #[must_use]
    pub fn is_stalemate(&self) -> bool {
        !self.is_check() && self.has_no_legal_moves()
    }

    fn target_squares(&self, side: Color, piece_type: PieceType, mode: GenMode) -> Bitboard {
        let own = self.occupied_by(side);
        match mode {
            GenMode::Capture => self.occupied_by(side.opponent()),
            GenMode::Quiet => self.all_occupied().not(),
            GenMode::QuietCheck => self.all_occupied().not().and(self.check_area(piece_type)),
            GenMode::PseudoLegal | GenMode::Legal => own.not(),
            GenMode::CheckEvasion => {
                if piece_type == PieceType::King {
                    own.not()
                } else if self.checkers().popcount() == 1 {
                    let king_sq = self.king_square(side);
                    let checker_sq = Square::from_index(self.checkers().lsb_index());
                    geometry::path(king_sq, checker_sq)
                        .and(own.not())
                        .and(Bitboard::from_square(king_sq).not())
                } else {
                    Bitboard::EMPTY
                }
            }
        }
    }

    /// Emit a quiet or capture move for each destination in `targets`,
    /// distinguishing the two by occupancy of `to`.
    fn push_destination_moves(
        &self,
        from: Square,
        targets: Bitboard,
        list: &mut MoveList,
    ) {
        let enemy_occ = self.occupied_by(self.side_to_move().opponent());
        for to in targets.iter() {
            if enemy_occ.contains(to) {
                list.push(super::types::Move::capture(from, to));
            } else {
                list.push(super::types::Move::quiet(from, to));
            }
        }
    }

    fn filter_legal(&self, list: &mut MoveList) {
        let mut legal = MoveList::new();
        for &mv in list.iter() {
            if is_legal_given_pseudo_legal(self, mv) {
                legal.push(mv);
            }
        }
        *list = legal;
    }

    /// Build a [`Move`] from only its endpoints, inferring capture,
    /// en-passant, castling, and promotion from the current position. Meant
    /// for external move input (a GUI click-drag, a UCI move string already
    /// split into squares) where the caller doesn't know the move's flavor,
    /// unlike the generator above which already knows it while building the
    /// list. Promotions always resolve to a queen, since the endpoints alone
    /// don't name a promotion piece.
    #[must_use]
    pub fn create_move(&self, from: Square, to: Square) -> Move {
        let Some((color, piece_type)) = self.piece_at(from) else {
            return Move::null();
        };

        if piece_type == PieceType::King && from.file().abs_diff(to.file()) == 2 {
            return if to.file() > from.file() {
                Move::castle_kingside(from, to)
            } else {
                Move::castle_queenside(from, to)
            };
        }

        if piece_type == PieceType::Pawn {
            if from.file() != to.file() && self.is_empty_square(to) {
                let ep_capture_sq = Square::new(from.rank(), to.file());
                if Some(ep_capture_sq) == self.en_passant_square() {
                    return Move::en_passant(from, to);
                }
            }
            if from.rank().abs_diff(to.rank()) == 2 {
                return Move::double_pawn_push(from, to);
            }
            let promotion_rank = if color == Color::White { 7 } else { 0 };
            if to.rank() == promotion_rank {
                return if self.is_empty_square(to) {
                    Move::new_promotion(from, to, PieceType::Queen)
                } else {
                    Move::new_promotion_capture(from, to, PieceType::Queen)
                };
            }
        }

        if self.is_empty_square(to) {
            Move::quiet(from, to)
        } else {
            Move::capture(from, to)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_has_twenty_legal_moves() {
        let b = Board::starting_position();
        let mut list = MoveList::new();
        b.generate(GenMode::Legal, &mut list);
        assert_eq!(list.len(), 20);
    }

    #[test]
    fn quiet_mode_excludes_captures() {
        let b = Board::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let mut list = MoveList::new();
        b.generate(GenMode::Quiet, &mut list);
        assert!(list.iter().all(|m| !m.is_capture()));
    }

    #[test]
    fn capture_mode_only_captures() {
        let b = Board::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let mut list = MoveList::new();
        b.generate(GenMode::Capture, &mut list);
        assert!(!list.is_empty());
        assert!(list.iter().all(|m| m.is_capture()));
    }

    #[test]
    fn create_move_infers_capture_from_occupancy() {
        let b = Board::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let mv = b.create_move(Square::new(3, 4), Square::new(4, 3));
        assert!(mv.is_capture());
    }

    #[test]
    fn create_move_infers_en_passant() {
        let b = Board::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
        let mv = b.create_move(Square::new(4, 4), Square::new(5, 3));
        assert!(mv.is_en_passant());
    }

    #[test]
    fn create_move_infers_kingside_castling() {
        let b = Board::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        let mv = b.create_move(Square::new(0, 4), Square::new(0, 6));
        assert!(mv.is_castle_kingside());
    }

    #[test]
    fn create_move_infers_queen_promotion() {
        let b = Board::from_fen("4k3/4P3/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let mv = b.create_move(Square::new(6, 4), Square::new(7, 4));
        assert_eq!(mv.promotion(), Some(PieceType::Queen));
    }

    #[test]
    fn check_evasion_in_double_check_only_moves_the_king() {
        // Two black rooks giving check along the rank and file to a white
        // king with nowhere to block or capture both at once.
        let b = Board::from_fen("7k/8/8/8/8/8/r7/K6r w - - 0 1").unwrap();
        assert!(b.checkers().popcount() >= 2);
        let mut list = MoveList::new();
        b.generate(GenMode::Legal, &mut list);
        assert!(list.iter().all(|m| m.from() == b.king_square(Color::White)));
    }
}
