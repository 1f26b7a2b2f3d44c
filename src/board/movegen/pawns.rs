use super::super::types::{Bitboard, Color, Move, PieceType, Square, MoveList};
use super::super::Board;
use super::GenMode;

const PROMOTIONS: [PieceType; 4] = [
    PieceType::Queen,
    PieceType::Rook,
    PieceType::Bishop,
    PieceType::Knight,
];

fn push_quiet(list: &mut MoveList, from: Square, to: Square, promo_rank: usize) {
    if to.rank() == promo_rank {
        for &piece in &PROMOTIONS {
            list.push(Move::new_promotion(from, to, piece));
        }
    } else {
        list.push(Move::quiet(from, to));
    }
}

fn push_capture(list: &mut MoveList, from: Square, to: Square, promo_rank: usize) {
    if to.rank() == promo_rank {
        for &piece in &PROMOTIONS {
            list.push(Move::new_promotion_capture(from, to, piece));
        }
    } else {
        list.push(Move::capture(from, to));
    }
}

impl Board {
    pub(crate) fn generate_pawn_moves(
        &self,
        side: Color,
        mode: GenMode,
        target: Bitboard,
        list: &mut MoveList,
    ) {
        let is_white = side == Color::White;
        let dir: i32 = if is_white { 1 } else { -1 };
        let start_rank = if is_white { 1 } else { 6 };
        let promo_rank = if is_white { 7 } else { 0 };
        let enemy_occ = self.occupied_by(side.opponent());
        let ep_square = self.en_passant_square();

        let allow_pushes = mode != GenMode::Capture;
        let allow_captures = !matches!(mode, GenMode::Quiet | GenMode::QuietCheck);

        for from in self.bitboard(side, PieceType::Pawn).iter() {
            let rank = from.rank() as i32;
            let file = from.file() as i32;
            let one_rank = rank + dir;

            if allow_pushes && (0..8).contains(&one_rank) {
                let one = Square::new(one_rank as usize, file as usize);
                if self.is_empty_square(one) {
                    if target.contains(one) {
                        push_quiet(list, from, one, promo_rank);
                    }
                    if from.rank() == start_rank {
                        let two_rank = rank + 2 * dir;
                        let two = Square::new(two_rank as usize, file as usize);
                        if self.is_empty_square(two) && target.contains(two) {
                            list.push(Move::double_pawn_push(from, two));
                        }
                    }
                }
            }

            if allow_captures && (0..8).contains(&one_rank) {
                for &df in &[-1i32, 1i32] {
                    let cap_file = file + df;
                    if !(0..8).contains(&cap_file) {
                        continue;
                    }
                    let to = Square::new(one_rank as usize, cap_file as usize);
                    if enemy_occ.contains(to) {
                        if target.contains(to) {
                            push_capture(list, from, to, promo_rank);
                        }
                    } else {
                        let ep_capture_sq = Square::new(from.rank(), cap_file as usize);
                        if Some(ep_capture_sq) == ep_square {
                            let addresses_check = mode != GenMode::CheckEvasion
                                || self.checkers().contains(ep_capture_sq);
                            if addresses_check {
                                list.push(Move::en_passant(from, to));
                            }
                        }
                    }
                }
            }
        }
    }
}
