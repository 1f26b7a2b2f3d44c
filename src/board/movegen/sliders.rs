use super::super::attack_tables;
use super::super::types::{Bitboard, Color, MoveList, PieceType};
use super::super::Board;

impl Board {
    pub(crate) fn generate_slider_moves(
        &self,
        side: Color,
        piece_type: PieceType,
        target: Bitboard,
        list: &mut MoveList,
    ) {
        let occ = self.all_occupied();
        for from in self.bitboard(side, piece_type).iter() {
            let attacks = match piece_type {
                PieceType::Bishop => attack_tables::bishop_attacks(from, occ),
                PieceType::Rook => attack_tables::rook_attacks(from, occ),
                PieceType::Queen => attack_tables::queen_attacks(from, occ),
                _ => unreachable!("generate_slider_moves called with a non-slider piece type"),
            };
            self.push_destination_moves(from, attacks.and(target), list);
        }
    }
}
