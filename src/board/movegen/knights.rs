use super::super::attack_tables;
use super::super::types::{Bitboard, Color, MoveList, PieceType};
use super::super::Board;

impl Board {
    pub(crate) fn generate_knight_moves(&self, side: Color, target: Bitboard, list: &mut MoveList) {
        for from in self.bitboard(side, PieceType::Knight).iter() {
            let attacks = attack_tables::knight_attacks(from).and(target);
            self.push_destination_moves(from, attacks, list);
        }
    }
}
