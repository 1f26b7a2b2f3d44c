use super::super::attack_tables;
use super::super::types::{Bitboard, Color, Move, MoveList, PieceType, Square};
use super::super::Board;
use super::GenMode;

impl Board {
    pub(crate) fn generate_king_moves(&self, side: Color, mode: GenMode, list: &mut MoveList) {
        let from = self.king_square(side);
        let own = self.occupied_by(side);
        let target = match mode {
            GenMode::Capture => self.occupied_by(side.opponent()),
            GenMode::Quiet => self.all_occupied().not(),
            GenMode::QuietCheck => self.all_occupied().not().and(self.check_area(PieceType::King)),
            GenMode::PseudoLegal | GenMode::Legal | GenMode::CheckEvasion => own.not(),
        };
        let attacks = attack_tables::king_attacks(from).and(target);
        self.push_destination_moves(from, attacks, list);

        if !matches!(mode, GenMode::Quiet | GenMode::PseudoLegal | GenMode::Legal) {
            return;
        }
        if self.is_check() {
            return;
        }

        let rank = from.rank();
        let rights = self.castling_rights();
        let occ = self.all_occupied();

        if rights.has(side, true)
            && occ.and(Bitboard::from_square(Square::new(rank, 5))).is_empty()
            && occ.and(Bitboard::from_square(Square::new(rank, 6))).is_empty()
        {
            list.push(Move::castle_kingside(from, Square::new(rank, 6)));
        }
        if rights.has(side, false)
            && occ.and(Bitboard::from_square(Square::new(rank, 1))).is_empty()
            && occ.and(Bitboard::from_square(Square::new(rank, 2))).is_empty()
            && occ.and(Bitboard::from_square(Square::new(rank, 3))).is_empty()
        {
            list.push(Move::castle_queenside(from, Square::new(rank, 2)));
        }
    }
}
