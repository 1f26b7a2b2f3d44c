use super::super::attack_tables;
use super::super::geometry;
use super::super::types::{Bitboard, Color, Move, PieceType, Square};
use super::super::Board;

/// Is `sq` attacked by `attacker`, given an explicit occupancy (which may
/// differ from the board's actual occupancy — used to simulate a king
/// stepping off a blocked ray, or an en-passant capture's double removal).
fn attacked(board: &Board, sq: Square, occ: Bitboard, attacker: Color) -> bool {
    !attack_tables::attackers_to(
        sq,
        occ,
        attacker,
        board.bitboard(attacker, PieceType::Pawn),
        board.bitboard(attacker, PieceType::Knight),
        board
            .bitboard(attacker, PieceType::Bishop)
            .or(board.bitboard(attacker, PieceType::Queen)),
        board
            .bitboard(attacker, PieceType::Rook)
            .or(board.bitboard(attacker, PieceType::Queen)),
        board.bitboard(attacker, PieceType::King),
    )
    .is_empty()
}

/// Given a pseudo-legal `mv`, is it legal: does it leave the mover's own king
/// in check?
pub(crate) fn is_legal_given_pseudo_legal(board: &Board, mv: Move) -> bool {
    let side = board.side_to_move();
    let enemy = side.opponent();
    let from = mv.from();
    let to = mv.to();

    if mv.is_castling() {
        let rank = from.rank();
        let mid = Square::new(rank, (from.file() + to.file()) / 2);
        let occ = board.all_occupied();
        return !attacked(board, from, occ, enemy)
            && !attacked(board, mid, occ, enemy)
            && !attacked(board, to, occ, enemy);
    }

    if mv.is_en_passant() {
        let ep_capture_sq = Square::new(from.rank(), to.file());
        let occ = board
            .all_occupied()
            .and(Bitboard::from_square(from).not())
            .and(Bitboard::from_square(ep_capture_sq).not())
            .or(Bitboard::from_square(to));
        let king_sq = board.king_square(side);
        return !attacked(board, king_sq, occ, enemy);
    }

    let (_, moving_type) = board
        .piece_at(from)
        .expect("pseudo-legal move must have a piece on `from`");

    if moving_type == PieceType::King {
        let occ_without_king = board.all_occupied().and(Bitboard::from_square(from).not());
        return !attacked(board, to, occ_without_king, enemy);
    }

    if board.pinned(side).contains(from) {
        let king_sq = board.king_square(side);
        return geometry::aligned3(king_sq, from, to);
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::types::MoveList;

    #[test]
    fn a_pinned_piece_may_only_move_along_the_pin_ray() {
        // White king e1, white bishop e2 pinned by a black rook on e8.
        let b = Board::from_fen("4r2k/8/8/8/8/8/4B3/4K3 w - - 0 1").unwrap();
        assert!(board_has_pin(&b));
        let mut list = MoveList::new();
        b.generate(crate::board::movegen::GenMode::Legal, &mut list);
        for mv in list.iter() {
            if mv.from() == Square::new(1, 4) {
                assert_eq!(mv.to().file(), 4);
            }
        }
    }

    fn board_has_pin(b: &Board) -> bool {
        !b.pinned(Color::White).is_empty()
    }
}
