//! Move application: make/unmake for normal moves, promotions, en-passant,
//! castling, and null moves, plus the checks/pins recomputation that follows
//! every make.

use crate::zobrist::Zobrist;

use super::attack_tables;
use super::geometry;
use super::state::Ply;
use super::types::{
    Bitboard, CastlingRights, Color, Move, Piece, PieceType, Square, CASTLE_BLACK_K,
    CASTLE_BLACK_Q, CASTLE_WHITE_K, CASTLE_WHITE_Q,
};
use super::Board;

fn castle_rook_squares(color: Color, kingside: bool) -> (Square, Square) {
    let rank = if color == Color::White { 0 } else { 7 };
    if kingside {
        (Square::new(rank, 7), Square::new(rank, 5))
    } else {
        (Square::new(rank, 0), Square::new(rank, 3))
    }
}

/// Bits lost by a move touching this square, either as `from` or `to` — a
/// rook leaving (or being captured on) its home square kills that side's
/// right; the king leaving e1/e8 kills both.
fn castling_loss_mask(sq: Square) -> u8 {
    match (sq.rank(), sq.file()) {
        (0, 0) => CASTLE_WHITE_Q,
        (0, 7) => CASTLE_WHITE_K,
        (0, 4) => CASTLE_WHITE_K | CASTLE_WHITE_Q,
        (7, 0) => CASTLE_BLACK_Q,
        (7, 7) => CASTLE_BLACK_K,
        (7, 4) => CASTLE_BLACK_K | CASTLE_BLACK_Q,
        _ => 0,
    }
}

fn has_adjacent_enemy_pawn(board: &Board, to: Square, enemy: Color) -> bool {
    let enemy_pawns = board.bitboard(enemy, PieceType::Pawn);
    let rank = to.rank() as i32;
    [-1i32, 1].into_iter().any(|df| {
        let file = to.file() as i32 + df;
        (0..8).contains(&file) && enemy_pawns.contains(Square::new(rank as usize, file as usize))
    })
}

/// Recompute the Zobrist hash from scratch. Used to seed a freshly loaded
/// position and to check the dynamic hash against a static recomputation.
pub(crate) fn recompute_hash(board: &Board) -> Zobrist {
    let mut hash = Zobrist::zero();
    for idx in 0..64 {
        let sq = Square::from_index(idx);
        if let Some((color, piece_type)) = board.piece_at(sq) {
            hash.toggle_piece(color, piece_type, sq);
        }
    }
    hash.toggle_castling(board.castling_rights());
    hash.toggle_en_passant(board.en_passant_square());
    if board.side_to_move() == Color::Black {
        hash.toggle_side_to_move();
    }
    hash
}

fn scan_king_rays(board: &Board, king_color: Color) -> (Bitboard, Bitboard, Bitboard) {
    let enemy = king_color.opponent();
    let king_sq = board.king_square(king_color);
    let occ = board.all_occupied();
    let enemy_diag = board
        .bitboard(enemy, PieceType::Bishop)
        .or(board.bitboard(enemy, PieceType::Queen));
    let enemy_ortho = board
        .bitboard(enemy, PieceType::Rook)
        .or(board.bitboard(enemy, PieceType::Queen));

    let mut pinned = Bitboard::EMPTY;
    let mut pinners = Bitboard::EMPTY;
    let mut discoveries = Bitboard::EMPTY;

    for (sliders, bishop) in [(enemy_diag, true), (enemy_ortho, false)] {
        let xray = attack_tables::xray_attacks(king_sq, occ, occ, sliders, bishop);
        for attacker in xray.iter() {
            let between = geometry::path(king_sq, attacker)
                .and(occ)
                .and(Bitboard::from_square(king_sq).not())
                .and(Bitboard::from_square(attacker).not());
            if between.popcount() != 1 {
                continue;
            }
            let blocker = Square::from_index(between.lsb_index());
            let Some((blocker_color, _)) = board.piece_at(blocker) else {
                continue;
            };
            if blocker_color == king_color {
                pinned = pinned.or(Bitboard::from_square(blocker));
                pinners = pinners.or(Bitboard::from_square(attacker));
            } else {
                discoveries = discoveries.or(Bitboard::from_square(blocker));
            }
        }
    }
    (pinned, pinners, discoveries)
}

/// Checkers, per-type check areas, and pin/discovery sets for the position's
/// current side to move. Called after every make and after static load.
#[allow(clippy::type_complexity)]
pub(crate) fn compute_checks_and_pins(
    board: &Board,
) -> (
    Bitboard,
    [Bitboard; 6],
    [Bitboard; 2],
    [Bitboard; 2],
    [Bitboard; 2],
) {
    let side = board.side_to_move();
    let enemy = side.opponent();
    let own_king = board.king_square(side);
    let enemy_king = board.king_square(enemy);
    let occ = board.all_occupied();

    let checkers = attack_tables::attackers_to(
        own_king,
        occ,
        enemy,
        board.bitboard(enemy, PieceType::Pawn),
        board.bitboard(enemy, PieceType::Knight),
        board
            .bitboard(enemy, PieceType::Bishop)
            .or(board.bitboard(enemy, PieceType::Queen)),
        board
            .bitboard(enemy, PieceType::Rook)
            .or(board.bitboard(enemy, PieceType::Queen)),
        board.bitboard(enemy, PieceType::King),
    );

    let mut check_area = [Bitboard::EMPTY; 6];
    check_area[PieceType::Pawn.index()] = attack_tables::pawn_attacks(enemy, enemy_king);
    check_area[PieceType::Knight.index()] = attack_tables::knight_attacks(enemy_king);
    check_area[PieceType::Bishop.index()] = attack_tables::bishop_attacks(enemy_king, occ);
    check_area[PieceType::Rook.index()] = attack_tables::rook_attacks(enemy_king, occ);
    check_area[PieceType::Queen.index()] = attack_tables::queen_attacks(enemy_king, occ);
    check_area[PieceType::King.index()] = attack_tables::king_attacks(enemy_king);

    let (pinned_white, pinners_black, discoveries_black) = scan_king_rays(board, Color::White);
    let (pinned_black, pinners_white, discoveries_white) = scan_king_rays(board, Color::Black);

    (
        checkers,
        check_area,
        [pinned_white, pinned_black],
        [pinners_white, pinners_black],
        [discoveries_white, discoveries_black],
    )
}

impl Board {
    /// Apply `mv`, which must be pseudo-legal in the current position.
    /// Behavior on an illegal move is unspecified but will not corrupt
    /// process-wide tables.
    pub fn make_move(&mut self, mv: Move) {
        let from = mv.from();
        let to = mv.to();
        let mover = self.side_to_move;
        let enemy = mover.opponent();
        let prior = *self.stack.top();

        let (_, moving_type) = self
            .piece_at(from)
            .expect("make_move requires a piece on `from`");

        let mut hash = prior.hash;
        hash.toggle_piece(mover, moving_type, from);

        let is_castle = mv.is_castle_kingside() || mv.is_castle_queenside();
        let mut captured = Piece::NONE;

        if mv.is_en_passant() {
            let ep_capture_sq = Square::new(from.rank(), to.file());
            let (cap_color, cap_type) = self
                .piece_at(ep_capture_sq)
                .expect("en-passant target must hold a pawn");
            captured = Piece::new(cap_color, cap_type);
            hash.toggle_piece(cap_color, cap_type, ep_capture_sq);
            self.remove(ep_capture_sq);
            self.remove(from);
            self.place(to, mover, PieceType::Pawn);
            hash.toggle_piece(mover, PieceType::Pawn, to);
        } else if is_castle {
            let (rook_from, rook_to) = castle_rook_squares(mover, mv.is_castle_kingside());
            self.remove(from);
            self.remove(rook_from);
            self.place(to, mover, PieceType::King);
            self.place(rook_to, mover, PieceType::Rook);
            hash.toggle_piece(mover, PieceType::King, to);
            hash.toggle_piece(mover, PieceType::Rook, rook_from);
            hash.toggle_piece(mover, PieceType::Rook, rook_to);
        } else {
            if let Some((cap_color, cap_type)) = self.piece_at(to) {
                captured = Piece::new(cap_color, cap_type);
                hash.toggle_piece(cap_color, cap_type, to);
                self.remove(to);
            }
            self.remove(from);
            let placed_type = mv.promotion().unwrap_or(moving_type);
            self.place(to, mover, placed_type);
            hash.toggle_piece(mover, placed_type, to);
        }

        let loss = castling_loss_mask(from) | castling_loss_mask(to);
        let new_rights = CastlingRights::from_u8(prior.castling_rights.as_u8() & !loss);
        hash.toggle_castling(prior.castling_rights);
        hash.toggle_castling(new_rights);

        let new_ep = if mv.is_double_pawn_push() && has_adjacent_enemy_pawn(self, to, enemy) {
            Some(to)
        } else {
            None
        };
        hash.toggle_en_passant(prior.en_passant);
        hash.toggle_en_passant(new_ep);

        hash.toggle_side_to_move();

        let is_irreversible = moving_type == PieceType::Pawn || !captured.is_none() || is_castle;
        let new_halfmove_clock = if moving_type == PieceType::Pawn || !captured.is_none() {
            0
        } else {
            prior.halfmove_clock + 1
        };
        let new_irr_distance = if is_irreversible { 0 } else { prior.irr_distance + 1 };

        self.side_to_move = enemy;
        self.halfmoves_total += 1;

        let (checkers, check_area, pinned, pinners, discoveries) = compute_checks_and_pins(self);
        let game_stage = self.all_occupied().popcount() as i32 - 2;

        self.stack.push(Ply {
            last_move: mv,
            captured,
            castling_rights: new_rights,
            en_passant: new_ep,
            checkers,
            check_area,
            pinned,
            pinners,
            discoveries,
            halfmove_clock: new_halfmove_clock,
            irr_distance: new_irr_distance,
            game_stage,
            hash,
        });
    }

    /// Undo the most recently made move. A no-op at the root ply.
    pub fn undo_move(&mut self) {
        if self.stack.ply() == 0 {
            return;
        }
        let entry = *self.stack.top();
        let mv = entry.last_move;
        let from = mv.from();
        let to = mv.to();
        let mover = self.side_to_move.opponent();

        if mv.is_en_passant() {
            self.remove(to);
            self.place(from, mover, PieceType::Pawn);
            let ep_capture_sq = Square::new(from.rank(), to.file());
            if let (Some(cap_color), Some(cap_type)) =
                (entry.captured.color(), entry.captured.piece_type())
            {
                self.place(ep_capture_sq, cap_color, cap_type);
            }
        } else if mv.is_castle_kingside() || mv.is_castle_queenside() {
            let (rook_from, rook_to) = castle_rook_squares(mover, mv.is_castle_kingside());
            self.remove(to);
            self.remove(rook_to);
            self.place(from, mover, PieceType::King);
            self.place(rook_from, mover, PieceType::Rook);
        } else {
            let (_, placed_type) = self
                .piece_at(to)
                .expect("unmake: a piece must be on `to`");
            self.remove(to);
            let original_type = if mv.is_promotion() {
                PieceType::Pawn
            } else {
                placed_type
            };
            self.place(from, mover, original_type);
            if let (Some(cap_color), Some(cap_type)) =
                (entry.captured.color(), entry.captured.piece_type())
            {
                self.place(to, cap_color, cap_type);
            }
        }

        self.side_to_move = mover;
        self.halfmoves_total -= 1;
        self.stack.pop();
    }

    /// Push a null-move ply: flips the side to move without touching piece
    /// placement.
    pub fn make_null_move(&mut self) {
        let prior = *self.stack.top();
        let mut hash = prior.hash;
        hash.toggle_en_passant(prior.en_passant);
        hash.toggle_en_passant(None);
        hash.toggle_side_to_move();

        self.side_to_move = self.side_to_move.opponent();
        let (checkers, check_area, pinned, pinners, discoveries) = compute_checks_and_pins(self);

        self.stack.push(Ply {
            last_move: Move::null(),
            captured: Piece::NONE,
            castling_rights: prior.castling_rights,
            en_passant: None,
            checkers,
            check_area,
            pinned,
            pinners,
            discoveries,
            halfmove_clock: prior.halfmove_clock,
            irr_distance: prior.irr_distance + 1,
            game_stage: prior.game_stage,
            hash,
        });
    }

    /// Undo a null move. A no-op at the root ply.
    pub fn undo_null_move(&mut self) {
        if self.stack.ply() == 0 {
            return;
        }
        self.side_to_move = self.side_to_move.opponent();
        self.stack.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn make_then_undo_restores_starting_position() {
        let mut b = Board::starting_position();
        let before_hash = b.hash();
        let mv = Move::double_pawn_push(Square::new(1, 4), Square::new(3, 4));
        b.make_move(mv);
        assert_ne!(b.hash(), before_hash);
        b.undo_move();
        assert_eq!(b.hash(), before_hash);
        assert_eq!(b.side_to_move(), Color::White);
        assert_eq!(b.all_occupied().popcount(), 32);
    }

    #[test]
    fn dynamic_hash_matches_static_recomputation() {
        let mut b = Board::starting_position();
        b.make_move(Move::double_pawn_push(Square::new(1, 4), Square::new(3, 4)));
        b.make_move(Move::double_pawn_push(Square::new(6, 4), Square::new(4, 4)));
        assert_eq!(Zobrist::value(recompute_hash(&b)), b.hash());
    }

    #[test]
    fn null_move_flips_side_without_touching_pieces() {
        let mut b = Board::starting_position();
        let occ_before = b.all_occupied();
        b.make_null_move();
        assert_eq!(b.side_to_move(), Color::Black);
        assert_eq!(b.all_occupied(), occ_before);
        b.undo_null_move();
        assert_eq!(b.side_to_move(), Color::White);
    }

    #[test]
    fn undo_past_root_is_a_no_op() {
        let mut b = Board::starting_position();
        b.undo_move();
        assert_eq!(b.side_to_move(), Color::White);
    }
}
