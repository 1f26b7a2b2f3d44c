//! Static Exchange Evaluation: the material balance of a capture sequence
//! on a single square, without playing it out on the board.

use super::attack_tables;
use super::types::{Bitboard, Color, Move, PieceType, Square};
use super::Board;

const MAX_DEPTH: usize = 32;

fn attackers_to(board: &Board, sq: Square, occ: Bitboard) -> Bitboard {
    [Color::White, Color::Black]
        .into_iter()
        .fold(Bitboard::EMPTY, |acc, side| {
            acc.or(attack_tables::attackers_to(
                sq,
                occ,
                side,
                board.bitboard(side, PieceType::Pawn),
                board.bitboard(side, PieceType::Knight),
                board
                    .bitboard(side, PieceType::Bishop)
                    .or(board.bitboard(side, PieceType::Queen)),
                board
                    .bitboard(side, PieceType::Rook)
                    .or(board.bitboard(side, PieceType::Queen)),
                board.bitboard(side, PieceType::King),
            ))
        })
}

fn least_valuable_attacker(board: &Board, side: Color, area: Bitboard) -> Option<(Square, PieceType)> {
    for piece_type in PieceType::ALL {
        let subset = area.and(board.bitboard(side, piece_type));
        if !subset.is_empty() {
            return Some((Square::from_index(subset.lsb_index()), piece_type));
        }
    }
    None
}

impl Board {
    /// Static exchange value of playing `mv` on the current position, from
    /// the mover's perspective. `mv` need not be a capture: a quiet pawn push
    /// into a square other pieces attack is handled by counting the mover
    /// among its own destination's attackers, the one case where the piece
    /// making the first "capture" isn't already one of `attackers_to(to)`.
    #[must_use]
    pub fn see(&self, mv: Move) -> i32 {
        let from = mv.from();
        let to = mv.to();
        if from == to {
            return 0;
        }

        let side = self
            .piece_at(from)
            .map_or(self.side_to_move(), |(c, _)| c);
        let mut attacking_piece = self
            .piece_at(from)
            .map_or(PieceType::Pawn, |(_, t)| t);
        let captured_value = if mv.is_en_passant() {
            PieceType::Pawn.see_value()
        } else {
            self.piece_at(to).map_or(0, |(_, t)| t.see_value())
        };
        let promotion_gain = mv
            .promotion()
            .map_or(0, |p| p.see_value() - PieceType::Pawn.see_value());

        let mut gain = [0i32; MAX_DEPTH];
        let mut depth = 0;
        gain[0] = captured_value + promotion_gain;

        let mut occ = self.all_occupied();
        let mut from_bb = Bitboard::from_square(from);
        let may_xray = occ
            .and(self.pieces_of_type(PieceType::Knight).not())
            .and(self.pieces_of_type(PieceType::King).not());

        let mut attackers = attackers_to(self, to, occ);

        // Quiet pawn push along its own file: the mover is not attacking
        // `to` (pawns don't attack straight ahead), but it still belongs in
        // the exchange as the piece that first lands there.
        if attacking_piece == PieceType::Pawn && from.file() == to.file() {
            attackers = attackers.or(from_bb);
        }

        let mut mover = side;
        loop {
            depth += 1;
            if depth >= MAX_DEPTH {
                break;
            }
            gain[depth] = attacking_piece.see_value() - gain[depth - 1];
            if (-gain[depth - 1]).max(gain[depth]) < 0 {
                break;
            }

            attackers = attackers.and(from_bb.not());
            if from_bb.intersects(may_xray) {
                let diag = attack_tables::xray_attacks(
                    to,
                    occ,
                    from_bb,
                    self.pieces_of_type(PieceType::Bishop).or(self.pieces_of_type(PieceType::Queen)),
                    true,
                );
                let ortho = attack_tables::xray_attacks(
                    to,
                    occ,
                    from_bb,
                    self.pieces_of_type(PieceType::Rook).or(self.pieces_of_type(PieceType::Queen)),
                    false,
                );
                attackers = attackers.or(diag).or(ortho);
            }
            occ = occ.and(from_bb.not());

            mover = mover.opponent();
            let Some((next_sq, next_type)) = least_valuable_attacker(self, mover, attackers) else {
                break;
            };
            from_bb = Bitboard::from_square(next_sq);
            attacking_piece = next_type;
        }

        while depth > 0 {
            depth -= 1;
            gain[depth] = -(-gain[depth]).max(gain[depth + 1]);
        }
        gain[0]
    }

    /// True if `see(mv) >= threshold` — used by move ordering to gate
    /// whether a capture is worth trying ahead of quiet moves.
    #[must_use]
    pub fn see_ge(&self, mv: Move, threshold: i32) -> bool {
        self.see(mv) >= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(fen: &str) -> Board {
        fen.parse().expect("valid fen")
    }

    #[test]
    fn winning_pawn_takes_pawn() {
        let board = b("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1");
        let mv = Move::capture(Square::new(3, 4), Square::new(4, 3));
        assert_eq!(board.see(mv), PieceType::Pawn.see_value());
    }

    #[test]
    fn losing_knight_takes_defended_pawn() {
        let board = b("4k3/8/2p5/3p4/4N3/8/8/4K3 w - - 0 1");
        let mv = Move::capture(Square::new(3, 4), Square::new(4, 3));
        assert_eq!(
            board.see(mv),
            PieceType::Pawn.see_value() - PieceType::Knight.see_value()
        );
    }

    #[test]
    fn rook_takes_rook_with_xray_backup() {
        let board = b("3r2k1/8/8/3r4/8/8/8/R2RK3 w - - 0 1");
        let mv = Move::capture(Square::new(0, 3), Square::new(4, 3));
        // Rxd5, Rxd5, Rxd5: 619 - 619 + 619 = 619
        assert_eq!(board.see(mv), PieceType::Rook.see_value());
    }

    #[test]
    fn en_passant_wins_a_pawn() {
        let board = b("4k3/8/8/3Pp3/8/8/8/4K3 w - e6 0 1");
        let mv = Move::en_passant(Square::new(4, 3), Square::new(5, 4));
        assert_eq!(board.see(mv), PieceType::Pawn.see_value());
    }

    #[test]
    fn quiet_move_into_defended_square_loses_value() {
        let board = b("4k3/8/8/3p4/8/8/4B3/4K3 w - - 0 1");
        let mv = Move::quiet(Square::new(1, 4), Square::new(3, 4));
        assert!(board.see(mv) <= 0);
    }
}
