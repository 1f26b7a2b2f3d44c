//! FEN load and save.

use super::error::{FenError, MoveParseError};
use super::make_unmake::{compute_checks_and_pins, recompute_hash};
use super::movegen::GenMode;
use super::state::Ply;
use super::types::{
    file_to_index, rank_to_index, Bitboard, CastlingRights, Color, Move, MoveList, Piece,
    PieceType, Square, CASTLE_BLACK_K, CASTLE_BLACK_Q, CASTLE_WHITE_K, CASTLE_WHITE_Q,
};
use super::Board;

pub(crate) const STARTING_FEN: &str =
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Board {
    /// Load a position from Forsyth-Edwards notation. Six whitespace
    /// separated fields: placement, side to move, castling rights,
    /// en-passant square, halfmove clock, fullmove number.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let result = Self::parse_fen(fen);
        #[cfg(feature = "logging")]
        if let Err(ref e) = result {
            log::warn!("FEN parse failed for {fen:?}: {e}");
        }
        result
    }

    fn parse_fen(fen: &str) -> Result<Self, FenError> {
        let mut board = Board::empty();
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(FenError::TooFewParts { found: parts.len() });
        }

        let ranks: Vec<&str> = parts[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::InvalidRank { rank: ranks.len() });
        }
        for (rank_from_top, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_from_top;
            let mut file = 0usize;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                    continue;
                }
                if file >= 8 {
                    return Err(FenError::TooManyFiles {
                        rank: rank_from_top,
                        files: file + 1,
                    });
                }
                let color = if c.is_uppercase() { Color::White } else { Color::Black };
                let piece_type =
                    PieceType::from_char(c).ok_or(FenError::InvalidPiece { char: c })?;
                board.place(Square::new(rank, file), color, piece_type);
                file += 1;
            }
            if file > 8 {
                return Err(FenError::TooManyFiles {
                    rank: rank_from_top,
                    files: file,
                });
            }
        }

        board.side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                })
            }
        };

        let mut rights = 0u8;
        if parts[2] != "-" {
            for c in parts[2].chars() {
                rights |= match c {
                    'K' => CASTLE_WHITE_K,
                    'Q' => CASTLE_WHITE_Q,
                    'k' => CASTLE_BLACK_K,
                    'q' => CASTLE_BLACK_Q,
                    other => return Err(FenError::InvalidCastling { char: other }),
                };
            }
        }
        let castling_rights = CastlingRights::from_u8(rights);

        // Internal representation of en-passant is the pawn's own square,
        // not the skipped square the FEN prints.
        let en_passant = if parts[3] == "-" {
            None
        } else {
            let chars: Vec<char> = parts[3].chars().collect();
            if chars.len() != 2 {
                return Err(FenError::InvalidEnPassant {
                    found: parts[3].to_string(),
                });
            }
            let file = file_to_index(chars[0]);
            let skipped_rank = rank_to_index(chars[1]);
            if file >= 8 || !(0..8).contains(&skipped_rank) {
                return Err(FenError::InvalidEnPassant {
                    found: parts[3].to_string(),
                });
            }
            let pawn_rank = if skipped_rank == 2 { 3 } else { 4 };
            Some(Square::new(pawn_rank, file))
        };

        let halfmove_clock = parts.get(4).and_then(|s| s.parse().ok()).unwrap_or(0);
        let fullmoves: u32 = parts.get(5).and_then(|s| s.parse().ok()).unwrap_or(1);
        let side_offset = u32::from(board.side_to_move == Color::Black);
        board.halfmoves_total = fullmoves.saturating_mul(2) + side_offset - 2;

        let hash = recompute_hash(&board);
        board.stack = super::state::PositionStack::new(Ply {
            last_move: Move::null(),
            captured: Piece::NONE,
            castling_rights,
            en_passant,
            checkers: Bitboard::EMPTY,
            check_area: [Bitboard::EMPTY; 6],
            pinned: [Bitboard::EMPTY; 2],
            pinners: [Bitboard::EMPTY; 2],
            discoveries: [Bitboard::EMPTY; 2],
            halfmove_clock,
            irr_distance: 0,
            game_stage: board.all_occupied().popcount() as i32 - 2,
            hash,
        });
        let (checkers, check_area, pinned, pinners, discoveries) = compute_checks_and_pins(&board);
        let top = board.stack.top_mut();
        top.checkers = checkers;
        top.check_area = check_area;
        top.pinned = pinned;
        top.pinners = pinners;
        top.discoveries = discoveries;

        Ok(board)
    }

    /// Render the position as FEN. En-passant is printed (as the skipped
    /// square) only when a current-side pawn could actually capture there.
    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut out = String::with_capacity(64);
        for rank in (0..8).rev() {
            let mut empty_run = 0;
            for file in 0..8 {
                let sq = Square::new(rank, file);
                match self.piece_at(sq) {
                    None => empty_run += 1,
                    Some((color, piece_type)) => {
                        if empty_run > 0 {
                            out.push_str(&empty_run.to_string());
                            empty_run = 0;
                        }
                        out.push(piece_type.to_fen_char(color));
                    }
                }
            }
            if empty_run > 0 {
                out.push_str(&empty_run.to_string());
            }
            if rank > 0 {
                out.push('/');
            }
        }

        out.push(' ');
        out.push(if self.side_to_move() == Color::White { 'w' } else { 'b' });

        out.push(' ');
        let rights = self.castling_rights();
        let mut any = false;
        for (color, ch) in [(Color::White, 'K'), (Color::White, 'Q'), (Color::Black, 'k'), (Color::Black, 'q')] {
            let kingside = ch == 'K' || ch == 'k';
            if rights.has(color, kingside) {
                out.push(ch);
                any = true;
            }
        }
        if !any {
            out.push('-');
        }

        out.push(' ');
        match self.capturable_en_passant_square() {
            Some(sq) => out.push_str(&sq.to_string()),
            None => out.push('-'),
        }

        out.push(' ');
        out.push_str(&self.halfmove_clock().to_string());
        out.push(' ');
        let fullmove = (self.halfmoves_total() + 2 - u32::from(self.side_to_move() == Color::Black)) / 2;
        out.push_str(&fullmove.to_string());

        out
    }

    /// The FEN-visible en-passant square (the skipped square), or `None` if
    /// no current-side pawn can actually capture there.
    fn capturable_en_passant_square(&self) -> Option<Square> {
        let pawn_sq = self.en_passant_square()?;
        let side = self.side_to_move();
        let attackers = super::attack_tables::pawn_attacks(side.opponent(), pawn_sq);
        if attackers.and(self.bitboard(side, PieceType::Pawn)).is_empty() {
            return None;
        }
        let skipped_rank = if pawn_sq.rank() == 3 { 2 } else { 5 };
        Some(Square::new(skipped_rank, pawn_sq.file()))
    }

    /// Parse a UCI move string (`"e2e4"`, `"a7a8q"`) against the current
    /// position's legal moves. Unlike [`Board::create_move`], which trusts
    /// its endpoints, this rejects anything that isn't actually legal here.
    pub fn parse_move(&self, uci: &str) -> Result<Move, MoveParseError> {
        if uci.len() < 4 || uci.len() > 5 {
            return Err(MoveParseError::InvalidLength { len: uci.len() });
        }
        let chars: Vec<char> = uci.chars().collect();
        if !('a'..='h').contains(&chars[0])
            || !('1'..='8').contains(&chars[1])
            || !('a'..='h').contains(&chars[2])
            || !('1'..='8').contains(&chars[3])
        {
            return Err(MoveParseError::InvalidSquare {
                notation: uci.to_string(),
            });
        }
        let from = Square::new(rank_to_index(chars[1]), file_to_index(chars[0]));
        let to = Square::new(rank_to_index(chars[3]), file_to_index(chars[2]));

        let promotion = if uci.len() == 5 {
            let piece_type = PieceType::from_char(chars[4]).ok_or(MoveParseError::InvalidPromotion {
                char: chars[4],
            })?;
            if matches!(piece_type, PieceType::Pawn | PieceType::King) {
                return Err(MoveParseError::InvalidPromotion { char: chars[4] });
            }
            Some(piece_type)
        } else {
            None
        };

        let mut legal_moves = MoveList::new();
        self.generate(GenMode::Legal, &mut legal_moves);
        legal_moves
            .iter()
            .find(|mv| mv.from() == from && mv.to() == to && mv.promotion() == promotion)
            .copied()
            .ok_or_else(|| MoveParseError::IllegalMove {
                notation: uci.to_string(),
            })
    }

    /// Parse a UCI move and apply it in one call.
    pub fn make_move_uci(&mut self, uci: &str) -> Result<Move, MoveParseError> {
        let mv = self.parse_move(uci)?;
        self.make_move(mv);
        Ok(mv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_the_starting_position() {
        let b = Board::from_fen(STARTING_FEN).unwrap();
        assert_eq!(b.to_fen(), STARTING_FEN);
    }

    #[test]
    fn rejects_malformed_fen() {
        assert!(Board::from_fen("not a fen").is_err());
    }

    #[test]
    fn parse_move_accepts_a_legal_opening() {
        let b = Board::starting_position();
        let mv = b.parse_move("e2e4").unwrap();
        assert_eq!(mv.to_string(), "e2e4");
    }

    #[test]
    fn parse_move_rejects_illegal_destination() {
        let b = Board::starting_position();
        assert_eq!(
            b.parse_move("e2e5"),
            Err(super::super::error::MoveParseError::IllegalMove {
                notation: "e2e5".to_string()
            })
        );
    }

    #[test]
    fn parse_move_rejects_bad_length() {
        let b = Board::starting_position();
        assert_eq!(
            b.parse_move("e2"),
            Err(super::super::error::MoveParseError::InvalidLength { len: 2 })
        );
    }

    #[test]
    fn make_move_uci_applies_a_parsed_promotion() {
        let mut b = Board::from_fen("4k3/4P3/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let mv = b.make_move_uci("e7e8q").unwrap();
        assert_eq!(mv.promotion(), Some(PieceType::Queen));
        assert_eq!(b.piece_at(Square::new(7, 4)), Some((Color::White, PieceType::Queen)));
    }

    #[test]
    fn kiwipete_round_trips() {
        let kiwipete = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let b = Board::from_fen(kiwipete).unwrap();
        assert_eq!(b.to_fen(), kiwipete);
        assert_eq!(b.all_occupied().popcount(), 32);
    }
}
