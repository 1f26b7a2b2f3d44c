//! Piece, piece-type and color primitives.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The kind of a chess piece, independent of color.
///
/// Index layout matches array indexing used throughout the crate
/// (`pieces_t[PieceType::Pawn.index()]` etc); `id()` exposes the 1-based
/// numbering used by the combined [`Piece`] encoding and by Zobrist indexing.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    pub(crate) const ALL: [PieceType; 6] = [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ];

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            PieceType::Pawn => 0,
            PieceType::Knight => 1,
            PieceType::Bishop => 2,
            PieceType::Rook => 3,
            PieceType::Queen => 4,
            PieceType::King => 5,
        }
    }

    /// 1-based id, matching the spec's `type-1` indexing convention.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u8 {
        self.index() as u8 + 1
    }

    #[must_use]
    pub const fn from_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(PieceType::Pawn),
            1 => Some(PieceType::Knight),
            2 => Some(PieceType::Bishop),
            3 => Some(PieceType::Rook),
            4 => Some(PieceType::Queen),
            5 => Some(PieceType::King),
            _ => None,
        }
    }

    /// Parse a piece type from a lowercase character (p, n, b, r, q, k).
    #[must_use]
    pub fn from_char(c: char) -> Option<PieceType> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceType::Pawn),
            'n' => Some(PieceType::Knight),
            'b' => Some(PieceType::Bishop),
            'r' => Some(PieceType::Rook),
            'q' => Some(PieceType::Queen),
            'k' => Some(PieceType::King),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn to_char(self) -> char {
        match self {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        }
    }

    #[inline]
    #[must_use]
    pub fn to_fen_char(self, color: Color) -> char {
        let c = self.to_char();
        if color == Color::White {
            c.to_ascii_uppercase()
        } else {
            c
        }
    }

    /// Exchange value used by Static Exchange Evaluation.
    ///
    /// Deliberately distinct from the NNUE-glue corner-interpolation table in
    /// [`crate::board::eval`] — the two disagree in the source this crate is
    /// grounded on and are prescribed independently per their usage.
    #[inline]
    #[must_use]
    pub const fn see_value(self) -> i32 {
        match self {
            PieceType::Pawn => 125,
            PieceType::Knight => 438,
            PieceType::Bishop => 438,
            PieceType::Rook => 619,
            PieceType::Queen => 1300,
            PieceType::King => 20000,
        }
    }

    /// Material value used only to gate mating-material detection in the
    /// evaluator glue, not for SEE and not as an NNUE input.
    #[inline]
    #[must_use]
    pub const fn mating_material_value(self) -> i32 {
        match self {
            PieceType::Pawn => 100,
            PieceType::Knight => 350,
            PieceType::Bishop => 350,
            PieceType::Rook => 550,
            PieceType::Queen => 1100,
            PieceType::King => 0,
        }
    }
}

/// Promotion piece choices, ordered queen, rook, bishop, knight — the order
/// the move generator expands a promoting pawn push into four moves.
pub(crate) const PROMOTION_PIECES: [PieceType; 4] = [
    PieceType::Queen,
    PieceType::Rook,
    PieceType::Bishop,
    PieceType::Knight,
];

/// A chess color.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub enum Color {
    White,
    Black,
}

impl Color {
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    #[inline]
    #[must_use]
    pub const fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

/// A piece occupying a square: color and type combined into one byte, color
/// as the high bit over a 1-based type id. `Piece::NONE` (all-zero) means the
/// square is empty — this is the representation `Board::board[0..64]` stores,
/// distinct from the type-only [`PieceType`] used for per-type bitboard
/// indexing.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Piece(u8);

impl Piece {
    pub const NONE: Piece = Piece(0);

    #[inline]
    #[must_use]
    pub const fn new(color: Color, piece_type: PieceType) -> Self {
        Piece(((color.index() as u8) << 3) | piece_type.id())
    }

    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    #[inline]
    #[must_use]
    pub const fn color(self) -> Option<Color> {
        if self.is_none() {
            None
        } else if self.0 & 0b1000 == 0 {
            Some(Color::White)
        } else {
            Some(Color::Black)
        }
    }

    #[inline]
    #[must_use]
    pub const fn piece_type(self) -> Option<PieceType> {
        PieceType::from_index((self.0 & 0b0111) as usize - 1)
    }

    #[must_use]
    pub fn to_char(self) -> char {
        match (self.color(), self.piece_type()) {
            (Some(color), Some(pt)) => pt.to_fen_char(color),
            _ => '.',
        }
    }
}
