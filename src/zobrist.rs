//! Zobrist hashing.
//!
//! A table of 850 distinct random 64-bit values: 768 for piece-square
//! combinations (2 colors * 6 types * 64 squares), 16 for castling-right
//! masks, 65 for en-passant square (64 squares plus "no en-passant"), and 1
//! for side-to-move. Generated once, at a fixed seed, so hashes are stable
//! across runs and processes.

use std::sync::LazyLock;

use rand::{RngCore, SeedableRng};
use rand::rngs::StdRng;

use crate::board::types::{CastlingRights, Color, PieceType, Square};

const PIECE_SQUARE_KEYS: usize = 768;
const CASTLING_KEYS: usize = 16;
const EN_PASSANT_KEYS: usize = 65;
const SIDE_TO_MOVE_KEYS: usize = 1;
const TOTAL_KEYS: usize = PIECE_SQUARE_KEYS + CASTLING_KEYS + EN_PASSANT_KEYS + SIDE_TO_MOVE_KEYS;

const ZOBRIST_SEED: u64 = 410_376;

const CASTLING_BASE: usize = PIECE_SQUARE_KEYS;
const EN_PASSANT_BASE: usize = PIECE_SQUARE_KEYS + CASTLING_KEYS;
const SIDE_TO_MOVE_INDEX: usize = PIECE_SQUARE_KEYS + CASTLING_KEYS + EN_PASSANT_KEYS;

static KEYS: LazyLock<[u64; TOTAL_KEYS]> = LazyLock::new(|| {
    let mut rng = StdRng::seed_from_u64(ZOBRIST_SEED);
    let mut keys = [0u64; TOTAL_KEYS];
    for key in &mut keys {
        *key = rng.next_u64();
    }
    keys
});

/// Force construction of the key table. Called once from [`crate::initialize`].
pub(crate) fn force_init() {
    LazyLock::force(&KEYS);
}

#[inline]
fn piece_square_index(color: Color, piece_type: PieceType, sq: Square) -> usize {
    color.index() * 384 + piece_type.index() * 64 + sq.index()
}

/// Running Zobrist hash for a position, updated incrementally by XOR.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Zobrist(pub(crate) u64);

impl Zobrist {
    #[must_use]
    pub const fn zero() -> Self {
        Zobrist(0)
    }

    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    #[inline]
    pub(crate) fn toggle_piece(&mut self, color: Color, piece_type: PieceType, sq: Square) {
        self.0 ^= KEYS[piece_square_index(color, piece_type, sq)];
    }

    #[inline]
    pub(crate) fn toggle_castling(&mut self, rights: CastlingRights) {
        self.0 ^= KEYS[CASTLING_BASE + rights.as_u8() as usize];
    }

    #[inline]
    pub(crate) fn toggle_en_passant(&mut self, sq: Option<Square>) {
        let idx = sq.map_or(64, Square::index);
        self.0 ^= KEYS[EN_PASSANT_BASE + idx];
    }

    #[inline]
    pub(crate) fn toggle_side_to_move(&mut self) {
        self.0 ^= KEYS[SIDE_TO_MOVE_INDEX];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_table_has_no_duplicate_values() {
        let mut seen = std::collections::HashSet::new();
        for &k in KEYS.iter() {
            assert!(seen.insert(k), "duplicate zobrist key generated");
        }
    }

    #[test]
    fn toggling_twice_is_identity() {
        let mut z = Zobrist::zero();
        let sq = Square::new(3, 4);
        z.toggle_piece(Color::White, PieceType::Knight, sq);
        z.toggle_piece(Color::White, PieceType::Knight, sq);
        assert_eq!(z.value(), 0);
    }

    #[test]
    fn side_to_move_and_en_passant_keys_are_independent() {
        let mut a = Zobrist::zero();
        a.toggle_side_to_move();
        let mut b = Zobrist::zero();
        b.toggle_en_passant(None);
        assert_ne!(a.value(), b.value());
    }
}
