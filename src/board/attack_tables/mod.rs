//! Attack tables for move generation: precomputed leaper tables plus
//! magic-indexed slider attacks, with x-ray attack derivation on top.

mod magic;
mod tables;

pub(crate) use tables::{KING_ATTACKS, KNIGHT_ATTACKS, PAWN_ATTACKS};

use super::types::{Bitboard, Color, Square};

/// Force construction of every lazily-built attack table. Called once from
/// [`crate::initialize`].
pub(crate) fn force_init() {
    std::sync::LazyLock::force(&KNIGHT_ATTACKS);
    std::sync::LazyLock::force(&KING_ATTACKS);
    std::sync::LazyLock::force(&PAWN_ATTACKS);
    magic::force_init();
}

#[inline]
#[must_use]
pub(crate) fn knight_attacks(sq: Square) -> Bitboard {
    Bitboard(KNIGHT_ATTACKS[sq.index()])
}

#[inline]
#[must_use]
pub(crate) fn king_attacks(sq: Square) -> Bitboard {
    Bitboard(KING_ATTACKS[sq.index()])
}

#[inline]
#[must_use]
pub(crate) fn pawn_attacks(color: Color, sq: Square) -> Bitboard {
    Bitboard(PAWN_ATTACKS[color.index()][sq.index()])
}

#[inline]
#[must_use]
pub(crate) fn bishop_attacks(sq: Square, occupancy: Bitboard) -> Bitboard {
    Bitboard(magic::bishop_attacks(sq.index(), occupancy.0))
}

#[inline]
#[must_use]
pub(crate) fn rook_attacks(sq: Square, occupancy: Bitboard) -> Bitboard {
    Bitboard(magic::rook_attacks(sq.index(), occupancy.0))
}

#[inline]
#[must_use]
pub(crate) fn queen_attacks(sq: Square, occupancy: Bitboard) -> Bitboard {
    Bitboard(magic::queen_attacks(sq.index(), occupancy.0))
}

/// Squares attacking `sq`, given the full occupancy and the attacking side's
/// per-type bitboards.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub(crate) fn attackers_to(
    sq: Square,
    occupancy: Bitboard,
    attacker_color: Color,
    pawns: Bitboard,
    knights: Bitboard,
    bishops_queens: Bitboard,
    rooks_queens: Bitboard,
    king: Bitboard,
) -> Bitboard {
    let pawn_hits = pawn_attacks(attacker_color.opponent(), sq).and(pawns);
    let knight_hits = knight_attacks(sq).and(knights);
    let king_hits = king_attacks(sq).and(king);
    let diag_hits = bishop_attacks(sq, occupancy).and(bishops_queens);
    let ortho_hits = rook_attacks(sq, occupancy).and(rooks_queens);
    pawn_hits.or(knight_hits).or(king_hits).or(diag_hits).or(ortho_hits)
}

/// X-ray attack on `sq`: the continuation of a sliding attack past the first
/// blocker in `blockers`, computed by removing those blockers and
/// recomputing. `sliders` restricts the result to the attackers of interest
/// (e.g. bishops+queens for a diagonal x-ray).
#[must_use]
pub(crate) fn xray_attacks(
    sq: Square,
    occupancy: Bitboard,
    blockers: Bitboard,
    sliders: Bitboard,
    bishop: bool,
) -> Bitboard {
    let direct = if bishop {
        bishop_attacks(sq, occupancy)
    } else {
        rook_attacks(sq, occupancy)
    };
    let removed = occupancy.xor(direct.and(blockers));
    let behind = if bishop {
        bishop_attacks(sq, removed)
    } else {
        rook_attacks(sq, removed)
    };
    direct.xor(behind).and(sliders)
}
