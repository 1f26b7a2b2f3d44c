//! Magic bitboards for bishop and rook attacks.
//!
//! For each square and slider type we hold a mask of relevant-occupancy
//! squares, a magic multiplier, and a right shift; `(occupancy & mask) *
//! magic >> shift` indexes into a dense per-square attack subtable. Magics
//! are found once, at table-build time, by rejection search over sparse
//! 64-bit randoms from a fixed-seed generator so the tables are identical
//! across runs.

use rand::{RngCore, SeedableRng};
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Seed for the magic-number search RNG. Fixed so initialized tables are
/// deterministic across processes and machines.
const MAGIC_SEED: u64 = 0x4D61_6769_6321_2021;

const ROOK_DIRECTIONS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DIRECTIONS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

fn sq_rank(sq: usize) -> i32 {
    (sq / 8) as i32
}
fn sq_file(sq: usize) -> i32 {
    (sq % 8) as i32
}
fn make_sq(r: i32, f: i32) -> usize {
    (r * 8 + f) as usize
}

/// Relevant-occupancy mask: a slider's empty-board attack set minus the
/// board-edge squares not on the slider's own rank/file.
fn relevant_mask(sq: usize, directions: &[(i32, i32); 4]) -> u64 {
    let mut mask = 0u64;
    let (r0, f0) = (sq_rank(sq), sq_file(sq));
    for &(dr, df) in directions {
        let (mut r, mut f) = (r0 + dr, f0 + df);
        while (1..7).contains(&r) && (1..7).contains(&f) {
            mask |= 1u64 << make_sq(r, f);
            r += dr;
            f += df;
        }
    }
    mask
}

/// True attacks from `sq` given a concrete blocker set, by ray-scanning to
/// (and including) the first blocker in each direction.
fn attacks_with_blockers(sq: usize, directions: &[(i32, i32); 4], blockers: u64) -> u64 {
    let mut attacks = 0u64;
    let (r0, f0) = (sq_rank(sq), sq_file(sq));
    for &(dr, df) in directions {
        let (mut r, mut f) = (r0 + dr, f0 + df);
        while (0..8).contains(&r) && (0..8).contains(&f) {
            let bit = 1u64 << make_sq(r, f);
            attacks |= bit;
            if blockers & bit != 0 {
                break;
            }
            r += dr;
            f += df;
        }
    }
    attacks
}

/// Enumerate every occupancy subset of `mask` via the carry-rippler trick.
fn subsets(mask: u64) -> Vec<u64> {
    let mut out = Vec::with_capacity(1 << mask.count_ones());
    let mut subset = 0u64;
    loop {
        out.push(subset);
        subset = subset.wrapping_sub(mask) & mask;
        if subset == 0 {
            break;
        }
    }
    out
}

fn random_sparse_u64(rng: &mut StdRng) -> u64 {
    rng.next_u64() & rng.next_u64() & rng.next_u64()
}

/// Find a magic multiplier for `sq` that produces no index collision between
/// occupancies whose true attack sets differ, over every relevant-occupancy
/// subset. Panics if no candidate is found within the attempt budget — with
/// the fixed seed and correctly sized shift this never happens in practice.
fn find_magic(sq: usize, directions: &[(i32, i32); 4], rng: &mut StdRng) -> (u64, u32, u64) {
    let mask = relevant_mask(sq, directions);
    let bits = mask.count_ones();
    let shift = 64 - bits;
    let occupancies = subsets(mask);
    let reference: Vec<u64> = occupancies
        .iter()
        .map(|&occ| attacks_with_blockers(sq, directions, occ))
        .collect();

    for _ in 0..1_000_000 {
        let magic = random_sparse_u64(rng);
        // A magic candidate must spread the mask's high bits across the
        // index; reject multipliers that fail this cheap pre-filter.
        if ((mask.wrapping_mul(magic)) & 0xFF00_0000_0000_0000).count_ones() < 6 {
            continue;
        }
        let mut seen: HashMap<u64, u64> = HashMap::with_capacity(occupancies.len());
        let mut collided = false;
        for (occ, &attacks) in occupancies.iter().zip(reference.iter()) {
            let index = (occ.wrapping_mul(magic)) >> shift;
            match seen.get(&index) {
                Some(&existing) if existing != attacks => {
                    collided = true;
                    break;
                }
                _ => {
                    seen.insert(index, attacks);
                }
            }
        }
        if !collided {
            #[cfg(feature = "logging")]
            log::debug!("magic number search completed for square {sq} (shift {shift})");
            return (magic, shift, mask);
        }
    }
    panic!("magic number search exhausted attempt budget for square {sq}");
}

pub(crate) struct MagicEntry {
    magic: u64,
    shift: u32,
    mask: u64,
    table: Box<[u64]>,
}

impl MagicEntry {
    #[inline]
    fn attacks(&self, occupancy: u64) -> u64 {
        let index = ((occupancy & self.mask).wrapping_mul(self.magic)) >> self.shift;
        self.table[index as usize]
    }
}

fn build_table(directions: &[(i32, i32); 4]) -> Vec<MagicEntry> {
    let mut rng = StdRng::seed_from_u64(MAGIC_SEED);
    (0..64)
        .map(|sq| {
            let (magic, shift, mask) = find_magic(sq, directions, &mut rng);
            let occupancies = subsets(mask);
            let mut table = vec![0u64; 1usize << (64 - shift)];
            for occ in occupancies {
                let index = (occ.wrapping_mul(magic)) >> shift;
                table[index as usize] = attacks_with_blockers(sq, directions, occ);
            }
            MagicEntry {
                magic,
                shift,
                mask,
                table: table.into_boxed_slice(),
            }
        })
        .collect()
}

static ROOK_MAGICS: LazyLock<Vec<MagicEntry>> = LazyLock::new(|| build_table(&ROOK_DIRECTIONS));
static BISHOP_MAGICS: LazyLock<Vec<MagicEntry>> = LazyLock::new(|| build_table(&BISHOP_DIRECTIONS));

#[must_use]
pub(crate) fn rook_attacks(sq: usize, occupancy: u64) -> u64 {
    ROOK_MAGICS[sq].attacks(occupancy)
}

#[must_use]
pub(crate) fn bishop_attacks(sq: usize, occupancy: u64) -> u64 {
    BISHOP_MAGICS[sq].attacks(occupancy)
}

#[must_use]
pub(crate) fn queen_attacks(sq: usize, occupancy: u64) -> u64 {
    rook_attacks(sq, occupancy) | bishop_attacks(sq, occupancy)
}

/// Force construction of both magic tables. Called from
/// [`crate::initialize`] so the (relatively expensive) search runs once, up
/// front, rather than lazily on the first move generated.
pub(crate) fn force_init() {
    LazyLock::force(&ROOK_MAGICS);
    LazyLock::force(&BISHOP_MAGICS);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force(sq: usize, directions: &[(i32, i32); 4], occ: u64) -> u64 {
        attacks_with_blockers(sq, directions, occ)
    }

    #[test]
    fn rook_attacks_match_brute_force_on_sample_occupancies() {
        for sq in [0usize, 27, 63, 7, 56] {
            for occ in [0u64, 0xFF00_FF00_FF00_FF00, 0x0010_0010_0010_0010] {
                assert_eq!(
                    rook_attacks(sq, occ),
                    brute_force(sq, &ROOK_DIRECTIONS, occ),
                    "square {sq} occ {occ:#x}"
                );
            }
        }
    }

    #[test]
    fn bishop_attacks_match_brute_force_on_sample_occupancies() {
        for sq in [0usize, 27, 63, 7, 56] {
            for occ in [0u64, 0xFF00_FF00_FF00_FF00, 0x0010_0010_0010_0010] {
                assert_eq!(
                    bishop_attacks(sq, occ),
                    brute_force(sq, &BISHOP_DIRECTIONS, occ),
                    "square {sq} occ {occ:#x}"
                );
            }
        }
    }

    #[test]
    fn rook_on_empty_board_covers_full_rank_and_file() {
        let attacks = rook_attacks(28, 0); // e4
        assert_eq!(attacks.count_ones(), 14);
    }

    #[test]
    fn queen_attacks_is_union_of_rook_and_bishop() {
        let occ = 0x0000_0010_0000_0000;
        assert_eq!(
            queen_attacks(28, occ),
            rook_attacks(28, occ) | bishop_attacks(28, occ)
        );
    }
}
