//! Board-space geometry: precomputed path/line/box/span tables and the
//! `aligned` family of queries that sit on top of them.
//!
//! Every table here is immutable once built and indexed `[from][to]` (or, for
//! spans, `[square][direction]`); nothing in this module mutates after the
//! `LazyLock`s first resolve.

use std::sync::LazyLock;

use super::types::{Bitboard, Square};

const N: usize = 64;

fn ray_direction(a: Square, b: Square) -> Option<(i32, i32)> {
    if a == b {
        return None;
    }
    let dr = b.rank() as i32 - a.rank() as i32;
    let df = b.file() as i32 - a.file() as i32;
    if dr == 0 {
        Some((0, df.signum()))
    } else if df == 0 {
        Some((dr.signum(), 0))
    } else if dr.abs() == df.abs() {
        Some((dr.signum(), df.signum()))
    } else {
        None
    }
}

fn build_paths_and_lines() -> (Box<[Bitboard]>, Box<[Bitboard]>) {
    let mut paths = vec![Bitboard::EMPTY; N * N].into_boxed_slice();
    let mut lines = vec![Bitboard::EMPTY; N * N].into_boxed_slice();

    for a_idx in 0..N {
        let a = Square::from_index(a_idx);
        paths[a_idx * N + a_idx] = Bitboard::from_square(a);

        for b_idx in 0..N {
            if a_idx == b_idx {
                continue;
            }
            let b = Square::from_index(b_idx);
            let Some((dr, df)) = ray_direction(a, b) else {
                continue;
            };

            // Inclusive segment from a to b along the ray.
            let mut seg = Bitboard::EMPTY;
            let (mut r, mut f) = (a.rank() as i32, a.file() as i32);
            loop {
                seg = seg.or(Bitboard::from_square(Square::new(r as usize, f as usize)));
                if r == b.rank() as i32 && f == b.file() as i32 {
                    break;
                }
                r += dr;
                f += df;
            }
            paths[a_idx * N + b_idx] = seg;

            // Full line through a and b, extended to the board edges both ways.
            let mut full = Bitboard::EMPTY;
            let (mut r, mut f) = (a.rank() as i32, a.file() as i32);
            while (0..8).contains(&r) && (0..8).contains(&f) {
                full = full.or(Bitboard::from_square(Square::new(r as usize, f as usize)));
                r -= dr;
                f -= df;
            }
            let (mut r, mut f) = (a.rank() as i32 + dr, a.file() as i32 + df);
            while (0..8).contains(&r) && (0..8).contains(&f) {
                full = full.or(Bitboard::from_square(Square::new(r as usize, f as usize)));
                r += dr;
                f += df;
            }
            lines[a_idx * N + b_idx] = full;
        }
    }

    (paths, lines)
}

fn build_boxes() -> Box<[Bitboard]> {
    let mut boxes = vec![Bitboard::EMPTY; N * N].into_boxed_slice();
    for a_idx in 0..N {
        let a = Square::from_index(a_idx);
        for b_idx in 0..N {
            let b = Square::from_index(b_idx);
            let (r_lo, r_hi) = (a.rank().min(b.rank()), a.rank().max(b.rank()));
            let (f_lo, f_hi) = (a.file().min(b.file()), a.file().max(b.file()));
            let mut mask = Bitboard::EMPTY;
            for r in r_lo..=r_hi {
                for f in f_lo..=f_hi {
                    mask = mask.or(Bitboard::from_square(Square::new(r, f)));
                }
            }
            boxes[a_idx * N + b_idx] = mask;
        }
    }
    boxes
}

/// The four span sectors a square can look toward: three files ahead/behind
/// (north/south) or three ranks ahead/behind (east/west).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpanDirection {
    North,
    South,
    East,
    West,
}

fn build_spans() -> Box<[[Bitboard; 4]]> {
    let mut spans = vec![[Bitboard::EMPTY; 4]; N].into_boxed_slice();
    for sq_idx in 0..N {
        let sq = Square::from_index(sq_idx);
        let file_band = [sq.file() as i32 - 1, sq.file() as i32, sq.file() as i32 + 1]
            .into_iter()
            .filter(|&f| (0..8).contains(&f))
            .fold(Bitboard::EMPTY, |acc, f| acc.or(Bitboard::file_mask(f as usize)));
        let rank_band = [sq.rank() as i32 - 1, sq.rank() as i32, sq.rank() as i32 + 1]
            .into_iter()
            .filter(|&r| (0..8).contains(&r))
            .fold(Bitboard::EMPTY, |acc, r| acc.or(Bitboard::rank_mask(r as usize)));

        let ranks_ahead = (sq.rank() + 1..8).fold(Bitboard::EMPTY, |acc, r| acc.or(Bitboard::rank_mask(r)));
        let ranks_behind = (0..sq.rank()).fold(Bitboard::EMPTY, |acc, r| acc.or(Bitboard::rank_mask(r)));
        let files_ahead = (sq.file() + 1..8).fold(Bitboard::EMPTY, |acc, f| acc.or(Bitboard::file_mask(f)));
        let files_behind = (0..sq.file()).fold(Bitboard::EMPTY, |acc, f| acc.or(Bitboard::file_mask(f)));

        spans[sq_idx] = [
            file_band.and(ranks_ahead),
            file_band.and(ranks_behind),
            rank_band.and(files_ahead),
            rank_band.and(files_behind),
        ];
    }
    spans
}

static PATHS: LazyLock<Box<[Bitboard]>> = LazyLock::new(|| build_paths_and_lines().0);
static LINES: LazyLock<Box<[Bitboard]>> = LazyLock::new(|| build_paths_and_lines().1);
static BOXES: LazyLock<Box<[Bitboard]>> = LazyLock::new(build_boxes);
static SPANS: LazyLock<Box<[[Bitboard; 4]]>> = LazyLock::new(build_spans);

/// Force construction of every lazily-built geometry table. Called once
/// from [`crate::initialize`].
pub(crate) fn force_init() {
    LazyLock::force(&PATHS);
    LazyLock::force(&LINES);
    LazyLock::force(&BOXES);
    LazyLock::force(&SPANS);
}

/// Inclusive set of squares on the file/rank/diagonal from `a` to `b`, or
/// empty if the two squares do not share one of those lines.
#[must_use]
pub fn path(a: Square, b: Square) -> Bitboard {
    PATHS[a.index() * N + b.index()]
}

/// The full file/rank/diagonal through `a` and `b`, or empty if unaligned.
#[must_use]
pub fn line(a: Square, b: Square) -> Bitboard {
    LINES[a.index() * N + b.index()]
}

/// The rectangle with opposite corners `a` and `b`.
#[must_use]
pub fn bounding_box(a: Square, b: Square) -> Bitboard {
    BOXES[a.index() * N + b.index()]
}

/// A three-file/rank ahead-or-behind sector relative to `sq`.
#[must_use]
pub fn span(sq: Square, dir: SpanDirection) -> Bitboard {
    let idx = match dir {
        SpanDirection::North => 0,
        SpanDirection::South => 1,
        SpanDirection::East => 2,
        SpanDirection::West => 3,
    };
    SPANS[sq.index()][idx]
}

/// True if `a` and `b` share a file, rank, or diagonal (or are the same square).
#[must_use]
pub fn aligned(a: Square, b: Square) -> bool {
    a == b || !line(a, b).is_empty()
}

/// True if `a`, `b`, `c` all lie on one common file/rank/diagonal.
#[must_use]
pub fn aligned3(a: Square, b: Square, c: Square) -> bool {
    if a == b {
        return true;
    }
    line(a, b).contains(c)
}

/// True if `mid` lies strictly between `a` and `b` on their shared line.
#[must_use]
pub fn aligned_in_order(a: Square, mid: Square, b: Square) -> bool {
    mid != a && mid != b && path(a, b).contains(mid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_same_square_is_itself() {
        let a = Square::new(3, 3);
        assert_eq!(path(a, a), Bitboard::from_square(a));
    }

    #[test]
    fn path_along_rank() {
        let a1 = Square::new(0, 0);
        let d1 = Square::new(0, 3);
        let p = path(a1, d1);
        assert_eq!(p.popcount(), 4);
        assert!(p.contains(Square::new(0, 1)));
        assert!(p.contains(Square::new(0, 2)));
    }

    #[test]
    fn line_extends_past_endpoints() {
        let a1 = Square::new(0, 0);
        let h8 = Square::new(7, 7);
        let l = line(a1, h8);
        assert_eq!(l.popcount(), 8);
    }

    #[test]
    fn unaligned_squares_have_empty_path_and_line() {
        let a1 = Square::new(0, 0);
        let b3 = Square::new(2, 1);
        assert!(path(a1, b3).is_empty());
        assert!(line(a1, b3).is_empty());
        assert!(!aligned(a1, b3));
    }

    #[test]
    fn aligned3_detects_common_diagonal() {
        let a1 = Square::new(0, 0);
        let d4 = Square::new(3, 3);
        let h8 = Square::new(7, 7);
        assert!(aligned3(a1, d4, h8));
    }

    #[test]
    fn aligned_in_order_requires_strict_betweenness() {
        let a1 = Square::new(0, 0);
        let d1 = Square::new(0, 3);
        let h1 = Square::new(0, 7);
        assert!(aligned_in_order(a1, d1, h1));
        assert!(!aligned_in_order(a1, h1, d1));
        assert!(!aligned_in_order(a1, a1, h1));
    }

    #[test]
    fn bounding_box_covers_rectangle() {
        let b = bounding_box(Square::new(0, 0), Square::new(1, 2));
        assert_eq!(b.popcount(), 6);
    }

    #[test]
    fn span_north_is_three_files_ahead() {
        let e4 = Square::new(3, 4);
        let s = span(e4, SpanDirection::North);
        assert!(s.contains(Square::new(4, 3)));
        assert!(s.contains(Square::new(7, 5)));
        assert!(!s.contains(Square::new(3, 4)));
        assert!(!s.contains(Square::new(2, 4)));
    }
}
