//! Move ordering and selection: a generator-style picker combining discrete
//! bucketing (classify each move into the first bucket whose rule accepts
//! it) with continuous sorting (partial selection sort by score within a
//! bucket), cascading across generation phases according to a
//! [`CascadeMode`].

use super::movegen::{is_legal_given_pseudo_legal, GenMode};
use super::types::{Move, MoveList, ScoredMoveList};
use super::Board;

/// How the selector behaves once the current generation phase is exhausted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CascadeMode {
    /// Never leaves the phase it was constructed with.
    Strict,
    /// Advances to the next phase exactly once, when the first is exhausted.
    PartialCascade,
    /// Keeps advancing through every remaining phase until moves run out.
    FullCascade,
}

/// The ordered generation phases a cascading selector walks through.
const PHASES: [GenMode; 3] = [GenMode::Capture, GenMode::QuietCheck, GenMode::Quiet];

/// Classifies a move into a bucket. Applied in order; the first rule that
/// returns `true` wins. A move matching no rule falls into an implicit
/// last bucket.
pub type BucketRule = fn(&Board, Move) -> bool;

fn default_rules(phase: GenMode) -> Vec<BucketRule> {
    match phase {
        GenMode::Capture => vec![(|board: &Board, mv: Move| board.see(mv) >= 0) as BucketRule],
        _ => Vec::new(),
    }
}

fn score_move(board: &Board, mv: Move) -> i32 {
    if mv.is_capture() {
        board.see(mv)
    } else if let Some(promo) = mv.promotion() {
        promo.see_value()
    } else {
        0
    }
}

fn bucket_of(board: &Board, mv: Move, rules: &[BucketRule]) -> usize {
    rules
        .iter()
        .position(|rule| rule(board, mv))
        .unwrap_or(rules.len())
}

/// A cursor through one generation phase's moves, already split into
/// buckets and scored for in-bucket sorting.
struct PhaseMoves {
    list: MoveList,
    scored: ScoredMoveList,
    buckets: Vec<Vec<usize>>,
    bucket_idx: usize,
    slot_idx: usize,
}

impl PhaseMoves {
    fn generate(board: &Board, phase: GenMode, rules: &[BucketRule]) -> Self {
        let mut list = MoveList::new();
        board.generate(phase, &mut list);

        let mut scored = ScoredMoveList::new();
        let mut buckets = vec![Vec::new(); rules.len() + 1];
        for (idx, &mv) in list.iter().enumerate() {
            scored.push(mv, score_move(board, mv));
            buckets[bucket_of(board, mv, rules)].push(idx);
        }

        PhaseMoves {
            list,
            scored,
            buckets,
            bucket_idx: 0,
            slot_idx: 0,
        }
    }

    /// Stable-sort every bucket descending by score, eagerly.
    fn sort_all(&mut self) {
        let scores = self.scored.as_slice();
        for bucket in &mut self.buckets {
            bucket.sort_by(|&a, &b| scores[b].score.cmp(&scores[a].score));
        }
    }

    /// Pop the next-best move out of the current bucket, advancing past
    /// exhausted buckets. `None` once every bucket is drained.
    fn pop_best(&mut self) -> Option<Move> {
        loop {
            if self.bucket_idx >= self.buckets.len() {
                return None;
            }
            let bucket = &self.buckets[self.bucket_idx];
            if self.slot_idx >= bucket.len() {
                self.bucket_idx += 1;
                self.slot_idx = 0;
                continue;
            }

            let scores = self.scored.as_slice();
            let bucket = &mut self.buckets[self.bucket_idx];
            let (mut best_pos, mut best_score) = (self.slot_idx, scores[bucket[self.slot_idx]].score);
            for pos in (self.slot_idx + 1)..bucket.len() {
                if scores[bucket[pos]].score > best_score {
                    best_score = scores[bucket[pos]].score;
                    best_pos = pos;
                }
            }
            bucket.swap(self.slot_idx, best_pos);
            let idx = bucket[self.slot_idx];
            self.slot_idx += 1;
            return Some(self.list[idx]);
        }
    }
}

/// Generator-style move selector tied to a single board reference.
/// Generating with [`Board::generate`] or making a move invalidates any
/// outstanding selector over that board — construct a fresh one afterward.
pub struct Selector<'a> {
    board: &'a Board,
    cascade: CascadeMode,
    phase: usize,
    max_phase: usize,
    rules: Vec<BucketRule>,
    current: Option<PhaseMoves>,
    excluded: Vec<Move>,
    last_returned: Option<Move>,
    pending_restore: bool,
}

impl<'a> Selector<'a> {
    /// A selector starting at `phase` (one of the three cascade phases —
    /// capture, quiet-check, or quiet) with the given cascade behavior.
    #[must_use]
    pub fn new(board: &'a Board, phase: GenMode, cascade: CascadeMode) -> Self {
        let start = PHASES.iter().position(|&p| p == phase).unwrap_or(0);
        Selector {
            board,
            cascade,
            phase: start,
            max_phase: start,
            rules: default_rules(PHASES[start]),
            current: None,
            excluded: Vec::new(),
            last_returned: None,
            pending_restore: false,
        }
    }

    /// Add a classification rule for the *current* phase. Has no effect on
    /// a phase whose moves have already been generated and bucketed.
    pub fn add_rule(&mut self, rule: BucketRule) {
        self.rules.push(rule);
    }

    /// Force an eager sort of every bucket in the current phase instead of
    /// relying on lazy partial selection.
    pub fn sort(&mut self) {
        if self.current.is_none() {
            self.current = Some(PhaseMoves::generate(self.board, PHASES[self.phase], &self.rules));
        }
        if let Some(phase_moves) = &mut self.current {
            phase_moves.sort_all();
        }
    }

    /// Don't return `mv` again, even if it's revisited by a later phase.
    pub fn exclude(&mut self, mv: Move) {
        self.excluded.push(mv);
    }

    /// Clear the excluded-moves list.
    pub fn include_all(&mut self) {
        self.excluded.clear();
    }

    /// Re-offer the most recently returned move on the next call to
    /// [`Selector::next`].
    pub fn restore_last(&mut self) {
        if self.last_returned.is_some() {
            self.pending_restore = true;
        }
    }

    /// The next move, or `None` once every reachable phase is drained.
    /// Skips moves that fail legality at selection time and moves on the
    /// excluded list.
    pub fn next(&mut self) -> Option<Move> {
        if self.pending_restore {
            self.pending_restore = false;
            if let Some(mv) = self.last_returned {
                if !self.excluded.contains(&mv) {
                    return Some(mv);
                }
            }
        }

        loop {
            if self.current.is_none() {
                self.current = Some(PhaseMoves::generate(self.board, PHASES[self.phase], &self.rules));
            }
            let mv = self.current.as_mut().and_then(PhaseMoves::pop_best);

            match mv {
                Some(mv) => {
                    if self.excluded.contains(&mv) {
                        continue;
                    }
                    if !is_legal_given_pseudo_legal(self.board, mv) {
                        continue;
                    }
                    self.last_returned = Some(mv);
                    return Some(mv);
                }
                None => {
                    let can_cascade = match self.cascade {
                        CascadeMode::Strict => false,
                        CascadeMode::PartialCascade => self.phase == self.max_phase,
                        CascadeMode::FullCascade => true,
                    };
                    if can_cascade && self.phase + 1 < PHASES.len() {
                        self.phase += 1;
                        self.max_phase = self.max_phase.max(self.phase);
                        self.rules = default_rules(PHASES[self.phase]);
                        self.current = None;
                    } else {
                        return None;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_selector_never_leaves_its_phase() {
        let board = Board::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let mut sel = Selector::new(&board, GenMode::Capture, CascadeMode::Strict);
        assert!(sel.next().is_some());
        assert!(sel.next().is_none());
    }

    #[test]
    fn full_cascade_eventually_reaches_quiet_moves() {
        let board = Board::starting_position();
        let mut sel = Selector::new(&board, GenMode::Capture, CascadeMode::FullCascade);
        let mut count = 0;
        while sel.next().is_some() {
            count += 1;
        }
        assert_eq!(count, 20);
    }

    #[test]
    fn excluded_move_is_never_returned() {
        let board = Board::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let mut sel = Selector::new(&board, GenMode::Capture, CascadeMode::Strict);
        let first = sel.next().expect("a capture exists");
        let mut sel = Selector::new(&board, GenMode::Capture, CascadeMode::Strict);
        sel.exclude(first);
        assert!(sel.next().is_none());
    }

    #[test]
    fn restore_last_repeats_the_move_once() {
        let board = Board::starting_position();
        let mut sel = Selector::new(&board, GenMode::Quiet, CascadeMode::Strict);
        let first = sel.next().unwrap();
        sel.restore_last();
        assert_eq!(sel.next(), Some(first));
        let second = sel.next().unwrap();
        assert_ne!(second, first);
    }
}
