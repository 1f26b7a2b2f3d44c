//! Board representation, move generation, and NNUE evaluation core for a
//! chess engine.
//!
//! This crate is deliberately scoped to the engine's core: bitboards,
//! attack tables, Zobrist hashing, make/unmake, move generation, move
//! ordering, Static Exchange Evaluation, and an NNUE evaluator. It does not
//! include a search driver, a UCI front end, or a CLI.
//!
//! Call [`initialize`] once before constructing a [`board::Board`]:
//!
//! ```
//! chess_core::initialize();
//! let board = chess_core::board::Board::starting_position();
//! ```

pub mod board;
pub mod zobrist;

use once_cell::sync::OnceCell;

static INIT: OnceCell<()> = OnceCell::new();

/// Build every lazily-constructed static table this crate owns: attack
/// tables (leaper and magic slider tables), board-space geometry, and
/// Zobrist keys.
///
/// Idempotent: the first call does the work, every later call is a no-op.
/// Not required before use — the tables build lazily on first access
/// regardless — but calling it up front avoids paying that cost on the
/// first move generated or position hashed.
pub fn initialize() {
    INIT.get_or_init(|| {
        board::force_init();
        zobrist::force_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_is_idempotent() {
        initialize();
        initialize();
    }
}
