//! Transposition table: one always-probed slot per index.
//!
//! Each slot keeps the full 64-bit key so index collisions are detected
//! exactly. The table is owned by a single [`Searcher`](crate::Searcher)
//! and needs no synchronisation.

use miluva_core::Move;

use crate::search::negamax::MATE_THRESHOLD;

/// How the stored score relates to the true value of the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// The score is exact (PV node).
    Exact,
    /// The search failed high: the true score is at least this.
    Lower,
    /// The search failed low: the true score is at most this.
    Upper,
}

/// One stored search result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtEntry {
    pub key: u64,
    pub best_move: Move,
    /// Score in node-relative mate distance (see [`score_to_tt`]).
    pub score: i32,
    pub depth: i32,
    pub bound: Bound,
    /// Game ply of the search root that wrote the entry.
    pub age: u32,
}

/// Convert a root-relative mate score to node-relative before storing.
pub fn score_to_tt(score: i32, ply: usize) -> i32 {
    if score >= MATE_THRESHOLD {
        score + ply as i32
    } else if score <= -MATE_THRESHOLD {
        score - ply as i32
    } else {
        score
    }
}

/// Reverse of [`score_to_tt`] for a probe made at `ply`.
pub fn score_from_tt(score: i32, ply: usize) -> i32 {
    if score >= MATE_THRESHOLD {
        score - ply as i32
    } else if score <= -MATE_THRESHOLD {
        score + ply as i32
    } else {
        score
    }
}

pub struct TranspositionTable {
    slots: Vec<Option<TtEntry>>,
    mask: usize,
    age: u32,
}

impl TranspositionTable {
    /// Allocate roughly `mb` megabytes, rounded down to a power-of-two
    /// number of slots.
    pub fn new(mb: usize) -> Self {
        let slot_size = std::mem::size_of::<Option<TtEntry>>();
        let wanted = (mb.max(1) * 1024 * 1024) / slot_size;
        let count = if wanted.is_power_of_two() {
            wanted
        } else {
            (wanted.next_power_of_two() >> 1).max(1)
        };
        Self {
            slots: vec![None; count],
            mask: count - 1,
            age: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.slots.fill(None);
        self.age = 0;
    }

    /// Stamp later stores with the game ply of the new search root.
    pub fn set_age(&mut self, root_ply: u32) {
        self.age = root_ply;
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    /// Entry for `key`, with its score converted back to root-relative
    /// distance for a node at `ply`.
    pub fn probe(&self, key: u64, ply: usize) -> Option<TtEntry> {
        let entry = self.slots[key as usize & self.mask]?;
        if entry.key != key {
            return None;
        }
        Some(TtEntry {
            score: score_from_tt(entry.score, ply),
            ..entry
        })
    }

    /// Store a result.
    ///
    /// An occupied slot is overwritten only when the new result searched at
    /// least as deep or the resident entry belongs to an older root.
    pub fn store(&mut self, key: u64, best_move: Move, score: i32, depth: i32, bound: Bound, ply: usize) {
        let slot = &mut self.slots[key as usize & self.mask];
        if let Some(existing) = slot
            && depth < existing.depth
            && existing.age >= self.age
        {
            return;
        }
        *slot = Some(TtEntry {
            key,
            best_move,
            score: score_to_tt(score, ply),
            depth,
            bound,
            age: self.age,
        });
    }

    /// Per-mille of slots filled, sampled from the first thousand.
    pub fn hashfull(&self) -> usize {
        let sample = self.slots.len().min(1000);
        let used = self.slots[..sample]
            .iter()
            .filter(|slot| slot.is_some_and(|e| e.age == self.age))
            .count();
        used * 1000 / sample.max(1)
    }
}

impl std::fmt::Debug for TranspositionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranspositionTable")
            .field("slots", &self.slots.len())
            .field("age", &self.age)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::negamax::MATE_SCORE;
    use miluva_core::{PieceKind, Square};

    fn e2e4() -> Move {
        Move::double_push(Square::E2, Square::E4)
    }

    fn g1f3() -> Move {
        Move::quiet(Square::G1, Square::F3, PieceKind::Knight)
    }

    #[test]
    fn size_is_power_of_two() {
        let tt = TranspositionTable::new(1);
        assert!(tt.len().is_power_of_two());
        assert!(tt.len() * std::mem::size_of::<Option<TtEntry>>() <= 1024 * 1024);
    }

    #[test]
    fn store_and_probe() {
        let mut tt = TranspositionTable::new(1);
        let key = 0xDEAD_BEEF_1234_5678;
        tt.store(key, e2e4(), 42, 5, Bound::Exact, 0);

        let entry = tt.probe(key, 0).unwrap();
        assert_eq!(entry.best_move, e2e4());
        assert_eq!(entry.score, 42);
        assert_eq!(entry.depth, 5);
        assert_eq!(entry.bound, Bound::Exact);
        assert!(tt.probe(key ^ 1, 0).is_none());
    }

    #[test]
    fn colliding_index_with_other_key_misses() {
        let mut tt = TranspositionTable::new(1);
        let key = 7u64;
        let other = key + tt.len() as u64;
        tt.store(key, e2e4(), 1, 1, Bound::Exact, 0);
        assert!(tt.probe(other, 0).is_none());
    }

    #[test]
    fn shallower_store_same_age_is_rejected() {
        let mut tt = TranspositionTable::new(1);
        let key = 0x1111_2222_3333_4444;
        tt.store(key, e2e4(), 10, 6, Bound::Lower, 0);
        tt.store(key, g1f3(), 20, 3, Bound::Lower, 0);
        assert_eq!(tt.probe(key, 0).unwrap().best_move, e2e4());

        tt.store(key, g1f3(), 30, 6, Bound::Upper, 0);
        assert_eq!(tt.probe(key, 0).unwrap().best_move, g1f3());
    }

    #[test]
    fn older_entries_are_replaced() {
        let mut tt = TranspositionTable::new(1);
        let key = 0xAAAA_BBBB_CCCC_DDDD;
        tt.store(key, e2e4(), 10, 12, Bound::Exact, 0);
        tt.set_age(4);
        tt.store(key, g1f3(), 20, 1, Bound::Lower, 0);

        let entry = tt.probe(key, 0).unwrap();
        assert_eq!(entry.best_move, g1f3());
        assert_eq!(entry.age, 4);
    }

    #[test]
    fn mate_scores_are_path_independent() {
        let mut tt = TranspositionTable::new(1);
        let key = 99;
        // Mate found three plies below a node at ply 5.
        tt.store(key, e2e4(), MATE_SCORE - 8, 4, Bound::Exact, 5);
        // The same node reached at ply 2 is a mate in five from the root.
        assert_eq!(tt.probe(key, 2).unwrap().score, MATE_SCORE - 5);

        assert_eq!(score_from_tt(score_to_tt(-(MATE_SCORE - 7), 7), 7), -(MATE_SCORE - 7));
        assert_eq!(score_to_tt(150, 10), 150);
    }

    #[test]
    fn clear_empties_table() {
        let mut tt = TranspositionTable::new(1);
        tt.store(5, e2e4(), 1, 1, Bound::Exact, 0);
        assert!(tt.hashfull() > 0);
        tt.clear();
        assert!(tt.probe(5, 0).is_none());
        assert_eq!(tt.hashfull(), 0);
    }
}
