//! Quiet-move ordering memory: killers, countermoves and history.
//!
//! All three tables are written only when a quiet move causes a beta
//! cutoff and are reset at the start of every root search.

use miluva_core::{Color, Move, PieceKind, Square};

use crate::search::negamax::MAX_PLY;

/// Two killer moves per ply.
pub struct KillerTable {
    slots: [[Move; 2]; MAX_PLY],
}

impl KillerTable {
    pub fn new() -> Self {
        Self {
            slots: [[Move::NULL; 2]; MAX_PLY],
        }
    }

    /// Push `mv` into slot 0, moving the old slot 0 to slot 1. Storing the
    /// current slot-0 move again changes nothing.
    pub fn store(&mut self, ply: usize, mv: Move) {
        let Some(slots) = self.slots.get_mut(ply) else {
            return;
        };
        if slots[0] != mv {
            slots[1] = slots[0];
            slots[0] = mv;
        }
    }

    /// The slot holding `mv` at `ply`, if any.
    pub fn slot_of(&self, ply: usize, mv: Move) -> Option<usize> {
        let slots = self.slots.get(ply)?;
        slots.iter().position(|&k| k == mv && !k.is_null())
    }

    pub fn clear(&mut self) {
        self.slots = [[Move::NULL; 2]; MAX_PLY];
    }
}

impl Default for KillerTable {
    fn default() -> Self {
        Self::new()
    }
}

/// The reply that last refuted a move, indexed by the refuted move's
/// color, piece and destination.
pub struct CounterMoveTable {
    table: [[[Move; 64]; PieceKind::COUNT]; Color::COUNT],
}

impl CounterMoveTable {
    pub fn new() -> Self {
        Self {
            table: [[[Move::NULL; 64]; PieceKind::COUNT]; Color::COUNT],
        }
    }

    /// Record `reply` as the refutation of `prev`, played by `prev_color`.
    pub fn store(&mut self, prev_color: Color, prev: Move, reply: Move) {
        if prev.is_null() {
            return;
        }
        self.table[prev_color.index()][prev.piece().index()][prev.to().index()] = reply;
    }

    pub fn get(&self, prev_color: Color, prev: Move) -> Move {
        if prev.is_null() {
            return Move::NULL;
        }
        self.table[prev_color.index()][prev.piece().index()][prev.to().index()]
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl Default for CounterMoveTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Absolute cap on history scores.
pub const HISTORY_MAX: i32 = 16_384;

/// Cutoff counts for quiet moves, indexed by mover color, piece and
/// destination.
pub struct HistoryTable {
    table: [[[i32; 64]; PieceKind::COUNT]; Color::COUNT],
}

impl HistoryTable {
    pub fn new() -> Self {
        Self {
            table: [[[0; 64]; PieceKind::COUNT]; Color::COUNT],
        }
    }

    /// Reward a quiet cutoff at `depth` with `depth²`.
    pub fn reward(&mut self, color: Color, piece: PieceKind, to: Square, depth: i32) {
        let entry = &mut self.table[color.index()][piece.index()][to.index()];
        *entry = (*entry + depth * depth).clamp(-HISTORY_MAX, HISTORY_MAX);
    }

    pub fn score(&self, color: Color, piece: PieceKind, to: Square) -> i32 {
        self.table[color.index()][piece.index()][to.index()]
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knight(from: Square, to: Square) -> Move {
        Move::quiet(from, to, PieceKind::Knight)
    }

    #[test]
    fn killer_slots_shift() {
        let mut kt = KillerTable::new();
        let a = knight(Square::G1, Square::F3);
        let b = knight(Square::B1, Square::C3);

        kt.store(5, a);
        assert_eq!(kt.slot_of(5, a), Some(0));
        kt.store(5, b);
        assert_eq!(kt.slot_of(5, b), Some(0));
        assert_eq!(kt.slot_of(5, a), Some(1));

        kt.store(5, b);
        assert_eq!(kt.slot_of(5, a), Some(1));
        assert_eq!(kt.slot_of(6, a), None);
    }

    #[test]
    fn killer_ignores_out_of_range_ply() {
        let mut kt = KillerTable::new();
        let a = knight(Square::G1, Square::F3);
        kt.store(MAX_PLY, a);
        assert_eq!(kt.slot_of(MAX_PLY, a), None);
    }

    #[test]
    fn null_is_never_a_killer() {
        let kt = KillerTable::new();
        assert_eq!(kt.slot_of(0, Move::NULL), None);
    }

    #[test]
    fn countermove_round_trip() {
        let mut cm = CounterMoveTable::new();
        let prev = Move::double_push(Square::E2, Square::E4);
        let reply = knight(Square::G8, Square::F6);
        cm.store(Color::White, prev, reply);
        assert_eq!(cm.get(Color::White, prev), reply);
        assert_eq!(cm.get(Color::Black, prev), Move::NULL);
        assert_eq!(cm.get(Color::White, Move::NULL), Move::NULL);

        cm.clear();
        assert_eq!(cm.get(Color::White, prev), Move::NULL);
    }

    #[test]
    fn history_rewards_depth_squared_and_clamps() {
        let mut ht = HistoryTable::new();
        ht.reward(Color::White, PieceKind::Knight, Square::F3, 4);
        assert_eq!(ht.score(Color::White, PieceKind::Knight, Square::F3), 16);
        assert_eq!(ht.score(Color::Black, PieceKind::Knight, Square::F3), 0);

        for _ in 0..500 {
            ht.reward(Color::White, PieceKind::Pawn, Square::E4, 10);
        }
        assert_eq!(ht.score(Color::White, PieceKind::Pawn, Square::E4), HISTORY_MAX);
    }
}
