//! Move ordering: score every move once, then hand them out best-first.

use miluva_core::{Color, Move, MoveKind, MoveList, PieceKind};

use crate::search::heuristics::{CounterMoveTable, HistoryTable, KillerTable};

const TT_MOVE: i32 = 1_000_000;
const CAPTURE_BASE: i32 = 100_000;
const QUEEN_PROMOTION: i32 = 90_000;
const KILLER: [i32; 2] = [80_000, 79_000];
const COUNTER_MOVE: i32 = 70_000;

/// Ordering weight of a victim or attacker: P=1, N=3, B=3, R=5, Q=9, K=0.
const WEIGHT: [i32; PieceKind::COUNT] = [1, 3, 3, 5, 9, 0];

/// Most valuable victim first, least valuable attacker as tiebreak.
#[inline]
pub fn mvv_lva(victim: PieceKind, attacker: PieceKind) -> i32 {
    WEIGHT[victim.index()] * 16 - WEIGHT[attacker.index()]
}

/// Bonus for the promotion piece, zero for non-promotions.
fn promotion_bonus(mv: Move) -> i32 {
    match mv.promotion_piece() {
        Some(PieceKind::Queen) => QUEEN_PROMOTION,
        Some(piece) => WEIGHT[piece.index()],
        None => 0,
    }
}

/// Heuristic state a main-search node consults when ordering quiets.
pub struct OrderingContext<'a> {
    pub killers: &'a KillerTable,
    pub counter_moves: &'a CounterMoveTable,
    pub history: &'a HistoryTable,
    pub ply: usize,
    pub side: Color,
    pub prev_move: Move,
}

fn score_main(mv: Move, tt_move: Move, ctx: &OrderingContext<'_>) -> i32 {
    if mv == tt_move {
        return TT_MOVE;
    }
    if let Some(victim) = mv.captured() {
        let bonus = match mv.kind() {
            MoveKind::CapturePromotion { promo: PieceKind::Queen, .. } => WEIGHT[PieceKind::Queen.index()] * 16,
            _ => 0,
        };
        return CAPTURE_BASE + mvv_lva(victim, mv.piece()) + bonus;
    }
    if mv.promotion_piece().is_some() {
        return promotion_bonus(mv);
    }
    if let Some(slot) = ctx.killers.slot_of(ctx.ply, mv) {
        return KILLER[slot];
    }
    if mv == ctx.counter_moves.get(!ctx.side, ctx.prev_move) {
        return COUNTER_MOVE;
    }
    ctx.history.score(ctx.side, mv.piece(), mv.to())
}

fn score_tactical(mv: Move) -> i32 {
    let capture = mv.captured().map_or(0, |victim| CAPTURE_BASE + mvv_lva(victim, mv.piece()));
    capture + promotion_bonus(mv)
}

/// Selection-sort picker over an owned move list.
pub struct MovePicker {
    moves: MoveList,
    scores: [i32; 256],
    cursor: usize,
}

impl MovePicker {
    /// Order for a full-width node.
    pub fn new(moves: MoveList, tt_move: Move, ctx: &OrderingContext<'_>) -> Self {
        let mut scores = [0; 256];
        for (slot, &mv) in scores.iter_mut().zip(moves.iter()) {
            *slot = score_main(mv, tt_move, ctx);
        }
        Self { moves, scores, cursor: 0 }
    }

    /// Order for quiescence: captures by MVV-LVA plus the promotion bonus.
    pub fn tactical(moves: MoveList) -> Self {
        let mut scores = [0; 256];
        for (slot, &mv) in scores.iter_mut().zip(moves.iter()) {
            *slot = score_tactical(mv);
        }
        Self { moves, scores, cursor: 0 }
    }

    /// Next move in descending score order.
    pub fn pick_next(&mut self) -> Option<Move> {
        let len = self.moves.len();
        if self.cursor >= len {
            return None;
        }
        let mut best = self.cursor;
        for i in self.cursor + 1..len {
            if self.scores[i] > self.scores[best] {
                best = i;
            }
        }
        self.moves.swap(self.cursor, best);
        self.scores.swap(self.cursor, best);
        let mv = self.moves[self.cursor];
        self.cursor += 1;
        Some(mv)
    }
}
