//! Negamax alpha-beta with principal variation search.

use miluva_core::movegen::{AllMoves, generate};
use miluva_core::{AttackInfo, Move, Position};

use crate::eval::Evaluator;
use crate::search::heuristics::{CounterMoveTable, HistoryTable, KillerTable};
use crate::search::ordering::{MovePicker, OrderingContext};
use crate::search::quiescence::quiescence;
use crate::search::tt::{Bound, TranspositionTable};
use crate::time::TimeManager;

/// Score outside any reachable window.
pub const INF: i32 = 30_000;

/// Score of delivering mate at the root; mates further away score less.
pub const MATE_SCORE: i32 = 29_000;

/// Scores at or beyond this magnitude are forced mates.
pub const MATE_THRESHOLD: i32 = 28_000;

/// Depth limit in plies for all per-ply arrays.
pub const MAX_PLY: usize = 128;

/// Reverse futility margin per remaining ply.
const RFP_MARGIN: i32 = 90;

/// Futility margins by remaining depth.
const FUTILITY_MARGIN: [i32; 4] = [0, 120, 240, 360];

/// Quiet moves tried before late-move pruning kicks in, by remaining depth.
const LMP_LIMIT: [usize; 4] = [0, 8, 12, 18];

/// Triangular PV table. Row `ply` holds the best line found from `ply`.
pub struct PvTable {
    moves: Vec<[Move; MAX_PLY]>,
    len: [usize; MAX_PLY],
}

impl PvTable {
    pub fn new() -> Self {
        Self {
            moves: vec![[Move::NULL; MAX_PLY]; MAX_PLY],
            len: [0; MAX_PLY],
        }
    }

    pub fn clear_ply(&mut self, ply: usize) {
        if ply < MAX_PLY {
            self.len[ply] = 0;
        }
    }

    /// Make `mv` followed by the child line the PV at `ply`.
    pub fn update(&mut self, ply: usize, mv: Move) {
        if ply >= MAX_PLY {
            return;
        }
        let child = ply + 1;
        let copy_len = if child < MAX_PLY { self.len[child].min(MAX_PLY - 1) } else { 0 };
        let (top, bottom) = self.moves.split_at_mut(child.min(MAX_PLY));
        top[ply][0] = mv;
        if copy_len > 0 {
            top[ply][1..=copy_len].copy_from_slice(&bottom[0][..copy_len]);
        }
        self.len[ply] = 1 + copy_len;
    }

    pub fn root_pv(&self) -> &[Move] {
        &self.moves[0][..self.len[0]]
    }
}

impl Default for PvTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutable search state threaded through the recursion.
pub(super) struct SearchContext<'a> {
    pub nodes: u64,
    pub seldepth: usize,
    pub tt: &'a mut TranspositionTable,
    pub pv: PvTable,
    pub killers: &'a mut KillerTable,
    pub counter_moves: &'a mut CounterMoveTable,
    pub history: &'a mut HistoryTable,
    pub time: &'a TimeManager,
    pub evaluator: &'a dyn Evaluator,
    /// History length of the root position, for repetition detection.
    pub root_history: usize,
    /// Latched once the time manager says stop.
    pub stopped: bool,
}

impl SearchContext<'_> {
    /// Count a node and poll the clock.
    pub fn visit(&mut self, ply: usize) {
        self.nodes += 1;
        self.seldepth = self.seldepth.max(ply);
        if !self.stopped && self.time.should_stop(self.nodes) {
            self.stopped = true;
        }
    }
}

/// Fifty-move or repetition draw below the root.
pub(super) fn is_draw(pos: &Position, ply: usize, root_history: usize) -> bool {
    ply > 0 && (pos.halfmove_clock() > 99 || pos.is_repetition(root_history))
}

/// Score of the side to move being mated at `ply`.
#[inline]
pub fn mated_in(ply: usize) -> i32 {
    -(MATE_SCORE - ply as i32)
}

/// Alpha-beta search of `pos` to `depth` plies.
///
/// `ext_budget` counts the check extensions still allowed on this path and
/// `prev_move` is the move that led here (null at the root).
#[allow(clippy::too_many_arguments)]
pub(super) fn negamax(
    pos: &mut Position,
    ply: usize,
    mut alpha: i32,
    beta: i32,
    mut depth: i32,
    ext_budget: i32,
    prev_move: Move,
    ctx: &mut SearchContext<'_>,
) -> i32 {
    ctx.pv.clear_ply(ply);

    if is_draw(pos, ply, ctx.root_history) {
        return 0;
    }

    if depth <= 0 || ply >= MAX_PLY - 1 {
        return quiescence(pos, ply, alpha, beta, 0, ctx);
    }

    ctx.visit(ply);
    if ctx.stopped && ply > 0 {
        return 0;
    }

    let mut tt_move = Move::NULL;
    match ctx.tt.probe(pos.key(), ply) {
        Some(entry) => {
            tt_move = entry.best_move;
            if ply > 0 && entry.depth >= depth {
                let cutoff = match entry.bound {
                    Bound::Exact => true,
                    Bound::Lower => entry.score >= beta,
                    Bound::Upper => entry.score <= alpha,
                };
                if cutoff {
                    return entry.score;
                }
            }
        }
        None if ply > 0 && depth > 3 => depth -= 1,
        None => {}
    }

    let info = AttackInfo::new(pos);
    let in_check = info.in_check();
    let static_eval = if in_check { -INF } else { ctx.evaluator.evaluate(pos) };

    if !in_check && ply > 0 && beta.abs() < MATE_THRESHOLD && static_eval - RFP_MARGIN * depth >= beta {
        return static_eval;
    }

    let moves = generate::<AllMoves>(pos, &info);
    if moves.is_empty() {
        return if in_check { mated_in(ply) } else { 0 };
    }

    let shallow = !in_check && ply > 0 && depth <= 3;
    let futile = shallow && alpha.abs() < MATE_THRESHOLD && static_eval + FUTILITY_MARGIN[depth as usize] <= alpha;
    let lmp_limit = if shallow { LMP_LIMIT[depth as usize] } else { usize::MAX };

    let side = pos.side_to_move();
    let mut picker = MovePicker::new(
        moves,
        tt_move,
        &OrderingContext {
            killers: &*ctx.killers,
            counter_moves: &*ctx.counter_moves,
            history: &*ctx.history,
            ply,
            side,
            prev_move,
        },
    );

    let alpha_orig = alpha;
    let mut best_score = -INF;
    let mut best_move = Move::NULL;
    let mut index = 0usize;

    while let Some(mv) = picker.pick_next() {
        let undo = pos.make_move(mv);
        let gives_check = pos.in_check();

        let prunable = index > 0 && mv.is_quiet() && !gives_check;
        if prunable && (futile || index >= lmp_limit) {
            pos.unmake_move(mv, undo);
            index += 1;
            continue;
        }

        let extend = depth == 1 && (gives_check || in_check) && ext_budget > 0;
        let (child_depth, child_budget) = if extend { (depth, ext_budget - 1) } else { (depth - 1, ext_budget) };

        let score = if index == 0 {
            -negamax(pos, ply + 1, -beta, -alpha, child_depth, child_budget, mv, ctx)
        } else {
            let probe = -negamax(pos, ply + 1, -alpha - 1, -alpha, child_depth, child_budget, mv, ctx);
            if probe > alpha && probe < beta {
                -negamax(pos, ply + 1, -beta, -alpha, child_depth, child_budget, mv, ctx)
            } else {
                probe
            }
        };
        pos.unmake_move(mv, undo);
        index += 1;

        if ctx.stopped {
            return 0;
        }

        if score > best_score {
            best_score = score;
            best_move = mv;
            if score > alpha {
                alpha = score;
                ctx.pv.update(ply, mv);
            }
        }

        if alpha >= beta {
            if mv.is_quiet() {
                ctx.killers.store(ply, mv);
                ctx.counter_moves.store(!side, prev_move, mv);
                ctx.history.reward(side, mv.piece(), mv.to(), depth);
            }
            break;
        }
    }

    let bound = if best_score <= alpha_orig {
        Bound::Upper
    } else if best_score >= beta {
        Bound::Lower
    } else {
        Bound::Exact
    };
    ctx.tt.store(pos.key(), best_move, best_score, depth, bound, ply);

    best_score
}

#[cfg(test)]
mod tests {
    use super::*;
    use miluva_core::{PieceKind, Square};

    fn mv(from: Square, to: Square) -> Move {
        Move::quiet(from, to, PieceKind::Knight)
    }

    #[test]
    fn pv_update_copies_child_line() {
        let mut pv = PvTable::new();
        let a = mv(Square::G1, Square::F3);
        let b = mv(Square::G8, Square::F6);
        let c = mv(Square::B1, Square::C3);

        pv.clear_ply(2);
        pv.update(2, c);
        pv.update(1, b);
        pv.update(0, a);
        assert_eq!(pv.root_pv(), &[a, b, c]);

        pv.clear_ply(1);
        pv.update(0, c);
        assert_eq!(pv.root_pv(), &[c]);
    }

    #[test]
    fn pv_update_at_last_ply() {
        let mut pv = PvTable::new();
        let a = mv(Square::G1, Square::F3);
        pv.update(MAX_PLY - 1, a);
        pv.update(MAX_PLY, a);
    }

    #[test]
    fn mate_scores_shrink_with_distance() {
        assert_eq!(mated_in(0), -MATE_SCORE);
        assert!(mated_in(3) > mated_in(1));
        assert!(-mated_in(1) >= MATE_THRESHOLD);
    }

    #[test]
    fn draws_only_below_root() {
        let pos: Position = "4k3/8/8/8/8/8/8/4K3 w - - 100 80".parse().unwrap();
        assert!(!is_draw(&pos, 0, 0));
        assert!(is_draw(&pos, 1, 0));
    }
}
