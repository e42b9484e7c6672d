//! Quiescence search: resolve captures before trusting the static score.

use miluva_core::movegen::{AllMoves, CapturesOnly, generate};
use miluva_core::{AttackInfo, Move, PieceKind, Position};

use crate::eval::material::piece_value;
use crate::search::negamax::{INF, MAX_PLY, SearchContext, is_draw, mated_in};
use crate::search::ordering::MovePicker;

/// Quiescence never recurses past this many plies below the horizon.
pub const QS_DEPTH_FLOOR: i32 = -32;

/// Slack added to a capture's material gain before delta pruning.
const DELTA_MARGIN: i32 = 200;

/// Best material swing `mv` can produce on its own.
fn material_gain(mv: Move) -> i32 {
    let victim = mv.captured().map_or(0, piece_value);
    let promotion = mv
        .promotion_piece()
        .map_or(0, |piece| piece_value(piece) - piece_value(PieceKind::Pawn));
    victim + promotion
}

/// Search captures and promotions from `pos` until the position is quiet.
///
/// In check every evasion is searched and there is no stand pat.
/// `qdepth` is zero at the horizon and decreases with each capture.
pub(super) fn quiescence(
    pos: &mut Position,
    ply: usize,
    mut alpha: i32,
    beta: i32,
    qdepth: i32,
    ctx: &mut SearchContext<'_>,
) -> i32 {
    ctx.pv.clear_ply(ply);

    if is_draw(pos, ply, ctx.root_history) {
        return 0;
    }

    ctx.visit(ply);
    if ctx.stopped {
        return 0;
    }

    if qdepth <= QS_DEPTH_FLOOR || ply >= MAX_PLY - 1 {
        return ctx.evaluator.evaluate(pos);
    }

    let info = AttackInfo::new(pos);
    if info.in_check() {
        let evasions = generate::<AllMoves>(pos, &info);
        if evasions.is_empty() {
            return mated_in(ply);
        }
        let mut best = -INF;
        let mut picker = MovePicker::tactical(evasions);
        while let Some(mv) = picker.pick_next() {
            let undo = pos.make_move(mv);
            let score = -quiescence(pos, ply + 1, -beta, -alpha, qdepth - 1, ctx);
            pos.unmake_move(mv, undo);
            if ctx.stopped {
                return 0;
            }
            best = best.max(score);
            alpha = alpha.max(score);
            if alpha >= beta {
                break;
            }
        }
        return best;
    }

    let stand_pat = ctx.evaluator.evaluate(pos);
    if stand_pat >= beta {
        return stand_pat;
    }
    alpha = alpha.max(stand_pat);

    let mut picker = MovePicker::tactical(generate::<CapturesOnly>(pos, &info));
    while let Some(mv) = picker.pick_next() {
        if stand_pat + material_gain(mv) + DELTA_MARGIN <= alpha {
            continue;
        }

        let undo = pos.make_move(mv);
        let score = -quiescence(pos, ply + 1, -beta, -alpha, qdepth - 1, ctx);
        pos.unmake_move(mv, undo);
        if ctx.stopped {
            return 0;
        }

        if score >= beta {
            return score;
        }
        alpha = alpha.max(score);
    }

    alpha
}

#[cfg(test)]
mod tests {
    use super::*;
    use miluva_core::Square;

    #[test]
    fn gain_counts_victim_and_promotion() {
        let capture = Move::capture(Square::E4, Square::D5, PieceKind::Pawn, PieceKind::Queen);
        assert_eq!(material_gain(capture), 900);

        let promo = Move::promotion(Square::A7, Square::A8, PieceKind::Queen);
        assert_eq!(material_gain(promo), 800);

        let both = Move::capture_promotion(Square::A7, Square::B8, PieceKind::Queen, PieceKind::Rook);
        assert_eq!(material_gain(both), 1300);
    }
}
