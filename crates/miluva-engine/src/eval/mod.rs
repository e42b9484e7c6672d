//! Static evaluation.

pub mod material;
pub mod phase;
pub mod pst;
pub mod score;

use miluva_core::{Color, PieceKind, Position};

use material::piece_value;
use phase::game_phase;
use pst::pst_value;
use score::{T, Tapered};

/// Scores a position in centipawns from the side to move's point of view.
///
/// Implementations must be deterministic: the same position always yields
/// the same score.
pub trait Evaluator: Send {
    fn evaluate(&self, pos: &Position) -> i32;
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn evaluate(&self, pos: &Position) -> i32 {
        (**self).evaluate(pos)
    }
}

/// Material plus piece-square tables, tapered by game phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicEvaluator;

impl ClassicEvaluator {
    /// Sum of `color`'s material and placement terms.
    fn side_score(pos: &Position, color: Color) -> Tapered {
        let mut total = Tapered::ZERO;
        for kind in PieceKind::ALL {
            let value = piece_value(kind);
            for sq in pos.colored(color, kind) {
                total += T(value, value) + pst_value(kind, color, sq);
            }
        }
        total
    }
}

impl Evaluator for ClassicEvaluator {
    fn evaluate(&self, pos: &Position) -> i32 {
        let white = Self::side_score(pos, Color::White) - Self::side_score(pos, Color::Black);
        white.blend(game_phase(pos)) * pos.side_to_move().sign()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(fen: &str) -> i32 {
        ClassicEvaluator.evaluate(&fen.parse().unwrap())
    }

    #[test]
    fn startpos_is_balanced() {
        assert_eq!(ClassicEvaluator.evaluate(&Position::startpos()), 0);
    }

    #[test]
    fn score_is_relative_to_side_to_move() {
        let white = eval("3qk3/8/8/8/8/8/8/4K3 w - - 0 1");
        let black = eval("3qk3/8/8/8/8/8/8/4K3 b - - 0 1");
        assert!(white < -700, "{white}");
        assert_eq!(white, -black);
    }

    #[test]
    fn mirrored_positions_agree() {
        let a = eval("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3");
        let b = eval("rnbqkb1r/pppp1ppp/5n2/4p3/4P3/2N5/PPPP1PPP/R1BQKBNR b KQkq - 2 3");
        assert_eq!(a, b);
    }

    #[test]
    fn boxed_evaluator_delegates() {
        let boxed: Box<dyn Evaluator> = Box::new(ClassicEvaluator);
        let pos = Position::startpos();
        assert_eq!(boxed.evaluate(&pos), ClassicEvaluator.evaluate(&pos));
    }
}
