//! Game phase from remaining non-pawn material.

use miluva_core::{PieceKind, Position};

/// Phase of the starting position: N=1, B=1, R=2, Q=4 per piece.
pub const MAX_PHASE: i32 = 24;

const WEIGHTS: [(PieceKind, i32); 4] = [
    (PieceKind::Knight, 1),
    (PieceKind::Bishop, 1),
    (PieceKind::Rook, 2),
    (PieceKind::Queen, 4),
];

/// `0` for bare kings and pawns, [`MAX_PHASE`] with full material.
///
/// Promotions can push the raw sum past the maximum, so it is clamped.
pub fn game_phase(pos: &Position) -> i32 {
    WEIGHTS
        .iter()
        .map(|&(kind, weight)| pos.pieces(kind).count() as i32 * weight)
        .sum::<i32>()
        .min(MAX_PHASE)
}
