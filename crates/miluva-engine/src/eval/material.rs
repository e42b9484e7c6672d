//! Piece values.

use miluva_core::PieceKind;

/// Centipawn value of each piece kind, indexed by [`PieceKind::index`].
pub const PIECE_VALUES: [i32; PieceKind::COUNT] = [100, 300, 320, 500, 900, 0];

/// Centipawn value of `kind`.
#[inline]
pub const fn piece_value(kind: PieceKind) -> i32 {
    PIECE_VALUES[kind.index()]
}
