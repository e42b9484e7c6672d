//! Piece-square tables.
//!
//! Tables are laid out as seen from White's side of the board: the first row
//! is rank 8, the last row is rank 1. White squares are mirrored before the
//! lookup and Black squares are used as-is.

use miluva_core::{Color, PieceKind, Square};

use crate::eval::score::{T, Tapered};

#[rustfmt::skip]
const PAWN_MG: [i32; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
     60,  60,  60,  60,  60,  60,  60,  60,
     15,  15,  25,  35,  35,  25,  15,  15,
      5,   5,  10,  25,  25,  10,   5,   5,
      0,   0,   5,  20,  20,   5,   0,   0,
      5,  -5, -10,   5,   5, -10,  -5,   5,
      5,  10,  10, -20, -20,  10,  10,   5,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const PAWN_EG: [i32; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
    120, 120, 115, 110, 110, 115, 120, 120,
     60,  60,  50,  45,  45,  50,  60,  60,
     30,  30,  25,  20,  20,  25,  30,  30,
     15,  15,  10,  10,  10,  10,  15,  15,
      5,   5,   5,   5,   5,   5,   5,   5,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const KNIGHT: [i32; 64] = [
    -50, -35, -30, -30, -30, -30, -35, -50,
    -35, -15,   0,   5,   5,   0, -15, -35,
    -30,   5,  12,  18,  18,  12,   5, -30,
    -30,   5,  18,  22,  22,  18,   5, -30,
    -30,   0,  15,  22,  22,  15,   0, -30,
    -30,   5,  10,  15,  15,  10,   5, -30,
    -35, -15,   0,   5,   5,   0, -15, -35,
    -50, -35, -30, -30, -30, -30, -35, -50,
];

#[rustfmt::skip]
const BISHOP: [i32; 64] = [
    -20, -10, -10, -10, -10, -10, -10, -20,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -10,   0,   5,  10,  10,   5,   0, -10,
    -10,   5,   5,  10,  10,   5,   5, -10,
    -10,   0,  10,  10,  10,  10,   0, -10,
    -10,  10,  10,  10,  10,  10,  10, -10,
    -10,   5,   0,   0,   0,   0,   5, -10,
    -20, -10, -10, -10, -10, -10, -10, -20,
];

#[rustfmt::skip]
const ROOK: [i32; 64] = [
      0,   0,   5,  10,  10,   5,   0,   0,
     15,  20,  20,  20,  20,  20,  20,  15,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
      0,   0,   0,   5,   5,   0,   0,   0,
];

#[rustfmt::skip]
const QUEEN: [i32; 64] = [
    -20, -10, -10,  -5,  -5, -10, -10, -20,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -10,   0,   5,   5,   5,   5,   0, -10,
     -5,   0,   5,   5,   5,   5,   0,  -5,
     -5,   0,   5,   5,   5,   5,   0,  -5,
    -10,   5,   5,   5,   5,   5,   0, -10,
    -10,   0,   5,   0,   0,   0,   0, -10,
    -20, -10, -10,  -5,  -5, -10, -10, -20,
];

#[rustfmt::skip]
const KING_MG: [i32; 64] = [
    -40, -50, -50, -60, -60, -50, -50, -40,
    -40, -50, -50, -60, -60, -50, -50, -40,
    -40, -50, -50, -60, -60, -50, -50, -40,
    -40, -50, -50, -60, -60, -50, -50, -40,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -20, -30, -30, -40, -40, -30, -30, -20,
     10,  10, -10, -20, -20, -10,  10,  10,
     20,  35,  10, -10,   0,  10,  35,  20,
];

#[rustfmt::skip]
const KING_EG: [i32; 64] = [
    -50, -35, -25, -20, -20, -25, -35, -50,
    -30, -15,   0,  10,  10,   0, -15, -30,
    -25,   0,  20,  30,  30,  20,   0, -25,
    -25,   5,  30,  40,  40,  30,   5, -25,
    -25,   5,  30,  40,  40,  30,   5, -25,
    -25,   0,  20,  30,  30,  20,   0, -25,
    -30, -20,   0,   0,   0,   0, -20, -30,
    -50, -35, -30, -30, -30, -30, -35, -50,
];

const fn pair(mg: &[i32; 64], eg: &[i32; 64]) -> [Tapered; 64] {
    let mut out = [T(0, 0); 64];
    let mut i = 0;
    while i < 64 {
        out[i] = T(mg[i], eg[i]);
        i += 1;
    }
    out
}

static TABLES: [[Tapered; 64]; PieceKind::COUNT] = [
    pair(&PAWN_MG, &PAWN_EG),
    pair(&KNIGHT, &KNIGHT),
    pair(&BISHOP, &BISHOP),
    pair(&ROOK, &ROOK),
    pair(&QUEEN, &QUEEN),
    pair(&KING_MG, &KING_EG),
];

/// Placement bonus for `color`'s `kind` standing on `sq`.
#[inline]
pub fn pst_value(kind: PieceKind, color: Color, sq: Square) -> Tapered {
    let idx = match color {
        Color::White => sq.flip_rank().index(),
        Color::Black => sq.index(),
    };
    TABLES[kind.index()][idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_mirror() {
        for kind in PieceKind::ALL {
            for sq in Square::all() {
                assert_eq!(
                    pst_value(kind, Color::White, sq),
                    pst_value(kind, Color::Black, sq.flip_rank()),
                    "{kind:?} {sq}"
                );
            }
        }
    }

    #[test]
    fn central_pawn_push_is_rewarded() {
        let e2 = pst_value(PieceKind::Pawn, Color::White, Square::E2);
        let e4 = pst_value(PieceKind::Pawn, Color::White, Square::E4);
        assert!(e4.mg > e2.mg);
    }

    #[test]
    fn king_prefers_shelter_then_centre() {
        let g1 = pst_value(PieceKind::King, Color::White, Square::G1);
        let e4 = pst_value(PieceKind::King, Color::White, Square::E4);
        assert!(g1.mg > e4.mg);
        assert!(e4.eg > g1.eg);
    }
}
