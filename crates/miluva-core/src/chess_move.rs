//! Move representation with precomputed bitboard deltas.

use std::fmt;

use crate::bitboard::Bitboard;
use crate::castling::CastleSide;
use crate::color::Color;
use crate::piece::PieceKind;
use crate::square::Square;

/// What a move does beyond relocating the moving piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Quiet,
    Capture(PieceKind),
    /// Pawn advance of two squares from its starting rank.
    DoublePush,
    Castle(CastleSide),
    EnPassant,
    Promotion(PieceKind),
    CapturePromotion { promo: PieceKind, victim: PieceKind },
}

/// A fully described move.
///
/// `own_xor` toggles the mover's color bitboard (including the rook hop when
/// castling); `opp_xor` toggles the opponent's (the captured square, which
/// for en passant is not the destination).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    from: Square,
    to: Square,
    piece: PieceKind,
    kind: MoveKind,
    own_xor: Bitboard,
    opp_xor: Bitboard,
}

impl Move {
    /// Sentinel that is never generated. Applying it panics.
    pub const NULL: Move = Move {
        from: Square::A1,
        to: Square::A1,
        piece: PieceKind::Pawn,
        kind: MoveKind::Quiet,
        own_xor: Bitboard::EMPTY,
        opp_xor: Bitboard::EMPTY,
    };

    const fn build(from: Square, to: Square, piece: PieceKind, kind: MoveKind) -> Move {
        let own = Bitboard::new(from.bitboard().bits() | to.bitboard().bits());
        Move { from, to, piece, kind, own_xor: own, opp_xor: Bitboard::EMPTY }
    }

    pub const fn quiet(from: Square, to: Square, piece: PieceKind) -> Move {
        Move::build(from, to, piece, MoveKind::Quiet)
    }

    pub const fn capture(from: Square, to: Square, piece: PieceKind, victim: PieceKind) -> Move {
        let mut mv = Move::build(from, to, piece, MoveKind::Capture(victim));
        mv.opp_xor = to.bitboard();
        mv
    }

    pub const fn double_push(from: Square, to: Square) -> Move {
        Move::build(from, to, PieceKind::Pawn, MoveKind::DoublePush)
    }

    pub const fn castle(color: Color, side: CastleSide) -> Move {
        let (king_from, king_to) = side.king_squares(color);
        let (rook_from, rook_to) = side.rook_squares(color);
        let mut mv = Move::build(king_from, king_to, PieceKind::King, MoveKind::Castle(side));
        mv.own_xor = Bitboard::new(
            mv.own_xor.bits() | rook_from.bitboard().bits() | rook_to.bitboard().bits(),
        );
        mv
    }

    pub const fn en_passant(from: Square, to: Square) -> Move {
        let mut mv = Move::build(from, to, PieceKind::Pawn, MoveKind::EnPassant);
        mv.opp_xor = Square::new(to.file(), from.rank()).bitboard();
        mv
    }

    pub const fn promotion(from: Square, to: Square, promo: PieceKind) -> Move {
        Move::build(from, to, PieceKind::Pawn, MoveKind::Promotion(promo))
    }

    pub const fn capture_promotion(
        from: Square,
        to: Square,
        promo: PieceKind,
        victim: PieceKind,
    ) -> Move {
        let mut mv = Move::build(from, to, PieceKind::Pawn, MoveKind::CapturePromotion { promo, victim });
        mv.opp_xor = to.bitboard();
        mv
    }

    #[inline]
    pub const fn from(self) -> Square {
        self.from
    }

    #[inline]
    pub const fn to(self) -> Square {
        self.to
    }

    /// The piece that moves (a pawn for promotions).
    #[inline]
    pub const fn piece(self) -> PieceKind {
        self.piece
    }

    #[inline]
    pub const fn kind(self) -> MoveKind {
        self.kind
    }

    #[inline]
    pub const fn own_xor(self) -> Bitboard {
        self.own_xor
    }

    #[inline]
    pub const fn opp_xor(self) -> Bitboard {
        self.opp_xor
    }

    #[inline]
    pub fn is_null(self) -> bool {
        self == Move::NULL
    }

    /// Piece removed from the board, if any. En passant always takes a pawn.
    #[inline]
    pub const fn captured(self) -> Option<PieceKind> {
        match self.kind {
            MoveKind::Capture(victim) | MoveKind::CapturePromotion { victim, .. } => Some(victim),
            MoveKind::EnPassant => Some(PieceKind::Pawn),
            _ => None,
        }
    }

    #[inline]
    pub const fn promotion_piece(self) -> Option<PieceKind> {
        match self.kind {
            MoveKind::Promotion(promo) | MoveKind::CapturePromotion { promo, .. } => Some(promo),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_capture(self) -> bool {
        self.captured().is_some()
    }

    /// Neither a capture nor a promotion.
    #[inline]
    pub const fn is_quiet(self) -> bool {
        !self.is_capture() && self.promotion_piece().is_none()
    }

    /// Square of the pawn removed by an en passant capture.
    pub const fn en_passant_victim(self) -> Option<Square> {
        match self.kind {
            MoveKind::EnPassant => Some(Square::new(self.to.file(), self.from.rank())),
            _ => None,
        }
    }

    pub fn to_uci(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("0000");
        }
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promo) = self.promotion_piece() {
            write!(f, "{}", promo.letter())?;
        }
        Ok(())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({self} {:?} {:?})", self.piece, self.kind)
    }
}
