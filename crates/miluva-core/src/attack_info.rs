//! One-pass summary of enemy attacks, pins and checks against the side to move.

use crate::bitboard::Bitboard;
use crate::piece::PieceKind;
use crate::position::Position;
use crate::rays::{
    between, bishop_attacks, king_attacks, knight_attacks, line, pawn_attacks, rook_attacks,
};
use crate::square::Square;

/// Everything legal move generation needs to know about the opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackInfo {
    /// Squares the enemy attacks, with our king lifted off the board so that
    /// sliders see through it.
    pub attacked: Bitboard,
    /// Our pieces pinned against our king.
    pub pinned: Bitboard,
    /// Enemy pieces giving check.
    pub checkers: Bitboard,
    /// Destinations that resolve a single check; `FULL` when not in check.
    pub check_mask: Bitboard,
    pub king: Square,
}

impl AttackInfo {
    pub fn new(pos: &Position) -> AttackInfo {
        let us = pos.side_to_move();
        let them = !us;
        let king = pos.king_square(us);
        let ours = pos.side(us);
        let occupied = pos.occupied();
        let xray_occupied = occupied.without(king);

        let mut attacked = Bitboard::EMPTY;
        for sq in pos.colored(them, PieceKind::Pawn) {
            attacked |= pawn_attacks(them, sq);
        }
        for sq in pos.colored(them, PieceKind::Knight) {
            attacked |= knight_attacks(sq);
        }
        let queens = pos.colored(them, PieceKind::Queen);
        let diagonal = pos.colored(them, PieceKind::Bishop) | queens;
        let orthogonal = pos.colored(them, PieceKind::Rook) | queens;
        for sq in diagonal {
            attacked |= bishop_attacks(sq, xray_occupied);
        }
        for sq in orthogonal {
            attacked |= rook_attacks(sq, xray_occupied);
        }
        attacked |= king_attacks(pos.king_square(them));

        let mut checkers = (knight_attacks(king) & pos.colored(them, PieceKind::Knight))
            | (pawn_attacks(us, king) & pos.colored(them, PieceKind::Pawn));
        let mut pinned = Bitboard::EMPTY;

        let candidates = (bishop_attacks(king, Bitboard::EMPTY) & diagonal)
            | (rook_attacks(king, Bitboard::EMPTY) & orthogonal);
        for slider in candidates {
            let blockers = between(king, slider) & occupied;
            if blockers.is_empty() {
                checkers = checkers.with(slider);
            } else if !blockers.has_several() && (blockers & ours).any() {
                pinned |= blockers;
            }
        }

        let check_mask = match checkers.lsb() {
            None => Bitboard::FULL,
            Some(checker) => between(king, checker).with(checker),
        };

        AttackInfo { attacked, pinned, checkers, check_mask, king }
    }

    #[inline]
    pub fn check_count(&self) -> u32 {
        self.checkers.count()
    }

    #[inline]
    pub fn in_check(&self) -> bool {
        self.checkers.any()
    }

    /// Squares a piece on `sq` may move to without breaking a pin.
    #[inline]
    pub fn pin_ray(&self, sq: Square) -> Bitboard {
        if self.pinned.contains(sq) {
            line(self.king, sq)
        } else {
            Bitboard::FULL
        }
    }
}
