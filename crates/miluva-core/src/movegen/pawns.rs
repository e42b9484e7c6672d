//! Pawn pushes, captures, promotions and en passant.

use crate::attack_info::AttackInfo;
use crate::bitboard::Bitboard;
use crate::chess_move::Move;
use crate::color::Color;
use crate::piece::PieceKind;
use crate::position::Position;
use crate::rays::{bishop_attacks, pawn_attacks, rook_attacks};
use crate::square::Square;

use super::MoveList;
use super::mode::GenKind;

fn push_promotions(list: &mut MoveList, from: Square, to: Square, victim: Option<PieceKind>) {
    for promo in PieceKind::PROMOTIONS {
        list.push(match victim {
            Some(victim) => Move::capture_promotion(from, to, promo, victim),
            None => Move::promotion(from, to, promo),
        });
    }
}

pub(super) fn gen_pawns<K: GenKind>(pos: &Position, info: &AttackInfo, list: &mut MoveList) {
    let us = pos.side_to_move();
    let them = !us;
    let pawns = pos.colored(us, PieceKind::Pawn);
    let enemy = pos.side(them);
    let empty = !pos.occupied();
    let (promo_rank, double_rank) = match us {
        Color::White => (Bitboard::RANK_8, Bitboard::RANK_4),
        Color::Black => (Bitboard::RANK_1, Bitboard::RANK_5),
    };
    let back: i8 = match us {
        Color::White => -1,
        Color::Black => 1,
    };
    let origin = |to: Square, ranks: i8| to.offset(0, back * ranks);

    let single = pawns.forward(us) & empty;

    // Quiet promotions are emitted in both modes.
    let mut pushes = single & info.check_mask;
    if !K::QUIETS {
        pushes &= promo_rank;
    }
    for to in pushes {
        let Some(from) = origin(to, 1) else { continue };
        if !info.pin_ray(from).contains(to) {
            continue;
        }
        if promo_rank.contains(to) {
            push_promotions(list, from, to, None);
        } else {
            list.push(Move::quiet(from, to, PieceKind::Pawn));
        }
    }

    if K::QUIETS {
        let doubles = single.forward(us) & empty & double_rank & info.check_mask;
        for to in doubles {
            let Some(from) = origin(to, 2) else { continue };
            if info.pin_ray(from).contains(to) {
                list.push(Move::double_push(from, to));
            }
        }
    }

    for from in pawns {
        let targets = pawn_attacks(us, from) & enemy & info.check_mask & info.pin_ray(from);
        for to in targets {
            let Some(victim) = pos.piece_on(to) else { continue };
            if promo_rank.contains(to) {
                push_promotions(list, from, to, Some(victim));
            } else {
                list.push(Move::capture(from, to, PieceKind::Pawn, victim));
            }
        }
    }

    if let Some(ep) = pos.en_passant() {
        for from in pawn_attacks(them, ep) & pawns {
            let mv = Move::en_passant(from, ep);
            if en_passant_is_legal(pos, info, mv) {
                list.push(mv);
            }
        }
    }
}

/// En passant lifts two pawns off one rank at once, which pin detection
/// cannot see, so the king's lines are re-traced on the resulting board.
fn en_passant_is_legal(pos: &Position, info: &AttackInfo, mv: Move) -> bool {
    let Some(victim) = mv.en_passant_victim() else {
        return false;
    };
    let ep = mv.to();

    if info.in_check() && !info.check_mask.contains(ep) && !info.checkers.contains(victim) {
        return false;
    }

    let them = !pos.side_to_move();
    let occupied = pos.occupied().without(mv.from()).without(victim).with(ep);
    let queens = pos.colored(them, PieceKind::Queen);
    let orthogonal = pos.colored(them, PieceKind::Rook) | queens;
    let diagonal = pos.colored(them, PieceKind::Bishop) | queens;
    (rook_attacks(info.king, occupied) & orthogonal).is_empty()
        && (bishop_attacks(info.king, occupied) & diagonal).is_empty()
}
