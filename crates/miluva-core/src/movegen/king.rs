//! King steps and castling.

use crate::attack_info::AttackInfo;
use crate::castling::CastleSide;
use crate::chess_move::Move;
use crate::piece::PieceKind;
use crate::position::Position;
use crate::rays::king_attacks;

use super::MoveList;
use super::mode::GenKind;

pub(super) fn gen_king<K: GenKind>(pos: &Position, info: &AttackInfo, list: &mut MoveList) {
    let us = pos.side_to_move();
    let from = info.king;
    let allowed = if K::QUIETS { !pos.side(us) } else { pos.side(!us) };

    for to in king_attacks(from) & allowed & !info.attacked {
        list.push(match pos.piece_on(to) {
            Some(victim) => Move::capture(from, to, PieceKind::King, victim),
            None => Move::quiet(from, to, PieceKind::King),
        });
    }

    if !K::QUIETS || info.in_check() {
        return;
    }
    for side in CastleSide::BOTH {
        if pos.castling().can_castle(us, side)
            && (side.empty_path(us) & pos.occupied()).is_empty()
            && (side.king_path(us) & info.attacked).is_empty()
        {
            list.push(Move::castle(us, side));
        }
    }
}
