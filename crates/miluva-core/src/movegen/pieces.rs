//! Knight and slider moves.

use crate::attack_info::AttackInfo;
use crate::bitboard::Bitboard;
use crate::chess_move::Move;
use crate::piece::PieceKind;
use crate::position::Position;
use crate::rays::{bishop_attacks, knight_attacks, queen_attacks, rook_attacks};
use crate::square::Square;

use super::MoveList;
use super::mode::GenKind;

/// Emit moves for every piece of `kind`, with `attacks` giving its reach.
fn gen_kind<K: GenKind>(
    pos: &Position,
    info: &AttackInfo,
    list: &mut MoveList,
    kind: PieceKind,
    attacks: impl Fn(Square, Bitboard) -> Bitboard,
) {
    let us = pos.side_to_move();
    let occupied = pos.occupied();
    let enemy = pos.side(!us);
    let allowed = if K::QUIETS { !pos.side(us) } else { enemy };

    for from in pos.colored(us, kind) {
        let targets = attacks(from, occupied) & allowed & info.check_mask & info.pin_ray(from);
        for to in targets {
            list.push(match pos.piece_on(to) {
                Some(victim) => Move::capture(from, to, kind, victim),
                None => Move::quiet(from, to, kind),
            });
        }
    }
}

pub(super) fn gen_pieces<K: GenKind>(pos: &Position, info: &AttackInfo, list: &mut MoveList) {
    // A pinned knight can never stay on its pin line.
    let knights = |sq: Square, _occ: Bitboard| {
        if info.pinned.contains(sq) { Bitboard::EMPTY } else { knight_attacks(sq) }
    };
    gen_kind::<K>(pos, info, list, PieceKind::Knight, knights);
    gen_kind::<K>(pos, info, list, PieceKind::Bishop, bishop_attacks);
    gen_kind::<K>(pos, info, list, PieceKind::Rook, rook_attacks);
    gen_kind::<K>(pos, info, list, PieceKind::Queen, queen_attacks);
}
