//! Legal move generation.

mod king;
mod mode;
mod pawns;
mod pieces;

use std::ops::{Deref, DerefMut};

use crate::attack_info::AttackInfo;
use crate::chess_move::Move;
use crate::position::Position;

pub use self::mode::{AllMoves, CapturesOnly, GenKind};

use self::king::gen_king;
use self::pawns::gen_pawns;
use self::pieces::gen_pieces;

/// Maximum number of legal moves in any reachable position is 218.
const CAPACITY: usize = 256;

/// Stack-allocated move buffer.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; CAPACITY],
    len: usize,
}

impl MoveList {
    pub fn new() -> MoveList {
        MoveList { moves: [Move::NULL; CAPACITY], len: 0 }
    }

    #[inline]
    pub fn push(&mut self, mv: Move) {
        debug_assert!(self.len < CAPACITY);
        self.moves[self.len] = mv;
        self.len += 1;
    }

    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Move] {
        &mut self.moves[..self.len]
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for MoveList {
    type Target = [Move];

    #[inline]
    fn deref(&self) -> &[Move] {
        self.as_slice()
    }
}

impl DerefMut for MoveList {
    #[inline]
    fn deref_mut(&mut self) -> &mut [Move] {
        self.as_mut_slice()
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

/// Generate moves of mode `K` using a precomputed [`AttackInfo`].
pub fn generate<K: GenKind>(pos: &Position, info: &AttackInfo) -> MoveList {
    let mut list = MoveList::new();
    if info.check_count() < 2 {
        gen_pawns::<K>(pos, info, &mut list);
        gen_pieces::<K>(pos, info, &mut list);
    }
    gen_king::<K>(pos, info, &mut list);
    list
}

/// Every legal move. Empty means checkmate when in check, stalemate otherwise.
pub fn generate_legal(pos: &Position) -> MoveList {
    generate::<AllMoves>(pos, &AttackInfo::new(pos))
}

/// Legal captures, en passant captures and promotions.
pub fn generate_captures(pos: &Position) -> MoveList {
    generate::<CapturesOnly>(pos, &AttackInfo::new(pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::castling::CastleSide;
    use crate::chess_move::MoveKind;
    use crate::piece::PieceKind;
    use crate::square::Square;

    fn legal(fen: &str) -> (Position, MoveList) {
        let pos: Position = fen.parse().unwrap();
        let moves = generate_legal(&pos);
        (pos, moves)
    }

    #[test]
    fn starting_position_20_moves() {
        let moves = generate_legal(&Position::startpos());
        assert_eq!(moves.len(), 20);
        assert_eq!(moves.iter().filter(|m| m.kind() == MoveKind::DoublePush).count(), 8);
    }

    #[test]
    fn pinned_knight_has_no_moves() {
        let (_, moves) = legal("4r2k/8/8/8/8/8/4N3/4K3 w - - 0 1");
        assert!(moves.iter().all(|m| m.from() != Square::E2));
    }

    #[test]
    fn pinned_rook_slides_along_pin() {
        let (_, moves) = legal("4r2k/8/8/8/8/8/4R3/4K3 w - - 0 1");
        let rook: Vec<Square> = moves.iter().filter(|m| m.from() == Square::E2).map(|m| m.to()).collect();
        assert_eq!(rook.len(), 6);
        assert!(rook.iter().all(|sq| sq.file() == 4));
    }

    #[test]
    fn double_check_king_only() {
        let (pos, moves) = legal("4r1k1/8/8/8/8/5n2/8/4K3 w - - 0 1");
        assert!(!moves.is_empty());
        for mv in moves.iter() {
            assert_eq!(pos.piece_on(mv.from()), Some(PieceKind::King), "{mv}");
        }
    }

    #[test]
    fn single_check_allows_block_and_capture() {
        // Rook e8 checks; bishop d7 can capture, knight c3 can block on e4 or e2.
        let (_, moves) = legal("4r2k/3B4/8/8/8/2N5/8/4K3 w - - 0 1");
        let texts: Vec<String> = moves.iter().map(|m| m.to_string()).collect();
        assert!(texts.contains(&"d7e8".to_string()));
        assert!(texts.contains(&"c3e4".to_string()));
        assert!(texts.contains(&"c3e2".to_string()));
        assert!(!texts.contains(&"c3d5".to_string()));
    }

    #[test]
    fn castling_not_through_attacked_square() {
        let (_, moves) = legal("4k3/8/b7/8/8/8/8/R3K2R w KQ - 0 1");
        let castles: Vec<_> = moves.iter().filter(|m| matches!(m.kind(), MoveKind::Castle(_))).collect();
        assert_eq!(castles.len(), 1);
        assert_eq!(castles[0].kind(), MoveKind::Castle(CastleSide::Queen));
    }

    #[test]
    fn queen_side_castle_ignores_attack_on_b_file() {
        let (_, moves) = legal("1r2k3/8/8/8/8/8/8/R3K3 w Q - 0 1");
        assert!(moves.iter().any(|m| m.kind() == MoveKind::Castle(CastleSide::Queen)));
    }

    #[test]
    fn no_castling_out_of_check() {
        let (_, moves) = legal("4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(moves.iter().all(|m| !matches!(m.kind(), MoveKind::Castle(_))));
    }

    #[test]
    fn en_passant_available() {
        let (_, moves) = legal("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1");
        assert_eq!(moves.iter().filter(|m| m.kind() == MoveKind::EnPassant).count(), 1);
    }

    #[test]
    fn en_passant_discovered_check_on_rank_is_illegal() {
        let (_, moves) = legal("4k3/8/8/KPp4r/8/8/8/8 w - c6 0 1");
        assert_eq!(moves.iter().filter(|m| m.kind() == MoveKind::EnPassant).count(), 0);
    }

    #[test]
    fn en_passant_captures_checking_pawn() {
        // Black just played d7d5 giving check to the king on e4.
        let (_, moves) = legal("4k3/8/8/3pP3/4K3/8/8/8 w - d6 0 1");
        assert!(moves.iter().any(|m| m.kind() == MoveKind::EnPassant));
    }

    #[test]
    fn promotion_generates_four_moves() {
        let (_, moves) = legal("4k3/P7/8/8/8/8/8/4K3 w - - 0 1");
        assert_eq!(moves.iter().filter(|m| m.promotion_piece().is_some()).count(), 4);
    }

    #[test]
    fn checkmate_and_stalemate_have_no_moves() {
        let (pos, moves) = legal("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1");
        assert!(moves.is_empty());
        assert!(pos.in_check());

        let (pos, moves) = legal("7k/5Q2/8/8/8/8/8/6K1 b - - 0 1");
        assert!(moves.is_empty());
        assert!(!pos.in_check());
    }

    #[test]
    fn captures_are_subset_of_legal() {
        let pos: Position = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
            .parse()
            .unwrap();
        let all = generate_legal(&pos);
        let captures = generate_captures(&pos);
        assert_eq!(captures.len(), 8);
        for mv in captures.iter() {
            assert!(all.contains(mv), "{mv} missing from legal list");
            assert!(!mv.is_quiet());
        }
        let noisy_in_all = all.iter().filter(|m| !m.is_quiet()).count();
        assert_eq!(noisy_in_all, captures.len());
    }

    #[test]
    fn captures_include_quiet_promotions() {
        let pos: Position = "4k3/1P6/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        let captures = generate_captures(&pos);
        assert_eq!(captures.len(), 4);
    }
}
