//! The mutable game position: placement, rights, clocks, hash and history.

use std::fmt;

use crate::bitboard::Bitboard;
use crate::castling::{CastleSide, CastlingRights, REVOKE};
use crate::chess_move::{Move, MoveKind};
use crate::color::Color;
use crate::error::PositionError;
use crate::piece::PieceKind;
use crate::rays::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks};
use crate::square::Square;
use crate::zobrist::KEYS;

/// State that [`Position::make_move`] cannot rebuild from the move alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Undo {
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u16,
    fullmove_number: u16,
    key: u64,
}

/// A chess position that is mutated in place with [`make_move`](Position::make_move)
/// and restored with [`unmake_move`](Position::unmake_move).
#[derive(Clone)]
pub struct Position {
    mailbox: [Option<PieceKind>; 64],
    pieces: [Bitboard; PieceKind::COUNT],
    sides: [Bitboard; Color::COUNT],
    occupied: Bitboard,
    kings: [Square; Color::COUNT],
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u16,
    fullmove_number: u16,
    /// Plies played since the position was loaded.
    ply: u32,
    key: u64,
    /// Keys of every earlier position, oldest first.
    history: Vec<u64>,
}

impl Position {
    pub(crate) fn empty() -> Position {
        Position {
            mailbox: [None; 64],
            pieces: [Bitboard::EMPTY; PieceKind::COUNT],
            sides: [Bitboard::EMPTY; Color::COUNT],
            occupied: Bitboard::EMPTY,
            kings: [Square::E1, Square::E8],
            side_to_move: Color::White,
            castling: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            ply: 0,
            key: 0,
            history: Vec::new(),
        }
    }

    /// The standard starting position.
    pub fn startpos() -> Position {
        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        let mut pos = Position::empty();
        for (file, &kind) in BACK_RANK.iter().enumerate() {
            let file = file as u8;
            pos.put(Color::White, kind, Square::new(file, 0));
            pos.put(Color::White, PieceKind::Pawn, Square::new(file, 1));
            pos.put(Color::Black, PieceKind::Pawn, Square::new(file, 6));
            pos.put(Color::Black, kind, Square::new(file, 7));
        }
        pos.castling = CastlingRights::ALL;
        pos.key = pos.compute_key();
        pos
    }

    /// Place a piece on an empty square. Does not touch the key.
    pub(crate) fn put(&mut self, color: Color, kind: PieceKind, sq: Square) {
        debug_assert!(self.mailbox[sq.index()].is_none());
        self.mailbox[sq.index()] = Some(kind);
        self.pieces[kind.index()] |= sq.bitboard();
        self.sides[color.index()] |= sq.bitboard();
        self.occupied |= sq.bitboard();
        if kind == PieceKind::King {
            self.kings[color.index()] = sq;
        }
    }

    /// Install the non-placement fields parsed from FEN and hash from scratch.
    pub(crate) fn finish_setup(
        &mut self,
        side_to_move: Color,
        castling: CastlingRights,
        en_passant: Option<Square>,
        halfmove_clock: u16,
        fullmove_number: u16,
    ) {
        self.side_to_move = side_to_move;
        self.castling = castling;
        self.halfmove_clock = halfmove_clock;
        self.fullmove_number = fullmove_number.max(1);
        // Recorded only when it could actually be used, same as after a double push.
        self.en_passant = en_passant.filter(|&ep| self.en_passant_capturable(ep, side_to_move));
        self.key = self.compute_key();
    }

    #[inline]
    pub fn piece_on(&self, sq: Square) -> Option<PieceKind> {
        self.mailbox[sq.index()]
    }

    pub fn color_on(&self, sq: Square) -> Option<Color> {
        Color::ALL
            .into_iter()
            .find(|&color| self.sides[color.index()].contains(sq))
    }

    /// Both colors' pieces of one kind.
    #[inline]
    pub fn pieces(&self, kind: PieceKind) -> Bitboard {
        self.pieces[kind.index()]
    }

    #[inline]
    pub fn side(&self, color: Color) -> Bitboard {
        self.sides[color.index()]
    }

    #[inline]
    pub fn colored(&self, color: Color, kind: PieceKind) -> Bitboard {
        self.pieces[kind.index()] & self.sides[color.index()]
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.occupied
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.kings[color.index()]
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    #[inline]
    pub fn ply(&self) -> u32 {
        self.ply
    }

    /// Zobrist hash of the position.
    #[inline]
    pub fn key(&self) -> u64 {
        self.key
    }

    /// Number of earlier positions recorded for repetition detection.
    #[inline]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Whether `by` attacks `sq`, treating `occupied` as the blocker set.
    pub fn is_square_attacked_with(&self, sq: Square, by: Color, occupied: Bitboard) -> bool {
        let them = self.side(by);
        if (knight_attacks(sq) & them & self.pieces(PieceKind::Knight)).any()
            || (king_attacks(sq) & them & self.pieces(PieceKind::King)).any()
            || (pawn_attacks(!by, sq) & them & self.pieces(PieceKind::Pawn)).any()
        {
            return true;
        }
        let queens = self.pieces(PieceKind::Queen);
        let orthogonal = (self.pieces(PieceKind::Rook) | queens) & them;
        let diagonal = (self.pieces(PieceKind::Bishop) | queens) & them;
        (rook_attacks(sq, occupied) & orthogonal).any()
            || (bishop_attacks(sq, occupied) & diagonal).any()
    }

    #[inline]
    pub fn is_square_attacked(&self, sq: Square, by: Color) -> bool {
        self.is_square_attacked_with(sq, by, self.occupied)
    }

    /// Whether the side to move is in check.
    pub fn in_check(&self) -> bool {
        let us = self.side_to_move;
        self.is_square_attacked(self.king_square(us), !us)
    }

    /// Whether a pawn of the side to move (`capturer`) could take on `ep`.
    fn en_passant_capturable(&self, ep: Square, capturer: Color) -> bool {
        (pawn_attacks(!capturer, ep) & self.colored(capturer, PieceKind::Pawn)).any()
    }

    /// Toggle a piece on `sq` in the kind bitboard, the mailbox and the key.
    #[inline]
    fn toggle(&mut self, color: Color, kind: PieceKind, sq: Square, present: bool) {
        self.pieces[kind.index()] ^= sq.bitboard();
        self.mailbox[sq.index()] = if present { Some(kind) } else { None };
        self.key ^= KEYS.piece(color, kind, sq);
    }

    /// Apply a legal move and return what is needed to take it back.
    ///
    /// # Panics
    ///
    /// Panics when given [`Move::NULL`].
    pub fn make_move(&mut self, mv: Move) -> Undo {
        assert!(!mv.is_null(), "make_move called with the null move");

        let undo = Undo {
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
            key: self.key,
        };
        self.history.push(self.key);

        let us = self.side_to_move;
        let them = !us;
        let (from, to, piece) = (mv.from(), mv.to(), mv.piece());

        if let Some(victim) = mv.captured() {
            let target = mv.en_passant_victim().unwrap_or(to);
            self.toggle(them, victim, target, false);
        }

        self.toggle(us, piece, from, false);
        self.toggle(us, piece, to, true);

        match mv.kind() {
            MoveKind::Promotion(promo) | MoveKind::CapturePromotion { promo, .. } => {
                self.toggle(us, PieceKind::Pawn, to, false);
                self.toggle(us, promo, to, true);
            }
            MoveKind::Castle(side) => {
                let (rook_from, rook_to) = side.rook_squares(us);
                self.toggle(us, PieceKind::Rook, rook_from, false);
                self.toggle(us, PieceKind::Rook, rook_to, true);
            }
            _ => {}
        }

        self.sides[us.index()] ^= mv.own_xor();
        self.sides[them.index()] ^= mv.opp_xor();
        self.occupied = self.sides[0] | self.sides[1];
        if piece == PieceKind::King {
            self.kings[us.index()] = to;
        }

        self.key ^= KEYS.en_passant(self.en_passant);
        self.en_passant = None;
        if mv.kind() == MoveKind::DoublePush {
            let ep = Square::new(from.file(), (from.rank() + to.rank()) / 2);
            if self.en_passant_capturable(ep, them) {
                self.en_passant = Some(ep);
                self.key ^= KEYS.en_passant(Some(ep));
            }
        }

        let rights = self
            .castling
            .remove(REVOKE[from.index()])
            .remove(REVOKE[to.index()]);
        self.key ^= KEYS.castling(self.castling) ^ KEYS.castling(rights);
        self.castling = rights;

        if piece == PieceKind::Pawn || mv.is_capture() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        if us == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }
        self.ply += 1;

        self.side_to_move = them;
        self.key ^= KEYS.side;
        undo
    }

    /// Exact inverse of [`make_move`](Position::make_move). Calls must nest LIFO.
    pub fn unmake_move(&mut self, mv: Move, undo: Undo) {
        let them = self.side_to_move;
        let us = !them;
        let (from, to, piece) = (mv.from(), mv.to(), mv.piece());

        match mv.kind() {
            MoveKind::Promotion(promo) | MoveKind::CapturePromotion { promo, .. } => {
                self.toggle(us, promo, to, false);
                self.toggle(us, PieceKind::Pawn, to, true);
            }
            MoveKind::Castle(side) => {
                let (rook_from, rook_to) = side.rook_squares(us);
                self.toggle(us, PieceKind::Rook, rook_to, false);
                self.toggle(us, PieceKind::Rook, rook_from, true);
            }
            _ => {}
        }

        self.toggle(us, piece, to, false);
        self.toggle(us, piece, from, true);

        if let Some(victim) = mv.captured() {
            let target = mv.en_passant_victim().unwrap_or(to);
            self.toggle(them, victim, target, true);
        }

        self.sides[us.index()] ^= mv.own_xor();
        self.sides[them.index()] ^= mv.opp_xor();
        self.occupied = self.sides[0] | self.sides[1];
        if piece == PieceKind::King {
            self.kings[us.index()] = from;
        }

        self.ply -= 1;
        self.side_to_move = us;
        self.castling = undo.castling;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        self.fullmove_number = undo.fullmove_number;
        self.key = undo.key;
        self.history.pop();
    }

    /// Keys of earlier positions with the same side to move that are still
    /// reachable, newest first, paired with their history index.
    fn reversible_keys(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        let window = usize::from(self.halfmove_clock).min(self.history.len());
        self.history
            .iter()
            .copied()
            .enumerate()
            .rev()
            .take(window)
            .skip(1)
            .step_by(2)
    }

    /// How many times the current position occurred before.
    pub fn repetition_count(&self) -> usize {
        self.reversible_keys().filter(|&(_, key)| key == self.key).count()
    }

    /// In-search draw test.
    ///
    /// `search_root` is the history length at the search root. One repeat of
    /// a position reached inside the tree is enough; positions from before
    /// the root need two.
    pub fn is_repetition(&self, search_root: usize) -> bool {
        let mut seen = 0;
        for (index, key) in self.reversible_keys() {
            if key != self.key {
                continue;
            }
            if index >= search_root {
                return true;
            }
            seen += 1;
            if seen >= 2 {
                return true;
            }
        }
        false
    }

    /// Hash the position from scratch.
    pub fn compute_key(&self) -> u64 {
        let mut key = 0;
        for color in Color::ALL {
            for kind in PieceKind::ALL {
                for sq in self.colored(color, kind) {
                    key ^= KEYS.piece(color, kind, sq);
                }
            }
        }
        if self.side_to_move == Color::Black {
            key ^= KEYS.side;
        }
        key ^ KEYS.castling(self.castling) ^ KEYS.en_passant(self.en_passant)
    }

    /// Check every structural invariant.
    pub fn validate(&self) -> Result<(), PositionError> {
        for color in Color::ALL {
            let kings = self.colored(color, PieceKind::King);
            if kings.count() != 1 {
                return Err(PositionError::KingCount { color, count: kings.count() });
            }
            if kings.lsb() != Some(self.king_square(color)) {
                return Err(PositionError::KingSquareMismatch { color });
            }
        }

        if (self.pieces(PieceKind::Pawn) & (Bitboard::RANK_1 | Bitboard::RANK_8)).any() {
            return Err(PositionError::PawnsOnBackRank);
        }

        let mut union = Bitboard::EMPTY;
        for bb in self.pieces {
            if (union & bb).any() {
                return Err(PositionError::OverlappingPieces);
            }
            union |= bb;
        }

        let (white, black) = (self.side(Color::White), self.side(Color::Black));
        if (white & black).any() || self.occupied != (white | black) || self.occupied != union {
            return Err(PositionError::InconsistentOccupancy);
        }

        for square in Square::all() {
            let from_bitboards = PieceKind::ALL
                .into_iter()
                .find(|kind| self.pieces(*kind).contains(square));
            if from_bitboards != self.piece_on(square) {
                return Err(PositionError::MailboxMismatch { square });
            }
        }

        let mover = self.side_to_move;
        if self.is_square_attacked(self.king_square(!mover), mover) {
            return Err(PositionError::OpponentInCheck);
        }

        for color in Color::ALL {
            for side in CastleSide::BOTH {
                if !self.castling.can_castle(color, side) {
                    continue;
                }
                let (king_home, _) = side.king_squares(color);
                let (rook_home, _) = side.rook_squares(color);
                if !self.colored(color, PieceKind::King).contains(king_home)
                    || !self.colored(color, PieceKind::Rook).contains(rook_home)
                {
                    return Err(PositionError::StaleCastlingRight { color, side });
                }
            }
        }

        if let Some(square) = self.en_passant {
            let pusher = !mover;
            let pawn_square = Square::new(square.file(), if pusher == Color::White { 3 } else { 4 });
            if square.relative_rank(pusher) != 2
                || self.occupied.contains(square)
                || !self.colored(pusher, PieceKind::Pawn).contains(pawn_square)
            {
                return Err(PositionError::BadEnPassant { square });
            }
        }

        Ok(())
    }

    /// Wrapper that renders the board as an 8x8 grid.
    pub fn pretty(&self) -> PrettyPosition<'_> {
        PrettyPosition(self)
    }
}

impl Default for Position {
    fn default() -> Position {
        Position::startpos()
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position(\"{}\")", self.to_fen())
    }
}

pub struct PrettyPosition<'a>(&'a Position);

impl fmt::Display for PrettyPosition<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pos = self.0;
        for rank in (0u8..8).rev() {
            write!(f, "{}  ", rank + 1)?;
            for file in 0u8..8 {
                let sq = Square::new(file, rank);
                let c = match (pos.piece_on(sq), pos.color_on(sq)) {
                    (Some(kind), Some(color)) => kind.fen_char(color),
                    _ => '.',
                };
                let sep = if file < 7 { " " } else { "" };
                write!(f, "{c}{sep}")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "   a b c d e f g h")?;
        writeln!(f)?;
        writeln!(f, "Fen: {}", pos.to_fen())?;
        write!(f, "Key: {:016x}", pos.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen::generate_legal;

    fn play(pos: &mut Position, moves: &[&str]) {
        for text in moves {
            let mv = pos.parse_move(text).unwrap();
            pos.make_move(mv);
        }
    }

    #[test]
    fn startpos_is_valid() {
        let pos = Position::startpos();
        pos.validate().unwrap();
        assert_eq!(pos.occupied().count(), 32);
        assert_eq!(pos.king_square(Color::White), Square::E1);
        assert_eq!(pos.king_square(Color::Black), Square::E8);
        assert_eq!(pos.piece_on(Square::D8), Some(PieceKind::Queen));
        assert_eq!(pos.key(), pos.compute_key());
    }

    #[test]
    fn make_unmake_restores_everything() {
        let fens = [
            crate::fen::STARTING_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        ];
        for fen in fens {
            let mut pos: Position = fen.parse().unwrap();
            let before_fen = pos.to_fen();
            let before_key = pos.key();
            for mv in generate_legal(&pos).iter().copied() {
                let undo = pos.make_move(mv);
                pos.validate().unwrap_or_else(|e| panic!("{fen} after {mv}: {e}"));
                assert_eq!(pos.key(), pos.compute_key(), "{fen} after {mv}");
                pos.unmake_move(mv, undo);
                assert_eq!(pos.to_fen(), before_fen, "{fen} undo {mv}");
                assert_eq!(pos.key(), before_key);
                assert_eq!(pos.history_len(), 0);
            }
        }
    }

    #[test]
    fn double_push_sets_en_passant_only_when_capturable() {
        let mut pos = Position::startpos();
        play(&mut pos, &["e2e4"]);
        assert_eq!(pos.en_passant(), None);

        let mut pos: Position = "4k3/8/8/8/3p4/8/4P3/4K3 w - - 0 1".parse().unwrap();
        play(&mut pos, &["e2e4"]);
        assert_eq!(pos.en_passant(), Some(Square::E3));
        assert_eq!(pos.key(), pos.compute_key());
    }

    #[test]
    fn capture_on_rook_corner_revokes_right() {
        let mut pos: Position = "r3k2r/8/8/8/8/8/6B1/R3K2R w KQkq - 0 1".parse().unwrap();
        play(&mut pos, &["g2a8"]);
        assert!(!pos.castling().can_castle(Color::Black, CastleSide::Queen));
        assert!(pos.castling().can_castle(Color::Black, CastleSide::King));
        assert!(pos.castling().can_castle(Color::White, CastleSide::King));
        assert_eq!(pos.key(), pos.compute_key());
    }

    #[test]
    fn king_move_revokes_both_rights() {
        let mut pos: Position = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse().unwrap();
        play(&mut pos, &["e1f1"]);
        assert_eq!(pos.castling(), CastlingRights::BLACK);
        assert_eq!(pos.king_square(Color::White), Square::F1);
    }

    #[test]
    fn castling_moves_rook() {
        let mut pos: Position = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse().unwrap();
        play(&mut pos, &["e1g1", "e8c8"]);
        assert_eq!(pos.piece_on(Square::F1), Some(PieceKind::Rook));
        assert_eq!(pos.piece_on(Square::H1), None);
        assert_eq!(pos.piece_on(Square::D8), Some(PieceKind::Rook));
        assert_eq!(pos.piece_on(Square::A8), None);
        assert_eq!(pos.castling(), CastlingRights::NONE);
        pos.validate().unwrap();
    }

    #[test]
    fn clocks_advance() {
        let mut pos = Position::startpos();
        play(&mut pos, &["g1f3", "g8f6"]);
        assert_eq!(pos.halfmove_clock(), 2);
        assert_eq!(pos.fullmove_number(), 2);
        assert_eq!(pos.ply(), 2);
        play(&mut pos, &["e2e4"]);
        assert_eq!(pos.halfmove_clock(), 0);
    }

    #[test]
    fn clocks_saturate_at_counter_limit() {
        let mut pos: Position = "4k3/8/8/8/8/8/8/R3K3 w - - 65535 1".parse().unwrap();
        let mv = pos.parse_move("a1a2").unwrap();
        let undo = pos.make_move(mv);
        assert_eq!(pos.halfmove_clock(), u16::MAX);
        pos.unmake_move(mv, undo);
        assert_eq!(pos.halfmove_clock(), u16::MAX);

        let mut pos: Position = "4k3/8/8/8/8/8/8/R3K3 b - - 0 65535".parse().unwrap();
        let before = pos.to_fen();
        let mv = pos.parse_move("e8d8").unwrap();
        let undo = pos.make_move(mv);
        assert_eq!(pos.fullmove_number(), u16::MAX);
        pos.unmake_move(mv, undo);
        assert_eq!(pos.to_fen(), before);
    }

    #[test]
    fn threefold_via_knight_shuffle() {
        let mut pos = Position::startpos();
        let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
        assert_eq!(pos.repetition_count(), 0);
        play(&mut pos, &shuffle);
        assert_eq!(pos.repetition_count(), 1);
        play(&mut pos, &shuffle);
        assert_eq!(pos.repetition_count(), 2);
    }

    #[test]
    fn repetition_window_stops_at_irreversible_move() {
        let mut pos = Position::startpos();
        play(&mut pos, &["g1f3", "g8f6", "f3g1", "f6g8", "e2e4", "e7e5"]);
        assert_eq!(pos.repetition_count(), 0);
    }

    #[test]
    fn in_search_repetition_needs_one_repeat_inside_tree() {
        let mut pos = Position::startpos();
        let root = pos.history_len();
        play(&mut pos, &["g1f3", "g8f6", "f3g1", "f6g8"]);
        assert!(pos.is_repetition(root));

        // The same sequence played before the root counts once only.
        let root = pos.history_len();
        assert!(!pos.is_repetition(root));
        play(&mut pos, &["g1f3", "g8f6", "f3g1", "f6g8"]);
        assert!(pos.is_repetition(root));
    }

    #[test]
    #[should_panic(expected = "null move")]
    fn null_move_panics() {
        let mut pos = Position::startpos();
        pos.make_move(Move::NULL);
    }

    #[test]
    fn validate_rejects_stale_castling() {
        let result = "r3k2r/8/8/8/8/8/8/R3K3 w KQkq - 0 1".parse::<Position>();
        assert!(result.is_err());
    }

    #[test]
    fn pretty_print() {
        let text = Position::startpos().pretty().to_string();
        assert!(text.contains("r n b q k b n r"));
        assert!(text.contains("R N B Q K B N R"));
        assert!(text.contains("a b c d e f g h"));
    }
}
