//! Castling rights and the fixed square geometry of each castle.

use std::fmt;

use crate::bitboard::Bitboard;
use crate::color::Color;
use crate::square::Square;

/// Which wing the king castles towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    King,
    Queen,
}

impl CastleSide {
    pub const BOTH: [CastleSide; 2] = [CastleSide::King, CastleSide::Queen];

    /// King origin and destination.
    pub const fn king_squares(self, color: Color) -> (Square, Square) {
        match (color, self) {
            (Color::White, CastleSide::King) => (Square::E1, Square::G1),
            (Color::White, CastleSide::Queen) => (Square::E1, Square::C1),
            (Color::Black, CastleSide::King) => (Square::E8, Square::G8),
            (Color::Black, CastleSide::Queen) => (Square::E8, Square::C8),
        }
    }

    /// Rook origin and destination.
    pub const fn rook_squares(self, color: Color) -> (Square, Square) {
        match (color, self) {
            (Color::White, CastleSide::King) => (Square::H1, Square::F1),
            (Color::White, CastleSide::Queen) => (Square::A1, Square::D1),
            (Color::Black, CastleSide::King) => (Square::H8, Square::F8),
            (Color::Black, CastleSide::Queen) => (Square::A8, Square::D8),
        }
    }

    /// Squares strictly between king and rook; all must be empty.
    pub const fn empty_path(self, color: Color) -> Bitboard {
        let bits = match self {
            CastleSide::King => 0x60,
            CastleSide::Queen => 0x0E,
        };
        match color {
            Color::White => Bitboard::new(bits),
            Color::Black => Bitboard::new(bits << 56),
        }
    }

    /// Squares the king crosses or lands on; none may be attacked.
    pub const fn king_path(self, color: Color) -> Bitboard {
        let bits = match self {
            CastleSide::King => 0x60,
            CastleSide::Queen => 0x0C,
        };
        match color {
            Color::White => Bitboard::new(bits),
            Color::Black => Bitboard::new(bits << 56),
        }
    }

    pub const fn right(self, color: Color) -> CastlingRights {
        match (color, self) {
            (Color::White, CastleSide::King) => CastlingRights::WHITE_KING,
            (Color::White, CastleSide::Queen) => CastlingRights::WHITE_QUEEN,
            (Color::Black, CastleSide::King) => CastlingRights::BLACK_KING,
            (Color::Black, CastleSide::Queen) => CastlingRights::BLACK_QUEEN,
        }
    }
}

/// Four independent castling flags packed into the low nibble.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_KING: CastlingRights = CastlingRights(0b0001);
    pub const WHITE_QUEEN: CastlingRights = CastlingRights(0b0010);
    pub const BLACK_KING: CastlingRights = CastlingRights(0b0100);
    pub const BLACK_QUEEN: CastlingRights = CastlingRights(0b1000);
    pub const WHITE: CastlingRights = CastlingRights(0b0011);
    pub const BLACK: CastlingRights = CastlingRights(0b1100);
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    /// Flags in FEN order (`KQkq`), paired with their letter.
    pub const FLAGS: [(CastlingRights, char); 4] = [
        (CastlingRights::WHITE_KING, 'K'),
        (CastlingRights::WHITE_QUEEN, 'Q'),
        (CastlingRights::BLACK_KING, 'k'),
        (CastlingRights::BLACK_QUEEN, 'q'),
    ];

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn contains(self, other: CastlingRights) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn insert(self, other: CastlingRights) -> CastlingRights {
        CastlingRights(self.0 | other.0)
    }

    #[inline]
    pub const fn remove(self, other: CastlingRights) -> CastlingRights {
        CastlingRights(self.0 & !other.0)
    }

    /// Whether `color` may still castle on `side`.
    #[inline]
    pub const fn can_castle(self, color: Color, side: CastleSide) -> bool {
        self.contains(side.right(color))
    }
}

/// Rights lost when a move starts or ends on the indexed square.
pub(crate) static REVOKE: [CastlingRights; 64] = {
    let mut table = [CastlingRights::NONE; 64];
    table[Square::E1.index()] = CastlingRights::WHITE;
    table[Square::A1.index()] = CastlingRights::WHITE_QUEEN;
    table[Square::H1.index()] = CastlingRights::WHITE_KING;
    table[Square::E8.index()] = CastlingRights::BLACK;
    table[Square::A8.index()] = CastlingRights::BLACK_QUEEN;
    table[Square::H8.index()] = CastlingRights::BLACK_KING;
    table
};

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        for (flag, letter) in CastlingRights::FLAGS {
            if self.contains(flag) {
                write!(f, "{letter}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CastlingRights({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_in_fen_order() {
        assert_eq!(CastlingRights::ALL.to_string(), "KQkq");
        assert_eq!(CastlingRights::NONE.to_string(), "-");
        assert_eq!(
            CastlingRights::WHITE_QUEEN.insert(CastlingRights::BLACK_KING).to_string(),
            "Qk"
        );
    }

    #[test]
    fn remove_is_independent_per_flag() {
        let rights = CastlingRights::ALL.remove(CastlingRights::WHITE_KING);
        assert!(!rights.can_castle(Color::White, CastleSide::King));
        assert!(rights.can_castle(Color::White, CastleSide::Queen));
        assert!(rights.can_castle(Color::Black, CastleSide::King));
    }

    #[test]
    fn revoke_table_covers_home_squares() {
        assert_eq!(REVOKE[Square::E1.index()], CastlingRights::WHITE);
        assert_eq!(REVOKE[Square::H8.index()], CastlingRights::BLACK_KING);
        assert_eq!(REVOKE[Square::E4.index()], CastlingRights::NONE);
    }

    #[test]
    fn path_geometry() {
        assert_eq!(
            CastleSide::Queen.empty_path(Color::White),
            Square::B1.bitboard() | Square::C1.bitboard() | Square::D1.bitboard()
        );
        assert_eq!(
            CastleSide::King.king_path(Color::Black),
            Square::F8.bitboard() | Square::G8.bitboard()
        );
        assert_eq!(
            CastleSide::Queen.king_path(Color::Black),
            Square::C8.bitboard() | Square::D8.bitboard()
        );
    }
}
