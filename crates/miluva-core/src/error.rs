//! Error types for FEN parsing, position validation and move text.

use crate::castling::CastleSide;
use crate::color::Color;
use crate::square::Square;

/// Errors that occur when parsing a FEN string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    /// Fewer than four or more than six space-separated fields.
    #[error("expected 4 to 6 FEN fields, found {found}")]
    WrongFieldCount { found: usize },

    #[error("expected 8 ranks in piece placement, found {found}")]
    WrongRankCount { found: usize },

    /// A rank describes more or fewer than 8 squares.
    #[error("rank {rank} describes {length} squares, expected 8")]
    BadRankLength {
        /// Rank number as written in FEN order (8 first).
        rank: usize,
        length: usize,
    },

    #[error("invalid piece character: '{character}'")]
    InvalidPieceChar { character: char },

    #[error("invalid active color: \"{found}\"")]
    InvalidColor { found: String },

    #[error("invalid castling character: '{character}'")]
    InvalidCastlingChar { character: char },

    #[error("invalid en passant square: \"{found}\"")]
    InvalidEnPassant { found: String },

    #[error("invalid {field}: \"{found}\"")]
    InvalidMoveCounter { field: &'static str, found: String },

    #[error("invalid position: {0}")]
    InvalidPosition(#[from] PositionError),
}

/// Structural problems found by [`Position::validate`](crate::Position::validate).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    #[error("expected 1 king for {color}, found {count}")]
    KingCount { color: Color, count: u32 },

    #[error("pawns found on back rank")]
    PawnsOnBackRank,

    #[error("piece bitboards overlap")]
    OverlappingPieces,

    #[error("occupied bitboard is inconsistent with color bitboards")]
    InconsistentOccupancy,

    #[error("mailbox disagrees with bitboards on {square}")]
    MailboxMismatch { square: Square },

    #[error("tracked king square for {color} is wrong")]
    KingSquareMismatch { color: Color },

    /// The side that just moved left its king attacked.
    #[error("side not to move is in check")]
    OpponentInCheck,

    #[error("{color} has a {side:?}side castling right but king or rook left home")]
    StaleCastlingRight { color: Color, side: CastleSide },

    #[error("en passant square {square} is not consistent with the last move")]
    BadEnPassant { square: Square },
}

/// Errors produced when turning coordinate text into a legal move.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveParseError {
    #[error("invalid square: \"{text}\"")]
    BadSquare { text: String },

    #[error("malformed move text: \"{text}\"")]
    Malformed { text: String },

    #[error("invalid promotion piece: '{piece}'")]
    BadPromotion { piece: char },

    #[error("illegal move in this position: {text}")]
    Illegal { text: String },
}
