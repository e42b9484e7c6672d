//! Core chess rules: board representation, make/unmake, legal move generation.

mod attack_info;
mod bitboard;
mod castling;
mod chess_move;
mod color;
mod error;
mod fen;
pub mod movegen;
mod notation;
mod perft;
mod piece;
mod position;
pub mod rays;
mod square;
mod zobrist;

pub use attack_info::AttackInfo;
pub use bitboard::Bitboard;
pub use castling::{CastleSide, CastlingRights};
pub use chess_move::{Move, MoveKind};
pub use color::Color;
pub use error::{FenError, MoveParseError, PositionError};
pub use fen::STARTING_FEN;
pub use movegen::{MoveList, generate_captures, generate_legal};
pub use perft::{divide, perft};
pub use piece::PieceKind;
pub use position::{Position, PrettyPosition, Undo};
pub use square::Square;
pub use zobrist::{KEYS, ZobristTable};
