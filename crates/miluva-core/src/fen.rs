//! FEN parsing and serialization for [`Position`].

use std::fmt::{self, Write};
use std::str::FromStr;

use crate::castling::CastlingRights;
use crate::color::Color;
use crate::error::FenError;
use crate::piece::PieceKind;
use crate::position::Position;
use crate::square::Square;

/// The FEN string for the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

fn parse_castling(field: &str) -> Result<CastlingRights, FenError> {
    if field == "-" {
        return Ok(CastlingRights::NONE);
    }
    field.chars().try_fold(CastlingRights::NONE, |rights, c| {
        CastlingRights::FLAGS
            .iter()
            .find(|(_, letter)| *letter == c)
            .map(|(flag, _)| rights.insert(*flag))
            .ok_or(FenError::InvalidCastlingChar { character: c })
    })
}

fn parse_counter(field: Option<&str>, name: &'static str, default: u16) -> Result<u16, FenError> {
    match field {
        None => Ok(default),
        Some(text) => text.parse().map_err(|_| FenError::InvalidMoveCounter {
            field: name,
            found: text.to_string(),
        }),
    }
}

impl FromStr for Position {
    type Err = FenError;

    /// Parse a FEN string. The two move counters may be omitted.
    fn from_str(fen: &str) -> Result<Position, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if !(4..=6).contains(&fields.len()) {
            return Err(FenError::WrongFieldCount { found: fields.len() });
        }

        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::WrongRankCount { found: ranks.len() });
        }

        let mut pos = Position::empty();
        for (row, text) in ranks.iter().enumerate() {
            let rank = 7 - row as u8;
            let mut file = 0usize;
            for c in text.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if !(1..=8).contains(&skip) {
                        return Err(FenError::InvalidPieceChar { character: c });
                    }
                    file += skip as usize;
                    continue;
                }
                let (color, kind) =
                    PieceKind::from_fen_char(c).ok_or(FenError::InvalidPieceChar { character: c })?;
                if file >= 8 {
                    return Err(FenError::BadRankLength { rank: rank as usize + 1, length: file + 1 });
                }
                pos.put(color, kind, Square::new(file as u8, rank));
                file += 1;
            }
            if file != 8 {
                return Err(FenError::BadRankLength { rank: rank as usize + 1, length: file });
            }
        }

        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidColor { found: other.to_string() }),
        };

        let castling = parse_castling(fields[2])?;

        let en_passant = match fields[3] {
            "-" => None,
            text => Some(
                Square::from_algebraic(text)
                    .ok_or_else(|| FenError::InvalidEnPassant { found: text.to_string() })?,
            ),
        };

        let halfmove_clock = parse_counter(fields.get(4).copied(), "halfmove clock", 0)?;
        let fullmove_number = parse_counter(fields.get(5).copied(), "fullmove number", 1)?;

        pos.finish_setup(side_to_move, castling, en_passant, halfmove_clock, fullmove_number);
        pos.validate()?;
        Ok(pos)
    }
}

impl Position {
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(90);
        for rank in (0u8..8).rev() {
            let mut empty = 0;
            for file in 0u8..8 {
                let sq = Square::new(file, rank);
                match (self.piece_on(sq), self.color_on(sq)) {
                    (Some(kind), Some(color)) => {
                        if empty > 0 {
                            let _ = write!(fen, "{empty}");
                            empty = 0;
                        }
                        fen.push(kind.fen_char(color));
                    }
                    _ => empty += 1,
                }
            }
            if empty > 0 {
                let _ = write!(fen, "{empty}");
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        let side = match self.side_to_move() {
            Color::White => 'w',
            Color::Black => 'b',
        };
        let ep = self.en_passant().map_or_else(|| "-".to_string(), |sq| sq.to_string());
        let _ = write!(
            fen,
            " {side} {} {ep} {} {}",
            self.castling(),
            self.halfmove_clock(),
            self.fullmove_number()
        );
        fen
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PositionError;

    #[test]
    fn starting_fen_matches_startpos() {
        let parsed: Position = STARTING_FEN.parse().unwrap();
        let built = Position::startpos();
        assert_eq!(parsed.to_fen(), STARTING_FEN);
        assert_eq!(parsed.key(), built.key());
    }

    #[test]
    fn round_trip() {
        let fens = [
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 3",
        ];
        for fen in fens {
            let pos: Position = fen.parse().unwrap();
            assert_eq!(pos.to_fen(), fen);
            assert_eq!(pos.to_string(), fen);
        }
    }

    #[test]
    fn counters_are_optional() {
        let pos: Position = "4k3/8/8/8/8/8/8/4K3 b - -".parse().unwrap();
        assert_eq!(pos.halfmove_clock(), 0);
        assert_eq!(pos.fullmove_number(), 1);
        assert_eq!(pos.side_to_move(), Color::Black);
    }

    #[test]
    fn unusable_en_passant_square_is_dropped() {
        let pos: Position = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
            .parse()
            .unwrap();
        assert_eq!(pos.en_passant(), None);
        assert_eq!(pos.key(), pos.compute_key());
    }

    #[test]
    fn errors() {
        assert_eq!(
            "8/8/8 w - - 0 1".parse::<Position>().unwrap_err(),
            FenError::WrongRankCount { found: 3 }
        );
        assert_eq!(
            "4k3/8/8/8/8/8/8/4K3".parse::<Position>().unwrap_err(),
            FenError::WrongFieldCount { found: 1 }
        );
        assert!(matches!(
            "4k3/8/8/8/8/8/8/4K3 x - - 0 1".parse::<Position>(),
            Err(FenError::InvalidColor { .. })
        ));
        assert!(matches!(
            "4k3/8/8/8/8/8/8/4K3 w X - 0 1".parse::<Position>(),
            Err(FenError::InvalidCastlingChar { character: 'X' })
        ));
        assert!(matches!(
            "4k3/8/8/8/8/8/8/4K3 w - z9 0 1".parse::<Position>(),
            Err(FenError::InvalidEnPassant { .. })
        ));
        assert!(matches!(
            "4k3/8/8/8/8/8/8/4K3 w - - x 1".parse::<Position>(),
            Err(FenError::InvalidMoveCounter { field: "halfmove clock", .. })
        ));
        assert!(matches!(
            "4k3/9/8/8/8/8/8/4K3 w - - 0 1".parse::<Position>(),
            Err(FenError::InvalidPieceChar { character: '9' })
        ));
        assert!(matches!(
            "4k3/ppp5/8/8/8/8/8/8 w - - 0 1".parse::<Position>(),
            Err(FenError::InvalidPosition(PositionError::KingCount { color: Color::White, count: 0 }))
        ));
    }
}
