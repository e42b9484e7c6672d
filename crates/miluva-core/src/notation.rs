//! Coordinate move text (`e2e4`, `e7e8q`, `e1g1`) resolved against the legal list.

use crate::chess_move::Move;
use crate::error::MoveParseError;
use crate::movegen::generate_legal;
use crate::piece::PieceKind;
use crate::position::Position;
use crate::square::Square;

impl Position {
    /// Find the legal move described by `text`.
    ///
    /// Castling is written as the king's two-square step.
    pub fn parse_move(&self, text: &str) -> Result<Move, MoveParseError> {
        let text = text.trim();
        if !(4..=5).contains(&text.len()) || !text.is_ascii() {
            return Err(MoveParseError::Malformed { text: text.to_string() });
        }
        let from: Square = text[0..2].parse()?;
        let to: Square = text[2..4].parse()?;
        let promo = match text[4..].chars().next() {
            None => None,
            Some(c) => match PieceKind::from_letter(c) {
                Some(kind) if PieceKind::PROMOTIONS.contains(&kind) => Some(kind),
                _ => return Err(MoveParseError::BadPromotion { piece: c }),
            },
        };

        generate_legal(self)
            .iter()
            .copied()
            .find(|mv| mv.from() == from && mv.to() == to && mv.promotion_piece() == promo)
            .ok_or_else(|| MoveParseError::Illegal { text: text.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::castling::CastleSide;
    use crate::chess_move::MoveKind;

    #[test]
    fn resolves_kinds() {
        let pos = Position::startpos();
        assert_eq!(pos.parse_move("e2e4").unwrap().kind(), MoveKind::DoublePush);
        assert_eq!(pos.parse_move("g1f3").unwrap().kind(), MoveKind::Quiet);

        let pos: Position = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse().unwrap();
        assert_eq!(pos.parse_move("e1c1").unwrap().kind(), MoveKind::Castle(CastleSide::Queen));

        let pos: Position = "1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        let mv = pos.parse_move("a7b8r").unwrap();
        assert_eq!(
            mv.kind(),
            MoveKind::CapturePromotion { promo: PieceKind::Rook, victim: PieceKind::Knight }
        );
        assert_eq!(mv.to_string(), "a7b8r");
    }

    #[test]
    fn rejects_bad_text() {
        let pos = Position::startpos();
        assert!(matches!(pos.parse_move("e2"), Err(MoveParseError::Malformed { .. })));
        assert!(matches!(pos.parse_move("z2e4"), Err(MoveParseError::BadSquare { .. })));
        assert!(matches!(pos.parse_move("e2e5"), Err(MoveParseError::Illegal { .. })));
        assert!(matches!(pos.parse_move("e2e4k"), Err(MoveParseError::BadPromotion { piece: 'k' })));
    }

    #[test]
    fn promotion_suffix_required() {
        let pos: Position = "4k3/P7/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        assert!(pos.parse_move("a7a8").is_err());
        assert!(pos.parse_move("a7a8n").is_ok());
    }
}
