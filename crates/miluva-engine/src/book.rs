//! Opening book lookup keyed by the moves played so far.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};

use miluva_core::{Move, MoveParseError, Position};
use thiserror::Error;
use tracing::debug;

/// A book reply and how many recorded games played it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookHit {
    /// Coordinate move text, e.g. `e2e4`.
    pub mv: String,
    pub count: u32,
}

/// Source of opening replies.
pub trait OpeningBook: Send {
    /// Reply for the game that began from the standard position and
    /// continued with `moves`, if the book knows one.
    fn lookup(&self, moves: &[Move]) -> Option<BookHit>;
}

/// A book that never answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBook;

impl OpeningBook for NoBook {
    fn lookup(&self, _moves: &[Move]) -> Option<BookHit> {
        None
    }
}

/// A line in a book text that does not replay from the start position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("book line {line}: {source}")]
pub struct BookError {
    pub line: usize,
    #[source]
    pub source: MoveParseError,
}

/// In-memory book built from whitespace-separated coordinate move lines.
///
/// Every prefix of every line is recorded, so a line `e2e4 e7e5 g1f3`
/// contributes `e2e4` after the empty prefix, `e7e5` after `e2e4` and
/// `g1f3` after `e2e4 e7e5`. Repeated lines accumulate counts.
#[derive(Debug, Clone, Default)]
pub struct MemoryBook {
    replies: HashMap<u64, HashMap<String, u32>>,
}

fn history_key<'a>(moves: impl IntoIterator<Item = &'a str>) -> u64 {
    let mut hasher = DefaultHasher::new();
    for text in moves {
        text.hash(&mut hasher);
    }
    hasher.finish()
}

impl MemoryBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a book from newline-separated lines. Blank lines and lines
    /// starting with `#` are skipped.
    pub fn from_lines(text: &str) -> Result<Self, BookError> {
        let mut book = Self::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            book.add_line(line)
                .map_err(|source| BookError { line: index + 1, source })?;
        }
        debug!(positions = book.len(), "opening book loaded");
        Ok(book)
    }

    /// Record one game line. Each move is checked for legality before the
    /// line is committed, so a bad line leaves the book unchanged.
    pub fn add_line(&mut self, line: &str) -> Result<(), MoveParseError> {
        let mut pos = Position::startpos();
        let mut played: Vec<String> = Vec::new();
        for text in line.split_whitespace() {
            let mv = pos.parse_move(text)?;
            pos.make_move(mv);
            played.push(mv.to_uci());
        }

        for (depth, reply) in played.iter().enumerate() {
            let key = history_key(played[..depth].iter().map(String::as_str));
            *self
                .replies
                .entry(key)
                .or_default()
                .entry(reply.clone())
                .or_insert(0) += 1;
        }
        Ok(())
    }

    /// Number of distinct move histories with at least one reply.
    pub fn len(&self) -> usize {
        self.replies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replies.is_empty()
    }
}

impl OpeningBook for MemoryBook {
    /// The most played reply. Ties go to the alphabetically first move.
    fn lookup(&self, moves: &[Move]) -> Option<BookHit> {
        let texts: Vec<String> = moves.iter().map(|mv| mv.to_uci()).collect();
        let key = history_key(texts.iter().map(String::as_str));
        self.replies
            .get(&key)?
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(mv, &count)| BookHit { mv: mv.clone(), count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINES: &str = "\
# tiny book
e2e4 e7e5 g1f3
e2e4 e7e5 g1f3 b8c6
e2e4 c7c5

d2d4 d7d5
";

    fn moves(line: &str) -> Vec<Move> {
        let mut pos = Position::startpos();
        line.split_whitespace()
            .map(|text| {
                let mv = pos.parse_move(text).unwrap();
                pos.make_move(mv);
                mv
            })
            .collect()
    }

    #[test]
    fn counts_accumulate() {
        let book = MemoryBook::from_lines(LINES).unwrap();
        assert_eq!(book.lookup(&[]), Some(BookHit { mv: "e2e4".into(), count: 3 }));
        assert_eq!(
            book.lookup(&moves("e2e4")),
            Some(BookHit { mv: "e7e5".into(), count: 2 })
        );
        assert_eq!(
            book.lookup(&moves("e2e4 e7e5 g1f3")),
            Some(BookHit { mv: "b8c6".into(), count: 1 })
        );
        assert_eq!(book.lookup(&moves("d2d4 d7d5")), None);
    }

    #[test]
    fn ties_break_alphabetically() {
        let book = MemoryBook::from_lines("g1f3\nd2d4\n").unwrap();
        assert_eq!(book.lookup(&[]).unwrap().mv, "d2d4");
    }

    #[test]
    fn rejects_illegal_line() {
        let err = MemoryBook::from_lines("e2e4\ne2e5\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(matches!(err.source, MoveParseError::Illegal { .. }));
    }

    #[test]
    fn bad_line_leaves_book_unchanged() {
        let mut book = MemoryBook::new();
        assert!(book.add_line("e2e4 e7e9").is_err());
        assert!(book.is_empty());
    }

    #[test]
    fn no_book_is_silent() {
        assert_eq!(NoBook.lookup(&[]), None);
    }
}
