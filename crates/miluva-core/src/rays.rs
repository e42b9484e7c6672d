//! Precomputed ray and leaper tables.
//!
//! Sliding attacks use the classical ray approach: walk the direction's ray,
//! find the nearest blocker with a bit scan, and cut the ray there. Positive
//! directions (towards H8) scan with `lsb`, negative ones with `msb`.

use crate::bitboard::Bitboard;
use crate::color::Color;
use crate::square::Square;

/// The eight compass directions, ordered so that `d` and `d + 4` are opposite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Direction {
    North = 0,
    NorthEast = 1,
    East = 2,
    SouthEast = 3,
    South = 4,
    SouthWest = 5,
    West = 6,
    NorthWest = 7,
}

impl Direction {
    pub const ORTHOGONAL: [Direction; 4] =
        [Direction::North, Direction::East, Direction::South, Direction::West];
    pub const DIAGONAL: [Direction; 4] = [
        Direction::NorthEast,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::NorthWest,
    ];

    const STEPS: [(i8, i8); 8] = [(0, 1), (1, 1), (1, 0), (1, -1), (0, -1), (-1, -1), (-1, 0), (-1, 1)];

    /// Whether the direction increases the square index.
    #[inline]
    const fn is_positive(self) -> bool {
        matches!(
            self,
            Direction::North | Direction::NorthEast | Direction::East | Direction::NorthWest
        )
    }
}

static RAYS: [[Bitboard; 64]; 8] = {
    let mut table = [[Bitboard::EMPTY; 64]; 8];
    let mut dir = 0;
    while dir < 8 {
        let (df, dr) = Direction::STEPS[dir];
        let mut sq = 0;
        while sq < 64 {
            let mut bits = 0u64;
            let mut cur = Square::from_index_unchecked(sq as u8).offset(df, dr);
            while let Some(next) = cur {
                bits |= 1 << next.index();
                cur = next.offset(df, dr);
            }
            table[dir][sq] = Bitboard::new(bits);
            sq += 1;
        }
        dir += 1;
    }
    table
};

/// Squares strictly between two aligned squares; empty otherwise.
static BETWEEN: [[Bitboard; 64]; 64] = {
    let mut table = [[Bitboard::EMPTY; 64]; 64];
    let mut from = 0;
    while from < 64 {
        let mut dir = 0;
        while dir < 8 {
            let (df, dr) = Direction::STEPS[dir];
            let mut passed = 0u64;
            let mut cur = Square::from_index_unchecked(from as u8).offset(df, dr);
            while let Some(next) = cur {
                table[from][next.index()] = Bitboard::new(passed);
                passed |= 1 << next.index();
                cur = next.offset(df, dr);
            }
            dir += 1;
        }
        from += 1;
    }
    table
};

/// Full edge-to-edge line through two aligned squares; empty otherwise.
static LINE: [[Bitboard; 64]; 64] = {
    let mut table = [[Bitboard::EMPTY; 64]; 64];
    let mut from = 0;
    while from < 64 {
        let mut dir = 0;
        while dir < 4 {
            let forward = RAYS[dir][from].bits();
            let backward = RAYS[dir + 4][from].bits();
            let full = Bitboard::new(forward | backward | 1 << from);
            let mut targets = forward | backward;
            while targets != 0 {
                let to = targets.trailing_zeros() as usize;
                table[from][to] = full;
                targets &= targets - 1;
            }
            dir += 1;
        }
        from += 1;
    }
    table
};

const fn leaper_table(steps: &[(i8, i8)]) -> [Bitboard; 64] {
    let mut table = [Bitboard::EMPTY; 64];
    let mut sq = 0;
    while sq < 64 {
        let mut bits = 0u64;
        let mut i = 0;
        while i < steps.len() {
            if let Some(target) = Square::from_index_unchecked(sq as u8).offset(steps[i].0, steps[i].1) {
                bits |= 1 << target.index();
            }
            i += 1;
        }
        table[sq] = Bitboard::new(bits);
        sq += 1;
    }
    table
}

static KNIGHT: [Bitboard; 64] =
    leaper_table(&[(1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2)]);

static KING: [Bitboard; 64] =
    leaper_table(&[(0, 1), (1, 1), (1, 0), (1, -1), (0, -1), (-1, -1), (-1, 0), (-1, 1)]);

static PAWN: [[Bitboard; 64]; 2] = [leaper_table(&[(-1, 1), (1, 1)]), leaper_table(&[(-1, -1), (1, -1)])];

/// Empty-board ray from `sq` (exclusive) towards the edge.
#[inline]
pub fn ray(dir: Direction, sq: Square) -> Bitboard {
    RAYS[dir as usize][sq.index()]
}

#[inline]
pub fn between(a: Square, b: Square) -> Bitboard {
    BETWEEN[a.index()][b.index()]
}

#[inline]
pub fn line(a: Square, b: Square) -> Bitboard {
    LINE[a.index()][b.index()]
}

/// Whether three squares lie on one rank, file or diagonal.
#[inline]
pub fn aligned(a: Square, b: Square, c: Square) -> bool {
    line(a, b).contains(c)
}

#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT[sq.index()]
}

#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    KING[sq.index()]
}

/// Squares a `color` pawn on `sq` attacks.
#[inline]
pub fn pawn_attacks(color: Color, sq: Square) -> Bitboard {
    PAWN[color.index()][sq.index()]
}

/// Ray from `sq` in `dir`, cut after the first occupied square.
#[inline]
pub fn slide(dir: Direction, sq: Square, occupied: Bitboard) -> Bitboard {
    let full = ray(dir, sq);
    let blockers = full & occupied;
    let nearest = if dir.is_positive() { blockers.lsb() } else { blockers.msb() };
    match nearest {
        Some(blocker) => full & !ray(dir, blocker),
        None => full,
    }
}

pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    Direction::ORTHOGONAL
        .iter()
        .fold(Bitboard::EMPTY, |acc, &dir| acc | slide(dir, sq, occupied))
}

pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    Direction::DIAGONAL
        .iter()
        .fold(Bitboard::EMPTY, |acc, &dir| acc | slide(dir, sq, occupied))
}

#[inline]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    rook_attacks(sq, occupied) | bishop_attacks(sq, occupied)
}
