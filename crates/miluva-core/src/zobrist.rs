//! Zobrist hashing keys, generated at compile time from a fixed seed.

use crate::castling::CastlingRights;
use crate::color::Color;
use crate::piece::PieceKind;
use crate::square::Square;

const SEED: u64 = 2344;

/// Splitmix64 step. Returns `(value, next_state)`.
const fn splitmix64(state: u64) -> (u64, u64) {
    let next = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = next;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    (z ^ (z >> 31), next)
}

/// Every key used to hash a position.
pub struct ZobristTable {
    /// Indexed `[color][piece kind][square]`.
    pub pieces: [[[u64; 64]; 6]; 2],
    /// XORed in when Black is to move.
    pub side: u64,
    /// One key per castling flag, in `CastlingRights::FLAGS` order.
    pub castling_flags: [u64; 4],
    pub en_passant_file: [u64; 8],
}

pub static KEYS: ZobristTable = {
    let mut state = SEED;
    let mut pieces = [[[0u64; 64]; 6]; 2];
    let mut color = 0;
    while color < 2 {
        let mut kind = 0;
        while kind < 6 {
            let mut sq = 0;
            while sq < 64 {
                let (value, next) = splitmix64(state);
                pieces[color][kind][sq] = value;
                state = next;
                sq += 1;
            }
            kind += 1;
        }
        color += 1;
    }

    let (side, next) = splitmix64(state);
    state = next;

    let mut castling_flags = [0u64; 4];
    let mut i = 0;
    while i < 4 {
        let (value, next) = splitmix64(state);
        castling_flags[i] = value;
        state = next;
        i += 1;
    }

    let mut en_passant_file = [0u64; 8];
    let mut i = 0;
    while i < 8 {
        let (value, next) = splitmix64(state);
        en_passant_file[i] = value;
        state = next;
        i += 1;
    }

    ZobristTable { pieces, side, castling_flags, en_passant_file }
};

impl ZobristTable {
    #[inline]
    pub fn piece(&self, color: Color, kind: PieceKind, sq: Square) -> u64 {
        self.pieces[color.index()][kind.index()][sq.index()]
    }

    /// XOR of the keys of every flag set in `rights`.
    pub fn castling(&self, rights: CastlingRights) -> u64 {
        let mut key = 0;
        for (i, (flag, _)) in CastlingRights::FLAGS.iter().enumerate() {
            if rights.contains(*flag) {
                key ^= self.castling_flags[i];
            }
        }
        key
    }

    #[inline]
    pub fn en_passant(&self, sq: Option<Square>) -> u64 {
        sq.map_or(0, |sq| self.en_passant_file[sq.file() as usize])
    }
}
