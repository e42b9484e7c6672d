//! Compile-time selection of which moves the generator emits.

/// Marker for a generation mode.
pub trait GenKind {
    /// Whether non-capturing, non-promoting moves are produced.
    const QUIETS: bool;
}

/// Every legal move.
pub struct AllMoves;
impl GenKind for AllMoves {
    const QUIETS: bool = true;
}

/// Captures, en passant and promotions only.
pub struct CapturesOnly;
impl GenKind for CapturesOnly {
    const QUIETS: bool = false;
}
