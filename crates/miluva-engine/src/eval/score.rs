//! Middlegame/endgame score pair blended by game phase.

use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use crate::eval::phase::MAX_PHASE;

/// A score with separate opening and ending weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tapered {
    pub mg: i32,
    pub eg: i32,
}

/// Shorthand for table literals.
#[allow(non_snake_case)]
pub const fn T(mg: i32, eg: i32) -> Tapered {
    Tapered { mg, eg }
}

impl Tapered {
    pub const ZERO: Tapered = T(0, 0);

    /// Interpolate between the endgame (`phase == 0`) and middlegame
    /// (`phase == MAX_PHASE`) values.
    pub fn blend(self, phase: i32) -> i32 {
        let phase = phase.clamp(0, MAX_PHASE);
        (self.mg * phase + self.eg * (MAX_PHASE - phase)) / MAX_PHASE
    }
}

impl Add for Tapered {
    type Output = Tapered;

    fn add(self, rhs: Tapered) -> Tapered {
        T(self.mg + rhs.mg, self.eg + rhs.eg)
    }
}

impl AddAssign for Tapered {
    fn add_assign(&mut self, rhs: Tapered) {
        *self = *self + rhs;
    }
}

impl Sub for Tapered {
    type Output = Tapered;

    fn sub(self, rhs: Tapered) -> Tapered {
        T(self.mg - rhs.mg, self.eg - rhs.eg)
    }
}

impl SubAssign for Tapered {
    fn sub_assign(&mut self, rhs: Tapered) {
        *self = *self - rhs;
    }
}

impl Neg for Tapered {
    type Output = Tapered;

    fn neg(self) -> Tapered {
        T(-self.mg, -self.eg)
    }
}
