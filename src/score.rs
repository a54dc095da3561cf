/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

/// A numerical representation of the evaluation of a position / move, in units of ["centipawns"](https://www.chessprogramming.org/Score).
///
/// Scores are always from White's point of view: positive is good for White, negative is good for Black.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Score(pub i32);

impl Score {
    /// At least as large as any score a search can return. Used as the initial alpha-beta window.
    ///
    /// `-INF` is `-i32::MAX`, so negating either bound never overflows.
    pub const INF: Self = Self(i32::MAX);

    /// Score of Black being checkmated.
    pub const MATE: Self = Self(10_000);

    /// Score of a draw.
    pub const DRAW: Self = Self(0);

    /// Score of `color` having been checkmated.
    #[inline(always)]
    pub const fn mated(color: crate::Color) -> Self {
        Self(-Self::MATE.0 * color.negation_multiplier())
    }

    /// Returns `true` if the score is a mate score.
    #[inline(always)]
    pub const fn is_mate(&self) -> bool {
        self.0.abs() >= Self::MATE.0
    }

    /// "Normalizes" a score so that it can be printed as a float.
    ///
    /// Presently, this just divides by 100, since a score represents a centipawn value.
    #[inline(always)]
    pub fn normalize(&self) -> f32 {
        self.0 as f32 / 100.0
    }
}

impl std::ops::Add for Score {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::Add<i32> for Score {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: i32) -> Self::Output {
        Self(self.0 + rhs)
    }
}

impl std::ops::Neg for Score {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl fmt::Display for Score {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Debug for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_mate() {
            let winner = if self.0 > 0 { "white" } else { "black" };
            write!(f, "{} (mate, {winner} wins)", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}
