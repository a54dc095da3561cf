/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use crate::GameError;

/// Represents a single cell on an `8x8` chess board.
///
/// Cells are addressed by `(x, y)`, where `x` is the file (`0` is the a-file) and `y` is the rank (`0` is the first rank).
/// A [`Square`] can only be constructed in bounds, so every [`Square`] is a valid index into a board.
/// ```text
/// 8| a8 b8 c8 d8 e8 f8 g8 h8     y = 7
/// ...
/// 1| a1 b1 c1 d1 e1 f1 g1 h1     y = 0
///  +------------------------
///    a  b  c  d  e  f  g  h
///   x=0                  x=7
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Square {
    x: u8,
    y: u8,
}

impl Square {
    /// Number of squares on the board.
    pub const COUNT: usize = 64;

    /// Width (and height) of the board.
    pub const SIZE: u8 = 8;

    /// Creates a new [`Square`] from a file and rank index, if both are in `[0, 8)`.
    ///
    /// # Example
    /// ```
    /// # use gambit::Square;
    /// assert!(Square::new(4, 3).is_some());
    /// assert!(Square::new(8, 0).is_none());
    /// ```
    #[inline(always)]
    pub const fn new(x: u8, y: u8) -> Option<Self> {
        if x < Self::SIZE && y < Self::SIZE {
            Some(Self { x, y })
        } else {
            None
        }
    }

    /// Creates a [`Square`] from its index in `[0, 64)`, where `index = x + y * 8`.
    #[inline(always)]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self {
                x: (index % 8) as u8,
                y: (index / 8) as u8,
            })
        } else {
            None
        }
    }

    /// The file index of this square (`0` for the a-file).
    #[inline(always)]
    pub const fn x(&self) -> u8 {
        self.x
    }

    /// The rank index of this square (`0` for the first rank).
    #[inline(always)]
    pub const fn y(&self) -> u8 {
        self.y
    }

    /// Index of this square in `[0, 64)`.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.x as usize + self.y as usize * 8
    }

    /// Returns the square `(dx, dy)` away from this one, or `None` if that would leave the board.
    ///
    /// # Example
    /// ```
    /// # use gambit::Square;
    /// let e4: Square = "e4".parse().unwrap();
    /// assert_eq!(e4.offset(1, 2).unwrap().to_string(), "f6");
    /// assert!(e4.offset(0, 5).is_none());
    /// ```
    #[inline(always)]
    pub const fn offset(&self, dx: i8, dy: i8) -> Option<Self> {
        let x = self.x as i8 + dx;
        let y = self.y as i8 + dy;

        if x < 0 || y < 0 {
            None
        } else {
            Self::new(x as u8, y as u8)
        }
    }

    /// Returns this square moved onto file `x`, keeping its rank.
    #[inline(always)]
    pub const fn with_x(&self, x: u8) -> Option<Self> {
        Self::new(x, self.y)
    }

    /// Iterates over all 64 squares, a1 first and h8 last.
    pub fn iter() -> impl DoubleEndedIterator<Item = Self> {
        (0..Self::COUNT).filter_map(Self::from_index)
    }

    /// The file letter of this square, `'a'..='h'`.
    #[inline(always)]
    pub const fn file_char(&self) -> char {
        (b'a' + self.x) as char
    }

    /// The rank digit of this square, `'1'..='8'`.
    #[inline(always)]
    pub const fn rank_char(&self) -> char {
        (b'1' + self.y) as char
    }

    /// Parses a square from coordinate notation, such as `e4`.
    ///
    /// # Example
    /// ```
    /// # use gambit::Square;
    /// let sq = Square::from_uci("b7").unwrap();
    /// assert_eq!((sq.x(), sq.y()), (1, 6));
    /// assert!(Square::from_uci("i9").is_err());
    /// ```
    pub fn from_uci(s: &str) -> Result<Self, GameError> {
        let mut chars = s.trim().chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(GameError::InvalidSquare(s.to_string()));
        };

        let file = file.to_ascii_lowercase();
        if !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return Err(GameError::InvalidSquare(s.to_string()));
        }

        Self::new(file as u8 - b'a', rank as u8 - b'1')
            .ok_or_else(|| GameError::InvalidSquare(s.to_string()))
    }
}

impl FromStr for Square {
    type Err = GameError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uci(s)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_parsing_round_trips() {
        for square in Square::iter() {
            let parsed: Square = square.to_string().parse().unwrap();
            assert_eq!(parsed, square);
        }
    }

    #[test]
    fn test_square_rejects_garbage() {
        for bad in ["", "e", "e44", "z1", "a0", "a9"] {
            assert!(Square::from_uci(bad).is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn test_square_offsets_stay_on_board() {
        let a1 = Square::from_uci("a1").unwrap();
        assert!(a1.offset(-1, 0).is_none());
        assert!(a1.offset(0, -1).is_none());
        assert_eq!(a1.offset(7, 7), Square::from_uci("h8").ok());
    }

    #[test]
    fn test_square_iter_order() {
        let all: Vec<_> = Square::iter().collect();
        assert_eq!(all.len(), Square::COUNT);
        assert_eq!(all[0].to_string(), "a1");
        assert_eq!(all[63].to_string(), "h8");
    }
}
