/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use crate::{Color, GameError, PieceId, PieceKind, Square};

use super::notation::Disambiguation;

/// A request to move whatever stands on `from` onto `to`.
///
/// `promotion` only matters for a Pawn reaching its last rank. When it is absent for such a move,
/// the game waits for [`crate::Game::resolve_promotion`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl Move {
    /// Creates a new [`Move`] with no promotion.
    #[inline(always)]
    pub const fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    /// Creates a new [`Move`] that promotes to `kind` if the mover is a Pawn reaching its last rank.
    #[inline(always)]
    pub const fn with_promotion(from: Square, to: Square, kind: PieceKind) -> Self {
        Self {
            from,
            to,
            promotion: Some(kind),
        }
    }

    /// Parses a move in coordinate notation, such as `e2e4` or `e7e8q`.
    ///
    /// # Example
    /// ```
    /// # use gambit::{Move, PieceKind};
    /// let mv = Move::from_uci("e7e8q").unwrap();
    /// assert_eq!(mv.to.to_string(), "e8");
    /// assert_eq!(mv.promotion, Some(PieceKind::Queen));
    /// assert!(Move::from_uci("e7e8k").is_err());
    /// ```
    pub fn from_uci(uci: &str) -> Result<Self, GameError> {
        let uci = uci.trim();
        let invalid = || GameError::InvalidMoveString(uci.to_string());

        if !uci.is_ascii() || !(4..=5).contains(&uci.len()) {
            return Err(invalid());
        }

        let from = Square::from_uci(&uci[0..2]).map_err(|_| invalid())?;
        let to = Square::from_uci(&uci[2..4]).map_err(|_| invalid())?;

        let promotion = uci[4..]
            .chars()
            .next()
            .map(PieceKind::from_uci)
            .transpose()
            .map_err(|_| invalid())?;

        if promotion.is_some_and(|kind| !kind.is_promotion_target()) {
            return Err(invalid());
        }

        Ok(Self {
            from,
            to,
            promotion,
        })
    }

    /// Renders this move in coordinate notation.
    pub fn to_uci(&self) -> String {
        match self.promotion {
            Some(kind) => format!("{}{}{}", self.from, self.to, kind.to_uci()),
            None => format!("{}{}", self.from, self.to),
        }
    }
}

impl FromStr for Move {
    type Err = GameError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uci(s)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

/// Which Rook a King castled with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CastleSide {
    /// Castling with the Rook on the h-file.
    Short,

    /// Castling with the Rook on the a-file.
    Long,
}

impl CastleSide {
    /// Algebraic notation for this castle.
    #[inline(always)]
    pub const fn san(&self) -> &'static str {
        match self {
            Self::Short => "O-O",
            Self::Long => "O-O-O",
        }
    }
}

/// The piece removed by a move, and the square it was removed from.
///
/// For en passant, `square` is the cell *behind* the destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Captured {
    pub piece: PieceId,
    pub kind: PieceKind,
    pub color: Color,
    pub square: Square,
}

/// The permanent record of a move applied to a game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveRecord {
    pub piece: PieceId,
    pub kind: PieceKind,
    pub color: Color,
    pub from: Square,
    pub to: Square,
    pub captured: Option<Captured>,
    pub castle: Option<CastleSide>,

    /// Whether the opponent was left in check.
    pub is_check: bool,

    /// Whether the opponent was left without a legal move while in check.
    pub is_checkmate: bool,

    /// A Pawn reached its last rank with this move.
    pub is_promoting: bool,

    /// Filled in once the promotion has been resolved.
    pub promoted_to: Option<PieceKind>,

    /// How the origin must be written to tell this piece apart from others that could reach `to`.
    pub disambiguation: Disambiguation,

    /// Algebraic notation of this move, refreshed whenever the record changes.
    pub san: String,
}

impl MoveRecord {
    /// The move this record describes, in coordinate form.
    pub fn as_move(&self) -> Move {
        Move {
            from: self.from,
            to: self.to,
            promotion: self.promoted_to,
        }
    }

    /// Returns `true` if this move removed a piece from the board.
    #[inline(always)]
    pub const fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    /// Returns `true` if this move was made by a Pawn or removed a piece; these reset the halfmove clock.
    #[inline(always)]
    pub fn resets_halfmove_clock(&self) -> bool {
        self.kind == PieceKind::Pawn || self.is_capture()
    }
}

impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.san)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_parsing() {
        let mv = Move::from_uci("e2e4").unwrap();
        assert_eq!(mv.from.to_string(), "e2");
        assert_eq!(mv.to.to_string(), "e4");
        assert_eq!(mv.promotion, None);
        assert_eq!(mv.to_string(), "e2e4");

        let mv: Move = "a2a1n".parse().unwrap();
        assert_eq!(mv.promotion, Some(PieceKind::Knight));
        assert_eq!(mv.to_string(), "a2a1n");
    }

    #[test]
    fn test_move_parsing_rejects_garbage() {
        for bad in ["", "e2", "e2e", "e2e9", "e2e4qq", "e7e8p", "z2e4", "é2e4"] {
            assert!(Move::from_uci(bad).is_err(), "{bad:?} should not parse");
        }
    }
}
