/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{collections::HashMap, fmt};

use crate::{Color, GameResult, PieceKind, Position, Snapshot};

/// The state of a game from the point of view of the side to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    /// The side to move has legal moves and is not in check.
    Ongoing,

    /// The side to move is in check but can escape it.
    Check,

    /// The side to move is in check and cannot escape it.
    Checkmate { winner: Color },

    /// The side to move is not in check but has no legal move.
    Stalemate,

    /// Neither side has enough material to deliver mate.
    InsufficientMaterial,

    /// The same layout has appeared three times within the repetition window.
    ThreefoldRepetition,
}

impl GameStatus {
    /// Returns `true` if no more moves can be played.
    #[inline(always)]
    pub const fn is_over(&self) -> bool {
        !matches!(self, Self::Ongoing | Self::Check)
    }

    /// Returns `true` if the game ended without a winner.
    #[inline(always)]
    pub const fn is_draw(&self) -> bool {
        matches!(
            self,
            Self::Stalemate | Self::InsufficientMaterial | Self::ThreefoldRepetition
        )
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ongoing => write!(f, "ongoing"),
            Self::Check => write!(f, "check"),
            Self::Checkmate { winner } => write!(f, "checkmate, {winner} wins"),
            Self::Stalemate => write!(f, "draw by stalemate"),
            Self::InsufficientMaterial => write!(f, "draw by insufficient material"),
            Self::ThreefoldRepetition => write!(f, "draw by threefold repetition"),
        }
    }
}

impl Position {
    /// Returns `true` if `color` is in check and no piece of `color` has a legal move.
    pub fn is_checkmate(&mut self, color: Color) -> GameResult<bool> {
        Ok(self.in_check(color) && !self.has_legal_move(color)?)
    }

    /// Returns `true` if `color` is not in check but no piece of `color` has a legal move.
    pub fn is_stalemate(&mut self, color: Color) -> GameResult<bool> {
        Ok(!self.in_check(color) && !self.has_legal_move(color)?)
    }

    /// Returns `true` if the remaining material is one of these known dead draws:
    /// - King vs King
    /// - King vs King and a single Knight or Bishop (either way around)
    /// - King and a single Knight or Bishop on each side
    /// - King vs King and two Knights (either way around)
    ///
    /// Other drawn endings, such as same-colored Bishops, are not recognized.
    pub fn has_insufficient_material(&self) -> bool {
        let material = |color| {
            self.pieces_of(color)
                .map(|(_, piece)| piece.kind())
                .filter(|&kind| kind != PieceKind::King)
                .collect::<Vec<_>>()
        };
        let white = material(Color::White);
        let black = material(Color::Black);

        let is_minor = |kind: &PieceKind| matches!(kind, PieceKind::Knight | PieceKind::Bishop);
        let lone_minor = |side: &[PieceKind]| side.len() == 1 && side.iter().all(is_minor);
        let two_knights =
            |side: &[PieceKind]| side.len() == 2 && side.iter().all(|&k| k == PieceKind::Knight);

        match (white.is_empty(), black.is_empty()) {
            (true, true) => true,
            (true, false) => lone_minor(&black) || two_knights(&black),
            (false, true) => lone_minor(&white) || two_knights(&white),
            (false, false) => lone_minor(&white) && lone_minor(&black),
        }
    }
}

/// Returns `true` if any board layout occurs at least three times among the last `window` snapshots.
///
/// With `window` set to `None`, the whole history is examined.
pub fn is_threefold_repetition(snapshots: &[Snapshot], window: Option<usize>) -> bool {
    let start = window.map_or(0, |n| snapshots.len().saturating_sub(n));

    let mut counts = HashMap::with_capacity(snapshots.len() - start);
    snapshots[start..].iter().any(|snapshot| {
        let seen = counts.entry(snapshot).or_insert(0u8);
        *seen += 1;
        *seen >= 3
    })
}
