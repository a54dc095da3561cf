/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt::{self, Write};

use crate::{GameResult, MoveRecord, PieceId, PieceKind, Position, Square};

/// The extra origin information algebraic notation needs when several pieces of one kind can reach the same square.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Disambiguation {
    /// Only one piece of this kind can reach the destination.
    #[default]
    None,

    /// The origin file, as in `Nbd2`.
    File(char),

    /// The origin rank, as in `R1e2`.
    Rank(char),
}

impl fmt::Display for Disambiguation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::File(c) | Self::Rank(c) => f.write_char(*c),
        }
    }
}

/// Decides how the origin of `mover` must be written for a move onto `to`.
///
/// Must be called *before* the move is made, while every rival is still where it stands.
/// Rivals are the other pieces of the same kind and color that could also legally move onto `to`.
/// The origin file is used unless a rival shares it, then the origin rank unless a rival shares that too,
/// in which case the file is used after all.
pub fn disambiguation(
    position: &mut Position,
    mover: PieceId,
    to: Square,
) -> GameResult<Disambiguation> {
    let piece = *position.piece(mover);
    if piece.is_pawn() || piece.is_king() {
        return Ok(Disambiguation::None);
    }

    let candidates: Vec<_> = position
        .pieces_of(piece.color())
        .filter(|&(id, other)| id != mover && other.kind() == piece.kind())
        .map(|(id, _)| id)
        .collect();

    let mut rivals = Vec::with_capacity(candidates.len());
    for id in candidates {
        if position.can_reach(id, to)? {
            rivals.push(position.piece(id).square());
        }
    }

    if rivals.is_empty() {
        return Ok(Disambiguation::None);
    }

    let from = piece.square();
    let file = Disambiguation::File(from.file_char());

    if !rivals.iter().any(|sq| sq.x() == from.x()) {
        Ok(file)
    } else if !rivals.iter().any(|sq| sq.y() == from.y()) {
        Ok(Disambiguation::Rank(from.rank_char()))
    } else {
        Ok(file)
    }
}

/// Renders a move record in standard algebraic notation.
///
/// # Example
/// ```
/// # use gambit::Game;
/// let mut game = Game::default();
/// let record = game.apply("g1".parse().unwrap(), "f3".parse().unwrap()).unwrap();
/// assert_eq!(gambit::san(record), "Nf3");
/// ```
pub fn san(record: &MoveRecord) -> String {
    let mut san = String::with_capacity(8);

    if let Some(side) = record.castle {
        san.push_str(side.san());
    } else {
        san.push_str(record.kind.san_letter());
        // Pawn captures name their file instead of a piece letter
        if record.kind == PieceKind::Pawn && record.is_capture() {
            san.push(record.from.file_char());
        } else {
            san.push_str(&record.disambiguation.to_string());
        }

        if record.is_capture() {
            san.push('x');
        }
        san.push_str(&record.to.to_string());

        if let Some(kind) = record.promoted_to {
            san.push('=');
            san.push_str(kind.san_letter());
        }
    }

    if record.is_checkmate {
        san.push('#');
    } else if record.is_check {
        san.push('+');
    }

    san
}
