/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Checkmate, stalemate, and draw detection.
mod classify;

/// A game session: turns, history, promotion, and counters.
mod game;

/// Filtering pseudo-legal moves down to legal ones.
mod legality;

/// Pseudo-legal move generation and attack detection.
mod movegen;

/// Moves and the records of applied moves.
mod moves;

/// Standard algebraic notation.
pub mod notation;

/// Move path enumeration, for testing move generation.
mod perft;

/// Colors, piece kinds, and piece records.
mod piece;

/// The board itself, with make/unmake.
mod position;

/// Cells of the board.
mod square;

pub use classify::*;
pub use game::*;
pub use movegen::*;
pub use moves::*;
pub use notation::{san, Disambiguation};
pub use perft::*;
pub use piece::*;
pub use position::*;
pub use square::*;
