/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use thiserror::Error;

use crate::{Color, GameStatus, PieceKind, Square};

/// Errors raised by the rules layer.
///
/// Most variants describe a request that was rejected *before* anything on the board changed.
/// The exception is [`GameError::CorruptedState`], which means a trial move could not be rolled back
/// and every legality result computed afterwards is suspect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// The requested destination is not a legal move for the piece on `from`.
    #[error("Illegal move: {from} to {to}")]
    IllegalMove { from: Square, to: Square },

    /// There is no piece on the requested origin square.
    #[error("No piece on {0}")]
    EmptySquare(Square),

    /// The piece on `square` does not belong to the side to move.
    #[error("Piece on {square} does not belong to {color}")]
    WrongSide { square: Square, color: Color },

    /// A pawn on `0` is waiting to be promoted; nothing else may happen until it is.
    #[error("A pawn on {0} is awaiting promotion")]
    AwaitingPromotion(Square),

    /// The game has already ended, so no more moves may be played.
    #[error("The game is over: {0}")]
    GameOver(GameStatus),

    /// Promotion was requested but no pawn of this color sits on its promotion rank.
    #[error("{0} has nothing to promote")]
    NothingToPromote(Color),

    /// Pawns may only promote to a Knight, Bishop, Rook, or Queen.
    #[error("Cannot promote to a {0}")]
    InvalidPromotion(PieceKind),

    /// A trial move could not be undone, meaning the board no longer matches its bookkeeping.
    #[error("Board state corrupted: {0}")]
    CorruptedState(String),

    #[error("Invalid square {0:?}")]
    InvalidSquare(String),

    #[error("Invalid piece {0:?}")]
    InvalidPiece(String),

    #[error("Invalid color {0:?}")]
    InvalidColor(String),

    #[error("Invalid move string {0:?}")]
    InvalidMoveString(String),

    #[error("Invalid FEN {fen:?}: {reason}")]
    InvalidFen { fen: String, reason: String },
}

/// Convenience alias for results produced by the rules layer.
pub type GameResult<T> = Result<T, GameError>;
