/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// The rules of chess: the board, move generation, legality, and game sessions.
mod board;

/// Command-line and interactive command parsing.
mod cli;

/// Code related to the engine's functionality, such as user input handling.
mod engine;

/// Errors raised by the rules layer.
mod error;

/// Evaluation of chess positions.
mod eval;

/// A numerical representation of how good a position is.
mod score;

/// Main engine logic; all search related code.
mod search;

/// Misc utility constants.
mod utils;

pub use board::*;
pub use cli::*;
pub use engine::*;
pub use error::*;
pub use eval::*;
pub use score::*;
pub use search::*;
pub use utils::*;
