/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::str::FromStr;

use clap::{builder::PossibleValue, Parser, ValueEnum};

use crate::{Color, Move, PieceKind, Square, DEFAULT_DEPTH, REPETITION_WINDOW};

/// Play chess against a minimax opponent, or explore positions by hand.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Number of plies the computer looks ahead.
    #[arg(short, long, default_value_t = DEFAULT_DEPTH)]
    pub depth: usize,

    /// Side played by the computer. If omitted, both sides are played by hand.
    #[arg(short, long)]
    pub computer: Option<Color>,

    /// Start from this position instead of the standard one.
    #[arg(short, long)]
    pub fen: Option<String>,

    /// Number of recent positions examined for threefold repetition. `0` examines the whole game.
    #[arg(short, long, default_value_t = REPETITION_WINDOW)]
    pub repetition_window: usize,
}

impl Cli {
    /// The repetition window as understood by [`crate::Game::set_repetition_window`].
    #[inline(always)]
    pub fn repetition_window(&self) -> Option<usize> {
        Some(self.repetition_window).filter(|&n| n > 0)
    }
}

/// A command to be sent to the engine.
#[derive(Debug, Clone, Parser)]
#[command(
    multicall = true,
    about,
    rename_all = "lower",
    override_usage("<ENGINE COMMAND>")
)]
pub enum EngineCommand {
    /// Print a visual representation of the current board state.
    #[command(alias = "d")]
    Display,

    /// Print an evaluation of the current position.
    Eval {
        /// If set, the contribution of every piece will be printed as well.
        #[arg(short, long, default_value = "false")]
        pretty: bool,
    },

    /// Quit the engine.
    #[command(alias = "quit")]
    Exit,

    /// Generate and print a FEN string for the current position.
    Fen,

    /// Search the current position and print the best move found.
    Go {
        /// Override the configured search depth.
        #[arg(short, long, required = false)]
        depth: Option<usize>,

        /// If set, the best move will also be played.
        #[arg(short, long, default_value = "false")]
        play: bool,
    },

    /// Print every move played so far, in algebraic notation.
    History,

    /// Apply the provided move to the game, if it is legal.
    ///
    /// Moves are given in coordinate notation, such as `e2e4` or `e7e8q`.
    #[command(name = "move", aliases = ["play", "m"])]
    MakeMove { mv: Move },

    /// Shows all legal moves in the current position, or for a specific piece.
    Moves {
        square: Option<Square>,

        /// If set, moves will be sorted in alphabetical order.
        ///
        /// By default, moves are generated in board order.
        #[arg(short, long, default_value = "false")]
        sort: bool,
    },

    /// Start a new game, from the standard position or from the provided FEN.
    Newgame { fen: Vec<String> },

    /// Performs a perft on the current position at the supplied depth, printing total node count.
    Perft { depth: usize },

    /// Promote the Pawn waiting on its last rank.
    Promote { kind: PieceKind },

    /// Performs a split perft on the current position at the supplied depth.
    #[command(alias = "sperft")]
    Splitperft { depth: usize },

    /// Print whether the game is ongoing, and if not, how it ended.
    Status,
}

impl FromStr for EngineCommand {
    type Err = clap::Error;
    /// Attempt to parse an [`EngineCommand`] from a string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_parse_from(s.split_ascii_whitespace())
    }
}

impl ValueEnum for Color {
    fn value_variants<'a>() -> &'a [Self] {
        &[Color::White, Color::Black]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        // Colors may also be given by their initial
        let value = PossibleValue::new(self.name());
        Some(match self {
            Color::White => value.alias("w"),
            Color::Black => value.alias("b"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_engine_commands() {
        assert!(matches!(
            "d".parse::<EngineCommand>().unwrap(),
            EngineCommand::Display
        ));
        assert!(matches!(
            "quit".parse::<EngineCommand>().unwrap(),
            EngineCommand::Exit
        ));

        let Ok(EngineCommand::MakeMove { mv }) = "m e7e8q".parse::<EngineCommand>() else {
            panic!("expected a move command");
        };
        assert_eq!(mv.to_string(), "e7e8q");

        let cmd = "go --depth 3 --play";
        let Ok(EngineCommand::Go { depth, play }) = cmd.parse::<EngineCommand>() else {
            panic!("expected a go command");
        };
        assert_eq!(depth, Some(3));
        assert!(play);

        let cmd = "promote knight";
        let Ok(EngineCommand::Promote { kind }) = cmd.parse::<EngineCommand>() else {
            panic!("expected a promote command");
        };
        assert_eq!(kind, PieceKind::Knight);

        let cmd = "newgame 4k3/8/8/8/8/8/8/4K3 w - - 0 1";
        let Ok(EngineCommand::Newgame { fen }) = cmd.parse::<EngineCommand>() else {
            panic!("expected a newgame command");
        };
        assert_eq!(fen.len(), 6);
    }

    #[test]
    fn test_parse_rejects_bad_arguments() {
        assert!("move e2".parse::<EngineCommand>().is_err());
        assert!("promote king5".parse::<EngineCommand>().is_err());
        assert!("teleport".parse::<EngineCommand>().is_err());
    }

    #[test]
    fn test_cli_options() {
        let cli = Cli::try_parse_from(["gambit"]).unwrap();
        assert_eq!(cli.depth, DEFAULT_DEPTH);
        assert_eq!(cli.computer, None);
        assert_eq!(cli.repetition_window(), Some(REPETITION_WINDOW));

        let cli =
            Cli::try_parse_from(["gambit", "--computer", "b", "-d", "3", "-r", "0"]).unwrap();
        assert_eq!(cli.computer, Some(Color::Black));
        assert_eq!(cli.depth, 3);
        assert_eq!(cli.repetition_window(), None);
    }
}
