/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    io,
    sync::mpsc::{channel, Receiver, Sender},
    thread,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, warn};

use crate::{
    print_perft, Cli, Color, EngineCommand, EvalReport, Game, GameStatus, MaterialEvaluator,
    Move, PieceKind, SearchConfig, Square,
};

/// The gambit chess engine.
///
/// Owns a single [`Game`] and executes [`EngineCommand`]s against it, one at a time.
/// If a computer side is configured, the engine answers for that side after every move.
#[derive(Debug)]
pub struct Engine {
    /// The current game.
    ///
    /// This is modified whenever moves are played or new positions are given,
    /// and is reset whenever the engine is told to start a new game.
    game: Game,

    /// Settings for the searches run by `go` and by the computer side.
    config: SearchConfig,

    /// The side played by the engine, if any.
    computer: Option<Color>,

    /// One half of a channel, responsible for sending commands to the engine to execute.
    sender: Sender<EngineCommand>,

    /// One half of a channel, responsible for receiving commands for the engine to execute.
    receiver: Receiver<EngineCommand>,
}

impl Engine {
    /// Constructs a new [`Engine`] instance from command-line options, to be executed with [`Engine::run`].
    pub fn new(cli: &Cli) -> Result<Self> {
        let mut game = match &cli.fen {
            Some(fen) => Game::from_fen(fen).context("Failed to parse starting position")?,
            None => Game::default(),
        };
        game.set_repetition_window(cli.repetition_window());

        let (sender, receiver) = channel();

        Ok(Self {
            game,
            config: SearchConfig { depth: cli.depth },
            computer: cli.computer,
            sender,
            receiver,
        })
    }

    /// Returns a string of the engine's name and current version.
    pub fn name(&self) -> String {
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }

    /// Sends an [`EngineCommand`] to the engine to be executed.
    pub fn send_command(&self, command: EngineCommand) -> Result<()> {
        self.sender
            .send(command)
            .context("Engine is no longer accepting commands")
    }

    /// The game the engine is playing.
    #[inline(always)]
    pub const fn game(&self) -> &Game {
        &self.game
    }

    /// Execute the main event loop for the engine.
    ///
    /// This function spawns a thread to handle input from `stdin` and waits on received commands.
    pub fn run(&mut self) -> Result<()> {
        println!("{}", self.name());

        // Spawn a separate thread for handling user input
        let sender = self.sender.clone();
        thread::spawn(|| {
            if let Err(err) = input_handler(sender) {
                debug!("Input handler thread stopping: {err}");
            }
        });

        // The computer may have the first move
        self.respond()?;

        while let Ok(cmd) = self.receiver.recv() {
            if matches!(cmd, EngineCommand::Exit) {
                break;
            }

            // Keep running, even on error
            if let Err(err) = self.handle_command(cmd) {
                warn!("{err:#}");
            }
        }

        Ok(())
    }

    /// Executes a single [`EngineCommand`].
    pub fn handle_command(&mut self, cmd: EngineCommand) -> Result<()> {
        match cmd {
            EngineCommand::Display => println!("{}", self.game),

            EngineCommand::Eval { pretty } => self.eval(pretty),

            EngineCommand::Exit => {}

            EngineCommand::Fen => println!("{}", self.game.to_fen()),

            EngineCommand::Go { depth, play } => self.go(depth, play)?,

            EngineCommand::History => self.history(),

            EngineCommand::MakeMove { mv } => {
                self.game.apply_move(mv)?;
                self.respond()?;
            }

            EngineCommand::Moves { square, sort } => self.moves(square, sort)?,

            EngineCommand::Newgame { fen } => self.new_game(&fen)?,

            EngineCommand::Perft { depth } => self.perft(depth, false)?,

            EngineCommand::Promote { kind } => self.promote(kind)?,

            EngineCommand::Splitperft { depth } => self.perft(depth, true)?,

            EngineCommand::Status => match self.game.pending_promotion() {
                Some(square) => println!("awaiting promotion on {square}"),
                None => println!("{}", self.game.status()?),
            },
        }

        Ok(())
    }

    /// Executes the `eval` command, printing an evaluation of the current position.
    fn eval(&self, pretty: bool) {
        let position = self.game.position();
        if pretty {
            println!("{}", EvalReport::new(position));
        } else {
            println!("{}", MaterialEvaluator::material(position));
        }
    }

    /// Executes the `moves` command, printing legal moves for one piece or for the side to move.
    fn moves(&mut self, square: Option<Square>, sort: bool) -> Result<()> {
        let mut moves = if let Some(square) = square {
            self.game
                .legal_moves_from(square)?
                .into_iter()
                .map(|to| Move::new(square, to))
                .collect()
        } else {
            self.game.legal_moves()?
        };

        if sort {
            moves.sort_by_key(|mv| mv.to_string());
        }

        // If there are none, print "(none)"
        let moves_string = if moves.is_empty() {
            String::from("(none)")
        } else {
            // Otherwise, join them by comma-space
            moves
                .into_iter()
                .map(|mv| mv.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        println!("{moves_string}");

        Ok(())
    }

    /// Executes the `go` command, searching the current position and optionally playing the result.
    fn go(&mut self, depth: Option<usize>, play: bool) -> Result<()> {
        let config = SearchConfig {
            depth: depth.unwrap_or(self.config.depth),
        };

        let res = self.game.search(config, &mut MaterialEvaluator)?;
        let Some(mv) = res.bestmove else {
            println!("bestmove (none) score {}", res.score);
            return Ok(());
        };
        println!("bestmove {mv} score {} nodes {}", res.score, res.nodes);

        if play {
            self.game.apply_move(mv)?;
            self.respond()?;
        }

        Ok(())
    }

    /// Executes the `promote` command.
    fn promote(&mut self, kind: PieceKind) -> Result<()> {
        self.game.resolve_promotion(kind)?;
        self.respond()
    }

    /// Executes the `history` command, printing the game so far in move-number pairs.
    fn history(&self) {
        let records = self.game.history();
        if records.is_empty() {
            println!("(none)");
            return;
        }

        // A game started from Black's turn opens with an ellipsis for White's half
        let mut sans: Vec<&str> = Vec::with_capacity(records.len() + 1);
        if records[0].color.is_black() {
            sans.push("...");
        }
        sans.extend(records.iter().map(|record| record.san.as_str()));

        for (i, pair) in sans.chunks(2).enumerate() {
            println!("{}. {}", i + 1, pair.join(" "));
        }
    }

    /// Starts a new game from `fen`, or from the standard position if `fen` is empty.
    fn new_game(&mut self, fen: &[String]) -> Result<()> {
        let window = self.game.repetition_window();

        if fen.is_empty() {
            self.game.reset();
        } else {
            self.game = Game::from_fen(&fen.join(" ")).context("Failed to parse new position")?;
            self.game.set_repetition_window(window);
        }

        self.respond()
    }

    /// Executes the `perft` and `splitperft` commands.
    fn perft(&mut self, depth: usize, split: bool) -> Result<()> {
        let color = self.game.side_to_move();
        let position = self.game.position_mut()?;
        print_perft(position, color, depth, split)?;
        Ok(())
    }

    /// Reports the outcome of the last move, then plays for the computer for as long as it is its turn.
    fn respond(&mut self) -> Result<()> {
        loop {
            if let Some(record) = self.game.history().last() {
                println!("{} played {}", record.color, record.san);
            }

            if let Some(square) = self.game.pending_promotion() {
                println!("Pawn on {square} must be promoted: promote <queen|rook|bishop|knight>");
                return Ok(());
            }

            let status = self.game.status()?;
            if status.is_over() {
                println!("Game over: {status}");
                return Ok(());
            }
            if status == GameStatus::Check {
                println!("{} is in check", self.game.side_to_move());
            }

            if self.computer != Some(self.game.side_to_move()) {
                return Ok(());
            }

            let res = self.game.search(self.config, &mut MaterialEvaluator)?;
            let Some(mv) = res.bestmove else {
                bail!("Search found no move for the computer in an ongoing game");
            };
            self.game.apply_move(mv)?;
        }
    }
}

/// Loops endlessly to await input via `stdin`, sending all successfully-parsed commands through the supplied `sender`.
fn input_handler(sender: Sender<EngineCommand>) -> Result<()> {
    let mut buffer = String::with_capacity(256);

    loop {
        // Clear the buffer, read input, and trim the trailing newline
        buffer.clear();
        let bytes = io::stdin()
            .read_line(&mut buffer)
            .context("Failed to read line when parsing commands")?;

        // For ctrl + d
        if 0 == bytes {
            // Send the Exit command and exit this function
            sender
                .send(EngineCommand::Exit)
                .context("Failed to send 'exit' command after receiving empty input")?;

            bail!("Engine received input of 0 bytes and is quitting");
        }

        // Trim any leading/trailing whitespace
        let buf = buffer.trim();

        // Ignore empty lines
        if buf.is_empty() {
            continue;
        }

        match EngineCommand::try_parse_from(buf.split_ascii_whitespace()) {
            Ok(cmd) => sender
                .send(cmd)
                .context("Failed to send command to engine")?,

            // If it wasn't a known command, print an error.
            Err(err) => eprintln!("{err}"),
        }
    }
}
