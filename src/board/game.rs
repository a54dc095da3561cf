/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use tracing::debug;

use crate::{
    is_threefold_repetition, notation, Captured, CastleSide, Color, GameError, GameResult,
    GameStatus, Move, MoveRecord, PieceKind, Position, Snapshot, Square, REPETITION_WINDOW,
};

/// Whether the game can move on to the next turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TurnState {
    /// Waiting for the side to move to play.
    #[default]
    Idle,

    /// A Pawn of `color` reached `square` and must be promoted before anything else happens.
    AwaitingPromotion { color: Color, square: Square },
}

/// A game of chess.
///
/// This type owns the live [`Position`] and adds everything that belongs to a session rather than to a board:
/// whose turn it is, the record of every applied move, the board layouts used for repetition detection,
/// the move counters, and the promotion sub-state.
///
/// The basic methods you're probably looking for are [`Game::legal_moves_from`], [`Game::apply`], and [`Game::status`].
#[derive(Clone, PartialEq, Eq)]
pub struct Game {
    /// The current [`Position`] of the game.
    position: Position,

    side_to_move: Color,

    state: TurnState,

    /// Every move applied to this game, in order.
    history: Vec<MoveRecord>,

    /// Layout of the board after each applied move. Search trials never add to this.
    snapshots: Vec<Snapshot>,

    /// Half moves since the last capture or Pawn move.
    halfmove: usize,

    /// Starts at 1 and is incremented after Black moves.
    fullmove: usize,

    /// How many recent snapshots are considered for threefold repetition. `None` means the whole game.
    repetition_window: Option<usize>,
}

impl Game {
    /// Creates a new [`Game`] from the provided [`Position`], with `side_to_move` to play.
    pub fn new(position: Position, side_to_move: Color) -> Self {
        Self {
            position,
            side_to_move,
            state: TurnState::Idle,
            history: Vec::with_capacity(128),
            snapshots: Vec::with_capacity(128),
            halfmove: 0,
            fullmove: 1,
            repetition_window: Some(REPETITION_WINDOW),
        }
    }

    /// Creates a new [`Game`] from the provided FEN string.
    ///
    /// The halfmove clock and fullmove number are optional and default to `0` and `1`.
    ///
    /// # Example
    /// ```
    /// # use gambit::{Color, Game};
    /// let game = Game::from_fen("4k3/8/8/8/8/8/8/4K2R b K - 3 40").unwrap();
    /// assert_eq!(game.side_to_move(), Color::Black);
    /// assert_eq!(game.to_fen(), "4k3/8/8/8/8/8/8/4K2R b K - 3 40");
    /// ```
    pub fn from_fen(fen: &str) -> GameResult<Self> {
        let invalid = |reason: &str| GameError::InvalidFen {
            fen: fen.to_string(),
            reason: reason.to_string(),
        };

        let position = Position::from_fen(fen)?;
        let fields: Vec<_> = fen.split_ascii_whitespace().collect();

        let side_to_move = match fields.get(1) {
            Some(side) => Color::from_str(side).map_err(|_| invalid("unknown side to move"))?,
            None => Color::White,
        };

        let mut game = Self::new(position, side_to_move);

        if let Some(halfmove) = fields.get(4) {
            game.halfmove = halfmove
                .parse()
                .map_err(|_| invalid("halfmove clock must be a number"))?;
        }
        if let Some(fullmove) = fields.get(5) {
            game.fullmove = fullmove
                .parse()
                .map_err(|_| invalid("fullmove number must be a number"))?;
        }

        Ok(game)
    }

    /// Renders the current position as a FEN string.
    pub fn to_fen(&self) -> String {
        let ep = self
            .position
            .ep_target()
            .map_or_else(|| String::from("-"), |sq| sq.to_string());

        format!(
            "{} {} {} {ep} {} {}",
            self.position.placement_fen(),
            self.side_to_move.to_uci(),
            self.position.castling_fen(),
            self.halfmove,
            self.fullmove
        )
    }

    /// Starts over from the standard position, clearing both histories.
    ///
    /// The repetition window is kept.
    pub fn reset(&mut self) {
        *self = Self {
            repetition_window: self.repetition_window,
            ..Self::default()
        };
    }

    /// The current [`Position`].
    #[inline(always)]
    pub const fn position(&self) -> &Position {
        &self.position
    }

    /// The color whose turn it is.
    ///
    /// While a promotion is pending, this is still the color that moved the Pawn.
    #[inline(always)]
    pub const fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline(always)]
    pub const fn state(&self) -> TurnState {
        self.state
    }

    /// Every move applied so far.
    #[inline(always)]
    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    /// The board layout after every applied move.
    #[inline(always)]
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    #[inline(always)]
    pub const fn halfmove(&self) -> usize {
        self.halfmove
    }

    #[inline(always)]
    pub const fn fullmove(&self) -> usize {
        self.fullmove
    }

    #[inline(always)]
    pub const fn repetition_window(&self) -> Option<usize> {
        self.repetition_window
    }

    /// Sets how many recent layouts are examined for threefold repetition. `None` examines the whole game.
    pub fn set_repetition_window(&mut self, window: Option<usize>) {
        self.repetition_window = window;
    }

    /// Returns `true` if a Pawn must be promoted before the game can continue.
    #[inline(always)]
    pub const fn is_awaiting_promotion(&self) -> bool {
        matches!(self.state, TurnState::AwaitingPromotion { .. })
    }

    /// The square of the Pawn waiting to be promoted, if any.
    #[inline(always)]
    pub const fn pending_promotion(&self) -> Option<Square> {
        match self.state {
            TurnState::AwaitingPromotion { square, .. } => Some(square),
            TurnState::Idle => None,
        }
    }

    /// Fails with [`GameError::AwaitingPromotion`] while a promotion is pending.
    fn ensure_idle(&self) -> GameResult<()> {
        match self.pending_promotion() {
            Some(square) => Err(GameError::AwaitingPromotion(square)),
            None => Ok(()),
        }
    }

    /// Legal destinations for the piece on `square`, whichever side it belongs to.
    pub fn legal_moves_from(&mut self, square: Square) -> GameResult<Vec<Square>> {
        self.ensure_idle()?;
        let id = self
            .position
            .id_at(square)
            .ok_or(GameError::EmptySquare(square))?;
        self.position.legal_moves(id)
    }

    /// Every legal move for the side to move, with promotions listed once per kind.
    pub fn legal_moves(&mut self) -> GameResult<Vec<Move>> {
        self.ensure_idle()?;
        self.position.all_legal_moves(self.side_to_move)
    }

    /// Moves the piece on `from` to `to`, recording the move and its consequences.
    ///
    /// The request is validated before anything changes: there must be no pending promotion,
    /// the game must not be over, `from` must hold a piece of the side to move,
    /// and `to` must be one of its legal destinations.
    ///
    /// If a Pawn reaches its last rank, the game enters [`TurnState::AwaitingPromotion`] and the turn does
    /// not pass until [`Game::resolve_promotion`] is called.
    pub fn apply(&mut self, from: Square, to: Square) -> GameResult<&MoveRecord> {
        let status = self.status()?;
        if status.is_over() {
            return Err(GameError::GameOver(status));
        }

        let id = self
            .position
            .id_at(from)
            .ok_or(GameError::EmptySquare(from))?;
        let color = self.position.piece(id).color();
        if color != self.side_to_move {
            return Err(GameError::WrongSide {
                square: from,
                color: self.side_to_move,
            });
        }

        if !self.position.legal_moves(id)?.contains(&to) {
            return Err(GameError::IllegalMove { from, to });
        }

        self.execute(from, to)
    }

    /// Applies a [`Move`], resolving its promotion right away if one was supplied.
    ///
    /// A promoting move without a promotion kind leaves the game awaiting one, exactly like [`Game::apply`].
    pub fn apply_move(&mut self, mv: Move) -> GameResult<&MoveRecord> {
        if let Some(kind) = mv.promotion.filter(|k| !k.is_promotion_target()) {
            return Err(GameError::InvalidPromotion(kind));
        }

        self.apply(mv.from, mv.to)?;

        match mv.promotion {
            Some(kind) if self.is_awaiting_promotion() => self.resolve_promotion(kind),
            _ => self.last_record(),
        }
    }

    /// Performs an already-validated move and records it.
    fn execute(&mut self, from: Square, to: Square) -> GameResult<&MoveRecord> {
        let id = self
            .position
            .id_at(from)
            .ok_or(GameError::EmptySquare(from))?;
        let mover = *self.position.piece(id);
        let color = mover.color();

        // Everything that depends on the board *before* the move
        let is_promoting = mover.promotes_on(to);
        let disambiguation = notation::disambiguation(&mut self.position, id, to)?;

        let undo = self.position.make(from, to, None)?;

        let captured = undo.captured().map(|(victim, square)| {
            let piece = self.position.piece(victim);
            Captured {
                piece: victim,
                kind: piece.kind(),
                color: piece.color(),
                square,
            }
        });
        let castle = undo.castled_king_side().map(|short| {
            if short {
                CastleSide::Short
            } else {
                CastleSide::Long
            }
        });

        let (is_check, is_checkmate) = self.opponent_outlook(color)?;

        let mut record = MoveRecord {
            piece: id,
            kind: mover.kind(),
            color,
            from,
            to,
            captured,
            castle,
            is_check,
            is_checkmate,
            is_promoting,
            promoted_to: None,
            disambiguation,
            san: String::new(),
        };
        record.san = notation::san(&record);

        if record.resets_halfmove_clock() {
            self.halfmove = 0;
        } else {
            self.halfmove += 1;
        }
        if color.is_black() {
            self.fullmove += 1;
        }

        debug!("{color} played {} ({from}{to})", record.san);

        self.history.push(record);
        self.snapshots.push(self.position.snapshot());

        if is_promoting {
            debug!("{color} must promote the pawn on {to}");
            self.state = TurnState::AwaitingPromotion { color, square: to };
        } else {
            self.side_to_move = color.opponent();
        }

        self.last_record()
    }

    /// Whether `color`'s opponent is in check, and whether that check is mate.
    fn opponent_outlook(&mut self, color: Color) -> GameResult<(bool, bool)> {
        let opponent = color.opponent();
        let is_check = self.position.in_check(opponent);
        let is_checkmate = is_check && !self.position.has_legal_move(opponent)?;
        Ok((is_check, is_checkmate))
    }

    /// Promotes the Pawn waiting on its last rank to `kind`, completing the move that brought it there.
    ///
    /// The Pawn keeps its identity and its cell. The pending record learns what it promoted to,
    /// its check flags are recomputed for the new piece, and its notation is rendered again.
    /// The turn then passes to the opponent.
    pub fn resolve_promotion(&mut self, kind: PieceKind) -> GameResult<&MoveRecord> {
        if !kind.is_promotion_target() {
            return Err(GameError::InvalidPromotion(kind));
        }

        let TurnState::AwaitingPromotion { color, .. } = self.state else {
            return Err(GameError::NothingToPromote(self.side_to_move));
        };

        let square = self
            .position
            .pieces_of(color)
            .find(|(_, piece)| piece.is_pawn() && piece.square().y() == color.promotion_rank())
            .map(|(_, piece)| piece.square())
            .ok_or(GameError::NothingToPromote(color))?;

        if !self
            .history
            .last()
            .is_some_and(|record| record.is_promoting && record.promoted_to.is_none())
        {
            return Err(GameError::NothingToPromote(color));
        }

        self.position.promote(square, kind)?;

        let (is_check, is_checkmate) = self.opponent_outlook(color)?;
        let snapshot = self.position.snapshot();

        if let Some(record) = self.history.last_mut() {
            record.promoted_to = Some(kind);
            record.is_check = is_check;
            record.is_checkmate = is_checkmate;
            record.san = notation::san(record);
        }
        if let Some(last) = self.snapshots.last_mut() {
            *last = snapshot;
        }

        debug!("{color} promoted the pawn on {square} to a {kind}");

        self.state = TurnState::Idle;
        self.side_to_move = color.opponent();

        self.last_record()
    }

    fn last_record(&self) -> GameResult<&MoveRecord> {
        self.history.last().ok_or_else(|| {
            GameError::CorruptedState(String::from("no move was recorded for this turn"))
        })
    }

    /// Returns `true` if the side to move is checkmated.
    pub fn is_checkmate(&mut self) -> GameResult<bool> {
        self.ensure_idle()?;
        self.position.is_checkmate(self.side_to_move)
    }

    /// Returns `true` if the side to move is stalemated.
    pub fn is_stalemate(&mut self) -> GameResult<bool> {
        self.ensure_idle()?;
        self.position.is_stalemate(self.side_to_move)
    }

    /// Returns `true` if the same layout has appeared three times within the repetition window.
    pub fn is_threefold_repetition(&self) -> bool {
        is_threefold_repetition(&self.snapshots, self.repetition_window)
    }

    /// Returns `true` if the game is drawn by stalemate, insufficient material, or repetition.
    pub fn is_draw(&mut self) -> GameResult<bool> {
        Ok(self.is_stalemate()?
            || self.position.has_insufficient_material()
            || self.is_threefold_repetition())
    }

    /// Classifies the game from the point of view of the side to move.
    pub fn status(&mut self) -> GameResult<GameStatus> {
        self.ensure_idle()?;
        let color = self.side_to_move;
        let in_check = self.position.in_check(color);

        if !self.position.has_legal_move(color)? {
            return Ok(if in_check {
                GameStatus::Checkmate {
                    winner: color.opponent(),
                }
            } else {
                GameStatus::Stalemate
            });
        }

        if self.position.has_insufficient_material() {
            Ok(GameStatus::InsufficientMaterial)
        } else if self.is_threefold_repetition() {
            Ok(GameStatus::ThreefoldRepetition)
        } else if in_check {
            Ok(GameStatus::Check)
        } else {
            Ok(GameStatus::Ongoing)
        }
    }

    /// Mutable access to the live position, for searches and perft.
    pub(crate) fn position_mut(&mut self) -> GameResult<&mut Position> {
        self.ensure_idle()?;
        Ok(&mut self.position)
    }
}

impl Default for Game {
    /// A game from the standard starting position, White to move.
    fn default() -> Self {
        Self::new(Position::standard(), Color::White)
    }
}

impl FromStr for Game {
    type Err = GameError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.position)?;
        writeln!(f)?;
        writeln!(f, "FEN: {}", self.to_fen())?;
        write!(f, "Side to move: {}", self.side_to_move)?;
        if let Some(square) = self.pending_promotion() {
            write!(f, " (awaiting promotion on {square})")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FEN_STARTPOS;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn play(game: &mut Game, moves: &[&str]) {
        for mv in moves {
            let mv = Move::from_uci(mv).unwrap();
            game.apply_move(mv).unwrap();
        }
    }

    #[test]
    fn test_startpos_round_trips() {
        let game = Game::from_fen(FEN_STARTPOS).unwrap();
        assert_eq!(game.to_fen(), FEN_STARTPOS);
        assert_eq!(Game::default().to_fen(), FEN_STARTPOS);
    }

    #[test]
    fn test_apply_updates_turn_and_counters() {
        let mut game = Game::default();
        play(&mut game, &["e2e4"]);
        assert_eq!(game.side_to_move(), Color::Black);
        assert_eq!(
            game.to_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );

        play(&mut game, &["g8f6", "g1f3"]);
        assert_eq!(game.halfmove(), 2);
        assert_eq!(game.fullmove(), 2);
        assert_eq!(game.history().len(), 3);
        assert_eq!(game.snapshots().len(), 3);
    }

    #[test]
    fn test_apply_rejects_bad_requests_without_mutating() {
        let mut game = Game::default();
        let before = game.clone();

        assert_eq!(
            game.apply(sq("e4"), sq("e5")).unwrap_err(),
            GameError::EmptySquare(sq("e4"))
        );
        assert_eq!(
            game.apply(sq("e7"), sq("e5")).unwrap_err(),
            GameError::WrongSide {
                square: sq("e7"),
                color: Color::White
            }
        );
        assert_eq!(
            game.apply(sq("e2"), sq("e5")).unwrap_err(),
            GameError::IllegalMove {
                from: sq("e2"),
                to: sq("e5")
            }
        );
        assert_eq!(game, before);
    }

    #[test]
    fn test_promotion_blocks_the_turn() {
        let mut game = Game::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let record = game.apply(sq("a7"), sq("a8")).unwrap();
        assert!(record.is_promoting);
        assert_eq!(record.promoted_to, None);

        assert!(game.is_awaiting_promotion());
        assert_eq!(game.side_to_move(), Color::White);
        assert_eq!(
            game.legal_moves().unwrap_err(),
            GameError::AwaitingPromotion(sq("a8"))
        );
        assert_eq!(
            game.apply(sq("e1"), sq("e2")).unwrap_err(),
            GameError::AwaitingPromotion(sq("a8"))
        );

        let record = game.resolve_promotion(PieceKind::Queen).unwrap();
        assert_eq!(record.promoted_to, Some(PieceKind::Queen));
        assert!(record.is_check);
        assert_eq!(record.san, "a8=Q+");

        assert!(!game.is_awaiting_promotion());
        assert_eq!(game.side_to_move(), Color::Black);
        assert_eq!(
            game.position().piece_at(sq("a8")).unwrap().kind(),
            PieceKind::Queen
        );
    }

    #[test]
    fn test_promotion_rejects_bad_kinds() {
        let mut game = Game::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(
            game.resolve_promotion(PieceKind::Queen).unwrap_err(),
            GameError::NothingToPromote(Color::White)
        );

        game.apply(sq("a7"), sq("a8")).unwrap();
        assert_eq!(
            game.resolve_promotion(PieceKind::King).unwrap_err(),
            GameError::InvalidPromotion(PieceKind::King)
        );
        assert!(game.is_awaiting_promotion());
    }

    #[test]
    fn test_apply_move_with_promotion_resolves_immediately() {
        let mut game = Game::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let record = game
            .apply_move(Move::from_uci("a7a8n").unwrap())
            .unwrap();
        assert_eq!(record.san, "a8=N");
        assert!(!game.is_awaiting_promotion());
        assert_eq!(game.side_to_move(), Color::Black);
    }

    #[test]
    fn test_status() {
        let mut game = Game::from_fen("k7/8/KQ6/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(game.status().unwrap(), GameStatus::Stalemate);
        assert!(game.is_draw().unwrap());

        let mut game = Game::default();
        play(&mut game, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        assert_eq!(
            game.status().unwrap(),
            GameStatus::Checkmate {
                winner: Color::Black
            }
        );
        assert_eq!(game.history().last().unwrap().san, "Qh4#");
    }

    #[test]
    fn test_no_moves_once_the_game_is_over() {
        let mut game = Game::from_fen("4k3/8/8/8/8/8/8/4KN2 w - - 0 1").unwrap();
        let before = game.clone();
        assert_eq!(
            game.apply(sq("f1"), sq("g3")).unwrap_err(),
            GameError::GameOver(GameStatus::InsufficientMaterial)
        );
        assert_eq!(game, before);

        let mut game = Game::default();
        play(
            &mut game,
            &["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8", "g1f3"],
        );
        assert_eq!(
            game.apply(sq("g8"), sq("f6")).unwrap_err(),
            GameError::GameOver(GameStatus::ThreefoldRepetition)
        );

        let mut game = Game::default();
        play(&mut game, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        assert_eq!(
            game.apply(sq("a2"), sq("a3")).unwrap_err(),
            GameError::GameOver(GameStatus::Checkmate {
                winner: Color::Black
            })
        );
        assert_eq!(game.history().len(), 4);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut game = Game::default();
        game.set_repetition_window(None);
        play(&mut game, &["e2e4", "e7e5"]);

        game.reset();
        assert!(game.history().is_empty());
        assert!(game.snapshots().is_empty());
        assert_eq!(game.to_fen(), FEN_STARTPOS);
        assert_eq!(game.repetition_window(), None);
    }

    #[test]
    fn test_from_fen_rejects_bad_fields() {
        assert!(Game::from_fen("4k3/8/8/8/8/8/8/4K3 x - - 0 1").is_err());
        assert!(Game::from_fen("4k3/8/8/8/8/8/8/4K3 w - - zero 1").is_err());
    }
}
