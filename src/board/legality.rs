/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use tracing::debug;

use crate::{Color, GameResult, Move, MoveContext, PieceId, PieceKind, Position, Square};

impl Position {
    /// Returns `true` if `color`'s King is attacked.
    ///
    /// A side without a King on the board is never in check.
    pub fn in_check(&self, color: Color) -> bool {
        self.king_square(color)
            .is_some_and(|king| self.is_attacked(king, color.opponent()))
    }

    /// Generates every legal destination of the piece `id`: the pseudo-legal moves that do not leave its own King attacked.
    ///
    /// Each candidate is tried on this position and taken back before the next one, so the position is
    /// unchanged when this returns `Ok`. A failed take-back is reported as [`crate::GameError::CorruptedState`].
    pub fn legal_moves(&mut self, id: PieceId) -> GameResult<Vec<Square>> {
        let color = self.piece(id).color();
        let candidates = self.pseudo_moves(id, MoveContext::MOVES);

        if self.in_check(color) {
            self.check_evasions(id, candidates)
        } else {
            self.moves_not_into_check(id, candidates)
        }
    }

    /// While in check, keeps only the moves that get the King out of it.
    fn check_evasions(&mut self, id: PieceId, candidates: Vec<Square>) -> GameResult<Vec<Square>> {
        let from = self.piece(id).square();
        let mut evasions = Vec::with_capacity(candidates.len());

        for to in candidates {
            if self.survives_trial(from, to)? {
                evasions.push(to);
            }
        }

        Ok(evasions)
    }

    /// While not in check, keeps the moves that do not walk into one (or expose the King through a pin).
    fn moves_not_into_check(
        &mut self,
        id: PieceId,
        candidates: Vec<Square>,
    ) -> GameResult<Vec<Square>> {
        let from = self.piece(id).square();
        let mut moves = Vec::with_capacity(candidates.len());

        for to in candidates {
            if self.survives_trial(from, to)? {
                moves.push(to);
            }
        }

        Ok(moves)
    }

    /// Plays `from -> to`, checks whether the mover's King is safe, and takes the move back.
    fn survives_trial(&mut self, from: Square, to: Square) -> GameResult<bool> {
        let undo = self.make(from, to, None)?;
        let color = self.piece(undo.mover()).color();
        let safe = !self.in_check(color);

        self.unmake(undo).inspect_err(|err| {
            debug!("Trial {from}{to} could not be taken back: {err}");
        })?;

        Ok(safe)
    }

    /// Returns `true` if any piece of `color` has at least one legal move.
    ///
    /// Stops at the first one found.
    pub fn has_legal_move(&mut self, color: Color) -> GameResult<bool> {
        for id in self.ids_of(color) {
            if !self.legal_moves(id)?.is_empty() {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Every legal move available to `color`, in board order.
    ///
    /// A Pawn reaching its last rank is listed once per promotion kind, strongest first.
    pub fn all_legal_moves(&mut self, color: Color) -> GameResult<Vec<Move>> {
        let mut moves = Vec::with_capacity(64);

        for id in self.ids_of(color) {
            let piece = *self.piece(id);

            for to in self.legal_moves(id)? {
                if piece.promotes_on(to) {
                    moves.extend(
                        PieceKind::promotions()
                            .into_iter()
                            .map(|kind| Move::with_promotion(piece.square(), to, kind)),
                    );
                } else {
                    moves.push(Move::new(piece.square(), to));
                }
            }
        }

        Ok(moves)
    }

    /// Returns `true` if the piece `id` can legally move onto `to`.
    pub fn can_reach(&mut self, id: PieceId, to: Square) -> GameResult<bool> {
        if !self.pseudo_moves(id, MoveContext::MOVES).contains(&to) {
            return Ok(false);
        }

        let from = self.piece(id).square();
        self.survives_trial(from, to)
    }
}
