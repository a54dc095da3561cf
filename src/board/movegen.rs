/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{Color, Piece, PieceId, PieceKind, Position, Square};

use super::position::KING_FILE;

const ORTHOGONALS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

const DIAGONALS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

const KING_STEPS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Options for pseudo-legal move generation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveContext {
    /// Generate only the squares a piece attacks, for deciding whether a King is in check.
    ///
    /// Castling is never generated in this mode, since castling itself asks whether the King is attacked.
    /// Pawns report both capture diagonals and none of their pushes.
    pub for_check_scan: bool,
}

impl MoveContext {
    /// Context for regular move generation.
    pub const MOVES: Self = Self {
        for_check_scan: false,
    };

    /// Context for attack detection.
    pub const CHECK_SCAN: Self = Self {
        for_check_scan: true,
    };
}

impl Position {
    /// Generates the pseudo-legal destinations of the piece `id`.
    ///
    /// These obey the piece's movement pattern and the board's occupancy, but may leave the mover's own King attacked.
    /// See [`Position::legal_moves`] for the filtered set.
    pub fn pseudo_moves(&self, id: PieceId, context: MoveContext) -> Vec<Square> {
        let mut moves = Vec::with_capacity(28);
        self.pseudo_moves_into(self.piece(id), context, &mut moves);
        moves
    }

    /// Appends the pseudo-legal destinations of `piece` to `moves`.
    fn pseudo_moves_into(&self, piece: &Piece, context: MoveContext, moves: &mut Vec<Square>) {
        match piece.kind() {
            PieceKind::Pawn => self.pawn_moves(piece, context, moves),
            PieceKind::Knight => self.step_moves(piece, &KNIGHT_JUMPS, moves),
            PieceKind::Bishop => self.slide_moves(piece, &DIAGONALS, moves),
            PieceKind::Rook => self.slide_moves(piece, &ORTHOGONALS, moves),
            PieceKind::Queen => {
                self.slide_moves(piece, &ORTHOGONALS, moves);
                self.slide_moves(piece, &DIAGONALS, moves);
            }
            PieceKind::King => {
                self.step_moves(piece, &KING_STEPS, moves);
                if !context.for_check_scan && !piece.has_moved() {
                    self.castling_moves(piece, moves);
                }
            }
        }
    }

    /// Returns `true` if any piece of color `by` attacks `square`.
    pub fn is_attacked(&self, square: Square, by: Color) -> bool {
        let mut attacks = Vec::with_capacity(28);

        self.pieces_of(by).any(|(_, piece)| {
            attacks.clear();
            self.pseudo_moves_into(piece, MoveContext::CHECK_SCAN, &mut attacks);
            attacks.contains(&square)
        })
    }

    /// Walks each direction until the edge of the board or the first occupant, which is included if it is an enemy.
    fn slide_moves(&self, piece: &Piece, directions: &[(i8, i8)], moves: &mut Vec<Square>) {
        for &(dx, dy) in directions {
            let mut current = piece.square();

            while let Some(next) = current.offset(dx, dy) {
                match self.piece_at(next) {
                    None => moves.push(next),
                    Some(occupant) => {
                        if occupant.color() != piece.color() {
                            moves.push(next);
                        }
                        break;
                    }
                }
                current = next;
            }
        }
    }

    /// Fixed offsets, keeping in-bounds cells without a friendly piece.
    fn step_moves(&self, piece: &Piece, offsets: &[(i8, i8)], moves: &mut Vec<Square>) {
        moves.extend(
            offsets
                .iter()
                .filter_map(|&(dx, dy)| piece.square().offset(dx, dy))
                .filter(|&to| !self.is_friendly(to, piece.color())),
        );
    }

    fn pawn_moves(&self, pawn: &Piece, context: MoveContext, moves: &mut Vec<Square>) {
        let color = pawn.color();
        let forward = color.forward();
        let from = pawn.square();

        let diagonals = [from.offset(-1, forward), from.offset(1, forward)];

        if context.for_check_scan {
            moves.extend(
                diagonals
                    .into_iter()
                    .flatten()
                    .filter(|&to| !self.is_friendly(to, color)),
            );
            return;
        }

        // Pushes
        if let Some(one) = from.offset(0, forward).filter(|&sq| self.is_empty(sq)) {
            moves.push(one);

            if !pawn.has_moved() && from.y() == color.pawn_rank() {
                if let Some(two) = from.offset(0, 2 * forward).filter(|&sq| self.is_empty(sq)) {
                    moves.push(two);
                }
            }
        }

        // Captures
        moves.extend(
            diagonals
                .into_iter()
                .flatten()
                .filter(|&to| self.is_enemy(to, color)),
        );

        // En passant is only possible from the fifth rank, against the pawn that *just* double-stepped beside us
        if from.y() as i8 != color.pawn_rank() as i8 + 3 * forward {
            return;
        }

        let Some(last) = self.last_mover() else {
            return;
        };
        let victim = self.piece(last);
        if !victim.is_pawn() || victim.color() == color || !victim.just_double_moved() {
            return;
        }

        let beside = victim.square().y() == from.y() && victim.square().x().abs_diff(from.x()) == 1;
        if let Some(target) = victim
            .square()
            .offset(0, forward)
            .filter(|&sq| beside && self.is_empty(sq))
        {
            moves.push(target);
        }
    }

    /// King destinations for castling, if the King is unmoved, an unmoved Rook is in the corner,
    /// every cell between them is empty, and neither the King's square nor the one it passes over is attacked.
    ///
    /// Whether the King ends up in check is left to the legality filter.
    fn castling_moves(&self, king: &Piece, moves: &mut Vec<Square>) {
        let color = king.color();
        let from = king.square();
        if from.y() != color.home_rank() || from.x() != KING_FILE {
            return;
        }

        let enemy = color.opponent();
        let mut in_check = None;

        for (corner, step) in [(7u8, 1i8), (0u8, -1i8)] {
            let rook_ready = from
                .with_x(corner)
                .and_then(|sq| self.piece_at(sq))
                .is_some_and(|rook| {
                    rook.kind() == PieceKind::Rook && rook.color() == color && !rook.has_moved()
                });
            if !rook_ready {
                continue;
            }

            let (lo, hi) = if corner > from.x() {
                (from.x() + 1, corner)
            } else {
                (corner + 1, from.x())
            };
            let path_clear = (lo..hi)
                .filter_map(|x| from.with_x(x))
                .all(|sq| self.is_empty(sq));
            if !path_clear {
                continue;
            }

            if *in_check.get_or_insert_with(|| self.is_attacked(from, enemy)) {
                return;
            }

            let (Some(transit), Some(landing)) = (from.offset(step, 0), from.offset(2 * step, 0))
            else {
                continue;
            };
            if !self.is_attacked(transit, enemy) {
                moves.push(landing);
            }
        }
    }
}
