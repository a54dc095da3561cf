/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use crate::{Color, GameError, GameResult, Piece, PieceId, PieceKind, Square};

/// Order of the pieces on each side's home rank in a standard setup.
const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// File the King starts on.
pub(crate) const KING_FILE: u8 = 4;

/// Represents the pieces on the board and the per-piece flags needed by the special moves.
///
/// Pieces live in an arena and are referred to by [`PieceId`]. Each of the 64 cells holds at most one id.
/// Captured pieces keep their arena slot, so undoing a capture writes the *same* id back into its cell.
///
/// A [`Position`] has no notion of whose turn it is; that belongs to [`crate::Game`].
#[derive(Clone, PartialEq, Eq)]
pub struct Position {
    /// Every piece that has been on the board, indexed by [`PieceId`].
    pieces: Vec<Piece>,

    /// Occupant of every cell, indexed by [`Square::index`].
    cells: [Option<PieceId>; Square::COUNT],

    /// The piece that made the most recent move, if any. En passant is only available against this piece.
    last_mover: Option<PieceId>,
}

/// Everything needed to take back a move made with [`Position::make`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Undo {
    mover: PieceId,
    from: Square,
    to: Square,

    /// The mover's record exactly as it was before the move (square, flags, and kind).
    mover_before: Piece,

    /// The removed piece and the cell it was removed from. For en passant, this is not `to`.
    captured: Option<(PieceId, Square)>,

    /// The Rook relocated by a castling move.
    rook: Option<RookShift>,

    last_mover_before: Option<PieceId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct RookShift {
    id: PieceId,
    from: Square,
    to: Square,
    before: Piece,
}

impl Undo {
    /// The piece that moved.
    #[inline(always)]
    pub const fn mover(&self) -> PieceId {
        self.mover
    }

    /// The piece that was captured, if any, and the square it was taken from.
    #[inline(always)]
    pub const fn captured(&self) -> Option<(PieceId, Square)> {
        self.captured
    }

    /// Returns `true` if this move was a castle, and which way the King went.
    #[inline(always)]
    pub fn castled_king_side(&self) -> Option<bool> {
        self.rook.as_ref().map(|shift| shift.from.x() > shift.to.x())
    }
}

impl Position {
    /// Creates a new, empty [`Position`].
    pub fn empty() -> Self {
        Self {
            pieces: Vec::with_capacity(32),
            cells: [None; Square::COUNT],
            last_mover: None,
        }
    }

    /// Creates the standard starting position.
    pub fn standard() -> Self {
        let mut position = Self::empty();

        for color in Color::all() {
            for (x, kind) in BACK_RANK.into_iter().enumerate() {
                if let Some(square) = Square::new(x as u8, color.home_rank()) {
                    position.place(Piece::new(color, kind, square));
                }
            }

            for x in 0..Square::SIZE {
                if let Some(square) = Square::new(x, color.pawn_rank()) {
                    position.place(Piece::new(color, PieceKind::Pawn, square));
                }
            }
        }

        position
    }

    /// Parses the piece placement, castling, and en passant fields of a FEN string.
    ///
    /// Side to move and move counters are ignored here; see [`crate::Game::from_fen`].
    ///
    /// Flags are derived from the FEN:
    /// - Pawns off their starting rank have moved.
    /// - Kings and Rooks on their home squares are unmoved only if the matching castling right is present.
    /// - The pawn that created an en passant target is the most recent mover.
    pub fn from_fen(fen: &str) -> GameResult<Self> {
        let invalid = |reason: &str| GameError::InvalidFen {
            fen: fen.to_string(),
            reason: reason.to_string(),
        };

        let mut fields = fen.split_ascii_whitespace();
        let placement = fields.next().ok_or_else(|| invalid("missing placements"))?;
        let _side = fields.next();
        let castling = fields.next().unwrap_or("-");
        let en_passant = fields.next().unwrap_or("-");

        let mut position = Self::empty();

        let ranks: Vec<_> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(invalid("placements must contain 8 ranks"));
        }

        for (i, rank) in ranks.into_iter().enumerate() {
            let y = 7 - i as u8;
            let mut x = 0u8;

            for c in rank.chars() {
                if let Some(skip) = c.to_digit(10) {
                    x += skip as u8;
                    if x > Square::SIZE {
                        return Err(invalid("rank is too long"));
                    }
                    continue;
                }

                let kind = PieceKind::from_uci(c).map_err(|_| invalid("unknown piece"))?;
                let color = if c.is_ascii_uppercase() {
                    Color::White
                } else {
                    Color::Black
                };
                let square = Square::new(x, y).ok_or_else(|| invalid("rank is too long"))?;

                if kind == PieceKind::Pawn && (y == 0 || y == 7) {
                    return Err(invalid("pawns cannot stand on the first or last rank"));
                }

                position.place(Piece::new(color, kind, square));
                x += 1;
            }

            if x != 8 {
                return Err(invalid("every rank must describe 8 squares"));
            }
        }

        for color in Color::all() {
            let kings = position
                .pieces_of(color)
                .filter(|(_, piece)| piece.is_king())
                .count();
            if kings != 1 {
                return Err(invalid("each side needs exactly one king"));
            }
        }

        position.apply_castling_rights(castling);

        if en_passant != "-" {
            let target = Square::from_uci(en_passant).map_err(|_| invalid("bad en passant"))?;
            let victim_square = match target.y() {
                2 => target.offset(0, 1),
                5 => target.offset(0, -1),
                _ => None,
            }
            .ok_or_else(|| invalid("en passant target must be on the third or sixth rank"))?;

            let victim = position
                .id_at(victim_square)
                .filter(|&id| position.piece(id).is_pawn())
                .ok_or_else(|| invalid("no pawn in front of the en passant target"))?;

            let pawn = &mut position.pieces[victim.index()];
            pawn.has_moved = true;
            pawn.just_double_moved = true;
            position.last_mover = Some(victim);
        }

        Ok(position)
    }

    /// Marks home Kings and Rooks as moved unless `castling` grants them a right.
    fn apply_castling_rights(&mut self, castling: &str) {
        for color in Color::all() {
            let (short, long) = match color {
                Color::White => ('K', 'Q'),
                Color::Black => ('k', 'q'),
            };
            let can_short = castling.contains(short);
            let can_long = castling.contains(long);

            let home = |x| Square::new(x, color.home_rank());
            let rules = [
                (home(KING_FILE), PieceKind::King, can_short || can_long),
                (home(7), PieceKind::Rook, can_short),
                (home(0), PieceKind::Rook, can_long),
            ];

            for (square, kind, unmoved) in rules {
                let Some(id) = square.and_then(|sq| self.id_at(sq)) else {
                    continue;
                };
                let piece = &mut self.pieces[id.index()];
                if piece.kind == kind && piece.color == color && !unmoved {
                    piece.has_moved = true;
                }
            }
        }
    }

    /// Adds `piece` to the arena and puts it on its square, inferring whether it has moved from where it stands.
    fn place(&mut self, mut piece: Piece) -> PieceId {
        let square = piece.square;
        let home = square.y() == piece.color.home_rank();

        piece.has_moved = match piece.kind {
            PieceKind::Pawn => square.y() != piece.color.pawn_rank(),
            PieceKind::King => !(home && square.x() == KING_FILE),
            PieceKind::Rook => !(home && (square.x() == 0 || square.x() == 7)),
            _ => false,
        };

        let id = PieceId(self.pieces.len() as u16);
        self.pieces.push(piece);
        self.cells[square.index()] = Some(id);
        id
    }

    /// Returns the id of the piece on `square`, if any.
    #[inline(always)]
    pub fn id_at(&self, square: Square) -> Option<PieceId> {
        self.cells[square.index()]
    }

    /// Returns the piece on `square`, if any.
    #[inline(always)]
    pub fn piece_at(&self, square: Square) -> Option<&Piece> {
        self.id_at(square).map(|id| self.piece(id))
    }

    /// Fetches a piece record by id.
    ///
    /// The record of a captured piece remains available, describing where it was captured.
    #[inline(always)]
    pub fn piece(&self, id: PieceId) -> &Piece {
        &self.pieces[id.index()]
    }

    /// Returns `true` if `square` has no occupant.
    #[inline(always)]
    pub fn is_empty(&self, square: Square) -> bool {
        self.id_at(square).is_none()
    }

    /// Returns `true` if `square` holds a piece of the opposite color to `color`.
    #[inline(always)]
    pub fn is_enemy(&self, square: Square, color: Color) -> bool {
        self.piece_at(square).is_some_and(|p| p.color != color)
    }

    /// Returns `true` if `square` holds a piece of `color`.
    #[inline(always)]
    pub fn is_friendly(&self, square: Square, color: Color) -> bool {
        self.piece_at(square).is_some_and(|p| p.color == color)
    }

    /// Iterates over every piece on the board, from a1 to h8.
    pub fn iter(&self) -> impl Iterator<Item = (PieceId, &Piece)> + '_ {
        self.cells
            .iter()
            .flatten()
            .map(|&id| (id, &self.pieces[id.index()]))
    }

    /// Iterates over every piece of `color` on the board, from a1 to h8.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (PieceId, &Piece)> + '_ {
        self.iter().filter(move |(_, piece)| piece.color == color)
    }

    /// Ids of every piece of `color` on the board, in board order.
    ///
    /// Collected up front so callers can mutate the position while walking them.
    pub fn ids_of(&self, color: Color) -> Vec<PieceId> {
        self.pieces_of(color).map(|(id, _)| id).collect()
    }

    /// Finds the square of `color`'s King.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces_of(color)
            .find(|(_, piece)| piece.is_king())
            .map(|(_, piece)| piece.square)
    }

    /// The piece that made the most recent move on this board.
    #[inline(always)]
    pub const fn last_mover(&self) -> Option<PieceId> {
        self.last_mover
    }

    /// If the most recent move was a pawn double-step, the square it passed over.
    pub fn ep_target(&self) -> Option<Square> {
        let pawn = self.piece(self.last_mover?);
        if pawn.is_pawn() && pawn.just_double_moved {
            pawn.square.offset(0, -pawn.color.forward())
        } else {
            None
        }
    }

    /// Captures the layout of the board (kind, color, and cell of every piece), ignoring flags.
    pub fn snapshot(&self) -> Snapshot {
        let mut cells = [None; Square::COUNT];
        for (_, piece) in self.iter() {
            cells[piece.square.index()] = Some((piece.color, piece.kind));
        }
        Snapshot(cells)
    }

    /// Moves the piece on `from` to `to`, resolving every side effect of the move:
    /// regular and en passant captures, the Rook's half of a castle, flag updates, and (if `promotion` is supplied
    /// and the mover is a Pawn reaching its last rank) the change of kind.
    ///
    /// This does *not* check legality. The returned [`Undo`] restores the position exactly when given to [`Position::unmake`].
    pub fn make(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> GameResult<Undo> {
        let mover = self.id_at(from).ok_or(GameError::EmptySquare(from))?;
        let mover_before = *self.piece(mover);

        if let Some(kind) = promotion.filter(|k| !k.is_promotion_target()) {
            return Err(GameError::InvalidPromotion(kind));
        }

        // Gather everything first, so nothing is touched if the move is malformed
        let captured = match self.id_at(to) {
            Some(victim) => Some((victim, to)),

            // A pawn moving diagonally onto an empty cell is capturing en passant
            None if mover_before.is_pawn() && from.x() != to.x() => from
                .with_x(to.x())
                .and_then(|sq| self.id_at(sq).map(|victim| (victim, sq))),

            None => None,
        };

        let rook = if mover_before.is_king() && from.x().abs_diff(to.x()) == 2 {
            let (corner, landing) = if to.x() > from.x() { (7, 5) } else { (0, 3) };
            let shift = from
                .with_x(corner)
                .zip(from.with_x(landing))
                .and_then(|(corner, landing)| {
                    self.id_at(corner).map(|id| RookShift {
                        id,
                        from: corner,
                        to: landing,
                        before: *self.piece(id),
                    })
                })
                .ok_or_else(|| {
                    GameError::CorruptedState(format!("castle {from}{to} has no rook to move"))
                })?;
            Some(shift)
        } else {
            None
        };

        let undo = Undo {
            mover,
            from,
            to,
            mover_before,
            captured,
            rook,
            last_mover_before: self.last_mover,
        };

        if let Some((_, square)) = undo.captured {
            self.cells[square.index()] = None;
        }

        self.cells[from.index()] = None;
        self.cells[to.index()] = Some(mover);

        let piece = &mut self.pieces[mover.index()];
        piece.square = to;
        piece.has_moved = true;
        piece.just_double_moved = piece.is_pawn() && from.y().abs_diff(to.y()) == 2;
        if let Some(kind) = promotion.filter(|_| mover_before.promotes_on(to)) {
            piece.kind = kind;
        }

        if let Some(shift) = &undo.rook {
            self.cells[shift.from.index()] = None;
            self.cells[shift.to.index()] = Some(shift.id);
            let rook = &mut self.pieces[shift.id.index()];
            rook.square = shift.to;
            rook.has_moved = true;
        }

        self.last_mover = Some(mover);

        Ok(undo)
    }

    /// Takes back a move made by [`Position::make`], restoring the exact prior occupants and piece records.
    ///
    /// Fails with [`GameError::CorruptedState`] (without changing anything) if the board does not look like
    /// the move in `undo` was the last thing done to it.
    pub fn unmake(&mut self, undo: Undo) -> GameResult<()> {
        let corrupted = |what: String| {
            Err(GameError::CorruptedState(format!(
                "cannot undo {}{}: {what}",
                undo.from, undo.to
            )))
        };

        if self.id_at(undo.to) != Some(undo.mover) {
            return corrupted(format!("{} does not hold the moved piece", undo.to));
        }
        if !self.is_empty(undo.from) {
            return corrupted(format!("{} is occupied", undo.from));
        }
        if let Some((_, square)) = undo.captured {
            if square != undo.to && !self.is_empty(square) {
                return corrupted(format!("capture square {square} is occupied"));
            }
        }
        if let Some(shift) = &undo.rook {
            if self.id_at(shift.to) != Some(shift.id) || !self.is_empty(shift.from) {
                return corrupted(format!("castled rook is not on {}", shift.to));
            }
        }

        if let Some(shift) = &undo.rook {
            self.cells[shift.to.index()] = None;
            self.cells[shift.from.index()] = Some(shift.id);
            self.pieces[shift.id.index()] = shift.before;
        }

        self.cells[undo.to.index()] = None;
        self.cells[undo.from.index()] = Some(undo.mover);
        self.pieces[undo.mover.index()] = undo.mover_before;

        if let Some((victim, square)) = undo.captured {
            self.cells[square.index()] = Some(victim);
        }

        self.last_mover = undo.last_mover_before;

        Ok(())
    }

    /// Replaces the kind of the Pawn on `square`, keeping its identity and cell.
    pub(crate) fn promote(&mut self, square: Square, kind: PieceKind) -> GameResult<()> {
        if !kind.is_promotion_target() {
            return Err(GameError::InvalidPromotion(kind));
        }

        let id = self.id_at(square).ok_or(GameError::EmptySquare(square))?;
        let piece = &mut self.pieces[id.index()];
        if !piece.is_pawn() {
            return Err(GameError::NothingToPromote(piece.color));
        }

        piece.kind = kind;
        Ok(())
    }

    /// Renders the piece placement field of a FEN string.
    pub fn placement_fen(&self) -> String {
        let mut fen = String::with_capacity(64);

        for y in (0..Square::SIZE).rev() {
            let mut empty = 0;
            for x in 0..Square::SIZE {
                match Square::new(x, y).and_then(|sq| self.piece_at(sq)) {
                    Some(piece) => {
                        if empty > 0 {
                            fen.push_str(&empty.to_string());
                            empty = 0;
                        }
                        fen.push(piece.char());
                    }
                    None => empty += 1,
                }
            }

            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if y > 0 {
                fen.push('/');
            }
        }

        fen
    }

    /// Renders the castling field of a FEN string from the King and Rook flags.
    pub fn castling_fen(&self) -> String {
        let mut rights = String::with_capacity(4);

        for color in Color::all() {
            let unmoved = |x, kind| {
                Square::new(x, color.home_rank())
                    .and_then(|sq| self.piece_at(sq))
                    .is_some_and(|p| p.kind == kind && p.color == color && !p.has_moved)
            };

            if !unmoved(KING_FILE, PieceKind::King) {
                continue;
            }

            let (short, long) = match color {
                Color::White => ('K', 'Q'),
                Color::Black => ('k', 'q'),
            };
            if unmoved(7, PieceKind::Rook) {
                rights.push(short);
            }
            if unmoved(0, PieceKind::Rook) {
                rights.push(long);
            }
        }

        if rights.is_empty() {
            rights.push('-');
        }
        rights
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::standard()
    }
}

impl FromStr for Position {
    type Err = GameError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..Square::SIZE).rev() {
            write!(f, "{}| ", y + 1)?;
            for x in 0..Square::SIZE {
                let c = Square::new(x, y)
                    .and_then(|sq| self.piece_at(sq))
                    .map(|p| p.char())
                    .unwrap_or('.');
                write!(f, "{c} ")?;
            }
            writeln!(f)?;
        }

        write!(f, " +")?;
        for _ in 0..Square::SIZE {
            write!(f, "--")?;
        }
        write!(f, "\n   ")?;
        for x in 0..Square::SIZE {
            write!(f, "{} ", (b'a' + x) as char)?;
        }

        Ok(())
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.placement_fen(), self.castling_fen())
    }
}

/// The layout of a board (kind and color of each cell's occupant), used to detect repeated positions.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Snapshot([Option<(Color, PieceKind)>; Square::COUNT]);

impl Snapshot {
    /// The kind and color on `square` when this snapshot was taken.
    #[inline(always)]
    pub fn at(&self, square: Square) -> Option<(Color, PieceKind)> {
        self.0[square.index()]
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layout: String = Square::iter()
            .map(|sq| match self.at(sq) {
                Some((color, kind)) => Piece::new(color, kind, sq).char(),
                None => '.',
            })
            .collect();
        write!(f, "Snapshot({layout})")
    }
}
