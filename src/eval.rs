/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use anyhow::Result;

use crate::{Color, PieceKind, Position, Score, Square};

/// Anything that can score a chess position.
///
/// A high score is good for White, and a low score is good for Black, regardless of whose turn it is.
/// Scores should stay well inside `±`[`Score::MATE`], which the search reserves for checkmate.
///
/// Evaluation may fail (for example, if it calls out to a model). The search passes such errors straight back to its caller.
pub trait Evaluator {
    /// Scores `position` from White's point of view.
    fn evaluate(&mut self, position: &Position) -> Result<Score>;
}

impl<F> Evaluator for F
where
    F: FnMut(&Position) -> Result<Score>,
{
    #[inline(always)]
    fn evaluate(&mut self, position: &Position) -> Result<Score> {
        self(position)
    }
}

/// Scores a position by adding up the material on the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterialEvaluator;

impl MaterialEvaluator {
    /// Sum of every piece's value, White's counted positively and Black's negatively.
    pub fn material(position: &Position) -> Score {
        position
            .iter()
            .fold(Score::DRAW, |score, (_, piece)| {
                score + value_of(piece.kind()) * piece.color().negation_multiplier()
            })
    }
}

impl Evaluator for MaterialEvaluator {
    #[inline(always)]
    fn evaluate(&mut self, position: &Position) -> Result<Score> {
        Ok(Self::material(position))
    }
}

/// Returns a value of the provided `PieceKind`.
///
/// Values are obtained from here: <https://www.chessprogramming.org/Simplified_Evaluation_Function>
#[inline(always)]
pub const fn value_of(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::Pawn => 100,
        PieceKind::Knight => 320,
        PieceKind::Bishop => 330,
        PieceKind::Rook => 500,
        PieceKind::Queen => 900,
        PieceKind::King => 0, // King is invaluable, but 0 is easier to work with in computations
    }
}

/// A printable breakdown of a material evaluation, showing what every piece contributes.
#[derive(Debug, Clone, Copy)]
pub struct EvalReport<'a> {
    position: &'a Position,
}

impl<'a> EvalReport<'a> {
    #[inline(always)]
    pub fn new(position: &'a Position) -> Self {
        Self { position }
    }

    /// Fetches the value for the piece on the specified square, if one exists.
    #[inline(always)]
    fn value_at(&self, square: Square) -> Option<Score> {
        self.position
            .piece_at(square)
            .map(|piece| Score(value_of(piece.kind()) * piece.color().negation_multiplier()))
    }
}

impl fmt::Display for EvalReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let squares = |y| (0..Square::SIZE).filter_map(move |x| Square::new(x, y));

        write!(f, "  +")?;
        for _ in 0..Square::SIZE {
            write!(f, "-----+")?;
        }
        writeln!(f)?;
        for y in (0..Square::SIZE).rev() {
            write!(f, "{} |", y + 1)?;

            // Step 1: Write the piece char
            for square in squares(y) {
                let piece_char = self.position.piece_at(square).map_or(' ', |p| p.char());
                write!(f, "  {piece_char}  |")?;
            }
            writeln!(f)?;
            write!(f, "  |")?;

            // Step 2: Write the contribution of that piece
            for square in squares(y) {
                let score = match self.value_at(square) {
                    Some(val) if val > Score::DRAW => {
                        format!("{:^5}", format!("+{}", val.normalize()))
                    }
                    Some(val) => format!("{:^5}", val.normalize()),
                    None => String::from("     "),
                };
                write!(f, "{score}|")?;
            }
            writeln!(f)?;

            write!(f, "  +")?;
            for _ in 0..Square::SIZE {
                write!(f, "-----+")?;
            }
            writeln!(f)?;
        }
        for x in 0..Square::SIZE {
            write!(f, "     {}", (b'a' + x) as char)?;
        }

        let score = MaterialEvaluator::material(self.position);
        let winning_side = if score > Score::DRAW {
            Some(Color::White)
        } else if score < Score::DRAW {
            Some(Color::Black)
        } else {
            None
        };

        writeln!(f)?;
        writeln!(
            f,
            "\nWinning side: {}",
            winning_side.map(|c| c.name()).unwrap_or("N/A")
        )?;
        write!(f, "Score: {score}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_is_balanced_at_start() {
        let mut eval = MaterialEvaluator;
        assert_eq!(eval.evaluate(&Position::standard()).unwrap(), Score::DRAW);
    }

    #[test]
    fn test_material_favors_white_positive() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
        assert_eq!(MaterialEvaluator::material(&pos), Score(900));

        let pos = Position::from_fen("3rk3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(MaterialEvaluator::material(&pos), Score(-500));
    }

    #[test]
    fn test_closures_are_evaluators() {
        let mut calls = 0;
        let mut eval = |_: &Position| -> Result<Score> {
            calls += 1;
            Ok(Score(42))
        };
        assert_eq!(eval.evaluate(&Position::standard()).unwrap(), Score(42));
        drop(eval);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_report_mentions_score() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
        let report = EvalReport::new(&pos).to_string();
        assert!(report.contains("+9"));
        assert!(report.ends_with("Score: 900"));
    }
}
