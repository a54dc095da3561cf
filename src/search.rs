/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use anyhow::Result;
use tracing::info;

use crate::{
    Color, Evaluator, Game, GameResult, Move, PieceKind, Position, Score, DEFAULT_DEPTH,
};

/// The result of a search, containing the best move found, score, and total nodes searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchResult {
    /// Number of nodes searched.
    pub nodes: u64,

    /// Best move found during the search, or `None` if the side to move has no legal move.
    pub bestmove: Option<Move>,

    /// Evaluation of the position after `bestmove` is made, from White's point of view.
    pub score: Score,
}

/// Configuration variables for executing a [`Search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// How many plies to look ahead. Searches always look at least one ply ahead.
    pub depth: usize,
}

impl Default for SearchConfig {
    #[inline(always)]
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
        }
    }
}

/// Executes a fixed-depth minimax search with alpha-beta pruning on a live [`Position`].
///
/// Moves are played on the position and taken back in place; the position is exactly as it was when the search returns,
/// whether it succeeded or not. White maximizes the score and Black minimizes it.
pub struct Search<'a, E> {
    position: &'a mut Position,

    evaluator: &'a mut E,

    config: SearchConfig,

    nodes: u64,
}

impl<'a, E: Evaluator> Search<'a, E> {
    /// Construct a new [`Search`] instance to execute on the provided [`Position`].
    #[inline(always)]
    pub fn new(position: &'a mut Position, evaluator: &'a mut E, config: SearchConfig) -> Self {
        Self {
            position,
            evaluator,
            config,
            nodes: 0,
        }
    }

    /// Start the search for `color`, returning its results if the search was successful.
    ///
    /// Among the root moves, the first one found with the best score is kept.
    pub fn start(mut self, color: Color) -> Result<SearchResult> {
        let depth = self.config.depth.max(1);
        let moves = self.candidates(color)?;

        let mut res = SearchResult {
            nodes: 0,
            bestmove: None,
            score: if color.is_white() {
                -Score::INF
            } else {
                Score::INF
            },
        };

        if moves.is_empty() {
            res.score = self.terminal(color);
        }

        let mut alpha = -Score::INF;
        let mut beta = Score::INF;

        for mv in moves {
            let score = self.score_move(mv, color.opponent(), depth - 1, alpha, beta)?;

            let improves = if color.is_white() {
                score > res.score
            } else {
                score < res.score
            };

            // The first move is always kept, whatever the evaluator's range
            if res.bestmove.is_none() || improves {
                res.score = score;
                res.bestmove = Some(mv);
            }

            if color.is_white() {
                alpha = alpha.max(score);
            } else {
                beta = beta.min(score);
            }
        }

        res.nodes = self.nodes;

        info!(
            "Searched {} for {color} at depth {depth}: bestmove {} score {:?} nodes {}",
            self.position.placement_fen(),
            res.bestmove
                .map_or_else(|| String::from("(none)"), |mv| mv.to_string()),
            res.score,
            res.nodes,
        );

        Ok(res)
    }

    /// Plays `mv`, searches the resulting position with `color` to move, and takes `mv` back.
    ///
    /// The move is always taken back before any error from below is returned.
    fn score_move(
        &mut self,
        mv: Move,
        color: Color,
        depth: usize,
        alpha: Score,
        beta: Score,
    ) -> Result<Score> {
        let undo = self.position.make(mv.from, mv.to, mv.promotion)?;
        let score = self.minimax(color, depth, alpha, beta);
        self.position.unmake(undo)?;
        score
    }

    /// Primary location of search logic.
    ///
    /// Uses the [minimax](https://www.chessprogramming.org/Minimax) algorithm with [alpha-beta](https://www.chessprogramming.org/Alpha-Beta) pruning.
    fn minimax(
        &mut self,
        color: Color,
        depth: usize,
        mut alpha: Score,
        mut beta: Score,
    ) -> Result<Score> {
        self.nodes += 1;

        // If we've reached a terminal node, evaluate the position
        if depth == 0 {
            if !self.position.has_legal_move(color)? {
                return Ok(self.terminal(color));
            }
            return self.evaluator.evaluate(self.position);
        }

        let moves = self.candidates(color)?;

        // If there are no legal moves, it's either mate or a draw.
        if moves.is_empty() {
            return Ok(self.terminal(color));
        }

        if color.is_white() {
            let mut best = -Score::INF;
            for mv in moves {
                let score = self.score_move(mv, color.opponent(), depth - 1, alpha, beta)?;
                best = best.max(score);
                alpha = alpha.max(best);
                if beta <= alpha {
                    break;
                }
            }
            Ok(best)
        } else {
            let mut best = Score::INF;
            for mv in moves {
                let score = self.score_move(mv, color.opponent(), depth - 1, alpha, beta)?;
                best = best.min(score);
                beta = beta.min(best);
                if beta <= alpha {
                    break;
                }
            }
            Ok(best)
        }
    }

    /// Score of a node where `color` has no legal move.
    fn terminal(&self, color: Color) -> Score {
        if self.position.in_check(color) {
            Score::mated(color)
        } else {
            Score::DRAW
        }
    }

    /// The moves searched for `color`. Promotions inside the search are always to a Queen.
    fn candidates(&mut self, color: Color) -> GameResult<Vec<Move>> {
        let mut moves = self.position.all_legal_moves(color)?;
        moves.retain(|mv| mv.promotion.map_or(true, |kind| kind == PieceKind::Queen));
        Ok(moves)
    }
}

/// Finds the best move for `color` on `position`, looking `depth` plies ahead.
///
/// Returns `None` if `color` has no legal move.
pub fn best_move(
    position: &mut Position,
    color: Color,
    depth: usize,
    evaluator: &mut impl Evaluator,
) -> Result<Option<Move>> {
    let res = Search::new(position, evaluator, SearchConfig { depth }).start(color)?;
    Ok(res.bestmove)
}

impl Game {
    /// Searches the current position for the side to move.
    ///
    /// Nothing about the game changes; use [`Game::apply_move`] to play the result.
    pub fn search(
        &mut self,
        config: SearchConfig,
        evaluator: &mut impl Evaluator,
    ) -> Result<SearchResult> {
        let color = self.side_to_move();
        let position = self.position_mut()?;
        Search::new(position, evaluator, config).start(color)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::bail;

    use super::*;
    use crate::{MaterialEvaluator, FEN_KIWIPETE};

    fn search(fen: &str, depth: usize) -> SearchResult {
        let mut game = Game::from_fen(fen).unwrap();
        game.search(SearchConfig { depth }, &mut MaterialEvaluator)
            .unwrap()
    }

    #[test]
    fn test_white_mate_in_1() {
        let fen = "k7/8/KQ6/8/8/8/8/8 w - - 0 1";
        let res = search(fen, 2);
        assert_eq!(res.score, Score::MATE);

        let mut game = Game::from_fen(fen).unwrap();
        game.apply_move(res.bestmove.unwrap()).unwrap();
        assert!(game.is_checkmate().unwrap());
    }

    #[test]
    fn test_black_mated_in_1() {
        let res = search("1k6/8/KQ6/2Q5/8/8/8/8 b - - 0 1", 3);
        assert_eq!(res.score, Score::MATE);
        assert_eq!(res.bestmove.unwrap().to_string(), "b8a8");
    }

    #[test]
    fn test_stalemate() {
        let res = search("k7/8/KQ6/8/8/8/8/8 b - - 0 1", 2);
        assert!(res.bestmove.is_none());
        assert_eq!(res.score, Score::DRAW);
    }

    #[test]
    fn test_takes_free_rook() {
        let res = search("4k3/8/8/3r4/8/8/3Q4/4K3 w - - 0 1", 1);
        assert_eq!(res.bestmove.unwrap().to_string(), "d2d5");
        assert_eq!(res.score, Score(900));
    }

    #[test]
    fn test_depth_zero_is_clamped() {
        let res = search("4k3/8/8/3r4/8/8/3Q4/4K3 w - - 0 1", 0);
        assert_eq!(res.bestmove.unwrap().to_string(), "d2d5");
    }

    #[test]
    fn test_scores_beyond_mate_range() {
        for (color, score) in [(Color::White, -40_000), (Color::Black, 40_000)] {
            let mut position = Position::standard();
            let mut eval = |_: &Position| -> Result<Score> { Ok(Score(score)) };

            let res = Search::new(&mut position, &mut eval, SearchConfig { depth: 2 })
                .start(color)
                .unwrap();
            assert!(res.bestmove.is_some(), "{color} has 20 moves to choose from");
            assert_eq!(res.score, Score(score));
        }

        // Even the extremes of the window still yield a move
        let mut position = Position::standard();
        let mut eval = |_: &Position| -> Result<Score> { Ok(Score::INF) };
        let mv = best_move(&mut position, Color::Black, 1, &mut eval).unwrap();
        assert!(mv.is_some());
    }

    #[test]
    fn test_search_leaves_position_untouched() {
        let mut position = Position::from_fen(FEN_KIWIPETE).unwrap();
        let original = position.clone();

        best_move(&mut position, Color::White, 2, &mut MaterialEvaluator).unwrap();
        assert_eq!(position, original);
    }

    #[test]
    fn test_evaluator_errors_propagate_and_restore() {
        let mut position = Position::standard();
        let original = position.clone();

        let mut failing = |_: &Position| -> Result<Score> { bail!("evaluator offline") };
        let err = best_move(&mut position, Color::White, 2, &mut failing).unwrap_err();

        assert_eq!(err.to_string(), "evaluator offline");
        assert_eq!(position, original);
    }

    #[test]
    fn test_search_refuses_while_promotion_pending() {
        let mut game = Game::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        game.apply("a7".parse().unwrap(), "a8".parse().unwrap())
            .unwrap();
        assert!(game
            .search(SearchConfig::default(), &mut MaterialEvaluator)
            .is_err());
    }
}
