/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use gambit::{perft, splitperft, Game, Position, FEN_KIWIPETE};

fn test_perft_fen_nodes(depth: usize, fen: &str, expected: u64) {
    let game = Game::from_fen(fen).unwrap();
    let mut position = Position::from_fen(fen).unwrap();
    let res = perft(&mut position, game.side_to_move(), depth).unwrap();
    assert_eq!(res, expected, "PERFT({depth}) failed on {fen}");
    assert_eq!(&position, game.position(), "PERFT({depth}) changed {fen}");
}

/// https://www.chessprogramming.org/Perft_Results
#[cfg(test)]
mod standard_perfts {
    use super::*;

    const FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_standard_perft_1() {
        test_perft_fen_nodes(1, FEN, 20);
    }

    #[test]
    fn test_standard_perft_2() {
        test_perft_fen_nodes(2, FEN, 400);
    }

    #[test]
    fn test_standard_perft_3() {
        test_perft_fen_nodes(3, FEN, 8902);
    }

    #[test]
    fn test_standard_splitperft_sums_to_perft() {
        let mut position = Position::standard();
        let split = splitperft(&mut position, gambit::Color::White, 2).unwrap();
        assert_eq!(split.len(), 20);
        assert!(split.iter().all(|(_, nodes)| *nodes == 20));
        assert_eq!(split.iter().map(|(_, nodes)| nodes).sum::<u64>(), 400);
    }
}

/// https://www.chessprogramming.org/Perft_Results#Position_2
#[cfg(test)]
mod kiwipete_perfts {
    use super::*;

    const FEN: &str = FEN_KIWIPETE;

    #[test]
    fn test_kiwipete_perft_1() {
        test_perft_fen_nodes(1, FEN, 48);
    }

    #[test]
    fn test_kiwipete_perft_2() {
        test_perft_fen_nodes(2, FEN, 2039);
    }

    #[test]
    fn test_kiwipete_perft_3() {
        test_perft_fen_nodes(3, FEN, 97862);
    }
}

/// https://www.chessprogramming.org/Perft_Results#Position_3
#[cfg(test)]
mod endgame_perfts {
    use super::*;

    const FEN: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";

    #[test]
    fn test_endgame_perft_1() {
        test_perft_fen_nodes(1, FEN, 14);
    }

    #[test]
    fn test_endgame_perft_2() {
        test_perft_fen_nodes(2, FEN, 191);
    }

    #[test]
    fn test_endgame_perft_3() {
        test_perft_fen_nodes(3, FEN, 2812);
    }

    #[test]
    fn test_endgame_perft_4() {
        test_perft_fen_nodes(4, FEN, 43238);
    }
}

/// https://www.chessprogramming.org/Perft_Results#Position_4
#[cfg(test)]
mod castling_perfts {
    use super::*;

    const FEN: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";

    #[test]
    fn test_castling_perft_1() {
        test_perft_fen_nodes(1, FEN, 6);
    }

    #[test]
    fn test_castling_perft_2() {
        test_perft_fen_nodes(2, FEN, 264);
    }

    #[test]
    fn test_castling_perft_3() {
        test_perft_fen_nodes(3, FEN, 9467);
    }
}

/// https://www.chessprogramming.org/Perft_Results#Position_5
#[cfg(test)]
mod capture_promotion_perfts {
    use super::*;

    const FEN: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";

    #[test]
    fn test_capture_promotion_perft_1() {
        test_perft_fen_nodes(1, FEN, 44);
    }

    #[test]
    fn test_capture_promotion_perft_2() {
        test_perft_fen_nodes(2, FEN, 1486);
    }
}

/// https://www.chessprogramming.net/perfect-perft/
#[cfg(test)]
mod promotion_perfts {
    use super::*;

    const FEN: &str = "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1";

    #[test]
    fn test_promotion_perft_1() {
        test_perft_fen_nodes(1, FEN, 24);
    }

    #[test]
    fn test_promotion_perft_2() {
        test_perft_fen_nodes(2, FEN, 496);
    }

    #[test]
    fn test_promotion_perft_3() {
        test_perft_fen_nodes(3, FEN, 9483);
    }
}
