/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use gambit::{CastleSide, Color, Game, GameError, GameStatus, Move, PieceKind, Square};

fn sq(s: &str) -> Square {
    s.parse().unwrap()
}

fn play(game: &mut Game, moves: &[&str]) -> Vec<String> {
    moves
        .iter()
        .map(|mv| {
            let mv: Move = mv.parse().unwrap();
            game.apply_move(mv)
                .unwrap_or_else(|e| panic!("{mv} should be legal: {e}"))
                .san
                .clone()
        })
        .collect()
}

#[test]
fn test_scripted_opening() {
    let mut game = Game::default();
    let sans = play(
        &mut game,
        &[
            "e2e4", "e7e5", "g1f3", "b8c6", "f1b5", "a7a6", "b5c6", "d7c6", "e1g1",
        ],
    );

    assert_eq!(
        sans,
        ["e4", "e5", "Nf3", "Nc6", "Bb5", "a6", "Bxc6", "dxc6", "O-O"]
    );
    assert!(game.history().iter().all(|record| !record.is_check));
    assert_eq!(game.side_to_move(), Color::Black);
    assert_eq!(game.history().last().unwrap().castle, Some(CastleSide::Short));
    assert_eq!(
        game.to_fen(),
        "r1bqkbnr/1pp2ppp/p1p5/4p3/4P3/5N2/PPPP1PPP/RNBQ1RK1 b kq - 1 5"
    );
}

#[test]
fn test_en_passant_window() {
    let mut game = Game::default();
    play(&mut game, &["e2e4", "a7a6", "e4e5", "d7d5"]);
    assert!(game.legal_moves_from(sq("e5")).unwrap().contains(&sq("d6")));

    let record = game.apply(sq("e5"), sq("d6")).unwrap();
    assert_eq!(record.san, "exd6");
    assert_eq!(record.captured.unwrap().square, sq("d5"));
    assert!(game.position().is_empty(sq("d5")));

    // The chance is gone once another move has been played
    let mut game = Game::default();
    play(&mut game, &["e2e4", "a7a6", "e4e5", "d7d5", "g1f3", "a6a5"]);
    assert_eq!(
        game.apply(sq("e5"), sq("d6")).unwrap_err(),
        GameError::IllegalMove {
            from: sq("e5"),
            to: sq("d6")
        }
    );
}

#[test]
fn test_castling_both_sides() {
    let mut game = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    let targets = game.legal_moves_from(sq("e1")).unwrap();
    assert!(targets.contains(&sq("g1")));
    assert!(targets.contains(&sq("c1")));

    let sans = play(&mut game, &["e1g1", "e8c8"]);
    assert_eq!(sans, ["O-O", "O-O-O"]);
    assert_eq!(
        game.position().piece_at(sq("f1")).unwrap().kind(),
        PieceKind::Rook
    );
    assert_eq!(
        game.position().piece_at(sq("d8")).unwrap().kind(),
        PieceKind::Rook
    );
    assert!(game.position().is_empty(sq("h1")));
    assert!(game.position().is_empty(sq("a8")));
}

#[test]
fn test_castling_lost_after_rook_moves() {
    let mut game = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    play(&mut game, &["h1h2", "a8a7", "h2h1", "a7a8"]);

    let targets = game.legal_moves_from(sq("e1")).unwrap();
    assert!(!targets.contains(&sq("g1")));
    assert!(targets.contains(&sq("c1")));
    assert!(game.to_fen().contains(" Qk "));
}

#[test]
fn test_castling_lost_after_king_moves() {
    let mut game = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    play(&mut game, &["e1f1", "a8b8", "f1e1", "b8a8"]);

    let targets = game.legal_moves_from(sq("e1")).unwrap();
    assert!(!targets.contains(&sq("g1")));
    assert!(!targets.contains(&sq("c1")));
    assert!(game.to_fen().contains(" k "));

    // Black still keeps its short castle
    play(&mut game, &["a1a2"]);
    assert!(game.legal_moves_from(sq("e8")).unwrap().contains(&sq("g8")));
}

#[test]
fn test_disambiguation() {
    for (mv, san) in [("b1c3", "Nbc3"), ("d1c3", "Ndc3")] {
        let mut game = Game::from_fen("4k3/p7/8/8/8/8/8/1N1NK3 w - - 0 1").unwrap();
        assert_eq!(play(&mut game, &[mv]), [san]);
    }

    let mut game = Game::from_fen("4k3/8/8/R7/8/8/8/R3K3 w - - 0 1").unwrap();
    assert_eq!(play(&mut game, &["a1a3"]), ["R1a3"]);

    // Only one Knight can reach d2, so no disambiguation is needed
    let mut game = Game::from_fen("4k3/p7/8/8/8/8/8/1N1NK3 w - - 0 1").unwrap();
    assert_eq!(play(&mut game, &["b1d2"]), ["Nd2"]);
}

#[test]
fn test_insufficient_material() {
    for fen in [
        "4k3/8/8/8/8/8/8/4K3 w - - 0 1",
        "4k3/8/8/8/8/8/8/4KN2 w - - 0 1",
        "4kb2/8/8/8/8/8/8/4K3 w - - 0 1",
        "4kb2/8/8/8/8/8/8/4KN2 w - - 0 1",
        "4k3/8/8/8/8/8/8/3NKN2 w - - 0 1",
    ] {
        let mut game = Game::from_fen(fen).unwrap();
        assert_eq!(
            game.status().unwrap(),
            GameStatus::InsufficientMaterial,
            "{fen}"
        );
        assert!(game.is_draw().unwrap());
    }

    for fen in [
        "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1",
        "4k3/8/8/8/8/8/8/3RK3 w - - 0 1",
        "4k3/8/8/8/8/8/8/2BBK3 w - - 0 1",
    ] {
        let mut game = Game::from_fen(fen).unwrap();
        assert_eq!(game.status().unwrap(), GameStatus::Ongoing, "{fen}");
        assert!(!game.is_draw().unwrap());
    }
}

#[test]
fn test_checkmate_means_no_legal_moves() {
    let mut game = Game::from_fen("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1").unwrap();
    assert!(game.legal_moves().unwrap().is_empty());
    assert!(game.is_checkmate().unwrap());
    assert_eq!(
        game.status().unwrap(),
        GameStatus::Checkmate {
            winner: Color::White
        }
    );

    // Free the King and it is no longer mate
    let mut game = Game::from_fen("R5k1/5pp1/8/8/8/8/8/6K1 b - - 0 1").unwrap();
    assert!(!game.legal_moves().unwrap().is_empty());
    assert_eq!(game.status().unwrap(), GameStatus::Check);
}

#[test]
fn test_capture_promotion_flow() {
    let mut game = Game::from_fen("1r2k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    let record = game.apply(sq("a7"), sq("b8")).unwrap();
    assert!(record.is_promoting);
    assert!(record.is_capture());
    assert_eq!(
        game.status().unwrap_err(),
        GameError::AwaitingPromotion(sq("b8"))
    );

    let record = game.resolve_promotion(PieceKind::Knight).unwrap();
    assert_eq!(record.san, "axb8=N");
    assert_eq!(record.as_move().to_string(), "a7b8n");
    assert_eq!(game.side_to_move(), Color::Black);
    assert_eq!(game.to_fen(), "1N2k3/8/8/8/8/8/8/4K3 b - - 0 1");
}

#[test]
fn test_threefold_repetition() {
    let shuffle = [
        "g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8", "g1f3",
    ];

    let mut game = Game::default();
    play(&mut game, &shuffle[..8]);
    assert!(!game.is_threefold_repetition());

    play(&mut game, &shuffle[8..]);
    assert!(game.is_threefold_repetition());
    assert_eq!(game.status().unwrap(), GameStatus::ThreefoldRepetition);

    // Repeats spread further apart than the window are not noticed
    let mut game = Game::default();
    game.set_repetition_window(Some(4));
    play(&mut game, &shuffle);
    assert!(!game.is_threefold_repetition());
}

#[test]
fn test_moving_out_of_turn_is_rejected() {
    let mut game = Game::default();
    assert_eq!(
        game.apply(sq("e7"), sq("e5")).unwrap_err(),
        GameError::WrongSide {
            square: sq("e7"),
            color: Color::White
        }
    );
    assert!(game.history().is_empty());
}
