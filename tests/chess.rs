use pretty_assertions::assert_eq;
use rookery::chess::board::{Board, Played};
use rookery::chess::core::{CastleRights, Piece, PieceKind, Player, Promotion, Square};
use rookery::chess::game::Game;
use rookery::chess::moves::{MoveAttributes, MoveRequest};
use rookery::chess::perft::perft;
use rookery::chess::scanner::{self, Termination};
use rookery::chess::selection::SelectOutcome;

fn setup(input: &str) -> Game<Promotion> {
    Game::from_fen(input, Promotion::Queen).expect("parsing legal position: {input}")
}

fn play(game: &mut Game<Promotion>, uci: &str) -> Played {
    game.play(MoveRequest::try_from(uci).unwrap())
        .unwrap_or_else(|e| panic!("{uci} should be legal: {e}"))
}

#[test]
fn basic_moves() {
    let mut game = Game::default();
    let _ = play(&mut game, "e2e4");
    assert_eq!(
        game.board().to_string(),
        "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0"
    );
    let _ = play(&mut game, "e7e5");
    assert_eq!(
        game.board().to_string(),
        "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0"
    );
    let _ = play(&mut game, "g1f3");
    assert_eq!(
        game.board().to_string(),
        "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1"
    );
    let _ = play(&mut game, "e8e7");
    assert_eq!(
        game.board().to_string(),
        "rnbq1bnr/ppppkppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQ - 2"
    );
}

#[test]
fn promotion_moves() {
    let mut game = setup("2n4k/1PP5/6K1/3Pp1Q1/3N4/3P4/P3R3/8 w - - 0 1");
    let played = play(&mut game, "b7c8q");
    assert_eq!(
        game.board().to_string(),
        "2Q4k/2P5/6K1/3Pp1Q1/3N4/3P4/P3R3/8 b - - 0"
    );
    assert!(played
        .attributes
        .contains(MoveAttributes::PROMOTION | MoveAttributes::CAPTURE));
    assert_eq!(played.terminal, Some(Termination::Checkmate));
    assert_eq!(game.winner(), Some(Player::White));
}

#[test]
fn underpromotion() {
    let mut game = setup("2n4k/1PP5/6K1/3Pp1Q1/3N4/3P4/P3R3/8 w - - 0 1");
    let played = play(&mut game, "b7b8n");
    assert_eq!(played.promotion, Some(Promotion::Knight));
    assert_eq!(
        game.board().piece_at(Square::B8),
        Some(Piece::new(Player::White, PieceKind::Knight))
    );
    assert_eq!(game.board().pieces(Player::White).len(), 9);
    game.board().assert_consistent();
}

#[test]
fn castling_reset() {
    let mut game = setup("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
    let _ = play(&mut game, "a1a8");
    assert_eq!(game.board().to_string(), "R3k2r/8/8/8/8/8/8/4K2R b Kk - 0");
}

#[test]
fn kingside_castle() {
    let mut game = setup("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 5");
    assert_eq!(
        game.select_square(Square::E1).unwrap(),
        SelectOutcome::Selected(Square::E1)
    );
    assert!(game.board().is_highlighted(Square::G1));
    assert!(game.board().is_highlighted(Square::C1));
    let SelectOutcome::Moved(played) = game.select_square(Square::G1).unwrap() else {
        panic!("castling should be played");
    };
    assert!(played.attributes.contains(MoveAttributes::KINGSIDE_CASTLE));
    assert_eq!(
        game.board().piece_at(Square::F1),
        Some(Piece::new(Player::White, PieceKind::Rook))
    );
    assert_eq!(
        game.board().piece_at(Square::G1),
        Some(Piece::new(Player::White, PieceKind::King))
    );
    assert_eq!(game.board().piece_at(Square::H1), None);
    assert_eq!(game.board().castle_rights(), CastleRights::BLACK_BOTH);
    // Castling is irreversible.
    assert_eq!(game.board().halfmove_clock(), 0);
    assert_eq!(game.board().to_string(), "r3k2r/8/8/8/8/8/8/R4RK1 b kq - 0");
}

#[test]
fn queenside_castle() {
    let mut game = setup("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0");
    let played = play(&mut game, "e8c8");
    assert!(played.attributes.contains(MoveAttributes::QUEENSIDE_CASTLE));
    assert_eq!(game.board().to_string(), "2kr3r/8/8/8/8/8/8/R3K2R w KQ - 0");
}

#[test]
fn rook_move_drops_one_right() {
    let mut game = setup("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0");
    let _ = play(&mut game, "h1h2");
    assert_eq!(game.board().castle_rights().to_string(), "Qkq");
    let _ = play(&mut game, "a8a7");
    assert_eq!(game.board().castle_rights().to_string(), "Qk");
    // Coming back does not restore the right.
    let _ = play(&mut game, "h2h1");
    assert!(!game.board().castle_rights().contains(CastleRights::WHITE_SHORT));
}

#[test]
fn en_passant() {
    let mut game = Game::default();
    for uci in ["e2e4", "a7a6", "e4e5", "d7d5"] {
        let _ = play(&mut game, uci);
    }
    assert_eq!(game.board().en_passant_square(), Some(Square::D6));
    let played = play(&mut game, "e5d6");
    assert!(played
        .attributes
        .contains(MoveAttributes::EN_PASSANT | MoveAttributes::CAPTURE));
    assert_eq!(game.board().piece_at(Square::D5), None);
    assert_eq!(
        game.board().to_string(),
        "rnbqkbnr/1pp1pppp/p2P4/8/8/8/PPPP1PPP/RNBQKBNR b KQkq - 0"
    );
    assert_eq!(game.board().pieces(Player::Black).len(), 15);
}

#[test]
fn en_passant_expires() {
    let mut game = Game::default();
    for uci in ["e2e4", "a7a6", "e4e5", "d7d5", "h2h3", "h7h6"] {
        let _ = play(&mut game, uci);
    }
    assert_eq!(game.board().en_passant_square(), None);
    assert!(game
        .play(MoveRequest::try_from("e5d6").unwrap())
        .is_err());
}

#[test]
fn threefold_repetition() {
    let mut game = Game::default();
    let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
    for uci in shuffle {
        assert_eq!(play(&mut game, uci).terminal, None);
    }
    for uci in &shuffle[..3] {
        assert_eq!(play(&mut game, uci).terminal, None);
    }
    assert_eq!(
        play(&mut game, "f6g8").terminal,
        Some(Termination::ThreefoldRepetition)
    );
    assert_eq!(game.terminal(), Some(Termination::ThreefoldRepetition));
    assert!(game.terminal().is_some_and(Termination::is_draw));
    assert!(game.play(MoveRequest::try_from("e2e4").unwrap()).is_err());
}

#[test]
fn insufficient_material() {
    let game = setup("k7/8/8/8/8/8/8/KN6 w - - 0");
    assert_eq!(game.terminal(), Some(Termination::InsufficientMaterial));

    // Opposite colored bishops can still mate.
    let game = setup("k7/8/8/8/8/8/8/KBB5 w - - 0");
    assert_eq!(game.terminal(), None);

    // The last capture leaves bare kings.
    let mut game = setup("k7/8/8/8/8/8/1r6/K7 w - - 0");
    assert_eq!(
        play(&mut game, "a1b2").terminal,
        Some(Termination::InsufficientMaterial)
    );
}

#[test]
fn fifty_move_rule() {
    let mut game = setup("7k/p4n2/8/8/8/1b6/P4N2/7K w - - 48");
    assert_eq!(play(&mut game, "f2d3").terminal, None);
    assert_eq!(play(&mut game, "f7d6").terminal, Some(Termination::FiftyMoveRule));

    // A pawn move resets the clock.
    let mut game = setup("7k/p4n2/8/8/8/1b6/P4N2/7K w - - 48");
    let _ = play(&mut game, "a2a3");
    assert_eq!(game.board().halfmove_clock(), 0);
}

#[test]
fn checkmate_takes_precedence() {
    // The mate is delivered with the 50th reversible move.
    let mut game = setup("k7/8/K7/8/8/8/8/1Q6 w - - 49");
    assert_eq!(play(&mut game, "b1b7").terminal, Some(Termination::Checkmate));
}

#[test]
fn stalemate() {
    let mut game = setup("k7/8/K7/8/8/8/8/1Q6 w - - 0");
    assert_eq!(play(&mut game, "b1b6").terminal, Some(Termination::Stalemate));
    assert_eq!(game.winner(), None);
    assert!(game.legal_moves().is_empty());
}

#[test]
fn scratch_probing_leaves_board_intact() {
    let game = setup("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
    let before = game.board().clone();
    let _ = scanner::legal_moves(game.board());
    assert_eq!(game.board().to_string(), before.to_string());
    assert_eq!(game.board().state(), before.state());
    game.board().assert_consistent();
}

#[test]
fn starting_position_constants() {
    let board = Board::starting();
    assert_eq!(scanner::legal_moves(&board).len(), 20);
    assert!(Board::is_inside_board(0, 0));
    assert!(Board::is_inside_board(7, 7));
    assert!(!Board::is_inside_board(-1, 3));
    assert!(!Board::is_inside_board(3, 8));
}

#[test]
fn perft_starting_position() {
    let board = Board::starting();
    assert_eq!(perft(&board, 0), 1);
    assert_eq!(perft(&board, 1), 20);
    assert_eq!(perft(&board, 2), 400);
    assert_eq!(perft(&board, 3), 8902);
}

// Positions from https://www.chessprogramming.org/Perft_Results.

// Position 2.
#[test]
fn perft_kiwipete() {
    let game = setup("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
    assert_eq!(perft(game.board(), 1), 48);
    assert_eq!(perft(game.board(), 2), 2039);
}

// Position 3.
#[test]
fn perft_endgame() {
    let game = setup("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1");
    assert_eq!(perft(game.board(), 1), 14);
    assert_eq!(perft(game.board(), 2), 191);
    assert_eq!(perft(game.board(), 3), 2812);
}

// Position 4.
#[test]
fn perft_complex() {
    let game = setup("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1");
    assert_eq!(perft(game.board(), 1), 6);
    assert_eq!(perft(game.board(), 2), 264);
    // Mirrored.
    let game = setup("r2q1rk1/pP1p2pp/Q4n2/bbp1p3/Np6/1B3NBn/pPPP1PPP/R3K2R b KQ - 0 1");
    assert_eq!(perft(game.board(), 1), 6);
    assert_eq!(perft(game.board(), 2), 264);
}

// Position 5.
#[test]
fn perft_fifth() {
    let game = setup("rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8");
    assert_eq!(perft(game.board(), 1), 44);
    assert_eq!(perft(game.board(), 2), 1486);
}

// Position 6.
#[test]
fn perft_sixth() {
    let game = setup("r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10");
    assert_eq!(perft(game.board(), 1), 46);
    assert_eq!(perft(game.board(), 2), 2079);
}

// This test is very expensive in the Debug setting: disable it by default.
#[ignore]
#[test]
fn perft_deep() {
    assert_eq!(perft(&Board::starting(), 4), 197_281);
    let game = setup("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
    assert_eq!(perft(game.board(), 3), 97862);
    let game = setup("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1");
    assert_eq!(perft(game.board(), 4), 43238);
    let game = setup("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1");
    assert_eq!(perft(game.board(), 3), 9467);
    let game = setup("rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8");
    assert_eq!(perft(game.board(), 3), 62379);
    let game = setup("r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10");
    assert_eq!(perft(game.board(), 3), 89890);
}
