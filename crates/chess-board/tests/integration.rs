//! Integration tests for the chess-board crate.
//!
//! These drive the board through complete games over the public API:
//! UCI parsing, the push/pop stack, rights bookkeeping, and the
//! game-end rules working together.

use chess_board::{Board, MoveError};
use chess_core::{Color, Move, Outcome, Square, Termination};
use proptest::prelude::*;

#[test]
fn fools_mate_ends_in_checkmate() {
    // 1. f3 e5 2. g4?? Qh4#
    let mut board = Board::new();
    for m in ["f2f3", "e7e5", "g2g4"] {
        board.push_uci(m).unwrap();
        assert!(!board.is_game_over(false), "game ended early after {m}");
    }
    board.push_uci("d8h4").unwrap();

    assert!(board.is_check());
    assert!(board.is_checkmate());
    assert_eq!(
        board.outcome(false),
        Some(Outcome::new(Termination::Checkmate, Some(Color::Black)))
    );
    assert_eq!(board.result(false), "0-1");
    assert_eq!(
        board.fen(),
        "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3"
    );
}

#[test]
fn scholars_mate_walkthrough() {
    // 1. e4 e5 2. Qh5 Nc6 3. Bc4 Nf6?? 4. Qxf7#
    let moves = ["e2e4", "e7e5", "d1h5", "b8c6", "f1c4", "g8f6", "h5f7"];
    let mut board = Board::new();
    for (i, m) in moves.iter().enumerate() {
        assert_eq!(board.ply(), i as u32);
        let played = board.push_uci(m).unwrap();
        assert_eq!(board.peek(), Some(played));
    }

    assert!(board.is_checkmate(), "Qxf7 should be mate");
    assert_eq!(
        board.outcome(false),
        Some(Outcome::new(Termination::Checkmate, Some(Color::White)))
    );
    assert_eq!(board.result(false), "1-0");

    // The queen sits on f7, defended by the c4 bishop.
    assert!(board.is_capture(Move::from_uci("e8f7").unwrap()));
    assert!(!board.is_legal(Move::from_uci("e8f7").unwrap()));
}

#[test]
fn en_passant_window_opens_and_closes() {
    // 1. e4 a6 2. e5 d5 gives White exactly one chance to take en
    // passant.
    let mut board = Board::new();
    for m in ["e2e4", "a7a6", "e4e5", "d7d5"] {
        board.push_uci(m).unwrap();
    }
    assert_eq!(board.ep_square(), Some(Square::from_algebraic("d6").unwrap()));
    assert!(board.has_legal_en_passant());
    assert_eq!(board.parse_uci("e5d6"), Ok(Move::from_uci("e5d6").unwrap()));

    // Declining closes the window for good.
    board.push_uci("b1c3").unwrap();
    board.push_uci("a6a5").unwrap();
    assert_eq!(board.ep_square(), None);
    assert!(matches!(
        board.parse_uci("e5d6"),
        Err(MoveError::Illegal(_, _))
    ));
}

#[test]
fn both_sides_castle_in_an_italian_game() {
    // 1. e4 e5 2. Nf3 Nc6 3. Bc4 Bc5 4. O-O Nf6 5. h3 O-O
    let mut board = Board::new();
    for m in ["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "f8c5"] {
        board.push_uci(m).unwrap();
    }
    assert!(board.has_kingside_castling_rights(Color::White));

    board.push_uci("e1g1").unwrap();
    assert!(!board.has_castling_rights(Color::White));
    assert!(board.has_castling_rights(Color::Black));

    for m in ["g8f6", "h2h3", "e8g8"] {
        board.push_uci(m).unwrap();
    }
    assert!(!board.has_castling_rights(Color::Black));

    let white_king = board.king(Color::White).unwrap();
    let black_king = board.king(Color::Black).unwrap();
    assert_eq!(white_king.to_algebraic(), "g1");
    assert_eq!(black_king.to_algebraic(), "g8");
    assert_eq!(
        board.piece_type_at(Square::from_algebraic("f1").unwrap()),
        Some(chess_core::PieceType::Rook)
    );
    assert_eq!(
        board.piece_type_at(Square::from_algebraic("f8").unwrap()),
        Some(chess_core::PieceType::Rook)
    );
}

#[test]
fn fifty_move_claim_becomes_available() {
    let mut board = Board::from_fen("8/5k2/8/8/8/8/3K4/7R w - - 98 60").unwrap();
    assert!(!board.can_claim_fifty_moves());

    board.push_uci("h1h2").unwrap();
    // One quiet reply away from the limit: the claim is already valid.
    assert_eq!(board.halfmove_clock(), 99);
    assert!(board.can_claim_fifty_moves());

    board.push_uci("f7f6").unwrap();
    assert_eq!(board.halfmove_clock(), 100);
    assert!(board.is_fifty_moves());
    assert_eq!(
        board.outcome(true),
        Some(Outcome::new(Termination::FiftyMoves, None))
    );
    assert_eq!(board.outcome(false), None);
}

#[test]
fn knight_trade_leaves_insufficient_material() {
    // Knight takes knight leaves bare kings plus one knight.
    let mut board = Board::from_fen("4k3/8/8/3n4/8/4N3/8/4K3 w - - 5 40").unwrap();
    assert!(!board.is_insufficient_material());

    board.push_uci("e3d5").unwrap();
    assert!(board.is_insufficient_material());
    assert_eq!(
        board.outcome(false),
        Some(Outcome::new(Termination::InsufficientMaterial, None))
    );
    assert!(board.is_game_over(false));
}

#[test]
fn perpetual_shuffle_forces_fivefold_draw() {
    let mut board = Board::new();
    for _ in 0..4 {
        for m in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            board.push_uci(m).unwrap();
        }
    }
    // The starting position has now occurred five times.
    assert!(board.is_fivefold_repetition());
    assert_eq!(
        board.outcome(false),
        Some(Outcome::new(Termination::FivefoldRepetition, None))
    );
    assert_eq!(board.result(false), "1/2-1/2");
}

#[test]
fn move_stack_replays_to_identical_position() {
    // A Bogo-Indian with checks, a trade, and castling mixed in.
    let mut board = Board::new();
    for m in [
        "d2d4", "g8f6", "c2c4", "e7e6", "g1f3", "f8b4", "c1d2", "b4d2", "b1d2", "e8g8",
    ] {
        board.push_uci(m).unwrap();
    }

    let mut replay = Board::new();
    for m in board.move_stack().to_vec() {
        replay.push_uci(&m.to_uci()).unwrap();
    }
    assert_eq!(replay.fen(), board.fen());
    assert_eq!(replay.move_stack(), board.move_stack());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// A random walk through legal moves keeps the board consistent at
    /// every step and unwinds back to the exact starting position.
    #[test]
    fn random_legal_walk_is_reversible(
        choices in proptest::collection::vec(any::<prop::sample::Index>(), 1..60)
    ) {
        let mut board = Board::new();
        let start = board.fen();
        let mut played = 0;

        for choice in &choices {
            let moves = board.legal_moves();
            if moves.is_empty() {
                break;
            }
            let m = moves[choice.index(moves.len())];
            prop_assert!(board.is_pseudo_legal(m));
            prop_assert!(board.is_legal(m));

            board.push(m);
            played += 1;

            // Legal play never loses a king and never leaves the mover
            // in check.
            prop_assert!(!board.was_into_check());
            prop_assert!(board.king(Color::White).is_some());
            prop_assert!(board.king(Color::Black).is_some());

            // Occupancy stays partitioned between the colors.
            let white = board.base().occupied_by(Color::White);
            let black = board.base().occupied_by(Color::Black);
            prop_assert_eq!(white | black, board.base().occupied());
            prop_assert!((white & black).is_empty());

            // The emitted FEN parses back to the same position.
            let restored = Board::from_fen(&board.fen()).unwrap();
            prop_assert_eq!(restored.fen(), board.fen());
        }

        for _ in 0..played {
            board.pop();
        }
        prop_assert_eq!(board.fen(), start);
    }
}
