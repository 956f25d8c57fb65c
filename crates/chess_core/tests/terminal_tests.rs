//! Tests for game-ending conditions reported by the rules adapter
//!
//! - Checkmate
//! - Stalemate
//! - Fifty-move rule
//! - Threefold repetition
//! - Insufficient material

use chess_core::{Color, GameResult, Position, RulesEngine, Terminal};

fn terminal(fen: &str) -> Option<Terminal> {
    Position::from_fen(fen).expect("valid FEN").terminal()
}

// =============================================================================
// Checkmate / Stalemate Tests
// =============================================================================

#[test]
fn test_scholars_mate_is_checkmate() {
    let pos =
        Position::from_fen("r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4")
            .unwrap();

    assert!(pos.legal_moves().is_empty());
    assert!(pos.in_check());
    assert_eq!(pos.terminal(), Some(Terminal::Checkmate));
    assert_eq!(
        Terminal::Checkmate.result(pos.side_to_move()),
        GameResult::WhiteWins
    );
}

#[test]
fn test_check_is_not_checkmate() {
    let pos = Position::from_fen("rnbqkbnr/ppppp1pp/8/5p1Q/4P3/8/PPPP1PPP/RNB1KBNR b KQkq - 1 2")
        .unwrap();

    assert!(!pos.legal_moves().is_empty());
    assert!(pos.in_check());
    assert_eq!(pos.terminal(), None);
}

#[test]
fn test_stalemate_king_in_corner() {
    // Black king on a8, white queen on b6, white king on c7
    let pos = Position::from_fen("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1").unwrap();

    assert!(pos.legal_moves().is_empty());
    assert!(!pos.in_check(), "Stalemate means king is not in check");
    assert_eq!(pos.terminal(), Some(Terminal::Stalemate));
    assert_eq!(Terminal::Stalemate.result(Color::Black), GameResult::Draw);
}

#[test]
fn test_stalemate_king_and_pawn_endgame() {
    assert_eq!(
        terminal("6k1/6P1/6K1/8/8/8/8/8 b - - 0 1"),
        Some(Terminal::Stalemate)
    );
}

// =============================================================================
// Fifty-Move Rule Tests
// =============================================================================

#[test]
fn test_fifty_move_rule_at_100_halfmoves() {
    let pos = Position::from_fen("8/8/8/4k3/8/4K3/8/4R3 w - - 100 60").unwrap();
    assert!(pos.is_fifty_move_draw());
    assert_eq!(pos.terminal(), Some(Terminal::FiftyMoveRule));
}

#[test]
fn test_fifty_move_rule_at_99_halfmoves() {
    let pos = Position::from_fen("8/8/8/4k3/8/4K3/8/4R3 w - - 99 60").unwrap();
    assert!(!pos.is_fifty_move_draw());
    assert_eq!(pos.terminal(), None);
}

#[test]
fn test_fifty_move_rule_reset_on_pawn_move() {
    let mut pos = Position::from_fen("8/8/8/4k3/8/3K4/4P3/8 w - - 99 60").unwrap();
    let mv = pos.parse_move("e2e4").unwrap();
    pos.push(mv).unwrap();
    assert_eq!(pos.halfmove_clock(), 0);
    assert!(!pos.is_fifty_move_draw());
}

// =============================================================================
// Threefold Repetition Tests
// =============================================================================

#[test]
fn test_threefold_repetition_by_knight_shuffle() {
    let mut pos = Position::startpos();
    let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];

    for text in shuffle {
        let mv = pos.parse_move(text).unwrap();
        pos.push(mv).unwrap();
    }
    // start position seen twice so far
    assert!(!pos.is_threefold_repetition());
    assert_eq!(pos.terminal(), None);

    for text in shuffle {
        let mv = pos.parse_move(text).unwrap();
        pos.push(mv).unwrap();
    }
    assert!(pos.is_threefold_repetition());
    assert_eq!(pos.terminal(), Some(Terminal::ThreefoldRepetition));

    // taking a move back leaves the repetition
    pos.pop();
    assert_eq!(pos.terminal(), None);
}

#[test]
fn test_position_hash_ignores_move_counters() {
    let pos1 =
        Position::from_fen("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3")
            .unwrap();
    let pos2 =
        Position::from_fen("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 6 5")
            .unwrap();
    assert_eq!(pos1.hash(), pos2.hash());
}

// =============================================================================
// Insufficient Material Tests
// =============================================================================

#[test]
fn test_insufficient_material_king_vs_king() {
    assert_eq!(
        terminal("8/8/8/4k3/8/4K3/8/8 w - - 0 1"),
        Some(Terminal::InsufficientMaterial)
    );
}

#[test]
fn test_insufficient_material_single_minor_piece() {
    for fen in [
        "8/8/8/4k3/8/4KB2/8/8 w - - 0 1",
        "8/8/8/4k3/8/4KN2/8/8 w - - 0 1",
        "8/8/4b3/4k3/8/4K3/8/8 w - - 0 1",
        "8/8/4n3/4k3/8/4K3/8/8 w - - 0 1",
    ] {
        assert_eq!(
            terminal(fen),
            Some(Terminal::InsufficientMaterial),
            "{fen}"
        );
    }
}

#[test]
fn test_insufficient_material_same_color_bishops() {
    // f8 and c1 are both dark squares
    assert_eq!(
        terminal("5b2/8/8/4k3/8/4K3/8/2B5 w - - 0 1"),
        Some(Terminal::InsufficientMaterial)
    );
}

#[test]
fn test_sufficient_material() {
    for fen in [
        // opposite colored bishops
        "2b5/8/8/4k3/8/4K3/8/2B5 w - - 0 1",
        "8/8/8/4k3/8/4K3/4P3/8 w - - 0 1",
        "8/8/8/4k3/8/4K3/8/4R3 w - - 0 1",
        "8/8/8/4k3/8/4K3/8/4Q3 w - - 0 1",
        "8/8/8/4k3/8/4K3/3NN3/8 w - - 0 1",
    ] {
        let pos = Position::from_fen(fen).unwrap();
        assert!(!pos.is_insufficient_material(), "{fen}");
        assert_eq!(pos.terminal(), None, "{fen}");
    }
}
