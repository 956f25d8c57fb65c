use super::*;

#[test]
fn test_startpos_moves() {
    let pos = Position::startpos();
    // Starting position has 20 legal moves
    assert_eq!(pos.legal_moves().len(), 20);
    assert_eq!(pos.side_to_move(), Color::White);
    assert_eq!(pos.fen(), START_FEN);
}

#[test]
fn test_kiwipete_moves() {
    let pos =
        Position::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
            .unwrap();
    assert_eq!(pos.legal_moves().len(), 48);
}

#[test]
fn test_invalid_fen_is_an_error() {
    let err = Position::from_fen("not a fen").unwrap_err();
    assert!(matches!(err, RulesError::InvalidFen { .. }));
}

#[test]
fn test_legal_move_order_is_stable() {
    let pos = Position::startpos();
    assert_eq!(pos.legal_moves(), pos.clone().legal_moves());
}

#[test]
fn test_push_pop_restores_position() {
    let mut pos = Position::startpos();
    let before = (pos.fen(), pos.hash(), pos.ply());

    let e4 = pos.parse_move("e2e4").unwrap();
    pos.push(e4).unwrap();
    let e5 = pos.parse_move("e7e5").unwrap();
    pos.push(e5).unwrap();
    assert_eq!(pos.ply(), 2);
    assert_eq!(pos.side_to_move(), Color::White);

    assert_eq!(pos.pop(), Some(e5));
    assert_eq!(pos.pop(), Some(e4));
    assert_eq!(pos.pop(), None);
    assert_eq!((pos.fen(), pos.hash(), pos.ply()), before);
}

#[test]
fn test_push_rejects_illegal_move_without_change() {
    let mut pos = Position::startpos();
    let before = pos.fen();
    let bogus = Move {
        from: Square::E2,
        to: Square::E5,
        promotion: None,
    };
    assert_eq!(
        pos.push(bogus),
        Err(RulesError::IllegalMove("e2e5".to_string()))
    );
    assert_eq!(pos.fen(), before);
    assert_eq!(pos.ply(), 0);
}

#[test]
fn test_parse_move_notation() {
    let pos = Position::startpos();
    let mv = pos.parse_move("g1f3").unwrap();
    assert_eq!(mv.from, Square::G1);
    assert_eq!(mv.to, Square::F3);
    assert_eq!(pos.format_move(mv), "g1f3");

    // case and whitespace do not matter
    assert_eq!(pos.parse_move(" G1F3 ").unwrap(), mv);
}

#[test]
fn test_parse_move_rejects_garbage_and_illegal() {
    let pos = Position::startpos();
    for text in ["", "e2", "e2e4e", "z9e4", "e2e4k", "ąę"] {
        assert!(
            matches!(pos.parse_move(text), Err(RulesError::BadNotation(_))),
            "{text:?}"
        );
    }
    assert_eq!(
        pos.parse_move("e2e5"),
        Err(RulesError::IllegalMove("e2e5".to_string()))
    );
}

#[test]
fn test_castling_uses_king_destination() {
    let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();

    let short = pos.parse_move("e1g1").unwrap();
    assert_eq!(pos.format_move(short), "e1g1");
    let long = pos.parse_move("e1c1").unwrap();
    assert_eq!(pos.format_move(long), "e1c1");

    pos.push(short).unwrap();
    assert_eq!(pos.piece_at(Square::G1), Some((Color::White, Piece::King)));
    assert_eq!(pos.piece_at(Square::F1), Some((Color::White, Piece::Rook)));
}

#[test]
fn test_promotion_defaults_to_queen() {
    let pos = Position::from_fen("8/4P3/8/8/8/k7/8/K7 w - - 0 1").unwrap();

    let queen = pos.parse_move("e7e8").unwrap();
    assert_eq!(queen.promotion, Some(Piece::Queen));
    assert_eq!(pos.format_move(queen), "e7e8q");

    let knight = pos.parse_move("e7e8n").unwrap();
    assert_eq!(knight.promotion, Some(Piece::Knight));

    // four promotions, one destination
    assert_eq!(pos.legal_destinations(Square::E7), vec![Square::E8]);
}

#[test]
fn test_legal_destinations() {
    let pos = Position::startpos();
    let mut knight = pos.legal_destinations(Square::G1);
    knight.sort_by_key(|sq| *sq as usize);
    assert_eq!(knight, vec![Square::F3, Square::H3]);
    assert!(pos.legal_destinations(Square::E4).is_empty());
    assert!(pos.legal_destinations(Square::E7).is_empty());
}

#[test]
fn test_is_capture() {
    let pos = Position::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
    let capture = pos.parse_move("e4d5").unwrap();
    let push = pos.parse_move("e4e5").unwrap();
    assert!(pos.is_capture(capture));
    assert!(!pos.is_capture(push));
}
