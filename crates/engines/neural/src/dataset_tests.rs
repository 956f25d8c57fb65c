use super::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("neural_engine_{}_{name}", std::process::id()))
}

#[test]
fn test_round_trip_is_bit_exact() {
    let mut rng = StdRng::seed_from_u64(11);
    let dataset = generate_synthetic(25, &mut rng).unwrap();
    assert_eq!(dataset.len(), 25);

    let path = temp_path("round_trip.json");
    dataset.save(&path).unwrap();
    let loaded = Dataset::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.len(), dataset.len());
    for (a, b) in loaded.records().iter().zip(dataset.records()) {
        assert_eq!(a.label.to_bits(), b.label.to_bits());
        assert_eq!(a.features, b.features);
    }
}

#[test]
fn test_generation_is_seedable() {
    let a = generate_synthetic(10, &mut StdRng::seed_from_u64(5)).unwrap();
    let b = generate_synthetic(10, &mut StdRng::seed_from_u64(5)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_random_position_plays_some_moves() {
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..20 {
        let pos = random_position(&mut rng).unwrap();
        assert!((1..=MAX_RANDOM_PLIES as usize).contains(&pos.ply()));
    }
}

#[test]
fn test_random_position_never_plays_past_game_end() {
    let mut rng = StdRng::seed_from_u64(8);
    for _ in 0..200 {
        let mut pos = random_position(&mut rng).unwrap();
        // every position before the last move must still be in play
        while pos.pop().is_some() {
            assert_eq!(pos.terminal(), None, "moved on from {}", pos.fen());
        }
    }
}

#[test]
fn test_random_walk_stops_at_a_draw() {
    let mut rng = StdRng::seed_from_u64(2);

    let mut bare_kings = Position::from_fen("8/8/8/4k3/8/4K3/8/8 w - - 0 1").unwrap();
    random_walk(&mut bare_kings, MAX_RANDOM_PLIES, &mut rng).unwrap();
    assert_eq!(bare_kings.ply(), 0);

    // 99 quiet half-moves: any move but a pawn push or capture ends the walk
    let mut fifty = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 99 80").unwrap();
    assert_eq!(fifty.terminal(), None);
    random_walk(&mut fifty, MAX_RANDOM_PLIES, &mut rng).unwrap();
    assert_eq!(fifty.ply(), 1);
    assert_eq!(fifty.terminal(), Some(Terminal::FiftyMoveRule));
}

#[test]
fn test_synthetic_labels() {
    let mut rng = StdRng::seed_from_u64(3);

    // white delivered mate
    let mated_black =
        Position::from_fen("r1bqkbnr/pppp1Qpp/2n5/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 1")
            .unwrap();
    assert_eq!(synthetic_label(&mated_black, &mut rng), 1.0);

    // black delivered mate
    let mated_white =
        Position::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
            .unwrap();
    assert_eq!(synthetic_label(&mated_white, &mut rng), -1.0);

    let stalemate = Position::from_fen("k7/8/1Q6/8/8/8/8/1K6 b - - 0 1").unwrap();
    assert_eq!(synthetic_label(&stalemate, &mut rng), 0.0);

    let bare_kings = Position::from_fen("8/8/8/4k3/8/4K3/8/8 w - - 0 1").unwrap();
    assert_eq!(synthetic_label(&bare_kings, &mut rng), 0.0);

    for _ in 0..100 {
        let label = synthetic_label(&Position::startpos(), &mut rng);
        assert!((-1.0..=1.0).contains(&label));
    }
}

#[test]
fn test_push_rejects_out_of_range_label() {
    let mut dataset = Dataset::new();
    let features = encode_position(&Position::startpos());
    dataset
        .push(GameRecord::new(features.clone(), -1.0))
        .unwrap();
    assert!(matches!(
        dataset.push(GameRecord::new(features.clone(), 1.5)),
        Err(DatasetError::Label { index: 1, .. })
    ));
    assert!(dataset.push(GameRecord::new(features, f32::NAN)).is_err());
    assert_eq!(dataset.len(), 1);
}

#[test]
fn test_load_validates() {
    let features = encode_position(&Position::startpos());
    let record = serde_json::to_string(&GameRecord::new(features, 0.5)).unwrap();

    let width = load_str("width.json", r#"{"feature_len":768,"records":[]}"#);
    assert!(matches!(width, Err(DatasetError::FeatureLen { actual: 768 })));

    let label = load_str(
        "label.json",
        &record_doc(&record.replace("\"label\":0.5", "\"label\":3.0")),
    );
    assert!(matches!(label, Err(DatasetError::Label { index: 0, .. })));

    // a feature cell that is neither 0 nor 1
    let cell = load_str("cell.json", &record_doc(&record.replacen("1.0", "0.5", 1)));
    assert!(matches!(cell, Err(DatasetError::Json { .. })));

    let ok = load_str("ok.json", &record_doc(&record)).unwrap();
    assert_eq!(ok.len(), 1);

    assert!(matches!(
        Dataset::load(&temp_path("missing.json")),
        Err(DatasetError::Io { .. })
    ));
}

fn load_str(name: &str, contents: &str) -> Result<Dataset, DatasetError> {
    let path = temp_path(name);
    std::fs::write(&path, contents).unwrap();
    let result = Dataset::load(&path);
    std::fs::remove_file(&path).ok();
    result
}

fn record_doc(record: &str) -> String {
    format!(r#"{{"feature_len":832,"records":[{record}]}}"#)
}
