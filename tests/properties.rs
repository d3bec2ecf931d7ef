use eval_lib::prelude::*;
use pleco::Board;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use eval_lib::consts::{IN_CHECK_TRACE, TEMPO};

/// Flips the board vertically and swaps the colors of every piece, the side
/// to move, the castling rights and the en passant square.
fn mirror_fen(fen: &str) -> String {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    let swap_case = |c: char| {
        if c.is_ascii_uppercase() {
            c.to_ascii_lowercase()
        } else {
            c.to_ascii_uppercase()
        }
    };

    let placement: Vec<String> = fields[0]
        .split('/')
        .rev()
        .map(|rank| rank.chars().map(swap_case).collect())
        .collect();
    let turn = if fields[1] == "w" { "b" } else { "w" };

    let castling = if fields[2] == "-" {
        "-".to_string()
    } else {
        let mut rights: Vec<char> = fields[2].chars().map(swap_case).collect();
        rights.sort_by_key(|c| (c.is_ascii_lowercase(), *c != 'K' && *c != 'k'));
        rights.into_iter().collect()
    };

    let ep = match fields[3].as_bytes() {
        [file, rank] => format!("{}{}", *file as char, (b'1' + b'8' - *rank) as char),
        _ => "-".to_string(),
    };

    format!(
        "{} {} {} {} {} {}",
        placement.join("/"),
        turn,
        castling,
        ep,
        fields.get(4).unwrap_or(&"0"),
        fields.get(5).unwrap_or(&"1")
    )
}

fn random_positions(count: usize, seed: u64) -> Vec<Board> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut positions = Vec::with_capacity(count);
    let mut board = Board::start_pos();
    let mut plies = 0;
    while positions.len() < count {
        let moves = board.generate_moves();
        match moves.choose(&mut rng) {
            Some(mv) if plies < 150 => {
                board.apply_move(*mv);
                plies += 1;
            }
            _ => {
                board = Board::start_pos();
                plies = 0;
            }
        }
        if !board.in_check() {
            positions.push(board.shallow_clone());
        }
    }
    positions
}

#[test]
fn test_mirror_fen() {
    let fen = "r3k2r/pp1n1pbp/8/3pP3/8/8/PPP2PPP/R3K1NR w KQq d6 0 13";
    assert_eq!(
        mirror_fen(fen),
        "r3k1nr/ppp2ppp/8/8/3Pp3/8/PP1N1PBP/R3K2R b Qkq d3 0 13"
    );
    assert_eq!(mirror_fen(&mirror_fen(fen)), fen);
}

#[test]
fn test_mirror_symmetry() {
    let mut evaluator = Evaluator::new(EvalConfig::default(), None).unwrap();
    for board in random_positions(300, 7) {
        let mirrored = Board::from_fen(&mirror_fen(&board.fen())).unwrap();
        assert!(!mirrored.in_check());
        assert_eq!(
            evaluator.evaluate(&board),
            evaluator.evaluate(&mirrored),
            "{} vs {}",
            board.fen(),
            mirrored.fen()
        );
    }
}

#[test]
fn test_deterministic() {
    let positions = random_positions(100, 42);
    let mut warm = Evaluator::new(EvalConfig::default(), None).unwrap();
    let first: Vec<i32> = positions.iter().map(|b| warm.evaluate(b)).collect();
    let again: Vec<i32> = positions.iter().map(|b| warm.evaluate(b)).collect();
    assert_eq!(first, again);

    // A tiny cache that is constantly evicted gives the same answers
    let config = EvalConfig {
        pawn_table_size: 1,
        material_table_size: 1,
        ..Default::default()
    };
    let mut cold = Evaluator::new(config, None).unwrap();
    let fresh: Vec<i32> = positions.iter().map(|b| cold.evaluate(b)).collect();
    assert_eq!(first, fresh);

    for board in positions.iter().take(20) {
        assert_eq!(Ok(warm.evaluate(board)), evaluate_fen(&board.fen()));
        assert_eq!(trace_eval(board), trace_eval(board));
    }
}

#[test]
fn test_start_position() {
    let board = Board::start_pos();
    let mut classical = Evaluator::new(EvalConfig::default(), None).unwrap();
    assert_eq!(classical.evaluate(&board), TEMPO);

    let net: Box<dyn NeuralEvaluator> = Box::new(|_: &Board| 0);
    let mut neural = Evaluator::new(EvalConfig::neural(), Some(net)).unwrap();
    assert_eq!(neural.evaluate(&board), TEMPO);

    let report = trace_eval(&board);
    assert!(report.contains("Final evaluation: 0.14 (white side)"), "{report}");
}

#[test]
fn test_in_check_literal() {
    let board = Board::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
        .unwrap();
    assert!(board.in_check());
    assert_eq!(trace_eval(&board), "Total evaluation: none (in check)");
    assert_eq!(trace_eval(&board), IN_CHECK_TRACE);
}

#[test]
fn test_config_json() {
    let config: EvalConfig = serde_json::from_str(r#"{ "mode": "neural" }"#).unwrap();
    assert_eq!(config, EvalConfig::neural());

    let json = serde_json::to_string(&EvalConfig::default()).unwrap();
    assert!(json.contains("\"classical\""));
    let back: EvalConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, EvalConfig::default());

    let bad: EvalConfig = serde_json::from_str(r#"{ "pawn_table_size": 300 }"#).unwrap();
    assert!(matches!(
        Evaluator::new(bad, None).err(),
        Some(EvalError::InvalidTableSize { name: "pawn", .. })
    ));
}
