// src/bin/eval_trace.rs

use std::{process::ExitCode, time::Instant};

use eval_lib::prelude::*;
use pleco::Board;

const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Prints the term breakdown for every FEN given on the command line, or
/// for the start position when none is given.
fn main() -> ExitCode {
    let mut fens: Vec<String> = std::env::args().skip(1).collect();
    if fens.is_empty() {
        fens.push(START_FEN.to_string());
    }

    let mut failed = false;
    for fen in &fens {
        let board = match Board::from_fen(fen) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("{}", EvalError::InvalidFen(format!("{e:?}")));
                failed = true;
                continue;
            }
        };

        let start = Instant::now();
        let report = trace_eval(&board);
        let elapsed = start.elapsed();

        println!("{fen}");
        println!("{report}");
        println!("traced in {} us\n", elapsed.as_micros());
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
