use pleco::{core::score::Score, Board, Player};

use crate::{
    config::{EvalConfig, EvalError, EvalMode},
    consts::{EvalVal, EVAL_BOUND, IN_CHECK_TRACE, TEMPO},
    debug::{Debugger, EvalDebugger, NoTrace, Term, Trace, Tracing},
    tables::{material::Material, pawn_table::PawnTable},
};

mod attacks;
mod classical;
mod king;
mod neural;
mod passed;
mod pieces;
mod space;
mod threats;
mod winnable;

pub use attacks::{slider_blockers, AttackModel, KING_ATTACK_WEIGHTS};
pub use classical::ClassicalEvaluator;
pub use neural::NeuralEvaluator;
pub use pieces::mobility_bonus;
pub use winnable::blend;

/// Clamps a White-relative value, turns it to the side to move and adds the
/// tempo bonus.
pub fn finalize(board: &Board, white_value: EvalVal) -> EvalVal {
    let v = white_value.clamp(-EVAL_BOUND, EVAL_BOUND);
    let v = if board.turn() == Player::Black { -v } else { v };
    v + TEMPO
}

#[inline]
fn white_relative(board: &Board, v: EvalVal) -> EvalVal {
    if board.turn() == Player::Black {
        -v
    } else {
        v
    }
}

/// Classical evaluation from the side to move's point of view. The position
/// must not be in check.
pub fn eval_board(
    board: &Board,
    pawn_table: &mut PawnTable,
    material: &mut Material,
) -> EvalVal {
    debug_assert!(!board.in_check());
    let mut evaluator =
        ClassicalEvaluator::new(board, NoTrace::new(), pawn_table, material, Score::ZERO);
    let res = evaluator.white_score();
    finalize(board, res)
}

fn classical_breakdown(
    board: &Board,
    pawn_table: &mut PawnTable,
    material: &mut Material,
    contempt: Score,
) -> EvalDebugger {
    let mut evaluator =
        ClassicalEvaluator::new(board, Trace::new(), pawn_table, material, contempt);
    let white = evaluator.white_score();

    let mut dbg = evaluator.into_tracer().into_inner();
    dbg.set_final_eval(white_relative(board, finalize(board, white)));
    dbg
}

fn neural_breakdown(board: &Board, net: &dyn NeuralEvaluator) -> EvalDebugger {
    let mut dbg = EvalDebugger::new();
    let v = net.evaluate(board).clamp(-EVAL_BOUND, EVAL_BOUND);
    dbg.set_total(Term::Total, Score::new(v, v));
    dbg.set_final_eval(white_relative(board, finalize(board, v)));
    dbg
}

/// Per-term record of a classical evaluation with fresh caches, or `None`
/// when the side to move is in check.
pub fn trace_breakdown(board: &Board) -> Option<EvalDebugger> {
    if board.in_check() {
        return None;
    }
    let mut pawn_table = PawnTable::with_size(1);
    let mut material = Material::with_size(1);
    Some(classical_breakdown(board, &mut pawn_table, &mut material, Score::ZERO))
}

/// Human readable report of a classical evaluation.
pub fn trace_eval(board: &Board) -> String {
    match trace_breakdown(board) {
        Some(dbg) => dbg.to_string(),
        None => IN_CHECK_TRACE.to_string(),
    }
}

/// Parses `fen` and evaluates it from the side to move's point of view.
pub fn evaluate_fen(fen: &str) -> Result<EvalVal, EvalError> {
    let board = Board::from_fen(fen).map_err(|e| EvalError::InvalidFen(format!("{e:?}")))?;
    if board.in_check() {
        return Err(EvalError::InCheck);
    }
    let mut pawn_table = PawnTable::with_size(1);
    let mut material = Material::with_size(1);
    Ok(eval_board(&board, &mut pawn_table, &mut material))
}

enum Strategy {
    Classical,
    Neural(Box<dyn NeuralEvaluator>),
}

/// Evaluation state owned by one search thread: the pawn and material caches,
/// the configured strategy and the current contempt.
pub struct Evaluator {
    strategy: Strategy,
    pawn_table: PawnTable,
    material: Material,
    contempt: Score,
}

impl Evaluator {
    pub fn new(
        config: EvalConfig,
        net: Option<Box<dyn NeuralEvaluator>>,
    ) -> Result<Self, EvalError> {
        config.validate()?;

        let strategy = match config.mode {
            EvalMode::Classical => Strategy::Classical,
            EvalMode::Neural => Strategy::Neural(net.ok_or(EvalError::MissingNetwork)?),
        };

        log::debug!(
            "building {:?} evaluator, pawn table {} entries, material table {} entries",
            config.mode,
            config.pawn_table_size,
            config.material_table_size
        );

        Ok(Evaluator {
            strategy,
            pawn_table: PawnTable::with_size(config.pawn_table_size),
            material: Material::with_size(config.material_table_size),
            contempt: Score::ZERO,
        })
    }

    /// White-relative bias added to every classical evaluation.
    pub fn set_contempt(&mut self, contempt: Score) {
        self.contempt = contempt;
    }

    pub fn contempt(&self) -> Score {
        self.contempt
    }

    /// Score from the side to move's point of view, tempo included. The
    /// position must not be in check.
    pub fn evaluate(&mut self, board: &Board) -> EvalVal {
        debug_assert!(!board.in_check());
        let white = match &self.strategy {
            Strategy::Classical => {
                let mut evaluator = ClassicalEvaluator::new(
                    board,
                    NoTrace::new(),
                    &mut self.pawn_table,
                    &mut self.material,
                    self.contempt,
                );
                evaluator.white_score()
            }
            Strategy::Neural(net) => net.evaluate(board),
        };
        finalize(board, white)
    }

    /// Per-term report of the position. Contempt is ignored for the duration
    /// of the trace.
    pub fn trace(&mut self, board: &Board) -> String {
        if board.in_check() {
            return IN_CHECK_TRACE.to_string();
        }
        log::trace!("tracing evaluation of {}", board.fen());

        let saved = std::mem::replace(&mut self.contempt, Score::ZERO);
        let dbg = match &self.strategy {
            Strategy::Classical => classical_breakdown(
                board,
                &mut self.pawn_table,
                &mut self.material,
                self.contempt,
            ),
            Strategy::Neural(net) => neural_breakdown(board, net.as_ref()),
        };
        self.contempt = saved;

        dbg.to_string()
    }
}

#[cfg(test)]
mod tests {
    use pleco::Board;

    use super::*;

    #[test]
    fn test_eval() {
        let fen = "8/1R6/8/P3k3/1R6/P7/1KP2p2/6r1 b - - 5 43";
        let board = Board::from_fen(fen).unwrap();

        let report = trace_eval(&board);
        assert!(report.starts_with("     Term    |    White    |    Black    |    Total   "));
        assert!(report.contains("Final evaluation:"));

        let mut pawn_table = PawnTable::new();
        let mut material = Material::new();
        let v = eval_board(&board, &mut pawn_table, &mut material);
        let dbg = trace_breakdown(&board).unwrap();
        assert_eq!(white_relative(&board, v), dbg.final_eval());
    }

    #[test]
    fn test_in_check_trace() {
        // Black queen on e2 gives check
        let board = Board::from_fen("4k3/8/8/8/8/8/4q3/4K3 w - - 0 1").unwrap();
        assert!(board.in_check());
        assert_eq!(trace_eval(&board), IN_CHECK_TRACE);
        assert!(trace_breakdown(&board).is_none());

        let mut evaluator = Evaluator::new(EvalConfig::default(), None).unwrap();
        assert_eq!(evaluator.trace(&board), IN_CHECK_TRACE);
        assert_eq!(
            evaluate_fen("4k3/8/8/8/8/8/4q3/4K3 w - - 0 1"),
            Err(EvalError::InCheck)
        );
    }

    #[test]
    fn test_finalize_clamps_before_tempo() {
        let board = Board::start_pos();
        assert_eq!(finalize(&board, 1_000_000), EVAL_BOUND + TEMPO);
        assert_eq!(finalize(&board, -1_000_000), -EVAL_BOUND + TEMPO);

        let black = Board::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 0 1").unwrap();
        assert_eq!(finalize(&black, 100), -100 + TEMPO);
    }

    #[test]
    fn test_neural_requires_network() {
        let err = Evaluator::new(EvalConfig::neural(), None).err();
        assert_eq!(err, Some(EvalError::MissingNetwork));
    }

    #[test]
    fn test_neural_strategy() {
        let net: Box<dyn NeuralEvaluator> = Box::new(|_: &Board| 250);
        let mut evaluator = Evaluator::new(EvalConfig::neural(), Some(net)).unwrap();

        let board = Board::start_pos();
        assert_eq!(evaluator.evaluate(&board), 250 + TEMPO);

        let report = evaluator.trace(&board);
        assert!(report.contains("    Mobility |  0.00  0.00 |  0.00  0.00 |  0.00  0.00"));
        assert!(report.contains("       Total |  ----  ---- |  ----  ---- |  1.21  1.21"));
    }

    #[test]
    fn test_trace_ignores_contempt() {
        let board = Board::start_pos();
        let mut evaluator = Evaluator::new(EvalConfig::default(), None).unwrap();
        let plain = evaluator.trace(&board);

        evaluator.set_contempt(Score::new(40, 20));
        assert_eq!(evaluator.trace(&board), plain);
        assert_eq!(evaluator.contempt(), Score::new(40, 20));
        assert!(evaluator.evaluate(&board) > TEMPO);
    }

    #[test]
    fn test_bad_fen() {
        assert!(matches!(evaluate_fen("not a fen"), Err(EvalError::InvalidFen(_))));
    }
}
