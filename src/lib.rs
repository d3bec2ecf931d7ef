//! Classical static evaluation of chess positions, with an optional neural
//! strategy and a per-term trace report.

pub mod bitboards;
pub mod config;
pub mod consts;
pub mod debug;

pub mod evaluation;
pub mod tables;

pub mod prelude {
    // easier exporting
    pub use super::config::{EvalConfig, EvalError, EvalMode};
    pub use super::consts;
    pub use super::debug;
    pub use super::evaluation::{
        eval_board, evaluate_fen, trace_breakdown, trace_eval, Evaluator, NeuralEvaluator,
    };
    pub use pleco::core::score::Score;
    pub use super::tables;
}
