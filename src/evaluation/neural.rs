use pleco::Board;

use crate::consts::EvalVal;

/// A network that can stand in for the classical terms. Implementations
/// return a White-relative score; clamping, orientation and tempo are applied
/// by the caller.
pub trait NeuralEvaluator: Send + Sync {
    fn evaluate(&self, board: &Board) -> EvalVal;
}

impl<F> NeuralEvaluator for F
where
    F: Fn(&Board) -> EvalVal + Send + Sync,
{
    fn evaluate(&self, board: &Board) -> EvalVal {
        self(board)
    }
}
