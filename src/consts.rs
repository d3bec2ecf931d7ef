use pleco::core::score::Score;

pub type EvalVal = i32;

//PIECE EVALUATION CONSTANTS
pub const PAWN_MG:   EvalVal = 124;
pub const KNIGHT_MG: EvalVal = 781;
pub const BISHOP_MG: EvalVal = 825;
pub const ROOK_MG:   EvalVal = 1276;
pub const QUEEN_MG:  EvalVal = 2538;

pub const PAWN_EG:   EvalVal = 206;
pub const KNIGHT_EG: EvalVal = 854;
pub const BISHOP_EG: EvalVal = 915;
pub const ROOK_EG:   EvalVal = 1380;
pub const QUEEN_EG:  EvalVal = 2682;

/// Indexed by `PieceType as usize`; king and the sentinels carry no material.
pub const PIECE_VALUES: [Score; 8] = [
    Score::ZERO,
    Score(PAWN_MG, PAWN_EG),
    Score(KNIGHT_MG, KNIGHT_EG),
    Score(BISHOP_MG, BISHOP_EG),
    Score(ROOK_MG, ROOK_EG),
    Score(QUEEN_MG, QUEEN_EG),
    Score::ZERO,
    Score::ZERO,
];

//GAME PHASE CONSTANTS
pub const MIDGAME_LIMIT: EvalVal = 15258;
pub const ENDGAME_LIMIT: EvalVal = 3915;
pub const MAX_PHASE: EvalVal = 128;

pub const SCALE_FACTOR_DRAW: EvalVal = 0;
pub const SCALE_FACTOR_NORMAL: EvalVal = 64;

/// Space only matters while enough pieces are on the board to fight over it.
pub const SPACE_THRESHOLD: EvalVal = 12222;

//FINAL VALUE CONSTANTS
pub const TEMPO: EvalVal = 28;

/// Largest white-relative magnitude handed back to the search.
pub const EVAL_BOUND: EvalVal = 30_000;

pub const IN_CHECK_TRACE: &str = "Total evaluation: none (in check)";
