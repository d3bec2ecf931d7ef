//! Endgame drawishness and the final middlegame/endgame taper.

use pleco::{
    core::{masks::DARK_SQUARES, score::Score},
    helper::prelude::king_moves,
    BitBoard, PieceType, Player, SQ,
};

use super::classical::ClassicalEvaluator;
use crate::{
    bitboards::{KING_SIDE, QUEEN_SIDE},
    consts::{EvalVal, BISHOP_MG, MAX_PHASE, ROOK_MG, SCALE_FACTOR_NORMAL},
    debug::{EvalDebugger, Term, Tracing},
    tables::material::non_pawn_material,
};

#[inline(always)]
fn is_dark(sq: SQ) -> bool {
    (BitBoard(DARK_SQUARES) & sq.to_bb()).is_not_empty()
}

/// Interpolates between the middlegame and the scaled endgame value.
/// `phase` runs from 0 (bare endgame) to `MAX_PHASE`.
#[inline]
pub fn blend(mg: EvalVal, eg: EvalVal, phase: EvalVal, scale_factor: EvalVal) -> EvalVal {
    (mg * phase + eg * (MAX_PHASE - phase) * scale_factor / SCALE_FACTOR_NORMAL) / MAX_PHASE
}

/// Middlegame and endgame corrections for a position of the given
/// complexity. Neither correction can push a value past zero.
fn complexity_adjustment(score: Score, complexity: i32) -> (EvalVal, EvalVal) {
    let (mg, eg) = (score.mg(), score.eg());
    let u = mg.signum() * (complexity + 50).clamp(-mg.abs(), 0);
    let v = eg.signum() * complexity.max(-eg.abs());
    (u, v)
}

impl<'a, T: Tracing<EvalDebugger>> ClassicalEvaluator<'a, T> {
    /// Shrinks `score` toward zero when the position looks hard to win, then
    /// tapers it into a single white-relative value.
    pub(super) fn winnable(&mut self, score: Score) -> EvalVal {
        let board = self.board;
        let wksq = board.king_sq(Player::White);
        let bksq = board.king_sq(Player::Black);

        let outflanking = (wksq.file() as i32 - bksq.file() as i32).abs()
            - (wksq.rank() as i32 - bksq.rank() as i32).abs();

        let pawns = board.piece_bb_both_players(PieceType::P);
        let both_flanks =
            (pawns & QUEEN_SIDE).is_not_empty() && (pawns & KING_SIDE).is_not_empty();

        let almost_unwinnable = outflanking < 0 && !both_flanks;
        let infiltration = wksq.rank() as u8 > 3 || (bksq.rank() as u8) < 4;

        let npm_w = non_pawn_material(board, Player::White);
        let npm_b = non_pawn_material(board, Player::Black);

        let complexity = 9 * self.pawns.passed_count()
            + 12 * pawns.count_bits() as i32
            + 9 * outflanking
            + 21 * both_flanks as i32
            + 24 * infiltration as i32
            + 51 * (npm_w + npm_b == 0) as i32
            - 43 * almost_unwinnable as i32
            - 110;

        let (u, v) = complexity_adjustment(score, complexity);
        let mg = score.mg() + u;
        let eg = score.eg() + v;

        let strong = if eg > 0 { Player::White } else { Player::Black };
        let sf = self.scale_factor(strong, npm_w, npm_b);

        let value = blend(mg, eg, self.material.game_phase(), sf);

        if let Some(dbg) = self.tracer.trace() {
            let scaled_eg = eg * sf / SCALE_FACTOR_NORMAL;
            dbg.set_total(Term::Winnable, Score::new(u, scaled_eg - score.eg()));
            dbg.set_total(Term::Total, Score::new(mg, scaled_eg));
        }
        value
    }

    fn scale_factor(&self, strong: Player, npm_w: EvalVal, npm_b: EvalVal) -> EvalVal {
        let board = self.board;
        let weak = strong.other_player();
        let sf = self.material.scale_factor(strong);
        if sf != SCALE_FACTOR_NORMAL {
            return sf;
        }

        let count = |p: Player, pt: PieceType| board.count_piece(p, pt) as i32;

        if self.opposite_bishops() {
            if npm_w == BISHOP_MG && npm_b == BISHOP_MG {
                18 + 4 * self.pawns.passed_pawns(strong).count_bits() as i32
            } else {
                22 + 3 * board.get_occupied_player(strong).count_bits() as i32
            }
        } else if npm_w == ROOK_MG
            && npm_b == ROOK_MG
            && count(strong, PieceType::P) - count(weak, PieceType::P) <= 1
            && (KING_SIDE & board.piece_bb(strong, PieceType::P)).is_not_empty()
                != (QUEEN_SIDE & board.piece_bb(strong, PieceType::P)).is_not_empty()
            && (king_moves(board.king_sq(weak)) & board.piece_bb(weak, PieceType::P))
                .is_not_empty()
        {
            36
        } else if count(Player::White, PieceType::Q) + count(Player::Black, PieceType::Q) == 1 {
            let queenless = if count(Player::White, PieceType::Q) == 1 {
                Player::Black
            } else {
                Player::White
            };
            37 + 3 * (count(queenless, PieceType::B) + count(queenless, PieceType::N))
        } else {
            sf.min(36 + 7 * count(strong, PieceType::P))
        }
    }

    fn opposite_bishops(&self) -> bool {
        let board = self.board;
        let white = board.piece_bb(Player::White, PieceType::B);
        let black = board.piece_bb(Player::Black, PieceType::B);
        if white.count_bits() != 1 || black.count_bits() != 1 {
            return false;
        }
        is_dark(white.to_sq()) != is_dark(black.to_sq())
    }
}
