use pleco::{
    core::{mono_traits::PlayerTrait, score::Score},
    helper::prelude::{distance_of_sqs, forward_file_bb, passed_pawn_mask},
    PieceType, Player, SQ,
};

use super::classical::ClassicalEvaluator;
use crate::{
    bitboards::{edge_distance, pawn_attacks_bb},
    debug::{EvalDebugger, Term, Tracing},
};

const PASSED_RANK: [Score; 8] = [
    Score(0, 0), Score(10, 28), Score(17, 33), Score(15, 41),
    Score(62, 72), Score(168, 177), Score(276, 260), Score(0, 0),
];

const PASSED_FILE: Score = Score(11, 8);

impl<'a, T: Tracing<EvalDebugger>> ClassicalEvaluator<'a, T> {
    fn king_proximity(&self, player: Player, sq: SQ) -> i32 {
        distance_of_sqs(self.board.king_sq(player), sq).min(5) as i32
    }

    pub(super) fn passed<P: PlayerTrait>(&mut self) -> Score {
        let us = P::player();
        let them = P::opp_player();
        let board = self.board;
        let a = &self.attacks;

        let occupied = board.occupied();
        let their_pieces = board.get_occupied_player(them);
        let mut passers = self.pawns.passed_pawns(us);

        // A passer blocked by an enemy pawn only counts when a neighbouring
        // pawn can still advance to help it through.
        let blocked = passers & P::shift_down(board.piece_bb(them, PieceType::P));
        if blocked.is_not_empty() {
            let helpers = P::shift_up(board.piece_bb(us, PieceType::P))
                & !their_pieces
                & (!a.twice(them) | a.all(us));
            // Squares beside a helper on its own rank
            passers &= !blocked | pawn_attacks_bb::<P>(P::shift_down(helpers));
        }

        let mut score = Score::ZERO;
        for sq in passers {
            let r = us.relative_rank_of_sq(sq) as i32;
            let mut bonus = PASSED_RANK[r as usize];

            if r > 2 {
                let w = 5 * r - 13;
                let block_sq = P::up(sq);

                // Endgame adjustment by how close each king is to the stop square
                bonus += Score::new(
                    0,
                    ((self.king_proximity(them, block_sq) * 19) / 4
                        - self.king_proximity(us, block_sq) * 2)
                        * w,
                );
                if r != 6 {
                    bonus -= Score::new(0, self.king_proximity(us, P::up(block_sq)) * w);
                }

                if (occupied & block_sq.to_bb()).is_empty() {
                    let to_queen = forward_file_bb(us, sq);
                    let mut unsafe_squares = passed_pawn_mask(us, sq);

                    let behind = forward_file_bb(them, sq)
                        & (board.piece_bb_both_players(PieceType::R)
                            | board.piece_bb_both_players(PieceType::Q));

                    // Without an enemy heavy piece behind the pawn only the
                    // squares they attack or occupy are unsafe
                    if (their_pieces & behind).is_empty() {
                        unsafe_squares &= a.all(them) | their_pieces;
                    }

                    let mut k = if unsafe_squares.is_empty() {
                        35
                    } else if (unsafe_squares & to_queen).is_empty() {
                        20
                    } else if (unsafe_squares & block_sq.to_bb()).is_empty() {
                        9
                    } else {
                        0
                    };

                    if (board.get_occupied_player(us) & behind).is_not_empty()
                        || (a.all(us) & block_sq.to_bb()).is_not_empty()
                    {
                        k += 5;
                    }

                    bonus += Score::new(k * w, k * w);
                }
            }

            score += bonus - PASSED_FILE * edge_distance(sq.file()) as u8;
        }

        if let Some(dbg) = self.tracer.trace() {
            dbg.set_eval(Term::Passed, us, score);
        }
        score
    }
}
