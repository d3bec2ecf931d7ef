use pleco::{
    core::{
        masks::{RANK_2, RANK_3, RANK_4, RANK_5, RANK_6, RANK_7},
        mono_traits::PlayerTrait,
        score::Score,
    },
    BitBoard, PieceType, Player,
};

use super::classical::ClassicalEvaluator;
use crate::{
    bitboards::CENTER_FILES,
    consts::SPACE_THRESHOLD,
    debug::{EvalDebugger, Term, Tracing},
    tables::material::non_pawn_material,
};

impl<'a, T: Tracing<EvalDebugger>> ClassicalEvaluator<'a, T> {
    /// Safe central squares behind and around our pawn chain, weighted by how
    /// many pieces are left to use them. Skipped once enough material is gone.
    pub(super) fn space<P: PlayerTrait>(&mut self) -> Score {
        let board = self.board;
        let npm =
            non_pawn_material(board, Player::White) + non_pawn_material(board, Player::Black);
        if npm < SPACE_THRESHOLD {
            return Score::ZERO;
        }

        let us = P::player();
        let them = P::opp_player();
        let a = &self.attacks;

        let space_mask = CENTER_FILES
            & BitBoard(match us {
                Player::White => RANK_2 | RANK_3 | RANK_4,
                Player::Black => RANK_7 | RANK_6 | RANK_5,
            });

        let our_pawns = board.piece_bb(us, PieceType::P);
        let our_minors = board.piece_bb(us, PieceType::N) | board.piece_bb(us, PieceType::B);
        let taken = board.occupied() & !our_minors;
        let safe = space_mask & !taken & !a.by(them, PieceType::P);

        // Up to three squares behind each of our pawns
        let mut behind = our_pawns;
        behind |= P::shift_down(behind);
        behind |= P::shift_down(P::shift_down(behind));

        let bonus = (safe.count_bits() + (behind & safe & !a.all(them)).count_bits()) as i32;
        let weight = board.get_occupied_player(us).count_bits() as i32 - 3
            + self.pawns.blocked_count().min(9);
        let score = Score::new(bonus * weight * weight / 16, 0);

        if let Some(dbg) = self.tracer.trace() {
            dbg.set_eval(Term::Space, us, score);
        }
        score
    }
}

#[cfg(test)]
mod tests {
    use pleco::Board;

    use super::*;
    use crate::evaluation::trace_breakdown;

    #[test]
    fn test_start_position_space_is_balanced() {
        let board = Board::start_pos();
        let dbg = trace_breakdown(&board).unwrap();
        let space = dbg.eval(Term::Space);
        assert!(space.white().mg() > 0);
        assert_eq!(space.white(), space.black());
    }

    #[test]
    fn test_no_space_in_endgame() {
        let board = Board::from_fen("r3k3/pppp4/8/8/8/8/PPPP4/R3K3 w - - 0 1").unwrap();
        let dbg = trace_breakdown(&board).unwrap();
        assert_eq!(dbg.eval(Term::Space).white(), Score::ZERO);
        assert_eq!(dbg.eval(Term::Space).black(), Score::ZERO);
    }

    #[test]
    fn test_only_empty_or_minor_squares_count() {
        // Eight safe squares on c3-f4, weight 16 - 3
        let board = Board::start_pos();
        let dbg = trace_breakdown(&board).unwrap();
        assert_eq!(dbg.eval(Term::Space).white(), Score(8 * 13 * 13 / 16, 0));

        // A knight on e3 still leaves the square usable
        let knight =
            Board::from_fen("rnbqkbnr/pppppppp/8/8/8/4N3/PPPPPPPP/RNBQKB1R w KQkq - 0 1").unwrap();
        let dbg = trace_breakdown(&knight).unwrap();
        assert_eq!(dbg.eval(Term::Space).white(), Score(84, 0));

        // A rook there takes it away
        let rook =
            Board::from_fen("rnbqkbnr/pppppppp/8/8/8/4R3/PPPPPPPP/RNBQKBN1 w Qkq - 0 1").unwrap();
        let dbg = trace_breakdown(&rook).unwrap();
        assert_eq!(dbg.eval(Term::Space).white(), Score(7 * 13 * 13 / 16, 0));
        assert_eq!(dbg.eval(Term::Space).black(), Score(84, 0));
    }
}
