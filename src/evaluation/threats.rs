use pleco::{
    core::{
        masks::{RANK_3, RANK_6},
        mono_traits::PlayerTrait,
        score::Score,
    },
    helper::prelude::{bishop_moves, knight_moves, rook_moves},
    BitBoard, PieceType, Player,
};

use super::classical::ClassicalEvaluator;
use crate::{
    bitboards::pawn_attacks_bb,
    debug::{EvalDebugger, Term, Tracing},
};

// Indexed by the type of the attacked piece
pub const THREAT_BY_MINOR: [Score; 8] = [
    Score(0, 0), Score(5, 32), Score(57, 41), Score(77, 56),
    Score(88, 119), Score(79, 161), Score(0, 0), Score(0, 0),
];

pub const THREAT_BY_ROOK: [Score; 8] = [
    Score(0, 0), Score(3, 46), Score(37, 68), Score(42, 60),
    Score(0, 38), Score(58, 41), Score(0, 0), Score(0, 0),
];

pub const HANGING: Score = Score(69, 36);
pub const RESTRICTED_PIECE: Score = Score(7, 7);
const KNIGHT_ON_QUEEN: Score = Score(16, 11);
const SLIDER_ON_QUEEN: Score = Score(60, 18);
const THREAT_BY_KING: Score = Score(0, 89);
const THREAT_BY_PAWN_PUSH: Score = Score(48, 39);
const THREAT_BY_SAFE_PAWN: Score = Score(173, 94);
const WEAK_QUEEN_PROTECTION: Score = Score(14, 0);

impl<'a, T: Tracing<EvalDebugger>> ClassicalEvaluator<'a, T> {
    pub(super) fn threats<P: PlayerTrait>(&mut self) -> Score {
        let us = P::player();
        let them = P::opp_player();
        let board = self.board;
        let a = &self.attacks;

        let strongly_protected = self.strongly_protected::<P>();

        let mut score = self.piece_threats::<P>(strongly_protected);

        // Squares the enemy needs for mobility which we contest
        let restricted = a.all(them) & !strongly_protected & a.all(us);
        score += RESTRICTED_PIECE * restricted.count_bits();

        let non_pawn_enemies =
            board.get_occupied_player(them) & !board.piece_bb_both_players(PieceType::P);
        let safe = !a.all(them) | a.all(us);

        let b = pawn_attacks_bb::<P>(board.piece_bb(us, PieceType::P) & safe) & non_pawn_enemies;
        score += THREAT_BY_SAFE_PAWN * b.count_bits();

        score += THREAT_BY_PAWN_PUSH * self.pawn_push_threats::<P>().count_bits();

        score += self.queen_threats::<P>(strongly_protected);

        if let Some(dbg) = self.tracer.trace() {
            dbg.set_eval(Term::Threat, us, score);
        }
        score
    }

    /// Enemy squares defended by a pawn, or twice without being attacked
    /// twice by `P`.
    fn strongly_protected<P: PlayerTrait>(&self) -> BitBoard {
        let a = &self.attacks;
        let them = P::opp_player();
        a.by(them, PieceType::P) | (a.twice(them) & !a.twice(P::player()))
    }

    /// Attacks on enemy pieces by minors, rooks and the king, plus the flat
    /// bonuses for loose pieces.
    fn piece_threats<P: PlayerTrait>(&self, strongly_protected: BitBoard) -> Score {
        let us = P::player();
        let them = P::opp_player();
        let board = self.board;
        let a = &self.attacks;

        let non_pawn_enemies =
            board.get_occupied_player(them) & !board.piece_bb_both_players(PieceType::P);
        let defended = non_pawn_enemies & strongly_protected;
        let weak = board.get_occupied_player(them) & !strongly_protected & a.all(us);

        let mut score = Score::ZERO;
        if (defended | weak).is_empty() {
            return score;
        }

        let by_minor = (defended | weak) & (a.by(us, PieceType::N) | a.by(us, PieceType::B));
        for sq in by_minor {
            score += THREAT_BY_MINOR[board.piece_at_sq(sq).type_of() as usize];
        }

        let by_rook = weak & a.by(us, PieceType::R);
        for sq in by_rook {
            score += THREAT_BY_ROOK[board.piece_at_sq(sq).type_of() as usize];
        }

        if (weak & a.by(us, PieceType::K)).is_not_empty() {
            score += THREAT_BY_KING;
        }

        // Loose pieces the tables above have not already paid for
        let hanging = !a.all(them) | (non_pawn_enemies & a.twice(us));
        score += HANGING * (weak & hanging & !(by_minor | by_rook)).count_bits();

        // Weak pieces the enemy queen is tied to defending
        score += WEAK_QUEEN_PROTECTION * (weak & a.by(them, PieceType::Q)).count_bits();

        score
    }

    /// Enemy pieces a safe single or double pawn push would attack.
    fn pawn_push_threats<P: PlayerTrait>(&self) -> BitBoard {
        let us = P::player();
        let them = P::opp_player();
        let board = self.board;
        let a = &self.attacks;

        let occupied = board.occupied();
        let third_rank = match us {
            Player::White => BitBoard(RANK_3),
            Player::Black => BitBoard(RANK_6),
        };
        let safe = !a.all(them) | a.all(us);

        let mut b = P::shift_up(board.piece_bb(us, PieceType::P)) & !occupied;
        b |= P::shift_up(b & third_rank) & !occupied;
        b &= !a.by(them, PieceType::P) & safe;

        let non_pawn_enemies =
            board.get_occupied_player(them) & !board.piece_bb_both_players(PieceType::P);
        pawn_attacks_bb::<P>(b) & non_pawn_enemies
    }

    /// Safe squares from which our knights and sliders could attack a lone
    /// enemy queen next move. Doubled when we have no queen of our own.
    fn queen_threats<P: PlayerTrait>(&self, strongly_protected: BitBoard) -> Score {
        let us = P::player();
        let them = P::opp_player();
        let board = self.board;
        let a = &self.attacks;

        if board.count_piece(them, PieceType::Q) != 1 {
            return Score::ZERO;
        }
        let sq = match board.piece_bb(them, PieceType::Q).pop_some_lsb() {
            Some(sq) => sq,
            None => return Score::ZERO,
        };

        let occupied = board.occupied();
        let factor = 1 + (board.count_piece(us, PieceType::Q) == 0) as u8;
        let safe = a.mobility_area[us as usize]
            & !board.piece_bb(us, PieceType::P)
            & !strongly_protected;

        let knights = a.by(us, PieceType::N) & knight_moves(sq) & safe;

        let sliders = ((a.by(us, PieceType::B) & bishop_moves(occupied, sq))
            | (a.by(us, PieceType::R) & rook_moves(occupied, sq)))
            & safe
            & a.twice(us);

        KNIGHT_ON_QUEEN * (knights.count_bits() * factor)
            + SLIDER_ON_QUEEN * (sliders.count_bits() * factor)
    }
}
