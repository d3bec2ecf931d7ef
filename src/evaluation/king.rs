use pleco::{
    core::{
        masks::{RANK_1, RANK_2, RANK_3, RANK_6, RANK_7, RANK_8},
        mono_traits::PlayerTrait,
        score::Score,
    },
    helper::prelude::{bishop_moves, king_moves, knight_moves, rook_moves},
    BitBoard, PieceType, Player,
};

use super::classical::ClassicalEvaluator;
use crate::{
    bitboards::KING_FLANK,
    debug::{EvalDebugger, Term, Tracing},
};

// Danger added for a safe check by [piece type][several checking squares]
const SAFE_CHECK: [[i32; 2]; 6] = [
    [0, 0],
    [0, 0],
    [792, 1283],
    [645, 967],
    [1084, 1897],
    [772, 1119],
];

const FLANK_ATTACKS: Score = Score(8, 0);
const PAWNLESS_FLANK: Score = Score(17, 95);

fn safe_check(piece: PieceType, checks: BitBoard) -> i32 {
    SAFE_CHECK[piece as usize][checks.more_than_one() as usize]
}

impl<'a, T: Tracing<EvalDebugger>> ClassicalEvaluator<'a, T> {
    pub(super) fn king<P: PlayerTrait>(&mut self) -> Score {
        let us = P::player();
        let them = P::opp_player();
        let board = self.board;
        let ksq = board.king_sq(us);
        let a = &self.attacks;

        let mut score = self.pawns.king_safety::<P>(board);

        let weak = self.weak_squares::<P>();
        let (check_danger, unsafe_checks) = self.check_danger::<P>(weak);
        let (flank_attack, flank_defense) = self.flank_pressure::<P>();

        let u = us as usize;
        let t = them as usize;
        let danger = check_danger
            + a.king_attackers_count[t] * a.king_attackers_weight[t]
            + 185 * (a.king_ring[u] & weak).count_bits() as i32
            + 148 * unsafe_checks.count_bits() as i32
            + 98 * a.blockers_for_king[u].count_bits() as i32
            + 69 * a.king_attacks_count[t]
            + 3 * flank_attack * flank_attack / 8
            + (self.mobility[t] - self.mobility[u]).mg()
            - 873 * (board.count_piece(them, PieceType::Q) == 0) as i32
            - 100 * (a.by(us, PieceType::N) & king_moves(ksq)).is_not_empty() as i32
            - 6 * score.mg() / 8
            - 4 * flank_defense
            + 37;

        score -= danger_penalty(danger);

        if (board.piece_bb_both_players(PieceType::P) & KING_FLANK[ksq.file() as usize]).is_empty() {
            score -= PAWNLESS_FLANK;
        }

        score -= FLANK_ATTACKS * flank_attack as u8;

        if let Some(dbg) = self.tracer.trace() {
            dbg.set_eval(Term::King, us, score);
        }
        score
    }

    /// Squares attacked by the enemy and defended at most once by our queen
    /// or king.
    fn weak_squares<P: PlayerTrait>(&self) -> BitBoard {
        let (us, them) = (P::player(), P::opp_player());
        let a = &self.attacks;
        a.all(them)
            & !a.twice(us)
            & (!a.all(us) | a.by(us, PieceType::K) | a.by(us, PieceType::Q))
    }

    /// Danger from the enemy's safe checks, and the checking squares that
    /// are available but not safe.
    fn check_danger<P: PlayerTrait>(&self, weak: BitBoard) -> (i32, BitBoard) {
        let (us, them) = (P::player(), P::opp_player());
        let board = self.board;
        let ksq = board.king_sq(us);
        let a = &self.attacks;

        let mut danger = 0;
        let mut unsafe_checks = BitBoard(0);

        let safe = !board.get_occupied_player(them) & (!a.all(us) | (weak & a.twice(them)));

        let through_queen = board.occupied() ^ board.piece_bb(us, PieceType::Q);
        let rook_lines = rook_moves(through_queen, ksq);
        let bishop_lines = bishop_moves(through_queen, ksq);

        let rook_checks = rook_lines & a.by(them, PieceType::R) & safe;
        if rook_checks.is_not_empty() {
            danger += safe_check(PieceType::R, rook_checks);
        } else {
            unsafe_checks |= rook_lines & a.by(them, PieceType::R);
        }

        // Queen checks are only counted when they are not already covered by
        // a rook check and the square is not defended by our queen.
        let queen_checks = (rook_lines | bishop_lines)
            & a.by(them, PieceType::Q)
            & safe
            & !a.by(us, PieceType::Q)
            & !rook_checks;
        if queen_checks.is_not_empty() {
            danger += safe_check(PieceType::Q, queen_checks);
        }

        let bishop_checks = bishop_lines & a.by(them, PieceType::B) & safe & !queen_checks;
        if bishop_checks.is_not_empty() {
            danger += safe_check(PieceType::B, bishop_checks);
        } else {
            unsafe_checks |= bishop_lines & a.by(them, PieceType::B);
        }

        let knight_checks = knight_moves(ksq) & a.by(them, PieceType::N);
        if (knight_checks & safe).is_not_empty() {
            danger += safe_check(PieceType::N, knight_checks & safe);
        } else {
            unsafe_checks |= knight_checks;
        }

        (danger, unsafe_checks)
    }

    /// Enemy attacks on our king's flank, doubled attacks counted twice,
    /// and our own defenders of the same squares. Only our first five ranks
    /// count.
    fn flank_pressure<P: PlayerTrait>(&self) -> (i32, i32) {
        let (us, them) = (P::player(), P::opp_player());
        let a = &self.attacks;

        let camp = match us {
            Player::White => !BitBoard(RANK_6 | RANK_7 | RANK_8),
            Player::Black => !BitBoard(RANK_1 | RANK_2 | RANK_3),
        };
        let flank = KING_FLANK[self.board.king_sq(us).file() as usize] & camp;

        let attacked = a.all(them) & flank;
        let attack = attacked.count_bits() + (attacked & a.twice(them)).count_bits();
        let defense = (a.all(us) & flank).count_bits();
        (attack as i32, defense as i32)
    }
}

/// Converts accumulated king danger into a penalty. Zero until the danger
/// crosses the threshold, then quadratic in the middlegame.
fn danger_penalty(danger: i32) -> Score {
    if danger > 100 {
        Score::new(danger * danger / 4096, danger / 16)
    } else {
        Score::ZERO
    }
}

#[cfg(test)]
mod tests {
    use pleco::{core::mono_traits::WhiteType, Board};

    use super::*;
    use crate::evaluation::{classical::with_attacks, trace_breakdown};

    #[test]
    fn test_danger_is_superlinear() {
        assert_eq!(danger_penalty(100), Score::ZERO);
        let single = danger_penalty(1000);
        let double = danger_penalty(2000);
        assert!(double.mg() > 2 * single.mg());
        assert!(double.mg() > double.eg());
    }

    #[test]
    fn test_safe_check_entries() {
        assert_eq!(safe_check(PieceType::R, BitBoard(1)), 1084);
        assert_eq!(safe_check(PieceType::R, BitBoard(0b101)), 1897);
        assert_eq!(safe_check(PieceType::N, BitBoard(1 << 20)), 792);
    }

    #[test]
    fn test_two_safe_rook_checks() {
        // The h3 rook can check from a3 and from h1
        with_attacks("4k3/8/8/8/8/7r/8/K7 w - - 0 1", |ev| {
            let weak = ev.weak_squares::<WhiteType>();
            let (danger, unsafe_checks) = ev.check_danger::<WhiteType>(weak);
            assert_eq!(danger, 1897);
            assert!(unsafe_checks.is_empty());
        });

        // h2 shuts the h-file, leaving a3
        with_attacks("4k3/8/8/8/8/7r/7P/K7 w - - 0 1", |ev| {
            let weak = ev.weak_squares::<WhiteType>();
            assert_eq!(ev.check_danger::<WhiteType>(weak).0, 1084);
        });
    }

    #[test]
    fn test_flank_attack_and_pawnless_flank() {
        // The e8 rook hits e1-e5, the g1 king covers five flank squares
        let fen = "k3r3/8/8/8/8/8/8/6K1 w - - 0 1";
        with_attacks(fen, |ev| {
            assert_eq!(ev.flank_pressure::<WhiteType>(), (5, 5));
        });

        // Shelter (-179, -91), danger 428 costs (44, 26), then the pawnless
        // flank and five flank attacks.
        let dbg = trace_breakdown(&Board::from_fen(fen).unwrap()).unwrap();
        let king = dbg.eval(Term::King).white();
        assert_eq!(king, Score(-179 - 44, -91 - 26) - PAWNLESS_FLANK - FLANK_ATTACKS * 5u8);
        assert_eq!(king, Score(-280, -212));
    }

    #[test]
    fn test_exposed_king_is_penalized() {
        // Black's king has lost its shelter and faces the white queen and rook
        let board = Board::from_fen("6k1/5p2/8/8/8/5Q2/5PPP/3R2K1 b - - 0 1").unwrap();
        let dbg = trace_breakdown(&board).unwrap();
        let king = dbg.eval(Term::King);
        assert!(king.white().mg() > king.black().mg());
    }
}
