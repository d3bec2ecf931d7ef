use pleco::{
    core::{
        masks::{RANK_3, RANK_4, RANK_5, RANK_6},
        mono_traits::PlayerTrait,
        score::Score,
        CastleType,
    },
    helper::prelude::{bishop_moves, distance_of_sqs, knight_moves, line_bb, rook_moves},
    BitBoard, PieceType, Player, SQ,
};

use super::classical::ClassicalEvaluator;
use crate::{
    bitboards::{CENTER, CENTER_FILES, KING_SIDE, QUEEN_SIDE},
    debug::{EvalDebugger, Term, Tracing},
    evaluation::attacks::slider_blockers,
};

const KNIGHT_MOBILITY: [Score; 9] = [
    Score(-62, -81), Score(-53, -56), Score(-12, -31), Score(-4, -16), Score(3, 5), Score(13, 11),
    Score(22, 17), Score(28, 20), Score(33, 25),
];

const BISHOP_MOBILITY: [Score; 14] = [
    Score(-48, -59), Score(-20, -23), Score(16, -3), Score(26, 13), Score(38, 24), Score(51, 42),
    Score(55, 54), Score(63, 57), Score(63, 65), Score(68, 73), Score(81, 78), Score(81, 86),
    Score(91, 88), Score(98, 97),
];

const ROOK_MOBILITY: [Score; 15] = [
    Score(-60, -78), Score(-20, -17), Score(2, 23), Score(3, 39), Score(3, 70), Score(11, 99),
    Score(22, 103), Score(31, 121), Score(40, 134), Score(40, 139), Score(41, 158), Score(48, 164),
    Score(57, 168), Score(57, 169), Score(62, 172),
];

const QUEEN_MOBILITY: [Score; 28] = [
    Score(-30, -48), Score(-12, -30), Score(-8, -7), Score(-9, 19), Score(20, 40), Score(23, 55),
    Score(23, 59), Score(35, 75), Score(38, 78), Score(53, 96), Score(64, 96), Score(65, 100),
    Score(65, 121), Score(66, 127), Score(67, 131), Score(67, 133), Score(72, 136), Score(72, 141),
    Score(77, 147), Score(79, 150), Score(93, 151), Score(108, 168), Score(108, 168), Score(108, 171),
    Score(110, 182), Score(114, 182), Score(114, 192), Score(116, 219),
];

// [knight, bishop]
const KING_PROTECTOR: [Score; 2] = [Score(8, 9), Score(6, 9)];
const OUTPOST: [Score; 2] = [Score(56, 36), Score(30, 23)];

// [semi-open, open]
const ROOK_ON_FILE: [Score; 2] = [Score(19, 7), Score(48, 29)];

const BAD_OUTPOST: Score = Score(-7, 36);
const BISHOP_ON_KING_RING: Score = Score(24, 0);
const BISHOP_PAWNS: Score = Score(3, 7);
const BISHOP_XRAY_PAWNS: Score = Score(4, 5);
const CORNERED_BISHOP: Score = Score(50, 50);
const LONG_DIAGONAL_BISHOP: Score = Score(45, 0);
const MINOR_BEHIND_PAWN: Score = Score(18, 3);
const QUEEN_INFILTRATION: Score = Score(-2, 14);
const REACHABLE_OUTPOST: Score = Score(31, 22);
const ROOK_ON_KING_RING: Score = Score(16, 0);
const ROOK_ON_QUEEN_FILE: Score = Score(6, 11);
const TRAPPED_ROOK: Score = Score(55, 13);
const WEAK_QUEEN: Score = Score(56, 15);

/// Mobility bonus for a `piece` reaching `count` squares. Counts past the end
/// of a table take its last entry.
pub fn mobility_bonus(piece: PieceType, count: i32) -> Score {
    let table: &[Score] = match piece {
        PieceType::N => &KNIGHT_MOBILITY,
        PieceType::B => &BISHOP_MOBILITY,
        PieceType::R => &ROOK_MOBILITY,
        PieceType::Q => &QUEEN_MOBILITY,
        _ => return Score::ZERO,
    };
    let idx = (count.max(0) as usize).min(table.len() - 1);
    table[idx]
}

fn piece_term(piece: PieceType) -> Term {
    match piece {
        PieceType::N => Term::Knight,
        PieceType::B => Term::Bishop,
        PieceType::R => Term::Rook,
        _ => Term::Queen,
    }
}

impl<'a, T: Tracing<EvalDebugger>> ClassicalEvaluator<'a, T> {
    /// Attacks, mobility and placement bonuses of every `P` piece of type
    /// `piece`. Mobility is accumulated separately in `self.mobility`.
    pub(super) fn pieces<P: PlayerTrait>(&mut self, piece: PieceType) -> Score {
        let us = P::player();
        let them = P::opp_player();
        let board = self.board;
        let ksq = board.king_sq(us);

        let occupied = board.occupied();
        let all_pawns = board.piece_bb_both_players(PieceType::P);
        let queens = board.piece_bb_both_players(PieceType::Q);

        let mut score = Score::ZERO;
        for sq in board.piece_bb(us, piece) {
            // Sliders see through queens, rooks also through their own rooks
            let mut b = match piece {
                PieceType::N => knight_moves(sq),
                PieceType::B => bishop_moves(occupied ^ queens, sq),
                PieceType::R => {
                    rook_moves(occupied ^ queens ^ board.piece_bb(us, PieceType::R), sq)
                }
                _ => bishop_moves(occupied, sq) | rook_moves(occupied, sq),
            };

            if (self.attacks.blockers_for_king[us as usize] & sq.to_bb()).is_not_empty() {
                b &= line_bb(ksq, sq);
            }

            let on_ring = self.attacks.add_piece_attacks(us, piece, b);
            let their_ring = self.attacks.king_ring[them as usize];
            if !on_ring {
                if piece == PieceType::R && (sq.file_bb() & their_ring).is_not_empty() {
                    score += ROOK_ON_KING_RING;
                } else if piece == PieceType::B
                    && (bishop_moves(all_pawns, sq) & their_ring).is_not_empty()
                {
                    score += BISHOP_ON_KING_RING;
                }
            }

            let mob = (b & self.attacks.mobility_area[us as usize]).count_bits();
            self.mobility[us as usize] += mobility_bonus(piece, mob as i32);

            match piece {
                PieceType::N | PieceType::B => {
                    score += self.minor_placement::<P>(piece, sq, b);
                }
                PieceType::R => {
                    if (sq.file_bb() & board.piece_bb(them, PieceType::Q)).is_not_empty() {
                        score += ROOK_ON_QUEEN_FILE;
                    }

                    let file = sq.file_bb();
                    if (board.piece_bb(us, PieceType::P) & file).is_empty() {
                        let open = (board.piece_bb(them, PieceType::P) & file).is_empty();
                        score += ROOK_ON_FILE[open as usize];
                    } else if mob <= 3 {
                        // Penalize a rook boxed in by its own uncastled king,
                        // more so when castling can no longer free it.
                        let kf = ksq.file() as u8;
                        if (kf < 4) == ((sq.file() as u8) < kf) {
                            let can_castle = board.can_castle(us, CastleType::KingSide)
                                || board.can_castle(us, CastleType::QueenSide);
                            score -= TRAPPED_ROOK * (1 + !can_castle as u8);
                        }
                    }
                }
                _ => {
                    let sliders =
                        board.piece_bb(them, PieceType::R) | board.piece_bb(them, PieceType::B);
                    if slider_blockers(board, sliders, sq, us).0.is_not_empty() {
                        score -= WEAK_QUEEN;
                    }

                    if us.relative_rank_of_sq(sq) as u8 > 3
                        && (self.pawns.pawn_attacks_span(them) & sq.to_bb()).is_empty()
                    {
                        score += QUEEN_INFILTRATION;
                    }
                }
            }
        }

        if let Some(dbg) = self.tracer.trace() {
            dbg.set_eval(piece_term(piece), us, score);
        }
        score
    }

    fn minor_placement<P: PlayerTrait>(&self, piece: PieceType, sq: SQ, b: BitBoard) -> Score {
        let us = P::player();
        let them = P::opp_player();
        let board = self.board;
        let all_pawns = board.piece_bb_both_players(PieceType::P);
        let sq_bb = sq.to_bb();
        let our_pawn_attacks = self.attacks.by(us, PieceType::P);

        let outpost_ranks = match us {
            Player::White => BitBoard(RANK_4 | RANK_5 | RANK_6),
            Player::Black => BitBoard(RANK_5 | RANK_4 | RANK_3),
        };

        let mut score = Score::ZERO;

        let outposts = outpost_ranks
            & (our_pawn_attacks | P::shift_down(all_pawns))
            & !self.pawns.pawn_attacks_span(them);
        let targets = board.get_occupied_player(them) & !all_pawns;
        let flank = if (sq_bb & QUEEN_SIDE).is_not_empty() { QUEEN_SIDE } else { KING_SIDE };

        if piece == PieceType::N
            && (outposts & sq_bb & !CENTER_FILES).is_not_empty()
            && (b & targets).is_empty()
            && !(targets & flank).more_than_one()
        {
            score += BAD_OUTPOST;
        } else if (outposts & sq_bb).is_not_empty() {
            score += OUTPOST[(piece == PieceType::B) as usize];
        } else if piece == PieceType::N
            && (outposts & b & !board.get_occupied_player(us)).is_not_empty()
        {
            score += REACHABLE_OUTPOST;
        }

        if (P::shift_down(all_pawns) & sq_bb).is_not_empty() {
            score += MINOR_BEHIND_PAWN;
        }

        score -= KING_PROTECTOR[(piece == PieceType::B) as usize]
            * distance_of_sqs(board.king_sq(us), sq);

        if piece == PieceType::B {
            let our_pawns = board.piece_bb(us, PieceType::P);
            let blocked = our_pawns & P::shift_down(board.occupied());

            let unsupported = (our_pawn_attacks & sq_bb).is_empty() as i32;
            let same_color = self.pawns.pawns_on_same_color_squares(us, sq)
                * (unsupported + (blocked & CENTER_FILES).count_bits() as i32);
            score -= BISHOP_PAWNS * same_color as u8;

            score -= BISHOP_XRAY_PAWNS
                * (bishop_moves(BitBoard(0), sq) & board.piece_bb(them, PieceType::P)).count_bits();

            if (bishop_moves(all_pawns, sq) & CENTER).more_than_one() {
                score += LONG_DIAGONAL_BISHOP;
            }

            score -= self.cornered_bishop::<P>(sq);
        }

        score
    }

    /// A bishop in its own corner walled in by a pawn on the adjacent
    /// diagonal square.
    fn cornered_bishop<P: PlayerTrait>(&self, sq: SQ) -> Score {
        let (a1, h1) = match P::player() {
            Player::White => (SQ(0), SQ(7)),
            Player::Black => (SQ(56), SQ(63)),
        };
        if sq != a1 && sq != h1 {
            return Score::ZERO;
        }

        let board = self.board;
        let our_pawns = board.piece_bb(P::player(), PieceType::P);
        let up = P::up(sq);
        let diag = if sq == a1 { SQ(up.0 + 1) } else { SQ(up.0 - 1) };
        if (our_pawns & diag.to_bb()).is_empty() {
            return Score::ZERO;
        }

        let ahead = P::up(diag);
        let beyond = P::up(if sq == a1 { SQ(diag.0 + 1) } else { SQ(diag.0 - 1) });

        if (board.occupied() & ahead.to_bb()).is_not_empty() {
            CORNERED_BISHOP * 4u8
        } else if (our_pawns & beyond.to_bb()).is_not_empty() {
            CORNERED_BISHOP * 2u8
        } else {
            CORNERED_BISHOP
        }
    }
}
