//! Pawn-structure cache. Everything in an [`Entry`] depends on pawn placement
//! alone, so entries are keyed by the board's pawn Zobrist key and reused
//! across every position sharing that pawn skeleton.

use pleco::{
    core::{
        masks::DARK_SQUARES,
        mono_traits::{BlackType, PlayerTrait, WhiteType},
        score::Score,
        CastleType, ALL_FILES,
    },
    helper::prelude::{
        adjacent_file, forward_file_bb, forward_rank_bb, king_moves, passed_pawn_mask,
        pawn_attacks_span, ring_distance,
    },
    BitBoard, Board, PieceType, Player, SQ,
};

use crate::{
    bitboards::{edge_distance, pawn_attacks_bb},
    consts::EvalVal,
};

pub const PAWN_TABLE_SIZE: usize = 16384;

const BACKWARD: Score = Score(9, 24);
const DOUBLED: Score = Score(11, 56);
const ISOLATED: Score = Score(5, 15);
const WEAK_LEVER: Score = Score(0, 56);
const WEAK_UNOPPOSED: Score = Score(13, 27);

// Connected pawn bonus by relative rank
const CONNECTED: [EvalVal; 8] = [0, 7, 8, 12, 29, 48, 86, 0];

// Strength of our pawn shelter in front of the king, by [edge distance][rank].
// Rank 0 means no own pawn on that file.
const SHELTER_STRENGTH: [[EvalVal; 8]; 4] = [
    [ -6, 81, 93, 58, 39, 18, 25, 0],
    [-43, 61, 35, -49, -29, -11, -63, 0],
    [-10, 75, 23, -2, 32, 3, -45, 0],
    [-39, -13, -29, -52, -48, -67, -166, 0],
];

// Danger of enemy pawns moving toward our king, by [edge distance][rank],
// when the storming pawn is not blocked by one of ours.
const UNBLOCKED_STORM: [[EvalVal; 8]; 4] = [
    [85, -289, -166, 97, 50, 45, 50, 0],
    [46, -25, 122, 45, 37, -10, 20, 0],
    [-6, 51, 168, 34, -2, -22, -14, 0],
    [-15, -11, 101, 4, 11, -15, -29, 0],
];

const BLOCKED_STORM: [Score; 8] = [
    Score(0, 0), Score(0, 0), Score(76, 78), Score(-10, 15),
    Score(-7, 10), Score(-4, 6), Score(-1, 2), Score(0, 0),
];

#[derive(Clone, Copy)]
pub struct Entry {
    key: u64,
    valid: bool,
    scores: [Score; 2],
    passed_pawns: [BitBoard; 2],
    pawn_attacks: [BitBoard; 2],
    pawn_attacks_span: [BitBoard; 2],
    // [player][light = 0, dark = 1]
    pawns_on_squares: [[i32; 2]; 2],
    blocked_count: i32,
}

impl Entry {
    const EMPTY: Entry = Entry {
        key: 0,
        valid: false,
        scores: [Score::ZERO; 2],
        passed_pawns: [BitBoard(0); 2],
        pawn_attacks: [BitBoard(0); 2],
        pawn_attacks_span: [BitBoard(0); 2],
        pawns_on_squares: [[0; 2]; 2],
        blocked_count: 0,
    };

    /// Builds a fresh entry for `board`'s pawn skeleton.
    pub fn compute(board: &Board) -> Entry {
        let mut e = Entry::EMPTY;
        e.key = board.pawn_key();
        e.valid = true;
        e.scores[Player::White as usize] = e.evaluate::<WhiteType>(board);
        e.scores[Player::Black as usize] = e.evaluate::<BlackType>(board);
        e
    }

    #[inline(always)]
    pub fn pawn_score(&self, player: Player) -> Score {
        self.scores[player as usize]
    }

    #[inline(always)]
    pub fn pawn_attacks(&self, player: Player) -> BitBoard {
        self.pawn_attacks[player as usize]
    }

    #[inline(always)]
    pub fn pawn_attacks_span(&self, player: Player) -> BitBoard {
        self.pawn_attacks_span[player as usize]
    }

    #[inline(always)]
    pub fn passed_pawns(&self, player: Player) -> BitBoard {
        self.passed_pawns[player as usize]
    }

    #[inline(always)]
    pub fn passed_count(&self) -> i32 {
        (self.passed_pawns[0] | self.passed_pawns[1]).count_bits() as i32
    }

    #[inline(always)]
    pub fn blocked_count(&self) -> i32 {
        self.blocked_count
    }

    #[inline(always)]
    pub fn pawns_on_same_color_squares(&self, player: Player, sq: SQ) -> i32 {
        let dark = (sq.to_bb() & BitBoard(DARK_SQUARES)).is_not_empty();
        self.pawns_on_squares[player as usize][dark as usize]
    }

    fn evaluate<P: PlayerTrait>(&mut self, board: &Board) -> Score {
        let us = P::player();
        let u = us as usize;
        let our_pawns = board.piece_bb(us, PieceType::P);
        let their_pawns = board.piece_bb(P::opp_player(), PieceType::P);
        let double_attack_them = P::shift_down_left(their_pawns) & P::shift_down_right(their_pawns);

        let mut score = Score::ZERO;

        self.passed_pawns[u] = BitBoard(0);
        self.pawn_attacks[u] = pawn_attacks_bb::<P>(our_pawns);
        self.pawn_attacks_span[u] = self.pawn_attacks[u];
        self.pawns_on_squares[u][1] = (our_pawns & BitBoard(DARK_SQUARES)).count_bits() as i32;
        self.pawns_on_squares[u][0] = our_pawns.count_bits() as i32 - self.pawns_on_squares[u][1];
        self.blocked_count +=
            (P::shift_up(our_pawns) & (their_pawns | double_attack_them)).count_bits() as i32;

        for s in our_pawns {
            let r = us.relative_rank_of_sq(s) as usize;
            let up = P::up(s);

            let opposed = their_pawns & forward_file_bb(us, s);
            let blocked = their_pawns & up.to_bb();
            let stoppers = their_pawns & passed_pawn_mask(us, s);
            let lever = their_pawns & pawn_attacks_bb::<P>(s.to_bb());
            let lever_push = their_pawns & pawn_attacks_bb::<P>(up.to_bb());
            let doubled = our_pawns & P::down(s).to_bb();
            let neighbours = our_pawns & adjacent_file(s.file());
            let phalanx = neighbours & s.rank_bb();
            let support = neighbours & P::down(s).rank_bb();

            // Behind every neighbour on the adjacent files and unable to
            // advance safely.
            let backward = (neighbours & forward_rank_bb(P::opp_player(), up.rank())).is_empty()
                && (lever_push | blocked).is_not_empty();

            if !backward && blocked.is_empty() {
                self.pawn_attacks_span[u] |= pawn_attacks_span(us, s);
            }

            let mut passed = (stoppers ^ lever).is_empty()
                || ((stoppers ^ lever_push).is_empty()
                    && phalanx.count_bits() >= lever_push.count_bits())
                || (stoppers == blocked
                    && r >= 4
                    && (P::shift_up(support) & !(their_pawns | double_attack_them))
                        .is_not_empty());
            passed &= (forward_file_bb(us, s) & our_pawns).is_empty();

            if passed {
                self.passed_pawns[u] |= s.to_bb();
            }

            if (support | phalanx).is_not_empty() {
                let v = CONNECTED[r]
                    * (2 + phalanx.is_not_empty() as i32 - opposed.is_not_empty() as i32)
                    + 21 * support.count_bits() as i32;
                score += Score::new(v, v * (r as i32 - 2) / 4);
            } else if neighbours.is_empty() {
                if opposed.is_not_empty()
                    && (our_pawns & forward_file_bb(P::opp_player(), s)).is_not_empty()
                    && (their_pawns & adjacent_file(s.file())).is_empty()
                {
                    score -= DOUBLED;
                } else {
                    score -= ISOLATED + WEAK_UNOPPOSED * opposed.is_empty() as u8;
                }
            } else if backward {
                score -= BACKWARD + WEAK_UNOPPOSED * opposed.is_empty() as u8;
            }

            if support.is_empty() {
                score -= DOUBLED * doubled.is_not_empty() as u8
                    + WEAK_LEVER * lever.more_than_one() as u8;
            }
        }

        score
    }

    /// King shelter and enemy pawn storm for `P`, also considering the
    /// squares the king could still castle to. Depends on the king square,
    /// so it is evaluated on demand rather than cached.
    pub fn king_safety<P: PlayerTrait>(&self, board: &Board) -> Score {
        let us = P::player();
        let ksq = board.king_sq(us);
        let better = |a: Score, b: Score| if b.mg() > a.mg() { b } else { a };

        let (king_side, queen_side) = match us {
            Player::White => (SQ(6), SQ(2)),
            Player::Black => (SQ(62), SQ(58)),
        };

        let mut shelter = self.evaluate_shelter::<P>(board, ksq);
        if board.can_castle(us, CastleType::KingSide) {
            shelter = better(shelter, self.evaluate_shelter::<P>(board, king_side));
        }
        if board.can_castle(us, CastleType::QueenSide) {
            shelter = better(shelter, self.evaluate_shelter::<P>(board, queen_side));
        }

        // In the endgame the king wants to stay near its closest pawn
        let pawns = board.piece_bb(us, PieceType::P);
        let mut min_pawn_dist: EvalVal = 1;
        if (pawns & king_moves(ksq)).is_empty() {
            while min_pawn_dist < 6 && (ring_distance(ksq, min_pawn_dist as u8) & pawns).is_empty() {
                min_pawn_dist += 1;
            }
        }

        shelter - Score::new(0, 16 * min_pawn_dist)
    }

    fn evaluate_shelter<P: PlayerTrait>(&self, board: &Board, ksq: SQ) -> Score {
        let us = P::player();
        let them = P::opp_player();

        let b = board.piece_bb_both_players(PieceType::P) & !forward_rank_bb(them, ksq.rank());
        let our_pawns = b & board.piece_bb(us, PieceType::P) & !self.pawn_attacks(them);
        let their_pawns = b & board.piece_bb(them, PieceType::P);

        let mut bonus = Score::new(5, 5);

        let center = (ksq.file() as usize).clamp(1, 6);
        for file in &ALL_FILES[center - 1..=center + 1] {
            let ours = our_pawns & file.bb();
            let our_rank = if ours.is_not_empty() {
                us.relative_rank_of_sq(ours.backmost_sq(us)) as usize
            } else {
                0
            };

            let theirs = their_pawns & file.bb();
            let their_rank = if theirs.is_not_empty() {
                us.relative_rank_of_sq(theirs.backmost_sq(us)) as usize
            } else {
                0
            };

            let d = edge_distance(*file);
            bonus += Score::new(SHELTER_STRENGTH[d][our_rank], 0);

            if our_rank != 0 && our_rank + 1 == their_rank {
                bonus -= BLOCKED_STORM[their_rank];
            } else {
                bonus -= Score::new(UNBLOCKED_STORM[d][their_rank], 0);
            }
        }

        bonus
    }
}

/// Direct-mapped pawn-structure cache, one per search thread.
pub struct PawnTable {
    entries: Vec<Entry>,
}

impl PawnTable {
    pub fn new() -> Self {
        Self::with_size(PAWN_TABLE_SIZE)
    }

    /// `size` must be a power of two.
    pub fn with_size(size: usize) -> Self {
        debug_assert!(size.is_power_of_two());
        log::debug!("allocating pawn table with {size} entries");
        PawnTable {
            entries: vec![Entry::EMPTY; size],
        }
    }

    /// Returns the entry for `board`'s pawn skeleton, computing it on a miss.
    pub fn probe(&mut self, board: &Board) -> &Entry {
        let key = board.pawn_key();
        let idx = (key as usize) & (self.entries.len() - 1);
        let entry = &mut self.entries[idx];
        if !entry.valid || entry.key != key {
            *entry = Entry::compute(board);
        }
        entry
    }
}

impl Default for PawnTable {
    fn default() -> Self {
        Self::new()
    }
}
