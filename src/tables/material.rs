//! Material cache: imbalance, game phase and draw-scaling factors, all of
//! which depend only on piece counts and are keyed by the material key.

use pleco::{core::score::Score, Board, PieceType, Player};

use crate::consts::{
    EvalVal, BISHOP_MG, ENDGAME_LIMIT, KNIGHT_MG, MAX_PHASE, MIDGAME_LIMIT, QUEEN_MG, ROOK_MG,
    SCALE_FACTOR_DRAW, SCALE_FACTOR_NORMAL,
};

pub const MATERIAL_TABLE_SIZE: usize = 8192;

// Polynomial material imbalance parameters, indexed by
// [bishop pair, pawn, knight, bishop, rook, queen].
const QUADRATIC_OURS: [[EvalVal; 6]; 6] = [
    [1438, 0, 0, 0, 0, 0],
    [40, 38, 0, 0, 0, 0],
    [32, 255, -62, 0, 0, 0],
    [0, 104, 4, 0, 0, 0],
    [-26, -2, 47, 105, -208, 0],
    [-189, 24, 117, 133, -134, -6],
];

const QUADRATIC_THEIRS: [[EvalVal; 6]; 6] = [
    [0, 0, 0, 0, 0, 0],
    [36, 0, 0, 0, 0, 0],
    [9, 63, 0, 0, 0, 0],
    [59, 65, 42, 0, 0, 0],
    [46, 39, 24, -24, 0, 0],
    [97, 100, -42, 137, 268, 0],
];

type PieceCounts = [[EvalVal; 6]; 2];

#[derive(Clone, Copy)]
pub struct Entry {
    key: u64,
    valid: bool,
    imbalance: Score,
    game_phase: EvalVal,
    factor: [EvalVal; 2],
}

impl Entry {
    const EMPTY: Entry = Entry {
        key: 0,
        valid: false,
        imbalance: Score::ZERO,
        game_phase: 0,
        factor: [SCALE_FACTOR_NORMAL; 2],
    };

    pub fn compute(board: &Board) -> Entry {
        let mut e = Entry::EMPTY;
        e.key = board.material_key();
        e.valid = true;

        let count = |p: Player, pt: PieceType| board.count_piece(p, pt) as EvalVal;

        let npm_w = non_pawn_material(board, Player::White);
        let npm_b = non_pawn_material(board, Player::Black);
        let npm = (npm_w + npm_b).clamp(ENDGAME_LIMIT, MIDGAME_LIMIT);
        e.game_phase = ((npm - ENDGAME_LIMIT) * MAX_PHASE) / (MIDGAME_LIMIT - ENDGAME_LIMIT);

        // Without pawns it is hard to win even with a small material edge.
        // This catches trivial draws like KK, KBK and KNK and gives a drawish
        // factor to KRKBP-like endings.
        if count(Player::White, PieceType::P) == 0 && npm_w - npm_b <= BISHOP_MG {
            e.factor[Player::White as usize] = pawnless_factor(npm_w, npm_b);
        }
        if count(Player::Black, PieceType::P) == 0 && npm_b - npm_w <= BISHOP_MG {
            e.factor[Player::Black as usize] = pawnless_factor(npm_b, npm_w);
        }

        let mut counts: PieceCounts = [[0; 6]; 2];
        for p in [Player::White, Player::Black] {
            counts[p as usize] = [
                (count(p, PieceType::B) > 1) as EvalVal,
                count(p, PieceType::P),
                count(p, PieceType::N),
                count(p, PieceType::B),
                count(p, PieceType::R),
                count(p, PieceType::Q),
            ];
        }

        let v = (imbalance(&counts, Player::White) - imbalance(&counts, Player::Black)) / 16;
        e.imbalance = Score::new(v, v);
        e
    }

    #[inline(always)]
    pub fn imbalance(&self) -> Score {
        self.imbalance
    }

    /// `MAX_PHASE` with all middlegame material on the board, 0 in a bare
    /// endgame.
    #[inline(always)]
    pub fn game_phase(&self) -> EvalVal {
        self.game_phase
    }

    #[inline(always)]
    pub fn scale_factor(&self, player: Player) -> EvalVal {
        self.factor[player as usize]
    }
}

fn pawnless_factor(npm_strong: EvalVal, npm_weak: EvalVal) -> EvalVal {
    if npm_strong < ROOK_MG {
        SCALE_FACTOR_DRAW
    } else if npm_weak <= BISHOP_MG {
        4
    } else {
        14
    }
}

fn imbalance(counts: &PieceCounts, us: Player) -> EvalVal {
    let ours = &counts[us as usize];
    let theirs = &counts[us.other_player() as usize];

    let mut bonus = 0;
    for pt1 in 0..6 {
        if ours[pt1] == 0 {
            continue;
        }
        let mut v = QUADRATIC_OURS[pt1][pt1] * ours[pt1];
        for pt2 in 0..pt1 {
            v += QUADRATIC_OURS[pt1][pt2] * ours[pt2] + QUADRATIC_THEIRS[pt1][pt2] * theirs[pt2];
        }
        bonus += ours[pt1] * v;
    }
    bonus
}

/// Middlegame value of `player`'s knights, bishops, rooks and queens, in
/// this crate's piece values rather than pleco's `Board::non_pawn_material`.
pub fn non_pawn_material(board: &Board, player: Player) -> EvalVal {
    board.count_piece(player, PieceType::N) as EvalVal * KNIGHT_MG
        + board.count_piece(player, PieceType::B) as EvalVal * BISHOP_MG
        + board.count_piece(player, PieceType::R) as EvalVal * ROOK_MG
        + board.count_piece(player, PieceType::Q) as EvalVal * QUEEN_MG
}

/// Direct-mapped material cache, one per search thread.
pub struct Material {
    entries: Vec<Entry>,
}

impl Material {
    pub fn new() -> Self {
        Self::with_size(MATERIAL_TABLE_SIZE)
    }

    /// `size` must be a power of two.
    pub fn with_size(size: usize) -> Self {
        debug_assert!(size.is_power_of_two());
        log::debug!("allocating material table with {size} entries");
        Material {
            entries: vec![Entry::EMPTY; size],
        }
    }

    pub fn probe(&mut self, board: &Board) -> &Entry {
        let key = board.material_key();
        let idx = (key as usize) & (self.entries.len() - 1);
        let entry = &mut self.entries[idx];
        if !entry.valid || entry.key != key {
            *entry = Entry::compute(board);
        }
        entry
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use pleco::{Board, Player};

    use super::*;

    #[test]
    fn test_start_pos_phase() {
        let board = Board::start_pos();
        let e = Entry::compute(&board);

        assert_eq!(e.game_phase(), MAX_PHASE);
        assert_eq!(e.imbalance(), Score::ZERO);
        assert_eq!(e.scale_factor(Player::White), SCALE_FACTOR_NORMAL);
        assert_eq!(e.scale_factor(Player::Black), SCALE_FACTOR_NORMAL);
    }

    #[test]
    fn test_bare_kings_are_drawn() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let e = Entry::compute(&board);

        assert_eq!(e.game_phase(), 0);
        assert_eq!(e.scale_factor(Player::White), SCALE_FACTOR_DRAW);
        assert_eq!(e.scale_factor(Player::Black), SCALE_FACTOR_DRAW);
    }

    #[test]
    fn test_minor_piece_alone_cannot_win() {
        // KBK: white has no pawns and less than a rook
        let board = Board::from_fen("4k3/8/8/8/8/8/8/2B1K3 w - - 0 1").unwrap();
        let e = Entry::compute(&board);
        assert_eq!(e.scale_factor(Player::White), SCALE_FACTOR_DRAW);
    }

    #[test]
    fn test_bishop_pair_imbalance() {
        // White keeps both bishops against bishop and knight
        let board = Board::from_fen("2b1k1n1/8/8/8/8/8/8/2B1KB2 w - - 0 1").unwrap();
        let e = Entry::compute(&board);
        assert!(e.imbalance().mg() > 0);
        assert_eq!(e.imbalance().mg(), e.imbalance().eg());
    }
}
