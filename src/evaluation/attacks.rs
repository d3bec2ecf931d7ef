//! Attack bookkeeping shared by every classical term. Built once per
//! evaluation: pawn and king attacks are seeded up front, the piece loops
//! fill in the rest as they walk the board.

use pleco::{
    core::{
        masks::{RANK_2, RANK_3, RANK_6, RANK_7},
        mono_traits::{BlackType, PlayerTrait, WhiteType},
    },
    helper::prelude::{between_bb, bishop_moves, king_moves, rook_moves},
    BitBoard, Board, PieceType, Player, SQ,
};

use crate::{bitboards::pawn_double_attacks_bb, tables::pawn_table};

/// Weight added to the attacking side for each piece of a given type that
/// hits the enemy king ring. Indexed by `PieceType as usize`.
pub const KING_ATTACK_WEIGHTS: [i32; 8] = [0, 0, 81, 52, 44, 10, 0, 0];

const ALL: usize = PieceType::All as usize;

#[derive(Clone, Debug)]
pub struct AttackModel {
    /// `[player][piece type]`, with `PieceType::All` holding the union.
    pub attacked_by: [[BitBoard; 8]; 2],
    /// Squares attacked at least twice, pawn double attacks included.
    pub attacked_by2: [BitBoard; 2],
    pub mobility_area: [BitBoard; 2],
    pub king_ring: [BitBoard; 2],
    /// Pieces (of either color) that alone shield a king from a slider.
    pub blockers_for_king: [BitBoard; 2],
    pub king_attackers_count: [i32; 2],
    pub king_attackers_weight: [i32; 2],
    pub king_attacks_count: [i32; 2],
}

impl AttackModel {
    pub fn new(board: &Board, pawns: &pawn_table::Entry) -> Self {
        let mut model = AttackModel {
            attacked_by: [[BitBoard(0); 8]; 2],
            attacked_by2: [BitBoard(0); 2],
            mobility_area: [BitBoard(0); 2],
            king_ring: [BitBoard(0); 2],
            blockers_for_king: [BitBoard(0); 2],
            king_attackers_count: [0; 2],
            king_attackers_weight: [0; 2],
            king_attacks_count: [0; 2],
        };
        for us in [Player::White, Player::Black] {
            let enemies = board.get_occupied_player(us.other_player());
            model.blockers_for_king[us as usize] =
                slider_blockers(board, enemies, board.king_sq(us), us).0;
        }
        model.seed::<WhiteType>(board, pawns);
        model.seed::<BlackType>(board, pawns);
        model
    }

    fn seed<P: PlayerTrait>(&mut self, board: &Board, pawns: &pawn_table::Entry) {
        let us = P::player();
        let them = P::opp_player();
        let u = us as usize;
        let ksq = board.king_sq(us);
        let our_pawns = board.piece_bb(us, PieceType::P);
        let double_pawn_attacks = pawn_double_attacks_bb::<P>(our_pawns);

        // Own pawns that are blocked or still on the second or third rank
        let low_ranks = match us {
            Player::White => BitBoard(RANK_2 | RANK_3),
            Player::Black => BitBoard(RANK_7 | RANK_6),
        };
        let stuck = our_pawns & (P::shift_down(board.occupied()) | low_ranks);

        // Only enemy pawns that are themselves pawn-defended take squares away
        let defended = board.piece_bb(them, PieceType::P) & pawns.pawn_attacks(them);
        let guarded = P::shift_down_left(defended) | P::shift_down_right(defended);

        self.mobility_area[u] = !(stuck
            | board.piece_bb(us, PieceType::K)
            | board.piece_bb(us, PieceType::Q)
            | self.blockers_for_king[u]
            | guarded);

        let king = king_moves(ksq);
        let pawn = pawns.pawn_attacks(us);
        self.attacked_by[u][PieceType::K as usize] = king;
        self.attacked_by[u][PieceType::P as usize] = pawn;
        self.attacked_by[u][ALL] = king | pawn;
        self.attacked_by2[u] = double_pawn_attacks | (king & pawn);

        // An edge king gets a ring shifted toward the center so it is never
        // smaller than nine squares.
        let file = (ksq.file() as u8).clamp(1, 6);
        let rank = (ksq.rank() as u8).clamp(1, 6);
        let center = SQ(rank * 8 + file);
        self.king_ring[u] = king_moves(center) | center.to_bb();

        let t = them as usize;
        self.king_attackers_count[t] =
            (self.king_ring[u] & pawns.pawn_attacks(them)).count_bits() as i32;
        self.king_attackers_weight[t] = 0;
        self.king_attacks_count[t] = 0;

        self.king_ring[u] &= !double_pawn_attacks;
    }

    #[inline(always)]
    pub fn by(&self, player: Player, piece: PieceType) -> BitBoard {
        self.attacked_by[player as usize][piece as usize]
    }

    #[inline(always)]
    pub fn all(&self, player: Player) -> BitBoard {
        self.attacked_by[player as usize][ALL]
    }

    #[inline(always)]
    pub fn twice(&self, player: Player) -> BitBoard {
        self.attacked_by2[player as usize]
    }

    /// Records the attacks of one `us` piece of type `piece`. Returns whether
    /// the piece hits the enemy king ring.
    pub fn add_piece_attacks(&mut self, us: Player, piece: PieceType, b: BitBoard) -> bool {
        let u = us as usize;
        let them = us.other_player() as usize;

        self.attacked_by2[u] |= self.attacked_by[u][ALL] & b;
        self.attacked_by[u][piece as usize] |= b;
        self.attacked_by[u][ALL] |= b;

        if (b & self.king_ring[them]).is_not_empty() {
            self.king_attackers_count[u] += 1;
            self.king_attackers_weight[u] += KING_ATTACK_WEIGHTS[piece as usize];
            self.king_attacks_count[u] +=
                (b & self.attacked_by[them][PieceType::K as usize]).count_bits() as i32;
            true
        } else {
            false
        }
    }
}

/// Pieces standing alone between `sq` and one of `sliders`, paired with the
/// sliders doing the pinning when the blocker belongs to `owner`.
pub fn slider_blockers(
    board: &Board,
    sliders: BitBoard,
    sq: SQ,
    owner: Player,
) -> (BitBoard, BitBoard) {
    let mut blockers = BitBoard(0);
    let mut pinners = BitBoard(0);

    let queens = board.piece_bb_both_players(PieceType::Q);
    let rooks = board.piece_bb_both_players(PieceType::R) | queens;
    let bishops = board.piece_bb_both_players(PieceType::B) | queens;

    let mut snipers = ((rook_moves(BitBoard(0), sq) & rooks)
        | (bishop_moves(BitBoard(0), sq) & bishops))
        & sliders;
    let occupancy = board.occupied() ^ snipers;

    let own = board.get_occupied_player(owner);

    while let Some(sniper) = snipers.pop_some_lsb() {
        let b = between_bb(sq, sniper) & occupancy;
        if b.is_not_empty() && !b.more_than_one() {
            blockers |= b;
            if (b & own).is_not_empty() {
                pinners |= sniper.to_bb();
            }
        }
    }
    (blockers, pinners)
}
