//! Board regions the evaluation terms need that pleco has no masks for, and
//! the set-wise pawn attack shifts built on `PlayerTrait`.

use pleco::{core::mono_traits::PlayerTrait, BitBoard, File};

pub const QUEEN_SIDE: BitBoard = BitBoard(0x0f0f_0f0f_0f0f_0f0f);
pub const CENTER_FILES: BitBoard = BitBoard(0x3c3c_3c3c_3c3c_3c3c);
pub const KING_SIDE: BitBoard = BitBoard(0xf0f0_f0f0_f0f0_f0f0);
pub const CENTER: BitBoard = BitBoard(0x0000_0018_1800_0000);

/// Files a king on the indexed file defends, used for flank attack counts.
pub const KING_FLANK: [BitBoard; 8] = [
    BitBoard(0x0707_0707_0707_0707),
    QUEEN_SIDE,
    QUEEN_SIDE,
    CENTER_FILES,
    CENTER_FILES,
    KING_SIDE,
    KING_SIDE,
    BitBoard(0xe0e0_e0e0_e0e0_e0e0),
];

/// All squares attacked by the pawns in `b`.
#[inline(always)]
pub fn pawn_attacks_bb<P: PlayerTrait>(b: BitBoard) -> BitBoard {
    P::shift_up_left(b) | P::shift_up_right(b)
}

/// Squares attacked by two pawns in `b`.
#[inline(always)]
pub fn pawn_double_attacks_bb<P: PlayerTrait>(b: BitBoard) -> BitBoard {
    P::shift_up_left(b) & P::shift_up_right(b)
}

#[inline(always)]
pub fn edge_distance(file: File) -> usize {
    let f = file as usize;
    f.min(7 - f)
}
