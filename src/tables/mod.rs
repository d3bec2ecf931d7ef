pub mod material;
pub mod pawn_table;
