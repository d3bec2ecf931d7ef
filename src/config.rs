use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tables::{material::MATERIAL_TABLE_SIZE, pawn_table::PAWN_TABLE_SIZE};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvalError {
    #[error("{name} table size {size} must be a non-zero power of two")]
    InvalidTableSize { name: &'static str, size: usize },
    #[error("neural evaluation requested but no network was supplied")]
    MissingNetwork,
    #[error("invalid FEN: {0}")]
    InvalidFen(String),
    #[error("side to move is in check")]
    InCheck,
}

/// Which strategy produces the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvalMode {
    #[default]
    Classical,
    Neural,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    pub mode: EvalMode,
    pub pawn_table_size: usize,
    pub material_table_size: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            mode: EvalMode::Classical,
            pawn_table_size: PAWN_TABLE_SIZE,
            material_table_size: MATERIAL_TABLE_SIZE,
        }
    }
}

impl EvalConfig {
    pub fn neural() -> Self {
        EvalConfig {
            mode: EvalMode::Neural,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), EvalError> {
        check_size("pawn", self.pawn_table_size)?;
        check_size("material", self.material_table_size)
    }
}

fn check_size(name: &'static str, size: usize) -> Result<(), EvalError> {
    if size.is_power_of_two() {
        Ok(())
    } else {
        Err(EvalError::InvalidTableSize { name, size })
    }
}
