//! Error types for game operations

use serde::{Deserialize, Serialize};

use crate::types::UnitId;

/// Hard failures that indicate a caller bug rather than an illegal move.
/// Illegal moves (wrong phase, not enough gold, occupied cell) are soft
/// no-ops reported through command return values instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameError {
    /// Unit template key not present in the catalog
    TemplateNotFound { key: String },
    /// Referenced unit instance does not exist
    UnitMissing { id: UnitId },
}

impl core::fmt::Display for GameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            GameError::TemplateNotFound { key } => write!(f, "unknown unit template: {key}"),
            GameError::UnitMissing { id } => write!(f, "no such unit: {id}"),
        }
    }
}

impl std::error::Error for GameError {}

/// Result type alias for game operations
pub type GameResult<T> = Result<T, GameError>;
