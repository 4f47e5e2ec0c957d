use thiserror::Error;

use crate::WorldOffset;
use crate::cell::CellId;

/// Everything the engine can reject.
///
/// All of these are programming errors from miscalling the engine (bad levels, foreign handles,
/// coordinates past the edge of the universe). None of them are transient, so retrying the same
/// call will fail the same way.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("Children must share a level, got {levels:?}")]
    LevelMismatch { levels: [u8; 4] },

    #[error("Cell {id} was not produced by this world")]
    UnknownCell { id: CellId },

    #[error("Level {level} is below the minimum of {min}")]
    LevelTooSmall { level: u8, min: u8 },

    #[error("Level {level} is above the maximum of {max}")]
    LevelTooLarge { level: u8, max: u8 },

    #[error("Leaf offset ({x}, {y}) is outside of the 8x8 block")]
    LeafOffset { x: u8, y: u8 },

    #[error("Coordinate ({x}, {y}) is outside of a level {level} square")]
    OutOfBounds {
        x: WorldOffset,
        y: WorldOffset,
        level: u8,
    },

    #[error("Step must be at least 1, got {step}")]
    InvalidStep { step: u64 },

    #[error("Cell {id} is not a branch")]
    NotABranch { id: CellId },

    #[error("Invalid pattern: unexpected '{got}' at line {line}")]
    InvalidPattern { got: char, line: usize },

    #[error("Invalid rule: \"{rule}\"")]
    InvalidRule { rule: String },
}

pub type EngineResult<T> = Result<T, EngineError>;
