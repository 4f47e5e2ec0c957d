pub mod algorithm;
pub mod cell;
pub mod cell_state;
pub mod config;
pub mod error;
pub mod hashlife;
pub mod naive;
pub mod quadtree;
pub mod rule_set;
pub mod world;

pub use crate::algorithm::GameOfLifeAlgorithm;
pub use crate::algorithm::Generations;
pub use crate::cell_state::CellState;
pub use crate::config::EngineConfig;
pub use crate::error::EngineError;
pub use crate::error::EngineResult;
pub use crate::hashlife::HashLifeAlgorithm;
pub use crate::naive::NaiveAlgorithm;
pub use crate::quadtree::Point;
pub use crate::rule_set::RuleSet;
pub use crate::world::World;

/// Absolute coordinate of a cell. The universe spans `[-2^62, 2^62)` on both axes.
pub type WorldOffset = i64;
