use std::collections::HashMap;

use crate::algorithm::GameOfLifeAlgorithm;
use crate::cell_state::CellState;
use crate::error::EngineError;
use crate::error::EngineResult;
use crate::quadtree::Point;
use crate::rule_set::RuleSet;

/// Steps one generation at a time by counting the neighbors of every alive cell.
///
/// Slow, but simple enough to be obviously right, which is what it's for: the reference other
/// algorithms are tested against.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveAlgorithm {
    rule: RuleSet,
}

impl NaiveAlgorithm {
    pub fn new(rule: RuleSet) -> Self {
        Self { rule }
    }

    fn step(&self, state: &CellState) -> CellState {
        let mut neighbors: HashMap<Point, u32> = HashMap::with_capacity(state.population() * 8);

        for p in state {
            for n in p.neighbors() {
                *neighbors.entry(n).or_default() += 1;
            }
        }

        let mut next: CellState = neighbors
            .into_iter()
            .filter(|(p, n)| self.rule.apply(state.is_alive(p), *n))
            .map(|(p, _)| p)
            .collect();

        // cells without a single alive neighbor never made it into the map
        if self.rule.apply(true, 0) {
            next.extend(
                state
                    .iter()
                    .filter(|p| p.neighbors().all(|n| !state.is_alive(&n)))
                    .copied(),
            );
        }

        next
    }
}

impl GameOfLifeAlgorithm for NaiveAlgorithm {
    fn compute_generation_with_step(
        &self,
        state: &CellState,
        step: u64,
    ) -> EngineResult<CellState> {
        if step == 0 {
            return Err(EngineError::InvalidStep { step });
        }

        let mut state = self.step(state);
        for _ in 1..step {
            state = self.step(&state);
        }

        Ok(state)
    }
}
