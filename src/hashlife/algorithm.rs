use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use tracing::debug;
use tracing::warn;

use crate::algorithm::GameOfLifeAlgorithm;
use crate::cell_state::CellState;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::error::EngineResult;
use crate::hashlife::universe::Universe;
use crate::world::World;

/// Computes generations by recursive doubling over a canonical quadtree.
///
/// Every call rebuilds a tree from the given [`CellState`], but the canonical cells and their
/// memoized results stay in a [`World`] shared by every clone of this value, so stepping a pattern
/// that was seen before (or any part of one) is close to free.
#[derive(Clone)]
pub struct HashLifeAlgorithm {
    world: Arc<Mutex<World>>,
    config: EngineConfig,
}

impl Default for HashLifeAlgorithm {
    fn default() -> Self {
        Self::new()
    }
}

impl HashLifeAlgorithm {
    /// Conway's Game of Life, with the default cache limit
    pub fn new() -> Self {
        let config = EngineConfig::default();

        Self {
            world: Arc::new(Mutex::new(World::new(config.rule))),
            config,
        }
    }

    /// Fails with [`EngineError::InvalidRule`] for rules under which empty space comes alive.
    pub fn with_config(config: EngineConfig) -> EngineResult<Self> {
        if !config.rule.keeps_void() {
            return Err(EngineError::InvalidRule {
                rule: config.rule.to_string(),
            });
        }

        Ok(Self {
            world: Arc::new(Mutex::new(World::new(config.rule))),
            config,
        })
    }

    /// Step with the rules of an existing, possibly shared, `world`.
    pub fn with_world(world: Arc<Mutex<World>>, cache_limit: Option<usize>) -> EngineResult<Self> {
        let rule = world.lock().unwrap_or_else(PoisonError::into_inner).rule_set();

        if !rule.keeps_void() {
            return Err(EngineError::InvalidRule {
                rule: rule.to_string(),
            });
        }

        Ok(Self {
            world,
            config: EngineConfig { rule, cache_limit },
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The world holding this algorithm's canonical cells
    pub fn world(&self) -> Arc<Mutex<World>> {
        Arc::clone(&self.world)
    }

    /// Number of canonical cells currently cached
    pub fn cache_len(&self) -> usize {
        self.lock().len()
    }

    /// Forget every canonical cell and memoized result.
    pub fn clear_cache(&self) {
        self.lock().clear();
    }

    /// Cells and results are only ever added, and adding one twice is harmless, so a world left
    /// behind by a panicking thread is still consistent enough to keep using.
    fn lock(&self) -> MutexGuard<'_, World> {
        self.world.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl GameOfLifeAlgorithm for HashLifeAlgorithm {
    fn compute_generation_with_step(
        &self,
        state: &CellState,
        step: u64,
    ) -> EngineResult<CellState> {
        if step == 0 {
            return Err(EngineError::InvalidStep { step });
        }

        let mut world = self.lock();

        if let Some(limit) = self.config.cache_limit {
            if world.len() > limit {
                warn!(
                    cells = world.len(),
                    limit, "Too many canonical cells, clearing the cache"
                );
                world.clear();
            }
        }

        let mut universe = Universe::from_state(&mut world, state)?;
        universe.step(step)?;

        let next = universe.to_state();

        debug!(
            step,
            population = next.population(),
            level = universe.level(),
            "Advanced"
        );

        Ok(next)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::rule_set::RuleSet;

    fn blinker() -> CellState {
        "...\nOOO\n...".parse().unwrap()
    }

    #[test]
    fn blinker_oscillates() {
        let algorithm = HashLifeAlgorithm::new();

        let next = algorithm.compute_next_generation(&blinker()).unwrap();
        assert_eq!(next, ".O.\n.O.\n.O.".parse::<CellState>().unwrap());

        let back = algorithm.compute_next_generation(&next).unwrap();
        assert_eq!(back, blinker());

        assert_eq!(
            algorithm.compute_generation_with_step(&blinker(), 1001).unwrap(),
            next
        );
    }

    #[test]
    fn empty_stays_empty() {
        let algorithm = HashLifeAlgorithm::new();
        let next = algorithm
            .compute_generation_with_step(&CellState::new(), 1 << 40)
            .unwrap();

        assert!(next.is_empty());
    }

    #[test]
    fn zero_step_is_rejected() {
        let algorithm = HashLifeAlgorithm::new();

        assert_eq!(
            algorithm.compute_generation_with_step(&blinker(), 0),
            Err(EngineError::InvalidStep { step: 0 })
        );
    }

    #[test]
    fn clones_share_cache() {
        let algorithm = HashLifeAlgorithm::new();
        let other = algorithm.clone();

        other.compute_next_generation(&blinker()).unwrap();
        let len = algorithm.cache_len();
        assert!(len > 1);

        // everything needed was already interned by the clone
        algorithm.compute_next_generation(&blinker()).unwrap();
        assert_eq!(algorithm.cache_len(), len);

        algorithm.clear_cache();
        assert_eq!(other.cache_len(), 1);
    }

    #[test]
    fn cache_limit_clears_whole_table() {
        let glider: CellState = ".O.\n..O\nOOO".parse().unwrap();

        let fresh = HashLifeAlgorithm::new();
        fresh.compute_next_generation(&glider).unwrap();
        let glider_only = fresh.cache_len();

        let limited = HashLifeAlgorithm::with_config(EngineConfig::default().cache_limit(Some(1)))
            .unwrap();
        limited.compute_generation_with_step(&blinker(), 64).unwrap();
        limited.compute_next_generation(&glider).unwrap();

        assert_eq!(limited.cache_len(), glider_only);
    }

    #[test]
    fn with_world_shares_rules() {
        let highlife: RuleSet = "B36/S23".parse().unwrap();
        let world = Arc::new(Mutex::new(World::new(highlife)));

        let a = HashLifeAlgorithm::with_world(Arc::clone(&world), None).unwrap();
        let b = HashLifeAlgorithm::with_world(world, None).unwrap();
        assert_eq!(a.config().rule, highlife);

        a.compute_next_generation(&blinker()).unwrap();
        assert_eq!(a.cache_len(), b.cache_len());
    }

    #[test]
    fn rejects_rules_waking_the_void() {
        let rule: RuleSet = "B0/S8".parse().unwrap();
        let config = EngineConfig::default().rule(rule);

        assert!(matches!(
            HashLifeAlgorithm::with_config(config),
            Err(EngineError::InvalidRule { .. })
        ));
    }
}
