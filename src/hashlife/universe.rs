use tracing::trace;

use crate::cell::CellId;
use crate::cell_state::CellState;
use crate::error::EngineError;
use crate::error::EngineResult;
use crate::quadtree;
use crate::quadtree::Aabb;
use crate::quadtree::MAX_LEVEL;
use crate::quadtree::MIN_BRANCH_LEVEL;
use crate::quadtree::Point;
use crate::world::World;

/// The root is never cropped below this level, so that the center of its center is still a cell.
pub const ROOT_MIN_LEVEL: u8 = MIN_BRANCH_LEVEL + 1;

/// Largest `j` such that a universe can be stepped by `2^j` generations at once.
pub const MAX_STEP_LOG2: u8 = MAX_LEVEL - 3;

/// A pattern stored in a [`World`], as a root cell centered on the origin.
///
/// The root grows and shrinks on its own as the pattern does: before every step it is padded with
/// empty space until nothing can reach its edge, and after every step the empty border is cropped
/// back off.
pub struct Universe<'w> {
    world: &'w mut World,
    root: CellId,
}

impl<'w> Universe<'w> {
    /// Build a universe holding exactly `points`. The slice is reordered.
    pub fn new(world: &'w mut World, points: &mut [Point]) -> EngineResult<Self> {
        let level = match Aabb::from_points(points.iter()) {
            Some(bbox) => quadtree::level_for(&bbox, ROOT_MIN_LEVEL)?,
            None => ROOT_MIN_LEVEL,
        };

        let root = world.from_points(level, points)?;

        Ok(Self { world, root })
    }

    pub fn from_state(world: &'w mut World, state: &CellState) -> EngineResult<Self> {
        let mut points: Vec<Point> = state.iter().copied().collect();

        Self::new(world, &mut points)
    }

    pub fn root(&self) -> CellId {
        self.root
    }

    pub fn level(&self) -> u8 {
        self.world.node(self.root).level
    }

    pub fn population(&self) -> u128 {
        self.world.node(self.root).population
    }

    /// Whether the cell at `(x, y)` is alive
    pub fn contains(&self, x: i64, y: i64) -> EngineResult<bool> {
        self.world.contains(self.root, x, y)
    }

    /// Re-root one level up, keeping the current root at the center
    fn expand(&mut self) -> EngineResult<()> {
        let level = self.level();

        if level >= MAX_LEVEL {
            return Err(EngineError::LevelTooLarge {
                level: level + 1,
                max: MAX_LEVEL,
            });
        }

        let e = self.world.void(level - 1);
        let [nw, ne, sw, se] = self.world.children(self.root);

        let children = [
            self.world.branch([e, e, e, nw]),
            self.world.branch([e, e, ne, e]),
            self.world.branch([e, sw, e, e]),
            self.world.branch([se, e, e, e]),
        ];
        self.root = self.world.branch(children);

        trace!(level = level + 1, "Expanded root");

        Ok(())
    }

    /// Whether every alive cell is within the center of the center of the root, i.e. at least a
    /// quarter of the root's side away from any of its edges.
    fn is_padded(&mut self) -> bool {
        let center = self.world.center(self.root);
        let inner = self.world.center(center);

        self.world.node(inner).population == self.population()
    }

    /// Drop empty borders, as long as the root stays at least [`ROOT_MIN_LEVEL`]
    fn crop(&mut self) {
        while self.level() > ROOT_MIN_LEVEL {
            let center = self.world.center(self.root);

            if self.world.node(center).population != self.population() {
                break;
            }

            self.root = center;
        }

        trace!(level = self.level(), "Cropped root");
    }

    /// Step the universe by `2^j` generations.
    pub fn step_pow2(&mut self, j: u8) -> EngineResult<()> {
        if j > MAX_STEP_LOG2 {
            return Err(EngineError::InvalidStep {
                step: 1u64.checked_shl(j as u32).unwrap_or(u64::MAX),
            });
        }

        // With the pattern inside of the inner quarter, and the result being the whole center
        // half, a pattern growing at the speed of light for 2^j <= 2^{n-3} generations still fits.
        while self.level() < (j + 3).max(ROOT_MIN_LEVEL) || !self.is_padded() {
            self.expand()?;
        }

        self.root = self.world.advance(self.root, j);

        // the result is one level down, which may take it below the smallest root
        while self.level() < ROOT_MIN_LEVEL {
            self.expand()?;
        }
        self.crop();

        Ok(())
    }

    /// Step the universe by exactly `generations` generations, one power of two at a time.
    pub fn step(&mut self, generations: u64) -> EngineResult<()> {
        if generations == 0 {
            return Err(EngineError::InvalidStep { step: generations });
        }

        if generations.ilog2() > MAX_STEP_LOG2 as u32 {
            return Err(EngineError::InvalidStep { step: generations });
        }

        for j in 0..=generations.ilog2() as u8 {
            if generations & (1 << j) != 0 {
                self.step_pow2(j)?;
            }
        }

        Ok(())
    }

    /// Every alive cell
    pub fn to_state(&self) -> CellState {
        self.world
            .alive_cells(self.root, Point::new(0, 0))
            .into_iter()
            .collect()
    }

    /// The alive cells inside of `window`
    pub fn cells_in(&self, window: &Aabb) -> CellState {
        self.world
            .cells_in(self.root, Point::new(0, 0), window)
            .into_iter()
            .collect()
    }
}
