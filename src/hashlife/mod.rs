//! Recursive doubling.
//!
//! A branch of level `n` fully determines the center `2^{n-1}` square of its own pattern for the
//! next `2^{n-2}` generations, since nothing outside of it can travel far enough to interfere.
//! [`World::next_generation`] memoizes exactly that result on every canonical cell it visits.
//!
//! To land on a generation count that isn't the maximum for some level, [`World::advance`] steps
//! by any smaller power of two, memoized separately.

use crate::cell::CellId;
use crate::error::EngineError;
use crate::error::EngineResult;
use crate::quadtree::MIN_BRANCH_LEVEL;

pub mod algorithm;
pub mod universe;

pub use self::algorithm::HashLifeAlgorithm;

use crate::world::World;

/// Side of the square the base case steps, in cells.
const BASE_SIDE: usize = 16;

impl World {
    /// The cell of level `n - 1` at the center of `id`, advanced by `2^{n - 2}` generations, where
    /// `n` is the level of `id`.
    ///
    /// Only defined for branches of level [`MIN_BRANCH_LEVEL`] or more.
    pub fn next_generation(&mut self, id: CellId) -> EngineResult<CellId> {
        let cell = self.cell(id)?;

        if cell.is_leaf() {
            return Err(EngineError::NotABranch { id });
        }

        Ok(self.step_max(id))
    }

    /// The cell of level `n - 1` at the center of `id`, advanced by `2^j` generations, where `n` is
    /// the level of `id` and `j <= n - 2`.
    pub fn advance(&mut self, id: CellId, j: u8) -> CellId {
        let level = self.buf[id].level;
        assert!(
            level >= MIN_BRANCH_LEVEL && j <= level - 2,
            "cannot advance a level {level} cell by 2^{j} generations"
        );

        if j == level - 2 {
            return self.step_max(id);
        }

        if self.buf[id].is_empty() {
            return self.void(level - 1);
        }

        if let Some(&res) = self.steps.get(&(id, j)) {
            return res;
        }

        let res = if level == MIN_BRANCH_LEVEL {
            self.step_base(id, 1 << j)
        } else {
            // Unlike `step_max`, only the second half of the recursion moves forward in time. The
            // first half just recenters.
            let [n00, n01, n02, n10, n11, n12, n20, n21, n22] = self.nine(id);
            let [t00, t01, t02, t10, t11, t12, t20, t21, t22] =
                [n00, n01, n02, n10, n11, n12, n20, n21, n22].map(|n| self.center(n));

            self.combine_four([t00, t01, t02, t10, t11, t12, t20, t21, t22], |world, id| {
                world.advance(id, j)
            })
        };

        self.steps.insert((id, j), res);

        res
    }

    /// Memoized `2^{n - 2}` step of a level `n` branch
    fn step_max(&mut self, id: CellId) -> CellId {
        let cell = self.buf[id];
        assert!(
            cell.level >= MIN_BRANCH_LEVEL,
            "cannot step a level {} cell",
            cell.level
        );

        // check if the result is in cache
        if let Some(res) = cell.res {
            return res;
        }

        let res = if cell.is_empty() {
            self.void(cell.level - 1)
        } else if cell.level == MIN_BRANCH_LEVEL {
            self.step_base(id, 1 << (MIN_BRANCH_LEVEL - 2))
        } else {
            self.step_node(id)
        };

        self.buf[id].res = Some(res);

        res
    }

    /// For a branch of level `n`, this computes its result from nine overlapping cells of level
    /// `n - 1`, each stepped by `2^{n - 3}`, then stepped once more in groups of four.
    ///
    ///   n00 n01 n02
    ///   n10 n11 n12
    ///   n20 n21 n22
    ///
    fn step_node(&mut self, id: CellId) -> CellId {
        let nine = self.nine(id).map(|n| self.step_max(n));

        self.combine_four(nine, |world, id| world.step_max(id))
    }

    /// The nine overlapping cells of level `n - 1` tiling a branch of level `n`, row by row
    fn nine(&mut self, id: CellId) -> [CellId; 9] {
        let [nw, ne, sw, se] = self.children(id);
        let [_, nwne, nwsw, nwse] = self.children(nw);
        let [nenw, _, nesw, nese] = self.children(ne);
        let [swnw, swne, _, swse] = self.children(sw);
        let [senw, sene, sesw, _] = self.children(se);

        [
            nw,
            self.branch([nwne, nenw, nwse, nesw]),
            ne,
            self.branch([nwsw, nwse, swnw, swne]),
            self.branch([nwse, nesw, swne, senw]),
            self.branch([nesw, nese, senw, sene]),
            sw,
            self.branch([swne, senw, swse, sesw]),
            se,
        ]
    }

    /// Group nine overlapping cells into the four cells they tile, run `f` on each, and join the
    /// results into one.
    fn combine_four<F>(&mut self, t: [CellId; 9], mut f: F) -> CellId
    where
        F: FnMut(&mut World, CellId) -> CellId,
    {
        let [t00, t01, t02, t10, t11, t12, t20, t21, t22] = t;

        let nw = self.branch([t00, t01, t10, t11]);
        let ne = self.branch([t01, t02, t11, t12]);
        let sw = self.branch([t10, t11, t20, t21]);
        let se = self.branch([t11, t12, t21, t22]);

        let res = [nw, ne, sw, se].map(|q| f(&mut *self, q));

        self.branch(res)
    }

    /// Step the 16x16 square of a branch of leaves by `steps` generations directly, keeping the
    /// 8x8 center.
    fn step_base(&mut self, id: CellId, steps: usize) -> CellId {
        debug_assert!((1..=BASE_SIDE / 4).contains(&steps));

        let leaves = self.children(id).map(|leaf| self.blocks(leaf));
        let mut rows = to_rows(leaves);

        for _ in 0..steps {
            rows = step_rows(&rows, &self.rules);
        }

        self.leaf(center_blocks(&rows))
    }
}

/// Lay out the four leaves of a level 4 branch as 16 rows, with column `x` on bit `15 - x`.
fn to_rows(leaves: [[u16; 4]; 4]) -> [u16; BASE_SIDE] {
    let mut rows = [0; BASE_SIDE];

    for (l, blocks) in leaves.iter().enumerate() {
        let (lx, ly) = ((l % 2) * 8, (l / 2) * 8);

        for (b, &block) in blocks.iter().enumerate() {
            let (bx, by) = (lx + (b % 2) * 4, ly + (b / 2) * 4);

            for r in 0..4 {
                let nibble = (block >> (12 - 4 * r)) & 0xF;
                rows[by + r] |= nibble << (12 - bx);
            }
        }
    }

    rows
}

/// The 8x8 center of 16 rows, as the blocks of a leaf
fn center_blocks(rows: &[u16; BASE_SIDE]) -> [u16; 4] {
    let mut blocks = [0; 4];

    for (b, block) in blocks.iter_mut().enumerate() {
        let (bx, by) = (4 + (b % 2) * 4, 4 + (b / 2) * 4);

        for r in 0..4 {
            let nibble = (rows[by + r] >> (12 - bx)) & 0xF;
            *block |= nibble << (12 - 4 * r);
        }
    }

    blocks
}

/// One generation of 16 rows, using the rule table on overlapping 4x4 windows.
///
/// Only the inner 14x14 is written, the outer ring of the result is dead. Each call therefore
/// shrinks the region that is correct by one cell on every side.
fn step_rows(rows: &[u16; BASE_SIDE], rules: &[u16]) -> [u16; BASE_SIDE] {
    let mut next = [0; BASE_SIDE];

    for y in (1..BASE_SIDE - 1).step_by(2) {
        for x in (1..BASE_SIDE - 1).step_by(2) {
            // The window's top left corner sits at (x - 1, y - 1)
            let mut window = 0;
            for r in 0..4 {
                let nibble = (rows[y - 1 + r] >> (13 - x)) & 0xF;
                window |= nibble << (12 - 4 * r);
            }

            let res = rules[window as usize];

            // Cells (1, 1) and (2, 1) of the window are on bits 10 and 9, (1, 2) and (2, 2) on 6
            // and 5.
            next[y] |= ((res >> 9) & 0b11) << (14 - x);
            next[y + 1] |= ((res >> 5) & 0b11) << (14 - x);
        }
    }

    next
}
