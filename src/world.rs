use std::collections::HashMap;

use tracing::debug;

use crate::WorldOffset;
use crate::cell::Cell;
use crate::cell::CellId;
use crate::cell::LEAF_SIDE;
use crate::cell::Quad;
use crate::cell::leaf_bit;
use crate::cell::leaf_cells;
use crate::error::EngineError;
use crate::error::EngineResult;
use crate::quadtree;
use crate::quadtree::Aabb;
use crate::quadtree::LEAF_LEVEL;
use crate::quadtree::MAX_LEVEL;
use crate::quadtree::Point;
use crate::quadtree::Quadrant;
use crate::rule_set::RuleSet;

/// The canonical store of every [`Cell`] ever built.
///
/// Every construction path goes through [`World::intern`], so structurally equal cells always
/// share one [`CellId`]. Cells are never freed individually: the only way to reclaim memory is
/// [`World::clear`], which forgets everything at once and invalidates every id handed out so far.
pub struct World {
    /// Life rules
    ///
    /// Indexing into this array with a 4x4 block yields its center 2x2 one generation later.
    pub(crate) rules: Vec<u16>,

    rule_set: RuleSet,

    /// This is where all of our memory goes
    pub(crate) buf: Vec<Cell>,

    /// Canonicalization table, from the contents of a cell to its index in `buf`
    table: HashMap<Quad, CellId>,

    /// `empties[i]` is the empty cell of level `LEAF_LEVEL + i`
    empties: Vec<CellId>,

    /// Results of advancing a cell by `2^j` generations, for `j` smaller than what
    /// [`Cell::res`] holds
    pub(crate) steps: HashMap<(CellId, u8), CellId>,
}

impl Default for World {
    fn default() -> Self {
        Self::new(RuleSet::default())
    }
}

impl World {
    /// The empty leaf always sits at index 0.
    pub const VOID: CellId = 0;

    /// Create an empty new world
    pub fn new(rule_set: RuleSet) -> Self {
        let mut world = Self {
            rules: rule_set.compute_rules(),
            rule_set,
            buf: Vec::new(),
            table: HashMap::new(),
            empties: Vec::new(),
            steps: HashMap::new(),
        };
        world.clear();

        world
    }

    pub fn rule_set(&self) -> RuleSet {
        self.rule_set
    }

    /// Number of canonical cells currently stored
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// A world is never empty, it always holds at least the empty leaf.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Forget every cell and every memoized result. All previously returned [`CellId`]s become
    /// meaningless.
    pub fn clear(&mut self) {
        if !self.buf.is_empty() {
            debug!(
                cells = self.buf.len(),
                steps = self.steps.len(),
                "Clearing canonical cells"
            );
        }

        self.buf.clear();
        self.table.clear();
        self.steps.clear();
        self.empties.clear();

        let void = self.leaf([0; 4]);
        debug_assert_eq!(void, Self::VOID);

        self.empties.push(void);
    }

    pub fn cell(&self, id: CellId) -> EngineResult<&Cell> {
        self.buf.get(id).ok_or(EngineError::UnknownCell { id })
    }

    pub fn level(&self, id: CellId) -> EngineResult<u8> {
        Ok(self.cell(id)?.level)
    }

    /// Number of alive cells in `id`
    pub fn population(&self, id: CellId) -> EngineResult<u128> {
        Ok(self.cell(id)?.population)
    }

    /// Like [`World::cell`], for ids this world handed out itself
    pub(crate) fn node(&self, id: CellId) -> &Cell {
        &self.buf[id]
    }

    /// Return the canonical id of `cell`, storing it if it's new
    fn intern(&mut self, cell: Cell) -> CellId {
        if let Some(&id) = self.table.get(&cell.quad) {
            return id;
        }

        let id = self.buf.len();
        self.buf.push(cell);
        self.table.insert(cell.quad, id);

        id
    }

    /// Canonical leaf from its four 4x4 blocks
    pub(crate) fn leaf(&mut self, blocks: [u16; 4]) -> CellId {
        self.intern(Cell::leaf(blocks))
    }

    /// Canonical branch from children that are known to be canonical and of equal level
    pub(crate) fn branch(&mut self, children: [CellId; 4]) -> CellId {
        let [nw, ne, sw, se] = children.map(|id| &self.buf[id]);

        debug_assert!(
            nw.level == ne.level && nw.level == sw.level && nw.level == se.level,
            "children of a branch must share a level"
        );

        let level = nw.level + 1;
        let population = nw.population + ne.population + sw.population + se.population;

        self.intern(Cell::branch(children, level, population))
    }

    /// The unique leaf whose alive cells are exactly `offsets`, each in `0..8` on both axes with
    /// `(0, 0)` the top left corner.
    pub fn canonical_leaf<I>(&mut self, offsets: I) -> EngineResult<CellId>
    where
        I: IntoIterator<Item = (u8, u8)>,
    {
        let mut blocks = [0; 4];

        for (x, y) in offsets {
            if x >= LEAF_SIDE || y >= LEAF_SIDE {
                return Err(EngineError::LeafOffset { x, y });
            }

            let (i, bit) = leaf_bit(x, y);
            blocks[i] |= bit;
        }

        Ok(self.leaf(blocks))
    }

    /// The unique branch with the given children.
    ///
    /// Fails if a child isn't a cell of this world, if the children don't share a level, or if the
    /// branch would be larger than [`MAX_LEVEL`].
    pub fn canonical_branch(
        &mut self,
        nw: CellId,
        ne: CellId,
        sw: CellId,
        se: CellId,
    ) -> EngineResult<CellId> {
        let children = [nw, ne, sw, se];

        let mut levels = [0; 4];
        for (level, &id) in levels.iter_mut().zip(&children) {
            *level = self.cell(id)?.level;
        }

        if levels.iter().any(|&l| l != levels[0]) {
            return Err(EngineError::LevelMismatch { levels });
        }

        if levels[0] >= MAX_LEVEL {
            return Err(EngineError::LevelTooLarge {
                level: levels[0] + 1,
                max: MAX_LEVEL,
            });
        }

        Ok(self.branch(children))
    }

    /// The canonical all-dead cell of `level`. Levels below the leaf level don't exist.
    pub fn empty(&mut self, level: u8) -> EngineResult<CellId> {
        if level < LEAF_LEVEL {
            return Err(EngineError::LevelTooSmall {
                level,
                min: LEAF_LEVEL,
            });
        }

        if level > MAX_LEVEL {
            return Err(EngineError::LevelTooLarge {
                level,
                max: MAX_LEVEL,
            });
        }

        Ok(self.void(level))
    }

    pub(crate) fn void(&mut self, level: u8) -> CellId {
        debug_assert!((LEAF_LEVEL..=MAX_LEVEL).contains(&level));

        let i = (level - LEAF_LEVEL) as usize;

        while self.empties.len() <= i {
            let last = self.empties[self.empties.len() - 1];
            let next = self.branch([last; 4]);

            self.empties.push(next);
        }

        self.empties[i]
    }

    /// The children of a branch
    pub(crate) fn children(&self, id: CellId) -> [CellId; 4] {
        match self.buf[id].quad {
            Quad::Branch(children) => children,
            Quad::Leaf(_) => unreachable!("cell {id} is a leaf"),
        }
    }

    /// The blocks of a leaf
    pub(crate) fn blocks(&self, id: CellId) -> [u16; 4] {
        match self.buf[id].quad {
            Quad::Leaf(blocks) => blocks,
            Quad::Branch(_) => unreachable!("cell {id} is a branch"),
        }
    }

    /// The cell of level `n - 1` at the center of the branch `id` of level `n`
    pub(crate) fn center(&mut self, id: CellId) -> CellId {
        let [nw, ne, sw, se] = self.children(id);

        if self.buf[nw].is_leaf() {
            let [nw, ne, sw, se] = [nw, ne, sw, se].map(|id| self.blocks(id));

            self.leaf([nw[3], ne[2], sw[1], se[0]])
        } else {
            let [nw, ne, sw, se] = [nw, ne, sw, se].map(|id| self.children(id));

            self.branch([nw[3], ne[2], sw[1], se[0]])
        }
    }

    /// A copy of `id` with the cell at `(x, y)` set to `alive`. Coordinates are relative to the
    /// center of `id` (see [`quadtree`]).
    ///
    /// Only the cells on the path down to `(x, y)` are rebuilt, every sibling along the way is
    /// shared with `id`.
    pub fn with_cell(
        &mut self,
        id: CellId,
        x: WorldOffset,
        y: WorldOffset,
        alive: bool,
    ) -> EngineResult<CellId> {
        let level = self.cell(id)?.level;
        quadtree::check_bounds(level, x, y)?;

        Ok(self.set(id, x, y, alive))
    }

    fn set(&mut self, id: CellId, x: WorldOffset, y: WorldOffset, alive: bool) -> CellId {
        let cell = self.buf[id];

        match cell.quad {
            Quad::Leaf(mut blocks) => {
                let (i, bit) = Self::leaf_offset(x, y);

                if alive {
                    blocks[i] |= bit;
                } else {
                    blocks[i] &= !bit;
                }

                self.leaf(blocks)
            }
            Quad::Branch(mut children) => {
                let (q, x, y) = quadtree::descend(cell.level, x, y);
                let child = &mut children[q.index()];

                *child = self.set(*child, x, y, alive);

                self.branch(children)
            }
        }
    }

    /// Whether the cell at `(x, y)` of `id` is alive. Coordinates are relative to the center of
    /// `id`, anything outside of it is dead.
    pub fn contains(&self, id: CellId, x: WorldOffset, y: WorldOffset) -> EngineResult<bool> {
        let mut cell = self.cell(id)?;

        if !quadtree::in_bounds(cell.level, x, y) {
            return Ok(false);
        }

        let (mut x, mut y) = (x, y);

        loop {
            if cell.is_empty() {
                return Ok(false);
            }

            match cell.quad {
                Quad::Leaf(blocks) => {
                    let (i, bit) = Self::leaf_offset(x, y);

                    return Ok(blocks[i] & bit != 0);
                }
                Quad::Branch(children) => {
                    let (q, dx, dy) = quadtree::descend(cell.level, x, y);

                    (x, y) = (dx, dy);
                    cell = &self.buf[children[q.index()]];
                }
            }
        }
    }

    /// Leaf bit of a coordinate relative to the leaf's center
    fn leaf_offset(x: WorldOffset, y: WorldOffset) -> (usize, u16) {
        let h = quadtree::half(LEAF_LEVEL);
        debug_assert!(quadtree::in_bounds(LEAF_LEVEL, x, y));

        leaf_bit((x + h) as u8, (y + h) as u8)
    }

    /// Build the canonical cell of `level`, centered on the origin, whose alive cells are exactly
    /// `points`. The slice is reordered.
    pub fn from_points(&mut self, level: u8, points: &mut [Point]) -> EngineResult<CellId> {
        self.empty(level)?;

        for p in points.iter() {
            quadtree::check_bounds(level, p.x, p.y)?;
        }

        Ok(self.build(level, Point::new(0, 0), points))
    }

    fn build(&mut self, level: u8, center: Point, points: &mut [Point]) -> CellId {
        if points.is_empty() {
            return self.void(level);
        }

        if level == LEAF_LEVEL {
            let mut blocks = [0; 4];

            for p in points.iter() {
                let (i, bit) = Self::leaf_offset(p.x - center.x, p.y - center.y);
                blocks[i] |= bit;
            }

            return self.leaf(blocks);
        }

        let quadrant = |p: &Point| Quadrant::of(p.x - center.x, p.y - center.y);
        points.sort_unstable_by_key(quadrant);

        let mut children = [Self::VOID; 4];
        let mut rest = points;

        for q in Quadrant::ALL {
            let n = rest.partition_point(|p| quadrant(p) <= q);
            let (mine, tail) = std::mem::take(&mut rest).split_at_mut(n);

            let c = quadtree::child_center(level, center, q);
            children[q.index()] = self.build(level - 1, c, mine);

            rest = tail;
        }

        self.branch(children)
    }

    /// Every alive cell of `id`, with `id` centered on `center`.
    pub fn alive_cells(&self, id: CellId, center: Point) -> Vec<Point> {
        let mut out = Vec::with_capacity(self.buf[id].population.min(1 << 20) as usize);
        self.collect(id, center, None, &mut out);

        out
    }

    /// Like [`World::alive_cells`], but only the ones inside of `window`. Subtrees that miss the
    /// window are never visited.
    pub fn cells_in(&self, id: CellId, center: Point, window: &Aabb) -> Vec<Point> {
        let mut out = Vec::new();
        self.collect(id, center, Some(window), &mut out);

        out
    }

    fn collect(&self, id: CellId, center: Point, window: Option<&Aabb>, out: &mut Vec<Point>) {
        let cell = &self.buf[id];

        if cell.is_empty() {
            return;
        }

        if let Some(window) = window {
            if !window.intersects(&quadtree::bounds(cell.level, center)) {
                return;
            }
        }

        match cell.quad {
            Quad::Leaf(blocks) => {
                let h = quadtree::half(LEAF_LEVEL);
                let cells = leaf_cells(blocks)
                    .map(|(x, y)| center.offset(x as WorldOffset - h, y as WorldOffset - h))
                    .filter(|p| window.is_none_or(|w| w.contains(p)));

                out.extend(cells);
            }
            Quad::Branch(children) => {
                for q in Quadrant::ALL {
                    let c = quadtree::child_center(cell.level, center, q);
                    self.collect(children[q.index()], c, window, out);
                }
            }
        }
    }
}
