/// A `CellId` is an index into the list of `Cell`s of a [`World`](crate::world::World).
///
/// Cells are canonical: two ids from the same world are equal if and only if they describe the
/// same pattern at the same level.
pub type CellId = usize;

/// Side of a 4x4 block.
pub const BLOCK_SIDE: u8 = 4;

/// Side of a leaf.
pub const LEAF_SIDE: u8 = 2 * BLOCK_SIDE;

/// What a [`Cell`] is made of. This doubles as the key of the canonicalization table: leaves are
/// keyed by value and branches by the identity of their children, so hashing never recurses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quad {
    /// An 8x8 leaf, stored as its `[nw, ne, sw, se]` 4x4 blocks.
    ///
    /// Each block is packed row-major into a `u16`, with its top left cell on bit 15 and its
    /// bottom right cell on bit 0. This is the layout the rule table is indexed with.
    Leaf([u16; 4]),

    /// Four canonical children of equal level, `[nw, ne, sw, se]`.
    Branch([CellId; 4]),
}

#[derive(Debug, Clone, Copy)]
pub struct Cell {
    pub quad: Quad,

    /// A cell of level `n` is a square of side `2^n`.
    pub level: u8,

    /// Number of alive cells.
    pub population: u128,

    /// The index of the result of a [`Cell`].
    ///
    /// The result of a `2^n` cell is a pointer to a `2^{n - 1}` cell, specifically it's what the
    /// center of this cell will look like in `2^{n - 2}` iterations. `None` until first asked for.
    pub res: Option<CellId>,
}

impl Cell {
    pub fn leaf(blocks: [u16; 4]) -> Self {
        Self {
            quad: Quad::Leaf(blocks),
            level: crate::quadtree::LEAF_LEVEL,
            population: blocks.iter().map(|b| b.count_ones() as u128).sum(),
            res: None,
        }
    }

    pub fn branch(children: [CellId; 4], level: u8, population: u128) -> Self {
        Self {
            quad: Quad::Branch(children),
            level,
            population,
            res: None,
        }
    }

    /// Check if the cell is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self.quad, Quad::Leaf(_))
    }

    pub fn is_empty(&self) -> bool {
        self.population == 0
    }

    pub fn children(&self) -> Option<[CellId; 4]> {
        match self.quad {
            Quad::Branch(children) => Some(children),
            Quad::Leaf(_) => None,
        }
    }

    pub fn blocks(&self) -> Option<[u16; 4]> {
        match self.quad {
            Quad::Leaf(blocks) => Some(blocks),
            Quad::Branch(_) => None,
        }
    }
}

/// The bit of cell `(x, y)` within a 4x4 block.
pub const fn block_bit(x: u8, y: u8) -> u16 {
    debug_assert!(x < BLOCK_SIDE && y < BLOCK_SIDE);

    1 << (15 - (y * BLOCK_SIDE + x))
}

/// Which block of a leaf holds `(x, y)`, and the bit of that cell within it.
pub const fn leaf_bit(x: u8, y: u8) -> (usize, u16) {
    debug_assert!(x < LEAF_SIDE && y < LEAF_SIDE);

    let block = (y / BLOCK_SIDE) * 2 + x / BLOCK_SIDE;

    (block as usize, block_bit(x % BLOCK_SIDE, y % BLOCK_SIDE))
}

/// Every alive `(x, y)` offset of a leaf, row by row within each block.
pub fn leaf_cells(blocks: [u16; 4]) -> impl Iterator<Item = (u8, u8)> {
    blocks.into_iter().enumerate().flat_map(|(i, block)| {
        let (bx, by) = ((i as u8 % 2) * BLOCK_SIDE, (i as u8 / 2) * BLOCK_SIDE);

        (0..BLOCK_SIDE * BLOCK_SIDE)
            .map(move |n| (n % BLOCK_SIDE, n / BLOCK_SIDE))
            .filter(move |&(x, y)| block & block_bit(x, y) != 0)
            .map(move |(x, y)| (bx + x, by + y))
    })
}
