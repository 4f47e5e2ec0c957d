//! Coordinates of the canonical quadtree.
//!
//! A node of level `k` is a square of side `2^k`. Nodes are addressed relative to their own center:
//! a level `k` node holds every cell in `[-2^(k-1), 2^(k-1))` on both axes. Descending into one of
//! its quadrants re-centers the coordinate on that child, so the same `(x, y)` pair never has to be
//! rebased by the caller.

pub use crate::quadtree::aabb::Aabb;
pub use crate::quadtree::point::Point;
use crate::WorldOffset;
use crate::error::EngineError;
use crate::error::EngineResult;

mod aabb;
mod point;

/// Level of a leaf. Leaves are 8x8.
pub const LEAF_LEVEL: u8 = 3;

/// Smallest level of a branch, whose children are leaves.
pub const MIN_BRANCH_LEVEL: u8 = LEAF_LEVEL + 1;

/// Largest level a node may have. A level 63 node spans `[-2^62, 2^62)`, which keeps every
/// coordinate and every child offset inside of an `i64`.
pub const MAX_LEVEL: u8 = 63;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Quadrant {
    Nw = 0,
    Ne = 1,
    Sw = 2,
    Se = 3,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [Quadrant::Nw, Quadrant::Ne, Quadrant::Sw, Quadrant::Se];

    /// The quadrant holding `(x, y)`, relative to the center of its parent.
    pub fn of(x: WorldOffset, y: WorldOffset) -> Self {
        match (x < 0, y < 0) {
            (true, true) => Quadrant::Nw,
            (false, true) => Quadrant::Ne,
            (true, false) => Quadrant::Sw,
            (false, false) => Quadrant::Se,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Sign of the offset from the parent's center to this quadrant's center.
    fn signs(self) -> (WorldOffset, WorldOffset) {
        match self {
            Quadrant::Nw => (-1, -1),
            Quadrant::Ne => (1, -1),
            Quadrant::Sw => (-1, 1),
            Quadrant::Se => (1, 1),
        }
    }
}

/// Half the side of a level `level` node.
pub fn half(level: u8) -> WorldOffset {
    debug_assert!((1..=MAX_LEVEL).contains(&level));

    1 << (level - 1)
}

/// Whether `(x, y)` lies within a level `level` node centered on the origin.
pub fn in_bounds(level: u8, x: WorldOffset, y: WorldOffset) -> bool {
    let h = half(level);

    (-h..h).contains(&x) && (-h..h).contains(&y)
}

/// Fail with [`EngineError::OutOfBounds`] unless `in_bounds`.
pub fn check_bounds(level: u8, x: WorldOffset, y: WorldOffset) -> EngineResult<()> {
    if in_bounds(level, x, y) {
        Ok(())
    } else {
        Err(EngineError::OutOfBounds { x, y, level })
    }
}

/// Step from a level `level` node into the quadrant holding `(x, y)`, returning that quadrant and
/// the coordinate relative to the child's center.
///
/// At `level == MIN_BRANCH_LEVEL` the returned coordinate is relative to the center of a leaf, so
/// it lies in `[-4, 4)`.
pub fn descend(level: u8, x: WorldOffset, y: WorldOffset) -> (Quadrant, WorldOffset, WorldOffset) {
    debug_assert!(level >= MIN_BRANCH_LEVEL);
    debug_assert!(in_bounds(level, x, y));

    let q = Quadrant::of(x, y);
    let (sx, sy) = q.signs();
    let quarter = half(level - 1);

    (q, x - sx * quarter, y - sy * quarter)
}

/// Absolute center of quadrant `q` of a level `level` node centered on `center`.
pub fn child_center(level: u8, center: Point, q: Quadrant) -> Point {
    let (sx, sy) = q.signs();
    let quarter = half(level - 1);

    center.offset(sx * quarter, sy * quarter)
}

/// Absolute cells covered by a level `level` node centered on `center`.
pub fn bounds(level: u8, center: Point) -> Aabb {
    let h = half(level);

    Aabb::spanning(center.offset(-h, -h), center.offset(h - 1, h - 1))
}

/// The smallest level, no smaller than `min`, of an origin-centered node holding all of `bbox`.
pub fn level_for(bbox: &Aabb, min: u8) -> EngineResult<u8> {
    let mut level = min;

    while !(in_bounds(level, bbox.min.x, bbox.min.y) && in_bounds(level, bbox.max.x, bbox.max.y)) {
        if level == MAX_LEVEL {
            let p = if in_bounds(level, bbox.min.x, bbox.min.y) {
                bbox.max
            } else {
                bbox.min
            };

            return Err(EngineError::OutOfBounds {
                x: p.x,
                y: p.y,
                level,
            });
        }

        level += 1;
    }

    Ok(level)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn descend_recenters() {
        // a level 4 node spans [-8, 8), its quadrants are leaves spanning [-4, 4)
        assert_eq!(descend(4, -8, -8), (Quadrant::Nw, -4, -4));
        assert_eq!(descend(4, -1, -1), (Quadrant::Nw, 3, 3));
        assert_eq!(descend(4, 0, -1), (Quadrant::Ne, -4, 3));
        assert_eq!(descend(4, 7, 7), (Quadrant::Se, 3, 3));
        assert_eq!(descend(5, -3, 12), (Quadrant::Sw, 5, 4));
    }

    #[test]
    fn descend_matches_child_center() {
        let center = Point::new(0, 0);

        for level in [4, 5, 10, MAX_LEVEL] {
            for (x, y) in [(0, 0), (-1, 5), (half(level) - 1, -half(level))] {
                let (q, dx, dy) = descend(level, x, y);
                let c = child_center(level, center, q);

                assert_eq!(c.offset(dx, dy), Point::new(x, y));
                assert!(in_bounds(level - 1, dx, dy));
            }
        }
    }

    #[test]
    fn bounds_of_leaf() {
        let b = bounds(LEAF_LEVEL, Point::new(10, 0));

        assert_eq!(b.min, Point::new(6, -4));
        assert_eq!(b.max, Point::new(13, 3));
    }

    #[test]
    fn level_for_bbox() {
        let bbox = Aabb::spanning(Point::new(-3, 0), Point::new(3, 3));
        assert_eq!(level_for(&bbox, LEAF_LEVEL), Ok(3));

        let bbox = Aabb::spanning(Point::new(-3, 0), Point::new(4, 3));
        assert_eq!(level_for(&bbox, LEAF_LEVEL), Ok(4));
        assert_eq!(level_for(&bbox, 6), Ok(6));

        let far = Aabb::new(Point::new(WorldOffset::MAX, 0));
        assert!(level_for(&far, LEAF_LEVEL).is_err());
    }
}
