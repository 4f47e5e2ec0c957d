use core::fmt::Debug;

use crate::WorldOffset;

/// An absolute cell coordinate. `x` grows east and `y` grows south.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub y: WorldOffset,
    pub x: WorldOffset,
}

impl Point {
    pub const fn new(x: WorldOffset, y: WorldOffset) -> Self {
        Point { x, y }
    }

    pub const fn offset(&self, dx: WorldOffset, dy: WorldOffset) -> Self {
        Point {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// The 8 cells around this one.
    pub fn neighbors(&self) -> impl Iterator<Item = Point> + use<> {
        let p = *self;

        (-1..=1)
            .flat_map(|dy| (-1..=1).map(move |dx| (dx, dy)))
            .filter(|&d| d != (0, 0))
            .map(move |(dx, dy)| p.offset(dx, dy))
    }
}

impl From<(WorldOffset, WorldOffset)> for Point {
    fn from((x, y): (WorldOffset, WorldOffset)) -> Self {
        Point { x, y }
    }
}

impl Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
