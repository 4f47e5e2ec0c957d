use crate::WorldOffset;
use crate::quadtree::point::Point;

/// An inclusive, non-empty, axis-aligned rectangle of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aabb {
    pub min: Point,
    pub max: Point,
}

impl Aabb {
    /// The rectangle holding the single cell `p`.
    pub fn new(p: Point) -> Self {
        Aabb { min: p, max: p }
    }

    /// The rectangle spanning `min` to `max`, both included. Corners are reordered if needed.
    pub fn spanning(a: Point, b: Point) -> Self {
        let mut bbox = Aabb::new(a);
        bbox.add(&b);

        bbox
    }

    /// Create an AABB from a list of `Point`s. `None` if there are no points.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let mut points = points.into_iter();
        let mut b = Aabb::new(*points.next()?);

        for p in points {
            b.add(p);
        }

        Some(b)
    }

    /// Add a `Point` `p` to the current Axis-Aligned Bounding Box.
    pub fn add(&mut self, p: &Point) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    pub fn width(&self) -> u64 {
        self.max.x.abs_diff(self.min.x) + 1
    }

    pub fn height(&self) -> u64 {
        self.max.y.abs_diff(self.min.y) + 1
    }

    pub fn contains(&self, p: &Point) -> bool {
        (self.min.x..=self.max.x).contains(&p.x) && (self.min.y..=self.max.y).contains(&p.y)
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Grow the rectangle by `n` cells on every side.
    pub fn pad(&self, n: WorldOffset) -> Self {
        Aabb {
            min: self.min.offset(-n, -n),
            max: self.max.offset(n, n),
        }
    }

    /// Every cell of the rectangle, row by row.
    pub fn cells(&self) -> impl Iterator<Item = Point> + use<> {
        let Aabb { min, max } = *self;

        (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| Point { x, y }))
    }
}
