use std::collections::BTreeSet;
use std::collections::btree_set;
use std::fmt::Display;
use std::str::FromStr;

use crate::WorldOffset;
use crate::error::EngineError;
use crate::quadtree::Aabb;
use crate::quadtree::Point;

/// A snapshot of every alive cell of an unbounded universe.
///
/// Cells are kept sorted row by row, so two states compare equal exactly when they hold the same
/// cells, and iterating one is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CellState {
    cells: BTreeSet<Point>,
}

impl CellState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_alive(&self, p: &Point) -> bool {
        self.cells.contains(p)
    }

    /// Bring a cell to life. Returns whether it was dead before.
    pub fn insert(&mut self, p: impl Into<Point>) -> bool {
        self.cells.insert(p.into())
    }

    /// Kill a cell. Returns whether it was alive before.
    pub fn remove(&mut self, p: &Point) -> bool {
        self.cells.remove(p)
    }

    /// Number of alive cells
    pub fn population(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, Point> {
        self.cells.iter()
    }

    /// The smallest rectangle holding every alive cell, or `None` if there are none.
    pub fn bounding_box(&self) -> Option<Aabb> {
        Aabb::from_points(self.cells.iter())
    }

    pub fn translated(&self, dx: WorldOffset, dy: WorldOffset) -> Self {
        self.map(|p| p.offset(dx, dy))
    }

    /// Mirror across the vertical axis `x = 0`.
    pub fn flipped_x(&self) -> Self {
        self.map(|p| Point::new(-p.x, p.y))
    }

    /// Mirror across the horizontal axis `y = 0`.
    pub fn flipped_y(&self) -> Self {
        self.map(|p| Point::new(p.x, -p.y))
    }

    /// Mirror across the diagonal `x = y`.
    pub fn transposed(&self) -> Self {
        self.map(|p| Point::new(p.y, p.x))
    }

    fn map(&self, f: impl Fn(&Point) -> Point) -> Self {
        self.cells.iter().map(f).collect()
    }
}

impl<P: Into<Point>> FromIterator<P> for CellState {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<P: Into<Point>> Extend<P> for CellState {
    fn extend<I: IntoIterator<Item = P>>(&mut self, iter: I) {
        self.cells.extend(iter.into_iter().map(Into::into));
    }
}

impl<'a> IntoIterator for &'a CellState {
    type Item = &'a Point;
    type IntoIter = btree_set::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

impl IntoIterator for CellState {
    type Item = Point;
    type IntoIter = btree_set::IntoIter<Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.into_iter()
    }
}

/// Parses a grid of `O` (alive) and `.` (dead) cells, the top left character being `(0, 0)`.
///
/// This also reads plaintext `.cells` files as found in pattern collections: `*` is accepted for
/// alive cells, and lines starting with `!` are comments that don't count as rows. Nothing else of
/// that format (names, offsets) is kept.
impl FromStr for CellState {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cells = BTreeSet::new();

        let rows = s.lines().filter(|line| !line.starts_with('!'));

        for (y, row) in rows.enumerate() {
            for (x, c) in row.trim_end().chars().enumerate() {
                match c {
                    'O' | '*' => {
                        cells.insert(Point::new(x as WorldOffset, y as WorldOffset));
                    }
                    '.' => {}
                    got => return Err(EngineError::InvalidPattern { got, line: y + 1 }),
                }
            }
        }

        Ok(Self { cells })
    }
}

/// Renders the bounding box of the alive cells in the same grid format [`CellState::from_str`]
/// reads, without a trailing newline. An empty state renders as the empty string.
impl Display for CellState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Some(bbox) = self.bounding_box() else {
            return Ok(());
        };

        for y in bbox.min.y..=bbox.max.y {
            if y != bbox.min.y {
                writeln!(f)?;
            }

            for x in bbox.min.x..=bbox.max.x {
                let c = if self.is_alive(&Point::new(x, y)) {
                    'O'
                } else {
                    '.'
                };
                write!(f, "{c}")?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_grid() {
        let state: CellState = "!Name: glider\n.O.\n..O\nOOO\n".parse().unwrap();

        let expected: CellState = [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)]
            .into_iter()
            .collect();

        assert_eq!(state, expected);
        assert_eq!(state.population(), 5);
    }

    #[test]
    fn parse_cells_file() {
        let file = "!Name: Blinker\n!Comment line\n...\n***\n...\n";
        let expected: CellState = [(0, 1), (1, 1), (2, 1)].into_iter().collect();

        assert_eq!(file.parse::<CellState>().unwrap(), expected);
        assert_eq!(file.parse::<CellState>(), "...\nOOO\n...".parse());
    }

    #[test]
    fn parse_keeps_leading_dead_rows() {
        let state: CellState = "...\nOOO\n...".parse().unwrap();
        let expected: CellState = [(0, 1), (1, 1), (2, 1)].into_iter().collect();

        assert_eq!(state, expected);
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = "O.\n.x".parse::<CellState>().unwrap_err();

        assert_eq!(err, EngineError::InvalidPattern { got: 'x', line: 2 });
    }

    #[test]
    fn display_crops_to_bounding_box() {
        let state: CellState = "....\n.O..\n..OO".parse().unwrap();

        insta::assert_snapshot!(state.to_string(), @r"
        O..
        .OO
        ");
        assert_eq!(CellState::new().to_string(), "");
    }

    #[test]
    fn bounding_box() {
        let state: CellState = [(-2, 5), (3, -1)].into_iter().collect();
        let bbox = state.bounding_box().unwrap();

        assert_eq!(bbox.min, Point::new(-2, -1));
        assert_eq!(bbox.max, Point::new(3, 5));
        assert_eq!(CellState::new().bounding_box(), None);
    }

    #[test]
    fn isometries() {
        let state: CellState = [(1, 2), (-3, 0)].into_iter().collect();

        let flipped: CellState = [(-1, 2), (3, 0)].into_iter().collect();
        assert_eq!(state.flipped_x(), flipped);

        let flipped: CellState = [(1, -2), (-3, 0)].into_iter().collect();
        assert_eq!(state.flipped_y(), flipped);

        let transposed: CellState = [(2, 1), (0, -3)].into_iter().collect();
        assert_eq!(state.transposed(), transposed);
        assert_eq!(state.transposed().transposed(), state);

        let moved: CellState = [(11, -8), (7, -10)].into_iter().collect();
        assert_eq!(state.translated(10, -10), moved);
    }
}
