use std::fmt::Display;
use std::str::FromStr;

use crate::error::EngineError;

/// The 8 neighbors of the cell at (2, 2) of a 4x4 block.
const NBHD_MASK: u16 = 0b0000_0111_0101_0111;

/// The cell at (2, 2) of a 4x4 block.
const CELL_MASK: u16 = 0b0000_0000_0010_0000;

/// Rules of Conway's Game of Life.
pub const B3S23: RuleSet = RuleSet::new(0b1000, 0b1100);

/// # Representation
/// Life rules are represented as
/// ```notrust
/// |------birth------|
/// 0000_0000_0000_0000_0000_0000_0000_0000
///                     |----survival-----|
/// ```
///
/// # Examples
/// ```notrust
/// b3s23:                0000_0000_0000_1000_0000_0000_0000_1100
///
/// b0s0:                 0000_0000_0000_0000_0000_0000_0000_0000
/// b012345678s012345678: 0000_0001_1111_1111_0000_0001_1111_1111
/// ```
///
/// See: https://conwaylife.com/wiki/Rulestring
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuleSet {
    rule: u32,
}

impl Default for RuleSet {
    fn default() -> Self {
        B3S23
    }
}

impl RuleSet {
    /// Create a new `RuleSet` for the given births and survivals. For both `b` and
    /// `s`, numbers are set on a bit basis. For instance if bit `i` in `b` is on, it
    /// means `i` is included in the set of births. Any bit past the 8th is ignored.
    pub const fn new(b: u16, s: u16) -> Self {
        let b = b & 0x1FF;
        let s = s & 0x1FF;

        Self {
            rule: (b as u32) << 16 | s as u32,
        }
    }

    pub fn births(&self) -> u16 {
        ((self.rule & 0x1FF0000) >> 0x10) as u16
    }

    pub fn survivals(&self) -> u16 {
        (self.rule & 0x1FF) as u16
    }

    /// Whether empty space stays empty. Rules with `B0` don't, and can't be stepped by hashing.
    pub fn keeps_void(&self) -> bool {
        self.births() & 1 == 0
    }

    /// Whether a cell is alive in the next generation, given whether it is alive now and how many
    /// of its 8 neighbors are.
    pub fn apply(&self, alive: bool, neighbors: u32) -> bool {
        debug_assert!(neighbors <= 8);

        let n = 1u16 << neighbors;
        let set = if alive {
            self.survivals()
        } else {
            self.births()
        };

        set & n == n
    }

    /// Compute game rules for the current `RuleSet`.
    ///
    /// Indexing into the returned table with a 4x4 block, packed row-major into a `u16` with the
    /// top left cell on bit 15, yields the center 2x2 of that block one generation later, at the
    /// same bit positions. Every other bit of the result is off.
    pub fn compute_rules(&self) -> Vec<u16> {
        let mut rules = vec![0; (u16::MAX as usize) + 1];

        for block in 0..=u16::MAX {
            rules[block as usize] = self.next(block);
        }

        rules
    }

    fn next(&self, block: u16) -> u16 {
        let mut res: u16 = 0;

        // goes: (2, 2), (1, 2), (2, 1), (1, 1)
        let shifts = [0, 1, 4, 5];

        for shift in shifts {
            let nbhd_mask = NBHD_MASK << shift;
            let cell_mask = CELL_MASK << shift;

            let alive = block & cell_mask != 0;
            let neighbors = (block & nbhd_mask).count_ones();

            if self.apply(alive, neighbors) {
                res |= cell_mask;
            }
        }

        res
    }
}

/// Accepts `B3/S23`, `b3s23` and the nameless `3/23`.
impl FromStr for RuleSet {
    type Err = EngineError;

    fn from_str(rule: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidRule {
            rule: rule.to_string(),
        };

        enum State {
            Birth,
            Survival,
        }

        let rule = rule.trim();
        let nameless = rule.starts_with(|c: char| c.is_ascii_digit() || c == '/');

        let mut state = State::Birth;
        let (mut b, mut s) = (0u16, 0u16);
        let (mut seen_b, mut seen_s) = (nameless, false);

        for c in rule.chars() {
            match c {
                'b' | 'B' if !seen_b => {
                    seen_b = true;
                    state = State::Birth;
                }
                's' | 'S' if !seen_s => {
                    seen_s = true;
                    state = State::Survival;
                }
                '/' if nameless && !seen_s => {
                    seen_s = true;
                    state = State::Survival;
                }
                '/' => {}
                n => {
                    let n = n.to_digit(10).filter(|&n| n <= 8).ok_or_else(invalid)?;

                    match state {
                        State::Birth => b |= 1 << n,
                        State::Survival => s |= 1 << n,
                    }
                }
            }
        }

        if !seen_b || !seen_s {
            return Err(invalid());
        }

        Ok(RuleSet::new(b, s))
    }
}

/// Renders as `B3/S23`.
impl Display for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let digits = |set: u16| {
            (0..=8u8)
                .filter(|&n| set & (1 << n) != 0)
                .map(|n| char::from(b'0' + n))
                .collect::<String>()
        };

        write!(f, "B{}/S{}", digits(self.births()), digits(self.survivals()))
    }
}
