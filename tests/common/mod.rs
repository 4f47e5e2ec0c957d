#![allow(dead_code)]

use lifecore::CellState;

pub const BLINKER: &str = "...\nOOO\n...";
pub const TOAD: &str = "....\n.OOO\nOOO.\n....";
pub const BEACON: &str = "OO..\nOO..\n..OO\n..OO";
pub const GLIDER: &str = ".O.\n..O\nOOO";
pub const LWSS: &str = ".O..O\nO....\nO...O\nOOOO.";
pub const POND: &str = ".OO.\nO..O\nO..O\n.OO.";
pub const BLOCK: &str = "OO\nOO";
pub const TUB: &str = ".O.\nO.O\n.O.";
pub const BEEHIVE: &str = ".OO.\nO..O\n.OO.";
pub const SIX_LONG_LINE: &str = "OOOOOO";
pub const SINGLE_CELL: &str = "O";
pub const EMPTY: &str = "";

pub const FIXTURES: [(&str, &str); 12] = [
    ("blinker", BLINKER),
    ("toad", TOAD),
    ("beacon", BEACON),
    ("glider", GLIDER),
    ("lwss", LWSS),
    ("pond", POND),
    ("block", BLOCK),
    ("tub", TUB),
    ("beehive", BEEHIVE),
    ("six long line", SIX_LONG_LINE),
    ("single cell", SINGLE_CELL),
    ("empty", EMPTY),
];

pub const STILL_LIFES: [&str; 4] = [POND, BLOCK, TUB, BEEHIVE];

pub const PERIOD_TWO: [&str; 3] = [BLINKER, TOAD, BEACON];

pub fn parse(pattern: &str) -> CellState {
    pattern.parse().expect("fixtures are well formed")
}

/// Every fixture, under every isometry and a far away translation
pub fn variants() -> Vec<(String, CellState)> {
    let mut out = Vec::new();

    for (name, pattern) in FIXTURES {
        let state = parse(pattern);

        out.push((name.to_string(), state.clone()));
        out.push((format!("{name}, flipped x"), state.flipped_x()));
        out.push((format!("{name}, flipped y"), state.flipped_y()));
        out.push((format!("{name}, transposed"), state.transposed()));
        out.push((
            format!("{name}, translated"),
            state.translated(-1_000_003, 77_777),
        ));
    }

    out
}
