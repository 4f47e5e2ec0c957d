//! Watch a pattern evolve in the terminal.
//!
//! ```notrust
//! cargo run --example life -- [pattern.cells] [step] [rule]
//! ```
//!
//! `h`, `j`, `k` and `l` move around, `+` and `-` change the frame rate and `q` quits. Set
//! `RUST_LOG=lifecore=debug` to see what the engine is doing (logs go to `life.log`).

use std::fs::File;
use std::io;
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use anyhow::Context;
use crossterm::cursor;
use crossterm::event;
use crossterm::event::Event;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use crossterm::execute;
use crossterm::queue;
use crossterm::style;
use crossterm::terminal;
use lifecore::CellState;
use lifecore::EngineConfig;
use lifecore::GameOfLifeAlgorithm;
use lifecore::HashLifeAlgorithm;
use lifecore::Point;
use lifecore::RuleSet;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Gosper glider gun
const DEFAULT_PATTERN: &str = "\
........................O...........
......................O.O...........
............OO......OO............OO
...........O...O....OO............OO
OO........O.....O...OO..............
OO........O...O.OO....O.O...........
..........O.....O.......O...........
...........O...O....................
............OO......................";

/// Hex values of braille dots
///
///      1   8
///      2  10
///      4  20
///     40  80
///
/// Where the base blank pattern is codepoint `0x2800` (or U+2800)
const BRAILLE_EMPTY: u32 = 0x2800;

/// A window onto the universe, drawn with two by four cells per braille character.
struct Viewport {
    /// Codepoints, one per character of the frame
    cp: Vec<u32>,

    /// The frame buffer
    fb: String,

    /// Width of the viewport, in characters
    cols: usize,

    /// Height of the viewport, in characters
    rows: usize,

    /// Top left cell of the viewport
    origin: Point,
}

impl Viewport {
    fn new(cols: u16, rows: u16) -> Self {
        let (cols, rows) = (cols as usize, rows.saturating_sub(1) as usize);

        Self {
            cp: vec![BRAILLE_EMPTY; cols * rows],
            fb: String::with_capacity(3 * cols * rows + rows),
            cols,
            rows,
            origin: Point::new(-(cols as i64), -(2 * rows as i64)),
        }
    }

    fn pan(&mut self, dx: i64, dy: i64) {
        self.origin = self.origin.offset(dx, dy);
    }

    fn render(&mut self, state: &CellState) -> &str {
        self.cp.fill(BRAILLE_EMPTY);

        for p in state {
            let (x, y) = (p.x - self.origin.x, p.y - self.origin.y);

            if x < 0 || y < 0 {
                continue;
            }

            let (x, y) = (x as usize, y as usize);
            if x >= 2 * self.cols || y >= 4 * self.rows {
                continue;
            }

            self.cp[(y / 4) * self.cols + (x / 2)] += Self::dot(x, y);
        }

        self.fb.clear();

        for (i, &c) in self.cp.iter().enumerate() {
            if i > 0 && i % self.cols == 0 {
                self.fb.push_str("\r\n");
            }

            self.fb.push(char::from_u32(c).unwrap_or(' '));
        }

        &self.fb
    }

    fn dot(x: usize, y: usize) -> u32 {
        match (x % 2, y % 4) {
            (0, 0) => 0x1,
            (1, 0) => 0x8,
            (0, 1) => 0x2,
            (1, 1) => 0x10,
            (0, 2) => 0x4,
            (1, 2) => 0x20,
            (0, 3) => 0x40,
            (1, 3) => 0x80,
            _ => unreachable!(),
        }
    }
}

enum Action {
    Pan(i64, i64),
    Faster,
    Slower,
    Exit,
}

fn action(event: Event) -> Option<Action> {
    let Event::Key(key) = event else {
        return None;
    };

    match key {
        KeyEvent {
            code: KeyCode::Char('q'),
            ..
        }
        | KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            ..
        } => Some(Action::Exit),
        KeyEvent {
            code: KeyCode::Char('h'),
            ..
        } => Some(Action::Pan(-8, 0)),
        KeyEvent {
            code: KeyCode::Char('j'),
            ..
        } => Some(Action::Pan(0, 8)),
        KeyEvent {
            code: KeyCode::Char('k'),
            ..
        } => Some(Action::Pan(0, -8)),
        KeyEvent {
            code: KeyCode::Char('l'),
            ..
        } => Some(Action::Pan(8, 0)),
        KeyEvent {
            code: KeyCode::Char('+'),
            ..
        } => Some(Action::Faster),
        KeyEvent {
            code: KeyCode::Char('-'),
            ..
        } => Some(Action::Slower),
        _ => None,
    }
}

fn run(algorithm: &HashLifeAlgorithm, pattern: CellState, step: u64) -> anyhow::Result<()> {
    let mut stdout = io::stdout();
    let (cols, rows) = terminal::size()?;
    let mut viewport = Viewport::new(cols, rows);
    let mut fps: u32 = 30;

    for (generation, state) in algorithm
        .compute_generations_with_step(pattern, step)
        .enumerate()
    {
        let state = state?;
        let frame_start = Instant::now();

        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(terminal::ClearType::All),
            style::Print(format!(
                "generation {} | population {} | {fps} fps | cache {}\r\n",
                generation as u64 * step,
                state.population(),
                algorithm.cache_len(),
            )),
            style::Print(viewport.render(&state)),
        )?;
        stdout.flush()?;

        let frame = Duration::from_secs(1) / fps;

        while let Some(remaining) = frame.checked_sub(frame_start.elapsed()) {
            if !event::poll(remaining)? {
                break;
            }

            match action(event::read()?) {
                Some(Action::Exit) => return Ok(()),
                Some(Action::Pan(dx, dy)) => viewport.pan(dx, dy),
                Some(Action::Faster) => fps = (fps * 2).min(240),
                Some(Action::Slower) => fps = (fps / 2).max(1),
                None => {}
            }
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let log = File::create("life.log").context("Could not create life.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(Mutex::new(log))
        .with_ansi(false)
        .init();

    let mut args = std::env::args().skip(1);

    let pattern = match args.next() {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Could not read pattern {path}"))?,
        None => DEFAULT_PATTERN.to_string(),
    };
    let pattern: CellState = pattern.parse().context("Could not parse pattern")?;

    let step: u64 = match args.next() {
        Some(step) => step.parse().context("Step must be a positive integer")?,
        None => 1,
    };

    let rule: RuleSet = match args.next() {
        Some(rule) => rule.parse()?,
        None => RuleSet::default(),
    };

    let algorithm = HashLifeAlgorithm::with_config(EngineConfig::default().rule(rule))?;

    info!(
        population = pattern.population(),
        step,
        %rule,
        "Starting"
    );

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;

    let res = run(&algorithm, pattern, step);

    execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    res
}
