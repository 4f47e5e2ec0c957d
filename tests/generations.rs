use std::cell::Cell;
use std::thread;

use lifecore::CellState;
use lifecore::EngineError;
use lifecore::EngineResult;
use lifecore::GameOfLifeAlgorithm;
use lifecore::HashLifeAlgorithm;
use lifecore::NaiveAlgorithm;

mod common;

use common::*;

const GENERATIONS: usize = 40;

#[test]
fn hashlife_matches_naive() {
    let hashlife = HashLifeAlgorithm::new();
    let naive = NaiveAlgorithm::default();

    for (name, state) in variants() {
        for step in [1, 2] {
            let expected = naive.compute_generations_with_step(state.clone(), step);
            let actual = hashlife.compute_generations_with_step(state.clone(), step);

            for (i, (expected, actual)) in expected.zip(actual).take(GENERATIONS).enumerate() {
                assert_eq!(
                    actual.unwrap(),
                    expected.unwrap(),
                    "{name}: generation {} with step {step}",
                    i as u64 * step
                );
            }
        }
    }
}

#[test]
fn steps_with_several_low_bits_match_naive() {
    let hashlife = HashLifeAlgorithm::new();
    let naive = NaiveAlgorithm::default();

    for (name, state) in variants() {
        for step in [3, 5, 6, 7] {
            let expected = naive.compute_generations_with_step(state.clone(), step);
            let actual = hashlife.compute_generations_with_step(state.clone(), step);

            for (i, (expected, actual)) in expected.zip(actual).take(6).enumerate() {
                assert_eq!(
                    actual.unwrap(),
                    expected.unwrap(),
                    "{name}: generation {} with step {step}",
                    i as u64 * step
                );
            }
        }
    }
}

#[test]
fn two_steps_of_two_are_four_steps_of_one() {
    let hashlife = HashLifeAlgorithm::new();

    for (name, state) in variants() {
        let by_two = hashlife
            .compute_generation_with_step(&state, 2)
            .and_then(|s| hashlife.compute_generation_with_step(&s, 2))
            .unwrap();

        let mut by_one = state;
        for _ in 0..4 {
            by_one = hashlife.compute_next_generation(&by_one).unwrap();
        }

        assert_eq!(by_two, by_one, "{name}");
    }
}

#[test]
fn blinker_round_trips() {
    let horizontal = parse(BLINKER);
    let vertical = parse(".O.\n.O.\n.O.");

    let algorithms: [&dyn GameOfLifeAlgorithm; 2] =
        [&HashLifeAlgorithm::new(), &NaiveAlgorithm::default()];

    for algorithm in algorithms {
        let once = algorithm.compute_generation_with_step(&horizontal, 1).unwrap();
        assert_eq!(once, vertical);

        let twice = algorithm.compute_generation_with_step(&once, 1).unwrap();
        assert_eq!(twice, horizontal);
    }
}

#[test]
fn glider_moves_one_cell_diagonally_every_four_generations() {
    let hashlife = HashLifeAlgorithm::new();
    let glider = parse(GLIDER);

    let moved = hashlife.compute_generation_with_step(&glider, 4).unwrap();
    assert_eq!(moved, glider.translated(1, 1));

    let far = hashlife.compute_generation_with_step(&glider, 1 << 20).unwrap();
    assert_eq!(far, glider.translated(1 << 18, 1 << 18));
}

#[test]
fn still_lifes_and_oscillators() {
    let hashlife = HashLifeAlgorithm::new();

    for pattern in STILL_LIFES {
        let state = parse(pattern);
        assert_eq!(hashlife.compute_next_generation(&state).unwrap(), state);
    }

    for pattern in PERIOD_TWO {
        let state = parse(pattern);

        let once = hashlife.compute_next_generation(&state).unwrap();
        assert_ne!(once, state);
        assert_eq!(hashlife.compute_generation_with_step(&state, 1000).unwrap(), state);
    }

    let single = parse(SINGLE_CELL);
    assert!(hashlife.compute_next_generation(&single).unwrap().is_empty());
}

#[test]
fn rendered_generations() {
    let hashlife = HashLifeAlgorithm::new();

    let render = |pattern: &str, n: usize| {
        hashlife
            .compute_generations_with_step(parse(pattern), 1)
            .take(n)
            .map(|s| s.unwrap().to_string())
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    insta::assert_snapshot!(render(BLINKER, 3), @r"
    OOO

    O
    O
    O

    OOO
    ");

    insta::assert_snapshot!(render(TOAD, 2), @r"
    .OOO
    OOO.

    ..O.
    O..O
    O..O
    .O..
    ");
}

/// Hands every call to an inner algorithm, counting them.
struct Counting<A> {
    inner: A,
    calls: Cell<usize>,
}

impl<A: GameOfLifeAlgorithm> GameOfLifeAlgorithm for Counting<A> {
    fn compute_generation_with_step(
        &self,
        state: &CellState,
        step: u64,
    ) -> EngineResult<CellState> {
        self.calls.set(self.calls.get() + 1);
        self.inner.compute_generation_with_step(state, step)
    }
}

#[test]
fn generations_are_lazy() {
    let counting = Counting {
        inner: HashLifeAlgorithm::new(),
        calls: Cell::new(0),
    };
    let glider = parse(GLIDER);

    let mut generations = counting.compute_generations_with_step(glider.clone(), 4);
    assert_eq!(counting.calls.get(), 0);

    let taken: Vec<CellState> = generations
        .by_ref()
        .take(10)
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(taken.len(), 10);
    assert_eq!(counting.calls.get(), 9);

    // same as stepping by hand
    let mut state = glider;
    for (i, generation) in taken.iter().enumerate() {
        assert_eq!(generation, &state, "element {i}");
        state = counting.inner.compute_generation_with_step(&state, 4).unwrap();
    }

    // resuming picks up right after the last element taken
    assert_eq!(generations.next().unwrap().unwrap(), taken[9].translated(1, 1));
    assert_eq!(counting.calls.get(), 10);
}

#[test]
fn zero_step_ends_the_stream() {
    let hashlife = HashLifeAlgorithm::new();
    let mut generations = hashlife.compute_generations_with_step(parse(BLINKER), 0);

    assert_eq!(generations.next(), Some(Ok(parse(BLINKER))));
    assert_eq!(
        generations.next(),
        Some(Err(EngineError::InvalidStep { step: 0 }))
    );
    assert_eq!(generations.next(), None);
}

#[test]
fn clones_share_one_cache_across_threads() {
    let hashlife = HashLifeAlgorithm::new();
    let naive = NaiveAlgorithm::default();

    let handles: Vec<_> = FIXTURES
        .into_iter()
        .map(|(_, pattern)| {
            let hashlife = hashlife.clone();

            thread::spawn(move || {
                let state = parse(pattern);
                let next = hashlife.compute_generation_with_step(&state, 16).unwrap();

                (state, next)
            })
        })
        .collect();

    for handle in handles {
        let (state, next) = handle.join().unwrap();
        assert_eq!(next, naive.compute_generation_with_step(&state, 16).unwrap());
    }

    assert!(hashlife.cache_len() > 1);
}
