use std::iter::FusedIterator;

use crate::cell_state::CellState;
use crate::error::EngineResult;

/// Something that can compute the future of a [`CellState`].
///
/// Implementors only have to provide [`compute_generation_with_step`], everything else is derived
/// from it.
///
/// [`compute_generation_with_step`]: GameOfLifeAlgorithm::compute_generation_with_step
pub trait GameOfLifeAlgorithm {
    /// The state `step` generations after `state`. Fails with
    /// [`EngineError::InvalidStep`](crate::EngineError::InvalidStep) if `step` is 0.
    fn compute_generation_with_step(&self, state: &CellState, step: u64)
    -> EngineResult<CellState>;

    fn compute_next_generation(&self, state: &CellState) -> EngineResult<CellState> {
        self.compute_generation_with_step(state, 1)
    }

    /// Every `step`-th generation of `original`, starting with `original` itself.
    ///
    /// Nothing is computed up front: the `i + 1`-th state is only computed once the `i`-th has
    /// been taken out of the iterator.
    fn compute_generations_with_step(&self, original: CellState, step: u64) -> Generations<'_, Self>
    where
        Self: Sized,
    {
        Generations {
            algorithm: self,
            last: Some(original),
            started: false,
            step,
        }
    }
}

/// Lazy stream of generations returned by
/// [`GameOfLifeAlgorithm::compute_generations_with_step`].
///
/// It never ends on its own, except right after yielding an error.
pub struct Generations<'a, A> {
    algorithm: &'a A,

    /// The last state handed out, `None` once stepping has failed
    last: Option<CellState>,
    started: bool,
    step: u64,
}

impl<A> Generations<'_, A> {
    pub fn step(&self) -> u64 {
        self.step
    }
}

impl<A: GameOfLifeAlgorithm> Iterator for Generations<'_, A> {
    type Item = EngineResult<CellState>;

    fn next(&mut self) -> Option<Self::Item> {
        let last = self.last.as_ref()?;

        if !self.started {
            self.started = true;
            return Some(Ok(last.clone()));
        }

        match self.algorithm.compute_generation_with_step(last, self.step) {
            Ok(state) => {
                self.last = Some(state.clone());
                Some(Ok(state))
            }
            Err(e) => {
                self.last = None;
                Some(Err(e))
            }
        }
    }
}

impl<A: GameOfLifeAlgorithm> FusedIterator for Generations<'_, A> {}
