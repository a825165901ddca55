use crate::core::params::{Candidate, ParamSpace, ParamVector, NUM_PARAMS};
use rand::Rng;

/// Draws uniformly random in-bounds candidate vectors.
///
/// Sampling is the only stochastic step of a run; fixing the `Rng` makes a
/// whole run reproducible. Unlike refinement iterates, sampled candidates
/// can never leave the box.
pub struct CandidateSampler<R: Rng> {
    space: ParamSpace,
    rng: R,
}

impl<R: Rng> CandidateSampler<R> {
    pub fn new(space: ParamSpace, rng: R) -> Self {
        Self { space, rng }
    }

    /// Draw one vector, each dimension independent and uniform on its range.
    pub fn draw(&mut self) -> ParamVector {
        let mut values = [0.0; NUM_PARAMS];
        for (value, &(min, max)) in values.iter_mut().zip(self.space.bounds().iter()) {
            *value = self.rng.gen_range(min..=max);
        }
        ParamVector::new(values)
    }

    /// A lazy sequence of `n` fresh candidates, numbered from 1.
    pub fn sample(&mut self, n: usize) -> impl Iterator<Item = Candidate> + '_ {
        (1..=n).map(|index| Candidate {
            index,
            params: self.draw(),
        })
    }
}
