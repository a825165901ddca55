use crate::core::params::{ParamSpace, ParamVector, NUM_PARAMS};
use crate::error::RunError;
use crate::optimization::solvers::traits::Problem;
use crate::simulation::{RmsrdExtractor, SolverBridge};

/// Every refinement iterate reuses the same archive slot.
const REFINEMENT_ARTIFACT_INDEX: usize = 1;

/// Split a raw simplex iterate into its boundary projection and the
/// squared-distance penalty for leaving the box.
///
/// Interior points come back unchanged with zero penalty; exterior points
/// are scored at the nearest bound plus a penalty that grows strictly with
/// the distance outside, which is what steers an unconstrained simplex back
/// into the feasible region.
pub fn penalize(space: &ParamSpace, raw: &[f64]) -> (ParamVector, f64) {
    let raw = ParamVector::from_slice(raw);
    let penalty = space
        .violation(&raw)
        .iter()
        .map(|overflow| overflow * overflow)
        .sum();
    (space.clip(&raw), penalty)
}

/// The objective minimized by the simplex refiner: solver RMSRD at the
/// iterate's boundary projection, plus the out-of-box penalty.
///
/// An extraction failure here is fatal for the refinement; the simplex has
/// no valid fallback score.
pub struct FitProblem<'a> {
    space: ParamSpace,
    bridge: &'a SolverBridge,
    extractor: RmsrdExtractor,
    seed: Vec<f64>,
}

impl<'a> FitProblem<'a> {
    /// The seed is clipped into the box; nothing else about later iterates
    /// is constrained here.
    pub fn new(space: ParamSpace, bridge: &'a SolverBridge, seed: &ParamVector) -> Self {
        Self {
            space,
            bridge,
            extractor: RmsrdExtractor::new(),
            seed: space.clip(seed).values().to_vec(),
        }
    }
}

impl Problem for FitProblem<'_> {
    fn cost(&self, params: &[f64]) -> Result<f64, RunError> {
        let (bounded, penalty) = penalize(&self.space, params);
        let output = self.bridge.evaluate(&bounded, REFINEMENT_ARTIFACT_INDEX)?;
        let fitness = self.extractor.extract(&output)?;
        log::info!("RMSRD for {} = {} (penalty {})", bounded, fitness, penalty);
        Ok(fitness + penalty)
    }

    fn num_params(&self) -> usize {
        NUM_PARAMS
    }

    fn initial_params(&self) -> &[f64] {
        &self.seed
    }
}
