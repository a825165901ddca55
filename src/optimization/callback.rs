use super::solvers::traits::OptimizationCallback;
use crate::error::RunError;

/// Iteration result for tracking optimization progress
#[derive(Debug, Clone)]
pub struct IterationResult {
    pub params: Vec<f64>,
    pub cost: f64,
}

/// Callback for tracking and displaying refinement progress
pub struct RefinementCallback {
    verbose: bool,
    max_iterations: u64,
    iteration_count: u64,
    history: Vec<IterationResult>,
}

impl RefinementCallback {
    pub fn new(verbose: bool, max_iterations: u64) -> Self {
        Self {
            verbose,
            max_iterations,
            iteration_count: 0,
            history: Vec::new(),
        }
    }

    /// Get iteration history
    pub fn history(&self) -> &[IterationResult] {
        &self.history
    }
}

impl OptimizationCallback for RefinementCallback {
    fn on_iteration(&mut self, iteration: u64, params: &[f64], cost: f64) -> Result<(), RunError> {
        self.iteration_count = iteration;
        self.history.push(IterationResult {
            params: params.to_vec(),
            cost,
        });

        if self.verbose {
            println!("Iter {:4}: RMSRD+penalty = {:.6e}", iteration, cost);
        }

        Ok(())
    }

    fn should_stop(&self) -> bool {
        self.iteration_count >= self.max_iterations
    }
}
