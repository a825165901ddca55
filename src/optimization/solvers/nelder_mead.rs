use super::traits::{OptimizationCallback, Problem, Solver, SolverResult};
use crate::error::RunError;

/// Derivative-free simplex minimizer (Nelder-Mead).
///
/// Works on an (n+1)-vertex simplex seeded from the problem's initial
/// point. Bounds are not enforced here; the objective is expected to
/// penalize iterates that leave the box.
pub struct NelderMeadOptimizer {
    max_iter: u64,
    xatol: f64,
    fatol: f64,
    alpha: f64, // reflection
    gamma: f64, // expansion
    rho: f64,   // contraction
    sigma: f64, // shrink
}

impl NelderMeadOptimizer {
    pub fn new(max_iter: u64) -> Self {
        Self {
            max_iter,
            xatol: 1e-4,
            fatol: 1e-4,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
        }
    }

    pub fn with_tolerances(mut self, xatol: f64, fatol: f64) -> Self {
        self.xatol = xatol;
        self.fatol = fatol;
        self
    }

    /// Seed vertex plus one per dimension, each nudged 5% along its axis
    /// (0.00025 when the seed coordinate is zero).
    fn initial_simplex(seed: &[f64]) -> Vec<Vec<f64>> {
        let mut simplex = Vec::with_capacity(seed.len() + 1);
        simplex.push(seed.to_vec());
        for i in 0..seed.len() {
            let mut vertex = seed.to_vec();
            if vertex[i] != 0.0 {
                vertex[i] *= 1.05;
            } else {
                vertex[i] = 0.00025;
            }
            simplex.push(vertex);
        }
        simplex
    }
}

fn track_best(simplex: &[Vec<f64>], costs: &[f64], best_cost: &mut f64, best_params: &mut Vec<f64>) {
    for (vertex, &cost) in simplex.iter().zip(costs.iter()) {
        if cost < *best_cost {
            *best_cost = cost;
            *best_params = vertex.clone();
        }
    }
}

impl Solver for NelderMeadOptimizer {
    fn name(&self) -> &str {
        "NelderMead"
    }

    fn solve(
        &mut self,
        problem: &dyn Problem,
        callback: &mut dyn OptimizationCallback,
    ) -> Result<SolverResult, RunError> {
        let n = problem.num_params();
        let mut simplex = Self::initial_simplex(problem.initial_params());
        let mut costs = Vec::with_capacity(n + 1);
        let mut cost_evals = 0usize;
        for vertex in &simplex {
            costs.push(problem.cost(vertex)?);
            cost_evals += 1;
        }

        let mut best_cost = f64::INFINITY;
        let mut best_params = problem.initial_params().to_vec();
        track_best(&simplex, &costs, &mut best_cost, &mut best_params);

        let mut iterations = 0;
        for iter in 0..self.max_iter {
            iterations = iter + 1;

            // order the vertices by cost
            let mut order: Vec<usize> = (0..simplex.len()).collect();
            order.sort_by(|&a, &b| {
                costs[a]
                    .partial_cmp(&costs[b])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            let best = order[0];
            let second_worst = order[n - 1];
            let worst = order[n];

            callback.on_iteration(iterations, &simplex[best], costs[best])?;
            if callback.should_stop() {
                track_best(&simplex, &costs, &mut best_cost, &mut best_params);
                return Ok(SolverResult {
                    success: true,
                    cost: best_cost,
                    iterations,
                    message: "Stopped by callback".into(),
                    params: best_params,
                    cost_evals,
                });
            }

            // convergence: simplex collapsed in both x and f
            let f_spread = costs[worst] - costs[best];
            let mut x_spread = 0.0_f64;
            for vertex in &simplex {
                for (v, b) in vertex.iter().zip(simplex[best].iter()) {
                    x_spread = x_spread.max((v - b).abs());
                }
            }
            if f_spread.abs() <= self.fatol && x_spread <= self.xatol {
                track_best(&simplex, &costs, &mut best_cost, &mut best_params);
                return Ok(SolverResult {
                    success: true,
                    cost: best_cost,
                    iterations,
                    message: "Converged".into(),
                    params: best_params,
                    cost_evals,
                });
            }

            // centroid of every vertex except the worst
            let mut centroid = vec![0.0; n];
            for (idx, vertex) in simplex.iter().enumerate() {
                if idx == worst {
                    continue;
                }
                for j in 0..n {
                    centroid[j] += vertex[j] / n as f64;
                }
            }

            // reflection
            let reflected: Vec<f64> = (0..n)
                .map(|j| centroid[j] + self.alpha * (centroid[j] - simplex[worst][j]))
                .collect();
            let reflected_cost = problem.cost(&reflected)?;
            cost_evals += 1;

            if reflected_cost < costs[best] {
                // best so far: try expansion
                let expanded: Vec<f64> = (0..n)
                    .map(|j| centroid[j] + self.gamma * (reflected[j] - centroid[j]))
                    .collect();
                let expanded_cost = problem.cost(&expanded)?;
                cost_evals += 1;

                if expanded_cost < reflected_cost {
                    simplex[worst] = expanded;
                    costs[worst] = expanded_cost;
                } else {
                    simplex[worst] = reflected;
                    costs[worst] = reflected_cost;
                }
            } else if reflected_cost < costs[second_worst] {
                simplex[worst] = reflected;
                costs[worst] = reflected_cost;
            } else {
                // contraction toward the worst vertex
                let contracted: Vec<f64> = (0..n)
                    .map(|j| centroid[j] + self.rho * (simplex[worst][j] - centroid[j]))
                    .collect();
                let contracted_cost = problem.cost(&contracted)?;
                cost_evals += 1;

                if contracted_cost < costs[worst] {
                    simplex[worst] = contracted;
                    costs[worst] = contracted_cost;
                } else {
                    // shrink everything toward the best vertex
                    let anchor = simplex[best].clone();
                    for idx in 0..simplex.len() {
                        if idx == best {
                            continue;
                        }
                        for j in 0..n {
                            simplex[idx][j] = anchor[j] + self.sigma * (simplex[idx][j] - anchor[j]);
                        }
                        costs[idx] = problem.cost(&simplex[idx])?;
                        cost_evals += 1;
                    }
                }
            }

            track_best(&simplex, &costs, &mut best_cost, &mut best_params);
        }

        Ok(SolverResult {
            success: false,
            cost: best_cost,
            iterations,
            message: "Max iterations reached".into(),
            params: best_params,
            cost_evals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Quadratic {
        start: Vec<f64>,
        target: Vec<f64>,
    }

    impl Problem for Quadratic {
        fn cost(&self, params: &[f64]) -> Result<f64, RunError> {
            Ok(params
                .iter()
                .zip(self.target.iter())
                .map(|(p, t)| (p - t).powi(2))
                .sum())
        }

        fn num_params(&self) -> usize {
            self.start.len()
        }

        fn initial_params(&self) -> &[f64] {
            &self.start
        }
    }

    struct Recorder {
        iterations: u64,
    }

    impl OptimizationCallback for Recorder {
        fn on_iteration(&mut self, iteration: u64, _: &[f64], _: f64) -> Result<(), RunError> {
            self.iterations = iteration;
            Ok(())
        }
    }

    #[test]
    fn converges_on_a_smooth_quadratic() {
        let problem = Quadratic {
            start: vec![0.0, 0.0],
            target: vec![1.0, 2.0],
        };
        let mut callback = Recorder { iterations: 0 };
        let result = NelderMeadOptimizer::new(500)
            .solve(&problem, &mut callback)
            .unwrap();

        assert!(result.success, "{}", result.message);
        assert!(result.cost < 1e-6);
        assert!((result.params[0] - 1.0).abs() < 1e-2);
        assert!((result.params[1] - 2.0).abs() < 1e-2);
        assert!(callback.iterations > 0);
    }

    #[test]
    fn single_iteration_never_returns_worse_than_the_seed() {
        let start = vec![5.0, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5];
        let problem = Quadratic {
            start: start.clone(),
            target: vec![1.0; 8],
        };
        let seed_cost = problem.cost(&start).unwrap();
        let mut callback = Recorder { iterations: 0 };
        let result = NelderMeadOptimizer::new(1)
            .solve(&problem, &mut callback)
            .unwrap();

        assert!(result.cost <= seed_cost);
    }

    #[test]
    fn budget_exhaustion_is_reported() {
        let problem = Quadratic {
            start: vec![10.0; 8],
            target: vec![0.0; 8],
        };
        let mut callback = Recorder { iterations: 0 };
        let result = NelderMeadOptimizer::new(2)
            .solve(&problem, &mut callback)
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.iterations, 2);
        assert_eq!(result.message, "Max iterations reached");
    }
}
