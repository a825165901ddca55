pub mod callback;
pub mod problem;
pub mod solvers;

pub use callback::RefinementCallback;
pub use problem::{penalize, FitProblem};
pub use solvers::{NelderMeadOptimizer, OptimizationCallback, Problem, Solver, SolverResult};
