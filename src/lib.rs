pub mod core;
pub mod error;
pub mod optimization;
pub mod runner;
pub mod simulation;

pub use crate::core::*;
pub use error::{ConfigError, ExtractionError, RunError, SolverError};
pub use optimization::{penalize, FitProblem, NelderMeadOptimizer, RefinementCallback};
pub use optimization::{OptimizationCallback, Problem, Solver, SolverResult};
pub use runner::{discover_cases, CaseReport, CaseRunner, RunSettings};
pub use simulation::{InputTemplate, RmsrdExtractor, SolverBridge, WorkingDir};
