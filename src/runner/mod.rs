pub mod case;
pub mod eval_log;

pub use case::{discover_cases, Case};
pub use self::eval_log::EvaluationLog;

use crate::core::config::{RangeConfig, SeedConfig, DEFAULT_MAX_ITER, RANGES_FILE};
use crate::core::params::{Candidate, ParamSpace, ParamVector};
use crate::core::sampler::CandidateSampler;
use crate::error::RunError;
use crate::optimization::callback::RefinementCallback;
use crate::optimization::problem::FitProblem;
use crate::optimization::solvers::{NelderMeadOptimizer, Solver};
use crate::simulation::bridge::{
    SolverBridge, WorkingDir, DEFAULT_EXECUTABLE, DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT,
};
use crate::simulation::rmsrd::RmsrdExtractor;
use crate::simulation::template::{InputTemplate, TEMPLATE_FILE};
use self::eval_log::{GLOBAL_HEADER, SEEDED_HEADER};
use rand::Rng;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Knobs shared by every case of a run.
#[derive(Clone, Debug)]
pub struct RunSettings {
    pub executable: PathBuf,
    pub poll_interval: Duration,
    pub poll_timeout: Duration,
    /// CLI override for the range file's num_datasets.
    pub num_datasets: Option<usize>,
    /// CLI override for the range file's / seed file's maxiter.
    pub maxiter: Option<u64>,
    pub verbose: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            executable: PathBuf::from(DEFAULT_EXECUTABLE),
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            num_datasets: None,
            maxiter: None,
            verbose: false,
        }
    }
}

/// Outcome of one completed case.
#[derive(Clone, Debug)]
pub struct CaseReport {
    pub case_name: String,
    pub optimized: ParamVector,
    pub rmsrd: f64,
    /// Best sampled candidate and its RMSRD, when the global phase ran.
    pub sampled_best: Option<(Candidate, f64)>,
}

/// Drives one case end to end: stage the case files, pick the workflow,
/// evaluate through the solver bridge, refine, and log everything.
///
/// Cases run strictly one at a time; the working directory (the base
/// directory itself) is exclusive to the case in flight.
pub struct CaseRunner {
    base_dir: PathBuf,
    settings: RunSettings,
}

impl CaseRunner {
    pub fn new(base_dir: impl Into<PathBuf>, settings: RunSettings) -> Self {
        Self {
            base_dir: base_dir.into(),
            settings,
        }
    }

    pub fn run_case<R: Rng>(&self, case_folder: &Path, rng: R) -> Result<CaseReport, RunError> {
        let workdir = WorkingDir::new(&self.base_dir);
        let case = Case::new(case_folder);
        case.stage_into(&workdir)?;

        let template = InputTemplate::load(&workdir.root().join(TEMPLATE_FILE))?;
        let case_name = template.case_name()?.to_string();
        let config = RangeConfig::load(&self.base_dir.join(RANGES_FILE))?;

        fs::create_dir_all(workdir.dataset_archive_dir())?;
        fs::create_dir_all(workdir.inp_archive_dir())?;
        fs::create_dir_all(workdir.rmsrd_values_dir())?;

        let log_path = workdir
            .rmsrd_values_dir()
            .join(format!("{}_RMSRD_values.txt", case_name));
        let bridge = SolverBridge::new(workdir, template, &case_name, &self.settings.executable)
            .with_polling(self.settings.poll_interval, self.settings.poll_timeout);

        match case.seed_file() {
            Some(seed_path) => self.run_seeded(&bridge, &config, &seed_path, &log_path),
            None => self.run_global(&bridge, &config, rng, &log_path),
        }
    }

    /// Global-then-local: sample, evaluate every candidate unpenalized,
    /// refine from the best one.
    fn run_global<R: Rng>(
        &self,
        bridge: &SolverBridge,
        config: &RangeConfig,
        rng: R,
        log_path: &Path,
    ) -> Result<CaseReport, RunError> {
        let num_datasets = self.settings.num_datasets.unwrap_or(config.num_datasets);
        let maxiter = self.settings.maxiter.unwrap_or(config.maxiter);

        if self.settings.verbose {
            println!("Starting optimization for drug_polymer: {}", bridge.case_name());
            println!("Number of randomly generated datasets: {}", num_datasets);
            println!("Maximum number of iterations for optimization: {}\n", maxiter);
        }

        let log = EvaluationLog::create(log_path, GLOBAL_HEADER)?;
        let extractor = RmsrdExtractor::new();

        let mut sampler = CandidateSampler::new(config.space, rng);
        let candidates: Vec<Candidate> = sampler.sample(num_datasets).collect();
        for candidate in &candidates {
            self.archive_dataset(bridge, candidate)?;
        }

        let mut best: Option<(Candidate, f64)> = None;
        for candidate in &candidates {
            let output = bridge.evaluate(&candidate.params, candidate.index)?;
            match extractor.extract(&output) {
                Ok(rmsrd) => {
                    log.record_dataset(candidate.index, &candidate.params, rmsrd)?;
                    // strict less-than: first seen wins on exact ties
                    if best.map_or(true, |(_, incumbent)| rmsrd < incumbent) {
                        best = Some((*candidate, rmsrd));
                    }
                }
                Err(err) => {
                    log::error!(
                        "dataset {} of {}: {}",
                        candidate.index,
                        bridge.case_name(),
                        err
                    );
                }
            }
        }

        let (seed, seed_rmsrd) = best.ok_or(RunError::NoViableCandidate)?;
        if self.settings.verbose {
            println!("✓ Best sampled dataset {} => RMSRD={}", seed.index, seed_rmsrd);
        }

        let optimized = self.refine(bridge, config.space, &seed.params, maxiter)?;
        self.finish(bridge, &log, optimized, Some((seed, seed_rmsrd)))
    }

    /// Seeded-local: skip sampling, refine straight from the supplied seed.
    fn run_seeded(
        &self,
        bridge: &SolverBridge,
        config: &RangeConfig,
        seed_path: &Path,
        log_path: &Path,
    ) -> Result<CaseReport, RunError> {
        let seed_config = SeedConfig::load(seed_path)?;
        let maxiter = self
            .settings
            .maxiter
            .or(seed_config.maxiter)
            .unwrap_or(DEFAULT_MAX_ITER);

        if self.settings.verbose {
            println!("Starting optimization for drug_polymer: {}", bridge.case_name());
            println!("Seed: {}", seed_config.seed);
            println!("Maximum number of iterations for optimization: {}\n", maxiter);
        }

        let log = EvaluationLog::create(log_path, SEEDED_HEADER)?;
        let optimized = self.refine(bridge, config.space, &seed_config.seed, maxiter)?;
        self.finish(bridge, &log, optimized, None)
    }

    fn refine(
        &self,
        bridge: &SolverBridge,
        space: ParamSpace,
        seed: &ParamVector,
        maxiter: u64,
    ) -> Result<ParamVector, RunError> {
        let problem = FitProblem::new(space, bridge, seed);
        let mut callback = RefinementCallback::new(self.settings.verbose, maxiter);
        let mut solver = NelderMeadOptimizer::new(maxiter);
        let result = solver.solve(&problem, &mut callback)?;
        log::info!(
            "{} finished after {} iterations ({} evaluations): {}",
            solver.name(),
            result.iterations,
            result.cost_evals,
            result.message
        );
        Ok(ParamVector::from_slice(&result.params))
    }

    /// One last unpenalized evaluation of the refined vector, appended to
    /// the log as the optimized block.
    fn finish(
        &self,
        bridge: &SolverBridge,
        log: &EvaluationLog,
        optimized: ParamVector,
        sampled_best: Option<(Candidate, f64)>,
    ) -> Result<CaseReport, RunError> {
        let output = bridge.evaluate(&optimized, 1)?;
        let rmsrd = RmsrdExtractor::new().extract(&output)?;
        log.record_optimized(&optimized, rmsrd)?;

        if self.settings.verbose {
            println!("✓ Optimized parameters: {} => RMSRD={}", optimized, rmsrd);
        }

        Ok(CaseReport {
            case_name: bridge.case_name().to_string(),
            optimized,
            rmsrd,
            sampled_best,
        })
    }

    /// Archive a sampled dataset as `K: value` lines beside the generated
    /// inputs.
    fn archive_dataset(&self, bridge: &SolverBridge, candidate: &Candidate) -> Result<(), RunError> {
        let path = bridge.workdir().dataset_archive_dir().join(format!(
            "{}_dataset{}.txt",
            bridge.case_name(),
            candidate.index
        ));
        let mut file = fs::File::create(path)?;
        for (name, value) in candidate.params.iter() {
            writeln!(file, "{}: {}", name, value)?;
        }
        Ok(())
    }
}
