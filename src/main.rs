use clap::Parser;
use saftoptimizer::core::config::RANGES_FILE;
use saftoptimizer::runner::{discover_cases, CaseRunner, RunSettings};
use saftoptimizer::simulation::bridge::{
    DATASET_ARCHIVE_DIR, DEFAULT_EXECUTABLE, DEFAULT_POLL_INTERVAL,
};
use std::path::PathBuf;
use std::time::Duration;

/// Fit PC-SAFT parameters for drug-polymer cases by driving the external
/// solver and minimizing the RMSRD it reports.
#[derive(Parser)]
#[command(name = "saftoptimizer", version)]
struct Args {
    /// Main program directory: holds the solver executable, the ranges
    /// file and the working files
    base_dir: PathBuf,

    /// Case folders to process; when omitted, subdirectories of the base
    /// directory carrying an input template are discovered
    cases: Vec<PathBuf>,

    /// Solver executable, relative to the base directory unless absolute
    #[arg(long, default_value = DEFAULT_EXECUTABLE)]
    executable: PathBuf,

    /// Override the range file's number of sampled datasets
    #[arg(long)]
    datasets: Option<usize>,

    /// Override the iteration budget for the simplex refinement
    #[arg(long)]
    maxiter: Option<u64>,

    /// Give up on a solver invocation after this many seconds without an
    /// output artifact
    #[arg(long, default_value_t = 300)]
    poll_timeout_secs: u64,

    /// Print per-iteration progress
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let executable = if args.executable.is_absolute() {
        args.executable.clone()
    } else {
        args.base_dir.join(&args.executable)
    };

    println!("Ranges variables file: {}", args.base_dir.join(RANGES_FILE).display());
    println!(
        "Generated datasets path: {}",
        args.base_dir.join(DATASET_ARCHIVE_DIR).display()
    );
    println!("Executable path: {}", executable.display());

    let cases = if args.cases.is_empty() {
        discover_cases(&args.base_dir)
    } else {
        args.cases.clone()
    };
    if cases.is_empty() {
        eprintln!("No case folders found under {}. Exiting.", args.base_dir.display());
        std::process::exit(1);
    }

    let settings = RunSettings {
        executable,
        poll_interval: DEFAULT_POLL_INTERVAL,
        poll_timeout: Duration::from_secs(args.poll_timeout_secs),
        num_datasets: args.datasets,
        maxiter: args.maxiter,
        verbose: args.verbose,
    };
    let runner = CaseRunner::new(&args.base_dir, settings);

    let mut failures = 0;
    for case in &cases {
        println!("\n=== Case {} ===", case.display());
        match runner.run_case(case, rand::thread_rng()) {
            Ok(report) => {
                println!(
                    "✓ {}: optimized {} => RMSRD={}",
                    report.case_name, report.optimized, report.rmsrd
                );
            }
            Err(err) => {
                failures += 1;
                log::error!("case {} failed: {}", case.display(), err);
                eprintln!("✗ case {} failed: {}", case.display(), err);
            }
        }
    }

    if failures > 0 {
        std::process::exit(1);
    }
}
