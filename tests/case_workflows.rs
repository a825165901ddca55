#![cfg(unix)]

use rand::rngs::StdRng;
use rand::SeedableRng;
use saftoptimizer::core::params::ParamVector;
use saftoptimizer::error::{RunError, SolverError};
use saftoptimizer::runner::{CaseRunner, RunSettings};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

const TEMPLATE: &str = "\
# PC-SAFT ASD input template
IBU_PVP 2 components
params A* B* C* D* E* F* G* H*
";

const RANGES: &str = "\
A_range = (0, 10)
B_range = (0, 1)
C_range = (0, 1)
D_range = (0, 1)
E_range = (0, 1)
F_range = (0, 1)
G_range = (0, 1)
H_range = (0, 1)
num_datasets = 3
maxiter = 1
";

fn write_case(base: &Path, name: &str) -> PathBuf {
    let case_dir = base.join(name);
    fs::create_dir(&case_dir).unwrap();
    fs::write(case_dir.join("Input_ASD_template.inp"), TEMPLATE).unwrap();
    fs::write(case_dir.join("Exp_data_SLE.dat"), "0.1 340.2\n").unwrap();
    case_dir
}

/// Install a fake solver; the body runs with the working directory as cwd
/// and is expected to write (or not write) Calc_data_SLE.dat.
fn install_solver(base: &Path, body: &str) -> PathBuf {
    let path = base.join("fake_solver.sh");
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A solver whose RMSRD follows a fixed per-invocation sequence, keyed by a
/// counter file in the working directory. `cases` is sh `case` arms.
fn sequenced_solver(base: &Path, arms: &str, fallback: &str) -> PathBuf {
    let body = format!(
        "n=$(cat eval_count 2>/dev/null || echo 0)\n\
         n=$((n+1))\n\
         echo $n > eval_count\n\
         case $n in\n{}\n  *) {} ;;\nesac",
        arms, fallback
    );
    install_solver(base, &body)
}

fn settings(executable: PathBuf) -> RunSettings {
    RunSettings {
        executable,
        poll_interval: Duration::from_millis(10),
        poll_timeout: Duration::from_millis(500),
        num_datasets: None,
        maxiter: None,
        verbose: false,
    }
}

const WRITE_RMSRD: &str = r#"printf '# RMSRD/%% %s over 3\n' "$v" > Calc_data_SLE.dat"#;

#[test]
fn global_search_logs_every_dataset_and_refines_the_minimum() {
    let base = tempfile::tempdir().unwrap();
    fs::write(base.path().join("ranges_variables.txt"), RANGES).unwrap();
    let case_dir = write_case(base.path(), "ibu_pvp");
    let exe = sequenced_solver(
        base.path(),
        &format!(
            "  1) v=12.5; {write} ;;\n  2) v=3.25; {write} ;;",
            write = WRITE_RMSRD
        ),
        &format!("v=7.5; {}", WRITE_RMSRD),
    );

    let runner = CaseRunner::new(base.path(), settings(exe));
    let report = runner
        .run_case(&case_dir, StdRng::seed_from_u64(11))
        .unwrap();

    assert_eq!(report.case_name, "IBU_PVP");

    // ties and order: the minimum of the three sampled fitness values wins
    let (best, best_rmsrd) = report.sampled_best.unwrap();
    assert_eq!(best.index, 2);
    assert_eq!(best_rmsrd, 3.25);

    // sampled A stays inside its widened range
    assert!(best.params.get(0) >= 0.0 && best.params.get(0) <= 10.0);

    // with maxiter=1 the refinement cannot move off the seed, and every
    // refinement evaluation scores 7.5, so the seed vertex stays best
    assert_eq!(report.optimized, best.params);
    assert_eq!(report.rmsrd, 7.5);

    let log = fs::read_to_string(
        base.path()
            .join("generated_RMSRD_values/IBU_PVP_RMSRD_values.txt"),
    )
    .unwrap();
    assert!(log.starts_with("RMSRD values for generated datasets:"));
    assert!(log.contains("Dataset 1: "));
    assert!(log.contains("=> RMSRD=12.5"));
    assert!(log.contains("Dataset 2: "));
    assert!(log.contains("=> RMSRD=3.25"));
    assert!(log.contains("Dataset 3: "));
    assert!(log.contains("Optimized Parameters: "));
    assert!(log.trim_end().ends_with("=> RMSRD=7.5"));

    // the sampled datasets were archived
    for i in 1..=3 {
        assert!(base
            .path()
            .join(format!("generated_PC-SAFT_datasets/IBU_PVP_dataset{}.txt", i))
            .exists());
    }
}

#[test]
fn failed_extraction_excludes_the_candidate_from_best_selection() {
    let base = tempfile::tempdir().unwrap();
    fs::write(base.path().join("ranges_variables.txt"), RANGES).unwrap();
    let case_dir = write_case(base.path(), "ibu_pvp");
    // candidate 2 would have won, but its output carries no fitness line
    let exe = sequenced_solver(
        base.path(),
        &format!(
            "  1) v=12.5; {write} ;;\n  2) printf 'no fitness today\\n' > Calc_data_SLE.dat ;;",
            write = WRITE_RMSRD
        ),
        &format!("v=7.5; {}", WRITE_RMSRD),
    );

    let runner = CaseRunner::new(base.path(), settings(exe));
    let report = runner
        .run_case(&case_dir, StdRng::seed_from_u64(11))
        .unwrap();

    let (best, best_rmsrd) = report.sampled_best.unwrap();
    assert_eq!(best.index, 3);
    assert_eq!(best_rmsrd, 7.5);

    let log = fs::read_to_string(
        base.path()
            .join("generated_RMSRD_values/IBU_PVP_RMSRD_values.txt"),
    )
    .unwrap();
    assert!(!log.contains("Dataset 2: "));
}

#[test]
fn seed_file_selects_refinement_only_and_never_regresses() {
    let base = tempfile::tempdir().unwrap();
    fs::write(base.path().join("ranges_variables.txt"), RANGES).unwrap();
    let case_dir = write_case(base.path(), "ibu_pvp");
    fs::write(
        case_dir.join("initial_dataset.txt"),
        "A* = 5\nB* = 0.5\nC* = 0.5\nD* = 0.5\nE* = 0.5\nF* = 0.5\nG* = 0.5\nH* = 0.5\nmaxiter = 1\n",
    )
    .unwrap();
    let exe = install_solver(
        base.path(),
        r"printf '# RMSRD/%% 5.0 over 3\n' > Calc_data_SLE.dat",
    );

    let runner = CaseRunner::new(base.path(), settings(exe));
    let report = runner
        .run_case(&case_dir, StdRng::seed_from_u64(11))
        .unwrap();

    // constant objective: the refiner must hand back the (in-bounds) seed
    let seed = ParamVector::new([5.0, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5]);
    assert_eq!(report.optimized, seed);
    assert_eq!(report.rmsrd, 5.0);
    assert!(report.sampled_best.is_none());

    let log = fs::read_to_string(
        base.path()
            .join("generated_RMSRD_values/IBU_PVP_RMSRD_values.txt"),
    )
    .unwrap();
    assert!(log.starts_with("Starting Nelder-Mead Optimization:"));
    assert!(!log.contains("Dataset "));
    assert!(log.contains("Optimized Parameters: "));
}

#[test]
fn all_candidates_failing_extraction_aborts_the_case() {
    let base = tempfile::tempdir().unwrap();
    fs::write(base.path().join("ranges_variables.txt"), RANGES).unwrap();
    let case_dir = write_case(base.path(), "ibu_pvp");
    let exe = install_solver(
        base.path(),
        r"printf 'nothing useful\n' > Calc_data_SLE.dat",
    );

    let runner = CaseRunner::new(base.path(), settings(exe));
    let err = runner
        .run_case(&case_dir, StdRng::seed_from_u64(11))
        .unwrap_err();
    assert!(matches!(err, RunError::NoViableCandidate));
}

#[test]
fn a_solver_that_never_writes_output_times_out() {
    let base = tempfile::tempdir().unwrap();
    fs::write(base.path().join("ranges_variables.txt"), RANGES).unwrap();
    let case_dir = write_case(base.path(), "ibu_pvp");
    let exe = install_solver(base.path(), "exit 0");

    let mut config = settings(exe);
    config.poll_timeout = Duration::from_millis(50);
    let runner = CaseRunner::new(base.path(), config);
    let err = runner
        .run_case(&case_dir, StdRng::seed_from_u64(11))
        .unwrap_err();
    assert!(matches!(
        err,
        RunError::Solver(SolverError::Timeout { .. })
    ));
}
