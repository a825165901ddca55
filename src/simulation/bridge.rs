use crate::core::params::ParamVector;
use crate::error::SolverError;
use crate::simulation::template::InputTemplate;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::{Duration, Instant};

/// Fixed-name solver input staged in the working directory.
pub const SOLVER_INPUT_FILE: &str = "Input_ASD.inp";
/// Fixed-name output artifact the solver eventually writes.
pub const SOLVER_OUTPUT_FILE: &str = "Calc_data_SLE.dat";
/// Experimental reference data expected next to the staged input.
pub const EXP_DATA_FILE: &str = "Exp_data_SLE.dat";

pub const DEFAULT_EXECUTABLE: &str = "PC_SAFT_ASD_v2022.12.exe";

pub const DATASET_ARCHIVE_DIR: &str = "generated_PC-SAFT_datasets";
pub const INP_ARCHIVE_DIR: &str = "generated_inp_files";
pub const RMSRD_VALUES_DIR: &str = "generated_RMSRD_values";

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(300);

/// Exclusive handle on one case's working directory.
///
/// The staged input, the solver output and the archive folders all live
/// under this root. At most one solver invocation uses it at a time; the
/// sequential workflow guarantees that, not a lock.
#[derive(Clone, Debug)]
pub struct WorkingDir {
    root: PathBuf,
}

impl WorkingDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn input_path(&self) -> PathBuf {
        self.root.join(SOLVER_INPUT_FILE)
    }

    pub fn output_path(&self) -> PathBuf {
        self.root.join(SOLVER_OUTPUT_FILE)
    }

    pub fn dataset_archive_dir(&self) -> PathBuf {
        self.root.join(DATASET_ARCHIVE_DIR)
    }

    pub fn inp_archive_dir(&self) -> PathBuf {
        self.root.join(INP_ARCHIVE_DIR)
    }

    pub fn rmsrd_values_dir(&self) -> PathBuf {
        self.root.join(RMSRD_VALUES_DIR)
    }
}

/// The file-based protocol around one external solver process.
///
/// Per evaluation: render the template, stage the fixed-name input
/// (delete-then-place), drop any stale output, run the executable with the
/// working directory as its cwd, then poll for the output artifact. The
/// exit status is logged but not authoritative; only the artifact's
/// appearance counts as success.
pub struct SolverBridge {
    workdir: WorkingDir,
    template: InputTemplate,
    case_name: String,
    executable: PathBuf,
    poll_interval: Duration,
    poll_timeout: Duration,
}

impl SolverBridge {
    pub fn new(
        workdir: WorkingDir,
        template: InputTemplate,
        case_name: impl Into<String>,
        executable: impl Into<PathBuf>,
    ) -> Self {
        Self {
            workdir,
            template,
            case_name: case_name.into(),
            executable: executable.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        }
    }

    pub fn with_polling(mut self, interval: Duration, timeout: Duration) -> Self {
        self.poll_interval = interval;
        self.poll_timeout = timeout;
        self
    }

    pub fn workdir(&self) -> &WorkingDir {
        &self.workdir
    }

    pub fn case_name(&self) -> &str {
        &self.case_name
    }

    /// One synchronous solver evaluation. Returns the output artifact path.
    ///
    /// `artifact_index` names the archived copy of the rendered input; the
    /// refinement phase reuses index 1 for every iterate.
    pub fn evaluate(
        &self,
        params: &ParamVector,
        artifact_index: usize,
    ) -> Result<PathBuf, SolverError> {
        let rendered = self.template.render(params);

        let archive_dir = self.workdir.inp_archive_dir();
        fs::create_dir_all(&archive_dir).map_err(SolverError::Stage)?;
        let archive =
            archive_dir.join(format!("{}_dataset_{}.inp", self.case_name, artifact_index));
        fs::write(&archive, &rendered).map_err(SolverError::Stage)?;

        let input = self.workdir.input_path();
        if input.exists() {
            fs::remove_file(&input).map_err(SolverError::Stage)?;
        }
        fs::write(&input, &rendered).map_err(SolverError::Stage)?;

        let output = self.workdir.output_path();
        if output.exists() {
            fs::remove_file(&output).map_err(SolverError::Stage)?;
        }

        let status = Command::new(&self.executable)
            .current_dir(self.workdir.root())
            .status()
            .map_err(|source| SolverError::Spawn {
                executable: self.executable.clone(),
                source,
            })?;
        if !status.success() {
            log::warn!("solver exited with {}; waiting for output artifact anyway", status);
        }

        self.wait_for_output(&output)?;
        Ok(output)
    }

    fn wait_for_output(&self, output: &Path) -> Result<(), SolverError> {
        let start = Instant::now();
        while !output.exists() {
            if start.elapsed() >= self.poll_timeout {
                return Err(SolverError::Timeout {
                    waited: start.elapsed(),
                });
            }
            thread::sleep(self.poll_interval);
        }
        Ok(())
    }
}
