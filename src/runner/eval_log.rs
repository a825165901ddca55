use crate::core::params::ParamVector;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const GLOBAL_HEADER: &str = "RMSRD values for generated datasets:";
pub const SEEDED_HEADER: &str = "Starting Nelder-Mead Optimization:";

/// Per-case record of every evaluated candidate.
///
/// Reinitialized (truncated) once at workflow start, append-only afterward,
/// terminated by the optimized-parameters block.
pub struct EvaluationLog {
    path: PathBuf,
}

impl EvaluationLog {
    pub fn create(path: impl Into<PathBuf>, header: &str) -> io::Result<Self> {
        let path = path.into();
        let mut file = File::create(&path)?;
        writeln!(file, "{}", header)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record_dataset(&self, index: usize, params: &ParamVector, rmsrd: f64) -> io::Result<()> {
        self.append(&format!("Dataset {}: {} => RMSRD={}", index, params, rmsrd))
    }

    pub fn record_optimized(&self, params: &ParamVector, rmsrd: f64) -> io::Result<()> {
        self.append(&format!("\nOptimized Parameters: {} => RMSRD={}", params, rmsrd))
    }

    fn append(&self, text: &str) -> io::Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(file, "{}", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::params::NUM_PARAMS;

    #[test]
    fn create_truncates_and_appends_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CASE_RMSRD_values.txt");
        std::fs::write(&path, "leftover from a previous run\n").unwrap();

        let log = EvaluationLog::create(&path, GLOBAL_HEADER).unwrap();
        let params = ParamVector::new([1.0; NUM_PARAMS]);
        log.record_dataset(1, &params, 12.5).unwrap();
        log.record_dataset(2, &params, 3.25).unwrap();
        log.record_optimized(&params, 3.0).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("leftover"));
        assert!(content.starts_with(GLOBAL_HEADER));
        assert!(content.contains("Dataset 1: A=1, "));
        assert!(content.contains("=> RMSRD=3.25"));
        assert!(content.contains("\n\nOptimized Parameters: "));
        assert!(content.ends_with("=> RMSRD=3\n"));
    }
}
