use crate::core::config::SEED_FILE;
use crate::simulation::bridge::{WorkingDir, EXP_DATA_FILE};
use crate::simulation::template::TEMPLATE_FILE;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One drug–polymer problem instance: the folder holding its template,
/// experimental data and (optionally) a seed vector.
pub struct Case {
    folder: PathBuf,
}

impl Case {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Copy the template and experimental data into the working directory.
    /// A missing file is a warning, not a failure; the run only fails later
    /// if a downstream step actually needs it.
    pub fn stage_into(&self, workdir: &WorkingDir) -> io::Result<()> {
        for name in [TEMPLATE_FILE, EXP_DATA_FILE] {
            let source = self.folder.join(name);
            if source.exists() {
                fs::copy(&source, workdir.root().join(name))?;
            } else {
                log::warn!(
                    "{} not found in {}; skipping copy",
                    name,
                    self.folder.display()
                );
            }
        }
        Ok(())
    }

    /// The seed file selecting the refinement-only workflow, if present.
    pub fn seed_file(&self) -> Option<PathBuf> {
        let path = self.folder.join(SEED_FILE);
        path.exists().then_some(path)
    }
}

/// Discover case folders: immediate subdirectories of the base directory
/// that carry an input template. Sorted for a stable processing order.
pub fn discover_cases(base: &Path) -> Vec<PathBuf> {
    WalkDir::new(base)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_dir())
        .map(|entry| entry.into_path())
        .filter(|path| path.join(TEMPLATE_FILE).is_file())
        .collect()
}
