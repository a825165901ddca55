use crate::core::params::{ParamSpace, ParamVector, NUM_PARAMS, PARAM_NAMES};
use crate::error::ConfigError;
use indexmap::IndexMap;
use std::fs;
use std::path::Path;

pub const RANGES_FILE: &str = "ranges_variables.txt";
pub const SEED_FILE: &str = "initial_dataset.txt";

pub const DEFAULT_NUM_DATASETS: usize = 25;
pub const DEFAULT_MAX_ITER: u64 = 25;

/// Parsed `ranges_variables.txt`: the eight parameter ranges plus the
/// optional sampling and refinement budgets.
#[derive(Clone, Copy, Debug)]
pub struct RangeConfig {
    pub space: ParamSpace,
    pub num_datasets: usize,
    pub maxiter: u64,
}

impl RangeConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = read_assignments(path)?;

        let mut bounds = [(0.0, 0.0); NUM_PARAMS];
        for (slot, name) in bounds.iter_mut().zip(PARAM_NAMES.iter()) {
            let key = format!("{}_range", name);
            let value = raw
                .get(key.as_str())
                .ok_or_else(|| ConfigError::MissingRange { key: key.clone() })?;
            *slot = parse_range_pair(value).ok_or_else(|| ConfigError::InvalidRange {
                key: key.clone(),
                value: value.clone(),
            })?;
        }

        let num_datasets = read_budget(&raw, "num_datasets", DEFAULT_NUM_DATASETS as u64) as usize;
        let maxiter = read_budget(&raw, "maxiter", DEFAULT_MAX_ITER);

        Ok(Self {
            space: ParamSpace::new(bounds)?,
            num_datasets,
            maxiter,
        })
    }
}

/// Parsed `initial_dataset.txt`: a user-supplied starting vector for the
/// refinement-only workflow, keyed by the template placeholders (`A*`..).
#[derive(Clone, Copy, Debug)]
pub struct SeedConfig {
    pub seed: ParamVector,
    pub maxiter: Option<u64>,
}

impl SeedConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = read_assignments(path)?;

        let mut values = [0.0; NUM_PARAMS];
        for (slot, name) in values.iter_mut().zip(PARAM_NAMES.iter()) {
            let key = format!("{}*", name);
            let value = raw
                .get(key.as_str())
                .ok_or_else(|| ConfigError::MissingSeed { key: key.clone() })?;
            *slot = value.parse().map_err(|_| ConfigError::InvalidSeed {
                key: key.clone(),
                value: value.clone(),
            })?;
        }

        let maxiter = match raw.get("maxiter") {
            Some(value) => match value.parse() {
                Ok(n) => Some(n),
                Err(_) => {
                    log::warn!("ignoring malformed maxiter '{}' in seed file", value);
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            seed: ParamVector::new(values),
            maxiter,
        })
    }
}

/// Collect the `key = value` assignments of a config file, in file order.
/// Blank lines and lines without `=` are skipped; a repeated key keeps the
/// last assignment.
fn read_assignments(path: &Path) -> Result<IndexMap<String, String>, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut assignments = IndexMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        assignments.insert(key.trim().to_string(), value.trim().to_string());
    }
    Ok(assignments)
}

/// Parse a `(min, max)` tuple literal. Nothing else is accepted; the range
/// file carries data, never expressions.
fn parse_range_pair(raw: &str) -> Option<(f64, f64)> {
    let inner = raw.trim().strip_prefix('(')?.strip_suffix(')')?;
    let (min, max) = inner.split_once(',')?;
    Some((min.trim().parse().ok()?, max.trim().parse().ok()?))
}

fn read_budget(raw: &IndexMap<String, String>, key: &str, default: u64) -> u64 {
    match raw.get(key) {
        Some(value) => match value.parse() {
            Ok(n) => n,
            Err(_) => {
                log::warn!("ignoring malformed {} '{}', using default {}", key, value, default);
                default
            }
        },
        None => default,
    }
}
