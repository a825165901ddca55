use crate::error::ConfigError;
use std::fmt;

/// The eight PC-SAFT fitting parameters, in presentation order.
pub const PARAM_NAMES: [&str; 8] = ["A", "B", "C", "D", "E", "F", "G", "H"];

pub const NUM_PARAMS: usize = PARAM_NAMES.len();

/// One complete assignment of the eight parameters.
///
/// Always holds all eight values; the key order is fixed and only matters
/// for display and serialization into templates and logs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamVector {
    values: [f64; NUM_PARAMS],
}

impl ParamVector {
    pub fn new(values: [f64; NUM_PARAMS]) -> Self {
        Self { values }
    }

    /// Build from a slice of exactly `NUM_PARAMS` values.
    pub fn from_slice(values: &[f64]) -> Self {
        assert_eq!(values.len(), NUM_PARAMS, "expected {} parameter values", NUM_PARAMS);
        let mut fixed = [0.0; NUM_PARAMS];
        fixed.copy_from_slice(values);
        Self { values: fixed }
    }

    pub fn values(&self) -> &[f64; NUM_PARAMS] {
        &self.values
    }

    pub fn get(&self, index: usize) -> f64 {
        self.values[index]
    }

    /// Iterate `(name, value)` pairs in presentation order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        PARAM_NAMES.iter().copied().zip(self.values.iter().copied())
    }
}

impl fmt::Display for ParamVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}

/// One proposed parameter assignment awaiting evaluation.
///
/// The index is 1-based and stable for the duration of a run; it names the
/// archived dataset and input artifacts and correlates log entries.
#[derive(Clone, Copy, Debug)]
pub struct Candidate {
    pub index: usize,
    pub params: ParamVector,
}

/// The box constraint: an inclusive `(min, max)` range per parameter.
#[derive(Clone, Copy, Debug)]
pub struct ParamSpace {
    bounds: [(f64, f64); NUM_PARAMS],
}

impl ParamSpace {
    /// Validates `min <= max` for every dimension.
    pub fn new(bounds: [(f64, f64); NUM_PARAMS]) -> Result<Self, ConfigError> {
        for (name, &(min, max)) in PARAM_NAMES.iter().zip(bounds.iter()) {
            if min > max {
                return Err(ConfigError::InvalidBounds {
                    key: format!("{}_range", name),
                    min,
                    max,
                });
            }
        }
        Ok(Self { bounds })
    }

    pub fn bounds(&self) -> &[(f64, f64); NUM_PARAMS] {
        &self.bounds
    }

    /// Clamp every dimension independently onto its range.
    pub fn clip(&self, params: &ParamVector) -> ParamVector {
        let mut clipped = *params.values();
        for (value, &(min, max)) in clipped.iter_mut().zip(self.bounds.iter()) {
            *value = value.clamp(min, max);
        }
        ParamVector::new(clipped)
    }

    /// Signed overflow per dimension: 0.0 inside the range, otherwise the
    /// distance past the nearest bound (negative below min, positive above
    /// max).
    pub fn violation(&self, params: &ParamVector) -> [f64; NUM_PARAMS] {
        let mut overflow = [0.0; NUM_PARAMS];
        for (i, (&value, &(min, max))) in
            params.values().iter().zip(self.bounds.iter()).enumerate()
        {
            if value < min {
                overflow[i] = value - min;
            } else if value > max {
                overflow[i] = value - max;
            }
        }
        overflow
    }

    pub fn contains(&self, params: &ParamVector) -> bool {
        params
            .values()
            .iter()
            .zip(self.bounds.iter())
            .all(|(&value, &(min, max))| value >= min && value <= max)
    }
}
