use crate::error::ExtractionError;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Marker introducing the goodness-of-fit line in the solver output.
pub const RMSRD_MARKER: &str = "# RMSRD/%";

/// Pulls the RMSRD value out of a `Calc_data_SLE.dat` artifact.
///
/// The first marker line whose third whitespace-separated token is a plain
/// numeric literal wins; malformed marker lines are skipped, not fatal,
/// unless no well-formed line follows anywhere in the file.
pub struct RmsrdExtractor {
    numeric: Regex,
}

impl RmsrdExtractor {
    pub fn new() -> Self {
        // digits with at most one decimal point; the solver never writes a
        // sign or exponent in this field
        Self {
            numeric: Regex::new(r"^(?:\d+\.?\d*|\.\d+)$").expect("valid numeric pattern"),
        }
    }

    pub fn extract(&self, path: &Path) -> Result<f64, ExtractionError> {
        let content = fs::read_to_string(path).map_err(|source| ExtractionError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.extract_from_str(&content)
    }

    pub fn extract_from_str(&self, content: &str) -> Result<f64, ExtractionError> {
        let mut malformed = None;
        for line in content.lines() {
            let line = line.trim();
            if !line.starts_with(RMSRD_MARKER) {
                continue;
            }

            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() > 3 && self.numeric.is_match(tokens[2]) {
                if let Ok(value) = tokens[2].parse::<f64>() {
                    // overflowing literals land here as inf; a non-finite
                    // fitness must never win a minimization
                    return Ok(if value.is_finite() { value } else { f64::INFINITY });
                }
            }
            malformed = Some(line.to_string());
        }

        match malformed {
            Some(line) => Err(ExtractionError::Malformed { line }),
            None => Err(ExtractionError::NotFound),
        }
    }
}

impl Default for RmsrdExtractor {
    fn default() -> Self {
        Self::new()
    }
}
