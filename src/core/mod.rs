pub mod config;
pub mod params;
pub mod sampler;

pub use config::{RangeConfig, SeedConfig};
pub use params::{Candidate, ParamSpace, ParamVector, NUM_PARAMS, PARAM_NAMES};
pub use sampler::CandidateSampler;
