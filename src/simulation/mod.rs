pub mod bridge;
pub mod rmsrd;
pub mod template;

pub use bridge::{SolverBridge, WorkingDir};
pub use rmsrd::RmsrdExtractor;
pub use template::InputTemplate;
