mod domain;
mod errors;
mod mining;

pub use domain::{propose_block, satisfies_difficulty, ProposerConfig};
pub use errors::ProposeError;
pub use mining::{mine, MiningOutcome, CANCELLATION_CHECK_INTERVAL};
