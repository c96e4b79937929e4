mod driver;
mod errors;
mod fork_choice;
mod state;

pub use driver::{ConsensusDriver, DriverConfig, RoundOutcome};
pub use errors::ConsensusError;
pub use fork_choice::{block_work, ChainStore};
pub use state::ConsensusState;
