use thiserror::Error;
use veyra_block_validator::BlockValidationError;
use veyra_state::StateError;

/// Failure modes for a single round. Quorum, timeout, and peer-block
/// rejections are recovered locally by the driver (they produce a
/// `RoundOutcome::RoundFailed`, not this error) — this type only carries
/// failures the driver cannot recover from on its own.
#[derive(Debug, Error)]
pub enum ConsensusError {
    #[error("applying the accepted block to world state failed: {0}")]
    StateTransition(#[from] StateError),

    #[error("locally produced block failed its own validation pipeline: {0}")]
    SelfValidation(#[from] BlockValidationError),
}
