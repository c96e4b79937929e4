use thiserror::Error;

/// Failure modes for block proposal.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProposeError {
    #[error("local node did not win this round")]
    NotWinner,

    #[error("winning public key has no matching announcement in the round result")]
    MissingWinnerAnnouncement,

    #[error("mining was cancelled before a valid nonce was found")]
    MiningCancelled,

    #[error("mining exceeded the block production timeout before a valid nonce was found")]
    MiningTimedOut,
}
