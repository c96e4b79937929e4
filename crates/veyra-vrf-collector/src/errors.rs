use shared_types::PublicKey;
use thiserror::Error;

/// Failure modes for per-round VRF collection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VrfCollectorError {
    #[error("announcement round {actual} does not match collector round {expected}")]
    WrongRound { expected: u64, actual: u64 },

    #[error("public key {0} is not a member of this round's committee")]
    UnknownCommitteeMember(PublicKey),

    #[error("VRF announcement from {0} failed verification")]
    InvalidAnnouncement(PublicKey),

    #[error("round quorum not met: {actual} of {required} required valid announcements")]
    QuorumNotMet { required: usize, actual: usize },
}
