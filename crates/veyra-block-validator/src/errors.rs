use shared_types::{Hash, PublicKey};
use thiserror::Error;

/// Rejection reasons, one per validation stage.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BlockValidationError {
    #[error("S0: expected height {expected}, got {actual}")]
    WrongHeight { expected: u64, actual: u64 },

    #[error("S0: previous_hash does not match the parent's block_hash")]
    WrongParentHash,

    #[error("S0: block timestamp {block} is not after parent timestamp {parent}")]
    NonIncreasingTimestamp { block: u64, parent: u64 },

    #[error("S0: block carries {actual} transactions, over the limit of {limit}")]
    TooManyTransactions { actual: usize, limit: usize },

    #[error("S1: announcement from {0:?} does not verify")]
    AnnouncementInvalid(PublicKey),

    #[error("S1: only {got} valid announcements, quorum requires {required}")]
    QuorumNotMet { required: usize, got: usize },

    #[error("S1: block vrf_output does not match the winning announcement's output")]
    WinnerOutputMismatch,

    #[error("S2: ranking committee announcements does not place {0:?} at rank 0")]
    NotTopRankedProposer(PublicKey),

    #[error("S3: recomputed merkle root does not match the block's merkle_root")]
    MerkleMismatch,

    #[error("S4: block hash does not satisfy difficulty_target")]
    DifficultyNotSatisfied,

    #[error("S4: block difficulty_target {actual} does not match expected {expected}")]
    WrongDifficultyTarget { expected: String, actual: String },

    #[error("S5: no signature on file for proposer {0:?}")]
    MissingProposerSignature(PublicKey),

    #[error("S5: proposer signature over block_hash does not verify")]
    SignatureInvalid,

    #[error("S6: transaction {0:?} failed validation against pre-state")]
    TransactionInvalid(Hash),
}
