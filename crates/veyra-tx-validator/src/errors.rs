use shared_types::{Hash, PublicKey};
use thiserror::Error;

/// Rejection reasons for a single transaction.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TxValidationError {
    #[error("signature verification failed")]
    SignatureInvalid,

    #[error("amount must be positive")]
    NonPositiveAmount,

    #[error("fee must not be negative")]
    NegativeFee,

    #[error("transfer sender and receiver must differ")]
    SelfTransfer,

    #[error("nonce mismatch: expected {expected}, got {actual}")]
    NonceMismatch { expected: u64, actual: u64 },

    #[error("insufficient balance: need {required}, have {available}")]
    InsufficientBalance { required: u128, available: u128 },

    #[error("insufficient stake: need {required}, have {available}")]
    InsufficientStake { required: u128, available: u128 },

    #[error("reward transaction is invalid outside proposer injection")]
    InvalidReward,

    #[error("unknown sender account {0}")]
    UnknownSender(PublicKey),
}

/// Mempool-level rejection reasons, distinct from per-transaction validity.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MempoolError {
    #[error("transaction {0:?} already in pool")]
    DuplicateTransaction(Hash),

    #[error("transaction {0:?} not found in pool")]
    TransactionNotFound(Hash),

    #[error("pool capacity {capacity} reached")]
    PoolFull { capacity: usize },
}
