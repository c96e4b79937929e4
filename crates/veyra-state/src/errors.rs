use shared_types::PublicKey;
use thiserror::Error;

/// Failures while applying an already-validated block to state
/// A well-formed block should never trigger these; they
/// exist to catch a validator/state disagreement rather than to reject
/// ordinary user error (that's `veyra-tx-validator`'s job).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("balance underflow applying transaction from {0}")]
    BalanceUnderflow(PublicKey),

    #[error("stake underflow applying transaction from {0}")]
    StakeUnderflow(PublicKey),

    #[error("rewarded set is empty, nothing to distribute to")]
    RewardSetEmpty,
}
