mod domain;
mod errors;

pub use domain::{
    check_merkle_root, check_proof_of_work, check_proposer_rank, check_signature,
    check_structural, check_transactions, check_vrf_set, validate_block,
};
pub use errors::BlockValidationError;
