//! Six-stage block acceptance pipeline: structural shape, VRF set, proposer rank, Merkle root, proof of work, signature, transactions.
//!
//! Each stage is checked in order and the first failure is returned;
//! callers that want every failing stage should call the stage functions
//! directly instead of [`validate_block`].

use primitive_types::U256;
use shared_types::{Block, PublicKey};
use veyra_scoring::{rank, ScoringInput};
use veyra_tx_validator::{validate_transaction, AccountLookup, RollingAccounts};
use veyra_vrf_collector::{quorum_threshold, CommitteeInfoProvider};

use crate::errors::BlockValidationError;

/// Stage S0: shape and position of the block relative to its parent.
pub fn check_structural(
    block: &Block,
    parent: &Block,
    max_tx_per_block: usize,
) -> Result<(), BlockValidationError> {
    if block.height != parent.height + 1 {
        return Err(BlockValidationError::WrongHeight {
            expected: parent.height + 1,
            actual: block.height,
        });
    }
    if block.previous_hash != parent.block_hash {
        return Err(BlockValidationError::WrongParentHash);
    }
    if block.timestamp <= parent.timestamp {
        return Err(BlockValidationError::NonIncreasingTimestamp {
            block: block.timestamp,
            parent: parent.timestamp,
        });
    }
    if block.transactions.len() > max_tx_per_block {
        return Err(BlockValidationError::TooManyTransactions {
            actual: block.transactions.len(),
            limit: max_tx_per_block,
        });
    }
    Ok(())
}

/// Stage S1: every announcement re-verifies, quorum is met, and the block's
/// own `vrf_output` belongs to the top-ranked announcement.
pub fn check_vrf_set(
    block: &Block,
    committee: &[PublicKey],
    round_input: &[u8; 32],
    committee_info: &dyn CommitteeInfoProvider,
) -> Result<(), BlockValidationError> {
    for announcement in &block.all_vrf_announcements {
        if !committee.contains(&announcement.public_key) {
            return Err(BlockValidationError::AnnouncementInvalid(announcement.public_key));
        }
        if announcement.round != block.round
            || !veyra_vrf::verify(
                &announcement.public_key,
                round_input,
                &announcement.vrf_output,
                &announcement.vrf_proof,
            )
        {
            return Err(BlockValidationError::AnnouncementInvalid(announcement.public_key));
        }
    }

    let required = quorum_threshold(committee.len());
    if block.all_vrf_announcements.len() < required {
        return Err(BlockValidationError::QuorumNotMet {
            required,
            got: block.all_vrf_announcements.len(),
        });
    }

    let ranked = ranked_committee(block, committee_info);
    let winner = ranked.first().ok_or(BlockValidationError::QuorumNotMet {
        required,
        got: 0,
    })?;
    let winner_announcement = block
        .all_vrf_announcements
        .iter()
        .find(|a| a.public_key == winner.public_key)
        .ok_or(BlockValidationError::WinnerOutputMismatch)?;
    if winner_announcement.vrf_output != block.vrf_output {
        return Err(BlockValidationError::WinnerOutputMismatch);
    }

    Ok(())
}

/// Stage S2: re-running the C4 ranking over the block's announcements must
/// place `block.proposer_pk` at rank 0.
pub fn check_proposer_rank(
    block: &Block,
    committee_info: &dyn CommitteeInfoProvider,
) -> Result<(), BlockValidationError> {
    let ranked = ranked_committee(block, committee_info);
    match ranked.first() {
        Some(top) if top.public_key == block.proposer_pk => Ok(()),
        _ => Err(BlockValidationError::NotTopRankedProposer(block.proposer_pk)),
    }
}

fn ranked_committee(
    block: &Block,
    committee_info: &dyn CommitteeInfoProvider,
) -> Vec<veyra_scoring::ScoredMember> {
    let inputs: Vec<ScoringInput> = block
        .all_vrf_announcements
        .iter()
        .map(|a| ScoringInput {
            public_key: a.public_key,
            raw_vrf_score: a.vrf_output.score(),
            stake: committee_info.stake(&a.public_key),
            days_since_election: committee_info.days_since_election(&a.public_key),
            uptime_ratio: committee_info.uptime_ratio(&a.public_key),
        })
        .collect();
    rank(&inputs)
}

/// Stage S3: the canonical-order Merkle root recomputed from `block.transactions`
/// must equal `block.merkle_root`.
pub fn check_merkle_root(block: &Block) -> Result<(), BlockValidationError> {
    let (_, root) = veyra_merkle::order_and_root(block.transactions.clone());
    if root != block.merkle_root {
        return Err(BlockValidationError::MerkleMismatch);
    }
    Ok(())
}

/// Stage S4: the block hash satisfies its stated target, and that target is
/// the one the difficulty controller actually expects at this height.
pub fn check_proof_of_work(block: &Block, expected_difficulty: U256) -> Result<(), BlockValidationError> {
    if block.difficulty_target != expected_difficulty {
        return Err(BlockValidationError::WrongDifficultyTarget {
            expected: format!("{expected_difficulty:#x}"),
            actual: format!("{:#x}", block.difficulty_target),
        });
    }
    if U256::from_big_endian(&block.compute_hash()) > block.difficulty_target {
        return Err(BlockValidationError::DifficultyNotSatisfied);
    }
    Ok(())
}

/// Stage S5: the proposer's Ed25519 signature over `block.block_hash` verifies.
pub fn check_signature(block: &Block) -> Result<(), BlockValidationError> {
    let signature = block
        .signatures
        .get(&block.proposer_pk)
        .ok_or(BlockValidationError::MissingProposerSignature(block.proposer_pk))?;
    if !shared_crypto::verify(&block.proposer_pk, &block.block_hash, signature) {
        return Err(BlockValidationError::SignatureInvalid);
    }
    Ok(())
}

/// Stage S6: every transaction passes C8 against the rolling pre-state —
/// each transaction is checked against state as mutated by the ones before
/// it in the same block, not the block's starting snapshot.
pub fn check_transactions(
    block: &Block,
    accounts: &dyn AccountLookup,
    expected_reward: u128,
) -> Result<(), BlockValidationError> {
    let mut rolling = RollingAccounts::new(accounts);
    for tx in &block.transactions {
        validate_transaction(tx, &rolling, expected_reward)
            .map_err(|_| BlockValidationError::TransactionInvalid(tx.hash))?;
        rolling.apply(tx);
    }
    Ok(())
}

/// Run all six stages in order, stopping at the first rejection.
#[allow(clippy::too_many_arguments)]
pub fn validate_block(
    block: &Block,
    parent: &Block,
    committee: &[PublicKey],
    round_input: &[u8; 32],
    committee_info: &dyn CommitteeInfoProvider,
    expected_difficulty: U256,
    max_tx_per_block: usize,
    accounts: &dyn AccountLookup,
    expected_reward: u128,
) -> Result<(), BlockValidationError> {
    check_structural(block, parent, max_tx_per_block)?;
    check_vrf_set(block, committee, round_input, committee_info)?;
    check_proposer_rank(block, committee_info)?;
    check_merkle_root(block)?;
    check_proof_of_work(block, expected_difficulty)?;
    check_signature(block)?;
    check_transactions(block, accounts, expected_reward)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::Ed25519KeyPair;
    use shared_types::{AccountState, VRFAnnouncement};
    use std::collections::BTreeMap;

    struct FlatCommittee;
    impl CommitteeInfoProvider for FlatCommittee {
        fn stake(&self, _public_key: &PublicKey) -> u128 {
            100
        }
        fn days_since_election(&self, _public_key: &PublicKey) -> f64 {
            0.0
        }
        fn uptime_ratio(&self, _public_key: &PublicKey) -> f64 {
            1.0
        }
    }

    struct EmptyAccounts;
    impl AccountLookup for EmptyAccounts {
        fn account(&self, public_key: &PublicKey) -> Option<AccountState> {
            Some(AccountState::new(*public_key))
        }
    }

    struct FixedAccounts(std::collections::HashMap<PublicKey, AccountState>);
    impl AccountLookup for FixedAccounts {
        fn account(&self, public_key: &PublicKey) -> Option<AccountState> {
            self.0.get(public_key).cloned()
        }
    }

    fn genesis() -> Block {
        Block {
            height: 0,
            previous_hash: [0u8; 32],
            timestamp: 0,
            round: 0,
            proposer_pk: PublicKey::ZERO,
            vrf_output: shared_types::VRFOutput([0u8; 32]),
            vrf_proof: shared_types::VRFProof([0u8; 64]),
            all_vrf_announcements: vec![],
            rewarded_top_x: vec![],
            transactions: vec![],
            merkle_root: [0u8; 32],
            nonce: 0,
            difficulty_target: U256::MAX,
            block_hash: [0u8; 32],
            signatures: BTreeMap::new(),
        }
    }

    fn signed_child(keypair: &Ed25519KeyPair, parent: &Block, round_input: [u8; 32]) -> Block {
        let pk = keypair.public_key();
        let (vrf_output, vrf_proof) = veyra_vrf::evaluate(keypair, &round_input);
        let announcement = VRFAnnouncement {
            round: 1,
            public_key: pk,
            vrf_output,
            vrf_proof,
            score: 1.0,
            timestamp: 1,
        };

        let mut block = Block {
            height: parent.height + 1,
            previous_hash: parent.block_hash,
            timestamp: parent.timestamp + 1,
            round: 1,
            proposer_pk: pk,
            vrf_output,
            vrf_proof,
            all_vrf_announcements: vec![announcement],
            rewarded_top_x: vec![pk],
            transactions: vec![],
            merkle_root: [0u8; 32],
            nonce: 0,
            difficulty_target: U256::MAX,
            block_hash: [0u8; 32],
            signatures: BTreeMap::new(),
        };
        block.block_hash = block.compute_hash();
        let signature = keypair.sign(&block.block_hash);
        block.signatures.insert(pk, signature);
        block
    }

    #[test]
    fn single_member_committee_passes_every_stage() {
        let keypair = Ed25519KeyPair::from_seed([3u8; 32]);
        let pk = keypair.public_key();
        let parent = genesis();
        let round_input = veyra_vrf::round_input(&parent.block_hash, 1);
        let block = signed_child(&keypair, &parent, round_input);

        assert!(validate_block(
            &block,
            &parent,
            &[pk],
            &round_input,
            &FlatCommittee,
            U256::MAX,
            10_000,
            &EmptyAccounts,
            0,
        )
        .is_ok());
    }

    #[test]
    fn wrong_height_fails_structural_stage() {
        let parent = genesis();
        let mut block = parent.clone();
        block.height = 5;
        assert_eq!(
            check_structural(&block, &parent, 10_000).unwrap_err(),
            BlockValidationError::WrongHeight { expected: 1, actual: 5 }
        );
    }

    #[test]
    fn announcement_from_non_committee_member_is_rejected() {
        let keypair = Ed25519KeyPair::from_seed([3u8; 32]);
        let parent = genesis();
        let round_input = veyra_vrf::round_input(&parent.block_hash, 1);
        let block = signed_child(&keypair, &parent, round_input);

        let other_committee = [PublicKey::from_bytes([9u8; 32])];
        assert!(matches!(
            check_vrf_set(&block, &other_committee, &round_input, &FlatCommittee),
            Err(BlockValidationError::AnnouncementInvalid(_))
        ));
    }

    #[test]
    fn tampered_merkle_root_is_rejected() {
        let keypair = Ed25519KeyPair::from_seed([3u8; 32]);
        let parent = genesis();
        let round_input = veyra_vrf::round_input(&parent.block_hash, 1);
        let mut block = signed_child(&keypair, &parent, round_input);
        block.merkle_root = [0xffu8; 32];
        assert_eq!(
            check_merkle_root(&block).unwrap_err(),
            BlockValidationError::MerkleMismatch
        );
    }

    #[test]
    fn missing_signature_is_rejected() {
        let keypair = Ed25519KeyPair::from_seed([3u8; 32]);
        let parent = genesis();
        let round_input = veyra_vrf::round_input(&parent.block_hash, 1);
        let mut block = signed_child(&keypair, &parent, round_input);
        block.signatures.clear();
        assert!(matches!(
            check_signature(&block),
            Err(BlockValidationError::MissingProposerSignature(_))
        ));
    }

    #[test]
    fn second_sequential_same_sender_transaction_rolls_forward() {
        use shared_types::TransactionType;

        let sender_keypair = Ed25519KeyPair::from_seed([5u8; 32]);
        let receiver = PublicKey::from_bytes([6u8; 32]);

        let mut sender_account = AccountState::new(sender_keypair.public_key());
        sender_account.balance = 150;
        let mut accounts = std::collections::HashMap::new();
        accounts.insert(sender_keypair.public_key(), sender_account);
        let lookup = FixedAccounts(accounts);

        let make_transfer = |amount: u128, nonce: u64| {
            let mut tx = shared_types::Transaction {
                sender: sender_keypair.public_key(),
                receiver,
                amount,
                fee: 0,
                nonce,
                timestamp: 0,
                tx_type: TransactionType::Transfer,
                signature: [0u8; 64],
                hash: [0u8; 32],
            };
            tx.signature = sender_keypair.sign(&tx.signing_bytes());
            tx.hash = tx.compute_hash();
            tx
        };

        // Neither transaction alone exceeds the balance, but together they
        // would overdraw it if checked against the same static snapshot.
        let block = shared_types::Block {
            transactions: vec![make_transfer(100, 1), make_transfer(40, 2)],
            ..genesis()
        };

        assert!(check_transactions(&block, &lookup, 0).is_ok());
    }
}
