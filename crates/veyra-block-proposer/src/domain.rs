//! Block assembly orchestration: mempool snapshot, validation, ordering, mining, signing.

use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use primitive_types::U256;
use shared_crypto::Ed25519KeyPair;
use shared_types::{Block, ChainState, Transaction};
use tokio::time::Instant;
use veyra_tx_validator::{validate_transaction, AccountLookup, RollingAccounts};
use veyra_vrf_collector::RoundResult;

use crate::errors::ProposeError;
use crate::mining::{mine, MiningOutcome};

/// Tuning for one proposal attempt.
#[derive(Clone, Copy, Debug)]
pub struct ProposerConfig {
    /// `blockProductionTimeout`, default 5,000 ms.
    pub block_production_timeout: Duration,
}

impl Default for ProposerConfig {
    fn default() -> Self {
        Self {
            block_production_timeout: Duration::from_millis(5_000),
        }
    }
}

/// Assemble and mine a block for a round this node won.
///
/// Validates the mempool snapshot against pre-state and drops invalid
/// transactions, orders canonically and computes the Merkle root, assembles
/// the header, mines LPoW under `block_production_timeout`, then signs.
/// `cancelled` lets the caller abort mining early (e.g. a higher block
/// arrived over gossip).
#[allow(clippy::too_many_arguments)]
pub async fn propose_block(
    keypair: &Ed25519KeyPair,
    round_result: &RoundResult,
    chain: &ChainState,
    parent_block_hash: [u8; 32],
    mempool_snapshot: Vec<Transaction>,
    accounts: &dyn AccountLookup,
    expected_reward: u128,
    timestamp: u64,
    config: &ProposerConfig,
    cancelled: Arc<AtomicBool>,
) -> Result<Block, ProposeError> {
    if round_result.winner != keypair.public_key() {
        return Err(ProposeError::NotWinner);
    }

    let winner_announcement = round_result
        .all_valid
        .iter()
        .find(|announcement| announcement.public_key == round_result.winner)
        .ok_or(ProposeError::MissingWinnerAnnouncement)?;

    let mut rolling = RollingAccounts::new(accounts);
    let mut valid_transactions = Vec::with_capacity(mempool_snapshot.len());
    for tx in mempool_snapshot {
        if validate_transaction(&tx, &rolling, expected_reward).is_ok() {
            rolling.apply(&tx);
            valid_transactions.push(tx);
        }
    }
    let (ordered_transactions, merkle_root) =
        veyra_merkle::order_and_root(valid_transactions);

    let template = Block {
        height: chain.current_height + 1,
        previous_hash: parent_block_hash,
        timestamp,
        round: winner_announcement.round,
        proposer_pk: round_result.winner,
        vrf_output: winner_announcement.vrf_output,
        vrf_proof: winner_announcement.vrf_proof,
        all_vrf_announcements: round_result.all_valid.clone(),
        rewarded_top_x: round_result.top_x.clone(),
        transactions: ordered_transactions,
        merkle_root,
        nonce: 0,
        difficulty_target: chain.current_difficulty,
        block_hash: [0u8; 32],
        signatures: BTreeMap::new(),
    };

    let deadline = Instant::now() + config.block_production_timeout;
    match mine(template, deadline, cancelled).await {
        MiningOutcome::Found(mut block) => {
            let signature = keypair.sign(&block.block_hash);
            block.signatures.insert(keypair.public_key(), signature);
            Ok(block)
        }
        MiningOutcome::Cancelled => Err(ProposeError::MiningCancelled),
        MiningOutcome::TimedOut => Err(ProposeError::MiningTimedOut),
    }
}

/// `SHA256(header) <= difficultyTarget` as an explicit predicate, shared by
/// the miner and anything that wants to sanity-check a block outside the
/// mining loop.
#[must_use]
pub fn satisfies_difficulty(block: &Block) -> bool {
    U256::from_big_endian(&block.compute_hash()) <= block.difficulty_target
}
