//! Genesis bootstrap: construct height-0's `Block` and the `WorldState` it
//! seeds, from a committee allocation list read off disk. `chain.genesis_hash`
//! is the caller's expected `Block::compute_hash()` of the result, checked
//! against what this builder actually produces; a mismatch is a fatal
//! bootstrap error (corrupt or mismatched genesis file), never silently
//! patched over.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use shared_types::{AccountState, Block, ChainState, PublicKey, VRFOutput, VRFProof};
use veyra_state::{RewardSchedule, WorldState};

/// One committee member's genesis allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisAllocation {
    pub public_key_hex: String,
    pub balance: u128,
    pub stake: u128,
}

/// The on-disk genesis description: every committee member's starting
/// balance and stake, plus the chain's genesis timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisSpec {
    pub committee: Vec<GenesisAllocation>,
    pub timestamp: u64,
}

impl GenesisSpec {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading genesis spec from {}", path.display()))?;
        serde_json::from_str(&contents).with_context(|| "parsing genesis spec as JSON")
    }

    fn committee_keys(&self) -> anyhow::Result<Vec<PublicKey>> {
        self.committee
            .iter()
            .map(|alloc| {
                let bytes = hex::decode(&alloc.public_key_hex)
                    .with_context(|| format!("decoding public key {}", alloc.public_key_hex))?;
                let array: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| anyhow::anyhow!("public key is not 32 bytes"))?;
                Ok(PublicKey::from_bytes(array))
            })
            .collect()
    }
}

/// Builds the genesis block and the `WorldState` it seeds.
pub fn bootstrap(spec: &GenesisSpec, base_difficulty: U256) -> anyhow::Result<(Block, WorldState)> {
    let committee = spec.committee_keys()?;
    if committee.is_empty() {
        bail!("genesis spec names no committee members");
    }

    let total_supply: u128 = spec
        .committee
        .iter()
        .map(|alloc| alloc.balance + alloc.stake)
        .sum();

    let block = Block {
        height: 0,
        previous_hash: [0u8; 32],
        timestamp: spec.timestamp,
        round: 0,
        proposer_pk: PublicKey::ZERO,
        vrf_output: VRFOutput([0u8; 32]),
        vrf_proof: VRFProof([0u8; 64]),
        all_vrf_announcements: vec![],
        rewarded_top_x: vec![],
        transactions: vec![],
        merkle_root: [0u8; 32],
        nonce: 0,
        difficulty_target: base_difficulty,
        block_hash: [0u8; 32],
        signatures: BTreeMap::new(),
    };
    let block_hash = block.compute_hash();
    let block = Block { block_hash, ..block };

    let chain = ChainState {
        current_height: 0,
        current_round: 0,
        total_supply,
        active_super_nodes: committee.clone(),
        current_difficulty: base_difficulty,
        last_update_timestamp: spec.timestamp,
    };

    let mut world_state = WorldState::new(chain, RewardSchedule::default());
    for (public_key, alloc) in committee.into_iter().zip(&spec.committee) {
        world_state.set_account(AccountState {
            public_key,
            balance: alloc.balance,
            nonce: 0,
            stake_amount: alloc.stake,
            last_update_timestamp: spec.timestamp,
        });
    }

    Ok((block, world_state))
}

/// Verifies a loaded genesis block's hash against the configured
/// `chain.genesis_hash`, when one was provided.
pub fn verify_genesis_hash(block: &Block, expected: Option<[u8; 32]>) -> anyhow::Result<()> {
    if let Some(expected) = expected {
        if block.block_hash != expected {
            bail!(
                "genesis hash mismatch: built {:02x?}, expected {:02x?}",
                block.block_hash,
                expected
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> GenesisSpec {
        GenesisSpec {
            committee: vec![
                GenesisAllocation {
                    public_key_hex: "01".repeat(32),
                    balance: 1_000,
                    stake: 5_000,
                },
                GenesisAllocation {
                    public_key_hex: "02".repeat(32),
                    balance: 2_000,
                    stake: 5_000,
                },
            ],
            timestamp: 1_700_000_000,
        }
    }

    #[test]
    fn bootstrap_seeds_every_committee_account() {
        let (block, world_state) = bootstrap(&spec(), U256::from(2_500_000u64)).unwrap();
        assert_eq!(block.height, 0);
        assert_eq!(world_state.chain().total_supply, 13_000);

        let pk = PublicKey::from_bytes([1u8; 32]);
        assert_eq!(world_state.account(&pk).stake_amount, 5_000);
    }

    #[test]
    fn empty_committee_is_rejected() {
        let mut spec = spec();
        spec.committee.clear();
        assert!(bootstrap(&spec, U256::from(1u64)).is_err());
    }

    #[test]
    fn hash_mismatch_is_reported() {
        let (block, _) = bootstrap(&spec(), U256::from(2_500_000u64)).unwrap();
        assert!(verify_genesis_hash(&block, Some([0xffu8; 32])).is_err());
        assert!(verify_genesis_hash(&block, Some(block.block_hash)).is_ok());
    }
}
