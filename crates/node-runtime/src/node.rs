//! Wires the consensus core's collaborators together and drives the
//! round loop. Peer transport (the gossip contract's actual wire layer)
//! is an external collaborator this runtime does not implement; the
//! channels below are where a P2P layer would forward inbound
//! `VRF_ANNOUNCE`/`BLOCK` messages.

use std::collections::{HashMap, VecDeque};
use std::time::{SystemTime, UNIX_EPOCH};

use shared_crypto::Ed25519KeyPair;
use shared_types::{Block, ChainState, PublicKey};
use tokio::sync::mpsc;
use veyra_consensus::{ConsensusDriver, DriverConfig, RoundOutcome};
use veyra_difficulty::{DifficultyAdjuster, DifficultyConfig};
use veyra_state::WorldState;
use veyra_storage::{BlockStore, InMemoryStorage, StateStore, TransactionStore};
use veyra_tx_validator::TransactionPool;
use veyra_vrf_collector::CommitteeInfoProvider;

use crate::config::NodeConfig;

/// A per-round, frozen view of each committee member's score inputs.
/// Captured once from `WorldState` before `run_round` starts so the
/// driver never needs a live `&WorldState` borrow alongside its
/// `&mut WorldState`.
struct CommitteeSnapshot {
    stakes: HashMap<PublicKey, u128>,
}

impl CommitteeSnapshot {
    fn capture(world_state: &WorldState, committee: &[PublicKey]) -> Self {
        let stakes = committee
            .iter()
            .map(|pk| (*pk, world_state.account(pk).stake_amount))
            .collect();
        Self { stakes }
    }
}

impl CommitteeInfoProvider for CommitteeSnapshot {
    fn stake(&self, public_key: &PublicKey) -> u128 {
        *self.stakes.get(public_key).unwrap_or(&0)
    }

    // Election-age and uptime tracking is off-chain monitoring
    // infrastructure this spec doesn't define; neutral defaults keep the
    // score formula's other two terms load-bearing.
    fn days_since_election(&self, _public_key: &PublicKey) -> f64 {
        0.0
    }

    fn uptime_ratio(&self, _public_key: &PublicKey) -> f64 {
        1.0
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// The running node: consensus driver plus the storage and mempool it
/// reads and writes through every round.
pub struct Node {
    keypair: Ed25519KeyPair,
    committee: Vec<PublicKey>,
    driver: ConsensusDriver,
    storage: InMemoryStorage,
    mempool: TransactionPool,
    world_state: WorldState,
    parent: Block,
    recent_timestamps: VecDeque<u64>,
    difficulty_window: usize,
}

impl Node {
    pub fn new(
        keypair: Ed25519KeyPair,
        committee: Vec<PublicKey>,
        genesis: Block,
        world_state: WorldState,
        config: &NodeConfig,
    ) -> anyhow::Result<Self> {
        let driver_config = DriverConfig {
            vrf_timeout_ms: config.consensus.vrf_timeout_ms,
            block_production_timeout_ms: config.consensus.block_timeout_ms,
            block_arrival_timeout_ms: config.consensus.block_timeout_ms * 2,
            epoch_length: config.consensus.epoch_length,
            ..DriverConfig::default()
        };
        let difficulty = DifficultyAdjuster::new(DifficultyConfig {
            window: config.consensus.difficulty_window,
            target_interval_ms: config.chain.block_time_ms,
            base_difficulty: config.consensus.base_difficulty,
        });
        let driver = ConsensusDriver::new(
            keypair_handle(&keypair),
            committee.clone(),
            config.chain.rewarded_top_x,
            driver_config,
            difficulty,
            &genesis,
        );

        let storage = InMemoryStorage::new();
        BlockStore::put(&storage, genesis.clone())
            .map_err(|err| anyhow::anyhow!("writing genesis block to storage: {err}"))?;
        storage.put_chain(world_state.chain().clone());

        Ok(Self {
            keypair,
            committee,
            driver,
            storage,
            mempool: TransactionPool::new(50_000),
            world_state,
            recent_timestamps: VecDeque::new(),
            difficulty_window: config.consensus.difficulty_window,
            parent: genesis,
        })
    }

    pub fn mempool(&self) -> &TransactionPool {
        &self.mempool
    }

    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    pub fn current_height(&self) -> u64 {
        self.driver.current_height()
    }

    /// Runs one round to completion: VRF collection, then either
    /// proposing or waiting for a block, then applying the result.
    pub async fn run_round(&mut self) -> anyhow::Result<RoundOutcome> {
        let committee_info = CommitteeSnapshot::capture(&self.world_state, &self.committee);
        let (vrf_tx, vrf_rx) = mpsc::channel(self.committee.len().max(1) + 1);
        let (_block_tx, mut block_rx) = mpsc::channel::<Block>(4);

        let keep = (self.difficulty_window + 1).min(self.recent_timestamps.len());
        let trailing: Vec<u64> = self
            .recent_timestamps
            .iter()
            .copied()
            .skip(self.recent_timestamps.len() - keep)
            .collect();

        let outcome = self
            .driver
            .run_round(
                &self.parent,
                &committee_info,
                &mut self.world_state,
                &self.mempool,
                &trailing,
                now_ms(),
                vrf_rx,
                vrf_tx,
                &mut block_rx,
            )
            .await?;

        if let RoundOutcome::HeightAdvanced { block } = &outcome {
            BlockStore::put(&self.storage, block.clone())?;
            for tx in &block.transactions {
                TransactionStore::put(&self.storage, tx.clone());
            }
            self.storage.put_chain(self.world_state.chain().clone());
            self.recent_timestamps.push_back(block.timestamp);
            while self.recent_timestamps.len() > self.difficulty_window + 1 {
                self.recent_timestamps.pop_front();
            }
            self.parent = block.clone();
        }

        Ok(outcome)
    }

    pub fn storage(&self) -> &InMemoryStorage {
        &self.storage
    }

    pub fn chain_state(&self) -> ChainState {
        self.world_state.chain().clone()
    }
}

/// `ConsensusDriver` owns its keypair; the node also needs one to label
/// log lines and (eventually) authenticate RPC writes, so it keeps its
/// own handle built from the same seed rather than borrowing the
/// driver's private copy.
fn keypair_handle(keypair: &Ed25519KeyPair) -> Ed25519KeyPair {
    Ed25519KeyPair::from_seed(keypair.to_seed())
}
