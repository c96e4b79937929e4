//! IDLE -> COLLECTING -> DECIDED -> (PROPOSING -> BROADCAST -> WAIT_CONFIRM
//! | WAIT_BLOCK) -> APPLY round driver.
//!
//! One `run_round` call executes exactly one height's worth of phases.
//! Round failures (quorum miss, mining timeout, block-arrival timeout)
//! are recovered locally: they advance the round counter and return
//! `RoundOutcome::RoundFailed` rather than propagating an error, matching
//! how quorum/timeout outcomes are meant to be consumed by the caller's
//! loop. BROADCAST and WAIT_CONFIRM are not distinct async phases here:
//! the caller receives the freshly mined block from `RoundOutcome::
//! HeightAdvanced` and is responsible for broadcasting it; this driver
//! treats local application as sufficient confirmation of its own block.
//! That collapsing of BROADCAST/WAIT_CONFIRM into a single return is a
//! deliberate simplification, since no external confirmation contract is
//! available to the core to begin with.
//!
//! Every block this driver applies, whichever phase produced it, is folded
//! into a `ChainStore` so `WAIT_BLOCK` can weigh competing same-height
//! candidates by cumulative work instead of committing to the first one
//! that validates.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use shared_crypto::Ed25519KeyPair;
use shared_types::{Block, PublicKey, VRFAnnouncement};
use tokio::sync::mpsc;
use veyra_block_proposer::{propose_block, ProposerConfig};
use veyra_block_validator::validate_block;
use veyra_difficulty::{intervals_from_timestamps, DifficultyAdjuster};
use veyra_state::WorldState;
use veyra_tx_validator::TransactionPool;
use veyra_vrf_collector::{collect, CommitteeInfoProvider};

use crate::errors::ConsensusError;
use crate::fork_choice::ChainStore;
use crate::state::ConsensusState;

/// Tuning read from `chain.*`/`consensus.*` configuration.
#[derive(Clone, Debug)]
pub struct DriverConfig {
    pub vrf_timeout_ms: u64,
    pub block_production_timeout_ms: u64,
    pub block_arrival_timeout_ms: u64,
    pub epoch_length: u64,
    pub max_tx_per_block: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            vrf_timeout_ms: 3_000,
            block_production_timeout_ms: 5_000,
            block_arrival_timeout_ms: 8_000,
            epoch_length: 10_000,
            max_tx_per_block: 5_400,
        }
    }
}

/// What a completed round did to `(currentHeight, currentRound)`.
#[derive(Debug)]
pub enum RoundOutcome {
    HeightAdvanced { block: Block },
    RoundFailed { round: u64 },
}

/// Long-lived per-node collaborators. Constructed once by the node
/// supervisor; round-local data (parent block, world state, mempool,
/// gossip channels) is threaded through `run_round` instead of being
/// owned here.
pub struct ConsensusDriver {
    keypair: Ed25519KeyPair,
    committee: Vec<PublicKey>,
    rewarded_top_x: usize,
    config: DriverConfig,
    state: ConsensusState,
    difficulty: DifficultyAdjuster,
    chain_store: RwLock<ChainStore>,
}

impl ConsensusDriver {
    /// `genesis` seeds the fork-choice tree; every block this driver later
    /// applies (its own or a peer's) is folded into the same store so
    /// `canonical_tip()` always reflects every block this node has seen.
    #[must_use]
    pub fn new(
        keypair: Ed25519KeyPair,
        committee: Vec<PublicKey>,
        rewarded_top_x: usize,
        config: DriverConfig,
        difficulty: DifficultyAdjuster,
        genesis: &Block,
    ) -> Self {
        let epoch_length = config.epoch_length;
        let mut chain_store = ChainStore::new();
        chain_store.insert_genesis(genesis.clone());
        Self {
            keypair,
            committee,
            rewarded_top_x,
            config,
            state: ConsensusState::new(genesis.height, genesis.round, epoch_length),
            difficulty,
            chain_store: RwLock::new(chain_store),
        }
    }

    #[must_use]
    pub fn current_height(&self) -> u64 {
        self.state.current_height()
    }

    #[must_use]
    pub fn current_round(&self) -> u64 {
        self.state.current_round()
    }

    #[must_use]
    pub fn current_epoch(&self) -> u64 {
        self.state.current_epoch()
    }

    /// Run exactly one round for the current `(height, round)`.
    ///
    /// `recent_timestamps` is the trailing window of applied-block
    /// timestamps (oldest first), used to compute `expectedDifficulty`;
    /// the caller pushes the new block's timestamp onto it after a
    /// successful round.
    #[allow(clippy::too_many_arguments)]
    pub async fn run_round(
        &self,
        parent: &Block,
        committee_info: &dyn CommitteeInfoProvider,
        world_state: &mut veyra_state::WorldState,
        mempool: &TransactionPool,
        recent_timestamps: &[u64],
        timestamp: u64,
        vrf_inbound: mpsc::Receiver<VRFAnnouncement>,
        vrf_loopback: mpsc::Sender<VRFAnnouncement>,
        block_inbound: &mut mpsc::Receiver<Block>,
    ) -> Result<RoundOutcome, ConsensusError> {
        let round = self.state.current_round();

        // IDLE -> COLLECTING: announce own VRF, then invoke the collector.
        let round_input = veyra_vrf::round_input(&parent.block_hash, round);
        let (vrf_output, vrf_proof) = veyra_vrf::evaluate(&self.keypair, &round_input);
        let own_announcement = VRFAnnouncement {
            round,
            public_key: self.keypair.public_key(),
            vrf_output,
            vrf_proof,
            score: 0.0,
            timestamp,
        };
        let _ = vrf_loopback.send(own_announcement).await;
        drop(vrf_loopback);

        let collected = collect(
            round,
            self.committee.clone(),
            parent.block_hash,
            Duration::from_millis(self.config.vrf_timeout_ms),
            self.rewarded_top_x,
            committee_info,
            vrf_inbound,
        )
        .await;

        let round_result = match collected {
            Ok(result) => result,
            Err(_) => {
                self.state.fail_round();
                return Ok(RoundOutcome::RoundFailed { round });
            }
        };

        let expected_difficulty = self.difficulty.next_difficulty(
            world_state.chain().current_difficulty,
            &intervals_from_timestamps(recent_timestamps),
        );
        let expected_reward = world_state.reward_at(parent.height + 1);

        if round_result.winner == self.keypair.public_key() {
            // DECIDED (winner) -> PROPOSING
            let snapshot = mempool.snapshot();
            let cancelled = Arc::new(AtomicBool::new(false));
            let mut chain_with_target = world_state.chain().clone();
            chain_with_target.current_difficulty = expected_difficulty;

            let proposed = propose_block(
                &self.keypair,
                &round_result,
                &chain_with_target,
                parent.block_hash,
                snapshot,
                world_state,
                expected_reward,
                timestamp,
                &ProposerConfig {
                    block_production_timeout: Duration::from_millis(
                        self.config.block_production_timeout_ms,
                    ),
                },
                cancelled,
            )
            .await;

            match proposed {
                Ok(block) => {
                    // BROADCAST / WAIT_CONFIRM collapse: apply locally now,
                    // caller broadcasts the returned block. Fold it into the
                    // fork-choice tree too, so a later round's `add_block`
                    // against this height still resolves its parent.
                    world_state.apply_block(&block)?;
                    self.chain_store.write().add_block(block.clone());
                    self.state.succeed_round(block.height, self.config.epoch_length);
                    Ok(RoundOutcome::HeightAdvanced { block })
                }
                Err(_) => {
                    self.state.fail_round();
                    Ok(RoundOutcome::RoundFailed { round })
                }
            }
        } else {
            // DECIDED (not winner) -> WAIT_BLOCK: every validated candidate
            // is folded into the fork-choice tree as it arrives rather than
            // committing to the first one seen. Whichever candidate holds
            // `canonical_tip()` gets applied to `world_state`; if a heavier
            // candidate for the same height arrives before the timeout
            // elapses, the first one's effect is reverted (from a pre-apply
            // snapshot) and the heavier one is applied in its place.
            let sleep = tokio::time::sleep(Duration::from_millis(self.config.block_arrival_timeout_ms));
            tokio::pin!(sleep);

            let mut applied: Option<(Block, WorldState)> = None;

            loop {
                tokio::select! {
                    _ = &mut sleep => break,
                    received = block_inbound.recv() => {
                        let Some(candidate) = received else { break };
                        let accepted = validate_block(
                            &candidate,
                            parent,
                            &self.committee,
                            &round_input,
                            committee_info,
                            expected_difficulty,
                            self.config.max_tx_per_block,
                            world_state,
                            expected_reward,
                        );
                        if accepted.is_err() {
                            tracing::warn!(round, "rejected a candidate block while waiting, continuing to wait");
                            continue;
                        }

                        let mut chain_store = self.chain_store.write();
                        if !chain_store.add_block(candidate.clone()) {
                            continue;
                        }
                        let tip = chain_store.canonical_tip();
                        drop(chain_store);

                        let already_applied = applied.as_ref().is_some_and(|(block, _)| {
                            Some(block.block_hash) == tip
                        });
                        if tip == Some(candidate.block_hash) && !already_applied {
                            let pre_apply_snapshot = match applied.take() {
                                Some((_, snapshot)) => snapshot,
                                None => world_state.clone(),
                            };
                            let mut next_state = pre_apply_snapshot.clone();
                            next_state.apply_block(&candidate)?;
                            *world_state = next_state;
                            applied = Some((candidate, pre_apply_snapshot));
                        }
                    }
                }
            }

            match applied {
                Some((block, _)) => {
                    self.state.succeed_round(block.height, self.config.epoch_length);
                    Ok(RoundOutcome::HeightAdvanced { block })
                }
                None => {
                    self.state.fail_round();
                    Ok(RoundOutcome::RoundFailed { round })
                }
            }
        }
    }
}
