//! Per-round VRF announcement collection.
//!
//! Zero-trust posture: every announcement is re-verified against the
//! round's canonical input regardless of any upstream gossip-layer
//! pre-validation. The collector never assumes a peer told the truth.

use std::collections::HashMap;
use std::time::Duration;

use shared_types::{PublicKey, VRFAnnouncement};
use tokio::sync::mpsc;
use veyra_scoring::{rank, select_proposer, select_top_x, ScoringInput};

use crate::errors::VrfCollectorError;

/// Resolves the chain-state inputs the score formula needs for a
/// committee member, at collection time.
pub trait CommitteeInfoProvider: Send + Sync {
    fn stake(&self, public_key: &PublicKey) -> u128;
    fn days_since_election(&self, public_key: &PublicKey) -> f64;
    fn uptime_ratio(&self, public_key: &PublicKey) -> f64;
}

/// The outcome of a completed round.
#[derive(Debug, Clone)]
pub struct RoundResult {
    pub winner: PublicKey,
    pub top_x: Vec<PublicKey>,
    pub all_valid: Vec<VRFAnnouncement>,
}

/// `⌈2/3 * committeeSize⌉`.
#[must_use]
pub fn quorum_threshold(committee_size: usize) -> usize {
    (2 * committee_size + 2) / 3
}

/// Accumulates and validates announcements for a single round.
pub struct RoundCollector {
    round: u64,
    committee: Vec<PublicKey>,
    round_input: [u8; 32],
    accepted: HashMap<PublicKey, VRFAnnouncement>,
}

impl RoundCollector {
    #[must_use]
    pub fn new(round: u64, committee: Vec<PublicKey>, prev_block_hash: [u8; 32]) -> Self {
        let round_input = veyra_vrf::round_input(&prev_block_hash, round);
        Self {
            round,
            committee,
            round_input,
            accepted: HashMap::new(),
        }
    }

    /// Validate and, if new, record an announcement. Returns `Ok(true)` if
    /// this was the first accepted announcement for its public key,
    /// `Ok(false)` if a later duplicate was discarded per first-seen-wins.
    pub fn try_accept(
        &mut self,
        announcement: VRFAnnouncement,
    ) -> Result<bool, VrfCollectorError> {
        if announcement.round != self.round {
            return Err(VrfCollectorError::WrongRound {
                expected: self.round,
                actual: announcement.round,
            });
        }
        if !self.committee.contains(&announcement.public_key) {
            return Err(VrfCollectorError::UnknownCommitteeMember(
                announcement.public_key,
            ));
        }
        if self.accepted.contains_key(&announcement.public_key) {
            return Ok(false);
        }

        let valid = veyra_vrf::verify(
            &announcement.public_key,
            &self.round_input,
            &announcement.vrf_output,
            &announcement.vrf_proof,
        );
        if !valid {
            return Err(VrfCollectorError::InvalidAnnouncement(
                announcement.public_key,
            ));
        }

        self.accepted.insert(announcement.public_key, announcement);
        Ok(true)
    }

    #[must_use]
    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }

    #[must_use]
    pub fn quorum_met(&self) -> bool {
        self.accepted.len() >= quorum_threshold(self.committee.len())
    }

    #[must_use]
    pub fn all_collected(&self) -> bool {
        self.accepted.len() >= self.committee.len()
    }

    /// Score the accepted announcements and produce the round result.
    /// Fails if quorum was never reached.
    pub fn finish(
        self,
        committee_info: &dyn CommitteeInfoProvider,
        rewarded_top_x: usize,
    ) -> Result<RoundResult, VrfCollectorError> {
        let required = quorum_threshold(self.committee.len());
        if self.accepted.len() < required {
            return Err(VrfCollectorError::QuorumNotMet {
                required,
                actual: self.accepted.len(),
            });
        }

        let all_valid: Vec<VRFAnnouncement> = self.accepted.values().cloned().collect();
        let inputs: Vec<ScoringInput> = all_valid
            .iter()
            .map(|a| ScoringInput {
                public_key: a.public_key,
                raw_vrf_score: a.score,
                stake: committee_info.stake(&a.public_key),
                days_since_election: committee_info.days_since_election(&a.public_key),
                uptime_ratio: committee_info.uptime_ratio(&a.public_key),
            })
            .collect();

        let ranked = rank(&inputs);
        let winner = select_proposer(&ranked)
            .expect("non-empty ranked list: quorum already checked above")
            .public_key;
        let top_x = select_top_x(&ranked, rewarded_top_x)
            .iter()
            .map(|member| member.public_key)
            .collect();

        Ok(RoundResult {
            winner,
            top_x,
            all_valid,
        })
    }
}

/// Run collection for one round to completion: accept announcements from
/// `inbound` until either every committee member has announced or
/// `deadline` elapses, then score and return the result.
pub async fn collect(
    round: u64,
    committee: Vec<PublicKey>,
    prev_block_hash: [u8; 32],
    deadline: Duration,
    rewarded_top_x: usize,
    committee_info: &dyn CommitteeInfoProvider,
    mut inbound: mpsc::Receiver<VRFAnnouncement>,
) -> Result<RoundResult, VrfCollectorError> {
    let mut collector = RoundCollector::new(round, committee, prev_block_hash);
    let sleep = tokio::time::sleep(deadline);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            _ = &mut sleep => break,
            received = inbound.recv() => {
                match received {
                    Some(announcement) => {
                        if let Err(err) = collector.try_accept(announcement) {
                            tracing::warn!(%err, "rejected VRF announcement");
                        }
                        if collector.all_collected() {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }

    collector.finish(committee_info, rewarded_top_x)
}
