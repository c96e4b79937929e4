//! Score calculation and committee ranking.
//!
//! Pure algorithm, no I/O: the caller (the VRF collector, C5) supplies the
//! per-member inputs already resolved from chain state, and gets back a
//! deterministic ranking every node computes identically.

use shared_types::PublicKey;

/// Per-member inputs to the score formula, already resolved from chain
/// state by the caller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoringInput {
    pub public_key: PublicKey,
    /// `v`: the VRF output projected into `[0, 1)`.
    pub raw_vrf_score: f64,
    /// This member's staked amount.
    pub stake: u128,
    /// Days elapsed since this member's election to the committee.
    pub days_since_election: f64,
    /// Observed uptime ratio in `[0, 1]`.
    pub uptime_ratio: f64,
}

/// A member with its final score, ready to rank.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoredMember {
    pub public_key: PublicKey,
    pub score: f64,
}

/// `s = min(stake/avgStake, 1)`.
fn stake_weight(stake: u128, avg_stake: f64) -> f64 {
    if avg_stake <= 0.0 {
        return 0.0;
    }
    (stake as f64 / avg_stake).min(1.0)
}

/// `d = max(0.5, 1 - daysSinceElection/180)`.
fn decay_factor(days_since_election: f64) -> f64 {
    (1.0 - days_since_election / 180.0).max(0.5)
}

/// `p`: a step function of observed uptime.
fn performance_factor(uptime_ratio: f64) -> f64 {
    if uptime_ratio >= 0.99 {
        1.0
    } else if uptime_ratio >= 0.95 {
        0.95
    } else if uptime_ratio >= 0.90 {
        0.85
    } else {
        0.7
    }
}

/// The mean stake across a committee. `0.0` for an empty committee.
#[must_use]
pub fn average_stake(stakes: &[u128]) -> f64 {
    if stakes.is_empty() {
        return 0.0;
    }
    let total: u128 = stakes.iter().sum();
    total as f64 / stakes.len() as f64
}

/// `f = clamp(v * sqrt(s) * d * p, 0, 1)`.
#[must_use]
pub fn final_score(input: &ScoringInput, avg_stake: f64) -> f64 {
    let s = stake_weight(input.stake, avg_stake);
    let d = decay_factor(input.days_since_election);
    let p = performance_factor(input.uptime_ratio);
    (input.raw_vrf_score * s.sqrt() * d * p).clamp(0.0, 1.0)
}

/// Score every input and rank by score descending, ties broken by
/// `publicKey` byte-lex ascending. The ordering is identical on every node
/// given the same inputs.
#[must_use]
pub fn rank(inputs: &[ScoringInput]) -> Vec<ScoredMember> {
    let avg_stake = average_stake(&inputs.iter().map(|i| i.stake).collect::<Vec<_>>());
    let mut ranked: Vec<ScoredMember> = inputs
        .iter()
        .map(|input| ScoredMember {
            public_key: input.public_key,
            score: final_score(input, avg_stake),
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.public_key.cmp(&b.public_key))
    });
    ranked
}

/// `selectProposer = rank[0]`.
#[must_use]
pub fn select_proposer(ranked: &[ScoredMember]) -> Option<&ScoredMember> {
    ranked.first()
}

/// `selectTopX(K) = rank[0..min(K, len)]`.
#[must_use]
pub fn select_top_x(ranked: &[ScoredMember], k: usize) -> &[ScoredMember] {
    &ranked[..k.min(ranked.len())]
}
