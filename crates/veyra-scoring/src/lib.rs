//! # Score Calculator
//!
//! Converts a committee's raw VRF announcements into a deterministic
//! ranking. Every node that sees the same announcements and the same
//! chain-derived inputs (stake, tenure, uptime) computes the same ranking,
//! which is what makes proposer selection agreement possible without a
//! separate voting round.

pub mod domain;

pub use domain::{
    average_stake, final_score, rank, select_proposer, select_top_x, ScoredMember, ScoringInput,
};
