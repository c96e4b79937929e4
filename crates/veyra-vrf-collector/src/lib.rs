//! # VRF Collector
//!
//! Owns a single round's lifecycle: accept gossiped announcements, re-verify
//! every one against the round's canonical input regardless of what the
//! gossip layer already checked, enforce first-seen-wins on duplicates, and
//! decide the round once quorum is reached or the deadline passes.

pub mod domain;
pub mod errors;

pub use domain::{collect, quorum_threshold, CommitteeInfoProvider, RoundCollector, RoundResult};
pub use errors::VrfCollectorError;
