//! # State Transition Engine
//!
//! The single place balances, nonces, stake, and the chain head advance.
//! Everything here assumes the block was already accepted by
//! `veyra-block-validator` — this crate applies effects, it doesn't decide
//! admissibility.

pub mod domain;
pub mod errors;
pub mod reward;

pub use domain::WorldState;
pub use errors::StateError;
pub use reward::RewardSchedule;
