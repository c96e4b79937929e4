//! # Merkle Builder
//!
//! Fixes the transaction order and builds the root nodes bind to. Level
//! construction runs over `rayon` since each pair hash is independent of
//! its siblings.

pub mod domain;

pub use domain::{build_root, canonical_order, merkle_root_for_transactions, order_and_root};
