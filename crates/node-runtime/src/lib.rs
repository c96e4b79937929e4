//! # Node Runtime
//!
//! Wires the consensus core's collaborators (storage, mempool, driver)
//! together into a running process. The binary entry point is
//! `main.rs`; this library exposes the modules it drives so integration
//! tests can construct a `Node` directly.

pub mod config;
pub mod genesis;
pub mod keys;
pub mod node;
