//! # Storage Contract
//!
//! The key-value persistence boundary the consensus driver, mempool, and
//! RPC layer read and write through: blocks by height/hash, transactions
//! by hash, and account/chain state. This crate defines the contract as
//! traits and ships one in-memory adapter; a disk-backed adapter for
//! production deployment implements the same traits and is wired in by
//! `node-runtime`.

pub mod domain;
pub mod errors;
pub mod memory;

pub use domain::{BlockStore, StateStore, TransactionStore};
pub use errors::StorageError;
pub use memory::InMemoryStorage;
