//! # Transaction Validator and Mempool
//!
//! Per-transaction validation is pure: it reads one account's pre-state and
//! returns a verdict, never mutating anything. The mempool wraps a
//! concurrency-safe holding pool the proposer snapshots from and the gossip
//! layer writes into.

pub mod domain;
pub mod errors;
pub mod mempool;

pub use domain::{validate_transaction, AccountLookup, RollingAccounts};
pub use errors::{MempoolError, TxValidationError};
pub use mempool::TransactionPool;
