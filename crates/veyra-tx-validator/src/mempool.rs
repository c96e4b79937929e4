//! The node's transaction pool: a concurrent holding area between gossip
//! ingestion and block proposal.
//!
//! Indexed by hash for O(1)
//! lookup, per-sender nonce ordering) with the gas-price priority queue and
//! two-phase commit machinery dropped — this chain has no gas market and
//! proposal re-validates against pre-state anyway,
//! so the pool only needs to hold candidates and hand out snapshots.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;
use shared_types::{Hash, PublicKey, Transaction};

use crate::errors::MempoolError;

/// Default maximum number of transactions the pool retains.
pub const DEFAULT_CAPACITY: usize = 50_000;

struct Inner {
    by_hash: HashMap<Hash, Transaction>,
    by_sender: HashMap<PublicKey, BTreeMap<u64, Hash>>,
}

/// A concurrent, capacity-bounded transaction pool. Reads (snapshots) never
/// block other reads; writes are serialized, matching the node's
/// producer-many/consumer-one access pattern.
pub struct TransactionPool {
    capacity: usize,
    inner: RwLock<Inner>,
}

impl TransactionPool {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: RwLock::new(Inner {
                by_hash: HashMap::new(),
                by_sender: HashMap::new(),
            }),
        }
    }

    /// Insert a transaction that has already passed `validate_transaction`.
    pub fn insert(&self, tx: Transaction) -> Result<(), MempoolError> {
        let mut inner = self.inner.write();
        if inner.by_hash.contains_key(&tx.hash) {
            return Err(MempoolError::DuplicateTransaction(tx.hash));
        }
        if inner.by_hash.len() >= self.capacity {
            return Err(MempoolError::PoolFull {
                capacity: self.capacity,
            });
        }
        inner
            .by_sender
            .entry(tx.sender)
            .or_default()
            .insert(tx.nonce, tx.hash);
        inner.by_hash.insert(tx.hash, tx);
        Ok(())
    }

    /// Remove a transaction, typically after it lands in an accepted
    /// block.
    pub fn remove(&self, hash: &Hash) -> Result<Transaction, MempoolError> {
        let mut inner = self.inner.write();
        let tx = inner
            .by_hash
            .remove(hash)
            .ok_or(MempoolError::TransactionNotFound(*hash))?;
        if let Some(by_nonce) = inner.by_sender.get_mut(&tx.sender) {
            by_nonce.remove(&tx.nonce);
            if by_nonce.is_empty() {
                inner.by_sender.remove(&tx.sender);
            }
        }
        Ok(tx)
    }

    /// Drop a batch of transactions, used once a block that included them
    /// is accepted.
    pub fn remove_many(&self, hashes: &[Hash]) {
        for hash in hashes {
            let _ = self.remove(hash);
        }
    }

    /// A consistent point-in-time copy for the proposer to validate and
    /// order, isolated from concurrent inserts.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.inner.read().by_hash.values().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().by_hash.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().by_hash.is_empty()
    }
}

impl Default for TransactionPool {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
