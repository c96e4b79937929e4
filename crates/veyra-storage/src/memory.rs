//! In-memory storage adapter: `HashMap`s behind `parking_lot::RwLock`,
//! the same concurrency shape `veyra-tx-validator::TransactionPool` uses.
//! Suitable for tests and single-process development nodes; a
//! production deployment swaps in a disk-backed adapter behind the same
//! traits without touching the driver or RPC layer.

use std::collections::HashMap;

use parking_lot::RwLock;
use shared_types::{AccountState, Block, ChainState, Hash, PublicKey, Transaction};

use crate::domain::{BlockStore, StateStore, TransactionStore};
use crate::errors::StorageError;

#[derive(Default)]
struct BlockIndex {
    by_hash: HashMap<Hash, Block>,
    by_height: HashMap<u64, Hash>,
    current_height: u64,
}

/// Combined in-memory implementation of all three storage traits.
#[derive(Default)]
pub struct InMemoryStorage {
    blocks: RwLock<BlockIndex>,
    transactions: RwLock<HashMap<Hash, Transaction>>,
    accounts: RwLock<HashMap<PublicKey, AccountState>>,
    chain: RwLock<Option<ChainState>>,
}

impl InMemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlockStore for InMemoryStorage {
    fn get_by_height(&self, height: u64) -> Option<Block> {
        let index = self.blocks.read();
        let hash = index.by_height.get(&height)?;
        index.by_hash.get(hash).cloned()
    }

    fn get_by_hash(&self, hash: &Hash) -> Option<Block> {
        self.blocks.read().by_hash.get(hash).cloned()
    }

    fn put(&self, block: Block) -> Result<(), StorageError> {
        let mut index = self.blocks.write();
        if index.by_hash.contains_key(&block.block_hash) {
            return Err(StorageError::HashOccupied(block.block_hash));
        }
        if index.by_height.contains_key(&block.height) {
            return Err(StorageError::HeightOccupied(block.height));
        }
        index.by_height.insert(block.height, block.block_hash);
        if block.height >= index.current_height || index.by_hash.is_empty() {
            index.current_height = block.height;
        }
        index.by_hash.insert(block.block_hash, block);
        Ok(())
    }

    fn current_height(&self) -> u64 {
        self.blocks.read().current_height
    }
}

impl TransactionStore for InMemoryStorage {
    fn get(&self, hash: &Hash) -> Option<Transaction> {
        self.transactions.read().get(hash).cloned()
    }

    fn put(&self, transaction: Transaction) {
        self.transactions.write().insert(transaction.hash, transaction);
    }
}

impl StateStore for InMemoryStorage {
    fn account(&self, public_key: &PublicKey) -> Option<AccountState> {
        self.accounts.read().get(public_key).cloned()
    }

    fn put_account(&self, account: AccountState) {
        self.accounts.write().insert(account.public_key, account);
    }

    fn chain(&self) -> Result<ChainState, StorageError> {
        self.chain.read().clone().ok_or(StorageError::ChainUninitialized)
    }

    fn put_chain(&self, chain: ChainState) {
        *self.chain.write() = Some(chain);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitive_types::U256;
    use shared_types::{VRFOutput, VRFProof};
    use std::collections::BTreeMap;

    fn block(height: u64, hash: Hash) -> Block {
        Block {
            height,
            previous_hash: [0u8; 32],
            timestamp: 1000,
            round: height,
            proposer_pk: PublicKey::from_bytes([1u8; 32]),
            vrf_output: VRFOutput([0u8; 32]),
            vrf_proof: VRFProof([0u8; 64]),
            all_vrf_announcements: vec![],
            rewarded_top_x: vec![],
            transactions: vec![],
            merkle_root: [0u8; 32],
            nonce: 0,
            difficulty_target: U256::MAX,
            block_hash: hash,
            signatures: BTreeMap::new(),
        }
    }

    #[test]
    fn put_then_get_round_trips_by_height_and_hash() {
        let store = InMemoryStorage::new();
        store.put(block(0, [9u8; 32])).unwrap();
        assert_eq!(BlockStore::get_by_height(&store, 0).unwrap().block_hash, [9u8; 32]);
        assert_eq!(BlockStore::get_by_hash(&store, &[9u8; 32]).unwrap().height, 0);
        assert_eq!(store.current_height(), 0);
    }

    #[test]
    fn duplicate_height_is_rejected() {
        let store = InMemoryStorage::new();
        store.put(block(3, [1u8; 32])).unwrap();
        let err = store.put(block(3, [2u8; 32])).unwrap_err();
        assert_eq!(err, StorageError::HeightOccupied(3));
    }

    #[test]
    fn chain_state_reads_fail_until_initialized() {
        let store = InMemoryStorage::new();
        assert_eq!(StateStore::chain(&store).unwrap_err(), StorageError::ChainUninitialized);

        let chain = ChainState {
            current_height: 0,
            current_round: 0,
            total_supply: 0,
            active_super_nodes: vec![],
            current_difficulty: U256::MAX,
            last_update_timestamp: 0,
        };
        store.put_chain(chain.clone());
        assert_eq!(StateStore::chain(&store).unwrap().current_height, chain.current_height);
    }

    #[test]
    fn account_lookup_misses_return_none() {
        let store = InMemoryStorage::new();
        assert!(StateStore::account(&store, &PublicKey::from_bytes([7u8; 32])).is_none());
        store.put_account(AccountState::new(PublicKey::from_bytes([7u8; 32])));
        assert!(StateStore::account(&store, &PublicKey::from_bytes([7u8; 32])).is_some());
    }
}
