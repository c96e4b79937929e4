//! Storage contract traits. Block/transaction/state stores are three
//! independent collaborators rather than one God-trait, matching how the
//! consensus driver and RPC layer each only ever need one facet of
//! persistence at a time.

use shared_types::{AccountState, Block, ChainState, Hash, PublicKey, Transaction};

use crate::errors::StorageError;

/// `block.get(height)`, `block.get(hash)`, `block.put(Block)`,
/// `block.currentHeight()`.
pub trait BlockStore: Send + Sync {
    fn get_by_height(&self, height: u64) -> Option<Block>;
    fn get_by_hash(&self, hash: &Hash) -> Option<Block>;

    /// Rejects a second write at an already-occupied height or hash; the
    /// caller (`veyra-consensus`) only ever calls this once per accepted
    /// block, so a collision means something upstream re-applied one.
    fn put(&self, block: Block) -> Result<(), StorageError>;

    fn current_height(&self) -> u64;
}

/// `tx.get(hash)`, `tx.put(Transaction)`.
pub trait TransactionStore: Send + Sync {
    fn get(&self, hash: &Hash) -> Option<Transaction>;
    fn put(&self, transaction: Transaction);
}

/// `state.account(pk)`, `state.put(AccountState)`, `state.chain()`,
/// `state.putChain(ChainState)`.
pub trait StateStore: Send + Sync {
    fn account(&self, public_key: &PublicKey) -> Option<AccountState>;
    fn put_account(&self, account: AccountState);
    fn chain(&self) -> Result<ChainState, StorageError>;
    fn put_chain(&self, chain: ChainState);
}
