//! Cumulative-work fork choice.
//!
//! `difficultyTarget` is a ceiling (larger = easier), so a block's work
//! contribution is `U256::MAX / target`: smaller target, more work. The
//! canonical tip is the block with the greatest accumulated work from
//! genesis; ties break toward the lower block hash.

use std::collections::HashMap;

use primitive_types::U256;
use shared_types::{Block, Hash};

/// Work a single block contributes toward its chain's cumulative total.
#[must_use]
pub fn block_work(difficulty_target: U256) -> U256 {
    if difficulty_target.is_zero() {
        return U256::MAX;
    }
    U256::MAX / difficulty_target
}

/// A block tree keyed by hash, tracking cumulative work per block so the
/// canonical tip can be recomputed after any insert without re-walking the
/// whole chain.
#[derive(Default)]
pub struct ChainStore {
    blocks: HashMap<Hash, Block>,
    children: HashMap<Hash, Vec<Hash>>,
    cumulative_work: HashMap<Hash, U256>,
}

impl ChainStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a genesis block (no parent lookup required).
    pub fn insert_genesis(&mut self, genesis: Block) {
        let hash = genesis.block_hash;
        self.cumulative_work.insert(hash, block_work(genesis.difficulty_target));
        self.blocks.insert(hash, genesis);
    }

    /// Returns `true` if the block's parent is known and it was inserted.
    pub fn add_block(&mut self, block: Block) -> bool {
        let Some(&parent_work) = self.cumulative_work.get(&block.previous_hash) else {
            return false;
        };
        let hash = block.block_hash;
        let work = parent_work + block_work(block.difficulty_target);
        self.children.entry(block.previous_hash).or_default().push(hash);
        self.cumulative_work.insert(hash, work);
        self.blocks.insert(hash, block);
        true
    }

    #[must_use]
    pub fn contains(&self, hash: &Hash) -> bool {
        self.blocks.contains_key(hash)
    }

    #[must_use]
    pub fn get(&self, hash: &Hash) -> Option<&Block> {
        self.blocks.get(hash)
    }

    /// The block with the greatest cumulative work; among equals, the
    /// lexicographically smallest hash.
    #[must_use]
    pub fn canonical_tip(&self) -> Option<Hash> {
        self.cumulative_work
            .iter()
            .max_by(|(hash_a, work_a), (hash_b, work_b)| {
                work_a.cmp(work_b).then_with(|| hash_b.cmp(hash_a))
            })
            .map(|(hash, _)| *hash)
    }
}
