//! Lightweight Proof-of-Work mining.
//!
//! Single-threaded and cooperative: the loop only checks for cancellation
//! every [`CANCELLATION_CHECK_INTERVAL`] attempts so the hot path stays a
//! tight hash loop, then yields to the async runtime. On cancellation or
//! timeout the partially-mined block is simply dropped — there is no
//! partial commitment to resume from.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use primitive_types::U256;
use shared_types::Block;
use tokio::time::Instant;

/// Number of nonce attempts between cancellation/deadline checks.
pub const CANCELLATION_CHECK_INTERVAL: u64 = 1 << 14;

/// The result of a mining attempt.
#[derive(Debug)]
pub enum MiningOutcome {
    Found(Block),
    Cancelled,
    TimedOut,
}

/// Iterate `nonce` over `block` until its hash satisfies `difficultyTarget`,
/// the deadline passes, or `cancelled` is set by the caller (e.g. a higher
/// block arrived from gossip).
pub async fn mine(mut block: Block, deadline: Instant, cancelled: Arc<AtomicBool>) -> MiningOutcome {
    let mut nonce: u64 = 0;
    loop {
        for _ in 0..CANCELLATION_CHECK_INTERVAL {
            block.nonce = nonce;
            let hash = block.compute_hash();
            if U256::from_big_endian(&hash) <= block.difficulty_target {
                block.block_hash = hash;
                return MiningOutcome::Found(block);
            }
            nonce = nonce.wrapping_add(1);
        }

        if cancelled.load(Ordering::Relaxed) {
            return MiningOutcome::Cancelled;
        }
        if Instant::now() >= deadline {
            return MiningOutcome::TimedOut;
        }
        tokio::task::yield_now().await;
    }
}
