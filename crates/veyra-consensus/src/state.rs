//! Driver-owned `(currentHeight, currentRound, currentEpoch)`.
//!
//! Single-writer: one scheduler task drives `fail_round`/`succeed_round`.
//! `currentRound` is a monotonic attempt counter independent of
//! `ChainState.currentRound` (which only reflects the last *applied*
//! block's round) — a failed round still consumes a round number even
//! though no block was produced.

use parking_lot::RwLock;

pub struct ConsensusState {
    current_height: RwLock<u64>,
    current_round: RwLock<u64>,
    current_epoch: RwLock<u64>,
}

impl ConsensusState {
    #[must_use]
    pub fn new(height: u64, round: u64, epoch_length: u64) -> Self {
        Self {
            current_height: RwLock::new(height),
            current_round: RwLock::new(round),
            current_epoch: RwLock::new(height / epoch_length.max(1)),
        }
    }

    #[must_use]
    pub fn current_height(&self) -> u64 {
        *self.current_height.read()
    }

    #[must_use]
    pub fn current_round(&self) -> u64 {
        *self.current_round.read()
    }

    #[must_use]
    pub fn current_epoch(&self) -> u64 {
        *self.current_epoch.read()
    }

    /// COLLECTING timeout/quorum-fail or WAIT_BLOCK timeout: advance the
    /// round counter, height unchanged.
    pub fn fail_round(&self) {
        *self.current_round.write() += 1;
    }

    /// APPLY: a block landed at `new_height`. Advances height and round,
    /// and refreshes the epoch counter if the boundary was crossed.
    pub fn succeed_round(&self, new_height: u64, epoch_length: u64) {
        *self.current_height.write() = new_height;
        *self.current_round.write() += 1;
        *self.current_epoch.write() = new_height / epoch_length.max(1);
    }
}
