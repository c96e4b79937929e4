//! State transition engine.
//!
//! Applies one block's transactions in canonical order, distributes the
//! block's reward and accumulated fees across the rewarded set, then
//! advances `ChainState`. Callers are expected to have already run every
//! transaction through `veyra-tx-validator` against this same pre-state;
//! this module trusts that and focuses on conservation, not rejection.

use std::collections::HashMap;

use shared_types::{AccountState, Block, ChainState, PublicKey, Transaction, TransactionType};
use veyra_tx_validator::AccountLookup;

use crate::errors::StateError;
use crate::reward::RewardSchedule;

/// The full mutable state a node tracks: every account plus the chain
/// head's aggregate fields. Cheap to clone for a pre-block snapshot a
/// caller can revert to if a heavier competing block displaces the one
/// just applied.
#[derive(Clone)]
pub struct WorldState {
    accounts: HashMap<PublicKey, AccountState>,
    chain: ChainState,
    reward_schedule: RewardSchedule,
}

impl WorldState {
    #[must_use]
    pub fn new(chain: ChainState, reward_schedule: RewardSchedule) -> Self {
        Self {
            accounts: HashMap::new(),
            chain,
            reward_schedule,
        }
    }

    #[must_use]
    pub fn chain(&self) -> &ChainState {
        &self.chain
    }

    /// The block subsidy `baseReward(height)` a proposer at this height is
    /// entitled to mint via a `REWARD` transaction.
    #[must_use]
    pub fn reward_at(&self, height: u64) -> u128 {
        self.reward_schedule.reward_at(height)
    }

    #[must_use]
    pub fn account(&self, public_key: &PublicKey) -> AccountState {
        self.accounts
            .get(public_key)
            .cloned()
            .unwrap_or_else(|| AccountState::new(*public_key))
    }

    /// Seed or overwrite an account, used for genesis allocation.
    pub fn set_account(&mut self, account: AccountState) {
        self.accounts.insert(account.public_key, account);
    }

    fn account_mut(&mut self, public_key: &PublicKey) -> &mut AccountState {
        self.accounts
            .entry(*public_key)
            .or_insert_with(|| AccountState::new(*public_key))
    }

    fn credit(&mut self, public_key: &PublicKey, amount: u128) {
        self.account_mut(public_key).balance += amount;
    }

    /// Apply one transaction's effect on balances/nonces/stake, in place.
    fn apply_transaction(
        &mut self,
        tx: &Transaction,
        fee_pool: &mut u128,
    ) -> Result<(), StateError> {
        match tx.tx_type {
            TransactionType::Transfer => {
                let sender = self.account_mut(&tx.sender);
                sender.balance = sender
                    .balance
                    .checked_sub(tx.amount + tx.fee)
                    .ok_or(StateError::BalanceUnderflow(tx.sender))?;
                sender.nonce += 1;
                *fee_pool += tx.fee;
                self.credit(&tx.receiver, tx.amount);
            }
            TransactionType::Stake => {
                let sender = self.account_mut(&tx.sender);
                sender.balance = sender
                    .balance
                    .checked_sub(tx.amount + tx.fee)
                    .ok_or(StateError::BalanceUnderflow(tx.sender))?;
                sender.stake_amount += tx.amount;
                sender.nonce += 1;
                *fee_pool += tx.fee;
            }
            TransactionType::Unstake => {
                let sender = self.account_mut(&tx.sender);
                sender.stake_amount = sender
                    .stake_amount
                    .checked_sub(tx.amount)
                    .ok_or(StateError::StakeUnderflow(tx.sender))?;
                let net = tx
                    .amount
                    .checked_sub(tx.fee)
                    .ok_or(StateError::BalanceUnderflow(tx.sender))?;
                sender.balance = sender
                    .balance
                    .checked_add(net)
                    .ok_or(StateError::BalanceUnderflow(tx.sender))?;
                sender.nonce += 1;
                *fee_pool += tx.fee;
            }
            TransactionType::Reward => {
                self.credit(&tx.receiver, tx.amount);
            }
        }
        Ok(())
    }

    /// Distribute `feePool + baseReward(height)` across `rewardedTopX`
    /// proportional to each member's score in this round's announcements.
    /// Rounding shortfall (from integer division) goes to `rank[0]`.
    fn distribute_rewards(
        &mut self,
        block: &Block,
        fee_pool: u128,
        base_reward: u128,
    ) -> Result<(), StateError> {
        let Some(&winner) = block.rewarded_top_x.first() else {
            return Err(StateError::RewardSetEmpty);
        };

        let total_pool = fee_pool + base_reward;
        let score_of: HashMap<PublicKey, f64> = block
            .all_vrf_announcements
            .iter()
            .map(|a| (a.public_key, a.score))
            .collect();
        let total_score: f64 = block
            .rewarded_top_x
            .iter()
            .map(|pk| score_of.get(pk).copied().unwrap_or(0.0))
            .sum();

        if total_score <= 0.0 {
            self.credit(&winner, total_pool);
            return Ok(());
        }

        let shares: Vec<u128> = block
            .rewarded_top_x
            .iter()
            .map(|pk| {
                let score = score_of.get(pk).copied().unwrap_or(0.0);
                ((total_pool as f64) * score / total_score).floor() as u128
            })
            .collect();
        let distributed: u128 = shares.iter().sum();
        let shortfall = total_pool - distributed;

        for (index, pk) in block.rewarded_top_x.iter().enumerate() {
            let mut amount = shares[index];
            if index == 0 {
                amount += shortfall;
            }
            self.credit(pk, amount);
        }

        Ok(())
    }

    /// Apply a full block: every transaction in its stored (canonical)
    /// order, then reward distribution, then the `ChainState` advance.
    pub fn apply_block(&mut self, block: &Block) -> Result<(), StateError> {
        let mut fee_pool: u128 = 0;
        for tx in &block.transactions {
            self.apply_transaction(tx, &mut fee_pool)?;
        }

        let base_reward = self.reward_schedule.reward_at(block.height);
        self.distribute_rewards(block, fee_pool, base_reward)?;

        self.chain.current_height += 1;
        self.chain.current_round = block.round;
        self.chain.total_supply += base_reward;
        self.chain.last_update_timestamp = block.timestamp;

        Ok(())
    }
}

impl AccountLookup for WorldState {
    fn account(&self, public_key: &PublicKey) -> Option<AccountState> {
        Some(WorldState::account(self, public_key))
    }
}
