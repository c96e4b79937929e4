//! Per-transaction validation.
//!
//! Stateless with respect to everything except the single account it reads:
//! validation never mutates state, and the caller is responsible for
//! re-validating against updated balances as it applies transactions in
//! sequence (a later transaction in the same block can depend on an
//! earlier one's effect).

use std::collections::HashMap;

use shared_crypto::verify;
use shared_types::{AccountState, PublicKey, Transaction, TransactionType};

use crate::errors::TxValidationError;

/// Resolves the current on-chain account for a sender, as of the state the
/// transaction is being checked against.
pub trait AccountLookup {
    fn account(&self, public_key: &PublicKey) -> Option<AccountState>;
}

/// Validate one transaction against pre-state. `expected_reward` is the
/// `blockReward(height)` the caller (which owns the reward schedule)
/// computed for the block this transaction would land in; only consulted
/// for `REWARD` transactions.
pub fn validate_transaction(
    tx: &Transaction,
    accounts: &dyn AccountLookup,
    expected_reward: u128,
) -> Result<(), TxValidationError> {
    if tx.tx_type == TransactionType::Reward {
        return validate_reward(tx, expected_reward);
    }

    if !verify(&tx.sender, &tx.signing_bytes(), &tx.signature) {
        return Err(TxValidationError::SignatureInvalid);
    }
    if tx.amount == 0 {
        return Err(TxValidationError::NonPositiveAmount);
    }
    if tx.tx_type == TransactionType::Transfer && tx.sender == tx.receiver {
        return Err(TxValidationError::SelfTransfer);
    }

    let account = accounts
        .account(&tx.sender)
        .ok_or(TxValidationError::UnknownSender(tx.sender))?;

    if tx.nonce != account.nonce + 1 {
        return Err(TxValidationError::NonceMismatch {
            expected: account.nonce + 1,
            actual: tx.nonce,
        });
    }

    match tx.tx_type {
        TransactionType::Transfer | TransactionType::Stake => {
            let required = tx.amount + tx.fee;
            if account.balance < required {
                return Err(TxValidationError::InsufficientBalance {
                    required,
                    available: account.balance,
                });
            }
        }
        TransactionType::Unstake => {
            if account.stake_amount < tx.amount {
                return Err(TxValidationError::InsufficientStake {
                    required: tx.amount,
                    available: account.stake_amount,
                });
            }
            if account.balance < tx.fee {
                return Err(TxValidationError::InsufficientBalance {
                    required: tx.fee,
                    available: account.balance,
                });
            }
        }
        TransactionType::Reward => unreachable!("handled above"),
    }

    Ok(())
}

fn validate_reward(tx: &Transaction, expected_reward: u128) -> Result<(), TxValidationError> {
    if tx.sender != PublicKey::ZERO || tx.amount != expected_reward {
        return Err(TxValidationError::InvalidReward);
    }
    Ok(())
}

/// A local, mutable view over a base [`AccountLookup`] that records each
/// transaction's effect before the next is validated. Reward transactions
/// touch no sender account and are not folded in. Constructing one and
/// calling [`RollingAccounts::apply`] after each validated transaction is
/// how a batch (a block's transactions, or a mempool filter pass) is
/// checked against the pre-state each transaction actually sees, rather
/// than the batch's starting snapshot.
pub struct RollingAccounts<'a> {
    base: &'a dyn AccountLookup,
    overrides: HashMap<PublicKey, AccountState>,
}

impl<'a> RollingAccounts<'a> {
    #[must_use]
    pub fn new(base: &'a dyn AccountLookup) -> Self {
        Self {
            base,
            overrides: HashMap::new(),
        }
    }

    /// Fold `tx`'s effect into the working view. Assumes `tx` already
    /// passed [`validate_transaction`] against this same view.
    pub fn apply(&mut self, tx: &Transaction) {
        if tx.tx_type == TransactionType::Reward {
            return;
        }

        let mut sender = self.account(&tx.sender).unwrap_or_else(|| AccountState::new(tx.sender));
        match tx.tx_type {
            TransactionType::Transfer | TransactionType::Stake => {
                sender.balance = sender.balance.saturating_sub(tx.amount + tx.fee);
                if tx.tx_type == TransactionType::Stake {
                    sender.stake_amount += tx.amount;
                }
            }
            TransactionType::Unstake => {
                sender.stake_amount = sender.stake_amount.saturating_sub(tx.amount);
                sender.balance = sender.balance.saturating_add(tx.amount.saturating_sub(tx.fee));
            }
            TransactionType::Reward => unreachable!("handled above"),
        }
        sender.nonce += 1;
        self.overrides.insert(tx.sender, sender);

        if tx.tx_type == TransactionType::Transfer {
            let mut receiver = self.account(&tx.receiver).unwrap_or_else(|| AccountState::new(tx.receiver));
            receiver.balance = receiver.balance.saturating_add(tx.amount);
            self.overrides.insert(tx.receiver, receiver);
        }
    }
}

impl AccountLookup for RollingAccounts<'_> {
    fn account(&self, public_key: &PublicKey) -> Option<AccountState> {
        self.overrides
            .get(public_key)
            .cloned()
            .or_else(|| self.base.account(public_key))
    }
}
