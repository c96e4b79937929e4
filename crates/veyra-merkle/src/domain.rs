//! Canonical transaction ordering and Merkle root construction
//! over a block's transaction set.
//!
//! Ordering is fixed before the tree is built so block construction is
//! reproducible and leaves no grinding surface in transaction placement.

use rayon::prelude::*;
use shared_types::{sha256, Hash, Transaction};

/// Order transactions the way every node must agree on: ascending sender
/// (lex), then ascending `nonce` within a sender. A single composite key
/// rather than a branch that switches comparison fields per pair, so the
/// ordering is transitive regardless of input order.
#[must_use]
pub fn canonical_order(mut transactions: Vec<Transaction>) -> Vec<Transaction> {
    transactions.sort_by(|a, b| (a.sender, a.nonce).cmp(&(b.sender, b.nonce)));
    transactions
}

/// `leaf_i = SHA256(tx_i.hash)` — an explicit second hashing so leaves are
/// distinguishable from internal nodes.
#[must_use]
fn leaf_hash(tx_hash: &Hash) -> Hash {
    sha256(tx_hash)
}

/// Build a Merkle root over already-ordered leaf digests. Empty input
/// yields the zero digest; an odd level duplicates its last node.
#[must_use]
pub fn build_root(leaves: &[Hash]) -> Hash {
    if leaves.is_empty() {
        return [0u8; 32];
    }

    let mut level: Vec<Hash> = leaves.par_iter().map(leaf_hash).collect();

    while level.len() > 1 {
        if level.len() % 2 == 1 {
            let last = *level.last().expect("level is non-empty");
            level.push(last);
        }
        level = level
            .par_chunks(2)
            .map(|pair| {
                let mut buf = [0u8; 64];
                buf[..32].copy_from_slice(&pair[0]);
                buf[32..].copy_from_slice(&pair[1]);
                sha256(&buf)
            })
            .collect();
    }

    level[0]
}

/// `canonical_order` followed by `build_root` over the resulting
/// transaction hashes.
#[must_use]
pub fn merkle_root_for_transactions(transactions: &[Transaction]) -> Hash {
    let hashes: Vec<Hash> = transactions.iter().map(|tx| tx.hash).collect();
    build_root(&hashes)
}

/// Order transactions canonically and compute the resulting Merkle root in
/// one step, as the block proposer does when assembling a header.
#[must_use]
pub fn order_and_root(transactions: Vec<Transaction>) -> (Vec<Transaction>, Hash) {
    let ordered = canonical_order(transactions);
    let root = merkle_root_for_transactions(&ordered);
    (ordered, root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{PublicKey, TransactionType};

    fn tx(sender: u8, nonce: u64, hash_byte: u8) -> Transaction {
        Transaction {
            sender: PublicKey::from_bytes([sender; 32]),
            receiver: PublicKey::from_bytes([0xFF; 32]),
            amount: 1,
            fee: 0,
            nonce,
            timestamp: 0,
            tx_type: TransactionType::Transfer,
            signature: [0u8; 64],
            hash: [hash_byte; 32],
        }
    }

    #[test]
    fn empty_transactions_yield_zero_digest() {
        assert_eq!(build_root(&[]), [0u8; 32]);
    }

    #[test]
    fn single_leaf_is_hashed_once_more_than_raw_hash() {
        let hash = [7u8; 32];
        assert_eq!(build_root(&[hash]), sha256(&hash));
    }

    #[test]
    fn odd_level_duplicates_last_node() {
        let three = build_root(&[[1u8; 32], [2u8; 32], [3u8; 32]]);

        // Manually build the duplicated-last-leaf tree.
        let l0 = sha256(&[1u8; 32]);
        let l1 = sha256(&[2u8; 32]);
        let l2 = sha256(&[3u8; 32]);
        let mut pair_buf = [0u8; 64];
        pair_buf[..32].copy_from_slice(&l0);
        pair_buf[32..].copy_from_slice(&l1);
        let n0 = sha256(&pair_buf);
        pair_buf[..32].copy_from_slice(&l2);
        pair_buf[32..].copy_from_slice(&l2);
        let n1 = sha256(&pair_buf);
        pair_buf[..32].copy_from_slice(&n0);
        pair_buf[32..].copy_from_slice(&n1);
        let expected_root = sha256(&pair_buf);

        assert_eq!(three, expected_root);
    }

    #[test]
    fn leaf_order_changes_the_root() {
        let a = build_root(&[[1u8; 32], [2u8; 32]]);
        let b = build_root(&[[2u8; 32], [1u8; 32]]);
        assert_ne!(a, b);
    }

    #[test]
    fn same_sender_orders_by_ascending_nonce() {
        let txs = vec![tx(1, 5, 9), tx(1, 2, 1), tx(1, 9, 0)];
        let ordered = canonical_order(txs);
        assert_eq!(
            ordered.iter().map(|t| t.nonce).collect::<Vec<_>>(),
            vec![2, 5, 9]
        );
    }

    #[test]
    fn distinct_senders_order_by_ascending_sender_key() {
        let txs = vec![tx(3, 0, 9), tx(1, 0, 1), tx(2, 0, 5)];
        let ordered = canonical_order(txs);
        assert_eq!(
            ordered.iter().map(|t| t.sender).collect::<Vec<_>>(),
            vec![
                PublicKey::from_bytes([1; 32]),
                PublicKey::from_bytes([2; 32]),
                PublicKey::from_bytes([3; 32]),
            ]
        );
    }

    #[test]
    fn ordering_is_stable_regardless_of_input_order() {
        // A transitive comparator must sort the same multiset to the same
        // order no matter which permutation it started from.
        let a = tx(1, 1, 0x90);
        let b = tx(1, 2, 0x10);
        let c = tx(2, 0, 0x50);

        let forward = canonical_order(vec![a.clone(), b.clone(), c.clone()]);
        let shuffled = canonical_order(vec![c, a, b]);

        assert_eq!(
            forward.iter().map(|t| (t.sender, t.nonce)).collect::<Vec<_>>(),
            shuffled.iter().map(|t| (t.sender, t.nonce)).collect::<Vec<_>>(),
        );
    }
}
