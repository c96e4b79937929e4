//! Core domain entities of the consensus engine.
//!
//! ## Clusters
//!
//! - **Identity**: `PublicKey`
//! - **VRF**: `VRFOutput`, `VRFProof`, `VRFAnnouncement`
//! - **Chain**: `Transaction`, `Block`
//! - **State**: `AccountState`, `ChainState`
//!
//! Hashing is canonical and explicit: every hashable entity exposes a
//! `canonical_bytes()` method building the exact byte layout to digest, with
//! no runtime reflection or serde-driven encoding in the hot path. This
//! mirrors the fixed-width-field, length-prefixed-variable-field convention
//! used on the wire (see `gossip`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use sha2::{Digest, Sha256};

/// A 32-byte SHA-256 digest.
pub type Hash = [u8; 32];

/// A 64-byte Ed25519 signature.
pub type Signature = [u8; 64];

/// Compute `SHA256(data)`.
#[must_use]
pub fn sha256(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// An Ed25519 public key: the account identifier on chain and the wire
/// encoding used in gossip and block headers.
#[serde_as]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PublicKey(#[serde_as(as = "Bytes")] pub [u8; 32]);

impl PublicKey {
    /// The all-zero key, used as the synthetic sender of `REWARD` transactions.
    pub const ZERO: PublicKey = PublicKey([0u8; 32]);

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Lowercase hex encoding without a `0x` prefix.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", &self.to_hex()[..8])
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// The VRF's 32-byte pseudo-random output and its 64-byte proof.
///
/// `score()` projects the output into `[0, 1)`:
/// `u64_be(output[0..8]) / 2^64`.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VRFOutput(pub [u8; 32]);

impl VRFOutput {
    #[must_use]
    pub fn score(&self) -> f64 {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&self.0[0..8]);
        (u64::from_be_bytes(buf) as f64) / (u64::MAX as f64 + 1.0)
    }
}

impl std::fmt::Debug for VRFOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VRFOutput({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

/// The VRF's 64-byte proof, opaque to everyone but `veyra-vrf`.
#[serde_as]
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VRFProof(#[serde_as(as = "Bytes")] pub [u8; 64]);

impl std::fmt::Debug for VRFProof {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VRFProof({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

/// One committee member's VRF claim for a round.
///
/// `(round, publicKey, vrfOutput, vrfProof, score, timestamp)`.
/// At most one is accepted per `(round, publicKey)` pair; see `veyra-vrf-collector`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VRFAnnouncement {
    pub round: u64,
    pub public_key: PublicKey,
    pub vrf_output: VRFOutput,
    pub vrf_proof: VRFProof,
    pub score: f64,
    pub timestamp: u64,
}

impl VRFAnnouncement {
    /// Bytes an announcer signs to authenticate this announcement on the wire.
    #[must_use]
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(32 + 32 + 64 + 8 + 8 + 8);
        out.extend_from_slice(&self.round.to_be_bytes());
        out.extend_from_slice(self.public_key.as_bytes());
        out.extend_from_slice(&self.vrf_output.0);
        out.extend_from_slice(&self.vrf_proof.0);
        out.extend_from_slice(&self.timestamp.to_be_bytes());
        out
    }
}

/// Transaction kind. `Reward` transactions carry no sender signature and are
/// only valid when synthesized by the proposer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    Transfer,
    Stake,
    Unstake,
    Reward,
}

impl TransactionType {
    fn tag(self) -> u8 {
        match self {
            TransactionType::Transfer => 0,
            TransactionType::Stake => 1,
            TransactionType::Unstake => 2,
            TransactionType::Reward => 3,
        }
    }
}

/// `(senderPk, receiverPk, amount, fee, nonce, timestamp, type,
/// signature, hash)`.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: PublicKey,
    pub receiver: PublicKey,
    pub amount: u128,
    pub fee: u128,
    pub nonce: u64,
    pub timestamp: u64,
    pub tx_type: TransactionType,
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
    pub hash: Hash,
}

impl Transaction {
    /// The exact bytes that are both signed and hashed: every field above
    /// except `signature` and `hash` themselves.
    #[must_use]
    pub fn signing_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(32 + 32 + 16 + 16 + 8 + 8 + 1);
        out.extend_from_slice(self.sender.as_bytes());
        out.extend_from_slice(self.receiver.as_bytes());
        out.extend_from_slice(&self.amount.to_be_bytes());
        out.extend_from_slice(&self.fee.to_be_bytes());
        out.extend_from_slice(&self.nonce.to_be_bytes());
        out.extend_from_slice(&self.timestamp.to_be_bytes());
        out.push(self.tx_type.tag());
        out
    }

    /// `hash = SHA256(canonical-serialization-without-signature-without-hash)`.
    #[must_use]
    pub fn compute_hash(&self) -> Hash {
        sha256(&self.signing_bytes())
    }
}

/// The full block tuple. `block_hash` covers every field here
/// except `signatures` and itself, in declared field order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Block {
    pub height: u64,
    pub previous_hash: Hash,
    pub timestamp: u64,
    pub round: u64,
    pub proposer_pk: PublicKey,
    pub vrf_output: VRFOutput,
    pub vrf_proof: VRFProof,
    pub all_vrf_announcements: Vec<VRFAnnouncement>,
    pub rewarded_top_x: Vec<PublicKey>,
    pub transactions: Vec<Transaction>,
    pub merkle_root: Hash,
    pub nonce: u64,
    /// Arbitrary-precision PoW target; smaller means harder.
    pub difficulty_target: primitive_types::U256,
    pub block_hash: Hash,
    /// Proposer's signature over `block_hash`, keyed by its own public key.
    /// A map rather than a single value: `signatures` is a mapping from
    /// publicKey to Ed25519 signature, left open for multi-signer
    /// extensions even though today only the proposer signs.
    pub signatures: BTreeMap<PublicKey, Signature>,
}

impl Block {
    /// Header bytes used both for `block_hash` and as the PoW message.
    /// Every field is fixed-width big-endian or length-prefixed; no padding.
    #[must_use]
    pub fn header_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1024);
        out.extend_from_slice(&self.height.to_be_bytes());
        out.extend_from_slice(&self.previous_hash);
        out.extend_from_slice(&self.timestamp.to_be_bytes());
        out.extend_from_slice(&self.round.to_be_bytes());
        out.extend_from_slice(self.proposer_pk.as_bytes());
        out.extend_from_slice(&self.vrf_output.0);
        out.extend_from_slice(&self.vrf_proof.0);

        out.extend_from_slice(&(self.all_vrf_announcements.len() as u32).to_be_bytes());
        for ann in &self.all_vrf_announcements {
            out.extend_from_slice(&ann.canonical_bytes());
        }

        out.extend_from_slice(&(self.rewarded_top_x.len() as u32).to_be_bytes());
        for pk in &self.rewarded_top_x {
            out.extend_from_slice(pk.as_bytes());
        }

        out.extend_from_slice(&(self.transactions.len() as u32).to_be_bytes());
        for tx in &self.transactions {
            out.extend_from_slice(&tx.hash);
        }

        out.extend_from_slice(&self.merkle_root);
        out.extend_from_slice(&self.nonce.to_be_bytes());

        let mut target_be = [0u8; 32];
        self.difficulty_target.to_big_endian(&mut target_be);
        out.extend_from_slice(&target_be);

        out
    }

    /// `blockHash = SHA256(header)`.
    #[must_use]
    pub fn compute_hash(&self) -> Hash {
        sha256(&self.header_bytes())
    }

    #[must_use]
    pub fn is_genesis(&self) -> bool {
        self.height == 0
    }
}

/// `(publicKey, balance, nonce, stakeAmount, lastUpdateTimestamp)`.
/// Immutable value: every mutation in `veyra-state` produces a new version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    pub public_key: PublicKey,
    pub balance: u128,
    pub nonce: u64,
    pub stake_amount: u128,
    pub last_update_timestamp: u64,
}

impl AccountState {
    #[must_use]
    pub fn new(public_key: PublicKey) -> Self {
        Self {
            public_key,
            balance: 0,
            nonce: 0,
            stake_amount: 0,
            last_update_timestamp: 0,
        }
    }
}

/// `(currentHeight, currentRound, totalSupply,
/// activeSuperNodes, currentDifficulty, lastUpdateTimestamp)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainState {
    pub current_height: u64,
    pub current_round: u64,
    pub total_supply: u128,
    pub active_super_nodes: Vec<PublicKey>,
    pub current_difficulty: primitive_types::U256,
    pub last_update_timestamp: u64,
}
