//! Gossip message contracts.
//!
//! Peer-to-peer transport is an external collaborator; this
//! module only fixes the shape of the three message kinds the engine
//! consumes and produces. Encoding is the same canonical, fixed-width
//! convention used for hashing — no optional padding, 32-byte public keys,
//! length-prefixed variable fields.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};

use crate::entities::{Block, PublicKey, Signature, Transaction, VRFOutput, VRFProof};

/// `VRF_ANNOUNCE { round, publicKey, vrfOutput, vrfProof, score, timestamp,
/// signature_over_tuple }`.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VrfAnnounceMessage {
    pub round: u64,
    pub public_key: PublicKey,
    pub vrf_output: VRFOutput,
    pub vrf_proof: VRFProof,
    pub score: f64,
    pub timestamp: u64,
    #[serde_as(as = "Bytes")]
    pub signature_over_tuple: Signature,
}

/// `BLOCK { full block encoding }`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockMessage {
    pub block: Block,
}

/// `TX { full transaction encoding }`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TxMessage {
    pub transaction: Transaction,
}

/// The three inbound/outbound gossip kinds this engine speaks.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum GossipMessage {
    VrfAnnounce(VrfAnnounceMessage),
    Block(BlockMessage),
    Tx(TxMessage),
}
