//! # VRF Primitive
//!
//! Resolves an open question (see `DESIGN.md`): the concrete
//! VRF construction is Ed25519-signature-derived. `evaluate` signs the round
//! input with the node's existing Ed25519 key (the same primitive C2
//! already supplies) and derives the 32-byte output by hashing that
//! signature; the signature itself doubles as the 64-byte proof. `verify`
//! checks the signature against the input and re-derives the output to
//! confirm the caller's claim, so nothing beyond "one Ed25519 capability" is
//! introduced, avoiding provider-coupled
//! or bespoke crypto primitives.
//!
//! This keeps both properties a VRF needs: verifiability (any
//! node can check a winner's claim from `(publicKey, input, output, proof)`
//! alone) and unbiased, ungrindable sampling (the signature — and so the
//! output — is fixed the moment `input` is fixed, and `input` is fixed by
//! the round, not chosen by the announcer).

use shared_crypto::{sha256, verify as ed25519_verify, Ed25519KeyPair};
use shared_types::{PublicKey, VRFOutput, VRFProof};

/// `evaluate(sk, input) -> (output, proof)`. Deterministic: equal
/// `(sk, input)` always yields equal `(output, proof)`, since Ed25519
/// signing itself is deterministic (RFC 8032).
#[must_use]
pub fn evaluate(keypair: &Ed25519KeyPair, input: &[u8]) -> (VRFOutput, VRFProof) {
    let signature = keypair.sign(input);
    let output = VRFOutput(sha256(&signature));
    (output, VRFProof(signature))
}

/// `verify(pk, input, output, proof) -> bool`. True iff `proof` is a valid
/// Ed25519 signature by `pk` over `input`, and `output` is exactly
/// `sha256(proof)`. Total: never panics on malformed input, always returns
/// a bool.
#[must_use]
pub fn verify(pk: &PublicKey, input: &[u8], output: &VRFOutput, proof: &VRFProof) -> bool {
    if !ed25519_verify(pk, input, &proof.0) {
        return false;
    }
    sha256(&proof.0) == output.0
}

/// Canonical round input: `SHA256(prevBlockHash ||
/// round_be_u64)`.
#[must_use]
pub fn round_input(prev_block_hash: &[u8; 32], round: u64) -> [u8; 32] {
    let mut buf = Vec::with_capacity(40);
    buf.extend_from_slice(prev_block_hash);
    buf.extend_from_slice(&round.to_be_bytes());
    sha256(&buf)
}
