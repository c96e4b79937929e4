//! # Ed25519 Signatures
//!
//! Twisted Edwards curve signatures with deterministic nonces. No RNG
//! dependency for signing; complete addition formulas; immune to the usual
//! timing side channels.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use shared_types::{PublicKey, Signature};
use zeroize::Zeroize;

use crate::CryptoError;

/// Verify an Ed25519 signature against a wire public key.
///
/// Total function: never panics on a malformed key or signature, returns
/// `false` instead ("Verification of a malformed public key
/// returns false").
#[must_use]
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(public_key.as_bytes()) else {
        return false;
    };
    let sig = ed25519_dalek::Signature::from_bytes(signature);
    verifying_key.verify(message, &sig).is_ok()
}

/// An Ed25519 keypair. The private half never leaves this wrapper; it is
/// zeroized on drop.
pub struct Ed25519KeyPair {
    signing_key: SigningKey,
}

impl Ed25519KeyPair {
    /// Generate a random keypair.
    #[must_use]
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Reconstruct a keypair from a 32-byte secret seed.
    #[must_use]
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(&seed);
        Self { signing_key }
    }

    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_bytes(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message. Deterministic: equal `(keypair, message)` always
    /// yields the same signature (RFC 8032).
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message).to_bytes()
    }

    /// Export the secret seed for persistence (e.g. `node.keypair_path`).
    #[must_use]
    pub fn to_seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl TryFrom<&[u8]> for Ed25519KeyPair {
    type Error = CryptoError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let seed: [u8; 32] = bytes.try_into().map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self::from_seed(seed))
    }
}

impl Drop for Ed25519KeyPair {
    fn drop(&mut self) {
        let mut bytes = self.signing_key.to_bytes();
        bytes.zeroize();
    }
}
