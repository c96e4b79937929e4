//! # Shared Crypto
//!
//! Hash and signature primitives: SHA-256 digests and
//! Ed25519 signing/verification. Treated as abstract capabilities with a
//! single concrete implementation each — no provider coupling leaks into
//! the rest of the workspace.

#![warn(missing_docs)]

pub mod errors;
pub mod hashing;
pub mod signatures;

pub use errors::CryptoError;
pub use hashing::{sha256, sha256_many, Sha256Hasher};
pub use signatures::{verify, Ed25519KeyPair};
