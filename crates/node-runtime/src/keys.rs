//! Node identity: load the Ed25519 seed `node.keypair_path` names, or
//! mint and persist a fresh one on first boot.

use std::path::Path;

use anyhow::{anyhow, Context};
use shared_crypto::Ed25519KeyPair;

pub fn load_or_generate(path: &Path) -> anyhow::Result<Ed25519KeyPair> {
    match std::fs::read(path) {
        Ok(bytes) => {
            let seed: [u8; 32] = bytes
                .try_into()
                .map_err(|_| anyhow!("keypair file at {} is not a 32-byte seed", path.display()))?;
            Ok(Ed25519KeyPair::from_seed(seed))
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no keypair found, generating one");
            let keypair = Ed25519KeyPair::generate();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating keypair directory {}", parent.display()))?;
            }
            std::fs::write(path, keypair.to_seed())
                .with_context(|| format!("writing keypair to {}", path.display()))?;
            Ok(keypair)
        }
        Err(err) => Err(err).with_context(|| format!("reading keypair from {}", path.display())),
    }
}
