//! Process configuration: one sub-struct per concern, each with a
//! `Default` matching the documented defaults, overridable through
//! environment variables (`node.keypair_path` becomes `NODE_KEYPAIR_PATH`,
//! and so on).

use std::path::PathBuf;

use primitive_types::U256;

/// Complete node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub node: NodeIdentityConfig,
    pub chain: ChainConfig,
    pub consensus: ConsensusTuning,
}

impl NodeConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            node: NodeIdentityConfig::from_env(),
            chain: ChainConfig::from_env(),
            consensus: ConsensusTuning::from_env(),
        }
    }
}

/// `node.*`.
#[derive(Debug, Clone)]
pub struct NodeIdentityConfig {
    /// Path to the 32-byte Ed25519 seed file. Generated on first boot if
    /// absent.
    pub keypair_path: PathBuf,
}

impl NodeIdentityConfig {
    fn from_env() -> Self {
        Self {
            keypair_path: env_path("NODE_KEYPAIR_PATH", "./data/node.key"),
        }
    }
}

/// `chain.*`.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub genesis_hash: Option<[u8; 32]>,
    pub committee_size: usize,
    pub block_time_ms: u64,
    pub rewarded_top_x: usize,
}

impl ChainConfig {
    fn from_env() -> Self {
        Self {
            genesis_hash: std::env::var("CHAIN_GENESIS_HASH")
                .ok()
                .and_then(|hex_str| hex::decode(hex_str).ok())
                .and_then(|bytes| bytes.try_into().ok()),
            committee_size: env_usize("CHAIN_COMMITTEE_SIZE", 50),
            block_time_ms: env_u64("CHAIN_BLOCK_TIME_MS", 3_000),
            rewarded_top_x: env_usize("CHAIN_REWARDED_TOP_X", 15),
        }
    }
}

/// `consensus.*`.
#[derive(Debug, Clone)]
pub struct ConsensusTuning {
    pub vrf_timeout_ms: u64,
    pub block_timeout_ms: u64,
    pub difficulty_window: usize,
    pub epoch_length: u64,
    pub base_difficulty: U256,
}

impl ConsensusTuning {
    fn from_env() -> Self {
        Self {
            vrf_timeout_ms: env_u64("CONSENSUS_VRF_TIMEOUT_MS", 3_000),
            block_timeout_ms: env_u64("CONSENSUS_BLOCK_TIMEOUT_MS", 5_000),
            difficulty_window: env_usize("CONSENSUS_DIFFICULTY_WINDOW", 100),
            epoch_length: env_u64("CONSENSUS_EPOCH_LENGTH", 10_000),
            base_difficulty: U256::from(env_u64("CONSENSUS_BASE_DIFFICULTY", 2_500_000)),
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_path(key: &str, default: &str) -> PathBuf {
    std::env::var(key).map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        std::env::remove_var("CHAIN_COMMITTEE_SIZE");
        let config = ChainConfig::from_env();
        assert_eq!(config.committee_size, 50);
        assert_eq!(config.block_time_ms, 3_000);
        assert_eq!(config.rewarded_top_x, 15);

        let tuning = ConsensusTuning::from_env();
        assert_eq!(tuning.vrf_timeout_ms, 3_000);
        assert_eq!(tuning.base_difficulty, U256::from(2_500_000u64));
    }
}
