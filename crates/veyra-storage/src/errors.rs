use thiserror::Error;

/// Failure modes for the storage contract's read/write side.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("block at height {0} already exists")]
    HeightOccupied(u64),

    #[error("block with hash {0:02x?} already exists")]
    HashOccupied([u8; 32]),

    #[error("chain state has not been initialized yet")]
    ChainUninitialized,
}
