//! Consensus parameters.
//!
//! Fixed at genesis and changed only through the chain's own execution path.
//! Every block header commits to [`ConsensusParams::hash`], so two replicas
//! running with different parameters reject each other's blocks at the
//! `consensus_hash` check instead of silently diverging.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::{
    BLOCKS_MAX_FUTURE, BLOCKS_MIN_INTERVAL, DEFAULT_EVIDENCE_MAX_AGE, DEFAULT_MAX_BLOCK_TXS,
};
use crate::crypto::hash::{domain_separated_hash, Hash};

const PARAMS_CONTEXT: &str = "meridian 2026 consensus params";

/// Errors returned by [`ConsensusParams::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamsError {
    #[error("block_size.max_txs must be positive")]
    ZeroMaxTxs,

    #[error("evidence.max_age must be positive")]
    ZeroEvidenceMaxAge,

    #[error("block_time.min_interval must be positive")]
    ZeroMinInterval,

    #[error("block_time.max_future must be positive")]
    ZeroMaxFuture,
}

/// Limits on block contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSizeParams {
    /// Maximum number of transactions in one block.
    pub max_txs: u64,
}

impl Default for BlockSizeParams {
    fn default() -> Self {
        Self {
            max_txs: DEFAULT_MAX_BLOCK_TXS,
        }
    }
}

/// Evidence admissibility parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceParams {
    /// Maximum age of evidence, in blocks. Evidence exactly `max_age` blocks
    /// old is still admissible.
    pub max_age: u64,
}

impl Default for EvidenceParams {
    fn default() -> Self {
        Self {
            max_age: DEFAULT_EVIDENCE_MAX_AGE,
        }
    }
}

/// Bounds on block timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTimeParams {
    /// Minimum spacing from the previous block.
    pub min_interval: Duration,
    /// Maximum lead over the validating replica's wall clock.
    pub max_future: Duration,
}

impl Default for BlockTimeParams {
    fn default() -> Self {
        Self {
            min_interval: BLOCKS_MIN_INTERVAL,
            max_future: BLOCKS_MAX_FUTURE,
        }
    }
}

/// The full set of consensus parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusParams {
    pub block_size: BlockSizeParams,
    pub evidence: EvidenceParams,
    pub block_time: BlockTimeParams,
}

impl ConsensusParams {
    /// Check that every limit is usable.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.block_size.max_txs == 0 {
            return Err(ParamsError::ZeroMaxTxs);
        }
        if self.evidence.max_age == 0 {
            return Err(ParamsError::ZeroEvidenceMaxAge);
        }
        if self.block_time.min_interval.is_zero() {
            return Err(ParamsError::ZeroMinInterval);
        }
        if self.block_time.max_future.is_zero() {
            return Err(ParamsError::ZeroMaxFuture);
        }
        Ok(())
    }

    /// Deterministic digest of the parameters.
    ///
    /// Fixed-width little-endian encoding of every field in declaration
    /// order; independent of serde so a serializer upgrade can never change
    /// the hash.
    pub fn hash(&self) -> Hash {
        let mut preimage = Vec::with_capacity(40);
        preimage.extend_from_slice(&self.block_size.max_txs.to_le_bytes());
        preimage.extend_from_slice(&self.evidence.max_age.to_le_bytes());
        preimage.extend_from_slice(&self.block_time.min_interval.as_secs().to_le_bytes());
        preimage.extend_from_slice(&self.block_time.min_interval.subsec_nanos().to_le_bytes());
        preimage.extend_from_slice(&self.block_time.max_future.as_secs().to_le_bytes());
        preimage.extend_from_slice(&self.block_time.max_future.subsec_nanos().to_le_bytes());
        domain_separated_hash(PARAMS_CONTEXT, &preimage)
    }
}
