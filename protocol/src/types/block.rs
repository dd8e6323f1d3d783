//! # Block Structure
//!
//! A block is a header, an ordered list of opaque transactions, the commit
//! that certified its parent, and any evidence the proposer chose to carry.
//!
//! ## Block Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │  Header                                          │
//! │  ├── chain_id, height, time                      │
//! │  ├── num_txs, total_txs                          │
//! │  ├── last_block_id          (parent linkage)     │
//! │  ├── last_commit_hash, data_hash, evidence_hash  │
//! │  │                          (commit to the body) │
//! │  ├── validators_hash, consensus_hash             │
//! │  └── app_hash, last_results_hash                 │
//! │                   (commit to the chain state)    │
//! ├──────────────────────────────────────────────────┤
//! │  data.txs:          Vec<Vec<u8>>                 │
//! │  last_commit:       Commit                       │
//! │  evidence.evidence: Vec<Evidence>                │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! [`Block::validate_basic`] checks everything that can be checked without
//! knowing the chain state: that the header's body hashes match the body.
//! Everything that needs the chain state lives in
//! [`BlockValidator`](crate::state::BlockValidator).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::config::{MAX_CHAIN_ID_LENGTH, MAX_EVIDENCE_PER_BLOCK};
use crate::crypto::hash::{merkle_root_of, Hash};
use crate::types::evidence::EvidenceData;
use crate::types::vote::{hex_hash, BlockId, Commit, CommitError};

/// Ways a block can be malformed on its own terms.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MalformedBlock {
    #[error("height must be positive")]
    ZeroHeight,

    #[error("chain id is empty or longer than 50 bytes")]
    BadChainId,

    #[error("header.num_txs is {declared}, data has {actual} txs")]
    NumTxsMismatch { declared: u64, actual: u64 },

    #[error("total_txs {total} is less than num_txs {num}")]
    TotalBelowNum { total: u64, num: u64 },

    #[error("wrong {field}: expected {expected}, got {got}")]
    BodyHashMismatch {
        field: &'static str,
        expected: String,
        got: String,
    },

    #[error("too many txs: {count}, max {max}")]
    TooManyTxs { count: u64, max: u64 },

    #[error("too much evidence: {count}, max {max}")]
    TooMuchEvidence { count: usize, max: usize },

    #[error("evidence #{index} repeats evidence #{first}")]
    DuplicateEvidence { index: usize, first: usize },

    #[error("invalid last commit: {0}")]
    LastCommit(#[from] CommitError),
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Block header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub chain_id: String,
    pub height: u64,
    pub time: DateTime<Utc>,
    /// Transactions in this block.
    pub num_txs: u64,
    /// Transactions in the chain up to and including this block.
    pub total_txs: u64,

    pub last_block_id: BlockId,

    #[serde(with = "hex_hash")]
    pub last_commit_hash: Hash,
    #[serde(with = "hex_hash")]
    pub data_hash: Hash,
    #[serde(with = "hex_hash")]
    pub evidence_hash: Hash,

    /// Validators allowed to sign this block.
    #[serde(with = "hex_hash")]
    pub validators_hash: Hash,
    #[serde(with = "hex_hash")]
    pub consensus_hash: Hash,

    /// Application state after executing the *previous* block.
    #[serde(with = "hex::serde")]
    pub app_hash: Vec<u8>,
    /// Execution results of the previous block.
    #[serde(with = "hex::serde")]
    pub last_results_hash: Vec<u8>,
}

impl Header {
    /// Merkle root over every header field, in declaration order.
    pub fn hash(&self) -> Hash {
        let mut last_block_id = Vec::with_capacity(68);
        last_block_id.extend_from_slice(&self.last_block_id.hash);
        last_block_id.extend_from_slice(&self.last_block_id.parts.total.to_le_bytes());
        last_block_id.extend_from_slice(&self.last_block_id.parts.hash);

        let mut time = Vec::with_capacity(12);
        time.extend_from_slice(&self.time.timestamp().to_le_bytes());
        time.extend_from_slice(&self.time.timestamp_subsec_nanos().to_le_bytes());

        let height = self.height.to_le_bytes();
        let num_txs = self.num_txs.to_le_bytes();
        let total_txs = self.total_txs.to_le_bytes();

        let fields: [&[u8]; 13] = [
            self.chain_id.as_bytes(),
            height.as_slice(),
            time.as_slice(),
            num_txs.as_slice(),
            total_txs.as_slice(),
            last_block_id.as_slice(),
            self.last_commit_hash.as_slice(),
            self.data_hash.as_slice(),
            self.evidence_hash.as_slice(),
            self.validators_hash.as_slice(),
            self.consensus_hash.as_slice(),
            self.app_hash.as_slice(),
            self.last_results_hash.as_slice(),
        ];
        merkle_root_of(&fields)
    }
}

// ---------------------------------------------------------------------------
// Data
// ---------------------------------------------------------------------------

/// The transaction payload. Transactions are opaque to consensus.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Data {
    #[serde(with = "hex_txs")]
    pub txs: Vec<Vec<u8>>,
}

impl Data {
    /// Merkle root over the transactions in block order.
    pub fn hash(&self) -> Hash {
        merkle_root_of(&self.txs)
    }
}

mod hex_txs {
    use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(txs: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error> {
        let encoded: Vec<String> = txs.iter().map(hex::encode).collect();
        encoded.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Vec<u8>>, D::Error> {
        let encoded = Vec::<String>::deserialize(deserializer)?;
        encoded
            .iter()
            .map(|s| hex::decode(s).map_err(D::Error::custom))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// A full block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: Header,
    pub data: Data,
    pub evidence: EvidenceData,
    pub last_commit: Commit,
}

impl Block {
    /// Assemble a block and fill in the body hashes of `header`.
    ///
    /// Callers set the chain-state fields of the header; `num_txs`,
    /// `last_commit_hash`, `data_hash` and `evidence_hash` are overwritten
    /// here so they always match the body.
    pub fn new(mut header: Header, data: Data, evidence: EvidenceData, last_commit: Commit) -> Self {
        header.num_txs = data.txs.len() as u64;
        header.last_commit_hash = last_commit.hash();
        header.data_hash = data.hash();
        header.evidence_hash = evidence.hash();
        Self {
            header,
            data,
            evidence,
            last_commit,
        }
    }

    /// Check internal consistency without any chain state.
    pub fn validate_basic(&self) -> Result<(), MalformedBlock> {
        let h = &self.header;

        if h.height == 0 {
            return Err(MalformedBlock::ZeroHeight);
        }
        if h.chain_id.is_empty() || h.chain_id.len() > MAX_CHAIN_ID_LENGTH {
            return Err(MalformedBlock::BadChainId);
        }

        let actual = self.data.txs.len() as u64;
        if h.num_txs != actual {
            return Err(MalformedBlock::NumTxsMismatch {
                declared: h.num_txs,
                actual,
            });
        }
        if h.total_txs < h.num_txs {
            return Err(MalformedBlock::TotalBelowNum {
                total: h.total_txs,
                num: h.num_txs,
            });
        }

        self.last_commit.validate_basic()?;
        check_body_hash("last_commit_hash", &self.last_commit.hash(), &h.last_commit_hash)?;
        check_body_hash("data_hash", &self.data.hash(), &h.data_hash)?;

        if self.evidence.len() > MAX_EVIDENCE_PER_BLOCK {
            return Err(MalformedBlock::TooMuchEvidence {
                count: self.evidence.len(),
                max: MAX_EVIDENCE_PER_BLOCK,
            });
        }
        check_body_hash("evidence_hash", &self.evidence.hash(), &h.evidence_hash)?;

        let mut seen = HashMap::with_capacity(self.evidence.len());
        for (index, evidence) in self.evidence.evidence.iter().enumerate() {
            let hash = evidence.hash();
            if let Some(&first) = seen.get(&hash) {
                return Err(MalformedBlock::DuplicateEvidence { index, first });
            }
            seen.insert(hash, index);
        }

        Ok(())
    }

    /// The id other blocks use to refer to this one.
    pub fn block_id(&self) -> BlockId {
        BlockId::from_hash(self.header.hash())
    }

    pub fn height(&self) -> u64 {
        self.header.height
    }
}

fn check_body_hash(field: &'static str, expected: &Hash, got: &Hash) -> Result<(), MalformedBlock> {
    if expected != got {
        return Err(MalformedBlock::BodyHashMismatch {
            field,
            expected: hex::encode_upper(expected),
            got: hex::encode_upper(got),
        });
    }
    Ok(())
}
