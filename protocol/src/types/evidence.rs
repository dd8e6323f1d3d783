//! # Evidence of Byzantine Behaviour
//!
//! Evidence is a self-contained proof that a validator misbehaved. It is
//! submitted inside a later block and always refers to a *past* height,
//! so the admission gate checks it against the validator set of that past
//! height rather than the current one.
//!
//! Every kind of evidence exposes the same three capabilities:
//!
//! - [`Evidence::height`]: the height the misbehaviour happened at.
//! - [`Evidence::address`]: the accused validator.
//! - [`Evidence::verify`]: internal consistency plus signatures, checked
//!   against the accused validator's key at that height.
//!
//! Only duplicate votes (equivocation) are defined today. New kinds are new
//! enum variants; the `match` in each capability forces them to be handled.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::crypto::hash::{blake3_hash_multi, merkle_root_of, Hash};
use crate::crypto::keys::{Address, PublicKey};
use crate::types::vote::{Vote, VoteError, VoteType};

/// Why a piece of evidence failed its own consistency or signature checks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvidenceVerifyError {
    #[error("votes are for different height/round/type: {a:?} vs {b:?}")]
    DifferentStep {
        a: (u64, u32, VoteType),
        b: (u64, u32, VoteType),
    },

    #[error("votes come from different validators: {a} vs {b}")]
    DifferentValidators { a: Address, b: Address },

    #[error("votes carry different validator indices: {a} vs {b}")]
    DifferentIndices { a: u32, b: u32 },

    #[error("votes are for the same block, nothing conflicts")]
    NoConflict,

    #[error("evidence names key {got}, but the validator key at that height is {expected}")]
    KeyMismatch { expected: PublicKey, got: PublicKey },

    #[error("vote {which}: {source}")]
    InvalidVote {
        which: char,
        #[source]
        source: VoteError,
    },
}

// ---------------------------------------------------------------------------
// DuplicateVoteEvidence
// ---------------------------------------------------------------------------

/// Two votes by the same validator for different blocks at the same
/// height, round and step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateVoteEvidence {
    pub pub_key: PublicKey,
    pub vote_a: Vote,
    pub vote_b: Vote,
}

impl DuplicateVoteEvidence {
    /// Build duplicate-vote evidence. The votes are stored in block-id
    /// order so that the same equivocation always hashes the same way,
    /// whichever order a reporter saw them in.
    pub fn new(pub_key: PublicKey, vote_a: Vote, vote_b: Vote) -> Self {
        let (vote_a, vote_b) = if vote_a.block_id.hash <= vote_b.block_id.hash {
            (vote_a, vote_b)
        } else {
            (vote_b, vote_a)
        };
        Self {
            pub_key,
            vote_a,
            vote_b,
        }
    }

    fn verify(&self, chain_id: &str, pub_key: &PublicKey) -> Result<(), EvidenceVerifyError> {
        let (a, b) = (&self.vote_a, &self.vote_b);

        if a.height != b.height || a.round != b.round || a.vote_type != b.vote_type {
            return Err(EvidenceVerifyError::DifferentStep {
                a: (a.height, a.round, a.vote_type),
                b: (b.height, b.round, b.vote_type),
            });
        }
        if a.validator_address != b.validator_address {
            return Err(EvidenceVerifyError::DifferentValidators {
                a: a.validator_address,
                b: b.validator_address,
            });
        }
        if a.validator_index != b.validator_index {
            return Err(EvidenceVerifyError::DifferentIndices {
                a: a.validator_index,
                b: b.validator_index,
            });
        }
        if a.block_id == b.block_id {
            return Err(EvidenceVerifyError::NoConflict);
        }
        if self.pub_key != *pub_key {
            return Err(EvidenceVerifyError::KeyMismatch {
                expected: *pub_key,
                got: self.pub_key,
            });
        }

        a.verify(chain_id, pub_key)
            .map_err(|source| EvidenceVerifyError::InvalidVote { which: 'A', source })?;
        b.verify(chain_id, pub_key)
            .map_err(|source| EvidenceVerifyError::InvalidVote { which: 'B', source })?;
        Ok(())
    }

    fn hash(&self) -> Hash {
        let a = self.vote_a.hash();
        let b = self.vote_b.hash();
        blake3_hash_multi(&[
            b"duplicate-vote".as_slice(),
            self.pub_key.as_bytes().as_slice(),
            a.as_slice(),
            b.as_slice(),
        ])
    }
}

// ---------------------------------------------------------------------------
// Evidence
// ---------------------------------------------------------------------------

/// Any admissible proof of validator misbehaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Evidence {
    DuplicateVote(DuplicateVoteEvidence),
}

impl Evidence {
    /// Height at which the misbehaviour occurred.
    pub fn height(&self) -> u64 {
        match self {
            Evidence::DuplicateVote(ev) => ev.vote_a.height,
        }
    }

    /// Address of the accused validator.
    pub fn address(&self) -> Address {
        match self {
            Evidence::DuplicateVote(ev) => ev.vote_a.validator_address,
        }
    }

    /// Check internal consistency and that `pub_key` signed the conflicting
    /// statements on `chain_id`.
    pub fn verify(&self, chain_id: &str, pub_key: &PublicKey) -> Result<(), EvidenceVerifyError> {
        match self {
            Evidence::DuplicateVote(ev) => ev.verify(chain_id, pub_key),
        }
    }

    /// Content digest, used for the block's `evidence_hash`.
    pub fn hash(&self) -> Hash {
        match self {
            Evidence::DuplicateVote(ev) => ev.hash(),
        }
    }
}

impl fmt::Display for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evidence::DuplicateVote(ev) => write!(
                f,
                "DuplicateVote{{validator: {}, height: {}, round: {}, blocks: {} / {}}}",
                ev.vote_a.validator_address,
                ev.vote_a.height,
                ev.vote_a.round,
                ev.vote_a.block_id,
                ev.vote_b.block_id
            ),
        }
    }
}

impl From<DuplicateVoteEvidence> for Evidence {
    fn from(ev: DuplicateVoteEvidence) -> Self {
        Evidence::DuplicateVote(ev)
    }
}

/// The evidence section of a block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceData {
    pub evidence: Vec<Evidence>,
}

impl EvidenceData {
    pub fn new(evidence: Vec<Evidence>) -> Self {
        Self { evidence }
    }

    pub fn len(&self) -> usize {
        self.evidence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evidence.is_empty()
    }

    /// Merkle root over the evidence hashes, in declared order.
    pub fn hash(&self) -> Hash {
        let leaves: Vec<Hash> = self.evidence.iter().map(Evidence::hash).collect();
        merkle_root_of(&leaves)
    }
}
