//! # Votes and Commits
//!
//! A [`Vote`] is a validator's signed statement about a block at a given
//! `(height, round)`. A [`Commit`] is the ordered list of precommits that
//! certified the previous block; the next block carries it as `last_commit`.
//!
//! ## Sign bytes
//!
//! Validators sign [`Vote::sign_bytes`]: a fixed-width encoding of
//! `(chain_id, type, height, round, timestamp, block_id)` under a BLAKE3
//! domain tag. The chain id is part of the signed payload, so a vote from
//! one chain can never be replayed as a vote on another.
//!
//! ## Commit layout
//!
//! `precommits[i]` belongs to the validator at index `i` of the set that
//! signed the commit. Validators that did not precommit leave an explicit
//! `None` in their slot, which is why a commit's length must always equal
//! the size of the validator set it is checked against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::crypto::hash::{blake3_hash_multi, merkle_root_of, Hash, ZERO_HASH};
use crate::crypto::keys::{Address, PublicKey, Signature, ValidatorKey};

const VOTE_CONTEXT: &[u8] = b"meridian 2026 vote";

// ---------------------------------------------------------------------------
// BlockId
// ---------------------------------------------------------------------------

/// Header of the part set a block was gossiped in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartSetHeader {
    pub total: u32,
    #[serde(with = "hex_hash")]
    pub hash: Hash,
}

/// Identifies a block: its header hash plus the part set it travelled in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId {
    #[serde(with = "hex_hash")]
    pub hash: Hash,
    pub parts: PartSetHeader,
}

impl BlockId {
    /// A block id for `hash` with an empty part set header.
    pub fn from_hash(hash: Hash) -> Self {
        Self {
            hash,
            parts: PartSetHeader::default(),
        }
    }

    /// True for the id of "no block" (the parent of the first block, or a
    /// nil vote).
    pub fn is_zero(&self) -> bool {
        self.hash == ZERO_HASH && self.parts.total == 0 && self.parts.hash == ZERO_HASH
    }

    fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.hash);
        buf.extend_from_slice(&self.parts.total.to_le_bytes());
        buf.extend_from_slice(&self.parts.hash);
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            hex::encode_upper(self.hash),
            self.parts.total,
            hex::encode_upper(self.parts.hash)
        )
    }
}

/// Serde adapter rendering 32-byte digests as hex strings.
pub(crate) mod hex_hash {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    use crate::crypto::hash::Hash;

    pub fn serialize<S: Serializer>(hash: &Hash, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(hash))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Hash, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(D::Error::custom)?;
        bytes
            .as_slice()
            .try_into()
            .map_err(|_| D::Error::custom("expected a 32-byte hex digest"))
    }
}

// ---------------------------------------------------------------------------
// Vote
// ---------------------------------------------------------------------------

/// The two voting steps of a consensus round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Prevote,
    Precommit,
}

impl VoteType {
    fn tag(self) -> u8 {
        match self {
            VoteType::Prevote => 1,
            VoteType::Precommit => 2,
        }
    }
}

/// Errors from verifying a single vote.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VoteError {
    #[error("vote address {got} does not match public key address {expected}")]
    WrongAddress { expected: Address, got: Address },

    #[error("invalid vote signature from {0}")]
    InvalidSignature(Address),
}

/// A signed prevote or precommit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub vote_type: VoteType,
    pub height: u64,
    pub round: u32,
    pub timestamp: DateTime<Utc>,
    /// The block voted for. A zero id is a vote for nil.
    pub block_id: BlockId,
    pub validator_address: Address,
    /// Position of the voter in the validator set of `height`.
    pub validator_index: u32,
    pub signature: Signature,
}

impl Vote {
    /// Build and sign a vote.
    #[allow(clippy::too_many_arguments)]
    pub fn new_signed(
        key: &ValidatorKey,
        chain_id: &str,
        vote_type: VoteType,
        height: u64,
        round: u32,
        timestamp: DateTime<Utc>,
        block_id: BlockId,
        validator_index: u32,
    ) -> Self {
        let sign_bytes =
            canonical_sign_bytes(chain_id, vote_type, height, round, &timestamp, &block_id);
        Self {
            vote_type,
            height,
            round,
            timestamp,
            block_id,
            validator_address: key.address(),
            validator_index,
            signature: key.sign(&sign_bytes),
        }
    }

    /// The bytes a validator signs for this vote on `chain_id`.
    pub fn sign_bytes(&self, chain_id: &str) -> Vec<u8> {
        canonical_sign_bytes(
            chain_id,
            self.vote_type,
            self.height,
            self.round,
            &self.timestamp,
            &self.block_id,
        )
    }

    /// Check that `pub_key` owns this vote and signed it for `chain_id`.
    pub fn verify(&self, chain_id: &str, pub_key: &PublicKey) -> Result<(), VoteError> {
        let expected = pub_key.address();
        if self.validator_address != expected {
            return Err(VoteError::WrongAddress {
                expected,
                got: self.validator_address,
            });
        }
        if !pub_key.verify(&self.sign_bytes(chain_id), &self.signature) {
            return Err(VoteError::InvalidSignature(self.validator_address));
        }
        Ok(())
    }

    /// Digest covering every field, signature included.
    pub fn hash(&self) -> Hash {
        let body = self.sign_bytes("");
        let index = self.validator_index.to_le_bytes();
        blake3_hash_multi(&[
            body.as_slice(),
            self.validator_address.as_bytes().as_slice(),
            index.as_slice(),
            self.signature.as_bytes().as_slice(),
        ])
    }
}

fn canonical_sign_bytes(
    chain_id: &str,
    vote_type: VoteType,
    height: u64,
    round: u32,
    timestamp: &DateTime<Utc>,
    block_id: &BlockId,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(VOTE_CONTEXT.len() + chain_id.len() + 112);
    buf.extend_from_slice(VOTE_CONTEXT);
    buf.extend_from_slice(&(chain_id.len() as u64).to_le_bytes());
    buf.extend_from_slice(chain_id.as_bytes());
    buf.push(vote_type.tag());
    buf.extend_from_slice(&height.to_le_bytes());
    buf.extend_from_slice(&round.to_le_bytes());
    buf.extend_from_slice(&timestamp.timestamp().to_le_bytes());
    buf.extend_from_slice(&timestamp.timestamp_subsec_nanos().to_le_bytes());
    block_id.encode_into(&mut buf);
    buf
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// Errors from commit shape checks and voting-power verification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommitError {
    #[error("commit with precommits must name a block")]
    ZeroBlockId,

    #[error("invalid commit size: expected {expected}, got {got}")]
    WrongSize { expected: usize, got: usize },

    #[error("commit is for block {got}, expected {expected}")]
    WrongBlockId { expected: BlockId, got: BlockId },

    #[error("commit is for height {got}, expected {expected}")]
    HeightMismatch { expected: u64, got: u64 },

    #[error("precommit #{index} has height {got}, expected {expected}")]
    WrongHeight { index: usize, expected: u64, got: u64 },

    #[error("precommit #{index} has round {got}, expected {expected}")]
    WrongRound { index: usize, expected: u32, got: u32 },

    #[error("vote #{index} in commit is not a precommit")]
    WrongVoteType { index: usize },

    #[error("precommit in slot {slot} claims validator index {got}")]
    WrongValidatorIndex { slot: usize, got: u32 },

    #[error("precommit #{index}: {source}")]
    InvalidVote {
        index: usize,
        #[source]
        source: VoteError,
    },

    #[error("insufficient voting power: got {got}, needed more than {needed}")]
    InsufficientPower { got: u64, needed: u64 },
}

/// The precommits that certified a block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub block_id: BlockId,
    pub precommits: Vec<Option<Vote>>,
}

impl Commit {
    /// An empty commit, as carried by the first block of a chain.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of slots, present or absent.
    pub fn size(&self) -> usize {
        self.precommits.len()
    }

    /// True when the commit has no slots at all.
    pub fn is_empty(&self) -> bool {
        self.precommits.is_empty()
    }

    fn first_precommit(&self) -> Option<&Vote> {
        self.precommits.iter().flatten().next()
    }

    /// Height of the committed block, or 0 if no precommit is present.
    pub fn height(&self) -> u64 {
        self.first_precommit().map_or(0, |v| v.height)
    }

    /// Round the block was committed in, or 0 if no precommit is present.
    pub fn round(&self) -> u32 {
        self.first_precommit().map_or(0, |v| v.round)
    }

    /// Internal consistency: every present vote is a precommit of the same
    /// height and round, sitting in the slot of its own validator index.
    pub fn validate_basic(&self) -> Result<(), CommitError> {
        if self.is_empty() {
            return Ok(());
        }
        if self.block_id.is_zero() {
            return Err(CommitError::ZeroBlockId);
        }

        let height = self.height();
        let round = self.round();
        for (slot, vote) in self.precommits.iter().enumerate() {
            let Some(vote) = vote else { continue };
            if vote.vote_type != VoteType::Precommit {
                return Err(CommitError::WrongVoteType { index: slot });
            }
            if vote.height != height {
                return Err(CommitError::WrongHeight {
                    index: slot,
                    expected: height,
                    got: vote.height,
                });
            }
            if vote.round != round {
                return Err(CommitError::WrongRound {
                    index: slot,
                    expected: round,
                    got: vote.round,
                });
            }
            if vote.validator_index as usize != slot {
                return Err(CommitError::WrongValidatorIndex {
                    slot,
                    got: vote.validator_index,
                });
            }
        }
        Ok(())
    }

    /// Digest of the committed block id and the Merkle root over the
    /// precommit slots. Absent slots hash as empty leaves so that *which*
    /// validators signed is committed too.
    pub fn hash(&self) -> Hash {
        let leaves: Vec<Vec<u8>> = self
            .precommits
            .iter()
            .map(|slot| slot.as_ref().map(|v| v.hash().to_vec()).unwrap_or_default())
            .collect();
        let mut block_id = Vec::with_capacity(68);
        self.block_id.encode_into(&mut block_id);
        blake3_hash_multi(&[block_id.as_slice(), merkle_root_of(&leaves).as_slice()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const CHAIN: &str = "test-chain";

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    fn block_id(byte: u8) -> BlockId {
        BlockId::from_hash([byte; 32])
    }

    fn precommit(key: &ValidatorKey, height: u64, round: u32, id: BlockId, index: u32) -> Vote {
        Vote::new_signed(key, CHAIN, VoteType::Precommit, height, round, ts(), id, index)
    }

    #[test]
    fn signed_vote_verifies() {
        let key = ValidatorKey::from_seed(&[1u8; 32]);
        let vote = precommit(&key, 5, 0, block_id(9), 0);
        assert!(vote.verify(CHAIN, &key.public_key()).is_ok());
    }

    #[test]
    fn vote_does_not_verify_on_other_chain() {
        let key = ValidatorKey::from_seed(&[1u8; 32]);
        let vote = precommit(&key, 5, 0, block_id(9), 0);
        assert_eq!(
            vote.verify("other-chain", &key.public_key()),
            Err(VoteError::InvalidSignature(key.address()))
        );
    }

    #[test]
    fn vote_with_foreign_key_rejected() {
        let key = ValidatorKey::from_seed(&[1u8; 32]);
        let other = ValidatorKey::from_seed(&[2u8; 32]);
        let vote = precommit(&key, 5, 0, block_id(9), 0);
        assert!(matches!(
            vote.verify(CHAIN, &other.public_key()),
            Err(VoteError::WrongAddress { .. })
        ));
    }

    #[test]
    fn sign_bytes_cover_block_id() {
        let key = ValidatorKey::from_seed(&[1u8; 32]);
        let a = precommit(&key, 5, 0, block_id(1), 0);
        let b = precommit(&key, 5, 0, block_id(2), 0);
        assert_ne!(a.sign_bytes(CHAIN), b.sign_bytes(CHAIN));
    }

    #[test]
    fn zero_block_id() {
        assert!(BlockId::default().is_zero());
        assert!(!block_id(1).is_zero());
    }

    #[test]
    fn commit_height_and_round_skip_absent_slots() {
        let key = ValidatorKey::from_seed(&[1u8; 32]);
        let commit = Commit {
            block_id: block_id(3),
            precommits: vec![None, Some(precommit(&key, 7, 2, block_id(3), 1))],
        };
        assert_eq!(commit.size(), 2);
        assert_eq!(commit.height(), 7);
        assert_eq!(commit.round(), 2);
        assert!(commit.validate_basic().is_ok());
    }

    #[test]
    fn commit_with_mixed_heights_is_malformed() {
        let k0 = ValidatorKey::from_seed(&[1u8; 32]);
        let k1 = ValidatorKey::from_seed(&[2u8; 32]);
        let commit = Commit {
            block_id: block_id(3),
            precommits: vec![
                Some(precommit(&k0, 7, 0, block_id(3), 0)),
                Some(precommit(&k1, 8, 0, block_id(3), 1)),
            ],
        };
        assert!(matches!(
            commit.validate_basic(),
            Err(CommitError::WrongHeight { index: 1, .. })
        ));
    }

    #[test]
    fn commit_slot_must_match_validator_index() {
        let key = ValidatorKey::from_seed(&[1u8; 32]);
        let commit = Commit {
            block_id: block_id(3),
            precommits: vec![Some(precommit(&key, 7, 0, block_id(3), 4))],
        };
        assert_eq!(
            commit.validate_basic(),
            Err(CommitError::WrongValidatorIndex { slot: 0, got: 4 })
        );
    }

    #[test]
    fn prevote_in_commit_is_malformed() {
        let key = ValidatorKey::from_seed(&[1u8; 32]);
        let prevote = Vote::new_signed(&key, CHAIN, VoteType::Prevote, 7, 0, ts(), block_id(3), 0);
        let commit = Commit {
            block_id: block_id(3),
            precommits: vec![Some(prevote)],
        };
        assert_eq!(
            commit.validate_basic(),
            Err(CommitError::WrongVoteType { index: 0 })
        );
    }

    #[test]
    fn commit_hash_tracks_absent_slots() {
        let key = ValidatorKey::from_seed(&[1u8; 32]);
        let vote = precommit(&key, 7, 0, block_id(3), 0);
        let a = Commit {
            block_id: block_id(3),
            precommits: vec![Some(vote.clone()), None],
        };
        let b = Commit {
            block_id: block_id(3),
            precommits: vec![Some(vote)],
        };
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn commit_hash_covers_block_id() {
        let key = ValidatorKey::from_seed(&[1u8; 32]);
        let vote = precommit(&key, 7, 0, block_id(3), 0);
        let a = Commit {
            block_id: block_id(3),
            precommits: vec![Some(vote)],
        };
        let mut b = a.clone();
        b.block_id = block_id(4);
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn vote_json_roundtrip() {
        let key = ValidatorKey::from_seed(&[1u8; 32]);
        let vote = precommit(&key, 5, 1, block_id(9), 0);
        let json = serde_json::to_string(&vote).unwrap();
        let back: Vote = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vote);
        assert!(back.verify(CHAIN, &key.public_key()).is_ok());
    }
}
