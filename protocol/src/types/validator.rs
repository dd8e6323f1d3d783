//! # Validators and Validator Sets
//!
//! A [`ValidatorSet`] is the weighted set of parties allowed to sign commits
//! at one height. Validators are kept sorted by address, which fixes both
//! the order of commit slots and the order of the set's Merkle leaves.
//!
//! ## Commit verification
//!
//! [`ValidatorSet::verify_commit`] is the voting-power threshold check: the
//! precommits for the expected block id must carry *strictly more* than two
//! thirds of the set's total voting power. Votes for a different block (or
//! for nil) must still be well-formed and correctly signed, but they do not
//! count toward the threshold.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::hash::{merkle_root_of, Hash};
use crate::crypto::keys::{Address, PublicKey};
use crate::types::vote::{BlockId, Commit, CommitError, VoteType};

/// Errors building a validator set.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidatorSetError {
    #[error("duplicate validator {0}")]
    DuplicateAddress(Address),

    #[error("validator {0} has zero voting power")]
    ZeroPower(Address),
}

/// One member of a validator set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub address: Address,
    pub pub_key: PublicKey,
    pub voting_power: u64,
}

impl Validator {
    /// A validator whose address is derived from `pub_key`.
    pub fn new(pub_key: PublicKey, voting_power: u64) -> Self {
        Self {
            address: pub_key.address(),
            pub_key,
            voting_power,
        }
    }

    fn hash_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(60);
        bytes.extend_from_slice(self.address.as_bytes());
        bytes.extend_from_slice(self.pub_key.as_bytes());
        bytes.extend_from_slice(&self.voting_power.to_le_bytes());
        bytes
    }
}

/// The validators active at one height, sorted by address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSet {
    validators: Vec<Validator>,
}

impl ValidatorSet {
    /// Build a set from any ordering of validators.
    pub fn new(mut validators: Vec<Validator>) -> Result<Self, ValidatorSetError> {
        validators.sort_by(|a, b| a.address.cmp(&b.address));
        for pair in validators.windows(2) {
            if pair[0].address == pair[1].address {
                return Err(ValidatorSetError::DuplicateAddress(pair[0].address));
            }
        }
        if let Some(v) = validators.iter().find(|v| v.voting_power == 0) {
            return Err(ValidatorSetError::ZeroPower(v.address));
        }
        Ok(Self { validators })
    }

    /// The empty set, used as `last_validators` of a genesis state.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of validators. Commits verified against this set must have
    /// exactly this many slots.
    pub fn size(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// All validators, sorted by address.
    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    /// Look up a validator and its index by address.
    pub fn get_by_address(&self, address: &Address) -> Option<(usize, &Validator)> {
        self.validators
            .binary_search_by(|v| v.address.cmp(address))
            .ok()
            .map(|idx| (idx, &self.validators[idx]))
    }

    /// Look up a validator by index.
    pub fn get_by_index(&self, index: usize) -> Option<&Validator> {
        self.validators.get(index)
    }

    /// Sum of all voting power.
    pub fn total_voting_power(&self) -> u64 {
        self.validators
            .iter()
            .fold(0u64, |acc, v| acc.saturating_add(v.voting_power))
    }

    /// Merkle root over `(address || pubkey || power)` of every validator,
    /// in address order.
    pub fn hash(&self) -> Hash {
        let leaves: Vec<Vec<u8>> = self.validators.iter().map(Validator::hash_bytes).collect();
        merkle_root_of(&leaves)
    }

    /// Verify that `commit` certifies `block_id` at `height` with more than
    /// two thirds of this set's voting power.
    pub fn verify_commit(
        &self,
        chain_id: &str,
        block_id: &BlockId,
        height: u64,
        commit: &Commit,
    ) -> Result<(), CommitError> {
        if commit.block_id != *block_id {
            return Err(CommitError::WrongBlockId {
                expected: *block_id,
                got: commit.block_id,
            });
        }
        if commit.size() != self.size() {
            return Err(CommitError::WrongSize {
                expected: self.size(),
                got: commit.size(),
            });
        }
        if commit.height() != height {
            return Err(CommitError::HeightMismatch {
                expected: height,
                got: commit.height(),
            });
        }

        let round = commit.round();
        let mut tallied: u64 = 0;

        for (index, (slot, validator)) in commit.precommits.iter().zip(&self.validators).enumerate()
        {
            let Some(vote) = slot else { continue };
            if vote.height != height {
                return Err(CommitError::WrongHeight {
                    index,
                    expected: height,
                    got: vote.height,
                });
            }
            if vote.round != round {
                return Err(CommitError::WrongRound {
                    index,
                    expected: round,
                    got: vote.round,
                });
            }
            if vote.vote_type != VoteType::Precommit {
                return Err(CommitError::WrongVoteType { index });
            }
            vote.verify(chain_id, &validator.pub_key)
                .map_err(|source| CommitError::InvalidVote { index, source })?;

            if vote.block_id == *block_id {
                tallied = tallied.saturating_add(validator.voting_power);
            }
        }

        let needed = (u128::from(self.total_voting_power()) * 2 / 3) as u64;
        if tallied > needed {
            Ok(())
        } else {
            Err(CommitError::InsufficientPower {
                got: tallied,
                needed,
            })
        }
    }
}
