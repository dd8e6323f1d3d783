//! Rejection reasons for blocks and evidence.

use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

use crate::crypto::keys::Address;
use crate::storage::history::HistoryError;
use crate::types::block::MalformedBlock;
use crate::types::evidence::{Evidence, EvidenceVerifyError};
use crate::types::vote::{BlockId, CommitError};

/// Coarse classification of a rejection, for callers that react per class
/// (e.g. penalise the proposer for `StateDivergence`, retry for `Oracle`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionKind {
    /// The block is not internally consistent.
    Structural,
    /// Chain id, height, time, parent or tx count do not extend the chain.
    Identity,
    /// A state commitment in the header differs from the local state.
    StateDivergence,
    /// The previous block is not properly committed.
    CommitInsufficient,
    /// Some carried evidence is inadmissible.
    Evidence,
    /// Historical validator data could not be read.
    Oracle,
}

impl RejectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionKind::Structural => "structural",
            RejectionKind::Identity => "identity",
            RejectionKind::StateDivergence => "state_divergence",
            RejectionKind::CommitInsufficient => "commit_insufficient",
            RejectionKind::Evidence => "evidence",
            RejectionKind::Oracle => "oracle",
        }
    }
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a piece of evidence is inadmissible.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvidenceError {
    #[error("evidence from height {height} is too old; min height is {min_height}")]
    TooOld { height: u64, min_height: u64 },

    #[error("address {address} was not a validator at height {height}")]
    NotAValidator { address: Address, height: u64 },

    #[error(transparent)]
    Verification(#[from] EvidenceVerifyError),

    #[error("validator set at evidence height unavailable: {0}")]
    History(#[from] HistoryError),
}

/// Why a block was rejected. Each variant belongs to exactly one
/// [`RejectionKind`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlockError {
    #[error("malformed block: {0}")]
    Malformed(#[from] MalformedBlock),

    #[error("wrong block.header.chain_id: expected {expected}, got {got}")]
    WrongChainId { expected: String, got: String },

    #[error("wrong block.header.height: expected {expected}, got {got}")]
    WrongHeight { expected: u64, got: u64 },

    #[error("chain state at height {last_height} can't be extended")]
    HeightExhausted { last_height: u64 },

    #[error("block time {got} is before the earliest allowed {earliest}")]
    TimeTooEarly {
        got: DateTime<Utc>,
        earliest: DateTime<Utc>,
    },

    #[error("block time {got} is after the latest allowed {latest}")]
    TimeTooFarInFuture {
        got: DateTime<Utc>,
        latest: DateTime<Utc>,
    },

    #[error("wrong block.header.last_block_id: expected {expected}, got {got}")]
    WrongLastBlockId { expected: BlockId, got: BlockId },

    #[error("wrong block.header.total_txs: expected {expected}, got {got}")]
    WrongTotalTxs { expected: u64, got: u64 },

    #[error("wrong block.header.app_hash: expected {expected}, got {got}")]
    WrongAppHash { expected: String, got: String },

    #[error("wrong block.header.consensus_hash: expected {expected}, got {got}")]
    WrongConsensusHash { expected: String, got: String },

    #[error("wrong block.header.last_results_hash: expected {expected}, got {got}")]
    WrongLastResultsHash { expected: String, got: String },

    #[error("wrong block.header.validators_hash: expected {expected}, got {got}")]
    WrongValidatorsHash { expected: String, got: String },

    #[error("block at height 1 can't have last_commit precommits, got {precommits}")]
    UnexpectedGenesisCommit { precommits: usize },

    #[error("invalid block commit size: expected {expected}, got {got}")]
    WrongCommitSize { expected: usize, got: usize },

    #[error("invalid last commit: {0}")]
    InvalidCommit(#[source] CommitError),

    #[error("invalid evidence {evidence}: {source}")]
    InvalidEvidence {
        evidence: Box<Evidence>,
        #[source]
        source: EvidenceError,
    },

    #[error("validator history unavailable at height {height} for evidence {evidence}: {source}")]
    HistoryUnavailable {
        height: u64,
        evidence: Box<Evidence>,
        #[source]
        source: HistoryError,
    },
}

impl BlockError {
    pub fn kind(&self) -> RejectionKind {
        match self {
            BlockError::Malformed(_) => RejectionKind::Structural,
            BlockError::WrongChainId { .. }
            | BlockError::WrongHeight { .. }
            | BlockError::HeightExhausted { .. }
            | BlockError::TimeTooEarly { .. }
            | BlockError::TimeTooFarInFuture { .. }
            | BlockError::WrongLastBlockId { .. }
            | BlockError::WrongTotalTxs { .. } => RejectionKind::Identity,
            BlockError::WrongAppHash { .. }
            | BlockError::WrongConsensusHash { .. }
            | BlockError::WrongLastResultsHash { .. }
            | BlockError::WrongValidatorsHash { .. } => RejectionKind::StateDivergence,
            BlockError::UnexpectedGenesisCommit { .. }
            | BlockError::WrongCommitSize { .. }
            | BlockError::InvalidCommit(_) => RejectionKind::CommitInsufficient,
            BlockError::InvalidEvidence { .. } => RejectionKind::Evidence,
            BlockError::HistoryUnavailable { .. } => RejectionKind::Oracle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::ValidatorKey;
    use crate::types::evidence::DuplicateVoteEvidence;
    use crate::types::vote::{Vote, VoteType};
    use chrono::TimeZone;

    #[test]
    fn kinds_render_as_snake_case() {
        assert_eq!(RejectionKind::StateDivergence.to_string(), "state_divergence");
        assert_eq!(RejectionKind::Oracle.as_str(), "oracle");
    }

    #[test]
    fn hash_mismatch_message_names_both_sides() {
        let err = BlockError::WrongAppHash {
            expected: "AA".into(),
            got: "AB".into(),
        };
        assert_eq!(err.kind(), RejectionKind::StateDivergence);
        let msg = err.to_string();
        assert!(msg.contains("AA") && msg.contains("AB"));
    }

    #[test]
    fn history_failure_is_an_oracle_rejection() {
        let key = ValidatorKey::from_seed(&[3u8; 32]);
        let vote = |b: u8| {
            Vote::new_signed(
                &key,
                "test-chain",
                VoteType::Prevote,
                3,
                0,
                Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
                BlockId::from_hash([b; 32]),
                0,
            )
        };
        let evidence: Evidence = DuplicateVoteEvidence::new(key.public_key(), vote(1), vote(2)).into();

        let err = BlockError::HistoryUnavailable {
            height: 3,
            evidence: Box::new(evidence.clone()),
            source: HistoryError::NotFound { height: 3 },
        };
        assert_eq!(err.kind(), RejectionKind::Oracle);
        assert!(err.to_string().contains(&evidence.to_string()));
    }
}
