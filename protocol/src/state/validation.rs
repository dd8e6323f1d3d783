//! # Block Admission
//!
//! [`BlockValidator`] decides whether a proposed block may extend the chain
//! given the current [`ChainState`]. It does not execute transactions and
//! never mutates state; the only I/O is reading historical validator sets
//! for evidence.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! ```text
//! structure → chain id → height → time window → parent id → total txs
//!   → app hash → consensus hash → last results hash → validators hash
//!   → last commit → evidence (in declared order)
//! ```
//!
//! The fixed order means every replica reports the same reason for the same
//! bad block.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, warn};

use super::chain_state::ChainState;
use super::error::{BlockError, EvidenceError};
use crate::storage::history::ValidatorHistory;
use crate::types::block::{Block, MalformedBlock};
use crate::types::evidence::Evidence;

/// Validates candidate blocks and the evidence they carry.
///
/// Holds nothing but the validator-history port, so it is `Send + Sync`
/// whenever the history is.
#[derive(Debug, Clone)]
pub struct BlockValidator<H> {
    history: H,
}

impl<H: ValidatorHistory> BlockValidator<H> {
    pub fn new(history: H) -> Self {
        Self { history }
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    /// Validate `block` against `state` using the local wall clock for the
    /// future-time bound.
    pub fn validate(&self, state: &ChainState, block: &Block) -> Result<(), BlockError> {
        self.validate_at(state, block, Utc::now())
    }

    /// Validate `block` against `state` as if the wall clock read `now`.
    pub fn validate_at(
        &self,
        state: &ChainState,
        block: &Block,
        now: DateTime<Utc>,
    ) -> Result<(), BlockError> {
        let height = block.header.height;
        match self.check_block(state, block, now) {
            Ok(()) => {
                debug!(
                    height,
                    txs = block.data.txs.len(),
                    evidence = block.evidence.len(),
                    "block admitted"
                );
                Ok(())
            }
            Err(err) => {
                warn!(height, kind = %err.kind(), error = %err, "block rejected");
                Err(err)
            }
        }
    }

    fn check_block(
        &self,
        state: &ChainState,
        block: &Block,
        now: DateTime<Utc>,
    ) -> Result<(), BlockError> {
        let h = &block.header;
        let params = &state.consensus_params;

        block.validate_basic()?;
        if h.num_txs > params.block_size.max_txs {
            return Err(MalformedBlock::TooManyTxs {
                count: h.num_txs,
                max: params.block_size.max_txs,
            }
            .into());
        }

        if h.chain_id != state.chain_id {
            return Err(BlockError::WrongChainId {
                expected: state.chain_id.clone(),
                got: h.chain_id.clone(),
            });
        }

        let expected_height = state.next_height().ok_or(BlockError::HeightExhausted {
            last_height: state.last_block_height,
        })?;
        if h.height != expected_height {
            return Err(BlockError::WrongHeight {
                expected: expected_height,
                got: h.height,
            });
        }

        // Strictly after `last + min_interval - 1ns`, i.e. at or after
        // `last + min_interval`.
        let earliest = saturating_add(state.last_block_time, params.block_time.min_interval);
        if h.time < earliest {
            return Err(BlockError::TimeTooEarly {
                got: h.time,
                earliest,
            });
        }

        let latest = saturating_add(now, params.block_time.max_future);
        if h.time > latest {
            return Err(BlockError::TimeTooFarInFuture {
                got: h.time,
                latest,
            });
        }

        if h.last_block_id != state.last_block_id {
            return Err(BlockError::WrongLastBlockId {
                expected: state.last_block_id,
                got: h.last_block_id,
            });
        }

        let expected_total = state
            .last_block_total_tx
            .saturating_add(block.data.txs.len() as u64);
        if h.total_txs != expected_total {
            return Err(BlockError::WrongTotalTxs {
                expected: expected_total,
                got: h.total_txs,
            });
        }

        if h.app_hash != state.app_hash {
            return Err(BlockError::WrongAppHash {
                expected: hex::encode_upper(&state.app_hash),
                got: hex::encode_upper(&h.app_hash),
            });
        }

        let consensus_hash = params.hash();
        if h.consensus_hash != consensus_hash {
            return Err(BlockError::WrongConsensusHash {
                expected: hex::encode_upper(consensus_hash),
                got: hex::encode_upper(h.consensus_hash),
            });
        }

        if h.last_results_hash != state.last_results_hash {
            return Err(BlockError::WrongLastResultsHash {
                expected: hex::encode_upper(&state.last_results_hash),
                got: hex::encode_upper(&h.last_results_hash),
            });
        }

        let validators_hash = state.validators.hash();
        if h.validators_hash != validators_hash {
            return Err(BlockError::WrongValidatorsHash {
                expected: hex::encode_upper(validators_hash),
                got: hex::encode_upper(h.validators_hash),
            });
        }

        self.check_last_commit(state, block)?;

        for evidence in &block.evidence.evidence {
            match self.verify_evidence(state, evidence) {
                Ok(()) => {}
                Err(EvidenceError::History(source)) => {
                    return Err(BlockError::HistoryUnavailable {
                        height: evidence.height(),
                        evidence: Box::new(evidence.clone()),
                        source,
                    });
                }
                Err(source) => {
                    return Err(BlockError::InvalidEvidence {
                        evidence: Box::new(evidence.clone()),
                        source,
                    });
                }
            }
        }

        Ok(())
    }

    fn check_last_commit(&self, state: &ChainState, block: &Block) -> Result<(), BlockError> {
        let commit = &block.last_commit;

        if block.header.height == 1 {
            if !commit.is_empty() {
                return Err(BlockError::UnexpectedGenesisCommit {
                    precommits: commit.size(),
                });
            }
            return Ok(());
        }

        if commit.size() != state.last_validators.size() {
            return Err(BlockError::WrongCommitSize {
                expected: state.last_validators.size(),
                got: commit.size(),
            });
        }

        state
            .last_validators
            .verify_commit(
                &state.chain_id,
                &state.last_block_id,
                block.header.height - 1,
                commit,
            )
            .map_err(BlockError::InvalidCommit)
    }

    /// Check that `evidence` is recent enough, names a validator of its own
    /// height, and is correctly signed by that validator.
    pub fn verify_evidence(
        &self,
        state: &ChainState,
        evidence: &Evidence,
    ) -> Result<(), EvidenceError> {
        let height = evidence.height();
        let max_age = state.consensus_params.evidence.max_age;
        let age = state.last_block_height.saturating_sub(height);
        if age > max_age {
            return Err(EvidenceError::TooOld {
                height,
                min_height: state.last_block_height.saturating_sub(max_age),
            });
        }

        let validators = self.history.load_validators(height)?;

        let address = evidence.address();
        let Some((_, validator)) = validators.get_by_address(&address) else {
            return Err(EvidenceError::NotAValidator { address, height });
        };

        evidence.verify(&state.chain_id, &validator.pub_key)?;

        debug!(%address, height, "evidence verified");
        Ok(())
    }
}

/// `time + offset`, clamped to the largest representable instant.
fn saturating_add(time: DateTime<Utc>, offset: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(offset)
        .ok()
        .and_then(|offset| time.checked_add_signed(offset))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::ValidatorKey;
    use crate::state::error::RejectionKind;
    use crate::storage::history::{HistoryError, MemoryHistory};
    use crate::types::block::MalformedBlock;
    use crate::types::evidence::{DuplicateVoteEvidence, EvidenceVerifyError};
    use crate::types::params::ConsensusParams;
    use crate::types::validator::{Validator, ValidatorSet};
    use crate::types::vote::{BlockId, Commit, CommitError, Vote, VoteType};
    use chrono::TimeZone;

    const CHAIN: &str = "test-chain";
    const LAST_HEIGHT: u64 = 9;

    struct Fixture {
        /// Keys in validator-set order.
        keys: Vec<ValidatorKey>,
        set: ValidatorSet,
        state: ChainState,
        history: MemoryHistory,
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn fixture() -> Fixture {
        let mut keys: Vec<ValidatorKey> =
            (1..=4u8).map(|i| ValidatorKey::from_seed(&[i; 32])).collect();
        keys.sort_by_key(|k| k.address());
        let set = ValidatorSet::new(
            keys.iter()
                .map(|k| Validator::new(k.public_key(), 10))
                .collect(),
        )
        .unwrap();

        let history = MemoryHistory::new();
        history.insert_range(1, LAST_HEIGHT, &set);

        let state = ChainState {
            chain_id: CHAIN.into(),
            last_block_height: LAST_HEIGHT,
            last_block_time: t0(),
            last_block_id: BlockId::from_hash([0x42; 32]),
            last_block_total_tx: 100,
            app_hash: vec![0xAB; 32],
            consensus_params: ConsensusParams::default(),
            last_results_hash: vec![0xCD; 32],
            validators: set.clone(),
            last_validators: set.clone(),
        };

        Fixture {
            keys,
            set,
            state,
            history,
        }
    }

    fn commit(keys: &[ValidatorKey], signers: &[bool], height: u64, block_id: BlockId) -> Commit {
        let precommits = keys
            .iter()
            .zip(signers)
            .enumerate()
            .map(|(i, (k, signs))| {
                signs.then(|| {
                    Vote::new_signed(k, CHAIN, VoteType::Precommit, height, 0, t0(), block_id, i as u32)
                })
            })
            .collect();
        Commit {
            block_id,
            precommits,
        }
    }

    fn full_commit(f: &Fixture) -> Commit {
        commit(&f.keys, &[true; 4], LAST_HEIGHT, f.state.last_block_id)
    }

    fn equivocation(key: &ValidatorKey, index: u32, height: u64) -> Evidence {
        let vote = |b: u8| {
            Vote::new_signed(
                key,
                CHAIN,
                VoteType::Prevote,
                height,
                0,
                t0(),
                BlockId::from_hash([b; 32]),
                index,
            )
        };
        DuplicateVoteEvidence::new(key.public_key(), vote(1), vote(2)).into()
    }

    fn block_time() -> DateTime<Utc> {
        t0() + chrono::Duration::seconds(20)
    }

    fn valid_block(f: &Fixture) -> Block {
        f.state.make_block(
            vec![b"tx-a".to_vec(), b"tx-b".to_vec()],
            full_commit(f),
            vec![],
            block_time(),
        )
    }

    fn validate(f: &Fixture, block: &Block) -> Result<(), BlockError> {
        BlockValidator::new(&f.history).validate_at(&f.state, block, block_time())
    }

    #[test]
    fn valid_block_is_admitted() {
        let f = fixture();
        assert_eq!(validate(&f, &valid_block(&f)), Ok(()));
    }

    #[test]
    fn validation_is_idempotent() {
        let f = fixture();
        let block = valid_block(&f);
        let validator = BlockValidator::new(&f.history);
        for _ in 0..3 {
            assert!(validator.validate_at(&f.state, &block, block_time()).is_ok());
        }

        let mut bad = block;
        bad.header.height += 1;
        let first = validator.validate_at(&f.state, &bad, block_time());
        let second = validator.validate_at(&f.state, &bad, block_time());
        assert_eq!(first, second);
    }

    #[test]
    fn height_must_be_next() {
        let f = fixture();
        let mut block = valid_block(&f);
        block.header.height = LAST_HEIGHT + 2;
        let err = validate(&f, &block).unwrap_err();
        assert_eq!(
            err,
            BlockError::WrongHeight {
                expected: LAST_HEIGHT + 1,
                got: LAST_HEIGHT + 2
            }
        );
        assert_eq!(err.kind(), RejectionKind::Identity);
    }

    #[test]
    fn wrong_chain_id_rejected() {
        let f = fixture();
        let mut block = valid_block(&f);
        block.header.chain_id = "other-chain".into();
        assert!(matches!(
            validate(&f, &block),
            Err(BlockError::WrongChainId { .. })
        ));
    }

    #[test]
    fn min_interval_boundary() {
        let f = fixture();
        let validator = BlockValidator::new(&f.history);
        let min = chrono::Duration::seconds(15);
        let now = t0() + chrono::Duration::seconds(60);

        let on_time = f.state.make_block(vec![], full_commit(&f), vec![], t0() + min);
        assert!(validator.validate_at(&f.state, &on_time, now).is_ok());

        let early = f.state.make_block(
            vec![],
            full_commit(&f),
            vec![],
            t0() + min - chrono::Duration::nanoseconds(1),
        );
        let err = validator.validate_at(&f.state, &early, now).unwrap_err();
        assert!(matches!(err, BlockError::TimeTooEarly { .. }));
        assert_eq!(err.kind(), RejectionKind::Identity);
    }

    #[test]
    fn future_bound() {
        let f = fixture();
        let validator = BlockValidator::new(&f.history);
        let now = block_time();

        let at_limit = f.state.make_block(
            vec![],
            full_commit(&f),
            vec![],
            now + chrono::Duration::seconds(29),
        );
        assert!(validator.validate_at(&f.state, &at_limit, now).is_ok());

        let beyond = f.state.make_block(
            vec![],
            full_commit(&f),
            vec![],
            now + chrono::Duration::seconds(30),
        );
        assert!(matches!(
            validator.validate_at(&f.state, &beyond, now),
            Err(BlockError::TimeTooFarInFuture { .. })
        ));
    }

    #[test]
    fn wrong_last_block_id_rejected() {
        let f = fixture();
        let mut block = valid_block(&f);
        block.header.last_block_id = BlockId::from_hash([0x43; 32]);
        assert!(matches!(
            validate(&f, &block),
            Err(BlockError::WrongLastBlockId { .. })
        ));
    }

    #[test]
    fn total_txs_must_add_up() {
        let f = fixture();
        let mut block = valid_block(&f);
        block.header.total_txs += 1;
        assert_eq!(
            validate(&f, &block),
            Err(BlockError::WrongTotalTxs {
                expected: 102,
                got: 103
            })
        );
    }

    #[test]
    fn app_hash_mutation_reports_both_hashes() {
        let f = fixture();
        let mut block = valid_block(&f);
        block.header.app_hash[31] ^= 0x01;

        let err = validate(&f, &block).unwrap_err();
        assert_eq!(err.kind(), RejectionKind::StateDivergence);
        let msg = err.to_string();
        assert!(msg.contains(&hex::encode_upper(&f.state.app_hash)));
        assert!(msg.contains(&hex::encode_upper(&block.header.app_hash)));
    }

    #[test]
    fn consensus_params_divergence_rejected() {
        let f = fixture();
        let mut other = f.state.clone();
        other.consensus_params.evidence.max_age += 1;
        let block = other.make_block(vec![], full_commit(&f), vec![], block_time());
        assert!(matches!(
            validate(&f, &block),
            Err(BlockError::WrongConsensusHash { .. })
        ));
    }

    #[test]
    fn validators_hash_divergence_rejected() {
        let f = fixture();
        let mut block = valid_block(&f);
        block.header.validators_hash = [0u8; 32];
        let err = validate(&f, &block).unwrap_err();
        assert!(matches!(err, BlockError::WrongValidatorsHash { .. }));
        assert_eq!(err.kind(), RejectionKind::StateDivergence);
    }

    #[test]
    fn last_results_hash_divergence_rejected() {
        let f = fixture();
        let mut block = valid_block(&f);
        block.header.last_results_hash[0] ^= 0x01;
        let err = validate(&f, &block).unwrap_err();
        assert_eq!(
            err,
            BlockError::WrongLastResultsHash {
                expected: hex::encode_upper(&f.state.last_results_hash),
                got: hex::encode_upper(&block.header.last_results_hash),
            }
        );
        assert_eq!(err.kind(), RejectionKind::StateDivergence);
    }

    #[test]
    fn exhausted_state_rejects_every_block() {
        let mut f = fixture();
        f.state.last_block_height = u64::MAX;
        let block = valid_block(&f);
        let err = validate(&f, &block).unwrap_err();
        assert_eq!(
            err,
            BlockError::HeightExhausted {
                last_height: u64::MAX
            }
        );
        assert_eq!(err.kind(), RejectionKind::Identity);
    }

    #[test]
    fn commit_naming_another_block_rejected() {
        let f = fixture();
        let mut last_commit = full_commit(&f);
        last_commit.block_id = BlockId::from_hash([0x99; 32]);
        let block = f
            .state
            .make_block(vec![], last_commit, vec![], block_time());
        assert_eq!(
            validate(&f, &block),
            Err(BlockError::InvalidCommit(CommitError::WrongBlockId {
                expected: f.state.last_block_id,
                got: BlockId::from_hash([0x99; 32]),
            }))
        );

        // Swapping the declared block id after the fact breaks the body hash.
        let mut swapped = valid_block(&f);
        let id = swapped.block_id();
        swapped.last_commit.block_id = BlockId::from_hash([0x99; 32]);
        assert_eq!(swapped.block_id(), id);
        assert!(matches!(
            validate(&f, &swapped),
            Err(BlockError::Malformed(MalformedBlock::BodyHashMismatch {
                field: "last_commit_hash",
                ..
            }))
        ));
    }

    #[test]
    fn padded_evidence_list_rejected() {
        let f = fixture();
        let evidence: Vec<Evidence> = f.keys[..3]
            .iter()
            .enumerate()
            .map(|(i, k)| equivocation(k, i as u32, LAST_HEIGHT))
            .collect();
        let mut block = f
            .state
            .make_block(vec![], full_commit(&f), evidence, block_time());
        assert!(validate(&f, &block).is_ok());

        let id = block.block_id();
        let last = block.evidence.evidence[2].clone();
        block.evidence.evidence.push(last);
        assert_eq!(block.block_id(), id);
        assert!(matches!(
            validate(&f, &block),
            Err(BlockError::Malformed(MalformedBlock::BodyHashMismatch {
                field: "evidence_hash",
                ..
            }))
        ));
    }

    #[test]
    fn too_many_txs_is_structural() {
        let mut f = fixture();
        f.state.consensus_params.block_size.max_txs = 1;
        let block = valid_block(&f);
        let err = validate(&f, &block).unwrap_err();
        assert_eq!(
            err,
            BlockError::Malformed(MalformedBlock::TooManyTxs { count: 2, max: 1 })
        );
        assert_eq!(err.kind(), RejectionKind::Structural);
    }

    #[test]
    fn first_block_must_have_empty_commit() {
        let mut f = fixture();
        f.state.last_block_height = 0;
        f.state.last_block_id = BlockId::default();
        f.state.last_block_total_tx = 0;
        f.state.last_validators = ValidatorSet::empty();

        let empty = f.state.make_block(vec![], Commit::empty(), vec![], block_time());
        assert!(validate(&f, &empty).is_ok());

        let stray = commit(&f.keys, &[true; 4], 0, BlockId::from_hash([1u8; 32]));
        let block = f.state.make_block(vec![], stray, vec![], block_time());
        let err = validate(&f, &block).unwrap_err();
        assert_eq!(err, BlockError::UnexpectedGenesisCommit { precommits: 4 });
        assert_eq!(err.kind(), RejectionKind::CommitInsufficient);
    }

    #[test]
    fn commit_size_must_match_last_validators() {
        let f = fixture();
        let short = commit(&f.keys[..3], &[true; 3], LAST_HEIGHT, f.state.last_block_id);
        let block = f.state.make_block(vec![], short, vec![], block_time());
        assert_eq!(
            validate(&f, &block),
            Err(BlockError::WrongCommitSize {
                expected: 4,
                got: 3
            })
        );
    }

    #[test]
    fn half_the_power_is_not_a_commit() {
        let f = fixture();
        let weak = commit(
            &f.keys,
            &[true, true, false, false],
            LAST_HEIGHT,
            f.state.last_block_id,
        );
        let block = f.state.make_block(vec![], weak, vec![], block_time());
        assert_eq!(
            validate(&f, &block),
            Err(BlockError::InvalidCommit(CommitError::InsufficientPower {
                got: 20,
                needed: 26
            }))
        );
    }

    #[test]
    fn valid_evidence_is_admitted() {
        let f = fixture();
        let ev = equivocation(&f.keys[2], 2, LAST_HEIGHT - 1);
        let block = f
            .state
            .make_block(vec![], full_commit(&f), vec![ev], block_time());
        assert!(validate(&f, &block).is_ok());
    }

    #[test]
    fn evidence_age_boundary() {
        let mut f = fixture();
        f.state.consensus_params.evidence.max_age = 5;
        let validator = BlockValidator::new(&f.history);

        let oldest = equivocation(&f.keys[0], 0, LAST_HEIGHT - 5);
        assert!(validator.verify_evidence(&f.state, &oldest).is_ok());

        let too_old = equivocation(&f.keys[0], 0, LAST_HEIGHT - 6);
        assert_eq!(
            validator.verify_evidence(&f.state, &too_old),
            Err(EvidenceError::TooOld {
                height: LAST_HEIGHT - 6,
                min_height: LAST_HEIGHT - 5
            })
        );

        let block = f
            .state
            .make_block(vec![], full_commit(&f), vec![too_old], block_time());
        let err = validate(&f, &block).unwrap_err();
        assert_eq!(err.kind(), RejectionKind::Evidence);
    }

    #[test]
    fn evidence_checked_against_set_of_its_height() {
        let f = fixture();
        let accused = &f.keys[3];

        // At height 5 the accused was not yet a validator, even though it is
        // one now.
        let earlier = ValidatorSet::new(
            f.set.validators()[..3]
                .iter()
                .cloned()
                .collect(),
        )
        .unwrap();
        f.history.insert(5, earlier);

        let ev = equivocation(accused, 3, 5);
        let validator = BlockValidator::new(&f.history);
        assert_eq!(
            validator.verify_evidence(&f.state, &ev),
            Err(EvidenceError::NotAValidator {
                address: accused.address(),
                height: 5
            })
        );
        assert!(f.state.validators.get_by_address(&accused.address()).is_some());
    }

    #[test]
    fn forged_evidence_rejected() {
        let f = fixture();
        let impostor = ValidatorKey::from_seed(&[77u8; 32]);
        // Signed by the impostor but claiming a real validator's key.
        let real = &f.keys[1];
        let vote = |b: u8| {
            let mut v = Vote::new_signed(
                &impostor,
                CHAIN,
                VoteType::Prevote,
                LAST_HEIGHT,
                0,
                t0(),
                BlockId::from_hash([b; 32]),
                1,
            );
            v.validator_address = real.address();
            v
        };
        let ev: Evidence = DuplicateVoteEvidence::new(real.public_key(), vote(1), vote(2)).into();

        let block = f
            .state
            .make_block(vec![], full_commit(&f), vec![ev.clone()], block_time());
        assert!(matches!(
            validate(&f, &block),
            Err(BlockError::InvalidEvidence {
                source: EvidenceError::Verification(EvidenceVerifyError::InvalidVote { .. }),
                ..
            })
        ));
    }

    #[test]
    fn first_bad_evidence_is_reported() {
        let f = fixture();
        let stranger = ValidatorKey::from_seed(&[88u8; 32]);
        let first = equivocation(&stranger, 0, LAST_HEIGHT);
        let mut second = equivocation(&f.keys[0], 0, LAST_HEIGHT);
        let Evidence::DuplicateVote(dv) = &mut second;
        dv.vote_b = dv.vote_a.clone();

        let block = f.state.make_block(
            vec![],
            full_commit(&f),
            vec![first.clone(), second],
            block_time(),
        );
        match validate(&f, &block) {
            Err(BlockError::InvalidEvidence { evidence, source }) => {
                assert_eq!(*evidence, first);
                assert!(matches!(source, EvidenceError::NotAValidator { .. }));
            }
            other => panic!("expected invalid evidence, got {other:?}"),
        }
    }

    #[test]
    fn missing_history_is_an_oracle_failure() {
        let f = fixture();
        let ev = equivocation(&f.keys[0], 0, LAST_HEIGHT);
        let empty = MemoryHistory::new();
        let validator = BlockValidator::new(&empty);

        assert_eq!(
            validator.verify_evidence(&f.state, &ev),
            Err(EvidenceError::History(HistoryError::NotFound {
                height: LAST_HEIGHT
            }))
        );

        let block = f
            .state
            .make_block(vec![], full_commit(&f), vec![ev.clone()], block_time());
        let err = validator
            .validate_at(&f.state, &block, block_time())
            .unwrap_err();
        assert_eq!(err.kind(), RejectionKind::Oracle);
        match err {
            BlockError::HistoryUnavailable {
                height, evidence, ..
            } => {
                assert_eq!(height, LAST_HEIGHT);
                assert_eq!(*evidence, ev);
            }
            other => panic!("expected history failure, got {other:?}"),
        }
    }

    #[test]
    fn saturating_add_clamps() {
        let far = saturating_add(t0(), Duration::from_secs(u64::MAX));
        assert_eq!(far, DateTime::<Utc>::MAX_UTC);
    }
}
