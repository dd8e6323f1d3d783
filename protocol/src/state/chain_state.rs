//! The committed chain state a candidate block is judged against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::block::{Block, Data, Header};
use crate::types::evidence::{Evidence, EvidenceData};
use crate::types::params::ConsensusParams;
use crate::types::validator::ValidatorSet;
use crate::types::vote::{BlockId, Commit};

/// Snapshot of the chain after the last committed block.
///
/// Execution produces a new snapshot for every block; validation only
/// reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainState {
    pub chain_id: String,

    /// 0 before the first block.
    pub last_block_height: u64,
    pub last_block_time: DateTime<Utc>,
    /// Zero before the first block.
    pub last_block_id: BlockId,
    pub last_block_total_tx: u64,

    /// Application state after executing the last block. The next block
    /// must declare exactly this value.
    #[serde(with = "hex::serde")]
    pub app_hash: Vec<u8>,
    pub consensus_params: ConsensusParams,
    #[serde(with = "hex::serde")]
    pub last_results_hash: Vec<u8>,

    /// Validators for the next block.
    pub validators: ValidatorSet,
    /// Validators that signed the last block's commit. Empty at genesis.
    pub last_validators: ValidatorSet,
}

impl ChainState {
    /// Height the next block must have, or `None` once the height space is
    /// used up.
    pub fn next_height(&self) -> Option<u64> {
        self.last_block_height.checked_add(1)
    }

    /// Build the block an honest proposer would produce on top of this
    /// state. Every header field that is compared against state is filled
    /// in from `self`. Counters saturate, so a state at `u64::MAX` yields a
    /// block the validator rejects.
    pub fn make_block(
        &self,
        txs: Vec<Vec<u8>>,
        last_commit: Commit,
        evidence: Vec<Evidence>,
        time: DateTime<Utc>,
    ) -> Block {
        let header = Header {
            chain_id: self.chain_id.clone(),
            height: self.last_block_height.saturating_add(1),
            time,
            num_txs: 0,
            total_txs: self.last_block_total_tx.saturating_add(txs.len() as u64),
            last_block_id: self.last_block_id,
            last_commit_hash: Default::default(),
            data_hash: Default::default(),
            evidence_hash: Default::default(),
            validators_hash: self.validators.hash(),
            consensus_hash: self.consensus_params.hash(),
            app_hash: self.app_hash.clone(),
            last_results_hash: self.last_results_hash.clone(),
        };
        Block::new(
            header,
            Data { txs },
            EvidenceData::new(evidence),
            last_commit,
        )
    }
}
