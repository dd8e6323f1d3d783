//! # Genesis Document
//!
//! The JSON file every replica starts from. It fixes the chain id, the
//! consensus parameters and the first validator set; the state before the
//! first block is derived from it with [`GenesisDoc::make_genesis_state`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::config::MAX_CHAIN_ID_LENGTH;
use crate::crypto::keys::PublicKey;
use crate::state::ChainState;
use crate::types::params::{ConsensusParams, ParamsError};
use crate::types::validator::{Validator, ValidatorSet, ValidatorSetError};
use crate::types::vote::BlockId;

#[derive(Debug, Error)]
pub enum GenesisError {
    #[error("genesis file I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("genesis JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("genesis chain id is empty")]
    EmptyChainId,

    #[error("genesis chain id is longer than 50 bytes: {0}")]
    ChainIdTooLong(String),

    #[error("genesis has no validators")]
    NoValidators,

    #[error("genesis validator #{index} has zero power")]
    ZeroPower { index: usize },

    #[error("invalid genesis consensus params: {0}")]
    Params(#[from] ParamsError),

    #[error("invalid genesis validator set: {0}")]
    ValidatorSet(#[from] ValidatorSetError),
}

/// A validator listed in the genesis document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisValidator {
    pub pub_key: PublicKey,
    pub power: u64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

/// The genesis document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisDoc {
    pub genesis_time: DateTime<Utc>,
    pub chain_id: String,
    #[serde(default)]
    pub consensus_params: ConsensusParams,
    pub validators: Vec<GenesisValidator>,
    #[serde(default, with = "hex::serde")]
    pub app_hash: Vec<u8>,
}

impl GenesisDoc {
    /// Check the document before anything is derived from it.
    pub fn validate(&self) -> Result<(), GenesisError> {
        if self.chain_id.is_empty() {
            return Err(GenesisError::EmptyChainId);
        }
        if self.chain_id.len() > MAX_CHAIN_ID_LENGTH {
            return Err(GenesisError::ChainIdTooLong(self.chain_id.clone()));
        }
        self.consensus_params.validate()?;
        if self.validators.is_empty() {
            return Err(GenesisError::NoValidators);
        }
        if let Some(index) = self.validators.iter().position(|v| v.power == 0) {
            return Err(GenesisError::ZeroPower { index });
        }
        Ok(())
    }

    /// The first validator set.
    pub fn validator_set(&self) -> Result<ValidatorSet, GenesisError> {
        let validators = self
            .validators
            .iter()
            .map(|v| Validator::new(v.pub_key, v.power))
            .collect();
        Ok(ValidatorSet::new(validators)?)
    }

    /// The chain state before the first block.
    pub fn make_genesis_state(&self) -> Result<ChainState, GenesisError> {
        self.validate()?;
        Ok(ChainState {
            chain_id: self.chain_id.clone(),
            last_block_height: 0,
            last_block_time: self.genesis_time,
            last_block_id: BlockId::default(),
            last_block_total_tx: 0,
            app_hash: self.app_hash.clone(),
            consensus_params: self.consensus_params.clone(),
            last_results_hash: Vec::new(),
            validators: self.validator_set()?,
            last_validators: ValidatorSet::empty(),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, GenesisError> {
        let doc: GenesisDoc = serde_json::from_str(json)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Read and validate a genesis file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, GenesisError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write the document as pretty JSON.
    pub fn save_as<P: AsRef<Path>>(&self, path: P) -> Result<(), GenesisError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
