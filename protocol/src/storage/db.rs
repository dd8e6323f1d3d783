//! # ValidatorStore: Persistent Validator History
//!
//! sled-backed implementation of [`ValidatorHistory`]. Validator sets change
//! rarely, so the full set is written only at the heights where it changed;
//! every other height stores a pointer to the last change.
//!
//! ## Tree Layout
//!
//! | Tree         | Key              | Value                    |
//! |--------------|------------------|--------------------------|
//! | `validators` | `height` (8B BE) | `bincode(ValidatorsInfo)` |
//!
//! Heights are stored as big-endian u64 so that sled's lexicographic
//! ordering matches numeric ordering, which makes pruning a range scan.

use serde::{Deserialize, Serialize};
use sled::{Batch, Db, Tree};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

use super::history::{HistoryError, ValidatorHistory};
use crate::types::validator::ValidatorSet;

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("no validator set recorded for height {0}")]
    NotFound(u64),

    #[error("height {height} points at {checkpoint}, which holds no validator set")]
    BrokenCheckpoint { height: u64, checkpoint: u64 },
}

pub type DbResult<T> = Result<T, DbError>;

impl From<DbError> for HistoryError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(height) => HistoryError::NotFound { height },
            other => HistoryError::Backend(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// ValidatorsInfo
// ---------------------------------------------------------------------------

/// What is stored per height.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorsInfo {
    /// Height at which the active set last changed, at or before this one.
    pub last_height_changed: u64,
    /// Present only when `last_height_changed` is this height.
    pub validator_set: Option<ValidatorSet>,
}

// ---------------------------------------------------------------------------
// ValidatorStore
// ---------------------------------------------------------------------------

/// Persistent validator history.
///
/// sled trees support concurrent readers, so a `ValidatorStore` can be
/// shared across threads via `Arc<ValidatorStore>`.
#[derive(Debug, Clone)]
pub struct ValidatorStore {
    db: Db,
    validators: Tree,
}

impl ValidatorStore {
    /// Open or create a store at the given filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// A store that lives in a temporary directory and is removed on drop.
    pub fn open_temporary() -> DbResult<Self> {
        let config = sled::Config::new().temporary(true);
        let db = config.open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> DbResult<Self> {
        let validators = db.open_tree("validators")?;
        Ok(Self { db, validators })
    }

    fn get_info(&self, height: u64) -> DbResult<Option<ValidatorsInfo>> {
        match self.validators.get(height.to_be_bytes())? {
            Some(bytes) => {
                let info: ValidatorsInfo = bincode::deserialize(&bytes)
                    .map_err(|e| DbError::Serialization(e.to_string()))?;
                Ok(Some(info))
            }
            None => Ok(None),
        }
    }

    fn put_info(&self, height: u64, info: &ValidatorsInfo) -> DbResult<()> {
        let bytes = bincode::serialize(info).map_err(|e| DbError::Serialization(e.to_string()))?;
        self.validators.insert(height.to_be_bytes(), bytes)?;
        Ok(())
    }

    /// Record `set` as the validator set active at `height`.
    ///
    /// If the set recorded at `height - 1` is the same, only a pointer to the
    /// last change is written; otherwise `height` becomes a checkpoint
    /// holding the full set.
    pub fn save(&self, height: u64, set: &ValidatorSet) -> DbResult<()> {
        let unchanged_since = match height.checked_sub(1) {
            Some(prev) => match self.get_info(prev)? {
                Some(info) => {
                    let prev_set = self.load(prev)?;
                    (prev_set.hash() == set.hash()).then_some(info.last_height_changed)
                }
                None => None,
            },
            None => None,
        };

        let info = match unchanged_since {
            Some(changed) => ValidatorsInfo {
                last_height_changed: changed,
                validator_set: None,
            },
            None => {
                debug!(height, validators = set.size(), "validator set checkpoint");
                ValidatorsInfo {
                    last_height_changed: height,
                    validator_set: Some(set.clone()),
                }
            }
        };

        self.put_info(height, &info)?;
        self.db.flush()?;
        Ok(())
    }

    fn checkpoint_of(&self, height: u64) -> DbResult<u64> {
        self.get_info(height)?
            .map(|info| info.last_height_changed)
            .ok_or(DbError::NotFound(height))
    }

    /// Load the validator set active at `height`, following the pointer to
    /// the last change when needed.
    pub fn load(&self, height: u64) -> DbResult<ValidatorSet> {
        let info = self.get_info(height)?.ok_or(DbError::NotFound(height))?;
        if let Some(set) = info.validator_set {
            return Ok(set);
        }

        let checkpoint = info.last_height_changed;
        self.get_info(checkpoint)?
            .and_then(|info| info.validator_set)
            .ok_or(DbError::BrokenCheckpoint { height, checkpoint })
    }

    /// Remove every height below `height`.
    ///
    /// Checkpoints still referenced by a retained height are kept, so every
    /// height at or above `height` stays loadable.
    pub fn prune_below(&self, height: u64) -> DbResult<usize> {
        let mut referenced = BTreeSet::new();
        for entry in self.validators.range(height.to_be_bytes()..) {
            let (_key, value) = entry?;
            let info: ValidatorsInfo =
                bincode::deserialize(&value).map_err(|e| DbError::Serialization(e.to_string()))?;
            referenced.insert(info.last_height_changed);
        }

        let mut batch = Batch::default();
        let mut removed = 0;
        for entry in self.validators.range(..height.to_be_bytes()) {
            let (key, _value) = entry?;
            let stored = u64::from_be_bytes(
                key.as_ref()
                    .try_into()
                    .map_err(|_| DbError::Serialization("invalid height key".to_string()))?,
            );
            if !referenced.contains(&stored) {
                batch.remove(key);
                removed += 1;
            }
        }
        self.validators.apply_batch(batch)?;
        self.db.flush()?;

        debug!(below = height, removed, "pruned validator history");
        Ok(removed)
    }

    /// Number of heights with an entry.
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Force a flush of all pending writes to disk.
    pub fn flush(&self) -> DbResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

impl ValidatorHistory for ValidatorStore {
    fn load_validators(&self, height: u64) -> Result<ValidatorSet, HistoryError> {
        Ok(self.load(height)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
