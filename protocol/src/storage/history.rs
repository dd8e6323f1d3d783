//! # Validator History
//!
//! Evidence refers to past heights, so verifying it needs the validator set
//! that was active back then. [`ValidatorHistory`] is the read-only port the
//! block validator uses to ask for it. The validator never writes through
//! this trait; sets are recorded by whatever executes blocks.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use crate::types::validator::ValidatorSet;

/// Why a historical validator set could not be produced.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HistoryError {
    /// Never recorded, or pruned.
    #[error("no validator set recorded for height {height}")]
    NotFound { height: u64 },

    #[error("validator history backend failure: {0}")]
    Backend(String),
}

/// Source of the validator set active at a given height.
pub trait ValidatorHistory {
    fn load_validators(&self, height: u64) -> Result<ValidatorSet, HistoryError>;
}

impl<T: ValidatorHistory + ?Sized> ValidatorHistory for &T {
    fn load_validators(&self, height: u64) -> Result<ValidatorSet, HistoryError> {
        (**self).load_validators(height)
    }
}

impl<T: ValidatorHistory + ?Sized> ValidatorHistory for Arc<T> {
    fn load_validators(&self, height: u64) -> Result<ValidatorSet, HistoryError> {
        (**self).load_validators(height)
    }
}

/// In-memory history keyed by exact height.
///
/// Useful for tests and for embedding the validator where sets are already
/// held in memory. Heights with no entry return [`HistoryError::NotFound`];
/// there is no fallback to an earlier height.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    sets: RwLock<BTreeMap<u64, ValidatorSet>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `set` as active at `height`, replacing any previous entry.
    pub fn insert(&self, height: u64, set: ValidatorSet) {
        self.sets.write().insert(height, set);
    }

    /// Record `set` for every height in `from..=to`.
    pub fn insert_range(&self, from: u64, to: u64, set: &ValidatorSet) {
        let mut sets = self.sets.write();
        for height in from..=to {
            sets.insert(height, set.clone());
        }
    }

    /// Forget every height below `height`.
    pub fn prune_below(&self, height: u64) {
        let mut sets = self.sets.write();
        let retained = sets.split_off(&height);
        *sets = retained;
    }

    pub fn len(&self) -> usize {
        self.sets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.read().is_empty()
    }
}

impl ValidatorHistory for MemoryHistory {
    fn load_validators(&self, height: u64) -> Result<ValidatorSet, HistoryError> {
        self.sets
            .read()
            .get(&height)
            .cloned()
            .ok_or(HistoryError::NotFound { height })
    }
}
