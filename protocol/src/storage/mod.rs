//! # Storage Module
//!
//! Where historical validator sets come from.
//!
//! ```text
//! history.rs: ValidatorHistory port, HistoryError, in-memory MemoryHistory
//! db.rs     : sled-backed ValidatorStore with change-height checkpoints
//! ```
//!
//! Bincode is used for on-disk serialization. JSON is for files humans
//! look at (genesis, chain state, blocks handed to the CLI).

pub mod db;
pub mod history;

pub use db::{DbError, ValidatorStore, ValidatorsInfo};
pub use history::{HistoryError, MemoryHistory, ValidatorHistory};
