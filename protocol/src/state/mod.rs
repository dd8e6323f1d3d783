//! # State Module
//!
//! The chain state snapshot and the rules a block must satisfy to extend it.
//!
//! ```text
//! chain_state.rs: ChainState, block construction for proposers
//! validation.rs : BlockValidator: block admission and evidence checks
//! error.rs      : BlockError, EvidenceError, RejectionKind
//! ```

pub mod chain_state;
pub mod error;
pub mod validation;

pub use chain_state::ChainState;
pub use error::{BlockError, EvidenceError, RejectionKind};
pub use validation::BlockValidator;
