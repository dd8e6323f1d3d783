// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Meridian Protocol: Block Admission
//!
//! The rules a replica of the Meridian BFT chain applies before it will
//! execute a proposed block. Given the committed [`ChainState`] and a
//! candidate [`Block`], the [`BlockValidator`] either accepts the block or
//! names exactly one reason to reject it.
//!
//! A block is admitted only if it
//!
//! - is internally consistent (body hashes match the header),
//! - extends the chain by exactly one height, at a plausible time, on top
//!   of the last block id,
//! - declares the same state commitments the replica holds (app hash,
//!   consensus params, last results, validators),
//! - carries a commit for its parent signed by more than two thirds of the
//!   previous validator set, and
//! - carries only admissible evidence: recent enough, naming a validator of
//!   the height it refers to, and correctly signed.
//!
//! ## Modules
//!
//! - **crypto**: Ed25519 keys, addresses, BLAKE3/SHA-256 hashing, Merkle roots.
//! - **types**: blocks, votes and commits, validator sets, evidence, params.
//! - **state**: chain state snapshot and the block validator.
//! - **storage**: historical validator sets (in memory or sled).
//! - **genesis**: the genesis document and the state it produces.
//! - **config**: protocol constants.
//!
//! ## Example
//!
//! ```
//! use chrono::Utc;
//! use meridian_protocol::genesis::{GenesisDoc, GenesisValidator};
//! use meridian_protocol::storage::MemoryHistory;
//! use meridian_protocol::types::Commit;
//! use meridian_protocol::{BlockValidator, ValidatorKey};
//!
//! let key = ValidatorKey::generate();
//! let genesis = GenesisDoc {
//!     genesis_time: Utc::now() - chrono::Duration::minutes(1),
//!     chain_id: "doc-chain".into(),
//!     consensus_params: Default::default(),
//!     validators: vec![GenesisValidator {
//!         pub_key: key.public_key(),
//!         power: 10,
//!         name: String::new(),
//!     }],
//!     app_hash: Vec::new(),
//! };
//! let state = genesis.make_genesis_state().unwrap();
//!
//! let block = state.make_block(vec![b"tx".to_vec()], Commit::empty(), vec![], Utc::now());
//! let validator = BlockValidator::new(MemoryHistory::new());
//! assert!(validator.validate(&state, &block).is_ok());
//! ```

pub mod config;
pub mod crypto;
pub mod genesis;
pub mod state;
pub mod storage;
pub mod types;

pub use crypto::{Address, PublicKey, Signature, ValidatorKey};
pub use state::{BlockError, BlockValidator, ChainState, EvidenceError, RejectionKind};
pub use types::{Block, Evidence, ValidatorSet};
