//! # Protocol Configuration & Constants
//!
//! Every magic number in Meridian lives here. Values that a chain may tune
//! at genesis are only *defaults* here; the live values travel inside
//! [`ConsensusParams`](crate::types::params::ConsensusParams) and are
//! committed to by every block header through `consensus_hash`.
//!
//! Changing any default after a chain is live changes the consensus hash of
//! freshly generated genesis files, so treat this file like a hard fork.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// The full version string of the admission rules.
pub const PROTOCOL_VERSION: &str = "0.1.0";

// ---------------------------------------------------------------------------
// Block Timing
// ---------------------------------------------------------------------------

/// Minimum spacing between two consecutive blocks.
///
/// A block is admissible only if its timestamp is strictly after
/// `last_block_time + BLOCKS_MIN_INTERVAL - 1ns`.
pub const BLOCKS_MIN_INTERVAL: Duration = Duration::from_secs(15);

/// How far ahead of the local wall clock a block timestamp may be.
pub const BLOCKS_MAX_FUTURE: Duration = Duration::from_secs(29);

// ---------------------------------------------------------------------------
// Evidence
// ---------------------------------------------------------------------------

/// Default maximum age (in blocks) of admissible evidence.
///
/// Evidence older than this is no longer actionable: the accused validator
/// may have unbonded and its stake is not attributable anymore.
pub const DEFAULT_EVIDENCE_MAX_AGE: u64 = 100_000;

/// Upper bound on evidence items carried by one block. Each item costs one
/// historical validator-set load.
pub const MAX_EVIDENCE_PER_BLOCK: usize = 64;

// ---------------------------------------------------------------------------
// Block Size
// ---------------------------------------------------------------------------

/// Default maximum number of transactions per block.
pub const DEFAULT_MAX_BLOCK_TXS: u64 = 100_000;

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Ed25519 public key length in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Ed25519 signature length. Always 64 bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// Validator address length: the first 20 bytes of `SHA-256(pubkey)`.
pub const ADDRESS_LENGTH: usize = 20;

/// BLAKE3 digest length used for every protocol hash.
pub const HASH_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Genesis
// ---------------------------------------------------------------------------

/// Voting power given to the single validator of a freshly initialized node.
pub const DEFAULT_GENESIS_POWER: u64 = 10;

/// Maximum chain id length, in bytes.
pub const MAX_CHAIN_ID_LENGTH: usize = 50;
