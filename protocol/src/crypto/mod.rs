//! # Cryptographic Primitives for Meridian
//!
//! Everything the admission gate verifies cryptographically goes through
//! this module: Ed25519 vote signatures, validator addresses, and the BLAKE3
//! digests that block headers commit to.
//!
//! Everything here is a thin, type-safe wrapper around audited
//! implementations (`ed25519-dalek`, `blake3`, `sha2`).

pub mod hash;
pub mod keys;

pub use hash::{blake3_hash, merkle_root, merkle_root_of, Hash, ZERO_HASH};
pub use keys::{Address, KeyError, PublicKey, Signature, ValidatorKey};
