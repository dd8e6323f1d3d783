//! # Hashing Utilities
//!
//! Every digest the admission gate compares is produced here. Two hash
//! functions, each with one job:
//!
//! - **BLAKE3**: block headers, Merkle roots over transactions, evidence
//!   and validators, consensus parameters. Anything Meridian-native.
//! - **SHA-256**: validator address derivation only, so that addresses
//!   stay recognisable to tooling that expects the classic
//!   `SHA-256(pubkey)[..20]` construction.
//!
//! Header fields are hashed with domain separation (BLAKE3 `derive_key`
//! mode) so that a Merkle leaf can never be confused with a header or a
//! parameter digest, even if the raw bytes coincide.

use sha2::{Digest, Sha256};

/// A 32-byte BLAKE3 digest.
pub type Hash = [u8; 32];

/// The all-zero digest. Used as the root of an empty Merkle tree and as the
/// hash of an absent block id (e.g. the parent of the first block).
pub const ZERO_HASH: Hash = [0u8; 32];

/// Domain tag for Merkle leaves.
const LEAF_CONTEXT: &str = "meridian 2026 merkle leaf";

/// Compute the SHA-256 hash and return a fixed-size array.
pub fn sha256_array(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Compute the BLAKE3 hash of the input data.
///
/// # Example
///
/// ```
/// use meridian_protocol::crypto::blake3_hash;
///
/// let hash = blake3_hash(b"meridian");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn blake3_hash(data: &[u8]) -> Hash {
    *blake3::hash(data).as_bytes()
}

/// Compute a domain-separated hash using BLAKE3's `derive_key` mode.
///
/// `domain_separated_hash("a", x)` and `domain_separated_hash("b", x)` never
/// collide, because the context string selects a different internal IV.
pub fn domain_separated_hash(context: &str, data: &[u8]) -> Hash {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    hasher.update(data);
    *hasher.finalize().as_bytes()
}

/// Hash multiple byte slices together without concatenation overhead.
pub fn blake3_hash_multi(parts: &[&[u8]]) -> Hash {
    let mut hasher = blake3::Hasher::new();
    for part in parts {
        hasher.update(part);
    }
    *hasher.finalize().as_bytes()
}

/// Compute a Merkle root over pre-hashed leaves.
///
/// Internal nodes are `BLAKE3(left || right)`. An odd node at the end of a
/// level is promoted to the next level unchanged, so `[a, b, c]` and
/// `[a, b, c, c]` have different roots. A single leaf is its own root. The
/// empty tree has root [`ZERO_HASH`].
pub fn merkle_root(leaves: &[Hash]) -> Hash {
    if leaves.is_empty() {
        return ZERO_HASH;
    }

    let mut current_level: Vec<Hash> = leaves.to_vec();

    while current_level.len() > 1 {
        let mut next_level = Vec::with_capacity((current_level.len() + 1) / 2);

        for chunk in current_level.chunks(2) {
            if let [left, right] = chunk {
                next_level.push(blake3_hash_multi(&[left.as_slice(), right.as_slice()]));
            } else {
                next_level.push(chunk[0]);
            }
        }

        current_level = next_level;
    }

    current_level[0]
}

/// Merkle root over arbitrary byte items.
///
/// Each item is first hashed as a domain-separated leaf. The leaf order is
/// the item order, so the root commits to ordering as well as content.
pub fn merkle_root_of<T: AsRef<[u8]>>(items: &[T]) -> Hash {
    let leaves: Vec<Hash> = items
        .iter()
        .map(|item| domain_separated_hash(LEAF_CONTEXT, item.as_ref()))
        .collect();
    merkle_root(&leaves)
}
