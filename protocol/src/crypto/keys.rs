//! # Key Management
//!
//! Ed25519 keys, signatures and validator addresses.
//!
//! Every validator signs its votes with one Ed25519 keypair. Commits and
//! equivocation evidence are both just collections of such signed votes, so
//! everything the admission gate verifies cryptographically flows through
//! [`PublicKey::verify`].
//!
//! ## Addresses
//!
//! A validator is identified on the wire by a 20-byte [`Address`], the first
//! 20 bytes of `SHA-256(pubkey)`. Validator sets are sorted by address and
//! evidence names the accused validator by address.
//!
//! ## Serialization
//!
//! Public keys and signatures serialize as lowercase hex strings, addresses
//! as uppercase hex. [`ValidatorKey`] does not implement `Serialize`; secret
//! bytes are only reachable through [`ValidatorKey::secret_key_bytes`].

use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::hash::sha256_array;
use crate::config::{ADDRESS_LENGTH, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};

/// Errors that can occur while decoding key material.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid secret key bytes")]
    InvalidSecretKey,

    #[error("invalid public key bytes: not a valid Ed25519 point")]
    InvalidPublicKey,

    #[error("invalid signature bytes: expected 64 bytes")]
    InvalidSignature,

    #[error("invalid address: expected 20 bytes")]
    InvalidAddress,

    #[error("invalid hex encoding")]
    InvalidHex,
}

/// Decode a hex string into a fixed-size array, mapping every failure to `err`.
fn decode_fixed<const N: usize>(s: &str, err: KeyError) -> Result<[u8; N], KeyError> {
    let bytes = hex::decode(s).map_err(|_| KeyError::InvalidHex)?;
    bytes.as_slice().try_into().map_err(|_| err)
}

// ---------------------------------------------------------------------------
// ValidatorKey
// ---------------------------------------------------------------------------

/// A validator signing keypair.
///
/// # Examples
///
/// ```
/// use meridian_protocol::crypto::keys::ValidatorKey;
///
/// let key = ValidatorKey::generate();
/// let sig = key.sign(b"precommit");
/// assert!(key.public_key().verify(b"precommit", &sig));
/// ```
pub struct ValidatorKey {
    signing_key: SigningKey,
}

impl ValidatorKey {
    /// Generate a fresh keypair using the OS cryptographic RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Construct a keypair deterministically from a 32-byte seed.
    ///
    /// Used by tests and fixtures that need stable validator identities.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Reconstruct a keypair from a hex-encoded secret key.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let seed: [u8; 32] = decode_fixed(hex_str, KeyError::InvalidSecretKey)?;
        Ok(Self::from_seed(&seed))
    }

    /// The public half of this keypair.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    /// The validator address derived from the public key.
    pub fn address(&self) -> Address {
        self.public_key().address()
    }

    /// Sign a message. Ed25519 signatures are deterministic.
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature {
            bytes: self.signing_key.sign(message).to_bytes(),
        }
    }

    /// Export the raw 32-byte secret key. Never log the result.
    pub fn secret_key_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl Clone for ValidatorKey {
    fn clone(&self) -> Self {
        Self::from_seed(&self.signing_key.to_bytes())
    }
}

impl fmt::Debug for ValidatorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValidatorKey(pub={})", self.public_key())
    }
}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// An Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublicKey {
    bytes: [u8; PUBLIC_KEY_LENGTH],
}

impl PublicKey {
    /// Create a public key from a byte slice, checking that it is a valid
    /// curve point.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; PUBLIC_KEY_LENGTH] =
            slice.try_into().map_err(|_| KeyError::InvalidPublicKey)?;
        VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self { bytes })
    }

    /// Parse a hex-encoded public key.
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes: [u8; PUBLIC_KEY_LENGTH] = decode_fixed(s, KeyError::InvalidPublicKey)?;
        Self::try_from_slice(&bytes)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.bytes
    }

    /// Validator address: first 20 bytes of `SHA-256(pubkey)`.
    pub fn address(&self) -> Address {
        let digest = sha256_array(&self.bytes);
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes.copy_from_slice(&digest[..ADDRESS_LENGTH]);
        Address(bytes)
    }

    /// Verify a signature against this public key.
    ///
    /// Uses strict verification, so malleable and small-order edge cases
    /// are rejected.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let dalek_sig = DalekSignature::from_bytes(&signature.bytes);
        verifying_key.verify_strict(message, &dalek_sig).is_ok()
    }

    /// Hex-encoded representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl TryFrom<String> for PublicKey {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<PublicKey> for String {
    fn from(key: PublicKey) -> Self {
        key.to_hex()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", &self.to_hex()[..16])
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// An Ed25519 signature. Always exactly 64 bytes.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Signature {
    bytes: [u8; SIGNATURE_LENGTH],
}

impl Signature {
    /// Create a signature from its raw representation.
    pub fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self { bytes }
    }

    /// Raw signature bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.bytes
    }

    /// Hex-encoded signature, 128 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Parse a hex-encoded signature.
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        Ok(Self {
            bytes: decode_fixed(s, KeyError::InvalidSignature)?,
        })
    }
}

impl TryFrom<String> for Signature {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Signature> for String {
    fn from(sig: Signature) -> Self {
        sig.to_hex()
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = self.to_hex();
        write!(f, "Signature({}...{})", &hex_str[..8], &hex_str[120..])
    }
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 20-byte validator address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// Wrap raw address bytes.
    pub fn from_bytes(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Raw address bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Parse a hex-encoded address.
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        Ok(Self(decode_fixed(s, KeyError::InvalidAddress)?))
    }

    /// Uppercase hex, the conventional rendering in logs and errors.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }
}

impl TryFrom<String> for Address {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.to_hex()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_verify_roundtrip() {
        let key = ValidatorKey::generate();
        let sig = key.sign(b"precommit");
        assert!(key.public_key().verify(b"precommit", &sig));
    }

    #[test]
    fn wrong_message_fails_verification() {
        let key = ValidatorKey::generate();
        let sig = key.sign(b"correct message");
        assert!(!key.public_key().verify(b"wrong message", &sig));
    }

    #[test]
    fn wrong_key_fails_verification() {
        let k1 = ValidatorKey::generate();
        let k2 = ValidatorKey::generate();
        let sig = k1.sign(b"message");
        assert!(!k2.public_key().verify(b"message", &sig));
    }

    #[test]
    fn deterministic_from_seed() {
        let a = ValidatorKey::from_seed(&[42u8; 32]);
        let b = ValidatorKey::from_seed(&[42u8; 32]);
        assert_eq!(a.public_key(), b.public_key());
        assert_eq!(a.address(), b.address());
    }

    #[test]
    fn secret_key_hex_roundtrip() {
        let key = ValidatorKey::generate();
        let restored = ValidatorKey::from_hex(&hex::encode(key.secret_key_bytes())).unwrap();
        assert_eq!(key.public_key(), restored.public_key());
    }

    #[test]
    fn invalid_hex_rejected() {
        assert_eq!(
            ValidatorKey::from_hex("deadbeef").unwrap_err(),
            KeyError::InvalidSecretKey
        );
        assert_eq!(
            ValidatorKey::from_hex("not-hex").unwrap_err(),
            KeyError::InvalidHex
        );
        assert!(Address::from_hex("abcd").is_err());
    }

    #[test]
    fn address_is_sha256_prefix() {
        let key = ValidatorKey::from_seed(&[7u8; 32]);
        let pk = key.public_key();
        let digest = sha256_array(pk.as_bytes());
        assert_eq!(pk.address().as_bytes(), &digest[..ADDRESS_LENGTH]);
    }

    #[test]
    fn public_key_serializes_as_hex_string() {
        let pk = ValidatorKey::from_seed(&[1u8; 32]).public_key();
        let json = serde_json::to_string(&pk).unwrap();
        assert_eq!(json, format!("\"{}\"", pk.to_hex()));
        let back: PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pk);
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let key = ValidatorKey::generate();
        let debug_str = format!("{:?}", key);
        assert!(debug_str.starts_with("ValidatorKey(pub="));
        assert!(!debug_str.contains(&hex::encode(key.secret_key_bytes())));
    }
}
