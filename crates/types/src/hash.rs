//! 32-byte hash type with Keccak-256 support.
//!
//! This module provides the [`H256`] type, which represents a 32-byte hash
//! value. It includes support for Keccak-256 hashing (the original Keccak
//! padding used by Ethereum, not NIST SHA-3) over whole slices, slice
//! lists, and offset-skipped ranges.

use crate::{hex, Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

/// Size of a hash in bytes
pub const HASH_SIZE: usize = 32;

/// A 32-byte hash value.
///
/// This type is used throughout Pyrite for code hashes, storage digests and
/// log topics. It supports Keccak-256 hashing as used in Ethereum.
///
/// # Example
///
/// ```rust
/// use pyrite_types::H256;
///
/// let hash = H256::keccak256(b"hello world");
/// assert_ne!(hash, H256::ZERO);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct H256([u8; HASH_SIZE]);

impl H256 {
    /// The zero hash (all zeros).
    pub const ZERO: Self = Self([0u8; HASH_SIZE]);

    /// Creates a new hash from a 32-byte array.
    #[inline]
    pub const fn new(bytes: [u8; HASH_SIZE]) -> Self {
        Self(bytes)
    }

    /// Creates a hash from a slice.
    ///
    /// Returns an error if the slice length is not exactly 32 bytes.
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        slice.try_into().map(Self).map_err(|_| Error::InvalidLength {
            expected: HASH_SIZE,
            actual: slice.len(),
        })
    }

    /// Computes the Keccak-256 hash of the given data.
    pub fn keccak256(data: &[u8]) -> Self {
        Self(Keccak256::digest(data).into())
    }

    /// Computes the Keccak-256 hash of multiple data slices.
    ///
    /// This is more efficient than concatenating the slices first.
    pub fn keccak256_concat(parts: &[&[u8]]) -> Self {
        let mut hasher = Keccak256::new();
        for part in parts {
            hasher.update(part);
        }
        Self(hasher.finalize().into())
    }

    /// Computes the Keccak-256 hash of `data` with its first `skip` bytes
    /// omitted.
    ///
    /// A skip count at or past the end of the input hashes the empty
    /// string.
    pub fn keccak256_skip(skip: usize, data: &[u8]) -> Self {
        Self::keccak256(data.get(skip..).unwrap_or_default())
    }

    /// Returns the hash as a byte slice.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Checks if this is the zero hash.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self == &Self::ZERO
    }

    /// Creates a hash from its hex representation.
    ///
    /// The input can optionally have a `0x` prefix; anything that does not
    /// spell exactly 32 bytes is rejected.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::to_bytes(s)?;
        if bytes.len() != HASH_SIZE {
            return Err(Error::InvalidHash(format!(
                "a hash spells {} bytes, got {}",
                HASH_SIZE,
                bytes.len()
            )));
        }
        Self::from_slice(&bytes)
    }

    /// Returns the hex representation with `0x` prefix.
    pub fn to_hex(&self) -> String {
        hex::to_hex_string(&self.0)
    }
}

impl fmt::Debug for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("H256").field(&self.to_hex()).finish()
    }
}

impl fmt::Display for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for H256 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl From<[u8; HASH_SIZE]> for H256 {
    fn from(bytes: [u8; HASH_SIZE]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for H256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for H256 {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_hex().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for H256 {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Computes the Keccak-256 hash of the given data.
///
/// This is a convenience function that calls [`H256::keccak256`].
#[inline]
pub fn keccak256(data: &[u8]) -> H256 {
    H256::keccak256(data)
}

/// Computes the Keccak-256 hash of `data` with its first `skip` bytes
/// omitted.
///
/// This is a convenience function that calls [`H256::keccak256_skip`].
#[inline]
pub fn keccak256_skip(skip: usize, data: &[u8]) -> H256 {
    H256::keccak256_skip(skip, data)
}
