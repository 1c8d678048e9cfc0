//! Ethereum-compatible 20-byte address type.
//!
//! This module provides the [`Address`] type, which represents an
//! Ethereum-style address as a 20-byte array. It supports:
//!
//! - Hex encoding/decoding with `0x` prefix
//! - EIP-55 checksummed display and verification
//! - Contract-address derivation for both creation schemes
//! - Truncating conversion from and zero-extension to a 256-bit word

use crate::hash::HASH_SIZE;
use crate::word::{self, Word};
use crate::{hex, Error, Result, H256};
use rlp::{Encodable, RlpStream};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Size of an address in bytes
pub const ADDRESS_SIZE: usize = 20;

/// An Ethereum-compatible 20-byte address.
///
/// Addresses are typically displayed as 40 hex characters with a `0x`
/// prefix. This type supports EIP-55 checksummed encoding for display.
///
/// # Example
///
/// ```rust
/// use pyrite_types::Address;
///
/// let addr: Address = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed".parse().unwrap();
/// assert_eq!(
///     addr.to_checksum_string(),
///     "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
/// );
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address([u8; ADDRESS_SIZE]);

impl Address {
    /// The zero address (0x0000000000000000000000000000000000000000)
    pub const ZERO: Self = Self([0u8; ADDRESS_SIZE]);

    /// Creates a new address from a 20-byte array.
    #[inline]
    pub const fn new(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Self(bytes)
    }

    /// Creates an address from a slice.
    ///
    /// Returns an error if the slice length is not exactly 20 bytes.
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        slice.try_into().map(Self).map_err(|_| Error::InvalidLength {
            expected: ADDRESS_SIZE,
            actual: slice.len(),
        })
    }

    /// Returns the address as a byte slice.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Checks if this is the zero address.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self == &Self::ZERO
    }

    /// Computes the EIP-55 checksum encoding of this address.
    ///
    /// Each hex digit of the lowercase address body is upper-cased iff the
    /// nibble of `keccak256(lowercase_body)` at the same position is at
    /// least 8. Decimal digits have no case, so they pass through either
    /// way.
    pub fn to_checksum_string(&self) -> String {
        let body = hex::to_hex_string(&self.0);
        let digest = H256::keccak256(body[2..].as_bytes());

        let mut checksummed = String::with_capacity(body.len());
        checksummed.push_str("0x");
        for (position, digit) in body[2..].chars().enumerate() {
            let shift = if position % 2 == 0 { 4 } else { 0 };
            let nibble = (digest.as_bytes()[position / 2] >> shift) & 0x0f;
            checksummed.push(if nibble >= 8 {
                digit.to_ascii_uppercase()
            } else {
                digit
            });
        }
        checksummed
    }

    /// Checks whether `s` is a correctly checksummed address string.
    ///
    /// Accepts iff `s` equals the checksum encoding of the address it
    /// spells, verbatim (including the `0x` prefix).
    pub fn is_checksum_string(s: &str) -> bool {
        match Self::from_hex(s) {
            Ok(addr) => addr.to_checksum_string() == s,
            Err(_) => false,
        }
    }

    /// Creates an address from its hex representation.
    ///
    /// The input can optionally have a `0x` prefix; anything that does not
    /// spell exactly 20 bytes is rejected.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::to_bytes(s)?;
        if bytes.len() != ADDRESS_SIZE {
            return Err(Error::InvalidAddress(format!(
                "an address spells {} bytes, got {}",
                ADDRESS_SIZE,
                bytes.len()
            )));
        }
        Self::from_slice(&bytes)
    }

    /// The low 20 bytes of a 32-byte digest; every derivation scheme ends
    /// here.
    fn from_hash(digest: H256) -> Self {
        let mut bytes = [0u8; ADDRESS_SIZE];
        bytes.copy_from_slice(&digest.as_bytes()[HASH_SIZE - ADDRESS_SIZE..]);
        Self(bytes)
    }

    /// Truncates a 256-bit word to an address (its low 20 bytes).
    pub fn from_word(w: Word) -> Self {
        Self::from_hash(H256::new(word::to_big_endian(w)))
    }

    /// Zero-extends the address to a 256-bit word.
    pub fn to_word(&self) -> Word {
        Word::from_big_endian(&self.0)
    }

    /// Computes the contract address created by this address at the given
    /// nonce.
    ///
    /// The preimage is the RLP list `[sender, nonce]`, with the nonce
    /// encoded as an unsigned RLP integer (nonce 0 encodes as the empty
    /// string); the address is the low 20 bytes of its Keccak-256 hash.
    pub fn create_contract_address(&self, nonce: u64) -> Self {
        let mut preimage = RlpStream::new_list(2);
        preimage.append(self).append(&nonce);
        Self::from_hash(H256::keccak256(&preimage.out()))
    }

    /// Computes a contract address using the salted creation scheme.
    ///
    /// The preimage is `0xff ++ sender ++ salt ++ keccak256(init_code)`;
    /// the address is the low 20 bytes of its Keccak-256 hash.
    pub fn create2_contract_address(&self, salt: &H256, init_code_hash: &H256) -> Self {
        Self::from_hash(H256::keccak256_concat(&[
            &[0xff],
            &self.0,
            salt.as_bytes(),
            init_code_hash.as_bytes(),
        ]))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Address")
            .field(&self.to_checksum_string())
            .finish()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum_string())
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = hex::to_hex_string(&self.0);
        f.write_str(if f.alternate() { &digits } else { &digits[2..] })
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl From<[u8; ADDRESS_SIZE]> for Address {
    fn from(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_checksum_string().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

impl Encodable for Address {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.append(&self.0.to_vec());
    }
}
