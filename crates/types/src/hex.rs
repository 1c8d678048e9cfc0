//! Tolerant hex string I/O.
//!
//! Fixture files and user input spell byte strings loosely: the `0x` prefix
//! is optional, and an odd digit count is accepted by treating the leading
//! lone digit as the high half of byte zero (`"0xabc"` decodes to
//! `[0x0a, 0xbc]`). Encoding always produces canonical lowercase `0x…`.

use crate::{Error, Result};

/// Strips an optional `0x`/`0X` prefix.
fn strip_prefix(s: &str) -> &str {
    let s = s.strip_prefix("0x").unwrap_or(s);
    s.strip_prefix("0X").unwrap_or(s)
}

/// Decodes a hex string into bytes.
///
/// Accepts `""`, `"0x"`, and odd-length digit strings; rejects non-hex
/// characters.
///
/// # Example
///
/// ```rust
/// use pyrite_types::hex::to_bytes;
///
/// assert_eq!(to_bytes("0x").unwrap(), Vec::<u8>::new());
/// assert_eq!(to_bytes("0xabc").unwrap(), vec![0x0a, 0xbc]);
/// ```
pub fn to_bytes(s: &str) -> Result<Vec<u8>> {
    let s = strip_prefix(s);
    if s.is_empty() {
        return Ok(Vec::new());
    }
    if s.len() % 2 == 1 {
        let mut padded = String::with_capacity(s.len() + 1);
        padded.push('0');
        padded.push_str(s);
        Ok(hex::decode(padded)?)
    } else {
        Ok(hex::decode(s)?)
    }
}

/// Encodes bytes as a lowercase `0x`-prefixed hex string, two digits per
/// byte.
pub fn to_hex_string(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parses a hex string into a `u64`, tolerating the same inputs as
/// [`to_bytes`]. The empty string decodes to zero.
pub fn to_u64(s: &str) -> Result<u64> {
    let digits = strip_prefix(s);
    let bytes = to_bytes(digits)?;
    if bytes.len() > 8 {
        return Err(Error::NumberTooLarge {
            digits: digits.len(),
            bits: 64,
        });
    }
    let mut value = 0u64;
    for b in bytes {
        value = (value << 8) | u64::from(b);
    }
    Ok(value)
}

/// Serde adapter serializing `Vec<u8>` as a `0x…` hex string.
///
/// Use with `#[serde(with = "pyrite_types::hex::bytes_hex")]`.
pub mod bytes_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes bytes as lowercase `0x…`.
    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::to_hex_string(bytes))
    }

    /// Deserializes a hex string into bytes, odd digit counts included.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::to_bytes(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter serializing `u64` as a minimal `0x…` hex string (`0x66`,
/// not `0x0000000000000066`).
///
/// Use with `#[serde(with = "pyrite_types::hex::u64_hex")]`.
pub mod u64_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes the value as minimal lowercase hex.
    pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{value:#x}"))
    }

    /// Deserializes a hex string into a `u64`.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::to_u64(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_bytes_empty_forms() {
        assert_eq!(to_bytes("").unwrap(), Vec::<u8>::new());
        assert_eq!(to_bytes("0x").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_to_bytes_odd_and_even() {
        assert_eq!(to_bytes("0x0").unwrap(), vec![0x00]);
        assert_eq!(to_bytes("0x00").unwrap(), vec![0x00]);
        assert_eq!(to_bytes("0x000").unwrap(), vec![0x00, 0x00]);
        assert_eq!(to_bytes("0x0000").unwrap(), vec![0x00, 0x00]);
        assert_eq!(to_bytes("0xa").unwrap(), vec![0x0a]);
        assert_eq!(to_bytes("0xab").unwrap(), vec![0xab]);
        assert_eq!(to_bytes("0xabc").unwrap(), vec![0x0a, 0xbc]);
        assert_eq!(to_bytes("0xabcd").unwrap(), vec![0xab, 0xcd]);
    }

    #[test]
    fn test_to_bytes_no_prefix() {
        assert_eq!(to_bytes("abcd").unwrap(), vec![0xab, 0xcd]);
        assert_eq!(to_bytes("0Xabcd").unwrap(), vec![0xab, 0xcd]);
    }

    #[test]
    fn test_to_bytes_rejects_garbage() {
        assert!(to_bytes("0xzz").is_err());
        assert!(to_bytes("hello").is_err());
    }

    #[test]
    fn test_round_trip() {
        let data = vec![0x00, 0x01, 0xfe, 0xff];
        assert_eq!(to_bytes(&to_hex_string(&data)).unwrap(), data);
        assert_eq!(to_hex_string(&data), "0x0001feff");
    }

    #[test]
    fn test_to_u64() {
        assert_eq!(to_u64("0x").unwrap(), 0);
        assert_eq!(to_u64("0x0").unwrap(), 0);
        assert_eq!(to_u64("0x66").unwrap(), 0x66);
        assert_eq!(to_u64("0xffffffffffffffff").unwrap(), u64::MAX);
        assert!(to_u64("0x10000000000000000").is_err());
    }
}
