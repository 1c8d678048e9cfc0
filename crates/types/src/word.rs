//! 256-bit word arithmetic with EVM semantics.
//!
//! The EVM's native data unit is an unsigned 256-bit integer with wrapping
//! arithmetic, zero-result division by zero, and a two's-complement signed
//! view for the `SDIV`/`SMOD`/`SLT`/`SGT`/`SAR` family. [`Word`] is the
//! fixed four-limb [`primitive_types::U256`]; this module supplies the
//! semantics the raw type does not carry.

use crate::{hex, Error, Result};

pub use primitive_types::U256 as Word;
use primitive_types::U512;

/// Width of a word in bytes
pub const WORD_BYTES: usize = 32;

/// The most negative value under the signed view (`1 << 255`).
fn int_min() -> Word {
    Word::one() << 255usize
}

/// Two's-complement negation.
fn neg(x: Word) -> Word {
    (!x).overflowing_add(Word::one()).0
}

/// Whether the word is negative under the signed view.
#[inline]
pub fn is_negative(x: Word) -> bool {
    x.bit(255)
}

/// Magnitude of a word under the signed view.
fn abs(x: Word) -> Word {
    if is_negative(x) {
        neg(x)
    } else {
        x
    }
}

/// Wrapping addition mod 2²⁵⁶.
#[inline]
pub fn add(a: Word, b: Word) -> Word {
    a.overflowing_add(b).0
}

/// Wrapping subtraction mod 2²⁵⁶.
#[inline]
pub fn sub(a: Word, b: Word) -> Word {
    a.overflowing_sub(b).0
}

/// Wrapping multiplication mod 2²⁵⁶.
#[inline]
pub fn mul(a: Word, b: Word) -> Word {
    a.overflowing_mul(b).0
}

/// Unsigned division; `x / 0 = 0`.
#[inline]
pub fn div(a: Word, b: Word) -> Word {
    a.checked_div(b).unwrap_or_default()
}

/// Unsigned modulo; `x % 0 = 0`.
#[inline]
pub fn rem(a: Word, b: Word) -> Word {
    a.checked_rem(b).unwrap_or_default()
}

/// Signed division under the two's-complement view.
///
/// `x / 0 = 0`; the overflow case `INT_MIN / -1` yields `INT_MIN`.
pub fn sdiv(a: Word, b: Word) -> Word {
    if b.is_zero() {
        return Word::zero();
    }
    if a == int_min() && b == Word::MAX {
        return int_min();
    }
    let quotient = div(abs(a), abs(b));
    if is_negative(a) != is_negative(b) {
        neg(quotient)
    } else {
        quotient
    }
}

/// Signed modulo under the two's-complement view.
///
/// `x % 0 = 0`; a non-zero result takes the sign of the dividend.
pub fn smod(a: Word, b: Word) -> Word {
    if b.is_zero() {
        return Word::zero();
    }
    let magnitude = rem(abs(a), abs(b));
    if is_negative(a) && !magnitude.is_zero() {
        neg(magnitude)
    } else {
        magnitude
    }
}

/// `(a + b) % m` over a 512-bit intermediate; zero when `m` is zero.
pub fn addmod(a: Word, b: Word, m: Word) -> Word {
    if m.is_zero() {
        return Word::zero();
    }
    let sum = U512::from(a) + U512::from(b);
    low_word(sum % U512::from(m))
}

/// `(a * b) % m` over a 512-bit intermediate; zero when `m` is zero.
pub fn mulmod(a: Word, b: Word, m: Word) -> Word {
    if m.is_zero() {
        return Word::zero();
    }
    let product = U512::from(a) * U512::from(b);
    low_word(product % U512::from(m))
}

/// `base ^ exponent` mod 2²⁵⁶.
#[inline]
pub fn exp(base: Word, exponent: Word) -> Word {
    base.overflowing_pow(exponent).0
}

/// Signed less-than.
pub fn slt(a: Word, b: Word) -> bool {
    match (is_negative(a), is_negative(b)) {
        (true, false) => true,
        (false, true) => false,
        // Same sign: raw two's-complement bits order correctly
        _ => a < b,
    }
}

/// Signed greater-than.
#[inline]
pub fn sgt(a: Word, b: Word) -> bool {
    slt(b, a)
}

/// Left shift; shifts of 256 or more yield zero.
pub fn shl(shift: Word, value: Word) -> Word {
    if shift >= Word::from(256usize) {
        Word::zero()
    } else {
        value << shift.low_u64() as usize
    }
}

/// Logical right shift; shifts of 256 or more yield zero.
pub fn shr(shift: Word, value: Word) -> Word {
    if shift >= Word::from(256usize) {
        Word::zero()
    } else {
        value >> shift.low_u64() as usize
    }
}

/// Arithmetic right shift under the signed view.
///
/// Over-shifting a negative value saturates to all ones, a non-negative
/// value to zero.
pub fn sar(shift: Word, value: Word) -> Word {
    let negative = is_negative(value);
    if shift >= Word::from(256usize) {
        return if negative { Word::MAX } else { Word::zero() };
    }
    let s = shift.low_u64() as usize;
    let shifted = value >> s;
    if negative && s > 0 {
        // Fill the vacated high bits with ones
        shifted | !(Word::MAX >> s)
    } else {
        shifted
    }
}

/// Sign-extends `x` from the byte at (little-endian) index `b`.
///
/// `b ≥ 31` leaves the word unchanged.
pub fn sign_extend(b: Word, x: Word) -> Word {
    if b >= Word::from(31usize) {
        return x;
    }
    let bit = 8 * (b.low_u64() as usize) + 7;
    let mask = (Word::one() << (bit + 1)) - Word::one();
    if x.bit(bit) {
        x | !mask
    } else {
        x & mask
    }
}

/// Extracts the `i`-th big-endian byte of `x`; zero when `i ≥ 32`.
pub fn byte(i: Word, x: Word) -> Word {
    if i >= Word::from(WORD_BYTES) {
        Word::zero()
    } else {
        // `U256::byte` indexes from the least significant end
        Word::from(x.byte(WORD_BYTES - 1 - i.low_u64() as usize))
    }
}

/// Serializes the word into a 32-byte big-endian buffer.
pub fn to_big_endian(w: Word) -> [u8; WORD_BYTES] {
    let mut buf = [0u8; WORD_BYTES];
    w.to_big_endian(&mut buf);
    buf
}

/// Reads a word from up to 32 big-endian bytes, left-padding with zero.
pub fn from_big_endian(bytes: &[u8]) -> Word {
    Word::from_big_endian(bytes)
}

/// Parses a word from a hex string, tolerating odd digit counts.
pub fn from_hex_str(s: &str) -> Result<Word> {
    let bytes = hex::to_bytes(s)?;
    if bytes.len() > WORD_BYTES {
        return Err(Error::NumberTooLarge {
            digits: 2 * bytes.len(),
            bits: 256,
        });
    }
    Ok(Word::from_big_endian(&bytes))
}

/// Converts a word to `usize` if it fits.
pub fn to_usize(w: Word) -> Option<usize> {
    if w > Word::from(usize::MAX) {
        None
    } else {
        Some(w.low_u64() as usize)
    }
}

/// Truncates a 512-bit value to its low word.
fn low_word(x: U512) -> Word {
    let mut buf = [0u8; 64];
    x.to_big_endian(&mut buf);
    Word::from_big_endian(&buf[32..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(n: u64) -> Word {
        Word::from(n)
    }

    #[test]
    fn test_wrapping_arithmetic() {
        assert_eq!(add(Word::MAX, Word::one()), Word::zero());
        assert_eq!(sub(Word::zero(), Word::one()), Word::MAX);
        assert_eq!(mul(int_min(), w(2)), Word::zero());
        assert_eq!(add(w(0xed), w(0xfe)), w(0x1eb));
    }

    #[test]
    fn test_division_by_zero_is_zero() {
        assert_eq!(div(w(42), Word::zero()), Word::zero());
        assert_eq!(rem(w(42), Word::zero()), Word::zero());
        assert_eq!(sdiv(w(42), Word::zero()), Word::zero());
        assert_eq!(smod(w(42), Word::zero()), Word::zero());
    }

    #[test]
    fn test_sdiv() {
        assert_eq!(sdiv(w(10), w(2)), w(5));
        assert_eq!(sdiv(neg(w(10)), w(2)), neg(w(5)));
        assert_eq!(sdiv(w(10), neg(w(2))), neg(w(5)));
        assert_eq!(sdiv(neg(w(10)), neg(w(2))), w(5));
        // The overflow case saturates back to INT_MIN
        assert_eq!(sdiv(int_min(), Word::MAX), int_min());
    }

    #[test]
    fn test_smod_takes_dividend_sign() {
        assert_eq!(smod(w(8), w(3)), w(2));
        assert_eq!(smod(neg(w(8)), w(3)), neg(w(2)));
        assert_eq!(smod(w(8), neg(w(3))), w(2));
        assert_eq!(smod(neg(w(8)), neg(w(3))), neg(w(2)));
    }

    #[test]
    fn test_signed_comparisons() {
        assert!(slt(neg(w(1)), Word::zero()));
        assert!(slt(neg(w(2)), neg(w(1))));
        assert!(!slt(w(1), neg(w(1))));
        assert!(sgt(w(1), neg(w(1))));
        assert!(!slt(w(5), w(5)));
    }

    #[test]
    fn test_shifts() {
        assert_eq!(shl(w(4), w(1)), w(16));
        assert_eq!(shr(w(4), w(16)), w(1));
        assert_eq!(shl(w(256), Word::MAX), Word::zero());
        assert_eq!(shr(w(256), Word::MAX), Word::zero());
        assert_eq!(shl(Word::MAX, w(1)), Word::zero());
    }

    #[test]
    fn test_sar() {
        assert_eq!(sar(w(1), w(16)), w(8));
        assert_eq!(sar(w(1), neg(w(16))), neg(w(8)));
        assert_eq!(sar(w(256), neg(w(1))), Word::MAX);
        assert_eq!(sar(w(256), w(7)), Word::zero());
        assert_eq!(sar(Word::zero(), neg(w(3))), neg(w(3)));
    }

    #[test]
    fn test_sign_extend() {
        assert_eq!(sign_extend(Word::zero(), w(0xff)), Word::MAX);
        assert_eq!(sign_extend(Word::zero(), w(0x7f)), w(0x7f));
        assert_eq!(sign_extend(w(1), w(0xff)), w(0xff));
        assert_eq!(sign_extend(w(31), w(0x1234)), w(0x1234));
        assert_eq!(sign_extend(Word::MAX, w(0x1234)), w(0x1234));
        // High garbage above the extension byte is masked off
        assert_eq!(sign_extend(Word::zero(), w(0x17f)), w(0x7f));
    }

    #[test]
    fn test_byte_extraction() {
        let x = from_hex_str("0x0102").unwrap();
        assert_eq!(byte(w(31), x), w(0x02));
        assert_eq!(byte(w(30), x), w(0x01));
        assert_eq!(byte(w(0), x), Word::zero());
        assert_eq!(byte(w(32), Word::MAX), Word::zero());
        assert_eq!(byte(Word::MAX, Word::MAX), Word::zero());
    }

    #[test]
    fn test_exp_wraps() {
        assert_eq!(exp(w(2), w(10)), w(1024));
        assert_eq!(exp(w(2), w(256)), Word::zero());
        assert_eq!(exp(Word::zero(), Word::zero()), Word::one());
    }

    #[test]
    fn test_addmod_mulmod_use_wide_intermediate() {
        // 2²⁵⁶ ≡ 1 (mod 5), so (2²⁵⁶ - 1) + (2²⁵⁶ - 1) ≡ 0 (mod 5)
        assert_eq!(addmod(Word::MAX, Word::MAX, w(5)), Word::zero());
        // 2²⁵⁶ ≡ 2 (mod 7), so each operand ≡ 1 and the sum ≡ 2
        assert_eq!(addmod(Word::MAX, Word::MAX, w(7)), w(2));
        assert_eq!(mulmod(Word::MAX, Word::MAX, Word::MAX), Word::zero());
        assert_eq!(mulmod(w(10), w(10), w(8)), w(4));
        assert_eq!(addmod(w(10), w(10), Word::zero()), Word::zero());
        assert_eq!(mulmod(w(10), w(10), Word::zero()), Word::zero());
    }

    #[test]
    fn test_big_endian_round_trip() {
        let n = from_hex_str("0xab0cd01002340560000078").unwrap();
        let buf = to_big_endian(n);
        assert_eq!(buf[31], 0x78);
        assert_eq!(buf[21], 0xab);
        assert!(buf[..21].iter().all(|&b| b == 0));
        assert_eq!(from_big_endian(&buf), n);
    }

    #[test]
    fn test_big_endian_fullsize() {
        let n = from_hex_str(
            "0xa0a1a2a3a4a5a6a7a8a9aaabacadaeafb0b1b2b3b4b5b6b7b8b9babbbcbdbebf",
        )
        .unwrap();
        let buf = to_big_endian(n);
        for (i, b) in buf.iter().enumerate() {
            assert_eq!(*b, 0xa0 + i as u8);
        }
        assert_eq!(from_big_endian(&buf), n);
    }

    #[test]
    fn test_from_hex_str() {
        assert_eq!(from_hex_str("0x0").unwrap(), Word::zero());
        assert_eq!(from_hex_str("0xabc").unwrap(), w(0xabc));
        assert_eq!(from_hex_str("").unwrap(), Word::zero());
        assert!(from_hex_str(&format!("0x{}", "ff".repeat(33))).is_err());
    }

    #[test]
    fn test_to_usize() {
        assert_eq!(to_usize(w(42)), Some(42));
        assert_eq!(to_usize(Word::MAX), None);
    }
}
