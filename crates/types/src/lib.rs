//! # Pyrite Types
//!
//! Primitive value types for the Pyrite EVM.
//!
//! This crate provides the fundamental types the execution engine is built
//! on:
//! - [`Address`] - Ethereum-compatible 20-byte addresses
//! - [`H256`] - 32-byte hashes with Keccak-256 support
//! - [`word`] - 256-bit word arithmetic with the EVM's wrapping and
//!   signed-view semantics
//! - [`hex`] - tolerant hex string I/O
//!
//! ## Example
//!
//! ```rust
//! use pyrite_types::{Address, H256, word::Word};
//!
//! // Parse an address from hex
//! let addr: Address = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".parse().unwrap();
//!
//! // Hash some data
//! let hash = H256::keccak256(b"hello world");
//!
//! // Wrapping 256-bit arithmetic
//! let sum = pyrite_types::word::add(Word::MAX, Word::one());
//! assert!(sum.is_zero());
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod address;
pub mod hash;
pub mod hex;
pub mod word;

// Re-export main types at crate root
pub use address::Address;
pub use hash::{keccak256, keccak256_skip, H256};
pub use word::Word;

/// Result type alias for Pyrite type operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised when constructing primitive values from external input.
///
/// These are input-validation failures at the API boundary and are distinct
/// from the execution faults the engine reports while running code.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid hex string
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] ::hex::FromHexError),

    /// Invalid length for a fixed-size type
    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Invalid address format
    #[error("invalid address format: {0}")]
    InvalidAddress(String),

    /// Invalid hash format
    #[error("invalid hash format: {0}")]
    InvalidHash(String),

    /// Hex literal wider than the target type
    #[error("number too large: {digits} hex digits exceed {bits}-bit capacity")]
    NumberTooLarge {
        /// Number of hex digits supplied
        digits: usize,
        /// Capacity of the target type in bits
        bits: usize,
    },
}
