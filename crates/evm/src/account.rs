//! Account model.
//!
//! An account is identified by a 20-byte address and carries a balance, a
//! nonce, immutable code, and a word-addressed storage map. The serialized
//! shape matches the JSON fixture convention: every field is a hex string
//! (or a hex-keyed map) and every field is optional on input.

use pyrite_types::{Address, Word};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One account in the world state.
///
/// Storage keys that are absent read as zero, and storing zero removes the
/// key, so the map never holds zero values. Equality compares storage as a
/// mapping: a missing key and an explicit zero are the same thing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Account {
    /// The account's address
    pub address: Address,
    /// Balance in wei
    pub balance: Word,
    /// Number of transactions sent (or contracts created) by this account
    #[serde(with = "pyrite_types::hex::u64_hex")]
    pub nonce: u64,
    /// Contract byte code; immutable once the account is live
    #[serde(with = "pyrite_types::hex::bytes_hex")]
    pub code: Vec<u8>,
    /// Word-addressed persistent storage
    pub storage: BTreeMap<Word, Word>,
}

impl Account {
    /// Creates an empty account at the given address.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            ..Self::default()
        }
    }

    /// Creates an account with the given balance and code.
    pub fn with_parts(address: Address, balance: Word, code: Vec<u8>) -> Self {
        Self {
            address,
            balance,
            code,
            ..Self::default()
        }
    }

    /// Reads a storage slot; absent keys read as zero.
    pub fn load(&self, key: Word) -> Word {
        self.storage.get(&key).copied().unwrap_or_default()
    }

    /// Writes a storage slot; storing zero removes the key.
    pub fn store(&mut self, key: Word, value: Word) {
        if value.is_zero() {
            self.storage.remove(&key);
        } else {
            self.storage.insert(key, value);
        }
    }

    /// Whether the account carries contract code.
    pub fn has_code(&self) -> bool {
        !self.code.is_empty()
    }
}

impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        let nonzero = |storage: &BTreeMap<Word, Word>| {
            storage
                .iter()
                .filter(|(_, v)| !v.is_zero())
                .map(|(k, v)| (*k, *v))
                .collect::<Vec<_>>()
        };
        self.address == other.address
            && self.balance == other.balance
            && self.nonce == other.nonce
            && self.code == other.code
            && nonzero(&self.storage) == nonzero(&other.storage)
    }
}

impl Eq for Account {}
