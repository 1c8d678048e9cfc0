//! World state and the copy-on-write view used for sub-frame isolation.
//!
//! The engine works against the object-safe [`WorldState`] trait. The
//! reference implementation is the in-memory [`InMemoryState`]; alternative
//! backends implement the same trait. Every frame the engine enters runs on
//! a [`StateView`] layered over its parent's state: reads fall through,
//! the first mutation copies the account into the view, and the whole
//! delta is merged on success or dropped on failure.

use crate::account::Account;
use pyrite_types::{Address, Word};
use std::collections::HashMap;
use tracing::trace;

/// Mutable mapping from address to account.
pub trait WorldState {
    /// Reads an account without creating it.
    fn get(&self, addr: &Address) -> Option<&Account>;

    /// Returns a mutable account, creating an empty one on first touch.
    fn get_mut(&mut self, addr: Address) -> &mut Account;

    /// Removes an account.
    fn remove(&mut self, addr: &Address);

    /// Whether an account exists at the address.
    fn exists(&self, addr: &Address) -> bool {
        self.get(addr).is_some()
    }

    /// Increments an account's nonce, writing through every buffered
    /// layer down to the underlying state.
    ///
    /// Unlike a plain mutation through [`WorldState::get_mut`], the bump
    /// survives even when the view it was issued against is discarded.
    /// Contract creation relies on this: a colliding derivation still
    /// burns the creator's nonce although the creating frame fails.
    fn increment_nonce(&mut self, addr: Address) {
        self.get_mut(addr).nonce += 1;
    }

    /// Creates (or resets) an account with the given balance and code.
    fn create(&mut self, addr: Address, balance: Word, code: Vec<u8>) -> &mut Account {
        let account = self.get_mut(addr);
        *account = Account::with_parts(addr, balance, code);
        account
    }
}

/// In-memory reference implementation of [`WorldState`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryState {
    accounts: HashMap<Address, Account>,
}

impl InMemoryState {
    /// Creates an empty world state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accounts.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the state holds no accounts.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Iterates over all accounts.
    pub fn accounts(&self) -> impl Iterator<Item = (&Address, &Account)> {
        self.accounts.iter()
    }
}

impl WorldState for InMemoryState {
    fn get(&self, addr: &Address) -> Option<&Account> {
        self.accounts.get(addr)
    }

    fn get_mut(&mut self, addr: Address) -> &mut Account {
        self.accounts
            .entry(addr)
            .or_insert_with(|| Account::new(addr))
    }

    fn remove(&mut self, addr: &Address) {
        self.accounts.remove(addr);
    }
}

/// A delta of account changes layered over a parent state.
///
/// `None` entries are tombstones left by [`WorldState::remove`]. Dropping
/// the view discards the delta; [`StateView::commit`] merges it into the
/// parent.
pub struct StateView<'a> {
    base: &'a mut dyn WorldState,
    writes: HashMap<Address, Option<Account>>,
}

impl<'a> StateView<'a> {
    /// Creates an empty view over the given parent state.
    pub fn new(base: &'a mut dyn WorldState) -> Self {
        Self {
            base,
            writes: HashMap::new(),
        }
    }

    /// Number of accounts touched by this view.
    pub fn touched(&self) -> usize {
        self.writes.len()
    }

    /// Merges every buffered change into the parent state.
    pub fn commit(self) {
        trace!(accounts = self.writes.len(), "committing state view");
        for (addr, slot) in self.writes {
            match slot {
                Some(account) => *self.base.get_mut(addr) = account,
                None => self.base.remove(&addr),
            }
        }
    }
}

impl WorldState for StateView<'_> {
    fn get(&self, addr: &Address) -> Option<&Account> {
        match self.writes.get(addr) {
            Some(slot) => slot.as_ref(),
            None => self.base.get(addr),
        }
    }

    fn get_mut(&mut self, addr: Address) -> &mut Account {
        let Self { base, writes } = self;
        writes
            .entry(addr)
            .or_insert_with(|| base.get(&addr).cloned())
            // A vacant base slot or a tombstone both yield a fresh account
            .get_or_insert_with(|| Account::new(addr))
    }

    fn remove(&mut self, addr: &Address) {
        self.writes.insert(*addr, None);
    }

    fn increment_nonce(&mut self, addr: Address) {
        // Keep any buffered copy in step, then recurse to the base; a
        // later commit overwrites the base with the already-bumped copy,
        // so the account gains exactly one nonce either way
        if let Some(Some(account)) = self.writes.get_mut(&addr) {
            account.nonce += 1;
        }
        self.base.increment_nonce(addr);
    }
}

/// Moves `value` from one balance to another.
///
/// Returns `false` (without touching the state) when the sender cannot
/// cover the amount. A zero-value transfer succeeds without materializing
/// either account.
pub fn transfer(state: &mut dyn WorldState, from: Address, to: Address, value: Word) -> bool {
    if value.is_zero() {
        return true;
    }
    let available = state.get(&from).map(|a| a.balance).unwrap_or_default();
    if available < value {
        trace!(%from, %to, "transfer refused: insufficient balance");
        return false;
    }
    state.get_mut(from).balance = available - value;
    let recipient = state.get_mut(to);
    recipient.balance = recipient.balance.saturating_add(value);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address::from([b; 20])
    }

    #[test]
    fn test_get_mut_creates_on_touch() {
        let mut state = InMemoryState::new();
        assert!(!state.exists(&addr(1)));

        state.get_mut(addr(1)).balance = Word::from(5u64);
        assert!(state.exists(&addr(1)));
        assert_eq!(state.get(&addr(1)).unwrap().balance, Word::from(5u64));
    }

    #[test]
    fn test_create_resets_existing() {
        let mut state = InMemoryState::new();
        state.get_mut(addr(1)).nonce = 9;
        state.create(addr(1), Word::from(10u64), vec![0x00]);

        let account = state.get(&addr(1)).unwrap();
        assert_eq!(account.nonce, 0);
        assert_eq!(account.balance, Word::from(10u64));
        assert_eq!(account.code, vec![0x00]);
    }

    #[test]
    fn test_view_reads_fall_through() {
        let mut state = InMemoryState::new();
        state.create(addr(1), Word::from(7u64), vec![]);

        let view = StateView::new(&mut state);
        assert_eq!(view.get(&addr(1)).unwrap().balance, Word::from(7u64));
        assert!(view.get(&addr(2)).is_none());
    }

    #[test]
    fn test_view_discards_on_drop() {
        let mut state = InMemoryState::new();
        state.create(addr(1), Word::from(7u64), vec![]);

        {
            let mut view = StateView::new(&mut state);
            view.get_mut(addr(1)).balance = Word::from(100u64);
            view.get_mut(addr(2)).nonce = 3;
            view.remove(&addr(1));
        }

        assert_eq!(state.get(&addr(1)).unwrap().balance, Word::from(7u64));
        assert!(!state.exists(&addr(2)));
    }

    #[test]
    fn test_view_commit_merges() {
        let mut state = InMemoryState::new();
        state.create(addr(1), Word::from(7u64), vec![]);

        let mut view = StateView::new(&mut state);
        view.get_mut(addr(1)).balance = Word::from(100u64);
        view.get_mut(addr(2)).nonce = 3;
        view.commit();

        assert_eq!(state.get(&addr(1)).unwrap().balance, Word::from(100u64));
        assert_eq!(state.get(&addr(2)).unwrap().nonce, 3);
    }

    #[test]
    fn test_view_tombstone_then_touch_yields_fresh_account() {
        let mut state = InMemoryState::new();
        state.create(addr(1), Word::from(7u64), vec![0x01]);

        let mut view = StateView::new(&mut state);
        view.remove(&addr(1));
        assert!(!view.exists(&addr(1)));

        let account = view.get_mut(addr(1));
        assert!(account.code.is_empty());
        assert!(account.balance.is_zero());
    }

    #[test]
    fn test_nested_views() {
        let mut state = InMemoryState::new();
        state.create(addr(1), Word::from(1u64), vec![]);

        let mut outer = StateView::new(&mut state);
        outer.get_mut(addr(1)).balance = Word::from(2u64);

        {
            let mut inner = StateView::new(&mut outer);
            inner.get_mut(addr(1)).balance = Word::from(3u64);
            // Dropped without commit
        }
        assert_eq!(outer.get(&addr(1)).unwrap().balance, Word::from(2u64));

        let mut inner = StateView::new(&mut outer);
        inner.get_mut(addr(1)).balance = Word::from(4u64);
        inner.commit();
        outer.commit();

        assert_eq!(state.get(&addr(1)).unwrap().balance, Word::from(4u64));
    }

    #[test]
    fn test_increment_nonce_survives_discarded_view() {
        let mut state = InMemoryState::new();
        state.create(addr(1), Word::zero(), vec![]);

        {
            let mut view = StateView::new(&mut state);
            view.get_mut(addr(1)).balance = Word::from(9u64);
            view.increment_nonce(addr(1));
            assert_eq!(view.get(&addr(1)).unwrap().nonce, 1);
            // Dropped without commit
        }

        // The balance write died with the view; the nonce bump did not
        let account = state.get(&addr(1)).unwrap();
        assert_eq!(account.nonce, 1);
        assert!(account.balance.is_zero());
    }

    #[test]
    fn test_increment_nonce_not_doubled_by_commit() {
        let mut state = InMemoryState::new();
        state.create(addr(1), Word::zero(), vec![]);

        let mut view = StateView::new(&mut state);
        view.get_mut(addr(1)).balance = Word::from(9u64);
        view.increment_nonce(addr(1));
        view.commit();

        let account = state.get(&addr(1)).unwrap();
        assert_eq!(account.nonce, 1);
        assert_eq!(account.balance, Word::from(9u64));
    }

    #[test]
    fn test_increment_nonce_through_nested_views() {
        let mut state = InMemoryState::new();
        state.create(addr(1), Word::zero(), vec![]);

        let mut outer = StateView::new(&mut state);
        {
            let mut inner = StateView::new(&mut outer);
            inner.increment_nonce(addr(1));
            // Dropped without commit
        }
        assert_eq!(outer.get(&addr(1)).unwrap().nonce, 1);
        drop(outer);
        assert_eq!(state.get(&addr(1)).unwrap().nonce, 1);
    }

    #[test]
    fn test_transfer() {
        let mut state = InMemoryState::new();
        state.create(addr(1), Word::from(10u64), vec![]);

        assert!(transfer(&mut state, addr(1), addr(2), Word::from(4u64)));
        assert_eq!(state.get(&addr(1)).unwrap().balance, Word::from(6u64));
        assert_eq!(state.get(&addr(2)).unwrap().balance, Word::from(4u64));

        assert!(!transfer(&mut state, addr(1), addr(2), Word::from(100u64)));
        assert_eq!(state.get(&addr(1)).unwrap().balance, Word::from(6u64));

        // Zero-value transfers do not materialize accounts
        assert!(transfer(&mut state, addr(3), addr(4), Word::zero()));
        assert!(!state.exists(&addr(3)));
        assert!(!state.exists(&addr(4)));
    }
}
