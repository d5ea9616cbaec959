use {
  fundme_primitives::{Account, Address},
  serde::{Deserialize, Serialize},
  std::collections::{BTreeMap, HashMap},
};

/// Represents a change in ledger accounts state.
///
/// Statediffs are meant to be accumulated and logically the entire
/// state of the ledger is the result of cumulative application
/// of consecutive state diffs.
///
/// A transaction produces a statediff that holds the final version of
/// every account it touched. The diff is only ever applied to a state
/// store when the transaction ran to completion, a failed transaction
/// has no diff, which is what makes every call all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDiff {
  upserts: BTreeMap<Address, Account>,
}

impl StateDiff {
  /// Inserts or updates an account under a given address.
  ///
  /// If the state diff had an account stored under this address
  /// then the old value is returned, otherwise `None` is returned.
  pub fn set(&mut self, address: Address, account: Account) -> Option<Account> {
    self.upserts.insert(address, account)
  }

  /// Merges a state diff with a newer diff.
  ///
  /// Applying the resulting diff is equivalent to
  /// applyting the two merged diff consecutively on
  /// any state store.
  pub fn merge(self, newer: StateDiff) -> StateDiff {
    let mut upserts = self.upserts;
    upserts.extend(newer.upserts);
    StateDiff { upserts }
  }

  /// Iterate over all accounts created or changed by this diff.
  pub fn iter(&self) -> impl Iterator<Item = (&Address, &Account)> {
    self.upserts.iter()
  }

  pub(crate) fn account_ref(&self, address: &Address) -> Option<&Account> {
    self.upserts.get(address)
  }

  pub fn apply(&mut self, diff: StateDiff) {
    *self = std::mem::take(self).merge(diff);
  }
}

impl State for StateDiff {
  fn get(&self, address: &Address) -> Option<Account> {
    self.upserts.get(address).cloned()
  }
}

/// Read access to committed ledger state.
///
/// Execution only ever reads through this trait, writes are collected
/// in a [`StateDiff`] and it is up to the owner of the store to apply
/// that diff once a transaction succeeds.
pub trait State {
  fn get(&self, address: &Address) -> Option<Account>;
}

#[derive(Debug, Default)]
pub struct InMemoryStateStore {
  data: HashMap<Address, Account>,
}

impl InMemoryStateStore {
  /// Creates a store where each of the given addresses holds a wallet
  /// account with the given balance.
  pub fn with_genesis(
    allocations: impl IntoIterator<Item = (Address, fundme_primitives::Amount)>,
  ) -> Self {
    Self {
      data: allocations
        .into_iter()
        .map(|(addr, balance)| (addr, Account::with_balance(balance)))
        .collect(),
    }
  }

  pub fn iter(&self) -> impl Iterator<Item = (&Address, &Account)> {
    self.data.iter()
  }

  pub fn apply(&mut self, diff: StateDiff) {
    for (k, v) in diff.upserts {
      self.data.insert(k, v);
    }
  }
}

impl State for InMemoryStateStore {
  fn get(&self, address: &Address) -> Option<Account> {
    self.data.get(address).cloned()
  }
}
