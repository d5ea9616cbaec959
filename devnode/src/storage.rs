use {
  fundme_primitives::{Account, Address, Amount},
  fundme_vm::{BlockInfo, State, StateDiff},
  rmp_serde::{from_slice, to_vec},
  std::{collections::HashMap, path::Path},
  thiserror::Error,
};

#[derive(Debug, Error)]
pub enum Error {
  #[error("Database error: {0}")]
  Database(#[from] sled::Error),

  #[error("Corrupt database entry: {0}")]
  Decode(#[from] rmp_serde::decode::Error),

  #[error("Serialization error: {0}")]
  Encode(#[from] rmp_serde::encode::Error),

  #[error("Corrupt account key of {0} bytes")]
  InvalidKey(usize),
}

const LATEST_BLOCK: &[u8] = b"latest_block";

/// Chain state persisted in a sled database.
///
/// All accounts are loaded into memory when the store is opened and
/// every applied diff is written through to disk, so reads never hit
/// the database.
pub struct OnDiskStateStore {
  accounts: sled::Tree,
  deployments: sled::Tree,
  meta: sled::Tree,
  cache: HashMap<Address, Account>,
}

impl OnDiskStateStore {
  pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
    Self::with_db(sled::open(path)?)
  }

  pub fn with_db(db: sled::Db) -> Result<Self, Error> {
    let accounts = db.open_tree("accounts")?;
    let mut cache = HashMap::new();
    for entry in accounts.iter() {
      let (key, value) = entry?;
      let bytes = <[u8; 20]>::try_from(&key[..])
        .map_err(|_| Error::InvalidKey(key.len()))?;
      cache.insert(Address::from_bytes(bytes), from_slice(&value)?);
    }

    Ok(Self {
      accounts,
      deployments: db.open_tree("deployments")?,
      meta: db.open_tree("meta")?,
      cache,
    })
  }

  /// True once genesis allocations have been written.
  pub fn is_initialized(&self) -> bool {
    !self.cache.is_empty()
  }

  pub fn genesis(
    &mut self,
    allocations: impl IntoIterator<Item = (Address, Amount)>,
  ) -> Result<(), Error> {
    let mut diff = StateDiff::default();
    for (address, balance) in allocations {
      diff.set(address, Account::with_balance(balance));
    }
    self.apply(diff)?;
    self.set_latest_block(&BlockInfo::default())
  }

  pub fn apply(&mut self, diff: StateDiff) -> Result<(), Error> {
    for (address, account) in diff.iter() {
      self.accounts.insert(address.as_ref(), to_vec(account)?)?;
    }
    self.accounts.flush()?;
    for (address, account) in diff.iter() {
      self.cache.insert(*address, account.clone());
    }
    Ok(())
  }

  pub fn latest_block(&self) -> Result<BlockInfo, Error> {
    Ok(match self.meta.get(LATEST_BLOCK)? {
      Some(bytes) => from_slice(&bytes)?,
      None => BlockInfo::default(),
    })
  }

  pub fn set_latest_block(&self, block: &BlockInfo) -> Result<(), Error> {
    self.meta.insert(LATEST_BLOCK, to_vec(block)?)?;
    self.meta.flush()?;
    Ok(())
  }

  /// Remembers the address of a deployed contract under `name`.
  pub fn record_deployment(
    &self,
    name: &str,
    address: Address,
  ) -> Result<(), Error> {
    self.deployments.insert(name, address.as_ref())?;
    self.deployments.flush()?;
    Ok(())
  }

  pub fn deployment(&self, name: &str) -> Result<Option<Address>, Error> {
    self
      .deployments
      .get(name)?
      .map(|bytes| {
        <[u8; 20]>::try_from(&bytes[..])
          .map(Address::from_bytes)
          .map_err(|_| Error::InvalidKey(bytes.len()))
      })
      .transpose()
  }
}

impl State for OnDiskStateStore {
  fn get(&self, address: &Address) -> Option<Account> {
    self.cache.get(address).cloned()
  }
}
