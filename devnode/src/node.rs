use {
  crate::{
    accounts::{dev_accounts, DEV_BALANCE},
    storage::OnDiskStateStore,
  },
  anyhow::{anyhow, Context as _},
  ed25519_dalek::Keypair,
  fundme_primitives::{
    Address,
    Amount,
    Code,
    Payload,
    ToBase58String,
    Transaction,
    DEFAULT_GAS_LIMIT,
    DEFAULT_GAS_PRICE,
  },
  fundme_vm::{
    decode,
    encode,
    execute,
    query,
    BlockInfo,
    Receipt,
    Registry,
    State,
  },
  serde::{de::DeserializeOwned, Serialize},
  std::{
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
  },
  tracing::{debug, info, warn},
};

/// Local chain that seals one block per transaction.
pub struct Node {
  store: OnDiskStateStore,
  registry: Registry,
  accounts: Vec<Keypair>,
  gas_limit: u64,
}

impl Node {
  /// Opens the chain in `data_dir`, creating it with prefunded dev
  /// accounts if it does not exist yet.
  pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
    let store = OnDiskStateStore::open(data_dir)
      .with_context(|| format!("opening chain at {}", data_dir.display()))?;
    Self::with_store(store)
  }

  pub fn with_store(mut store: OnDiskStateStore) -> anyhow::Result<Self> {
    let accounts = dev_accounts()?;

    if !store.is_initialized() {
      store.genesis(
        accounts
          .iter()
          .map(|kp| (Address::from(kp.public), DEV_BALANCE)),
      )?;
      info!("initialized new chain with {} dev accounts", accounts.len());
    }

    Ok(Self {
      store,
      registry: fundme_contracts::registry(),
      accounts,
      gas_limit: DEFAULT_GAS_LIMIT,
    })
  }

  /// Caps the gas of every transaction this node signs.
  pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
    self.gas_limit = gas_limit;
    self
  }

  pub fn store(&self) -> &OnDiskStateStore {
    &self.store
  }

  pub fn address(&self, account: usize) -> anyhow::Result<Address> {
    Ok(self.keypair(account)?.public.into())
  }

  pub fn accounts(&self) -> impl Iterator<Item = Address> + '_ {
    self.accounts.iter().map(|kp| kp.public.into())
  }

  pub fn balance(&self, address: &Address) -> Amount {
    self.store.get(address).map(|acc| acc.balance).unwrap_or(0)
  }

  /// Signs a transaction with a dev account, executes it in a new block
  /// and commits the outcome.
  pub fn submit(
    &mut self,
    account: usize,
    value: Amount,
    payload: Payload,
  ) -> anyhow::Result<Receipt> {
    let keypair = self.keypair(account)?;
    let sender = Address::from(keypair.public);
    let nonce = self.store.get(&sender).map(|acc| acc.nonce).unwrap_or(0);
    let tx = Transaction::with_gas(
      keypair,
      nonce,
      value,
      self.gas_limit,
      DEFAULT_GAS_PRICE,
      payload,
    );
    debug!("submitting {tx:?}");

    let block = self.next_block()?;
    let receipt = match execute(&tx, &self.store, &self.registry, &block) {
      Ok(receipt) => receipt,
      Err(e) => {
        warn!("transaction {} failed: {e}", tx.hash().to_b58());
        return Err(e.into());
      }
    };

    self.store.apply(receipt.diff.clone())?;
    self.store.set_latest_block(&block)?;
    info!(
      "block {} included transaction {} using {} gas",
      block.height,
      receipt.transaction.to_b58(),
      receipt.gas_used
    );
    Ok(receipt)
  }

  pub fn call(
    &mut self,
    account: usize,
    to: Address,
    value: Amount,
    call: &impl Serialize,
  ) -> anyhow::Result<Receipt> {
    let input = encode(call)?;
    self.submit(account, value, Payload::Call { to, input })
  }

  pub fn deploy(
    &mut self,
    account: usize,
    code: &str,
    args: &impl Serialize,
  ) -> anyhow::Result<Address> {
    let payload = Payload::Deploy {
      code: Code::new(code),
      args: encode(args)?,
    };
    self
      .submit(account, 0, payload)?
      .contract_address
      .ok_or_else(|| anyhow!("deployment of {code} created no contract"))
  }

  /// Runs a read-only call against the latest committed state.
  pub fn view<T: DeserializeOwned>(
    &self,
    to: Address,
    call: &impl Serialize,
  ) -> anyhow::Result<T> {
    let block = self.store.latest_block()?;
    let input = encode(call)?;
    let output = query(&self.store, &self.registry, &block, to, &input)?;
    Ok(decode(&output)?)
  }

  /// Address of a contract recorded by an earlier deployment.
  pub fn deployment(&self, name: &str) -> anyhow::Result<Address> {
    self
      .store
      .deployment(name)?
      .ok_or_else(|| anyhow!("{name} is not deployed, run `fundme deploy`"))
  }

  pub fn record_deployment(
    &self,
    name: &str,
    address: Address,
  ) -> anyhow::Result<()> {
    self.store.record_deployment(name, address)?;
    Ok(())
  }

  fn keypair(&self, account: usize) -> anyhow::Result<&Keypair> {
    self.accounts.get(account).ok_or_else(|| {
      anyhow!(
        "no dev account {account}, valid indices are 0..{}",
        self.accounts.len()
      )
    })
  }

  fn next_block(&self) -> anyhow::Result<BlockInfo> {
    let latest = self.store.latest_block()?;
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as i64;
    Ok(BlockInfo {
      height: latest.height + 1,
      timestamp: now.max(latest.timestamp + 1),
    })
  }
}
