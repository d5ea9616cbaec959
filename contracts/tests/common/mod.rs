use {
  ed25519_dalek::Keypair,
  fundme_contracts::{
    FundMeCall,
    FundMeConstructor,
    MockAggregatorConstructor,
    FUND_ME,
    MOCK_V3_AGGREGATOR,
  },
  fundme_primitives::{
    Address,
    Amount,
    Code,
    Payload,
    Transaction,
    DEFAULT_GAS_LIMIT,
    DEFAULT_GAS_PRICE,
    ETHER,
  },
  fundme_vm::{
    decode,
    encode,
    execute,
    query,
    BlockInfo,
    Error,
    InMemoryStateStore,
    Receipt,
    Registry,
    State,
  },
  serde::{de::DeserializeOwned, Serialize},
};

pub const DECIMALS: u8 = 8;
pub const INITIAL_ANSWER: i128 = 2000_0000_0000;

/// A tiny in-memory chain with funded wallets, one block per
/// transaction.
pub struct Chain {
  pub store: InMemoryStateStore,
  pub registry: Registry,
  pub accounts: Vec<Keypair>,
  block: BlockInfo,
}

impl Chain {
  pub fn new(accounts: usize) -> Self {
    Self::with_balances(vec![10_000 * ETHER; accounts])
  }

  pub fn with_balances(balances: Vec<Amount>) -> Self {
    let accounts: Vec<_> = balances
      .iter()
      .map(|_| Keypair::generate(&mut rand::thread_rng()))
      .collect();
    let store = InMemoryStateStore::with_genesis(
      accounts
        .iter()
        .zip(balances)
        .map(|(kp, balance)| (Address::from(kp.public), balance)),
    );
    Self {
      store,
      registry: fundme_contracts::registry(),
      accounts,
      block: BlockInfo {
        height: 0,
        timestamp: 1_700_000_000,
      },
    }
  }

  pub fn address(&self, account: usize) -> Address {
    self.accounts[account].public.into()
  }

  pub fn balance(&self, address: &Address) -> Amount {
    self.store.get(address).map(|acc| acc.balance).unwrap_or(0)
  }

  /// Signs and executes a transaction from `account`, committing its
  /// state diff if it succeeds.
  pub fn send(
    &mut self,
    account: usize,
    value: Amount,
    payload: Payload,
  ) -> Result<Receipt, Error> {
    self.send_with_gas(account, value, DEFAULT_GAS_LIMIT, payload)
  }

  pub fn send_with_gas(
    &mut self,
    account: usize,
    value: Amount,
    gas_limit: u64,
    payload: Payload,
  ) -> Result<Receipt, Error> {
    let sender = self.address(account);
    let nonce = self.store.get(&sender).map(|acc| acc.nonce).unwrap_or(0);
    let tx = Transaction::with_gas(
      &self.accounts[account],
      nonce,
      value,
      gas_limit,
      DEFAULT_GAS_PRICE,
      payload,
    );

    self.block.height += 1;
    self.block.timestamp += 12;
    let receipt = execute(&tx, &self.store, &self.registry, &self.block)?;
    self.store.apply(receipt.diff.clone());
    Ok(receipt)
  }

  pub fn call(
    &mut self,
    account: usize,
    to: Address,
    value: Amount,
    call: &impl Serialize,
  ) -> Result<Receipt, Error> {
    let input = encode(call)?;
    self.send(account, value, Payload::Call { to, input })
  }

  pub fn view<T: DeserializeOwned>(
    &self,
    to: Address,
    call: &impl Serialize,
  ) -> Result<T, Error> {
    decode(&query(
      &self.store,
      &self.registry,
      &self.block,
      to,
      &encode(call)?,
    )?)
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
      .send(account, 0, payload)?
      .contract_address
      .ok_or_else(|| anyhow::anyhow!("deployment created no contract"))
  }
}

/// A chain with the mock price feed and the ledger deployed by
/// account 0.
pub struct Deployed {
  pub chain: Chain,
  pub feed: Address,
  pub fund_me: Address,
}

impl Deployed {
  pub fn new(accounts: usize) -> anyhow::Result<Self> {
    Self::on(Chain::new(accounts))
  }

  pub fn on(mut chain: Chain) -> anyhow::Result<Self> {
    let mock = MockAggregatorConstructor {
      decimals: DECIMALS,
      initial_answer: INITIAL_ANSWER,
    };
    let feed = chain.deploy(0, MOCK_V3_AGGREGATOR, &mock)?;
    let fund_me =
      chain.deploy(0, FUND_ME, &FundMeConstructor { price_feed: feed })?;
    Ok(Self {
      chain,
      feed,
      fund_me,
    })
  }

  pub fn fund(
    &mut self,
    account: usize,
    value: Amount,
  ) -> Result<Receipt, Error> {
    self
      .chain
      .call(account, self.fund_me, value, &FundMeCall::Fund)
  }

  pub fn invoke(
    &mut self,
    account: usize,
    call: FundMeCall,
  ) -> Result<Receipt, Error> {
    self.chain.call(account, self.fund_me, 0, &call)
  }

  pub fn invoke_with_gas(
    &mut self,
    account: usize,
    call: FundMeCall,
    gas_limit: u64,
  ) -> Result<Receipt, Error> {
    let payload = Payload::Call {
      to: self.fund_me,
      input: encode(&call)?,
    };
    self.chain.send_with_gas(account, 0, gas_limit, payload)
  }

  pub fn view<T: DeserializeOwned>(
    &self,
    call: FundMeCall,
  ) -> Result<T, Error> {
    self.chain.view(self.fund_me, &call)
  }

  pub fn amount_funded(&self, account: usize) -> Result<Amount, Error> {
    self.view(FundMeCall::GetAddressToAmountFunded {
      funder: self.chain.address(account),
    })
  }
}
