use {
  serde::{Deserialize, Serialize},
  std::{collections::BTreeMap, fmt::Display},
};

/// Native value in its smallest indivisible unit (1 ether = 10^18).
pub type Amount = u128;

/// Names a native program that is built into the execution platform.
///
/// Contract accounts do not carry bytecode, instead they reference
/// one of the programs registered with the VM by its name, for example
/// `fund-me` or `mock-v3-aggregator`.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Code(String);

impl Code {
  pub fn new(name: impl Into<String>) -> Self {
    Self(name.into())
  }

  pub fn name(&self) -> &str {
    &self.0
  }
}

impl Display for Code {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Represents the basic unit of storage in the ledger.
///
/// Every address that ever received value or signed a transaction has
/// an account. Wallet accounts only use the balance and nonce, contract
/// accounts additionally reference the program that governs them and
/// keep that program's persistent storage.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct Account {
  /// Native value held by this account.
  pub balance: Amount,

  /// Number of transactions signed by this account. Every transaction
  /// must carry the current value, it is incremented on commit.
  pub nonce: u64,

  /// The program running under this account, `None` for wallets.
  pub code: Option<Code>,

  /// Contract storage slots. Keys are chosen by the program, values are
  /// MessagePack encoded. A missing slot reads as empty.
  pub storage: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl Account {
  pub fn with_balance(balance: Amount) -> Self {
    Self {
      balance,
      ..Default::default()
    }
  }

  pub fn is_contract(&self) -> bool {
    self.code.is_some()
  }
}
