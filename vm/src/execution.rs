use {
  crate::{
    context::{dispatch, Context},
    gas::{cost, Meter},
    Registry,
    State,
    StateDiff,
  },
  fundme_primitives::{
    Address,
    Amount,
    Code,
    Payload,
    Transaction,
    DEFAULT_GAS_LIMIT,
  },
  multihash::Multihash,
  serde::{Deserialize, Serialize},
  std::fmt::Display,
  thiserror::Error,
  tracing::debug,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("Transaction signature does not verify")]
  InvalidSignature,

  #[error("Nonce mismatch for {account}: expected {expected}, got {actual}")]
  NonceMismatch {
    account: Address,
    expected: u64,
    actual: u64,
  },

  #[error("Account {account} holds {available}, {required} required")]
  InsufficientFunds {
    account: Address,
    required: Amount,
    available: Amount,
  },

  #[error("Out of gas, limit is {limit}")]
  OutOfGas { limit: u64 },

  #[error("No program registered under code '{0}'")]
  UnknownCode(Code),

  #[error("Account {0} is not a contract")]
  NotAContract(Address),

  #[error("A contract already exists at {0}")]
  ContractAlreadyExists(Address),

  #[error("State modification attempted in a read-only call")]
  StaticWrite,

  #[error("Balance of {0} would overflow")]
  BalanceOverflow(Address),

  #[error("Encoding error: {0}")]
  Codec(String),

  #[error("Execution reverted: {0}")]
  Reverted(Revert),
}

impl Error {
  pub fn revert(reason: impl Into<String>) -> Self {
    Error::Reverted(Revert::new(reason))
  }

  /// The reason string if this error is a contract revert.
  pub fn revert_reason(&self) -> Option<&str> {
    match self {
      Error::Reverted(revert) => Some(revert.reason()),
      _ => None,
    }
  }
}

/// A failure raised deliberately by a contract program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revert {
  reason: String,
}

impl Revert {
  pub fn new(reason: impl Into<String>) -> Self {
    Self {
      reason: reason.into(),
    }
  }

  pub fn reason(&self) -> &str {
    &self.reason
  }
}

impl Display for Revert {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.reason)
  }
}

/// Environment of the block a transaction is executed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
  pub height: u64,
  pub timestamp: i64,
}

/// Outcome of a successfully executed transaction.
#[derive(Debug, Clone)]
pub struct Receipt {
  pub transaction: Multihash,

  /// Address of the account created by a deploy transaction.
  pub contract_address: Option<Address>,

  pub gas_used: u64,

  /// Amount debited from the sender for consumed gas.
  pub fee: Amount,

  /// Encoded return value of the invoked program.
  pub output: Vec<u8>,

  /// Every account touched by the transaction, ready to be applied
  /// to the state it was executed against.
  pub diff: StateDiff,
}

/// Executes a transaction against a state snapshot.
///
/// Returns the receipt that carries a [`StateDiff`] with all changes
/// made by the transaction, including the incremented sender nonce and
/// the gas fee. Nothing is written to `state`. When execution fails for
/// any reason the error is returned and no diff exists, so the ledger is
/// left exactly as it was.
pub fn execute(
  tx: &Transaction,
  state: &impl State,
  registry: &Registry,
  block: &BlockInfo,
) -> Result<Receipt, Error> {
  tx.verify().map_err(|_| Error::InvalidSignature)?;

  let sender = tx.sender();
  let account = state.get(&sender).unwrap_or_default();
  if account.nonce != tx.nonce {
    return Err(Error::NonceMismatch {
      account: sender,
      expected: account.nonce,
      actual: tx.nonce,
    });
  }

  let max_cost = tx.max_cost().unwrap_or(Amount::MAX);
  if account.balance < max_cost {
    return Err(Error::InsufficientFunds {
      account: sender,
      required: max_cost,
      available: account.balance,
    });
  }

  let mut meter = Meter::new(tx.gas_limit);
  meter.charge(cost::TRANSACTION)?;

  let mut overlay = StateDiff::default();
  let (contract_address, output) = {
    let mut ctx = Context {
      state,
      overlay: &mut overlay,
      registry,
      meter: &mut meter,
      block: *block,
      caller: sender,
      address: sender,
      value: tx.value,
      read_only: false,
    };

    ctx.modify(sender, |acc| {
      acc.nonce += 1;
      Ok(())
    })?;

    match &tx.payload {
      Payload::Deploy { code, args } => {
        let target = deploy(&mut ctx, tx, code, args)?;
        (Some(target), vec![])
      }
      Payload::Call { to, input } => (None, call(&mut ctx, tx, *to, input)?),
    }
  };

  let gas_used = meter.used();
  let fee = Amount::from(gas_used) * tx.gas_price;
  let mut payer = overlay.get(&sender).unwrap_or(account);
  payer.balance = match payer.balance.checked_sub(fee) {
    Some(balance) => balance,
    None => {
      return Err(Error::InsufficientFunds {
        account: sender,
        required: fee,
        available: payer.balance,
      })
    }
  };
  overlay.set(sender, payer);

  debug!(
    "executed {tx:?}: gas used {gas_used} of {}, {} accounts changed",
    meter.limit(),
    overlay.iter().count()
  );

  Ok(Receipt {
    transaction: *tx.hash(),
    contract_address,
    gas_used,
    fee,
    output,
    diff: overlay,
  })
}

/// Invokes a contract in a read-only frame against committed state.
///
/// Used for getters, nothing is charged to anyone and any attempt to
/// modify state fails with [`Error::StaticWrite`].
pub fn query(
  state: &impl State,
  registry: &Registry,
  block: &BlockInfo,
  to: Address,
  input: &[u8],
) -> Result<Vec<u8>, Error> {
  let mut overlay = StateDiff::default();
  let mut meter = Meter::new(DEFAULT_GAS_LIMIT);
  let mut ctx = Context {
    state,
    overlay: &mut overlay,
    registry,
    meter: &mut meter,
    block: *block,
    caller: Address::ZERO,
    address: to,
    value: 0,
    read_only: true,
  };
  dispatch(&mut ctx, input)
}

fn deploy(
  ctx: &mut Context<'_>,
  tx: &Transaction,
  code: &Code,
  args: &[u8],
) -> Result<Address, Error> {
  ctx.meter.charge(cost::DEPLOY)?;

  let registry = ctx.registry;
  let program = registry
    .get(code)
    .ok_or_else(|| Error::UnknownCode(code.clone()))?;

  let target = ctx.caller.derive(tx.nonce);
  if ctx.account(&target).map_or(false, |acc| acc.is_contract()) {
    return Err(Error::ContractAlreadyExists(target));
  }

  ctx.modify(target, |acc| {
    acc.code = Some(code.clone());
    Ok(())
  })?;
  ctx.move_value(ctx.caller, target, tx.value)?;

  ctx.address = target;
  program.construct(ctx, args)?;

  debug!("deployed {code} at {target}");
  Ok(target)
}

fn call(
  ctx: &mut Context<'_>,
  tx: &Transaction,
  to: Address,
  input: &[u8],
) -> Result<Vec<u8>, Error> {
  ctx.move_value(ctx.caller, to, tx.value)?;
  ctx.address = to;

  if ctx.account(&to).map_or(false, |acc| acc.is_contract()) {
    dispatch(ctx, input)
  } else if input.is_empty() {
    Ok(vec![])
  } else {
    Err(Error::NotAContract(to))
  }
}
