use {
  ed25519_dalek::Keypair,
  fundme_primitives::{Address, Amount, Code, Payload, Transaction, ETHER},
  fundme_vm::{
    decode,
    encode,
    Context,
    Contract,
    Error,
    InMemoryStateStore,
    Registry,
  },
  serde::{Deserialize, Serialize},
};

const COUNT: &[u8] = b"count";

/// Calls understood by the counter test program.
#[derive(Debug, Serialize, Deserialize)]
pub enum CounterCall {
  Increment,
  Get,
  /// Increments the counter and then reverts.
  IncrementAndFail,
  /// Sends `amount` of the contract balance to `to`.
  Payout { to: Address, amount: Amount },
  /// Reads the counter of another counter contract.
  Peek { other: Address },
  /// Tries to increment another counter through a read-only call.
  PokeStatic { other: Address },
}

/// A minimal program that keeps one integer in storage.
pub struct Counter;

impl Counter {
  pub fn code() -> Code {
    Code::new("counter")
  }
}

impl Contract for Counter {
  fn construct(&self, ctx: &mut Context<'_>, args: &[u8]) -> Result<(), Error> {
    let initial: u64 = decode(args)?;
    ctx.store(COUNT, &initial)
  }

  fn call(
    &self,
    ctx: &mut Context<'_>,
    input: &[u8],
  ) -> Result<Vec<u8>, Error> {
    match decode(input)? {
      CounterCall::Increment => {
        let count: u64 = ctx.load(COUNT)?.unwrap_or_default();
        ctx.store(COUNT, &(count + 1))?;
        encode(&(count + 1))
      }
      CounterCall::Get => encode(&ctx.load::<u64>(COUNT)?.unwrap_or_default()),
      CounterCall::IncrementAndFail => {
        let count: u64 = ctx.load(COUNT)?.unwrap_or_default();
        ctx.store(COUNT, &(count + 1))?;
        Err(Error::revert("counter: failing on purpose"))
      }
      CounterCall::Payout { to, amount } => {
        ctx.transfer(to, amount)?;
        Ok(vec![])
      }
      CounterCall::Peek { other } => {
        ctx.static_call(other, &encode(&CounterCall::Get)?)
      }
      CounterCall::PokeStatic { other } => {
        ctx.static_call(other, &encode(&CounterCall::Increment)?)
      }
    }
  }

  fn receive(&self, _ctx: &mut Context<'_>) -> Result<(), Error> {
    Ok(())
  }
}

pub fn registry() -> Registry {
  Registry::default().with(Counter::code(), Counter)
}

/// Creates `count` random wallets each funded with 100 ether.
pub fn genesis(count: usize) -> (InMemoryStateStore, Vec<Keypair>) {
  let keypairs: Vec<_> = (0..count)
    .map(|_| Keypair::generate(&mut rand::thread_rng()))
    .collect();
  let store = InMemoryStateStore::with_genesis(
    keypairs
      .iter()
      .map(|kp| (Address::from(kp.public), 100 * ETHER)),
  );
  (store, keypairs)
}

pub fn deploy_counter(
  keypair: &Keypair,
  nonce: u64,
  initial: u64,
) -> anyhow::Result<Transaction> {
  Ok(Transaction::new(keypair, nonce, 0, Payload::Deploy {
    code: Counter::code(),
    args: encode(&initial)?,
  }))
}

pub fn call_counter(
  keypair: &Keypair,
  nonce: u64,
  to: Address,
  value: Amount,
  call: CounterCall,
) -> anyhow::Result<Transaction> {
  Ok(Transaction::new(keypair, nonce, value, Payload::Call {
    to,
    input: encode(&call)?,
  }))
}
