use {
  crate::{b58::ToBase58String, Address, Amount, Code},
  core::fmt::Debug,
  ed25519_dalek::{
    Keypair,
    PublicKey,
    Signature,
    SignatureError,
    Signer,
    Verifier,
  },
  multihash::{Multihash, MultihashDigest},
  once_cell::sync::OnceCell,
  serde::{Deserialize, Serialize},
};

/// Gas limit used by [`Transaction::new`], enough for any call on the
/// contracts shipped with this repository.
pub const DEFAULT_GAS_LIMIT: u64 = 30_000_000;

/// Gas price used by [`Transaction::new`], 1 gwei.
pub const DEFAULT_GAS_PRICE: Amount = 1_000_000_000;

/// What a transaction asks the execution platform to do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Payload {
  /// Creates a new contract account running `code`. The address of the
  /// new account is derived from the signer address and nonce. `args` are
  /// handed to the program constructor as-is.
  Deploy { code: Code, args: Vec<u8> },

  /// Sends the attached value to `to` and, if `to` is a contract, invokes
  /// its program with `input`. Empty input against a contract invokes its
  /// receive handler, against a wallet it is a plain value transfer.
  Call { to: Address, input: Vec<u8> },
}

impl Payload {
  fn write_to(&self, buf: &mut Vec<u8>) {
    match self {
      Payload::Deploy { code, args } => {
        buf.push(0);
        write_bytes(buf, code.name().as_bytes());
        write_bytes(buf, args);
      }
      Payload::Call { to, input } => {
        buf.push(1);
        buf.extend_from_slice(to.as_ref());
        write_bytes(buf, input);
      }
    }
  }
}

fn write_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
  buf.extend_from_slice(&(bytes.len() as u64).to_le_bytes());
  buf.extend_from_slice(bytes);
}

/// A signed request from a wallet to the execution platform.
///
/// The caller identity seen by contracts is the address of `signer`,
/// and it is only trusted once the signature over the signing hash
/// verifies against that key.
#[derive(Clone, Serialize, Deserialize)]
pub struct Transaction {
  pub signer: PublicKey,
  pub nonce: u64,

  /// Native value moved from the signer to the callee.
  pub value: Amount,

  /// Upper bound on resource units this transaction may consume.
  pub gas_limit: u64,

  /// Price paid per consumed resource unit.
  pub gas_price: Amount,

  pub payload: Payload,
  pub signature: Signature,

  #[serde(skip)]
  hash_cache: OnceCell<Multihash>,
}

impl Transaction {
  pub fn new(
    keypair: &Keypair,
    nonce: u64,
    value: Amount,
    payload: Payload,
  ) -> Self {
    Self::with_gas(
      keypair,
      nonce,
      value,
      DEFAULT_GAS_LIMIT,
      DEFAULT_GAS_PRICE,
      payload,
    )
  }

  pub fn with_gas(
    keypair: &Keypair,
    nonce: u64,
    value: Amount,
    gas_limit: u64,
    gas_price: Amount,
    payload: Payload,
  ) -> Self {
    let message = signing_message(
      &keypair.public,
      nonce,
      value,
      gas_limit,
      gas_price,
      &payload,
    );
    let signing_hash = multihash::Code::Sha3_256.digest(&message);
    Self {
      signer: keypair.public,
      nonce,
      value,
      gas_limit,
      gas_price,
      payload,
      signature: keypair.sign(signing_hash.to_bytes().as_slice()),
      hash_cache: OnceCell::new(),
    }
  }

  /// Address of the account that signed this transaction.
  pub fn sender(&self) -> Address {
    self.signer.into()
  }

  /// Hash of the contents of the transaction without the signature.
  ///
  /// This is the message that the signer signs.
  pub fn signing_hash(&self) -> Multihash {
    multihash::Code::Sha3_256.digest(&signing_message(
      &self.signer,
      self.nonce,
      self.value,
      self.gas_limit,
      self.gas_price,
      &self.payload,
    ))
  }

  /// Hash of the transaction that uniquely identitifies it.
  pub fn hash(&self) -> &Multihash {
    self.hash_cache.get_or_init(|| {
      let mut message = signing_message(
        &self.signer,
        self.nonce,
        self.value,
        self.gas_limit,
        self.gas_price,
        &self.payload,
      );
      message.extend_from_slice(&self.signature.to_bytes());
      multihash::Code::Sha3_256.digest(&message)
    })
  }

  pub fn verify(&self) -> Result<(), SignatureError> {
    self
      .signer
      .verify(self.signing_hash().to_bytes().as_slice(), &self.signature)
  }

  /// The most this transaction can cost its sender: the attached value
  /// plus the fee if the entire gas limit is consumed.
  pub fn max_cost(&self) -> Option<Amount> {
    Amount::from(self.gas_limit)
      .checked_mul(self.gas_price)?
      .checked_add(self.value)
  }
}

impl Debug for Transaction {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("Transaction")
      .field("sender", &self.sender())
      .field("nonce", &self.nonce)
      .field("value", &self.value)
      .field("payload", &self.payload)
      .field("hash", &self.hash().to_b58())
      .finish()
  }
}

fn signing_message(
  signer: &PublicKey,
  nonce: u64,
  value: Amount,
  gas_limit: u64,
  gas_price: Amount,
  payload: &Payload,
) -> Vec<u8> {
  let mut buf = Vec::with_capacity(128);
  buf.extend_from_slice(signer.as_bytes());
  buf.extend_from_slice(&nonce.to_le_bytes());
  buf.extend_from_slice(&value.to_le_bytes());
  buf.extend_from_slice(&gas_limit.to_le_bytes());
  buf.extend_from_slice(&gas_price.to_le_bytes());
  payload.write_to(&mut buf);
  buf
}
