use {
  ed25519_dalek::PublicKey,
  multihash::{Hasher, Sha3_256},
  serde::{Deserialize, Serialize},
  std::{
    fmt::{Debug, Display},
    ops::Deref,
    str::FromStr,
  },
  thiserror::Error,
};

#[derive(Debug, Error, PartialEq)]
pub enum Error {
  #[error("an address is 20 bytes long, got {0} bytes")]
  InvalidLength(usize),

  #[error("malformed address hex: {0}")]
  InvalidHex(#[from] hex::FromHexError),
}

/// Represents an address of an account.
///
/// The same address could either represent a user wallet that signs
/// transactions with an ed25519 keypair (externally owned) or a contract
/// account that is created by a deployment transaction and is writable
/// only by the program running under it.
///
/// In both cases the address is the trailing 20 bytes of a SHA3-256
/// digest:
///   - for wallets the digest of the public key,
///   - for contracts the digest of the deployer address and the deployer
///     nonce at the time of deployment.
#[derive(
  Copy,
  Clone,
  Default,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
)]
pub struct Address([u8; 20]);

impl Address {
  pub const ZERO: Address = Address([0u8; 20]);

  pub const fn from_bytes(bytes: [u8; 20]) -> Self {
    Self(bytes)
  }

  /// Generates the address of a contract deployed by this account.
  ///
  /// The same (deployer, nonce) pair always yields the same address, and
  /// since every deployment consumes a nonce no two contracts deployed by
  /// the same account will ever collide.
  pub fn derive(&self, nonce: u64) -> Self {
    let mut hasher = Sha3_256::default();
    hasher.update(b"contract");
    hasher.update(&self.0);
    hasher.update(&nonce.to_le_bytes());
    Self::from_digest(hasher.finalize())
  }

  fn from_digest(digest: &[u8]) -> Self {
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&digest[digest.len() - 20..]);
    Self(bytes)
  }
}

impl AsRef<[u8]> for Address {
  fn as_ref(&self) -> &[u8] {
    &self.0
  }
}

impl Deref for Address {
  type Target = [u8];

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl Display for Address {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "0x{}", hex::encode(self.0))
  }
}

impl Debug for Address {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "address(0x{})", hex::encode(self.0))
  }
}

impl FromStr for Address {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let s = s.trim();
    let digits = s
      .strip_prefix("0x")
      .or_else(|| s.strip_prefix("0X"))
      .unwrap_or(s);
    let bytes = hex::decode(digits)?;
    let bytes: [u8; 20] = bytes
      .as_slice()
      .try_into()
      .map_err(|_| Error::InvalidLength(bytes.len()))?;
    Ok(Self(bytes))
  }
}

impl From<PublicKey> for Address {
  fn from(p: PublicKey) -> Self {
    let mut hasher = Sha3_256::default();
    hasher.update(p.as_bytes());
    Self::from_digest(hasher.finalize())
  }
}
