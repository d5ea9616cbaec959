use {
  ed25519_dalek::{Keypair, PublicKey, SecretKey, SignatureError},
  fundme_primitives::{Amount, ETHER},
  multihash::MultihashDigest,
};

/// Number of prefunded accounts created at genesis.
pub const DEV_ACCOUNTS: usize = 10;

/// Genesis balance of every dev account.
pub const DEV_BALANCE: Amount = 10_000 * ETHER;

/// Keypairs of the dev accounts.
///
/// They are derived from fixed seeds, so every fresh chain has the same
/// accounts and account 0 is always the deployer.
pub fn dev_accounts() -> Result<Vec<Keypair>, SignatureError> {
  (0..DEV_ACCOUNTS).map(dev_account).collect()
}

fn dev_account(index: usize) -> Result<Keypair, SignatureError> {
  let seed = multihash::Code::Sha3_256
    .digest(format!("fundme dev account {index}").as_bytes());
  let secret = SecretKey::from_bytes(seed.digest())?;
  let public = PublicKey::from(&secret);
  Ok(Keypair { secret, public })
}
