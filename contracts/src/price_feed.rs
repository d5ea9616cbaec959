use {
  fundme_primitives::Address,
  fundme_vm::{decode, encode, Context, Error},
  serde::{Deserialize, Serialize},
};

/// Calls that every price feed program answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceFeedCall {
  Decimals,
  Description,
  Version,
  LatestRoundData,
  GetRoundData { round_id: u64 },
}

/// One price observation published by a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundData {
  pub round_id: u64,

  /// Price scaled by `10^decimals` of the feed.
  pub answer: i128,

  pub started_at: i64,
  pub updated_at: i64,
  pub answered_in_round: u64,
}

/// Client side of a price feed living at `address`.
///
/// Every method is a read-only call into the feed contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceFeed {
  address: Address,
}

impl PriceFeed {
  pub fn new(address: Address) -> Self {
    Self { address }
  }

  pub fn address(&self) -> Address {
    self.address
  }

  pub fn decimals(&self, ctx: &mut Context<'_>) -> Result<u8, Error> {
    self.call(ctx, &PriceFeedCall::Decimals)
  }

  pub fn version(&self, ctx: &mut Context<'_>) -> Result<u64, Error> {
    self.call(ctx, &PriceFeedCall::Version)
  }

  pub fn latest_round_data(
    &self,
    ctx: &mut Context<'_>,
  ) -> Result<RoundData, Error> {
    self.call(ctx, &PriceFeedCall::LatestRoundData)
  }

  fn call<T: serde::de::DeserializeOwned>(
    &self,
    ctx: &mut Context<'_>,
    call: &PriceFeedCall,
  ) -> Result<T, Error> {
    decode(&ctx.static_call(self.address, &encode(call)?)?)
  }
}
