mod fund_me;
mod mock_aggregator;
mod price_converter;
mod price_feed;

use {fundme_primitives::Code, fundme_vm::Registry};

pub use {
  fund_me::{FundMe, FundMeCall, FundMeConstructor, FundMeError, MINIMUM_USD},
  mock_aggregator::{
    MockAggregatorCall,
    MockAggregatorConstructor,
    MockV3Aggregator,
    MOCK_DESCRIPTION,
  },
  price_converter::{conversion_rate, get_price, ConversionError, Price},
  price_feed::{PriceFeed, PriceFeedCall, RoundData},
};

/// Code name of the crowdfunding ledger program.
pub const FUND_ME: &str = "fund-me";

/// Code name of the mock price feed program.
pub const MOCK_V3_AGGREGATOR: &str = "mock-v3-aggregator";

/// Registry with every program shipped in this crate.
pub fn registry() -> Registry {
  Registry::default()
    .with(Code::new(FUND_ME), FundMe)
    .with(Code::new(MOCK_V3_AGGREGATOR), MockV3Aggregator)
}

/// Builds a storage key out of a slot name and a discriminator, such as
/// an address or an index.
pub(crate) fn slot(name: &[u8], discriminator: impl AsRef<[u8]>) -> Vec<u8> {
  let discriminator = discriminator.as_ref();
  let mut key = Vec::with_capacity(name.len() + 1 + discriminator.len());
  key.extend_from_slice(name);
  key.push(b'/');
  key.extend_from_slice(discriminator);
  key
}
