use {
  crate::{
    price_feed::{PriceFeedCall, RoundData},
    slot,
  },
  fundme_vm::{decode, encode, Context, Contract, Error},
  serde::{Deserialize, Serialize},
  tracing::debug,
};

pub const MOCK_DESCRIPTION: &str = "v0.6/tests/MockV3Aggregator.sol";

const VERSION: u64 = 0;

const DECIMALS: &[u8] = b"decimals";
const LATEST_ROUND: &[u8] = b"latest_round";
const ROUNDS: &[u8] = b"rounds";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockAggregatorConstructor {
  pub decimals: u8,
  pub initial_answer: i128,
}

/// Calls understood by the mock on top of [`PriceFeedCall`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MockAggregatorCall {
  /// Publishes a new round with `answer` stamped with the block time.
  UpdateAnswer { answer: i128 },

  /// Overwrites a round with explicit data and makes it the latest.
  UpdateRoundData {
    round_id: u64,
    answer: i128,
    timestamp: i64,
    started_at: i64,
  },
}

/// Price feed whose answers are set by anyone who calls it.
///
/// Used on development networks where no real oracle exists.
pub struct MockV3Aggregator;

impl MockV3Aggregator {
  fn update_answer(ctx: &mut Context<'_>, answer: i128) -> Result<(), Error> {
    let round_id = ctx.load::<u64>(LATEST_ROUND)?.unwrap_or_default() + 1;
    let timestamp = ctx.block().timestamp;
    Self::write_round(ctx, RoundData {
      round_id,
      answer,
      started_at: timestamp,
      updated_at: timestamp,
      answered_in_round: round_id,
    })
  }

  fn write_round(ctx: &mut Context<'_>, round: RoundData) -> Result<(), Error> {
    ctx.store(&slot(ROUNDS, round.round_id.to_le_bytes()), &round)?;
    ctx.store(LATEST_ROUND, &round.round_id)?;
    debug!(
      "price feed {} round {} answer {}",
      ctx.address(),
      round.round_id,
      round.answer
    );
    Ok(())
  }

  fn read_round(
    ctx: &mut Context<'_>,
    round_id: u64,
  ) -> Result<RoundData, Error> {
    ctx
      .load(&slot(ROUNDS, round_id.to_le_bytes()))?
      .ok_or_else(|| Error::revert("No data present"))
  }

  fn feed(
    ctx: &mut Context<'_>,
    call: PriceFeedCall,
  ) -> Result<Vec<u8>, Error> {
    match call {
      PriceFeedCall::Decimals => {
        encode(&ctx.load::<u8>(DECIMALS)?.unwrap_or_default())
      }
      PriceFeedCall::Description => encode(MOCK_DESCRIPTION),
      PriceFeedCall::Version => encode(&VERSION),
      PriceFeedCall::LatestRoundData => {
        let latest = ctx.load::<u64>(LATEST_ROUND)?.unwrap_or_default();
        encode(&Self::read_round(ctx, latest)?)
      }
      PriceFeedCall::GetRoundData { round_id } => {
        encode(&Self::read_round(ctx, round_id)?)
      }
    }
  }
}

impl Contract for MockV3Aggregator {
  fn construct(&self, ctx: &mut Context<'_>, args: &[u8]) -> Result<(), Error> {
    let args: MockAggregatorConstructor = decode(args)?;
    ctx.store(DECIMALS, &args.decimals)?;
    Self::update_answer(ctx, args.initial_answer)
  }

  fn call(
    &self,
    ctx: &mut Context<'_>,
    input: &[u8],
  ) -> Result<Vec<u8>, Error> {
    if let Ok(call) = decode::<PriceFeedCall>(input) {
      return Self::feed(ctx, call);
    }

    match decode(input)? {
      MockAggregatorCall::UpdateAnswer { answer } => {
        Self::update_answer(ctx, answer)?;
        Ok(vec![])
      }
      MockAggregatorCall::UpdateRoundData {
        round_id,
        answer,
        timestamp,
        started_at,
      } => {
        Self::write_round(ctx, RoundData {
          round_id,
          answer,
          started_at,
          updated_at: timestamp,
          answered_in_round: round_id,
        })?;
        Ok(vec![])
      }
    }
  }
}
