use {
  crate::{
    price_converter::{conversion_rate, get_price, ConversionError},
    price_feed::PriceFeed,
    slot,
  },
  fundme_primitives::{Address, Amount, ETHER},
  fundme_vm::{decode, encode, Context, Contract, Error},
  serde::{Deserialize, Serialize},
  thiserror::Error,
  tracing::{debug, info},
};

/// Smallest accepted contribution in USD with 18 decimals.
pub const MINIMUM_USD: Amount = 50 * ETHER;

const OWNER: &[u8] = b"owner";
const MINIMUM: &[u8] = b"minimum_usd";
const PRICE_FEED: &[u8] = b"price_feed";
const FUNDERS_LEN: &[u8] = b"funders_len";
const FUNDERS: &[u8] = b"funders";
const FUNDED: &[u8] = b"funded";

#[derive(Debug, Error)]
pub enum FundMeError {
  #[error("You need to spend more ETH!")]
  InsufficientContribution,

  #[error("FundMe__NotOwner")]
  NotOwner,

  #[error("FundMe__TransferFailed")]
  TransferFailed,

  #[error("FundMe__IndexOutOfRange")]
  IndexOutOfRange,

  #[error(transparent)]
  Price(#[from] ConversionError),

  #[error(transparent)]
  Vm(#[from] Error),
}

impl From<FundMeError> for Error {
  fn from(error: FundMeError) -> Self {
    match error {
      FundMeError::Vm(e) => e,
      other => Error::revert(other.to_string()),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundMeConstructor {
  pub price_feed: Address,
}

/// Calls understood by the ledger.
///
/// Input that does not decode to any of these is treated as [`Fund`],
/// and so is a plain value transfer with empty input.
///
/// [`Fund`]: FundMeCall::Fund
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FundMeCall {
  Fund,
  Withdraw,
  CheaperWithdraw,
  UpdateMinimumUsd { minimum_usd: Amount },
  GetAddressToAmountFunded { funder: Address },
  GetFunder { index: u64 },
  GetFundersCount,
  GetOwner,
  GetMinimumUsd,
  GetPriceFeed,
  GetVersion,
}

/// Crowdfunding ledger.
///
/// Accepts contributions worth at least the minimum USD amount at the
/// current oracle price, remembers who contributed how much and lets
/// the deployer withdraw everything.
pub struct FundMe;

impl FundMe {
  fn fund(ctx: &mut Context<'_>) -> Result<(), FundMeError> {
    let feed = Self::price_feed(ctx)?;
    let price = get_price(ctx, &feed)?;
    let value = ctx.value();
    if value == 0 {
      return Err(FundMeError::InsufficientContribution);
    }
    let usd = conversion_rate(value, price.answer, price.decimals)?;
    if usd < Self::minimum_usd(ctx)? {
      return Err(FundMeError::InsufficientContribution);
    }

    let funder = ctx.caller();
    let funded_key = slot(FUNDED, funder);
    let funded: Amount = ctx.load(&funded_key)?.unwrap_or_default();
    ctx.store(
      &funded_key,
      &funded.checked_add(value).ok_or(Error::BalanceOverflow(funder))?,
    )?;

    let count = Self::funders_count(ctx)?;
    ctx.store(&slot(FUNDERS, count.to_le_bytes()), &funder)?;
    ctx.store(FUNDERS_LEN, &(count + 1))?;

    debug!("{funder} funded {value} worth {usd} USD");
    Ok(())
  }

  /// Pays the contract balance out to the owner after clearing all
  /// funder records.
  ///
  /// The number of funders is read from storage on every iteration.
  fn withdraw(ctx: &mut Context<'_>) -> Result<(), FundMeError> {
    let owner = Self::only_owner(ctx)?;

    let mut index = 0;
    while index < Self::funders_count(ctx)? {
      let funder = Self::funder_at(ctx, index)?;
      ctx.remove(&slot(FUNDED, funder))?;
      index += 1;
    }

    Self::payout(ctx, owner)
  }

  /// Same as [`FundMe::withdraw`] but reads the funder list out of
  /// storage only once.
  fn cheaper_withdraw(ctx: &mut Context<'_>) -> Result<(), FundMeError> {
    let owner = Self::only_owner(ctx)?;

    let count = Self::funders_count(ctx)?;
    let funders = (0..count)
      .map(|index| Self::funder_at(ctx, index))
      .collect::<Result<Vec<_>, _>>()?;

    for funder in funders {
      ctx.remove(&slot(FUNDED, funder))?;
    }

    Self::payout(ctx, owner)
  }

  fn payout(ctx: &mut Context<'_>, owner: Address) -> Result<(), FundMeError> {
    ctx.store(FUNDERS_LEN, &0u64)?;

    let balance = ctx.balance(&ctx.address())?;
    ctx.transfer(owner, balance).map_err(|e| match e {
      Error::InsufficientFunds { .. }
      | Error::BalanceOverflow(_)
      | Error::Reverted(_) => FundMeError::TransferFailed,
      other => FundMeError::Vm(other),
    })?;

    info!("withdrew {balance} to {owner}");
    Ok(())
  }

  fn update_minimum_usd(
    ctx: &mut Context<'_>,
    minimum_usd: Amount,
  ) -> Result<(), FundMeError> {
    Self::only_owner(ctx)?;
    ctx.store(MINIMUM, &minimum_usd)?;
    Ok(())
  }

  fn only_owner(ctx: &mut Context<'_>) -> Result<Address, FundMeError> {
    let owner = Self::owner(ctx)?;
    if ctx.caller() != owner {
      return Err(FundMeError::NotOwner);
    }
    Ok(owner)
  }

  fn owner(ctx: &mut Context<'_>) -> Result<Address, Error> {
    Ok(ctx.load(OWNER)?.unwrap_or_default())
  }

  fn minimum_usd(ctx: &mut Context<'_>) -> Result<Amount, Error> {
    Ok(ctx.load(MINIMUM)?.unwrap_or_default())
  }

  fn price_feed(ctx: &mut Context<'_>) -> Result<PriceFeed, Error> {
    Ok(PriceFeed::new(ctx.load(PRICE_FEED)?.unwrap_or_default()))
  }

  fn funders_count(ctx: &mut Context<'_>) -> Result<u64, Error> {
    Ok(ctx.load(FUNDERS_LEN)?.unwrap_or_default())
  }

  fn funder(ctx: &mut Context<'_>, index: u64) -> Result<Address, FundMeError> {
    if index >= Self::funders_count(ctx)? {
      return Err(FundMeError::IndexOutOfRange);
    }
    Self::funder_at(ctx, index)
  }

  /// Reads a funder list slot without checking it against the list
  /// length. Slots past the length may hold funders of a previous round.
  fn funder_at(
    ctx: &mut Context<'_>,
    index: u64,
  ) -> Result<Address, FundMeError> {
    ctx
      .load(&slot(FUNDERS, index.to_le_bytes()))?
      .ok_or(FundMeError::IndexOutOfRange)
  }

  fn amount_funded(
    ctx: &mut Context<'_>,
    funder: &Address,
  ) -> Result<Amount, Error> {
    Ok(ctx.load(&slot(FUNDED, funder))?.unwrap_or_default())
  }

  fn dispatch(
    ctx: &mut Context<'_>,
    call: FundMeCall,
  ) -> Result<Vec<u8>, FundMeError> {
    Ok(match call {
      FundMeCall::Fund => {
        Self::fund(ctx)?;
        vec![]
      }
      FundMeCall::Withdraw => {
        Self::withdraw(ctx)?;
        vec![]
      }
      FundMeCall::CheaperWithdraw => {
        Self::cheaper_withdraw(ctx)?;
        vec![]
      }
      FundMeCall::UpdateMinimumUsd { minimum_usd } => {
        Self::update_minimum_usd(ctx, minimum_usd)?;
        vec![]
      }
      FundMeCall::GetAddressToAmountFunded { funder } => {
        encode(&Self::amount_funded(ctx, &funder)?)?
      }
      FundMeCall::GetFunder { index } => encode(&Self::funder(ctx, index)?)?,
      FundMeCall::GetFundersCount => encode(&Self::funders_count(ctx)?)?,
      FundMeCall::GetOwner => encode(&Self::owner(ctx)?)?,
      FundMeCall::GetMinimumUsd => encode(&Self::minimum_usd(ctx)?)?,
      FundMeCall::GetPriceFeed => encode(&Self::price_feed(ctx)?.address())?,
      FundMeCall::GetVersion => {
        let feed = Self::price_feed(ctx)?;
        encode(&feed.version(ctx)?)?
      }
    })
  }
}

impl Contract for FundMe {
  fn construct(&self, ctx: &mut Context<'_>, args: &[u8]) -> Result<(), Error> {
    if ctx.value() != 0 {
      return Err(Error::revert("FundMe constructor is not payable"));
    }

    let args: FundMeConstructor = decode(args)?;
    ctx.store(OWNER, &ctx.caller())?;
    ctx.store(MINIMUM, &MINIMUM_USD)?;
    ctx.store(PRICE_FEED, &args.price_feed)?;

    info!(
      "FundMe owned by {} reading prices from {}",
      ctx.caller(),
      args.price_feed
    );
    Ok(())
  }

  fn call(
    &self,
    ctx: &mut Context<'_>,
    input: &[u8],
  ) -> Result<Vec<u8>, Error> {
    let call = decode(input).unwrap_or(FundMeCall::Fund);
    Ok(Self::dispatch(ctx, call)?)
  }

  fn receive(&self, ctx: &mut Context<'_>) -> Result<(), Error> {
    Ok(Self::fund(ctx)?)
  }
}
