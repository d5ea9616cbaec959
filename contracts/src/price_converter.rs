use {
  crate::price_feed::PriceFeed,
  fundme_primitives::Amount,
  fundme_vm::{Context, Error},
  thiserror::Error,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
  #[error("Price feed answer {0} is not positive")]
  NonPositivePrice(i128),

  #[error("USD value of {0} does not fit in 128 bits")]
  Overflow(Amount),
}

/// Latest price reported by a feed together with its scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Price {
  pub answer: i128,
  pub decimals: u8,
}

/// Reads the latest price of the native unit in USD from `feed`.
pub fn get_price(
  ctx: &mut Context<'_>,
  feed: &PriceFeed,
) -> Result<Price, Error> {
  let round = feed.latest_round_data(ctx)?;
  let decimals = feed.decimals(ctx)?;
  Ok(Price {
    answer: round.answer,
    decimals,
  })
}

/// USD value, with 18 decimals, of `amount` base units of the native
/// currency when one whole unit is worth `answer / 10^decimals` USD.
///
/// The result is rounded down.
pub fn conversion_rate(
  amount: Amount,
  answer: i128,
  decimals: u8,
) -> Result<Amount, ConversionError> {
  if answer <= 0 {
    return Err(ConversionError::NonPositivePrice(answer));
  }

  let answer = answer as Amount;
  let scale = 10u128
    .checked_pow(decimals.into())
    .ok_or(ConversionError::Overflow(amount))?;

  amount
    .checked_mul(answer)
    .map(|value| value / scale)
    .ok_or(ConversionError::Overflow(amount))
}

#[cfg(test)]
mod tests {
  use {super::*, fundme_primitives::ETHER};

  const PRICE: i128 = 2000_0000_0000;

  #[test]
  fn converts_with_feed_decimals() {
    assert_eq!(conversion_rate(ETHER, PRICE, 8), Ok(2000 * ETHER));
    assert_eq!(conversion_rate(ETHER / 40, PRICE, 8), Ok(50 * ETHER));
    assert_eq!(conversion_rate(ETHER, 2000, 0), Ok(2000 * ETHER));
    assert_eq!(conversion_rate(0, PRICE, 8), Ok(0));
  }

  #[test]
  fn rounds_down() {
    // one wei at 1.5 USD is 1.5 base units of USD
    assert_eq!(conversion_rate(1, 15, 1), Ok(1));
  }

  #[test]
  fn rejects_non_positive_prices() {
    assert_eq!(
      conversion_rate(ETHER, 0, 8),
      Err(ConversionError::NonPositivePrice(0))
    );
    assert_eq!(
      conversion_rate(ETHER, -1, 8),
      Err(ConversionError::NonPositivePrice(-1))
    );
  }

  #[test]
  fn reports_overflow() {
    assert_eq!(
      conversion_rate(Amount::MAX, PRICE, 8),
      Err(ConversionError::Overflow(Amount::MAX))
    );
    assert!(conversion_rate(ETHER, PRICE, 39).is_err());
  }
}
