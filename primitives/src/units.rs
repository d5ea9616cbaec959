use {crate::Amount, rust_decimal::Decimal, thiserror::Error};

/// Number of base units in one ether.
pub const ETHER: Amount = 1_000_000_000_000_000_000;

const ETHER_DECIMALS: u32 = 18;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
  #[error("'{0}' is not a decimal number")]
  Malformed(String),

  #[error("'{0}' has more than {1} fractional digits")]
  TooPrecise(String, u32),

  #[error("'{0}' does not fit in 128 bits with {1} decimals")]
  Overflow(String, u32),
}

/// Parses a decimal string like `"0.5"` into an integer amount with
/// `decimals` fractional digits, so `parse_units("0.5", 18)` is `5 * 10^17`.
///
/// Inputs are limited to the 28 significant digits a [`Decimal`] holds.
pub fn parse_units(value: &str, decimals: u32) -> Result<Amount, Error> {
  let value = value.trim();
  let parsed = Decimal::from_str_exact(value)
    .map_err(|_| Error::Malformed(value.to_owned()))?;
  if parsed.is_sign_negative() {
    return Err(Error::Malformed(value.to_owned()));
  }

  let parsed = parsed.normalize();
  if parsed.scale() > decimals {
    return Err(Error::TooPrecise(value.to_owned(), decimals));
  }

  let overflow = || Error::Overflow(value.to_owned(), decimals);
  let mantissa = u128::try_from(parsed.mantissa()).map_err(|_| overflow())?;
  10u128
    .checked_pow(decimals - parsed.scale())
    .and_then(|scale| mantissa.checked_mul(scale))
    .ok_or_else(overflow)
}

/// Shorthand for `parse_units(value, 18)`.
pub fn parse_ether(value: &str) -> Result<Amount, Error> {
  parse_units(value, ETHER_DECIMALS)
}

/// Renders an integer amount with `decimals` fractional digits as a
/// decimal string, `format_units(15 * 10^17, 18)` is `"1.5"`.
///
/// Whole amounts keep one fractional zero, as in `"2000.0"`.
pub fn format_units(amount: Amount, decimals: u32) -> Result<String, Error> {
  let overflow = || Error::Overflow(amount.to_string(), decimals);
  let mantissa = i128::try_from(amount).map_err(|_| overflow())?;
  let value = Decimal::try_from_i128_with_scale(mantissa, decimals)
    .map_err(|_| overflow())?
    .normalize();

  Ok(if decimals > 0 && value.scale() == 0 {
    format!("{value}.0")
  } else {
    value.to_string()
  })
}

pub fn format_ether(amount: Amount) -> Result<String, Error> {
  format_units(amount, ETHER_DECIMALS)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_ether_amounts() {
    assert_eq!(parse_ether("1"), Ok(ETHER));
    assert_eq!(parse_ether("0.5"), Ok(ETHER / 2));
    assert_eq!(parse_ether(" 0.70 "), Ok(7 * ETHER / 10));
    assert_eq!(parse_ether("2000.00"), Ok(2000 * ETHER));
    assert_eq!(parse_ether("0.000000000000000001"), Ok(1));
    assert_eq!(parse_units("2500", 8), Ok(250_000_000_000));
  }

  #[test]
  fn rejects_bad_input() {
    assert!(matches!(parse_ether(""), Err(Error::Malformed(_))));
    assert!(matches!(parse_ether("-1"), Err(Error::Malformed(_))));
    assert!(matches!(parse_ether("1.2.3"), Err(Error::Malformed(_))));
    assert!(matches!(parse_ether("ten"), Err(Error::Malformed(_))));
    assert!(matches!(
      parse_ether("0.0000000000000000001"),
      Err(Error::TooPrecise(_, 18))
    ));
    assert!(matches!(
      parse_ether("1000000000000000000000"),
      Err(Error::Overflow(_, 18))
    ));
  }

  #[test]
  fn formats_amounts() {
    assert_eq!(format_ether(ETHER), Ok("1.0".into()));
    assert_eq!(format_ether(ETHER * 3 / 2), Ok("1.5".into()));
    assert_eq!(format_ether(1), Ok("0.000000000000000001".into()));
    assert_eq!(format_ether(0), Ok("0.0".into()));
    assert_eq!(format_units(200_000_000_000, 8), Ok("2000.0".into()));
    assert_eq!(format_units(42, 0), Ok("42".into()));
  }

  #[test]
  fn rejects_amounts_beyond_decimal_range() {
    assert!(matches!(
      format_ether(u128::MAX),
      Err(Error::Overflow(_, 18))
    ));
    assert!(matches!(format_units(1, 40), Err(Error::Overflow(_, 40))));
  }
}
