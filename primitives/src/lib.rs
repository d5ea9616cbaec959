mod account;
mod address;
mod b58;
mod transaction;
mod units;

pub use {
  account::{Account, Amount, Code},
  address::{Address, Error as AddressError},
  b58::ToBase58String,
  transaction::{Payload, Transaction, DEFAULT_GAS_LIMIT, DEFAULT_GAS_PRICE},
  units::{
    format_ether,
    format_units,
    parse_ether,
    parse_units,
    Error as UnitsError,
    ETHER,
  },
};
