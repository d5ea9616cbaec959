use {
  clap::{Parser, Subcommand},
  fundme_primitives::{
    parse_ether,
    parse_units,
    Address,
    Amount,
    UnitsError,
    DEFAULT_GAS_LIMIT,
  },
  std::path::PathBuf,
};

/// FundMe Local Devnode
///
/// A single process development chain that runs the FundMe ledger.
/// Every invocation executes at most one command against the chain
/// persisted in the data directory.
#[derive(Debug, Parser)]
pub struct SystemSettings {
  /// Directory where chain state is kept between invocations
  #[clap(long, short, default_value = ".fundme", value_name = "PATH")]
  data_dir: PathBuf,

  /// Network the deployment targets
  #[clap(long, short, default_value = "localnet", value_name = "NAME")]
  network: String,

  /// Gas limit of every transaction sent by the command
  #[clap(long, default_value_t = DEFAULT_GAS_LIMIT, value_name = "UNITS")]
  gas_limit: u64,

  #[clap(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
  /// List dev accounts and their balances
  Accounts,

  /// Deploy the ledger, with a mock price feed on development networks
  Deploy {
    /// Price feed to use instead of the network default
    #[clap(long, value_name = "ADDRESS")]
    price_feed: Option<Address>,
  },

  /// Contribute to the ledger
  Fund {
    /// Contribution in ether, e.g. 0.1
    #[clap(long, value_name = "ETHER", value_parser = parse_ether_arg)]
    value: Amount,

    /// Index of the dev account that funds
    #[clap(long, default_value = "0", value_name = "INDEX")]
    from: usize,
  },

  /// Withdraw all funds to the owner
  Withdraw {
    /// Use the withdraw variant that reads funders from storage once
    #[clap(long)]
    cheaper: bool,

    /// Index of the dev account that sends the withdrawal
    #[clap(long, default_value = "0", value_name = "INDEX")]
    from: usize,
  },

  /// Change the minimum contribution
  UpdateMinimumUsd {
    /// New minimum in USD, e.g. 50
    #[clap(long, value_name = "USD", value_parser = parse_usd_arg)]
    value: Amount,

    /// Index of the dev account that sends the update
    #[clap(long, default_value = "0", value_name = "INDEX")]
    from: usize,
  },

  /// Publish a new answer on the mock price feed
  SetPrice {
    /// Price of one ether in USD, e.g. 2500.5
    #[clap(long, value_name = "USD")]
    answer: String,
  },

  /// Print the ledger state
  Show,
}

impl SystemSettings {
  pub fn data_dir(&self) -> &PathBuf {
    &self.data_dir
  }

  pub fn network(&self) -> &str {
    &self.network
  }

  pub fn gas_limit(&self) -> u64 {
    self.gas_limit
  }

  pub fn command(&self) -> &Command {
    &self.command
  }
}

fn parse_ether_arg(value: &str) -> Result<Amount, UnitsError> {
  parse_ether(value)
}

fn parse_usd_arg(value: &str) -> Result<Amount, UnitsError> {
  parse_units(value, 18)
}
