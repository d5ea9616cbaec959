use fundme_primitives::Address;

/// Networks on which no price oracle exists and a mock feed is
/// deployed alongside the ledger.
pub const DEVELOPMENT_CHAINS: [&str; 3] = ["localnet", "hardhat", "localhost"];

/// Decimals of the mock price feed.
pub const DECIMALS: u8 = 8;

/// Initial answer of the mock price feed, 2000 USD.
pub const INITIAL_ANSWER: i128 = 2000_0000_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkConfig {
  pub name: &'static str,
  pub chain_id: u64,
  pub eth_usd_price_feed: Option<Address>,
}

impl NetworkConfig {
  pub fn is_development(&self) -> bool {
    DEVELOPMENT_CHAINS.contains(&self.name)
  }
}

const NETWORKS: [NetworkConfig; 4] = [
  NetworkConfig {
    name: "localnet",
    chain_id: 31337,
    eth_usd_price_feed: None,
  },
  NetworkConfig {
    name: "hardhat",
    chain_id: 31337,
    eth_usd_price_feed: None,
  },
  NetworkConfig {
    name: "localhost",
    chain_id: 31337,
    eth_usd_price_feed: None,
  },
  NetworkConfig {
    name: "sepolia",
    chain_id: 11155111,
    // 0x694AA1769357215DE4FAC081bf1f309aDC325306
    eth_usd_price_feed: Some(Address::from_bytes([
      0x69, 0x4a, 0xa1, 0x76, 0x93, 0x57, 0x21, 0x5d, 0xe4, 0xfa, 0xc0, 0x81,
      0xbf, 0x1f, 0x30, 0x9a, 0xdc, 0x32, 0x53, 0x06,
    ])),
  },
];

pub fn lookup(name: &str) -> Option<NetworkConfig> {
  NETWORKS.iter().find(|n| n.name == name).copied()
}

pub fn names() -> impl Iterator<Item = &'static str> {
  NETWORKS.iter().map(|n| n.name)
}
