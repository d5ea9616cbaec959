use {
  crate::{
    networks::{self, NetworkConfig, DECIMALS, INITIAL_ANSWER},
    node::Node,
  },
  anyhow::{anyhow, bail},
  fundme_contracts::{
    FundMeCall,
    FundMeConstructor,
    MockAggregatorCall,
    MockAggregatorConstructor,
    PriceFeedCall,
    RoundData,
    FUND_ME,
    MOCK_V3_AGGREGATOR,
  },
  fundme_primitives::{format_ether, format_units, parse_units, Address, Amount},
  tracing::{info, warn},
};

/// Deployment record names.
pub const MOCK_DEPLOYMENT: &str = "MockV3Aggregator";
pub const FUND_ME_DEPLOYMENT: &str = "FundMe";

const DEPLOYER: usize = 0;

pub fn network(name: &str) -> anyhow::Result<NetworkConfig> {
  networks::lookup(name).ok_or_else(|| {
    anyhow!(
      "unknown network '{name}', expected one of: {}",
      networks::names().collect::<Vec<_>>().join(", ")
    )
  })
}

pub fn accounts(node: &Node) -> anyhow::Result<()> {
  for (index, address) in node.accounts().enumerate() {
    info!(
      "account #{index}: {address} ({} ETH)",
      format_ether(node.balance(&address))?
    );
  }
  Ok(())
}

/// Deploys the ledger on `network`.
///
/// Development networks have no price oracle, so a mock feed is
/// deployed first and the ledger reads prices from it.
pub fn deploy(
  node: &mut Node,
  network: &NetworkConfig,
  price_feed: Option<Address>,
) -> anyhow::Result<Address> {
  let price_feed = match (price_feed, network.is_development()) {
    (Some(feed), _) => feed,
    (None, true) => {
      info!("Local network detected! Deploying mocks...");
      let args = MockAggregatorConstructor {
        decimals: DECIMALS,
        initial_answer: INITIAL_ANSWER,
      };
      let mock = node.deploy(DEPLOYER, MOCK_V3_AGGREGATOR, &args)?;
      node.record_deployment(MOCK_DEPLOYMENT, mock)?;
      info!("Mocks Deployed at {mock}!");
      info!("------------------------------------------------");
      mock
    }
    (None, false) => network.eth_usd_price_feed.ok_or_else(|| {
      anyhow!("network {} has no price feed configured", network.name)
    })?,
  };

  if !network.is_development() {
    warn!(
      "{} (chain id {}) price feed {price_feed} only exists if it has \
       been deployed on this chain",
      network.name, network.chain_id
    );
  }

  info!("Deploying FundMe and waiting for confirmations...");
  let args = FundMeConstructor { price_feed };
  let fund_me = node.deploy(DEPLOYER, FUND_ME, &args)?;
  node.record_deployment(FUND_ME_DEPLOYMENT, fund_me)?;
  info!("FundMe deployed at {fund_me}");
  info!("------------------------------------------------");
  Ok(fund_me)
}

pub fn fund(node: &mut Node, from: usize, value: Amount) -> anyhow::Result<()> {
  let fund_me = node.deployment(FUND_ME_DEPLOYMENT)?;
  info!(
    "Funding contract {fund_me} with {} ETH from {}...",
    format_ether(value)?,
    node.address(from)?
  );
  node.call(from, fund_me, value, &FundMeCall::Fund)?;
  info!("Funded!");
  Ok(())
}

pub fn withdraw(
  node: &mut Node,
  from: usize,
  cheaper: bool,
) -> anyhow::Result<()> {
  let fund_me = node.deployment(FUND_ME_DEPLOYMENT)?;
  let call = if cheaper {
    FundMeCall::CheaperWithdraw
  } else {
    FundMeCall::Withdraw
  };

  info!("Withdrawing from contract {fund_me}...");
  let receipt = node.call(from, fund_me, 0, &call)?;
  info!("Got it back! ({} gas used)", receipt.gas_used);
  Ok(())
}

pub fn update_minimum_usd(
  node: &mut Node,
  from: usize,
  minimum_usd: Amount,
) -> anyhow::Result<()> {
  let fund_me = node.deployment(FUND_ME_DEPLOYMENT)?;
  let call = FundMeCall::UpdateMinimumUsd { minimum_usd };
  node.call(from, fund_me, 0, &call)?;
  info!("Minimum contribution is now {} USD", format_ether(minimum_usd)?);
  Ok(())
}

pub fn set_price(node: &mut Node, answer: &str) -> anyhow::Result<()> {
  let feed = node.deployment(MOCK_DEPLOYMENT)?;
  let decimals: u8 = node.view(feed, &PriceFeedCall::Decimals)?;
  let scaled = parse_units(answer, decimals.into())?;
  let Ok(answer) = i128::try_from(scaled) else {
    bail!("price {answer} is out of range");
  };

  let call = MockAggregatorCall::UpdateAnswer { answer };
  node.call(DEPLOYER, feed, 0, &call)?;
  info!(
    "Price feed {feed} now reports {}",
    format_units(scaled, decimals.into())?
  );
  Ok(())
}

pub fn show(node: &Node) -> anyhow::Result<()> {
  let fund_me = node.deployment(FUND_ME_DEPLOYMENT)?;
  let owner: Address = node.view(fund_me, &FundMeCall::GetOwner)?;
  let feed: Address = node.view(fund_me, &FundMeCall::GetPriceFeed)?;
  let minimum: Amount = node.view(fund_me, &FundMeCall::GetMinimumUsd)?;
  let version = node
    .view::<u64>(fund_me, &FundMeCall::GetVersion)
    .map(|v| v.to_string())
    .unwrap_or_else(|_| "unknown".into());
  let count: u64 = node.view(fund_me, &FundMeCall::GetFundersCount)?;

  let block = node.store().latest_block()?;
  info!("latest block: {}", block.height);
  info!("FundMe: {fund_me}");
  info!("  owner: {owner}");
  info!("  balance: {} ETH", format_ether(node.balance(&fund_me))?);
  info!("  minimum contribution: {} USD", format_ether(minimum)?);
  info!("  price feed: {feed} (version {version})");
  if let Ok(description) =
    node.view::<String>(feed, &PriceFeedCall::Description)
  {
    info!("  pair: {description}");
  }

  match node.view::<RoundData>(feed, &PriceFeedCall::LatestRoundData) {
    Ok(round) => {
      let decimals: u8 = node.view(feed, &PriceFeedCall::Decimals)?;
      info!(
        "  price: {} USD (round {})",
        format_units(round.answer.max(0) as u128, decimals.into())?,
        round.round_id
      );
    }
    Err(e) => warn!("  price unavailable: {e}"),
  }

  info!("  funders: {count}");
  for index in 0..count {
    let funder: Address =
      node.view(fund_me, &FundMeCall::GetFunder { index })?;
    let amount: Amount =
      node.view(fund_me, &FundMeCall::GetAddressToAmountFunded { funder })?;
    info!("    #{index} {funder}: {} ETH", format_ether(amount)?);
  }
  Ok(())
}
