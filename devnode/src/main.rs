use {
  crate::{
    node::Node,
    settings::{Command, SystemSettings},
  },
  clap::Parser,
  tracing::debug,
  tracing_subscriber::EnvFilter,
};

mod accounts;
mod commands;
mod networks;
mod node;
mod settings;
mod storage;

fn main() -> anyhow::Result<()> {
  // configure logging, RUST_LOG overrides the default level
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info")),
    )
    .init();

  // gather CLI parameters
  let settings = SystemSettings::parse();
  debug!("startup settings: {settings:#?}");

  let network = commands::network(settings.network())?;
  let mut node =
    Node::open(settings.data_dir())?.with_gas_limit(settings.gas_limit());

  match settings.command() {
    Command::Accounts => commands::accounts(&node)?,
    Command::Deploy { price_feed } => {
      commands::deploy(&mut node, &network, *price_feed)?;
    }
    Command::Fund { value, from } => commands::fund(&mut node, *from, *value)?,
    Command::Withdraw { cheaper, from } => {
      commands::withdraw(&mut node, *from, *cheaper)?
    }
    Command::UpdateMinimumUsd { value, from } => {
      commands::update_minimum_usd(&mut node, *from, *value)?
    }
    Command::SetPrice { answer } => commands::set_price(&mut node, answer)?,
    Command::Show => commands::show(&node)?,
  }

  Ok(())
}
