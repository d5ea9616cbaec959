mod codec;
mod context;
mod contract;
mod execution;
mod gas;
mod state;

pub use {
  codec::{decode, encode},
  context::Context,
  contract::{Contract, Registry},
  execution::{execute, query, BlockInfo, Error, Receipt, Revert},
  gas::{cost, Meter},
  state::{InMemoryStateStore, State, StateDiff},
};
