use {
  crate::{Context, Error},
  fundme_primitives::Code,
  std::{collections::HashMap, fmt::Debug},
};

/// A native program that governs contract accounts.
///
/// One program instance serves every account whose code names it, the
/// account being served is `ctx.address()`. Programs keep no state of
/// their own, everything persistent goes through the context storage.
pub trait Contract {
  /// Runs once when a contract account is created by a deployment.
  fn construct(&self, ctx: &mut Context<'_>, args: &[u8]) -> Result<(), Error>;

  /// Handles a call with non-empty input and returns encoded output.
  fn call(&self, ctx: &mut Context<'_>, input: &[u8]) -> Result<Vec<u8>, Error>;

  /// Handles plain value transfers into the contract.
  fn receive(&self, _ctx: &mut Context<'_>) -> Result<(), Error> {
    Err(Error::revert("contract does not accept value transfers"))
  }
}

/// Set of programs known to the platform, keyed by code name.
#[derive(Default)]
pub struct Registry {
  programs: HashMap<Code, Box<dyn Contract>>,
}

impl Registry {
  pub fn register(&mut self, code: Code, program: impl Contract + 'static) {
    self.programs.insert(code, Box::new(program));
  }

  pub fn with(mut self, code: Code, program: impl Contract + 'static) -> Self {
    self.register(code, program);
    self
  }

  pub fn get(&self, code: &Code) -> Option<&dyn Contract> {
    self.programs.get(code).map(|p| p.as_ref())
  }
}

impl Debug for Registry {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_set().entries(self.programs.keys()).finish()
  }
}
