use {
  crate::{
    codec::{decode, encode},
    gas::{cost, Meter},
    BlockInfo,
    Error,
    Registry,
    State,
    StateDiff,
  },
  fundme_primitives::{Account, Address, Amount},
  serde::{de::DeserializeOwned, Serialize},
};

/// Everything a contract program can see and touch while it runs.
///
/// A context represents one call frame. Reads go through the frame's
/// overlay first and fall back to committed state, writes only ever
/// land in the overlay. The overlay is shared by all frames of one
/// transaction and becomes the transaction's [`StateDiff`] if it
/// succeeds.
pub struct Context<'a> {
  pub(crate) state: &'a dyn State,
  pub(crate) overlay: &'a mut StateDiff,
  pub(crate) registry: &'a Registry,
  pub(crate) meter: &'a mut Meter,
  pub(crate) block: BlockInfo,
  pub(crate) caller: Address,
  pub(crate) address: Address,
  pub(crate) value: Amount,
  pub(crate) read_only: bool,
}

impl<'a> Context<'a> {
  /// The account that invoked this frame, a wallet for the outermost
  /// frame of a transaction and a contract for nested frames.
  pub fn caller(&self) -> Address {
    self.caller
  }

  /// Address of the contract account this frame runs for.
  pub fn address(&self) -> Address {
    self.address
  }

  /// Value attached to this frame, already credited to `address()`.
  pub fn value(&self) -> Amount {
    self.value
  }

  pub fn block(&self) -> &BlockInfo {
    &self.block
  }

  /// Reads and decodes a storage slot of the current contract.
  pub fn load<T: DeserializeOwned>(
    &mut self,
    key: &[u8],
  ) -> Result<Option<T>, Error> {
    self.meter.charge(cost::STORAGE_READ)?;
    let bytes = match self.overlay.account_ref(&self.address) {
      Some(acc) => acc.storage.get(key).cloned(),
      None => self
        .state
        .get(&self.address)
        .and_then(|mut acc| acc.storage.remove(key)),
    };
    bytes.map(|b| decode(&b)).transpose()
  }

  /// Encodes and writes a storage slot of the current contract.
  pub fn store<T: Serialize + ?Sized>(
    &mut self,
    key: &[u8],
    value: &T,
  ) -> Result<(), Error> {
    self.ensure_writable()?;
    self.meter.charge(cost::STORAGE_WRITE)?;
    let bytes = encode(value)?;
    self.modify(self.address, |acc| {
      acc.storage.insert(key.to_vec(), bytes);
      Ok(())
    })
  }

  /// Clears a storage slot of the current contract, subsequent loads
  /// of this key return `None`.
  pub fn remove(&mut self, key: &[u8]) -> Result<(), Error> {
    self.ensure_writable()?;
    self.meter.charge(cost::STORAGE_WRITE)?;
    self.modify(self.address, |acc| {
      acc.storage.remove(key);
      Ok(())
    })
  }

  pub fn balance(&mut self, address: &Address) -> Result<Amount, Error> {
    self.meter.charge(cost::BALANCE_READ)?;
    Ok(self.account(address).map(|acc| acc.balance).unwrap_or(0))
  }

  /// Moves value from the current contract to `to`.
  ///
  /// If the recipient is a contract its receive handler runs in a new
  /// frame. When anything fails, the overlay is restored to what it was
  /// before the transfer started, so a caller that handles the error
  /// observes no partial effects.
  pub fn transfer(&mut self, to: Address, amount: Amount) -> Result<(), Error> {
    self.ensure_writable()?;
    self.meter.charge(cost::TRANSFER)?;

    let checkpoint = self.overlay.clone();
    let result = self.move_value(self.address, to, amount).and_then(|()| {
      if self.account(&to).map_or(false, |acc| acc.is_contract()) {
        dispatch(&mut self.frame(to, amount, false), &[]).map(|_| ())
      } else {
        Ok(())
      }
    });

    if result.is_err() {
      *self.overlay = checkpoint;
    }
    result
  }

  /// Invokes another contract in a read-only frame and returns its
  /// encoded output. Any storage write attempted by the callee fails.
  pub fn static_call(
    &mut self,
    to: Address,
    input: &[u8],
  ) -> Result<Vec<u8>, Error> {
    self.meter.charge(cost::STATIC_CALL)?;
    dispatch(&mut self.frame(to, 0, true), input)
  }

  pub(crate) fn account(&self, address: &Address) -> Option<Account> {
    self
      .overlay
      .account_ref(address)
      .cloned()
      .or_else(|| self.state.get(address))
  }

  pub(crate) fn modify<R>(
    &mut self,
    address: Address,
    op: impl FnOnce(&mut Account) -> Result<R, Error>,
  ) -> Result<R, Error> {
    let mut account = self.account(&address).unwrap_or_default();
    let output = op(&mut account)?;
    self.overlay.set(address, account);
    Ok(output)
  }

  pub(crate) fn move_value(
    &mut self,
    from: Address,
    to: Address,
    amount: Amount,
  ) -> Result<(), Error> {
    if amount == 0 {
      return Ok(());
    }

    self.modify(from, |acc| {
      acc.balance = acc.balance.checked_sub(amount).ok_or(
        Error::InsufficientFunds {
          account: from,
          required: amount,
          available: acc.balance,
        },
      )?;
      Ok(())
    })?;

    self.modify(to, |acc| {
      acc.balance = acc
        .balance
        .checked_add(amount)
        .ok_or(Error::BalanceOverflow(to))?;
      Ok(())
    })
  }

  fn frame(
    &mut self,
    address: Address,
    value: Amount,
    read_only: bool,
  ) -> Context<'_> {
    Context {
      state: self.state,
      overlay: &mut *self.overlay,
      registry: self.registry,
      meter: &mut *self.meter,
      block: self.block,
      caller: self.address,
      address,
      value,
      read_only: self.read_only || read_only,
    }
  }

  fn ensure_writable(&self) -> Result<(), Error> {
    if self.read_only {
      return Err(Error::StaticWrite);
    }
    Ok(())
  }
}

/// Runs the program of the contract at `ctx.address()`.
///
/// Empty input goes to the receive handler, anything else to the
/// call handler.
pub(crate) fn dispatch(
  ctx: &mut Context<'_>,
  input: &[u8],
) -> Result<Vec<u8>, Error> {
  let registry = ctx.registry;
  let code = ctx
    .account(&ctx.address)
    .and_then(|acc| acc.code)
    .ok_or(Error::NotAContract(ctx.address))?;
  let program = registry
    .get(&code)
    .ok_or_else(|| Error::UnknownCode(code.clone()))?;

  if input.is_empty() {
    program.receive(ctx).map(|()| Vec::new())
  } else {
    program.call(ctx, input)
  }
}
