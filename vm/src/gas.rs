use crate::Error;

/// Resource units charged by the platform for each kind of work.
///
/// Storage access dominates the cost of contract calls, so programs
/// that read the same slot repeatedly pay for every read.
pub mod cost {
  /// Flat cost of every transaction.
  pub const TRANSACTION: u64 = 21_000;

  /// Creating a contract account.
  pub const DEPLOY: u64 = 32_000;

  /// Reading one storage slot.
  pub const STORAGE_READ: u64 = 2_100;

  /// Writing or clearing one storage slot.
  pub const STORAGE_WRITE: u64 = 5_000;

  /// Reading the balance of an account.
  pub const BALANCE_READ: u64 = 100;

  /// Entering a read-only call into another contract.
  pub const STATIC_CALL: u64 = 2_600;

  /// Moving value out of a contract.
  pub const TRANSFER: u64 = 9_000;
}

/// Tracks resource units consumed by one transaction.
#[derive(Debug, Clone)]
pub struct Meter {
  limit: u64,
  used: u64,
}

impl Meter {
  pub fn new(limit: u64) -> Self {
    Self { limit, used: 0 }
  }

  /// Consumes `units` or fails with [`Error::OutOfGas`] when that would
  /// cross the limit. A failed charge leaves the meter exhausted.
  pub fn charge(&mut self, units: u64) -> Result<(), Error> {
    match self.used.checked_add(units) {
      Some(used) if used <= self.limit => {
        self.used = used;
        Ok(())
      }
      _ => {
        self.used = self.limit;
        Err(Error::OutOfGas { limit: self.limit })
      }
    }
  }

  pub fn used(&self) -> u64 {
    self.used
  }

  pub fn limit(&self) -> u64 {
    self.limit
  }
}
