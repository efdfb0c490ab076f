//! The source of "today" for age and date checks.

use chrono::{Local, NaiveDate};

/// Supplies the current calendar date. Injected so that age calculations can
/// be pinned in tests.
pub trait Clock: Send + Sync {
  fn today(&self) -> NaiveDate;
}

/// Reads the local system date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn today(&self) -> NaiveDate { Local::now().date_naive() }
}

/// Always reports the same date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
  fn today(&self) -> NaiveDate { self.0 }
}
