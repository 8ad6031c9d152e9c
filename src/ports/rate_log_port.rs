//! Rate log storage port trait.

use crate::domain::error::RatesError;
use crate::domain::rate::RateRecord;

/// Append-only store of records in chronological order.
pub trait RateLogPort {
    /// Add `records` after any existing content. Never rewrites prior rows.
    fn append(&self, records: &[RateRecord]) -> Result<(), RatesError>;

    /// Every stored record, in the order they were appended.
    fn read(&self) -> Result<Vec<RateRecord>, RatesError>;
}
