//! Candle record representation.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::fmt;

/// One OHLC bucket of `[start_time, end_time)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateRecord {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub lowest_price: Decimal,
    pub highest_price: Decimal,
    pub opening_price: Decimal,
    pub closing_price: Decimal,
    pub volume_of_trading: Decimal,
}

/// A way in which a record breaks the price ordering or sign rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceAnomaly {
    NegativeValue,
    LowAboveHigh,
    OpenOutsideRange,
    CloseOutsideRange,
    EmptyBucket,
}

impl fmt::Display for PriceAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            PriceAnomaly::NegativeValue => "negative price or volume",
            PriceAnomaly::LowAboveHigh => "low above high",
            PriceAnomaly::OpenOutsideRange => "open outside low..high",
            PriceAnomaly::CloseOutsideRange => "close outside low..high",
            PriceAnomaly::EmptyBucket => "end time not after start time",
        };
        f.write_str(text)
    }
}

impl RateRecord {
    pub fn granularity(&self) -> Duration {
        self.end_time - self.start_time
    }

    /// Checks `low <= open, close <= high` and non-negativity.
    ///
    /// The record is never adjusted; callers decide what to do with the flags.
    pub fn anomalies(&self) -> Vec<PriceAnomaly> {
        let mut found = Vec::new();

        if self.end_time <= self.start_time {
            found.push(PriceAnomaly::EmptyBucket);
        }
        let values = [
            self.lowest_price,
            self.highest_price,
            self.opening_price,
            self.closing_price,
            self.volume_of_trading,
        ];
        if values.iter().any(|v| v.is_sign_negative() && !v.is_zero()) {
            found.push(PriceAnomaly::NegativeValue);
        }
        if self.lowest_price > self.highest_price {
            found.push(PriceAnomaly::LowAboveHigh);
        }
        if !self.in_range(self.opening_price) {
            found.push(PriceAnomaly::OpenOutsideRange);
        }
        if !self.in_range(self.closing_price) {
            found.push(PriceAnomaly::CloseOutsideRange);
        }

        found
    }

    /// `(start epoch seconds, closing price)`, the pair a price model trains on.
    pub fn training_point(&self) -> (i64, Decimal) {
        (self.start_time.timestamp(), self.closing_price)
    }

    fn in_range(&self, price: Decimal) -> bool {
        self.lowest_price <= price && price <= self.highest_price
    }
}

/// Split a chronological series into a leading training share and the rest.
///
/// `train_ratio` is clamped to `0.0..=1.0`; the split row is rounded to the
/// nearest record.
pub fn split_train_test(records: &[RateRecord], train_ratio: f64) -> (&[RateRecord], &[RateRecord]) {
    let ratio = train_ratio.clamp(0.0, 1.0);
    let row = ((records.len() as f64) * ratio).round() as usize;
    records.split_at(row.min(records.len()))
}
