//! Paginated candle retrieval.
//!
//! [`RateFetcher`] plans a requested range into page-sized periods, fetches
//! each period from `/products/{id}/candles`, sorts the rows and maps them to
//! [`RateRecord`]s. Pages that fail are reported next to the records in a
//! [`FetchOutcome`] rather than dropped silently.

use crate::domain::error::RatesError;
use crate::domain::period::{plan, Period};
use crate::domain::product::Product;
use crate::domain::rate::{PriceAnomaly, RateRecord};
use crate::ports::event_port::{EventPort, RateEvent};
use crate::ports::http_port::HttpPort;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Row cap of the public candles endpoint.
pub const DEFAULT_MAX_POINTS_PER_PAGE: u32 = 300;

/// Bucket widths, in seconds, the exchange accepts.
pub const SUPPORTED_GRANULARITIES: [i64; 6] = [60, 300, 900, 3600, 21_600, 86_400];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageFailureKind {
    Status { status: u16, message: Option<String> },
    Transport { reason: String },
    Malformed { reason: String },
    Cancelled,
}

impl fmt::Display for PageFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageFailureKind::Status {
                status,
                message: Some(message),
            } => write!(f, "status {status}: {message}"),
            PageFailureKind::Status {
                status,
                message: None,
            } => write!(f, "status {status}"),
            PageFailureKind::Transport { reason } => write!(f, "transport: {reason}"),
            PageFailureKind::Malformed { reason } => write!(f, "malformed body: {reason}"),
            PageFailureKind::Cancelled => f.write_str("cancelled before request"),
        }
    }
}

/// A period that contributed no records because its request failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub period: Period,
    pub kind: PageFailureKind,
}

/// A record kept in the result despite breaking the price rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlaggedRecord {
    /// Position in [`FetchOutcome::records`].
    pub index: usize,
    pub anomalies: Vec<PriceAnomaly>,
}

/// Records from every page that succeeded, plus what went wrong elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOutcome {
    pub records: Vec<RateRecord>,
    pub failures: Vec<PageFailure>,
    pub flagged: Vec<FlaggedRecord>,
    pub total_pages: usize,
}

impl FetchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// `PartialFetch` if any page failed.
    pub fn check_complete(&self) -> Result<(), RatesError> {
        if self.is_complete() {
            Ok(())
        } else {
            Err(RatesError::PartialFetch {
                failed_pages: self.failures.len(),
                total_pages: self.total_pages,
            })
        }
    }

    /// The records, or `PartialFetch` if any page failed.
    pub fn into_complete(self) -> Result<Vec<RateRecord>, RatesError> {
        self.check_complete()?;
        Ok(self.records)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct RateFetcher<'a> {
    http: &'a dyn HttpPort,
    events: &'a dyn EventPort,
    max_points_per_page: u32,
    deadline: Option<Instant>,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> RateFetcher<'a> {
    pub fn new(http: &'a dyn HttpPort, events: &'a dyn EventPort) -> Self {
        Self {
            http,
            events,
            max_points_per_page: DEFAULT_MAX_POINTS_PER_PAGE,
            deadline: None,
            cancel: None,
        }
    }

    pub fn with_max_points_per_page(mut self, max_points_per_page: u32) -> Self {
        self.max_points_per_page = max_points_per_page;
        self
    }

    /// Pages not yet requested when `deadline` passes are reported as cancelled.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Pages not yet requested once `flag` is set are reported as cancelled.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn list_products(&self) -> Result<Vec<Product>, RatesError> {
        let response = self.http.get("/products", &[])?;
        if !response.is_success() {
            return Err(RatesError::Fetch {
                status: response.status,
                message: error_message(&response.body),
            });
        }
        serde_json::from_str(&response.body).map_err(|e| RatesError::Malformed {
            reason: format!("product listing: {e}"),
        })
    }

    /// Fetch `[start, end)` of `product_id` candles, one request per period,
    /// in ascending order.
    ///
    /// Only planning problems are returned as `Err`; per-page failures are
    /// collected in the outcome and the remaining pages are still fetched.
    pub fn fetch(
        &self,
        product_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: Duration,
    ) -> Result<FetchOutcome, RatesError> {
        let periods = plan(start, end, granularity, self.max_points_per_page)?;
        if granularity.subsec_nanos() != 0 {
            return Err(RatesError::Planning {
                reason: format!("granularity must be whole seconds, got {granularity}"),
            });
        }
        let seconds = granularity.num_seconds();
        if !SUPPORTED_GRANULARITIES.contains(&seconds) {
            self.events.emit(RateEvent::UnusualGranularity { seconds });
        }

        let mut outcome = FetchOutcome {
            total_pages: periods.len(),
            ..FetchOutcome::default()
        };

        for period in periods {
            let result = if self.is_halted() {
                Err(PageFailureKind::Cancelled)
            } else {
                self.events.emit(RateEvent::PageRequested {
                    product_id: product_id.to_string(),
                    period,
                });
                self.fetch_page(product_id, period, granularity)
            };

            match result {
                Ok(records) => {
                    self.events.emit(RateEvent::PageFetched {
                        product_id: product_id.to_string(),
                        period,
                        rows: records.len(),
                    });
                    for record in records {
                        let anomalies = record.anomalies();
                        if !anomalies.is_empty() {
                            self.events.emit(RateEvent::RecordFlagged {
                                product_id: product_id.to_string(),
                                record: record.clone(),
                                anomalies: anomalies.clone(),
                            });
                            outcome.flagged.push(FlaggedRecord {
                                index: outcome.records.len(),
                                anomalies,
                            });
                        }
                        outcome.records.push(record);
                    }
                }
                Err(kind) => {
                    let failure = PageFailure { period, kind };
                    self.events.emit(RateEvent::PageFailed {
                        product_id: product_id.to_string(),
                        failure: failure.clone(),
                    });
                    outcome.failures.push(failure);
                }
            }
        }

        Ok(outcome)
    }

    fn fetch_page(
        &self,
        product_id: &str,
        period: Period,
        granularity: Duration,
    ) -> Result<Vec<RateRecord>, PageFailureKind> {
        let path = format!("/products/{product_id}/candles");
        let query = [
            ("start", wire_time(period.start)),
            ("end", wire_time(period.end)),
            ("granularity", granularity.num_seconds().to_string()),
        ];

        let response = self
            .http
            .get(&path, &query)
            .map_err(|e| PageFailureKind::Transport {
                reason: e.to_string(),
            })?;
        if !response.is_success() {
            return Err(PageFailureKind::Status {
                status: response.status,
                message: error_message(&response.body),
            });
        }

        parse_candles(&response.body, granularity)
            .map_err(|reason| PageFailureKind::Malformed { reason })
    }

    fn is_halted(&self) -> bool {
        let cancelled = self
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed));
        let expired = self.deadline.is_some_and(|d| Instant::now() >= d);
        cancelled || expired
    }
}

fn wire_time(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|b| b.message)
}

/// Parse `[[time, low, high, open, close, volume], ...]`, sort by time and
/// build one record per row.
fn parse_candles(body: &str, granularity: Duration) -> Result<Vec<RateRecord>, String> {
    let rows: Vec<Vec<serde_json::Number>> =
        serde_json::from_str(body).map_err(|e| e.to_string())?;

    let mut parsed = Vec::with_capacity(rows.len());
    for row in &rows {
        let [time, low, high, open, close, volume] = row.as_slice() else {
            return Err(format!("expected 6 fields per row, got {}", row.len()));
        };
        let time = time
            .as_i64()
            .ok_or_else(|| format!("timestamp `{time}` is not an integer"))?;
        parsed.push((
            time,
            [
                to_decimal(low)?,
                to_decimal(high)?,
                to_decimal(open)?,
                to_decimal(close)?,
                to_decimal(volume)?,
            ],
        ));
    }
    parsed.sort_by_key(|(time, _)| *time);

    parsed
        .into_iter()
        .map(|(time, [low, high, open, close, volume])| {
            let start_time = DateTime::<Utc>::from_timestamp(time, 0)
                .ok_or_else(|| format!("timestamp {time} out of range"))?;
            let end_time = start_time
                .checked_add_signed(granularity)
                .ok_or_else(|| format!("timestamp {time} plus {granularity} out of range"))?;
            Ok(RateRecord {
                start_time,
                end_time,
                lowest_price: low,
                highest_price: high,
                opening_price: open,
                closing_price: close,
                volume_of_trading: volume,
            })
        })
        .collect()
}

fn to_decimal(n: &serde_json::Number) -> Result<Decimal, String> {
    let text = n.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|e| format!("`{text}` is not a decimal: {e}"))
}
