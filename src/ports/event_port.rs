//! Diagnostic event port.
//!
//! The fetcher and the rate log report what they do through this trait
//! instead of a global logger, so tests can capture the event stream.

use crate::domain::fetcher::PageFailure;
use crate::domain::period::Period;
use crate::domain::rate::{PriceAnomaly, RateRecord};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum RateEvent {
    PageRequested {
        product_id: String,
        period: Period,
    },
    PageFetched {
        product_id: String,
        period: Period,
        rows: usize,
    },
    PageFailed {
        product_id: String,
        failure: PageFailure,
    },
    RecordFlagged {
        product_id: String,
        record: RateRecord,
        anomalies: Vec<PriceAnomaly>,
    },
    UnusualGranularity {
        seconds: i64,
    },
    RecordsAppended {
        path: PathBuf,
        count: usize,
        created: bool,
    },
    LogRead {
        path: PathBuf,
        count: usize,
    },
}

pub trait EventPort {
    fn emit(&self, event: RateEvent);
}
