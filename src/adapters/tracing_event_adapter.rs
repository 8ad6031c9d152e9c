//! Forwards rate events to `tracing`.

use crate::ports::event_port::{EventPort, RateEvent};
use tracing::{debug, info, warn};

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventAdapter;

impl EventPort for TracingEventAdapter {
    fn emit(&self, event: RateEvent) {
        match event {
            RateEvent::PageRequested { product_id, period } => {
                debug!(product = %product_id, start = %period.start, end = %period.end, "requesting page");
            }
            RateEvent::PageFetched {
                product_id,
                period,
                rows,
            } => {
                info!(product = %product_id, start = %period.start, end = %period.end, rows, "fetched page");
            }
            RateEvent::PageFailed {
                product_id,
                failure,
            } => {
                warn!(
                    product = %product_id,
                    start = %failure.period.start,
                    end = %failure.period.end,
                    error = %failure.kind,
                    "page failed"
                );
            }
            RateEvent::RecordFlagged {
                product_id,
                record,
                anomalies,
            } => {
                let anomalies: Vec<String> = anomalies.iter().map(|a| a.to_string()).collect();
                warn!(
                    product = %product_id,
                    start = %record.start_time,
                    anomalies = %anomalies.join(", "),
                    "record breaks price ordering"
                );
            }
            RateEvent::UnusualGranularity { seconds } => {
                warn!(seconds, "granularity is not one the exchange lists");
            }
            RateEvent::RecordsAppended {
                path,
                count,
                created,
            } => {
                info!(path = %path.display(), count, created, "appended records");
            }
            RateEvent::LogRead { path, count } => {
                debug!(path = %path.display(), count, "read rate log");
            }
        }
    }
}
