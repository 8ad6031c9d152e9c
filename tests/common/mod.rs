#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use gdaxrates::domain::error::RatesError;
use gdaxrates::domain::rate::RateRecord;
use gdaxrates::ports::event_port::{EventPort, RateEvent};
use gdaxrates::ports::http_port::{HttpPort, HttpResponse};
use rust_decimal::Decimal;
use serde_json::json;
use std::cell::RefCell;
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Call {
    pub path: String,
    pub query: HashMap<String, String>,
}

impl Call {
    pub fn start(&self) -> DateTime<Utc> {
        parse_wire(&self.query["start"])
    }

    pub fn end(&self) -> DateTime<Utc> {
        parse_wire(&self.query["end"])
    }
}

type Responder = Box<dyn Fn(&Call) -> Result<HttpResponse, RatesError>>;

/// In-memory market-data host that records every request.
pub struct MockHttpPort {
    pub calls: RefCell<Vec<Call>>,
    responder: Responder,
}

impl MockHttpPort {
    pub fn new(responder: impl Fn(&Call) -> Result<HttpResponse, RatesError> + 'static) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            responder: Box::new(responder),
        }
    }

    /// Serves one candle per bucket of the requested window, newest first.
    pub fn synthetic() -> Self {
        Self::new(|call| Ok(HttpResponse::new(200, synthetic_body(call))))
    }

    /// Like [`MockHttpPort::synthetic`] but answers pages starting at any of
    /// `failing` with `status` and a JSON error message.
    pub fn failing_at(failing: Vec<DateTime<Utc>>, status: u16, message: &str) -> Self {
        let message = message.to_string();
        Self::new(move |call| {
            if failing.contains(&call.start()) {
                Ok(HttpResponse::new(
                    status,
                    json!({ "message": message }).to_string(),
                ))
            } else {
                Ok(HttpResponse::new(200, synthetic_body(call)))
            }
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl HttpPort for MockHttpPort {
    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<HttpResponse, RatesError> {
        let call = Call {
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        };
        let response = (self.responder)(&call);
        self.calls.borrow_mut().push(call);
        response
    }
}

/// Collects every emitted event in order.
#[derive(Default)]
pub struct RecordingEvents {
    pub events: RefCell<Vec<RateEvent>>,
}

impl RecordingEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&RateEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| pred(e)).count()
    }
}

impl EventPort for RecordingEvents {
    fn emit(&self, event: RateEvent) {
        self.events.borrow_mut().push(event);
    }
}

pub fn parse_wire(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .unwrap()
        .with_timezone(&Utc)
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Candle rows for every bucket of the call's window, in descending order.
pub fn synthetic_body(call: &Call) -> String {
    let granularity: i64 = call.query["granularity"].parse().unwrap();
    let start = call.start().timestamp();
    let end = call.end().timestamp();

    let mut rows = Vec::new();
    let mut t = start;
    while t < end {
        let step = (t / granularity) % 100;
        let close = 4000.0 + step as f64 + 0.25;
        rows.push(json!([t, close - 10.0, close + 10.0, close - 1.0, close, 1.5]));
        t += granularity;
    }
    rows.reverse();
    serde_json::Value::Array(rows).to_string()
}

pub fn make_record(start: DateTime<Utc>, granularity: Duration, close: &str) -> RateRecord {
    let close = dec(close);
    RateRecord {
        start_time: start,
        end_time: start + granularity,
        lowest_price: close - dec("12.5"),
        highest_price: close + dec("7.125"),
        opening_price: close - dec("1"),
        closing_price: close,
        volume_of_trading: dec("0.00420017"),
    }
}

pub fn generate_records(start: DateTime<Utc>, count: usize, granularity: Duration) -> Vec<RateRecord> {
    (0..count)
        .map(|i| {
            make_record(
                start + granularity * i as i32,
                granularity,
                &format!("{}.{:02}", 4000 + i, i % 100),
            )
        })
        .collect()
}
