//! CSV file rate log.
//!
//! One header line followed by one record per line. Times are written as
//! `YYYY-MM-DD HH:MM:SS` in UTC and prices as exact decimal text, so a
//! whole-second record reads back equal to what was appended.
//!
//! The log assumes a single writer; concurrent appends from several
//! processes may interleave rows.

use crate::domain::error::RatesError;
use crate::domain::rate::RateRecord;
use crate::ports::event_port::{EventPort, RateEvent};
use crate::ports::rate_log_port::RateLogPort;
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const HEADER: [&str; 7] = [
    "start_time",
    "end_time",
    "lowest_price",
    "highest_price",
    "opening_price",
    "closing_price",
    "volume_of_trading",
];

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct CsvRateLog<'a> {
    path: PathBuf,
    events: &'a dyn EventPort,
}

impl<'a> CsvRateLog<'a> {
    pub fn new(path: impl Into<PathBuf>, events: &'a dyn EventPort) -> Self {
        Self {
            path: path.into(),
            events,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing and zero-length files both still need a header.
    fn is_fresh(&self) -> Result<bool, RatesError> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len() == 0),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(true),
            Err(e) => Err(e.into()),
        }
    }
}

fn encode(record: &RateRecord) -> [String; 7] {
    [
        record.start_time.format(TIME_FORMAT).to_string(),
        record.end_time.format(TIME_FORMAT).to_string(),
        record.lowest_price.to_string(),
        record.highest_price.to_string(),
        record.opening_price.to_string(),
        record.closing_price.to_string(),
        record.volume_of_trading.to_string(),
    ]
}

/// Write records in log format, preceded by the header when asked.
pub fn write_records<W: io::Write>(
    out: W,
    records: &[RateRecord],
    with_header: bool,
) -> Result<(), RatesError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);
    if with_header {
        writer.write_record(HEADER).map_err(io::Error::from)?;
    }
    for record in records {
        writer.write_record(encode(record)).map_err(io::Error::from)?;
    }
    writer.flush()?;
    Ok(())
}

fn parse_time(value: &str, column: &str, line: u64) -> Result<DateTime<Utc>, RatesError> {
    NaiveDateTime::parse_from_str(value, TIME_FORMAT)
        .map(|t| t.and_utc())
        .map_err(|e| RatesError::Parse {
            line,
            reason: format!("invalid {column} `{value}`: {e}"),
        })
}

fn parse_decimal(value: &str, column: &str, line: u64) -> Result<Decimal, RatesError> {
    Decimal::from_str(value).map_err(|e| RatesError::Parse {
        line,
        reason: format!("invalid {column} `{value}`: {e}"),
    })
}

fn read_error(e: csv::Error) -> RatesError {
    let line = e.position().map_or(0, |p| p.line());
    match e.into_kind() {
        csv::ErrorKind::Io(io) => RatesError::Io(io),
        kind => RatesError::Parse {
            line,
            reason: format!("{kind:?}"),
        },
    }
}

impl RateLogPort for CsvRateLog<'_> {
    fn append(&self, records: &[RateRecord]) -> Result<(), RatesError> {
        let created = self.is_fresh()?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        write_records(file, records, created)?;

        self.events.emit(RateEvent::RecordsAppended {
            path: self.path.clone(),
            count: records.len(),
            created,
        });
        Ok(())
    }

    fn read(&self) -> Result<Vec<RateRecord>, RatesError> {
        let file = File::open(&self.path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(file);

        let headers = reader.headers().map_err(read_error)?;
        if headers.iter().ne(HEADER) {
            return Err(RatesError::Schema {
                expected: HEADER.join(","),
                found: headers.iter().collect::<Vec<_>>().join(","),
            });
        }

        let mut records = Vec::new();
        for result in reader.records() {
            let row = result.map_err(read_error)?;
            let line = row.position().map_or(0, |p| p.line());
            let field = |i: usize| {
                row.get(i).ok_or_else(|| RatesError::Parse {
                    line,
                    reason: format!("missing {} column", HEADER[i]),
                })
            };

            records.push(RateRecord {
                start_time: parse_time(field(0)?, HEADER[0], line)?,
                end_time: parse_time(field(1)?, HEADER[1], line)?,
                lowest_price: parse_decimal(field(2)?, HEADER[2], line)?,
                highest_price: parse_decimal(field(3)?, HEADER[3], line)?,
                opening_price: parse_decimal(field(4)?, HEADER[4], line)?,
                closing_price: parse_decimal(field(5)?, HEADER[5], line)?,
                volume_of_trading: parse_decimal(field(6)?, HEADER[6], line)?,
            });
        }

        self.events.emit(RateEvent::LogRead {
            path: self.path.clone(),
            count: records.len(),
        });
        Ok(records)
    }
}
