//! CLI definition and dispatch.

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_rate_log::{CsvRateLog, write_records};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::reqwest_http_adapter::ReqwestHttpAdapter;
use crate::adapters::tracing_event_adapter::TracingEventAdapter;
use crate::domain::error::RatesError;
use crate::domain::fetcher::{FetchOutcome, RateFetcher};
use crate::domain::rate::split_train_test;
use crate::domain::settings::FetchSettings;
use crate::ports::event_port::EventPort;
use crate::ports::http_port::HttpPort;
use crate::ports::rate_log_port::RateLogPort;

#[derive(Parser, Debug)]
#[command(name = "gdaxrates", about = "Fetch GDAX candles into a rate log")]
pub struct Cli {
    /// INI settings file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List tradable products
    Products,
    /// Fetch candles for a range and append them to a rate log
    Fetch {
        #[arg(short, long)]
        product: Option<String>,
        /// RFC 3339 instant or YYYY-MM-DD (midnight UTC)
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        /// Bucket width in seconds
        #[arg(short, long)]
        granularity: Option<i64>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Fail without writing if any page failed
        #[arg(long)]
        strict: bool,
    },
    /// Print the records of a rate log
    Show {
        #[arg(short, long)]
        log: Option<PathBuf>,
        /// Also report a train/test split at this ratio
        #[arg(long)]
        train_ratio: Option<f64>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let settings = match load_settings(cli.config.as_ref()) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    let result = match cli.command {
        Command::Products => run_products(&settings),
        Command::Fetch {
            product,
            start,
            end,
            granularity,
            output,
            strict,
        } => run_fetch(
            &settings,
            FetchArgs {
                product,
                start,
                end,
                granularity,
                output,
                strict,
            },
        ),
        Command::Show { log, train_ratio } => run_show(&settings, log, train_ratio),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

fn fail(err: &RatesError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(err)
}

pub fn load_settings(path: Option<&PathBuf>) -> Result<FetchSettings, RatesError> {
    let Some(path) = path else {
        return Ok(FetchSettings::default());
    };
    let adapter = FileConfigAdapter::from_file(path).map_err(|e| RatesError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;
    FetchSettings::from_config(&adapter)
}

/// Accepts RFC 3339 (`2017-09-01T00:00:00Z`) or a bare date at midnight UTC.
pub fn parse_instant(value: &str) -> Result<DateTime<Utc>, RatesError> {
    if let Ok(t) = DateTime::parse_from_rfc3339(value) {
        return Ok(t.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc())
        .ok_or_else(|| RatesError::Planning {
            reason: format!("`{value}` is neither RFC 3339 nor YYYY-MM-DD"),
        })
}

#[derive(Debug, Clone)]
pub struct FetchArgs {
    pub product: Option<String>,
    pub start: String,
    pub end: String,
    pub granularity: Option<i64>,
    pub output: Option<PathBuf>,
    pub strict: bool,
}

fn run_products(settings: &FetchSettings) -> Result<(), RatesError> {
    let http = ReqwestHttpAdapter::from_settings(settings)?;
    let events = TracingEventAdapter;
    let fetcher = RateFetcher::new(&http, &events);

    for product in fetcher.list_products()? {
        match product.display_name {
            Some(name) => println!("{}\t{}", product.id, name),
            None => println!("{}", product.id),
        }
    }
    Ok(())
}

fn run_fetch(settings: &FetchSettings, args: FetchArgs) -> Result<(), RatesError> {
    let http = ReqwestHttpAdapter::from_settings(settings)?;
    let events = TracingEventAdapter;
    let outcome = fetch_into_log(&http, &events, settings, &args)?;

    eprintln!(
        "fetched {} records over {} pages ({} failed, {} flagged)",
        outcome.records.len(),
        outcome.total_pages,
        outcome.failures.len(),
        outcome.flagged.len()
    );
    for failure in &outcome.failures {
        eprintln!(
            "  page {} .. {}: {}",
            failure.period.start, failure.period.end, failure.kind
        );
    }
    Ok(())
}

/// Fetch the requested range and append whatever arrived to the log.
///
/// In strict mode a single failed page aborts before anything is written.
/// Without an output path the records are printed to stdout instead.
pub fn fetch_into_log(
    http: &dyn HttpPort,
    events: &dyn EventPort,
    settings: &FetchSettings,
    args: &FetchArgs,
) -> Result<FetchOutcome, RatesError> {
    let product = args
        .product
        .clone()
        .or_else(|| settings.product.clone())
        .ok_or_else(|| RatesError::ConfigMissing {
            section: "fetch".into(),
            key: "product".into(),
        })?;
    let start = parse_instant(&args.start)?;
    let end = parse_instant(&args.end)?;
    let granularity = args
        .granularity
        .map(|secs| {
            chrono::Duration::try_seconds(secs).ok_or_else(|| RatesError::Planning {
                reason: format!("granularity of {secs}s is out of range"),
            })
        })
        .transpose()?
        .unwrap_or(settings.granularity);

    let fetcher =
        RateFetcher::new(http, events).with_max_points_per_page(settings.max_points_per_page);
    let outcome = fetcher.fetch(&product, start, end, granularity)?;

    if args.strict || settings.strict {
        outcome.check_complete()?;
    }

    match args.output.clone().or_else(|| settings.log_path.clone()) {
        Some(path) => CsvRateLog::new(path, events).append(&outcome.records)?,
        None => write_records(std::io::stdout().lock(), &outcome.records, true)?,
    }

    Ok(outcome)
}

fn run_show(
    settings: &FetchSettings,
    log: Option<PathBuf>,
    train_ratio: Option<f64>,
) -> Result<(), RatesError> {
    let path = log
        .or_else(|| settings.log_path.clone())
        .ok_or_else(|| RatesError::ConfigMissing {
            section: "log".into(),
            key: "path".into(),
        })?;
    let events = TracingEventAdapter;
    let records = CsvRateLog::new(path, &events).read()?;

    for record in &records {
        let flags = record.anomalies();
        let note = if flags.is_empty() {
            String::new()
        } else {
            let flags: Vec<String> = flags.iter().map(|a| a.to_string()).collect();
            format!("  ! {}", flags.join(", "))
        };
        println!(
            "{}  o={} h={} l={} c={} v={}{}",
            record.start_time.format("%Y-%m-%d %H:%M:%S"),
            record.opening_price,
            record.highest_price,
            record.lowest_price,
            record.closing_price,
            record.volume_of_trading,
            note
        );
    }
    eprintln!("{} records", records.len());

    if let Some(ratio) = train_ratio {
        let (train, test) = split_train_test(&records, ratio);
        eprintln!("train: {} records, test: {} records", train.len(), test.len());
    }
    Ok(())
}
