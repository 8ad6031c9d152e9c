//! Fetch settings built from a [`ConfigPort`].
//!
//! ```ini
//! [api]
//! base_url = https://api.gdax.com
//! timeout_secs = 30
//! max_points_per_page = 300
//! user_agent = gdaxrates/0.1
//!
//! [fetch]
//! product = BTC-USD
//! granularity = 3600
//! strict = false
//!
//! [log]
//! path = rates.csv
//! ```

use crate::domain::error::RatesError;
use crate::domain::fetcher::DEFAULT_MAX_POINTS_PER_PAGE;
use crate::ports::config_port::ConfigPort;
use chrono::Duration;
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://api.gdax.com";
pub const DEFAULT_TIMEOUT_SECS: i64 = 30;
pub const DEFAULT_GRANULARITY_SECS: i64 = 3600;

#[derive(Debug, Clone, PartialEq)]
pub struct FetchSettings {
    pub base_url: String,
    pub timeout: std::time::Duration,
    pub max_points_per_page: u32,
    pub user_agent: String,
    pub product: Option<String>,
    pub granularity: Duration,
    pub strict: bool,
    pub log_path: Option<PathBuf>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS as u64),
            max_points_per_page: DEFAULT_MAX_POINTS_PER_PAGE,
            user_agent: default_user_agent(),
            product: None,
            granularity: Duration::seconds(DEFAULT_GRANULARITY_SECS),
            strict: false,
            log_path: None,
        }
    }
}

fn default_user_agent() -> String {
    format!("gdaxrates/{}", env!("CARGO_PKG_VERSION"))
}

/// Read a positive integer, falling back to `default` when the key is absent.
fn positive_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, RatesError> {
    let invalid = |reason: String| RatesError::ConfigInvalid {
        section: section.into(),
        key: key.into(),
        reason,
    };
    let value = match config.get_string(section, key) {
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid(format!("expected an integer, got `{raw}`")))?,
        None => default,
    };
    if value <= 0 {
        return Err(invalid(format!("must be positive, got {value}")));
    }
    Ok(value)
}

impl FetchSettings {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, RatesError> {
        let defaults = Self::default();

        let base_url = config
            .get_string("api", "base_url")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.base_url);
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(RatesError::ConfigInvalid {
                section: "api".into(),
                key: "base_url".into(),
                reason: format!("expected an http(s) URL, got `{base_url}`"),
            });
        }

        let timeout_secs = positive_int(config, "api", "timeout_secs", DEFAULT_TIMEOUT_SECS)?;

        let max_points = positive_int(
            config,
            "api",
            "max_points_per_page",
            i64::from(DEFAULT_MAX_POINTS_PER_PAGE),
        )?;
        let max_points_per_page =
            u32::try_from(max_points).map_err(|_| RatesError::ConfigInvalid {
                section: "api".into(),
                key: "max_points_per_page".into(),
                reason: format!("{max_points} is too large"),
            })?;

        let granularity_secs =
            positive_int(config, "fetch", "granularity", DEFAULT_GRANULARITY_SECS)?;
        let granularity =
            Duration::try_seconds(granularity_secs).ok_or_else(|| RatesError::ConfigInvalid {
                section: "fetch".into(),
                key: "granularity".into(),
                reason: format!("{granularity_secs} seconds is out of range"),
            })?;

        Ok(Self {
            base_url,
            timeout: std::time::Duration::from_secs(timeout_secs as u64),
            max_points_per_page,
            user_agent: config
                .get_string("api", "user_agent")
                .unwrap_or(defaults.user_agent),
            product: config
                .get_string("fetch", "product")
                .filter(|s| !s.trim().is_empty()),
            granularity,
            strict: config.get_bool("fetch", "strict", false),
            log_path: config.get_string("log", "path").map(PathBuf::from),
        })
    }
}
