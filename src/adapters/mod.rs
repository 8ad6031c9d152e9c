//! Concrete adapter implementations for ports.

pub mod csv_rate_log;
pub mod file_config_adapter;
pub mod reqwest_http_adapter;
pub mod tracing_event_adapter;
