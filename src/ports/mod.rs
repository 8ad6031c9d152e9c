//! Port traits at the edges of the domain.

pub mod config_port;
pub mod event_port;
pub mod http_port;
pub mod rate_log_port;
