//! Blocking HTTP transport port.

use crate::domain::error::RatesError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// `GET(path, query) -> (status, body)` against the market-data host.
///
/// Non-2xx statuses are returned as responses; `Err` is reserved for
/// failures where no response was received (`RatesError::Transport`).
pub trait HttpPort {
    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<HttpResponse, RatesError>;
}
