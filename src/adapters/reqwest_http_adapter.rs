//! HTTP transport over `reqwest::blocking`.

use crate::domain::error::RatesError;
use crate::domain::settings::FetchSettings;
use crate::ports::http_port::{HttpPort, HttpResponse};
use reqwest::blocking::Client;
use std::time::Duration;

pub struct ReqwestHttpAdapter {
    client: Client,
    base_url: String,
}

impl ReqwestHttpAdapter {
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self, RatesError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| RatesError::Transport {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_settings(settings: &FetchSettings) -> Result<Self, RatesError> {
        Self::new(&settings.base_url, settings.timeout, &settings.user_agent)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl HttpPort for ReqwestHttpAdapter {
    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<HttpResponse, RatesError> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .map_err(|e| RatesError::Transport {
                reason: format!("GET {url}: {e}"),
            })?;

        let status = response.status().as_u16();
        let body = response.text().map_err(|e| RatesError::Transport {
            reason: format!("reading body of {url}: {e}"),
        })?;

        Ok(HttpResponse { status, body })
    }
}
