use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::{sync::Arc, time::Duration};
use thiserror::Error;

use crate::{
    Config,
    diagnostics::{DiagnosticEvent, DiagnosticSink, FailureKind},
};

use super::{RawResponse, WeatherFetcher};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error {status}: {body}")]
    Http { status: StatusCode, body: String },

    #[error("Connection error. Please check your internet connection. ({0})")]
    Connection(#[source] reqwest::Error),

    #[error("Request timed out.")]
    Timeout(#[source] reqwest::Error),

    #[error("An error occurred: {0}")]
    Transport(String),
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Http { .. } => FailureKind::Http,
            FetchError::Connection(_) => FailureKind::Connection,
            FetchError::Timeout(_) => FailureKind::Timeout,
            FetchError::Transport(_) => FailureKind::Transport,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(err)
        } else if err.is_connect() {
            FetchError::Connection(err)
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

/// Current-weather client for the OpenWeather `data/2.5/weather` endpoint.
#[derive(Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    endpoint: String,
    http: Client,
    sink: Arc<dyn DiagnosticSink>,
}

impl std::fmt::Debug for OpenWeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherClient").field("endpoint", &self.endpoint).finish_non_exhaustive()
    }
}

impl OpenWeatherClient {
    pub fn new(
        api_key: String,
        endpoint: String,
        timeout: Duration,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<Self, FetchError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { api_key, endpoint, http, sink })
    }

    pub fn from_config(config: &Config, sink: Arc<dyn DiagnosticSink>) -> anyhow::Result<Self> {
        let api_key = config.api_key()?.to_owned();
        Ok(Self::new(api_key, config.endpoint.clone(), config.timeout(), sink)?)
    }

    /// Performs the request and decodes the body without interpreting it.
    pub async fn try_fetch(&self, city: &str) -> Result<RawResponse, FetchError> {
        let res = self
            .http
            .get(&self.endpoint)
            .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            // The body only feeds the message; a failed read must not mask the status.
            let body = res.text().await.unwrap_or_default();
            return Err(FetchError::Http { status, body: truncate_body(&body) });
        }

        let body = res.text().await?;
        serde_json::from_str(&body)
            .map_err(|err| FetchError::Transport(format!("invalid JSON from provider: {err}")))
    }
}

#[async_trait]
impl WeatherFetcher for OpenWeatherClient {
    async fn fetch(&self, city: &str) -> Option<RawResponse> {
        match self.try_fetch(city).await {
            Ok(raw) => Some(raw),
            Err(err) => {
                let message = match &err {
                    FetchError::Http { status, body } => {
                        format!("HTTP error occurred for {city}: {status}: {body}")
                    }
                    _ => err.to_string(),
                };
                self.sink.report(DiagnosticEvent::warning(err.kind(), city, message));
                None
            }
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
