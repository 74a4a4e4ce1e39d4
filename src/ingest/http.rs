// src/ingest/http.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::error::FetchError;
use crate::ingest::types::FeedClient;
use crate::ingest::FetchConfig;

/// `reqwest`-backed feed transport.
pub struct HttpFeedClient {
    http: reqwest::Client,
    timeout: Duration,
}

impl HttpFeedClient {
    pub fn new(cfg: &FetchConfig) -> Result<Self> {
        let timeout = cfg.per_source_timeout();
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .connect_timeout(timeout.min(Duration::from_secs(4)))
            .timeout(timeout)
            .build()
            .context("building feed http client")?;
        Ok(Self { http, timeout })
    }
}

#[async_trait]
impl FeedClient for HttpFeedClient {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let resp = self
            .http
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "application/rss+xml, application/xml;q=0.9, text/xml;q=0.8, */*;q=0.5",
            )
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Http(status.as_u16()));
        }
        resp.text().await.map_err(|e| self.classify(e))
    }
}

impl HttpFeedClient {
    fn classify(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Network(e.to_string())
        }
    }
}
