//! Row-append export sink.
//!
//! Approved posts are delivered as one spreadsheet row each. The production
//! sink posts the row to a bridge endpoint that owns the spreadsheet.

use async_trait::async_trait;
use castroom_common::{AppError, AppResult, ExportConfig};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Appends rows to a named destination.
#[async_trait]
pub trait RowSink: Send + Sync {
    /// Whether credentials are present. An unconfigured sink is never called.
    fn is_configured(&self) -> bool;

    /// Append one row. The header is sent with every call so the
    /// destination can be created on first use.
    async fn append_row(&self, destination: &str, header: &[String], row: &[String])
    -> AppResult<()>;
}

/// Type alias for a shared row sink.
pub type RowSinkService = Arc<dyn RowSink>;

/// Sink that POSTs `{destination, header, row}` JSON with a bearer token.
#[derive(Clone)]
pub struct WebhookRowSink {
    http_client: reqwest::Client,
    endpoint: Option<String>,
    token: Option<String>,
}

#[derive(Serialize)]
struct AppendRowRequest<'a> {
    destination: &'a str,
    header: &'a [String],
    row: &'a [String],
}

impl WebhookRowSink {
    /// Create a sink from configuration. Missing endpoint or token leaves it unconfigured.
    pub fn new(config: &ExportConfig) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone().filter(|e| !e.trim().is_empty()),
            token: config.token.clone().filter(|t| !t.trim().is_empty()),
        })
    }
}

#[async_trait]
impl RowSink for WebhookRowSink {
    fn is_configured(&self) -> bool {
        self.endpoint.is_some() && self.token.is_some()
    }

    async fn append_row(
        &self,
        destination: &str,
        header: &[String],
        row: &[String],
    ) -> AppResult<()> {
        let (Some(endpoint), Some(token)) = (&self.endpoint, &self.token) else {
            return Err(AppError::Precondition(
                "Export credential is not configured".to_string(),
            ));
        };

        let response = self
            .http_client
            .post(endpoint)
            .bearer_auth(token)
            .json(&AppendRowRequest {
                destination,
                header,
                row,
            })
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Export request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Export sink error: {status} - {body}"
            )));
        }

        Ok(())
    }
}
