//! Compute Engine REST client
//!
//! Only issues `GET` requests against operation resources. Each call is a
//! single round-trip; retries belong to the wait engine.

use std::time::Duration;

use log::debug;
use lro_core::PollError;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::config::{ApiVersion, ComputeConfig};
use crate::operation::Operation;

/// Per-request timeout for operation lookups
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Standard Google API error envelope
#[derive(Debug, Deserialize)]
struct GoogleErrorResponse {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    code: u16,
    message: String,
}

/// REST client for Compute operation lookups
#[derive(Clone)]
pub struct ComputeClient {
    http_client: Client,
    config: ComputeConfig,
}

impl std::fmt::Debug for ComputeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComputeClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ComputeClient {
    pub fn new(config: ComputeConfig) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn config(&self) -> &ComputeConfig {
        &self.config
    }

    pub fn project(&self) -> &str {
        &self.config.project
    }

    pub fn api_version(&self) -> ApiVersion {
        self.config.api_version
    }

    /// Fetch an operation by its path below the endpoint
    ///
    /// A 404 is reported as a not-found `PollError`; other non-success
    /// statuses carry the Google error message when the body has one.
    pub async fn get_operation(&self, path: &str) -> Result<Operation, PollError> {
        let url = format!("{}{}", self.config.endpoint, path);
        debug!("GET {}", url);

        let mut request = self.http_client.get(&url);
        if let Some(token) = &self.config.access_token {
            let token = token.strip_prefix("Bearer ").unwrap_or(token);
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            PollError::new(format!("Failed to get operation: {}", e)).with_cause(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_response(status, &body));
        }

        response.json::<Operation>().await.map_err(|e| {
            PollError::new(format!("Failed to decode operation: {}", e)).with_cause(e)
        })
    }
}

fn error_from_response(status: StatusCode, body: &str) -> PollError {
    let message = match serde_json::from_str::<GoogleErrorResponse>(body) {
        Ok(parsed) => format!(
            "googleapi: Error {}: {}",
            parsed.error.code, parsed.error.message
        ),
        Err(_) if body.is_empty() => {
            format!("googleapi: got HTTP response code {}", status.as_u16())
        }
        Err(_) => format!(
            "googleapi: got HTTP response code {} with body: {}",
            status.as_u16(),
            body
        ),
    };

    if status == StatusCode::NOT_FOUND {
        PollError::not_found(message)
    } else {
        PollError::new(message)
    }
}
