//! Client for the external text-generation service
//!
//! The service speaks a small JSON contract: POST `{"text": <query>}` to the
//! configured endpoint and the reply carries `{"response": <string>}`. How
//! each failure class is presented to the user is the router's concern; this
//! client only reports what went wrong.

use crate::config::GenerationConfig;
use crate::error::KbChatError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Failure classes of a generation call
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The endpoint has no handler for the generation route.
    #[error("generation endpoint returned 404 Not Found")]
    NotFound,

    /// Any non-2xx status other than 404.
    #[error("{0}")]
    Status(String),

    /// Connection-level failure.
    #[error("{0}")]
    Network(String),

    /// The response body was not valid JSON.
    #[error("{0}")]
    Decode(String),
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    response: Option<String>,
}

/// Reply used when a well-formed body carries no "response" field.
const MISSING_RESPONSE_REPLY: &str = "Sorry, I couldn't process the request.";

/// HTTP client for the generation endpoint.
pub struct GenerationClient {
    http: reqwest::Client,
    endpoint: String,
    retry_transient: bool,
}

impl GenerationClient {
    pub fn new(config: &GenerationConfig) -> crate::error::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| KbChatError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            retry_transient: config.retry_transient,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Forward a query to the generation service and return its reply text.
    pub async fn generate(&self, text: &str) -> std::result::Result<String, GenerationError> {
        match self.generate_once(text).await {
            Err(GenerationError::Network(first)) if self.retry_transient => {
                log::warn!("Generation request failed ({}), retrying once", first);
                self.generate_once(text).await
            }
            other => other,
        }
    }

    async fn generate_once(&self, text: &str) -> std::result::Result<String, GenerationError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&GenerationRequest { text })
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GenerationError::NotFound);
        }
        if !status.is_success() {
            return Err(GenerationError::Status(format!(
                "{} returned by {}",
                status, self.endpoint
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;
        let decoded: GenerationResponse =
            serde_json::from_str(&body).map_err(|e| GenerationError::Decode(e.to_string()))?;

        Ok(decoded
            .response
            .unwrap_or_else(|| MISSING_RESPONSE_REPLY.to_string()))
    }
}
