pub mod demo;

pub use demo::DemoBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    #[error("Backend returned {status}: {}", .message.as_deref().unwrap_or("no error message"))]
    Status {
        status: u16,
        message: Option<String>,
    },

    #[error("Response body is not JSON: {0}")]
    Body(String),
}

impl ApiError {
    /// Best message for the user: the server's own `error` text when it sent
    /// one, otherwise the transport description.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status {
                message: Some(message),
                ..
            } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// The analysis service, reached through its two endpoints.
#[async_trait]
pub trait ReviewBackend: Send + Sync {
    /// Liveness probe. Any error means the service is down.
    async fn ping(&self) -> Result<(), ApiError>;

    /// Submit code for review and return the raw JSON body.
    async fn review(&self, code: &str) -> Result<Value, ApiError>;
}

#[derive(Serialize)]
struct ReviewRequest<'a> {
    code: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

pub struct HttpBackend {
    client: reqwest::Client,
    base_url: reqwest::Url,
}

impl HttpBackend {
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let base_url = reqwest::Url::parse(base_url.trim_end_matches('/'))
            .map_err(|_| ApiError::InvalidUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }
        let mut builder =
            reqwest::Client::builder().user_agent(concat!("codesense/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), name)
    }
}

#[async_trait]
impl ReviewBackend for HttpBackend {
    async fn ping(&self) -> Result<(), ApiError> {
        let response = self.client.get(self.endpoint("ping")).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::Status {
                status: status.as_u16(),
                message: None,
            })
        }
    }

    #[instrument(skip_all, fields(code_bytes = code.len()))]
    async fn review(&self, code: &str) -> Result<Value, ApiError> {
        debug!("posting code for review");
        let response = self
            .client
            .post(self.endpoint("review"))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(&ReviewRequest { code })
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!(status = status.as_u16(), body_bytes = text.len(), "received review response");

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|body| body.error);
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| ApiError::Body(e.to_string()))
    }
}
