use async_trait::async_trait;
use serde_json::Value;

use super::{ApiError, ReviewBackend};

const SAMPLE_REVIEW: &str = include_str!("../../tests/fixtures/sample_review.json");

/// Backend that answers from the bundled sample review, so the whole flow
/// runs without a service.
pub struct DemoBackend;

#[async_trait]
impl ReviewBackend for DemoBackend {
    async fn ping(&self) -> Result<(), ApiError> {
        Ok(())
    }

    async fn review(&self, code: &str) -> Result<Value, ApiError> {
        if code.trim().is_empty() {
            return Err(ApiError::Status {
                status: 400,
                message: Some("Invalid code provided".to_string()),
            });
        }
        serde_json::from_str(SAMPLE_REVIEW).map_err(|e| ApiError::Body(e.to_string()))
    }
}
