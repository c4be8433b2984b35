//! Coverlab client implementation.

use crate::error::SdkError;
use crate::types::{
    ClassSummary, ErrorBody, Health, Parameters, Record, SubmitOutcome, SubmitRequest,
};
use coverlab_domain::ConfidenceLevel;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default bound on one request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Classroom service client
#[derive(Debug, Clone)]
pub struct ClassroomClient {
    router_endpoint: String,
    http: reqwest::Client,
}

impl ClassroomClient {
    /// Create a client for the service at `router_endpoint`
    pub fn new(router_endpoint: &str) -> Result<Self, SdkError> {
        Self::with_timeout(router_endpoint, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a client with a custom per-request timeout
    pub fn with_timeout(router_endpoint: &str, timeout: Duration) -> Result<Self, SdkError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SdkError::ConnectionError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            router_endpoint: router_endpoint.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Service base URL
    pub fn endpoint(&self) -> &str {
        &self.router_endpoint
    }

    /// Submit a sample.
    ///
    /// Validation failures come back as [`SdkError::Rejected`]. A ledger
    /// outage is not an error here: the outcome carries `persisted: false`.
    pub async fn submit(
        &self,
        student_id: &str,
        values: &str,
        level: ConfidenceLevel,
    ) -> Result<SubmitOutcome, SdkError> {
        let request = SubmitRequest {
            student_id: student_id.to_string(),
            values: values.to_string(),
            confidence_level: level.percent(),
        };

        let response = self
            .http
            .post(self.url("/submissions"))
            .json(&request)
            .send()
            .await?;

        Self::decode(response).await
    }

    /// Every record in insertion order
    pub async fn records(&self) -> Result<Vec<Record>, SdkError> {
        self.get("/records").await
    }

    /// Class-wide coverage summary
    pub async fn summary(&self) -> Result<ClassSummary, SdkError> {
        self.get("/summary").await
    }

    /// Public parameters of the exercise
    pub async fn parameters(&self) -> Result<Parameters, SdkError> {
        self.get("/parameters").await
    }

    /// Service health
    pub async fn health(&self) -> Result<Health, SdkError> {
        self.get("/health").await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.router_endpoint, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, SdkError> {
        let response = self.http.get(self.url(path)).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, SdkError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let body = serde_json::from_str::<ErrorBody>(&text).ok();

        match (status, body) {
            (StatusCode::UNPROCESSABLE_ENTITY, Some(body)) => Err(SdkError::Rejected {
                kind: body.kind,
                message: body.error,
            }),
            (_, Some(body)) => Err(SdkError::RouterError {
                status: status.as_u16(),
                message: body.error,
            }),
            (_, None) => Err(SdkError::RouterError {
                status: status.as_u16(),
                message: text,
            }),
        }
    }
}
