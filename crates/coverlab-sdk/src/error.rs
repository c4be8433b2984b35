//! Error types for the Coverlab SDK.

use thiserror::Error;

/// SDK operation errors
#[derive(Debug, Error)]
pub enum SdkError {
    /// Service unreachable (refused, DNS)
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// No answer in time; the request may still have been applied
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Service answered with an error status
    #[error("Router error (HTTP {status}): {message}")]
    RouterError {
        /// HTTP status code
        status: u16,
        /// Message from the response body
        message: String,
    },

    /// Submission refused by validation; the student should fix the input
    #[error("{message}")]
    Rejected {
        /// Machine-readable kind, e.g. `wrong_cardinality`
        kind: String,
        /// Message to show the student
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("Decode error: {0}")]
    Decode(String),
}

impl SdkError {
    /// True when retrying later may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            SdkError::ConnectionError(_) | SdkError::Timeout(_) => true,
            SdkError::RouterError { status, .. } => *status >= 500,
            SdkError::Rejected { .. } | SdkError::Decode(_) => false,
        }
    }
}

impl From<reqwest::Error> for SdkError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SdkError::Timeout(e.to_string())
        } else if e.is_connect() {
            SdkError::ConnectionError(e.to_string())
        } else if e.is_decode() {
            SdkError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            SdkError::RouterError {
                status: status.as_u16(),
                message: e.to_string(),
            }
        } else {
            SdkError::ConnectionError(e.to_string())
        }
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(e: serde_json::Error) -> Self {
        SdkError::Decode(format!("JSON parsing error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(SdkError::ConnectionError("refused".into()).is_transient());
        assert!(SdkError::Timeout("10s".into()).is_transient());
        assert!(SdkError::RouterError {
            status: 503,
            message: "ledger unavailable".into()
        }
        .is_transient());
        assert!(!SdkError::RouterError {
            status: 404,
            message: "not found".into()
        }
        .is_transient());
        assert!(!SdkError::Rejected {
            kind: "empty_input".into(),
            message: "please enter the sample values".into()
        }
        .is_transient());
    }

    #[test]
    fn test_rejected_displays_message_only() {
        let e = SdkError::Rejected {
            kind: "wrong_cardinality".into(),
            message: "expected exactly 30 values, but 29 were entered".into(),
        };
        assert_eq!(e.to_string(), "expected exactly 30 values, but 29 were entered");
    }
}
