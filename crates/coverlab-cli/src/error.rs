//! Error types for the CLI application.

use coverlab_sdk::SdkError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Bad or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Talking to the classroom service failed
    #[error("{0}")]
    Sdk(#[from] SdkError),

    /// Sample rejected before anything was sent
    #[error("Invalid sample: {0}")]
    Validation(#[from] coverlab_domain::ValidationError),

    /// Class parameters cannot produce an interval
    #[error("Invalid class parameters: {0}")]
    Parameters(#[from] coverlab_domain::ParameterError),

    /// Confidence level not offered
    #[error("{0}")]
    Level(#[from] coverlab_domain::IntervalError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config file is not valid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed command arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Operation not permitted: {0}")]
    NotPermitted(String),
}

impl CliError {
    /// Process exit status: 2 for input the student must fix, 3 when the
    /// service could not be reached, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Validation(_)
            | CliError::Level(_)
            | CliError::Parameters(_)
            | CliError::InvalidInput(_) => 2,
            CliError::Sdk(SdkError::Rejected { .. }) => 2,
            CliError::Sdk(e) if e.is_transient() => 3,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coverlab_domain::ValidationError;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Validation(ValidationError::EmptyInput).exit_code(), 2);
        assert_eq!(
            CliError::Sdk(SdkError::Rejected {
                kind: "out_of_range".into(),
                message: "values outside [90, 110]".into()
            })
            .exit_code(),
            2
        );
        assert_eq!(CliError::Sdk(SdkError::ConnectionError("refused".into())).exit_code(), 3);
        assert_eq!(CliError::Config("missing".into()).exit_code(), 1);
    }
}
