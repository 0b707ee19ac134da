//! Error types for flow
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, validation, missing records)
//! - 4: Operation failed (persistence, upstream API, generation)

use thiserror::Error;

/// Exit codes for the flow CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for flow operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Task with id {0} not found")]
    TaskNotFound(u32),

    #[error("Category with id {0} not found")]
    CategoryNotFound(u32),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Operation failures (exit code 4)
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Description generation failed: {0}")]
    Generation(String),

    #[error("Remote API error: {0}")]
    Upstream(String),

    #[error("Batch partially failed: {failed} of {total} records rejected")]
    PartialBatch { failed: usize, total: usize },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::TaskNotFound(_)
            | Error::CategoryNotFound(_)
            | Error::Validation(_)
            | Error::InvalidArgument(_)
            | Error::InvalidConfig(_) => exit_codes::USER_ERROR,

            // Operation failures
            Error::Persistence(_)
            | Error::Generation(_)
            | Error::Upstream(_)
            | Error::PartialBatch { .. }
            | Error::Http(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured detail payload for JSON error output
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::PartialBatch { failed, total } => Some(serde_json::json!({
                "failed": failed,
                "total": total,
            })),
            _ => None,
        }
    }
}

/// Result type alias for flow operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
