use serde_json::Value;
use thiserror::Error;

use crate::extract::MAX_FILES;
use crate::wire::ErrorBody;

/// Failures of the extraction step. Always all-or-nothing.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("No files provided")]
    NoFiles,

    #[error("Maximum {max} files allowed", max = MAX_FILES)]
    TooManyFiles,

    #[error("Failed to parse PDF {filename}: {cause}")]
    ExtractionFailed { filename: String, cause: String },
}

impl ExtractError {
    /// Caller-side mistakes, as opposed to content the parser rejected
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::NoFiles | Self::TooManyFiles)
    }
}

/// Failures of the query and summarize steps.
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("{0}")]
    MissingInput(&'static str),

    #[error("{0} is not configured")]
    ServiceUnavailable(&'static str),

    #[error("{message}")]
    InferenceFailed {
        message: String,
        details: Option<Value>,
    },
}

impl InferenceError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingInput(_))
    }

    pub fn details(&self) -> Option<&Value> {
        match self {
            Self::InferenceFailed { details, .. } => details.as_ref(),
            _ => None,
        }
    }
}

impl From<ExtractError> for ErrorBody {
    fn from(err: ExtractError) -> Self {
        ErrorBody::new(err.to_string())
    }
}

impl From<InferenceError> for ErrorBody {
    fn from(err: InferenceError) -> Self {
        let details = err.details().cloned();
        ErrorBody {
            error: err.to_string(),
            details,
        }
    }
}
