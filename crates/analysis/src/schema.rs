use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub text: String,
}

/// Typed view of the object the model is asked to produce.
///
/// Replies are passed back to callers untouched, so this is only used where
/// a reply happens to have the expected shape (logging, tests).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub emotion: String,
    pub confidence: f64,
}

impl AnalysisResult {
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ProviderUnavailable,
    ProviderCallFailed,
    NoJsonFound,
    JsonParseFailed,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Gemini API key not configured.")]
    ProviderUnavailable,

    #[error("{message}")]
    ProviderCallFailed { message: String },

    #[error("Could not find JSON in Gemini response.")]
    NoJsonFound { raw: String },

    #[error("Failed to parse JSON: {message}")]
    JsonParseFailed { message: String, raw: String },
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::ProviderUnavailable => ErrorKind::ProviderUnavailable,
            AnalysisError::ProviderCallFailed { .. } => ErrorKind::ProviderCallFailed,
            AnalysisError::NoJsonFound { .. } => ErrorKind::NoJsonFound,
            AnalysisError::JsonParseFailed { .. } => ErrorKind::JsonParseFailed,
        }
    }

    /// The unparsed provider reply, when one was received.
    pub fn raw(&self) -> Option<&str> {
        match self {
            AnalysisError::NoJsonFound { raw } | AnalysisError::JsonParseFailed { raw, .. } => {
                Some(raw)
            }
            _ => None,
        }
    }
}
