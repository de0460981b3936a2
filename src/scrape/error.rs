//! Error types for the scrape module

use crate::error::Error as CrateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Why a scrape did not produce a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureReason {
    /// The site answered with a non-success status
    Blocked,
    /// No HTTP response was obtained
    Transport,
    /// Parsing or extraction hit something unexpected
    Malformed,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureReason::Blocked => "blocked",
            FailureReason::Transport => "transport",
            FailureReason::Malformed => "malformed",
        };
        f.write_str(name)
    }
}

/// Terminal failure of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{reason}: {detail}")]
pub struct ScrapeFailure {
    /// Failure classification
    pub reason: FailureReason,

    /// Human-readable detail, never internal diagnostics
    pub detail: String,
}

impl ScrapeFailure {
    /// The site refused the request
    pub fn blocked(status: u16, status_text: &str) -> Self {
        Self {
            reason: FailureReason::Blocked,
            detail: format!("{} {}", status, status_text).trim_end().to_string(),
        }
    }

    /// The request never got a response
    pub fn transport(cause: impl Into<String>) -> Self {
        Self {
            reason: FailureReason::Transport,
            detail: cause.into(),
        }
    }

    /// Something unexpected happened while reading the page
    pub fn malformed() -> Self {
        Self {
            reason: FailureReason::Malformed,
            detail: "Could not read product details from the page".to_string(),
        }
    }
}

/// Error raised while reading a parsed document
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A lookup selector failed to compile
    #[error("Invalid selector '{selector}': {message}")]
    Selector {
        /// The offending selector
        selector: String,
        /// Parser message
        message: String,
    },
}

/// Error type for scrape operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The request was rejected before any network activity
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The pipeline ran and failed
    #[error("Scrape failed: {0}")]
    Failed(#[from] ScrapeFailure),
}

impl ScrapeError {
    /// The pipeline failure, if the request got that far
    pub fn failure(&self) -> Option<&ScrapeFailure> {
        match self {
            ScrapeError::Failed(failure) => Some(failure),
            ScrapeError::InvalidRequest(_) => None,
        }
    }
}

impl From<ScrapeError> for CrateError {
    fn from(err: ScrapeError) -> Self {
        match err {
            ScrapeError::InvalidRequest(msg) => CrateError::InvalidRequest(msg),
            ScrapeError::Failed(failure) => CrateError::Scrape(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_display() {
        let failure = ScrapeFailure::blocked(403, "Forbidden");
        assert_eq!(failure.to_string(), "blocked: 403 Forbidden");

        let failure = ScrapeFailure::blocked(599, "");
        assert_eq!(failure.detail, "599");
    }

    #[test]
    fn test_failure_serializes_lowercase_reason() {
        let json = serde_json::to_value(ScrapeFailure::transport("dns error")).unwrap();
        assert_eq!(json["reason"], "transport");
        assert_eq!(json["detail"], "dns error");
    }

    #[test]
    fn test_conversion_to_crate_error() {
        let err: CrateError = ScrapeError::InvalidRequest("URL is required".into()).into();
        assert!(matches!(err, CrateError::InvalidRequest(_)));

        let err: CrateError = ScrapeError::from(ScrapeFailure::malformed()).into();
        match err {
            CrateError::Scrape(failure) => assert_eq!(failure.reason, FailureReason::Malformed),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
