//! Boundary envelope for scrape responses
//!
//! A transport layer serializes [`ScrapeResponse`] as the response body and
//! uses [`ScrapeResponse::status_code`] for the status line.

use serde::{Deserialize, Serialize};

use crate::scrape::error::{FailureReason, ScrapeError};
use crate::scrape::ScrapeResult;

/// Message for a request without a URL
pub const URL_REQUIRED_MESSAGE: &str = "URL is required";

/// Message when the site refused the request
pub const BLOCKED_MESSAGE: &str = "Site blocked the scraper. Please enter details manually.";

/// Message for every other failure
pub const FAILED_MESSAGE: &str = "Failed to scrape product details.";

/// Failure classification exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The site refused; expect manual entry
    Blocked,
    /// The request itself was unusable
    InvalidRequest,
    /// Anything else
    Failed,
}

/// Failure body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message
    pub error: String,

    /// Classification
    pub kind: ErrorKind,
}

/// Outbound response: the scraped card or an error body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScrapeResponse {
    /// `{ "title", "image", "url" }`
    Success(ScrapeResult),
    /// `{ "error", "kind" }`
    Failure(ErrorBody),
}

impl ScrapeResponse {
    /// HTTP status matching the response
    pub fn status_code(&self) -> u16 {
        match self {
            ScrapeResponse::Success(_) => 200,
            ScrapeResponse::Failure(body) => match body.kind {
                ErrorKind::Blocked => 422,
                ErrorKind::InvalidRequest => 400,
                ErrorKind::Failed => 500,
            },
        }
    }
}

impl From<&ScrapeError> for ErrorBody {
    fn from(err: &ScrapeError) -> Self {
        match err {
            ScrapeError::InvalidRequest(msg) => ErrorBody {
                error: msg.clone(),
                kind: ErrorKind::InvalidRequest,
            },
            ScrapeError::Failed(failure) if failure.reason == FailureReason::Blocked => ErrorBody {
                error: BLOCKED_MESSAGE.to_string(),
                kind: ErrorKind::Blocked,
            },
            ScrapeError::Failed(_) => ErrorBody {
                error: FAILED_MESSAGE.to_string(),
                kind: ErrorKind::Failed,
            },
        }
    }
}

impl From<std::result::Result<ScrapeResult, ScrapeError>> for ScrapeResponse {
    fn from(outcome: std::result::Result<ScrapeResult, ScrapeError>) -> Self {
        match outcome {
            Ok(result) => ScrapeResponse::Success(result),
            Err(err) => ScrapeResponse::Failure(ErrorBody::from(&err)),
        }
    }
}
