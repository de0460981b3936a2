//! Error types for the GiftBoard crate

use thiserror::Error;

use crate::scrape::ScrapeFailure;

/// Result type for GiftBoard operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for GiftBoard operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Scrape pipeline failure
    #[error("Scrape error: {0}")]
    Scrape(ScrapeFailure),

    /// Board or item storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Requested board or item does not exist
    #[error("Not found: {0}")]
    NotFound(String),
}
