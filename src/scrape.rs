//! # Product Preview Scraper
//!
//! This module turns a product page URL into a card for the wishlist: a
//! title, an image, and the URL itself. Pages are not ours, so the pipeline
//! assumes nothing about them: it disguises the request as a normal browser
//! visit, parses markup leniently, and walks a fallback chain of metadata
//! sources until it finds something usable.
//!
//! ## Key Components
//!
//! - `Scraper`: Runs the pipeline for one `ScrapeRequest`
//! - `Fetch` / `HttpFetcher`: One camouflaged GET, classified as ok, blocked or transport failure
//! - `ParsedDocument`: Lenient HTML with first-match lookups
//! - `extract`: Open Graph, Twitter Card, JSON-LD and plain HTML, in that order
//! - `normalize_image`: Absolute image URLs, or a placeholder
//! - `ScrapeResponse`: Serializable response envelope for a transport layer
//!
//! ## Failure handling
//!
//! A refusing site is reported as `blocked`, a dead connection as `transport`,
//! and anything unexpected while reading the page as `malformed`. Callers that
//! never want to block the add-item flow use `Scraper::preview`, which turns
//! any of these into a blank card to fill in by hand.

mod config;
mod document;
mod error;
mod extractor;
mod fetcher;
mod normalizer;
mod pipeline;
mod response;
mod structured_data;

pub use config::{
    browser_headers, ScraperConfig, ScraperConfigBuilder, DETAILS_NEEDED_PLACEHOLDER,
    NO_IMAGE_PLACEHOLDER, UNKNOWN_TITLE,
};
pub use document::ParsedDocument;
pub use error::{ExtractError, FailureReason, ScrapeError, ScrapeFailure};
pub use extractor::{extract, extract_with, Candidates, Extraction, Strategy, STRATEGIES};
pub use fetcher::{Fetch, FetchOutcome, HttpFetcher};
pub use normalizer::normalize_image;
pub use pipeline::{Preview, Scraper};
pub use response::{ErrorBody, ErrorKind, ScrapeResponse};
pub use structured_data::{first_product, ImageField, ProductRecord};

use serde::{Deserialize, Serialize};
use url::Url;

/// Inbound request: the page to scrape
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrapeRequest {
    /// Absolute product page URL as the user typed it
    #[serde(default)]
    pub url: String,
}

impl ScrapeRequest {
    /// Create a request for `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Check the URL is present and absolute before anything touches the network
    pub fn validate(&self) -> Result<Url, ScrapeError> {
        let raw = self.url.trim();
        if raw.is_empty() {
            return Err(ScrapeError::InvalidRequest(
                response::URL_REQUIRED_MESSAGE.to_string(),
            ));
        }

        let url = Url::parse(raw)
            .map_err(|e| ScrapeError::InvalidRequest(format!("Invalid URL '{}': {}", raw, e)))?;

        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ScrapeError::InvalidRequest(format!(
                "URL must be an absolute http(s) address: {}",
                raw
            )));
        }

        Ok(url)
    }
}

/// A scraped product card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeResult {
    /// Product title
    pub title: String,

    /// Absolute image URL or a placeholder
    pub image: String,

    /// The URL that was requested
    pub url: String,
}
