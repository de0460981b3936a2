//! # Scraper Configuration Module
//!
//! This module provides configuration options for the preview scraper: the
//! header set used to look like an ordinary browser, an optional request
//! timeout, and the placeholder values substituted when extraction comes up
//! empty. It uses a builder pattern for flexible configuration.
//!
//! ## Key Components
//!
//! - `ScraperConfig`: The main configuration struct with scraper parameters
//! - `ScraperConfigBuilder`: Builder pattern implementation for easier configuration

use std::time::Duration;

/// Placeholder shown when a page yields no usable image
pub const NO_IMAGE_PLACEHOLDER: &str = "https://via.placeholder.com/400x300?text=No+Image+Found";

/// Placeholder shown on a manual-entry card after a failed scrape
pub const DETAILS_NEEDED_PLACEHOLDER: &str =
    "https://via.placeholder.com/400x300?text=Details+Needed";

/// Title used when no strategy finds one
pub const UNKNOWN_TITLE: &str = "Unknown Product";

/// Header set imitating a desktop Chrome navigation request
pub fn browser_headers() -> Vec<(String, String)> {
    [
        (
            "User-Agent",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        ),
        (
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8",
        ),
        ("Accept-Language", "en-US,en;q=0.9"),
        ("Accept-Encoding", "gzip, deflate, br"),
        ("Connection", "keep-alive"),
        ("Upgrade-Insecure-Requests", "1"),
        ("Sec-Fetch-Dest", "document"),
        ("Sec-Fetch-Mode", "navigate"),
        ("Sec-Fetch-Site", "none"),
        ("Sec-Fetch-User", "?1"),
        ("Cache-Control", "max-age=0"),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value.to_string()))
    .collect()
}

/// Configuration for the scraper
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Headers sent with every fetch
    pub headers: Vec<(String, String)>,

    /// Request timeout; `None` leaves it to the deployment environment
    pub timeout: Option<Duration>,

    /// Image used when no strategy finds one
    pub no_image_placeholder: String,

    /// Image used on a manual-entry card
    pub details_needed_placeholder: String,

    /// Title used when no strategy finds one
    pub unknown_title: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            headers: browser_headers(),
            timeout: None,
            no_image_placeholder: NO_IMAGE_PLACEHOLDER.to_string(),
            details_needed_placeholder: DETAILS_NEEDED_PLACEHOLDER.to_string(),
            unknown_title: UNKNOWN_TITLE.to_string(),
        }
    }
}

/// Builder for ScraperConfig
#[derive(Debug, Default)]
pub struct ScraperConfigBuilder {
    config: ScraperConfig,
}

impl ScraperConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: ScraperConfig::default(),
        }
    }

    /// Replace the whole header set
    pub fn headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.config.headers = headers;
        self
    }

    /// Set or replace a single header, matching names case-insensitively
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self
            .config
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.config.headers.push((name, value)),
        }
        self
    }

    /// Set the request timeout in milliseconds
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.timeout = Some(Duration::from_millis(timeout_ms));
        self
    }

    /// Set the image used when no strategy finds one
    pub fn no_image_placeholder(mut self, url: impl Into<String>) -> Self {
        self.config.no_image_placeholder = url.into();
        self
    }

    /// Set the image used on a manual-entry card
    pub fn details_needed_placeholder(mut self, url: impl Into<String>) -> Self {
        self.config.details_needed_placeholder = url.into();
        self
    }

    /// Set the title used when no strategy finds one
    pub fn unknown_title(mut self, title: impl Into<String>) -> Self {
        self.config.unknown_title = title.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> ScraperConfig {
        self.config
    }
}

impl ScraperConfig {
    /// Create a new builder
    pub fn builder() -> ScraperConfigBuilder {
        ScraperConfigBuilder::new()
    }
}
