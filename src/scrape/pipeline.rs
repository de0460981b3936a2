//! Fetch, parse, extract, normalize
//!
//! [`Scraper::scrape`] runs the four stages strictly forward for one request.
//! A fetch failure short-circuits before any parsing. Faults while reading the
//! page are contained here and reported as a generic `malformed` failure; the
//! diagnostic goes to the log, never to the caller.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error, info, instrument, warn};

use crate::error::Result;
use crate::scrape::document::ParsedDocument;
use crate::scrape::error::{ScrapeError, ScrapeFailure};
use crate::scrape::extractor::{extract_with, Extraction, Strategy, STRATEGIES};
use crate::scrape::fetcher::{Fetch, FetchOutcome, HttpFetcher};
use crate::scrape::normalizer::normalize_image;
use crate::scrape::{ScrapeRequest, ScrapeResult, ScraperConfig};

/// A preview card that is always usable, even when scraping failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    /// Card contents; blank title and a "details needed" image after a failure
    pub result: ScrapeResult,

    /// Why the card had to be filled in manually
    pub failure: Option<ScrapeFailure>,
}

impl Preview {
    /// Whether the user has to supply the details themselves
    pub fn needs_details(&self) -> bool {
        self.failure.is_some()
    }
}

/// Product preview scraper
#[derive(Debug, Clone)]
pub struct Scraper<F = HttpFetcher> {
    fetcher: F,
    config: ScraperConfig,
    strategies: Vec<Strategy>,
}

impl Scraper<HttpFetcher> {
    /// Create a scraper with the default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ScraperConfig::default())
    }

    /// Create a scraper with a custom configuration
    pub fn with_config(config: ScraperConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self::with_fetcher(fetcher, config))
    }
}

impl<F: Fetch> Scraper<F> {
    /// Create a scraper around any page source
    pub fn with_fetcher(fetcher: F, config: ScraperConfig) -> Self {
        Self {
            fetcher,
            config,
            strategies: STRATEGIES.to_vec(),
        }
    }

    /// Replace the extraction strategies, highest priority first
    pub fn with_strategies(mut self, strategies: Vec<Strategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// The active configuration
    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Scrape one product page.
    ///
    /// An invalid request is rejected before any network activity.
    #[instrument(skip(self, request), fields(url = %request.url))]
    pub async fn scrape(&self, request: &ScrapeRequest) -> std::result::Result<ScrapeResult, ScrapeError> {
        let requested = request.validate()?;

        let (html, final_url) = match self.fetcher.fetch(&requested).await {
            FetchOutcome::Ok { html, final_url } => (html, final_url),
            FetchOutcome::Blocked {
                status,
                status_text,
            } => {
                warn!("Site blocked the request: {} {}", status, status_text);
                return Err(ScrapeFailure::blocked(status, &status_text).into());
            }
            FetchOutcome::TransportError { cause } => {
                error!("Transport failure: {}", cause);
                return Err(ScrapeFailure::transport(cause).into());
            }
        };

        if final_url != requested.as_str() {
            debug!("Redirected to {}", final_url);
        }

        let extraction = read_page(&html, &self.strategies)?;
        let result = ScrapeResult {
            title: extraction
                .title
                .unwrap_or_else(|| self.config.unknown_title.clone()),
            image: normalize_image(
                &requested,
                extraction.image.as_deref(),
                &self.config.no_image_placeholder,
            ),
            url: request.url.clone(),
        };

        info!(title = %result.title, image = %result.image, "Scraped product");
        Ok(result)
    }

    /// Scrape, degrading any pipeline failure to an editable blank card.
    ///
    /// Only an invalid request is an error here; there is nothing to put on a
    /// card without a URL.
    pub async fn preview(&self, request: &ScrapeRequest) -> std::result::Result<Preview, ScrapeError> {
        match self.scrape(request).await {
            Ok(result) => Ok(Preview {
                result,
                failure: None,
            }),
            Err(ScrapeError::Failed(failure)) => Ok(Preview {
                result: self.manual_entry(request),
                failure: Some(failure),
            }),
            Err(err) => Err(err),
        }
    }

    /// Blank card for the user to fill in
    pub fn manual_entry(&self, request: &ScrapeRequest) -> ScrapeResult {
        ScrapeResult {
            title: String::new(),
            image: self.config.details_needed_placeholder.clone(),
            url: request.url.clone(),
        }
    }
}

/// Parse and extract, containing any fault to a `malformed` failure
fn read_page(html: &str, strategies: &[Strategy]) -> std::result::Result<Extraction, ScrapeFailure> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let document = ParsedDocument::parse(html);
        extract_with(&document, strategies)
    }));

    match outcome {
        Ok(Ok(extraction)) => Ok(extraction),
        Ok(Err(e)) => {
            error!("Extraction failed: {}", e);
            Err(ScrapeFailure::malformed())
        }
        Err(payload) => {
            error!("Extraction panicked: {}", panic_message(payload.as_ref()));
            Err(ScrapeFailure::malformed())
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
