//! Outbound page fetch with browser camouflage
//!
//! The fetcher performs exactly one GET per call and never retries. Its job is
//! to classify what came back, not to interpret it: a refused request is an
//! expected outcome and is reported as [`FetchOutcome::Blocked`].

use std::future::Future;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client as ReqwestClient;
use tracing::{debug, error, instrument, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::scrape::ScraperConfig;

/// What a single fetch attempt produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Success status with the decoded body
    Ok {
        /// Page markup
        html: String,
        /// URL after the transport followed any redirects
        final_url: String,
    },

    /// The site answered with a non-success status
    Blocked {
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase for the status
        status_text: String,
    },

    /// No usable response was obtained
    TransportError {
        /// Description of the underlying failure
        cause: String,
    },
}

/// Source of page markup for the pipeline
pub trait Fetch {
    /// Fetch `url` once and classify the outcome
    fn fetch(&self, url: &Url) -> impl Future<Output = FetchOutcome> + Send;
}

/// Fetcher backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: ReqwestClient,
    headers: HeaderMap,
}

impl HttpFetcher {
    /// Create a fetcher from the scraper configuration
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let mut builder = ReqwestClient::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(Error::Http)?;

        Ok(Self {
            client,
            headers: header_map(&config.headers)?,
        })
    }
}

fn header_map(headers: &[(String, String)]) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::Config(format!("Invalid header name '{}': {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::Config(format!("Invalid value for header '{}': {}", name, e)))?;
        map.insert(name, value);
    }
    Ok(map)
}

impl Fetch for HttpFetcher {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch(&self, url: &Url) -> FetchOutcome {
        debug!("Sending GET request");
        let response = match self
            .client
            .get(url.clone())
            .headers(self.headers.clone())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to fetch {}: {}", url, e);
                return FetchOutcome::TransportError {
                    cause: e.to_string(),
                };
            }
        };

        let status = response.status();
        let final_url = response.url().to_string();

        if !status.is_success() {
            let status_text = status.canonical_reason().unwrap_or_default().to_string();
            warn!("Failed to fetch {}: {} {}", url, status.as_u16(), status_text);
            return FetchOutcome::Blocked {
                status: status.as_u16(),
                status_text,
            };
        }

        match response.text().await {
            Ok(html) => {
                debug!("Fetched {} bytes from {}", html.len(), final_url);
                FetchOutcome::Ok { html, final_url }
            }
            Err(e) => {
                error!("Failed to read body from {}: {}", url, e);
                FetchOutcome::TransportError {
                    cause: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(&ScraperConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_success_sends_browser_headers() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("GET", "/product/1")
            .match_header("user-agent", Matcher::Regex("Chrome/120".to_string()))
            .match_header("accept-language", "en-US,en;q=0.9")
            .match_header("upgrade-insecure-requests", "1")
            .match_header("sec-fetch-dest", "document")
            .match_header("sec-fetch-mode", "navigate")
            .match_header("sec-fetch-site", "none")
            .match_header("sec-fetch-user", "?1")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><title>Hi</title></html>")
            .expect(1)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/product/1", server.url())).unwrap();
        let outcome = fetcher().fetch(&url).await;

        match outcome {
            FetchOutcome::Ok { html, final_url } => {
                assert_eq!(html, "<html><title>Hi</title></html>");
                assert_eq!(final_url, url.to_string());
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        mock_server.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_forbidden_is_blocked() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("GET", "/")
            .with_status(403)
            .with_body("Access Denied")
            .expect(1)
            .create_async()
            .await;

        let url = Url::parse(&server.url()).unwrap();
        let outcome = fetcher().fetch(&url).await;

        assert_eq!(
            outcome,
            FetchOutcome::Blocked {
                status: 403,
                status_text: "Forbidden".to_string(),
            }
        );

        mock_server.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_rate_limited_is_blocked() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/")
            .with_status(429)
            .create_async()
            .await;

        let url = Url::parse(&server.url()).unwrap();
        let outcome = fetcher().fetch(&url).await;

        assert!(matches!(outcome, FetchOutcome::Blocked { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_transport_error() {
        // Port 1 is reserved and nothing listens on it in test environments
        let url = Url::parse("http://127.0.0.1:1/").unwrap();
        let outcome = fetcher().fetch(&url).await;

        assert!(matches!(outcome, FetchOutcome::TransportError { .. }));
    }

    #[test]
    fn test_invalid_header_is_config_error() {
        let config = ScraperConfig::builder().header("Bad Header", "x").build();
        let result = HttpFetcher::new(&config);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
