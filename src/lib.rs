//! # GiftBoard - Product Link Previews for Wishlists
//!
//! This crate turns a pasted product link into a wishlist card: a display
//! title, an absolute image URL and the original link. Pages are fetched with
//! browser-like headers, parsed leniently and run through an ordered chain of
//! metadata strategies. When a site refuses or the page yields nothing usable,
//! the card degrades to placeholders instead of failing.
//!
//! ## Features
//!
//! - Title and image extraction with a fixed priority:
//!   - Open Graph tags
//!   - Twitter Card tags
//!   - JSON-LD `Product` records
//!   - Plain HTML (`<title>`, first `<img>`)
//! - Image URL resolution against the requested page
//! - Blocked and unreachable sites classified separately
//! - Boards and items persisted to a local XML file
//!
//! ## Example
//!
//! ```rust,no_run
//! use giftboard::scrape::{ScrapeRequest, Scraper};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let scraper = Scraper::new()?;
//!     let request = ScrapeRequest::new("https://shop.example/p/42");
//!
//!     let preview = scraper.preview(&request).await?;
//!     if preview.needs_details() {
//!         println!("Please enter the details manually");
//!     }
//!     println!("{} - {}", preview.result.title, preview.result.image);
//!     Ok(())
//! }
//! ```

mod error;

pub mod board;
pub mod scrape;

pub use error::Error;

/// Re-export of types module for public use
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::error::Result;
}
