//! # Boards and Items
//!
//! A board is a named wishlist (one per person or occasion); an item is a
//! saved product card on a board. Items start out as `to_buy` and are flipped
//! to `purchased` once someone has bought the gift.
//!
//! Persistence sits behind the [`ItemStore`] trait. [`XmlStore`] keeps
//! everything in a single XML document on disk.

mod store;

pub use store::{ItemStore, StoreConfig, StoreError, XmlStore};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::scrape::ScrapeResult;

/// A named wishlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// Board identifier
    pub id: u64,

    /// Display name
    pub name: String,

    /// Creation time; boards are listed oldest first
    pub created_at: DateTime<Utc>,
}

/// Whether an item still needs buying
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Still on the list
    #[default]
    ToBuy,
    /// Bought
    Purchased,
}

impl ItemStatus {
    /// Stored representation
    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::ToBuy => "to_buy",
            ItemStatus::Purchased => "purchased",
        }
    }

    /// The other status
    pub fn toggled(self) -> Self {
        match self {
            ItemStatus::ToBuy => ItemStatus::Purchased,
            ItemStatus::Purchased => ItemStatus::ToBuy,
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "to_buy" => Ok(ItemStatus::ToBuy),
            "purchased" => Ok(ItemStatus::Purchased),
            other => Err(StoreError::InvalidData(format!("Unknown item status '{}'", other))),
        }
    }
}

/// A product card saved on a board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Item identifier
    pub id: u64,

    /// Owning board
    pub board_id: u64,

    /// Title, possibly corrected by the user
    pub title: String,

    /// Card image
    pub image_url: String,

    /// Product page
    pub product_url: String,

    /// Purchase status
    pub status: ItemStatus,

    /// Free-form note; empty when unset
    pub note: String,

    /// Creation time; items are listed newest first
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a new item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    /// Target board
    pub board_id: u64,
    /// Title
    pub title: String,
    /// Card image
    pub image_url: String,
    /// Product page
    pub product_url: String,
}

impl NewItem {
    /// Item fields from a scraped (or manually entered) card
    pub fn from_preview(board_id: u64, result: &ScrapeResult) -> Self {
        Self {
            board_id,
            title: result.title.clone(),
            image_url: result.image.clone(),
            product_url: result.url.clone(),
        }
    }

    /// Replace the title before saving
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}
