use chrono::{DateTime, Utc};
use quick_xml::{de::from_str, se::to_string};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::{io, path::Path, path::PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{Board, Item, ItemStatus, NewItem};
use crate::error::Error as CrateError;

const STORE_FILE: &str = "boards.xml";

/// Environment variable overriding the default data directory
pub const DATA_DIR_ENV: &str = "GIFTBOARD_DATA_DIR";

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding the store file
    pub base_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from(".giftboard"),
        }
    }
}

impl StoreConfig {
    /// Default configuration, honouring `GIFTBOARD_DATA_DIR` when set
    pub fn from_env() -> Self {
        match std::env::var(DATA_DIR_ENV) {
            Ok(dir) if !dir.trim().is_empty() => Self {
                base_path: PathBuf::from(dir),
            },
            _ => Self::default(),
        }
    }
}

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("XML serialization error: {0}")]
    SerializeError(#[from] quick_xml::errors::serialize::SeError),

    #[error("XML deserialization error: {0}")]
    DeserializeError(#[from] quick_xml::errors::serialize::DeError),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid board name: {0}")]
    InvalidName(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<StoreError> for CrateError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => CrateError::NotFound(msg),
            _ => CrateError::Storage(err.to_string()),
        }
    }
}

type Result<T> = std::result::Result<T, StoreError>;

/// Durable home for boards and items
pub trait ItemStore: Send + Sync {
    /// Create a board; names are unique ignoring case
    fn create_board(&self, name: &str) -> impl Future<Output = Result<Board>> + Send;

    /// All boards, oldest first
    fn list_boards(&self) -> impl Future<Output = Result<Vec<Board>>> + Send;

    /// Board by numeric id or by name (ignoring case)
    fn find_board(&self, name_or_id: &str) -> impl Future<Output = Result<Board>> + Send;

    /// Save a new item with status `to_buy`
    fn insert_item(&self, item: NewItem) -> impl Future<Output = Result<Item>> + Send;

    /// Items on a board, newest first
    fn list_items(&self, board_id: u64) -> impl Future<Output = Result<Vec<Item>>> + Send;

    /// Flip an item between `to_buy` and `purchased`
    fn toggle_status(&self, item_id: u64) -> impl Future<Output = Result<Item>> + Send;

    /// Set an item's note; returns `false` without writing when it is unchanged
    fn update_note(&self, item_id: u64, note: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Correct an item's title
    fn update_title(&self, item_id: u64, title: &str) -> impl Future<Output = Result<Item>> + Send;

    /// The board shown when none is chosen: the oldest one
    fn default_board(&self) -> impl Future<Output = Result<Option<Board>>> + Send {
        async move {
            let boards = self.list_boards().await?;
            Ok::<_, StoreError>(boards.into_iter().next())
        }
    }
}

/// XML representation of the whole store
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename = "giftboard")]
struct StoreDocument {
    #[serde(rename = "board", default)]
    boards: Vec<Board>,

    #[serde(rename = "item", default)]
    items: Vec<ItemEntry>,
}

/// XML representation of a single item.
///
/// Free text is kept in attributes: element text is trimmed on load, which
/// would change titles and notes.
#[derive(Serialize, Deserialize, Debug, Clone)]
struct ItemEntry {
    #[serde(rename = "@title", default)]
    title: String,
    #[serde(rename = "@note", default)]
    note: String,
    id: u64,
    board_id: u64,
    image_url: String,
    product_url: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl From<Item> for ItemEntry {
    fn from(item: Item) -> Self {
        ItemEntry {
            id: item.id,
            board_id: item.board_id,
            title: item.title,
            image_url: item.image_url,
            product_url: item.product_url,
            status: item.status.as_str().to_string(),
            note: item.note,
            created_at: item.created_at,
        }
    }
}

impl TryFrom<ItemEntry> for Item {
    type Error = StoreError;

    fn try_from(entry: ItemEntry) -> Result<Self> {
        Ok(Item {
            id: entry.id,
            board_id: entry.board_id,
            title: entry.title,
            image_url: entry.image_url,
            product_url: entry.product_url,
            status: entry.status.parse()?,
            note: entry.note,
            created_at: entry.created_at,
        })
    }
}

impl StoreDocument {
    fn next_board_id(&self) -> u64 {
        self.boards.iter().map(|b| b.id).max().unwrap_or(0) + 1
    }

    fn next_item_id(&self) -> u64 {
        self.items.iter().map(|i| i.id).max().unwrap_or(0) + 1
    }

    fn board(&self, name_or_id: &str) -> Result<Board> {
        let needle = name_or_id.trim();
        let by_id = needle
            .parse::<u64>()
            .ok()
            .and_then(|id| self.boards.iter().find(|b| b.id == id));

        by_id
            .or_else(|| {
                self.boards
                    .iter()
                    .find(|b| b.name.eq_ignore_ascii_case(needle))
            })
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Board '{}'", needle)))
    }

    fn item_mut(&mut self, item_id: u64) -> Result<&mut ItemEntry> {
        self.items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| StoreError::NotFound(format!("Item {}", item_id)))
    }
}

/// Store keeping all boards and items in one XML file
#[derive(Debug, Clone)]
pub struct XmlStore {
    config: StoreConfig,
    lock: Arc<Mutex<()>>,
}

impl Default for XmlStore {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlStore {
    /// Create a store with default configuration
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create a store with custom configuration
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            config,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Path of the store file
    pub fn path(&self) -> PathBuf {
        self.config.base_path.join(STORE_FILE)
    }

    async fn load(&self) -> Result<StoreDocument> {
        let path = self.path();
        if !fs::try_exists(&path).await? {
            return Ok(StoreDocument::default());
        }
        let xml_content = fs::read_to_string(&path).await?;
        Ok(from_str(&xml_content)?)
    }

    async fn save(&self, document: &StoreDocument) -> Result<()> {
        let path = self.path();
        ensure_directories(&path).await?;
        let xml = to_string(document)?;
        fs::write(
            &path,
            format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}", xml),
        )
        .await?;
        debug!("Saved store to {}", path.display());
        Ok(())
    }

    /// Load, apply `update`, and write back if it asks to
    async fn modify<T, F>(&self, update: F) -> Result<T>
    where
        F: FnOnce(&mut StoreDocument) -> Result<(T, bool)> + Send,
        T: Send,
    {
        let _guard = self.lock.lock().await;
        let mut document = self.load().await?;
        let (value, changed) = update(&mut document)?;
        if changed {
            self.save(&document).await?;
        }
        Ok(value)
    }
}

/// Creates necessary directories for storage
async fn ensure_directories(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    Ok(())
}

impl ItemStore for XmlStore {
    async fn create_board(&self, name: &str) -> Result<Board> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(StoreError::InvalidName("name is empty".to_string()));
        }

        let board = self
            .modify(move |doc| {
                if doc.boards.iter().any(|b| b.name.eq_ignore_ascii_case(&name)) {
                    return Err(StoreError::InvalidName(format!("'{}' already exists", name)));
                }
                let board = Board {
                    id: doc.next_board_id(),
                    name,
                    created_at: Utc::now(),
                };
                doc.boards.push(board.clone());
                Ok((board, true))
            })
            .await?;

        info!(board_id = board.id, "Created board {}", board.name);
        Ok(board)
    }

    async fn list_boards(&self) -> Result<Vec<Board>> {
        let _guard = self.lock.lock().await;
        let mut boards = self.load().await?.boards;
        boards.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(boards)
    }

    async fn find_board(&self, name_or_id: &str) -> Result<Board> {
        let _guard = self.lock.lock().await;
        self.load().await?.board(name_or_id)
    }

    async fn insert_item(&self, item: NewItem) -> Result<Item> {
        let item = self
            .modify(move |doc| {
                if !doc.boards.iter().any(|b| b.id == item.board_id) {
                    return Err(StoreError::NotFound(format!("Board {}", item.board_id)));
                }
                let saved = Item {
                    id: doc.next_item_id(),
                    board_id: item.board_id,
                    title: item.title,
                    image_url: item.image_url,
                    product_url: item.product_url,
                    status: ItemStatus::ToBuy,
                    note: String::new(),
                    created_at: Utc::now(),
                };
                doc.items.push(saved.clone().into());
                Ok((saved, true))
            })
            .await?;

        info!(item_id = item.id, board_id = item.board_id, "Saved item");
        Ok(item)
    }

    async fn list_items(&self, board_id: u64) -> Result<Vec<Item>> {
        let _guard = self.lock.lock().await;
        let mut items = self
            .load()
            .await?
            .items
            .into_iter()
            .filter(|entry| entry.board_id == board_id)
            .map(Item::try_from)
            .collect::<Result<Vec<_>>>()?;
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(items)
    }

    async fn toggle_status(&self, item_id: u64) -> Result<Item> {
        self.modify(move |doc| {
            let entry = doc.item_mut(item_id)?;
            let status: ItemStatus = entry.status.parse()?;
            entry.status = status.toggled().as_str().to_string();
            Ok((Item::try_from(entry.clone())?, true))
        })
        .await
    }

    async fn update_note(&self, item_id: u64, note: &str) -> Result<bool> {
        let note = note.to_string();
        self.modify(move |doc| {
            let entry = doc.item_mut(item_id)?;
            if entry.note == note {
                return Ok((false, false));
            }
            entry.note = note;
            Ok((true, true))
        })
        .await
    }

    async fn update_title(&self, item_id: u64, title: &str) -> Result<Item> {
        let title = title.to_string();
        self.modify(move |doc| {
            let entry = doc.item_mut(item_id)?;
            entry.title = title;
            Ok((Item::try_from(entry.clone())?, true))
        })
        .await
    }
}
