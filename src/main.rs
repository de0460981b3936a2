//! # GiftBoard CLI Application
//!
//! This module implements the command-line interface for GiftBoard, a
//! personal wishlist that turns product links into cards.
//!
//! ## Key Components
//!
//! - CLI argument parsing with clap
//! - Subcommands:
//!   - `scrape`: Preview the title and image a product link yields
//!   - `board` / `boards`: Create and list boards
//!   - `add`: Scrape a link and save it to a board
//!   - `items`: List a board's items, newest first
//!   - `toggle`, `note`, `rename`: Edit a saved item
//!
//! Adding an item never fails because a site refused to be scraped; the item
//! is saved as a blank card to be filled in with `rename`.

mod telemetry;

use anyhow::anyhow;
use clap::{Args, Parser, Subcommand};
use giftboard::board::{Item, ItemStatus, ItemStore, NewItem, StoreConfig, XmlStore};
use giftboard::scrape::{ScrapeRequest, ScrapeResponse, Scraper, ScraperConfig};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use telemetry::{OtelGuard, TelemetryOptions};
use tracing::instrument;

#[derive(Parser)]
#[command(author, version, about = "Turn product links into wishlist cards", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory holding boards.xml (default: $GIFTBOARD_DATA_DIR or .giftboard)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Also write logs to a daily-rotated file in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Export traces and metrics over OTLP
    #[arg(long, global = true)]
    otlp: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Preview the title and image for a product link
    Scrape(ScrapeArgs),

    /// List boards
    Boards,

    /// Create a board
    Board(BoardArgs),

    /// Scrape a product link and save it to a board
    Add(AddArgs),

    /// List items on a board
    Items(ItemsArgs),

    /// Flip an item between to_buy and purchased
    Toggle(ItemArgs),

    /// Set an item's note
    Note(NoteArgs),

    /// Correct an item's title
    Rename(RenameArgs),
}

#[derive(Args, Debug)]
struct ScrapeArgs {
    /// Product page URL
    #[arg(required = true)]
    url: String,

    /// Output format (text|json)
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Request timeout in milliseconds
    #[arg(short, long)]
    timeout: Option<u64>,
}

#[derive(Args, Debug)]
struct BoardArgs {
    /// Board name
    #[arg(required = true)]
    name: String,
}

#[derive(Args, Debug)]
struct AddArgs {
    /// Product page URL
    #[arg(required = true)]
    url: String,

    /// Board name or id (default: the oldest board)
    #[arg(short, long)]
    board: Option<String>,

    /// Use this title instead of the scraped one
    #[arg(long)]
    title: Option<String>,

    /// Request timeout in milliseconds
    #[arg(short, long)]
    timeout: Option<u64>,
}

#[derive(Args, Debug)]
struct ItemsArgs {
    /// Board name or id (default: the oldest board)
    #[arg(short, long)]
    board: Option<String>,

    /// Output format (text|json)
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,
}

#[derive(Args, Debug)]
struct ItemArgs {
    /// Item id
    #[arg(required = true)]
    id: u64,
}

#[derive(Args, Debug)]
struct NoteArgs {
    /// Item id
    #[arg(required = true)]
    id: u64,

    /// Note text; empty clears the note
    #[arg(required = true)]
    text: String,
}

#[derive(Args, Debug)]
struct RenameArgs {
    /// Item id
    #[arg(required = true)]
    id: u64,

    /// New title
    #[arg(required = true)]
    title: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    let _otel: OtelGuard = telemetry::init_tracing_subscriber(&TelemetryOptions {
        otlp: cli.otlp,
        log_dir: cli.log_dir.clone(),
    })?;

    let store = XmlStore::with_config(match &cli.data_dir {
        Some(dir) => StoreConfig {
            base_path: dir.clone(),
        },
        None => StoreConfig::from_env(),
    });

    // Execute the appropriate command
    match cli.command {
        Some(Commands::Scrape(args)) => scrape_command(args).await?,
        Some(Commands::Boards) => boards_command(&store).await?,
        Some(Commands::Board(args)) => {
            let board = store.create_board(&args.name).await?;
            println!("Created board #{} {}", board.id, board.name);
        }
        Some(Commands::Add(args)) => add_command(&store, args).await?,
        Some(Commands::Items(args)) => items_command(&store, args).await?,
        Some(Commands::Toggle(args)) => {
            let item = store.toggle_status(args.id).await?;
            println!("#{} is now {}", item.id, item.status);
        }
        Some(Commands::Note(args)) => {
            if store.update_note(args.id, &args.text).await? {
                println!("Updated note on #{}", args.id);
            } else {
                println!("Note on #{} unchanged", args.id);
            }
        }
        Some(Commands::Rename(args)) => {
            let item = store.update_title(args.id, &args.title).await?;
            println!("#{} is now titled {}", item.id, item.title);
        }
        None => {
            // If no command is provided, show help
            let _ = Cli::parse_from(["giftboard", "--help"]);
        }
    }

    Ok(())
}

fn scraper(timeout: Option<u64>) -> anyhow::Result<Scraper> {
    let mut builder = ScraperConfig::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout_ms(timeout);
    }
    Ok(Scraper::with_config(builder.build())?)
}

fn spinner(message: String) -> anyhow::Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

#[instrument]
async fn scrape_command(args: ScrapeArgs) -> anyhow::Result<()> {
    let scraper = scraper(args.timeout)?;
    let request = ScrapeRequest::new(args.url.clone());

    let progress = spinner(format!("Fetching {}...", args.url))?;
    let outcome = scraper.scrape(&request).await;
    progress.finish_and_clear();

    let response = ScrapeResponse::from(outcome);
    match args.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        _ => {
            if let ScrapeResponse::Success(result) = &response {
                println!("Title: {}", result.title);
                println!("Image: {}", result.image);
                println!("URL:   {}", result.url);
            }
        }
    }

    match response {
        ScrapeResponse::Success(_) => Ok(()),
        ScrapeResponse::Failure(body) => Err(anyhow!(body.error)),
    }
}

#[instrument(skip(store))]
async fn boards_command(store: &XmlStore) -> anyhow::Result<()> {
    let boards = store.list_boards().await?;
    if boards.is_empty() {
        println!("No boards yet. Create one with `giftboard board <name>`.");
        return Ok(());
    }

    for board in boards {
        let items = store.list_items(board.id).await?;
        let open = items
            .iter()
            .filter(|item| item.status == ItemStatus::ToBuy)
            .count();
        println!(
            "#{} {} - {} items ({} to buy)",
            board.id,
            board.name,
            items.len(),
            open
        );
    }

    Ok(())
}

async fn resolve_board(
    store: &XmlStore,
    board: Option<&str>,
) -> anyhow::Result<giftboard::board::Board> {
    match board {
        Some(name_or_id) => Ok(store.find_board(name_or_id).await?),
        None => store
            .default_board()
            .await?
            .ok_or_else(|| anyhow!("No boards yet. Create one with `giftboard board <name>`.")),
    }
}

#[instrument(skip(store))]
async fn add_command(store: &XmlStore, args: AddArgs) -> anyhow::Result<()> {
    let board = resolve_board(store, args.board.as_deref()).await?;
    let scraper = scraper(args.timeout)?;
    let request = ScrapeRequest::new(args.url.clone());

    let progress = spinner(format!("Fetching {}...", args.url))?;
    let preview = scraper.preview(&request).await;
    progress.finish_and_clear();
    let preview = preview?;

    if let Some(failure) = &preview.failure {
        println!(
            "Could not read product details ({}). Saving a blank card to fill in manually.",
            failure
        );
    }

    let mut new_item = NewItem::from_preview(board.id, &preview.result);
    if let Some(title) = args.title {
        new_item = new_item.with_title(title);
    }

    let item = store.insert_item(new_item).await?;
    println!("Added to {}:", board.name);
    print_item(&item);

    if item.title.is_empty() {
        println!("Set a title with `giftboard rename {} <title>`.", item.id);
    }

    Ok(())
}

#[instrument(skip(store))]
async fn items_command(store: &XmlStore, args: ItemsArgs) -> anyhow::Result<()> {
    let board = resolve_board(store, args.board.as_deref()).await?;
    let items = store.list_items(board.id).await?;

    match args.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        _ => {
            if items.is_empty() {
                println!("No items yet. Add a product link with `giftboard add <url>`.");
                return Ok(());
            }
            println!("{} ({} items)", board.name, items.len());
            for item in &items {
                print_item(item);
            }
        }
    }

    Ok(())
}

fn print_item(item: &Item) {
    let mark = match item.status {
        ItemStatus::ToBuy => " ",
        ItemStatus::Purchased => "x",
    };
    let title = if item.title.is_empty() {
        "(untitled)"
    } else {
        item.title.as_str()
    };
    println!("[{}] #{} {}", mark, item.id, title);
    println!("    {}", item.product_url);
    println!("    image: {}", item.image_url);
    if !item.note.is_empty() {
        println!("    note: {}", item.note);
    }
}
