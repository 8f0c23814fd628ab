//! `clipvault` - CLI for clipboard history capture and recall.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{info, warn};

use clipvault::cli::{Cli, Command, ConfigCommand, ExportCommand, ListCommand, INDEX_WINDOW};
use clipvault::export::{self, ExportOptions};
use clipvault::watch::{select_watcher, WatchHandle};
use clipvault::{
    init_logging, CaptureService, Config, Item, SearchOptions, SearchService, SqliteStore, Store,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Add(cmd) => handle_add(&config, &cmd.text),
        Command::List(cmd) => handle_list(&config, &cmd),
        Command::Query(cmd) => handle_query(&config, &cmd.query, cmd.limit),
        Command::Count => handle_count(&config),
        Command::Pin(cmd) => handle_set_pinned(&config, cmd.index, true),
        Command::Unpin(cmd) => handle_set_pinned(&config, cmd.index, false),
        Command::Delete(cmd) => handle_delete(&config, cmd.index),
        Command::Watch => handle_watch(&config).await,
        Command::Export(cmd) => handle_export(&config, &cmd),
        Command::Config(cmd) => handle_config(&config, &cmd),
    }
}

fn open_store(config: &Config) -> anyhow::Result<SqliteStore> {
    let path = config.database_path();
    SqliteStore::open(&path).with_context(|| format!("opening history at {}", path.display()))
}

fn capture_service(config: &Config, store: SqliteStore) -> anyhow::Result<CaptureService<SqliteStore>> {
    let filter = config.privacy_filter()?;
    Ok(CaptureService::new(store, filter, config.capture_config()))
}

fn handle_add(config: &Config, text: &str) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let mut service = capture_service(config, store)?;

    match service.process_text(text)? {
        Some(item) => println!("Captured [{}] {}", item.content_type, preview(&item.content)),
        None => println!("Not captured (empty, filtered, or duplicate)."),
    }
    Ok(())
}

fn handle_list(config: &Config, cmd: &ListCommand) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let items = store.list_recent(cmd.limit)?;

    let mut shown = 0;
    for (i, item) in items.iter().enumerate() {
        if cmd.pinned && !item.pinned {
            continue;
        }
        print_item_line(i + 1, item);
        shown += 1;
    }
    if shown == 0 {
        println!("No items.");
    }
    Ok(())
}

fn handle_query(config: &Config, query: &str, limit: usize) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let search = SearchService::new(&store);

    let results = search.query(
        query,
        SearchOptions {
            out_limit: limit,
            ..SearchOptions::default()
        },
    )?;

    if results.is_empty() {
        println!("No matches.");
        return Ok(());
    }
    for (i, item) in results.iter().enumerate() {
        print_item_line(i + 1, item);
    }
    Ok(())
}

fn handle_count(config: &Config) -> anyhow::Result<()> {
    let store = open_store(config)?;
    println!("{}", store.count()?);
    Ok(())
}

/// Translate a 1-based position in the recent list to the stored item.
fn item_at_index(store: &SqliteStore, index: usize) -> anyhow::Result<Item> {
    if index == 0 {
        bail!("index is 1-based; use the positions shown by `list`");
    }
    let items = store.list_recent(INDEX_WINDOW)?;
    items.into_iter().nth(index - 1).ok_or_else(|| {
        anyhow::anyhow!("no item at position {index} (within the {INDEX_WINDOW} most recent)")
    })
}

fn handle_set_pinned(config: &Config, index: usize, pinned: bool) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let item = item_at_index(&store, index)?;
    store.set_pinned(&item.id, pinned)?;

    let verb = if pinned { "Pinned" } else { "Unpinned" };
    println!("{verb} {}", preview(&item.content));
    Ok(())
}

fn handle_delete(config: &Config, index: usize) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let item = item_at_index(&store, index)?;
    if item.pinned {
        bail!("item {index} is pinned; unpin it before deleting");
    }
    store.delete(&item.id)?;

    println!("Deleted {}", preview(&item.content));
    Ok(())
}

async fn handle_watch(config: &Config) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let mut service = capture_service(config, store)?;

    let watcher = select_watcher(&config.watch);
    let handle = WatchHandle::new();
    let mut notices = watcher.watch(handle.clone()).await?;

    info!(
        interval_ms = config.watch.poll_interval_ms,
        "watching clipboard, press Ctrl-C to stop"
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                handle.stop();
                break;
            }
            notice = notices.recv() => {
                if notice.is_none() {
                    break;
                }
                let text = match watcher.read_text() {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, "clipboard read failed");
                        continue;
                    }
                };
                if let Some(item) = service.process_text(&text)? {
                    println!("Captured [{}] {}", item.content_type, preview(&item.content));
                }
            }
        }
    }

    info!("clipboard watch stopped");
    Ok(())
}

fn handle_export(config: &Config, cmd: &ExportCommand) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let opts = ExportOptions {
        limit: cmd.limit,
        pinned_only: cmd.pinned_only,
        content_type: cmd.content_type.map(Into::into),
        since_hours: cmd.since_hours,
        now: None,
    };

    let records = export::collect(&store, &opts)?;
    let mut file = std::fs::File::create(&cmd.output)
        .with_context(|| format!("creating {}", cmd.output.display()))?;
    export::write_json(&mut file, &records)?;

    println!(
        "Exported {} record(s) to {}",
        records.len(),
        cmd.output.display()
    );
    Ok(())
}

fn handle_config(config: &Config, cmd: &ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if *json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("[storage]");
                println!("  database_path      = {}", config.database_path().display());
                println!("  max_items          = {}", config.storage.max_items);
                println!();
                println!("[watch]");
                println!("  enabled            = {}", config.watch.enabled);
                println!("  poll_interval_ms   = {}", config.watch.poll_interval_ms);
                println!("  dedupe_consecutive = {}", config.watch.dedupe_consecutive);
                println!();
                println!("[privacy]");
                println!("  use_regex          = {}", config.privacy.use_regex);
                println!(
                    "  ignore_patterns    = {} pattern(s)",
                    config.privacy.ignore_patterns.len()
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.clone().unwrap_or_else(Config::default_config_path);
            match Config::load_from(Some(path.clone())) {
                Ok(_) => println!("Configuration is valid: {}", path.display()),
                Err(e) => bail!("configuration error in {}: {e}", path.display()),
            }
        }
    }
    Ok(())
}

fn print_item_line(position: usize, item: &Item) {
    let pin = if item.pinned { "*" } else { " " };
    println!(
        "{position:>3}. {pin}[{:>7}] {}",
        item.content_type,
        preview(&item.content)
    );
}

/// First 60 characters of content, ellipsized.
fn preview(content: &str) -> String {
    const MAX: usize = 60;
    if content.chars().count() <= MAX {
        content.to_string()
    } else {
        let head: String = content.chars().take(MAX).collect();
        format!("{head}...")
    }
}
