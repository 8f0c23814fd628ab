//! Command-line interface for clipvault.
//!
//! This module provides the CLI structure and command definitions for the
//! `clipvault` binary. Index-based operations (pin, unpin, delete) address
//! items by their 1-based position in the most recent [`INDEX_WINDOW`] items;
//! translating an index to a store id is the CLI's job, not the core's.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, ConfigCommand, ContentTypeArg, ExportCommand, IndexCommand, ListCommand,
    QueryCommand, INDEX_WINDOW,
};

/// clipvault - Clipboard history with dedup and ranked recall
///
/// Records clipboard-like text snippets, deduplicates them by content
/// fingerprint, filters sensitive content, and supports ranked substring
/// search over recent history.
#[derive(Debug, Parser)]
#[command(name = "clipvault")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Capture a piece of text into history
    Add(AddCommand),

    /// List recent items
    List(ListCommand),

    /// Ranked substring search over recent history
    Query(QueryCommand),

    /// Count stored items
    Count,

    /// Pin an item so retention never evicts it
    Pin(IndexCommand),

    /// Unpin an item
    Unpin(IndexCommand),

    /// Delete an item
    Delete(IndexCommand),

    /// Watch the system clipboard and capture changes
    Watch,

    /// Export history as JSON
    Export(ExportCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
