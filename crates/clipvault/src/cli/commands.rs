//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::item::ContentType;

/// Number of recent items addressable by 1-based index commands.
pub const INDEX_WINDOW: usize = 50;

/// Add command arguments.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// The text to capture
    pub text: String,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Maximum number of items to show
    #[arg(short, long, default_value = "20")]
    pub limit: usize,

    /// Only show pinned items
    #[arg(short, long)]
    pub pinned: bool,
}

/// Query command arguments.
#[derive(Debug, Args)]
pub struct QueryCommand {
    /// The search text (matched as a case-insensitive substring)
    pub query: String,

    /// Maximum number of results
    #[arg(short, long, default_value = "20")]
    pub limit: usize,
}

/// Index-based command arguments (pin, unpin, delete).
#[derive(Debug, Args)]
pub struct IndexCommand {
    /// 1-based position in the most recent items (as shown by `list`)
    pub index: usize,
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Output file path
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Maximum records to export (0 for everything)
    #[arg(short, long, default_value = "0")]
    pub limit: usize,

    /// Only export pinned items
    #[arg(long)]
    pub pinned_only: bool,

    /// Only export items of this content type
    #[arg(short = 't', long = "type", value_enum)]
    pub content_type: Option<ContentTypeArg>,

    /// Only export items last seen within the past N hours
    #[arg(long, value_name = "HOURS")]
    pub since_hours: Option<u64>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Content type argument for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ContentTypeArg {
    /// Plain text
    Text,
    /// URLs
    Url,
    /// Shell commands
    Command,
    /// Source code
    Code,
}

impl From<ContentTypeArg> for ContentType {
    fn from(arg: ContentTypeArg) -> Self {
        match arg {
            ContentTypeArg::Text => Self::Text,
            ContentTypeArg::Url => Self::Url,
            ContentTypeArg::Command => Self::Command,
            ContentTypeArg::Code => Self::Code,
        }
    }
}
