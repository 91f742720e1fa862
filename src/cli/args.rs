//! Command-line argument parsing for drive_pusher
//!
//! This module defines the CLI structure using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::constants::drive;

/// drive_pusher - list Drive files and push document updates
#[derive(Parser, Debug)]
#[command(
    name = "drive_pusher",
    version,
    about = "OAuth2-authenticated client for listing Drive files and pushing document updates",
    long_about = "A command-line client for the Google Drive v3 API. Obtains and caches an OAuth2
credential, lists files, and replaces a known document's contents from a local file."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Client secret file path (defaults to ./client_secret.json)
    #[arg(long, global = true, value_name = "FILE")]
    pub secret: Option<PathBuf>,

    /// Credential cache directory (defaults to ~/.credentials)
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List files, ordered by name
    List(ListArgs),

    /// Replace a document's content with a local file
    Push(PushArgs),

    /// Show metadata for a single file
    Get(GetArgs),

    /// Download a file's content
    Download(DownloadArgs),

    /// Create a new file from local content
    Create(CreateArgs),

    /// Manage the cached OAuth2 credential
    Auth(AuthArgs),
}

/// Arguments for the list command
#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Drive search expression, e.g. "name contains 'Report'"
    #[arg(short = 'Q', long)]
    pub query: Option<String>,

    /// Files requested per page (1-1000)
    #[arg(long, default_value_t = drive::DEFAULT_PAGE_SIZE)]
    pub page_size: u32,
}

impl ListArgs {
    pub fn validate(&self) -> Result<(), String> {
        if self.page_size == 0 || self.page_size > drive::DEFAULT_PAGE_SIZE {
            return Err(format!(
                "Page size must be between 1 and {}",
                drive::DEFAULT_PAGE_SIZE
            ));
        }
        Ok(())
    }
}

/// Arguments for the push command
#[derive(Args, Debug, Clone)]
pub struct PushArgs {
    /// Identifier of the document to update
    #[arg(long, value_name = "ID")]
    pub file_id: String,

    /// Local file whose contents replace the document
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Arguments for the get command
#[derive(Args, Debug, Clone)]
pub struct GetArgs {
    /// File identifier
    #[arg(value_name = "ID")]
    pub file_id: String,
}

/// Arguments for the download command
#[derive(Args, Debug, Clone)]
pub struct DownloadArgs {
    /// File identifier
    #[arg(value_name = "ID")]
    pub file_id: String,

    /// Destination path
    #[arg(short, long, value_name = "PATH")]
    pub output: PathBuf,

    /// Overwrite the destination if it exists
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the create command
#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    /// Name of the new file
    #[arg(short, long)]
    pub name: String,

    /// MIME type of the new file
    #[arg(long, default_value = drive::DOCUMENT_MIME_TYPE)]
    pub mime_type: String,

    /// Local file providing the initial content (empty file when omitted)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}

/// Arguments for credential management
#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub action: AuthAction,
}

/// Credential management actions
#[derive(Subcommand, Debug)]
pub enum AuthAction {
    /// Run the interactive authorization flow, replacing any cached credential
    Setup,

    /// Show cached credential status
    Status,

    /// Remove the cached credential
    Clear,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments
    pub fn log_level(&self) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }
}
