//! Command handlers for the drive_pusher CLI
//!
//! This module implements the command handlers that coordinate between CLI
//! arguments, credential acquisition, and the Drive client.

use std::path::PathBuf;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::app::{DriveClient, DriveFile};
use crate::auth::{CredentialManager, OauthConfig, TerminalPrompt, TokenCache, TokenSource};
use crate::cli::{
    AuthAction, AuthArgs, CreateArgs, DownloadArgs, GetArgs, GlobalArgs, ListArgs, PushArgs,
};
use crate::constants::{auth, drive, files};
use crate::errors::{AppError, AuthError, Result};

/// Handle the list command
pub async fn handle_list(args: ListArgs, global: &GlobalArgs) -> Result<()> {
    args.validate().map_err(AppError::generic)?;

    let client = build_client(global).await?;

    let spinner = start_spinner("Listing files...", global);
    let mut listed = client
        .list_files(args.query.as_deref(), args.page_size, drive::DEFAULT_ORDER_BY)
        .await?;
    finish_spinner(spinner);

    // Server-side ordering is requested too, but sorting locally keeps the
    // output stable across paginated responses
    listed.sort_by(|a, b| a.name.cmp(&b.name));

    print!("{}", format_file_list(&listed));
    Ok(())
}

/// Renders a file listing: header, one `name (id trashed)` line per file,
/// then a separator and total. An empty listing renders the header and
/// `No files found.` only.
fn format_file_list(files: &[DriveFile]) -> String {
    let mut out = String::from("Files:\n");

    if files.is_empty() {
        out.push_str("No files found.\n");
        return out;
    }

    for file in files {
        out.push_str(&format!("{} ({} {})\n", file.name, file.id, file.trashed));
    }
    out.push_str("-------\n");
    out.push_str(&format!("{} total files\n", files.len()));
    out
}

/// Handle the push command
pub async fn handle_push(args: PushArgs, global: &GlobalArgs) -> Result<()> {
    let content = tokio::fs::read(&args.file).await.map_err(AppError::Io)?;
    info!(
        "Pushing {} bytes from {} to file {}",
        content.len(),
        args.file.display(),
        args.file_id
    );

    let client = build_client(global).await?;

    let spinner = start_spinner("Pushing document update...", global);
    client.update_file_content(&args.file_id, content).await?;
    finish_spinner(spinner);

    println!("Update pushed");
    Ok(())
}

/// Handle the get command
pub async fn handle_get(args: GetArgs, global: &GlobalArgs) -> Result<()> {
    let client = build_client(global).await?;
    let file = client.get_file(&args.file_id).await?;

    println!("Name:      {}", file.name);
    println!("Id:        {}", file.id);
    println!(
        "MIME type: {}",
        file.mime_type.as_deref().unwrap_or("(unknown)")
    );
    println!("Trashed:   {}", file.trashed);

    Ok(())
}

/// Handle the download command
pub async fn handle_download(args: DownloadArgs, global: &GlobalArgs) -> Result<()> {
    let client = build_client(global).await?;

    let spinner = start_spinner("Downloading...", global);
    client
        .download_file(&args.file_id, &args.output, args.force)
        .await?;
    finish_spinner(spinner);

    println!("Saved to {}", args.output.display());
    Ok(())
}

/// Handle the create command
pub async fn handle_create(args: CreateArgs, global: &GlobalArgs) -> Result<()> {
    let content = match &args.file {
        Some(path) => tokio::fs::read(path).await.map_err(AppError::Io)?,
        None => Vec::new(),
    };

    let client = build_client(global).await?;

    let spinner = start_spinner("Creating file...", global);
    let created = client
        .create_file(&args.name, &args.mime_type, content)
        .await?;
    finish_spinner(spinner);

    println!("Created {} ({})", created.name, created.id);
    Ok(())
}

/// Handle the auth command
pub async fn handle_auth(args: AuthArgs, global: &GlobalArgs) -> Result<()> {
    match args.action {
        AuthAction::Setup => {
            let manager = credential_manager(global)?;
            let token = manager.reauthorize(&TerminalPrompt).await?;
            println!("Authorization complete. Credential valid until {}.", token.expiry);
            Ok(())
        }
        AuthAction::Status => {
            let cache = token_cache(global)?;
            println!("Credential cache: {}", cache.path().display());

            match cache.load() {
                Ok(token) => {
                    println!("Status: cached credential present");
                    println!("Expires: {}", token.expiry);
                    if token.is_expired() {
                        if token.is_renewable() {
                            println!("Expired, but renewable without user interaction");
                        } else {
                            println!("Expired; run 'drive_pusher auth setup' to re-authorize");
                        }
                    } else {
                        println!("Valid");
                    }
                }
                Err(AuthError::CacheMalformed { .. }) => {
                    println!("Status: cache file exists but is malformed");
                    println!("Run 'drive_pusher auth setup' to replace it");
                }
                Err(_) => {
                    println!("Status: no cached credential");
                    println!("Run 'drive_pusher auth setup' to authorize");
                }
            }
            Ok(())
        }
        AuthAction::Clear => {
            let cache = token_cache(global)?;
            let existed = cache.exists();
            cache.clear()?;
            if existed {
                println!("Removed cached credential: {}", cache.path().display());
            } else {
                println!("No cached credential to remove");
            }
            Ok(())
        }
    }
}

/// Resolves the client secret path from the CLI or the working directory
fn secret_path(global: &GlobalArgs) -> PathBuf {
    global
        .secret
        .clone()
        .unwrap_or_else(|| PathBuf::from(files::SECRET_FILE_NAME))
}

/// Resolves the credential cache from the CLI or the home directory
fn token_cache(global: &GlobalArgs) -> Result<TokenCache> {
    let dir = match &global.cache_dir {
        Some(dir) => dir.clone(),
        None => dirs::home_dir()
            .ok_or_else(|| AppError::generic("Unable to determine home directory"))?
            .join(auth::CACHE_DIR_NAME),
    };
    Ok(TokenCache::new(dir))
}

/// Builds a credential manager from the resolved configuration
fn credential_manager(global: &GlobalArgs) -> Result<CredentialManager> {
    let secret = secret_path(global);
    debug!("Loading client secret from {}", secret.display());
    let config = OauthConfig::from_secret_file(&secret, auth::DEFAULT_SCOPE)?;
    let cache = token_cache(global)?;
    Ok(CredentialManager::new(config, cache)?)
}

/// Acquires a credential and wraps it in an authenticated Drive client
async fn build_client(global: &GlobalArgs) -> Result<DriveClient> {
    let manager = credential_manager(global)?;
    let token = manager.acquire(&TerminalPrompt).await?;
    let source = TokenSource::new(manager, token);
    Ok(DriveClient::new(source)?)
}

/// Starts a spinner when stdout is an interactive terminal
fn start_spinner(message: &str, global: &GlobalArgs) -> Option<ProgressBar> {
    if global.quiet || !atty::is(atty::Stream::Stdout) {
        return None;
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap()
            .tick_strings(&["◐", "◓", "◑", "◒"]),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
    Some(spinner)
}

fn finish_spinner(spinner: Option<ProgressBar>) {
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
}
