//! drive_pusher CLI application
//!
//! Command-line interface for the Drive v3 API: credential acquisition with
//! an on-disk cache, file listing, and document content updates.

use std::process;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use drive_pusher::cli::{
    handle_auth, handle_create, handle_download, handle_get, handle_list, handle_push, Cli,
    Commands,
};
use drive_pusher::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    // Handle any errors that occurred
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize logging based on verbosity
    init_logging(&cli);

    info!("drive_pusher v{} starting", env!("CARGO_PKG_VERSION"));

    // Execute the appropriate command
    let Cli { global, command } = cli;
    match command {
        Commands::List(args) => {
            info!("Executing list command");
            handle_list(args, &global).await
        }
        Commands::Push(args) => {
            info!("Executing push command");
            handle_push(args, &global).await
        }
        Commands::Get(args) => {
            info!("Executing get command");
            handle_get(args, &global).await
        }
        Commands::Download(args) => {
            info!("Executing download command");
            handle_download(args, &global).await
        }
        Commands::Create(args) => {
            info!("Executing create command");
            handle_create(args, &global).await
        }
        Commands::Auth(args) => {
            info!("Executing auth command");
            handle_auth(args, &global).await
        }
    }
}

/// Initialize logging based on CLI verbosity settings
fn init_logging(cli: &Cli) {
    let log_level = cli.log_level();

    // Create environment filter
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("drive_pusher={}", log_level).parse().unwrap());

    // Initialize subscriber
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose)
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
