//! Credential management for the Drive API
//!
//! This module implements the credential acquisition flow: a token cached
//! under the per-user credentials directory is reused when readable,
//! otherwise the interactive authorization-code flow runs once and the
//! result is persisted for future invocations.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::path::Path;
//! use drive_pusher::auth::{CredentialManager, OauthConfig, TerminalPrompt, TokenCache};
//! use drive_pusher::constants::auth::DEFAULT_SCOPE;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = OauthConfig::from_secret_file(Path::new("client_secret.json"), DEFAULT_SCOPE)?;
//! let cache = TokenCache::new("/home/user/.credentials");
//! let manager = CredentialManager::new(config, cache)?;
//! let token = manager.acquire(&TerminalPrompt).await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod flow;
pub mod token;

// Re-export main public API
pub use cache::TokenCache;
pub use config::OauthConfig;
pub use flow::{AuthCodePrompt, CredentialManager, TerminalPrompt, TokenSource};
pub use token::{Token, TokenResponse};
