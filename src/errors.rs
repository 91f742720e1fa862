//! Error types for drive_pusher
//!
//! This module defines error types for every component of the application.
//! All fallible operations return `Result` values; only the binary entry
//! point converts an error into a process exit, so the credential and API
//! logic stays reusable as a library.

use std::path::PathBuf;
use thiserror::Error;

/// Client secret configuration errors
///
/// Every variant here is fatal at startup: no remote call is attempted when
/// the client secret file cannot be loaded.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Client secret file not found
    #[error("Unable to read client secret file: {path}")]
    NotFound { path: PathBuf },

    /// I/O error reading the client secret file
    #[error("Unable to read client secret file")]
    Io(#[from] std::io::Error),

    /// Client secret file is not valid JSON
    #[error("Unable to parse client secret file to config")]
    InvalidFormat(#[from] serde_json::Error),

    /// Client secret file parsed but lacks a required field
    #[error("Missing required field in client secret file: {field}")]
    MissingField { field: String },
}

/// Credential acquisition and cache errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Cached credential could not be read. This is the only recovered
    /// error class: the manager falls through to the interactive flow.
    #[error("Unable to read cached credential file: {path}")]
    CacheRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Cached credential file exists but does not deserialize
    #[error("Cached credential file is malformed: {path}")]
    CacheMalformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Cache directory could not be created
    #[error("Unable to create credential cache directory: {path}")]
    CacheDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Credential could not be persisted to the cache file
    #[error("Unable to cache oauth token: {path}")]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Cached credential file could not be removed
    #[error("Unable to remove cached credential file: {path}")]
    CacheClear {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Authorization code could not be read from the operator
    #[error("Unable to read authorization code")]
    InteractiveInput(#[source] std::io::Error),

    /// Operator supplied an empty authorization code
    #[error("Authorization code must not be empty")]
    EmptyAuthCode,

    /// Transport failure talking to the token endpoint
    #[error("Unable to retrieve token from web")]
    Http(#[from] reqwest::Error),

    /// Token endpoint returned a non-success response
    #[error("Token endpoint rejected the request: HTTP {status}: {body}")]
    ExchangeRejected { status: u16, body: String },

    /// Renewal requested for a credential without a refresh token
    #[error("Credential has no refresh token and cannot be renewed without user interaction")]
    NoRefreshToken,

    /// Configured endpoint URL does not parse
    #[error("Invalid endpoint URL: {url}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Drive API request errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request failed
    #[error("Drive API request failed")]
    Http(#[from] reqwest::Error),

    /// Requested file does not exist (or is not visible to this client)
    #[error("File not found: {file_id}")]
    NotFound { file_id: String },

    /// Server returned a non-success status
    #[error("Drive API error: HTTP {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Download destination already exists and force flag not set
    #[error("File already exists: {path}. Use --force to overwrite")]
    FileExists { path: String },

    /// I/O error during file operations
    #[error("File I/O error")]
    Io(#[from] std::io::Error),

    /// Credential renewal failed while preparing a request
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Client secret configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Credential acquisition error
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Drive API error
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("{message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config",
            AppError::Auth(_) => "authentication",
            AppError::Api(_) => "api",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Authentication result type alias
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Drive API result type alias
pub type ApiResult<T> = std::result::Result<T, ApiError>;
