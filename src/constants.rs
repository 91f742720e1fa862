//! Application constants for drive_pusher
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain for maintainability and clarity.

use std::time::Duration;

/// Authorization flow and credential cache constants
pub mod auth {
    /// Fixed anti-forgery state value sent with the authorization URL
    pub const STATE_TOKEN: &str = "state-token";

    /// Out-of-band redirect URI for installed applications without a local
    /// callback server. The authorization server displays the code to the
    /// operator, who pastes it back into the terminal.
    pub const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

    /// Default requested scope (full Drive access)
    pub const DEFAULT_SCOPE: &str = "https://www.googleapis.com/auth/drive";

    /// Directory under the user's home where credentials are cached
    pub const CACHE_DIR_NAME: &str = ".credentials";

    /// Fixed cache filename (URL-escaped before use)
    pub const TOKEN_CACHE_FILE: &str = "drive-pusher.json";

    /// Cache directory permissions (Unix only) - owner traversal only
    #[cfg(unix)]
    pub const CACHE_DIR_PERMISSIONS: u32 = 0o700;

    /// Cache file permissions (Unix only) - owner read/write only
    #[cfg(unix)]
    pub const TOKEN_FILE_PERMISSIONS: u32 = 0o600;

    /// Leeway applied when deciding whether a token is expired, so a token
    /// about to lapse mid-request counts as expired
    pub const EXPIRY_LEEWAY_SECS: i64 = 10;

    /// Token lifetime assumed when the token endpoint omits `expires_in`
    pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = "drive-pusher/0.1.0";

    /// Default HTTP request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Maximum connections per host in pool
    pub const POOL_MAX_PER_HOST: usize = 4;
}

/// Drive API endpoints and request defaults
pub mod drive {
    /// Drive v3 API base URL (metadata and listing)
    pub const API_BASE_URL: &str = "https://www.googleapis.com/drive/v3/";

    /// Drive v3 upload base URL (media content)
    pub const UPLOAD_BASE_URL: &str = "https://www.googleapis.com/upload/drive/v3/";

    /// Default page size for file listings
    pub const DEFAULT_PAGE_SIZE: u32 = 1000;

    /// Default ordering for file listings
    pub const DEFAULT_ORDER_BY: &str = "name";

    /// Fields requested for file listings
    pub const LIST_FIELDS: &str = "nextPageToken, files(id, name, mimeType, trashed)";

    /// Fields requested for a single file metadata fetch
    pub const FILE_FIELDS: &str = "id, name, mimeType, trashed";

    /// MIME type used when creating a new Google Doc
    pub const DOCUMENT_MIME_TYPE: &str = "application/vnd.google-apps.document";
}

/// File operation constants
pub mod files {
    /// Default client secret filename, relative to the working directory
    pub const SECRET_FILE_NAME: &str = "client_secret.json";

    /// Temporary file suffix for atomic download writes
    pub const TEMP_FILE_SUFFIX: &str = ".tmp";
}

// Re-export commonly used constants for convenience
pub use auth::{DEFAULT_SCOPE, STATE_TOKEN, TOKEN_CACHE_FILE};
pub use drive::{API_BASE_URL, DEFAULT_PAGE_SIZE, UPLOAD_BASE_URL};
pub use files::SECRET_FILE_NAME;
pub use http::{DEFAULT_TIMEOUT as HTTP_TIMEOUT, USER_AGENT};
