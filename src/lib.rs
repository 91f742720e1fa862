//! drive_pusher library
//!
//! A command-line OAuth2 client for the Google Drive v3 API: obtains and
//! caches a bearer credential, lists files, and pushes a local data blob
//! into a known remote document.

pub mod app;
pub mod auth;
pub mod cli;
pub mod constants;
pub mod errors;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};

#[cfg(test)]
mod tests {
    use super::*;
    use constants::*;

    #[test]
    fn test_constants_accessible() {
        assert_eq!(STATE_TOKEN, "state-token");
        assert_eq!(DEFAULT_PAGE_SIZE, 1000);
        assert!(USER_AGENT.contains("drive-pusher"));
    }

    #[test]
    fn test_error_types() {
        let auth_error = errors::AuthError::EmptyAuthCode;
        let app_error = AppError::Auth(auth_error);

        assert_eq!(app_error.category(), "authentication");
    }
}
