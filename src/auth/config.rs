//! Client secret loading for the OAuth2 authorization flow
//!
//! The client secret file is the standard JSON envelope issued by the Google
//! API console, with credentials nested under an `installed` or `web` key.
//! It is loaded once at startup and immutable for the process lifetime;
//! a missing or malformed file is unrecoverable.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::constants::auth;
use crate::errors::{ConfigError, ConfigResult};

/// Static authorization configuration for the OAuth2 code flow
#[derive(Debug, Clone)]
pub struct OauthConfig {
    /// Client identifier issued by the authorization server
    pub client_id: String,
    /// Client secret issued by the authorization server
    pub client_secret: String,
    /// Authorization endpoint URL (interactive consent page)
    pub auth_url: String,
    /// Token exchange endpoint URL
    pub token_url: String,
    /// Redirect URI presented during authorization
    pub redirect_uri: String,
    /// Requested scope
    pub scope: String,
}

/// On-disk client secret envelope as issued by the API console
#[derive(Debug, Deserialize)]
struct SecretFile {
    installed: Option<SecretEntry>,
    web: Option<SecretEntry>,
}

#[derive(Debug, Deserialize)]
struct SecretEntry {
    client_id: String,
    client_secret: String,
    auth_uri: String,
    token_uri: String,
    #[serde(default)]
    redirect_uris: Vec<String>,
}

impl OauthConfig {
    /// Loads the configuration from a client secret file
    ///
    /// Accepts both the `installed` and `web` envelope forms. When the file
    /// lists no redirect URIs, the out-of-band URI for installed
    /// applications is used.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, not valid
    /// JSON, or lacks both envelope keys.
    pub fn from_secret_file(path: &Path, scope: &str) -> ConfigResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Io(e)
            }
        })?;

        let secret: SecretFile = serde_json::from_str(&contents)?;
        let entry = secret
            .installed
            .or(secret.web)
            .ok_or_else(|| ConfigError::MissingField {
                field: "installed".to_string(),
            })?;

        let redirect_uri = entry
            .redirect_uris
            .into_iter()
            .next()
            .unwrap_or_else(|| auth::OOB_REDIRECT_URI.to_string());

        tracing::debug!("Loaded client secret for client id {}", entry.client_id);

        Ok(Self {
            client_id: entry.client_id,
            client_secret: entry.client_secret,
            auth_url: entry.auth_uri,
            token_url: entry.token_uri,
            redirect_uri,
            scope: scope.to_string(),
        })
    }
}
