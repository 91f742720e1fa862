//! Bearer token model and token endpoint wire types
//!
//! The cached form uses the conventional OAuth2 JSON field names so a cache
//! file written by other tooling for the same client remains readable.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::auth;

/// A bearer credential for API access
///
/// Created by the token endpoint exchange or deserialized from the on-disk
/// cache; mutated only by replacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Opaque access token presented as `Authorization: Bearer`
    pub access_token: String,

    /// Token type, in practice always "Bearer"
    pub token_type: String,

    /// Refresh token, present when offline access was granted. With a
    /// refresh token the credential can be renewed without user
    /// interaction; without one it is single-use until expiry.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub refresh_token: Option<String>,

    /// Instant the access token lapses
    pub expiry: DateTime<Utc>,
}

/// Token endpoint response body (RFC 6749 §5.1)
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl Token {
    /// Builds a token from a token endpoint response
    ///
    /// The server omits the refresh token on renewal responses; the previous
    /// refresh token is carried forward so the credential stays renewable.
    pub fn from_response(response: TokenResponse, previous_refresh: Option<String>) -> Self {
        let lifetime = response
            .expires_in
            .unwrap_or(auth::DEFAULT_TOKEN_LIFETIME_SECS);

        Self {
            access_token: response.access_token,
            token_type: response.token_type,
            refresh_token: response.refresh_token.or(previous_refresh),
            expiry: Utc::now() + Duration::seconds(lifetime),
        }
    }

    /// Whether the access token has lapsed (with a small leeway)
    pub fn is_expired(&self) -> bool {
        self.expiry - Duration::seconds(auth::EXPIRY_LEEWAY_SECS) <= Utc::now()
    }

    /// Whether the credential can be renewed without user interaction
    pub fn is_renewable(&self) -> bool {
        self.refresh_token.is_some()
    }
}
