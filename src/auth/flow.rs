//! Credential acquisition flow
//!
//! Implements the cache-or-interactive acquisition policy: a readable cache
//! record is returned as-is, anything else falls through to the interactive
//! authorization-code flow exactly once. Interactive input is behind the
//! [`AuthCodePrompt`] seam so a host can substitute a non-blocking or
//! timeout-bounded source for the terminal prompt.

use std::io::{self, BufRead, Write};
use std::sync::Mutex;

use url::Url;

use crate::app::ClientConfig;
use crate::auth::cache::TokenCache;
use crate::auth::config::OauthConfig;
use crate::auth::token::{Token, TokenResponse};
use crate::constants::auth;
use crate::errors::{AuthError, AuthResult};

/// Source of the single-use authorization code
///
/// The blocking read is the only suspension point in the acquisition flow;
/// making it a trait keeps the manager testable without a terminal.
pub trait AuthCodePrompt {
    /// Presents the authorization URL and returns the code the operator
    /// obtained out-of-band
    fn read_code(&self, auth_url: &Url) -> AuthResult<String>;
}

/// Terminal-backed prompt: prints the URL, blocks on standard input
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl AuthCodePrompt for TerminalPrompt {
    fn read_code(&self, auth_url: &Url) -> AuthResult<String> {
        println!(
            "Go to the following link in your browser then type the authorization code:\n{}",
            auth_url
        );
        io::stdout().flush().map_err(AuthError::InteractiveInput)?;

        let mut code = String::new();
        io::stdin()
            .lock()
            .read_line(&mut code)
            .map_err(AuthError::InteractiveInput)?;
        Ok(code)
    }
}

/// Obtains a valid bearer credential, preferring the on-disk cache
#[derive(Debug)]
pub struct CredentialManager {
    config: OauthConfig,
    cache: TokenCache,
    http: reqwest::Client,
}

impl CredentialManager {
    /// Creates a manager for the given authorization configuration and
    /// cache location
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the HTTP client cannot be built
    pub fn new(config: OauthConfig, cache: TokenCache) -> AuthResult<Self> {
        let http = ClientConfig::default().build_http_client()?;
        Ok(Self {
            config,
            cache,
            http,
        })
    }

    /// The cache this manager reads and writes
    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }

    /// The authorization configuration
    pub fn config(&self) -> &OauthConfig {
        &self.config
    }

    /// Builds the interactive authorization URL
    ///
    /// Embeds the client id, requested scope, offline-access request, and
    /// the fixed anti-forgery state value. Deterministic for a fixed
    /// configuration.
    pub fn authorization_url(&self) -> AuthResult<Url> {
        let mut url =
            Url::parse(&self.config.auth_url).map_err(|source| AuthError::InvalidUrl {
                url: self.config.auth_url.clone(),
                source,
            })?;

        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("scope", &self.config.scope)
            .append_pair("access_type", "offline")
            .append_pair("state", auth::STATE_TOKEN);

        Ok(url)
    }

    /// Acquires a credential: cached if readable, interactive otherwise
    ///
    /// A cached credential is returned without an expiry check, deferring
    /// any staleness to the first API call; renewal is handled at the
    /// request layer by [`TokenSource`]. A cache read failure is the only
    /// recovered error class and falls through to the interactive flow
    /// exactly once.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the interactive flow, exchange, or cache
    /// write fails. There is no retry.
    pub async fn acquire(&self, prompt: &dyn AuthCodePrompt) -> AuthResult<Token> {
        match self.cache.load() {
            Ok(token) => {
                tracing::debug!("Using cached credential from {}", self.cache.path().display());
                return Ok(token);
            }
            Err(e) => {
                tracing::debug!("Credential cache miss: {}", e);
            }
        }

        self.reauthorize(prompt).await
    }

    /// Runs the interactive flow unconditionally and persists the result
    ///
    /// Used by `acquire` on a cache miss and directly by `auth setup` to
    /// replace an existing credential.
    pub async fn reauthorize(&self, prompt: &dyn AuthCodePrompt) -> AuthResult<Token> {
        let auth_url = self.authorization_url()?;
        let code = prompt.read_code(&auth_url)?;
        let code = code.trim();
        if code.is_empty() {
            return Err(AuthError::EmptyAuthCode);
        }

        let token = self.exchange_code(code).await?;
        self.cache.store(&token)?;
        println!("Saving credential file to: {}", self.cache.path().display());

        Ok(token)
    }

    /// Exchanges an authorization code for a credential
    pub async fn exchange_code(&self, code: &str) -> AuthResult<Token> {
        tracing::info!("Exchanging authorization code at {}", self.config.token_url);
        self.request_token(
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", &self.config.client_id),
                ("client_secret", &self.config.client_secret),
                ("redirect_uri", &self.config.redirect_uri),
            ],
            None,
        )
        .await
    }

    /// Renews a credential using its refresh token
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NoRefreshToken` when the credential cannot be
    /// renewed without user interaction.
    pub async fn refresh(&self, token: &Token) -> AuthResult<Token> {
        let refresh_token = token
            .refresh_token
            .clone()
            .ok_or(AuthError::NoRefreshToken)?;

        tracing::info!("Refreshing credential at {}", self.config.token_url);
        self.request_token(
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", &refresh_token),
                ("client_id", &self.config.client_id),
                ("client_secret", &self.config.client_secret),
            ],
            Some(refresh_token.clone()),
        )
        .await
    }

    /// Posts a form to the token endpoint and parses the credential
    ///
    /// Single attempt: any failure propagates to the caller.
    async fn request_token(
        &self,
        params: &[(&str, &str)],
        previous_refresh: Option<String>,
    ) -> AuthResult<Token> {
        let response = self
            .http
            .post(&self.config.token_url)
            .form(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Token endpoint returned HTTP {}: {}", status, body);
            return Err(AuthError::ExchangeRejected {
                status: status.as_u16(),
                body,
            });
        }

        let wire: TokenResponse = response.json().await?;
        Ok(Token::from_response(wire, previous_refresh))
    }
}

/// Yields a valid access token for API requests
///
/// Mirrors the behavior of an auto-refreshing OAuth2 client: an unexpired
/// token is reused, an expired renewable token is refreshed and the cache
/// record overwritten, and an expired non-renewable token is handed out
/// as-is so the failure surfaces at the API call that uses it.
#[derive(Debug)]
pub struct TokenSource {
    manager: CredentialManager,
    current: Mutex<Token>,
}

impl TokenSource {
    /// Wraps an acquired credential together with its manager
    pub fn new(manager: CredentialManager, token: Token) -> Self {
        Self {
            manager,
            current: Mutex::new(token),
        }
    }

    /// Returns an access token, renewing the credential when possible
    pub async fn access_token(&self) -> AuthResult<String> {
        let current = self.current.lock().expect("token lock poisoned").clone();

        if !current.is_expired() {
            return Ok(current.access_token);
        }
        if !current.is_renewable() {
            tracing::debug!("Credential expired without refresh token; using it as-is");
            return Ok(current.access_token);
        }

        let renewed = self.manager.refresh(&current).await?;
        self.manager.cache.store(&renewed)?;

        let access_token = renewed.access_token.clone();
        *self.current.lock().expect("token lock poisoned") = renewed;
        Ok(access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{Duration, Utc};
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Prompt that fails the test if the interactive flow is entered
    struct PanicPrompt;

    impl AuthCodePrompt for PanicPrompt {
        fn read_code(&self, _auth_url: &Url) -> AuthResult<String> {
            panic!("interactive flow must not run when a cached credential exists");
        }
    }

    /// Prompt returning a fixed code, counting invocations
    struct FixedPrompt {
        code: &'static str,
        calls: AtomicUsize,
    }

    impl FixedPrompt {
        fn new(code: &'static str) -> Self {
            Self {
                code,
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl AuthCodePrompt for FixedPrompt {
        fn read_code(&self, _auth_url: &Url) -> AuthResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.code.to_string())
        }
    }

    fn test_config(token_url: String) -> OauthConfig {
        OauthConfig {
            client_id: "client-123.apps.example.com".to_string(),
            client_secret: "s3cr3t".to_string(),
            auth_url: "https://accounts.example.com/o/oauth2/auth".to_string(),
            token_url,
            redirect_uri: auth::OOB_REDIRECT_URI.to_string(),
            scope: auth::DEFAULT_SCOPE.to_string(),
        }
    }

    /// Unroutable token endpoint for paths that must not touch the network
    fn offline_config() -> OauthConfig {
        test_config("http://127.0.0.1:1/token".to_string())
    }

    fn sample_token(expiry: chrono::DateTime<Utc>) -> Token {
        Token {
            access_token: "ya29.cached".to_string(),
            token_type: "Bearer".to_string(),
            refresh_token: Some("1//refresh".to_string()),
            expiry,
        }
    }

    fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    /// Serves exactly one canned HTTP response and returns the raw request
    async fn spawn_token_endpoint(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];

            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);

                if let Some(header_end) = find_subsequence(&request, b"\r\n\r\n") {
                    let headers =
                        String::from_utf8_lossy(&request[..header_end]).to_lowercase();
                    let content_length = headers
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if request.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            String::from_utf8_lossy(&request).into_owned()
        });

        (format!("http://{}/token", addr), handle)
    }

    #[test]
    fn test_authorization_url_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let manager =
            CredentialManager::new(offline_config(), TokenCache::new(dir.path())).unwrap();

        let first = manager.authorization_url().unwrap();
        let second = manager.authorization_url().unwrap();
        assert_eq!(first, second);

        let query = first.query().unwrap();
        assert!(query.contains("client_id=client-123.apps.example.com"));
        assert!(query.contains("access_type=offline"));
        assert!(query.contains("response_type=code"));
        assert!(query.contains(&format!("state={}", auth::STATE_TOKEN)));
        // Scope is percent-encoded in the query string
        assert!(query.contains("scope=https%3A%2F%2Fwww.googleapis.com%2Fauth%2Fdrive"));
    }

    #[tokio::test]
    async fn test_acquire_returns_cached_without_prompt_or_network() {
        let dir = TempDir::new().unwrap();
        let cache = TokenCache::new(dir.path());
        let token = sample_token(Utc::now() + Duration::hours(1));
        cache.store(&token).unwrap();

        let manager = CredentialManager::new(offline_config(), cache).unwrap();
        let acquired = manager.acquire(&PanicPrompt).await.unwrap();

        assert_eq!(acquired, token);
    }

    #[tokio::test]
    async fn test_acquire_returns_expired_cached_token_unchanged() {
        // Preserved original behavior: no expiry check on the cached record
        let dir = TempDir::new().unwrap();
        let cache = TokenCache::new(dir.path());
        let stale = sample_token(Utc::now() - Duration::hours(1));
        cache.store(&stale).unwrap();

        let manager = CredentialManager::new(offline_config(), cache).unwrap();
        let acquired = manager.acquire(&PanicPrompt).await.unwrap();

        assert_eq!(acquired, stale);
    }

    #[tokio::test]
    async fn test_acquire_interactive_flow_on_empty_cache() {
        let (token_url, server) = spawn_token_endpoint(
            "200 OK",
            r#"{"access_token": "exchange-access", "token_type": "Bearer",
                "refresh_token": "exchange-refresh", "expires_in": 3600}"#,
        )
        .await;

        let dir = TempDir::new().unwrap();
        let cache = TokenCache::new(dir.path().join("credentials"));
        let manager = CredentialManager::new(test_config(token_url), cache.clone()).unwrap();

        let prompt = FixedPrompt::new("ABC123");
        let token = manager.acquire(&prompt).await.unwrap();

        assert_eq!(prompt.call_count(), 1);
        assert_eq!(token.access_token, "exchange-access");
        assert_eq!(token.refresh_token.as_deref(), Some("exchange-refresh"));

        // The cache record must round-trip the exchanged credential
        let cached = cache.load().unwrap();
        assert_eq!(cached, token);
        assert!(!cached.access_token.is_empty());

        // The exchange carried the code and client identity
        let request = server.await.unwrap();
        assert!(request.contains("grant_type=authorization_code"));
        assert!(request.contains("code=ABC123"));
        assert!(request.contains("client_id=client-123.apps.example.com"));
    }

    #[tokio::test]
    async fn test_acquire_recovers_from_corrupt_cache() {
        let (token_url, _server) = spawn_token_endpoint(
            "200 OK",
            r#"{"access_token": "recovered", "token_type": "Bearer", "expires_in": 3600}"#,
        )
        .await;

        let dir = TempDir::new().unwrap();
        let cache = TokenCache::new(dir.path());
        std::fs::write(cache.path(), "not a credential").unwrap();

        let manager = CredentialManager::new(test_config(token_url), cache).unwrap();
        let prompt = FixedPrompt::new("ABC123");
        let token = manager.acquire(&prompt).await.unwrap();

        // Interactive flow entered exactly once, never retried
        assert_eq!(prompt.call_count(), 1);
        assert_eq!(token.access_token, "recovered");
    }

    #[tokio::test]
    async fn test_acquire_rejects_empty_code() {
        let dir = TempDir::new().unwrap();
        let manager =
            CredentialManager::new(offline_config(), TokenCache::new(dir.path())).unwrap();

        let prompt = FixedPrompt::new("   \n");
        let result = manager.acquire(&prompt).await;
        assert!(matches!(result.unwrap_err(), AuthError::EmptyAuthCode));
    }

    #[tokio::test]
    async fn test_exchange_rejected_by_server() {
        let (token_url, _server) = spawn_token_endpoint(
            "400 Bad Request",
            r#"{"error": "invalid_grant"}"#,
        )
        .await;

        let dir = TempDir::new().unwrap();
        let manager =
            CredentialManager::new(test_config(token_url), TokenCache::new(dir.path())).unwrap();

        let result = manager.exchange_code("BOGUS").await;
        match result.unwrap_err() {
            AuthError::ExchangeRejected { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("invalid_grant"));
            }
            other => panic!("Expected ExchangeRejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_refresh_requires_refresh_token() {
        let dir = TempDir::new().unwrap();
        let manager =
            CredentialManager::new(offline_config(), TokenCache::new(dir.path())).unwrap();

        let token = Token {
            refresh_token: None,
            ..sample_token(Utc::now())
        };
        let result = manager.refresh(&token).await;
        assert!(matches!(result.unwrap_err(), AuthError::NoRefreshToken));
    }

    #[tokio::test]
    async fn test_token_source_reuses_fresh_token() {
        let dir = TempDir::new().unwrap();
        let manager =
            CredentialManager::new(offline_config(), TokenCache::new(dir.path())).unwrap();
        let token = sample_token(Utc::now() + Duration::hours(1));

        let source = TokenSource::new(manager, token);
        // Unroutable endpoint: passing means no network call happened
        assert_eq!(source.access_token().await.unwrap(), "ya29.cached");
    }

    #[tokio::test]
    async fn test_token_source_refreshes_expired_token() {
        let (token_url, server) = spawn_token_endpoint(
            "200 OK",
            r#"{"access_token": "renewed-access", "token_type": "Bearer", "expires_in": 3600}"#,
        )
        .await;

        let dir = TempDir::new().unwrap();
        let cache = TokenCache::new(dir.path());
        let stale = sample_token(Utc::now() - Duration::minutes(5));
        cache.store(&stale).unwrap();

        let manager = CredentialManager::new(test_config(token_url), cache.clone()).unwrap();
        let source = TokenSource::new(manager, stale);

        assert_eq!(source.access_token().await.unwrap(), "renewed-access");

        // Renewal overwrote the cache record and carried the refresh token
        let cached = cache.load().unwrap();
        assert_eq!(cached.access_token, "renewed-access");
        assert_eq!(cached.refresh_token.as_deref(), Some("1//refresh"));

        let request = server.await.unwrap();
        assert!(request.contains("grant_type=refresh_token"));
    }

    #[tokio::test]
    async fn test_token_source_hands_out_expired_nonrenewable_token() {
        let dir = TempDir::new().unwrap();
        let manager =
            CredentialManager::new(offline_config(), TokenCache::new(dir.path())).unwrap();

        let token = Token {
            refresh_token: None,
            ..sample_token(Utc::now() - Duration::hours(1))
        };
        let source = TokenSource::new(manager, token);

        // Staleness is deferred to the API call that uses the token
        assert_eq!(source.access_token().await.unwrap(), "ya29.cached");
    }
}
