//! On-disk credential cache
//!
//! Persists the bearer token under a per-user configuration directory so
//! later invocations skip the interactive authorization flow. The cache
//! location is explicit configuration rather than resolved internally,
//! which keeps tests hermetic; the CLI supplies `<home>/.credentials` as
//! the default.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::auth::token::Token;
use crate::constants::auth;
use crate::errors::{AuthError, AuthResult};

/// Deterministic cache location for a persisted credential
#[derive(Debug, Clone)]
pub struct TokenCache {
    dir: PathBuf,
    file_name: String,
}

impl TokenCache {
    /// Creates a cache rooted at the given directory with the fixed
    /// default filename
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_file_name(dir, auth::TOKEN_CACHE_FILE)
    }

    /// Creates a cache with an explicit filename (URL-escaped before use)
    pub fn with_file_name(dir: impl Into<PathBuf>, file_name: &str) -> Self {
        Self {
            dir: dir.into(),
            file_name: escape_file_name(file_name),
        }
    }

    /// Full path of the cache file
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    /// Whether a cache record currently exists on disk
    pub fn exists(&self) -> bool {
        self.path().exists()
    }

    /// Reads and deserializes the cached credential
    ///
    /// # Errors
    ///
    /// Returns `AuthError::CacheRead` when the file is missing or
    /// unreadable, `AuthError::CacheMalformed` when it does not parse.
    /// Callers treat both as a cache miss.
    pub fn load(&self) -> AuthResult<Token> {
        let path = self.path();
        let contents = fs::read_to_string(&path).map_err(|source| AuthError::CacheRead {
            path: path.clone(),
            source,
        })?;

        serde_json::from_str(&contents)
            .map_err(|source| AuthError::CacheMalformed { path, source })
    }

    /// Persists the credential, overwriting any previous record
    ///
    /// The cache directory is created if absent (owner-only traversal; an
    /// existing directory keeps its permissions) and the record is written
    /// via a temp file in the same directory followed by a rename, so a
    /// crash mid-write never leaves a truncated cache. File permissions
    /// restrict access to the owning user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::CacheDir` or `AuthError::CacheWrite` on failure;
    /// both are unrecoverable for the caller.
    pub fn store(&self, token: &Token) -> AuthResult<()> {
        let path = self.path();

        if !self.dir.is_dir() {
            fs::create_dir_all(&self.dir).map_err(|source| AuthError::CacheDir {
                path: self.dir.clone(),
                source,
            })?;
            restrict_dir_permissions(&self.dir)?;
        }

        let mut temp = NamedTempFile::new_in(&self.dir).map_err(|source| {
            AuthError::CacheWrite {
                path: path.clone(),
                source,
            }
        })?;

        let contents =
            serde_json::to_vec_pretty(token).map_err(|source| AuthError::CacheWrite {
                path: path.clone(),
                source: source.into(),
            })?;
        temp.write_all(&contents)
            .and_then(|_| temp.flush())
            .map_err(|source| AuthError::CacheWrite {
                path: path.clone(),
                source,
            })?;

        restrict_file_permissions(temp.path(), &path)?;

        temp.persist(&path).map_err(|e| AuthError::CacheWrite {
            path: path.clone(),
            source: e.error,
        })?;

        tracing::info!("Cached credential at {}", path.display());
        Ok(())
    }

    /// Removes the cache record, if present
    pub fn clear(&self) -> AuthResult<()> {
        let path = self.path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(AuthError::CacheClear { path, source }),
        }
    }
}

/// URL-escapes a cache filename so a constant with unusual characters
/// still maps to a single flat file
fn escape_file_name(name: &str) -> String {
    url::form_urlencoded::byte_serialize(name.as_bytes()).collect()
}

#[cfg(unix)]
fn restrict_dir_permissions(dir: &Path) -> AuthResult<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(dir, fs::Permissions::from_mode(auth::CACHE_DIR_PERMISSIONS)).map_err(
        |source| AuthError::CacheDir {
            path: dir.to_path_buf(),
            source,
        },
    )
}

#[cfg(not(unix))]
fn restrict_dir_permissions(_dir: &Path) -> AuthResult<()> {
    Ok(())
}

#[cfg(unix)]
fn restrict_file_permissions(temp_path: &Path, cache_path: &Path) -> AuthResult<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(
        temp_path,
        fs::Permissions::from_mode(auth::TOKEN_FILE_PERMISSIONS),
    )
    .map_err(|source| AuthError::CacheWrite {
        path: cache_path.to_path_buf(),
        source,
    })
}

#[cfg(not(unix))]
fn restrict_file_permissions(_temp_path: &Path, _cache_path: &Path) -> AuthResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn sample_token() -> Token {
        Token {
            access_token: "ya29.cached".to_string(),
            token_type: "Bearer".to_string(),
            refresh_token: Some("1//refresh".to_string()),
            expiry: Utc::now() + Duration::hours(1),
        }
    }

    #[test]
    fn test_store_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let cache = TokenCache::new(dir.path().join("credentials"));
        let token = sample_token();

        cache.store(&token).unwrap();
        let restored = cache.load().unwrap();

        assert_eq!(restored, token);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let cache = TokenCache::new(dir.path());

        let result = cache.load();
        assert!(matches!(result.unwrap_err(), AuthError::CacheRead { .. }));
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let cache = TokenCache::new(dir.path());
        fs::write(cache.path(), "{ not valid json").unwrap();

        let result = cache.load();
        assert!(matches!(
            result.unwrap_err(),
            AuthError::CacheMalformed { .. }
        ));
    }

    #[test]
    fn test_store_creates_directory_idempotently() {
        let dir = TempDir::new().unwrap();
        let cache_dir = dir.path().join("credentials");
        let cache = TokenCache::new(&cache_dir);

        // Unrelated file in the (pre-created) directory must survive
        fs::create_dir_all(&cache_dir).unwrap();
        let unrelated = cache_dir.join("other.json");
        fs::write(&unrelated, "keep me").unwrap();

        cache.store(&sample_token()).unwrap();
        cache.store(&sample_token()).unwrap();

        assert_eq!(fs::read_to_string(&unrelated).unwrap(), "keep me");
        assert!(cache.exists());
    }

    #[test]
    fn test_store_overwrites_previous_record() {
        let dir = TempDir::new().unwrap();
        let cache = TokenCache::new(dir.path());

        cache.store(&sample_token()).unwrap();

        let replacement = Token {
            access_token: "ya29.replacement".to_string(),
            ..sample_token()
        };
        cache.store(&replacement).unwrap();

        assert_eq!(cache.load().unwrap().access_token, "ya29.replacement");
    }

    #[cfg(unix)]
    #[test]
    fn test_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let cache_dir = dir.path().join("credentials");
        let cache = TokenCache::new(&cache_dir);
        cache.store(&sample_token()).unwrap();

        let dir_mode = fs::metadata(&cache_dir).unwrap().permissions().mode();
        assert_eq!(dir_mode & 0o777, 0o700);

        let file_mode = fs::metadata(cache.path()).unwrap().permissions().mode();
        assert_eq!(file_mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_store_preserves_existing_dir_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let cache_dir = dir.path().join("shared");
        fs::create_dir_all(&cache_dir).unwrap();
        fs::set_permissions(&cache_dir, fs::Permissions::from_mode(0o755)).unwrap();

        let cache = TokenCache::new(&cache_dir);
        cache.store(&sample_token()).unwrap();

        // A directory the caller supplied keeps whatever mode it had
        let mode = fs::metadata(&cache_dir).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn test_clear_failure_reports_removal() {
        let dir = TempDir::new().unwrap();
        let cache = TokenCache::new(dir.path());

        // A directory at the cache path cannot be removed as a file
        fs::create_dir_all(cache.path()).unwrap();

        let result = cache.clear();
        assert!(matches!(result.unwrap_err(), AuthError::CacheClear { .. }));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let cache = TokenCache::new(dir.path());

        cache.store(&sample_token()).unwrap();
        cache.clear().unwrap();
        assert!(!cache.exists());

        // Clearing an absent record is not an error
        cache.clear().unwrap();
    }

    #[test]
    fn test_file_name_escaping() {
        let dir = TempDir::new().unwrap();
        let cache = TokenCache::with_file_name(dir.path(), "my client?.json");

        let name = cache.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(!name.contains('?'));
        assert!(!name.contains(' '));

        // Default filename contains no characters that need escaping
        let default_cache = TokenCache::new(dir.path());
        assert_eq!(
            default_cache.path().file_name().unwrap().to_string_lossy(),
            auth::TOKEN_CACHE_FILE
        );
    }
}
