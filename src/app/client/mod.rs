//! HTTP client for the Drive v3 API
//!
//! Wraps a reqwest client with bearer authorization from a [`TokenSource`]
//! and exposes the handful of file operations this tool needs. Requests are
//! single-attempt: any failure propagates to the caller, which suits a
//! one-shot CLI.

use std::path::Path;

use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::app::models::{DriveFile, FileList};
use crate::auth::TokenSource;
use crate::constants::{drive, files};
use crate::errors::{ApiError, ApiResult};

pub mod config;

pub use config::ClientConfig;

/// Authenticated client for Drive file operations
#[derive(Debug)]
pub struct DriveClient {
    http: reqwest::Client,
    source: TokenSource,
    api_base: Url,
    upload_base: Url,
}

impl DriveClient {
    /// Creates a client with default configuration against the production
    /// API endpoints
    pub fn new(source: TokenSource) -> ApiResult<Self> {
        Self::with_config(ClientConfig::default(), source)
    }

    /// Creates a client with custom HTTP configuration
    pub fn with_config(config: ClientConfig, source: TokenSource) -> ApiResult<Self> {
        let api_base = Url::parse(drive::API_BASE_URL).expect("API base URL should be valid");
        let upload_base =
            Url::parse(drive::UPLOAD_BASE_URL).expect("Upload base URL should be valid");
        Self::with_endpoints(config, source, api_base, upload_base)
    }

    /// Creates a client against explicit endpoints
    ///
    /// The endpoint seam exists so integration tests can point the client
    /// at a local server.
    pub fn with_endpoints(
        config: ClientConfig,
        source: TokenSource,
        api_base: Url,
        upload_base: Url,
    ) -> ApiResult<Self> {
        let http = config.build_http_client()?;
        Ok(Self {
            http,
            source,
            api_base,
            upload_base,
        })
    }

    /// Lists files visible to this client, following pagination
    ///
    /// # Arguments
    ///
    /// * `query` - Optional Drive search expression (the `q` parameter)
    /// * `page_size` - Files requested per page
    /// * `order_by` - Server-side ordering, e.g. "name"
    pub async fn list_files(
        &self,
        query: Option<&str>,
        page_size: u32,
        order_by: &str,
    ) -> ApiResult<Vec<DriveFile>> {
        let mut collected = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.api_url("files")?;
            {
                let mut pairs = url.query_pairs_mut();
                pairs
                    .append_pair("pageSize", &page_size.to_string())
                    .append_pair("orderBy", order_by)
                    .append_pair("fields", drive::LIST_FIELDS);
                if let Some(q) = query {
                    pairs.append_pair("q", q);
                }
                if let Some(token) = &page_token {
                    pairs.append_pair("pageToken", token);
                }
            }

            let response = self.get(url).await?;
            let page: FileList = Self::check(response, None).await?.json().await?;

            tracing::debug!("Fetched page with {} files", page.files.len());
            collected.extend(page.files);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(collected)
    }

    /// Fetches metadata for a single file
    pub async fn get_file(&self, file_id: &str) -> ApiResult<DriveFile> {
        let mut url = self.api_url(&format!("files/{}", file_id))?;
        url.query_pairs_mut()
            .append_pair("fields", drive::FILE_FIELDS);

        let response = self.get(url).await?;
        let file = Self::check(response, Some(file_id)).await?.json().await?;
        Ok(file)
    }

    /// Replaces a file's content with the given bytes
    ///
    /// This is a media upload against the upload endpoint; metadata is left
    /// untouched.
    pub async fn update_file_content(&self, file_id: &str, content: Vec<u8>) -> ApiResult<()> {
        let mut url = self.upload_url(&format!("files/{}", file_id))?;
        url.query_pairs_mut().append_pair("uploadType", "media");

        let response = self
            .http
            .patch(url)
            .bearer_auth(self.source.access_token().await?)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(content)
            .send()
            .await?;

        Self::check(response, Some(file_id)).await?;
        tracing::info!("Updated content of file {}", file_id);
        Ok(())
    }

    /// Downloads a file's content to the given path
    ///
    /// Uses the temp file + rename pattern so an interrupted download never
    /// leaves a truncated destination.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::FileExists` when the destination exists and
    /// `force` is not set.
    pub async fn download_file(
        &self,
        file_id: &str,
        destination: &Path,
        force: bool,
    ) -> ApiResult<()> {
        if destination.exists() && !force {
            return Err(ApiError::FileExists {
                path: destination.display().to_string(),
            });
        }

        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut url = self.api_url(&format!("files/{}", file_id))?;
        url.query_pairs_mut().append_pair("alt", "media");

        let response = self.get(url).await?;
        let bytes = Self::check(response, Some(file_id)).await?.bytes().await?;

        let temp_path = temp_file_path(destination);
        let mut file = File::create(&temp_path).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        tokio::fs::rename(&temp_path, destination).await?;

        tracing::info!(
            "Downloaded {} bytes to {}",
            bytes.len(),
            destination.display()
        );
        Ok(())
    }

    /// Creates a new file with the given name and content
    ///
    /// Two-step create: metadata first, then a media update of the new
    /// file's content.
    pub async fn create_file(
        &self,
        name: &str,
        mime_type: &str,
        content: Vec<u8>,
    ) -> ApiResult<DriveFile> {
        let url = self.api_url("files")?;
        let metadata = serde_json::json!({
            "name": name,
            "mimeType": mime_type,
        });

        let response = self
            .http
            .post(url)
            .bearer_auth(self.source.access_token().await?)
            .json(&metadata)
            .send()
            .await?;

        let file: DriveFile = Self::check(response, None).await?.json().await?;
        tracing::info!("Created file {} ({})", file.name, file.id);

        if !content.is_empty() {
            self.update_file_content(&file.id, content).await?;
        }

        Ok(file)
    }

    /// Issues an authorized GET request
    async fn get(&self, url: Url) -> ApiResult<reqwest::Response> {
        let response = self
            .http
            .get(url)
            .bearer_auth(self.source.access_token().await?)
            .send()
            .await?;
        Ok(response)
    }

    /// Maps non-success responses to API errors
    async fn check(
        response: reqwest::Response,
        file_id: Option<&str>,
    ) -> ApiResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            if let Some(file_id) = file_id {
                return Err(ApiError::NotFound {
                    file_id: file_id.to_string(),
                });
            }
        }

        let message = response.text().await.unwrap_or_default();
        tracing::warn!("Drive API returned HTTP {}: {}", status, message);
        Err(ApiError::ServerError {
            status: status.as_u16(),
            message,
        })
    }

    fn api_url(&self, path: &str) -> ApiResult<Url> {
        self.api_base
            .join(path)
            .map_err(|_| ApiError::ServerError {
                status: 0,
                message: format!("invalid API path: {}", path),
            })
    }

    fn upload_url(&self, path: &str) -> ApiResult<Url> {
        self.upload_base
            .join(path)
            .map_err(|_| ApiError::ServerError {
                status: 0,
                message: format!("invalid upload path: {}", path),
            })
    }
}

/// Temporary sibling path used for atomic download writes
fn temp_file_path(destination: &Path) -> std::path::PathBuf {
    destination.with_extension(format!(
        "{}{}",
        destination
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or(""),
        files::TEMP_FILE_SUFFIX
    ))
}
