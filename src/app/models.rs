//! Data models for Drive API resources

use serde::Deserialize;

/// A file resource as returned by the Drive v3 API
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DriveFile {
    /// Opaque file identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// MIME type, absent when not requested
    #[serde(rename = "mimeType", default)]
    pub mime_type: Option<String>,
    /// Whether the file sits in the trash
    #[serde(default)]
    pub trashed: bool,
}

/// One page of a file listing
#[derive(Debug, Clone, Deserialize, Default)]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
    #[serde(rename = "nextPageToken", default)]
    pub next_page_token: Option<String>,
}
