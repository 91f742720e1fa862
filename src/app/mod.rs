//! Core application components
//!
//! Contains the authenticated Drive API client and the data models for its
//! resources. Credential acquisition lives in [`crate::auth`].

pub mod client;
pub mod models;

pub use client::{ClientConfig, DriveClient};
pub use models::{DriveFile, FileList};
