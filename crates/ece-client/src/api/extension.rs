//! Custom extensions (bundles and plugins) under `/deployments/extensions`.

use std::fmt;

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{push_flag, require};
use crate::client::{ApiClient, Query};
use crate::error::ApiError;

/// Kind of extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionType {
    /// A bundle of files (scripts, dictionaries, ...).
    Bundle,
    /// An Elasticsearch plugin.
    Plugin,
}

impl ExtensionType {
    /// API name of the type.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bundle => "bundle",
            Self::Plugin => "plugin",
        }
    }
}

impl fmt::Display for ExtensionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Details of an uploaded extension file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionFileMetadata {
    /// Size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Upload time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_date: Option<DateTime<Utc>>,
    /// Where the file is served from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// An extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension {
    /// Extension identifier.
    pub id: String,
    /// Name.
    pub name: String,
    /// Elasticsearch version the extension targets (may be a wildcard like `7.*`).
    pub version: String,
    /// `bundle` or `plugin`.
    pub extension_type: String,
    /// Location Elasticsearch fetches the extension from.
    #[serde(default)]
    pub url: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Remote location to fetch the extension from, when not uploaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    /// Uploaded file details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_metadata: Option<ExtensionFileMetadata>,
    /// Deployments using the extension (only with `include_deployments`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployments: Option<Vec<String>>,
}

/// All extensions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extensions {
    /// Extensions.
    #[serde(default)]
    pub extensions: Vec<Extension>,
}

/// Extension metadata for create and update requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionRequest<'a> {
    /// Name.
    pub name: &'a str,
    /// Target Elasticsearch version.
    pub version: &'a str,
    /// Kind of extension.
    pub extension_type: ExtensionType,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    /// Remote location to fetch the extension from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<&'a str>,
}

impl ExtensionRequest<'_> {
    /// Check required fields.
    pub fn validate(&self) -> Result<(), ApiError> {
        require("extension name", self.name)?;
        require("extension version", self.version)
    }
}

/// Register a new extension.
pub async fn create(client: &ApiClient, request: &ExtensionRequest<'_>) -> Result<Extension, ApiError> {
    request.validate()?;
    client
        .send_json(
            Method::POST,
            &["deployments", "extensions"],
            &Query::new(),
            request,
        )
        .await
}

/// List all extensions.
pub async fn list(client: &ApiClient) -> Result<Extensions, ApiError> {
    client.get(&["deployments", "extensions"], &Query::new()).await
}

/// Parameters for [`show`].
#[derive(Debug, Clone)]
pub struct ShowParams<'a> {
    /// Extension identifier.
    pub extension_id: &'a str,
    /// Include the deployments using the extension.
    pub include_deployments: bool,
}

/// Fetch one extension.
pub async fn show(client: &ApiClient, params: &ShowParams<'_>) -> Result<Extension, ApiError> {
    require("extension id", params.extension_id)?;
    let mut query = Query::new();
    push_flag(&mut query, "include_deployments", params.include_deployments);
    client
        .get(&["deployments", "extensions", params.extension_id], &query)
        .await
}

/// Replace the metadata of an extension.
pub async fn update(
    client: &ApiClient,
    extension_id: &str,
    request: &ExtensionRequest<'_>,
) -> Result<Extension, ApiError> {
    require("extension id", extension_id)?;
    request.validate()?;
    client
        .send_json(
            Method::POST,
            &["deployments", "extensions", extension_id],
            &Query::new(),
            request,
        )
        .await
}

/// Parameters for [`upload`].
#[derive(Debug, Clone)]
pub struct UploadParams<'a> {
    /// Extension identifier.
    pub extension_id: &'a str,
    /// File name reported to the API.
    pub file_name: &'a str,
    /// File contents.
    pub contents: Vec<u8>,
}

/// Upload the extension file (a zip archive).
pub async fn upload(client: &ApiClient, params: UploadParams<'_>) -> Result<Extension, ApiError> {
    require("extension id", params.extension_id)?;
    require("file name", params.file_name)?;
    if params.contents.is_empty() {
        return Err(ApiError::Validation(format!(
            "extension file {} is empty",
            params.file_name
        )));
    }
    client
        .upload(
            Method::PUT,
            &["deployments", "extensions", params.extension_id],
            "file",
            params.file_name.to_string(),
            params.contents,
        )
        .await
}

/// Delete an extension. Fails while deployments still use it.
pub async fn delete(client: &ApiClient, extension_id: &str) -> Result<(), ApiError> {
    require("extension id", extension_id)?;
    client
        .delete(&["deployments", "extensions", extension_id], &Query::new())
        .await
}
