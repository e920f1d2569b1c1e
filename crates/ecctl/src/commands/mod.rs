//! CLI command implementations.
//!
//! Each submodule implements one command group:
//! - [`comment`] - Comments on platform resources
//! - [`keystore`] - Elasticsearch keystore of a deployment
//! - [`extension`] - Custom bundles and plugins
//! - [`template`] - Deployment templates
//! - [`traffic_filter`] - Traffic filter rulesets and associations
//! - [`proxy`] - Platform proxy settings
//! - [`config`] - Effective configuration

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::CliError;

pub mod comment;
pub mod config;
pub mod extension;
pub mod keystore;
pub mod proxy;
pub mod template;
pub mod traffic_filter;

pub use comment::CommentCommand;
pub use config::ConfigCommand;
pub use extension::ExtensionCommand;
pub use keystore::KeystoreCommand;
pub use proxy::ProxyCommand;
pub use template::TemplateCommand;
pub use traffic_filter::TrafficFilterCommand;

/// Read a whole file.
pub(crate) async fn read_file(path: &Path) -> Result<Vec<u8>, CliError> {
    tokio::fs::read(path).await.map_err(|source| CliError::File {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and decode a JSON document.
pub(crate) async fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let content = read_file(path).await?;
    serde_json::from_slice(&content).map_err(|e| CliError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
