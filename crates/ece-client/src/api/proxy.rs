//! Platform proxy settings at `/platform/infrastructure/proxies/settings`.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::push_opt;
use crate::client::{ApiClient, Query};
use crate::error::ApiError;

const SETTINGS_PATH: [&str; 4] = ["platform", "infrastructure", "proxies", "settings"];

/// HTTP settings of the proxies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProxiesHttpSettings {
    /// Kibana/dashboards base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboards_base_url: Option<String>,
    /// Seconds before a disconnected allocator's routes are dropped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disconnected_cutoff: Option<i64>,
    /// Minimum number of proxy services.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_proxy_services: Option<i64>,
    /// Cookie secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie_secret: Option<String>,
    /// Other fields, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Proxy settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProxiesSettings {
    /// HTTP settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_settings: Option<ProxiesHttpSettings>,
    /// Number of proxies the platform expects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_proxies_count: Option<i64>,
    /// Secret used to sign requests between proxies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_secret: Option<String>,
    /// Validity window of signatures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_valid_for_millis: Option<i64>,
    /// Other fields, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Read the proxy settings.
pub async fn get(client: &ApiClient) -> Result<ProxiesSettings, ApiError> {
    client.get(&SETTINGS_PATH, &Query::new()).await
}

/// How [`update`] applies the new settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    /// Replace the settings (`PUT`).
    #[default]
    Replace,
    /// Merge into the current settings (`PATCH`).
    Merge,
}

/// Parameters for [`update`].
///
/// The document is sent as given. In a merge an explicit `null` clears the
/// field.
#[derive(Debug, Clone)]
pub struct UpdateParams<'a> {
    /// New settings document, a JSON object.
    pub settings: &'a Value,
    /// Expected current version.
    pub version: Option<&'a str>,
    /// Replace or merge.
    pub mode: UpdateMode,
}

/// Write the proxy settings.
pub async fn update(client: &ApiClient, params: &UpdateParams<'_>) -> Result<ProxiesSettings, ApiError> {
    if !params.settings.is_object() {
        return Err(ApiError::Validation(
            "proxy settings must be a JSON object".into(),
        ));
    }
    let method = match params.mode {
        UpdateMode::Replace => Method::PUT,
        UpdateMode::Merge => Method::PATCH,
    };
    let mut query = Query::new();
    push_opt(&mut query, "version", params.version);
    client
        .send_json(method, &SETTINGS_PATH, &query, params.settings)
        .await
}
