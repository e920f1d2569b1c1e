//! Deployment lookups.
//!
//! Only the parts of a deployment other resources need: resolving the
//! Elasticsearch ref ID when the caller did not give one.

use serde::{Deserialize, Serialize};

use super::require;
use crate::client::{ApiClient, Query};
use crate::error::ApiError;

/// A resource of a deployment, reduced to its identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSummary {
    /// Ref ID, e.g. `main-elasticsearch`.
    pub ref_id: String,
}

/// Resources of a deployment by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentResources {
    /// Elasticsearch resources.
    #[serde(default)]
    pub elasticsearch: Vec<ResourceSummary>,
}

/// A deployment, reduced to what the CLI needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentSummary {
    /// Deployment identifier.
    pub id: String,
    /// Deployment name.
    #[serde(default)]
    pub name: String,
    /// Resources.
    #[serde(default)]
    pub resources: DeploymentResources,
}

/// Fetch a deployment.
pub async fn get(client: &ApiClient, deployment_id: &str) -> Result<DeploymentSummary, ApiError> {
    require("deployment id", deployment_id)?;
    client
        .get(
            &["deployments", deployment_id],
            &vec![("show_metadata", "false".to_string())],
        )
        .await
}

/// Ref ID of the first Elasticsearch resource of a deployment.
pub async fn elasticsearch_ref_id(client: &ApiClient, deployment_id: &str) -> Result<String, ApiError> {
    let deployment = get(client, deployment_id).await?;
    deployment
        .resources
        .elasticsearch
        .into_iter()
        .next()
        .map(|r| r.ref_id)
        .ok_or_else(|| {
            ApiError::Validation(format!(
                "deployment {deployment_id} has no Elasticsearch resource"
            ))
        })
}

/// Use `ref_id` when given, otherwise look it up.
pub async fn resolve_elasticsearch_ref_id(
    client: &ApiClient,
    deployment_id: &str,
    ref_id: Option<&str>,
) -> Result<String, ApiError> {
    match ref_id {
        Some(ref_id) if !ref_id.trim().is_empty() => Ok(ref_id.to_string()),
        _ => elasticsearch_ref_id(client, deployment_id).await,
    }
}
