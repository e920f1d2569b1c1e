//! Deployment templates under `/deployments/templates`.
//!
//! Template documents are large and mostly opaque to the CLI; the fields it
//! renders are typed and the rest is carried in [`DeploymentTemplateInfo::extra`]
//! so a document read from a file is sent back unchanged.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{IdResponse, push_flag, push_opt, require};
use crate::client::{ApiClient, Query};
use crate::error::ApiError;

/// A `key`/`value` metadata entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataItem {
    /// Key.
    pub key: String,
    /// Value.
    pub value: String,
}

/// A deployment template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentTemplateInfo {
    /// Template identifier (absent in create bodies).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Name.
    #[serde(default)]
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the template ships with the platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_owned: Option<bool>,
    /// Metadata entries, used for filtering.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<MetadataItem>,
    /// Template category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_category_id: Option<String>,
    /// Minimum stack version the template supports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_version: Option<String>,
    /// All other fields, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeploymentTemplateInfo {
    /// Check the fields a create or update body needs.
    pub fn validate(&self) -> Result<(), ApiError> {
        require("template name", &self.name)?;
        if !self.extra.contains_key("deployment_template") {
            return Err(ApiError::Validation(
                "template definition is missing deployment_template".into(),
            ));
        }
        Ok(())
    }
}

/// A metadata filter `key:value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataFilter<'a> {
    /// Key.
    pub key: &'a str,
    /// Value.
    pub value: &'a str,
}

impl<'a> MetadataFilter<'a> {
    /// Parse `key:value`. Both sides must be non-empty.
    pub fn parse(filter: &'a str) -> Result<Self, ApiError> {
        match filter.split_once(':') {
            Some((key, value)) if !key.trim().is_empty() && !value.trim().is_empty() => {
                Ok(Self { key, value })
            }
            _ => Err(ApiError::Validation(format!(
                "invalid metadata filter {filter:?}: expected key:value"
            ))),
        }
    }
}

/// Parameters for [`create`].
#[derive(Debug, Clone)]
pub struct CreateParams<'a> {
    /// Template definition.
    pub template: &'a DeploymentTemplateInfo,
    /// Use this identifier instead of a generated one.
    pub template_id: Option<&'a str>,
    /// Region the template belongs to.
    pub region: Option<&'a str>,
    /// Only validate the definition.
    pub validate_only: bool,
}

/// Create a template.
pub async fn create(client: &ApiClient, params: &CreateParams<'_>) -> Result<IdResponse, ApiError> {
    params.template.validate()?;
    let mut query = Query::new();
    push_opt(&mut query, "region", params.region);
    push_flag(&mut query, "validate_only", params.validate_only);

    match params.template_id {
        Some(id) => {
            require("template id", id)?;
            query.push(("create_only", "true".to_string()));
            client
                .send_json(
                    Method::PUT,
                    &["deployments", "templates", id],
                    &query,
                    params.template,
                )
                .await
        }
        None => {
            client
                .send_json(
                    Method::POST,
                    &["deployments", "templates"],
                    &query,
                    params.template,
                )
                .await
        }
    }
}

/// Parameters for [`list`].
#[derive(Debug, Clone, Default)]
pub struct ListParams<'a> {
    /// Region to list templates of.
    pub region: Option<&'a str>,
    /// Only templates whose metadata matches.
    pub metadata: Option<MetadataFilter<'a>>,
    /// Only templates supporting this stack version.
    pub stack_version: Option<&'a str>,
    /// Include the instance configurations referenced by each template.
    pub show_instance_configurations: bool,
    /// Omit deprecated templates.
    pub hide_deprecated: bool,
}

/// List templates.
pub async fn list(
    client: &ApiClient,
    params: &ListParams<'_>,
) -> Result<Vec<DeploymentTemplateInfo>, ApiError> {
    let mut query = Query::new();
    push_opt(&mut query, "region", params.region);
    if let Some(filter) = params.metadata {
        query.push(("metadata", format!("{}:{}", filter.key, filter.value)));
    }
    push_opt(&mut query, "stack_version", params.stack_version);
    push_flag(
        &mut query,
        "show_instance_configurations",
        params.show_instance_configurations,
    );
    push_flag(&mut query, "hide_deprecated", params.hide_deprecated);
    client.get(&["deployments", "templates"], &query).await
}

/// Parameters for [`show`].
#[derive(Debug, Clone)]
pub struct ShowParams<'a> {
    /// Template identifier.
    pub template_id: &'a str,
    /// Region.
    pub region: Option<&'a str>,
    /// Include instance configurations.
    pub show_instance_configurations: bool,
}

/// Fetch one template.
pub async fn show(client: &ApiClient, params: &ShowParams<'_>) -> Result<DeploymentTemplateInfo, ApiError> {
    require("template id", params.template_id)?;
    let mut query = Query::new();
    push_opt(&mut query, "region", params.region);
    push_flag(
        &mut query,
        "show_instance_configurations",
        params.show_instance_configurations,
    );
    client
        .get(&["deployments", "templates", params.template_id], &query)
        .await
}

/// Parameters for [`update`].
#[derive(Debug, Clone)]
pub struct UpdateParams<'a> {
    /// Template identifier.
    pub template_id: &'a str,
    /// New definition.
    pub template: &'a DeploymentTemplateInfo,
    /// Region.
    pub region: Option<&'a str>,
    /// Only validate the definition.
    pub validate_only: bool,
}

/// Replace a template.
pub async fn update(client: &ApiClient, params: &UpdateParams<'_>) -> Result<IdResponse, ApiError> {
    require("template id", params.template_id)?;
    params.template.validate()?;
    let mut query = Query::new();
    push_opt(&mut query, "region", params.region);
    query.push(("create_only", "false".to_string()));
    push_flag(&mut query, "validate_only", params.validate_only);
    client
        .send_json(
            Method::PUT,
            &["deployments", "templates", params.template_id],
            &query,
            params.template,
        )
        .await
}

/// Delete a template.
pub async fn delete(client: &ApiClient, template_id: &str, region: Option<&str>) -> Result<(), ApiError> {
    require("template id", template_id)?;
    let mut query = Query::new();
    push_opt(&mut query, "region", region);
    client
        .delete(&["deployments", "templates", template_id], &query)
        .await
}
