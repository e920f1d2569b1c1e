//! Traffic filter rulesets under `/deployments/traffic-filter`.

use std::fmt;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{IdResponse, push_flag, push_opt, require};
use crate::client::{ApiClient, Query};
use crate::error::ApiError;

/// Kind of ruleset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RulesetType {
    /// IP addresses and CIDR ranges.
    Ip,
    /// AWS VPC endpoints.
    Vpce,
    /// Azure private endpoints.
    AzurePrivateEndpoint,
    /// GCP Private Service Connect endpoints.
    GcpPrivateServiceConnectEndpoint,
}

impl RulesetType {
    /// API name of the type.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ip => "ip",
            Self::Vpce => "vpce",
            Self::AzurePrivateEndpoint => "azure_private_endpoint",
            Self::GcpPrivateServiceConnectEndpoint => "gcp_private_service_connect_endpoint",
        }
    }
}

impl fmt::Display for RulesetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrafficFilterRule {
    /// Rule identifier (absent in requests for new rules).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Allowed source: an IP, CIDR range, or endpoint ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Provider-specific fields, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Link between a ruleset and an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterAssociation {
    /// Entity type, currently always `deployment`.
    pub entity_type: String,
    /// Entity identifier.
    pub id: String,
}

/// A ruleset as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficFilterRulesetInfo {
    /// Ruleset identifier.
    pub id: String,
    /// Name.
    pub name: String,
    /// Kind of ruleset.
    #[serde(rename = "type")]
    pub ruleset_type: String,
    /// Region the ruleset applies to.
    pub region: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether new deployments get the ruleset automatically.
    #[serde(default)]
    pub include_by_default: bool,
    /// Rules.
    #[serde(default)]
    pub rules: Vec<TrafficFilterRule>,
    /// Associated entities (only with `include_associations`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associations: Option<Vec<FilterAssociation>>,
    /// Number of associated entities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_associations: Option<u32>,
}

/// A list of rulesets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrafficFilterRulesets {
    /// Rulesets.
    #[serde(default)]
    pub rulesets: Vec<TrafficFilterRulesetInfo>,
}

/// Ruleset definition for create and update requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficFilterRulesetRequest {
    /// Name.
    pub name: String,
    /// Kind of ruleset.
    #[serde(rename = "type")]
    pub ruleset_type: RulesetType,
    /// Region.
    pub region: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether new deployments get the ruleset automatically.
    #[serde(default)]
    pub include_by_default: bool,
    /// Rules.
    #[serde(default)]
    pub rules: Vec<TrafficFilterRule>,
}

impl TrafficFilterRulesetRequest {
    /// Check required fields.
    pub fn validate(&self) -> Result<(), ApiError> {
        require("ruleset name", &self.name)?;
        require("region", &self.region)?;
        if self.rules.is_empty() {
            return Err(ApiError::Validation("ruleset needs at least one rule".into()));
        }
        Ok(())
    }
}

/// Create a ruleset.
pub async fn create(
    client: &ApiClient,
    request: &TrafficFilterRulesetRequest,
) -> Result<IdResponse, ApiError> {
    request.validate()?;
    client
        .send_json(
            Method::POST,
            &["deployments", "traffic-filter", "rulesets"],
            &Query::new(),
            request,
        )
        .await
}

/// Parameters for [`list`].
#[derive(Debug, Clone, Default)]
pub struct ListParams<'a> {
    /// Only rulesets of this region.
    pub region: Option<&'a str>,
    /// Include associations.
    pub include_associations: bool,
}

/// List rulesets.
pub async fn list(client: &ApiClient, params: &ListParams<'_>) -> Result<TrafficFilterRulesets, ApiError> {
    let mut query = Query::new();
    push_opt(&mut query, "region", params.region);
    push_flag(&mut query, "include_associations", params.include_associations);
    client
        .get(&["deployments", "traffic-filter", "rulesets"], &query)
        .await
}

/// Fetch one ruleset.
pub async fn show(
    client: &ApiClient,
    ruleset_id: &str,
    include_associations: bool,
) -> Result<TrafficFilterRulesetInfo, ApiError> {
    require("ruleset id", ruleset_id)?;
    let mut query = Query::new();
    push_flag(&mut query, "include_associations", include_associations);
    client
        .get(&["deployments", "traffic-filter", "rulesets", ruleset_id], &query)
        .await
}

/// Replace a ruleset.
pub async fn update(
    client: &ApiClient,
    ruleset_id: &str,
    request: &TrafficFilterRulesetRequest,
) -> Result<IdResponse, ApiError> {
    require("ruleset id", ruleset_id)?;
    request.validate()?;
    client
        .send_json(
            Method::PUT,
            &["deployments", "traffic-filter", "rulesets", ruleset_id],
            &Query::new(),
            request,
        )
        .await
}

/// Delete a ruleset. With `ignore_associations` it is removed from
/// associated deployments first.
pub async fn delete(client: &ApiClient, ruleset_id: &str, ignore_associations: bool) -> Result<(), ApiError> {
    require("ruleset id", ruleset_id)?;
    let mut query = Query::new();
    push_flag(&mut query, "ignore_associations", ignore_associations);
    client
        .delete(&["deployments", "traffic-filter", "rulesets", ruleset_id], &query)
        .await
}

/// Parameters for association operations.
#[derive(Debug, Clone, Copy)]
pub struct AssociationParams<'a> {
    /// Ruleset identifier.
    pub ruleset_id: &'a str,
    /// Entity type, e.g. `deployment`.
    pub entity_type: &'a str,
    /// Entity identifier.
    pub entity_id: &'a str,
}

impl AssociationParams<'_> {
    fn validate(&self) -> Result<(), ApiError> {
        require("ruleset id", self.ruleset_id)?;
        require("entity type", self.entity_type)?;
        require("entity id", self.entity_id)
    }
}

/// Associate a ruleset with an entity.
pub async fn create_association(client: &ApiClient, params: AssociationParams<'_>) -> Result<(), ApiError> {
    params.validate()?;
    client
        .send_json_empty(
            Method::POST,
            &[
                "deployments",
                "traffic-filter",
                "rulesets",
                params.ruleset_id,
                "associations",
            ],
            &Query::new(),
            &FilterAssociation {
                entity_type: params.entity_type.to_string(),
                id: params.entity_id.to_string(),
            },
        )
        .await
}

/// Remove an association.
pub async fn delete_association(client: &ApiClient, params: AssociationParams<'_>) -> Result<(), ApiError> {
    params.validate()?;
    client
        .delete(
            &[
                "deployments",
                "traffic-filter",
                "rulesets",
                params.ruleset_id,
                "associations",
                params.entity_type,
                params.entity_id,
            ],
            &Query::new(),
        )
        .await
}

/// Rulesets associated with an entity.
pub async fn list_associated(
    client: &ApiClient,
    entity_type: &str,
    entity_id: &str,
) -> Result<TrafficFilterRulesets, ApiError> {
    require("entity type", entity_type)?;
    require("entity id", entity_id)?;
    client
        .get(
            &[
                "deployments",
                "traffic-filter",
                "associations",
                entity_type,
                entity_id,
                "rulesets",
            ],
            &Query::new(),
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockApi, MockResponse};
    use serde_json::json;

    fn ruleset_json() -> Value {
        json!({
            "id": "rs-1",
            "name": "office",
            "type": "ip",
            "region": "ece-region",
            "include_by_default": false,
            "rules": [{"id": "r1", "source": "10.0.0.0/8"}],
            "total_associations": 2
        })
    }

    fn request() -> TrafficFilterRulesetRequest {
        TrafficFilterRulesetRequest {
            name: "office".into(),
            ruleset_type: RulesetType::Ip,
            region: "ece-region".into(),
            description: None,
            include_by_default: true,
            rules: vec![TrafficFilterRule {
                source: Some("10.0.0.0/8".into()),
                ..Default::default()
            }],
        }
    }

    #[test]
    fn request_requires_rules() {
        let mut req = request();
        req.rules.clear();
        assert_eq!(
            req.validate().expect_err("should fail").to_string(),
            "invalid request: ruleset needs at least one rule"
        );
    }

    #[test]
    fn request_decodes_provider_rule_fields() {
        let req: TrafficFilterRulesetRequest = serde_json::from_value(json!({
            "name": "azure",
            "type": "azure_private_endpoint",
            "region": "azure-eastus2",
            "rules": [{"azure_endpoint_name": "ep", "azure_endpoint_guid": "guid"}]
        }))
        .expect("decode");

        assert_eq!(req.ruleset_type, RulesetType::AzurePrivateEndpoint);
        assert_eq!(req.rules[0].extra["azure_endpoint_name"], json!("ep"));
        assert!(!req.include_by_default);
    }

    #[tokio::test]
    async fn create_posts_request() {
        let mock = MockApi::start([MockResponse::json(201, json!({"id": "rs-1"}))])
            .await
            .expect("mock");

        let created = create(&mock.client(), &request()).await.expect("create");

        assert_eq!(created.id, "rs-1");
        let request = mock.single_request();
        assert_eq!(request.path, "/api/v1/deployments/traffic-filter/rulesets");
        assert_eq!(
            request.json().expect("json"),
            json!({
                "name": "office",
                "type": "ip",
                "region": "ece-region",
                "include_by_default": true,
                "rules": [{"source": "10.0.0.0/8"}]
            })
        );
    }

    #[tokio::test]
    async fn list_with_region_and_associations() {
        let mock = MockApi::start([MockResponse::ok(json!({"rulesets": [ruleset_json()]}))])
            .await
            .expect("mock");

        let rulesets = list(
            &mock.client(),
            &ListParams {
                region: Some("ece-region"),
                include_associations: true,
            },
        )
        .await
        .expect("list");

        assert_eq!(rulesets.rulesets[0].ruleset_type, "ip");
        assert_eq!(rulesets.rulesets[0].total_associations, Some(2));
        let request = mock.single_request();
        assert_eq!(request.query_param("region").as_deref(), Some("ece-region"));
        assert_eq!(request.query_param("include_associations").as_deref(), Some("true"));
    }

    #[tokio::test]
    async fn show_update_delete_paths() {
        let mock = MockApi::start([
            MockResponse::ok(ruleset_json()),
            MockResponse::ok(json!({"id": "rs-1"})),
            MockResponse::empty(),
        ])
        .await
        .expect("mock");
        let client = mock.client();

        show(&client, "rs-1", false).await.expect("show");
        update(&client, "rs-1", &request()).await.expect("update");
        delete(&client, "rs-1", true).await.expect("delete");

        let requests = mock.requests();
        let summary: Vec<_> = requests
            .iter()
            .map(|r| (r.method.as_str(), r.path.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("GET", "/api/v1/deployments/traffic-filter/rulesets/rs-1"),
                ("PUT", "/api/v1/deployments/traffic-filter/rulesets/rs-1"),
                ("DELETE", "/api/v1/deployments/traffic-filter/rulesets/rs-1"),
            ]
        );
        assert_eq!(
            requests[2].query_param("ignore_associations").as_deref(),
            Some("true")
        );
    }

    #[tokio::test]
    async fn associations() {
        let mock = MockApi::start([
            MockResponse::json(201, json!({})),
            MockResponse::ok(json!({"rulesets": [ruleset_json()]})),
            MockResponse::empty(),
        ])
        .await
        .expect("mock");
        let client = mock.client();
        let params = AssociationParams {
            ruleset_id: "rs-1",
            entity_type: "deployment",
            entity_id: "d1",
        };

        create_association(&client, params).await.expect("create");
        let associated = list_associated(&client, "deployment", "d1").await.expect("list");
        delete_association(&client, params).await.expect("delete");

        assert_eq!(associated.rulesets.len(), 1);
        let requests = mock.requests();
        assert_eq!(
            requests[0].path,
            "/api/v1/deployments/traffic-filter/rulesets/rs-1/associations"
        );
        assert_eq!(
            requests[0].json().expect("json"),
            json!({"entity_type": "deployment", "id": "d1"})
        );
        assert_eq!(
            requests[1].path,
            "/api/v1/deployments/traffic-filter/associations/deployment/d1/rulesets"
        );
        assert_eq!(
            requests[2].path,
            "/api/v1/deployments/traffic-filter/rulesets/rs-1/associations/deployment/d1"
        );
    }
}
