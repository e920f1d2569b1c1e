//! Elasticsearch keystore of a deployment.
//!
//! Endpoint: `/deployments/{deployment_id}/elasticsearch/{ref_id}/keystore`.
//! Reads only ever return setting names; values are write-only.

use std::collections::BTreeMap;

use reqwest::Method;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::require;
use crate::client::{ApiClient, Query};
use crate::error::ApiError;

/// A keystore setting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystoreSecret {
    /// Secret value. `Some(Value::Null)` removes the setting.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,
    /// Whether the value is stored as a file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_file: Option<bool>,
}

/// Keep an explicit `null` as `Some(Value::Null)` instead of `None`.
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Keystore contents keyed by setting name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystoreContents {
    /// Settings.
    #[serde(default)]
    pub secrets: BTreeMap<String, KeystoreSecret>,
}

/// Which keystore to address.
#[derive(Debug, Clone, Copy)]
pub struct KeystoreRef<'a> {
    /// Deployment identifier.
    pub deployment_id: &'a str,
    /// Elasticsearch ref ID within the deployment.
    pub ref_id: &'a str,
}

impl KeystoreRef<'_> {
    fn validate(&self) -> Result<(), ApiError> {
        require("deployment id", self.deployment_id)?;
        require("ref id", self.ref_id)
    }

    fn segments(&self) -> [&str; 5] {
        [
            "deployments",
            self.deployment_id,
            "elasticsearch",
            self.ref_id,
            "keystore",
        ]
    }
}

/// Read the keystore setting names.
pub async fn get(client: &ApiClient, keystore: KeystoreRef<'_>) -> Result<KeystoreContents, ApiError> {
    keystore.validate()?;
    client.get(&keystore.segments(), &Query::new()).await
}

/// Parameters for [`set`].
#[derive(Debug, Clone)]
pub struct SetParams<'a> {
    /// Keystore to change.
    pub keystore: KeystoreRef<'a>,
    /// Settings to add, replace, or (with a `null` value) remove.
    pub contents: &'a KeystoreContents,
}

impl SetParams<'_> {
    /// Check required fields.
    pub fn validate(&self) -> Result<(), ApiError> {
        self.keystore.validate()?;
        if self.contents.secrets.is_empty() {
            return Err(ApiError::Validation("keystore contents have no secrets".into()));
        }
        if let Some(name) = self.contents.secrets.keys().find(|k| k.trim().is_empty()) {
            return Err(ApiError::Validation(format!(
                "keystore setting name cannot be empty: {name:?}"
            )));
        }
        Ok(())
    }
}

/// Merge settings into the keystore. Settings not mentioned are left alone.
pub async fn set(client: &ApiClient, params: &SetParams<'_>) -> Result<KeystoreContents, ApiError> {
    params.validate()?;
    client
        .send_json(
            Method::PATCH,
            &params.keystore.segments(),
            &Query::new(),
            params.contents,
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockApi, MockResponse};
    use serde_json::json;

    const KEYSTORE: KeystoreRef<'static> = KeystoreRef {
        deployment_id: "d1",
        ref_id: "main-elasticsearch",
    };

    #[test]
    fn explicit_null_value_survives_round_trip() {
        let contents: KeystoreContents = serde_json::from_value(json!({
            "secrets": {
                "s3.client.default.access_key": {"value": null},
                "gcs.client.default.credentials_file": {"value": {"type": "service_account"}, "as_file": true},
                "untouched": {"as_file": false}
            }
        }))
        .expect("decode");

        assert_eq!(
            contents.secrets["s3.client.default.access_key"].value,
            Some(Value::Null)
        );
        assert_eq!(contents.secrets["untouched"].value, None);

        let encoded = serde_json::to_value(&contents).expect("encode");
        assert_eq!(encoded["secrets"]["s3.client.default.access_key"], json!({"value": null}));
        assert_eq!(encoded["secrets"]["untouched"], json!({"as_file": false}));
    }

    #[tokio::test]
    async fn get_reads_keystore_path() {
        let mock = MockApi::start([MockResponse::ok(json!({
            "secrets": {"s3.client.default.access_key": {"as_file": false}}
        }))])
        .await
        .expect("mock");

        let contents = get(&mock.client(), KEYSTORE).await.expect("get");

        assert!(contents.secrets.contains_key("s3.client.default.access_key"));
        let request = mock.single_request();
        assert_eq!(request.method, "GET");
        assert_eq!(
            request.path,
            "/api/v1/deployments/d1/elasticsearch/main-elasticsearch/keystore"
        );
    }

    #[tokio::test]
    async fn set_patches_contents() {
        let mock = MockApi::start([MockResponse::ok(json!({"secrets": {"a": {"as_file": false}}}))])
            .await
            .expect("mock");

        let mut contents = KeystoreContents::default();
        contents.secrets.insert(
            "a".into(),
            KeystoreSecret {
                value: Some(json!("secret")),
                as_file: Some(false),
            },
        );

        set(
            &mock.client(),
            &SetParams {
                keystore: KEYSTORE,
                contents: &contents,
            },
        )
        .await
        .expect("set");

        let request = mock.single_request();
        assert_eq!(request.method, "PATCH");
        assert_eq!(
            request.json().expect("json"),
            json!({"secrets": {"a": {"value": "secret", "as_file": false}}})
        );
    }

    #[tokio::test]
    async fn set_rejects_empty_contents() {
        let mock = MockApi::idle().await.expect("mock");
        let contents = KeystoreContents::default();

        let err = set(
            &mock.client(),
            &SetParams {
                keystore: KEYSTORE,
                contents: &contents,
            },
        )
        .await
        .expect_err("should fail");

        assert!(matches!(err, ApiError::Validation(_)));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn get_requires_deployment_id() {
        let mock = MockApi::idle().await.expect("mock");
        let err = get(
            &mock.client(),
            KeystoreRef {
                deployment_id: "",
                ref_id: "main-elasticsearch",
            },
        )
        .await
        .expect_err("should fail");

        assert_eq!(err.to_string(), "invalid request: deployment id cannot be empty");
    }
}
