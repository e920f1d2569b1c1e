//! ECE API resources.
//!
//! Each submodule covers one API resource:
//! - [`comment`] - Comments attached to platform resources
//! - [`deployment`] - Deployment lookups used by other resources
//! - [`keystore`] - Elasticsearch keystore secrets of a deployment
//! - [`extension`] - Custom bundles and plugins
//! - [`template`] - Deployment templates
//! - [`traffic_filter`] - Traffic filter rulesets and their associations
//! - [`proxy`] - Platform proxy settings
//!
//! Operations take a parameter struct, validate it, and perform a single
//! request. Validation failures never reach the network.

use serde::{Deserialize, Serialize};

use crate::client::Query;
use crate::error::ApiError;

pub mod comment;
pub mod deployment;
pub mod extension;
pub mod keystore;
pub mod proxy;
pub mod template;
pub mod traffic_filter;

/// Response carrying the identifier of a created resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdResponse {
    /// Identifier assigned by the API.
    pub id: String,
}

/// Reject empty or whitespace-only required parameters.
pub(crate) fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Append `key=value` when the value is present.
pub(crate) fn push_opt(query: &mut Query, key: &'static str, value: Option<&str>) {
    if let Some(value) = value {
        query.push((key, value.to_string()));
    }
}

/// Append `key=true` only when set.
pub(crate) fn push_flag(query: &mut Query, key: &'static str, value: bool) {
    if value {
        query.push((key, "true".to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_rejects_blank_values() {
        assert!(require("deployment id", "abc").is_ok());
        let err = require("deployment id", "   ").expect_err("should fail");
        assert_eq!(err.to_string(), "invalid request: deployment id cannot be empty");
    }

    #[test]
    fn optional_query_values() {
        let mut query = Query::new();
        push_opt(&mut query, "region", None);
        push_opt(&mut query, "version", Some("4"));
        push_flag(&mut query, "validate_only", false);
        push_flag(&mut query, "create_only", true);
        assert_eq!(
            query,
            vec![("version", "4".to_string()), ("create_only", "true".to_string())]
        );
    }
}
