//! Comments attached to platform resources (allocators, runners, ...).
//!
//! Endpoints live under `/comments/{resource_type}/{resource_id}`.

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{push_opt, require};
use crate::client::{ApiClient, Query};
use crate::error::ApiError;

/// A comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment identifier.
    pub id: String,
    /// Comment text.
    pub message: String,
    /// User who wrote the comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Resource metadata returned alongside a comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// When the comment was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,
    /// When the comment was last modified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<DateTime<Utc>>,
    /// Version to pass back on update or delete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A comment with its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentWithMeta {
    /// The comment.
    pub comment: Comment,
    /// Its metadata.
    #[serde(default)]
    pub metadata: Metadata,
}

/// All comments of a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentsWithMetas {
    /// Comments in creation order.
    #[serde(default)]
    pub values: Vec<CommentWithMeta>,
}

#[derive(Serialize)]
struct CommentBody<'a> {
    message: &'a str,
}

/// The resource a comment belongs to.
#[derive(Debug, Clone, Copy)]
pub struct ResourceRef<'a> {
    /// Resource type, e.g. `allocator`.
    pub resource_type: &'a str,
    /// Resource identifier.
    pub resource_id: &'a str,
}

impl ResourceRef<'_> {
    fn validate(&self) -> Result<(), ApiError> {
        require("resource type", self.resource_type)?;
        require("resource id", self.resource_id)
    }
}

/// Parameters for [`create`].
#[derive(Debug, Clone)]
pub struct CreateParams<'a> {
    /// Resource to comment on.
    pub resource: ResourceRef<'a>,
    /// Comment text.
    pub message: &'a str,
}

impl CreateParams<'_> {
    /// Check required fields.
    pub fn validate(&self) -> Result<(), ApiError> {
        self.resource.validate()?;
        require("message", self.message)
    }
}

/// Create a comment on a resource.
pub async fn create(client: &ApiClient, params: &CreateParams<'_>) -> Result<Comment, ApiError> {
    params.validate()?;
    let r = params.resource;
    client
        .send_json(
            Method::POST,
            &["comments", r.resource_type, r.resource_id],
            &Query::new(),
            &CommentBody {
                message: params.message,
            },
        )
        .await
}

/// Parameters for [`list`].
#[derive(Debug, Clone)]
pub struct ListParams<'a> {
    /// Resource type.
    pub resource_type: &'a str,
    /// Resource identifier.
    pub resource_id: &'a str,
}

/// List the comments of a resource.
pub async fn list(client: &ApiClient, params: &ListParams<'_>) -> Result<CommentsWithMetas, ApiError> {
    require("resource type", params.resource_type)?;
    require("resource id", params.resource_id)?;
    client
        .get(
            &["comments", params.resource_type, params.resource_id],
            &Query::new(),
        )
        .await
}

/// Parameters for [`show`].
#[derive(Debug, Clone)]
pub struct ShowParams<'a> {
    /// Resource the comment belongs to.
    pub resource: ResourceRef<'a>,
    /// Comment identifier.
    pub comment_id: &'a str,
}

/// Fetch a single comment.
pub async fn show(client: &ApiClient, params: &ShowParams<'_>) -> Result<CommentWithMeta, ApiError> {
    params.resource.validate()?;
    require("comment id", params.comment_id)?;
    let r = params.resource;
    client
        .get(
            &["comments", r.resource_type, r.resource_id, params.comment_id],
            &Query::new(),
        )
        .await
}

/// Parameters for [`update`].
#[derive(Debug, Clone)]
pub struct UpdateParams<'a> {
    /// Resource the comment belongs to.
    pub resource: ResourceRef<'a>,
    /// Comment identifier.
    pub comment_id: &'a str,
    /// New text.
    pub message: &'a str,
    /// Expected current version; the update fails on mismatch.
    pub version: Option<&'a str>,
}

impl UpdateParams<'_> {
    /// Check required fields.
    pub fn validate(&self) -> Result<(), ApiError> {
        self.resource.validate()?;
        require("comment id", self.comment_id)?;
        require("message", self.message)
    }
}

/// Replace the text of a comment.
pub async fn update(client: &ApiClient, params: &UpdateParams<'_>) -> Result<Comment, ApiError> {
    params.validate()?;
    let r = params.resource;
    let mut query = Query::new();
    push_opt(&mut query, "version", params.version);
    client
        .send_json(
            Method::PUT,
            &["comments", r.resource_type, r.resource_id, params.comment_id],
            &query,
            &CommentBody {
                message: params.message,
            },
        )
        .await
}

/// Parameters for [`delete`].
#[derive(Debug, Clone)]
pub struct DeleteParams<'a> {
    /// Resource the comment belongs to.
    pub resource: ResourceRef<'a>,
    /// Comment identifier.
    pub comment_id: &'a str,
    /// Expected current version.
    pub version: Option<&'a str>,
}

/// Delete a comment.
pub async fn delete(client: &ApiClient, params: &DeleteParams<'_>) -> Result<(), ApiError> {
    params.resource.validate()?;
    require("comment id", params.comment_id)?;
    let r = params.resource;
    let mut query = Query::new();
    push_opt(&mut query, "version", params.version);
    client
        .delete(
            &["comments", r.resource_type, r.resource_id, params.comment_id],
            &query,
        )
        .await
}
