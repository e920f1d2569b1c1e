//! Error types for ECE API calls.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single error reported by the ECE API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code, e.g. `deployments.extension_not_found`.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Request fields the error refers to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

/// The error envelope returned by every failing ECE endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicFailedReply {
    /// Errors carried by the reply.
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

/// Errors that can occur while talking to the ECE API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API answered with a non-success status.
    #[error("api error (HTTP {status}): {}", describe(.errors))]
    Api {
        /// HTTP status code.
        status: u16,
        /// Errors decoded from the response body.
        errors: Vec<ErrorDetail>,
    },

    /// The request could not be sent or the response could not be read.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not match the expected model.
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    /// Request parameters failed validation before anything was sent.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The configured API host is not a usable URL.
    #[error("invalid API host: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Build an error from a failed response's status and body.
    ///
    /// Bodies that are not a [`BasicFailedReply`] are kept verbatim as a
    /// single error with code `unknown`.
    pub fn from_response(status: u16, body: &str) -> Self {
        let errors = match serde_json::from_str::<BasicFailedReply>(body) {
            Ok(reply) if !reply.errors.is_empty() => reply.errors,
            _ => {
                let trimmed = body.trim();
                vec![ErrorDetail {
                    code: "unknown".into(),
                    message: if trimmed.is_empty() {
                        format!("empty response body (HTTP {status})")
                    } else {
                        trimmed.to_string()
                    },
                    fields: Vec::new(),
                }]
            }
        };
        Self::Api { status, errors }
    }

    /// HTTP status of an API error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the API reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

fn describe(errors: &[ErrorDetail]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.code, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}
