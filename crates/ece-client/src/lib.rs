//! # ece-client
//!
//! Typed client for the Elastic Cloud Enterprise (ECE) control-plane API.
//!
//! Provides:
//! - [`ApiClient`], a thin wrapper over `reqwest` that knows the `/api/v1`
//!   prefix, authentication, and ECE's error envelope
//! - One module per API resource under [`api`], each exposing parameter
//!   structs and one async function per endpoint
//!
//! # Example
//!
//! ```rust,no_run
//! use ece_client::api::comment::{self, ListParams};
//! use ece_client::{ApiClient, ApiConfig, Auth};
//!
//! # async fn example() -> Result<(), ece_client::ApiError> {
//! let client = ApiClient::new(
//!     ApiConfig::new("https://ece.example.com:12443").with_auth(Auth::ApiKey("secret".into())),
//! )?;
//! let comments = comment::list(
//!     &client,
//!     &ListParams { resource_type: "allocator", resource_id: "192.168.44.10" },
//! )
//! .await?;
//! println!("{} comment(s)", comments.values.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod client;
pub mod error;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use client::{ApiClient, ApiConfig, Auth, DEFAULT_TIMEOUT};
pub use error::{ApiError, BasicFailedReply, ErrorDetail};
