//! Per-invocation state shared by every command.

use ece_client::ApiClient;

use crate::config::Settings;
use crate::error::CliError;

/// API handle and the settings commands read at call time.
#[derive(Debug, Clone)]
pub struct Context {
    /// API client.
    pub client: ApiClient,
    /// Region for region-scoped calls.
    pub region: Option<String>,
}

impl Context {
    /// Wrap an existing client.
    #[must_use]
    pub const fn new(client: ApiClient, region: Option<String>) -> Self {
        Self { client, region }
    }

    /// Build the client from resolved settings.
    ///
    /// # Errors
    ///
    /// Returns an error if no host is configured or the client cannot be built.
    pub fn from_settings(settings: &Settings) -> Result<Self, CliError> {
        let client = ApiClient::new(settings.api_config()?)?;
        Ok(Self::new(client, settings.region.clone()))
    }

    /// The configured region.
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// The configured region, or an error naming what needs it.
    ///
    /// # Errors
    ///
    /// Returns an error if no region is configured.
    pub fn require_region(&self, what: &str) -> Result<&str, CliError> {
        self.region().ok_or_else(|| {
            CliError::InvalidArgument(format!("{what} requires a region; set --region or EC_REGION"))
        })
    }
}
