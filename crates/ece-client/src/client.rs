//! HTTP client for the ECE REST API.
//!
//! [`ApiClient`] owns a `reqwest` client configured with the API host,
//! credentials, TLS verification and timeout. Resource modules under
//! [`crate::api`] build on its crate-private request helpers.

use std::fmt;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::ApiError;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Path segments every endpoint lives under.
const API_PREFIX: [&str; 2] = ["api", "v1"];

/// Query parameters for a request.
pub(crate) type Query = Vec<(&'static str, String)>;

/// Credentials sent with every request.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Auth {
    /// No credentials.
    #[default]
    None,
    /// `Authorization: ApiKey <key>`.
    ApiKey(String),
    /// HTTP basic authentication.
    Basic {
        /// Username.
        username: String,
        /// Password.
        password: String,
    },
}

impl Auth {
    /// Short name of the authentication method.
    pub const fn method(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ApiKey(_) => "apikey",
            Self::Basic { .. } => "basic",
        }
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::ApiKey(_) => f.write_str("ApiKey(****)"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"****")
                .finish(),
        }
    }
}

/// Connection settings for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the ECE API, e.g. `https://ece.example.com:12443`.
    pub host: String,
    /// Credentials.
    pub auth: Auth,
    /// Skip TLS certificate verification.
    pub insecure: bool,
    /// Per-request timeout.
    pub timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl ApiConfig {
    /// Settings for `host` with no credentials and default timeout.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            auth: Auth::None,
            insecure: false,
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("ece-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set the credentials.
    #[must_use]
    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.auth = auth;
        self
    }

    /// Skip TLS certificate verification.
    #[must_use]
    pub const fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// ECE API client.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    auth: Auth,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.base.as_str())
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Build a client from connection settings.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The host is empty or not an `http`/`https` URL
    /// - The underlying HTTP client cannot be constructed
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let host = config.host.trim();
        if host.is_empty() {
            return Err(ApiError::InvalidUrl("host cannot be empty".into()));
        }

        let base = Url::parse(host).map_err(|e| ApiError::InvalidUrl(format!("{host}: {e}")))?;
        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(format!(
                "{host}: must start with http:// or https://"
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.insecure)
            .user_agent(config.user_agent)
            .build()?;

        debug!(host = %base, auth = config.auth.method(), "Configured ECE API client");

        Ok(Self {
            http,
            base,
            auth: config.auth,
        })
    }

    /// Full URL of an endpoint, percent-encoding each path segment.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(API_PREFIX)
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str], query: &Query) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(segments)?;
        debug!(%method, path = url.path(), "ECE API request");

        let builder = self.http.request(method, url).query(query);
        Ok(match &self.auth {
            Auth::None => builder,
            Auth::ApiKey(key) => builder.header(AUTHORIZATION, format!("ApiKey {key}")),
            Auth::Basic { username, password } => builder.basic_auth(username, Some(password)),
        })
    }

    async fn execute(builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        trace!(status = status.as_u16(), "ECE API response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_response(status.as_u16(), &body))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(ApiError::Decode)
    }

    /// `GET` an endpoint and decode the JSON response.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &Query,
    ) -> Result<T, ApiError> {
        let builder = self.request(Method::GET, segments, query)?;
        Self::decode(Self::execute(builder).await?).await
    }

    /// Send a JSON body and decode the JSON response.
    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        segments: &[&str],
        query: &Query,
        body: &B,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(method, segments, query)?.json(body);
        Self::decode(Self::execute(builder).await?).await
    }

    /// Send a JSON body, ignoring whatever the API answers on success.
    pub(crate) async fn send_json_empty<B>(
        &self,
        method: Method,
        segments: &[&str],
        query: &Query,
        body: &B,
    ) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let builder = self.request(method, segments, query)?.json(body);
        Self::execute(builder).await.map(drop)
    }

    /// `DELETE` an endpoint, ignoring the response body.
    pub(crate) async fn delete(&self, segments: &[&str], query: &Query) -> Result<(), ApiError> {
        let builder = self.request(Method::DELETE, segments, query)?;
        Self::execute(builder).await.map(drop)
    }

    /// Upload a file as a single multipart field and decode the JSON response.
    pub(crate) async fn upload<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        field: &'static str,
        file_name: String,
        contents: Vec<u8>,
    ) -> Result<T, ApiError> {
        let form = Form::new().part(field, Part::bytes(contents).file_name(file_name));
        let builder = self.request(method, segments, &Query::new())?.multipart(form);
        Self::decode(Self::execute(builder).await?).await
    }
}
