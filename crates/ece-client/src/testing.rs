//! In-process mock of the ECE API for tests.
//!
//! [`MockApi`] binds an `axum` server to an ephemeral localhost port, answers
//! every request with the next queued [`MockResponse`], and records what it
//! received so tests can assert on method, path, query and body.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::client::{ApiClient, ApiConfig};
use crate::error::ApiError;

/// A canned response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl MockResponse {
    /// `200 OK` with a JSON body.
    pub fn ok(body: impl Serialize) -> Self {
        Self::json(200, body)
    }

    /// A JSON body with the given status.
    pub fn json(status: u16, body: impl Serialize) -> Self {
        Self {
            status,
            body: serde_json::to_string(&body).unwrap_or_default(),
        }
    }

    /// `200 OK` with an empty JSON object, as ECE answers deletes.
    pub fn empty() -> Self {
        Self::raw(200, "{}")
    }

    /// An ECE error envelope with a single error.
    pub fn error(status: u16, code: &str, message: &str) -> Self {
        Self::json(
            status,
            json!({ "errors": [{ "code": code, "message": message }] }),
        )
    }

    /// An arbitrary body with the given status.
    pub fn raw(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// A request received by [`MockApi`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method, upper case.
    pub method: String,
    /// Request path, percent-encoded as sent.
    pub path: String,
    /// Raw query string.
    pub query: Option<String>,
    /// Headers, keyed by lower-case name.
    pub headers: HashMap<String, String>,
    /// Raw body.
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// Value of a header.
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers.get(&name.to_ascii_lowercase()).cloned()
    }

    /// Decoded query parameters in order.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query
            .as_deref()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// First value of a query parameter.
    pub fn query_param(&self, key: &str) -> Option<String> {
        self.query_pairs()
            .into_iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    /// Body parsed as JSON.
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Body as lossy UTF-8.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Default)]
struct MockState {
    responses: Mutex<VecDeque<MockResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Mock ECE API server.
pub struct MockApi {
    addr: SocketAddr,
    state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl MockApi {
    /// Start a server that answers with `responses` in order.
    ///
    /// Requests beyond the queued responses get `501 Not Implemented`.
    pub async fn start(responses: impl IntoIterator<Item = MockResponse>) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let state = Arc::new(MockState::default());
        state.responses.lock().extend(responses);

        let router = Router::new().fallback(record).with_state(Arc::clone(&state));
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self {
            addr,
            state,
            handle,
        })
    }

    /// Start a server with nothing queued.
    pub async fn idle() -> std::io::Result<Self> {
        Self::start(Vec::<MockResponse>::new()).await
    }

    /// Base URL of the server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A client pointed at this server.
    pub fn try_client(&self) -> Result<ApiClient, ApiError> {
        ApiClient::new(ApiConfig::new(self.url()))
    }

    /// A client pointed at this server.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built, which only happens when the
    /// TLS backend fails to initialise.
    #[allow(clippy::expect_used)]
    pub fn client(&self) -> ApiClient {
        self.try_client().expect("mock API client")
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    /// The only request received.
    ///
    /// # Panics
    ///
    /// Panics unless exactly one request was received.
    #[allow(clippy::panic)]
    pub fn single_request(&self) -> RecordedRequest {
        let requests = self.requests();
        match requests.as_slice() {
            [request] => request.clone(),
            other => panic!("expected exactly one request, got {}", other.len()),
        }
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn record(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    state.requests.lock().push(RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body: body.to_vec(),
    });

    let Some(next) = state.responses.lock().pop_front() else {
        return (StatusCode::NOT_IMPLEMENTED, "no mock response queued").into_response();
    };

    let status = StatusCode::from_u16(next.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], next.body).into_response()
}
