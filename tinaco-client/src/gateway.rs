use std::time::Duration;

use reqwest::{Client as HttpClient, Method, StatusCode, multipart};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::credentials::CredentialStore;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Result of a dispatched request, as the UI layer consumes it.
pub type Outcome<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// An authenticated request was attempted with no stored credential.
    /// Raised before any network traffic.
    #[error("not signed in")]
    AuthMissing,

    /// The server rejected the request (4xx). Not retryable as sent.
    #[error("request rejected (status {status}): {message}")]
    Client { status: u16, message: String },

    /// The server failed (5xx), or the request never completed. A `None`
    /// status marks a transport failure: timeout, refused connection, DNS.
    #[error("server failure: {message}")]
    Server { status: Option<u16>, message: String },

    /// A success response whose body did not decode into the expected shape.
    #[error("unexpected response body: {0}")]
    Malformed(String),
}

impl ApiError {
    /// True when the request never reached a response, as opposed to the
    /// server answering with a failure status.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Server { status: None, .. })
    }
}

/// One outbound request, described before dispatch.
///
/// Requests require authentication unless marked [`RequestSpec::public`].
#[derive(Debug, Clone)]
pub struct RequestSpec {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    payload: Option<Payload>,
    requires_auth: bool,
}

#[derive(Debug, Clone)]
enum Payload {
    Json(serde_json::Value),
    Photo {
        bytes: Vec<u8>,
        filename: String,
        content_type: String,
    },
}

impl RequestSpec {
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            payload: None,
            requires_auth: true,
        }
    }

    /// Dispatch without a credential. For login and registration only.
    pub fn public(mut self) -> Self {
        self.requires_auth = false;
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn json(mut self, body: impl Into<serde_json::Value>) -> Self {
        self.payload = Some(Payload::Json(body.into()));
        self
    }

    /// Attach an image as a multipart body under the part name `file`.
    pub fn photo(
        mut self,
        bytes: Vec<u8>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        self.payload = Some(Payload::Photo {
            bytes,
            filename: filename.into(),
            content_type: content_type.into(),
        });
        self
    }
}

/// The one place outbound requests go through.
///
/// Resolves the credential from the injected store, attaches it as an
/// `Authorization: Bearer` header, executes with a bounded timeout and
/// classifies the result into an [`Outcome`]. Holds no per-request state;
/// clones share the HTTP connection pool and the store.
#[derive(Clone)]
pub struct Gateway<S> {
    http: HttpClient,
    base_url: String,
    credentials: S,
    timeout: Duration,
}

impl<S: CredentialStore> Gateway<S> {
    pub fn new(base_url: impl Into<String>, credentials: S) -> Self {
        Self::with_http_client(HttpClient::new(), base_url, credentials)
    }

    /// Build a gateway over a custom reqwest client, for TLS or proxy
    /// configuration.
    pub fn with_http_client(
        http: HttpClient,
        base_url: impl Into<String>,
        credentials: S,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn credentials(&self) -> &S {
        &self.credentials
    }

    /// Dispatch a request and decode the success body.
    pub async fn call<T: DeserializeOwned>(&self, spec: RequestSpec) -> Outcome<T> {
        let response = self.dispatch(spec).await?;
        let body = response.bytes().await.map_err(map_transport_error)?;

        serde_json::from_slice(&body).map_err(|error| {
            tracing::warn!(error = %error, "success response did not match the expected shape");
            ApiError::Malformed(error.to_string())
        })
    }

    /// Dispatch a request whose success body is irrelevant, such as a delete.
    /// An empty 2xx body is fine here.
    pub async fn call_unit(&self, spec: RequestSpec) -> Outcome<()> {
        self.dispatch(spec).await?;
        Ok(())
    }

    async fn dispatch(&self, spec: RequestSpec) -> Outcome<reqwest::Response> {
        let credential = if spec.requires_auth {
            match self.credentials.load().await {
                Ok(Some(credential)) => Some(credential),
                Ok(None) => return Err(ApiError::AuthMissing),
                Err(error) => {
                    tracing::warn!(
                        error = %error,
                        "credential store unavailable, treating request as signed out"
                    );
                    return Err(ApiError::AuthMissing);
                }
            }
        } else {
            None
        };

        tracing::debug!(method = %spec.method, path = %spec.path, "dispatching request");

        let url = format!("{}{}", self.base_url, spec.path);
        let mut request = self.http.request(spec.method, url).timeout(self.timeout);

        if !spec.query.is_empty() {
            request = request.query(&spec.query);
        }

        if let Some(credential) = &credential {
            request = request.bearer_auth(credential.as_str());
        }

        request = match spec.payload {
            Some(Payload::Json(body)) => request.json(&body),
            Some(Payload::Photo {
                bytes,
                filename,
                content_type,
            }) => {
                let part = multipart::Part::bytes(bytes)
                    .file_name(filename)
                    .mime_str(&content_type)
                    .map_err(map_transport_error)?;
                request.multipart(multipart::Form::new().part("file", part))
            }
            None => request,
        };

        let response = request.send().await.map_err(map_transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        Err(classify_status(status, &body))
    }
}

/// Error body the server sends alongside failure statuses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

fn classify_status(status: StatusCode, body: &[u8]) -> ApiError {
    let message = match server_message(body) {
        Some(message) => message,
        None => body_preview(body),
    };

    if status.is_client_error() {
        ApiError::Client {
            status: status.as_u16(),
            message,
        }
    } else {
        ApiError::Server {
            status: Some(status.as_u16()),
            message,
        }
    }
}

fn server_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .map(|body| body.message)
}

fn map_transport_error(error: reqwest::Error) -> ApiError {
    let message = if error.is_timeout() {
        format!("timed out: {error}")
    } else {
        error.to_string()
    };

    ApiError::Server {
        status: None,
        message,
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if compact.chars().count() > PREVIEW_LIMIT {
        let cut: String = compact.chars().take(PREVIEW_LIMIT).collect();
        format!("{cut}...")
    } else {
        compact
    }
}
