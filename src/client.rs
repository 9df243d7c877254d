use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.uapi.nl";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors reported by the uAPI service or the transport in front of it.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    RateLimit(String),

    #[error("{status}: {message}")]
    Server { status: StatusCode, message: String },

    #[error("{status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("request failed: {0}")]
    Connection(#[source] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(#[source] reqwest::Error),
}

impl ApiError {
    /// Name shown in `[ERROR] <kind>: ...` lines.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BadRequestError",
            ApiError::Authentication(_) => "AuthenticationError",
            ApiError::PermissionDenied(_) => "PermissionDeniedError",
            ApiError::NotFound(_) => "NotFoundError",
            ApiError::RateLimit(_) => "RateLimitError",
            ApiError::Server { .. } => "InternalServerError",
            ApiError::Status { .. } => "APIStatusError",
            ApiError::Connection(_) => "APIConnectionError",
            ApiError::Decode(_) => "APIResponseError",
        }
    }

    /// Map a non-success status and its body to the matching variant.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = error_message(status, body);
        match status {
            StatusCode::BAD_REQUEST => ApiError::BadRequest(message),
            StatusCode::UNAUTHORIZED => ApiError::Authentication(message),
            StatusCode::FORBIDDEN => ApiError::PermissionDenied(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimit(message),
            s if s.is_server_error() => ApiError::Server { status, message },
            _ => ApiError::Status { status, message },
        }
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let from_json = parsed.as_ref().and_then(|value| {
        value
            .pointer("/error/message")
            .or_else(|| value.get("message"))
            .or_else(|| value.get("detail"))
            .or_else(|| value.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string)
    });

    from_json.unwrap_or_else(|| {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        } else {
            trimmed.to_string()
        }
    })
}

/// The remote extraction/search service.
pub trait Uapi {
    /// Extract structured data from the page at `url`; returns the response envelope.
    fn extract(&self, url: &str) -> impl Future<Output = Result<Value, ApiError>> + Send;

    /// Answer `query`; returns the response envelope.
    fn search(&self, query: &str) -> impl Future<Output = Result<Value, ApiError>> + Send;
}

/// Settings used to build an [`HttpClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct ExtractBody<'a> {
    url: &'a str,
}

#[derive(Serialize)]
struct SearchBody<'a> {
    query: &'a str,
}

/// HTTPS client for the uAPI REST endpoints.
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("uapi-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    fn authed_post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .header(ACCEPT, "application/json")
    }

    async fn send_json(&self, req: reqwest::RequestBuilder) -> Result<Value, ApiError> {
        let resp = req.send().await.map_err(ApiError::Connection)?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::debug!(%status, "uAPI request failed");
            return Err(ApiError::from_response(status, &body));
        }
        resp.json().await.map_err(ApiError::Decode)
    }
}

impl Uapi for HttpClient {
    /// `POST /v1/extract`
    async fn extract(&self, url: &str) -> Result<Value, ApiError> {
        tracing::info!(url, "extracting");
        let req = self.authed_post("/v1/extract").json(&ExtractBody { url });
        self.send_json(req).await
    }

    /// `POST /v1/search`
    async fn search(&self, query: &str) -> Result<Value, ApiError> {
        tracing::info!(query, "searching");
        let req = self.authed_post("/v1/search").json(&SearchBody { query });
        self.send_json(req).await
    }
}
