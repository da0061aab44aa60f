//! HTTP client wrapper.
//!
//! Every resource service talks to its back end through a [`Transport`]. The
//! production implementation, [`HttpClient`], is one `reqwest::Client` bound to a
//! base URL. It sends JSON, reads JSON back, and turns non-2xx answers into
//! [`AppError::Api`] / [`AppError::NotFound`] carrying the back end's `message`.
//! There is no retry and no caching: a failure is returned to the caller as is.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE},
    Method, Url,
};
use serde_json::Value;

use crate::{
    config::BackendConfig,
    error::{AppError, AppResult},
};

/// A request against one back end, relative to its base URL
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the base URL, e.g. `books/42`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Value of a query parameter
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Sends requests to a back end and returns the decoded JSON body
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> AppResult<Value>;
}

/// `reqwest`-backed transport bound to one base URL
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpClient {
    pub fn new(config: &BackendConfig) -> AppResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| AppError::InvalidInput(format!("invalid base URL '{}': {}", config.base_url, e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("frontdesk-console/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join `path` below the base URL, keeping any path prefix such as `/api`
    fn url_for(&self, path: &str) -> AppResult<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| AppError::InvalidInput(format!("invalid URL '{}': {}", joined, e)))
    }
}

/// Extract the `{ message }` of an error envelope
fn error_message(body: &Value) -> Option<String> {
    body.get("message")
        .or_else(|| body.get("error"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl Transport for HttpClient {
    async fn send(&self, request: ApiRequest) -> AppResult<Value> {
        let url = self.url_for(&request.path)?;
        tracing::debug!(method = %request.method, %url, "Sending request");

        let mut builder = self.client.request(request.method.clone(), url.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let body: Value = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str(&text) {
                Ok(body) => body,
                Err(e) if status.is_success() => return Err(AppError::Decode(e)),
                // Error pages are often HTML; keep the status, drop the body
                Err(_) => Value::Null,
            }
        };

        if status.is_success() {
            tracing::debug!(method = %request.method, %url, status = status.as_u16(), "Request succeeded");
            return Ok(body);
        }

        let message = error_message(&body);
        tracing::warn!(
            method = %request.method,
            %url,
            status = status.as_u16(),
            message = message.as_deref().unwrap_or(""),
            "Request failed"
        );

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(
                message.unwrap_or_else(|| format!("{} not found", request.path)),
            ));
        }

        Err(AppError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
