//! Retrying HTTP engine shared by every endpoint.
//!
//! Buffered calls go through [`HttpClient::execute`], which retries
//! transient failures with [`Backoff`]. Streaming calls go through
//! [`HttpClient::execute_stream`], which makes exactly one attempt: once
//! the caller starts consuming events a replay would duplicate or skip
//! output.

use std::fmt;

use bytes::Bytes;
use futures::StreamExt;
use reqwest::Method;
use reqwest::header::ACCEPT;
use reqwest::header::AUTHORIZATION;
use reqwest::header::CACHE_CONTROL;
use reqwest::header::CONNECTION;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderName;
use reqwest::header::HeaderValue;
use reqwest::header::USER_AGENT;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::warn;

use crate::backoff::Backoff;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::error::ErrorKind;
use crate::error::PerplexityError;
use crate::error::Result;
use crate::sse::ByteStream;

/// Response header carrying the request-correlation id.
const REQUEST_ID_HEADER: &str = "x-request-id";

// =============================================================================
// Request / Response
// =============================================================================

/// A logical API request, independent of how many times it is sent.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Path relative to the base URL, starting with `/`.
    pub path: String,
    pub query: Vec<(String, String)>,
    /// Per-request header overrides, applied last.
    pub headers: Vec<(String, String)>,
    /// Encoded JSON body.
    pub body: Option<Bytes>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Encode `body` as the JSON request body.
    ///
    /// # Errors
    ///
    /// Returns `PerplexityError::Serialization` if `body` cannot be encoded.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let encoded = serde_json::to_vec(body)
            .map_err(|e| PerplexityError::Serialization(e.to_string()))?;
        self.body = Some(Bytes::from(encoded));
        Ok(self)
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A fully buffered response with a success status.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub request_id: Option<String>,
}

impl Response {
    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            PerplexityError::Parse(format!(
                "failed to parse response: {e}\nBody: {}",
                String::from_utf8_lossy(&self.body)
            ))
        })
    }
}

/// A response whose body has not been read yet.
pub struct StreamingResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub request_id: Option<String>,
    pub body: ByteStream,
}

impl fmt::Debug for StreamingResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("request_id", &self.request_id)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// HttpClient
// =============================================================================

/// Sends logical requests, retrying transient failures.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
    timeout: std::time::Duration,
    max_retries: u32,
    backoff: Backoff,
    /// Authorization, content type and user agent.
    fixed_headers: HeaderMap,
    default_headers: HeaderMap,
}

impl HttpClient {
    /// Build an engine from a client configuration.
    ///
    /// # Errors
    ///
    /// Returns `PerplexityError::Configuration` for an empty API key, a key or
    /// header that is not a valid header value, or an unparsable base URL.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(PerplexityError::Configuration(
                "API key is required".to_string(),
            ));
        }

        let base_url = config.base_url.trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url).map_err(|e| {
            PerplexityError::Configuration(format!("invalid base URL {base_url:?}: {e}"))
        })?;

        let mut fixed_headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| {
                PerplexityError::Configuration("API key is not a valid header value".to_string())
            })?;
        auth.set_sensitive(true);
        fixed_headers.insert(AUTHORIZATION, auth);
        fixed_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        fixed_headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).map_err(|_| {
                PerplexityError::Configuration(format!(
                    "invalid user agent {:?}",
                    config.user_agent
                ))
            })?,
        );

        let mut default_headers = HeaderMap::new();
        for (name, value) in &config.default_headers {
            let (name, value) = parse_header(name, value).map_err(|e| {
                PerplexityError::Configuration(format!("invalid default header: {e}"))
            })?;
            default_headers.insert(name, value);
        }

        let http = match &config.http_client {
            Some(client) => client.clone(),
            None => reqwest::Client::builder()
                .timeout(config.timeout)
                .build()
                .map_err(|e| {
                    PerplexityError::Configuration(format!("failed to build HTTP client: {e}"))
                })?,
        };

        Ok(Self {
            http,
            base_url,
            timeout: config.timeout,
            max_retries: config.max_retries,
            backoff: config.backoff,
            fixed_headers,
            default_headers,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Send a request, retrying transient failures, and buffer the body.
    ///
    /// Up to `max_retries + 1` physical attempts are made. Statuses whose
    /// [`ErrorKind`] is retryable and all transport failures are retried;
    /// any other failure status is returned at once. The token is checked
    /// before every attempt and raced against both the backoff sleep and
    /// the request itself.
    pub async fn execute(&self, request: &Request, cancel: &CancellationToken) -> Result<Response> {
        let headers = self.build_headers(request, false)?;
        let url = self.url(&request.path);
        let mut last_error: Option<PerplexityError> = None;

        for attempt in 0..=self.max_retries {
            if cancel.is_cancelled() {
                return Err(PerplexityError::Cancelled);
            }

            if attempt > 0 {
                let delay = self.backoff.delay(attempt);
                debug!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = ?last_error,
                    "Retrying request"
                );
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(PerplexityError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
            }

            debug!(method = %request.method, path = %request.path, attempt, "Sending request");
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(PerplexityError::Cancelled),
                outcome = self.send_buffered(&url, request, &headers) => outcome,
            };

            let error = match outcome {
                Ok(response) if response.status < 400 => return Ok(response),
                Ok(response) => PerplexityError::from(status_error(
                    response.status,
                    &response.body,
                    response.request_id,
                )),
                Err(error) => error,
            };

            if !error.is_retryable() {
                return Err(error);
            }
            if attempt == self.max_retries {
                warn!(
                    method = %request.method,
                    path = %request.path,
                    attempts = attempt + 1,
                    error = %error,
                    "Request failed after exhausting retries"
                );
                return Err(error);
            }
            last_error = Some(error);
        }

        Err(last_error.unwrap_or_else(|| {
            ApiError::transport(ErrorKind::Connection, "no request attempt was made", None).into()
        }))
    }

    /// Send a request expecting an event stream. Never retried.
    ///
    /// On a failure status the body is read to build the error. On success
    /// the body is handed back unread.
    pub async fn execute_stream(
        &self,
        request: &Request,
        cancel: &CancellationToken,
    ) -> Result<StreamingResponse> {
        if cancel.is_cancelled() {
            return Err(PerplexityError::Cancelled);
        }
        let headers = self.build_headers(request, true)?;
        let url = self.url(&request.path);

        debug!(method = %request.method, path = %request.path, "Opening stream");
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PerplexityError::Cancelled),
            response = self.send(&url, request, &headers) => response?,
        };

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let request_id = request_id(&headers);

        if status >= 400 {
            let read = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(PerplexityError::Cancelled),
                read = response.bytes() => read,
            };
            let error = match read {
                Ok(body) => status_error(status, &body, request_id),
                Err(e) => ApiError {
                    cause: Some(format!("failed to read error body: {e}")),
                    ..status_error(status, &Bytes::new(), request_id)
                },
            };
            return Err(error.into());
        }

        let body: ByteStream = Box::pin(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(PerplexityError::from)),
        );
        Ok(StreamingResponse {
            status,
            headers,
            request_id,
            body,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Headers in precedence order: fixed, stream, defaults, per-request.
    fn build_headers(&self, request: &Request, streaming: bool) -> Result<HeaderMap> {
        let mut headers = self.fixed_headers.clone();
        if streaming {
            headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
            headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
            headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        }
        for (name, value) in &self.default_headers {
            headers.insert(name.clone(), value.clone());
        }
        for (name, value) in &request.headers {
            let (name, value) = parse_header(name, value)
                .map_err(|e| PerplexityError::Validation(format!("invalid request header: {e}")))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }

    async fn send(
        &self,
        url: &str,
        request: &Request,
        headers: &HeaderMap,
    ) -> Result<reqwest::Response> {
        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .headers(headers.clone())
            .timeout(self.timeout);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }
        Ok(builder.send().await?)
    }

    async fn send_buffered(
        &self,
        url: &str,
        request: &Request,
        headers: &HeaderMap,
    ) -> Result<Response> {
        let response = self.send(url, request, headers).await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let request_id = request_id(&headers);
        let body = response.bytes().await?;
        Ok(Response {
            status,
            headers,
            body,
            request_id,
        })
    }
}

fn parse_header(name: &str, value: &str) -> std::result::Result<(HeaderName, HeaderValue), String> {
    let header_name =
        HeaderName::try_from(name).map_err(|_| format!("invalid header name {name:?}"))?;
    let header_value =
        HeaderValue::from_str(value).map_err(|_| format!("invalid value for header {name:?}"))?;
    Ok((header_name, header_value))
}

/// Request-correlation id; header lookup is case-insensitive.
pub(crate) fn request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

/// Build the typed error for a failure status.
pub(crate) fn status_error(status: u16, body: &Bytes, request_id: Option<String>) -> ApiError {
    let message = error_message(body).unwrap_or_else(|| format!("HTTP {status}"));
    ApiError::from_status(status, message, body.clone(), request_id)
}

/// Message from a JSON error body: `message`, `error`, or `error.message`.
fn error_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    let message = value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .or_else(|| value.get("error").and_then(serde_json::Value::as_str))
        .or_else(|| {
            value
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(serde_json::Value::as_str)
        })?;
    (!message.is_empty()).then(|| message.to_string())
}

#[cfg(test)]
#[path = "http.test.rs"]
mod tests;
