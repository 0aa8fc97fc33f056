//! Error types for the Perplexity SDK.
//!
//! # Error Chain Design
//!
//! Every failure the SDK can report is a [`PerplexityError`]. Errors that
//! originate from an HTTP exchange (a non-success status or a transport
//! failure) are carried as an [`ApiError`], whose [`ErrorKind`] is taken from
//! a fixed table. That table is the only place retryability is decided: the
//! retry loop in [`crate::http`] and the public [`PerplexityError::is_retryable`]
//! both consult [`ErrorKind::is_retryable`].
//!
//! Transport and parse causes are stored as stringified messages rather than
//! wrapped source errors. `PerplexityError` is `Clone` so a terminated
//! [`crate::stream::ChatStream`] can return its recorded error on every later
//! call.

use std::fmt;

use bytes::Bytes;
use thiserror::Error;

/// Result type alias using PerplexityError.
pub type Result<T> = std::result::Result<T, PerplexityError>;

/// Classification of an HTTP or transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 400 Bad Request.
    BadRequest,
    /// 401 Unauthorized.
    Authentication,
    /// 403 Forbidden.
    PermissionDenied,
    /// 404 Not Found.
    NotFound,
    /// 409 Conflict.
    Conflict,
    /// 422 Unprocessable Entity.
    UnprocessableEntity,
    /// 429 Too Many Requests.
    RateLimit,
    /// Any 5xx status.
    InternalServer,
    /// Transport timeout, or a 408 Request Timeout status.
    Timeout,
    /// Transport connection failure (refused, reset, DNS, TLS).
    Connection,
    /// Any other status at or above 400.
    Status,
}

impl ErrorKind {
    /// Map an HTTP status code onto its error kind.
    ///
    /// Only meaningful for statuses >= 400; anything else maps to
    /// [`ErrorKind::Status`].
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Authentication,
            403 => Self::PermissionDenied,
            404 => Self::NotFound,
            408 => Self::Timeout,
            409 => Self::Conflict,
            422 => Self::UnprocessableEntity,
            429 => Self::RateLimit,
            500.. => Self::InternalServer,
            _ => Self::Status,
        }
    }

    /// Whether a failure of this kind may succeed when retried.
    pub const fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::Conflict
                | Self::RateLimit
                | Self::InternalServer
                | Self::Timeout
                | Self::Connection
        )
    }

    /// Short human-readable name of the kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BadRequest => "bad request",
            Self::Authentication => "authentication",
            Self::PermissionDenied => "permission denied",
            Self::NotFound => "not found",
            Self::Conflict => "conflict",
            Self::UnprocessableEntity => "unprocessable entity",
            Self::RateLimit => "rate limit",
            Self::InternalServer => "internal server",
            Self::Timeout => "timeout",
            Self::Connection => "connection",
            Self::Status => "status",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error produced by an HTTP exchange with the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Classification of the failure.
    pub kind: ErrorKind,
    /// Human readable message.
    pub message: String,
    /// HTTP status code, `0` for transport failures.
    pub status_code: u16,
    /// Raw response body, if one was received.
    pub body: Option<Bytes>,
    /// Request-correlation id echoed by the server.
    pub request_id: Option<String>,
    /// Display output of the underlying transport error, if any.
    pub cause: Option<String>,
}

impl ApiError {
    /// Build an error from a non-success HTTP response.
    pub fn from_status(
        status: u16,
        message: impl Into<String>,
        body: Bytes,
        request_id: Option<String>,
    ) -> Self {
        Self {
            kind: ErrorKind::from_status(status),
            message: message.into(),
            status_code: status,
            body: (!body.is_empty()).then_some(body),
            request_id,
            cause: None,
        }
    }

    /// Build a transport error of the given kind.
    pub fn transport(kind: ErrorKind, message: impl Into<String>, cause: Option<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: 0,
            body: None,
            request_id: None,
            cause,
        }
    }

    /// Raw response body as UTF-8 text, lossily decoded.
    pub fn body_text(&self) -> Option<String> {
        self.body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(cause) = &self.cause {
            write!(f, ": {cause}")?;
        }
        match &self.request_id {
            Some(id) => write!(f, " (status: {}, request_id: {id})", self.status_code),
            None => write!(f, " (status: {})", self.status_code),
        }
    }
}

impl std::error::Error for ApiError {}

/// Errors that can occur when using the Perplexity SDK.
#[derive(Debug, Clone, Error)]
pub enum PerplexityError {
    /// HTTP status or transport failure.
    #[error("{0}")]
    Api(ApiError),

    /// The caller's cancellation token fired.
    #[error("operation cancelled")]
    Cancelled,

    /// The server reported an error inside an event stream.
    #[error("stream error: {0}")]
    Stream(String),

    /// A response body or event payload could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// Request parameters failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// The client could not be constructed from its configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The request body could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl PerplexityError {
    /// Error kind, for errors that came from an HTTP exchange.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Api(e) => Some(e.kind),
            _ => None,
        }
    }

    /// Check if this error is retryable.
    ///
    /// Delegates to [`ErrorKind::is_retryable`]; errors without a kind are
    /// never retryable.
    pub fn is_retryable(&self) -> bool {
        self.kind().is_some_and(ErrorKind::is_retryable)
    }

    /// HTTP status code, `0` for transport failures.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api(e) => Some(e.status_code),
            _ => None,
        }
    }

    /// Request-correlation id, if the server sent one.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::Api(e) => e.request_id.as_deref(),
            _ => None,
        }
    }

    pub fn is_rate_limit(&self) -> bool {
        self.kind() == Some(ErrorKind::RateLimit)
    }

    pub fn is_authentication(&self) -> bool {
        self.kind() == Some(ErrorKind::Authentication)
    }

    pub fn is_timeout(&self) -> bool {
        self.kind() == Some(ErrorKind::Timeout)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<ApiError> for PerplexityError {
    fn from(err: ApiError) -> Self {
        PerplexityError::Api(err)
    }
}

impl From<reqwest::Error> for PerplexityError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::transport(ErrorKind::Timeout, "request timed out", Some(err.to_string()))
                .into()
        } else {
            ApiError::transport(ErrorKind::Connection, "request failed", Some(err.to_string()))
                .into()
        }
    }
}

impl From<serde_json::Error> for PerplexityError {
    fn from(err: serde_json::Error) -> Self {
        PerplexityError::Parse(err.to_string())
    }
}

#[cfg(test)]
#[path = "error.test.rs"]
mod tests;
