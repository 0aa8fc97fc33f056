use super::*;

fn status_error(status: u16) -> PerplexityError {
    ApiError::from_status(status, format!("HTTP {status}"), Bytes::new(), None).into()
}

#[test]
fn test_kind_from_status() {
    assert_eq!(ErrorKind::from_status(400), ErrorKind::BadRequest);
    assert_eq!(ErrorKind::from_status(401), ErrorKind::Authentication);
    assert_eq!(ErrorKind::from_status(403), ErrorKind::PermissionDenied);
    assert_eq!(ErrorKind::from_status(404), ErrorKind::NotFound);
    assert_eq!(ErrorKind::from_status(408), ErrorKind::Timeout);
    assert_eq!(ErrorKind::from_status(409), ErrorKind::Conflict);
    assert_eq!(ErrorKind::from_status(422), ErrorKind::UnprocessableEntity);
    assert_eq!(ErrorKind::from_status(429), ErrorKind::RateLimit);
    assert_eq!(ErrorKind::from_status(500), ErrorKind::InternalServer);
    assert_eq!(ErrorKind::from_status(503), ErrorKind::InternalServer);
    assert_eq!(ErrorKind::from_status(418), ErrorKind::Status);
}

#[test]
fn test_retryable_errors() {
    for status in [408, 409, 429, 500, 502, 503, 504] {
        assert!(status_error(status).is_retryable(), "status {status}");
    }
    assert!(
        PerplexityError::from(ApiError::transport(ErrorKind::Connection, "refused", None))
            .is_retryable()
    );
    assert!(
        PerplexityError::from(ApiError::transport(ErrorKind::Timeout, "slow", None))
            .is_retryable()
    );
}

#[test]
fn test_non_retryable_errors() {
    for status in [400, 401, 403, 404, 422, 418] {
        assert!(!status_error(status).is_retryable(), "status {status}");
    }
    assert!(!PerplexityError::Cancelled.is_retryable());
    assert!(!PerplexityError::Parse("bad".to_string()).is_retryable());
    assert!(!PerplexityError::Validation("bad".to_string()).is_retryable());
    assert!(!PerplexityError::Stream("oops".to_string()).is_retryable());
}

#[test]
fn test_predicates() {
    assert!(status_error(429).is_rate_limit());
    assert!(status_error(401).is_authentication());
    assert!(status_error(408).is_timeout());
    assert!(PerplexityError::Cancelled.is_cancelled());
    assert!(!status_error(500).is_rate_limit());
}

#[test]
fn test_api_error_display() {
    let err = ApiError::from_status(
        400,
        "Invalid model",
        Bytes::from_static(b"{}"),
        Some("req-123".to_string()),
    );
    assert_eq!(
        err.to_string(),
        "Invalid model (status: 400, request_id: req-123)"
    );

    let err = ApiError::from_status(404, "HTTP 404", Bytes::new(), None);
    assert_eq!(err.to_string(), "HTTP 404 (status: 404)");
    assert!(err.body.is_none());
}

#[test]
fn test_transport_error_display_includes_cause() {
    let err = ApiError::transport(
        ErrorKind::Connection,
        "request failed",
        Some("connection refused".to_string()),
    );
    assert_eq!(
        err.to_string(),
        "request failed: connection refused (status: 0)"
    );
    assert_eq!(err.status_code, 0);
}

#[test]
fn test_accessors() {
    let err: PerplexityError = ApiError::from_status(
        503,
        "overloaded",
        Bytes::from_static(b"overloaded"),
        Some("abc".to_string()),
    )
    .into();
    assert_eq!(err.kind(), Some(ErrorKind::InternalServer));
    assert_eq!(err.status_code(), Some(503));
    assert_eq!(err.request_id(), Some("abc"));
    match err {
        PerplexityError::Api(api) => assert_eq!(api.body_text().as_deref(), Some("overloaded")),
        other => panic!("expected api error, got {other:?}"),
    }
    assert_eq!(PerplexityError::Cancelled.kind(), None);
}
