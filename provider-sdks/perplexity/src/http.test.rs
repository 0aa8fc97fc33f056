use std::time::Duration;
use std::time::Instant;

use super::*;
use pretty_assertions::assert_eq;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::body_json;
use wiremock::matchers::header;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::matchers::query_param;

fn fast_config(base_url: &str) -> ClientConfig {
    ClientConfig::new("test-api-key")
        .base_url(base_url)
        .backoff(Backoff::new(Duration::from_millis(1), Duration::from_millis(5)))
}

fn make_engine(base_url: &str) -> HttpClient {
    HttpClient::new(&fast_config(base_url)).expect("engine creation should succeed")
}

// =========================================================================
// Construction
// =========================================================================

#[test]
fn test_requires_api_key() {
    let result = HttpClient::new(&ClientConfig::new("").base_url("http://localhost"));
    assert!(matches!(result, Err(PerplexityError::Configuration(_))));
}

#[test]
fn test_rejects_invalid_base_url() {
    let result = HttpClient::new(&ClientConfig::new("key").base_url("not a url"));
    assert!(matches!(result, Err(PerplexityError::Configuration(_))));
}

#[test]
fn test_rejects_invalid_default_header() {
    let config = ClientConfig::new("key")
        .base_url("http://localhost")
        .header("bad header", "value");
    assert!(matches!(
        HttpClient::new(&config),
        Err(PerplexityError::Configuration(_))
    ));
}

#[test]
fn test_rejects_api_key_with_newline() {
    let config = ClientConfig::new("key\nwith newline").base_url("http://localhost");
    assert!(matches!(
        HttpClient::new(&config),
        Err(PerplexityError::Configuration(_))
    ));
}

#[test]
fn test_trailing_slash_trimmed() {
    let engine = make_engine("http://localhost:8080/");
    assert_eq!(engine.base_url(), "http://localhost:8080");
}

// =========================================================================
// Retry behaviour
// =========================================================================

#[tokio::test]
async fn test_retryable_statuses_are_retried() {
    for status in [408, 409, 429, 500, 502, 503, 504] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/test"))
            .respond_with(ResponseTemplate::new(status))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/test"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let engine = make_engine(&server.uri());
        let response = engine
            .execute(&Request::get("/test"), &CancellationToken::new())
            .await
            .unwrap_or_else(|e| panic!("status {status} should be retried, got {e}"));
        assert_eq!(response.status, 200);
        assert_eq!(response.body, Bytes::from_static(b"ok"));
        server.verify().await;
    }
}

#[tokio::test]
async fn test_terminal_statuses_are_not_retried() {
    for status in [200, 400, 401, 403, 404, 422] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/test"))
            .respond_with(ResponseTemplate::new(status))
            .expect(1)
            .mount(&server)
            .await;

        let engine = make_engine(&server.uri());
        let result = engine
            .execute(&Request::get("/test"), &CancellationToken::new())
            .await;
        match result {
            Ok(response) => assert_eq!(response.status, status),
            Err(err) => {
                assert_eq!(err.status_code(), Some(status));
                assert!(!err.is_retryable());
            }
        }
        server.verify().await;
    }
}

#[tokio::test]
async fn test_exhausted_retries_make_n_plus_one_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fail"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(serde_json::json!({"error": "overloaded"})),
        )
        .expect(4)
        .mount(&server)
        .await;

    let engine = HttpClient::new(&fast_config(&server.uri()).max_retries(3)).unwrap();
    let err = engine
        .execute(&Request::post("/fail"), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), Some(ErrorKind::InternalServer));
    assert_eq!(err.status_code(), Some(500));
    assert!(err.to_string().contains("overloaded"));
}

#[tokio::test]
async fn test_zero_retries_makes_single_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let engine = HttpClient::new(&fast_config(&server.uri()).max_retries(0)).unwrap();
    let err = engine
        .execute(&Request::get("/x"), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_transport_failure_is_retried_then_reported() {
    // Nothing listens on port 1.
    let engine = HttpClient::new(&fast_config("http://127.0.0.1:1").max_retries(1)).unwrap();
    let err = engine
        .execute(&Request::get("/x"), &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Connection));
    assert_eq!(err.status_code(), Some(0));
    assert!(err.is_retryable());
}

// =========================================================================
// Cancellation
// =========================================================================

#[tokio::test]
async fn test_cancel_during_backoff() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = ClientConfig::new("test-api-key")
        .base_url(server.uri())
        .backoff(Backoff::new(Duration::from_secs(30), Duration::from_secs(30)));
    let engine = HttpClient::new(&config).unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let err = engine
        .execute(&Request::get("/slow"), &cancel)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_cancel_during_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
        .mount(&server)
        .await;

    let engine = make_engine(&server.uri());
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = engine
        .execute(&Request::get("/hang"), &cancel)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
}

#[tokio::test]
async fn test_already_cancelled_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let engine = make_engine(&server.uri());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = engine.execute(&Request::get("/x"), &cancel).await.unwrap_err();
    assert!(err.is_cancelled());
    let err = engine
        .execute_stream(&Request::get("/x"), &cancel)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
}

// =========================================================================
// Headers, body and error details
// =========================================================================

#[tokio::test]
async fn test_request_headers_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/echo"))
        .and(header("authorization", "Bearer test-api-key"))
        .and(header("content-type", "application/json"))
        .and(header("x-team", "search"))
        .and(header("x-override", "request"))
        .and(query_param("mode", "fast"))
        .and(body_json(serde_json::json!({"hello": "world"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let config = fast_config(&server.uri())
        .header("X-Team", "search")
        .header("X-Override", "default");
    let engine = HttpClient::new(&config).unwrap();
    let request = Request::post("/echo")
        .json(&serde_json::json!({"hello": "world"}))
        .unwrap()
        .query("mode", "fast")
        .header("X-Override", "request");

    let response = engine
        .execute(&request, &CancellationToken::new())
        .await
        .unwrap();
    let body: serde_json::Value = response.json().unwrap();
    assert_eq!(body, serde_json::json!({"ok": true}));
}

#[tokio::test]
async fn test_user_agent_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", "agent-under-test/1.0"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let engine =
        HttpClient::new(&fast_config(&server.uri()).user_agent("agent-under-test/1.0")).unwrap();
    engine
        .execute(&Request::get("/ua"), &CancellationToken::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_invalid_request_header_is_validation_error() {
    let engine = make_engine("http://localhost");
    let err = engine
        .execute(
            &Request::get("/x").header("bad header", "v"),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PerplexityError::Validation(_)));
}

#[tokio::test]
async fn test_error_carries_message_body_and_request_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400)
                .insert_header("X-Request-ID", "req-42")
                .set_body_json(serde_json::json!({"message": "Invalid model"})),
        )
        .mount(&server)
        .await;

    let engine = make_engine(&server.uri());
    let err = engine
        .execute(&Request::post("/chat/completions"), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.request_id(), Some("req-42"));
    assert_eq!(err.kind(), Some(ErrorKind::BadRequest));
    assert_eq!(err.to_string(), "Invalid model (status: 400, request_id: req-42)");
    let PerplexityError::Api(api) = err else {
        panic!("expected api error");
    };
    assert_eq!(
        api.body_text().as_deref(),
        Some(r#"{"message":"Invalid model"}"#)
    );
}

#[tokio::test]
async fn test_success_response_keeps_request_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).insert_header("x-request-id", "abc"))
        .mount(&server)
        .await;

    let engine = make_engine(&server.uri());
    let response = engine
        .execute(&Request::get("/x"), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(response.request_id.as_deref(), Some("abc"));
}

#[test]
fn test_status_error_message_sources() {
    let err = status_error(401, &Bytes::from_static(br#"{"error": "bad key"}"#), None);
    assert_eq!(err.message, "bad key");

    let err = status_error(
        429,
        &Bytes::from_static(br#"{"error": {"message": "slow down", "type": "rate_limit"}}"#),
        None,
    );
    assert_eq!(err.message, "slow down");

    let err = status_error(502, &Bytes::from_static(b"<html>Bad Gateway</html>"), None);
    assert_eq!(err.message, "HTTP 502");
    assert!(err.body.is_some());

    let err = status_error(404, &Bytes::new(), None);
    assert_eq!(err.message, "HTTP 404");
    assert!(err.body.is_none());
}

#[test]
fn test_response_json_parse_error() {
    let response = Response {
        status: 200,
        headers: HeaderMap::new(),
        body: Bytes::from_static(b"not json"),
        request_id: None,
    };
    let result = response.json::<serde_json::Value>();
    assert!(matches!(result, Err(PerplexityError::Parse(_))));
}

// =========================================================================
// Streaming
// =========================================================================

#[tokio::test]
async fn test_stream_sends_event_stream_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("accept", "text/event-stream"))
        .and(header("cache-control", "no-cache"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .insert_header("x-request-id", "stream-1")
                .set_body_string("data: [DONE]\n\n"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let engine = make_engine(&server.uri());
    let response = engine
        .execute_stream(&Request::post("/chat/completions"), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.request_id.as_deref(), Some("stream-1"));

    let mut body = Vec::new();
    let mut stream = response.body;
    while let Some(chunk) = stream.next().await {
        body.extend_from_slice(&chunk.unwrap());
    }
    assert_eq!(body, b"data: [DONE]\n\n");
}

#[tokio::test]
async fn test_stream_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(serde_json::json!({"message": "busy"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let engine = make_engine(&server.uri());
    let err = engine
        .execute_stream(&Request::post("/chat/completions"), &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(503));
    assert!(err.to_string().starts_with("busy"));
}

/// Serve one connection: send `head` and `partial_body`, then either close
/// the socket or keep it open without sending the rest.
async fn serve_truncated(head: &'static str, partial_body: &'static str, hold_open: bool) -> String {
    use tokio::io::AsyncReadExt;
    use tokio::io::AsyncWriteExt;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0_u8; 4096];
        let _ = socket.read(&mut buf).await;
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(partial_body.as_bytes()).await.unwrap();
        socket.flush().await.unwrap();
        if hold_open {
            tokio::time::sleep(Duration::from_secs(10)).await;
        }
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_stream_error_body_read_failure_is_recorded() {
    let uri = serve_truncated(
        "HTTP/1.1 500 Internal Server Error\r\ncontent-length: 100\r\n\r\n",
        "{\"mess",
        false,
    )
    .await;

    let engine = make_engine(&uri);
    let err = engine
        .execute_stream(&Request::post("/chat/completions"), &CancellationToken::new())
        .await
        .unwrap_err();
    let api = match err {
        PerplexityError::Api(api) => api,
        other => panic!("expected an API error, got {other:?}"),
    };
    assert_eq!(api.status_code, 500);
    assert_eq!(api.kind, ErrorKind::InternalServer);
    assert!(
        api.cause
            .as_deref()
            .is_some_and(|c| c.contains("failed to read error body"))
    );
}

#[tokio::test]
async fn test_stream_error_body_read_honours_cancellation() {
    let uri = serve_truncated(
        "HTTP/1.1 500 Internal Server Error\r\ncontent-length: 100\r\n\r\n",
        "",
        true,
    )
    .await;

    let engine = make_engine(&uri);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let err = engine
        .execute_stream(&Request::post("/chat/completions"), &cancel)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    assert!(started.elapsed() < Duration::from_secs(5));
}
