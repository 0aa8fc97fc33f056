use std::time::Duration;

use super::*;
use crate::backoff::Backoff;
use crate::config::ClientConfig;
use crate::types::ChatMessage;
use crate::types::FinishReason;
use pretty_assertions::assert_eq;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::body_partial_json;
use wiremock::matchers::header;
use wiremock::matchers::method;
use wiremock::matchers::path;

fn make_client(base_url: &str) -> Client {
    let config = ClientConfig::new("test-api-key")
        .base_url(base_url)
        .backoff(Backoff::new(Duration::from_millis(1), Duration::from_millis(5)));
    Client::new(config).expect("client creation should succeed")
}

fn params() -> CompletionParams {
    CompletionParams::new("sonar", vec![ChatMessage::user("What is the capital of France?")])
}

#[tokio::test]
async fn test_create_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-api-key"))
        .and(body_partial_json(serde_json::json!({"model": "sonar"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "cmpl-1",
            "model": "sonar",
            "created": 1700000000,
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Paris."},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 9, "completion_tokens": 2, "total_tokens": 11}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = make_client(&server.uri());
    let completion = client.chat().create(params()).await.unwrap();

    assert_eq!(completion.id, "cmpl-1");
    assert_eq!(completion.text(), "Paris.");
    assert_eq!(completion.finish_reason(), Some(FinishReason::Stop));
    assert_eq!(completion.usage.map(|u| u.total_tokens), Some(11));
}

#[tokio::test]
async fn test_create_retries_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "cmpl-2", "model": "sonar", "created": 1, "choices": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = make_client(&server.uri());
    let completion = client.chat().create(params()).await.unwrap();
    assert_eq!(completion.id, "cmpl-2");
}

#[tokio::test]
async fn test_create_validation() {
    let client = make_client("http://localhost");

    let err = client
        .chat()
        .create(CompletionParams::new("sonar", vec![]))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("messages are required"));

    let err = client
        .chat()
        .create(CompletionParams::new("", vec![ChatMessage::user("hi")]))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("model is required"));

    let mut streaming = params();
    streaming.stream = Some(true);
    let err = client.chat().create(streaming).await.unwrap_err();
    assert!(matches!(err, PerplexityError::Validation(_)));
}

#[tokio::test]
async fn test_create_unparsable_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = make_client(&server.uri());
    let err = client.chat().create(params()).await.unwrap_err();
    assert!(matches!(err, PerplexityError::Parse(_)));
}

#[tokio::test]
async fn test_create_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(serde_json::json!({"error": "invalid key"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = make_client(&server.uri());
    let err = client.chat().create(params()).await.unwrap_err();
    assert!(err.is_authentication());
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_create_stream() {
    let server = MockServer::start().await;
    let body = concat!(
        "data: {\"id\":\"c1\",\"model\":\"sonar\",\"created\":1,\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\",\"content\":\"Par\"}}]}\n\n",
        "data: {\"id\":\"c1\",\"model\":\"sonar\",\"created\":1,\"choices\":[{\"index\":0,\"delta\":{\"content\":\"is.\"},\"finish_reason\":\"stop\"}]}\n\n",
        "data: [DONE]\n\n",
    );
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("accept", "text/event-stream"))
        .and(body_partial_json(serde_json::json!({"stream": true})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(body),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = make_client(&server.uri());
    let mut stream = client.chat().create_stream(params()).await.unwrap();

    let mut text = String::new();
    let mut last_finish = None;
    while let Some(chunk) = stream.next().await.unwrap() {
        text.push_str(&chunk.text());
        last_finish = chunk.finish_reason();
    }
    assert_eq!(text, "Paris.");
    assert_eq!(last_finish, Some(FinishReason::Stop));
}

#[tokio::test]
async fn test_create_stream_opening_error_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = make_client(&server.uri());
    let err = client.chat().create_stream(params()).await.unwrap_err();
    assert_eq!(err.status_code(), Some(500));
}

#[tokio::test]
async fn test_with_cancellation() {
    let client = make_client("http://localhost");
    let token = CancellationToken::new();
    token.cancel();
    let err = client
        .chat()
        .with_cancellation(token)
        .create(params())
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
}
