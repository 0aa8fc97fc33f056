use super::*;
use crate::config::ClientConfig;
use crate::types::AsyncCompletionStatus;
use crate::types::ChatMessage;
use crate::types::CompletionParams;
use pretty_assertions::assert_eq;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::body_partial_json;
use wiremock::matchers::header;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::matchers::query_param;

fn make_client(base_url: &str) -> Client {
    Client::new(ClientConfig::new("test-api-key").base_url(base_url))
        .expect("client creation should succeed")
}

fn completion_json(id: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "created_at": 1700000000,
        "model": "sonar-deep-research",
        "status": status
    })
}

#[tokio::test]
async fn test_create() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/async/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "request": {"model": "sonar-deep-research"},
            "idempotency_key": "idem-1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_json("req-1", "CREATED")))
        .expect(1)
        .mount(&server)
        .await;

    let client = make_client(&server.uri());
    let params = AsyncCompletionParams::new(CompletionParams::new(
        "sonar-deep-research",
        vec![ChatMessage::user("Research Rust async runtimes")],
    ))
    .idempotency_key("idem-1");
    let completion = client.async_chat().create(params).await.unwrap();

    assert_eq!(completion.id, "req-1");
    assert_eq!(completion.status, AsyncCompletionStatus::Created);
}

#[tokio::test]
async fn test_create_validates_nested_request() {
    let client = make_client("http://localhost");
    let params = AsyncCompletionParams::new(CompletionParams::new("sonar", vec![]));
    let err = client.async_chat().create(params).await.unwrap_err();
    assert!(matches!(err, PerplexityError::Validation(_)));
}

#[tokio::test]
async fn test_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/async/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "requests": [completion_json("a", "COMPLETED"), completion_json("b", "IN_PROGRESS")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = make_client(&server.uri());
    let list = client.async_chat().list().await.unwrap();
    assert_eq!(list.requests.len(), 2);
    assert_eq!(list.requests[1].status, AsyncCompletionStatus::InProgress);
    assert!(list.next_token.is_none());
}

#[tokio::test]
async fn test_get_encodes_id_and_sends_options() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/async/chat/completions/req%2F1"))
        .and(query_param("local_mode", "true"))
        .and(header("x-client-name", "tests"))
        .and(header("x-usage-tier", "tier-3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_json("req/1", "FAILED")))
        .expect(1)
        .mount(&server)
        .await;

    let client = make_client(&server.uri());
    let params = AsyncGetParams {
        local_mode: Some(true),
        client_name: Some("tests".to_string()),
        usage_tier: Some("tier-3".to_string()),
        ..Default::default()
    };
    let completion = client.async_chat().get("req/1", params).await.unwrap();
    assert_eq!(completion.id, "req/1");
    assert!(completion.status.is_terminal());
}

#[tokio::test]
async fn test_get_requires_id() {
    let client = make_client("http://localhost");
    let err = client
        .async_chat()
        .get("", AsyncGetParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PerplexityError::Validation(_)));
}

#[tokio::test]
async fn test_get_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(serde_json::json!({"message": "no such request"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = make_client(&server.uri());
    let err = client
        .async_chat()
        .get("missing", AsyncGetParams::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(crate::error::ErrorKind::NotFound));
    assert!(err.to_string().contains("no such request"));
}
