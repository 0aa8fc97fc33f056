use super::*;
use crate::types::ChatMessage;
use crate::types::CompletionParams;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::header;
use wiremock::matchers::method;
use wiremock::matchers::path;

#[test]
fn test_client_requires_api_key() {
    let result = Client::new(ClientConfig::new("").base_url("http://localhost"));
    assert!(matches!(result, Err(PerplexityError::Configuration(_))));
}

#[test]
fn test_client_with_api_key() {
    let client = Client::new(ClientConfig::new("test-key").base_url("https://example.com/api/"))
        .expect("client creation should succeed");
    assert_eq!(client.api_key(), "test-key");
    assert_eq!(client.base_url(), "https://example.com/api");
    assert_eq!(client.version(), env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_client_debug_does_not_leak_key() {
    let client = Client::new(ClientConfig::new("secret-key-123").base_url("http://localhost"))
        .expect("client creation should succeed");
    assert!(!format!("{client:?}").contains("secret-key-123"));
}

#[tokio::test]
async fn test_uses_supplied_http_client() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "cmpl-1",
            "model": "sonar",
            "created": 1,
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "pong"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::new("test-key")
        .base_url(server.uri())
        .http_client(reqwest::Client::new());
    let client = Client::new(config).expect("client creation should succeed");
    let completion = client
        .chat()
        .create(CompletionParams::new("sonar", vec![ChatMessage::user("ping")]))
        .await
        .unwrap();
    assert_eq!(completion.text(), "pong");
}
