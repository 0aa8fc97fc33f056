use super::*;
use crate::config::ClientConfig;
use pretty_assertions::assert_eq;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::body_json;
use wiremock::matchers::method;
use wiremock::matchers::path;

fn make_client(base_url: &str) -> Client {
    Client::new(ClientConfig::new("test-api-key").base_url(base_url))
        .expect("client creation should succeed")
}

#[test]
fn test_validate_query() {
    assert!(validate_query(&SearchQuery::from("rust")).is_ok());
    assert!(validate_query(&SearchQuery::from(vec!["a", "b"])).is_ok());

    let err = validate_query(&SearchQuery::from("")).unwrap_err();
    assert_eq!(err.to_string(), "validation error: query cannot be empty");

    let err = validate_query(&SearchQuery::Multiple(vec![])).unwrap_err();
    assert_eq!(err.to_string(), "validation error: query cannot be empty");

    let err = validate_query(&SearchQuery::from(vec!["a", "", "c"])).unwrap_err();
    assert_eq!(err.to_string(), "validation error: query[1] cannot be empty");
}

#[tokio::test]
async fn test_search_create() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_json(serde_json::json!({"query": ["rust", "tokio"], "max_results": 3})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "s-1",
            "results": [
                {"title": "Rust", "url": "https://www.rust-lang.org", "snippet": "A language"},
                {"title": "Tokio", "url": "https://tokio.rs", "snippet": "A runtime"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = make_client(&server.uri());
    let response = client
        .search()
        .create(SearchParams::new(vec!["rust", "tokio"]).max_results(3))
        .await
        .unwrap();

    assert_eq!(response.id, "s-1");
    assert_eq!(response.results.len(), 2);
    assert_eq!(response.results[1].url, "https://tokio.rs");
}

#[tokio::test]
async fn test_search_invalid_query_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = make_client(&server.uri());
    let err = client.search().create(SearchParams::new("")).await.unwrap_err();
    assert!(matches!(err, PerplexityError::Validation(_)));
}
