use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_single_query_serialization() {
    let params = SearchParams::new("rust async").max_results(5);
    let json = serde_json::to_value(&params).unwrap();
    assert_eq!(json, serde_json::json!({"query": "rust async", "max_results": 5}));
}

#[test]
fn test_multiple_query_serialization() {
    let params = SearchParams::new(vec!["tokio", "async-std"])
        .search_recency_filter(SearchRecencyFilter::Month);
    let json = serde_json::to_value(&params).unwrap();
    assert_eq!(json["query"], serde_json::json!(["tokio", "async-std"]));
    assert_eq!(json["search_recency_filter"], "month");
}

#[test]
fn test_query_deserialization_tries_string_first() {
    let q: SearchQuery = serde_json::from_str(r#""one""#).unwrap();
    assert_eq!(q, SearchQuery::Single("one".to_string()));
    let q: SearchQuery = serde_json::from_str(r#"["a", "b"]"#).unwrap();
    assert_eq!(q, SearchQuery::from(vec!["a", "b"]));
}

#[test]
fn test_search_response_deserialization() {
    let json = r#"{
        "id": "search-1",
        "results": [
            {"title": "Tokio", "url": "https://tokio.rs", "snippet": "An async runtime", "date": "2024-01-01"}
        ],
        "server_time": "2024-06-01T00:00:00Z"
    }"#;
    let response: SearchResponse = serde_json::from_str(json).unwrap();
    assert_eq!(response.id, "search-1");
    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].title, "Tokio");
    assert_eq!(response.results[0].date.as_deref(), Some("2024-01-01"));
    assert!(response.results[0].last_updated.is_none());
    assert_eq!(response.server_time.as_deref(), Some("2024-06-01T00:00:00Z"));
}
