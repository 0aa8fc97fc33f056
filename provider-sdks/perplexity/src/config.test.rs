use super::*;

#[test]
fn test_config_new() {
    let config = ClientConfig::new("test-key");
    assert_eq!(config.api_key, "test-key");
    assert_eq!(config.timeout, ClientConfig::DEFAULT_TIMEOUT);
    assert_eq!(config.max_retries, ClientConfig::DEFAULT_MAX_RETRIES);
    assert_eq!(config.backoff, Backoff::default());
    assert!(config.user_agent.starts_with("perplexity-rust/"));
    assert!(config.default_headers.is_empty());
    assert!(config.http_client.is_none());
}

#[test]
fn test_config_builder() {
    let backoff = Backoff::new(Duration::from_millis(1), Duration::from_millis(4));
    let config = ClientConfig::new("test-key")
        .base_url("https://custom.api.com")
        .timeout(Duration::from_secs(30))
        .max_retries(5)
        .user_agent("my-app/1.0")
        .header("X-Team", "search")
        .backoff(backoff);

    assert_eq!(config.base_url, "https://custom.api.com");
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.max_retries, 5);
    assert_eq!(config.user_agent, "my-app/1.0");
    assert_eq!(
        config.default_headers.get("X-Team").map(String::as_str),
        Some("search")
    );
    assert_eq!(config.backoff, backoff);
}

#[test]
fn test_debug_redacts_api_key() {
    let config = ClientConfig::new("super-secret-key");
    let debug = format!("{config:?}");
    assert!(!debug.contains("super-secret-key"));
    assert!(debug.contains("[REDACTED]"));
}
