use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_minimal_params_omit_unset_fields() {
    let params = CompletionParams::new("sonar", vec![ChatMessage::user("Hi")]);
    let json = serde_json::to_value(&params).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "model": "sonar",
            "messages": [{"role": "user", "content": "Hi"}]
        })
    );
}

#[test]
fn test_builder_setters() {
    let params = CompletionParams::new("sonar-pro", vec![ChatMessage::user("Hi")])
        .max_tokens(256)
        .temperature(0.2)
        .stop(vec!["END".to_string(), "STOP".to_string()])
        .search_mode(SearchMode::Academic)
        .search_recency_filter(SearchRecencyFilter::Week)
        .reasoning_effort(ReasoningEffort::High)
        .return_related_questions(true);
    let json = serde_json::to_value(&params).unwrap();
    assert_eq!(json["max_tokens"], 256);
    assert_eq!(json["temperature"], 0.2);
    assert_eq!(json["stop"], serde_json::json!(["END", "STOP"]));
    assert_eq!(json["search_mode"], "academic");
    assert_eq!(json["search_recency_filter"], "week");
    assert_eq!(json["reasoning_effort"], "high");
    assert_eq!(json["return_related_questions"], true);
    assert!(json.get("stream").is_none());
}

#[test]
fn test_stop_single_and_multiple() {
    assert_eq!(serde_json::to_value(Stop::from("x")).unwrap(), "x");
    let stop: Stop = serde_json::from_str(r#"["a","b"]"#).unwrap();
    assert_eq!(stop, Stop::Multiple(vec!["a".to_string(), "b".to_string()]));
    let stop: Stop = serde_json::from_str(r#""a""#).unwrap();
    assert_eq!(stop, Stop::Single("a".to_string()));
}

#[test]
fn test_web_search_options() {
    let options = WebSearchOptions {
        user_location: Some(UserLocation {
            latitude: 48.85,
            longitude: 2.35,
        }),
        search_context_size: Some(SearchContextSize::High),
        search_type: Some(SearchType::Pro),
        ..Default::default()
    };
    let json = serde_json::to_value(&options).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "user_location": {"latitude": 48.85, "longitude": 2.35},
            "search_context_size": "high",
            "search_type": "pro"
        })
    );
}

#[test]
fn test_response_format() {
    let format = ResponseFormat::json_schema(JsonSchema {
        name: "answer".to_string(),
        description: None,
        schema: serde_json::json!({"type": "object"}),
        strict: Some(true),
    });
    let json = serde_json::to_value(&format).unwrap();
    assert_eq!(json["type"], "json_schema");
    assert_eq!(json["json_schema"]["name"], "answer");
    assert!(json.get("regex").is_none());

    let json = serde_json::to_value(ResponseFormat::regex("^[0-9]+$")).unwrap();
    assert_eq!(json, serde_json::json!({"type": "regex", "regex": {"pattern": "^[0-9]+$"}}));
}

#[test]
fn test_tools_serialization() {
    let params = CompletionParams::new("sonar", vec![ChatMessage::user("weather?")])
        .tools(vec![Tool::function(
            "get_weather",
            Some("Current weather".to_string()),
            Some(serde_json::json!({"type": "object"})),
        )])
        .tool_choice(ToolChoice::Auto);
    let json = serde_json::to_value(&params).unwrap();
    assert_eq!(json["tools"][0]["type"], "function");
    assert_eq!(json["tools"][0]["function"]["name"], "get_weather");
    assert_eq!(json["tool_choice"], "auto");
}
