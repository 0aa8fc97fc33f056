use super::*;
use crate::types::ChatMessage;
use pretty_assertions::assert_eq;

#[test]
fn test_status_wire_names() {
    assert_eq!(
        serde_json::to_value(AsyncCompletionStatus::InProgress).unwrap(),
        "IN_PROGRESS"
    );
    let status: AsyncCompletionStatus = serde_json::from_str(r#""FAILED""#).unwrap();
    assert_eq!(status, AsyncCompletionStatus::Failed);
    assert!(status.is_terminal());
    assert!(!AsyncCompletionStatus::Created.is_terminal());
}

#[test]
fn test_unknown_status_is_not_terminal() {
    let status: AsyncCompletionStatus = serde_json::from_str(r#""CANCELLED""#).unwrap();
    assert_eq!(status, AsyncCompletionStatus::Unknown);
    assert!(!status.is_terminal());
}

#[test]
fn test_create_params_serialization() {
    let params = AsyncCompletionParams::new(CompletionParams::new(
        "sonar-deep-research",
        vec![ChatMessage::user("Summarize")],
    ))
    .idempotency_key("key-1");
    let json = serde_json::to_value(&params).unwrap();
    assert_eq!(json["request"]["model"], "sonar-deep-research");
    assert_eq!(json["idempotency_key"], "key-1");
}

#[test]
fn test_completed_response_deserialization() {
    let json = r#"{
        "id": "req-1",
        "created_at": 100,
        "model": "sonar-deep-research",
        "status": "COMPLETED",
        "completed_at": 160,
        "response": {
            "id": "cmpl-1",
            "model": "sonar-deep-research",
            "created": 160,
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Done"}}]
        }
    }"#;
    let completion: AsyncCompletion = serde_json::from_str(json).unwrap();
    assert_eq!(completion.status, AsyncCompletionStatus::Completed);
    assert_eq!(completion.completed_at, Some(160));
    assert_eq!(completion.response.map(|r| r.text()).as_deref(), Some("Done"));
}

#[test]
fn test_list_deserialization() {
    let json = r#"{
        "requests": [
            {"id": "a", "created_at": 1, "model": "m", "status": "CREATED"},
            {"id": "b", "created_at": 2, "model": "m", "status": "IN_PROGRESS", "started_at": 3}
        ],
        "next_token": "tok"
    }"#;
    let list: AsyncCompletionList = serde_json::from_str(json).unwrap();
    assert_eq!(list.requests.len(), 2);
    assert_eq!(list.requests[1].started_at, Some(3));
    assert_eq!(list.next_token.as_deref(), Some("tok"));
}

#[test]
fn test_get_params_headers() {
    let params = AsyncGetParams {
        client_name: Some("cli".to_string()),
        user_id: Some("u-1".to_string()),
        ..Default::default()
    };
    assert_eq!(
        params.headers(),
        vec![("x-client-name", "cli"), ("x-user-id", "u-1")]
    );
    assert!(AsyncGetParams::default().headers().is_empty());
}
