use super::*;
use crate::types::SearchResultSource;
use pretty_assertions::assert_eq;

#[test]
fn test_streamed_chunk_deserialization() {
    let json = r#"{
        "id": "chunk-1",
        "model": "sonar",
        "created": 1700000000,
        "object": "chat.completion.chunk",
        "choices": [{"index": 0, "delta": {"role": "assistant", "content": "Hel"}}]
    }"#;
    let chunk: StreamChunk = serde_json::from_str(json).unwrap();
    assert_eq!(chunk.id, "chunk-1");
    assert_eq!(chunk.model, "sonar");
    assert_eq!(chunk.created, 1_700_000_000);
    assert_eq!(chunk.object.as_deref(), Some("chat.completion.chunk"));
    assert_eq!(chunk.text(), "Hel");
    assert!(chunk.finish_reason().is_none());
    assert!(chunk.usage.is_none());
}

#[test]
fn test_full_completion_deserialization() {
    let json = r#"{
        "id": "cmpl-1",
        "model": "sonar-pro",
        "created": 1,
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": "Paris is the capital of France."},
            "finish_reason": "stop"
        }],
        "citations": ["https://en.wikipedia.org/wiki/Paris"],
        "search_results": [{"title": "Paris", "url": "https://en.wikipedia.org/wiki/Paris", "source": "web"}],
        "usage": {
            "prompt_tokens": 10,
            "completion_tokens": 7,
            "total_tokens": 17,
            "cost": {"input_tokens_cost": 0.001, "output_tokens_cost": 0.002, "total_cost": 0.003}
        },
        "status": "COMPLETED",
        "type": "end_of_stream"
    }"#;
    let chunk: StreamChunk = serde_json::from_str(json).unwrap();
    assert_eq!(chunk.text(), "Paris is the capital of France.");
    assert_eq!(chunk.finish_reason(), Some(FinishReason::Stop));
    assert_eq!(chunk.citations.len(), 1);
    assert_eq!(chunk.search_results[0].source, Some(SearchResultSource::Web));
    assert_eq!(chunk.status, Some(ChunkStatus::Completed));
    assert_eq!(chunk.chunk_type, Some(ChunkType::EndOfStream));

    let usage = chunk.usage.unwrap();
    assert_eq!(usage.total_tokens, 17);
    assert_eq!(usage.cost.total_cost, 0.003);
    assert!(usage.reasoning_tokens.is_none());
}

#[test]
fn test_unknown_finish_reason() {
    let choice: Choice = serde_json::from_str(r#"{"finish_reason": "content_filter"}"#).unwrap();
    assert_eq!(choice.finish_reason, Some(FinishReason::Unknown));
}

#[test]
fn test_unknown_type_and_status_still_decode() {
    let json = r#"{
        "id": "c1",
        "type": "reasoning",
        "status": "IN_PROGRESS",
        "choices": [{"index": 0, "delta": {"role": "narrator", "content": "thinking"}}],
        "search_results": [{"title": "t", "url": "https://example.com", "source": "video"}]
    }"#;
    let chunk: StreamChunk = serde_json::from_str(json).unwrap();
    assert_eq!(chunk.chunk_type, Some(ChunkType::Unknown));
    assert_eq!(chunk.status, Some(ChunkStatus::Unknown));
    assert_eq!(chunk.choices[0].delta.role, crate::types::Role::Unknown);
    assert_eq!(chunk.search_results[0].source, Some(SearchResultSource::Unknown));
    assert_eq!(chunk.text(), "thinking");
}

#[test]
fn test_known_type_and_status() {
    let chunk: StreamChunk =
        serde_json::from_str(r#"{"type": "end_of_stream", "status": "COMPLETED"}"#).unwrap();
    assert_eq!(chunk.chunk_type, Some(ChunkType::EndOfStream));
    assert_eq!(chunk.status, Some(ChunkStatus::Completed));
}

#[test]
fn test_text_of_empty_chunk() {
    assert_eq!(StreamChunk::default().text(), "");
}

#[test]
fn test_chunk_with_reasoning_steps() {
    let json = r#"{
        "id": "c",
        "choices": [{
            "delta": {
                "content": "",
                "reasoning_steps": [{
                    "thought": "Look it up",
                    "type": "web_search",
                    "web_search": {"search_keywords": ["rust"], "search_results": []}
                }]
            }
        }]
    }"#;
    let chunk: StreamChunk = serde_json::from_str(json).unwrap();
    let step = &chunk.choices[0].delta.reasoning_steps[0];
    assert_eq!(step.thought, "Look it up");
    assert_eq!(step.step_type.as_deref(), Some("web_search"));
    assert_eq!(
        step.web_search.as_ref().map(|w| w.search_keywords.clone()),
        Some(vec!["rust".to_string()])
    );
}
