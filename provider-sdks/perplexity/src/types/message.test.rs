use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_text_message_serialization() {
    let msg = ChatMessage::user("Hello");
    let json = serde_json::to_value(&msg).unwrap();
    assert_eq!(json, serde_json::json!({"role": "user", "content": "Hello"}));
}

#[test]
fn test_role_helpers() {
    assert_eq!(ChatMessage::system("a").role, Role::System);
    assert_eq!(ChatMessage::user("a").role, Role::User);
    assert_eq!(ChatMessage::assistant("a").role, Role::Assistant);
    assert_eq!(ChatMessage::tool("a").role, Role::Tool);
}

#[test]
fn test_deserialize_text_content() {
    let msg: ChatMessage =
        serde_json::from_str(r#"{"role": "assistant", "content": "Hi there"}"#).unwrap();
    assert_eq!(msg.role, Role::Assistant);
    assert_eq!(msg.content, MessageContent::Text("Hi there".to_string()));
    assert_eq!(msg.text(), "Hi there");
}

#[test]
fn test_deserialize_structured_content() {
    let json = r#"{
        "role": "user",
        "content": [
            {"type": "text", "text": "What is in this image?"},
            {"type": "image_url", "image_url": {"url": "https://example.com/a.png"}},
            {"type": "file_url", "file_url": "https://example.com/a.txt", "file_name": "a.txt"},
            {"type": "pdf_url", "pdf_url": {"url": "https://example.com/a.pdf"}},
            {"type": "video_url", "video_url": {"url": "https://example.com/a.mp4", "frame_interval": 2}}
        ]
    }"#;
    let msg: ChatMessage = serde_json::from_str(json).unwrap();
    let MessageContent::Structured(chunks) = &msg.content else {
        panic!("expected structured content");
    };
    assert_eq!(chunks.len(), 5);
    assert_eq!(chunks[0], ContentChunk::text("What is in this image?"));
    assert_eq!(
        chunks[1],
        ContentChunk::ImageUrl {
            image_url: UrlRef::Object {
                url: "https://example.com/a.png".to_string()
            }
        }
    );
    assert_eq!(
        chunks[2],
        ContentChunk::file_url("https://example.com/a.txt", Some("a.txt".to_string()))
    );
    assert_eq!(chunks[3].kind(), "pdf_url");
    assert_eq!(
        chunks[4],
        ContentChunk::video_url("https://example.com/a.mp4", Some(FrameInterval::Seconds(2)))
    );
    assert_eq!(msg.text(), "What is in this image?");
}

#[test]
fn test_unknown_chunk_type_rejected() {
    let json = r#"{"role": "user", "content": [{"type": "audio_url", "audio_url": "x"}]}"#;
    assert!(serde_json::from_str::<ChatMessage>(json).is_err());
}

#[test]
fn test_structured_content_serialization() {
    let msg = ChatMessage::user(vec![
        ContentChunk::text("Describe"),
        ContentChunk::image_url("https://example.com/a.png"),
    ]);
    let json = serde_json::to_value(&msg).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "role": "user",
            "content": [
                {"type": "text", "text": "Describe"},
                {"type": "image_url", "image_url": "https://example.com/a.png"}
            ]
        })
    );
}

#[test]
fn test_video_frame_interval_as_string() {
    let chunk: ContentChunk = serde_json::from_str(
        r#"{"type": "video_url", "video_url": {"url": "v.mp4", "frame_interval": "1s"}}"#,
    )
    .unwrap();
    let ContentChunk::VideoUrl { video_url } = chunk else {
        panic!("expected video chunk");
    };
    assert_eq!(video_url.url(), "v.mp4");
    assert_eq!(
        video_url,
        VideoUrl::Object {
            url: "v.mp4".to_string(),
            frame_interval: Some(FrameInterval::Text("1s".to_string())),
        }
    );
}

#[test]
fn test_null_and_missing_content_default_to_empty_text() {
    let msg: ChatMessage = serde_json::from_str(r#"{"role": "assistant", "content": null}"#).unwrap();
    assert!(msg.content.is_empty());

    let msg: ChatMessage = serde_json::from_str(r#"{}"#).unwrap();
    assert_eq!(msg.role, Role::Assistant);
    assert!(msg.content.is_empty());
}

#[test]
fn test_empty_optional_fields_omitted() {
    let json = serde_json::to_string(&ChatMessage::assistant("ok")).unwrap();
    assert!(!json.contains("reasoning_steps"));
    assert!(!json.contains("tool_calls"));
}
