use super::*;
use futures::stream;
use pretty_assertions::assert_eq;

fn decoder_from(chunks: &[&'static str]) -> SseDecoder {
    let chunks: Vec<std::result::Result<Bytes, PerplexityError>> = chunks
        .iter()
        .map(|c| Ok(Bytes::from_static(c.as_bytes())))
        .collect();
    SseDecoder::new(stream::iter(chunks))
}

// =========================================================================
// ServerSentEvent Tests
// =========================================================================

#[test]
fn test_sse_default_event_type() {
    let sse = ServerSentEvent::with_data("hello");
    assert_eq!(sse.event, "message");
    assert_eq!(sse.data, "hello");
    assert!(sse.id.is_none());
}

#[test]
fn test_sse_is_done() {
    assert!(ServerSentEvent::with_data("[DONE]").is_done());
    assert!(ServerSentEvent::with_data("[DONE] trailing").is_done());
    assert!(!ServerSentEvent::with_data("hello").is_done());
}

#[test]
fn test_sse_is_error() {
    let sse = ServerSentEvent {
        event: "error".to_string(),
        ..ServerSentEvent::with_data("oops")
    };
    assert!(sse.is_error());
    assert!(!ServerSentEvent::with_data("oops").is_error());
}

#[test]
fn test_sse_json() {
    let sse = ServerSentEvent::with_data(r#"{"key": "value"}"#);
    let parsed: serde_json::Value = sse.json().unwrap();
    assert_eq!(parsed["key"], "value");
}

#[test]
fn test_sse_json_empty_data() {
    let sse = ServerSentEvent::with_data("");
    let result = sse.json::<serde_json::Value>();
    assert!(matches!(result, Err(PerplexityError::Parse(_))));
}

#[test]
fn test_sse_display_wire_form() {
    let sse = ServerSentEvent {
        event: "update".to_string(),
        data: "line1\nline2".to_string(),
        id: Some("7".to_string()),
        retry: None,
    };
    assert_eq!(sse.to_string(), "event: update\nid: 7\ndata: line1\ndata: line2\n");
}

// =========================================================================
// SseDecoder Tests
// =========================================================================

#[tokio::test]
async fn test_decoder_basic_event() {
    let mut decoder = decoder_from(&["data: hello world\n\n"]);
    let event = decoder.decode().await.unwrap().unwrap();
    assert_eq!(event, ServerSentEvent::with_data("hello world"));
    assert!(decoder.decode().await.unwrap().is_none());
}

#[tokio::test]
async fn test_decoder_error_event() {
    let mut decoder = decoder_from(&["event: error\ndata: oops\n\n"]);
    let event = decoder.decode().await.unwrap().unwrap();
    assert_eq!(event.event, "error");
    assert_eq!(event.data, "oops");
    assert!(event.is_error());
}

#[tokio::test]
async fn test_decoder_done_event() {
    let mut decoder = decoder_from(&["data: [DONE]\n\n"]);
    let event = decoder.decode().await.unwrap().unwrap();
    assert!(event.is_done());
}

#[tokio::test]
async fn test_decoder_multiline_data() {
    let mut decoder = decoder_from(&["data: line1\ndata: line2\ndata: line3\n\n"]);
    let event = decoder.decode().await.unwrap().unwrap();
    assert_eq!(event.data, "line1\nline2\nline3");
}

#[tokio::test]
async fn test_decoder_display_round_trip() {
    let original = ServerSentEvent {
        event: "update".to_string(),
        data: "first\nsecond\n{\"k\": 1}".to_string(),
        id: Some("42".to_string()),
        retry: None,
    };
    let wire: &'static str = Box::leak(format!("{original}\n").into_boxed_str());
    let mut decoder = decoder_from(&[wire]);
    let decoded = decoder.decode().await.unwrap().unwrap();
    assert_eq!(decoded, original);
}

#[tokio::test]
async fn test_decoder_id_and_retry_fields() {
    let mut decoder = decoder_from(&["id: event-123\nretry: 5000\ndata: test\n\n"]);
    let event = decoder.decode().await.unwrap().unwrap();
    assert_eq!(event.id.as_deref(), Some("event-123"));
    assert_eq!(event.retry, Some(5000));
}

#[tokio::test]
async fn test_decoder_id_does_not_carry_over() {
    let mut decoder = decoder_from(&["id: 1\ndata: first\n\ndata: second\n\n"]);
    let first = decoder.decode().await.unwrap().unwrap();
    let second = decoder.decode().await.unwrap().unwrap();
    assert_eq!(first.id.as_deref(), Some("1"));
    assert!(second.id.is_none());
}

#[tokio::test]
async fn test_decoder_comment_ignored() {
    let mut decoder = decoder_from(&[": keep-alive\ndata: actual data\n\n"]);
    let event = decoder.decode().await.unwrap().unwrap();
    assert_eq!(event.data, "actual data");
}

#[tokio::test]
async fn test_decoder_line_without_colon_ignored() {
    let mut decoder = decoder_from(&["garbage\ndata: kept\n\n"]);
    let event = decoder.decode().await.unwrap().unwrap();
    assert_eq!(event.data, "kept");
}

#[tokio::test]
async fn test_decoder_unknown_field_ignored() {
    let mut decoder = decoder_from(&["unknown: value\ndata: test\n\n"]);
    let event = decoder.decode().await.unwrap().unwrap();
    assert_eq!(event, ServerSentEvent::with_data("test"));
}

#[tokio::test]
async fn test_decoder_colon_in_value() {
    let mut decoder = decoder_from(&["data: {\"key\": \"value\"}\n\n"]);
    let event = decoder.decode().await.unwrap().unwrap();
    assert_eq!(event.data, "{\"key\": \"value\"}");
}

#[tokio::test]
async fn test_decoder_only_one_leading_space_stripped() {
    let mut decoder = decoder_from(&["data:no space\n\ndata:  two spaces\n\n"]);
    assert_eq!(decoder.decode().await.unwrap().unwrap().data, "no space");
    assert_eq!(decoder.decode().await.unwrap().unwrap().data, " two spaces");
}

#[tokio::test]
async fn test_decoder_skips_blank_lines_between_events() {
    let mut decoder = decoder_from(&["\n\n\ndata: a\n\n\n\n\ndata: b\n\n"]);
    let events = decoder.decode_all().await.unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].data, "a");
    assert_eq!(events[1].data, "b");
}

#[tokio::test]
async fn test_decoder_event_without_data_is_emitted() {
    let mut decoder = decoder_from(&["event: ping\n\n"]);
    let event = decoder.decode().await.unwrap().unwrap();
    assert_eq!(event.event, "ping");
    assert_eq!(event.data, "");
}

#[tokio::test]
async fn test_decoder_crlf_line_endings() {
    let mut decoder = decoder_from(&["data: hello\r\n\r\n"]);
    let event = decoder.decode().await.unwrap().unwrap();
    assert_eq!(event.data, "hello");
}

#[tokio::test]
async fn test_decoder_partial_chunks() {
    let mut decoder = decoder_from(&["event: te", "st\nda", "ta: hel", "lo\n", "\n"]);
    let event = decoder.decode().await.unwrap().unwrap();
    assert_eq!(event.event, "test");
    assert_eq!(event.data, "hello");
    assert!(decoder.decode().await.unwrap().is_none());
}

#[tokio::test]
async fn test_decoder_pending_data_at_eof() {
    let mut decoder = decoder_from(&["data: tail\n"]);
    let event = decoder.decode().await.unwrap().unwrap();
    assert_eq!(event.data, "tail");
    assert!(decoder.decode().await.unwrap().is_none());
}

#[tokio::test]
async fn test_decoder_unterminated_last_line() {
    let mut decoder = decoder_from(&["data: first\n\ndata: last"]);
    let events = decoder.decode_all().await.unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].data, "last");
}

#[tokio::test]
async fn test_decoder_eof_without_data_ends_stream() {
    let mut decoder = decoder_from(&["event: orphan\n"]);
    assert!(decoder.decode().await.unwrap().is_none());
    assert!(decoder.decode().await.unwrap().is_none());
}

#[tokio::test]
async fn test_decoder_empty_input() {
    let mut decoder = decoder_from(&[]);
    assert!(decoder.decode().await.unwrap().is_none());
    assert!(decoder.decode_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_decoder_invalid_utf8() {
    let chunks: Vec<std::result::Result<Bytes, PerplexityError>> =
        vec![Ok(Bytes::from_static(b"data: \xff\xfe\n\n"))];
    let mut decoder = SseDecoder::new(stream::iter(chunks));
    let result = decoder.decode().await;
    assert!(matches!(result, Err(PerplexityError::Parse(_))));
}

#[tokio::test]
async fn test_decode_all_propagates_transport_error() {
    let chunks: Vec<std::result::Result<Bytes, PerplexityError>> = vec![
        Ok(Bytes::from_static(b"data: one\n\n")),
        Err(PerplexityError::Cancelled),
    ];
    let mut decoder = SseDecoder::new(stream::iter(chunks));
    let result = decoder.decode_all().await;
    assert!(matches!(result, Err(PerplexityError::Cancelled)));
}

#[tokio::test]
async fn test_decoder_close_is_idempotent() {
    let mut decoder = decoder_from(&["data: a\n\n"]);
    assert!(decoder.is_open());
    decoder.close();
    decoder.close();
    assert!(!decoder.is_open());
    assert!(decoder.decode().await.unwrap().is_none());
}
