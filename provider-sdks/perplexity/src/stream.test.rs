use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use bytes::Bytes;
use futures::StreamExt;
use futures::stream;
use pretty_assertions::assert_eq;

use super::*;
use crate::sse::ByteStream;

fn chunk_event(id: &str, text: &str) -> String {
    let payload = serde_json::json!({
        "id": id,
        "model": "sonar",
        "created": 1,
        "choices": [{"index": 0, "delta": {"role": "assistant", "content": text}}]
    });
    format!("data: {payload}\n\n")
}

fn three_chunks_then_done() -> Vec<String> {
    vec![
        chunk_event("c1", "Hello"),
        chunk_event("c2", ", "),
        chunk_event("c3", "world"),
        "data: [DONE]\n\n".to_string(),
    ]
}

fn body_from(events: Vec<String>) -> ByteStream {
    let chunks: Vec<Result<Bytes>> = events.into_iter().map(|e| Ok(Bytes::from(e))).collect();
    Box::pin(stream::iter(chunks))
}

fn response(body: ByteStream) -> StreamingResponse {
    StreamingResponse {
        status: 200,
        headers: HeaderMap::new(),
        request_id: Some("req-stream".to_string()),
        body,
    }
}

fn stream_over(events: Vec<String>) -> ChatStream {
    ChatStream::new(response(body_from(events)), CancellationToken::new())
}

/// Sets its flag when dropped, i.e. when the body owning it is released.
struct ReleaseFlag(Arc<AtomicBool>);

impl Drop for ReleaseFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// A body that yields `events` and then never ends, plus a flag that is set
/// once the body has been dropped.
fn tracked_body(events: Vec<String>) -> (ByteStream, Arc<AtomicBool>) {
    let released = Arc::new(AtomicBool::new(false));
    let guard = ReleaseFlag(Arc::clone(&released));
    let chunks: Vec<Result<Bytes>> = events.into_iter().map(|e| Ok(Bytes::from(e))).collect();
    let body = stream::iter(chunks)
        .chain(stream::pending())
        .map(move |item| {
            let _guard = &guard;
            item
        });
    (Box::pin(body), released)
}

async fn wait_for_release(released: &AtomicBool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !released.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("body should be released");
}

#[tokio::test]
async fn test_next_yields_chunks_then_done() {
    let mut stream = stream_over(three_chunks_then_done());
    assert_eq!(stream.status(), 200);
    assert_eq!(stream.request_id(), Some("req-stream"));

    let mut texts = Vec::new();
    while let Some(chunk) = stream.next().await.unwrap() {
        texts.push(chunk.text());
    }
    assert_eq!(texts, vec!["Hello", ", ", "world"]);
    assert!(stream.is_terminated());

    // Terminal state is sticky.
    assert!(stream.next().await.unwrap().is_none());
    assert!(stream.next().await.unwrap().is_none());
}

#[tokio::test]
async fn test_end_of_body_without_done_marker_is_graceful() {
    let mut stream = stream_over(vec![chunk_event("c1", "only")]);
    assert_eq!(stream.next().await.unwrap().map(|c| c.id).as_deref(), Some("c1"));
    assert!(stream.next().await.unwrap().is_none());
}

#[tokio::test]
async fn test_iter_yields_chunks_then_closes() {
    let stream = stream_over(three_chunks_then_done());
    let mut rx = stream.iter();

    let mut ids = Vec::new();
    while let Some(chunk) = rx.recv().await {
        ids.push(chunk.id);
    }
    assert_eq!(ids, vec!["c1", "c2", "c3"]);
}

#[tokio::test]
async fn test_into_stream_adapter() {
    let chunks: Vec<_> = stream_over(three_chunks_then_done())
        .into_stream()
        .collect()
        .await;
    assert_eq!(chunks.len(), 3);
    assert!(chunks.iter().all(std::result::Result::is_ok));
}

#[tokio::test]
async fn test_collect_all_chunks() {
    let chunks = stream_over(three_chunks_then_done()).collect().await.unwrap();
    let text: String = chunks.iter().map(StreamChunk::text).collect();
    assert_eq!(text, "Hello, world");
}

#[tokio::test]
async fn test_cancel_after_first_chunk_is_sticky() {
    // One chunk, then a body that never produces more bytes.
    let first: Vec<Result<Bytes>> = vec![Ok(Bytes::from(chunk_event("c1", "Hi")))];
    let body: ByteStream = Box::pin(stream::iter(first).chain(stream::pending()));
    let cancel = CancellationToken::new();
    let mut stream = ChatStream::new(response(body), cancel.clone());

    assert!(stream.next().await.unwrap().is_some());
    cancel.cancel();

    assert!(stream.next().await.unwrap_err().is_cancelled());
    assert!(stream.next().await.unwrap_err().is_cancelled());
    assert!(stream.is_terminated());
}

#[tokio::test]
async fn test_cancel_while_waiting_for_bytes() {
    let body: ByteStream = Box::pin(stream::pending());
    let cancel = CancellationToken::new();
    let mut stream = ChatStream::new(response(body), cancel.clone());

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let err = tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await
        .expect("next should return once cancelled")
        .unwrap_err();
    assert!(err.is_cancelled());
}

#[tokio::test]
async fn test_iter_stops_on_cancel() {
    let (body, released) = tracked_body(vec![chunk_event("c1", "Hi")]);
    let cancel = CancellationToken::new();
    let mut rx = ChatStream::new(response(body), cancel.clone()).iter();

    assert_eq!(rx.recv().await.map(|c| c.id).as_deref(), Some("c1"));
    cancel.cancel();
    let closed = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("producer should exit after cancellation");
    assert!(closed.is_none());
    wait_for_release(&released).await;
}

#[tokio::test]
async fn test_iter_producer_exits_when_receiver_dropped() {
    let (body, released) = tracked_body(Vec::new());
    let rx = ChatStream::new(response(body), CancellationToken::new()).iter();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!released.load(Ordering::SeqCst));

    drop(rx);
    wait_for_release(&released).await;
}

#[tokio::test]
async fn test_iter_producer_exits_when_receiver_dropped_mid_stream() {
    let (body, released) = tracked_body(vec![chunk_event("c1", "a"), chunk_event("c2", "b")]);
    let mut rx = ChatStream::new(response(body), CancellationToken::new()).iter();
    assert_eq!(rx.recv().await.map(|c| c.id).as_deref(), Some("c1"));

    drop(rx);
    wait_for_release(&released).await;
}

#[tokio::test]
async fn test_unrecognised_chunk_type_does_not_end_stream() {
    let reasoning = serde_json::json!({
        "id": "c1",
        "type": "reasoning",
        "status": "IN_PROGRESS",
        "choices": []
    });
    let mut stream = stream_over(vec![
        format!("data: {reasoning}\n\n"),
        chunk_event("c2", "answer"),
        "data: [DONE]\n\n".to_string(),
    ]);

    let first = stream.next().await.unwrap().expect("first chunk");
    assert_eq!(first.chunk_type, Some(crate::types::ChunkType::Unknown));
    let second = stream.next().await.unwrap().expect("second chunk");
    assert_eq!(second.id, "c2");
    assert_eq!(second.text(), "answer");
    assert!(stream.next().await.unwrap().is_none());
}

#[tokio::test]
async fn test_error_event_carries_payload() {
    let mut stream = stream_over(vec![
        chunk_event("c1", "partial"),
        "event: error\ndata: something went wrong\n\n".to_string(),
    ]);
    assert!(stream.next().await.unwrap().is_some());

    let err = stream.next().await.unwrap_err();
    assert!(matches!(err, PerplexityError::Stream(_)));
    assert!(err.to_string().contains("something went wrong"));

    let again = stream.next().await.unwrap_err();
    assert_eq!(again.to_string(), err.to_string());
}

#[tokio::test]
async fn test_malformed_payload_is_sticky() {
    let mut stream = stream_over(vec![
        "data: {not json\n\n".to_string(),
        chunk_event("c2", "never read"),
    ]);
    let err = stream.next().await.unwrap_err();
    assert!(matches!(err, PerplexityError::Parse(_)));
    assert!(matches!(
        stream.next().await,
        Err(PerplexityError::Parse(_))
    ));
}

#[tokio::test]
async fn test_transport_error_mid_stream() {
    let chunks: Vec<Result<Bytes>> = vec![
        Ok(Bytes::from(chunk_event("c1", "Hi"))),
        Err(crate::error::ApiError::transport(
            crate::error::ErrorKind::Connection,
            "connection reset",
            None,
        )
        .into()),
    ];
    let mut stream = ChatStream::new(
        response(Box::pin(stream::iter(chunks))),
        CancellationToken::new(),
    );
    assert!(stream.next().await.unwrap().is_some());
    let err = stream.next().await.unwrap_err();
    assert_eq!(err.kind(), Some(crate::error::ErrorKind::Connection));
}

#[tokio::test]
async fn test_close_is_safe_any_number_of_times() {
    // Never read.
    let mut stream = stream_over(three_chunks_then_done());
    assert!(!stream.is_terminated());
    stream.close();
    stream.close();
    assert!(stream.is_terminated());
    assert!(stream.next().await.unwrap().is_none());

    // Read to completion.
    let mut stream = stream_over(three_chunks_then_done());
    while stream.next().await.unwrap().is_some() {}
    stream.close();
    stream.close();

    assert!(stream.is_terminated());

    // Never closed explicitly.
    let stream = stream_over(three_chunks_then_done());
    drop(stream);
}

#[tokio::test]
async fn test_close_releases_body_and_keeps_error() {
    let (body, released) = tracked_body(Vec::new());
    let mut stream = ChatStream::new(response(body), CancellationToken::new());
    stream.close();
    assert!(released.load(Ordering::SeqCst));

    let mut failed = stream_over(vec!["data: {not json\n\n".to_string()]);
    assert!(failed.next().await.is_err());
    failed.close();
    assert!(matches!(failed.next().await, Err(PerplexityError::Parse(_))));
}
