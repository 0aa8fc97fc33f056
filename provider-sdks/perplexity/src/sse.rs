//! Server-Sent Events decoding for streaming responses.
//!
//! ## Wire Format
//!
//! ```text
//! event: message
//! data: {"key": "value"}
//! id: 123
//!
//! ```
//!
//! - Lines end with `\n`; a single trailing `\r` is stripped
//! - Lines starting with `:` are comments (ignored)
//! - Fields: `event`, `data`, `id`, `retry`; a line without `:` is ignored
//! - Multiple `data:` lines are joined with `\n`
//! - A blank line ends an event once any of `data`, `event` or `id` was seen
//! - Every event is decoded from scratch; nothing carries over between events

use std::fmt;
use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;
use futures::StreamExt;
use serde::de::DeserializeOwned;

use crate::error::PerplexityError;
use crate::error::Result;

/// Event type used when the stream does not name one.
pub const DEFAULT_EVENT_TYPE: &str = "message";

/// Data prefix the API uses to mark the end of a stream.
pub const DONE_MARKER: &str = "[DONE]";

/// Boxed body byte stream, with transport errors already classified.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

// =============================================================================
// ServerSentEvent
// =============================================================================

/// A decoded Server-Sent Event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSentEvent {
    /// Event type (from "event:" field), `"message"` when absent.
    pub event: String,
    /// Event data (from "data:" fields, joined with newlines).
    pub data: String,
    /// Event ID (from "id:" field).
    pub id: Option<String>,
    /// Reconnection hint in milliseconds (from "retry:" field).
    pub retry: Option<u64>,
}

impl Default for ServerSentEvent {
    fn default() -> Self {
        Self {
            event: DEFAULT_EVENT_TYPE.to_string(),
            data: String::new(),
            id: None,
            retry: None,
        }
    }
}

impl ServerSentEvent {
    /// Create a new SSE with data and the default event type.
    pub fn with_data(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            ..Default::default()
        }
    }

    /// Check if this is the `[DONE]` marker.
    pub fn is_done(&self) -> bool {
        self.data.starts_with(DONE_MARKER)
    }

    /// Check if the server flagged this event as an error.
    pub fn is_error(&self) -> bool {
        self.event == "error"
    }

    /// Parse the data as JSON.
    ///
    /// # Errors
    ///
    /// Returns `PerplexityError::Parse` if the data is empty or not valid JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        if self.data.is_empty() {
            return Err(PerplexityError::Parse("event data is empty".to_string()));
        }
        serde_json::from_str(&self.data).map_err(|e| {
            PerplexityError::Parse(format!(
                "failed to parse SSE data as JSON: {e}\nData: {}",
                self.data
            ))
        })
    }
}

impl fmt::Display for ServerSentEvent {
    /// Render the event back to its wire form (without the closing blank line).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.event != DEFAULT_EVENT_TYPE {
            writeln!(f, "event: {}", self.event)?;
        }
        if let Some(id) = &self.id {
            writeln!(f, "id: {id}")?;
        }
        if !self.data.is_empty() {
            for line in self.data.split('\n') {
                writeln!(f, "data: {line}")?;
            }
        }
        Ok(())
    }
}

// =============================================================================
// SseDecoder
// =============================================================================

/// Pull-based SSE decoder over a response body.
///
/// Each [`decode`](Self::decode) call reads just enough of the body to
/// produce the next event. Lines may be split across body chunks.
pub struct SseDecoder {
    /// Body stream; `None` once exhausted or closed.
    inner: Option<ByteStream>,
    /// Bytes received but not yet consumed as lines.
    buffer: Vec<u8>,
}

impl fmt::Debug for SseDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SseDecoder")
            .field("open", &self.inner.is_some())
            .field("buffered", &self.buffer.len())
            .finish()
    }
}

impl SseDecoder {
    /// Create a decoder reading from a byte stream.
    pub fn new<S, E>(byte_stream: S) -> Self
    where
        S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
        E: Into<PerplexityError>,
    {
        Self {
            inner: Some(Box::pin(byte_stream.map(|chunk| chunk.map_err(Into::into)))),
            buffer: Vec::new(),
        }
    }

    /// Decode the next event.
    ///
    /// Returns `Ok(None)` at end of input. If the input ends while data lines
    /// are pending, those are returned as a final event first.
    pub async fn decode(&mut self) -> Result<Option<ServerSentEvent>> {
        let mut event_type: Option<String> = None;
        let mut data_lines: Vec<String> = Vec::new();
        let mut id: Option<String> = None;
        let mut retry: Option<u64> = None;

        loop {
            let Some(line) = self.next_line().await? else {
                if data_lines.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(build_event(event_type, data_lines, id, retry)));
            };

            if line.is_empty() {
                if !data_lines.is_empty() || event_type.is_some() || id.is_some() {
                    return Ok(Some(build_event(event_type, data_lines, id, retry)));
                }
                continue;
            }

            if line.starts_with(':') {
                continue;
            }

            let Some((field, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.strip_prefix(' ').unwrap_or(value);

            match field {
                "event" => event_type = Some(value.to_string()),
                "data" => data_lines.push(value.to_string()),
                "id" => id = Some(value.to_string()),
                "retry" => retry = value.parse().ok(),
                _ => {}
            }
        }
    }

    /// Decode every remaining event until end of input.
    pub async fn decode_all(&mut self) -> Result<Vec<ServerSentEvent>> {
        let mut events = Vec::new();
        while let Some(event) = self.decode().await? {
            events.push(event);
        }
        Ok(events)
    }

    /// Drop the underlying body. Idempotent.
    pub fn close(&mut self) {
        self.inner = None;
        self.buffer.clear();
    }

    /// Whether the body is still attached.
    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    /// Read the next line, without its terminator.
    ///
    /// At end of input an unterminated remainder is returned as a final line.
    async fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
                let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
                line.pop();
                return line_to_string(line).map(Some);
            }

            let Some(inner) = self.inner.as_mut() else {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                let line = std::mem::take(&mut self.buffer);
                return line_to_string(line).map(Some);
            };

            match inner.next().await {
                Some(Ok(bytes)) => self.buffer.extend_from_slice(&bytes),
                Some(Err(e)) => return Err(e),
                None => self.inner = None,
            }
        }
    }
}

fn line_to_string(mut line: Vec<u8>) -> Result<String> {
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    String::from_utf8(line)
        .map_err(|e| PerplexityError::Parse(format!("invalid UTF-8 in event stream: {e}")))
}

fn build_event(
    event_type: Option<String>,
    data_lines: Vec<String>,
    id: Option<String>,
    retry: Option<u64>,
) -> ServerSentEvent {
    ServerSentEvent {
        event: event_type.unwrap_or_else(|| DEFAULT_EVENT_TYPE.to_string()),
        data: data_lines.join("\n"),
        id,
        retry,
    }
}

#[cfg(test)]
#[path = "sse.test.rs"]
mod tests;
