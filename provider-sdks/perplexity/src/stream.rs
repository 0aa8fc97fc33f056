//! Streaming chat completions.
//!
//! A [`ChatStream`] owns one open response body and decodes it into
//! [`StreamChunk`]s. It can be consumed by pulling with
//! [`ChatStream::next`], as a [`futures::Stream`], or through the channel
//! returned by [`ChatStream::iter`].

use futures::Stream;
use reqwest::header::HeaderMap;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::PerplexityError;
use crate::error::Result;
use crate::http::StreamingResponse;
use crate::sse::SseDecoder;
use crate::types::StreamChunk;

/// Where a stream is in its lifecycle. `Done` and `Failed` are final.
#[derive(Debug, Clone)]
enum StreamState {
    Open,
    Done,
    Failed(PerplexityError),
}

// =============================================================================
// ChatStream
// =============================================================================

/// A live stream of chat completion chunks.
///
/// Once the stream ends, every later call to [`next`](Self::next) returns
/// the same result: `Ok(None)` after a graceful end, or a clone of the
/// recorded error. The body is released as soon as the stream ends, on
/// [`close`](Self::close), or when the stream is dropped.
#[derive(Debug)]
pub struct ChatStream {
    decoder: SseDecoder,
    cancel: CancellationToken,
    state: StreamState,
    status: u16,
    headers: HeaderMap,
    request_id: Option<String>,
}

impl ChatStream {
    /// Wrap an open streaming response.
    pub fn new(response: StreamingResponse, cancel: CancellationToken) -> Self {
        Self {
            decoder: SseDecoder::new(response.body),
            cancel,
            state: StreamState::Open,
            status: response.status,
            headers: response.headers,
            request_id: response.request_id,
        }
    }

    /// HTTP status of the response that opened the stream.
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Request-correlation id of the response that opened the stream.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Whether the stream has ended, gracefully or with an error.
    pub fn is_terminated(&self) -> bool {
        !matches!(self.state, StreamState::Open)
    }

    /// Read the next chunk.
    ///
    /// Returns `Ok(None)` when the server sends `[DONE]` or closes the body.
    /// A server `error` event becomes [`PerplexityError::Stream`] carrying the
    /// event payload; an unparsable payload becomes
    /// [`PerplexityError::Parse`]. Cancellation yields
    /// [`PerplexityError::Cancelled`], including while waiting for bytes.
    pub async fn next(&mut self) -> Result<Option<StreamChunk>> {
        match &self.state {
            StreamState::Open => {}
            StreamState::Done => return Ok(None),
            StreamState::Failed(err) => return Err(err.clone()),
        }

        if self.cancel.is_cancelled() {
            return self.fail(PerplexityError::Cancelled);
        }

        let decoded = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(PerplexityError::Cancelled),
            decoded = self.decoder.decode() => decoded,
        };

        match decoded {
            Ok(None) => self.finish(),
            Err(err) => self.fail(err),
            Ok(Some(event)) if event.is_done() => self.finish(),
            Ok(Some(event)) if event.is_error() => self.fail(PerplexityError::Stream(event.data)),
            Ok(Some(event)) => match event.json::<StreamChunk>() {
                Ok(chunk) => Ok(Some(chunk)),
                Err(err) => self.fail(err),
            },
        }
    }

    /// Read every remaining chunk.
    pub async fn collect(mut self) -> Result<Vec<StreamChunk>> {
        let mut chunks = Vec::new();
        while let Some(chunk) = self.next().await? {
            chunks.push(chunk);
        }
        Ok(chunks)
    }

    /// Release the response body. Safe to call any number of times; a stream
    /// closed while open reports a graceful end on the next read.
    pub fn close(&mut self) {
        if matches!(self.state, StreamState::Open) {
            self.state = StreamState::Done;
        }
        self.decoder.close();
    }

    /// Adapt into a [`futures::Stream`] that ends after the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<StreamChunk>> + Send {
        futures::stream::unfold(Some(self), |state| async move {
            let mut stream = state?;
            match stream.next().await {
                Ok(Some(chunk)) => Some((Ok(chunk), Some(stream))),
                Ok(None) => None,
                Err(err) => Some((Err(err), None)),
            }
        })
    }

    /// Push chunks through a channel from a background task.
    ///
    /// The channel holds at most one chunk, so the producer runs at most one
    /// chunk ahead of the consumer. The task stops, closing the channel and
    /// the body, when the stream ends, when the cancellation token fires, or
    /// when the receiver is dropped. A terminal error is logged, not sent;
    /// use [`next`](Self::next) or [`into_stream`](Self::into_stream) to
    /// observe it.
    pub fn iter(self) -> mpsc::Receiver<StreamChunk> {
        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(produce(self, tx));
        rx
    }

    fn finish(&mut self) -> Result<Option<StreamChunk>> {
        debug!(request_id = ?self.request_id, "Stream finished");
        self.state = StreamState::Done;
        self.decoder.close();
        Ok(None)
    }

    fn fail(&mut self, err: PerplexityError) -> Result<Option<StreamChunk>> {
        debug!(request_id = ?self.request_id, error = %err, "Stream terminated with error");
        self.state = StreamState::Failed(err.clone());
        self.decoder.close();
        Err(err)
    }
}

async fn produce(mut stream: ChatStream, tx: mpsc::Sender<StreamChunk>) {
    let cancel = stream.cancel.clone();
    loop {
        let next = tokio::select! {
            biased;
            _ = tx.closed() => break,
            next = stream.next() => next,
        };
        let chunk = match next {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(err) => {
                debug!(error = %err, "Stream producer stopping on error");
                break;
            }
        };
        let sent = tokio::select! {
            biased;
            _ = cancel.cancelled() => false,
            sent = tx.send(chunk) => sent.is_ok(),
        };
        if !sent {
            break;
        }
    }
    stream.close();
    debug!(request_id = ?stream.request_id, "Stream producer exited");
}

#[cfg(test)]
#[path = "stream.test.rs"]
mod tests;
