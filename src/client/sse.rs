//! Server-Sent Events (SSE) stream handling for streamed agent responses.
//!
//! Parses SSE `data:` lines from HTTP responses and decodes them into
//! [`StreamEvent`]s (tokens, chat messages, state updates, unknown payloads).
//! A `data: [DONE]` line ends the stream.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::Stream;
use tokio::sync::mpsc;

use crate::error::{AgentClientError, AgentResult};
use crate::types::StreamEvent;

/// Buffered events between the parsing task and the consumer.
const CHANNEL_CAPACITY: usize = 64;

/// A stream of decoded agent events.
///
/// Wraps a raw HTTP response and parses SSE `data:` lines into typed
/// [`StreamEvent`] values. Supports both pull-based (`next()`) and
/// push-based (`Stream` trait, via [`into_stream`](Self::into_stream))
/// consumption.
///
/// # Example
///
/// ```no_run
/// # async fn example(mut stream: agent_run_client::client::SseStream) {
/// while let Some(event) = stream.next().await {
///     match event {
///         Ok(event) => println!("Got event: {:?}", event),
///         Err(e) => eprintln!("Stream error: {}", e),
///     }
/// }
/// # }
/// ```
pub struct SseStream {
    receiver: mpsc::Receiver<AgentResult<StreamEvent>>,
    /// Background task handle, kept so the parsing task runs to completion.
    _task: tokio::task::JoinHandle<()>,
}

impl fmt::Debug for SseStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SseStream").finish_non_exhaustive()
    }
}

impl SseStream {
    /// Create an `SseStream` from a raw `reqwest::Response`.
    pub(crate) fn from_response(response: reqwest::Response) -> Self {
        Self::from_byte_stream(response.bytes_stream())
    }

    /// Create an `SseStream` from any stream of byte chunks.
    ///
    /// Spawns a background task on the current tokio runtime that splits the
    /// bytes into lines and sends decoded events through a channel.
    pub fn from_byte_stream<S, B, E>(bytes: S) -> Self
    where
        S: Stream<Item = Result<B, E>> + Send + 'static,
        B: AsRef<[u8]> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        let task = tokio::spawn(async move {
            if let Err(e) = parse_sse_stream(bytes, &tx).await {
                // Receiver may already be gone.
                let _ = tx.send(Err(e)).await;
            }
        });

        Self {
            receiver: rx,
            _task: task,
        }
    }

    /// Get the next event from the stream.
    ///
    /// Returns `None` when the stream is exhausted (`[DONE]` received or the
    /// server closed the connection). Returns `Some(Err(...))` on parse,
    /// transport or server-reported errors; nothing follows an error.
    pub async fn next(&mut self) -> Option<AgentResult<StreamEvent>> {
        self.receiver.recv().await
    }

    /// Convert this stream into a `futures::Stream`.
    pub fn into_stream(self) -> SseStreamAdapter {
        SseStreamAdapter {
            receiver: self.receiver,
            _task: self._task,
        }
    }
}

/// Adapter that implements `futures::Stream` for an [`SseStream`].
///
/// Created by [`SseStream::into_stream()`].
pub struct SseStreamAdapter {
    receiver: mpsc::Receiver<AgentResult<StreamEvent>>,
    _task: tokio::task::JoinHandle<()>,
}

impl Stream for SseStreamAdapter {
    type Item = AgentResult<StreamEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

/// Outcome of parsing a single SSE line.
#[derive(Debug, PartialEq)]
enum SseLine {
    Event(StreamEvent),
    Done,
    Skip,
}

/// Read the body line by line, sending decoded events to `tx` until `[DONE]`,
/// end of body, or the receiver is dropped.
async fn parse_sse_stream<S, B, E>(
    bytes: S,
    tx: &mpsc::Sender<AgentResult<StreamEvent>>,
) -> AgentResult<()>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: fmt::Display,
{
    use futures::StreamExt;

    let mut bytes = Box::pin(bytes);

    // Bytes, not a String: a chunk may end inside a multi-byte character.
    let mut buffer: Vec<u8> = Vec::new();

    while let Some(chunk) = bytes.next().await {
        let chunk =
            chunk.map_err(|e| AgentClientError::Transport(format!("error reading SSE stream: {e}")))?;
        buffer.extend_from_slice(chunk.as_ref());

        while let Some(newline_pos) = buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = buffer.drain(..=newline_pos).collect();
            let line = decode_line(&raw[..raw.len() - 1])?;

            match parse_sse_line(&line)? {
                SseLine::Event(event) => {
                    if tx.send(Ok(event)).await.is_err() {
                        return Ok(());
                    }
                }
                SseLine::Done => return Ok(()),
                SseLine::Skip => {}
            }
        }
    }

    // Trailing data without a final newline.
    if !buffer.is_empty() {
        let line = decode_line(&buffer)?;
        if let SseLine::Event(event) = parse_sse_line(line.trim())? {
            let _ = tx.send(Ok(event)).await;
        }
    }

    Ok(())
}

fn decode_line(raw: &[u8]) -> AgentResult<String> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| AgentClientError::Transport(format!("invalid UTF-8 in SSE stream: {e}")))?;
    Ok(text.trim_end_matches('\r').to_string())
}

/// Parse a single SSE line.
///
/// Blank lines, comments (`:`), and non-`data` fields (`event:`, `id:`,
/// `retry:`) are skipped.
fn parse_sse_line(line: &str) -> AgentResult<SseLine> {
    if line.is_empty() || line.starts_with(':') {
        return Ok(SseLine::Skip);
    }

    let Some(data) = line.strip_prefix("data:") else {
        return Ok(SseLine::Skip);
    };
    let data = data.trim();

    if data.is_empty() {
        return Ok(SseLine::Skip);
    }
    if data == "[DONE]" {
        return Ok(SseLine::Done);
    }

    let value: serde_json::Value = serde_json::from_str(data).map_err(|e| {
        AgentClientError::InvalidJson(format!(
            "failed to parse SSE event data: {e} (data: {data})"
        ))
    })?;

    StreamEvent::decode(value).map(SseLine::Event)
}
