use std::error::Error as StdError;
use std::fmt;

use futures_util::StreamExt;
use tokio::sync::mpsc;

use crate::api::{ChatMessage, ChatRequest};
use crate::utils::url::construct_api_url;

/// One message from the stream task to the event loop. Every message is
/// tagged with the stream id it belongs to so the loop can drop messages
/// from superseded streams.
#[derive(Clone, Debug)]
pub enum StreamMessage {
    Chunk(String),
    Error(StreamError),
    End,
}

/// How a stream failed. `Unavailable` means no reply bytes ever arrived
/// (connect failure or an error status); `Interrupted` means the transport
/// broke mid-stream. Text already folded into the transcript stays there
/// either way.
#[derive(Clone, Debug)]
pub enum StreamError {
    Unavailable(String),
    Interrupted(String),
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::Unavailable(detail) => {
                write!(f, "Response stream unavailable: {}", detail)
            }
            StreamError::Interrupted(detail) => {
                write!(f, "Response stream interrupted: {}", detail)
            }
        }
    }
}

impl StdError for StreamError {}

/// Incremental UTF-8 decoder for byte streams that split multi-byte
/// characters across chunk boundaries.
///
/// `push` decodes as much as the bytes seen so far allow and holds back an
/// incomplete trailing sequence for the next chunk. Invalid bytes decode to
/// U+FFFD and decoding continues behind them. `finish` flushes whatever is
/// still held back once the transport signals end-of-stream.
#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    return out;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match err.error_len() {
                        Some(bad) => {
                            out.push('\u{FFFD}');
                            self.pending.drain(..valid + bad);
                        }
                        None => {
                            // Incomplete trailing sequence: keep it for the
                            // next chunk.
                            self.pending.drain(..valid);
                            return out;
                        }
                    }
                }
            }
        }
    }

    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        let tail = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        tail
    }
}

/// Pull a human-sized message out of a gateway error body. The gateway
/// wraps its errors as JSON `{"detail": ...}`; anything else is passed
/// through trimmed.
fn summarize_error_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<no body>".to_string();
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(detail) = value.get("detail").and_then(|v| v.as_str()) {
            return detail.to_string();
        }
    }
    trimmed.to_string()
}

#[derive(Clone, Debug)]
pub struct StreamParams {
    pub client: reqwest::Client,
    pub base_url: String,
    pub model: String,
    pub api_messages: Vec<ChatMessage>,
    pub cancel_token: tokio_util::sync::CancellationToken,
    pub stream_id: u64,
}

#[derive(Clone)]
pub struct ChatStreamService {
    tx: mpsc::UnboundedSender<(StreamMessage, u64)>,
}

impl ChatStreamService {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(StreamMessage, u64)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn spawn_stream(&self, params: StreamParams) {
        let tx_clone = self.tx.clone();
        tokio::spawn(async move {
            let StreamParams {
                client,
                base_url,
                model,
                api_messages,
                cancel_token,
                stream_id,
            } = params;

            let request = ChatRequest {
                messages: api_messages,
                model,
            };

            tokio::select! {
                _ = async {
                    let chat_url = construct_api_url(&base_url, "api/chat/stream");
                    tracing::debug!(url = %chat_url, stream_id, "dispatching chat request");

                    match client
                        .post(chat_url)
                        .header("Content-Type", "application/json")
                        .json(&request)
                        .send()
                        .await
                    {
                        Ok(response) => {
                            if !response.status().is_success() {
                                let status = response.status();
                                let error_text = response
                                    .text()
                                    .await
                                    .unwrap_or_else(|_| "<no body>".to_string());
                                let detail = format!(
                                    "HTTP {}: {}",
                                    status,
                                    summarize_error_body(&error_text)
                                );
                                let _ = tx_clone.send((
                                    StreamMessage::Error(StreamError::Unavailable(detail)),
                                    stream_id,
                                ));
                                let _ = tx_clone.send((StreamMessage::End, stream_id));
                                return;
                            }

                            let mut stream = response.bytes_stream();
                            let mut decoder = Utf8ChunkDecoder::new();

                            while let Some(chunk) = stream.next().await {
                                if cancel_token.is_cancelled() {
                                    return;
                                }

                                match chunk {
                                    Ok(chunk_bytes) => {
                                        let text = decoder.push(&chunk_bytes);
                                        if !text.is_empty() {
                                            let _ = tx_clone
                                                .send((StreamMessage::Chunk(text), stream_id));
                                        }
                                    }
                                    Err(e) => {
                                        tracing::debug!(stream_id, error = %e, "stream read failed");
                                        let _ = tx_clone.send((
                                            StreamMessage::Error(StreamError::Interrupted(
                                                e.to_string(),
                                            )),
                                            stream_id,
                                        ));
                                        let _ = tx_clone.send((StreamMessage::End, stream_id));
                                        return;
                                    }
                                }
                            }

                            let tail = decoder.finish();
                            if !tail.is_empty() {
                                let _ = tx_clone.send((StreamMessage::Chunk(tail), stream_id));
                            }
                            tracing::debug!(stream_id, "stream closed");
                            let _ = tx_clone.send((StreamMessage::End, stream_id));
                        }
                        Err(e) => {
                            let _ = tx_clone.send((
                                StreamMessage::Error(StreamError::Unavailable(e.to_string())),
                                stream_id,
                            ));
                            let _ = tx_clone.send((StreamMessage::End, stream_id));
                        }
                    }
                } => {}
                _ = cancel_token.cancelled() => {}
            }
        });
    }

    #[cfg(test)]
    pub fn send_for_test(&self, message: StreamMessage, stream_id: u64) {
        let _ = self.tx.send((message, stream_id));
    }
}
