//! NDJSON stream handling for Ollama `/api/chat`.
//!
//! A streaming chat response is newline-delimited JSON:
//! 1. Zero or more chunks carrying `message.content` fragments
//! 2. One final chunk with `done: true` and the token counts
//! 3. An `{"error": "..."}` line may replace either of the above
//!
//! Lines can be split across HTTP body chunks, so bytes are buffered until a
//! newline arrives and only complete lines are parsed.

use std::pin::Pin;

use futures_util::{Stream, StreamExt};

use focusflow_types::llm::{LlmError, StreamEvent, Usage};

use super::client::{check_status, map_send_error};
use super::types::{OllamaChatChunk, OllamaChatRequest, OllamaErrorBody};

/// Accumulates raw body bytes and hands out complete lines.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Next complete line, without its terminator.
    pub fn next_line(&mut self) -> Option<Vec<u8>> {
        let pos = self.buf.iter().position(|b| *b == b'\n')?;
        let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(line)
    }

    /// Whatever is left once the body ends (a final line with no newline).
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        if self.buf.iter().all(u8::is_ascii_whitespace) {
            self.buf.clear();
            return None;
        }
        Some(std::mem::take(&mut self.buf))
    }
}

/// Translate one NDJSON line into provider-agnostic stream events.
///
/// Blank lines produce nothing. An error line becomes `Err`.
pub fn process_line(line: &[u8]) -> Result<Vec<StreamEvent>, LlmError> {
    let text = std::str::from_utf8(line)
        .map_err(|e| LlmError::Deserialization(format!("non-utf8 stream line: {e}")))?
        .trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    if let Ok(err) = serde_json::from_str::<OllamaErrorBody>(text) {
        return Err(LlmError::Provider { message: err.error });
    }

    let chunk: OllamaChatChunk = serde_json::from_str(text)
        .map_err(|e| LlmError::Deserialization(format!("stream chunk: {e}")))?;

    let mut events = Vec::with_capacity(3);
    if let Some(message) = chunk.message {
        if !message.content.is_empty() {
            events.push(StreamEvent::TextDelta {
                text: message.content,
            });
        }
    }
    if chunk.done {
        events.push(StreamEvent::Usage(Usage {
            input_tokens: chunk.prompt_eval_count.unwrap_or(0),
            output_tokens: chunk.eval_count.unwrap_or(0),
        }));
        events.push(StreamEvent::Done);
    }
    Ok(events)
}

/// Open a streaming `/api/chat` request.
///
/// Yields [`StreamEvent::Connected`] once the server accepts the request,
/// then text fragments, usage, and [`StreamEvent::Done`]. A body that ends
/// before the `done` line is a stream error.
pub fn create_ollama_stream(
    client: &reqwest::Client,
    url: &str,
    body: OllamaChatRequest,
) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
    let client = client.clone();
    let url = url.to_string();

    Box::pin(async_stream::try_stream! {
        let response = client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_send_error(e, &url))?;
        let response = check_status(response).await?;

        yield StreamEvent::Connected;

        let mut byte_stream = response.bytes_stream();
        let mut lines = LineBuffer::default();
        let mut finished = false;

        while !finished {
            let Some(chunk) = byte_stream.next().await else {
                break;
            };
            let chunk = chunk.map_err(|e| LlmError::Stream(format!("response body read: {e}")))?;
            lines.push(&chunk);

            while let Some(line) = lines.next_line() {
                for event in process_line(&line)? {
                    finished |= matches!(event, StreamEvent::Done);
                    yield event;
                }
                if finished {
                    break;
                }
            }
        }

        if !finished {
            if let Some(line) = lines.finish() {
                for event in process_line(&line)? {
                    finished |= matches!(event, StreamEvent::Done);
                    yield event;
                }
            }
        }

        if !finished {
            Err::<(), _>(LlmError::Stream("stream ended before the final chunk".to_string()))?;
        }
    })
}
