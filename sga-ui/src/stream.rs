//! Progress stream consumption
//!
//! The service delivers job progress as server-sent events: UTF-8 lines
//! where `data:` fields accumulate until a blank line dispatches the
//! event. Comment lines (keep-alives) and the non-data fields are
//! tolerated and skipped. The parser is incremental — chunk boundaries can
//! fall anywhere, including mid-line.

use futures::stream::{Stream, StreamExt};
use sga_common::{Error, ProgressEvent, Result};

/// Incremental parser for the server-sent-event wire framing.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: String,
    data_lines: Vec<String>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes; returns the data payloads completed by it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));

        let mut payloads = Vec::new();
        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                // Blank line dispatches the accumulated event
                if !self.data_lines.is_empty() {
                    payloads.push(self.data_lines.join("\n"));
                    self.data_lines.clear();
                }
            } else if let Some(rest) = line.strip_prefix("data:") {
                self.data_lines
                    .push(rest.strip_prefix(' ').unwrap_or(rest).to_string());
            }
            // ":" comments and event/id/retry fields are not used by this feed
        }
        payloads
    }
}

/// Adapt a streaming progress response into typed events.
///
/// Undecodable data payloads are logged and skipped; they never take the
/// stream down. A transport failure ends the stream with `Error::Stream`.
pub fn progress_events(
    response: reqwest::Response,
) -> impl Stream<Item = Result<ProgressEvent>> {
    async_stream::stream! {
        let mut parser = SseParser::new();
        let mut bytes = response.bytes_stream();

        while let Some(chunk) = bytes.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    yield Err(Error::Stream(e.to_string()));
                    return;
                }
            };
            for payload in parser.feed(&chunk) {
                match serde_json::from_str::<ProgressEvent>(&payload) {
                    Ok(event) => yield Ok(event),
                    Err(e) => {
                        tracing::warn!("Skipping undecodable progress event {:?}: {}", payload, e);
                    }
                }
            }
        }
    }
}
