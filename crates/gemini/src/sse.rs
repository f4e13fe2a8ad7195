//! Incremental decoder for `text/event-stream` bodies.

/// Splits a byte stream into SSE event payloads (the joined `data:` lines).
///
/// Bytes are buffered until a blank line closes the event, so events and
/// multi-byte characters split across network chunks decode intact.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one network chunk, returning the payloads of every event it closed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        let mut events = Vec::new();
        while let Some(pos) = self.buf.windows(2).position(|w| w == b"\n\n") {
            let block: Vec<u8> = self.buf.drain(..pos + 2).collect();
            if let Some(data) = event_data(&block[..pos]) {
                events.push(data);
            }
        }
        events
    }

    /// Flush an event left unterminated at end of stream.
    pub fn finish(&mut self) -> Vec<String> {
        let block = std::mem::take(&mut self.buf);
        event_data(&block).into_iter().collect()
    }
}

fn event_data(block: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(block);
    let lines: Vec<&str> = text
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| data.strip_prefix(' ').unwrap_or(data))
        .collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
