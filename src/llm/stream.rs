use crate::models::chat::StreamEvent;
use futures_util::StreamExt;
use log::{ debug, warn };
use serde::Deserialize;
use tokio::sync::mpsc::Sender;

/// Shape of one line of Ollama's line-delimited /api/chat stream.
#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    message: Option<ChunkMessage>,
    #[serde(default)]
    done: bool,
}

#[derive(Deserialize)]
struct ChunkMessage {
    content: Option<String>,
}

/// What a single well-formed upstream line contributes: an optional content
/// delta and whether generation has finished.
#[derive(Debug, PartialEq)]
pub struct LineDelta {
    pub content: Option<String>,
    pub done: bool,
}

/// Parses one upstream line. Blank lines and lines that are not valid JSON
/// yield `None` and are skipped; a corrupt line never aborts the stream.
pub fn decode_line(line: &str) -> Option<LineDelta> {
    if line.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<StreamChunk>(line) {
        Ok(chunk) => Some(LineDelta {
            content: chunk.message.and_then(|m| m.content),
            done: chunk.done,
        }),
        Err(e) => {
            debug!("Skipping malformed stream line: {}", e);
            None
        }
    }
}

/// Incremental decoder over the raw byte stream. Reassembles complete lines
/// across chunk boundaries (bodies arrive in arbitrary splits, including
/// mid-codepoint), decodes each one, and stops at the first completion
/// marker. Pending input stays raw bytes; UTF-8 decoding happens per
/// complete line only.
#[derive(Default)]
pub struct Decoder {
    pending: Vec<u8>,
    finished: bool,
}

impl Decoder {
    /// Feeds one raw chunk and returns the events it completes, in upstream
    /// order. After the terminal event has been produced, further input
    /// yields nothing.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }
        self.pending.extend_from_slice(bytes);

        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let Some(delta) = decode_line(line.trim_end()) else {
                continue;
            };
            if let Some(content) = delta.content {
                events.push(StreamEvent::chunk(content));
            }
            if delta.done {
                events.push(StreamEvent::done());
                self.finished = true;
                break;
            }
        }
        events
    }

    /// Decodes whatever remains once the source is exhausted (a final line
    /// without a trailing newline).
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        if self.finished || self.pending.is_empty() {
            return Vec::new();
        }
        let tail = std::mem::take(&mut self.pending);
        let tail = String::from_utf8_lossy(&tail);
        let mut events = Vec::new();
        if let Some(delta) = decode_line(tail.trim_end()) {
            if let Some(content) = delta.content {
                events.push(StreamEvent::chunk(content));
            }
            if delta.done {
                events.push(StreamEvent::done());
                self.finished = true;
            }
        }
        events
    }

    pub fn finished(&self) -> bool {
        self.finished
    }
}

/// Drains one upstream streaming response into the bounded channel feeding
/// the SSE re-emitter. Runs as its own task; returning drops the response
/// and releases the connection on every exit path.
pub async fn pump(response: reqwest::Response, tx: Sender<StreamEvent>) {
    let mut decoder = Decoder::default();
    let mut body = response.bytes_stream();

    while let Some(chunk) = body.next().await {
        match chunk {
            Ok(bytes) => {
                for event in decoder.feed(&bytes) {
                    let terminal = event.is_terminal();
                    if tx.send(event).await.is_err() {
                        // Receiver dropped: the client disconnected.
                        return;
                    }
                    if terminal {
                        return;
                    }
                }
            }
            Err(e) => {
                warn!("Upstream stream read failed: {}", e);
                let _ = tx.send(StreamEvent::error(format!("stream read failed: {}", e))).await;
                return;
            }
        }
    }

    for event in decoder.finish() {
        let terminal = event.is_terminal();
        if tx.send(event).await.is_err() {
            return;
        }
        if terminal {
            return;
        }
    }

    if !decoder.finished() {
        // Upstream closed without a completion marker.
        let _ = tx.send(StreamEvent::error("stream ended before completion")).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_lines(decoder: &mut Decoder, lines: &[&str]) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        for line in lines {
            events.extend(decoder.feed(format!("{}\n", line).as_bytes()));
        }
        events
    }

    #[test]
    fn decodes_content_line() {
        let delta = decode_line(r#"{"message": {"content": "hello"}, "done": false}"#).unwrap();
        assert_eq!(delta.content.as_deref(), Some("hello"));
        assert!(!delta.done);
    }

    #[test]
    fn decodes_completion_line_without_message() {
        let delta = decode_line(r#"{"done": true}"#).unwrap();
        assert_eq!(delta.content, None);
        assert!(delta.done);
    }

    #[test]
    fn blank_and_malformed_lines_are_skipped() {
        assert!(decode_line("").is_none());
        assert!(decode_line("   ").is_none());
        assert!(decode_line("not json at all").is_none());
        assert!(decode_line("{truncated").is_none());
    }

    #[test]
    fn two_chunks_then_completion() {
        let mut decoder = Decoder::default();
        let events = feed_lines(&mut decoder, &[
            r#"{"message": {"content": "4"}, "done": false}"#,
            r#"{"message": {"content": ""}, "done": true}"#,
        ]);
        assert_eq!(events, vec![
            StreamEvent::chunk("4"),
            StreamEvent::chunk(""),
            StreamEvent::done(),
        ]);
    }

    #[test]
    fn completion_without_content_emits_only_done() {
        let mut decoder = Decoder::default();
        let events = feed_lines(&mut decoder, &[
            r#"{"message": {"content": "4"}, "done": false}"#,
            r#"{"done": true}"#,
        ]);
        assert_eq!(events, vec![StreamEvent::chunk("4"), StreamEvent::done()]);
    }

    #[test]
    fn same_lines_decode_identically() {
        let lines = [
            r#"{"message": {"content": "a"}, "done": false}"#,
            r#"{"message": {"content": "b"}, "done": false}"#,
            r#"{"done": true}"#,
        ];
        let first = feed_lines(&mut Decoder::default(), &lines);
        let second = feed_lines(&mut Decoder::default(), &lines);
        assert_eq!(first, second);
    }

    #[test]
    fn noise_lines_do_not_change_valid_events() {
        let clean = feed_lines(&mut Decoder::default(), &[
            r#"{"message": {"content": "a"}, "done": false}"#,
            r#"{"message": {"content": "b"}, "done": false}"#,
            r#"{"done": true}"#,
        ]);
        let noisy = feed_lines(&mut Decoder::default(), &[
            "garbage",
            r#"{"message": {"content": "a"}, "done": false}"#,
            "<<<>>>",
            "",
            r#"{"message": {"content": "b"}, "done": false}"#,
            "{not json",
            r#"{"done": true}"#,
        ]);
        assert_eq!(clean, noisy);
    }

    #[test]
    fn no_events_after_first_completion() {
        let mut decoder = Decoder::default();
        let events = feed_lines(&mut decoder, &[
            r#"{"done": true}"#,
            r#"{"message": {"content": "late"}, "done": false}"#,
            r#"{"done": true}"#,
        ]);
        assert_eq!(events, vec![StreamEvent::done()]);
        assert!(decoder.finished());
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn reassembles_lines_split_across_chunks() {
        let mut decoder = Decoder::default();
        let mut events = Vec::new();
        events.extend(decoder.feed(br#"{"message": {"con"#));
        events.extend(decoder.feed(br#"tent": "4"}, "done": false}"#));
        assert!(events.is_empty());
        events.extend(decoder.feed(b"\n"));
        assert_eq!(events, vec![StreamEvent::chunk("4")]);
    }

    #[test]
    fn reassembles_multibyte_characters_split_across_chunks() {
        let line = "{\"message\": {\"content\": \"café\"}, \"done\": false}\n".as_bytes();
        // Split between the two bytes of 'é'.
        let split = line.iter().position(|&b| b == 0xC3).unwrap() + 1;

        let mut decoder = Decoder::default();
        let mut events = decoder.feed(&line[..split]);
        events.extend(decoder.feed(&line[split..]));
        assert_eq!(events, vec![StreamEvent::chunk("café")]);
    }

    #[test]
    fn final_line_without_newline_is_decoded_on_finish() {
        let mut decoder = Decoder::default();
        assert!(decoder.feed(br#"{"done": true}"#).is_empty());
        assert_eq!(decoder.finish(), vec![StreamEvent::done()]);
        assert!(decoder.finished());
    }
}
