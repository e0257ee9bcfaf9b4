use bytes::BytesMut;
use serde::Deserialize;

/// One meaningful line of a server-sent event stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseFrame {
    Data(String),
    Done,
}

/// Reassembles SSE lines that arrive split across network chunks
#[derive(Debug, Default)]
pub struct SseBuffer {
    pending: BytesMut,
}

impl SseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every complete frame it finished
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.pending.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line = self.pending.split_to(pos + 1);
            if let Some(frame) = parse_line(&line) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Flush a trailing line that was not newline-terminated
    pub fn finish(&mut self) -> Option<SseFrame> {
        if self.pending.is_empty() {
            return None;
        }
        let line = self.pending.split_to(self.pending.len());
        parse_line(&line)
    }

    /// Bytes held back waiting for a newline
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

fn parse_line(raw: &[u8]) -> Option<SseFrame> {
    let line = String::from_utf8_lossy(raw);
    let line = line.trim_end_matches(['\r', '\n']);

    // Comments, keep-alives, and non-data fields carry nothing for us.
    let data = line.strip_prefix("data:")?;
    let data = data.strip_prefix(' ').unwrap_or(data);

    if data == "[DONE]" {
        Some(SseFrame::Done)
    } else {
        Some(SseFrame::Data(data.to_string()))
    }
}

/// What a single `data:` payload carried
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamPayload {
    Delta(String),
    Error(String),
    Empty,
}

/// Decode an OpenAI-format streaming chunk
pub fn decode_chunk(data: &str) -> StreamPayload {
    match serde_json::from_str::<StreamChunk>(data) {
        Ok(StreamChunk {
            error: Some(error), ..
        }) => StreamPayload::Error(error.to_string()),
        Ok(chunk) => chunk
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
            .filter(|content| !content.is_empty())
            .map(StreamPayload::Delta)
            .unwrap_or(StreamPayload::Empty),
        Err(e) => StreamPayload::Error(format!("malformed stream chunk: {}", e)),
    }
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_lines_are_reassembled() {
        let mut buffer = SseBuffer::new();
        assert!(buffer.push(b"data: {\"choices\":[{\"del").is_empty());
        assert!(buffer.pending_len() > 0);

        let frames = buffer.push(b"ta\":{\"content\":\"Hi\"}}]}\n\ndata: [DONE]\n");
        assert_eq!(
            frames,
            vec![
                SseFrame::Data("{\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}".into()),
                SseFrame::Done,
            ]
        );
        assert_eq!(buffer.pending_len(), 0);
    }

    #[test]
    fn test_comments_and_other_fields_are_skipped() {
        let mut buffer = SseBuffer::new();
        let frames = buffer.push(b": keep-alive\r\nevent: message\r\nid: 7\r\ndata:{}\r\n");
        assert_eq!(frames, vec![SseFrame::Data("{}".into())]);
    }

    #[test]
    fn test_multibyte_split_is_not_mangled() {
        let text = "data: é\n".as_bytes();
        let mut buffer = SseBuffer::new();
        // split inside the two-byte character
        assert!(buffer.push(&text[..7]).is_empty());
        assert_eq!(buffer.push(&text[7..]), vec![SseFrame::Data("é".into())]);
    }

    #[test]
    fn test_unterminated_tail() {
        let mut buffer = SseBuffer::new();
        assert!(buffer.push(b"data: [DONE]").is_empty());
        assert_eq!(buffer.finish(), Some(SseFrame::Done));
        assert_eq!(buffer.finish(), None);
    }

    #[test]
    fn test_decode_chunk() {
        assert_eq!(
            decode_chunk(r#"{"choices":[{"delta":{"content":"Hello, "}}]}"#),
            StreamPayload::Delta("Hello, ".into())
        );
        assert_eq!(
            decode_chunk(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#),
            StreamPayload::Empty
        );
        assert_eq!(
            decode_chunk(r#"{"choices":[{"delta":{"content":""}}]}"#),
            StreamPayload::Empty
        );
        assert_eq!(decode_chunk(r#"{"choices":[]}"#), StreamPayload::Empty);
        assert!(matches!(
            decode_chunk(r#"{"error":{"message":"rate limited"}}"#),
            StreamPayload::Error(e) if e.contains("rate limited")
        ));
        assert!(matches!(decode_chunk("not json"), StreamPayload::Error(_)));
    }
}
