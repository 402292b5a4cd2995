pub mod streaming;

use serde::Deserialize;
use std::time::Duration;

use crate::lenient;

/// Token that separates frames in the inference session stream.
pub const FRAME_DELIMITER: &str = "data:";

/// Idle timeout for streams: if no data received for this duration, consider the stream dead.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Chat response previews are cut to this many characters.
pub const PREVIEW_CHARS: usize = 100;

// ============================================================================
// Envelope: one decoded stream message
// ============================================================================

/// Only `message.status` and `message.id` decide termination; every other
/// field falls back to its default when it has an unexpected type.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub session_uuid: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub message: Option<EnvelopeMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvelopeMessage {
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub status: Option<MessageStatus>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub content: Option<MessageContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageContent {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub content_type: Option<ContentType>,
    #[serde(default, deserialize_with = "lenient::texts")]
    pub parts: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ContentType {
    #[serde(rename = "CONTENT_TYPE_PROGRESS_STATUS")]
    ProgressStatus,
    #[serde(rename = "CONTENT_TYPE_CHAT_RESPONSE")]
    ChatResponse,
    #[serde(rename = "CONTENT_TYPE_CHAT_PROMPT")]
    ChatPrompt,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum MessageStatus {
    #[serde(rename = "STATUS_DONE")]
    Done,
    #[serde(other)]
    Other,
}

/// What an envelope means to the decoder, resolved once at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeKind<'a> {
    Progress(&'a str),
    ChatResponse(&'a str),
    Other,
}

impl Envelope {
    pub fn is_done(&self) -> bool {
        self.message
            .as_ref()
            .and_then(|m| m.status)
            .is_some_and(|s| s == MessageStatus::Done)
    }

    pub fn message_id(&self) -> Option<&str> {
        self.message.as_ref()?.id.as_deref()
    }

    pub fn kind(&self) -> EnvelopeKind<'_> {
        let Some(content) = self.message.as_ref().and_then(|m| m.content.as_ref()) else {
            return EnvelopeKind::Other;
        };
        let first = content.parts.first().map(String::as_str).unwrap_or("");
        match content.content_type {
            Some(ContentType::ProgressStatus) => EnvelopeKind::Progress(first),
            Some(ContentType::ChatResponse) => EnvelopeKind::ChatResponse(first),
            _ => EnvelopeKind::Other,
        }
    }
}

// ============================================================================
// FrameParser: text-to-frame splitter with cross-chunk buffering
// ============================================================================

/// One delimited segment of the stream.
#[derive(Debug, Clone)]
pub struct StreamFrame {
    pub raw: String,
    pub envelope: Option<Envelope>,
}

impl StreamFrame {
    pub fn is_parseable(&self) -> bool {
        self.envelope.is_some()
    }

    /// Returns `None` for segments that are empty after trimming.
    fn from_segment(segment: &str) -> Option<Self> {
        let raw = segment.trim();
        if raw.is_empty() {
            return None;
        }
        Some(Self {
            raw: raw.to_string(),
            envelope: serde_json::from_str(raw).ok(),
        })
    }
}

/// Splits incoming text on [`FRAME_DELIMITER`].
///
/// A segment followed by another delimiter is complete and is always emitted,
/// parseable or not. The trailing segment is emitted only once it decodes;
/// otherwise it stays buffered until more text (or [`FrameParser::flush`]) arrives.
/// Each chunk is scanned once, and the trailing segment is only decoded when
/// it ends with `}`.
#[derive(Debug, Default)]
pub struct FrameParser {
    buffer: String,
    utf8_tail: Vec<u8>,
}

impl FrameParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a byte chunk to text, holding back a split multi-byte sequence.
    pub fn decode_utf8(&mut self, chunk: &[u8]) -> String {
        self.utf8_tail.extend_from_slice(chunk);
        match std::str::from_utf8(&self.utf8_tail) {
            Ok(text) => {
                let text = text.to_string();
                self.utf8_tail.clear();
                text
            }
            Err(e) if e.error_len().is_none() => {
                let valid = e.valid_up_to();
                let text = String::from_utf8_lossy(&self.utf8_tail[..valid]).into_owned();
                self.utf8_tail.drain(..valid);
                text
            }
            Err(_) => {
                let text = String::from_utf8_lossy(&self.utf8_tail).into_owned();
                self.utf8_tail.clear();
                text
            }
        }
    }

    /// Feed a text chunk and return every frame it completes.
    pub fn feed(&mut self, text: &str) -> Vec<StreamFrame> {
        // The buffer never holds a whole delimiter, so only its last few bytes
        // can join with `text` to form a new one.
        let mut search_from = self.buffer.len().saturating_sub(FRAME_DELIMITER.len() - 1);
        while !self.buffer.is_char_boundary(search_from) {
            search_from -= 1;
        }
        self.buffer.push_str(text);

        let mut frames = Vec::new();
        if let Some(offset) = self.buffer[search_from..].rfind(FRAME_DELIMITER) {
            let last = search_from + offset;
            for segment in self.buffer[..last].split(FRAME_DELIMITER) {
                frames.extend(StreamFrame::from_segment(segment));
            }
            self.buffer.drain(..last + FRAME_DELIMITER.len());
        }

        // A JSON object can only be complete once the span ends with `}`.
        let tail = self.buffer.trim();
        if tail.is_empty() {
            self.buffer.clear();
        } else if tail.ends_with('}') {
            if let Some(frame) = StreamFrame::from_segment(tail).filter(StreamFrame::is_parseable) {
                frames.push(frame);
                self.buffer.clear();
            }
        }

        frames
    }

    /// Release bytes of an unfinished UTF-8 sequence, lossily decoded.
    pub fn take_utf8_tail(&mut self) -> String {
        let tail = String::from_utf8_lossy(&self.utf8_tail).into_owned();
        self.utf8_tail.clear();
        tail
    }

    /// Flush the trailing segment after the stream ends.
    pub fn flush(&mut self) -> Vec<StreamFrame> {
        let mut remaining = std::mem::take(&mut self.buffer);
        remaining.push_str(&self.take_utf8_tail());
        StreamFrame::from_segment(&remaining).into_iter().collect()
    }
}
