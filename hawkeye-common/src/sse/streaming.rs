//! Prompt response streaming.
//!
//! [`StreamDecoder`] turns pushed byte chunks into a single [`StreamResult`];
//! [`decode_stream`] drives it from any byte stream with idle timeout and
//! cancellation. Consumers never touch raw frames.

use futures_util::{Stream, StreamExt};
use serde::Serialize;
use std::time::Duration;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use super::{EnvelopeKind, FrameParser, StreamFrame, IDLE_TIMEOUT, PREVIEW_CHARS};
use crate::errors::{BoxError, StreamError};
use crate::events::preview_str;

// ============================================================================
// Public types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamResult {
    pub session_uuid: String,
    /// Set only when a terminal envelope was observed.
    pub message_id: Option<String>,
    /// Raw response text received up to the terminal envelope.
    pub response: String,
}

/// Receives non-fatal classification side effects while a stream is decoded.
pub trait StreamObserver {
    /// Latest progress status; each call replaces the previous one.
    fn on_progress(&mut self, _status: &str) {}

    /// Preview of a chat response fragment, already cut to [`PREVIEW_CHARS`].
    fn on_chat_response(&mut self, _preview: &str) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl StreamObserver for NoopObserver {}

impl<O: StreamObserver + ?Sized> StreamObserver for &mut O {
    fn on_progress(&mut self, status: &str) {
        (**self).on_progress(status);
    }

    fn on_chat_response(&mut self, preview: &str) {
        (**self).on_chat_response(preview);
    }
}

// ============================================================================
// StreamDecoder
// ============================================================================

pub struct StreamDecoder<O> {
    parser: FrameParser,
    raw: String,
    session_uuid: String,
    observer: O,
    result: Option<StreamResult>,
}

impl<O: StreamObserver> StreamDecoder<O> {
    /// `session_uuid` is used when the terminal envelope lacks one, and for
    /// the best-effort result of a stream that never terminates.
    pub fn new(session_uuid: impl Into<String>, observer: O) -> Self {
        Self {
            parser: FrameParser::new(),
            raw: String::new(),
            session_uuid: session_uuid.into(),
            observer,
            result: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.result.is_some()
    }

    /// Process one chunk. Returns `true` once a terminal envelope has been seen;
    /// later chunks are ignored.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> bool {
        if self.is_finished() {
            return true;
        }
        let text = self.parser.decode_utf8(chunk);
        self.raw.push_str(&text);
        let frames = self.parser.feed(&text);
        self.inspect(frames);
        self.is_finished()
    }

    /// Finish after the stream ended naturally.
    pub fn finish(mut self) -> StreamResult {
        if self.result.is_none() {
            let tail = self.parser.take_utf8_tail();
            self.raw.push_str(&tail);
            let mut frames = self.parser.feed(&tail);
            frames.extend(self.parser.flush());
            self.inspect(frames);
        }
        match self.result {
            Some(result) => result,
            None => {
                tracing::debug!(
                    session_uuid = %self.session_uuid,
                    bytes = self.raw.len(),
                    "stream ended without a terminal envelope"
                );
                StreamResult {
                    session_uuid: self.session_uuid,
                    message_id: None,
                    response: self.raw,
                }
            }
        }
    }

    fn inspect(&mut self, frames: Vec<StreamFrame>) {
        for frame in frames {
            if self.result.is_some() {
                return;
            }
            let Some(envelope) = frame.envelope else {
                tracing::debug!(frame = %preview_str(&frame.raw, 80, true), "dropping undecodable frame");
                continue;
            };

            match envelope.kind() {
                EnvelopeKind::Progress(status) => self.observer.on_progress(status),
                EnvelopeKind::ChatResponse(text) => {
                    self.observer.on_chat_response(&preview_str(text, PREVIEW_CHARS, false))
                }
                EnvelopeKind::Other => {}
            }

            if envelope.is_done() {
                self.result = Some(StreamResult {
                    session_uuid: envelope
                        .session_uuid
                        .clone()
                        .unwrap_or_else(|| self.session_uuid.clone()),
                    message_id: envelope.message_id().map(String::from),
                    response: self.raw.clone(),
                });
            }
        }
    }
}

// ============================================================================
// Driving a byte stream
// ============================================================================

#[derive(Debug, Clone)]
pub struct DecodeOptions {
    pub idle_timeout: Duration,
    pub cancel: Option<CancellationToken>,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            idle_timeout: IDLE_TIMEOUT,
            cancel: None,
        }
    }
}

/// Decode a prompt response stream into a single [`StreamResult`].
///
/// Returns as soon as a terminal envelope is seen; the rest of the stream is
/// not read. A transport error before that point fails the whole call.
pub async fn decode_stream<S, B, E, O>(
    stream: S,
    session_uuid: &str,
    observer: O,
    options: &DecodeOptions,
) -> Result<StreamResult, StreamError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<BoxError>,
    O: StreamObserver,
{
    let mut stream = std::pin::pin!(stream);
    let mut decoder = StreamDecoder::new(session_uuid, observer);

    loop {
        let next = tokio::select! {
            biased;
            _ = cancelled(options.cancel.as_ref()) => return Err(StreamError::Cancelled),
            next = timeout(options.idle_timeout, stream.next()) => next,
        };

        match next {
            Ok(Some(Ok(chunk))) => {
                if decoder.push_chunk(chunk.as_ref()) {
                    break;
                }
            }
            Ok(Some(Err(e))) => {
                let cause: BoxError = e.into();
                tracing::warn!(error = %cause, "prompt stream failed");
                return Err(StreamError::Transport(cause));
            }
            Ok(None) => break,
            Err(_) => return Err(StreamError::IdleTimeout(options.idle_timeout)),
        }
    }

    Ok(decoder.finish())
}

pub(crate) async fn cancelled(token: Option<&CancellationToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}
