//! Server-sent event framing over a byte stream.
//!
//! A frame may arrive split across any number of network chunks, including in
//! the middle of a multi-byte character, so bytes are buffered until a blank
//! line closes the frame.

use crate::Error;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use memchr::memmem;
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

/// Data payload that closes a completion stream.
pub const END_MARKER: &str = "[DONE]";

/// Largest amount of unterminated frame data we are willing to buffer.
const MAX_PENDING_BYTES: usize = 1_000_000;

/// One server-sent event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseFrame {
    /// Value of the `event:` field, if any.
    pub event: Option<String>,
    /// All `data:` lines joined by `\n`.
    pub data: String,
}

impl SseFrame {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            ..Self::default()
        }
    }

    /// Whether this frame is the `[DONE]` end-of-stream marker.
    pub fn is_end_marker(&self) -> bool {
        self.data.trim() == END_MARKER
    }

    /// Whether the server tagged this frame as an `error` event.
    pub fn is_error_event(&self) -> bool {
        self.event.as_deref() == Some("error")
    }

    /// Parse the text of one frame. Frames without data lines yield `None`.
    fn parse(text: &str) -> Option<Self> {
        let mut frame = SseFrame::default();
        let mut data_lines = Vec::new();

        for line in text.lines() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() || line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line, ""),
            };

            match field {
                "data" => data_lines.push(value),
                "event" => frame.event = Some(value.to_string()),
                _ => {}
            }
        }

        if data_lines.is_empty() {
            return None;
        }

        frame.data = data_lines.join("\n");
        Some(frame)
    }
}

/// Incremental frame decoder; feed it bytes, collect complete frames.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    pending: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `chunk` and return every frame it completed, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<SseFrame>, Error> {
        self.pending.extend_from_slice(chunk);

        let mut frames = Vec::new();
        let mut start = 0;

        while let Some((end, separator_len)) = Self::find_boundary(&self.pending[start..]) {
            let text = std::str::from_utf8(&self.pending[start..start + end])
                .map_err(|e| Error::streaming(format!("Invalid UTF-8 in SSE frame: {e}")))?;
            frames.extend(SseFrame::parse(text));
            start += end + separator_len;
        }

        if start > 0 {
            self.pending.drain(..start);
        }

        if self.pending.len() > MAX_PENDING_BYTES {
            self.pending.clear();
            return Err(Error::streaming("SSE frame exceeded maximum size"));
        }

        Ok(frames)
    }

    /// Flush whatever is left once the byte stream has ended.
    ///
    /// Servers sometimes omit the blank line after the last frame.
    pub fn finish(&mut self) -> Option<SseFrame> {
        let pending = std::mem::take(&mut self.pending);
        let text = std::str::from_utf8(&pending).ok()?.trim();
        if text.is_empty() {
            return None;
        }
        SseFrame::parse(text)
    }

    /// Earliest frame boundary: `\n\n` or `\r\n\r\n`.
    fn find_boundary(bytes: &[u8]) -> Option<(usize, usize)> {
        let lf = memmem::find(bytes, b"\n\n").map(|pos| (pos, 2));
        let crlf = memmem::find(bytes, b"\r\n\r\n").map(|pos| (pos, 4));
        match (lf, crlf) {
            (Some(a), Some(b)) => Some(if b.0 < a.0 { b } else { a }),
            (a, b) => a.or(b),
        }
    }
}

/// A stream of [`SseFrame`]s parsed from a byte stream.
pub struct SseFrames<S> {
    inner: S,
    decoder: FrameDecoder,
    ready: VecDeque<SseFrame>,
    finished: bool,
}

impl<S> SseFrames<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            decoder: FrameDecoder::new(),
            ready: VecDeque::new(),
            finished: false,
        }
    }
}

impl<S, E> Stream for SseFrames<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: std::fmt::Display,
{
    type Item = Result<SseFrame, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(frame) = self.ready.pop_front() {
                return Poll::Ready(Some(Ok(frame)));
            }
            if self.finished {
                return Poll::Ready(None);
            }

            match ready!(self.inner.poll_next_unpin(cx)) {
                Some(Ok(chunk)) => {
                    let frames = self.decoder.push(&chunk)?;
                    self.ready.extend(frames);
                }
                Some(Err(e)) => {
                    self.finished = true;
                    return Poll::Ready(Some(Err(Error::streaming(format!(
                        "Stream error: {e}"
                    )))));
                }
                None => {
                    self.finished = true;
                    let tail = self.decoder.finish();
                    self.ready.extend(tail);
                }
            }
        }
    }
}

/// Extension trait to add SSE parsing to byte streams.
pub trait SseStreamExt: Stream + Sized {
    /// Parse this byte stream as server-sent event frames.
    fn sse_frames(self) -> SseFrames<Self> {
        SseFrames::new(self)
    }
}

impl<S: Stream> SseStreamExt for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    fn frames_of(
        chunks: &[&'static [u8]],
    ) -> SseFrames<impl Stream<Item = Result<Bytes, std::io::Error>> + Unpin> {
        let chunks: Vec<Result<Bytes, std::io::Error>> =
            chunks.iter().map(|c| Ok(Bytes::from_static(*c))).collect();
        stream::iter(chunks).sse_frames()
    }

    #[tokio::test]
    async fn test_complete_frames() {
        let mut frames = frames_of(&[b"data: Hello\n\ndata: World\n\n"]);

        assert_eq!(frames.next().await.unwrap().unwrap().data, "Hello");
        assert_eq!(frames.next().await.unwrap().unwrap().data, "World");
        assert!(frames.next().await.is_none());
    }

    #[tokio::test]
    async fn test_frame_split_across_chunks() {
        let mut frames = frames_of(&[b"data: Hel", b"lo World\n", b"\ndata: ", b"Second\n\n"]);

        assert_eq!(frames.next().await.unwrap().unwrap().data, "Hello World");
        assert_eq!(frames.next().await.unwrap().unwrap().data, "Second");
        assert!(frames.next().await.is_none());
    }

    #[tokio::test]
    async fn test_multibyte_character_split_across_chunks() {
        // "块" is E5 9D 97
        let mut frames = frames_of(&[b"data: {\"c\":\"\xE5\x9D", b"\x97\"}\n\n"]);

        assert_eq!(frames.next().await.unwrap().unwrap().data, "{\"c\":\"块\"}");
        assert!(frames.next().await.is_none());
    }

    #[tokio::test]
    async fn test_fields_comments_and_crlf() {
        let mut frames = frames_of(&[
            b": keep-alive\r\n\r\nevent: chunk\r\nid: 7\r\ndata: a\r\ndata: b\r\n\r\n",
        ]);

        let frame = frames.next().await.unwrap().unwrap();
        assert_eq!(frame.event.as_deref(), Some("chunk"));
        assert!(!frame.is_error_event());
        assert_eq!(frame.data, "a\nb");
        assert!(frames.next().await.is_none());
    }

    #[tokio::test]
    async fn test_tail_without_blank_line() {
        let mut frames = frames_of(&[b"data: first\n\n", b"data: [DONE]"]);

        assert_eq!(frames.next().await.unwrap().unwrap().data, "first");
        assert!(frames.next().await.unwrap().unwrap().is_end_marker());
        assert!(frames.next().await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_an_error() {
        let mut frames = frames_of(&[b"data: bad \xFF\xFE bytes\n\n"]);
        assert!(matches!(frames.next().await, Some(Err(Error::Streaming(_)))));
    }

    #[tokio::test]
    async fn test_byte_stream_error_is_surfaced_once() {
        let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(b"data: one\n\n")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
        ];
        let mut frames = stream::iter(chunks).sse_frames();

        assert_eq!(frames.next().await.unwrap().unwrap().data, "one");
        assert!(matches!(frames.next().await, Some(Err(Error::Streaming(_)))));
        assert!(frames.next().await.is_none());
    }

    #[test]
    fn test_end_marker() {
        assert!(SseFrame::new("[DONE]").is_end_marker());
        assert!(SseFrame::new(" [DONE] ").is_end_marker());
        assert!(!SseFrame::new("{\"choices\":[]}").is_end_marker());
    }

    #[test]
    fn test_error_event() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder
            .push(b"event: error\ndata: {\"error\":{\"message\":\"boom\"}}\n\n")
            .unwrap();
        assert_eq!(frames.len(), 1);
        assert!(frames[0].is_error_event());
        assert!(!frames[0].is_end_marker());
    }

    #[test]
    fn test_decoder_drops_frames_without_data() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.push(b"event: ping\n\nretry: 10\n\ndata: x\n\n").unwrap();
        assert_eq!(frames, vec![SseFrame::new("x")]);
        assert!(decoder.finish().is_none());
    }
}
