//! Decoding of the `text/event-stream`-style completion body.
//!
//! The server writes one JSON frame per line, each optionally prefixed with
//! `data: `, with blank lines as keep-alive padding. Frames are decoded as
//! soon as their terminating newline arrives.

use async_stream::try_stream;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::Value;

use super::error::{ApiError, Result};
use crate::models::ChatDelta;

/// Prefix the server puts in front of each frame
const DATA_PREFIX: &str = "data:";

/// End-of-stream sentinel used by OpenAI-compatible backends
const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Deserialize)]
struct StreamFrame {
    #[serde(default)]
    choices: Option<Vec<FrameChoice>>,
    #[serde(default)]
    payload: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct FrameChoice {
    #[serde(default)]
    delta: Option<FrameDelta>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FrameDelta {
    #[serde(default)]
    content: Option<String>,
}

impl StreamFrame {
    fn into_delta(self) -> ChatDelta {
        let has_payload = self.payload.is_some();
        // `choices` and `delta` may each be absent or null
        let choice = self
            .choices
            .unwrap_or_default()
            .into_iter()
            .next()
            .unwrap_or_default();
        let delta = choice.delta.unwrap_or_default();

        // The opening frame carries no payload and its delta is not real content
        let content = if has_payload {
            delta.content.unwrap_or_default()
        } else {
            String::new()
        };

        ChatDelta {
            content,
            finished: choice.finish_reason.is_some(),
        }
    }
}

/// Decode a single line of the completion body.
///
/// Returns `Ok(None)` for lines that carry no frame (blank padding, SSE
/// comments, the `[DONE]` sentinel).
pub fn decode_frame(line: &str) -> Result<Option<ChatDelta>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(':') {
        return Ok(None);
    }

    let data = line
        .strip_prefix(DATA_PREFIX)
        .map(str::trim_start)
        .unwrap_or(line);
    if data.is_empty() || data == DONE_SENTINEL {
        return Ok(None);
    }

    let frame: StreamFrame =
        serde_json::from_str(data).map_err(|source| ApiError::MalformedFrame {
            line: data.to_string(),
            source,
        })?;

    Ok(Some(frame.into_delta()))
}

/// Turn a stream of body chunks into a stream of decoded deltas.
///
/// Chunk boundaries are arbitrary: a frame may be split across chunks, and a
/// chunk may hold several frames. A trailing line without a newline is
/// decoded when the body ends. The first error ends the stream.
pub fn decode_stream<S, B, E>(chunks: S) -> impl Stream<Item = Result<ChatDelta>>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<ApiError>,
{
    try_stream! {
        let mut buffer: Vec<u8> = Vec::new();
        futures::pin_mut!(chunks);

        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(|e| -> ApiError { e.into() })?;
            buffer.extend_from_slice(chunk.as_ref());

            while let Some(newline) = buffer.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=newline).collect();
                if let Some(delta) = decode_frame(&String::from_utf8_lossy(&line))? {
                    yield delta;
                }
            }
        }

        if !buffer.is_empty() {
            if let Some(delta) = decode_frame(&String::from_utf8_lossy(&buffer))? {
                yield delta;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::stream;

    fn collect(chunks: Vec<&'static str>) -> Vec<Result<ChatDelta>> {
        let source = stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok::<_, ApiError>(c.as_bytes().to_vec())),
        );
        block_on(decode_stream(source).collect::<Vec<_>>())
    }

    #[test]
    fn test_decode_frame_blank_lines_are_skipped() {
        assert!(decode_frame("").unwrap().is_none());
        assert!(decode_frame("   \r").unwrap().is_none());
        assert!(decode_frame(": keep-alive").unwrap().is_none());
        assert!(decode_frame("data: [DONE]").unwrap().is_none());
    }

    #[test]
    fn test_decode_frame_without_payload_is_empty() {
        let delta = decode_frame(r#"data: {"payload":null,"choices":[{"delta":{}}]}"#)
            .unwrap()
            .unwrap();
        assert_eq!(delta, ChatDelta::new("", false));

        // Missing entirely behaves like null, even if content is present
        let delta = decode_frame(r#"data: {"choices":[{"delta":{"content":"ignored"}}]}"#)
            .unwrap()
            .unwrap();
        assert_eq!(delta.content, "");
    }

    #[test]
    fn test_decode_frame_null_choices_and_delta() {
        let delta = decode_frame(r#"data: {"payload":null,"choices":null}"#)
            .unwrap()
            .unwrap();
        assert_eq!(delta, ChatDelta::new("", false));

        let delta = decode_frame(r#"data: {"payload":null,"choices":[{"delta":null}]}"#)
            .unwrap()
            .unwrap();
        assert_eq!(delta, ChatDelta::new("", false));

        let delta = decode_frame(
            r#"data: {"payload":1,"choices":[{"delta":null,"finish_reason":"stop"}]}"#,
        )
        .unwrap()
        .unwrap();
        assert_eq!(delta, ChatDelta::new("", true));
    }

    #[test]
    fn test_decode_frame_with_payload_yields_content() {
        let delta = decode_frame(r#"data: {"choices":[{"delta":{"content":"Hi"}}],"payload":1}"#)
            .unwrap()
            .unwrap();
        assert_eq!(delta, ChatDelta::new("Hi", false));
    }

    #[test]
    fn test_decode_frame_without_prefix() {
        let delta = decode_frame(r#"{"choices":[{"delta":{"content":"ok"}}],"payload":{}}"#)
            .unwrap()
            .unwrap();
        assert_eq!(delta.content, "ok");
    }

    #[test]
    fn test_decode_frame_finish_reason_marks_final() {
        let delta = decode_frame(
            r#"data: {"choices":[{"delta":{"content":""},"finish_reason":"stop"}],"payload":1}"#,
        )
        .unwrap()
        .unwrap();
        assert!(delta.finished);
    }

    #[test]
    fn test_decode_frame_malformed_json() {
        let err = decode_frame("data: {not json").unwrap_err();
        match err {
            ApiError::MalformedFrame { line, .. } => assert_eq!(line, "{not json"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(
            decode_frame("data: 42"),
            Err(ApiError::MalformedFrame { .. })
        ));
    }

    #[test]
    fn test_decode_stream_skips_blank_lines() {
        let deltas = collect(vec![
            "data: {\"payload\":null,\"choices\":[{\"delta\":{}}]}\n",
            "\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}],\"payload\":1}\n",
        ]);
        let contents: Vec<String> = deltas.into_iter().map(|d| d.unwrap().content).collect();
        assert_eq!(contents, vec!["".to_string(), "Hi".to_string()]);
    }

    #[test]
    fn test_decode_stream_reassembles_split_frames() {
        let deltas = collect(vec![
            "data: {\"choices\":[{\"delta\":{\"con",
            "tent\":\"Hel\"}}],\"payload\":1}\n\ndata: {\"choices\":[{\"delta\":",
            "{\"content\":\"lo\"}}],\"payload\":1}",
        ]);
        let contents: Vec<String> = deltas.into_iter().map(|d| d.unwrap().content).collect();
        assert_eq!(contents, vec!["Hel".to_string(), "lo".to_string()]);
    }

    #[test]
    fn test_decode_stream_handles_multibyte_split() {
        let frame = "data: {\"choices\":[{\"delta\":{\"content\":\"日本\"}}],\"payload\":1}\n";
        let bytes = frame.as_bytes();
        let split = frame.find('日').unwrap() + 1;
        let source = stream::iter(vec![
            Ok::<_, ApiError>(bytes[..split].to_vec()),
            Ok(bytes[split..].to_vec()),
        ]);
        let deltas = block_on(decode_stream(source).collect::<Vec<_>>());
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].as_ref().unwrap().content, "日本");
    }

    #[test]
    fn test_decode_stream_stops_at_malformed_frame() {
        let deltas = collect(vec![
            "data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}],\"payload\":1}\n",
            "data: garbage\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"b\"}}],\"payload\":1}\n",
        ]);
        assert_eq!(deltas.len(), 2);
        assert_eq!(deltas[0].as_ref().unwrap().content, "a");
        assert!(matches!(deltas[1], Err(ApiError::MalformedFrame { .. })));
    }

    #[test]
    fn test_decode_stream_propagates_transport_error() {
        let source = stream::iter(vec![
            Ok(b"data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}],\"payload\":1}\n".to_vec()),
            Err(ApiError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "reset",
            ))),
        ]);
        let deltas = block_on(decode_stream(source).collect::<Vec<_>>());
        assert_eq!(deltas.len(), 2);
        assert!(deltas[0].is_ok());
        assert!(matches!(deltas[1], Err(ApiError::Io(_))));
    }
}
