//! Decoding of delta records from the wire.
//!
//! A record is a JSON object with the event kind under `type` (or `kind`)
//! and its payload under `content` (or `payload`). Records arrive either as
//! `text/event-stream` frames or as JSON lines.

use serde_json::Value;
use tracing::{debug, warn};

use crate::delta::{DeltaEvent, DeltaPayload, Suggestion};
use crate::errors::DecodeError;
use crate::kind::DeltaKind;

/// One server-sent event frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: Option<String>,
    pub data: String,
}

/// Incremental `text/event-stream` splitter that tolerates frames split
/// across arbitrary chunk boundaries.
///
/// A frame that does not decode is skipped; its error is kept until
/// [`SseDecoder::take_errors`] is called, so events from the surrounding
/// frames are never lost.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
    frames_seen: usize,
    errors: Vec<DecodeError>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers `chunk` and returns every frame it completed.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buf.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some((idx, delim_len)) = find_frame_delimiter(&self.buf) {
            let frame_bytes: Vec<u8> = self.buf.drain(..idx + delim_len).take(idx).collect();
            if let Some(frame) = parse_sse_frame(&frame_bytes) {
                frames.push(frame);
            }
        }
        self.frames_seen += frames.len();
        frames
    }

    /// Buffers `chunk` and decodes the delta events carried by completed
    /// frames.
    ///
    /// Error line numbers are the 1-based index of the offending frame in
    /// the whole stream.
    pub fn push_events(&mut self, chunk: &[u8]) -> Vec<DeltaEvent> {
        let first_frame = self.frames_seen;
        let frames = self.push_chunk(chunk);
        let mut events = Vec::new();
        for (offset, frame) in frames.iter().enumerate() {
            self.decode_into(frame, first_frame + offset + 1, &mut events);
        }
        events
    }

    /// Decodes whatever is left in the buffer once the stream has closed.
    pub fn finish(&mut self) -> Vec<DeltaEvent> {
        let rest = std::mem::take(&mut self.buf);
        if rest.iter().all(u8::is_ascii_whitespace) {
            return Vec::new();
        }
        let mut events = Vec::new();
        if let Some(frame) = parse_sse_frame(&rest) {
            self.frames_seen += 1;
            self.decode_into(&frame, self.frames_seen, &mut events);
        }
        events
    }

    /// Errors of the frames skipped since the last call, in stream order.
    pub fn take_errors(&mut self) -> Vec<DecodeError> {
        std::mem::take(&mut self.errors)
    }

    fn decode_into(&mut self, frame: &SseFrame, line: usize, events: &mut Vec<DeltaEvent>) {
        match decode_frame(frame, line) {
            Ok(decoded) => events.extend(decoded),
            Err(err) => {
                warn!(line, error = %err, "skipping undecodable frame");
                self.errors.push(err);
            }
        }
    }
}

fn find_frame_delimiter(buf: &[u8]) -> Option<(usize, usize)> {
    let mut i = 0;
    while i + 1 < buf.len() {
        if buf[i] == b'\n' && buf[i + 1] == b'\n' {
            return Some((i, 2));
        }
        if i + 3 < buf.len() && &buf[i..i + 4] == b"\r\n\r\n" {
            return Some((i, 4));
        }
        i += 1;
    }
    None
}

fn parse_sse_frame(bytes: &[u8]) -> Option<SseFrame> {
    if bytes.is_empty() {
        return None;
    }
    let text = String::from_utf8_lossy(bytes);
    let mut event: Option<String> = None;
    let mut data_lines: Vec<&str> = Vec::new();
    for raw_line in text.split('\n') {
        let line = raw_line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        if let Some(rest) = line.strip_prefix("event:") {
            event = Some(rest.trim_start().to_string());
            continue;
        }
        if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.strip_prefix(' ').unwrap_or(rest));
        }
    }
    if event.is_none() && data_lines.is_empty() {
        return None;
    }
    Some(SseFrame {
        event,
        data: data_lines.join("\n"),
    })
}

/// Decodes the records carried by one frame.
///
/// A frame holds either a single record or a JSON array of records.
/// Keep-alive frames and the `[DONE]` marker carry none.
pub fn decode_frame(frame: &SseFrame, line: usize) -> Result<Vec<DeltaEvent>, DecodeError> {
    let data = frame.data.trim();
    if data.is_empty() || data == "[DONE]" {
        debug!(line, event = ?frame.event, "skipping frame without records");
        return Ok(Vec::new());
    }
    let value: Value =
        serde_json::from_str(data).map_err(|e| DecodeError::invalid_record(line, e.to_string()))?;
    decode_value(value, line)
}

/// Decodes newline-delimited wire records. Blank lines are skipped.
pub fn decode_jsonl(input: &str) -> Result<Vec<DeltaEvent>, DecodeError> {
    let mut events = Vec::new();
    for (idx, raw) in input.lines().enumerate() {
        let line = idx + 1;
        if raw.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| DecodeError::invalid_record(line, e.to_string()))?;
        events.extend(decode_value(value, line)?);
    }
    Ok(events)
}

/// Decodes a `text/event-stream` body held fully in memory.
///
/// Unlike the incremental decoder this is strict: the first bad frame fails
/// the whole body.
pub fn decode_sse(input: &[u8]) -> Result<Vec<DeltaEvent>, DecodeError> {
    let mut decoder = SseDecoder::new();
    let mut events = decoder.push_events(input);
    events.extend(decoder.finish());
    match decoder.take_errors().into_iter().next() {
        Some(err) => Err(err),
        None => Ok(events),
    }
}

fn decode_value(value: Value, line: usize) -> Result<Vec<DeltaEvent>, DecodeError> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| decode_record(item, line))
            .collect(),
        other => Ok(vec![decode_record(other, line)?]),
    }
}

/// Decodes a single wire record.
///
/// Payloads that are not strings are kept as their JSON text, except that
/// `suggestion` objects decode into [`Suggestion`] when they match the schema.
pub fn decode_record(value: Value, line: usize) -> Result<DeltaEvent, DecodeError> {
    let Value::Object(mut record) = value else {
        return Err(DecodeError::invalid_record(line, "record is not a JSON object"));
    };
    let kind = ["type", "kind"]
        .iter()
        .find_map(|key| record.get(*key).and_then(Value::as_str))
        .map(DeltaKind::from_wire)
        .ok_or(DecodeError::MissingKind { line })?;
    let raw_payload = ["content", "payload"]
        .iter()
        .find_map(|key| record.remove(*key))
        .unwrap_or(Value::Null);

    let payload = match raw_payload {
        Value::Null => DeltaPayload::default(),
        Value::String(text) => DeltaPayload::Text(text),
        Value::Object(object) if kind == DeltaKind::Suggestion => {
            let object = Value::Object(object);
            match serde_json::from_value::<Suggestion>(object.clone()) {
                Ok(suggestion) => DeltaPayload::Suggestion(suggestion),
                Err(_) => DeltaPayload::Text(object.to_string()),
            }
        }
        other => DeltaPayload::Text(other.to_string()),
    };
    Ok(DeltaEvent { kind, payload })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sse_decoder_handles_partial_chunk_boundaries() {
        let mut decoder = SseDecoder::new();
        let part1 = b"event: delta\ndata: {\"type\":\"text-delta\",\"content\":\"hel";
        let part2 = b"lo\"}\n\n";
        assert!(decoder.push_chunk(part1).is_empty());
        let frames = decoder.push_chunk(part2);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event.as_deref(), Some("delta"));
        assert!(frames[0].data.contains("text-delta"));
    }

    #[test]
    fn sse_events_decode_across_chunks_and_crlf() {
        let mut decoder = SseDecoder::new();
        let mut events = decoder.push_events(
            b"data: {\"type\":\"id\",\"content\":\"doc-1\"}\r\n\r\n: ping\r\n\r\ndata: {\"type\":\"ti",
        );
        events.extend(decoder.push_events(b"tle\",\"content\":\"Plan\"}\n\ndata: [DONE]\n\n"));
        assert!(decoder.take_errors().is_empty());
        assert_eq!(
            events,
            vec![
                DeltaEvent::new(DeltaKind::Id, "doc-1"),
                DeltaEvent::new(DeltaKind::Title, "Plan"),
            ]
        );
    }

    #[test]
    fn finish_decodes_unterminated_trailing_frame() {
        let events = decode_sse(b"data: {\"type\":\"finish\"}").expect("decode");
        assert_eq!(events, vec![DeltaEvent::finish()]);
    }

    #[test]
    fn frame_errors_report_stream_position() {
        let mut decoder = SseDecoder::new();
        assert_eq!(decoder.push_events(b"data: {\"type\":\"clear\"}\n\n").len(), 1);
        assert!(decoder.push_events(b"data: {broken\n\n").is_empty());
        let errors = decoder.take_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line(), Some(2));
        assert!(decoder.take_errors().is_empty());
    }

    #[test]
    fn bad_frame_does_not_drop_good_frames_in_the_same_chunk() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push_events(
            b"data: {\"type\":\"id\",\"content\":\"doc-1\"}\n\ndata: {broken\n\ndata: {\"type\":\"title\",\"content\":\"T\"}\n\n",
        );
        assert_eq!(
            events,
            vec![
                DeltaEvent::new(DeltaKind::Id, "doc-1"),
                DeltaEvent::new(DeltaKind::Title, "T"),
            ]
        );
        assert_eq!(decoder.push_events(b"data: {\"type\":\"finish\"}\n\n"), vec![DeltaEvent::finish()]);
        let errors = decoder.take_errors();
        assert!(matches!(errors.as_slice(), [DecodeError::InvalidRecord { line: 2, .. }]));
    }

    #[test]
    fn whole_body_decoding_fails_on_a_bad_frame() {
        let err = decode_sse(b"data: {\"type\":\"clear\"}\n\ndata: {broken")
            .expect_err("bad trailing frame");
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn frame_array_yields_multiple_events() {
        let frame = SseFrame {
            event: None,
            data: r#"[{"type":"text-delta","content":"a"},{"kind":"text-delta","payload":"b"}]"#
                .into(),
        };
        let events = decode_frame(&frame, 1).expect("decode");
        assert_eq!(
            events,
            vec![DeltaEvent::text_delta("a"), DeltaEvent::text_delta("b")]
        );
    }

    #[test]
    fn non_string_payloads_are_kept_as_json_text() {
        let event = decode_record(
            json!({"type": "pexels-search-results", "content": [{"id": 1}]}),
            1,
        )
        .expect("decode");
        assert_eq!(event.payload, DeltaPayload::Text(r#"[{"id":1}]"#.into()));
    }

    #[test]
    fn suggestion_objects_decode_and_mismatches_stay_raw() {
        let good = decode_record(
            json!({"type": "suggestion", "content": {"id": "s-1", "description": "d"}}),
            1,
        )
        .expect("decode");
        assert!(matches!(good.payload, DeltaPayload::Suggestion(ref s) if s.id == "s-1"));

        let raw = decode_record(json!({"type": "suggestion", "content": {"note": 1}}), 1)
            .expect("decode");
        assert_eq!(raw.payload, DeltaPayload::Text(r#"{"note":1}"#.into()));
    }

    #[test]
    fn jsonl_skips_blank_lines_and_reports_bad_ones() {
        let input = "{\"type\":\"text-delta\",\"content\":\"a\"}\n\n{\"type\":\"mystery\"}\n";
        let events = decode_jsonl(input).expect("decode");
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].kind, DeltaKind::Unknown("mystery".into()));

        let err = decode_jsonl("{\"type\":\"clear\"}\n{\"content\":\"x\"}").expect_err("no kind");
        assert_eq!(err, DecodeError::MissingKind { line: 2 });
        let err = decode_jsonl("[1]").expect_err("not an object");
        assert!(matches!(err, DecodeError::InvalidRecord { line: 1, .. }));
    }
}
