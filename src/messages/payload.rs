//! Result payload decoding
//!
//! A result event carries a JSON `info` string describing one or more data
//! entries. When the first entry belongs to the stream sub-channel, its
//! content id points at a side-channel blob that holds a second JSON
//! document with the stream URL. Every step below returns `Option` so the
//! chain stops at the first missing or malformed piece.

use crate::messages::types::{SideChannel, StreamDescriptor};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Sub-channel marker for stream notifications
pub const DEFAULT_STREAM_SUB_CHANNEL: &str = "cbm_vms";

/// Event type of the side-channel document that carries a URL
pub const DEFAULT_STREAM_EVENT_TYPE: &str = "stream_info";

#[derive(Debug, Deserialize)]
struct ResultInfo {
    #[serde(default)]
    data: Option<Vec<Value>>,
}

/// One entry of the `data` array. Content elements stay raw; only the
/// first one is ever read.
#[derive(Debug, Deserialize)]
pub struct ResultEntry {
    pub params: EntryParams,
    #[serde(default)]
    pub content: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct EntryParams {
    #[serde(default)]
    pub sub: Option<String>,
}

/// Side-channel document announcing a stream
#[derive(Debug, Deserialize)]
pub struct StreamEvent {
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub stream_url: Option<String>,
}

/// Decode `info` and return the raw entries of its `data` array
pub fn parse_entries(info: &str) -> Option<Vec<Value>> {
    serde_json::from_str::<ResultInfo>(info).ok()?.data
}

/// Decode the first entry; later entries are never inspected
pub fn first_entry(entries: Vec<Value>) -> Option<ResultEntry> {
    let first = entries.into_iter().next()?;
    serde_json::from_value(first).ok()
}

/// Content id of the entry if it belongs to `sub_channel`
pub fn stream_content_id<'a>(entry: &'a ResultEntry, sub_channel: &str) -> Option<&'a str> {
    if entry.params.sub.as_deref() != Some(sub_channel) {
        return None;
    }
    entry.content.first()?.get("cnt_id")?.as_str()
}

pub fn side_channel_bytes<'a>(data: &'a SideChannel, content_id: &str) -> Option<&'a [u8]> {
    data.get(content_id).map(Vec::as_slice)
}

/// Decode a side-channel document and pull the URL if it is a stream event
pub fn parse_stream_event(bytes: &[u8], event_type: &str) -> Option<StreamDescriptor> {
    let event: StreamEvent = serde_json::from_slice(bytes).ok()?;
    if event.event_type.as_deref() != Some(event_type) {
        return None;
    }
    event
        .stream_url
        .filter(|url| !url.is_empty())
        .map(|url| StreamDescriptor { url })
}

/// Runs the decode chain with the configured markers
#[derive(Debug, Clone)]
pub struct StreamDecoder {
    sub_channel: String,
    event_type: String,
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_STREAM_SUB_CHANNEL, DEFAULT_STREAM_EVENT_TYPE)
    }
}

impl StreamDecoder {
    pub fn new(sub_channel: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            sub_channel: sub_channel.into(),
            event_type: event_type.into(),
        }
    }

    /// Extract a stream descriptor, or `None` at the first failing step
    pub fn decode(&self, info: &str, data: &SideChannel) -> Option<StreamDescriptor> {
        let Some(entries) = parse_entries(info) else {
            debug!("Result info has no data array");
            return None;
        };
        let Some(entry) = first_entry(entries) else {
            debug!("Result data array has no usable first entry");
            return None;
        };
        let content_id = stream_content_id(&entry, &self.sub_channel)?;
        let Some(bytes) = side_channel_bytes(data, content_id) else {
            debug!("No side-channel bytes for content id {}", content_id);
            return None;
        };
        let descriptor = parse_stream_event(bytes, &self.event_type);
        if descriptor.is_none() {
            debug!("Side-channel content {} is not a stream event", content_id);
        }
        descriptor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info_with(sub: &str, cnt_id: &str) -> String {
        serde_json::json!({
            "data": [{
                "params": { "sub": sub },
                "content": [{ "cnt_id": cnt_id, "dte": "utf8" }]
            }]
        })
        .to_string()
    }

    fn side_channel(cnt_id: &str, body: Value) -> SideChannel {
        let mut data = SideChannel::new();
        data.insert(cnt_id.to_string(), body.to_string().into_bytes());
        data
    }

    #[test]
    fn test_decode_stream_url() {
        let info = info_with("cbm_vms", "0");
        let data = side_channel(
            "0",
            serde_json::json!({ "event_type": "stream_info", "stream_url": "rtmp://example/live" }),
        );

        let descriptor = StreamDecoder::default().decode(&info, &data);
        assert_eq!(
            descriptor,
            Some(StreamDescriptor {
                url: "rtmp://example/live".to_string()
            })
        );
    }

    #[test]
    fn test_other_sub_channel_is_ignored() {
        let info = info_with("nlp", "0");
        let data = side_channel(
            "0",
            serde_json::json!({ "event_type": "stream_info", "stream_url": "rtmp://example/live" }),
        );
        assert!(StreamDecoder::default().decode(&info, &data).is_none());
    }

    #[test]
    fn test_only_first_entry_counts() {
        let info = serde_json::json!({
            "data": [
                { "params": { "sub": "nlp" }, "content": [{ "cnt_id": "1" }] },
                { "params": { "sub": "cbm_vms" }, "content": [{ "cnt_id": "0" }] }
            ]
        })
        .to_string();
        let data = side_channel(
            "0",
            serde_json::json!({ "event_type": "stream_info", "stream_url": "rtmp://example/live" }),
        );
        assert!(StreamDecoder::default().decode(&info, &data).is_none());
    }

    #[test]
    fn test_later_content_elements_are_ignored() {
        let data = side_channel(
            "0",
            serde_json::json!({ "event_type": "stream_info", "stream_url": "rtmp://example/live" }),
        );
        for extra in [serde_json::json!({ "dte": "utf8" }), serde_json::json!({ "cnt_id": 1 })] {
            let info = serde_json::json!({
                "data": [{
                    "params": { "sub": "cbm_vms" },
                    "content": [{ "cnt_id": "0" }, extra]
                }]
            })
            .to_string();
            assert_eq!(
                StreamDecoder::default().decode(&info, &data).map(|d| d.url),
                Some("rtmp://example/live".to_string())
            );
        }
    }

    #[test]
    fn test_first_content_without_string_id_is_dropped() {
        let data = side_channel(
            "1",
            serde_json::json!({ "event_type": "stream_info", "stream_url": "rtmp://example/live" }),
        );
        let info = r#"{"data":[{"params":{"sub":"cbm_vms"},"content":[{"cnt_id":1}]}]}"#;
        assert!(StreamDecoder::default().decode(info, &data).is_none());
    }

    #[test]
    fn test_missing_pieces_drop_silently() {
        let decoder = StreamDecoder::default();
        let good_bytes = side_channel(
            "0",
            serde_json::json!({ "event_type": "stream_info", "stream_url": "rtmp://example/live" }),
        );

        // not JSON
        assert!(decoder.decode("{{{", &good_bytes).is_none());
        // no data array
        assert!(decoder.decode("{}", &good_bytes).is_none());
        // empty data array
        assert!(decoder.decode(r#"{"data":[]}"#, &good_bytes).is_none());
        // entry without params
        assert!(decoder
            .decode(r#"{"data":[{"content":[{"cnt_id":"0"}]}]}"#, &good_bytes)
            .is_none());
        // entry without content
        assert!(decoder
            .decode(r#"{"data":[{"params":{"sub":"cbm_vms"}}]}"#, &good_bytes)
            .is_none());
        // content id with no bytes behind it
        assert!(decoder
            .decode(&info_with("cbm_vms", "7"), &good_bytes)
            .is_none());
    }

    #[test]
    fn test_side_channel_document_checks() {
        assert!(parse_stream_event(b"not json", "stream_info").is_none());
        assert!(parse_stream_event(
            br#"{"event_type":"stream_stop","stream_url":"rtmp://x"}"#,
            "stream_info"
        )
        .is_none());
        assert!(parse_stream_event(br#"{"event_type":"stream_info"}"#, "stream_info").is_none());
        assert!(
            parse_stream_event(br#"{"event_type":"stream_info","stream_url":""}"#, "stream_info")
                .is_none()
        );
    }

    #[test]
    fn test_custom_markers() {
        let decoder = StreamDecoder::new("avatar", "video_ready");
        let info = info_with("avatar", "c1");
        let data = side_channel(
            "c1",
            serde_json::json!({ "event_type": "video_ready", "stream_url": "https://cdn/x.m3u8" }),
        );
        assert_eq!(
            decoder.decode(&info, &data).map(|d| d.url),
            Some("https://cdn/x.m3u8".to_string())
        );
    }
}
