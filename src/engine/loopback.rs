//! In-process engine that imitates the remote avatar service.
//!
//! Wake moves the session to `Working`. Text written before wake is
//! answered with the not-awake error. Every text written while working is
//! answered with a `stream_info` result pointing at the configured URL.

use crate::engine::{Engine, EngineFactory, EngineSettings, EventSink};
use crate::messages::payload::{DEFAULT_STREAM_EVENT_TYPE, DEFAULT_STREAM_SUB_CHANNEL};
use crate::messages::{Command, EngineState, InboundEvent, OutboundMessage, SideChannel};
use crate::{BridgeError, Result};
use tracing::{debug, info};

/// Error code the loopback engine reports for writes before wake
pub const DEFAULT_NOT_AWAKE_CODE: i32 = 21022;

#[derive(Debug, Clone)]
pub struct LoopbackFactory {
    stream_url: String,
    not_awake_code: i32,
}

impl LoopbackFactory {
    pub fn new(stream_url: impl Into<String>) -> Self {
        Self {
            stream_url: stream_url.into(),
            not_awake_code: DEFAULT_NOT_AWAKE_CODE,
        }
    }

    pub fn with_not_awake_code(mut self, code: i32) -> Self {
        self.not_awake_code = code;
        self
    }
}

impl EngineFactory for LoopbackFactory {
    fn create(&self, settings: &EngineSettings, events: EventSink) -> Result<Box<dyn Engine>> {
        if settings.device_id.trim().is_empty() {
            return Err(BridgeError::EngineError(
                "Device serial number (sn) must be set before creating the engine".to_string(),
            ));
        }
        if !settings.config.trim().is_empty() {
            serde_json::from_str::<serde_json::Value>(&settings.config).map_err(|e| {
                BridgeError::EngineError(format!("Engine config is not valid JSON: {}", e))
            })?;
        }

        info!("Loopback engine created for device {}", settings.device_id);
        Ok(Box::new(LoopbackEngine {
            events,
            state: EngineState::Idle,
            stream_url: self.stream_url.clone(),
            not_awake_code: self.not_awake_code,
            next_content_id: 0,
            destroyed: false,
        }))
    }
}

pub struct LoopbackEngine {
    events: EventSink,
    state: EngineState,
    stream_url: String,
    not_awake_code: i32,
    next_content_id: u64,
    destroyed: bool,
}

impl LoopbackEngine {
    fn answer_text(&mut self, text: &str) {
        let content_id = self.next_content_id.to_string();
        self.next_content_id += 1;

        let info = serde_json::json!({
            "data": [{
                "params": { "sub": DEFAULT_STREAM_SUB_CHANNEL },
                "content": [{ "cnt_id": content_id, "dte": "utf8" }]
            }]
        });
        let stream = serde_json::json!({
            "event_type": DEFAULT_STREAM_EVENT_TYPE,
            "stream_url": self.stream_url,
            "text": text,
        });

        let mut data = SideChannel::new();
        data.insert(content_id, stream.to_string().into_bytes());
        self.events.emit(InboundEvent::result(info.to_string(), data));
    }
}

impl Engine for LoopbackEngine {
    fn send_message(&mut self, message: OutboundMessage) -> Result<()> {
        if self.destroyed {
            return Err(BridgeError::EngineError(
                "Loopback engine already destroyed".to_string(),
            ));
        }

        match message.command {
            Command::Wake => {
                if self.state != EngineState::Working {
                    self.state = EngineState::Working;
                    self.events.emit(InboundEvent::state(EngineState::Working));
                }
            }
            Command::Write => {
                if self.state != EngineState::Working {
                    self.events
                        .emit(InboundEvent::error(self.not_awake_code, "engine is not awake"));
                    return Ok(());
                }
                let text = message.text().unwrap_or_default().to_string();
                debug!("Loopback engine received text ({}): {}", message.params, text);
                self.answer_text(&text);
            }
        }
        Ok(())
    }

    fn destroy(&mut self) {
        if !self.destroyed {
            self.destroyed = true;
            self.state = EngineState::Idle;
            info!("Loopback engine destroyed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{EventKind, MessageParams, StreamDecoder};
    use crate::utils::event_channel;

    fn settings() -> EngineSettings {
        EngineSettings {
            config: "{}".to_string(),
            device_id: "test_device_001".to_string(),
        }
    }

    #[test]
    fn test_requires_device_id() {
        let (sink, _rx) = event_channel();
        let settings = EngineSettings {
            device_id: " ".to_string(),
            ..settings()
        };
        assert!(LoopbackFactory::new("rtmp://x").create(&settings, sink).is_err());
    }

    #[test]
    fn test_rejects_malformed_config() {
        let (sink, _rx) = event_channel();
        let settings = EngineSettings {
            config: "{ not json".to_string(),
            ..settings()
        };
        assert!(LoopbackFactory::new("rtmp://x").create(&settings, sink).is_err());
    }

    #[test]
    fn test_write_before_wake_reports_not_awake() {
        let (sink, rx) = event_channel();
        let mut engine = LoopbackFactory::new("rtmp://x")
            .create(&settings(), sink)
            .unwrap();

        engine
            .send_message(OutboundMessage::write_text(MessageParams::new(), "hi"))
            .unwrap();

        let event = rx.try_recv().unwrap();
        assert_eq!(event.kind, EventKind::Error);
        assert_eq!(event.arg1, DEFAULT_NOT_AWAKE_CODE);
    }

    #[test]
    fn test_wake_then_write_yields_stream() {
        let (sink, rx) = event_channel();
        let mut engine = LoopbackFactory::new("rtmp://example/live")
            .create(&settings(), sink)
            .unwrap();

        engine.send_message(OutboundMessage::wake()).unwrap();
        engine.send_message(OutboundMessage::wake()).unwrap();
        engine
            .send_message(OutboundMessage::write_text(MessageParams::new(), "hello"))
            .unwrap();

        let events: Vec<InboundEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 2, "second wake must not repeat the state change");
        assert_eq!(events[0], InboundEvent::state(EngineState::Working));

        let descriptor = StreamDecoder::default().decode(&events[1].info, &events[1].data);
        assert_eq!(descriptor.unwrap().url, "rtmp://example/live");
    }

    #[test]
    fn test_send_after_destroy_fails() {
        let (sink, _rx) = event_channel();
        let mut engine = LoopbackFactory::new("rtmp://x")
            .create(&settings(), sink)
            .unwrap();
        engine.destroy();
        assert!(engine.send_message(OutboundMessage::wake()).is_err());
    }
}
