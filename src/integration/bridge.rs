//! Session bridge: owns the engine handle and relays outbound messages
//!
//! Creation is lazy and retried opportunistically: a command that finds no
//! handle triggers another attempt and reports failure instead of waiting.

use crate::engine::{ConfigAsset, Engine, EngineFactory, EngineSettings, EventSink};
use crate::integration::config::BridgeConfig;
use crate::messages::{MessageParams, OutboundMessage};
use crate::{BridgeError, Result};
use parking_lot::Mutex;
use tracing::{error, info, warn};

pub struct SessionBridge {
    factory: Box<dyn EngineFactory>,
    asset: ConfigAsset,
    device_id: String,
    write_params: MessageParams,
    events: EventSink,
    engine: Mutex<Option<Box<dyn Engine>>>,
    last_error: Mutex<Option<BridgeError>>,
}

impl SessionBridge {
    /// Create a bridge without an engine handle. Engine notifications go to
    /// `events`.
    pub fn new(config: &BridgeConfig, factory: Box<dyn EngineFactory>, events: EventSink) -> Self {
        Self {
            factory,
            asset: config.config_asset(),
            device_id: config.engine.device_id.clone(),
            write_params: config.write_params(),
            events,
            engine: Mutex::new(None),
            last_error: Mutex::new(None),
        }
    }

    /// Create the engine session and wake it, unless one already exists.
    ///
    /// Returns whether a handle exists afterwards. Failures are logged and
    /// leave the handle unset so a later call retries.
    pub fn ensure_initialized(&self) -> bool {
        let mut engine = self.engine.lock();
        if engine.is_some() {
            return true;
        }

        match self.create_engine() {
            Ok(mut created) => {
                if let Err(e) = created.send_message(OutboundMessage::wake()) {
                    warn!("Wake after engine creation failed: {}", e);
                }
                *engine = Some(created);
                *self.last_error.lock() = None;
                info!("Engine initialized for device {}, wake sent", self.device_id);
                true
            }
            Err(e) => {
                if e.is_recoverable() {
                    error!("Engine initialization failed, retrying on next command: {}", e);
                } else {
                    error!("Engine initialization failed until configuration is fixed: {}", e);
                }
                *self.last_error.lock() = Some(e);
                false
            }
        }
    }

    fn create_engine(&self) -> Result<Box<dyn Engine>> {
        let settings = EngineSettings {
            config: self.asset.load()?,
            device_id: self.device_id.clone(),
        };
        self.factory.create(&settings, self.events.clone())
    }

    /// Relay a UI text command.
    ///
    /// Without a handle this starts another initialization attempt and
    /// returns `false`; the text is not kept for later. With a handle the
    /// text is forwarded and `true` is returned without waiting for any
    /// acknowledgment.
    pub fn send(&self, text: &str) -> bool {
        if self.write_text(text) {
            return true;
        }
        info!("Engine not ready, retrying initialization");
        self.ensure_initialized();
        false
    }

    /// Forward text if a handle exists. Returns whether it was forwarded.
    pub fn write_text(&self, text: &str) -> bool {
        let message = OutboundMessage::write_text(self.write_params.clone(), text);
        if self.forward(message) {
            info!("Sent text to engine: {}", text);
            true
        } else {
            false
        }
    }

    /// Send the wake signal if a handle exists
    pub fn wake(&self) -> bool {
        self.forward(OutboundMessage::wake())
    }

    fn forward(&self, message: OutboundMessage) -> bool {
        let mut engine = self.engine.lock();
        let Some(engine) = engine.as_mut() else {
            return false;
        };
        let command = message.command;
        if let Err(e) = engine.send_message(message) {
            warn!("Engine rejected {:?} message: {}", command, e);
        }
        true
    }

    /// Error of the most recent failed initialization; cleared on success
    pub fn last_error(&self) -> Option<BridgeError> {
        self.last_error.lock().clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.engine.lock().is_some()
    }

    /// Destroy the engine session, if any
    pub fn teardown(&self) {
        if let Some(mut engine) = self.engine.lock().take() {
            engine.destroy();
            info!("Engine session released");
        }
    }
}

impl Drop for SessionBridge {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::messages::Command;
    use crate::BridgeError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Engine factory that records every message and can refuse creation
    #[derive(Clone, Default)]
    pub struct RecordingFactory {
        pub attempts: Arc<AtomicUsize>,
        pub fail_next: Arc<AtomicUsize>,
        pub sent: Arc<Mutex<Vec<OutboundMessage>>>,
        pub destroyed: Arc<AtomicUsize>,
        pub settings: Arc<Mutex<Vec<EngineSettings>>>,
    }

    impl RecordingFactory {
        pub fn failing(times: usize) -> Self {
            let factory = Self::default();
            factory.fail_next.store(times, Ordering::SeqCst);
            factory
        }

        pub fn count(&self, command: Command) -> usize {
            self.sent
                .lock()
                .iter()
                .filter(|m| m.command == command)
                .count()
        }

        pub fn texts(&self) -> Vec<String> {
            self.sent
                .lock()
                .iter()
                .filter_map(|m| m.text().map(str::to_string))
                .collect()
        }
    }

    struct RecordingEngine {
        factory: RecordingFactory,
    }

    impl Engine for RecordingEngine {
        fn send_message(&mut self, message: OutboundMessage) -> Result<()> {
            self.factory.sent.lock().push(message);
            Ok(())
        }

        fn destroy(&mut self) {
            self.factory.destroyed.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl EngineFactory for RecordingFactory {
        fn create(&self, settings: &EngineSettings, _events: EventSink) -> Result<Box<dyn Engine>> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            let refuse = self
                .fail_next
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if refuse {
                return Err(BridgeError::EngineError("engine refused to start".into()));
            }
            self.settings.lock().push(settings.clone());
            Ok(Box::new(RecordingEngine {
                factory: self.clone(),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingFactory;
    use super::*;
    use crate::messages::Command;
    use crate::utils::event_channel;
    use std::path::PathBuf;
    use std::sync::atomic::Ordering;

    fn bridge(factory: &RecordingFactory) -> SessionBridge {
        let (events, _rx) = event_channel();
        SessionBridge::new(&BridgeConfig::default(), Box::new(factory.clone()), events)
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let factory = RecordingFactory::default();
        let bridge = bridge(&factory);

        assert!(bridge.ensure_initialized());
        assert!(bridge.ensure_initialized());

        assert_eq!(factory.attempts.load(Ordering::SeqCst), 1);
        assert_eq!(factory.count(Command::Wake), 1);
    }

    #[test]
    fn test_initialize_passes_device_and_stripped_config() {
        let factory = RecordingFactory::default();
        let config = BridgeConfig::default().with_device_id("booth_9");
        let (events, _rx) = event_channel();
        let bridge = SessionBridge::new(&config, Box::new(factory.clone()), events);
        assert!(bridge.ensure_initialized());

        let settings = factory.settings.lock();
        assert_eq!(settings[0].device_id, "booth_9");
        assert_eq!(settings[0].config, "{}");
    }

    #[test]
    fn test_failed_initialize_leaves_handle_unset() {
        let factory = RecordingFactory::failing(1);
        let bridge = bridge(&factory);

        assert!(!bridge.ensure_initialized());
        assert!(!bridge.is_initialized());
        assert!(matches!(
            bridge.last_error(),
            Some(BridgeError::EngineError(_))
        ));

        assert!(bridge.ensure_initialized());
        assert_eq!(factory.attempts.load(Ordering::SeqCst), 2);
        assert!(bridge.last_error().is_none());
    }

    #[test]
    fn test_unreadable_asset_fails_before_factory() {
        let factory = RecordingFactory::default();
        let config =
            BridgeConfig::default().with_engine_config(PathBuf::from("/nonexistent/engine.cfg"));
        let (events, _rx) = event_channel();
        let bridge = SessionBridge::new(&config, Box::new(factory.clone()), events);

        assert!(!bridge.ensure_initialized());
        assert_eq!(factory.attempts.load(Ordering::SeqCst), 0);
        let err = bridge.last_error().unwrap();
        assert!(matches!(err, BridgeError::AssetError(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_send_without_handle_retries_init_once() {
        let factory = RecordingFactory::failing(1);
        let bridge = bridge(&factory);

        assert!(!bridge.send("are you there?"));
        assert_eq!(factory.attempts.load(Ordering::SeqCst), 1);
        assert!(!bridge.is_initialized());

        assert!(bridge.ensure_initialized());
        assert!(factory.texts().is_empty(), "original text must not be resent");
        assert_eq!(factory.count(Command::Wake), 1);
    }

    #[test]
    fn test_send_without_handle_creates_one_for_next_call() {
        let factory = RecordingFactory::default();
        let bridge = bridge(&factory);

        assert!(!bridge.send("first"));
        assert!(bridge.is_initialized());
        assert!(bridge.send("second"));
        assert_eq!(factory.texts(), vec!["second".to_string()]);
    }

    #[test]
    fn test_send_uses_routing_params() {
        let factory = RecordingFactory::default();
        let bridge = bridge(&factory);
        bridge.ensure_initialized();
        assert!(bridge.send("hello"));

        let sent = factory.sent.lock();
        let write = sent.iter().find(|m| m.command == Command::Write).unwrap();
        assert_eq!(
            write.params.to_string(),
            "sub=nlp,auth_id=avatar_user_001,data_type=text"
        );
        assert_eq!(write.data.as_deref(), Some("hello".as_bytes()));
    }

    #[test]
    fn test_wake_and_write_are_noops_without_handle() {
        let factory = RecordingFactory::default();
        let bridge = bridge(&factory);

        assert!(!bridge.wake());
        assert!(!bridge.write_text("greeting"));
        assert_eq!(factory.attempts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let factory = RecordingFactory::default();
        let bridge = bridge(&factory);
        bridge.ensure_initialized();

        bridge.teardown();
        bridge.teardown();
        drop(bridge);

        assert_eq!(factory.destroyed.load(Ordering::SeqCst), 1);
    }
}
