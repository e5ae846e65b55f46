//! Wires the bridge, the listener worker and the command channel together
//!
//! Data flow: UI command -> SessionBridge -> engine -> event queue ->
//! EventListener -> UiQueue -> PlaybackSink

use crate::engine::{EngineFactory, LoopbackFactory};
use crate::integration::bridge::SessionBridge;
use crate::integration::command::CommandChannel;
use crate::integration::config::BridgeConfig;
use crate::integration::listener::{EventListener, ListenerHandle};
use crate::utils::{event_channel, UiLooper};
use crate::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Running bridge: owns the listener worker and the shared session
pub struct Orchestrator {
    bridge: Arc<SessionBridge>,
    commands: CommandChannel,
    listener: ListenerHandle,
}

impl Orchestrator {
    /// Build every component, start the listener and attempt the first
    /// engine initialization.
    ///
    /// Returns the looper the UI thread must drain.
    pub fn start(
        config: BridgeConfig,
        factory: Box<dyn EngineFactory>,
    ) -> Result<(Self, UiLooper)> {
        config.validate()?;

        let (events, events_rx) = event_channel();
        let bridge = Arc::new(SessionBridge::new(&config, factory, events));
        let (ui, looper) = UiLooper::new();

        let listener =
            EventListener::new(&config, Arc::clone(&bridge), ui).start_worker(events_rx)?;

        // a failure here is retried by the first command
        if !bridge.ensure_initialized() {
            warn!("Engine not available at startup, will retry on first command");
        }

        info!("Orchestrator started");
        let commands = CommandChannel::new(Arc::clone(&bridge));
        Ok((
            Self {
                bridge,
                commands,
                listener,
            },
            looper,
        ))
    }

    pub fn command_channel(&self) -> CommandChannel {
        self.commands.clone()
    }

    pub fn bridge(&self) -> Arc<SessionBridge> {
        Arc::clone(&self.bridge)
    }

    /// Release the engine session and stop the listener; idempotent
    pub fn shutdown(&mut self) {
        self.bridge.teardown();
        self.listener.shutdown();
        info!("Orchestrator stopped");
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Builder for creating an orchestrator
pub struct OrchestratorBuilder {
    config: BridgeConfig,
    factory: Option<Box<dyn EngineFactory>>,
}

impl OrchestratorBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: BridgeConfig::default(),
            factory: None,
        }
    }

    /// Set the complete configuration
    pub fn with_config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a specific engine implementation instead of the loopback engine
    pub fn with_engine_factory(mut self, factory: Box<dyn EngineFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Start the orchestrator
    pub fn start(self) -> Result<(Orchestrator, UiLooper)> {
        let factory = match self.factory {
            Some(factory) => factory,
            None => Box::new(
                LoopbackFactory::new(&self.config.loopback.stream_url)
                    .with_not_awake_code(self.config.recovery.not_awake_code),
            ),
        };
        Orchestrator::start(self.config, factory)
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integration::bridge::testing::RecordingFactory;
    use crate::messages::Command;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_start_initializes_engine() {
        let factory = RecordingFactory::default();
        let (orchestrator, _looper) = OrchestratorBuilder::new()
            .with_engine_factory(Box::new(factory.clone()))
            .start()
            .unwrap();

        assert!(orchestrator.bridge().is_initialized());
        assert_eq!(factory.count(Command::Wake), 1);
    }

    #[test]
    fn test_start_survives_engine_failure() {
        let factory = RecordingFactory::failing(1);
        let (orchestrator, _looper) = OrchestratorBuilder::new()
            .with_engine_factory(Box::new(factory.clone()))
            .start()
            .unwrap();

        assert!(!orchestrator.bridge().is_initialized());
        assert!(!orchestrator.command_channel().start_speaking("hello"));
        assert!(orchestrator.command_channel().start_speaking("hello"));
        assert_eq!(factory.attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = OrchestratorBuilder::new()
            .with_config(BridgeConfig::default().with_device_id(""))
            .start();
        assert!(result.is_err());
    }

    #[test]
    fn test_shutdown_releases_engine() {
        let factory = RecordingFactory::default();
        let (mut orchestrator, _looper) = OrchestratorBuilder::new()
            .with_engine_factory(Box::new(factory.clone()))
            .start()
            .unwrap();

        orchestrator.shutdown();
        orchestrator.shutdown();
        drop(orchestrator);
        assert_eq!(factory.destroyed.load(Ordering::SeqCst), 1);
    }
}
