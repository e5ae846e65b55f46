//! Event listener: reacts to engine notifications
//!
//! Notifications are drained from the inbound queue by a single worker.
//! Nothing here propagates errors; malformed payloads are dropped.

use crate::integration::bridge::SessionBridge;
use crate::integration::config::BridgeConfig;
use crate::messages::{EngineState, EventKind, InboundEvent, SideChannel, StreamDecoder};
use crate::utils::UiQueue;
use crate::Result;
use crossbeam_channel::{bounded, select, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub struct EventListener {
    bridge: Arc<SessionBridge>,
    ui: UiQueue,
    decoder: StreamDecoder,
    greeting: String,
    greeting_delay: Duration,
    not_awake_code: i32,
}

impl EventListener {
    pub fn new(config: &BridgeConfig, bridge: Arc<SessionBridge>, ui: UiQueue) -> Self {
        Self {
            bridge,
            ui,
            decoder: config.stream_decoder(),
            greeting: config.greeting.text.clone(),
            greeting_delay: config.greeting_delay(),
            not_awake_code: config.recovery.not_awake_code,
        }
    }

    /// React to one engine notification
    pub fn dispatch(&self, event: InboundEvent) {
        if !self.bridge.is_initialized() {
            debug!("No engine session, dropping {:?} event", event.kind);
            return;
        }

        match event.kind {
            EventKind::State => self.on_state(EngineState::from_code(event.arg1)),
            EventKind::Error => self.on_error(event.arg1, &event.info),
            EventKind::Result => self.on_result(&event.info, &event.data),
            EventKind::Other(kind) => debug!("Ignoring engine event kind {}", kind),
        }
    }

    fn on_state(&self, state: EngineState) {
        debug!("Engine state changed: {:?}", state);
        if state != EngineState::Working {
            return;
        }

        info!(
            "Engine is working, greeting in {}ms",
            self.greeting_delay.as_millis()
        );
        let bridge = Arc::clone(&self.bridge);
        let greeting = self.greeting.clone();
        self.ui.post_delayed(self.greeting_delay, move |_| {
            if !bridge.write_text(&greeting) {
                warn!("Greeting skipped, engine session is gone");
            }
        });
    }

    fn on_error(&self, code: i32, description: &str) {
        error!("Engine error {}: {}", code, description);
        if code == self.not_awake_code {
            info!("Engine not awake, sending wake again");
            self.bridge.wake();
        }
    }

    fn on_result(&self, info: &str, data: &SideChannel) {
        let Some(stream) = self.decoder.decode(info, data) else {
            return;
        };
        info!("Stream available: {}", stream.url);
        self.ui.post(move |sink| sink.play(&stream.url));
    }

    /// Spawn the worker draining `events` until shutdown or until every
    /// sender is gone
    pub fn start_worker(self, events: Receiver<InboundEvent>) -> Result<ListenerHandle> {
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);

        let join = thread::Builder::new()
            .name("engine-events".to_string())
            .spawn(move || {
                info!("Event listener started");
                loop {
                    select! {
                        recv(events) -> event => match event {
                            Ok(event) => self.dispatch(event),
                            Err(_) => {
                                debug!("Event queue closed");
                                break;
                            }
                        },
                        recv(shutdown_rx) -> _ => break,
                    }
                }
                info!("Event listener stopped");
            })?;

        Ok(ListenerHandle {
            shutdown_tx,
            join: Some(join),
        })
    }
}

/// Controls a running listener worker
pub struct ListenerHandle {
    shutdown_tx: Sender<()>,
    join: Option<JoinHandle<()>>,
}

impl ListenerHandle {
    /// Stop the worker and wait for it. Events still queued are dropped.
    pub fn shutdown(&mut self) {
        let _ = self.shutdown_tx.try_send(());
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                error!("Event listener thread panicked");
            }
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
